//! Trait taxonomy.
//!
//! A taxonomy is the fixed, ordered set of traits every dilemma is scored
//! against. It is validated once at load time and is read-only afterwards;
//! an invalid entry fails the whole load.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Category label that gates the duty boost.
pub const DUTY_CATEGORY: &str = "Duty";

/// Short identifier for a trait (e.g. `"NC"`, `"DI"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TraitCode(String);

impl TraitCode {
    /// Creates a trait code. Surrounding whitespace is trimmed.
    ///
    /// # Errors
    /// Returns `EmptyTraitCode` for an empty or blank code.
    pub fn new(code: impl Into<String>) -> Result<Self, ValidationError> {
        let code = code.into();
        let trimmed = code.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyTraitCode);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TraitCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TraitCode> for String {
    fn from(code: TraitCode) -> Self {
        code.0
    }
}

impl fmt::Display for TraitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Static description of one trait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitDefinition {
    /// Default weight of the trait.
    pub default_weight: f64,
    /// Category label ("Duty", "Respect", ...).
    pub category: String,
    /// Anchor text the assessor grounds its judgement on. Never empty.
    pub anchor: String,
}

impl TraitDefinition {
    /// Creates a definition.
    #[must_use]
    pub fn new(default_weight: f64, category: impl Into<String>, anchor: impl Into<String>) -> Self {
        Self {
            default_weight,
            category: category.into(),
            anchor: anchor.into(),
        }
    }

    /// Returns true if this trait belongs to the duty category.
    #[must_use]
    pub fn is_duty(&self) -> bool {
        self.category == DUTY_CATEGORY
    }
}

/// Serialized form of a taxonomy entry.
///
/// Taxonomies are stored as a JSON array of these so declaration order
/// survives a round trip. `anchor` is optional at the serde layer so that
/// a missing anchor surfaces as a validation error naming the trait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitEntry {
    /// Trait code.
    pub code: String,
    /// Default weight.
    pub default_weight: f64,
    /// Category label.
    pub category: String,
    /// Anchor text.
    #[serde(default)]
    pub anchor: Option<String>,
}

/// Ordered, validated mapping of trait codes to definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct Taxonomy {
    traits: Vec<(TraitCode, TraitDefinition)>,
    index: HashMap<TraitCode, usize>,
}

impl Taxonomy {
    /// Builds a taxonomy from ordered `(code, definition)` pairs.
    ///
    /// # Errors
    /// - `EmptyTaxonomy` if no trait is given.
    /// - `MissingAnchor` if any anchor text is empty or blank.
    /// - `DuplicateTrait` if a code repeats.
    /// - `InvalidWeight` if a default weight is NaN or infinite.
    pub fn new(
        traits: impl IntoIterator<Item = (TraitCode, TraitDefinition)>,
    ) -> Result<Self, ValidationError> {
        let traits: Vec<(TraitCode, TraitDefinition)> = traits.into_iter().collect();
        if traits.is_empty() {
            return Err(ValidationError::EmptyTaxonomy);
        }

        let mut index = HashMap::with_capacity(traits.len());
        for (pos, (code, def)) in traits.iter().enumerate() {
            if def.anchor.trim().is_empty() {
                return Err(ValidationError::MissingAnchor {
                    code: code.to_string(),
                });
            }
            if !def.default_weight.is_finite() {
                return Err(ValidationError::InvalidWeight {
                    code: code.to_string(),
                    weight: def.default_weight,
                });
            }
            if index.insert(code.clone(), pos).is_some() {
                return Err(ValidationError::DuplicateTrait {
                    code: code.to_string(),
                });
            }
        }

        tracing::debug!(traits = traits.len(), "taxonomy validated");
        Ok(Self { traits, index })
    }

    /// Builds a taxonomy from its serialized entries.
    ///
    /// # Errors
    /// Same conditions as [`Taxonomy::new`], plus `EmptyTraitCode`.
    pub fn from_entries(entries: Vec<TraitEntry>) -> Result<Self, ValidationError> {
        let mut traits = Vec::with_capacity(entries.len());
        for entry in entries {
            let code = TraitCode::new(entry.code)?;
            let anchor = entry.anchor.ok_or_else(|| ValidationError::MissingAnchor {
                code: code.to_string(),
            })?;
            traits.push((code, TraitDefinition::new(entry.default_weight, entry.category, anchor)));
        }
        Self::new(traits)
    }

    /// Returns the serialized entries, in order.
    #[must_use]
    pub fn to_entries(&self) -> Vec<TraitEntry> {
        self.traits
            .iter()
            .map(|(code, def)| TraitEntry {
                code: code.to_string(),
                default_weight: def.default_weight,
                category: def.category.clone(),
                anchor: Some(def.anchor.clone()),
            })
            .collect()
    }

    /// The standard twelve-trait taxonomy.
    #[must_use]
    pub fn standard() -> Self {
        const STANDARD: [(&str, f64, &str, &str); 12] = [
            ("TC", 0.8, "Duty", "co'e gunka co'u"),
            ("CA", 0.8, "Duty", "nupre punji"),
            ("IL", 0.9, "Duty", "jetnu cnemu"),
            ("DP", 0.9, "Respect", "nobli kurji"),
            ("NC", 0.9, "Respect", "na rinju"),
            ("CS", 0.8, "Community", "girzu cnemu"),
            ("RE", 0.7, "Wisdom", "krilu ckaji"),
            ("ES", 0.7, "Wisdom", "jdice zasti"),
            ("TR", 0.8, "Honesty", "fapro jitro"),
            ("CPv", 0.9, "Safety", "prami ranji"),
            ("KS", 0.8, "Safety", "sepli terpa"),
            ("DI", 0.9, "Wisdom", "jdice cnemu"),
        ];

        let traits = STANDARD.iter().map(|(code, weight, category, anchor)| {
            (
                TraitCode((*code).to_string()),
                TraitDefinition::new(*weight, *category, *anchor),
            )
        });
        let traits: Vec<_> = traits.collect();
        let index = traits
            .iter()
            .enumerate()
            .map(|(pos, (code, _))| (code.clone(), pos))
            .collect();
        Self { traits, index }
    }

    /// Returns the definition for `code`.
    #[must_use]
    pub fn get(&self, code: &TraitCode) -> Option<&TraitDefinition> {
        self.index.get(code).map(|&pos| &self.traits[pos].1)
    }

    /// Returns the position of `code` in the trait order.
    #[must_use]
    pub fn position(&self, code: &TraitCode) -> Option<usize> {
        self.index.get(code).copied()
    }

    /// Trait codes in declaration order.
    #[must_use]
    pub fn codes(&self) -> Vec<TraitCode> {
        self.traits.iter().map(|(code, _)| code.clone()).collect()
    }

    /// Iterates `(code, definition)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&TraitCode, &TraitDefinition)> {
        self.traits.iter().map(|(code, def)| (code, def))
    }

    /// Number of traits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.traits.len()
    }

    /// Always false for a validated taxonomy.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }
}
