//! Engine configuration.
//!
//! Every section falls back to its defaults when omitted, so an empty JSON
//! object is a valid engine config. The taxonomy is validated as part of
//! loading; no partially valid configuration is ever returned.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ValidationError};
use crate::taxonomy::{Taxonomy, TraitEntry, DUTY_CATEGORY};

/// Thresholds for conflict flagging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    /// A pair can conflict only if its interaction weight is below this.
    pub conflict_threshold: f64,
    /// A pair can conflict only if its absolute score gap exceeds this.
    pub score_diff_threshold: i64,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            conflict_threshold: 0.5,
            score_diff_threshold: 7000,
        }
    }
}

/// Multiplicative boost settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostConfig {
    /// Category boosted for duty-type dilemmas.
    pub duty_category: String,
    /// Duty boost multiplier.
    pub duty_factor: f64,
    /// Traits boosted on every dilemma.
    pub core_traits: Vec<String>,
    /// Core boost multiplier.
    pub core_factor: f64,
}

impl Default for BoostConfig {
    fn default() -> Self {
        Self {
            duty_category: DUTY_CATEGORY.to_string(),
            duty_factor: 1.15,
            core_traits: vec!["NC".to_string(), "DI".to_string()],
            core_factor: 1.08,
        }
    }
}

/// Directional override of one interaction-matrix cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionOverride {
    /// Row trait.
    pub from: String,
    /// Column trait.
    pub to: String,
    /// Interaction weight for `(from, to)` only.
    pub weight: f64,
}

impl InteractionOverride {
    /// Creates an override.
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>, weight: f64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            weight,
        }
    }
}

/// Default tension pairs.
#[must_use]
pub fn default_interactions() -> Vec<InteractionOverride> {
    vec![
        InteractionOverride::new("RE", "ES", -0.5),
        InteractionOverride::new("TR", "NC", -0.4),
        InteractionOverride::new("KS", "CPv", -0.35),
    ]
}

/// Temporal decay voting settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayConfig {
    /// Probability that the second replica is upset on a vote.
    pub fault_probability: f64,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            fault_probability: 0.01,
        }
    }
}

/// Full engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Conflict thresholds.
    #[serde(alias = "resolution_config")]
    pub resolution: ResolutionConfig,
    /// Boost settings.
    pub boosts: BoostConfig,
    /// Interaction-matrix overrides.
    pub interactions: Vec<InteractionOverride>,
    /// Decay voting settings.
    pub decay: DecayConfig,
    /// Queries at or above this many characters are screened out.
    pub complexity_threshold: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            resolution: ResolutionConfig::default(),
            boosts: BoostConfig::default(),
            interactions: default_interactions(),
            decay: DecayConfig::default(),
            complexity_threshold: 15_000,
        }
    }
}

impl EngineConfig {
    /// Checks numeric fields.
    ///
    /// # Errors
    /// Returns `OutOfRange` for a fault probability outside `[0, 1]`, a
    /// negative score gap threshold, or a non-finite multiplier or weight.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let p = self.decay.fault_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(out_of_range("decay.fault_probability", p, 0.0, 1.0));
        }
        if self.resolution.score_diff_threshold < 0 {
            #[allow(clippy::cast_precision_loss)]
            let value = self.resolution.score_diff_threshold as f64;
            return Err(out_of_range("resolution.score_diff_threshold", value, 0.0, f64::MAX));
        }
        let finite = [
            ("resolution.conflict_threshold", self.resolution.conflict_threshold),
            ("boosts.duty_factor", self.boosts.duty_factor),
            ("boosts.core_factor", self.boosts.core_factor),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(out_of_range(field, value, f64::MIN, f64::MAX));
            }
        }
        for o in &self.interactions {
            if !o.weight.is_finite() {
                return Err(out_of_range(
                    &format!("interactions[{}->{}]", o.from, o.to),
                    o.weight,
                    f64::MIN,
                    f64::MAX,
                ));
            }
        }
        Ok(())
    }
}

fn out_of_range(field: &str, value: f64, min: f64, max: f64) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        value,
        min,
        max,
    }
}

/// On-disk configuration file layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Taxonomy entries; empty means the standard taxonomy.
    #[serde(alias = "sub_traits")]
    pub traits: Vec<TraitEntry>,
    /// Engine settings.
    #[serde(flatten)]
    pub engine: EngineConfig,
}

/// Validated taxonomy plus engine settings.
#[derive(Debug, Clone)]
pub struct CocorelsConfig {
    /// Validated taxonomy.
    pub taxonomy: Taxonomy,
    /// Engine settings.
    pub engine: EngineConfig,
}

impl Default for CocorelsConfig {
    fn default() -> Self {
        Self {
            taxonomy: Taxonomy::standard(),
            engine: EngineConfig::default(),
        }
    }
}

impl CocorelsConfig {
    /// Validates a parsed config file.
    ///
    /// # Errors
    /// Any taxonomy or engine validation failure.
    pub fn from_file(file: ConfigFile) -> Result<Self, ValidationError> {
        let taxonomy = if file.traits.is_empty() {
            Taxonomy::standard()
        } else {
            Taxonomy::from_entries(file.traits)?
        };
        file.engine.validate()?;
        Ok(Self {
            taxonomy,
            engine: file.engine,
        })
    }

    /// Parses and validates a JSON document.
    ///
    /// # Errors
    /// `Parse` on malformed JSON, `Invalid` on validation failure.
    pub fn from_json_str(json: &str, origin: &Path) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        Ok(Self::from_file(file)?)
    }

    /// Loads a JSON config file.
    ///
    /// # Errors
    /// `Io` if the file cannot be read, otherwise as [`Self::from_json_str`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&raw, path)?;
        tracing::info!(
            path = %path.display(),
            traits = config.taxonomy.len(),
            "loaded config"
        );
        Ok(config)
    }

    /// Loads `path` if given, else returns the defaults.
    ///
    /// # Errors
    /// As [`Self::load`].
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                tracing::debug!("no config path given; using standard taxonomy");
                Ok(Self::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = EngineConfig::default();
        assert!((config.resolution.conflict_threshold - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.resolution.score_diff_threshold, 7000);
        assert!((config.boosts.duty_factor - 1.15).abs() < f64::EPSILON);
        assert!((config.boosts.core_factor - 1.08).abs() < f64::EPSILON);
        assert_eq!(config.boosts.core_traits, vec!["NC", "DI"]);
        assert!((config.decay.fault_probability - 0.01).abs() < f64::EPSILON);
        assert_eq!(config.interactions.len(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_object_is_default() {
        let config = CocorelsConfig::from_json_str("{}", Path::new("inline")).unwrap();
        assert_eq!(config.engine, EngineConfig::default());
        assert_eq!(config.taxonomy, Taxonomy::standard());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let json = r#"{"resolution_config": {"score_diff_threshold": 5000}}"#;
        let config = CocorelsConfig::from_json_str(json, Path::new("inline")).unwrap();
        assert_eq!(config.engine.resolution.score_diff_threshold, 5000);
        assert!((config.engine.resolution.conflict_threshold - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.engine.interactions, default_interactions());
    }

    #[test]
    fn bad_fault_probability_rejected() {
        let json = r#"{"decay": {"fault_probability": 1.5}}"#;
        let err = CocorelsConfig::from_json_str(json, Path::new("inline")).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ValidationError::OutOfRange { .. })));
    }

    #[test]
    fn taxonomy_error_fails_load() {
        let json = r#"{"traits": [{"code": "TC", "default_weight": 0.8, "category": "Duty", "anchor": ""}]}"#;
        let err = CocorelsConfig::from_json_str(json, Path::new("inline")).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(ValidationError::MissingAnchor { .. })
        ));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = CocorelsConfig::from_json_str("{not json", Path::new("bad.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(format!("{err}").contains("bad.json"));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "traits": [
                    {{"code": "RE", "default_weight": 0.7, "category": "Wisdom", "anchor": "krilu ckaji"}},
                    {{"code": "ES", "default_weight": 0.7, "category": "Wisdom", "anchor": "jdice zasti"}}
                ],
                "interactions": [{{"from": "RE", "to": "ES", "weight": -0.5}}]
            }}"#
        )
        .unwrap();

        let config = CocorelsConfig::load(file.path()).unwrap();
        assert_eq!(config.taxonomy.len(), 2);
        assert_eq!(config.engine.interactions.len(), 1);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CocorelsConfig::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn load_or_default_without_path() {
        let config = CocorelsConfig::load_or_default(None).unwrap();
        assert_eq!(config.taxonomy.len(), 12);
    }
}
