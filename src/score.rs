//! Normalized trait scores.
//!
//! Every score lives in `[SCORE_MIN, SCORE_MAX]`. The range is enforced on
//! every write into a [`ScoreMap`], so no stage of the pipeline can observe
//! an out-of-range value.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::taxonomy::TraitCode;

/// Lowest representable score.
pub const SCORE_MIN: i64 = 0;

/// Highest representable score.
pub const SCORE_MAX: i64 = 30_000;

/// Score assumed for a trait that has no entry in a score map.
pub const NEUTRAL_SCORE: i64 = 15_000;

/// Clamps a raw value into `[SCORE_MIN, SCORE_MAX]`.
#[must_use]
pub const fn clamp_score(value: i64) -> i64 {
    if value < SCORE_MIN {
        SCORE_MIN
    } else if value > SCORE_MAX {
        SCORE_MAX
    } else {
        value
    }
}

/// Multiplies a score by `factor`, truncating toward zero, then clamps.
///
/// Truncation is the rounding rule used by every multiplicative stage
/// (boosts and conflict penalties).
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn scale_score(value: i64, factor: f64) -> i64 {
    let scaled = (value as f64 * factor).trunc();
    if scaled.is_nan() {
        return SCORE_MIN;
    }
    // Saturating float-to-int cast, then range clamp.
    clamp_score(scaled as i64)
}

/// Ordered mapping of trait codes to clamped scores.
///
/// Iteration order is insertion order, which the pipeline keeps equal to
/// the taxonomy order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreMap {
    entries: Vec<(TraitCode, i64)>,
}

impl ScoreMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty map with room for `capacity` traits.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Inserts or overwrites a score. The value is clamped.
    pub fn insert(&mut self, code: TraitCode, value: i64) {
        let value = clamp_score(value);
        match self.position(&code) {
            Some(idx) => self.entries[idx].1 = value,
            None => self.entries.push((code, value)),
        }
    }

    /// Returns the score for `code`.
    #[must_use]
    pub fn get(&self, code: &TraitCode) -> Option<i64> {
        self.position(code).map(|idx| self.entries[idx].1)
    }

    /// Returns true if `code` has a score.
    #[must_use]
    pub fn contains(&self, code: &TraitCode) -> bool {
        self.position(code).is_some()
    }

    /// Multiplies the score of `code` by `factor` (truncate, then clamp).
    ///
    /// Returns false when `code` has no score.
    pub fn scale(&mut self, code: &TraitCode, factor: f64) -> bool {
        match self.position(code) {
            Some(idx) => {
                let current = self.entries[idx].1;
                self.entries[idx].1 = scale_score(current, factor);
                true
            }
            None => false,
        }
    }

    /// Number of scored traits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no trait is scored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(code, score)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&TraitCode, i64)> {
        self.entries.iter().map(|(code, value)| (code, *value))
    }

    /// Iterates the scores in insertion order.
    pub fn values(&self) -> impl Iterator<Item = i64> + '_ {
        self.entries.iter().map(|(_, value)| *value)
    }

    fn position(&self, code: &TraitCode) -> Option<usize> {
        self.entries.iter().position(|(c, _)| c == code)
    }
}

impl FromIterator<(TraitCode, i64)> for ScoreMap {
    fn from_iter<I: IntoIterator<Item = (TraitCode, i64)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (code, value) in iter {
            map.insert(code, value);
        }
        map
    }
}

impl fmt::Display for ScoreMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (idx, (code, value)) in self.entries.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{code}: {value}")?;
        }
        write!(f, "}}")
    }
}

impl Serialize for ScoreMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (code, value) in &self.entries {
            map.serialize_entry(code.as_str(), value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ScoreMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScoreMapVisitor;

        impl<'de> Visitor<'de> for ScoreMapVisitor {
            type Value = ScoreMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a map of trait codes to integer scores")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ScoreMap, A::Error> {
                let mut map = ScoreMap::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((code, value)) = access.next_entry::<String, i64>()? {
                    let code = TraitCode::new(code).map_err(serde::de::Error::custom)?;
                    map.insert(code, value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(ScoreMapVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> TraitCode {
        TraitCode::new(s).unwrap()
    }

    #[test]
    fn clamp_stays_in_range() {
        for v in [i64::MIN, -1, 0, 1, 15_000, 29_999, 30_000, 30_001, i64::MAX] {
            let c = clamp_score(v);
            assert!((SCORE_MIN..=SCORE_MAX).contains(&c));
            assert_eq!(clamp_score(c), c);
        }
        assert_eq!(clamp_score(-5), 0);
        assert_eq!(clamp_score(45_000), 30_000);
    }

    #[test]
    fn scale_truncates_then_clamps() {
        assert_eq!(scale_score(1000, 0.95), 950);
        assert_eq!(scale_score(9000, 0.95), 8550);
        assert_eq!(scale_score(101, 0.5), 50);
        assert_eq!(scale_score(29_000, 1.15), 30_000);
        assert_eq!(scale_score(100, f64::NAN), 0);
    }

    #[test]
    fn insert_clamps_and_preserves_order() {
        let mut map = ScoreMap::new();
        map.insert(code("TC"), 40_000);
        map.insert(code("NC"), -3);
        map.insert(code("TC"), 12);

        let collected: Vec<_> = map.iter().map(|(c, v)| (c.as_str().to_string(), v)).collect();
        assert_eq!(collected, vec![("TC".to_string(), 12), ("NC".to_string(), 0)]);
    }

    #[test]
    fn scale_missing_trait_reports_false() {
        let mut map: ScoreMap = [(code("RE"), 1000)].into_iter().collect();
        assert!(!map.scale(&code("ES"), 0.95));
        assert!(map.scale(&code("RE"), 0.95));
        assert_eq!(map.get(&code("RE")), Some(950));
    }

    #[test]
    fn serializes_as_ordered_object() {
        let map: ScoreMap = [(code("TC"), 1), (code("CA"), 2)].into_iter().collect();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"TC":1,"CA":2}"#);
    }

    #[test]
    fn deserialize_keeps_document_order() {
        let map: ScoreMap = serde_json::from_str(r#"{"TC":5,"CA":40000,"AB":-1}"#).unwrap();
        let codes: Vec<_> = map.iter().map(|(c, _)| c.as_str().to_string()).collect();
        assert_eq!(codes, vec!["TC", "CA", "AB"]);
        assert_eq!(map.get(&code("CA")), Some(30_000));
        assert_eq!(map.get(&code("AB")), Some(0));
    }

    #[test]
    fn display_lists_entries() {
        let map: ScoreMap = [(code("RE"), 950), (code("ES"), 8550)].into_iter().collect();
        assert_eq!(format!("{map}"), "{RE: 950, ES: 8550}");
    }
}
