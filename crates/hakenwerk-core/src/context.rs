//! The symbolic environment a hook is evaluated against.
//!
//! A [`Context`] is an immutable snapshot: a map of typed feature values,
//! a timestamp and the currently focused application. "Updating" a context
//! always means building a new value; no core operation mutates one in
//! place, so a context shared between callers is safe to hand around.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// A typed, named feature slot. Identity is the (name, kind) pair, so the
/// same name under two kinds addresses two different slots.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub kind: String,
}

impl Feature {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
        }
    }
}

/// A tagged feature value. Equality is structural; the set of variants is
/// closed by design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureValue {
    Text(String),
    App(String),
    Time(#[serde(with = "time::serde::rfc3339")] OffsetDateTime),
    Numeric(f64),
    Bool(bool),
}

/// Immutable environment snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    /// Feature slots, serialized as a list of (feature, value) pairs since
    /// JSON object keys must be strings.
    #[serde(with = "feature_map")]
    pub features: BTreeMap<Feature, FeatureValue>,
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
    /// Currently focused application, if any.
    pub app: Option<String>,
}

impl Context {
    /// The placeholder context: epoch time, no app, no features. Used as
    /// the captured context of a rollback plan until a real pre-action
    /// snapshot is taken.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            features: BTreeMap::new(),
            time: OffsetDateTime::UNIX_EPOCH,
            app: None,
        }
    }

    /// New context with one feature slot set (or overwritten).
    #[must_use]
    pub fn with_feature(&self, feature: Feature, value: FeatureValue) -> Self {
        let mut features = self.features.clone();
        features.insert(feature, value);
        Self {
            features,
            time: self.time,
            app: self.app.clone(),
        }
    }
}

mod feature_map {
    use super::{Feature, FeatureValue};
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<Feature, FeatureValue>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(map.iter())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<Feature, FeatureValue>, D::Error> {
        let entries: Vec<(Feature, FeatureValue)> = Vec::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}
