use crate::{error::Error, reps::Gating, rules::Aggregation};
use serde::{
    de::{self, MapAccess, Visitor},
    Deserialize, Deserializer,
};
use std::{fmt, path::Path};

/// Exercise selection, read from YAML:
///
/// ```yaml
/// exercises:
///   - Bicep Curl
///   - name: Lateral Raise
///     aggregation: { at_least: 4 }
///     gating: advance_without_credit
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub exercises: Vec<ExerciseEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExerciseEntry {
    Name(String),
    Detailed(DetailedEntry),
}

/// An exercise with policy overrides. Unrecognised keys are rejected.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetailedEntry {
    pub name: String,
    #[serde(default)]
    pub aggregation: Option<Aggregation>,
    #[serde(default)]
    pub gating: Option<Gating>,
}

struct EntryVisitor;

impl<'de> Visitor<'de> for EntryVisitor {
    type Value = ExerciseEntry;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an exercise name or a map with `name` and optional overrides")
    }

    fn visit_str<E>(self, name: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(ExerciseEntry::Name(name.to_owned()))
    }

    fn visit_map<A>(self, map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        DetailedEntry::deserialize(de::value::MapAccessDeserializer::new(map))
            .map(ExerciseEntry::Detailed)
    }
}

// Dispatching by hand keeps the detailed entry's own errors, which an
// untagged enum would replace with a generic mismatch.
impl<'de> Deserialize<'de> for ExerciseEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(EntryVisitor)
    }
}

impl ExerciseEntry {
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Detailed(entry) => &entry.name,
        }
    }

    pub fn aggregation(&self) -> Option<Aggregation> {
        match self {
            Self::Name(_) => None,
            Self::Detailed(entry) => entry.aggregation,
        }
    }

    pub fn gating(&self) -> Option<Gating> {
        match self {
            Self::Name(_) => None,
            Self::Detailed(entry) => entry.gating,
        }
    }
}

impl Config {
    pub fn load<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).map_err(|e| Error::ReadConfig(e, path.to_owned()))?;
        serde_yaml::from_str(&text).map_err(|e| Error::ParseConfig(e, path.to_owned()))
    }
}
