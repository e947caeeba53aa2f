use crate::{
    config::Config,
    error::Error,
    reps::Gating,
    rules::{bicep_curl, lateral_raise, Aggregation, RuleSet},
};
use std::{fmt, str::FromStr};
use tracing::warn;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExerciseKind {
    BicepCurl,
    LateralRaise,
}

impl ExerciseKind {
    pub const ALL: [ExerciseKind; 2] = [Self::BicepCurl, Self::LateralRaise];

    pub fn label(self) -> &'static str {
        match self {
            Self::BicepCurl => bicep_curl::NAME,
            Self::LateralRaise => lateral_raise::NAME,
        }
    }

    /// Construct a fresh rule set with the exercise's default policies.
    pub fn rule_set(self) -> RuleSet {
        match self {
            Self::BicepCurl => bicep_curl::rule_set(),
            Self::LateralRaise => lateral_raise::rule_set(),
        }
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExerciseKind {
    type Err = Error;

    /// Accepts the display label as well as kebab- and snake-case spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| if c == '-' || c == '_' { ' ' } else { c })
            .collect();
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.label().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| Error::UnknownExercise(s.to_owned()))
    }
}

/// An exercise kind plus any policy overrides from configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ExerciseProfile {
    pub kind: ExerciseKind,
    pub aggregation: Option<Aggregation>,
    pub gating: Option<Gating>,
}

impl ExerciseProfile {
    pub fn new(kind: ExerciseKind) -> Self {
        Self {
            kind,
            aggregation: None,
            gating: None,
        }
    }

    pub fn build(&self) -> RuleSet {
        let mut rule_set = self.kind.rule_set();
        if let Some(aggregation) = self.aggregation {
            rule_set = rule_set.with_aggregation(aggregation);
        }
        if let Some(gating) = self.gating {
            rule_set = rule_set.with_gating(gating);
        }
        rule_set
    }
}

/// Maps exercise labels to constructors. Every lookup builds a new rule set,
/// so sessions never share repetition state.
#[derive(Debug, Clone, PartialEq)]
pub struct Registry {
    profiles: Vec<ExerciseProfile>,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            profiles: ExerciseKind::ALL
                .iter()
                .copied()
                .map(ExerciseProfile::new)
                .collect(),
        }
    }
}

impl Registry {
    /// Exercises without a rule set, and repeats of an exercise already
    /// listed, are skipped with a warning.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let mut profiles = Vec::with_capacity(config.exercises.len());
        for entry in &config.exercises {
            let kind = match entry.name().parse::<ExerciseKind>() {
                Ok(kind) => kind,
                Err(_) => {
                    warn!(
                        message = "no rule set found for exercise, skipping",
                        exercise = entry.name()
                    );
                    continue;
                }
            };

            if profiles.iter().any(|profile: &ExerciseProfile| profile.kind == kind) {
                warn!(
                    message = "exercise listed more than once, keeping the first entry",
                    exercise = entry.name()
                );
                continue;
            }

            let profile = ExerciseProfile {
                kind,
                aggregation: entry.aggregation(),
                gating: entry.gating(),
            };

            if let Some(aggregation) = profile.aggregation {
                let available = kind.rule_set().rules().len();
                let required = aggregation.required(available);
                if required == 0 || required > available {
                    return Err(Error::InvalidThreshold {
                        exercise: kind.label().to_owned(),
                        required,
                        available,
                    });
                }
            }

            profiles.push(profile);
        }
        Ok(Self { profiles })
    }

    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.profiles.iter().map(|profile| profile.kind.label())
    }

    pub fn profile(&self, label: &str) -> Result<&ExerciseProfile, Error> {
        let kind = label.parse::<ExerciseKind>()?;
        self.profiles
            .iter()
            .find(|profile| profile.kind == kind)
            .ok_or_else(|| Error::UnknownExercise(label.to_owned()))
    }

    pub fn build(&self, label: &str) -> Result<RuleSet, Error> {
        Ok(self.profile(label)?.build())
    }
}
