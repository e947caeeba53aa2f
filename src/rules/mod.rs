use crate::{
    error::Error,
    pose::{Missing, Snapshot},
    reps::{Gating, Phase, RepCounter},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

pub mod bicep_curl;
pub mod lateral_raise;

/// A single geometric check against one frame.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub pass_message: &'static str,
    pub fail_message: &'static str,
    pub check: fn(&Snapshot) -> Result<bool, Missing>,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

impl Rule {
    /// Run the check. A missing landmark fails this rule only.
    pub fn verdict(&self, snapshot: &Snapshot) -> Verdict {
        match (self.check)(snapshot) {
            Ok(passed) => Verdict {
                rule: self.name,
                passed,
                message: if passed {
                    self.pass_message
                } else {
                    self.fail_message
                }
                .to_owned(),
            },
            Err(missing) => {
                debug!(message = "rule failed closed", rule = self.name, %missing);
                Verdict {
                    rule: self.name,
                    passed: false,
                    message: missing.to_string(),
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub rule: &'static str,
    pub passed: bool,
    pub message: String,
}

/// How per-rule verdicts combine into the frame verdict.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawAggregation")]
pub enum Aggregation {
    All,
    AtLeast(usize),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAggregation {
    Named(String),
    Threshold { at_least: usize },
}

impl TryFrom<RawAggregation> for Aggregation {
    type Error = Error;

    fn try_from(raw: RawAggregation) -> Result<Self, Self::Error> {
        match raw {
            RawAggregation::Named(name) if name.eq_ignore_ascii_case("all") => Ok(Self::All),
            RawAggregation::Named(name) => Err(Error::UnknownAggregation(name)),
            RawAggregation::Threshold { at_least } => Ok(Self::AtLeast(at_least)),
        }
    }
}

impl Aggregation {
    pub fn passes(self, verdicts: &[Verdict]) -> bool {
        let passed = verdicts.iter().filter(|v| v.passed).count();
        match self {
            Self::All => passed == verdicts.len(),
            Self::AtLeast(required) => passed >= required,
        }
    }

    /// Number of passing rules this policy needs out of `total`.
    pub fn required(self, total: usize) -> usize {
        match self {
            Self::All => total,
            Self::AtLeast(required) => required,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub verdicts: Vec<Verdict>,
    pub overall_passed: bool,
    pub rep_count: u32,
    pub phase: Phase,
}

/// Per-exercise form checking over a stream of frames.
pub trait Evaluate {
    fn name(&self) -> &'static str;

    /// Consume one frame. Verdicts depend only on the snapshot; the rep count
    /// depends on every frame seen so far.
    fn evaluate(&mut self, snapshot: &Snapshot) -> Evaluation;

    fn rep_count(&self) -> u32;
}

/// Rules, their aggregation policy, and the repetition state of one session.
#[derive(Debug, Clone)]
pub struct RuleSet {
    name: &'static str,
    rules: &'static [Rule],
    aggregation: Aggregation,
    counter: RepCounter,
}

impl RuleSet {
    pub fn new(
        name: &'static str,
        rules: &'static [Rule],
        aggregation: Aggregation,
        counter: RepCounter,
    ) -> Self {
        Self {
            name,
            rules,
            aggregation,
            counter,
        }
    }

    pub fn rules(&self) -> &'static [Rule] {
        self.rules
    }

    pub fn aggregation(&self) -> Aggregation {
        self.aggregation
    }

    pub fn counter(&self) -> &RepCounter {
        &self.counter
    }

    pub fn with_aggregation(self, aggregation: Aggregation) -> Self {
        Self {
            aggregation,
            ..self
        }
    }

    pub fn with_gating(self, gating: Gating) -> Self {
        Self {
            counter: self.counter.with_gating(gating),
            ..self
        }
    }
}

impl Evaluate for RuleSet {
    fn name(&self) -> &'static str {
        self.name
    }

    fn evaluate(&mut self, snapshot: &Snapshot) -> Evaluation {
        let verdicts: Vec<_> = self.rules.iter().map(|rule| rule.verdict(snapshot)).collect();
        let overall_passed = self.aggregation.passes(&verdicts);
        let rep_count = self.counter.advance(snapshot, overall_passed);
        Evaluation {
            verdicts,
            overall_passed,
            rep_count,
            phase: self.counter.phase(),
        }
    }

    fn rep_count(&self) -> u32 {
        self.counter.rep_count()
    }
}
