//! Lateral raise form rules.
//!
//! Four rules, at least three of which must pass. Reps follow the left wrist
//! against the left shoulder. Frames with failing form are ignored by the
//! counter, so a sloppy raise cannot move the phase.

use crate::{
    geometry::{segment_asymmetry, vertical_offset},
    pose::{Landmark::*, Missing, Snapshot},
    reps::{Gating, RepCounter, StartEdge},
    rules::{Aggregation, Rule, RuleSet},
};

pub const NAME: &str = "Lateral Raise";

const MAX_ARM_DROP: f32 = 30.0;
const MAX_SEGMENT_ASYMMETRY: f32 = 20.0;
const MAX_SHOULDER_TILT: f32 = 20.0;
const MAX_LIFT_ASYMMETRY: f32 = 20.0;

pub const REP_THRESHOLD: f32 = 30.0;
pub const AGGREGATION: Aggregation = Aggregation::AtLeast(3);
pub const GATING: Gating = Gating::Freeze;

fn arm_parallel_to_ground(snapshot: &Snapshot) -> Result<bool, Missing> {
    let left = vertical_offset(snapshot.get(LeftShoulder)?, snapshot.get(LeftWrist)?);
    let right = vertical_offset(snapshot.get(RightShoulder)?, snapshot.get(RightWrist)?);
    Ok(left.abs() < MAX_ARM_DROP && right.abs() < MAX_ARM_DROP)
}

// A bent elbow shortens the shoulder-to-wrist chain unevenly.
fn elbow_straight(snapshot: &Snapshot) -> Result<bool, Missing> {
    let left = segment_asymmetry(
        snapshot.get(LeftShoulder)?,
        snapshot.get(LeftElbow)?,
        snapshot.get(LeftWrist)?,
    );
    let right = segment_asymmetry(
        snapshot.get(RightShoulder)?,
        snapshot.get(RightElbow)?,
        snapshot.get(RightWrist)?,
    );
    Ok(left < MAX_SEGMENT_ASYMMETRY && right < MAX_SEGMENT_ASYMMETRY)
}

fn shoulders_aligned_during_raise(snapshot: &Snapshot) -> Result<bool, Missing> {
    let tilt = vertical_offset(snapshot.get(LeftShoulder)?, snapshot.get(RightShoulder)?);
    Ok(tilt.abs() < MAX_SHOULDER_TILT)
}

fn arm_symmetric_lift(snapshot: &Snapshot) -> Result<bool, Missing> {
    let diff = vertical_offset(snapshot.get(LeftWrist)?, snapshot.get(RightWrist)?);
    Ok(diff.abs() < MAX_LIFT_ASYMMETRY)
}

pub static RULES: [Rule; 4] = [
    Rule {
        name: "arm_parallel_to_ground",
        pass_message: "Arms are roughly parallel to the ground.",
        fail_message: "Raise your arms to shoulder level.",
        check: arm_parallel_to_ground,
    },
    Rule {
        name: "elbow_straight",
        pass_message: "Elbows are straight.",
        fail_message: "Try to straighten your elbows.",
        check: elbow_straight,
    },
    Rule {
        name: "shoulders_aligned_during_raise",
        pass_message: "Shoulders are level.",
        fail_message: "Keep your shoulders level.",
        check: shoulders_aligned_during_raise,
    },
    Rule {
        name: "arm_symmetric_lift",
        pass_message: "Both arms lifting symmetrically.",
        fail_message: "Raise both arms equally.",
        check: arm_symmetric_lift,
    },
];

pub fn rule_set() -> RuleSet {
    RuleSet::new(
        NAME,
        &RULES,
        AGGREGATION,
        RepCounter::new(LeftWrist, LeftShoulder, REP_THRESHOLD)
            .with_start_edge(StartEdge::DownToUp)
            .with_gating(GATING),
    )
}
