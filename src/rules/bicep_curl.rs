//! Bicep curl form rules.
//!
//! Thresholds are in 640x480 pixel space. Five rules, at least three of which
//! must pass. Reps follow the left wrist against the left elbow and open when
//! the wrist rises past the elbow; a rep closed on a failing frame is dropped.

use crate::{
    geometry::{depth_offset, horizontal_offset, joint_angle, vertical_offset},
    pose::{Landmark::*, Missing, Snapshot},
    reps::{Gating, RepCounter, StartEdge},
    rules::{Aggregation, Rule, RuleSet},
};

pub const NAME: &str = "Bicep Curl";

const MIN_ELBOW_ANGLE: f32 = 30.0;
const MAX_ELBOW_ANGLE: f32 = 160.0;
const MAX_SHOULDER_TILT: f32 = 15.0;
const MAX_UPPER_ARM_DRIFT: f32 = 40.0;
const MAX_SHOULDER_DEPTH_SKEW: f32 = 60.0;

pub const REP_THRESHOLD: f32 = 20.0;
pub const AGGREGATION: Aggregation = Aggregation::AtLeast(3);
pub const GATING: Gating = Gating::AdvanceWithoutCredit;

fn elbow_angle(snapshot: &Snapshot) -> Result<bool, Missing> {
    let left = joint_angle(
        snapshot.get(LeftShoulder)?,
        snapshot.get(LeftElbow)?,
        snapshot.get(LeftWrist)?,
    );
    let right = joint_angle(
        snapshot.get(RightShoulder)?,
        snapshot.get(RightElbow)?,
        snapshot.get(RightWrist)?,
    );
    let in_range = |angle: f32| MIN_ELBOW_ANGLE < angle && angle < MAX_ELBOW_ANGLE;
    Ok(in_range(left) && in_range(right))
}

fn wrist_below_elbow(snapshot: &Snapshot) -> Result<bool, Missing> {
    let left = vertical_offset(snapshot.get(LeftWrist)?, snapshot.get(LeftElbow)?);
    let right = vertical_offset(snapshot.get(RightWrist)?, snapshot.get(RightElbow)?);
    Ok(left > 0.0 && right > 0.0)
}

fn shoulder_stability(snapshot: &Snapshot) -> Result<bool, Missing> {
    let tilt = vertical_offset(snapshot.get(LeftShoulder)?, snapshot.get(RightShoulder)?);
    Ok(tilt.abs() < MAX_SHOULDER_TILT)
}

fn upper_arm_vertical(snapshot: &Snapshot) -> Result<bool, Missing> {
    let left = horizontal_offset(snapshot.get(LeftShoulder)?, snapshot.get(LeftElbow)?);
    let right = horizontal_offset(snapshot.get(RightShoulder)?, snapshot.get(RightElbow)?);
    Ok(left < MAX_UPPER_ARM_DRIFT && right < MAX_UPPER_ARM_DRIFT)
}

fn shoulders_square(snapshot: &Snapshot) -> Result<bool, Missing> {
    let skew = depth_offset(snapshot.depth(LeftShoulder)?, snapshot.depth(RightShoulder)?);
    Ok(skew.abs() < MAX_SHOULDER_DEPTH_SKEW)
}

pub static RULES: [Rule; 5] = [
    Rule {
        name: "elbow_angle",
        pass_message: "Elbow angle is correct.",
        fail_message: "Maintain elbows at ~90° during curl.",
        check: elbow_angle,
    },
    Rule {
        name: "wrist_below_elbow",
        pass_message: "Wrist position is correct.",
        fail_message: "Lower your wrists below elbows at bottom of curl.",
        check: wrist_below_elbow,
    },
    Rule {
        name: "shoulder_stability",
        pass_message: "Shoulders are stable.",
        fail_message: "Keep shoulders steady and level during movement.",
        check: shoulder_stability,
    },
    Rule {
        name: "upper_arm_vertical",
        pass_message: "Upper arms are vertical.",
        fail_message: "Keep your elbows pinned to your sides.",
        check: upper_arm_vertical,
    },
    Rule {
        name: "shoulders_square",
        pass_message: "Shoulders are square to the camera.",
        fail_message: "Don't roll a shoulder forward.",
        check: shoulders_square,
    },
];

pub fn rule_set() -> RuleSet {
    RuleSet::new(
        NAME,
        &RULES,
        AGGREGATION,
        RepCounter::new(LeftWrist, LeftElbow, REP_THRESHOLD)
            .with_start_edge(StartEdge::DownToUp)
            .with_gating(GATING),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        pose::{Landmark, Position},
        rules::{test_util::snapshot, Evaluate},
    };

    /// Arms hanging with the forearm angled forward, wrists 30px below the
    /// elbows.
    fn bottom() -> Snapshot {
        snapshot(&[
            (LeftShoulder, 200.0, 100.0),
            (LeftElbow, 200.0, 200.0),
            (LeftWrist, 260.0, 230.0),
            (RightShoulder, 400.0, 100.0),
            (RightElbow, 400.0, 200.0),
            (RightWrist, 340.0, 230.0),
        ])
    }

    /// Wrists curled 30px above the elbows.
    fn top() -> Snapshot {
        snapshot(&[
            (LeftShoulder, 200.0, 100.0),
            (LeftElbow, 200.0, 200.0),
            (LeftWrist, 240.0, 170.0),
            (RightShoulder, 400.0, 100.0),
            (RightElbow, 400.0, 200.0),
            (RightWrist, 360.0, 170.0),
        ])
    }

    fn verdict(snapshot: &Snapshot, name: &str) -> crate::rules::Verdict {
        let rule = RULES.iter().find(|rule| rule.name == name).unwrap();
        rule.verdict(snapshot)
    }

    mod rule_tests {
        use super::*;

        #[test]
        fn declared_order() {
            let names: Vec<_> = rule_set()
                .evaluate(&bottom())
                .verdicts
                .into_iter()
                .map(|v| v.rule)
                .collect();
            assert_eq!(
                names,
                vec![
                    "elbow_angle",
                    "wrist_below_elbow",
                    "shoulder_stability",
                    "upper_arm_vertical",
                    "shoulders_square",
                ]
            );
        }

        #[test]
        fn elbow_angle_range_is_exclusive() {
            assert!(verdict(&bottom(), "elbow_angle").passed);
            assert!(verdict(&top(), "elbow_angle").passed);

            let mut straight = bottom();
            straight.insert(LeftWrist, Position::new(200.0, 300.0).unwrap());
            let straight = verdict(&straight, "elbow_angle");
            assert!(!straight.passed);
            assert_eq!(straight.message, "Maintain elbows at ~90° during curl.");

            let mut folded = top();
            folded.insert(RightWrist, Position::new(399.0, 120.0).unwrap());
            assert!(!verdict(&folded, "elbow_angle").passed);
        }

        #[test]
        fn wrists_must_hang_below_elbows() {
            assert!(verdict(&bottom(), "wrist_below_elbow").passed);
            let top = verdict(&top(), "wrist_below_elbow");
            assert!(!top.passed);
            assert_eq!(
                top.message,
                "Lower your wrists below elbows at bottom of curl."
            );
        }

        #[test]
        fn shoulder_tilt_threshold() {
            let mut tilted = bottom();
            tilted.insert(RightShoulder, Position::new(400.0, 114.0).unwrap());
            assert!(verdict(&tilted, "shoulder_stability").passed);
            tilted.insert(RightShoulder, Position::new(400.0, 115.0).unwrap());
            assert!(!verdict(&tilted, "shoulder_stability").passed);
        }

        #[test]
        fn elbows_drifting_forward() {
            let mut drifted = bottom();
            drifted.insert(RightElbow, Position::new(440.0, 200.0).unwrap());
            assert!(!verdict(&drifted, "upper_arm_vertical").passed);
        }

        #[test]
        fn depth_required_for_shoulders_square() {
            let flat = verdict(&bottom(), "shoulders_square");
            assert!(!flat.passed);
            assert_eq!(flat.message, "Depth unavailable for keypoint: left_shoulder");

            let mut deep = bottom();
            deep.insert(LeftShoulder, Position::with_depth(200.0, 100.0, -20.0).unwrap());
            deep.insert(RightShoulder, Position::with_depth(400.0, 100.0, 10.0).unwrap());
            assert!(verdict(&deep, "shoulders_square").passed);

            deep.insert(RightShoulder, Position::with_depth(400.0, 100.0, 50.0).unwrap());
            assert!(!verdict(&deep, "shoulders_square").passed);
        }

        #[test]
        fn missing_wrist_is_local() {
            let mut frame = bottom();
            frame.remove(LeftWrist);
            let evaluation = rule_set().evaluate(&frame);
            let verdicts = evaluation.verdicts;
            assert!(!verdicts[0].passed);
            assert_eq!(verdicts[0].message, "Missing keypoint: left_wrist");
            assert!(!verdicts[1].passed);
            assert_eq!(verdicts[1].message, "Missing keypoint: left_wrist");
            assert!(verdicts[2].passed);
            assert!(verdicts[3].passed);
            assert!(!evaluation.overall_passed);
        }
    }

    mod session_tests {
        use super::*;

        /// Bottom position with the right shoulder lost by the detector.
        fn bottom_without_right_shoulder() -> Snapshot {
            let mut frame = bottom();
            frame.remove(Landmark::RightShoulder);
            frame
        }

        #[test]
        fn fresh_session() {
            let mut curl = rule_set();
            assert_eq!(curl.rep_count(), 0);
            assert_eq!(curl.evaluate(&bottom()).rep_count, 0);
        }

        #[test]
        fn full_cycle_credits_one_rep() {
            let mut curl = rule_set();
            let first = curl.evaluate(&bottom());
            assert!(first.overall_passed);
            assert_eq!(first.rep_count, 0);
            let second = curl.evaluate(&top());
            assert!(second.overall_passed);
            assert_eq!(second.rep_count, 0);
            let third = curl.evaluate(&bottom());
            assert!(third.overall_passed);
            assert_eq!(third.rep_count, 1);
        }

        #[test]
        fn failed_form_on_closing_frame() {
            let mut curl = rule_set();
            curl.evaluate(&bottom());
            curl.evaluate(&top());
            let third = curl.evaluate(&bottom_without_right_shoulder());
            assert!(!third.overall_passed);
            assert_eq!(third.rep_count, 0);
            assert_eq!(curl.evaluate(&bottom()).rep_count, 0);
        }

        #[test]
        fn verdicts_repeat_for_the_same_frame() {
            let mut curl = rule_set();
            let first = curl.evaluate(&top());
            let second = curl.evaluate(&top());
            assert_eq!(first.verdicts, second.verdicts);
            assert_eq!(first.overall_passed, second.overall_passed);
        }

        #[test]
        fn sessions_are_independent() {
            let mut first = rule_set();
            let mut second = rule_set();
            for frame in [bottom(), top(), bottom()] {
                first.evaluate(&frame);
            }
            assert_eq!(first.rep_count(), 1);
            assert_eq!(second.evaluate(&bottom()).rep_count, 0);
        }
    }
}
