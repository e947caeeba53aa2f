use crate::error::Error;
use num_traits::FromPrimitive;
use ordered_float::NotNan;
use serde::Deserialize;
use std::{collections::HashMap, fmt, str::FromStr};
use tracing::warn;

/// Body landmarks in the order the pose detector reports them.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, num_derive::FromPrimitive)]
pub enum Landmark {
    Nose = 0,
    LeftEyeInner,
    LeftEye,
    LeftEyeOuter,
    RightEyeInner,
    RightEye,
    RightEyeOuter,
    LeftEar,
    RightEar,
    MouthLeft,
    MouthRight,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftPinky,
    RightPinky,
    LeftIndex,
    RightIndex,
    LeftThumb,
    RightThumb,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

pub const NUM_LANDMARKS: usize = 33;

const NAMES: [&str; NUM_LANDMARKS] = [
    "nose",
    "left_eye_inner",
    "left_eye",
    "left_eye_outer",
    "right_eye_inner",
    "right_eye",
    "right_eye_outer",
    "left_ear",
    "right_ear",
    "mouth_left",
    "mouth_right",
    "left_shoulder",
    "right_shoulder",
    "left_elbow",
    "right_elbow",
    "left_wrist",
    "right_wrist",
    "left_pinky",
    "right_pinky",
    "left_index",
    "right_index",
    "left_thumb",
    "right_thumb",
    "left_hip",
    "right_hip",
    "left_knee",
    "right_knee",
    "left_ankle",
    "right_ankle",
    "left_heel",
    "right_heel",
    "left_foot_index",
    "right_foot_index",
];

impl Landmark {
    pub fn from_index(index: usize) -> Result<Self, Error> {
        Self::from_usize(index).ok_or(Error::ConvertIndexToLandmark(index))
    }

    pub fn name(self) -> &'static str {
        NAMES[self as usize]
    }
}

impl fmt::Display for Landmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Landmark {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(index) = trimmed.parse::<usize>() {
            return Self::from_index(index);
        }
        NAMES
            .iter()
            .position(|name| name.eq_ignore_ascii_case(trimmed))
            .and_then(Self::from_usize)
            .ok_or_else(|| Error::UnknownLandmark(s.to_owned()))
    }
}

/// A required landmark (or one of its components) was not in the snapshot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Missing {
    #[error("Missing keypoint: {0}")]
    Landmark(Landmark),

    #[error("Depth unavailable for keypoint: {0}")]
    Depth(Landmark),
}

fn not_nan(value: f32) -> Result<f32, Error> {
    Ok(NotNan::new(value)
        .map_err(|e| Error::ConstructNotNan(e, value))?
        .into_inner())
}

#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawPosition")]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: Option<f32>,
    pub visibility: Option<f32>,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Result<Self, Error> {
        Ok(Self {
            x: not_nan(x)?,
            y: not_nan(y)?,
            z: None,
            visibility: None,
        })
    }

    pub fn with_depth(x: f32, y: f32, z: f32) -> Result<Self, Error> {
        Ok(Self {
            z: Some(not_nan(z)?),
            ..Self::new(x, y)?
        })
    }

    pub fn visibility(self, visibility: f32) -> Result<Self, Error> {
        Ok(Self {
            visibility: Some(not_nan(visibility)?),
            ..self
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPosition {
    Components(Vec<f32>),
    Fields {
        x: f32,
        y: f32,
        z: Option<f32>,
        visibility: Option<f32>,
    },
}

impl TryFrom<RawPosition> for Position {
    type Error = Error;

    fn try_from(raw: RawPosition) -> Result<Self, Self::Error> {
        let (x, y, z, visibility) = match raw {
            RawPosition::Components(components) => match components.as_slice() {
                &[x, y] => (x, y, None, None),
                &[x, y, z] => (x, y, Some(z), None),
                &[x, y, z, visibility] => (x, y, Some(z), Some(visibility)),
                other => return Err(Error::PositionArity(other.len())),
            },
            RawPosition::Fields {
                x,
                y,
                z,
                visibility,
            } => (x, y, z, visibility),
        };
        let position = match z {
            Some(z) => Self::with_depth(x, y, z)?,
            None => Self::new(x, y)?,
        };
        match visibility {
            Some(visibility) => position.visibility(visibility),
            None => Ok(position),
        }
    }
}

/// The landmarks detected in one frame.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "HashMap<String, Position>")]
pub struct Snapshot {
    positions: HashMap<Landmark, Position>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, landmark: Landmark, position: Position) -> Option<Position> {
        self.positions.insert(landmark, position)
    }

    pub fn remove(&mut self, landmark: Landmark) -> Option<Position> {
        self.positions.remove(&landmark)
    }

    pub fn get(&self, landmark: Landmark) -> Result<Position, Missing> {
        self.positions
            .get(&landmark)
            .copied()
            .ok_or(Missing::Landmark(landmark))
    }

    pub fn depth(&self, landmark: Landmark) -> Result<f32, Missing> {
        self.get(landmark)?.z.ok_or(Missing::Depth(landmark))
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Map normalized detector coordinates into pixel space, truncating to
    /// whole pixels. Depth shares the horizontal scale.
    pub fn scaled(&self, width: u16, height: u16) -> Self {
        let width = f32::from(width);
        let height = f32::from(height);
        self.positions
            .iter()
            .map(|(&landmark, &position)| {
                (
                    landmark,
                    Position {
                        x: (position.x * width).trunc(),
                        y: (position.y * height).trunc(),
                        z: position.z.map(|z| (z * width).trunc()),
                        ..position
                    },
                )
            })
            .collect()
    }

    /// Drop landmarks the detector reported with visibility below `min`.
    /// Landmarks without a visibility score are kept.
    pub fn with_min_visibility(&self, min: f32) -> Self {
        self.positions
            .iter()
            .filter(|(_, position)| position.visibility.map_or(true, |v| v >= min))
            .map(|(&landmark, &position)| (landmark, position))
            .collect()
    }
}

impl FromIterator<(Landmark, Position)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (Landmark, Position)>>(iter: I) -> Self {
        Self {
            positions: iter.into_iter().collect(),
        }
    }
}

/// Keys naming no known landmark are dropped so that detectors reporting
/// extra points still yield usable frames.
impl From<HashMap<String, Position>> for Snapshot {
    fn from(named: HashMap<String, Position>) -> Self {
        named
            .into_iter()
            .filter_map(|(name, position)| match name.parse::<Landmark>() {
                Ok(landmark) => Some((landmark, position)),
                Err(e) => {
                    warn!(message = "ignoring landmark", key = %name, error = %e);
                    None
                }
            })
            .collect()
    }
}
