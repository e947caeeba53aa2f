
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to construct NotNan from f32: {1}")]
    ConstructNotNan(#[source] ordered_float::FloatIsNan, f32),

    #[error("failed to convert usize value to landmark: {0}")]
    ConvertIndexToLandmark(usize),

    #[error("unknown landmark name: {0:?}")]
    UnknownLandmark(String),

    #[error("position must have between 2 and 4 components, got {0}")]
    PositionArity(usize),

    #[error("unknown aggregation policy: {0:?}, expected `all` or `at_least: N`")]
    UnknownAggregation(String),

    #[error("no rule set registered for exercise: {0:?}")]
    UnknownExercise(String),

    #[error("exercise {exercise:?} requires {required} passing rules, expected between 1 and {available}")]
    InvalidThreshold {
        exercise: String,
        required: usize,
        available: usize,
    },

    #[error("failed to read config file: {1:?}")]
    ReadConfig(#[source] std::io::Error, std::path::PathBuf),

    #[error("failed to parse config file: {1:?}")]
    ParseConfig(#[source] serde_yaml::Error, std::path::PathBuf),

    #[error("failed to read frame at line {line}")]
    ReadFrame {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse frame at line {line}")]
    ParseFrame {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}
