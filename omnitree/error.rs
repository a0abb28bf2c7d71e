/// Omnitree 错误类型
#[derive(Debug, thiserror::Error)]
pub enum OmnitreeError {
    #[error("Invalid dimension count {dimensions}: must be between 1 and {}", super::MAX_DIMENSIONS)]
    InvalidDimensions { dimensions: usize },
    #[error("Min bounds have {min} axes but max bounds have {max}")]
    BoundsLengthMismatch { min: usize, max: usize },
    #[error("Invalid bounds on axis {axis}: min is greater than max")]
    InvalidBounds { axis: usize },
    #[error("Invalid average function: average of min/max on axis {axis} lies outside the bounds")]
    InvalidAverage { axis: usize },
    #[error("Coordinate has {actual} axes, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("Item is out of the tree bounds")]
    OutOfBounds,
    #[error("Item not found")]
    NotFound,
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
