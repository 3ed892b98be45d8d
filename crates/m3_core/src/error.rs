use std::fmt;

#[derive(Debug)]
pub enum SimError {
    InvalidDimensions { width: i32, height: i32 },
    InvalidColorCount(u8),
    LayerLengthMismatch { layer: &'static str, expected: usize, found: usize },
    InvalidCellValue { layer: &'static str, index: usize, value: i32 },
    TooManyObjectives(usize),
    InvalidObjective(String),
    SerializationError(String),
    DeserializationError(String),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SimError::InvalidDimensions { width, height } => {
                write!(f, "Invalid board dimensions: {}x{}", width, height)
            }
            SimError::InvalidColorCount(count) => {
                write!(f, "Invalid color count: {} (expected 3..=8)", count)
            }
            SimError::LayerLengthMismatch { layer, expected, found } => {
                write!(f, "Layer '{}' length mismatch: expected {}, found {}", layer, expected, found)
            }
            SimError::InvalidCellValue { layer, index, value } => {
                write!(f, "Invalid value {} in layer '{}' at index {}", value, layer, index)
            }
            SimError::TooManyObjectives(count) => {
                write!(f, "Too many objectives: {} (at most 4)", count)
            }
            SimError::InvalidObjective(msg) => {
                write!(f, "Invalid objective: {}", msg)
            }
            SimError::SerializationError(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
            SimError::DeserializationError(msg) => {
                write!(f, "Deserialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for SimError {}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() {
            SimError::DeserializationError(err.to_string())
        } else {
            SimError::SerializationError(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
