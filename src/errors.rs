use bevy::math::DVec3;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NavError {
    // Config-related errors
    #[error("Failed to get config directory")]
    ConfigDirNotFound,

    #[error("Config I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize config: {0}")]
    SerializationFailed(#[from] toml::ser::Error),

    #[error("Failed to deserialize config: {0}")]
    DeserializationFailed(#[from] toml::de::Error),

    #[error("Config file not found at path: {path}")]
    ConfigFileNotFound { path: PathBuf },

    #[error("Invalid pathfinding config: {reason}")]
    InvalidConfig { reason: String },

    // World-related errors
    #[error("Invalid terrain: {reason}")]
    InvalidTerrain { reason: String },

    #[error("Invalid obstacle at {position:?}: {reason}")]
    InvalidObstacle { position: DVec3, reason: String },

    #[error("Cannot generate a navigation graph with {node_count} nodes (need at least 2)")]
    TooFewNodes { node_count: usize },

    // Command-line errors
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },
}

/// Result type alias for fallible setup operations
pub type NavResult<T> = Result<T, NavError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nav_error_display() {
        let err = NavError::TooFewNodes { node_count: 1 };
        assert!(err.to_string().contains("1 nodes"));

        let err = NavError::ConfigDirNotFound;
        assert_eq!(err.to_string(), "Failed to get config directory");

        let err = NavError::InvalidObstacle {
            position: DVec3::ZERO,
            reason: "radius must be positive".to_string(),
        };
        assert!(err.to_string().contains("radius must be positive"));
    }
}
