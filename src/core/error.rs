use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Unit not found: {0:?}")]
    UnitNotFound(crate::core::types::UnitId),

    #[error("Unit {unit:?} is not a {expected}")]
    WrongUnitKind {
        unit: crate::core::types::UnitId,
        expected: &'static str,
    },

    #[error("Invalid spawn at ({x}, {y}): {reason}")]
    InvalidSpawn { x: i32, y: i32, reason: String },

    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
