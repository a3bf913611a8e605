//! Error types for the simulation core

use thiserror::Error;

/// Failures surfaced by the simulation core.
///
/// Removing a particle or task that is not registered is not an error: those
/// calls are no-ops that report `false`.
#[derive(Debug, Error)]
pub enum SimError {
    /// A zero divisor: coincident members of an interaction group, a zero
    /// mass, or an explicit `Vec2::divide` by zero. Fatal for the tick.
    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Failed to read config file: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("Failed to parse config TOML: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
