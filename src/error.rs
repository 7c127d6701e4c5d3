use thiserror::Error;

/// Errors raised by the antenna control core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AntennaError {
    /// Operator frequency is non-numeric, non-positive or outside the HF range.
    #[error("invalid frequency: {0}")]
    InvalidFrequency(String),

    /// A band outside the fixed band table. The mapping table is broken if this is seen.
    #[error("unknown band: {0} m")]
    UnknownBand(u32),

    /// The pump or ATU output could not be commanded.
    #[error("actuator unavailable: {0}")]
    ActuatorUnavailable(String),
}

pub type Result<T> = std::result::Result<T, AntennaError>;
