pub mod actuator;
pub mod band;
pub mod calibrator;
pub mod clock;
pub mod config;
pub mod error;
pub mod gpio_input;
pub mod jog;
pub mod logging;
pub mod runner;
pub mod watchdog;

// Re-export commonly used types
pub use actuator::{Actuator, PumpActuator};
pub use band::Band;
pub use error::{AntennaError, Result};
pub use runner::{AntennaRunner, Command, Snapshot};

#[cfg(test)]
pub(crate) mod mocks;
