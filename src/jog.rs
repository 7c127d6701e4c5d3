use std::fmt;

use tracing::debug;

use crate::actuator::Actuator;
use crate::band::instantaneous_frequency;
use crate::config::{ATU_WATCHDOG_TICKS, HOSE_FULL_LENGTH_M, JOG_DUTY_CYCLE, JOG_STEP};
use crate::error::Result;
use crate::watchdog::AtuWatchdog;

/// What the pump is doing this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpDirection {
    Idle,
    Extending,
    Retracting,
}

impl fmt::Display for PumpDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PumpDirection::Idle => "Idle",
            PumpDirection::Extending => "Extending",
            PumpDirection::Retracting => "Retracting",
        };
        write!(f, "{}", name)
    }
}

/// Momentary inputs sampled once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JogButtons {
    pub extend: bool,
    pub retract: bool,
    /// True only on the tick a tune was requested.
    pub tune: bool,
}

/// Hose extension as driven by the jog buttons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtensionState {
    /// Normalized extension, 0 = empty hose, 1 = full length.
    pub squirt: f64,
    pub direction: PumpDirection,
    /// Always 0 while idle.
    pub duty_cycle: f64,
}

/// Manual jog control of the water column.
#[derive(Debug, Clone, PartialEq)]
pub struct JogController {
    extension: ExtensionState,
    watchdog: AtuWatchdog,
}

impl JogController {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self::with_watchdog_ticks(ATU_WATCHDOG_TICKS)
    }

    pub fn with_watchdog_ticks(timeout_ticks: u32) -> Self {
        Self {
            extension: ExtensionState {
                squirt: 0.0,
                direction: PumpDirection::Idle,
                duty_cycle: 0.0,
            },
            watchdog: AtuWatchdog::new(timeout_ticks),
        }
    }

    pub fn extension(&self) -> ExtensionState {
        self.extension
    }

    pub fn watchdog(&self) -> &AtuWatchdog {
        &self.watchdog
    }

    /// Approximate water length in meters.
    pub fn length_m(&self) -> f64 {
        self.extension.squirt * HOSE_FULL_LENGTH_M
    }

    /// Frequency the current length is tuned for, in MHz.
    pub fn frequency_mhz(&self) -> f64 {
        instantaneous_frequency(self.length_m())
    }

    /// Run one control pass.
    ///
    /// The pump is commanded before the ATU so a stuck ATU line cannot keep
    /// the pump running. Both are attempted; the first failure is returned.
    pub fn tick<A: Actuator>(&mut self, buttons: JogButtons, actuator: &mut A) -> Result<()> {
        let pump = self.drive_pump(buttons, actuator);
        let atu = if buttons.tune {
            self.watchdog.trigger(actuator)
        } else {
            self.watchdog.tick(actuator)
        };
        pump.and(atu)
    }

    fn drive_pump<A: Actuator>(&mut self, buttons: JogButtons, actuator: &mut A) -> Result<()> {
        let previous = self.extension.direction;
        let squirt = self.extension.squirt;

        if buttons.extend && squirt < 1.0 {
            actuator.set_direction(true)?;
            actuator.set_duty_cycle(JOG_DUTY_CYCLE)?;
            self.extension = ExtensionState {
                squirt: (squirt + JOG_STEP).min(1.0),
                direction: PumpDirection::Extending,
                duty_cycle: JOG_DUTY_CYCLE,
            };
        } else if buttons.retract && squirt > 0.0 {
            actuator.set_direction(false)?;
            actuator.set_duty_cycle(JOG_DUTY_CYCLE)?;
            self.extension = ExtensionState {
                squirt: (squirt - JOG_STEP).max(0.0),
                direction: PumpDirection::Retracting,
                duty_cycle: JOG_DUTY_CYCLE,
            };
        } else {
            actuator.set_duty_cycle(0.0)?;
            // Direction stays forward at idle, see Actuator::safe_idle.
            actuator.set_direction(true)?;
            self.extension.direction = PumpDirection::Idle;
            self.extension.duty_cycle = 0.0;
        }

        if previous != self.extension.direction {
            debug!(
                from = %previous,
                to = %self.extension.direction,
                squirt = self.extension.squirt,
                "pump direction changed"
            );
        }
        Ok(())
    }
}
