use tracing::{debug, info};

use crate::actuator::Actuator;
use crate::error::Result;

/// Self-expiring ATU tune pulse.
///
/// A tune request raises the ATU line and restarts the count. Each control
/// tick without a request advances the count; once it reaches the timeout the
/// line is released and the count holds there. The count is in control ticks,
/// so the pulse length depends on the loop rate.
#[derive(Debug, Clone, PartialEq)]
pub struct AtuWatchdog {
    armed: bool,
    ticks_since_trigger: u32,
    timeout_ticks: u32,
}

impl AtuWatchdog {
    /// Create a disarmed watchdog. The count starts expired.
    pub fn new(timeout_ticks: u32) -> Self {
        Self {
            armed: false,
            ticks_since_trigger: timeout_ticks,
            timeout_ticks,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn ticks_since_trigger(&self) -> u32 {
        self.ticks_since_trigger
    }

    /// Raise the ATU line, or renew the pulse if it is already up.
    pub fn trigger<A: Actuator>(&mut self, actuator: &mut A) -> Result<()> {
        if self.armed {
            debug!(
                ticks_since_trigger = self.ticks_since_trigger,
                "ATU pulse renewed"
            );
        } else {
            actuator.set_trigger(true)?;
            self.armed = true;
            info!("ATU tune triggered");
        }
        self.ticks_since_trigger = 0;
        Ok(())
    }

    /// Advance one control tick without a tune request.
    pub fn tick<A: Actuator>(&mut self, actuator: &mut A) -> Result<()> {
        if self.ticks_since_trigger < self.timeout_ticks {
            self.ticks_since_trigger += 1;
        }

        if self.armed && self.ticks_since_trigger >= self.timeout_ticks {
            actuator.set_trigger(false)?;
            self.armed = false;
            info!(ticks = self.timeout_ticks, "ATU pulse expired");
        }
        Ok(())
    }

    /// Drop the pulse immediately, e.g. on shutdown.
    pub fn disarm<A: Actuator>(&mut self, actuator: &mut A) -> Result<()> {
        actuator.set_trigger(false)?;
        self.armed = false;
        self.ticks_since_trigger = self.timeout_ticks;
        Ok(())
    }
}
