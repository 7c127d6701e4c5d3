// This file is only compiled during tests

use crate::actuator::{Actuator, ActuatorOutputs, clamp_duty_cycle};
use crate::error::{AntennaError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Direction(bool),
    DutyCycle(f64),
    Trigger(bool),
}

/// Actuator that records every accepted command.
pub struct RecordingActuator {
    pub commands: Vec<Command>,
    pub fail: bool,
    /// Fail only the ATU output.
    pub fail_trigger: bool,
    last: ActuatorOutputs,
}

impl RecordingActuator {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            fail: false,
            fail_trigger: false,
            last: ActuatorOutputs::SAFE_IDLE,
        }
    }

    /// Number of off -> on transitions of the ATU output.
    pub fn trigger_edges(&self) -> usize {
        let mut on = false;
        let mut edges = 0;
        for command in &self.commands {
            if let Command::Trigger(level) = command {
                if *level && !on {
                    edges += 1;
                }
                on = *level;
            }
        }
        edges
    }

    fn accept(&mut self, command: Command) -> Result<()> {
        if self.fail || (self.fail_trigger && matches!(command, Command::Trigger(_))) {
            return Err(AntennaError::ActuatorUnavailable("recording actuator offline".into()));
        }
        self.commands.push(command);
        Ok(())
    }
}

impl Actuator for RecordingActuator {
    fn set_direction(&mut self, forward: bool) -> Result<()> {
        self.accept(Command::Direction(forward))?;
        self.last.forward = forward;
        Ok(())
    }

    fn set_duty_cycle(&mut self, duty_cycle: f64) -> Result<()> {
        let clamped = clamp_duty_cycle(duty_cycle);
        self.accept(Command::DutyCycle(clamped))?;
        self.last.duty_cycle = clamped;
        Ok(())
    }

    fn set_trigger(&mut self, on: bool) -> Result<()> {
        self.accept(Command::Trigger(on))?;
        self.last.trigger = on;
        Ok(())
    }

    fn last_commanded(&self) -> ActuatorOutputs {
        self.last
    }
}
