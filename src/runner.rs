use tracing::{debug, error, info, warn};

use crate::actuator::Actuator;
use crate::band::{Band, instantaneous_frequency};
use crate::calibrator::{BandCalibrator, CalibrationState};
use crate::clock::Clock;
use crate::error::{AntennaError, Result};
use crate::jog::{JogButtons, JogController, PumpDirection};

/// The control strategy currently allowed to drive the actuator.
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    Jog(JogController),
    Calibration(BandCalibrator),
}

/// Discrete operator actions for the calibrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Char(char),
    Backspace,
    ConfirmFrequency,
    BeginCalibration,
    Reset,
}

/// Read-only view of the active strategy after a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    Jog {
        squirt: f64,
        direction: PumpDirection,
        duty_cycle: f64,
        length_m: f64,
        frequency_mhz: f64,
        atu_armed: bool,
    },
    Calibration {
        state: CalibrationState,
        progress: f64,
        duty_cycle: f64,
        band: Band,
        length_m: f64,
        /// Quarter-wave frequency of the band's length.
        frequency_mhz: f64,
        target_frequency_mhz: f64,
        atu_armed: bool,
        input_text: String,
    },
}

/// Owns the actuator and the clock and lends them to one strategy at a time.
pub struct AntennaRunner<A: Actuator, C: Clock> {
    actuator: A,
    clock: C,
    strategy: Strategy,
}

impl<A: Actuator, C: Clock> AntennaRunner<A, C> {
    pub fn new(actuator: A, clock: C, strategy: Strategy) -> Self {
        Self {
            actuator,
            clock,
            strategy,
        }
    }

    pub fn jog(actuator: A, clock: C) -> Self {
        Self::new(actuator, clock, Strategy::Jog(JogController::new()))
    }

    pub fn calibration(actuator: A, clock: C) -> Self {
        Self::new(
            actuator,
            clock,
            Strategy::Calibration(BandCalibrator::new()),
        )
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    /// One control pass. `buttons` only matter to the jog strategy.
    pub fn tick(&mut self, buttons: JogButtons) -> Result<Snapshot> {
        let now_ms = self.clock.now_ms();

        let result = match &mut self.strategy {
            Strategy::Jog(jog) => jog.tick(buttons, &mut self.actuator),
            Strategy::Calibration(calibrator) => calibrator.tick(now_ms, &mut self.actuator),
        };
        if let Err(err) = result {
            error!(%err, now_ms, "control tick failed");
            return Err(err);
        }

        Ok(self.snapshot())
    }

    /// Apply an operator action. Rejected frequencies are logged and dropped.
    pub fn handle(&mut self, command: Command) -> Result<()> {
        let Strategy::Calibration(calibrator) = &mut self.strategy else {
            debug!(?command, "no calibrator active, command ignored");
            return Ok(());
        };

        let result = match command {
            Command::Char(c) => {
                calibrator.push_char(c);
                Ok(())
            }
            Command::Backspace => {
                calibrator.backspace();
                Ok(())
            }
            Command::ConfirmFrequency => calibrator.confirm_frequency().map(|_| ()),
            Command::BeginCalibration => calibrator.begin_calibration(&mut self.actuator),
            Command::Reset => calibrator.reset(&mut self.actuator),
        };

        match result {
            Err(AntennaError::InvalidFrequency(reason)) => {
                warn!(%reason, "input rejected");
                Ok(())
            }
            Err(err) => {
                error!(%err, ?command, "command failed");
                Err(err)
            }
            Ok(()) => Ok(()),
        }
    }

    pub fn switch_to_jog(&mut self) -> Result<()> {
        self.switch(Strategy::Jog(JogController::new()))
    }

    pub fn switch_to_calibration(&mut self) -> Result<()> {
        self.switch(Strategy::Calibration(BandCalibrator::new()))
    }

    fn switch(&mut self, strategy: Strategy) -> Result<()> {
        self.actuator.safe_idle()?;
        self.strategy = strategy;
        info!(
            strategy = match self.strategy {
                Strategy::Jog(_) => "jog",
                Strategy::Calibration(_) => "calibration",
            },
            "control strategy switched"
        );
        Ok(())
    }

    /// Put the actuator in its safe idle state. Call before every exit.
    pub fn shutdown(&mut self) -> Result<()> {
        info!("shutting down, idling pump and releasing ATU");
        let result = self.actuator.safe_idle();
        if let Err(err) = &result {
            error!(%err, "failed to idle actuator on shutdown");
        }
        result
    }

    /// Run a control loop over this runner, then idle the actuator whatever
    /// the loop returned. A loop error takes precedence over a shutdown error.
    pub fn run_then_shutdown<E, F>(&mut self, control: F) -> std::result::Result<(), E>
    where
        F: FnOnce(&mut Self) -> std::result::Result<(), E>,
        E: From<AntennaError>,
    {
        let outcome = control(self);
        let shutdown = self.shutdown();
        outcome?;
        shutdown?;
        Ok(())
    }

    pub fn snapshot(&self) -> Snapshot {
        match &self.strategy {
            Strategy::Jog(jog) => {
                let extension = jog.extension();
                Snapshot::Jog {
                    squirt: extension.squirt,
                    direction: extension.direction,
                    duty_cycle: extension.duty_cycle,
                    length_m: jog.length_m(),
                    frequency_mhz: jog.frequency_mhz(),
                    atu_armed: jog.watchdog().is_armed(),
                }
            }
            Strategy::Calibration(calibrator) => Snapshot::Calibration {
                state: calibrator.state(),
                progress: calibrator.progress(),
                duty_cycle: calibrator.duty_cycle(),
                band: calibrator.band(),
                length_m: calibrator.length_m(),
                frequency_mhz: instantaneous_frequency(calibrator.length_m()),
                target_frequency_mhz: calibrator.frequency_mhz(),
                atu_armed: calibrator.atu_fired(),
                input_text: calibrator.input_text().to_string(),
            },
        }
    }
}
