use std::fmt;

use tracing::{debug, info};

use crate::actuator::Actuator;
use crate::band::{Band, duty_cycle_for_band, length_for_band, nearest_band};
use crate::config::{
    ATU_FIRE_PROGRESS, CALIBRATION_DURATION_MS, DEFAULT_BAND, DEFAULT_FREQUENCY_MHZ,
    MAX_FREQUENCY_MHZ, MIN_FREQUENCY_MHZ,
};
use crate::error::{AntennaError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationState {
    /// Waiting for a frequency and a begin request.
    Input,
    /// Pump running at the band's duty cycle for the calibration period.
    Calibrating,
    /// Finished, showing the result until reset.
    Status,
}

impl fmt::Display for CalibrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CalibrationState::Input => "Input",
            CalibrationState::Calibrating => "Calibrating",
            CalibrationState::Status => "Status",
        };
        write!(f, "{}", name)
    }
}

/// Operator-typed frequency text. Only ASCII digits and '.' are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyInput {
    text: String,
}

impl FrequencyInput {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Append a character, returning whether it was accepted.
    pub fn push(&mut self, c: char) -> bool {
        if c.is_ascii_digit() || c == '.' {
            self.text.push(c);
            true
        } else {
            false
        }
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }

    /// Consume the text and parse it as an HF frequency in MHz.
    /// The text is cleared whether or not it parses.
    pub fn take_frequency(&mut self) -> Result<f64> {
        let text = std::mem::take(&mut self.text);
        let frequency: f64 = text
            .parse()
            .map_err(|_| AntennaError::InvalidFrequency(format!("'{}' is not a number", text)))?;

        if !(MIN_FREQUENCY_MHZ..=MAX_FREQUENCY_MHZ).contains(&frequency) {
            return Err(AntennaError::InvalidFrequency(format!(
                "{} MHz is outside {}-{} MHz",
                frequency, MIN_FREQUENCY_MHZ, MAX_FREQUENCY_MHZ
            )));
        }
        Ok(frequency)
    }
}

/// One timed calibration pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationRun {
    pub band: Band,
    pub duty_cycle: f64,
    /// Set on the first calibrating tick, cleared when the run completes.
    pub start_ms: Option<u64>,
    pub progress: f64,
    pub atu_fired: bool,
}

/// Timed automatic calibration to the band nearest an operator frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct BandCalibrator {
    state: CalibrationState,
    input: FrequencyInput,
    frequency_mhz: f64,
    band: Band,
    duty_cycle: f64,
    run: Option<CalibrationRun>,
    duration_ms: u64,
}

impl BandCalibrator {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self::with_duration_ms(CALIBRATION_DURATION_MS)
    }

    pub fn with_duration_ms(duration_ms: u64) -> Self {
        Self {
            state: CalibrationState::Input,
            input: FrequencyInput::default(),
            frequency_mhz: DEFAULT_FREQUENCY_MHZ,
            band: DEFAULT_BAND,
            duty_cycle: 0.0,
            run: None,
            duration_ms,
        }
    }

    pub fn state(&self) -> CalibrationState {
        self.state
    }

    /// Active frequency in MHz.
    pub fn frequency_mhz(&self) -> f64 {
        self.frequency_mhz
    }

    pub fn input_text(&self) -> &str {
        self.input.text()
    }

    /// Band of the last (or current) calibration.
    pub fn band(&self) -> Band {
        self.band
    }

    pub fn duty_cycle(&self) -> f64 {
        self.duty_cycle
    }

    pub fn length_m(&self) -> f64 {
        length_for_band(self.band)
    }

    pub fn run(&self) -> Option<&CalibrationRun> {
        self.run.as_ref()
    }

    pub fn progress(&self) -> f64 {
        self.run.map_or(0.0, |run| run.progress)
    }

    pub fn atu_fired(&self) -> bool {
        self.run.is_some_and(|run| run.atu_fired)
    }

    /// Type a character into the frequency box. Ignored outside Input.
    pub fn push_char(&mut self, c: char) -> bool {
        self.state == CalibrationState::Input && self.input.push(c)
    }

    pub fn backspace(&mut self) {
        if self.state == CalibrationState::Input {
            self.input.backspace();
        }
    }

    /// Accept the typed frequency.
    ///
    /// Rejected text is discarded and the active frequency is left as it was.
    /// The rejection is returned for the caller to report.
    pub fn confirm_frequency(&mut self) -> Result<f64> {
        if self.state != CalibrationState::Input {
            debug!(state = %self.state, "confirm ignored");
            return Ok(self.frequency_mhz);
        }

        let frequency = self.input.take_frequency()?;
        self.frequency_mhz = frequency;
        info!(frequency_mhz = frequency, "frequency accepted");
        Ok(frequency)
    }

    /// Pick the band for the active frequency and start the pump ramp.
    pub fn begin_calibration<A: Actuator>(&mut self, actuator: &mut A) -> Result<()> {
        if self.state != CalibrationState::Input {
            debug!(state = %self.state, "begin ignored");
            return Ok(());
        }

        let band = nearest_band(self.frequency_mhz)?;
        let duty_cycle = duty_cycle_for_band(band.meters())?;
        actuator.set_direction(true)?;

        self.band = band;
        self.duty_cycle = duty_cycle;
        self.run = Some(CalibrationRun {
            band,
            duty_cycle,
            start_ms: None,
            progress: 0.0,
            atu_fired: false,
        });
        self.state = CalibrationState::Calibrating;

        info!(
            frequency_mhz = self.frequency_mhz,
            %band,
            duty_cycle,
            length_m = length_for_band(band),
            "calibration started"
        );
        Ok(())
    }

    /// Run one control pass at `now_ms`.
    pub fn tick<A: Actuator>(&mut self, now_ms: u64, actuator: &mut A) -> Result<()> {
        if self.state != CalibrationState::Calibrating {
            return Ok(());
        }
        let Some(run) = self.run.as_mut() else {
            return Ok(());
        };

        // The run only starts its clock once the pump has been commanded.
        let start_ms = run.start_ms.unwrap_or(now_ms);
        let elapsed_ms = now_ms.saturating_sub(start_ms);
        let progress = if self.duration_ms == 0 {
            1.0
        } else {
            (elapsed_ms as f64 / self.duration_ms as f64).clamp(0.0, 1.0)
        };

        actuator.set_duty_cycle(run.duty_cycle)?;
        run.start_ms = Some(start_ms);
        run.progress = progress;

        if progress >= ATU_FIRE_PROGRESS && !run.atu_fired {
            actuator.set_trigger(true)?;
            run.atu_fired = true;
            info!(progress, "triggering ATU");
        }

        if elapsed_ms >= self.duration_ms {
            run.start_ms = None;
            self.state = CalibrationState::Status;
            info!(band = %run.band, elapsed_ms, "calibration complete");
        }
        Ok(())
    }

    /// Leave Status for a fresh Input, stopping the pump and releasing the ATU.
    pub fn reset<A: Actuator>(&mut self, actuator: &mut A) -> Result<()> {
        if self.state != CalibrationState::Status {
            debug!(state = %self.state, "reset ignored");
            return Ok(());
        }

        actuator.safe_idle()?;
        self.run = None;
        self.state = CalibrationState::Input;
        debug!("calibrator reset");
        Ok(())
    }
}
