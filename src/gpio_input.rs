use std::thread;
use std::time::Duration;

use tracing::debug;

// Use rppal in production
#[cfg(not(test))]
use rppal::gpio::{Gpio, InputPin, Level};

#[cfg(test)]
// This is only used in testing, not compiled in release.
use crate::mocks::mock_gpio::{Gpio, InputPin, Level};

use crate::actuator::unavailable;
use crate::config::{GPIO_BUTTON_EXTEND, GPIO_BUTTON_RETRACT, GPIO_BUTTON_TUNE};
use crate::error::Result;
use crate::jog::JogButtons;

/// Extend, retract and tune push buttons, wired active low.
pub struct ButtonPanel {
    extend: InputPin,
    retract: InputPin,
    tune: InputPin,
    tune_was_down: bool,
}

/// Provides methods for reading the jog buttons on the GPIO header.
impl ButtonPanel {
    pub fn new() -> Result<Self> {
        Self::with_pins(GPIO_BUTTON_EXTEND, GPIO_BUTTON_RETRACT, GPIO_BUTTON_TUNE)
    }

    pub fn with_pins(extend_pin: u8, retract_pin: u8, tune_pin: u8) -> Result<Self> {
        let gpio = Gpio::new().map_err(unavailable)?;
        let extend = gpio.get(extend_pin).map_err(unavailable)?.into_input_pullup();
        let retract = gpio.get(retract_pin).map_err(unavailable)?.into_input_pullup();
        let tune = gpio.get(tune_pin).map_err(unavailable)?.into_input_pullup();

        // let the pull-ups settle before the first read
        thread::sleep(Duration::from_millis(100));

        Ok(Self {
            extend,
            retract,
            tune,
            tune_was_down: false,
        })
    }

    /// Sample the buttons. `tune` is only reported on the press edge, so a
    /// held button is a single tune request.
    pub fn read(&mut self) -> JogButtons {
        let tune_down = self.tune.read() == Level::Low;
        let tune = tune_down && !self.tune_was_down;
        self.tune_was_down = tune_down;

        if tune {
            debug!("tune button pressed");
        }

        JogButtons {
            extend: self.extend.read() == Level::Low,
            retract: self.retract.read() == Level::Low,
            tune,
        }
    }
}
