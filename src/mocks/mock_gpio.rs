// This file is only compiled during tests

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Level {
    Low,
    High,
}

thread_local! {
    static MOCK_PINS: RefCell<HashMap<u8, Level>> = RefCell::new(HashMap::new());
    static UNAVAILABLE_PINS: RefCell<HashSet<u8>> = RefCell::new(HashSet::new());
}

pub struct InputPin {
    pin: u8,
}

impl InputPin {
    pub fn read(&self) -> Level {
        MOCK_PINS.with(|pins| *pins.borrow().get(&self.pin).unwrap_or(&Level::High))
    }
}

pub struct OutputPin {
    pin: u8,
}

impl OutputPin {
    pub fn set_high(&mut self) {
        set_mock_pin_level(self.pin, Level::High);
    }

    pub fn set_low(&mut self) {
        set_mock_pin_level(self.pin, Level::Low);
    }
}

pub struct Gpio;

impl Gpio {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Gpio)
    }

    pub fn get(&self, pin: u8) -> Result<Pin, Box<dyn std::error::Error>> {
        if UNAVAILABLE_PINS.with(|pins| pins.borrow().contains(&pin)) {
            return Err(format!("pin {} is busy", pin).into());
        }
        Ok(Pin { pin })
    }
}

pub struct Pin {
    pin: u8,
}

impl Pin {
    pub fn into_input_pullup(self) -> InputPin {
        set_mock_pin_level(self.pin, Level::High);
        InputPin { pin: self.pin }
    }

    pub fn into_output_low(self) -> OutputPin {
        set_mock_pin_level(self.pin, Level::Low);
        OutputPin { pin: self.pin }
    }
}

// test helper function to set pin levels
pub fn set_mock_pin_level(pin: u8, level: Level) {
    MOCK_PINS.with(|pins| {
        pins.borrow_mut().insert(pin, level);
    });
}

// test helper to read back an output pin
pub fn get_mock_pin_level(pin: u8) -> Option<Level> {
    MOCK_PINS.with(|pins| pins.borrow().get(&pin).copied())
}

// test helper to make Gpio::get fail for a pin
pub fn set_mock_pin_unavailable(pin: u8) {
    UNAVAILABLE_PINS.with(|pins| {
        pins.borrow_mut().insert(pin);
    });
}

// test helper to reset all pins
pub fn reset_mock_pins() {
    MOCK_PINS.with(|pins| {
        pins.borrow_mut().clear();
    });
    UNAVAILABLE_PINS.with(|pins| {
        pins.borrow_mut().clear();
    });
}
