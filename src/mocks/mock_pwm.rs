// This file is only compiled during tests

use std::cell::{Cell, RefCell};

thread_local! {
    static MOCK_PWM_DUTY: RefCell<f64> = const { RefCell::new(0.0) };
    static MOCK_PWM_ENABLED: Cell<bool> = const { Cell::new(false) };
    static MOCK_PWM_FAULT: Cell<bool> = const { Cell::new(false) };
}

pub struct Pwm {
    pin: u8,
}

impl Pwm {
    pub fn new(pin: u8) -> Result<Self, Box<dyn std::error::Error>> {
        MOCK_PWM_ENABLED.with(|enabled| enabled.set(true));
        Ok(Pwm { pin })
    }

    pub fn set_duty_cycle(&mut self, duty_cycle: f64) -> Result<(), Box<dyn std::error::Error>> {
        if MOCK_PWM_FAULT.with(Cell::get) {
            return Err(format!("PWM {} not responding", self.pin).into());
        }
        MOCK_PWM_DUTY.with(|duty| {
            *duty.borrow_mut() = duty_cycle;
        });
        println!(
            "[Mock PWM {}] Duty cycle set to {:.4}",
            self.pin, duty_cycle
        );
        Ok(())
    }

    pub fn disable(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        MOCK_PWM_ENABLED.with(|enabled| enabled.set(false));
        println!("[Mock PWM {}] Disabled", self.pin);
        Ok(())
    }
}

// Test helpers
pub fn get_mock_duty_cycle() -> f64 {
    MOCK_PWM_DUTY.with(|duty| *duty.borrow())
}

pub fn is_mock_pwm_enabled() -> bool {
    MOCK_PWM_ENABLED.with(Cell::get)
}

pub fn set_mock_pwm_fault(fault: bool) {
    MOCK_PWM_FAULT.with(|f| f.set(fault));
}

pub fn reset_mock_pwm() {
    MOCK_PWM_DUTY.with(|duty| *duty.borrow_mut() = 0.0);
    MOCK_PWM_ENABLED.with(|enabled| enabled.set(false));
    MOCK_PWM_FAULT.with(|f| f.set(false));
}
