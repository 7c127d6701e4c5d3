use std::fmt::Display;

use tracing::{debug, error};

// Use rppal in production
#[cfg(not(test))]
use rppal::gpio::{Gpio, OutputPin};
#[cfg(not(test))]
use rppal::pwm::{Channel, Polarity, Pwm};

// Mock GPIO/PWM for testing
#[cfg(test)]
use crate::mocks::mock_gpio::{Gpio, OutputPin};
#[cfg(test)]
use crate::mocks::mock_pwm::Pwm;

use crate::config::{GPIO_ATU_TRIGGER, GPIO_PUMP_DIR, GPIO_PUMP_PWM, PUMP_PWM_FREQUENCY_HZ};
use crate::error::{AntennaError, Result};

/// Last values successfully written to the three outputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActuatorOutputs {
    pub forward: bool,
    pub duty_cycle: f64,
    pub trigger: bool,
}

impl ActuatorOutputs {
    /// Pump stopped, ATU released, direction line left forward.
    pub const SAFE_IDLE: ActuatorOutputs = ActuatorOutputs {
        forward: true,
        duty_cycle: 0.0,
        trigger: false,
    };
}

/// The pump direction, pump drive and ATU trigger outputs.
///
/// Commands are idempotent. Implementations only record a value once the
/// device has accepted it, so after a failure `last_commanded` still reports
/// the last state known to be on the wire.
pub trait Actuator {
    fn set_direction(&mut self, forward: bool) -> Result<()>;

    /// Duty cycle is clamped to [0, 1].
    fn set_duty_cycle(&mut self, duty_cycle: f64) -> Result<()>;

    fn set_trigger(&mut self, on: bool) -> Result<()>;

    fn last_commanded(&self) -> ActuatorOutputs;

    /// Stop the pump and release the ATU. Every output is attempted even if
    /// an earlier one fails; the first failure is returned.
    fn safe_idle(&mut self) -> Result<()> {
        let duty = self.set_duty_cycle(0.0);
        let trigger = self.set_trigger(false);
        // Direction stays high at rest: a misbehaving driver then pushes
        // water out rather than sitting in an undefined state.
        let direction = self.set_direction(true);
        duty.and(trigger).and(direction)
    }
}

/// Clamp a requested duty cycle into [0, 1]; NaN is treated as off.
pub fn clamp_duty_cycle(duty_cycle: f64) -> f64 {
    if duty_cycle.is_nan() {
        0.0
    } else {
        duty_cycle.clamp(0.0, 1.0)
    }
}

pub(crate) fn unavailable(err: impl Display) -> AntennaError {
    AntennaError::ActuatorUnavailable(err.to_string())
}

/// Water pump H-bridge and ATU relay on the Raspberry Pi header.
pub struct PumpActuator {
    direction: OutputPin,
    pwm: Pwm,
    atu: OutputPin,
    last: ActuatorOutputs,
}

impl PumpActuator {
    /// Create the actuator on the default antenna board pins.
    pub fn new() -> Result<Self> {
        Self::with_pins(GPIO_PUMP_DIR, GPIO_PUMP_PWM, GPIO_ATU_TRIGGER)
    }

    /// Create the actuator on custom GPIO pins.
    pub fn with_pins(direction_pin: u8, pwm_pin: u8, atu_pin: u8) -> Result<Self> {
        let gpio = Gpio::new().map_err(unavailable)?;
        let direction = gpio.get(direction_pin).map_err(unavailable)?.into_output_low();
        let atu = gpio.get(atu_pin).map_err(unavailable)?.into_output_low();

        #[cfg(not(test))]
        let channel = match pwm_pin {
            12 | 18 => Channel::Pwm0,
            13 | 19 => Channel::Pwm1,
            _ => {
                return Err(AntennaError::ActuatorUnavailable(
                    "invalid PWM pin, use 12, 13, 18, or 19".into(),
                ));
            }
        };

        #[cfg(not(test))]
        let pwm = Pwm::with_frequency(
            channel,
            PUMP_PWM_FREQUENCY_HZ,
            0.0, // pump stopped
            Polarity::Normal,
            true, // enabled
        )
        .map_err(unavailable)?;

        #[cfg(test)]
        let pwm = Pwm::new(pwm_pin).map_err(unavailable)?;

        debug!(
            direction_pin,
            pwm_pin,
            atu_pin,
            frequency_hz = PUMP_PWM_FREQUENCY_HZ,
            "pump actuator initialized"
        );

        let mut actuator = Self {
            direction,
            pwm,
            atu,
            last: ActuatorOutputs {
                forward: false,
                duty_cycle: 0.0,
                trigger: false,
            },
        };
        actuator.safe_idle()?;
        Ok(actuator)
    }

    /// Disable the PWM channel entirely.
    pub fn disable(&mut self) -> Result<()> {
        self.pwm.disable().map_err(unavailable)
    }
}

impl Actuator for PumpActuator {
    fn set_direction(&mut self, forward: bool) -> Result<()> {
        if forward {
            self.direction.set_high();
        } else {
            self.direction.set_low();
        }
        self.last.forward = forward;
        Ok(())
    }

    fn set_duty_cycle(&mut self, duty_cycle: f64) -> Result<()> {
        let clamped = clamp_duty_cycle(duty_cycle);
        if let Err(err) = self.pwm.set_duty_cycle(clamped) {
            error!(duty_cycle = clamped, %err, "pump PWM write failed");
            return Err(unavailable(err));
        }
        self.last.duty_cycle = clamped;
        Ok(())
    }

    fn set_trigger(&mut self, on: bool) -> Result<()> {
        if on {
            self.atu.set_high();
        } else {
            self.atu.set_low();
        }
        self.last.trigger = on;
        Ok(())
    }

    fn last_commanded(&self) -> ActuatorOutputs {
        self.last
    }
}

impl Drop for PumpActuator {
    fn drop(&mut self) {
        // Ensure the pump is stopped and the ATU released when dropped
        let _ = self.safe_idle();
        let _ = self.disable();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{mock_gpio, mock_pwm};

    fn reset_mocks() {
        mock_gpio::reset_mock_pins();
        mock_pwm::reset_mock_pwm();
    }

    #[test]
    fn test_new_starts_in_safe_idle() -> Result<()> {
        reset_mocks();
        let actuator = PumpActuator::new()?;

        assert_eq!(actuator.last_commanded(), ActuatorOutputs::SAFE_IDLE);
        assert_eq!(
            mock_gpio::get_mock_pin_level(GPIO_PUMP_DIR),
            Some(mock_gpio::Level::High)
        );
        assert_eq!(
            mock_gpio::get_mock_pin_level(GPIO_ATU_TRIGGER),
            Some(mock_gpio::Level::Low)
        );
        assert_eq!(mock_pwm::get_mock_duty_cycle(), 0.0);
        Ok(())
    }

    #[test]
    fn test_outputs_reach_pins() -> Result<()> {
        reset_mocks();
        let mut actuator = PumpActuator::new()?;

        actuator.set_direction(false)?;
        actuator.set_duty_cycle(0.5)?;
        actuator.set_trigger(true)?;

        assert_eq!(
            mock_gpio::get_mock_pin_level(GPIO_PUMP_DIR),
            Some(mock_gpio::Level::Low)
        );
        assert_eq!(
            mock_gpio::get_mock_pin_level(GPIO_ATU_TRIGGER),
            Some(mock_gpio::Level::High)
        );
        assert_eq!(mock_pwm::get_mock_duty_cycle(), 0.5);
        assert_eq!(
            actuator.last_commanded(),
            ActuatorOutputs {
                forward: false,
                duty_cycle: 0.5,
                trigger: true,
            }
        );
        Ok(())
    }

    #[test]
    fn test_duty_cycle_is_idempotent() -> Result<()> {
        reset_mocks();
        let mut actuator = PumpActuator::new()?;

        actuator.set_duty_cycle(0.5)?;
        let once = (actuator.last_commanded(), mock_pwm::get_mock_duty_cycle());
        actuator.set_duty_cycle(0.5)?;
        let twice = (actuator.last_commanded(), mock_pwm::get_mock_duty_cycle());

        assert_eq!(once, twice);
        Ok(())
    }

    #[test]
    fn test_duty_cycle_clamping() -> Result<()> {
        reset_mocks();
        let mut actuator = PumpActuator::new()?;

        actuator.set_duty_cycle(1.7)?;
        assert_eq!(mock_pwm::get_mock_duty_cycle(), 1.0);
        actuator.set_duty_cycle(-0.2)?;
        assert_eq!(mock_pwm::get_mock_duty_cycle(), 0.0);
        actuator.set_duty_cycle(f64::NAN)?;
        assert_eq!(actuator.last_commanded().duty_cycle, 0.0);
        Ok(())
    }

    #[test]
    fn test_pwm_failure_holds_last_state() -> Result<()> {
        reset_mocks();
        let mut actuator = PumpActuator::new()?;
        actuator.set_duty_cycle(0.3)?;

        mock_pwm::set_mock_pwm_fault(true);
        let result = actuator.set_duty_cycle(0.9);
        mock_pwm::set_mock_pwm_fault(false);

        assert!(matches!(result, Err(AntennaError::ActuatorUnavailable(_))));
        assert_eq!(actuator.last_commanded().duty_cycle, 0.3);
        assert_eq!(mock_pwm::get_mock_duty_cycle(), 0.3);
        Ok(())
    }

    #[test]
    fn test_safe_idle_attempts_every_output() -> Result<()> {
        reset_mocks();
        let mut actuator = PumpActuator::new()?;
        actuator.set_direction(false)?;
        actuator.set_duty_cycle(0.5)?;
        actuator.set_trigger(true)?;

        mock_pwm::set_mock_pwm_fault(true);
        let result = actuator.safe_idle();
        mock_pwm::set_mock_pwm_fault(false);

        assert!(result.is_err());
        // PWM held, but the ATU and direction lines still went to rest
        assert_eq!(actuator.last_commanded().duty_cycle, 0.5);
        assert!(!actuator.last_commanded().trigger);
        assert!(actuator.last_commanded().forward);
        Ok(())
    }

    #[test]
    fn test_unavailable_pin() {
        reset_mocks();
        mock_gpio::set_mock_pin_unavailable(GPIO_ATU_TRIGGER);

        let result = PumpActuator::new();
        assert!(matches!(result, Err(AntennaError::ActuatorUnavailable(_))));
    }

    #[test]
    fn test_drop_stops_pump() -> Result<()> {
        reset_mocks();
        {
            let mut actuator = PumpActuator::new()?;
            actuator.set_duty_cycle(0.8)?;
            actuator.set_trigger(true)?;
            assert!(mock_pwm::is_mock_pwm_enabled());
        }

        assert_eq!(mock_pwm::get_mock_duty_cycle(), 0.0);
        assert!(!mock_pwm::is_mock_pwm_enabled());
        assert_eq!(
            mock_gpio::get_mock_pin_level(GPIO_ATU_TRIGGER),
            Some(mock_gpio::Level::Low)
        );
        Ok(())
    }
}
