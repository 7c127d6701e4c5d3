use crate::band::Band;

// ** GPIO CONFIGURATION ** //
/// Pump H-bridge direction line (high = extend / forward).
pub const GPIO_PUMP_DIR: u8 = 23;
/// Pump H-bridge enable, driven by hardware PWM.
/// Hardware PWM is available on:
/// - GPIO 12 (PWM0) - Wired on the antenna board
/// - GPIO 13 (PWM1)
/// - GPIO 18 (PWM0)
/// - GPIO 19 (PWM1)
pub const GPIO_PUMP_PWM: u8 = 12;
/// Relay that closes the ATU tune line.
pub const GPIO_ATU_TRIGGER: u8 = 21;
/// Momentary jog buttons (active low, internal pull-ups).
pub const GPIO_BUTTON_EXTEND: u8 = 5;
pub const GPIO_BUTTON_RETRACT: u8 = 6;
pub const GPIO_BUTTON_TUNE: u8 = 26;

// ** PUMP CONFIGURATION ** //
/// Pump PWM carrier frequency (Hz).
pub const PUMP_PWM_FREQUENCY_HZ: f64 = 100.0;
/// Squirt change per jog tick while a button is held.
pub const JOG_STEP: f64 = 0.005;
/// Duty cycle used while jogging in either direction.
pub const JOG_DUTY_CYCLE: f64 = 0.5;
/// Water length (meters) at full extension (squirt == 1).
pub const HOSE_FULL_LENGTH_M: f64 = 20.0;

// ** ATU CONFIGURATION ** //
/// Ticks after a tune request before the ATU line is released.
/// This counts control ticks, not milliseconds.
pub const ATU_WATCHDOG_TICKS: u32 = 2000;
/// Calibration progress at which the ATU is fired.
pub const ATU_FIRE_PROGRESS: f64 = 0.75;

// ** CALIBRATION CONFIGURATION ** //
pub const CALIBRATION_DURATION_MS: u64 = 20_000;
/// Accepted operator frequency range (MHz), HF only.
pub const MIN_FREQUENCY_MHZ: f64 = 3.0;
pub const MAX_FREQUENCY_MHZ: f64 = 30.0;
pub const DEFAULT_FREQUENCY_MHZ: f64 = 7.2;
pub const DEFAULT_BAND: Band = Band::M20;

// ** MAIN CONFIGURATION ** //
pub const TICKS_PER_SECOND: u64 = 60;
pub const STATUS_UPDATE_INTERVAL_SECS: u64 = 5;
