// Stand-ins for rppal, swapped in under cfg(test).
pub mod mock_gpio;
pub mod mock_pwm;
pub mod recording_actuator;
