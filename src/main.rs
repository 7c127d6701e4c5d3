use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use simple_signal::Signal;
use tracing::info;

use squirt_rs::clock::{Clock, MonotonicClock};
use squirt_rs::config::{
    GPIO_BUTTON_EXTEND, GPIO_BUTTON_RETRACT, GPIO_BUTTON_TUNE, STATUS_UPDATE_INTERVAL_SECS,
    TICKS_PER_SECOND,
};
use squirt_rs::gpio_input::ButtonPanel;
use squirt_rs::jog::JogButtons;
use squirt_rs::{Actuator, AntennaRunner, PumpActuator, Snapshot, logging};

// Usage:
//  EXTEND held:  pump pushes water up the hose, length grows 0.1 m per tick
//  RETRACT held: pump pulls water back, length shrinks
//  Released:     pump stops, direction line stays forward
//  TUNE pressed: ATU line raised, released again after the watchdog timeout
fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();
    info!("Starting water antenna jog control...");

    let running = Arc::new(AtomicBool::new(true));
    let signal_flag = Arc::clone(&running);
    simple_signal::set_handler(&[Signal::Int, Signal::Term], move |_signals| {
        signal_flag.store(false, Ordering::SeqCst);
    });

    let mut panel = ButtonPanel::new()?;
    let mut runner = AntennaRunner::jog(PumpActuator::new()?, MonotonicClock::new());

    info!(
        extend = GPIO_BUTTON_EXTEND,
        retract = GPIO_BUTTON_RETRACT,
        tune = GPIO_BUTTON_TUNE,
        "GPIO initialized, hold a button to jog"
    );

    runner.run_then_shutdown(|runner| control_loop(runner, || panel.read(), &running))
}

fn control_loop<A: Actuator, C: Clock>(
    runner: &mut AntennaRunner<A, C>,
    mut read_buttons: impl FnMut() -> JogButtons,
    running: &AtomicBool,
) -> Result<(), Box<dyn std::error::Error>> {
    let tick_period = Duration::from_millis(1000 / TICKS_PER_SECOND);
    let mut last_status_update = Instant::now();

    while running.load(Ordering::SeqCst) {
        let buttons = read_buttons();
        let snapshot = runner.tick(buttons)?;

        if last_status_update.elapsed() >= Duration::from_secs(STATUS_UPDATE_INTERVAL_SECS) {
            log_status(&snapshot);
            last_status_update = Instant::now();
        }

        thread::sleep(tick_period);
    }

    info!("Shutdown requested");
    Ok(())
}

fn log_status(snapshot: &Snapshot) {
    if let Snapshot::Jog {
        direction,
        duty_cycle,
        length_m,
        frequency_mhz,
        atu_armed,
        ..
    } = snapshot
    {
        info!(
            "[Status] water length {:.2} m, target {:.3} MHz, PWM {:.1}%, pump {}, ATU {}",
            length_m,
            frequency_mhz,
            duty_cycle * 100.0,
            direction,
            if *atu_armed { "tuning" } else { "idle" }
        );
    }
}
