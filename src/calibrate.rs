use std::io::{self, BufRead};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use simple_signal::Signal;
use tracing::{info, warn};

use squirt_rs::calibrator::CalibrationState;
use squirt_rs::clock::{Clock, MonotonicClock};
use squirt_rs::config::{MAX_FREQUENCY_MHZ, MIN_FREQUENCY_MHZ, TICKS_PER_SECOND};
use squirt_rs::jog::JogButtons;
use squirt_rs::{Actuator, AntennaRunner, Command, PumpActuator, Snapshot, logging};

#[derive(Debug, Clone, Copy, PartialEq)]
enum OperatorInput {
    Command(Command),
    Quit,
}

/// Translate one line typed by the operator.
/// Anything that is not a keyword is treated as frequency text followed by Enter.
fn parse_operator_line(line: &str) -> Vec<OperatorInput> {
    match line.trim().to_ascii_lowercase().as_str() {
        "begin" | "b" => vec![OperatorInput::Command(Command::BeginCalibration)],
        "reset" | "r" => vec![OperatorInput::Command(Command::Reset)],
        "quit" | "q" => vec![OperatorInput::Quit],
        text => text
            .chars()
            .map(|c| OperatorInput::Command(Command::Char(c)))
            .chain(std::iter::once(OperatorInput::Command(
                Command::ConfirmFrequency,
            )))
            .collect(),
    }
}

fn spawn_stdin_reader() -> Receiver<OperatorInput> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    for input in parse_operator_line(&line) {
                        if tx.send(input).is_err() {
                            return;
                        }
                    }
                }
                Err(e) => {
                    warn!("Error reading line: {}", e);
                    return;
                }
            }
        }
    });
    rx
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();
    info!("Water antenna band calibration");
    info!(
        "Type a frequency ({}-{} MHz) and Enter, then 'begin'. 'reset' after a run, 'quit' to exit.",
        MIN_FREQUENCY_MHZ, MAX_FREQUENCY_MHZ
    );

    let running = Arc::new(AtomicBool::new(true));
    let signal_flag = Arc::clone(&running);
    simple_signal::set_handler(&[Signal::Int, Signal::Term], move |_signals| {
        signal_flag.store(false, Ordering::SeqCst);
    });

    let mut runner = AntennaRunner::calibration(PumpActuator::new()?, MonotonicClock::new());
    let operator = spawn_stdin_reader();

    runner.run_then_shutdown(|runner| control_loop(runner, &operator, &running))
}

fn control_loop<A: Actuator, C: Clock>(
    runner: &mut AntennaRunner<A, C>,
    operator: &Receiver<OperatorInput>,
    running: &AtomicBool,
) -> Result<(), Box<dyn std::error::Error>> {
    let tick_period = Duration::from_millis(1000 / TICKS_PER_SECOND);
    let mut last_state = CalibrationState::Input;
    let mut last_progress_update = Instant::now();
    let mut operator_gone = false;

    while running.load(Ordering::SeqCst) {
        loop {
            match operator.try_recv() {
                Ok(OperatorInput::Command(command)) => runner.handle(command)?,
                Ok(OperatorInput::Quit) => return Ok(()),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    operator_gone = true;
                    break;
                }
            }
        }

        let snapshot = runner.tick(JogButtons::default())?;
        let Snapshot::Calibration {
            state,
            progress,
            band,
            length_m,
            duty_cycle,
            target_frequency_mhz,
            atu_armed,
            ..
        } = &snapshot
        else {
            return Err("calibration runner is not calibrating".into());
        };

        if *state != last_state {
            match state {
                CalibrationState::Input => {
                    info!("Input frequency (current: {} MHz)", target_frequency_mhz)
                }
                CalibrationState::Calibrating => info!("Tuning to {}", band),
                CalibrationState::Status => info!(
                    "[Status] PWM: {:.0}%, Band: {}, Length: {} meters",
                    duty_cycle * 100.0,
                    band,
                    length_m
                ),
            }
            last_state = *state;
        }

        if *state == CalibrationState::Calibrating
            && last_progress_update.elapsed() >= Duration::from_secs(1)
        {
            info!(
                "Calibrating {:>3.0}%{}",
                progress * 100.0,
                if *atu_armed { " - ATU triggered" } else { "" }
            );
            last_progress_update = Instant::now();
        }

        // with no operator left, stop once nothing is in flight
        if operator_gone && *state != CalibrationState::Calibrating {
            info!("Operator input closed");
            return Ok(());
        }

        thread::sleep(tick_period);
    }

    info!("Shutdown requested");
    Ok(())
}
