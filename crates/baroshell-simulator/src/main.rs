//! Desktop simulator for the baroshell command console.
//!
//! Runs the same shell as the firmware against a simulated BMP280 and a motor
//! bus that logs every frame. Lines typed on stdin go through the receive
//! mailbox exactly like bytes from a UART.
//!
//! # Flags
//!
//! | Flag                | Effect                                     |
//! |---------------------|--------------------------------------------|
//! | `--prompt <text>`   | Shell prompt                               |
//! | `--timeout-ms <n>`  | Sensor and motor bus timeout               |
//! | `--no-sensor`       | Sensor NACKs every transaction             |
//!
//! Set `RUST_LOG=debug` to see the register traffic.

use std::io::{self, Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration as StdDuration;

use embassy_futures::block_on;
use embassy_time::Duration;
use log::{info, warn};

use baroshell_core::app_state::AppState;
use baroshell_core::config::{Config, DEFAULT_PROMPT};
use baroshell_core::console::{RX_MAILBOX, RxSource};
use baroshell_core::shell::Shell;
use baroshell_core::sim::{RecordingMotorBus, SimulatedBmp280};

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

struct Options {
    prompt: String,
    timeout_ms: Option<u64>,
    sensor_online: bool,
}

fn parse_options() -> Result<Options, String> {
    let mut options = Options {
        prompt: DEFAULT_PROMPT.to_string(),
        timeout_ms: None,
        sensor_online: true,
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--prompt" => {
                options.prompt = args.next().ok_or("--prompt needs a value")?;
            }
            "--timeout-ms" => {
                let value = args.next().ok_or("--timeout-ms needs a value")?;
                let ms = value
                    .parse()
                    .map_err(|_| format!("invalid --timeout-ms value '{value}'"))?;
                options.timeout_ms = Some(ms);
            }
            "--no-sensor" => options.sensor_online = false,
            other => return Err(format!("unknown argument '{other}'")),
        }
    }
    Ok(options)
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Interval at which the reader waits for room and the shell polls for input.
const POLL_INTERVAL: StdDuration = StdDuration::from_millis(1);

/// Maps terminal input onto what the shell expects from a serial link.
///
/// `\n` becomes `\r` unless it completes a `\r\n` pair, which is kept once.
/// Decisions look at the byte as received, so consecutive blank lines each
/// produce their own `\r`.
#[derive(Default)]
struct NewlineTranslator {
    previous: u8,
}

impl NewlineTranslator {
    fn translate(&mut self, byte: u8) -> Option<u8> {
        let previous = core::mem::replace(&mut self.previous, byte);
        match byte {
            b'\n' if previous == b'\r' => None,
            b'\n' => Some(b'\r'),
            // Terminals send DEL for the backspace key
            0x7F => Some(0x08),
            other => Some(other),
        }
    }
}

/// Feeds stdin into the mailbox as if it came from the debug link.
fn spawn_stdin_reader(finished: Arc<AtomicBool>) {
    thread::spawn(move || {
        let mut translator = NewlineTranslator::default();
        for byte in io::stdin().lock().bytes() {
            let Ok(byte) = byte else { break };
            let Some(byte) = translator.translate(byte) else {
                continue;
            };

            while RX_MAILBOX.is_full() {
                thread::sleep(POLL_INTERVAL);
            }
            RX_MAILBOX.offer(RxSource::Debug, byte);
        }
        finished.store(true, Ordering::Release);
    });
}

// ---------------------------------------------------------------------------
// Main loop
// ---------------------------------------------------------------------------

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = match parse_options() {
        Ok(options) => options,
        Err(e) => {
            eprintln!("baroshell-simulator: {e}");
            std::process::exit(2);
        }
    };

    let mut config = Config::with_prompt(&options.prompt);
    if let Some(ms) = options.timeout_ms {
        config.sensor.bus_timeout = Duration::from_millis(ms);
        config.motor.bus_timeout = Duration::from_millis(ms);
    }

    let mut device = SimulatedBmp280::new(config.sensor.address);
    device.set_online(options.sensor_online);
    let mut state = AppState::new(device, RecordingMotorBus::new(), &config);
    if let Err(e) = block_on(state.init()) {
        warn!("Starting shell in degraded mode: {e}");
    }

    let finished = Arc::new(AtomicBool::new(false));
    spawn_stdin_reader(finished.clone());

    let mut shell = Shell::new(&config.shell);
    let mut stdout = io::stdout();
    write_out(&mut stdout, shell.banner().as_bytes());

    loop {
        // Read the flag first so the last bytes offered before it was set
        // are still drained.
        let done = finished.load(Ordering::Acquire);
        match RX_MAILBOX.try_receive() {
            Some(rx) => {
                let transcript = block_on(shell.process(rx.byte, &mut state));
                write_out(&mut stdout, transcript.as_bytes());
            }
            None if done => break,
            None => thread::sleep(POLL_INTERVAL),
        }
    }

    write_out(&mut stdout, b"\r\n");
    info!("stdin closed, {} bytes dropped", RX_MAILBOX.dropped());
}

fn write_out(stdout: &mut io::Stdout, bytes: &[u8]) {
    if let Err(e) = stdout.write_all(bytes).and_then(|()| stdout.flush()) {
        warn!("stdout write failed: {e}");
    }
}
