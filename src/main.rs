//! Rover arbiter CLI
//!
//! Usage:
//!   rover-arbiter --scenario world.json            # Replay a scripted world
//!   rover-arbiter --interactive                    # Type voice commands on stdin
//!   rover-arbiter --interactive --serve            # Plus HTTP/WebSocket telemetry
//!   rover-arbiter --scenario world.json --json     # JSON tick output

use clap::Parser;
use colored::Colorize;
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

use rover_arbiter::core::{
    audio_queue, default_snapshot_dir, run_server, AudioSender, ConsoleReporter, PpmFrameStore,
    Scenario, ScriptedDevice, Telemetry, TickDriver, TranscriptRecognizer,
};
use rover_arbiter::types::{ArbiterConfig, LoadReason, Mode, TickOutput};
use rover_arbiter::{AUDIO_BLOCK_SIZE, AUDIO_QUEUE_CAPACITY, AUDIO_SAMPLE_RATE, VERSION};

#[derive(Parser, Debug)]
#[command(
    name = "rover-arbiter",
    version = VERSION,
    about = "Behavior arbiter for a two-wheeled simulator robot",
    long_about = "Runs the rover's per-tick control loop: proximity-based obstacle\n\
                  avoidance, voice steering and camera color search.\n\n\
                  Voice commands: straight, left, right, stop, search\n\n\
                  Modes:\n  \
                  FOLLOW  - Keep the last commanded speeds\n  \
                  AVOID   - Steer away from an obstacle\n  \
                  SEARCH  - Spin until a red, green or blue blob is seen"
)]
struct Args {
    /// Scripted world (JSON). Defaults to an endless open field
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Arbiter config (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stop after this many ticks
    #[arg(long)]
    ticks: Option<u64>,

    /// Simulation timestep in milliseconds
    #[arg(long)]
    time_step: Option<u32>,

    /// Read voice commands from stdin, one utterance per line
    #[arg(short, long)]
    interactive: bool,

    /// Pace ticks in wall-clock time
    #[arg(long)]
    realtime: bool,

    /// Run HTTP/WebSocket telemetry alongside the loop
    #[arg(short, long)]
    serve: bool,

    /// Telemetry address
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// Output ticks as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Print every tick, not only notable ones
    #[arg(short, long)]
    verbose: bool,

    /// Directory for found-blob frames (default: home directory)
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Accept any words, not only the command grammar
    #[arg(long)]
    open_vocabulary: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_timer(ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    if args.no_color {
        colored::control::set_override(false);
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(1);
        }
    };

    let scenario = match &args.scenario {
        Some(path) => match Scenario::load(path) {
            Ok(scenario) => scenario,
            Err(e) => {
                eprintln!("Scenario error ({}): {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Scenario::endless(),
    };

    let (audio_tx, audio_rx) = audio_queue(AUDIO_QUEUE_CAPACITY);
    let quit = Arc::new(AtomicBool::new(false));
    if args.interactive {
        spawn_stdin_capture(audio_tx.clone(), quit.clone());
    }

    let telemetry = args.serve.then(|| Telemetry::new(Some(audio_tx.clone())));
    if let Some(telemetry) = &telemetry {
        let telemetry = telemetry.clone();
        let addr = args.addr.clone();
        tokio::spawn(async move {
            if let Err(e) = run_server(&addr, telemetry).await {
                eprintln!("Server error: {}", e);
            }
        });
    }

    let recognizer = if args.open_vocabulary {
        TranscriptRecognizer::new()
    } else {
        TranscriptRecognizer::command_grammar()
    };
    let device = ScriptedDevice::new(scenario).with_audio(audio_tx);
    let snapshot_dir = args.snapshot_dir.clone().unwrap_or_else(default_snapshot_dir);
    let reporter = if args.json {
        ConsoleReporter::silent()
    } else {
        ConsoleReporter::new(args.no_color)
    };

    let mut driver = TickDriver::new(device, recognizer, PpmFrameStore::new(), audio_rx, config.clone())
        .with_snapshot_dir(snapshot_dir)
        .with_reporter(reporter);

    if !args.json {
        print_header(&args, &config);
    }

    let realtime = args.realtime || args.interactive || args.serve;
    let ticks = run_loop(&mut driver, &args, &config, telemetry, quit, realtime).await;

    if !args.json {
        println!();
        println!(
            "Session ended. Ticks: {} | Finds: {} | Mode: {}",
            ticks,
            driver.finds().len(),
            driver.arbiter().mode()
        );
    }
}

fn load_config(args: &Args) -> Result<ArbiterConfig, LoadReason> {
    let config = match &args.config {
        Some(path) => ArbiterConfig::load(path)?,
        None => ArbiterConfig::default(),
    };
    let config = match args.time_step {
        Some(ms) => config.with_time_step(ms),
        None => config,
    };
    config.validate()?;
    Ok(config)
}

/// Each stdin line is one utterance, delivered in capture-sized blocks like a
/// microphone would
fn spawn_stdin_capture(audio: AudioSender, quit: Arc<AtomicBool>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let line = line.trim();
            if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
                break;
            }
            if line.is_empty() {
                continue;
            }
            let utterance = format!("{}\n", line).into_bytes();
            if !utterance.chunks(AUDIO_BLOCK_SIZE).all(|block| audio.blocking_push(block.to_vec())) {
                break;
            }
        }
        quit.store(true, Ordering::SeqCst);
    });
}

async fn run_loop(
    driver: &mut TickDriver<ScriptedDevice, TranscriptRecognizer, PpmFrameStore>,
    args: &Args,
    config: &ArbiterConfig,
    telemetry: Option<Arc<Telemetry>>,
    quit: Arc<AtomicBool>,
    realtime: bool,
) -> u64 {
    let mut interval = tokio::time::interval(Duration::from_millis(config.time_step_ms as u64));
    let mut previous_mode: Option<Mode> = None;
    let mut ticks = 0;

    loop {
        if args.ticks.is_some_and(|limit| ticks >= limit) || quit.load(Ordering::SeqCst) {
            break;
        }
        if realtime {
            tokio::select! {
                _ = interval.tick() => {}
                _ = tokio::signal::ctrl_c() => break,
            }
        }

        let Some(output) = driver.step() else { break };
        ticks += 1;

        print_tick(&output, previous_mode, args);
        previous_mode = Some(output.mode);

        if let Some(telemetry) = &telemetry {
            telemetry.publish(&output).await;
            if output.found.is_some() {
                if let Some(find) = driver.finds().back() {
                    telemetry.record_find(find.clone()).await;
                }
            }
        }
    }
    ticks
}

fn print_tick(output: &TickOutput, previous_mode: Option<Mode>, args: &Args) {
    if args.json {
        match serde_json::to_string(output) {
            Ok(json) => println!("{}", json),
            Err(e) => tracing::error!(%e, "failed to serialize tick"),
        }
        return;
    }
    if !args.verbose && !output.is_notable(previous_mode) {
        return;
    }
    if args.no_color {
        println!("{}", output.to_parseable_string());
    } else {
        println!("{}", output.to_terminal_string());
    }
}

fn print_header(args: &Args, config: &ArbiterConfig) {
    let title = format!("Rover arbiter v{}", VERSION);
    if args.no_color {
        println!("========================================");
        println!("  {}", title);
        println!("========================================");
    } else {
        println!("{}", "════════════════════════════════════════".bold());
        println!("  {}", title.bold());
        println!("{}", "════════════════════════════════════════".bold());
    }
    println!(
        "time step {} ms | max speed {:.2} | obstacle > {:.0} | pause {} ticks",
        config.time_step_ms,
        config.max_speed,
        config.obstacle_threshold,
        config.pause_ticks()
    );
    if args.interactive {
        println!("microphone {} Hz, {} samples per block", AUDIO_SAMPLE_RATE, AUDIO_BLOCK_SIZE);
        println!("Say (type) straight, left, right, stop or search. Type 'quit' to exit.");
    }
    println!();
}
