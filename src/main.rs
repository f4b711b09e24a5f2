//! PulseTrack CLI
//!
//! Replays scripted browsing traffic through the engagement engine and
//! prints or exports the resulting analytics rollup.

use chrono::Utc;
use clap::{Parser, Subcommand};
use pulsetrack::{
    ClickPoint, EngagementEngine, EngineConfig, ManualClock, RawUiEvent, ScriptedSource,
    TrafficSource, UuidIds, VERSION,
};
use pulsetrack::adapter::InputEventSource;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "pulsetrack")]
#[command(version = VERSION)]
#[command(about = "Session engagement analytics and personalization engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay scripted browsing traffic and print the engagement rollup
    Simulate {
        /// Number of scripted traffic rounds to replay
        #[arg(long, default_value = "1")]
        rounds: usize,

        /// Keep generating traffic until Ctrl+C
        #[arg(long)]
        follow: bool,
    },

    /// Export the engagement rollup as JSON
    Export {
        /// Output directory for the rollup
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Show configuration
    Config,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate { rounds, follow } => cmd_simulate(rounds, follow),
        Commands::Export { output } => cmd_export(output),
        Commands::Config => cmd_config(),
    }
}

/// One step of a scripted visit: advance the replay clock, then emit.
struct ScriptStep {
    advance_secs: i64,
    event: RawUiEvent,
}

fn step(advance_secs: i64, event: RawUiEvent) -> ScriptStep {
    ScriptStep {
        advance_secs,
        event,
    }
}

fn navigate(path: &str, title: &str) -> RawUiEvent {
    RawUiEvent::Navigate {
        path: path.to_string(),
        title: title.to_string(),
        referrer: None,
    }
}

fn click(element: &str, x: f64, y: f64) -> RawUiEvent {
    RawUiEvent::Click {
        element: element.to_string(),
        coordinates: Some(ClickPoint { x, y }),
        text: None,
    }
}

/// Scripted visits for one round of synthetic traffic: an engaged visitor,
/// a bouncer, and a returning patient managing appointments.
fn demo_round(round: usize) -> Vec<(String, TrafficSource, Vec<ScriptStep>)> {
    vec![
        (
            format!("visitor-{round}-a"),
            TrafficSource::Direct,
            vec![
                step(0, navigate("/home", "Home")),
                step(2, RawUiEvent::Scroll { depth_percent: 40 }),
                step(10, navigate("/departments", "Departments")),
                step(5, click("a.department-card", 320.0, 410.0)),
                step(40, navigate("/consultation/new", "New Consultation")),
                step(30, RawUiEvent::Scroll { depth_percent: 80 }),
                step(90, click("button.submit-consultation", 512.0, 688.0)),
                step(2, RawUiEvent::FormSubmit {
                    form: "form.consultation-request".to_string(),
                }),
                step(60, navigate("/consultation/history", "Consultation History")),
            ],
        ),
        (
            format!("visitor-{round}-b"),
            TrafficSource::Social,
            vec![step(0, navigate("/home", "Home")), step(4, RawUiEvent::Scroll { depth_percent: 15 })],
        ),
        (
            format!("visitor-{round}-c"),
            TrafficSource::Email,
            vec![
                step(0, navigate("/appointments/upcoming", "Upcoming Appointments")),
                step(8, click("button.reschedule", 220.0, 300.0)),
                step(20, RawUiEvent::QuickAction {
                    name: "book_appointment".to_string(),
                }),
                step(45, navigate("/records", "Health Records")),
                step(15, RawUiEvent::Scroll { depth_percent: 65 }),
                step(70, click("a.record-entry", 180.0, 520.0)),
            ],
        ),
    ]
}

/// Replay one round of scripted traffic through the adapter channel.
fn run_round(
    engine: &mut EngagementEngine,
    source: &ScriptedSource,
    clock: &ManualClock,
    round: usize,
) {
    for (user, traffic, script) in demo_round(round) {
        engine.start_session(&user, traffic);
        for s in script {
            clock.advance_secs(s.advance_secs);
            source.push(s.event);
            engine.drain(&user, source.receiver());
            engine.tick();
        }
        clock.advance_secs(5);
        engine.end_session(&user);
    }
}

fn build_engine(config: EngineConfig) -> (EngagementEngine, ManualClock) {
    // Replays compress hours of traffic into milliseconds, so the engine
    // runs on a hand-driven clock advanced by the script.
    let clock = ManualClock::at(Utc::now());
    let engine =
        EngagementEngine::with_runtime(config, Box::new(clock.clone()), Box::new(UuidIds));
    (engine, clock)
}

fn cmd_simulate(rounds: usize, follow: bool) {
    println!("PulseTrack v{VERSION}");
    println!();

    let config = EngineConfig::load().unwrap_or_default();
    let (mut engine, clock) = build_engine(config);

    let mut source = ScriptedSource::new();
    if let Err(e) = source.start() {
        eprintln!("Error starting event source: {e}");
        std::process::exit(1);
    }

    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(running.clone());

    if follow {
        println!("Generating synthetic traffic. Press Ctrl+C to stop.");
        println!();
    }

    let mut round = 0;
    while running.load(Ordering::SeqCst) {
        round += 1;
        run_round(&mut engine, &source, &clock, round);
        print_rollup(&engine);

        if follow {
            thread::sleep(Duration::from_secs(1));
        } else if round >= rounds {
            break;
        }
    }

    source.stop();
    println!();
    println!("{}", engine.telemetry().summary());
}

fn print_rollup(engine: &EngagementEngine) {
    let analytics = engine.engagement_analytics();

    println!(
        "Sessions: {} total, {} active | avg duration: {:.1}s | bounce rate: {:.0}%",
        analytics.total_sessions,
        analytics.active_sessions,
        analytics.avg_session_duration_ms / 1000.0,
        analytics.bounce_rate * 100.0
    );

    let mut sources: Vec<String> = analytics
        .traffic_sources
        .iter()
        .map(|(source, count)| format!("{source:?}: {count}"))
        .collect();
    sources.sort();
    println!("Traffic sources: {}", sources.join(", "));

    if let Some(prediction) = &analytics.predictions {
        println!(
            "Projection: {:.0} users in 1 month ({:.0}% confident), {:.0} in 1 year ({:.0}%), {:.0} in 5 years ({:.0}%)",
            prediction.one_month.expected_users,
            prediction.one_month.confidence * 100.0,
            prediction.one_year.expected_users,
            prediction.one_year.confidence * 100.0,
            prediction.five_year.expected_users,
            prediction.five_year.confidence * 100.0
        );
    }

    let heatmap = analytics.heatmap;
    if !heatmap.is_empty() {
        let top: Vec<String> = heatmap
            .iter()
            .take(3)
            .map(|cell| format!("({}, {}) x{}", cell.x, cell.y, cell.count))
            .collect();
        println!("Hottest click cells: {}", top.join(", "));
    }
    println!();
}

fn cmd_export(output: Option<PathBuf>) {
    let config = EngineConfig::load().unwrap_or_default();
    let export_dir = output.unwrap_or_else(|| config.export_path.clone());

    let (mut engine, clock) = build_engine(config);
    let mut source = ScriptedSource::new();
    if let Err(e) = source.start() {
        eprintln!("Error starting event source: {e}");
        std::process::exit(1);
    }
    run_round(&mut engine, &source, &clock, 1);
    source.stop();

    if let Err(e) = std::fs::create_dir_all(&export_dir) {
        eprintln!("Error creating export directory: {e}");
        std::process::exit(1);
    }

    let export_path = export_dir.join(format!(
        "engagement_{}.json",
        Utc::now().format("%Y%m%d_%H%M%S")
    ));

    match serde_json::to_string_pretty(&engine.engagement_analytics()) {
        Ok(json) => {
            if let Err(e) = std::fs::write(&export_path, json) {
                eprintln!("Error writing rollup: {e}");
            } else {
                println!("Exported engagement rollup to {export_path:?}");
            }
        }
        Err(e) => {
            eprintln!("Error serializing rollup: {e}");
        }
    }
}

fn cmd_config() {
    let config = EngineConfig::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", EngineConfig::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");
}
