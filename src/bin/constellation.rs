use clap::{App, Arg};
use colored::*;
use constellation::logs::LogLevel;
use constellation::state_machine::SatelliteState;
use constellation::{ConstellationConfig, ConstellationController, LogFilters};
use std::time::Duration;
use tokio::time;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = App::new("constellation-sim")
        .version("0.7.0")
        .author("Constellation Ground Segment Team")
        .about("🛰️  Constellation ground-segment simulator - fleet supervision and observatory feed")
        .arg(
            Arg::with_name("duration")
                .short("d")
                .long("duration")
                .value_name("SECONDS")
                .help("How long to run the simulation")
                .takes_value(true)
                .default_value("30")
                .validator(|v| {
                    v.parse::<u64>()
                        .map(|_| ())
                        .map_err(|_| "Duration must be a number of seconds".into())
                }),
        )
        .arg(
            Arg::with_name("level")
                .short("l")
                .long("level")
                .value_name("LEVEL")
                .help("Only show observatory entries at this level")
                .takes_value(true)
                .possible_values(&["debug", "info", "warning", "error"]),
        )
        .arg(
            Arg::with_name("search")
                .short("s")
                .long("search")
                .value_name("TEXT")
                .help("Only show observatory entries matching this text")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("seed")
                .long("seed")
                .value_name("SEED")
                .help("Fixed seed for a reproducible simulation")
                .takes_value(true)
                .validator(|v| {
                    v.parse::<u64>()
                        .map(|_| ())
                        .map_err(|_| "Seed must be an unsigned integer".into())
                }),
        )
        .arg(
            Arg::with_name("fault-percent")
                .long("fault-percent")
                .value_name("PERCENT")
                .help("Probability of an injected command link fault (0-100)")
                .takes_value(true)
                .default_value("0")
                .validator(|v| match v.parse::<f32>() {
                    Ok(p) if (0.0..=100.0).contains(&p) => Ok(()),
                    _ => Err("Fault percentage must be between 0 and 100".into()),
                }),
        )
        .get_matches();

    tracing_subscriber::fmt::init();

    let duration_s = matches.value_of("duration").unwrap_or("30").parse::<u64>()?;
    let seed = matches.value_of("seed").and_then(|v| v.parse::<u64>().ok());
    let fault_percent = matches
        .value_of("fault-percent")
        .unwrap_or("0")
        .parse::<f32>()?;

    let config = ConstellationConfig {
        command_fault_percent: fault_percent,
        ..ConstellationConfig::default()
    };
    let mut controller = ConstellationController::start_seeded(config, seed);

    let mut filters = LogFilters::new();
    filters.level = matches
        .value_of("level")
        .and_then(|v| v.parse::<LogLevel>().ok());
    if let Some(search) = matches.value_of("search") {
        filters.search = search.to_string();
    }
    controller.set_filters(filters).await;

    println!("{}", "🛰️  Prototype Constellation".bright_blue().bold());
    println!("{}", "===========================".bright_blue());

    // Bring the stock fleet up to running so the liveness engine has
    // something to supervise.
    for id in ["sat-1", "sat-2", "sat-3"] {
        controller.transition(id, SatelliteState::Initialized).await;
        controller.transition(id, SatelliteState::Launched).await;
        controller.transition(id, SatelliteState::Running).await;
    }

    let version = controller.send_command("sat-1", "get_version").await;
    println!(
        "{} {}",
        "Fleet reports:".dimmed(),
        version.payload["version"].as_str().unwrap_or("unknown")
    );

    let mut display = time::interval(Duration::from_secs(2));
    let deadline = time::Instant::now() + Duration::from_secs(duration_s);

    loop {
        tokio::select! {
            _ = display.tick() => {
                render_status(&controller).await;
            }
            () = time::sleep_until(deadline) => {
                break;
            }
        }
    }

    controller.shutdown();
    println!("{}", "🛰️  Constellation simulator stopped".bright_blue());
    Ok(())
}

async fn render_status(controller: &ConstellationController) {
    let global = controller.global_state().await;
    let run = controller.run_status().await;
    let rate = controller.messages_per_minute().await;

    println!();
    println!(
        "{} {}  {} {}  {} {}/min",
        "Constellation:".bright_white().bold(),
        colored_state(&global.to_string()),
        "Run:".bright_white(),
        run.run_id.as_deref().unwrap_or("—"),
        "Observatory:".bright_white(),
        rate
    );

    for sat in controller.satellites().await {
        println!(
            "  {} {:<18} {:<12} {} {}  {}",
            "·".dimmed(),
            sat.name,
            colored_state(sat.state.as_str()),
            "lives".dimmed(),
            sat.lives,
            sat.last_message.dimmed()
        );
    }

    let entries = controller.filtered_entries().await;
    for entry in entries.iter().rev().take(3).rev() {
        println!(
            "  {} [{}] {} {}: {}",
            "»".dimmed(),
            colored_level(entry.level),
            entry.sender.dimmed(),
            entry.topic.dimmed(),
            entry.message
        );
    }
}

fn colored_state(state: &str) -> ColoredString {
    match state {
        "running" => state.bright_green(),
        "error" => state.bright_red(),
        "mixed" | "stopped" => state.bright_yellow(),
        _ => state.normal(),
    }
}

fn colored_level(level: LogLevel) -> ColoredString {
    match level {
        LogLevel::Debug => "debug".dimmed(),
        LogLevel::Info => "info".bright_blue(),
        LogLevel::Warning => "warning".bright_yellow(),
        LogLevel::Error => "error".bright_red(),
    }
}
