//! Meridian headless simulator.
//!
//! - `meridian-sim run` - play a game for a number of rounds and report
//! - `meridian-sim init` - write a settings file with every default spelled out

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use meridian_core::{load_rules, GameEngine, GameSettings, Rules, RulesSource};
use meridian_protocol::{CivSnapshot, GameEvent, GameOutcome};

#[derive(Parser)]
#[command(name = "meridian-sim")]
#[command(about = "Headless turn-based strategy simulator", version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game
    Run(RunArgs),

    /// Write default settings to a YAML file
    Init {
        #[arg(default_value = "meridian.yaml")]
        path: PathBuf,
    },
}

#[derive(clap::Args)]
struct RunArgs {
    /// Settings file (YAML); flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ruleset file (YAML); the built-in ruleset is used otherwise
    #[arg(long)]
    rules: Option<PathBuf>,

    #[arg(long)]
    seed: Option<u64>,

    /// Full rounds to play
    #[arg(long, default_value_t = 50)]
    turns: u32,

    #[arg(long)]
    civs: Option<u8>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Let the AI play every civilization
    #[arg(long)]
    all_ai: bool,

    /// Append every emitted event to this file as JSON lines
    #[arg(long)]
    events: Option<PathBuf>,

    /// Print the final summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Summary {
    turn: u32,
    year: i32,
    events: usize,
    outcome: Option<GameOutcome>,
    civilizations: Vec<CivSummary>,
}

#[derive(Serialize)]
struct CivSummary {
    #[serde(flatten)]
    civ: CivSnapshot,
    cities: usize,
    units: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Run(args)) => run_game(args).await,
        Some(Commands::Init { path }) => init_settings(&path),
        None => {
            println!("Meridian - headless strategy simulator");
            println!();
            println!("Usage: meridian-sim <COMMAND>");
            println!();
            println!("Commands:");
            println!("  run   Play a game and print a summary");
            println!("  init  Write default settings");
            println!();
            println!("Run 'meridian-sim --help' for more information.");
            Ok(())
        }
    }
}

fn settings_from(args: &RunArgs) -> Result<GameSettings> {
    let mut settings = match &args.config {
        Some(path) => GameSettings::from_path(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => GameSettings::default(),
    };
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }
    if let Some(civs) = args.civs {
        settings.civ_count = civs;
        if settings.player_civ.is_some_and(|p| p >= civs) {
            settings.player_civ = Some(0);
        }
    }
    if let Some(width) = args.width {
        settings.map_width = width;
    }
    if let Some(height) = args.height {
        settings.map_height = height;
    }
    if args.all_ai {
        settings.player_civ = None;
    }
    settings.validate()?;
    Ok(settings)
}

fn rules_from(path: Option<&Path>) -> Result<Rules> {
    let rules = match path {
        Some(path) => load_rules(RulesSource::Path(path.display().to_string()))
            .with_context(|| format!("loading rules from {}", path.display()))?,
        None => Rules::embedded()?,
    };
    Ok(rules)
}

async fn run_game(args: RunArgs) -> Result<()> {
    let settings = settings_from(&args)?;
    let rules = rules_from(args.rules.as_deref())?;
    tracing::info!(
        seed = settings.seed,
        civs = settings.civ_count,
        turns = args.turns,
        "starting simulation"
    );

    let mut engine = GameEngine::new(settings, rules)?;
    let mut sink = match &args.events {
        Some(path) => Some(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => None,
    };
    let mut emitted = 0;
    emitted += flush_events(&mut engine, sink.as_mut())?;

    let last_turn = engine.turn() + args.turns;
    while engine.turn() < last_turn && !engine.is_game_over() {
        let active = engine.active_civ();
        if engine.civ(active).is_some_and(|c| c.is_human) {
            // Humans have no one at the controls here; their turns end as they start.
            engine.advance_turn_async().await?;
        } else {
            engine.run_ai_turns_async().await;
        }
        emitted += flush_events(&mut engine, sink.as_mut())?;
    }

    if let Some(mut sink) = sink {
        sink.flush()?;
    }

    let summary = summarize(&engine, emitted);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn flush_events(engine: &mut GameEngine, sink: Option<&mut BufWriter<File>>) -> Result<usize> {
    let events = engine.drain_events();
    if let Some(sink) = sink {
        for event in &events {
            write_event(sink, event)?;
        }
    }
    Ok(events.len())
}

fn write_event(sink: &mut impl Write, event: &GameEvent) -> Result<()> {
    serde_json::to_writer(&mut *sink, event)?;
    sink.write_all(b"\n")?;
    Ok(())
}

fn summarize(engine: &GameEngine, events: usize) -> Summary {
    let civilizations = engine
        .civ_snapshots()
        .into_iter()
        .map(|civ| CivSummary {
            cities: engine.city_ids(civ.id).len(),
            units: engine.unit_ids(civ.id).len(),
            civ,
        })
        .collect();
    Summary {
        turn: engine.turn(),
        year: engine.year(),
        events,
        outcome: engine.outcome().cloned(),
        civilizations,
    }
}

fn format_year(year: i32) -> String {
    if year < 0 {
        format!("{} BC", -year)
    } else {
        format!("{year} AD")
    }
}

fn print_summary(summary: &Summary) {
    println!("Meridian Simulation");
    println!("===================");
    println!();
    println!("Turn {} ({})", summary.turn, format_year(summary.year));
    println!("Events emitted: {}", summary.events);
    println!();
    for c in &summary.civilizations {
        let marker = if c.civ.is_alive { " " } else { "x" };
        println!(
            "  [{marker}] {:<12} cities {:>2}  units {:>3}  gold {:>5}  techs {:>2}",
            c.civ.name,
            c.cities,
            c.units,
            c.civ.gold,
            c.civ.known_techs.len()
        );
    }
    println!();
    match &summary.outcome {
        Some(outcome) => println!(
            "{} {} ({:?})",
            outcome.civ_name,
            if outcome.won { "won" } else { "lost" },
            outcome.reason
        ),
        None => println!("No winner yet."),
    }
}

fn init_settings(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    let yaml = serde_yaml::to_string(&GameSettings::default())?;
    std::fs::write(path, format!("# Meridian game settings\n\n{yaml}"))?;
    println!("Wrote default settings to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn years_read_as_bc_and_ad() {
        assert_eq!(format_year(-4000), "4000 BC");
        assert_eq!(format_year(1), "1 AD");
    }

    #[test]
    fn all_ai_flag_clears_the_player() {
        let cli = Cli::parse_from(["meridian-sim", "run", "--all-ai", "--civs", "3", "--seed", "9"]);
        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run");
        };
        let settings = settings_from(&args).unwrap();
        assert_eq!(settings.player_civ, None);
        assert_eq!(settings.civ_count, 3);
        assert_eq!(settings.seed, 9);
    }

    #[test]
    fn events_are_written_one_per_line() {
        let mut out = Vec::new();
        let event = GameEvent::AiFinished {
            civilization_id: meridian_protocol::CivId(1),
        };
        write_event(&mut out, &event).unwrap();
        write_event(&mut out, &event).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with(r#"{"type":"AI_FINISHED""#));
    }
}
