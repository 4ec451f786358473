//! Mission Score CLI
//!
//! Command-line interface for scoring operational data against a mission
//! hierarchy described by a JSON document.

use anyhow::{bail, Context};
use missionscore_core::{
    logging, Config, CriticalityAnalyzer, ImportanceAnalyzer, Normalizer, ScoreMatrix,
    ScorePropagator, ScoringDocument, ScoringInput, ScoringReport,
};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::process;

/// Options shared by every command
#[derive(Debug, Default)]
struct Options {
    input: Option<PathBuf>,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
    json: bool,
    json_logs: bool,
}

impl Options {
    fn parse(args: &[String]) -> anyhow::Result<Self> {
        let mut options = Options::default();
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--input" | "-i" => options.input = iter.next().map(PathBuf::from),
                "--config" | "-c" => options.config = iter.next().map(PathBuf::from),
                "--output" | "-o" => options.output = iter.next().map(PathBuf::from),
                "--json" => options.json = true,
                "--json-logs" => options.json_logs = true,
                other => bail!("Unknown option: {}", other),
            }
        }
        Ok(options)
    }

    fn load(&self) -> anyhow::Result<(ScoringInput, Config)> {
        let Some(input) = &self.input else {
            bail!("Missing --input argument");
        };

        let config = match &self.config {
            Some(path) => Config::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => Config::default_config(),
        };

        let document = ScoringDocument::from_path(input)
            .with_context(|| format!("Failed to load document {}", input.display()))?;
        Ok((document.into_input()?, config))
    }

    fn write_output(&self, content: &str) -> anyhow::Result<()> {
        if let Some(path) = &self.output {
            fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if !self.json {
                println!("Results saved to: {}", path.display());
            }
        }
        Ok(())
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_propagate(options: &Options) -> anyhow::Result<()> {
    let (input, config) = options.load()?;

    let outcome = ScorePropagator::new(&input.hierarchy, &input.facts)
        .with_config(config.propagation.clone())
        .propagate_all(&input.data);
    let normalized = Normalizer::new(config.normalization.clone()).normalize(&outcome.scores)?;

    let matrix = ScoreMatrix::build(&input.hierarchy, &input.data, &normalized);
    options.write_output(&matrix.to_csv(config.output.precision))?;

    if options.json {
        print_json(&ScoringReport::new(&outcome, &normalized))?;
    } else {
        print!("{}", matrix.to_csv(config.output.precision));
        for failure in &outcome.failures {
            println!(
                "Unscored: datum {} / mission {}: {}",
                failure.datum, failure.mission, failure.error
            );
        }
    }
    Ok(())
}

fn cmd_criticality(options: &Options) -> anyhow::Result<()> {
    let (input, config) = options.load()?;

    let scores = CriticalityAnalyzer::new(&input.hierarchy, &input.facts)
        .with_config(config.criticality.clone())
        .analyze(&input.data)?;

    if let Some(path) = &options.output {
        fs::write(path, serde_json::to_string_pretty(&scores)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    if options.json {
        print_json(&scores)?;
    } else {
        for score in &scores {
            println!(
                "{}: {:.2} (raw {:.4}, breadth {}, depth {})",
                score.label, score.normalized, score.raw, score.breadth, score.depth
            );
        }
    }
    Ok(())
}

fn cmd_importance(options: &Options) -> anyhow::Result<()> {
    let (input, config) = options.load()?;

    let table = ImportanceAnalyzer::new(&input.hierarchy, &input.facts)
        .with_config(config.importance.clone())
        .analyze(&input.data)?;

    let matrix = ScoreMatrix::build(&input.hierarchy, &input.data, &table);
    options.write_output(&matrix.to_csv(config.output.precision))?;

    if options.json {
        print_json(&table.entries())?;
    } else {
        print!("{}", matrix.to_csv(config.output.precision));
    }
    Ok(())
}

fn print_usage() {
    println!("Mission Score - Utilization scoring of operational data across missions");
    println!();
    println!("USAGE:");
    println!("    mission-score propagate --input <doc.json> [--config <cfg.toml>] [--output <file.csv>] [--json]");
    println!("    mission-score criticality --input <doc.json> [--config <cfg.toml>] [--output <file.json>] [--json]");
    println!("    mission-score importance --input <doc.json> [--config <cfg.toml>] [--output <file.csv>] [--json]");
    println!();
    println!("COMMANDS:");
    println!("    propagate     Bottom-up utilization scores, normalized");
    println!("    criticality   Breadth criticality of each datum");
    println!("    importance    PageRank importance of each datum per mission");
    println!();
    println!("OPTIONS:");
    println!("    --json-logs   Emit logs as JSON (level from RUST_LOG)");
    println!();
    println!("EXAMPLES:");
    println!("    mission-score propagate --input missions.json --output scores.csv");
    println!("    mission-score criticality --input missions.json --json");
}

fn parse_args() -> anyhow::Result<(String, Vec<String>)> {
    let args: Vec<String> = std::env::args().collect();

    match args.split_first().and_then(|(_, rest)| rest.split_first()) {
        Some((command, rest)) => Ok((command.clone(), rest.to_vec())),
        None => bail!("Usage: mission-score <command> [options]"),
    }
}

fn run() -> anyhow::Result<()> {
    let (command, args) = parse_args()?;
    if matches!(command.as_str(), "help" | "--help" | "-h") {
        print_usage();
        return Ok(());
    }

    let options = Options::parse(&args)?;
    if options.json_logs {
        logging::init_json();
    } else {
        logging::init();
    }
    tracing::debug!(command = %command, ?options, "Starting");

    match command.as_str() {
        "propagate" => cmd_propagate(&options),
        "criticality" => cmd_criticality(&options),
        "importance" => cmd_importance(&options),
        _ => {
            print_usage();
            bail!("Unknown command: {}", command)
        }
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
