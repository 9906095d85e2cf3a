//! Travgen - command line character generator
//!
//! Prints a character sheet (or JSON) for one character or a party.
//! Logging goes to stderr so JSON on stdout stays clean.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use travgen::assembler::{self, CandidatePreferences, CareerChoice, FinalCharacter};
use travgen::core::error::{ChargenError, Result};
use travgen::core::{GenerationConfig, QualificationFailurePolicy};
use travgen::rules::RuleTables;

/// Generate characters by serving terms in careers
#[derive(Parser, Debug)]
#[command(name = "travgen")]
#[command(about = "Generate characters through term-based careers")]
struct Args {
    /// Career to try, by id or name, or "random"; repeat for later careers
    #[arg(long = "career", short = 'c')]
    careers: Vec<CareerChoice>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum number of careers
    #[arg(long)]
    max_careers: Option<u32>,

    /// Maximum number of terms across all careers
    #[arg(long)]
    max_terms: Option<u32>,

    /// Qualification failure policy: fallback, draft or reject
    #[arg(long)]
    on_fail: Option<QualificationFailurePolicy>,

    /// Ruleset TOML file (defaults to the built-in classic rules)
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Directory of extra career TOML files
    #[arg(long)]
    careers_dir: Option<PathBuf>,

    /// Generation config TOML file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Generate a party of this many characters
    #[arg(long, default_value_t = 1)]
    party: usize,

    /// Character name
    #[arg(long, default_value = "Traveller")]
    name: String,

    /// Print JSON instead of a character sheet
    #[arg(long)]
    json: bool,

    /// Check the rule tables for missing tables and exit
    #[arg(long)]
    check: bool,

    /// Debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "travgen=debug" } else { "travgen=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut tables = match &args.rules {
        Some(path) => RuleTables::load_file(path)?,
        None => RuleTables::builtin()?,
    };
    if let Some(dir) = &args.careers_dir {
        let added = tables.load_careers_dir(dir)?;
        tracing::info!("Loaded {} extra careers from {}", added, dir.display());
    }

    if args.check {
        let issues = tables.validate();
        if issues.is_empty() {
            println!("{}: {} careers, no missing tables", tables.ruleset().name, tables.careers().len());
            return Ok(());
        }
        for issue in &issues {
            println!("{}", issue);
        }
        return Err(ChargenError::InvalidRule(format!("{} missing tables", issues.len())));
    }

    let mut config = match &args.config {
        Some(path) => GenerationConfig::load(path)?,
        None => GenerationConfig::default(),
    };
    if let Some(max_terms) = args.max_terms {
        config.max_total_terms = max_terms;
    }
    if let Some(policy) = args.on_fail {
        config.qualification_failure = policy;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.validate()?;

    let prefs = CandidatePreferences {
        name: args.name.clone(),
        careers: args.careers.clone(),
        seed: args.seed,
        max_careers: args.max_careers,
        ..CandidatePreferences::default()
    };

    let results = if args.party > 1 {
        assembler::generate_party(&tables, &config, &prefs, args.party)
    } else {
        vec![assembler::generate(&tables, &config, &prefs)]
    };

    let mut characters = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(character) => characters.push(character),
            Err(ChargenError::BoundExceeded { limit, partial }) => {
                tracing::warn!("{} stopped at the {}-term limit; showing partial character", partial.name(), limit);
                characters.push(*partial);
            }
            Err(e) => return Err(e),
        }
    }

    print_characters(&characters, args.json)
}

fn print_characters(characters: &[FinalCharacter], json: bool) -> Result<()> {
    if json {
        let states: Vec<_> = characters.iter().map(FinalCharacter::state).collect();
        println!("{}", serde_json::to_string_pretty(&states)?);
    } else {
        for character in characters {
            println!("{}", character.summary());
        }
    }
    Ok(())
}
