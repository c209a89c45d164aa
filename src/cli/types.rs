//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cardsignal")]
#[command(about = "Card-game prediction tracker for chat result channels", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Extra configuration file merged over .cardsignal/config.yaml
    #[arg(short, long, global = true, env = "CARDSIGNAL_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process message events from stdin or a file
    Run(RunArgs),

    /// Import a schedule export (CSV: date_heure,numero,victoire)
    Import(ImportArgs),

    /// Show tunables and tracker counts
    Status,

    /// List scheduled entries not yet launched
    Pending,

    /// Change prediction tunables
    Tune(TuneArgs),

    /// Drop stored predictions
    Clear(ClearArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Read events from this file instead of stdin
    #[arg(short, long)]
    pub input: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Schedule file
    pub file: PathBuf,

    /// Merge into the stored schedule instead of replacing it
    #[arg(short, long)]
    pub merge: bool,
}

#[derive(Args, Debug)]
pub struct TuneArgs {
    /// Games between the triggering line and the predicted game
    #[arg(short = 'a', long)]
    pub offset_a: Option<u64>,

    /// Extra games a live prediction may take (0-10)
    #[arg(short = 'r', long)]
    pub max_offset: Option<u32>,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct ClearArgs {
    /// Drop the imported schedule
    #[arg(long)]
    pub schedule: bool,

    /// Drop live predictions
    #[arg(long)]
    pub live: bool,

    /// Drop both
    #[arg(long)]
    pub all: bool,
}
