//! Command line and environment configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::solver::{AllocatorOptions, InvalidRoomPolicy};
use crate::strategy::Strategy;

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

#[derive(Debug, Parser)]
#[command(name = "seat-planner")]
#[command(about = "Conflict-free exam seating across classrooms")]
pub struct Cli {
    /// Default log filter when RUST_LOG is not set
    #[arg(long, global = true, env = "SEAT_PLANNER_LOG", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the seating API over HTTP
    Serve(ServeArgs),
    /// Seat a snapshot file and print the allocation, audit and seat charts as JSON
    Plan(PlanArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "SEAT_PLANNER_BIND", default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Snapshot document with `classrooms` and `students`
    pub snapshot: PathBuf,

    #[arg(long, value_enum, default_value_t = StrategyName::StickyPair)]
    pub strategy: StrategyName,

    /// Seed for the shuffled strategy (default 0); only valid with `--strategy shuffled`
    #[arg(long)]
    pub seed: Option<u64>,

    /// Fail instead of skipping a malformed classroom
    #[arg(long)]
    pub abort_on_invalid_room: bool,

    /// Indent the JSON output
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyName {
    StickyPair,
    PriorityFill,
    Shuffled,
}

impl PlanArgs {
    pub fn options(&self) -> Result<AllocatorOptions, clap::Error> {
        let strategy = match (self.strategy, self.seed) {
            (StrategyName::Shuffled, seed) => Strategy::Shuffled {
                seed: seed.unwrap_or_default(),
            },
            (_, Some(_)) => {
                return Err(clap::Error::raw(
                    ErrorKind::ArgumentConflict,
                    "--seed only applies to --strategy shuffled\n",
                ));
            }
            (StrategyName::StickyPair, None) => Strategy::StickyPair,
            (StrategyName::PriorityFill, None) => Strategy::PriorityFill,
        };
        let policy = if self.abort_on_invalid_room {
            InvalidRoomPolicy::Abort
        } else {
            InvalidRoomPolicy::Skip
        };
        Ok(AllocatorOptions::default()
            .with_strategy(strategy)
            .with_invalid_room_policy(policy))
    }
}
