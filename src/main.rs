use std::fs;

use anyhow::Context;
use clap::Parser;

use seat_planner::config::{Cli, Command, PlanArgs};
use seat_planner::{Snapshot, plan, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    match cli.command {
        Command::Serve(args) => server::run_server(args.bind)
            .await
            .with_context(|| format!("server on {} stopped", args.bind)),
        Command::Plan(args) => run_plan(&args),
    }
}

fn run_plan(args: &PlanArgs) -> anyhow::Result<()> {
    let options = args.options()?;
    let raw = fs::read_to_string(&args.snapshot)
        .with_context(|| format!("reading snapshot '{}'", args.snapshot.display()))?;
    let snapshot: Snapshot = serde_json::from_str(&raw)
        .with_context(|| format!("parsing snapshot '{}'", args.snapshot.display()))?;

    let result = plan(&snapshot, &options)?;
    for warning in &result.allocation.warnings {
        eprintln!("warning: {}", warning);
    }

    let output = if args.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{}", output);
    Ok(())
}
