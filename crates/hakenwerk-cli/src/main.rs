//! CLI for hakenwerk.
//!
//! Operates on JSON files: a hook store, a context snapshot and single
//! conditions. Provides commands for matching a store against a context,
//! normalizing conditions and executing a single hook symbolically. It is
//! a thin consumer of the engine's public API; all state stays in the
//! files the caller passes in.

use anyhow::{bail, Context as _, Result};
use clap::{Parser, Subcommand};
use hakenwerk_core::{Condition, Context, HookStore};
use hakenwerk_engine::{hooks, interp};
use hakenwerk_store::{condition_key, default_policy, lookup_hook};
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match every hook in a store against a context
    Activate {
        /// Path to the hook store JSON
        #[arg(long)]
        store: PathBuf,

        /// Path to the context JSON
        #[arg(long)]
        context: PathBuf,

        /// Print only the prioritized match
        #[arg(long)]
        pick: bool,
    },
    /// Canonicalize a condition
    Normalize {
        /// Path to the condition JSON
        #[arg(long)]
        condition: PathBuf,

        /// Print the store index key instead of the normalized condition
        #[arg(long)]
        key: bool,
    },
    /// Execute one hook's action over a context and print the result
    Execute {
        /// Path to the hook store JSON
        #[arg(long)]
        store: PathBuf,

        /// Path to the context JSON
        #[arg(long)]
        context: PathBuf,

        /// Id of the hook to execute
        #[arg(long)]
        hook: String,

        /// Print the rolled-back context instead of the post context
        #[arg(long)]
        rollback: bool,
    },
}

#[derive(Serialize)]
struct MatchRecord<'a> {
    hook_id: &'a str,
    cost: f64,
    success: f64,
    specificity: f64,
}

fn load_store(path: &Path) -> Result<HookStore> {
    let file = File::open(path).with_context(|| format!("failed to open store {path:?}"))?;
    serde_json::from_reader(file).with_context(|| format!("invalid store JSON in {path:?}"))
}

fn load_context(path: &Path) -> Result<Context> {
    let file = File::open(path).with_context(|| format!("failed to open context {path:?}"))?;
    serde_json::from_reader(file).with_context(|| format!("invalid context JSON in {path:?}"))
}

fn load_condition(path: &Path) -> Result<Condition> {
    let file = File::open(path).with_context(|| format!("failed to open condition {path:?}"))?;
    serde_json::from_reader(file).with_context(|| format!("invalid condition JSON in {path:?}"))
}

fn print_match(m: &hakenwerk_core::HookMatch) -> Result<()> {
    let record = MatchRecord {
        hook_id: &m.hook.id,
        cost: m.cost,
        success: m.hook.stats.success,
        specificity: m.hook.specificity,
    };
    println!("{}", serde_json::to_string(&record)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Activate {
            store,
            context,
            pick,
        } => {
            let store = load_store(&store)?;
            let ctx = load_context(&context)?;
            let matches = hooks::activate(&store, &ctx);

            if pick {
                match hooks::prioritize(&default_policy(), &matches) {
                    Some(top) => print_match(&top)?,
                    None => bail!("no hook matched the context"),
                }
            } else {
                for m in &matches {
                    print_match(m)?;
                }
            }
        }
        Commands::Normalize { condition, key } => {
            let cond = load_condition(&condition)?;
            if key {
                println!("{}", condition_key(&cond)?);
            } else {
                let normalized = hakenwerk_engine::cond::normalize(cond);
                println!("{}", serde_json::to_string_pretty(&normalized)?);
            }
        }
        Commands::Execute {
            store,
            context,
            hook,
            rollback,
        } => {
            let store = load_store(&store)?;
            let ctx = load_context(&context)?;
            let Some(found) = lookup_hook(&hook, &store) else {
                bail!("unknown hook id: {hook}");
            };
            if !hakenwerk_engine::cond::eval(&found.condition, &ctx) {
                bail!("hook '{hook}' does not match the given context");
            }

            let (post, rb) = interp::interpret_plan(&found.action.plan, &ctx);
            let printed = if rollback {
                interp::interpret_rollback(&rb, &post)
            } else {
                post
            };
            println!("{}", serde_json::to_string_pretty(&printed)?);
        }
    }

    Ok(())
}
