//! Offline inspection of Fusion+ orders: validating and building order
//! creation payloads, tabulating Dutch auction schedules, listing indexed
//! order states, quoting fills against them and computing escrow timelock
//! stages.

pub mod arguments;
pub mod commands;
pub mod config;
pub mod source;

use {
    anyhow::{Context, Result},
    arguments::{Arguments, Command},
    config::Configuration,
    source::SnapshotFile,
    std::io::Write,
};

pub fn run(args: Arguments, out: &mut impl Write) -> Result<()> {
    let config = match &args.config {
        Some(path) => Configuration::from_path(path)?,
        None => Configuration::default(),
    }
    .validate()?;
    tracing::debug!(network = %config.network.network_id, "loaded configuration");

    let now = match args.now {
        Some(now) => now,
        None => chrono::Utc::now()
            .timestamp()
            .try_into()
            .context("system clock is before the unix epoch")?,
    };
    let tokens = config.token_list();

    match &args.command {
        Command::Validate { order } => {
            commands::validate(&tokens, &commands::read_order(order)?, now, out)
        }
        Command::Create(create) => commands::create(&tokens, create, now, out).map(|_| ()),
        Command::Auction { order, step } => {
            commands::auction(&tokens, &commands::read_order(order)?, *step, now, out)
        }
        Command::Orders { snapshot, hash } => {
            commands::orders(&SnapshotFile::new(snapshot), &tokens, hash.as_ref(), now, out)
        }
        Command::Quote {
            snapshot,
            hash,
            making,
            taking,
        } => commands::quote(
            &SnapshotFile::new(snapshot),
            &tokens,
            hash,
            (*making, *taking),
            config.contracts.protocol_fee_bps,
            now,
            out,
        ),
        Command::Timelocks { deployed_at } => {
            commands::timelocks(config.timelocks, *deployed_at, now, out)
        }
    }
}
