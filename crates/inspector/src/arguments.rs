use {
    anyhow::{Context, Result},
    clap::{Parser, Subcommand},
    model::{account::AccountId, auction::AuctionPoint, order::OrderHash},
    number::U256,
    std::{fmt, path::PathBuf},
    tracing::Level,
};

/// Inspect Fusion+ orders, auction schedules and escrow timelocks.
#[derive(Debug, Parser)]
#[clap(name = "fusion-inspect")]
pub struct Arguments {
    /// Path to a TOML file describing the network, contracts, tokens and
    /// timelock stages. The NEAR testnet deployment is used when omitted.
    #[clap(long, env = "FUSION_CONFIG")]
    pub config: Option<PathBuf>,

    #[clap(long, env, default_value = "warn,inspector=info")]
    pub log_filter: String,

    /// Log events more severe than this level go to stderr, the rest to
    /// stdout.
    #[clap(long, env, default_value = "trace")]
    pub log_stderr_threshold: Level,

    #[clap(long, env)]
    pub use_json_logs: bool,

    /// Unix timestamp in seconds at which time dependent values are
    /// evaluated. Defaults to the system clock.
    #[clap(long, env = "FUSION_NOW")]
    pub now: Option<u64>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate an order creation payload and show its hash and summary.
    Validate {
        /// JSON file containing the order creation payload.
        #[clap(long)]
        order: PathBuf,
    },
    /// Build an order creation payload from human readable amounts.
    Create(CreateArguments),
    /// Print the rate bump schedule of an order's Dutch auction.
    Auction {
        /// JSON file containing the order creation payload.
        #[clap(long)]
        order: PathBuf,
        /// Seconds between two rows of the schedule.
        #[clap(long, default_value = "300")]
        step: u64,
    },
    /// List order states from an indexer snapshot.
    Orders {
        /// JSON file containing an array of order states.
        #[clap(long)]
        snapshot: PathBuf,
        /// Only show the order with this hash.
        #[clap(long)]
        hash: Option<OrderHash>,
    },
    /// Check a fill of an indexed order and show what each party receives.
    Quote {
        /// JSON file containing an array of order states.
        #[clap(long)]
        snapshot: PathBuf,
        #[clap(long)]
        hash: OrderHash,
        /// Maker asset amount in its smallest unit.
        #[clap(long)]
        making: U256,
        /// Taker asset amount in its smallest unit, before the rate bump.
        #[clap(long)]
        taking: U256,
    },
    /// Print the stage times of an escrow deployed at the given time.
    Timelocks {
        #[clap(long)]
        deployed_at: u64,
    },
}

#[derive(Debug, clap::Args)]
pub struct CreateArguments {
    #[clap(long)]
    pub maker: AccountId,

    #[clap(long)]
    pub resolver: Option<AccountId>,

    /// Symbol of the token the maker gives.
    #[clap(long)]
    pub sell: String,

    /// Symbol of the token the maker receives.
    #[clap(long)]
    pub buy: String,

    /// Amount of `sell` in whole tokens, e.g. `1.5`.
    #[clap(long)]
    pub sell_amount: String,

    /// Amount of `buy` in whole tokens.
    #[clap(long)]
    pub buy_amount: String,

    #[clap(long, default_value = "0")]
    pub maker_traits: u64,

    /// Attach a Dutch auction lasting this many seconds.
    #[clap(long)]
    pub auction_duration: Option<u64>,

    /// Seconds from now until the auction starts.
    #[clap(long, default_value = "0")]
    pub auction_delay: u64,

    /// Rate bump at the auction start in basis points.
    #[clap(long, default_value = "100")]
    pub initial_rate_bump: u32,

    /// Decay checkpoint as `<delay>:<coefficient>`, may be repeated.
    #[clap(long = "point", value_parser = auction_point)]
    pub points: Vec<AuctionPoint>,
}

pub fn auction_point(s: &str) -> Result<AuctionPoint> {
    let (delay, coefficient) = s
        .split_once(':')
        .context("expected <delay>:<coefficient>")?;
    Ok(AuctionPoint {
        delay: delay.trim().parse().context("invalid delay")?,
        coefficient: coefficient.trim().parse().context("invalid coefficient")?,
    })
}

impl fmt::Display for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            config,
            log_filter,
            log_stderr_threshold,
            use_json_logs,
            now,
            command,
        } = self;

        writeln!(f, "config: {config:?}")?;
        writeln!(f, "log_filter: {log_filter}")?;
        writeln!(f, "log_stderr_threshold: {log_stderr_threshold}")?;
        writeln!(f, "use_json_logs: {use_json_logs}")?;
        writeln!(f, "now: {now:?}")?;
        writeln!(f, "command: {command:?}")?;
        Ok(())
    }
}
