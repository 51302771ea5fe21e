//! The subcommands of `fusion-inspect`. Each writes its report to `out` so
//! that the output can be checked without a terminal.

use {
    crate::{arguments::CreateArguments, source::OrderStateSource},
    anyhow::{Context, Result, anyhow, ensure},
    model::{
        auction::{AuctionDetails, COEFFICIENT_SCALE},
        escrow::{StageOffsets, Timelocks},
        order::{MakerTraits, OrderCreation, OrderData, OrderHash, Salt},
        order_state::OrderState,
        token::TokenList,
    },
    number::U256,
    std::{io::Write, path::Path},
};

pub fn read_order(path: &Path) -> Result<OrderCreation> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read order {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse order {}", path.display()))
}

/// Checks an order creation payload and prints what it swaps.
pub fn validate(
    tokens: &TokenList,
    order: &OrderCreation,
    now: u64,
    out: &mut impl Write,
) -> Result<()> {
    order.validate().context("order is invalid")?;

    writeln!(out, "hash: {}", order.hash()?)?;
    writeln!(out, "swap: {}", tokens.describe(&order.data))?;
    writeln!(out, "maker: {}", order.data.maker)?;
    match &order.data.resolver {
        Some(resolver) => writeln!(out, "resolver: {resolver}")?,
        None => writeln!(out, "resolver: any")?,
    }
    match &order.auction {
        Some(auction) => {
            writeln!(
                out,
                "auction: {} from {} to {}, rate bump now {} bps",
                auction.phase(now)?,
                auction.start_time,
                auction.end_time()?,
                auction.rate_bump_at(now)?,
            )?;
        }
        None => writeln!(out, "auction: none")?,
    }
    Ok(())
}

/// Builds an order creation payload from token symbols and whole token
/// amounts and prints it as JSON.
pub fn create(
    tokens: &TokenList,
    args: &CreateArguments,
    now: u64,
    out: &mut impl Write,
) -> Result<OrderCreation> {
    let sell = tokens
        .by_symbol(&args.sell)
        .ok_or_else(|| anyhow!("unknown token {}", args.sell))?;
    let buy = tokens
        .by_symbol(&args.buy)
        .ok_or_else(|| anyhow!("unknown token {}", args.buy))?;

    let auction = args
        .auction_duration
        .map(|duration| -> Result<_> {
            Ok(AuctionDetails {
                start_time: now
                    .checked_add(args.auction_delay)
                    .context("auction start overflows")?,
                duration,
                initial_rate_bump: args.initial_rate_bump,
                points: args.points.clone(),
            })
        })
        .transpose()?;
    ensure!(
        auction.is_some() || args.points.is_empty(),
        "auction points require an auction duration"
    );

    let order = OrderCreation {
        data: OrderData {
            maker: args.maker.clone(),
            resolver: args.resolver.clone(),
            maker_asset: sell.id.clone(),
            taker_asset: buy.id.clone(),
            making_amount: sell
                .parse(&args.sell_amount)
                .with_context(|| format!("invalid {} amount", sell.symbol))?,
            taking_amount: buy
                .parse(&args.buy_amount)
                .with_context(|| format!("invalid {} amount", buy.symbol))?,
            maker_traits: MakerTraits(args.maker_traits),
            salt: Salt::random(),
        },
        auction,
    };
    order.validate().context("order is invalid")?;

    tracing::info!(hash = %order.hash()?, swap = %tokens.describe(&order.data), "created order");
    serde_json::to_writer_pretty(&mut *out, &order)?;
    writeln!(out)?;
    Ok(order)
}

/// Prints the rate bump and the bumped taking amount every `step` seconds
/// from the start to the end of the order's auction.
pub fn auction(
    tokens: &TokenList,
    order: &OrderCreation,
    step: u64,
    now: u64,
    out: &mut impl Write,
) -> Result<()> {
    ensure!(step > 0, "step must be positive");
    order.validate().context("order is invalid")?;
    let auction = order.auction.as_ref().context("order has no auction")?;
    let end = auction.end_time()?;

    writeln!(
        out,
        "auction {} at {now}, initial rate bump {} bps",
        auction.phase(now)?,
        auction.initial_rate_bump
    )?;
    writeln!(
        out,
        "{:>12} {:>8} {:>12} {:>9}  taking amount",
        "time", "elapsed", "coefficient", "bump bps"
    )?;
    let mut time = auction.start_time;
    loop {
        let coefficient = auction.coefficient_at(time)?;
        let taking = auction.bumped_taking_amount(order.data.taking_amount, time)?;
        writeln!(
            out,
            "{:>12} {:>8} {:>12} {:>9}  {}",
            time,
            time - auction.start_time,
            format_percentage(coefficient),
            auction.rate_bump_at(time)?,
            tokens.format_amount(&order.data.taker_asset, taking),
        )?;
        if time >= end {
            break;
        }
        time = time.saturating_add(step).min(end);
    }
    Ok(())
}

/// A coefficient as a percentage with four decimals, e.g. `75.0000%`.
fn format_percentage(coefficient: u32) -> String {
    const UNITS_PER_PERCENT: u32 = COEFFICIENT_SCALE / 100;
    format!(
        "{}.{:04}%",
        coefficient / UNITS_PER_PERCENT,
        coefficient % UNITS_PER_PERCENT
    )
}

/// Lists order states with their fill progress. States that fail validation
/// are logged and skipped.
pub fn orders(
    source: &dyn OrderStateSource,
    tokens: &TokenList,
    hash: Option<&OrderHash>,
    now: u64,
    out: &mut impl Write,
) -> Result<()> {
    let states = match hash {
        Some(hash) => vec![
            source
                .order_state(hash)?
                .ok_or_else(|| anyhow!("order {hash} not found"))?,
        ],
        None => source.order_states()?,
    };

    let mut listed = 0;
    for state in &states {
        if let Err(err) = state.validate() {
            tracing::warn!(hash = %state.order.order_hash, ?err, "skipping invalid order state");
            continue;
        }
        write_order_state(tokens, state, now, out)?;
        listed += 1;
    }
    writeln!(out, "{listed} of {} orders", states.len())?;
    Ok(())
}

fn write_order_state(
    tokens: &TokenList,
    state: &OrderState,
    now: u64,
    out: &mut impl Write,
) -> Result<()> {
    let data = &state.order.data;
    let remaining = state.remaining()?;
    let rate_bump = match state.rate_bump_at(now)? {
        Some(bump) => format!("{bump} bps"),
        None => "fixed".to_owned(),
    };
    writeln!(
        out,
        "{} {} {} remaining {} rate {}",
        state.order.order_hash,
        state.status(),
        tokens.describe(data),
        tokens.format_amount(&data.maker_asset, remaining.making),
        rate_bump,
    )?;
    match state.order.compute_hash() {
        Ok(hash) if hash == state.order.order_hash => (),
        Ok(hash) => tracing::debug!(
            stored = %state.order.order_hash,
            computed = %hash,
            "order was registered with a non-zero order hash field"
        ),
        Err(err) => tracing::debug!(hash = %state.order.order_hash, ?err, "cannot recompute order hash"),
    }
    Ok(())
}

/// Checks a fill of an indexed order at `now` and prints the resulting
/// transfers.
pub fn quote(
    source: &dyn OrderStateSource,
    tokens: &TokenList,
    hash: &OrderHash,
    (making, taking): (U256, U256),
    protocol_fee_bps: u32,
    now: u64,
    out: &mut impl Write,
) -> Result<()> {
    let state = source
        .order_state(hash)?
        .ok_or_else(|| anyhow!("order {hash} not found"))?;
    let quote = state
        .quote_fill(making, taking, now, protocol_fee_bps)
        .with_context(|| format!("order {hash} cannot be filled"))?;

    let data = &state.order.data;
    writeln!(out, "order {hash} at {now}")?;
    writeln!(
        out,
        "fill: {} for {}",
        tokens.format_amount(&data.maker_asset, quote.making_amount),
        tokens.format_amount(&data.taker_asset, quote.taking_amount),
    )?;
    writeln!(out, "rate bump: {} bps", quote.rate_bump)?;
    writeln!(
        out,
        "maker receives: {}",
        tokens.format_amount(&data.taker_asset, quote.maker_receives)
    )?;
    writeln!(
        out,
        "taker receives: {}",
        tokens.format_amount(&data.maker_asset, quote.taker_receives)
    )?;
    writeln!(
        out,
        "protocol fee: {}",
        tokens.format_amount(&data.maker_asset, quote.protocol_fee)
    )?;
    Ok(())
}

/// Prints when each stage of an escrow deployed at `deployed_at` begins and
/// which phase both escrows are in at `now`.
pub fn timelocks(
    offsets: StageOffsets,
    deployed_at: u64,
    now: u64,
    out: &mut impl Write,
) -> Result<()> {
    offsets.validate().context("invalid timelock stages")?;
    let timelocks = Timelocks::with_offsets(offsets, deployed_at);

    for (stage, time) in timelocks.schedule() {
        writeln!(out, "{:<24} {time:>12} (+{}s)", stage.to_string(), offsets.get(stage))?;
    }
    writeln!(out, "source escrow at {now}: {}", timelocks.src_phase(now))?;
    writeln!(out, "destination escrow at {now}: {}", timelocks.dst_phase(now))?;
    Ok(())
}
