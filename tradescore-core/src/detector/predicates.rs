//! One pure predicate per forbidden rule, keyed by rule code.

use chrono::Duration;

use crate::catalog::{NewsImpact, RuleCode};
use crate::domain::Side;

use super::{Detection, RuleContext, ViolationDetail};

pub type RulePredicate = fn(&RuleContext<'_>) -> Detection;

pub fn predicate_for(code: RuleCode) -> RulePredicate {
    match code {
        RuleCode::NoStoploss => no_stoploss,
        RuleCode::OversizedPosition => oversized_position,
        RuleCode::RevengeTrade => revenge_trade,
        RuleCode::Chasing => chasing,
        RuleCode::Overtrading => overtrading,
        RuleCode::EnterBeforeNews => enter_before_news,
        RuleCode::AvgDownNoPlan => avg_down_no_plan,
    }
}

fn minutes(d: Duration) -> f64 {
    d.num_seconds() as f64 / 60.0
}

/// Both sides carry unmanaged downside without a stop.
fn no_stoploss(ctx: &RuleContext<'_>) -> Detection {
    if ctx.trade.stop_loss.is_none() {
        Detection::Violated(None)
    } else {
        Detection::Clear
    }
}

fn oversized_position(ctx: &RuleContext<'_>) -> Detection {
    let equity = match ctx.trade.account_equity {
        Some(equity) if equity > 0.0 => equity,
        _ => return Detection::Skipped("account equity unknown"),
    };
    let position_value = ctx.trade.notional();
    let ratio = position_value / equity;
    if ratio > ctx.params.max_position_ratio {
        Detection::Violated(Some(ViolationDetail::OversizedPosition {
            position_value,
            account_equity: equity,
            ratio,
            limit: ctx.params.max_position_ratio,
        }))
    } else {
        Detection::Clear
    }
}

/// A losing trade closed within the window before this entry.
/// The most recent such loss is reported.
fn revenge_trade(ctx: &RuleContext<'_>) -> Detection {
    let entry = ctx.trade.entry_time;
    let window = Duration::minutes(i64::from(ctx.params.revenge_trade_window));

    let trigger = ctx
        .others
        .iter()
        .filter(|t| !ctx.params.revenge_same_symbol_only || t.symbol == ctx.trade.symbol)
        .filter(|t| t.is_loss())
        .filter_map(|t| t.exit_time.map(|exit| (*t, exit)))
        .filter(|(_, exit)| *exit <= entry && entry - *exit < window)
        .max_by_key(|(_, exit)| *exit);

    match trigger {
        Some((prior, exit)) => Detection::Violated(Some(ViolationDetail::RevengeTrade {
            prior_trade_id: prior.id.clone(),
            prior_exit_time: exit,
            prior_pnl: prior.realized_pnl().unwrap_or_default(),
            minutes_since_loss: minutes(entry - exit),
        })),
        None => Detection::Clear,
    }
}

/// Entered after price already ran beyond the threshold in the trade's direction.
fn chasing(ctx: &RuleContext<'_>) -> Detection {
    let Some(change) = ctx.trade.pre_entry_move else {
        return Detection::Skipped("no pre-entry price move supplied");
    };
    if change * ctx.trade.side.sign() > ctx.params.chasing_threshold {
        Detection::Violated(Some(ViolationDetail::Chasing {
            pre_entry_move: change,
            threshold: ctx.params.chasing_threshold,
        }))
    } else {
        Detection::Clear
    }
}

/// Trades entered on the trade's calendar day, the trade itself included.
fn overtrading(ctx: &RuleContext<'_>) -> Detection {
    let Ok(offset) = ctx.params.trading_day_offset() else {
        return Detection::Skipped("trading day offset out of range");
    };
    let day = ctx.trade.entry_time.with_timezone(&offset).date_naive();
    let count = 1 + ctx
        .others
        .iter()
        .filter(|t| t.entry_time.with_timezone(&offset).date_naive() == day)
        .count();

    if count > ctx.params.max_daily_trades {
        Detection::Violated(Some(ViolationDetail::Overtrading {
            trading_day: day,
            daily_trade_count: count,
            limit: ctx.params.max_daily_trades,
        }))
    } else {
        Detection::Clear
    }
}

/// Entry within the avoidance window before a high-impact event.
/// The nearest upcoming event is reported.
fn enter_before_news(ctx: &RuleContext<'_>) -> Detection {
    let Some(events) = ctx.params.news_events.as_ref() else {
        return Detection::Skipped("no news calendar supplied");
    };
    let entry = ctx.trade.entry_time;
    let window = Duration::minutes(i64::from(ctx.params.news_avoidance_window));

    let upcoming = events
        .iter()
        .filter(|e| e.impact == NewsImpact::High)
        .filter(|e| e.time >= entry && e.time - entry <= window)
        .min_by_key(|e| e.time);

    match upcoming {
        Some(event) => Detection::Violated(Some(ViolationDetail::EnterBeforeNews {
            event_title: event.title.clone(),
            event_time: event.time,
            minutes_before_event: minutes(event.time - entry),
        })),
        None => Detection::Clear,
    }
}

/// Adding to an open, underwater position on the same symbol and side
/// without a declared averaging plan.
fn avg_down_no_plan(ctx: &RuleContext<'_>) -> Detection {
    let trade = ctx.trade;
    let open: Vec<_> = ctx
        .others
        .iter()
        .filter(|t| t.symbol == trade.symbol && t.side == trade.side)
        .filter(|t| t.is_open_at(trade.entry_time))
        .collect();
    if open.is_empty() {
        return Detection::Clear;
    }

    let total_qty: f64 = open.iter().map(|t| t.quantity).sum();
    let average_entry = if total_qty > 0.0 {
        open.iter().map(|t| t.notional()).sum::<f64>() / total_qty
    } else {
        open.iter().map(|t| t.entry_price).sum::<f64>() / open.len() as f64
    };

    let underwater = match trade.side {
        Side::Buy => trade.entry_price < average_entry,
        Side::Sell => trade.entry_price > average_entry,
    };
    if underwater && !trade.averaging_plan {
        Detection::Violated(Some(ViolationDetail::AverageDown {
            open_positions: open.len(),
            average_entry,
            entry_price: trade.entry_price,
        }))
    } else {
        Detection::Clear
    }
}
