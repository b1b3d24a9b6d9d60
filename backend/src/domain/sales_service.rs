//! Sales reporting over the order history.
//!
//! All figures are derived from completed orders whose creation time
//! falls inside the requested window. Cancelled and still-active orders
//! never contribute to revenue.

use crate::domain::mappers;
use crate::domain::models::{Order, OrderStatus, OrderType};
use crate::error::{Error, Result};
use chrono::{DateTime, Datelike, NaiveTime, Timelike, Utc, Weekday};
use rust_decimal::Decimal;
use shared::{OrderTypeBreakdown, PopularItem, SalesData, SalesPeriod, SalesSummary, TimeBucket};
use std::collections::BTreeMap;

/// Windows no longer than this are bucketed hourly; anything longer is
/// bucketed daily.
const HOURLY_WINDOW_SECS: i64 = 24 * 3600;

/// Popularity ranking length.
const TOP_ITEMS: usize = 5;

/// Time bucket width. `sales_data` picks one from the window length;
/// callers of `time_breakdown` may force either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Hourly,
    Daily,
}

/// Resolve a reporting period to an inclusive window. The named
/// shorthands are anchored at `now`: today since midnight, week since
/// Monday, month since the first.
pub fn resolve_period(
    period: &SalesPeriod,
    now: DateTime<Utc>,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let start_of = |date: chrono::NaiveDate| date.and_time(NaiveTime::MIN).and_utc();
    match period {
        SalesPeriod::Today => Ok((start_of(now.date_naive()), now)),
        SalesPeriod::Week => {
            let monday = now.date_naive().week(Weekday::Mon).first_day();
            Ok((start_of(monday), now))
        }
        SalesPeriod::Month => {
            let first = now
                .date_naive()
                .with_day(1)
                .ok_or_else(|| Error::validation("period", "could not resolve month start"))?;
            Ok((start_of(first), now))
        }
        SalesPeriod::Range { start, end } => {
            if start > end {
                return Err(Error::validation("period", "range start must not be after its end"));
            }
            Ok((*start, *end))
        }
    }
}

/// Full reporting payload for a window.
pub fn sales_data(orders: &[Order], start: DateTime<Utc>, end: DateTime<Utc>) -> SalesData {
    let completed = completed_in_window(orders, start, end);
    SalesData {
        summary: summarize(&completed),
        popular_items: popular_items(&completed),
        time_breakdown: time_breakdown(&completed, start, end, None),
        type_breakdown: type_breakdown(&completed),
    }
}

fn completed_in_window<'a>(
    orders: &'a [Order],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<&'a Order> {
    orders
        .iter()
        .filter(|o| o.status == OrderStatus::Completed)
        .filter(|o| o.created_at >= start && o.created_at <= end)
        .collect()
}

fn summarize(completed: &[&Order]) -> SalesSummary {
    let order_count = completed.len() as u64;
    let total_sales: Decimal = completed.iter().map(|o| o.total).sum();
    let total_items_sold: u64 = completed.iter().map(|o| o.item_count()).sum();
    let avg_order_value = if order_count == 0 {
        Decimal::ZERO
    } else {
        (total_sales / Decimal::from(order_count)).round_dp(2)
    };
    SalesSummary {
        total_sales,
        order_count,
        avg_order_value,
        total_items_sold,
    }
}

/// Item popularity by units sold, most popular first; names break ties
/// alphabetically so the ranking is stable.
fn popular_items(completed: &[&Order]) -> Vec<PopularItem> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for order in completed {
        for item in &order.items {
            *counts.entry(item.name.as_str()).or_default() += u64::from(item.quantity);
        }
    }
    let total_units: u64 = counts.values().sum();

    let mut ranked: Vec<PopularItem> = counts
        .into_iter()
        .map(|(name, count)| PopularItem {
            name: name.to_string(),
            count,
            percentage: share(count, total_units),
        })
        .collect();
    // BTreeMap iteration already ordered names ascending, so a stable
    // sort on count keeps the alphabetical tie-break.
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(TOP_ITEMS);
    ranked
}

/// Revenue over time. Only buckets with sales appear, in ascending
/// label order.
pub fn time_breakdown(
    completed: &[&Order],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    force: Option<Granularity>,
) -> Vec<TimeBucket> {
    let hourly = match force {
        Some(granularity) => granularity == Granularity::Hourly,
        None => (end - start).num_seconds() <= HOURLY_WINDOW_SECS,
    };
    let mut buckets: BTreeMap<String, Decimal> = BTreeMap::new();
    for order in completed {
        let label = if hourly {
            format!("{:02}:00", order.created_at.hour())
        } else {
            order.created_at.format("%Y-%m-%d").to_string()
        };
        *buckets.entry(label).or_default() += order.total;
    }
    buckets
        .into_iter()
        .map(|(label, sales)| TimeBucket { label, sales })
        .collect()
}

fn type_breakdown(completed: &[&Order]) -> Vec<OrderTypeBreakdown> {
    let total_revenue: Decimal = completed.iter().map(|o| o.total).sum();
    let mut by_type: BTreeMap<&str, (OrderType, u64, Decimal)> = BTreeMap::new();
    for order in completed {
        let entry = by_type
            .entry(order.customer.order_type.as_str())
            .or_insert((order.customer.order_type, 0, Decimal::ZERO));
        entry.1 += 1;
        entry.2 += order.total;
    }

    let mut breakdown: Vec<OrderTypeBreakdown> = by_type
        .into_values()
        .map(|(order_type, count, revenue)| OrderTypeBreakdown {
            order_type: mappers::order_type_to_dto(order_type),
            count,
            revenue,
            percentage: revenue_share(revenue, total_revenue),
        })
        .collect();
    breakdown.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    breakdown
}

fn share(count: u64, total: u64) -> Decimal {
    if total == 0 {
        Decimal::ZERO
    } else {
        (Decimal::from(count) * Decimal::ONE_HUNDRED / Decimal::from(total)).round_dp(1)
    }
}

fn revenue_share(revenue: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        Decimal::ZERO
    } else {
        (revenue * Decimal::ONE_HUNDRED / total).round_dp(1)
    }
}
