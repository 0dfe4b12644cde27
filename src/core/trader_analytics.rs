//! Trader analytics - rankings and detailed trend reports.
//!
//! Both operations read the precomputed monthly/overall roll-up tables rather
//! than scanning receipts. Query-parameter parsing lives here as pure
//! functions so malformed filters are rejected before any query executes.

use crate::{
    core::{insight, period::round2},
    entities::{
        Trader, TraderMonthlyAnalytics, TraderOverallAnalytics, trader, trader_monthly_analytics,
        trader_overall_analytics,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use std::collections::HashMap;

/// Default number of traders in a ranking when no limit is requested.
pub const DEFAULT_RANKING_LIMIT: usize = 5;

/// Optional year/month narrowing for the trader aggregations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodFilter {
    /// Calendar year filter
    pub year: Option<i32>,
    /// Calendar month filter (requires `year`)
    pub month: Option<i32>,
}

/// Parses the year/month query parameters into a [`PeriodFilter`].
///
/// Rejected before any query runs: non-numeric values, a month outside 1-12,
/// and a month without a year.
pub fn parse_period_filter(year: Option<&str>, month: Option<&str>) -> Result<PeriodFilter> {
    let year = year
        .map(|y| {
            y.parse::<i32>().map_err(|_| Error::Validation {
                message: format!("Invalid year: {y}"),
            })
        })
        .transpose()?;

    let month = month
        .map(|m| {
            m.parse::<i32>().map_err(|_| Error::Validation {
                message: format!("Invalid month: {m}"),
            })
        })
        .transpose()?;

    if let Some(m) = month {
        if year.is_none() {
            return Err(Error::Validation {
                message: "Month filter requires a year".to_string(),
            });
        }
        if !(1..=12).contains(&m) {
            return Err(Error::Validation {
                message: format!("Month must be between 1 and 12, got {m}"),
            });
        }
    }

    Ok(PeriodFilter { year, month })
}

/// Parses the optional `limit` parameter, defaulting to
/// [`DEFAULT_RANKING_LIMIT`]. Zero and non-numeric values are rejected.
pub fn parse_limit(limit: Option<&str>) -> Result<usize> {
    let Some(raw) = limit else {
        return Ok(DEFAULT_RANKING_LIMIT);
    };
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(Error::Validation {
            message: format!("Invalid limit: {raw}"),
        }),
    }
}

/// One entry in a trader ranking.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedTrader {
    /// Trader id
    pub trader_id: i64,
    /// Trader name
    pub trader_name: String,
    /// Summed trade value
    pub total_value: f64,
    /// Summed fees paid
    pub total_fees_paid: f64,
    /// Summed traded quantity
    pub total_quantity: f64,
    /// Summed receipt count
    pub receipt_count: i64,
    /// Average value per receipt, 0 when there are no receipts
    pub avg_value_per_receipt: f64,
}

/// Parallel monthly-filtered and all-time rankings for a committee.
#[derive(Debug, Clone, Serialize)]
pub struct TraderRanking {
    /// Ranking within the requested year/month filter
    pub monthly: Vec<RankedTrader>,
    /// All-time ranking for the same traders
    pub overall: Vec<RankedTrader>,
}

#[allow(clippy::cast_precision_loss)]
fn avg_per_receipt(total: f64, count: i64) -> f64 {
    if count == 0 {
        0.0
    } else {
        round2(total / count as f64)
    }
}

/// Ranks traders by summed trade value within a committee and optional
/// year/month filter, returning at most `limit` entries together with the
/// same traders' all-time totals.
pub async fn rank_traders(
    db: &DatabaseConnection,
    committee_id: i64,
    filter: PeriodFilter,
    limit: usize,
) -> Result<TraderRanking> {
    let mut query = TraderMonthlyAnalytics::find()
        .filter(trader_monthly_analytics::Column::CommitteeId.eq(committee_id));
    if let Some(year) = filter.year {
        query = query.filter(trader_monthly_analytics::Column::Year.eq(year));
    }
    if let Some(month) = filter.month {
        query = query.filter(trader_monthly_analytics::Column::Month.eq(month));
    }
    let rows = query.all(db).await?;

    // Sum the monthly rows per trader in memory
    let mut sums: HashMap<i64, (f64, f64, f64, i64)> = HashMap::new();
    for row in &rows {
        let entry = sums.entry(row.trader_id).or_insert((0.0, 0.0, 0.0, 0));
        entry.0 += row.total_value;
        entry.1 += row.total_fees_paid;
        entry.2 += row.total_quantity;
        entry.3 += row.receipt_count;
    }

    let mut ranked: Vec<(i64, (f64, f64, f64, i64))> = sums.into_iter().collect();
    ranked.sort_by(|a, b| b.1.0.total_cmp(&a.1.0));
    ranked.truncate(limit);

    let trader_ids: Vec<i64> = ranked.iter().map(|(id, _)| *id).collect();
    let names: HashMap<i64, String> = Trader::find()
        .filter(trader::Column::Id.is_in(trader_ids.clone()))
        .all(db)
        .await?
        .into_iter()
        .map(|t| (t.id, t.name))
        .collect();
    let name_of = |id: i64| {
        names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| "Unknown Trader".to_string())
    };

    let monthly = ranked
        .into_iter()
        .map(|(trader_id, (value, fees, quantity, count))| RankedTrader {
            trader_id,
            trader_name: name_of(trader_id),
            total_value: round2(value),
            total_fees_paid: round2(fees),
            total_quantity: round2(quantity),
            receipt_count: count,
            avg_value_per_receipt: avg_per_receipt(value, count),
        })
        .collect();

    let mut overall_rows = TraderOverallAnalytics::find()
        .filter(trader_overall_analytics::Column::CommitteeId.eq(committee_id))
        .filter(trader_overall_analytics::Column::TraderId.is_in(trader_ids))
        .all(db)
        .await?;
    overall_rows.sort_by(|a, b| b.total_value.total_cmp(&a.total_value));

    let overall = overall_rows
        .into_iter()
        .map(|row| RankedTrader {
            trader_id: row.trader_id,
            trader_name: name_of(row.trader_id),
            total_value: round2(row.total_value),
            total_fees_paid: round2(row.total_fees_paid),
            total_quantity: round2(row.total_quantity),
            receipt_count: row.receipt_count,
            avg_value_per_receipt: avg_per_receipt(row.total_value, row.receipt_count),
        })
        .collect();

    Ok(TraderRanking { monthly, overall })
}

/// One monthly row of the trader detail report, with derived per-receipt and
/// per-kg metrics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBreakdownRow {
    /// Calendar year
    pub year: i32,
    /// Calendar month (1-12)
    pub month: i32,
    /// Trade value in the month
    pub total_value: f64,
    /// Fees paid in the month
    pub total_fees_paid: f64,
    /// Quantity traded in the month
    pub total_quantity: f64,
    /// Receipts in the month
    pub receipt_count: i64,
    /// Value per receipt, 0-guarded
    pub avg_value_per_receipt: f64,
    /// Quantity per receipt, 0-guarded
    pub avg_quantity_per_receipt: f64,
    /// Value per unit of quantity, 0-guarded
    pub value_per_kg: f64,
}

/// All-time summary block of the trader detail report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallSummary {
    /// Lifetime trade value
    pub total_value: f64,
    /// Lifetime fees paid
    pub total_fees_paid: f64,
    /// Lifetime quantity traded
    pub total_quantity: f64,
    /// Lifetime receipt count
    pub receipt_count: i64,
    /// Lifetime value per receipt, 0-guarded
    pub avg_value_per_receipt: f64,
    /// Date of the first receipt
    pub first_transaction_date: NaiveDate,
    /// Date of the most recent receipt
    pub last_transaction_date: NaiveDate,
}

/// Detailed per-trader report: monthly breakdown, all-time summary, trend,
/// and narrative insights.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraderReport {
    /// Trader id
    pub trader_id: i64,
    /// Trader name
    pub trader_name: String,
    /// Monthly rows, most recent first
    pub monthly: Vec<MonthlyBreakdownRow>,
    /// All-time summary when the trader has any receipts with the committee
    pub overall: Option<OverallSummary>,
    /// Month-over-month trend
    pub trend: insight::Trend,
    /// Ordered narrative insight strings
    pub insights: Vec<String>,
}

/// Builds the detailed report for one trader within a committee.
///
/// Returns `NotFound` for an unknown trader; a known trader with no activity
/// yields empty breakdowns and an `insufficient_data` trend.
pub async fn trader_report(
    db: &DatabaseConnection,
    committee_id: i64,
    trader_id: i64,
    filter: PeriodFilter,
    as_of: NaiveDate,
) -> Result<TraderReport> {
    let trader = Trader::find_by_id(trader_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            what: format!("Trader {trader_id}"),
        })?;

    let mut query = TraderMonthlyAnalytics::find()
        .filter(trader_monthly_analytics::Column::CommitteeId.eq(committee_id))
        .filter(trader_monthly_analytics::Column::TraderId.eq(trader_id))
        .order_by_desc(trader_monthly_analytics::Column::Year)
        .order_by_desc(trader_monthly_analytics::Column::Month);
    if let Some(year) = filter.year {
        query = query.filter(trader_monthly_analytics::Column::Year.eq(year));
    }
    if let Some(month) = filter.month {
        query = query.filter(trader_monthly_analytics::Column::Month.eq(month));
    }
    let rows = query.all(db).await?;

    let overall_row = TraderOverallAnalytics::find()
        .filter(trader_overall_analytics::Column::CommitteeId.eq(committee_id))
        .filter(trader_overall_analytics::Column::TraderId.eq(trader_id))
        .one(db)
        .await?;

    let trend = insight::compute_trend(&rows);
    let insights = insight::generate_insights(&rows, overall_row.as_ref(), as_of);

    let monthly = rows
        .iter()
        .map(|row| MonthlyBreakdownRow {
            year: row.year,
            month: row.month,
            total_value: round2(row.total_value),
            total_fees_paid: round2(row.total_fees_paid),
            total_quantity: round2(row.total_quantity),
            receipt_count: row.receipt_count,
            avg_value_per_receipt: avg_per_receipt(row.total_value, row.receipt_count),
            avg_quantity_per_receipt: avg_per_receipt(row.total_quantity, row.receipt_count),
            value_per_kg: if row.total_quantity > 0.0 {
                round2(row.total_value / row.total_quantity)
            } else {
                0.0
            },
        })
        .collect();

    let overall = overall_row.map(|row| OverallSummary {
        total_value: round2(row.total_value),
        total_fees_paid: round2(row.total_fees_paid),
        total_quantity: round2(row.total_quantity),
        receipt_count: row.receipt_count,
        avg_value_per_receipt: avg_per_receipt(row.total_value, row.receipt_count),
        first_transaction_date: row.first_transaction_date,
        last_transaction_date: row.last_transaction_date,
    });

    Ok(TraderReport {
        trader_id,
        trader_name: trader.name,
        monthly,
        overall,
        trend,
        insights,
    })
}
