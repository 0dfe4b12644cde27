//! Recompute-on-write maintenance of the derived analytics tables.
//!
//! The three roll-up tables (committee monthly, trader monthly, trader
//! overall) are derived data: whenever a receipt is created or cancelled, the
//! rows covering that receipt's grouping keys are recomputed from the receipts
//! table inside the caller's transaction. Recomputing (rather than applying
//! deltas) keeps the distinct-count fields correct without extra bookkeeping.
//! Roll-up rows with no remaining receipts and no target are deleted.

use crate::{
    core::receipt::NATURE_MARKET_FEE,
    entities::{
        CommitteeMonthlyAnalytics, Receipt, Target, TraderMonthlyAnalytics,
        TraderOverallAnalytics, committee_monthly_analytics, receipt, target,
        trader_monthly_analytics, trader_overall_analytics,
    },
    errors::Result,
};
use chrono::{Datelike, NaiveDate};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter, Set,
};
use std::collections::HashSet;

/// Refreshes every roll-up row a receipt contributes to. Called after a
/// receipt is inserted or its cancellation flag changes, inside the same
/// database transaction.
pub async fn refresh_for_receipt<C>(db: &C, model: &receipt::Model) -> Result<()>
where
    C: ConnectionTrait,
{
    let year = model.receipt_date.year();
    let month = i32::from(u8::try_from(model.receipt_date.month()).unwrap_or_default());

    refresh_committee_month(db, model.committee_id, year, month).await?;
    refresh_trader_month(db, model.trader_id, model.committee_id, year, month).await?;
    refresh_trader_overall(db, model.trader_id, model.committee_id).await?;
    Ok(())
}

fn month_bounds(year: i32, month: i32) -> Option<(NaiveDate, NaiveDate)> {
    let month = u32::try_from(month).ok()?;
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((start, end))
}

/// Recomputes the (committee, year, month) roll-up row from receipts, copying
/// in the committee-wide target figures for the month. Deletes the row when
/// there are no receipts and no target.
pub async fn refresh_committee_month<C>(
    db: &C,
    committee_id: i64,
    year: i32,
    month: i32,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let Some((start, end)) = month_bounds(year, month) else {
        return Ok(());
    };

    let receipts = Receipt::find()
        .filter(receipt::Column::CommitteeId.eq(committee_id))
        .filter(receipt::Column::Cancelled.eq(false))
        .filter(receipt::Column::ReceiptDate.gte(start))
        .filter(receipt::Column::ReceiptDate.lt(end))
        .all(db)
        .await?;

    // Committee-wide target only; checkpost-scoped targets stay out of this row
    let month_target = Target::find()
        .filter(target::Column::CommitteeId.eq(committee_id))
        .filter(target::Column::Year.eq(year))
        .filter(target::Column::Month.eq(month))
        .filter(target::Column::CheckpostId.is_null())
        .one(db)
        .await?;

    let existing = CommitteeMonthlyAnalytics::find()
        .filter(committee_monthly_analytics::Column::CommitteeId.eq(committee_id))
        .filter(committee_monthly_analytics::Column::Year.eq(year))
        .filter(committee_monthly_analytics::Column::Month.eq(month))
        .one(db)
        .await?;

    if receipts.is_empty() && month_target.is_none() {
        if let Some(row) = existing {
            row.delete(db).await?;
        }
        return Ok(());
    }

    let total_market_fees: f64 = receipts
        .iter()
        .filter(|r| r.nature_of_receipt == NATURE_MARKET_FEE)
        .map(|r| r.fees_paid)
        .sum();
    let total_value: f64 = receipts.iter().map(|r| r.value).sum();
    let total_quantity: f64 = receipts.iter().map(|r| r.quantity).sum();
    let receipt_count = i64::try_from(receipts.len()).unwrap_or_default();
    let unique_traders = i64::try_from(
        receipts
            .iter()
            .map(|r| r.trader_id)
            .collect::<HashSet<_>>()
            .len(),
    )
    .unwrap_or_default();
    let unique_commodities = i64::try_from(
        receipts
            .iter()
            .filter_map(|r| r.commodity_id)
            .collect::<HashSet<_>>()
            .len(),
    )
    .unwrap_or_default();
    let (market_fee_target, total_value_target) = month_target
        .map_or((0.0, 0.0), |t| (t.market_fee_target, t.total_value_target));

    if let Some(row) = existing {
        let mut active: committee_monthly_analytics::ActiveModel = row.into();
        active.total_market_fees = Set(total_market_fees);
        active.total_value = Set(total_value);
        active.total_quantity = Set(total_quantity);
        active.receipt_count = Set(receipt_count);
        active.unique_traders = Set(unique_traders);
        active.unique_commodities = Set(unique_commodities);
        active.market_fee_target = Set(market_fee_target);
        active.total_value_target = Set(total_value_target);
        active.update(db).await?;
    } else {
        committee_monthly_analytics::ActiveModel {
            committee_id: Set(committee_id),
            year: Set(year),
            month: Set(month),
            total_market_fees: Set(total_market_fees),
            total_value: Set(total_value),
            total_quantity: Set(total_quantity),
            receipt_count: Set(receipt_count),
            unique_traders: Set(unique_traders),
            unique_commodities: Set(unique_commodities),
            market_fee_target: Set(market_fee_target),
            total_value_target: Set(total_value_target),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    Ok(())
}

/// Recomputes the (trader, committee, year, month) roll-up row from receipts.
pub async fn refresh_trader_month<C>(
    db: &C,
    trader_id: i64,
    committee_id: i64,
    year: i32,
    month: i32,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let Some((start, end)) = month_bounds(year, month) else {
        return Ok(());
    };

    let receipts = Receipt::find()
        .filter(receipt::Column::TraderId.eq(trader_id))
        .filter(receipt::Column::CommitteeId.eq(committee_id))
        .filter(receipt::Column::Cancelled.eq(false))
        .filter(receipt::Column::ReceiptDate.gte(start))
        .filter(receipt::Column::ReceiptDate.lt(end))
        .all(db)
        .await?;

    let existing = TraderMonthlyAnalytics::find()
        .filter(trader_monthly_analytics::Column::TraderId.eq(trader_id))
        .filter(trader_monthly_analytics::Column::CommitteeId.eq(committee_id))
        .filter(trader_monthly_analytics::Column::Year.eq(year))
        .filter(trader_monthly_analytics::Column::Month.eq(month))
        .one(db)
        .await?;

    if receipts.is_empty() {
        if let Some(row) = existing {
            row.delete(db).await?;
        }
        return Ok(());
    }

    let total_value: f64 = receipts.iter().map(|r| r.value).sum();
    let total_fees_paid: f64 = receipts.iter().map(|r| r.fees_paid).sum();
    let total_quantity: f64 = receipts.iter().map(|r| r.quantity).sum();
    let receipt_count = i64::try_from(receipts.len()).unwrap_or_default();

    if let Some(row) = existing {
        let mut active: trader_monthly_analytics::ActiveModel = row.into();
        active.total_value = Set(total_value);
        active.total_fees_paid = Set(total_fees_paid);
        active.total_quantity = Set(total_quantity);
        active.receipt_count = Set(receipt_count);
        active.update(db).await?;
    } else {
        trader_monthly_analytics::ActiveModel {
            trader_id: Set(trader_id),
            committee_id: Set(committee_id),
            year: Set(year),
            month: Set(month),
            total_value: Set(total_value),
            total_fees_paid: Set(total_fees_paid),
            total_quantity: Set(total_quantity),
            receipt_count: Set(receipt_count),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    Ok(())
}

/// Recomputes the all-time (trader, committee) roll-up row from receipts,
/// including the first/last transaction dates used by the activity insights.
pub async fn refresh_trader_overall<C>(db: &C, trader_id: i64, committee_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let receipts = Receipt::find()
        .filter(receipt::Column::TraderId.eq(trader_id))
        .filter(receipt::Column::CommitteeId.eq(committee_id))
        .filter(receipt::Column::Cancelled.eq(false))
        .all(db)
        .await?;

    let existing = TraderOverallAnalytics::find()
        .filter(trader_overall_analytics::Column::TraderId.eq(trader_id))
        .filter(trader_overall_analytics::Column::CommitteeId.eq(committee_id))
        .one(db)
        .await?;

    let (Some(first), Some(last)) = (
        receipts.iter().map(|r| r.receipt_date).min(),
        receipts.iter().map(|r| r.receipt_date).max(),
    ) else {
        if let Some(row) = existing {
            row.delete(db).await?;
        }
        return Ok(());
    };

    let total_value: f64 = receipts.iter().map(|r| r.value).sum();
    let total_fees_paid: f64 = receipts.iter().map(|r| r.fees_paid).sum();
    let total_quantity: f64 = receipts.iter().map(|r| r.quantity).sum();
    let receipt_count = i64::try_from(receipts.len()).unwrap_or_default();

    if let Some(row) = existing {
        let mut active: trader_overall_analytics::ActiveModel = row.into();
        active.total_value = Set(total_value);
        active.total_fees_paid = Set(total_fees_paid);
        active.total_quantity = Set(total_quantity);
        active.receipt_count = Set(receipt_count);
        active.first_transaction_date = Set(first);
        active.last_transaction_date = Set(last);
        active.update(db).await?;
    } else {
        trader_overall_analytics::ActiveModel {
            trader_id: Set(trader_id),
            committee_id: Set(committee_id),
            total_value: Set(total_value),
            total_fees_paid: Set(total_fees_paid),
            total_quantity: Set(total_quantity),
            receipt_count: Set(receipt_count),
            first_transaction_date: Set(first),
            last_transaction_date: Set(last),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    Ok(())
}
