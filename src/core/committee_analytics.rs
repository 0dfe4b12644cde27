//! Committee analytics - market-fee reports and percentage-share breakdowns.
//!
//! These aggregators fetch receipt rows and roll them up in memory. The
//! trailing-12-month market-fee report pre-seeds every month bucket with zero
//! so the series is always gap-free; the commodity-mix and district-share
//! breakdowns return percentage lists that are empty when the underlying
//! total is zero, never a division-by-zero artifact.

use crate::{
    core::{
        period::{month_key, next_month_start, round2, trailing_months, window_start},
        receipt::{LOCATION_CHECKPOST, LOCATION_OFFICE, NATURE_MARKET_FEE},
    },
    entities::{Checkpost, Commodity, Committee, Receipt, checkpost, commodity, receipt},
    errors::Result,
};
use chrono::{Datelike, NaiveDate};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Serialize;
use std::collections::HashMap;

/// A named percentage entry in a breakdown list.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ShareItem {
    /// Display name of the bucket
    pub name: String,
    /// Percentage share, rounded to two decimals
    pub value: f64,
}

/// One month of the market-fee series.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthlyFees {
    /// Month key, e.g. `"2025-03"`
    pub date: String,
    /// Market fees collected in the month
    pub mf: f64,
}

/// Per-location drill-down of market fees by sub-location.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LocationDrilldown {
    /// Office collections by supervisor name
    pub office: Vec<ShareItem>,
    /// Checkpost collections by checkpost name
    pub checkpost: Vec<ShareItem>,
    /// Other collections by free-text reason
    pub other: Vec<ShareItem>,
}

/// Trailing-12-month market-fee report for one committee.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitteeMarketFeeReport {
    /// Total market fees over the window
    pub total_market_fees: f64,
    /// Gap-free monthly series, oldest first, always 12 entries
    pub market_fees_by_month: Vec<MonthlyFees>,
    /// Office/checkpost/other percentage split (empty when total is zero)
    pub market_fees_by_location: Vec<ShareItem>,
    /// Sub-location drill-down per collection location
    pub location_drilldown: LocationDrilldown,
}

/// Builds the trailing-12-month market-fee report for a committee.
///
/// Only non-cancelled market-fee receipts inside the window count. Sub-location
/// buckets fall back to "Unknown Supervisor" / "Unknown Checkpost" /
/// "Unknown Source" when the receipt's sub-reference is absent.
pub async fn committee_market_fee_report(
    db: &DatabaseConnection,
    committee_id: i64,
    as_of: NaiveDate,
) -> Result<CommitteeMarketFeeReport> {
    let receipts = Receipt::find()
        .filter(receipt::Column::CommitteeId.eq(committee_id))
        .filter(receipt::Column::NatureOfReceipt.eq(NATURE_MARKET_FEE))
        .filter(receipt::Column::Cancelled.eq(false))
        .filter(receipt::Column::ReceiptDate.gte(window_start(as_of, 12)))
        .filter(receipt::Column::ReceiptDate.lt(next_month_start(as_of)))
        .all(db)
        .await?;

    let checkpost_names: HashMap<i64, String> = Checkpost::find()
        .filter(checkpost::Column::CommitteeId.eq(committee_id))
        .all(db)
        .await?
        .into_iter()
        .map(|cp| (cp.id, cp.name))
        .collect();

    // Pre-seed all 12 buckets so the series is gap-free regardless of sparsity
    let months = trailing_months(as_of, 12);
    let mut month_totals: HashMap<(i32, u32), f64> =
        months.iter().map(|&key| (key, 0.0)).collect();

    let mut office_total = 0.0;
    let mut checkpost_total = 0.0;
    let mut other_total = 0.0;
    let mut office_drill: HashMap<String, f64> = HashMap::new();
    let mut checkpost_drill: HashMap<String, f64> = HashMap::new();
    let mut other_drill: HashMap<String, f64> = HashMap::new();

    let mut total = 0.0;
    for r in &receipts {
        total += r.fees_paid;

        let bucket = (r.receipt_date.year(), r.receipt_date.month());
        if let Some(slot) = month_totals.get_mut(&bucket) {
            *slot += r.fees_paid;
        }

        match r.collection_location.as_str() {
            LOCATION_OFFICE => {
                office_total += r.fees_paid;
                let name = r
                    .office_supervisor
                    .clone()
                    .unwrap_or_else(|| "Unknown Supervisor".to_string());
                *office_drill.entry(name).or_insert(0.0) += r.fees_paid;
            }
            LOCATION_CHECKPOST => {
                checkpost_total += r.fees_paid;
                let name = r
                    .checkpost_id
                    .and_then(|id| checkpost_names.get(&id).cloned())
                    .unwrap_or_else(|| "Unknown Checkpost".to_string());
                *checkpost_drill.entry(name).or_insert(0.0) += r.fees_paid;
            }
            _ => {
                other_total += r.fees_paid;
                let name = r
                    .collection_other_text
                    .clone()
                    .unwrap_or_else(|| "Unknown Source".to_string());
                *other_drill.entry(name).or_insert(0.0) += r.fees_paid;
            }
        }
    }

    let market_fees_by_month = months
        .iter()
        .map(|&(year, month)| MonthlyFees {
            date: month_key(year, month),
            mf: round2(month_totals.get(&(year, month)).copied().unwrap_or(0.0)),
        })
        .collect();

    // Zero total: empty breakdowns rather than dividing by zero
    if total <= 0.0 {
        return Ok(CommitteeMarketFeeReport {
            total_market_fees: 0.0,
            market_fees_by_month,
            market_fees_by_location: Vec::new(),
            location_drilldown: LocationDrilldown::default(),
        });
    }

    let market_fees_by_location = vec![
        ShareItem {
            name: "office".to_string(),
            value: round2(office_total * 100.0 / total),
        },
        ShareItem {
            name: "checkpost".to_string(),
            value: round2(checkpost_total * 100.0 / total),
        },
        ShareItem {
            name: "other".to_string(),
            value: round2(other_total * 100.0 / total),
        },
    ];

    Ok(CommitteeMarketFeeReport {
        total_market_fees: round2(total),
        market_fees_by_month,
        market_fees_by_location,
        location_drilldown: LocationDrilldown {
            office: to_share_list(office_drill, total),
            checkpost: to_share_list(checkpost_drill, total),
            other: to_share_list(other_drill, total),
        },
    })
}

/// Turns a name → fees map into a percentage list, largest share first.
fn to_share_list(buckets: HashMap<String, f64>, total: f64) -> Vec<ShareItem> {
    let mut items: Vec<ShareItem> = buckets
        .into_iter()
        .map(|(name, fees)| ShareItem {
            name,
            value: round2(fees * 100.0 / total),
        })
        .collect();
    items.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.name.cmp(&b.name)));
    items
}

/// Percentage share of each commodity among a committee's receipt count.
///
/// Receipts without a commodity are left out of both the counts and the
/// total. An empty committee yields an empty list.
pub async fn commodity_mix(db: &DatabaseConnection, committee_id: i64) -> Result<Vec<ShareItem>> {
    let receipts = Receipt::find()
        .filter(receipt::Column::CommitteeId.eq(committee_id))
        .filter(receipt::Column::Cancelled.eq(false))
        .filter(receipt::Column::CommodityId.is_not_null())
        .all(db)
        .await?;

    if receipts.is_empty() {
        return Ok(Vec::new());
    }

    let mut counts: HashMap<i64, f64> = HashMap::new();
    for r in &receipts {
        if let Some(commodity_id) = r.commodity_id {
            *counts.entry(commodity_id).or_insert(0.0) += 1.0;
        }
    }

    let names: HashMap<i64, String> = Commodity::find()
        .filter(commodity::Column::Id.is_in(counts.keys().copied().collect::<Vec<_>>()))
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    #[allow(clippy::cast_precision_loss)]
    let total = receipts.len() as f64;
    let named = counts
        .into_iter()
        .map(|(id, count)| {
            (
                names
                    .get(&id)
                    .cloned()
                    .unwrap_or_else(|| "Unknown Commodity".to_string()),
                count,
            )
        })
        .collect();
    Ok(to_share_list(named, total))
}

/// Each committee's percentage share of the district-wide market-fee total.
///
/// A zero district total yields an empty list.
pub async fn district_market_fee_share(db: &DatabaseConnection) -> Result<Vec<ShareItem>> {
    let receipts = Receipt::find()
        .filter(receipt::Column::NatureOfReceipt.eq(NATURE_MARKET_FEE))
        .filter(receipt::Column::Cancelled.eq(false))
        .all(db)
        .await?;

    let total: f64 = receipts.iter().map(|r| r.fees_paid).sum();
    if total <= 0.0 {
        return Ok(Vec::new());
    }

    let mut by_committee: HashMap<i64, f64> = HashMap::new();
    for r in &receipts {
        *by_committee.entry(r.committee_id).or_insert(0.0) += r.fees_paid;
    }

    let names: HashMap<i64, String> = Committee::find()
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    let named = by_committee
        .into_iter()
        .map(|(id, fees)| {
            (
                names
                    .get(&id)
                    .cloned()
                    .unwrap_or_else(|| "Unknown Committee".to_string()),
                fees,
            )
        })
        .collect();
    Ok(to_share_list(named, total))
}
