//! District-wide commodity analytics.

use crate::{
    core::period::{month_key, round2, trailing_months},
    entities::{Commodity, Receipt, Trader, commodity, receipt, trader},
    errors::Result,
};
use chrono::{Datelike, NaiveDate};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Number of commodities in the district top list.
const TOP_COMMODITY_COUNT: usize = 3;

/// Number of trailing months shown per top commodity.
const TOP_COMMODITY_MONTHS: usize = 6;

/// Traded quantity observed in one month.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthlyQuantity {
    /// Month key, `YYYY-MM`
    pub month: String,
    /// Quantity traded in that month
    pub quantity: f64,
}

/// One of the district's top commodities by traded quantity.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopCommodity {
    /// Commodity name
    pub commodity_name: String,
    /// All-time traded quantity
    pub total_quantity_traded: f64,
    /// Distinct trader names that dealt in the commodity
    pub traders: Vec<String>,
    /// Trailing-6-month quantity series, observed months only
    pub monthly_trade: Vec<MonthlyQuantity>,
}

/// Ranks the district's top 3 commodities by all-time traded quantity.
///
/// The per-commodity monthly series covers the 6 months ending at `as_of`
/// and is sparse: months with no trade are omitted rather than zero-filled.
pub async fn top_commodities(db: &DatabaseConnection, as_of: NaiveDate) -> Result<Vec<TopCommodity>> {
    let receipts = Receipt::find()
        .filter(receipt::Column::Cancelled.eq(false))
        .filter(receipt::Column::CommodityId.is_not_null())
        .all(db)
        .await?;

    let mut totals: HashMap<i64, f64> = HashMap::new();
    for row in &receipts {
        if let Some(commodity_id) = row.commodity_id {
            *totals.entry(commodity_id).or_insert(0.0) += row.quantity;
        }
    }

    let mut ranked: Vec<(i64, f64)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(TOP_COMMODITY_COUNT);

    let commodity_ids: Vec<i64> = ranked.iter().map(|(id, _)| *id).collect();
    let commodity_names: HashMap<i64, String> = Commodity::find()
        .filter(commodity::Column::Id.is_in(commodity_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    let window: HashSet<(i32, u32)> = trailing_months(as_of, TOP_COMMODITY_MONTHS)
        .into_iter()
        .collect();

    let mut result = Vec::with_capacity(ranked.len());
    for (commodity_id, total_quantity) in ranked {
        let mut trader_ids: HashSet<i64> = HashSet::new();
        // Months sort chronologically because keys are (year, month) pairs
        let mut monthly: BTreeMap<(i32, u32), f64> = BTreeMap::new();
        for row in receipts.iter().filter(|r| r.commodity_id == Some(commodity_id)) {
            trader_ids.insert(row.trader_id);
            let bucket = (row.receipt_date.year(), row.receipt_date.month());
            if window.contains(&bucket) {
                *monthly.entry(bucket).or_insert(0.0) += row.quantity;
            }
        }

        let mut traders: Vec<String> = Trader::find()
            .filter(trader::Column::Id.is_in(trader_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|t| t.name)
            .collect();
        traders.sort();

        result.push(TopCommodity {
            commodity_name: commodity_names
                .get(&commodity_id)
                .cloned()
                .unwrap_or_else(|| "Unknown Commodity".to_string()),
            total_quantity_traded: round2(total_quantity),
            traders,
            monthly_trade: monthly
                .into_iter()
                .map(|((year, month), quantity)| MonthlyQuantity {
                    month: month_key(year, month),
                    quantity: round2(quantity),
                })
                .collect(),
        });
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::{
        create_custom_receipt, create_test_commodity, create_test_trader, date,
        setup_with_committee_and_trader,
    };

    #[tokio::test]
    async fn test_top_commodities_orders_by_quantity() -> Result<()> {
        let (db, committee, trader) = setup_with_committee_and_trader().await?;
        let rice = create_test_commodity(&db, "Rice").await?;
        let wheat = create_test_commodity(&db, "Wheat").await?;

        create_custom_receipt(&db, committee.id, trader.id, date(2025, 4, 10), |r| {
            r.commodity_id = Some(rice.id);
            r.quantity = 50.0;
        })
        .await?;
        create_custom_receipt(&db, committee.id, trader.id, date(2025, 5, 10), |r| {
            r.receipt_number = "R-2".to_string();
            r.commodity_id = Some(wheat.id);
            r.quantity = 20.0;
        })
        .await?;

        let top = top_commodities(&db, date(2025, 6, 15)).await?;

        assert_eq!(top.len(), 2);
        assert_eq!(top[0].commodity_name, "Rice");
        assert_eq!(top[0].total_quantity_traded, 50.0);
        assert_eq!(top[0].traders, vec![trader.name.clone()]);
        assert_eq!(top[1].commodity_name, "Wheat");
        assert_eq!(top[1].total_quantity_traded, 20.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_top_commodities_limited_to_three() -> Result<()> {
        let (db, committee, trader) = setup_with_committee_and_trader().await?;

        for (i, name) in ["Rice", "Wheat", "Maize", "Cotton"].iter().enumerate() {
            let commodity = create_test_commodity(&db, name).await?;
            create_custom_receipt(&db, committee.id, trader.id, date(2025, 5, 10), |r| {
                r.receipt_number = format!("R-{i}");
                r.commodity_id = Some(commodity.id);
                #[allow(clippy::cast_precision_loss)]
                {
                    r.quantity = 10.0 * (i + 1) as f64;
                }
            })
            .await?;
        }

        let top = top_commodities(&db, date(2025, 6, 15)).await?;

        assert_eq!(top.len(), 3);
        assert_eq!(top[0].commodity_name, "Cotton");
        assert_eq!(top[2].commodity_name, "Wheat");

        Ok(())
    }

    #[tokio::test]
    async fn test_monthly_trade_is_sparse_and_windowed() -> Result<()> {
        let (db, committee, trader) = setup_with_committee_and_trader().await?;
        let rice = create_test_commodity(&db, "Rice").await?;

        // Inside the 6-month window ending June 2025
        create_custom_receipt(&db, committee.id, trader.id, date(2025, 2, 10), |r| {
            r.commodity_id = Some(rice.id);
            r.quantity = 30.0;
        })
        .await?;
        create_custom_receipt(&db, committee.id, trader.id, date(2025, 5, 10), |r| {
            r.receipt_number = "R-2".to_string();
            r.commodity_id = Some(rice.id);
            r.quantity = 40.0;
        })
        .await?;
        // Outside the window, still counts toward the all-time total
        create_custom_receipt(&db, committee.id, trader.id, date(2024, 8, 10), |r| {
            r.receipt_number = "R-3".to_string();
            r.commodity_id = Some(rice.id);
            r.quantity = 15.0;
        })
        .await?;

        let top = top_commodities(&db, date(2025, 6, 15)).await?;

        assert_eq!(top.len(), 1);
        assert_eq!(top[0].total_quantity_traded, 85.0);
        assert_eq!(
            top[0].monthly_trade,
            vec![
                MonthlyQuantity { month: "2025-02".to_string(), quantity: 30.0 },
                MonthlyQuantity { month: "2025-05".to_string(), quantity: 40.0 },
            ]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_cancelled_and_commodity_less_receipts_excluded() -> Result<()> {
        let (db, committee, trader) = setup_with_committee_and_trader().await?;
        let rice = create_test_commodity(&db, "Rice").await?;

        // No commodity attached
        create_custom_receipt(&db, committee.id, trader.id, date(2025, 5, 10), |r| {
            r.quantity = 99.0;
        })
        .await?;
        let cancelled = create_custom_receipt(&db, committee.id, trader.id, date(2025, 5, 11), |r| {
            r.receipt_number = "R-2".to_string();
            r.commodity_id = Some(rice.id);
            r.quantity = 60.0;
        })
        .await?;
        crate::core::receipt::cancel_receipt(&db, cancelled.id).await?;
        create_custom_receipt(&db, committee.id, trader.id, date(2025, 5, 12), |r| {
            r.receipt_number = "R-3".to_string();
            r.commodity_id = Some(rice.id);
            r.quantity = 25.0;
        })
        .await?;

        let top = top_commodities(&db, date(2025, 6, 15)).await?;

        assert_eq!(top.len(), 1);
        assert_eq!(top[0].total_quantity_traded, 25.0);

        Ok(())
    }
}
