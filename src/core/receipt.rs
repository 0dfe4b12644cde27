//! Receipt business logic - creation, cancellation, and verification.
//!
//! Receipts are the primary records of the system. Creation validates the
//! monetary fields, the nature/location enums, and the per-committee
//! book/receipt number uniqueness, then inserts the row and refreshes the
//! derived roll-up tables inside one database transaction. Receipts are never
//! deleted: cancellation flips the `cancelled` flag and reverses the roll-ups
//! the same way.

use crate::{
    core::rollup,
    entities::{
        Checkpost, Commodity, Committee, Receipt, Trader, checkpost, commodity, receipt, trader,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Market fee - the principal levy on agricultural trade
pub const NATURE_MARKET_FEE: &str = "mf";
/// License fee
pub const NATURE_LICENSE_FEE: &str = "lf";
/// User charge
pub const NATURE_USER_CHARGE: &str = "uc";
/// Any other levy
pub const NATURE_OTHERS: &str = "others";

/// Collection at the committee office
pub const LOCATION_OFFICE: &str = "office";
/// Collection at a checkpost
pub const LOCATION_CHECKPOST: &str = "checkpost";
/// Collection anywhere else
pub const LOCATION_OTHER: &str = "other";

const NATURES: [&str; 4] = [
    NATURE_MARKET_FEE,
    NATURE_LICENSE_FEE,
    NATURE_USER_CHARGE,
    NATURE_OTHERS,
];
const LOCATIONS: [&str; 3] = [LOCATION_OFFICE, LOCATION_CHECKPOST, LOCATION_OTHER];

/// Input for creating a receipt, also the POST body shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReceipt {
    /// Date of the receipted transaction
    pub receipt_date: NaiveDate,
    /// Book number
    pub book_number: String,
    /// Receipt number within the book
    pub receipt_number: String,
    /// Trader the receipt is issued against
    pub trader_id: i64,
    /// Payee name
    pub payee_name: String,
    /// Optional payee address
    pub payee_address: Option<String>,
    /// Optional commodity
    pub commodity_id: Option<i64>,
    /// Quantity traded
    pub quantity: f64,
    /// Unit of the quantity
    pub unit: String,
    /// Nature of the levy ("mf", "lf", "uc", "others")
    pub nature_of_receipt: String,
    /// Trade value
    pub value: f64,
    /// Fees collected
    pub fees_paid: f64,
    /// Optional vehicle number
    pub vehicle_number: Option<String>,
    /// Optional invoice number
    pub invoice_number: Option<String>,
    /// Collection location ("office", "checkpost", "other")
    pub collection_location: String,
    /// Supervisor name when collected at the office
    pub office_supervisor: Option<String>,
    /// Checkpost id when collected at a checkpost
    pub checkpost_id: Option<i64>,
    /// Free-text description when collected elsewhere
    pub collection_other_text: Option<String>,
    /// Identity of the data-entry user
    pub created_by: Option<String>,
    /// Committee the receipt belongs to
    pub committee_id: i64,
}

fn validate_new_receipt(new: &NewReceipt) -> Result<()> {
    for amount in [new.value, new.fees_paid] {
        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::InvalidAmount { amount });
        }
    }
    if !new.quantity.is_finite() || new.quantity <= 0.0 {
        return Err(Error::InvalidAmount {
            amount: new.quantity,
        });
    }
    if new.book_number.trim().is_empty() || new.receipt_number.trim().is_empty() {
        return Err(Error::Validation {
            message: "Book number and receipt number are required".to_string(),
        });
    }
    if !NATURES.contains(&new.nature_of_receipt.as_str()) {
        return Err(Error::Validation {
            message: format!("Unknown nature of receipt: {}", new.nature_of_receipt),
        });
    }
    if !LOCATIONS.contains(&new.collection_location.as_str()) {
        return Err(Error::Validation {
            message: format!("Unknown collection location: {}", new.collection_location),
        });
    }
    if new.collection_location == LOCATION_CHECKPOST && new.checkpost_id.is_none() {
        return Err(Error::Validation {
            message: "Checkpost collection requires a checkpost".to_string(),
        });
    }
    Ok(())
}

/// Creates a new receipt and refreshes the derived analytics rows.
///
/// Validation happens before any query runs; the duplicate check, the insert,
/// and the roll-up refresh all share one database transaction so concurrent
/// writers cannot observe a receipt without its roll-ups.
pub async fn create_receipt(db: &DatabaseConnection, new: NewReceipt) -> Result<receipt::Model> {
    validate_new_receipt(&new)?;

    let txn = db.begin().await?;

    Committee::find_by_id(new.committee_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::NotFound {
            what: format!("Committee {}", new.committee_id),
        })?;

    Trader::find_by_id(new.trader_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::NotFound {
            what: format!("Trader {}", new.trader_id),
        })?;

    if let Some(checkpost_id) = new.checkpost_id {
        let checkpost = Checkpost::find_by_id(checkpost_id)
            .one(&txn)
            .await?
            .ok_or_else(|| Error::NotFound {
                what: format!("Checkpost {checkpost_id}"),
            })?;
        if checkpost.committee_id != new.committee_id {
            return Err(Error::Validation {
                message: "Checkpost does not belong to the committee".to_string(),
            });
        }
    }

    // (book, receipt, committee) unique among non-cancelled rows
    let duplicate = Receipt::find()
        .filter(receipt::Column::BookNumber.eq(new.book_number.trim()))
        .filter(receipt::Column::ReceiptNumber.eq(new.receipt_number.trim()))
        .filter(receipt::Column::CommitteeId.eq(new.committee_id))
        .filter(receipt::Column::Cancelled.eq(false))
        .one(&txn)
        .await?;
    if duplicate.is_some() {
        return Err(Error::DuplicateReceipt {
            book_number: new.book_number,
            receipt_number: new.receipt_number,
            committee_id: new.committee_id,
        });
    }

    let model = receipt::ActiveModel {
        receipt_date: Set(new.receipt_date),
        book_number: Set(new.book_number.trim().to_string()),
        receipt_number: Set(new.receipt_number.trim().to_string()),
        trader_id: Set(new.trader_id),
        payee_name: Set(new.payee_name),
        payee_address: Set(new.payee_address),
        commodity_id: Set(new.commodity_id),
        quantity: Set(new.quantity),
        unit: Set(new.unit),
        nature_of_receipt: Set(new.nature_of_receipt),
        value: Set(new.value),
        fees_paid: Set(new.fees_paid),
        vehicle_number: Set(new.vehicle_number),
        invoice_number: Set(new.invoice_number),
        collection_location: Set(new.collection_location),
        office_supervisor: Set(new.office_supervisor),
        checkpost_id: Set(new.checkpost_id),
        collection_other_text: Set(new.collection_other_text),
        created_by: Set(new.created_by),
        committee_id: Set(new.committee_id),
        cancelled: Set(false),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    rollup::refresh_for_receipt(&txn, &model).await?;

    txn.commit().await?;

    Ok(model)
}

/// Cancels a receipt and reverses its contribution to the roll-ups.
///
/// The row is kept; only the cancellation flag changes.
pub async fn cancel_receipt(db: &DatabaseConnection, receipt_id: i64) -> Result<receipt::Model> {
    let txn = db.begin().await?;

    let existing = Receipt::find_by_id(receipt_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::NotFound {
            what: format!("Receipt {receipt_id}"),
        })?;

    if existing.cancelled {
        return Err(Error::Validation {
            message: format!("Receipt {receipt_id} is already cancelled"),
        });
    }

    let mut active: receipt::ActiveModel = existing.into();
    active.cancelled = Set(true);
    let updated = active.update(&txn).await?;

    rollup::refresh_for_receipt(&txn, &updated).await?;

    txn.commit().await?;

    Ok(updated)
}

/// A receipt with its referenced names joined in, as shown on the
/// verification screen.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedReceipt {
    /// Receipt id
    pub id: i64,
    /// Date of the receipted transaction
    pub receipt_date: NaiveDate,
    /// Book number
    pub book_number: String,
    /// Receipt number
    pub receipt_number: String,
    /// Payee name
    pub payee_name: String,
    /// Nature of the levy
    pub nature_of_receipt: String,
    /// Trade value
    pub value: f64,
    /// Fees collected
    pub fees_paid: f64,
    /// Name of the trader on the receipt
    pub trader_name: String,
    /// Name of the commodity, when one was recorded
    pub commodity_name: Option<String>,
    /// Name of the owning committee
    pub committee_name: String,
    /// Name of the collecting checkpost, when collected at one
    pub checkpost_name: Option<String>,
}

/// Looks up non-cancelled receipts by (book number, receipt number, committee)
/// and joins in the trader/commodity/committee/checkpost names.
///
/// Returns `NotFound` when nothing matches.
pub async fn verify_receipts(
    db: &DatabaseConnection,
    book_number: &str,
    receipt_number: &str,
    committee_id: i64,
) -> Result<Vec<VerifiedReceipt>> {
    let committee = Committee::find_by_id(committee_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            what: format!("Committee {committee_id}"),
        })?;

    let receipts = Receipt::find()
        .filter(receipt::Column::BookNumber.eq(book_number))
        .filter(receipt::Column::ReceiptNumber.eq(receipt_number))
        .filter(receipt::Column::CommitteeId.eq(committee_id))
        .filter(receipt::Column::Cancelled.eq(false))
        .all(db)
        .await?;

    if receipts.is_empty() {
        return Err(Error::NotFound {
            what: format!("Receipt {book_number}/{receipt_number}"),
        });
    }

    let trader_names = name_map::<Trader, _>(db, receipts.iter().map(|r| r.trader_id)).await?;
    let commodity_names =
        name_map::<Commodity, _>(db, receipts.iter().filter_map(|r| r.commodity_id)).await?;
    let checkpost_names =
        name_map::<Checkpost, _>(db, receipts.iter().filter_map(|r| r.checkpost_id)).await?;

    Ok(receipts
        .into_iter()
        .map(|r| VerifiedReceipt {
            id: r.id,
            receipt_date: r.receipt_date,
            book_number: r.book_number,
            receipt_number: r.receipt_number,
            payee_name: r.payee_name,
            nature_of_receipt: r.nature_of_receipt,
            value: r.value,
            fees_paid: r.fees_paid,
            trader_name: trader_names
                .get(&r.trader_id)
                .cloned()
                .unwrap_or_else(|| "Unknown Trader".to_string()),
            commodity_name: r.commodity_id.and_then(|id| commodity_names.get(&id).cloned()),
            committee_name: committee.name.clone(),
            checkpost_name: r.checkpost_id.and_then(|id| checkpost_names.get(&id).cloned()),
        })
        .collect())
}

/// Fetches id → name for the referenced rows of a name-bearing entity.
async fn name_map<E, I>(db: &DatabaseConnection, ids: I) -> Result<HashMap<i64, String>>
where
    E: NamedEntity,
    I: Iterator<Item = i64>,
{
    let ids: Vec<i64> = ids.collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    E::names_by_ids(db, ids).await
}

/// Entities that expose an (id, name) pair for joining display names.
trait NamedEntity {
    async fn names_by_ids(db: &DatabaseConnection, ids: Vec<i64>) -> Result<HashMap<i64, String>>;
}

impl NamedEntity for Trader {
    async fn names_by_ids(db: &DatabaseConnection, ids: Vec<i64>) -> Result<HashMap<i64, String>> {
        Ok(Trader::find()
            .filter(trader::Column::Id.is_in(ids))
            .all(db)
            .await?
            .into_iter()
            .map(|m| (m.id, m.name))
            .collect())
    }
}

impl NamedEntity for Commodity {
    async fn names_by_ids(db: &DatabaseConnection, ids: Vec<i64>) -> Result<HashMap<i64, String>> {
        Ok(Commodity::find()
            .filter(commodity::Column::Id.is_in(ids))
            .all(db)
            .await?
            .into_iter()
            .map(|m| (m.id, m.name))
            .collect())
    }
}

impl NamedEntity for Checkpost {
    async fn names_by_ids(db: &DatabaseConnection, ids: Vec<i64>) -> Result<HashMap<i64, String>> {
        Ok(Checkpost::find()
            .filter(checkpost::Column::Id.is_in(ids))
            .all(db)
            .await?
            .into_iter()
            .map(|m| (m.id, m.name))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::{
        create_custom_receipt, create_test_receipt, date, new_test_receipt,
        setup_with_committee_and_trader,
    };

    #[tokio::test]
    async fn test_create_receipt_negative_fees_rejected() -> Result<()> {
        let (db, committee, trader) = setup_with_committee_and_trader().await?;

        let mut new = new_test_receipt(committee.id, trader.id, date(2025, 3, 1));
        new.fees_paid = -10.0;
        let result = create_receipt(&db, new).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_receipt_unknown_nature_rejected() -> Result<()> {
        let (db, committee, trader) = setup_with_committee_and_trader().await?;

        let mut new = new_test_receipt(committee.id, trader.id, date(2025, 3, 1));
        new.nature_of_receipt = "toll".to_string();
        let result = create_receipt(&db, new).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_receipt_duplicate_rejected() -> Result<()> {
        let (db, committee, trader) = setup_with_committee_and_trader().await?;

        create_test_receipt(&db, committee.id, trader.id, date(2025, 3, 1)).await?;
        let result =
            create_receipt(&db, new_test_receipt(committee.id, trader.id, date(2025, 3, 2))).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::DuplicateReceipt { .. }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_cancelled_number_can_be_reissued() -> Result<()> {
        let (db, committee, trader) = setup_with_committee_and_trader().await?;

        let first = create_test_receipt(&db, committee.id, trader.id, date(2025, 3, 1)).await?;
        cancel_receipt(&db, first.id).await?;

        // Uniqueness only applies among non-cancelled rows
        let reissued =
            create_receipt(&db, new_test_receipt(committee.id, trader.id, date(2025, 3, 2)))
                .await?;
        assert_eq!(reissued.book_number, first.book_number);
        assert_eq!(reissued.receipt_number, first.receipt_number);

        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_receipt_twice_rejected() -> Result<()> {
        let (db, committee, trader) = setup_with_committee_and_trader().await?;

        let created = create_test_receipt(&db, committee.id, trader.id, date(2025, 3, 1)).await?;
        cancel_receipt(&db, created.id).await?;
        let result = cancel_receipt(&db, created.id).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_checkpost_must_belong_to_committee() -> Result<()> {
        let (db, committee, trader) = setup_with_committee_and_trader().await?;
        let other_committee = crate::test_utils::create_test_committee(&db, "Other AMC").await?;
        let foreign_checkpost =
            crate::test_utils::create_test_checkpost(&db, "Foreign CP", other_committee.id)
                .await?;

        let mut new = new_test_receipt(committee.id, trader.id, date(2025, 3, 1));
        new.collection_location = LOCATION_CHECKPOST.to_string();
        new.office_supervisor = None;
        new.checkpost_id = Some(foreign_checkpost.id);
        let result = create_receipt(&db, new).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_verify_receipts_joins_names() -> Result<()> {
        let (db, committee, trader) = setup_with_committee_and_trader().await?;
        let commodity = crate::test_utils::create_test_commodity(&db, "Rice").await?;

        create_custom_receipt(&db, committee.id, trader.id, date(2025, 3, 1), |r| {
            r.commodity_id = Some(commodity.id);
        })
        .await?;

        let verified = verify_receipts(&db, "B-1", "R-1", committee.id).await?;
        assert_eq!(verified.len(), 1);
        assert_eq!(verified[0].trader_name, trader.name);
        assert_eq!(verified[0].commodity_name.as_deref(), Some("Rice"));
        assert_eq!(verified[0].committee_name, committee.name);

        Ok(())
    }

    #[tokio::test]
    async fn test_verify_receipts_not_found() -> Result<()> {
        let (db, committee, _trader) = setup_with_committee_and_trader().await?;

        let result = verify_receipts(&db, "B-9", "R-9", committee.id).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_verify_receipts_excludes_cancelled() -> Result<()> {
        let (db, committee, trader) = setup_with_committee_and_trader().await?;

        let created = create_test_receipt(&db, committee.id, trader.id, date(2025, 3, 1)).await?;
        cancel_receipt(&db, created.id).await?;

        let result = verify_receipts(&db, "B-1", "R-1", committee.id).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));

        Ok(())
    }
}
