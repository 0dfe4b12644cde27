//! Monthly target CRUD.
//!
//! Uniqueness on (year, month, committee, checkpost) is enforced here with a
//! pre-insert query rather than a database constraint, mirroring how the
//! duplicate-receipt check works. Every mutation refreshes the matching
//! committee monthly roll-up row so targets show up in the overview without a
//! separate join.

use crate::{
    core::rollup,
    entities::{Checkpost, Committee, Target, target},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder, TransactionTrait,
};

/// Input for creating or replacing a target, also the POST body shape.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTarget {
    /// Calendar year
    pub year: i32,
    /// Calendar month (1-12)
    pub month: i32,
    /// Committee the target applies to
    pub committee_id: i64,
    /// Optional checkpost scope; None means committee-wide
    pub checkpost_id: Option<i64>,
    /// Market-fee goal
    pub market_fee_target: f64,
    /// Trade-value goal
    pub total_value_target: f64,
    /// Identity of the user setting the target
    pub set_by: Option<String>,
}

fn validate_amounts(market_fee_target: f64, total_value_target: f64) -> Result<()> {
    for (label, amount) in [
        ("Market fee target", market_fee_target),
        ("Total value target", total_value_target),
    ] {
        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::Validation {
                message: format!("{label} must be a non-negative number, got {amount}"),
            });
        }
    }
    Ok(())
}

fn validate_month(month: i32) -> Result<()> {
    if !(1..=12).contains(&month) {
        return Err(Error::Validation {
            message: format!("Month must be between 1 and 12, got {month}"),
        });
    }
    Ok(())
}

/// Creates a target for a (year, month, committee, checkpost) slot.
///
/// Fails with `DuplicateTarget` when the slot already has one; callers should
/// update the existing row instead.
pub async fn set_target(db: &DatabaseConnection, new_target: NewTarget) -> Result<target::Model> {
    validate_month(new_target.month)?;
    validate_amounts(new_target.market_fee_target, new_target.total_value_target)?;

    let txn = db.begin().await?;

    Committee::find_by_id(new_target.committee_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::NotFound {
            what: format!("Committee {}", new_target.committee_id),
        })?;

    if let Some(checkpost_id) = new_target.checkpost_id {
        let checkpost = Checkpost::find_by_id(checkpost_id)
            .one(&txn)
            .await?
            .ok_or_else(|| Error::NotFound {
                what: format!("Checkpost {checkpost_id}"),
            })?;
        if checkpost.committee_id != new_target.committee_id {
            return Err(Error::Validation {
                message: format!(
                    "Checkpost {checkpost_id} does not belong to committee {}",
                    new_target.committee_id
                ),
            });
        }
    }

    let scope = match new_target.checkpost_id {
        Some(id) => Condition::all().add(target::Column::CheckpostId.eq(id)),
        None => Condition::all().add(target::Column::CheckpostId.is_null()),
    };
    let existing = Target::find()
        .filter(target::Column::Year.eq(new_target.year))
        .filter(target::Column::Month.eq(new_target.month))
        .filter(target::Column::CommitteeId.eq(new_target.committee_id))
        .filter(scope)
        .one(&txn)
        .await?;
    if existing.is_some() {
        return Err(Error::DuplicateTarget {
            year: new_target.year,
            month: new_target.month,
        });
    }

    let model = target::ActiveModel {
        id: ActiveValue::NotSet,
        year: ActiveValue::Set(new_target.year),
        month: ActiveValue::Set(new_target.month),
        committee_id: ActiveValue::Set(new_target.committee_id),
        checkpost_id: ActiveValue::Set(new_target.checkpost_id),
        market_fee_target: ActiveValue::Set(new_target.market_fee_target),
        total_value_target: ActiveValue::Set(new_target.total_value_target),
        set_by: ActiveValue::Set(new_target.set_by),
        updated_at: ActiveValue::Set(Utc::now()),
    }
    .insert(&txn)
    .await?;

    rollup::refresh_committee_month(&txn, model.committee_id, model.year, model.month).await?;
    txn.commit().await?;

    tracing::info!(
        target_id = model.id,
        committee_id = model.committee_id,
        year = model.year,
        month = model.month,
        "Set monthly target"
    );
    Ok(model)
}

/// Updated amounts for an existing target, also the PUT body shape. The slot
/// itself is immutable; moving a target means deleting and recreating it.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetAmounts {
    /// New market-fee goal
    pub market_fee_target: f64,
    /// New trade-value goal
    pub total_value_target: f64,
    /// Identity of the user making the change
    pub set_by: Option<String>,
}

/// Replaces the amounts of an existing target.
pub async fn update_target(
    db: &DatabaseConnection,
    id: i64,
    amounts: TargetAmounts,
) -> Result<target::Model> {
    validate_amounts(amounts.market_fee_target, amounts.total_value_target)?;

    let txn = db.begin().await?;

    let existing = Target::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::NotFound {
            what: format!("Target {id}"),
        })?;

    let mut active: target::ActiveModel = existing.into();
    active.market_fee_target = ActiveValue::Set(amounts.market_fee_target);
    active.total_value_target = ActiveValue::Set(amounts.total_value_target);
    if amounts.set_by.is_some() {
        active.set_by = ActiveValue::Set(amounts.set_by);
    }
    active.updated_at = ActiveValue::Set(Utc::now());
    let model = active.update(&txn).await?;

    rollup::refresh_committee_month(&txn, model.committee_id, model.year, model.month).await?;
    txn.commit().await?;

    Ok(model)
}

/// Deletes a target and clears it from the committee monthly roll-up.
pub async fn delete_target(db: &DatabaseConnection, id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let existing = Target::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::NotFound {
            what: format!("Target {id}"),
        })?;
    let (committee_id, year, month) = (existing.committee_id, existing.year, existing.month);

    existing.delete(&txn).await?;
    rollup::refresh_committee_month(&txn, committee_id, year, month).await?;
    txn.commit().await?;

    tracing::info!(target_id = id, committee_id, year, month, "Deleted monthly target");
    Ok(())
}

/// Filter for [`list_targets`]; all fields optional.
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetFilter {
    /// Restrict to one committee
    pub committee_id: Option<i64>,
    /// Restrict to one year
    pub year: Option<i32>,
    /// Restrict to one month
    pub month: Option<i32>,
}

/// Lists targets, newest slot first.
pub async fn list_targets(
    db: &DatabaseConnection,
    filter: TargetFilter,
) -> Result<Vec<target::Model>> {
    let mut query = Target::find()
        .order_by_desc(target::Column::Year)
        .order_by_desc(target::Column::Month);
    if let Some(committee_id) = filter.committee_id {
        query = query.filter(target::Column::CommitteeId.eq(committee_id));
    }
    if let Some(year) = filter.year {
        query = query.filter(target::Column::Year.eq(year));
    }
    if let Some(month) = filter.month {
        validate_month(month)?;
        query = query.filter(target::Column::Month.eq(month));
    }
    Ok(query.all(db).await?)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::overview::committee_overview;
    use crate::test_utils::{
        create_test_checkpost, create_test_committee, date, setup_test_db,
        setup_with_committee_and_trader,
    };

    fn new_target(committee_id: i64, year: i32, month: i32) -> NewTarget {
        NewTarget {
            year,
            month,
            committee_id,
            checkpost_id: None,
            market_fee_target: 50_000.0,
            total_value_target: 2_000_000.0,
            set_by: Some("ad@district".to_string()),
        }
    }

    #[tokio::test]
    async fn test_set_target_rejects_bad_month() -> Result<()> {
        let db = setup_test_db().await?;
        let committee = create_test_committee(&db, "AMC Guntur").await?;

        let result = set_target(&db, new_target(committee.id, 2025, 13)).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_set_target_rejects_negative_amount() -> Result<()> {
        let db = setup_test_db().await?;
        let committee = create_test_committee(&db, "AMC Guntur").await?;

        let mut target = new_target(committee.id, 2025, 6);
        target.market_fee_target = -1.0;
        let result = set_target(&db, target).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_set_target_unknown_committee() -> Result<()> {
        let db = setup_test_db().await?;

        let result = set_target(&db, new_target(9999, 2025, 6)).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_set_target_duplicate_slot() -> Result<()> {
        let db = setup_test_db().await?;
        let committee = create_test_committee(&db, "AMC Guntur").await?;

        set_target(&db, new_target(committee.id, 2025, 6)).await?;
        let result = set_target(&db, new_target(committee.id, 2025, 6)).await;
        assert!(matches!(result.unwrap_err(), Error::DuplicateTarget { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_committee_and_checkpost_slots_are_distinct() -> Result<()> {
        let db = setup_test_db().await?;
        let committee = create_test_committee(&db, "AMC Guntur").await?;
        let checkpost = create_test_checkpost(&db, "CP-A", committee.id).await?;

        set_target(&db, new_target(committee.id, 2025, 6)).await?;
        let mut scoped = new_target(committee.id, 2025, 6);
        scoped.checkpost_id = Some(checkpost.id);
        set_target(&db, scoped).await?;

        let targets = list_targets(&db, TargetFilter::default()).await?;
        assert_eq!(targets.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_checkpost_must_belong_to_committee() -> Result<()> {
        let db = setup_test_db().await?;
        let committee = create_test_committee(&db, "AMC Guntur").await?;
        let other = create_test_committee(&db, "AMC Tenali").await?;
        let foreign = create_test_checkpost(&db, "CP-X", other.id).await?;

        let mut target = new_target(committee.id, 2025, 6);
        target.checkpost_id = Some(foreign.id);
        let result = set_target(&db, target).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_set_target_appears_in_overview() -> Result<()> {
        let (db, committee, _trader) = setup_with_committee_and_trader().await?;

        set_target(&db, new_target(committee.id, 2025, 6)).await?;

        let overview = committee_overview(&db, committee.id, date(2025, 6, 15)).await?;
        assert_eq!(overview.market_fee_target, 50_000.0);
        assert_eq!(overview.total_value_target, 2_000_000.0);
        assert_eq!(overview.receipt_count, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_target_amounts() -> Result<()> {
        let (db, committee, _trader) = setup_with_committee_and_trader().await?;

        let created = set_target(&db, new_target(committee.id, 2025, 6)).await?;
        let updated = update_target(
            &db,
            created.id,
            TargetAmounts {
                market_fee_target: 75_000.0,
                total_value_target: 3_000_000.0,
                set_by: None,
            },
        )
        .await?;

        assert_eq!(updated.market_fee_target, 75_000.0);
        assert_eq!(updated.set_by, Some("ad@district".to_string()));

        let overview = committee_overview(&db, committee.id, date(2025, 6, 15)).await?;
        assert_eq!(overview.market_fee_target, 75_000.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_target_clears_overview() -> Result<()> {
        let (db, committee, _trader) = setup_with_committee_and_trader().await?;

        let created = set_target(&db, new_target(committee.id, 2025, 6)).await?;
        delete_target(&db, created.id).await?;

        // Row removed entirely once neither receipts nor targets remain
        let result = committee_overview(&db, committee.id, date(2025, 6, 15)).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));

        assert!(matches!(
            delete_target(&db, created.id).await.unwrap_err(),
            Error::NotFound { .. }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_list_targets_filters() -> Result<()> {
        let db = setup_test_db().await?;
        let guntur = create_test_committee(&db, "AMC Guntur").await?;
        let tenali = create_test_committee(&db, "AMC Tenali").await?;

        set_target(&db, new_target(guntur.id, 2025, 5)).await?;
        set_target(&db, new_target(guntur.id, 2025, 6)).await?;
        set_target(&db, new_target(tenali.id, 2025, 6)).await?;

        let all = list_targets(&db, TargetFilter::default()).await?;
        assert_eq!(all.len(), 3);
        assert_eq!((all[0].year, all[0].month), (2025, 6));

        let guntur_only = list_targets(
            &db,
            TargetFilter { committee_id: Some(guntur.id), ..Default::default() },
        )
        .await?;
        assert_eq!(guntur_only.len(), 2);

        let june = list_targets(
            &db,
            TargetFilter { month: Some(6), year: Some(2025), committee_id: None },
        )
        .await?;
        assert_eq!(june.len(), 2);

        Ok(())
    }
}
