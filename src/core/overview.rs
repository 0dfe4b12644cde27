//! Committee dashboard overview.

use crate::{
    entities::{CommitteeMonthlyAnalytics, CommitteeMonthlyModel, committee_monthly_analytics},
    errors::{Error, Result},
};
use chrono::{Datelike, NaiveDate};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// Returns the committee's roll-up row for the month containing `as_of`.
///
/// Targets are already folded into the row, so one query serves the whole
/// dashboard header. `NotFound` when the committee has neither receipts nor
/// a target for the current month.
pub async fn committee_overview(
    db: &DatabaseConnection,
    committee_id: i64,
    as_of: NaiveDate,
) -> Result<CommitteeMonthlyModel> {
    #[allow(clippy::cast_possible_wrap)]
    let month = as_of.month() as i32;
    CommitteeMonthlyAnalytics::find()
        .filter(committee_monthly_analytics::Column::CommitteeId.eq(committee_id))
        .filter(committee_monthly_analytics::Column::Year.eq(as_of.year()))
        .filter(committee_monthly_analytics::Column::Month.eq(month))
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            what: format!(
                "Overview for committee {committee_id} in {}-{:02}",
                as_of.year(),
                as_of.month()
            ),
        })
}
