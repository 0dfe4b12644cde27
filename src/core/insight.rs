//! Pure trend and insight helpers over trader monthly roll-up rows.
//!
//! Everything in this module is framework- and database-free: the trader
//! report fetches the rows and hands them here, most-recent-first, together
//! with the all-time roll-up and the reporting date. Outputs are either
//! structured (trend) or human-readable insight strings shown on the trader
//! detail screen.

use crate::core::period::{month_key, month_name, round2};
use crate::entities::{trader_monthly_analytics, trader_overall_analytics};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

/// Growth threshold in percent; symmetric for decline.
const TREND_THRESHOLD_PCT: f64 = 5.0;

/// Trend classification over the two most recent months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendClass {
    /// Value grew by more than 5% month-over-month
    Growing,
    /// Value fell by more than 5% month-over-month
    Declining,
    /// Value changed by at most 5% either way
    Stable,
    /// Fewer than two monthly rows to compare
    InsufficientData,
}

/// Month-over-month trend between the two most recent roll-up rows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trend {
    /// Classification of the value movement
    pub classification: TrendClass,
    /// Percentage change in trade value
    pub value_change_pct: f64,
    /// Percentage change in traded quantity
    pub quantity_change_pct: f64,
    /// Percentage change in receipt count
    pub receipt_change_pct: f64,
}

/// Percentage change from `previous` to `current`.
///
/// A zero base with a nonzero current value reports +100%; zero to zero is 0%.
#[must_use]
pub fn pct_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return if current > 0.0 { 100.0 } else { 0.0 };
    }
    round2((current - previous) / previous * 100.0)
}

/// Computes the month-over-month trend from rows ordered most-recent-first.
#[must_use]
pub fn compute_trend(rows: &[trader_monthly_analytics::Model]) -> Trend {
    let (Some(current), Some(previous)) = (rows.first(), rows.get(1)) else {
        return Trend {
            classification: TrendClass::InsufficientData,
            value_change_pct: 0.0,
            quantity_change_pct: 0.0,
            receipt_change_pct: 0.0,
        };
    };

    let value_change_pct = pct_change(current.total_value, previous.total_value);
    let classification = if value_change_pct > TREND_THRESHOLD_PCT {
        TrendClass::Growing
    } else if value_change_pct < -TREND_THRESHOLD_PCT {
        TrendClass::Declining
    } else {
        TrendClass::Stable
    };

    #[allow(clippy::cast_precision_loss)]
    let receipt_change_pct = pct_change(current.receipt_count as f64, previous.receipt_count as f64);

    Trend {
        classification,
        value_change_pct,
        quantity_change_pct: pct_change(current.total_quantity, previous.total_quantity),
        receipt_change_pct,
    }
}

/// Consistency score in [0, 100] from monthly trade values.
///
/// Defined as `max(0, 100 − coefficient-of-variation × 100)`, rounded to the
/// nearest integer. Fewer than three months of data score 0.
#[must_use]
pub fn consistency_score(monthly_values: &[f64]) -> u32 {
    if monthly_values.len() < 3 {
        return 0;
    }

    #[allow(clippy::cast_precision_loss)]
    let n = monthly_values.len() as f64;
    let mean = monthly_values.iter().sum::<f64>() / n;
    if mean <= 0.0 {
        return 0;
    }

    let variance = monthly_values
        .iter()
        .map(|v| (v - mean).powi(2))
        .sum::<f64>()
        / n;
    let cv = variance.sqrt() / mean;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        (100.0 - cv * 100.0).max(0.0).round() as u32
    }
}

/// Generates the ordered list of human-readable insight strings for a trader.
///
/// `rows` are the filtered monthly roll-ups, most-recent-first; `overall` is
/// the all-time roll-up when one exists; `as_of` anchors the recency insights.
#[must_use]
pub fn generate_insights(
    rows: &[trader_monthly_analytics::Model],
    overall: Option<&trader_overall_analytics::Model>,
    as_of: NaiveDate,
) -> Vec<String> {
    let mut insights = Vec::new();

    if let Some(peak) = rows.iter().max_by(|a, b| a.total_value.total_cmp(&b.total_value)) {
        let month = u32::try_from(peak.month).unwrap_or_default();
        insights.push(format!(
            "Peak month: {} with trade value of ₹{:.2}",
            month_key(peak.year, month),
            peak.total_value
        ));
    }

    if !rows.is_empty() {
        #[allow(clippy::cast_precision_loss)]
        let n = rows.len() as f64;
        let avg_value = rows.iter().map(|r| r.total_value).sum::<f64>() / n;
        let avg_quantity = rows.iter().map(|r| r.total_quantity).sum::<f64>() / n;
        #[allow(clippy::cast_precision_loss)]
        let avg_receipts = rows.iter().map(|r| r.receipt_count).sum::<i64>() as f64 / n;
        insights.push(format!(
            "Monthly averages: ₹{:.2} in value, {:.2} in quantity, {:.1} receipts",
            round2(avg_value),
            round2(avg_quantity),
            avg_receipts
        ));
    }

    if let Some(overall) = overall {
        let days_since_first = (as_of - overall.first_transaction_date).num_days();
        let days_since_last = (as_of - overall.last_transaction_date).num_days();
        insights.push(format!(
            "First transaction {days_since_first} days ago; most recent {days_since_last} days ago"
        ));
        insights.push(activity_insight(days_since_last));
    }

    if !rows.is_empty() {
        let values: Vec<f64> = rows.iter().map(|r| r.total_value).collect();
        insights.push(format!(
            "Consistency score: {}/100",
            consistency_score(&values)
        ));
    }

    if let Some(seasonal) = seasonal_pattern(rows) {
        insights.push(seasonal);
    }

    insights
}

fn activity_insight(days_since_last: i64) -> String {
    if days_since_last <= 0 {
        "Trader is active today".to_string()
    } else if days_since_last <= 7 {
        "Trader was active within the last 7 days".to_string()
    } else if days_since_last <= 30 {
        "Trader was active within the last 30 days".to_string()
    } else {
        format!("Trader is inactive (last transaction {days_since_last} days ago)")
    }
}

/// Calendar month-of-year peak/low pattern, averaged across all years present.
/// Needs at least 12 monthly rows to say anything.
fn seasonal_pattern(rows: &[trader_monthly_analytics::Model]) -> Option<String> {
    if rows.len() < 12 {
        return None;
    }

    let mut by_calendar_month: HashMap<i32, (f64, u32)> = HashMap::new();
    for row in rows {
        let entry = by_calendar_month.entry(row.month).or_insert((0.0, 0));
        entry.0 += row.total_value;
        entry.1 += 1;
    }

    let averages: Vec<(i32, f64)> = by_calendar_month
        .into_iter()
        .map(|(month, (sum, count))| (month, sum / f64::from(count)))
        .collect();

    let peak = averages
        .iter()
        .max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.cmp(&a.0)))?;
    let low = averages
        .iter()
        .min_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.cmp(&a.0)))?;

    let peak_name = month_name(u32::try_from(peak.0).unwrap_or_default());
    let low_name = month_name(u32::try_from(low.0).unwrap_or_default());
    Some(format!(
        "Seasonal pattern: strongest in {peak_name}, weakest in {low_name}"
    ))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::{date, monthly_row, overall_row};

    #[test]
    fn test_trend_insufficient_data() {
        let trend = compute_trend(&[]);
        assert_eq!(trend.classification, TrendClass::InsufficientData);
        assert_eq!(trend.value_change_pct, 0.0);
        assert_eq!(trend.quantity_change_pct, 0.0);
        assert_eq!(trend.receipt_change_pct, 0.0);

        let one_row = vec![monthly_row(2025, 3, 1000.0, 50.0, 4)];
        let trend = compute_trend(&one_row);
        assert_eq!(trend.classification, TrendClass::InsufficientData);
    }

    #[test]
    fn test_trend_growing() {
        // +10% value month over month
        let rows = vec![
            monthly_row(2025, 4, 1100.0, 50.0, 4),
            monthly_row(2025, 3, 1000.0, 50.0, 4),
        ];
        let trend = compute_trend(&rows);
        assert_eq!(trend.classification, TrendClass::Growing);
        assert_eq!(trend.value_change_pct, 10.0);
    }

    #[test]
    fn test_trend_declining() {
        let rows = vec![
            monthly_row(2025, 4, 800.0, 50.0, 4),
            monthly_row(2025, 3, 1000.0, 50.0, 4),
        ];
        let trend = compute_trend(&rows);
        assert_eq!(trend.classification, TrendClass::Declining);
        assert_eq!(trend.value_change_pct, -20.0);
    }

    #[test]
    fn test_trend_stable_at_threshold() {
        // Exactly +5% is stable, not growing
        let rows = vec![
            monthly_row(2025, 4, 1050.0, 50.0, 4),
            monthly_row(2025, 3, 1000.0, 50.0, 4),
        ];
        let trend = compute_trend(&rows);
        assert_eq!(trend.classification, TrendClass::Stable);
    }

    #[test]
    fn test_pct_change_zero_base() {
        assert_eq!(pct_change(500.0, 0.0), 100.0);
        assert_eq!(pct_change(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_consistency_score_requires_three_rows() {
        assert_eq!(consistency_score(&[]), 0);
        assert_eq!(consistency_score(&[100.0]), 0);
        assert_eq!(consistency_score(&[100.0, 100.0]), 0);
    }

    #[test]
    fn test_consistency_score_uniform_values() {
        // No variation at all scores a perfect 100
        assert_eq!(consistency_score(&[500.0, 500.0, 500.0]), 100);
    }

    #[test]
    fn test_consistency_score_bounds() {
        // Wildly varying values floor at 0, never negative
        let score = consistency_score(&[1.0, 10_000.0, 2.0, 9_000.0]);
        assert!(score <= 100);

        let steady = consistency_score(&[480.0, 500.0, 520.0]);
        assert!(steady > 90 && steady <= 100);
    }

    #[test]
    fn test_insights_empty_without_data() {
        let insights = generate_insights(&[], None, date(2025, 6, 15));
        assert!(insights.is_empty());
    }

    #[test]
    fn test_insights_order_and_content() {
        let rows = vec![
            monthly_row(2025, 4, 1100.0, 55.0, 4),
            monthly_row(2025, 3, 900.0, 45.0, 3),
        ];
        let overall = overall_row(date(2025, 1, 1), date(2025, 6, 15));
        let insights = generate_insights(&rows, Some(&overall), date(2025, 6, 15));

        assert!(insights[0].starts_with("Peak month: 2025-04"));
        assert!(insights[1].starts_with("Monthly averages:"));
        assert!(insights[2].contains("days ago"));
        assert_eq!(insights[3], "Trader is active today");
        assert_eq!(insights[4], "Consistency score: 0/100");
        // Fewer than 12 rows: no seasonal insight
        assert_eq!(insights.len(), 5);
    }

    #[test]
    fn test_activity_classification_buckets() {
        let overall = overall_row(date(2025, 1, 1), date(2025, 6, 10));
        let insights = generate_insights(
            &[monthly_row(2025, 6, 100.0, 5.0, 1)],
            Some(&overall),
            date(2025, 6, 15),
        );
        assert!(insights.contains(&"Trader was active within the last 7 days".to_string()));

        let stale = overall_row(date(2024, 1, 1), date(2024, 6, 1));
        let insights = generate_insights(
            &[monthly_row(2024, 6, 100.0, 5.0, 1)],
            Some(&stale),
            date(2025, 6, 15),
        );
        assert!(insights.iter().any(|i| i.starts_with("Trader is inactive")));
    }

    #[test]
    fn test_seasonal_pattern_needs_twelve_rows() {
        let rows: Vec<_> = (1..=11)
            .map(|m| monthly_row(2025, m, 100.0, 5.0, 1))
            .collect();
        let insights = generate_insights(&rows, None, date(2025, 12, 1));
        assert!(!insights.iter().any(|i| i.starts_with("Seasonal pattern")));
    }

    #[test]
    fn test_seasonal_pattern_averages_across_years() {
        // Two years of data; March is consistently strongest, August weakest
        let mut rows = Vec::new();
        for year in [2024, 2025] {
            for month in 1..=12 {
                let value = match month {
                    3 => 900.0,
                    8 => 50.0,
                    _ => 400.0,
                };
                rows.push(monthly_row(year, month, value, 10.0, 2));
            }
        }
        let insights = generate_insights(&rows, None, date(2025, 12, 31));
        let seasonal = insights
            .iter()
            .find(|i| i.starts_with("Seasonal pattern"))
            .unwrap();
        assert_eq!(
            seasonal,
            "Seasonal pattern: strongest in March, weakest in August"
        );
    }
}
