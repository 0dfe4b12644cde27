//! Core business logic for the ledger service.
//!
//! Framework-agnostic operations over the persistence layer. Everything here
//! takes a database connection (or transaction) and returns structured data;
//! the HTTP layer only maps parameters in and shapes JSON out. Analytics
//! functions take an explicit `as_of` date so window-relative behavior is
//! deterministic under test.

/// Committee-level analytics: 12-month market-fee report, commodity mix,
/// district market-fee share
pub mod committee_analytics;
/// Commodity analytics: top commodities by traded weight
pub mod commodity_analytics;
/// Pure trend and insight helpers over monthly roll-up rows
pub mod insight;
/// Target overview reader for the dashboard
pub mod overview;
/// Calendar-month window helpers shared by the aggregators
pub mod period;
/// Receipt creation, cancellation, and verification
pub mod receipt;
/// Recompute-on-write maintenance of the derived analytics tables
pub mod rollup;
/// Monthly target CRUD
pub mod target;
/// Trader analytics: rankings and detailed trend reports
pub mod trader_analytics;
