//! Shared primitive types used across the analytics core.

use rust_decimal::Decimal;

/// A monetary amount in the venue's single reporting currency.
pub type Money = Decimal;

/// A dimensionless ratio (retention, churn, attach rate).
pub type Ratio = Decimal;

/// A stable, opaque member identifier.
pub type MemberId = String;
