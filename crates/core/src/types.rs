/// Account identifiers are opaque strings assigned by the billing system.
pub type AccountId = String;

/// Generation records and credit reservations are keyed by UUIDv4.
pub type RecordId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Credit amounts. Signed so that audit deltas can express refunds.
pub type Credits = i64;
