/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Per-key version numbers start at 1 and only ever grow.
pub type VersionNumber = i32;
