//! Core types for download-sync

use serde::{Deserialize, Serialize};

/// Unique identifier for a download
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DownloadId(pub i64);

impl DownloadId {
    /// Create a new DownloadId
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner i64 value
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for DownloadId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<DownloadId> for i64 {
    fn from(id: DownloadId) -> Self {
        id.0
    }
}

impl PartialEq<i64> for DownloadId {
    fn eq(&self, other: &i64) -> bool {
        self.0 == *other
    }
}

impl PartialEq<DownloadId> for i64 {
    fn eq(&self, other: &DownloadId) -> bool {
        *self == other.0
    }
}

impl std::fmt::Display for DownloadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for DownloadId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

// Implement sqlx Type, Encode, and Decode so ids bind directly in queries
impl sqlx::Type<sqlx::Sqlite> for DownloadId {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <i64 as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for DownloadId {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        sqlx::Encode::<sqlx::Sqlite>::encode_by_ref(&self.0, buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for DownloadId {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let id = <i64 as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        Ok(Self(id))
    }
}

/// Download status
///
/// The middleware only distinguishes terminal from non-terminal statuses;
/// the full lifecycle is owned by the reducer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Accepted but not yet started
    Initiated,
    /// Currently transferring
    InProgress,
    /// Paused by user
    Paused,
    /// Successfully completed
    Completed,
    /// Cancelled by user
    Cancelled,
    /// Failed with error
    Failed,
}

impl Status {
    /// Convert integer status code to Status enum
    pub fn from_i32(status: i32) -> Self {
        match status {
            0 => Status::Initiated,
            1 => Status::InProgress,
            2 => Status::Paused,
            3 => Status::Completed,
            4 => Status::Cancelled,
            5 => Status::Failed,
            _ => Status::Failed, // Default to Failed for unknown status
        }
    }

    /// Convert Status enum to integer status code
    pub fn to_i32(&self) -> i32 {
        match self {
            Status::Initiated => 0,
            Status::InProgress => 1,
            Status::Paused => 2,
            Status::Completed => 3,
            Status::Cancelled => 4,
            Status::Failed => 5,
        }
    }

    /// Whether this status ends the download's lifecycle
    ///
    /// Terminal downloads are never signaled to the execution service.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Completed | Status::Cancelled)
    }
}

/// The data describing one download
///
/// Records are owned by the dispatcher's in-memory map; the middleware and
/// the persistent store only ever see clones.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRecord {
    /// Unique download identifier
    pub id: DownloadId,

    /// Display file name
    pub file_name: String,

    /// Current status
    pub status: Status,
}

impl DownloadRecord {
    /// Create a new record
    pub fn new(id: impl Into<DownloadId>, file_name: impl Into<String>, status: Status) -> Self {
        Self {
            id: id.into(),
            file_name: file_name.into(),
            status,
        }
    }
}

/// Event emitted by the reducer after it applies an action
///
/// Consumers subscribe via [`crate::Dispatcher::subscribe`]; events are
/// dropped silently when nobody is listening.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A download entered the in-memory map
    Added {
        /// Download ID
        id: DownloadId,
        /// Display file name
        file_name: String,
        /// Whether the record was reintroduced from durable storage
        restored: bool,
    },

    /// A download left the in-memory map
    Removed {
        /// Download ID
        id: DownloadId,
    },

    /// A download's record was replaced
    Updated {
        /// Download ID
        id: DownloadId,
        /// Status after the update
        status: Status,
    },

    /// A durable-state catch-up pass was requested
    RestoreRequested,

    /// The dispatch loop is stopping
    Shutdown,
}
