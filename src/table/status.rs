//! Row-lifecycle status columns.
//!
//! SMIv1 tables manage rows through an `EntryStatus` column, SMIv2 tables
//! through a `RowStatus` column. On the wire both are plain INTEGERs.

use std::fmt;

/// SMI version of a table definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SmiVersion {
    /// SMIv1, `EntryStatus` column.
    V1,
    /// SMIv2, `RowStatus` column.
    #[default]
    V2,
}

impl SmiVersion {
    /// Status value that asks the agent to create a row in one step.
    pub fn create_value(self) -> i64 {
        match self {
            SmiVersion::V1 => EntryStatus::CreateRequest as i64,
            SmiVersion::V2 => RowStatus::CreateAndGo as i64,
        }
    }

    /// Status value that asks the agent to remove a row.
    pub fn destroy_value(self) -> i64 {
        match self {
            SmiVersion::V1 => EntryStatus::Invalid as i64,
            SmiVersion::V2 => RowStatus::Destroy as i64,
        }
    }

    /// Label for a status column value under this SMI version.
    pub fn status_label(self, value: i64) -> &'static str {
        let (labels, fallback) = match self {
            SmiVersion::V1 => (ENTRY_STATUS_LABELS, "EntryStatus: error-code"),
            SmiVersion::V2 => (ROW_STATUS_LABELS, "RowStatus: error-code"),
        };
        labels
            .iter()
            .find(|(v, _)| *v == value)
            .map_or(fallback, |&(_, label)| label)
    }
}

impl fmt::Display for SmiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SmiVersion::V1 => write!(f, "SMIv1"),
            SmiVersion::V2 => write!(f, "SMIv2"),
        }
    }
}

/// SMIv1 `EntryStatus` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i64)]
pub enum EntryStatus {
    Valid = 1,
    CreateRequest = 2,
    UnderCreation = 3,
    Invalid = 4,
}

impl EntryStatus {
    /// Create from the column value.
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(Self::Valid),
            2 => Some(Self::CreateRequest),
            3 => Some(Self::UnderCreation),
            4 => Some(Self::Invalid),
            _ => None,
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        SmiVersion::V1.status_label(self as i64)
    }
}

/// SMIv2 `RowStatus` values (RFC 2579).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i64)]
pub enum RowStatus {
    Active = 1,
    NotInService = 2,
    NotReady = 3,
    CreateAndGo = 4,
    CreateAndWait = 5,
    Destroy = 6,
}

impl RowStatus {
    /// Create from the column value.
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(Self::Active),
            2 => Some(Self::NotInService),
            3 => Some(Self::NotReady),
            4 => Some(Self::CreateAndGo),
            5 => Some(Self::CreateAndWait),
            6 => Some(Self::Destroy),
            _ => None,
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        SmiVersion::V2.status_label(self as i64)
    }
}

const ENTRY_STATUS_LABELS: &[(i64, &str)] = &[
    (1, "EntryStatus: valid"),
    (2, "EntryStatus: createRequest"),
    (3, "EntryStatus: underCreation"),
    (4, "EntryStatus: invalid"),
];

const ROW_STATUS_LABELS: &[(i64, &str)] = &[
    (1, "RowStatus: active"),
    (2, "RowStatus: notInService"),
    (3, "RowStatus: notReady"),
    (4, "RowStatus: createAndGo"),
    (5, "RowStatus: createAndWait"),
    (6, "RowStatus: destroy"),
];
