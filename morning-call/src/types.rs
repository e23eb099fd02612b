//! Closed status enumerations shared by the entities.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::reason::NgReason;

/// Disposition of a directed friend request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipStatus {
    Pending,
    Approved,
    Rejected,
    Blocked,
}

impl RelationshipStatus {
    pub const ALL: [RelationshipStatus; 4] = [
        RelationshipStatus::Pending,
        RelationshipStatus::Approved,
        RelationshipStatus::Rejected,
        RelationshipStatus::Blocked,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipStatus::Pending => "pending",
            RelationshipStatus::Approved => "approved",
            RelationshipStatus::Rejected => "rejected",
            RelationshipStatus::Blocked => "blocked",
        }
    }

    /// Transition table. Self-transitions are never legal.
    pub fn can_transition_to(&self, next: RelationshipStatus) -> bool {
        use RelationshipStatus::*;
        matches!(
            (self, next),
            (Pending, Approved)
                | (Pending, Rejected)
                | (Pending, Blocked)
                | (Rejected, Pending)
                | (Rejected, Blocked)
                | (Blocked, Pending)
                | (Approved, Blocked)
        )
    }
}

impl fmt::Display for RelationshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipStatus {
    type Err = NgReason;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RelationshipStatus::Pending),
            "approved" => Ok(RelationshipStatus::Approved),
            "rejected" => Ok(RelationshipStatus::Rejected),
            "blocked" => Ok(RelationshipStatus::Blocked),
            _ => Err(NgReason::InvalidRelationshipStatus),
        }
    }
}

/// A relationship as seen from one participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelatedUserStatus {
    Pending,
    Approved,
    Rejected,
    Blocked,
}

impl RelatedUserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelatedUserStatus::Pending => "pending",
            RelatedUserStatus::Approved => "approved",
            RelatedUserStatus::Rejected => "rejected",
            RelatedUserStatus::Blocked => "blocked",
        }
    }
}

impl From<RelationshipStatus> for RelatedUserStatus {
    fn from(status: RelationshipStatus) -> Self {
        match status {
            RelationshipStatus::Pending => RelatedUserStatus::Pending,
            RelationshipStatus::Approved => RelatedUserStatus::Approved,
            RelationshipStatus::Rejected => RelatedUserStatus::Rejected,
            RelationshipStatus::Blocked => RelatedUserStatus::Blocked,
        }
    }
}

impl fmt::Display for RelatedUserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a morning call. `Completed` and `Deleted` are terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MorningCallStatus {
    #[default]
    Scheduled,
    Completed,
    Deleted,
    Failed,
}

impl MorningCallStatus {
    pub const ALL: [MorningCallStatus; 4] = [
        MorningCallStatus::Scheduled,
        MorningCallStatus::Completed,
        MorningCallStatus::Deleted,
        MorningCallStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MorningCallStatus::Scheduled => "scheduled",
            MorningCallStatus::Completed => "completed",
            MorningCallStatus::Deleted => "deleted",
            MorningCallStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, MorningCallStatus::Completed | MorningCallStatus::Deleted)
    }

    /// Reason a call in this status can no longer be changed, if any.
    pub(crate) fn locked_reason(&self) -> Option<NgReason> {
        match self {
            MorningCallStatus::Scheduled => None,
            MorningCallStatus::Completed => Some(NgReason::AlreadyCompleted),
            MorningCallStatus::Deleted => Some(NgReason::AlreadyDeleted),
            MorningCallStatus::Failed => Some(NgReason::InvalidStatus),
        }
    }
}

impl fmt::Display for MorningCallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
