use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::DomainError;

/// Load lifecycle. `Rejected` is not terminal: an admin may resurrect a
/// rejected load to pending or straight to approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    Pending,
    Approved,
    Rejected,
    InTransit,
    Completed,
    Cancelled,
}

impl LoadStatus {
    pub const ALL: [LoadStatus; 6] = [
        LoadStatus::Pending,
        LoadStatus::Approved,
        LoadStatus::Rejected,
        LoadStatus::InTransit,
        LoadStatus::Completed,
        LoadStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LoadStatus::Pending => "pending",
            LoadStatus::Approved => "approved",
            LoadStatus::Rejected => "rejected",
            LoadStatus::InTransit => "in_transit",
            LoadStatus::Completed => "completed",
            LoadStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value {
            "pending" => Ok(LoadStatus::Pending),
            "approved" => Ok(LoadStatus::Approved),
            "rejected" => Ok(LoadStatus::Rejected),
            "in_transit" => Ok(LoadStatus::InTransit),
            "completed" => Ok(LoadStatus::Completed),
            "cancelled" => Ok(LoadStatus::Cancelled),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LoadStatus::Completed | LoadStatus::Cancelled)
    }

    /// Explicit transition table. Anything absent here is rejected; free-form
    /// status writes are not possible.
    pub fn can_transition(from: LoadStatus, to: LoadStatus) -> bool {
        use LoadStatus::*;
        match (from, to) {
            (Pending, Approved) | (Pending, Rejected) => true,
            (Rejected, Approved) | (Rejected, Pending) => true,
            (Approved, InTransit) => true,
            (InTransit, Completed) => true,
            (from, Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }

    pub fn transition(self, to: LoadStatus) -> Result<LoadStatus, DomainError> {
        if Self::can_transition(self, to) {
            Ok(to)
        } else {
            Err(DomainError::IllegalTransition { from: self, to })
        }
    }

    /// Creator-side field edits are only allowed before a load enters the
    /// admin-approved pipeline.
    pub fn editable_by_creator(&self) -> bool {
        matches!(self, LoadStatus::Pending | LoadStatus::Rejected)
    }

    pub fn deletable_by_creator(&self) -> bool {
        matches!(self, LoadStatus::Pending)
    }

    pub fn ensure_editable(self, load_id: Uuid) -> Result<(), DomainError> {
        if self.editable_by_creator() {
            Ok(())
        } else {
            Err(DomainError::LoadLocked {
                load_id,
                status: self,
            })
        }
    }

    pub fn ensure_deletable(self, load_id: Uuid) -> Result<(), DomainError> {
        if self.deletable_by_creator() {
            Ok(())
        } else {
            Err(DomainError::LoadLocked {
                load_id,
                status: self,
            })
        }
    }
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored `is_cross_border` is the OR of the explicit flag and a country
/// mismatch, fixed at create/edit time rather than derived on read.
pub fn derive_cross_border(explicit: bool, pickup_country: &str, delivery_country: &str) -> bool {
    explicit || !pickup_country.trim().eq_ignore_ascii_case(delivery_country.trim())
}
