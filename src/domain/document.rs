use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Pending,
    Approved,
    Rejected,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Pending => "pending",
            DocumentStatus::Approved => "approved",
            DocumentStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value {
            "pending" => Ok(DocumentStatus::Pending),
            "approved" => Ok(DocumentStatus::Approved),
            "rejected" => Ok(DocumentStatus::Rejected),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An admin review outcome. Rejections must carry a reason; approvals clear
/// any previous one. Re-review in either direction simply overwrites state.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

impl ReviewDecision {
    pub fn apply(&self, reason: Option<&str>) -> Result<(DocumentStatus, Option<String>), DomainError> {
        match self {
            ReviewDecision::Approved => Ok((DocumentStatus::Approved, None)),
            ReviewDecision::Rejected => {
                let reason = reason.map(str::trim).filter(|r| !r.is_empty());
                match reason {
                    Some(reason) => Ok((DocumentStatus::Rejected, Some(reason.to_string()))),
                    None => Err(DomainError::MissingReason),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentKind {
    Company,
    Driver,
    Truck,
    Trailer,
}

impl ParentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParentKind::Company => "company",
            ParentKind::Driver => "driver",
            ParentKind::Truck => "truck",
            ParentKind::Trailer => "trailer",
        }
    }
}

/// The single entity a document hangs off. Constructed through `from_ids`,
/// which enforces the exactly-one-parent invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentRef {
    Company(Uuid),
    Driver(Uuid),
    Truck(Uuid),
    Trailer(Uuid),
}

impl ParentRef {
    pub fn from_ids(
        company_id: Option<Uuid>,
        driver_id: Option<Uuid>,
        truck_id: Option<Uuid>,
        trailer_id: Option<Uuid>,
    ) -> Result<Self, DomainError> {
        let mut found: Option<ParentRef> = None;
        let candidates = [
            company_id.map(ParentRef::Company),
            driver_id.map(ParentRef::Driver),
            truck_id.map(ParentRef::Truck),
            trailer_id.map(ParentRef::Trailer),
        ];
        for candidate in candidates.into_iter().flatten() {
            if found.is_some() {
                return Err(DomainError::MultipleParents);
            }
            found = Some(candidate);
        }
        found.ok_or(DomainError::NoParent)
    }

    pub fn kind(&self) -> ParentKind {
        match self {
            ParentRef::Company(_) => ParentKind::Company,
            ParentRef::Driver(_) => ParentKind::Driver,
            ParentRef::Truck(_) => ParentKind::Truck,
            ParentRef::Trailer(_) => ParentKind::Trailer,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            ParentRef::Company(id)
            | ParentRef::Driver(id)
            | ParentRef::Truck(id)
            | ParentRef::Trailer(id) => *id,
        }
    }
}

/// Upload categories, scoped by parent type. A category that is legal for a
/// truck is not accepted on a company document and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    // Company
    Registration,
    Cipc,
    TaxDocument,
    // Driver
    IdDocument,
    DriversLicense,
    Passport,
    // Truck
    TruckRegistration,
    // Trailer
    TrailerRegistration,
    // Truck + trailer
    RoadworthyCertificate,
    Insurance,
}

impl DocumentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentCategory::Registration => "registration",
            DocumentCategory::Cipc => "cipc",
            DocumentCategory::TaxDocument => "tax_document",
            DocumentCategory::IdDocument => "id_document",
            DocumentCategory::DriversLicense => "drivers_license",
            DocumentCategory::Passport => "passport",
            DocumentCategory::TruckRegistration => "truck_registration",
            DocumentCategory::TrailerRegistration => "trailer_registration",
            DocumentCategory::RoadworthyCertificate => "roadworthy_certificate",
            DocumentCategory::Insurance => "insurance",
        }
    }

    pub fn allowed_for(parent: ParentKind) -> &'static [DocumentCategory] {
        match parent {
            ParentKind::Company => &[
                DocumentCategory::Registration,
                DocumentCategory::Cipc,
                DocumentCategory::TaxDocument,
            ],
            ParentKind::Driver => &[
                DocumentCategory::IdDocument,
                DocumentCategory::DriversLicense,
                DocumentCategory::Passport,
            ],
            ParentKind::Truck => &[
                DocumentCategory::TruckRegistration,
                DocumentCategory::RoadworthyCertificate,
                DocumentCategory::Insurance,
            ],
            ParentKind::Trailer => &[
                DocumentCategory::TrailerRegistration,
                DocumentCategory::RoadworthyCertificate,
                DocumentCategory::Insurance,
            ],
        }
    }

    pub fn parse_for(value: &str, parent: ParentKind) -> Result<Self, DomainError> {
        Self::allowed_for(parent)
            .iter()
            .find(|category| category.as_str() == value)
            .copied()
            .ok_or_else(|| DomainError::InvalidCategory {
                category: value.to_string(),
                parent: parent.as_str(),
            })
    }
}
