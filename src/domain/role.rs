use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DomainError, LoadStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Supplier,
    Transporter,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Supplier => "supplier",
            Role::Transporter => "transporter",
            Role::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value {
            "supplier" => Ok(Role::Supplier),
            "transporter" => Ok(Role::Transporter),
            "admin" => Ok(Role::Admin),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated principal a request runs as.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub profile_id: Uuid,
    pub role: Role,
    pub company_id: Option<Uuid>,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Every gated transition in the system. Actions carry the owning company of
/// their target where ownership matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // Document workflow
    UploadDocument { owner_company: Uuid },
    ReviewDocument,
    RemoveDocument { owner_company: Uuid },
    ReadDocument { owner_company: Uuid },
    // Fleet registry
    ManageFleet { owner_company: Uuid },
    // Company verification
    UpdateCompany { company: Uuid },
    SetCompanyVerified,
    ReadCompanyVerified,
    // Load lifecycle
    CreateLoad { company: Option<Uuid> },
    EditLoad { owner_company: Option<Uuid> },
    DeleteLoad { owner_company: Option<Uuid> },
    TransitionLoad,
    ReadLoad {
        owner_company: Option<Uuid>,
        status: LoadStatus,
    },
}

/// A refusal from the gate. Denials are expected outcomes surfaced to the
/// caller as a message, never a fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial {
    pub reason: &'static str,
}

impl Denial {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason)
    }
}

/// Pure decision function. Rules evaluate in order:
/// 1. admins may do everything the gate covers;
/// 2. non-admins are confined to their own company, with two public reads
///    (marketplace loads from approval until a terminal state, a company's
///    is_verified flag);
/// 3. admin-reserved status actions are denied to non-admins regardless of
///    ownership;
/// 4. everything else is allowed.
pub fn authorize(actor: &Actor, action: Action) -> Result<(), Denial> {
    if actor.is_admin() {
        return Ok(());
    }

    match action {
        Action::ReviewDocument => Err(Denial::new("only an admin may review documents")),
        Action::SetCompanyVerified => {
            Err(Denial::new("only an admin may change verification status"))
        }
        Action::TransitionLoad => Err(Denial::new("only an admin may change load status")),
        Action::ReadCompanyVerified => Ok(()),
        Action::ReadLoad {
            owner_company,
            status,
        } => {
            if owns(actor, owner_company) {
                Ok(())
            } else if actor.role == Role::Transporter
                && matches!(status, LoadStatus::Approved | LoadStatus::InTransit)
            {
                // once a load enters the marketplace it stays readable to
                // transporters until it reaches a terminal state
                Ok(())
            } else {
                Err(Denial::new("load belongs to another company"))
            }
        }
        Action::UploadDocument { owner_company }
        | Action::RemoveDocument { owner_company }
        | Action::ReadDocument { owner_company }
        | Action::ManageFleet { owner_company } => {
            if owns(actor, Some(owner_company)) {
                Ok(())
            } else {
                Err(Denial::new("entity belongs to another company"))
            }
        }
        Action::UpdateCompany { company } => {
            if owns(actor, Some(company)) {
                Ok(())
            } else {
                Err(Denial::new("company can only be updated by its members"))
            }
        }
        Action::CreateLoad { company } => {
            if owns(actor, company) {
                Ok(())
            } else {
                Err(Denial::new("loads can only be posted for your own company"))
            }
        }
        Action::EditLoad { owner_company } | Action::DeleteLoad { owner_company } => {
            if owns(actor, owner_company) {
                Ok(())
            } else {
                Err(Denial::new("load belongs to another company"))
            }
        }
    }
}

fn owns(actor: &Actor, company: Option<Uuid>) -> bool {
    match (actor.company_id, company) {
        (Some(mine), Some(theirs)) => mine == theirs,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: Role, company_id: Option<Uuid>) -> Actor {
        Actor {
            profile_id: Uuid::new_v4(),
            role,
            company_id,
        }
    }

    #[test]
    fn admin_passes_every_action() {
        let admin = actor(Role::Admin, None);
        let other = Uuid::new_v4();
        for action in [
            Action::ReviewDocument,
            Action::SetCompanyVerified,
            Action::TransitionLoad,
            Action::ManageFleet {
                owner_company: other,
            },
            Action::EditLoad {
                owner_company: Some(other),
            },
        ] {
            assert!(authorize(&admin, action).is_ok());
        }
    }

    #[test]
    fn status_actions_are_admin_only_even_for_owners() {
        let company = Uuid::new_v4();
        let supplier = actor(Role::Supplier, Some(company));
        let transporter = actor(Role::Transporter, Some(company));

        assert!(authorize(&supplier, Action::TransitionLoad).is_err());
        assert!(authorize(&transporter, Action::ReviewDocument).is_err());
        assert!(authorize(&supplier, Action::SetCompanyVerified).is_err());
    }

    #[test]
    fn cross_company_access_is_denied() {
        let mine = Uuid::new_v4();
        let theirs = Uuid::new_v4();
        let transporter = actor(Role::Transporter, Some(mine));

        assert!(authorize(
            &transporter,
            Action::ManageFleet {
                owner_company: theirs
            }
        )
        .is_err());
        assert!(authorize(
            &transporter,
            Action::UploadDocument {
                owner_company: theirs
            }
        )
        .is_err());
        assert!(authorize(
            &transporter,
            Action::ManageFleet {
                owner_company: mine
            }
        )
        .is_ok());
    }

    #[test]
    fn marketplace_loads_are_readable_by_any_transporter() {
        let transporter = actor(Role::Transporter, Some(Uuid::new_v4()));
        let other_company = Some(Uuid::new_v4());
        let read = |status| Action::ReadLoad {
            owner_company: other_company,
            status,
        };

        // readable while live on the marketplace, including in transit
        assert!(authorize(&transporter, read(LoadStatus::Approved)).is_ok());
        assert!(authorize(&transporter, read(LoadStatus::InTransit)).is_ok());
        // never before approval or after a terminal state
        assert!(authorize(&transporter, read(LoadStatus::Pending)).is_err());
        assert!(authorize(&transporter, read(LoadStatus::Rejected)).is_err());
        assert!(authorize(&transporter, read(LoadStatus::Completed)).is_err());
        assert!(authorize(&transporter, read(LoadStatus::Cancelled)).is_err());

        // suppliers get no marketplace read at all
        let supplier = actor(Role::Supplier, Some(Uuid::new_v4()));
        assert!(authorize(&supplier, read(LoadStatus::Approved)).is_err());
    }

    #[test]
    fn verification_flag_is_publicly_readable() {
        let transporter = actor(Role::Transporter, None);
        assert!(authorize(&transporter, Action::ReadCompanyVerified).is_ok());
    }

    #[test]
    fn company_bound_actions_require_a_company() {
        let unbound = actor(Role::Supplier, None);
        assert!(authorize(
            &unbound,
            Action::CreateLoad {
                company: Some(Uuid::new_v4())
            }
        )
        .is_err());
    }
}
