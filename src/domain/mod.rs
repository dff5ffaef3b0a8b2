pub mod document;
pub mod load;
pub mod role;
pub mod trailer;
pub mod verification;

pub use document::{DocumentCategory, DocumentStatus, ParentKind, ParentRef, ReviewDecision};
pub use load::LoadStatus;
pub use role::{authorize, Action, Actor, Denial, Role};
pub use trailer::TrailerType;

use thiserror::Error;
use uuid::Uuid;

/// Rule violations raised by the pure domain layer. Every variant maps to a
/// recoverable API error; none of these abort the process.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("a document must reference exactly one parent; none was supplied")]
    NoParent,
    #[error("a document must reference exactly one parent; more than one was supplied")]
    MultipleParents,
    #[error("category '{category}' is not valid for a {parent} document")]
    InvalidCategory {
        category: String,
        parent: &'static str,
    },
    #[error("a rejection requires a non-empty reason")]
    MissingReason,
    #[error("unknown status '{0}'")]
    UnknownStatus(String),
    #[error("unknown trailer type '{0}'")]
    UnknownTrailerType(String),
    #[error("cannot transition load from {from} to {to}")]
    IllegalTransition { from: LoadStatus, to: LoadStatus },
    #[error("load {load_id} is {status} and can no longer be modified by its creator")]
    LoadLocked { load_id: Uuid, status: LoadStatus },
}
