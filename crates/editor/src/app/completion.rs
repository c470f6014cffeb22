//! Results of background tasks, applied on the owning thread by `poll`

use shared::{FloorPlan, Project};

use crate::persistence::{PersistError, ProjectListing};
use crate::session::{AuthError, Session};
use crate::sync::SyncError;

pub(crate) enum Completion {
    SessionRestored(Result<Option<Session>, AuthError>),
    SignIn {
        address: String,
        result: Result<(), AuthError>,
    },
    Confirmed(Result<(), AuthError>),
    SignedOut(Result<(), AuthError>),
    Inferred {
        epoch: u64,
        seq: u64,
        result: Result<FloorPlan, SyncError>,
    },
    Instructed {
        epoch: u64,
        seq: u64,
        result: Result<Option<FloorPlan>, SyncError>,
    },
    Listed {
        epoch: u64,
        seq: u64,
        listing: ProjectListing,
    },
    Saved {
        epoch: u64,
        result: Result<Project, PersistError>,
    },
}

impl Completion {
    /// Admission epoch the task was started under, for editor-scoped results
    pub(crate) fn epoch(&self) -> Option<u64> {
        match self {
            Completion::Inferred { epoch, .. }
            | Completion::Instructed { epoch, .. }
            | Completion::Listed { epoch, .. }
            | Completion::Saved { epoch, .. } => Some(*epoch),
            _ => None,
        }
    }
}
