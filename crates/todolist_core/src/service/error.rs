//! Error type shared by the list and editor view-models.

use crate::repo::task_repo::RepoError;
use crate::service::events::EventQueueFull;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure of a view-model operation that writes and then notifies the UI.
#[derive(Debug)]
pub enum ServiceError {
    /// Persistence-layer failure.
    Repo(RepoError),
    /// The screen's event queue had no room; the store was not written.
    EventQueueFull(EventQueueFull),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::EventQueueFull(err) => write!(f, "{err}; nothing was saved"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::EventQueueFull(err) => Some(err),
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<EventQueueFull> for ServiceError {
    fn from(value: EventQueueFull) -> Self {
        Self::EventQueueFull(value)
    }
}
