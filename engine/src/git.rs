//! Mock git operations against tracked repositories.
//!
//! Nothing here touches the network or the filesystem. Operations only move
//! a [`Repository`] between sync states, which is enough to drive the
//! browser's status display.

use crate::repository::{RepoStatus, Repository};
use crate::user::{Permission, Role};
use crate::{EntityStore, RecordId, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Size reported for every successfully fetched repository.
pub const MOCK_FETCH_SIZE: u64 = 1024 * 1024;

/// Failure of a mock git operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GitError {
    #[error("network error reaching {0}")]
    NetworkError(String),

    #[error("remote not found: {0}")]
    NotFound(String),

    #[error("role {role} may not {operation}")]
    PermissionDenied {
        role: Role,
        operation: GitOperation,
    },

    #[error("repository must be synced before push (status: {0})")]
    NotSynced(String),
}

/// Something that can be run against a repository.
pub trait Executable {
    /// Apply the operation, updating the repository's sync state.
    fn execute(&self, repo: &mut Repository, now: Timestamp) -> Result<(), GitError>;
}

/// The supported git operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GitOperation {
    Clone,
    Pull,
    Push,
}

impl GitOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            GitOperation::Clone => "clone",
            GitOperation::Pull => "pull",
            GitOperation::Push => "push",
        }
    }

    /// Permission a caller needs to run this operation.
    pub fn required_permission(&self) -> Permission {
        match self {
            GitOperation::Clone | GitOperation::Pull => Permission::Read,
            GitOperation::Push => Permission::Write,
        }
    }

    /// Check a role against [`GitOperation::required_permission`].
    pub fn authorize(&self, role: Role) -> Result<(), GitError> {
        if role.allows(self.required_permission()) {
            Ok(())
        } else {
            Err(GitError::PermissionDenied {
                role,
                operation: *self,
            })
        }
    }

    fn fetch(repo: &mut Repository, now: Timestamp) -> Result<(), GitError> {
        if repo.url.contains("unreachable") {
            repo.status = RepoStatus::Error("network error".to_string());
            return Err(GitError::NetworkError(repo.url.clone()));
        }
        if repo.url.contains("invalid") {
            repo.status = RepoStatus::Error("invalid url".to_string());
            return Err(GitError::NotFound(repo.url.clone()));
        }

        repo.status = RepoStatus::Synced;
        repo.size_bytes = MOCK_FETCH_SIZE;
        repo.last_synced_at = Some(now);
        Ok(())
    }
}

impl fmt::Display for GitOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Executable for GitOperation {
    fn execute(&self, repo: &mut Repository, now: Timestamp) -> Result<(), GitError> {
        match self {
            GitOperation::Clone | GitOperation::Pull => Self::fetch(repo, now),
            GitOperation::Push => match &repo.status {
                RepoStatus::Synced => {
                    repo.last_synced_at = Some(now);
                    Ok(())
                }
                other => Err(GitError::NotSynced(other.as_str().to_string())),
            },
        }
    }
}

/// Run an operation against a stored repository.
///
/// Returns `None` if no repository has this identity. The attempt counts as
/// a write even when the operation fails, since a failed fetch still records
/// the error status.
pub fn run(
    store: &EntityStore<Repository>,
    id: RecordId,
    operation: &dyn Executable,
) -> Option<Result<(), GitError>> {
    let now = store.clock().now();
    let result = store.update_with(id, |repo| operation.execute(repo, now));

    if let Some(Err(err)) = &result {
        tracing::warn!(id, error = %err, "git operation failed");
    }
    result
}
