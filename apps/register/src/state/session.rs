//! # Session State
//!
//! Who is at the register, and the data source they work against.

use std::sync::Arc;

use mesa_core::{Permission, Role};
use mesa_data::DataSource;

use crate::error::ApiError;

/// The signed-in role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    role: Role,
}

impl SessionState {
    pub fn new(role: Role) -> Self {
        SessionState { role }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Fails with `Forbidden` unless the role has `permission`.
    pub fn require(&self, permission: Permission) -> Result<(), ApiError> {
        if self.role.can(permission) {
            Ok(())
        } else {
            tracing::warn!(role = %self.role, %permission, "Permission denied");
            Err(ApiError::forbidden(self.role, permission))
        }
    }
}

/// Wrapper around the session's data source.
///
/// The source is chosen once at startup and never swapped.
#[derive(Clone)]
pub struct SourceState {
    source: Arc<dyn DataSource>,
}

impl SourceState {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        SourceState { source }
    }

    pub fn inner(&self) -> &dyn DataSource {
        self.source.as_ref()
    }
}

impl std::fmt::Debug for SourceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceState")
            .field("source", &self.source.name())
            .finish()
    }
}
