//! Result alias for shared error handling.

use crate::errors::ErrorEnvelope;

/// Shared result type used across the workspace.
///
/// Boundary functions (loaders, CLI commands) return this; domain
/// operations keep their own narrow error types and convert at the edge.
pub type Result<T, E = ErrorEnvelope> = std::result::Result<T, E>;
