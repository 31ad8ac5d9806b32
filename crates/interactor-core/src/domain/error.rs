//! Error taxonomy for on-chain reads.

use serde::Serialize;

use crate::domain::role::RoleId;

/// Errors surfaced by role and permission queries.
///
/// Kept `Clone` so the last failure can sit inside observable query state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryError {
    #[error("role query failed for role {role}: {reason}")]
    RoleQueryFailed { role: RoleId, reason: String },

    #[error("contract read `{function}` failed: {reason}")]
    ReadFailed { function: String, reason: String },
}

impl QueryError {
    pub fn role_query(role: RoleId, reason: impl std::fmt::Display) -> Self {
        QueryError::RoleQueryFailed {
            role,
            reason: reason.to_string(),
        }
    }

    pub fn read(function: &str, reason: impl std::fmt::Display) -> Self {
        QueryError::ReadFailed {
            function: function.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for query operations.
pub type QueryResult<T> = std::result::Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_query_failed_display_names_role_and_reason() {
        let err = QueryError::role_query(RoleId(2), "connection refused");
        let msg = err.to_string();
        assert!(msg.contains("role query failed"));
        assert!(msg.contains('2'));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_read_failed_display() {
        let err = QueryError::read("paused", "execution reverted");
        assert_eq!(
            err.to_string(),
            "contract read `paused` failed: execution reverted"
        );
    }
}
