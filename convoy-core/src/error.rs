//! Errors shared between the poller and its capability implementations

use thiserror::Error;

use crate::domain::operation::OperationId;

/// The status source cannot resolve the operation identifier
///
/// A missing operation will never start existing, so this is fatal and
/// never retried: it signals a caller mistake (wrong identifier, wrong
/// filter) rather than a transient remote condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("operation {operation_id} is unknown to the status source: {message}")]
pub struct SourceUnavailable {
    pub operation_id: OperationId,
    pub message: String,
}

impl SourceUnavailable {
    /// Creates an error for the given operation
    pub fn new(operation_id: impl Into<OperationId>, message: impl Into<String>) -> Self {
        Self {
            operation_id: operation_id.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_unavailable_display() {
        let err = SourceUnavailable::new("task-9", "no task matches the filter");
        assert_eq!(
            err.to_string(),
            "operation task-9 is unknown to the status source: no task matches the filter"
        );
    }
}
