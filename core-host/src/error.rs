use bridge_traits::{BridgeError, EntityKey};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    #[error("{key} is not ready: its browse has not completed")]
    EntityNotReady { key: EntityKey },

    #[error("An operation is already in progress for {key}")]
    OperationAlreadyInProgress { key: EntityKey },

    #[error("Completion for {key} arrived with no operation in progress")]
    UnexpectedCompletion { key: EntityKey },

    #[error("{key} is not pinned")]
    NotPinned { key: EntityKey },

    #[error("Index {index} out of bounds (length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Search parameters cannot change once the search has been executed")]
    ParametersFrozen,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Creation failed: {0}")]
    CreationFailed(String),

    #[error("Not movable: {0}")]
    NotMovable(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("Host has shut down")]
    HostShutdown,

    #[error("Native error: {0}")]
    Native(BridgeError),
}

impl HostError {
    /// Errors caused by calling the bridge in the wrong order rather than by
    /// the native library.
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            HostError::NotPinned { .. }
                | HostError::UnexpectedCompletion { .. }
                | HostError::OperationAlreadyInProgress { .. }
                | HostError::ParametersFrozen
        )
    }

    /// Validates `index` against a collection of length `len`.
    pub fn check_index(index: usize, len: usize) -> Result<()> {
        if index < len {
            Ok(())
        } else {
            Err(HostError::IndexOutOfRange { index, len })
        }
    }
}

impl From<BridgeError> for HostError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::PermissionDenied(msg) => HostError::PermissionDenied(msg),
            BridgeError::CreationFailed(msg) => HostError::CreationFailed(msg),
            BridgeError::NotMovable(msg) => HostError::NotMovable(msg),
            other => HostError::Native(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, HostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_refusals_keep_their_kind() {
        let err: HostError = BridgeError::PermissionDenied("not owner".into()).into();
        assert_eq!(err, HostError::PermissionDenied("not owner".into()));

        let err: HostError = BridgeError::CreationFailed("quota".into()).into();
        assert_eq!(err, HostError::CreationFailed("quota".into()));

        let err: HostError = BridgeError::NotMovable("folder end".into()).into();
        assert_eq!(err, HostError::NotMovable("folder end".into()));

        let err: HostError = BridgeError::NoAudioSink.into();
        assert_eq!(err, HostError::Native(BridgeError::NoAudioSink));
    }

    #[test]
    fn test_check_index() {
        assert!(HostError::check_index(0, 1).is_ok());
        assert_eq!(
            HostError::check_index(3, 3),
            Err(HostError::IndexOutOfRange { index: 3, len: 3 })
        );
    }

    #[test]
    fn test_programming_errors() {
        assert!(HostError::NotPinned { key: EntityKey::album(1) }.is_programming_error());
        assert!(!HostError::HostShutdown.is_programming_error());
    }
}
