use thiserror::Error;

use crate::model::EntityKey;

/// Errors reported by the native client library.
///
/// Refusals (`PermissionDenied`, `CreationFailed`, `NotPlayable`, `NotMovable`)
/// are distinct variants so the host can surface them as their own kinds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("Unknown native entity: {0}")]
    UnknownEntity(EntityKey),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Creation failed: {0}")]
    CreationFailed(String),

    #[error("Track not playable: {0}")]
    NotPlayable(EntityKey),

    #[error("Not movable: {0}")]
    NotMovable(String),

    #[error("Invalid link: {0}")]
    InvalidLink(String),

    #[error("No audio sink registered")]
    NoAudioSink,
}

impl BridgeError {
    /// Returns `true` when the native library understood the request but
    /// declined to carry it out.
    pub fn is_refusal(&self) -> bool {
        matches!(
            self,
            BridgeError::PermissionDenied(_)
                | BridgeError::CreationFailed(_)
                | BridgeError::NotPlayable(_)
                | BridgeError::NotMovable(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refusal_classification() {
        assert!(BridgeError::PermissionDenied("owner only".into()).is_refusal());
        assert!(BridgeError::NotPlayable(EntityKey::track(3)).is_refusal());
        assert!(!BridgeError::NoAudioSink.is_refusal());
        assert!(!BridgeError::OperationFailed("timeout".into()).is_refusal());
    }

    #[test]
    fn test_error_messages_name_the_entity() {
        let err = BridgeError::UnknownEntity(EntityKey::album(12));
        assert_eq!(err.to_string(), "Unknown native entity: album:12");
    }
}
