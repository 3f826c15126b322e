use crate::transport::TransportFailure;
use crate::uri::MalformedUri;
use thiserror::Error;

pub const UNAUTHORIZED: u16 = 401;

/// The only failures an action ever reports.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ActionError {
    /// The access token was rejected. Re-authenticate before trying again.
    #[error("Unauthorized: {status} ({detail})")]
    AuthExpired { status: u16, detail: String },

    /// Anything else. `status` is absent when the server never answered.
    #[error(
        "Request failed{}: {detail}",
        .status.map(|s| format!(" with status {}", s)).unwrap_or_default()
    )]
    RequestFailed { status: Option<u16>, detail: String },
}

impl ActionError {
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, ActionError::AuthExpired { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ActionError::AuthExpired { status, .. } => Some(*status),
            ActionError::RequestFailed { status, .. } => *status,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            ActionError::AuthExpired { detail, .. } | ActionError::RequestFailed { detail, .. } => {
                detail
            }
        }
    }
}

impl From<MalformedUri> for ActionError {
    fn from(err: MalformedUri) -> Self {
        ActionError::RequestFailed {
            status: None,
            detail: err.to_string(),
        }
    }
}

/// Maps a transport failure onto the caller-facing taxonomy.
pub fn classify(failure: TransportFailure) -> ActionError {
    match failure {
        TransportFailure::Http {
            status: status @ UNAUTHORIZED,
            error,
        } => ActionError::AuthExpired {
            status,
            detail: error,
        },
        TransportFailure::Http { status, error } => ActionError::RequestFailed {
            status: Some(status),
            detail: error,
        },
        TransportFailure::Unknown { diagnostic } => ActionError::RequestFailed {
            status: None,
            detail: format!("unknown failure: {}", diagnostic),
        },
    }
}
