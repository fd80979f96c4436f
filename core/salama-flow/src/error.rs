//! Error types for the purchase flow.

use salama_api::ApiError;
use salama_store::StoreError;
use salama_types::ValidationError;
use thiserror::Error;

/// Result type for flow operations.
pub type FlowResult<T> = Result<T, FlowError>;

/// Errors surfaced by the purchase flow.
///
/// None of these are fatal to the flow as a whole: validation and rejection
/// errors leave the state machine where it was so the user can correct the
/// input and retry.
#[derive(Debug, Error)]
pub enum FlowError {
    /// User input failed local validation; nothing was sent to the server.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The server call failed or was refused.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The local store could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A resend was requested before the cooldown elapsed.
    #[error("please wait {remaining_secs}s before requesting another code")]
    ResendCooldown { remaining_secs: u64 },

    /// The requested operation is not valid in the current flow state.
    #[error("cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state: &'static str,
    },
}
