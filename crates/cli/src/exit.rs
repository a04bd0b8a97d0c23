//! Mapping task errors to process exit codes

use deckhand_common::Error as CommonError;
use deckhand_harness::HarnessError;
use deckhand_server::ServerError;

/// Everything ran and passed
pub const SUCCESS: u8 = 0;

/// A task or the test suite failed
pub const FAILURE: u8 = 1;

/// The invocation or configuration is unusable
pub const USAGE: u8 = 2;

/// Exit code for an error that stopped a task
pub fn code_for(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<CommonError>() {
            if is_usage(e) {
                return USAGE;
            }
        }
        if let Some(HarnessError::Discovery(e)) = cause.downcast_ref::<HarnessError>() {
            if is_usage(e) {
                return USAGE;
            }
        }
        if let Some(ServerError::InvalidAddress { .. } | ServerError::RootMissing(_)) =
            cause.downcast_ref::<ServerError>()
        {
            return USAGE;
        }
    }
    FAILURE
}

/// Whether `err` is a failed suite whose verdict was already printed
pub fn is_suite_failure(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<HarnessError>(),
        Some(HarnessError::SuiteFailed { .. })
    )
}

fn is_usage(err: &CommonError) -> bool {
    matches!(
        err,
        CommonError::InvalidConfig(_) | CommonError::ConfigParse(_) | CommonError::Pattern { .. }
    )
}
