//! CLI command implementations
//!
//! Every command returns a process exit code:
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 1 | Partial success (records were skipped) |
//! | 2 | Configuration error |
//! | 3 | Undecodable input |
//! | 4 | Gateway connection or acknowledgment failure |
//! | 5 | Fatal error |

pub mod detect;
pub mod init;
pub mod parse;
pub mod serve;
pub mod validate;

use crate::domain::PharmaGateError;

/// Exit code for a failed ingestion
pub fn exit_code_for(err: &PharmaGateError) -> i32 {
    match err {
        PharmaGateError::Configuration(_) => 2,
        PharmaGateError::GatewayWriteFailure(_) => 4,
        e if e.is_input_error() => 3,
        _ => 5,
    }
}
