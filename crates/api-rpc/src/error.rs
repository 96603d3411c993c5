//! RPC Error Types
//!
//! Maps application errors to JSON-RPC error codes.

use jsonrpsee::types::ErrorObjectOwned;
use kvmd_core::error::AppError;

/// RPC Error Codes
pub mod code {
    pub const CONFLICT: i32 = 4002;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const SYSTEM_ERROR: i32 = 5002;
}

/// Convert AppError to JSON-RPC ErrorObject
///
/// AlreadyInProgress is a non-fatal 4xxx code; everything else is 5xxx.
pub fn to_rpc_error(err: AppError) -> ErrorObjectOwned {
    let code = match &err {
        AppError::AlreadyInProgress => code::CONFLICT,
        AppError::Liveness(_) | AppError::Launch(_) | AppError::Filesystem { .. } => {
            code::SYSTEM_ERROR
        }
        AppError::Domain(_) | AppError::Config(_) => code::INTERNAL_ERROR,
    };
    ErrorObjectOwned::owned(code, err.to_string(), None::<()>)
}
