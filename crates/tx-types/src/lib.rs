//! Signed call envelope: calls, transactions, call results and the error contract modules use
//! to report failures.

mod call_result;
mod errors;
mod module_error;
mod transaction;

pub use call_result::CallResult;
pub use errors::{MalformedReason, TxError};
pub use module_error::{split_method, CoreError, ModuleError, CORE_MODULE_NAME};
pub use transaction::{
    AuthInfo, Call, Fee, SignerInfo, Transaction, LATEST_TRANSACTION_VERSION,
};
