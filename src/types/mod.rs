//! Response wrappers shared by the handlers.

mod response;

pub use response::{ApiResponse, Created};
