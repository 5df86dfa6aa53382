pub mod error;
pub use error::{ApiError, ApiErrorKind};

pub mod traits;
pub use traits::Validator;

pub mod fs;

#[cfg(feature = "client")]
pub mod client;
