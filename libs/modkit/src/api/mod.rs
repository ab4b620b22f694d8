//! HTTP boundary shared by every REST module: the `{success, data|error,
//! message?}` envelope, the error taxonomy and the JSON body extractor.

pub mod envelope;
pub mod error;
pub mod extract;
pub mod response;

pub use envelope::ApiEnvelope;
pub use error::{ApiError, ApiResult};
pub use extract::JsonBody;
