//! Interpretation of raw HTTP responses.
//!
//! [`interpret`] is applied to every response the transport returns. Error
//! statuses become [`ClientError`](crate::error::ClientError)s, with JSON 4xx
//! bodies normalized by [`ErrorBody`]. Successful responses become an
//! [`ApiResponse`].

mod error_body;
mod interpret;
mod value;

pub use error_body::{flatten_error, ErrorBody, ErrorShape, Reason};
pub use interpret::{interpret, raise_for_status};
pub use value::{ApiResponse, ResponseContent};
