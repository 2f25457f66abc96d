//! Convenient re-exports of the most commonly used protocol types.
//!
//! ```rust
//! use corella_json_rpc::prelude::*;
//! ```

pub use crate::envelope::{Envelope, Payload, RequestParams};
pub use crate::error::{ErrorCode, ErrorObject, ErrorResponse};
pub use crate::response::{Response, ResponseMessage};
pub use crate::types::{RequestId, Version};

pub use crate::error_codes::*;
