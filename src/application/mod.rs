//! Application layer: hierarchy store, import/export adapter and validation
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod error;
pub mod error_ext;
pub mod record;
pub mod services;
pub mod validation;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use record::MemberRecord;
pub use validation::{FieldErrors, MemberInput};
