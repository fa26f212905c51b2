//! Trait definitions for the photo library remote boundary.
//!
//! Uploaders and the identity cache talk to the service only through
//! [`PhotoService`]. The HTTP implementation lives in `photoferry_client`;
//! tests substitute their own.

mod listing;
mod traits;
mod types;

pub use listing::LibraryListing;
pub use traits::{Credential, PhotoService, StaticCredential};
pub use types::{MediaPage, ServiceCall, UploadSession};
