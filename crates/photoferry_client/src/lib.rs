//! HTTP client for the photo library service.
//!
//! [`HttpPhotoService`] implements
//! [`PhotoService`](photoferry_interface::PhotoService) over reqwest, with
//! request and response bodies handled by `photoferry_protocol`.
//!
//! # Example
//!
//! ```no_run
//! use photoferry_client::{HttpPhotoService, ServiceConfig};
//! use photoferry_interface::{PhotoService, StaticCredential};
//! use photoferry_core::ContentId;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let credential = Arc::new(StaticCredential::new(std::env::var("PHOTOFERRY_TOKEN")?));
//! let service = HttpPhotoService::new(ServiceConfig::default(), credential)?;
//! let id = ContentId::parse("2jmj7l5rSw0yVb/vlWAYkK/YBwk=")?;
//! if let Some(key) = service.find_by_content_id(&id).await? {
//!     println!("already stored as {key}");
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod http;

pub use config::{ServiceConfig, ServiceConfigBuilder};
pub use http::HttpPhotoService;
