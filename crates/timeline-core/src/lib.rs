//! Core domain and application logic for the timeline flow platform.
//!
//! The crate is backend-agnostic: persistence hides behind the repository
//! traits in [`domain::repository`] and document payloads behind the
//! [`timeline_content_store::BlobStorage`] trait. Backend crates plug in
//! concrete implementations; the server crate wires everything together.

#![forbid(unsafe_code)]

pub mod application;
pub mod domain;
pub mod error;
pub mod types;

pub use error::{CoreError, CoreResult};
pub use types::{AuthContext, Position, Size};
