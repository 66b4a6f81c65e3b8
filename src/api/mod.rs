//! Backend access layer.
//!
//! `ApiClient` owns transport concerns (base URL, bearer credential, error
//! observation). Each module under `endpoints` adds the typed calls for one
//! backend resource as an `impl ApiClient` block.

pub mod client;
pub mod endpoints;
pub mod error;

pub use client::ApiClient;
pub use endpoints::{DocumentSource, Doctors, EntityResource, Patients};
pub use error::{ApiError, GENERIC_ERROR};
