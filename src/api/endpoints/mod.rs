//! Typed backend calls, one module per resource.
//!
//! - `auth`: token endpoint
//! - `entities`: patients and doctors (list, detail, create, export/import jobs)
//! - `prescriptions`: web-authored prescriptions and their documents
//! - `local_admin`: the locally-synced catalog, stats and forced sync

pub mod auth;
pub mod entities;
pub mod local_admin;
pub mod prescriptions;

pub use entities::{Doctors, EntityResource, Patients};
pub use prescriptions::DocumentSource;
