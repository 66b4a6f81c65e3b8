//! Patients and doctors share one resource shape:
//! `GET /<collection>`, `GET /<collection>/{id}`, `POST /<collection>`,
//! `POST /<collection>/export-xsd`, `POST /<collection>/import-xsd`.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::{ApiClient, ApiError};
use crate::models::{Doctor, JobReport, Patient};

/// A backend collection of simple, caller-identified records.
pub trait EntityResource {
    /// Path segment of the collection (`pacientes`, `medicos`).
    const COLLECTION: &'static str;
    /// Singular label used in user-facing messages.
    const LABEL: &'static str;
    /// Plural label used in job messages.
    const PLURAL: &'static str;

    type Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static;
}

pub struct Patients;

impl EntityResource for Patients {
    const COLLECTION: &'static str = "pacientes";
    const LABEL: &'static str = "Paciente";
    const PLURAL: &'static str = "pacientes";
    type Record = Patient;
}

pub struct Doctors;

impl EntityResource for Doctors {
    const COLLECTION: &'static str = "medicos";
    const LABEL: &'static str = "Médico";
    const PLURAL: &'static str = "médicos";
    type Record = Doctor;
}

impl ApiClient {
    /// Full collection; no pagination, no filtering.
    pub async fn list_entities<R: EntityResource>(&self) -> Result<Vec<R::Record>, ApiError> {
        self.get_json(&[R::COLLECTION]).await
    }

    pub async fn get_entity<R: EntityResource>(&self, id: &str) -> Result<R::Record, ApiError> {
        self.get_json(&[R::COLLECTION, id]).await
    }

    /// Create a record. The backend acknowledges with `{msg, id}`; callers
    /// re-fetch the list rather than trusting the acknowledgement.
    pub async fn create_entity<R: EntityResource>(
        &self,
        record: &R::Record,
    ) -> Result<serde_json::Value, ApiError> {
        self.post_json(&[R::COLLECTION], record).await
    }

    /// Bulk export to the shared storage (one-shot job).
    pub async fn export_entities<R: EntityResource>(&self) -> Result<JobReport, ApiError> {
        self.post_empty(&[R::COLLECTION, "export-xsd"]).await
    }

    /// Bulk import from the local drop folder (one-shot job).
    pub async fn import_entities<R: EntityResource>(&self) -> Result<JobReport, ApiError> {
        self.post_empty(&[R::COLLECTION, "import-xsd"]).await
    }

    pub async fn list_patients(&self) -> Result<Vec<Patient>, ApiError> {
        self.list_entities::<Patients>().await
    }

    pub async fn list_doctors(&self) -> Result<Vec<Doctor>, ApiError> {
        self.list_entities::<Doctors>().await
    }
}
