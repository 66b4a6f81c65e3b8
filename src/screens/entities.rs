//! List + create screen shared by patients and doctors.
//!
//! The list is always re-fetched after a mutation; records are never inserted
//! locally. Bulk export/import job results are shown verbatim.

use std::fmt;

use crate::api::{ApiClient, EntityResource};
use crate::models::JobReport;

use super::{Notice, ScreenError};

/// An entity collection with a creation form.
pub trait EntityKind: EntityResource {
    type Form: Clone + Default + PartialEq + fmt::Debug;

    /// Shown when a required field is blank.
    const REQUIRED_MESSAGE: &'static str;
    /// Shown after a successful creation.
    const CREATED_MESSAGE: &'static str;

    /// All required fields are non-blank.
    fn is_complete(form: &Self::Form) -> bool;

    fn to_record(form: &Self::Form) -> Self::Record;

    /// One-line rendering of a list row.
    fn describe(record: &Self::Record) -> String;
}

pub struct EntityScreen<K: EntityKind> {
    client: ApiClient,
    rows: Vec<K::Record>,
    form: K::Form,
}

impl<K: EntityKind> EntityScreen<K> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            rows: Vec::new(),
            form: K::Form::default(),
        }
    }

    pub fn rows(&self) -> &[K::Record] {
        &self.rows
    }

    pub fn form(&self) -> &K::Form {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut K::Form {
        &mut self.form
    }

    /// Replace the list with the server's full collection.
    pub async fn load(&mut self) -> Result<(), ScreenError> {
        let rows = self
            .client
            .list_entities::<K>()
            .await
            .map_err(|e| ScreenError::api("Error", e))?;
        tracing::debug!(collection = K::COLLECTION, count = rows.len(), "Entity list loaded");
        self.rows = rows;
        Ok(())
    }

    /// Fetch a single record by id.
    pub async fn fetch(&self, id: &str) -> Result<K::Record, ScreenError> {
        self.client
            .get_entity::<K>(id)
            .await
            .map_err(|e| ScreenError::api("Error", e))
    }

    /// Submit the form. On success the form is cleared and the list
    /// re-fetched; on any failure the form keeps what was typed.
    pub async fn create(&mut self) -> Result<Notice, ScreenError> {
        if !K::is_complete(&self.form) {
            return Err(ScreenError::validation(K::REQUIRED_MESSAGE));
        }

        let record = K::to_record(&self.form);
        self.client
            .create_entity::<K>(&record)
            .await
            .map_err(|e| ScreenError::api("Error", e))?;

        tracing::info!(collection = K::COLLECTION, "Record created");
        self.form = K::Form::default();
        self.refresh_quietly().await;
        Ok(Notice::new(K::CREATED_MESSAGE))
    }

    /// Trigger the export job.
    pub async fn export(&self) -> Result<Notice, ScreenError> {
        let report = self
            .client
            .export_entities::<K>()
            .await
            .map_err(|e| ScreenError::api(&format!("Error exportando {}", K::PLURAL), e))?;
        Ok(job_notice("Exportación completada:", &report))
    }

    /// Trigger the import job, then re-fetch the list.
    pub async fn import(&mut self) -> Result<Notice, ScreenError> {
        let report = self
            .client
            .import_entities::<K>()
            .await
            .map_err(|e| ScreenError::api(&format!("Error importando {}", K::PLURAL), e))?;
        self.refresh_quietly().await;
        Ok(job_notice("Importación completada:", &report))
    }

    /// Re-fetch after a mutation. The mutation already succeeded, so a failed
    /// refresh only leaves the list stale.
    async fn refresh_quietly(&mut self) {
        if let Err(e) = self.load().await {
            tracing::warn!(collection = K::COLLECTION, error = %e, "List refresh failed");
        }
    }
}

fn job_notice(heading: &str, report: &JobReport) -> Notice {
    Notice::with_json(heading, &report.result)
}
