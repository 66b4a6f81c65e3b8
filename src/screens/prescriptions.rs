//! Viewer for web-authored prescriptions (`/recetas`).

use std::path::PathBuf;

use crate::api::{ApiClient, DocumentSource};
use crate::documents;
use crate::models::Prescription;

use super::rows::{prescription_actions, RowAction};
use super::{Notice, ScreenError};

pub struct PrescriptionsScreen {
    client: ApiClient,
    download_dir: PathBuf,
    rows: Vec<Prescription>,
}

impl PrescriptionsScreen {
    pub fn new(client: ApiClient, download_dir: PathBuf) -> Self {
        Self {
            client,
            download_dir,
            rows: Vec::new(),
        }
    }

    pub fn rows(&self) -> &[Prescription] {
        &self.rows
    }

    pub fn actions_for(&self, id_receta: &str) -> Vec<RowAction> {
        self.rows
            .iter()
            .find(|r| r.id_receta == id_receta)
            .map(prescription_actions)
            .unwrap_or_default()
    }

    /// Fetch the list. A failure is logged and the previous rows are kept.
    pub async fn load(&mut self) {
        match self.client.list_prescriptions().await {
            Ok(rows) => {
                tracing::debug!(count = rows.len(), "Prescriptions loaded");
                self.rows = rows;
            }
            Err(e) => tracing::warn!(error = %e, "Could not load prescriptions"),
        }
    }

    /// Download the row's document into the download directory.
    pub async fn open_document(&self, id_receta: &str) -> Result<PathBuf, ScreenError> {
        self.ensure_offered(id_receta, RowAction::OpenDocument)?;
        let bytes = self
            .client
            .fetch_document(DocumentSource::Web, id_receta)
            .await
            .map_err(|e| ScreenError::api("Error al abrir el PDF", e))?;
        Ok(documents::save_document(&self.download_dir, id_receta, &bytes)?)
    }

    /// Retry delivery of every unsent prescription. Only completion is
    /// reported; the job result is not interpreted.
    pub async fn retry_delivery(&mut self) -> Result<Notice, ScreenError> {
        let report = self
            .client
            .retry_pending_deliveries()
            .await
            .map_err(|e| ScreenError::api("Error al reintentar", e))?;
        tracing::info!(status = ?report.status, "Delivery retry finished");
        self.load().await;
        Ok(Notice::new("Reintento completado. Revisa los resultados."))
    }

    pub async fn resend_notification(&self, id_receta: &str) -> Result<Notice, ScreenError> {
        self.ensure_offered(id_receta, RowAction::ResendNotification)?;
        self.client
            .resend_notification(id_receta)
            .await
            .map_err(|e| ScreenError::api("Error al reenviar", e))?;
        Ok(Notice::new("Correo reenviado exitosamente"))
    }

    /// Rows already loaded must offer `action`; unknown ids go to the backend
    /// as-is and let it answer.
    fn ensure_offered(&self, id_receta: &str, action: RowAction) -> Result<(), ScreenError> {
        match self.rows.iter().find(|r| r.id_receta == id_receta) {
            Some(row) if !prescription_actions(row).contains(&action) => Err(
                ScreenError::validation(format!("\"{}\" no disponible para la receta {id_receta}", action.label())),
            ),
            _ => Ok(()),
        }
    }
}
