//! Web-authored prescriptions:
//! - `GET /recetas`: list, newest first
//! - `POST /recetas`: create from a composed draft
//! - `POST /recetas/reintentar`: retry delivery of every unsent record
//! - `POST /recetas/{id}/reenviar-correo`: resend the notification e-mail
//! - `GET .../{id}/pdf`: generated document, see `DocumentSource`

use crate::api::{ApiClient, ApiError};
use crate::models::{JobReport, NewPrescription, Prescription, PrescriptionReceipt};

/// Where a generated document is fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentSource {
    /// Web-authored record: `/recetas/{id}/pdf`.
    Web,
    /// Synced catalog, admin route: `/local-admin/recetas-locales/{id}/pdf`.
    LocalAdmin,
    /// Synced catalog, public route: `/local/recetas/{id}/pdf`.
    LocalCatalog,
}

impl DocumentSource {
    pub(crate) fn segments<'a>(&self, id: &'a str) -> Vec<&'a str> {
        match self {
            DocumentSource::Web => vec!["recetas", id, "pdf"],
            DocumentSource::LocalAdmin => vec!["local-admin", "recetas-locales", id, "pdf"],
            DocumentSource::LocalCatalog => vec!["local", "recetas", id, "pdf"],
        }
    }
}

impl ApiClient {
    pub async fn list_prescriptions(&self) -> Result<Vec<Prescription>, ApiError> {
        self.get_json(&["recetas"]).await
    }

    pub async fn create_prescription(
        &self,
        payload: &NewPrescription,
    ) -> Result<PrescriptionReceipt, ApiError> {
        self.post_json(&["recetas"], payload).await
    }

    /// Batch retry of pending deliveries. The report has no per-record detail
    /// the client relies on.
    pub async fn retry_pending_deliveries(&self) -> Result<JobReport, ApiError> {
        self.post_empty(&["recetas", "reintentar"]).await
    }

    pub async fn resend_notification(&self, id_receta: &str) -> Result<serde_json::Value, ApiError> {
        self.post_empty(&["recetas", id_receta, "reenviar-correo"]).await
    }

    /// Raw bytes of a generated document.
    pub async fn fetch_document(
        &self,
        source: DocumentSource,
        id_receta: &str,
    ) -> Result<Vec<u8>, ApiError> {
        self.get_bytes(&source.segments(id_receta)).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::session::SessionStore;
    use crate::testing::MockBackend;

    fn client_for(backend: &MockBackend) -> ApiClient {
        ApiClient::new(&backend.base_url(), Arc::new(SessionStore::in_memory())).unwrap()
    }

    #[test]
    fn document_paths() {
        assert_eq!(DocumentSource::Web.segments("R1"), ["recetas", "R1", "pdf"]);
        assert_eq!(
            DocumentSource::LocalAdmin.segments("R1"),
            ["local-admin", "recetas-locales", "R1", "pdf"]
        );
        assert_eq!(DocumentSource::LocalCatalog.segments("R1"), ["local", "recetas", "R1", "pdf"]);
    }

    #[tokio::test]
    async fn fetches_documents_from_each_source() {
        let backend = MockBackend::start().await;
        backend.on_raw("GET", "/recetas/R1/pdf", 200, "application/pdf", b"web".to_vec());
        backend.on_raw(
            "GET",
            "/local-admin/recetas-locales/R1/pdf",
            200,
            "application/pdf",
            b"admin".to_vec(),
        );
        backend.on_raw("GET", "/local/recetas/R1/pdf", 200, "application/pdf", b"local".to_vec());
        let client = client_for(&backend);

        assert_eq!(client.fetch_document(DocumentSource::Web, "R1").await.unwrap(), b"web");
        assert_eq!(
            client.fetch_document(DocumentSource::LocalAdmin, "R1").await.unwrap(),
            b"admin"
        );
        assert_eq!(
            client.fetch_document(DocumentSource::LocalCatalog, "R1").await.unwrap(),
            b"local"
        );
    }

    #[tokio::test]
    async fn missing_document_is_404_with_detail() {
        let backend = MockBackend::start().await;
        backend.on_json(
            "GET",
            "/recetas/R2/pdf",
            404,
            json!({"detail": "PDF no encontrado para esta receta"}),
        );
        let client = client_for(&backend);
        let err = client.fetch_document(DocumentSource::Web, "R2").await.unwrap_err();
        assert_eq!(err.detail(), Some("PDF no encontrado para esta receta"));
    }

    #[tokio::test]
    async fn retry_and_resend_paths() {
        let backend = MockBackend::start().await;
        backend.on_json("POST", "/recetas/reintentar", 200, json!({"status": "ok", "result": {}}));
        backend.on_json(
            "POST",
            "/recetas/R9/reenviar-correo",
            200,
            json!({"status": "success", "message": "Correo reenviado exitosamente"}),
        );
        let client = client_for(&backend);

        client.retry_pending_deliveries().await.unwrap();
        let reply = client.resend_notification("R9").await.unwrap();
        assert_eq!(reply["status"], "success");
    }
}
