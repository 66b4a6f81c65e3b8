//! Locally-synced catalog under `/local-admin`.

use crate::api::{ApiClient, ApiError};
use crate::models::{LocalPrescription, LocalStats, OriginFilter};

impl ApiClient {
    /// Catalog rows, optionally restricted to one origin (`?filtro_origen=`).
    pub async fn list_local_prescriptions(
        &self,
        filter: OriginFilter,
    ) -> Result<Vec<LocalPrescription>, ApiError> {
        let segments = ["local-admin", "recetas-locales"];
        match filter.query_value() {
            Some(origin) => {
                self.get_json_with_query(&segments, &[("filtro_origen", origin)])
                    .await
            }
            None => self.get_json(&segments).await,
        }
    }

    pub async fn get_local_prescription(&self, id_receta: &str) -> Result<LocalPrescription, ApiError> {
        self.get_json(&["local-admin", "recetas-locales", id_receta]).await
    }

    pub async fn local_stats(&self) -> Result<LocalStats, ApiError> {
        self.get_json(&["local-admin", "stats"]).await
    }

    /// Remove a catalog row and its document. Returns the backend acknowledgement.
    pub async fn delete_local_prescription(
        &self,
        id_receta: &str,
    ) -> Result<serde_json::Value, ApiError> {
        self.delete(&["local-admin", "recetas-locales", id_receta]).await
    }

    /// Run the ingestion job now. The result is shown raw.
    pub async fn force_sync(&self) -> Result<serde_json::Value, ApiError> {
        self.post_empty(&["local-admin", "forzar-sincronizacion"]).await
    }
}
