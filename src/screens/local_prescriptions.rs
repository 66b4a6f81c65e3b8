//! Viewer for the locally-synced catalog (`/local-admin`).
//!
//! Holds the rows, the active origin filter, the latest stats and at most one
//! pending post-sync refresh. The refresh runs as a spawned task on a cloned
//! client and is merged by `settle_pending`.

use std::path::PathBuf;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::api::{ApiClient, ApiError, DocumentSource};
use crate::config::ClientConfig;
use crate::documents;
use crate::models::{LocalPrescription, LocalStats, OriginFilter};

use super::rows::{local_actions, RowAction, RowChange, RowState};
use super::{Confirm, Notice, ScreenError};

pub const CONFIRM_SYNC: &str = "¿Forzar sincronización con Drive?";
pub const CONFIRM_DELETE: &str = "¿Confirma eliminar esta receta?";

/// Result of the delayed refresh that follows a forced sync.
struct RefreshOutcome {
    filter: OriginFilter,
    rows: Result<Vec<LocalPrescription>, ApiError>,
    stats: Option<LocalStats>,
}

pub struct LocalPrescriptionsScreen {
    client: ApiClient,
    download_dir: PathBuf,
    refresh_delay: Duration,
    state: RowState<LocalPrescription>,
    stats: LocalStats,
    filter: OriginFilter,
    pending: Option<JoinHandle<RefreshOutcome>>,
}

impl LocalPrescriptionsScreen {
    pub fn new(client: ApiClient, config: &ClientConfig) -> Self {
        Self {
            client,
            download_dir: config.download_dir.clone(),
            refresh_delay: config.sync_refresh_delay,
            state: RowState::default(),
            stats: LocalStats::default(),
            filter: OriginFilter::All,
            pending: None,
        }
    }

    pub fn rows(&self) -> &[LocalPrescription] {
        self.state.rows()
    }

    pub fn stats(&self) -> &LocalStats {
        &self.stats
    }

    pub fn filter(&self) -> OriginFilter {
        self.filter
    }

    pub fn selected(&self) -> Option<&LocalPrescription> {
        self.state.selected()
    }

    pub fn actions_for(&self, id_receta: &str) -> Vec<RowAction> {
        self.state.find(id_receta).map(local_actions).unwrap_or_default()
    }

    pub fn has_pending_refresh(&self) -> bool {
        self.pending.is_some()
    }

    /// Load rows for `filter`, then stats. The filter becomes active only when
    /// the list load succeeds.
    pub async fn load(&mut self, filter: OriginFilter) -> Result<(), ScreenError> {
        let rows = self
            .client
            .list_local_prescriptions(filter)
            .await
            .map_err(|e| ScreenError::api("Error", e))?;
        tracing::debug!(%filter, count = rows.len(), "Local prescriptions loaded");
        self.replace_rows(rows);
        self.filter = filter;
        self.refresh_stats().await;
        Ok(())
    }

    /// Re-run the load with the active filter.
    pub async fn reload(&mut self) -> Result<(), ScreenError> {
        self.load(self.filter).await
    }

    /// Stats failures only leave the previous counters in place.
    pub async fn refresh_stats(&mut self) {
        match self.client.local_stats().await {
            Ok(stats) => self.stats = stats,
            Err(e) => tracing::warn!(error = %e, "Could not load local stats"),
        }
    }

    /// Open the detail of a loaded row.
    pub fn show_detail(&mut self, id_receta: &str) -> Option<&LocalPrescription> {
        self.transition(RowChange::Selected(id_receta.to_string()));
        self.state.selected()
    }

    pub fn close_detail(&mut self) {
        self.transition(RowChange::Deselected);
    }

    /// Fresh copy of one row from the backend.
    pub async fn fetch_detail(&self, id_receta: &str) -> Result<LocalPrescription, ScreenError> {
        self.client
            .get_local_prescription(id_receta)
            .await
            .map_err(|e| ScreenError::api("Error", e))
    }

    /// Download the row's document through the admin route.
    pub async fn download(&self, id_receta: &str) -> Result<PathBuf, ScreenError> {
        let bytes = self
            .client
            .fetch_document(DocumentSource::LocalAdmin, id_receta)
            .await
            .map_err(|e| ScreenError::api("Error descargando PDF", e))?;
        Ok(documents::save_document(&self.download_dir, id_receta, &bytes)?)
    }

    /// Delete after confirmation, then re-fetch with the active filter.
    /// `Ok(None)` when the user declines.
    pub async fn delete(
        &mut self,
        id_receta: &str,
        confirm: &mut impl Confirm,
    ) -> Result<Option<Notice>, ScreenError> {
        if !confirm.confirm(CONFIRM_DELETE) {
            return Ok(None);
        }

        self.client
            .delete_local_prescription(id_receta)
            .await
            .map_err(|e| ScreenError::api("Error", e))?;
        tracing::info!(%id_receta, "Local prescription deleted");

        self.transition(RowChange::Removed(id_receta.to_string()));
        if let Err(e) = self.reload().await {
            tracing::warn!(error = %e, "Reload after delete failed");
        }
        Ok(Some(Notice::new("Receta eliminada")))
    }

    /// Run the sync job after confirmation and schedule one delayed refresh
    /// using the filter active now. `Ok(None)` when the user declines.
    pub async fn force_sync(&mut self, confirm: &mut impl Confirm) -> Result<Option<Notice>, ScreenError> {
        if !confirm.confirm(CONFIRM_SYNC) {
            return Ok(None);
        }

        let result = self
            .client
            .force_sync()
            .await
            .map_err(|e| ScreenError::api("Error sincronizando", e))?;
        tracing::info!("Forced sync finished");

        self.schedule_refresh();
        Ok(Some(Notice::with_json("Sincronización completada:", &result)))
    }

    /// Wait for the pending refresh, if any, and merge it. Returns whether a
    /// refresh was merged.
    pub async fn settle_pending(&mut self) -> bool {
        let Some(handle) = self.pending.take() else {
            return false;
        };

        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, "Delayed refresh task did not complete");
                return false;
            }
        };

        match outcome.rows {
            Ok(rows) => {
                self.replace_rows(rows);
                self.filter = outcome.filter;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Delayed refresh failed");
                return false;
            }
        }
        if let Some(stats) = outcome.stats {
            self.stats = stats;
        }
        true
    }

    fn schedule_refresh(&mut self) {
        if let Some(previous) = self.pending.take() {
            previous.abort();
        }

        let client = self.client.clone();
        let filter = self.filter;
        let delay = self.refresh_delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let rows = client.list_local_prescriptions(filter).await;
            let stats = match client.local_stats().await {
                Ok(stats) => Some(stats),
                Err(e) => {
                    tracing::warn!(error = %e, "Could not load local stats");
                    None
                }
            };
            RefreshOutcome { filter, rows, stats }
        }));
    }

    fn replace_rows(&mut self, rows: Vec<LocalPrescription>) {
        self.transition(RowChange::Loaded(rows));
    }

    fn transition(&mut self, change: RowChange<LocalPrescription>) {
        let state = std::mem::take(&mut self.state);
        self.state = state.apply(change);
    }
}

impl Drop for LocalPrescriptionsScreen {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::session::SessionStore;
    use crate::testing::MockBackend;

    const LIST: &str = "/local-admin/recetas-locales";

    fn screen_for(backend: &MockBackend, dir: &std::path::Path, delay: Duration) -> LocalPrescriptionsScreen {
        let client = ApiClient::new(&backend.base_url(), Arc::new(SessionStore::in_memory())).unwrap();
        let mut config = ClientConfig::from_lookup(|_| None).with_api_base(&backend.base_url());
        config.download_dir = dir.to_path_buf();
        config.sync_refresh_delay = delay;
        LocalPrescriptionsScreen::new(client, &config)
    }

    fn stock_backend(backend: &MockBackend) {
        backend.on_json(
            "GET",
            LIST,
            200,
            json!([
                {"id_receta": "A", "origen": "drive", "pdf_path": "/p/A.pdf"},
                {"id_receta": "B", "origen": "drive", "pdf_path": null}
            ]),
        );
        backend.on_json(
            "GET",
            "/local-admin/stats",
            200,
            json!({"total": 2, "por_origen": {"drive": 2}, "con_pdf": 1, "sin_pdf": 1}),
        );
    }

    fn list_queries(backend: &MockBackend) -> Vec<Option<String>> {
        backend
            .requests_to("GET", LIST)
            .into_iter()
            .map(|r| r.query)
            .collect()
    }

    #[tokio::test]
    async fn load_fetches_stats_after_list() {
        let backend = MockBackend::start().await;
        stock_backend(&backend);
        let tmp = tempfile::tempdir().unwrap();
        let mut screen = screen_for(&backend, tmp.path(), Duration::from_millis(10));

        screen.load(OriginFilter::Drive).await.unwrap();
        assert_eq!(screen.rows().len(), 2);
        assert_eq!(screen.filter(), OriginFilter::Drive);
        assert_eq!(screen.stats().with_document, 1);

        let paths: Vec<String> = backend.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(paths, [LIST, "/local-admin/stats"]);
    }

    #[tokio::test]
    async fn stats_failure_is_silent() {
        let backend = MockBackend::start().await;
        backend.on_json("GET", LIST, 200, json!([]));
        backend.on_json("GET", "/local-admin/stats", 500, json!({"detail": "boom"}));
        let tmp = tempfile::tempdir().unwrap();
        let mut screen = screen_for(&backend, tmp.path(), Duration::from_millis(10));

        screen.load(OriginFilter::All).await.unwrap();
        assert_eq!(screen.stats(), &LocalStats::default());
    }

    #[tokio::test]
    async fn failed_filtered_load_keeps_previous_filter() {
        let backend = MockBackend::start().await;
        stock_backend(&backend);
        let tmp = tempfile::tempdir().unwrap();
        let mut screen = screen_for(&backend, tmp.path(), Duration::from_millis(10));
        screen.load(OriginFilter::Drive).await.unwrap();

        backend.on_json("GET", LIST, 503, json!({"detail": "Catálogo no disponible"}));
        let err = screen.load(OriginFilter::Local).await.unwrap_err();
        assert_eq!(err.to_string(), "Error: Catálogo no disponible");
        assert_eq!(screen.filter(), OriginFilter::Drive);
        assert_eq!(screen.rows().len(), 2);
    }

    #[tokio::test]
    async fn declined_delete_sends_nothing() {
        let backend = MockBackend::start().await;
        stock_backend(&backend);
        let tmp = tempfile::tempdir().unwrap();
        let mut screen = screen_for(&backend, tmp.path(), Duration::from_millis(10));
        screen.load(OriginFilter::All).await.unwrap();
        let before = backend.request_count();

        let mut asked = Vec::new();
        let mut decline = |q: &str| {
            asked.push(q.to_string());
            false
        };
        let outcome = screen.delete("A", &mut decline).await.unwrap();
        assert!(outcome.is_none());
        assert_eq!(backend.request_count(), before);
        assert_eq!(asked, [CONFIRM_DELETE]);
    }

    #[tokio::test]
    async fn delete_refetches_with_active_filter() {
        let backend = MockBackend::start().await;
        stock_backend(&backend);
        backend.on_json("DELETE", "/local-admin/recetas-locales/A", 200, json!({"msg": "ok", "id_receta": "A"}));
        let tmp = tempfile::tempdir().unwrap();
        let mut screen = screen_for(&backend, tmp.path(), Duration::from_millis(10));
        screen.load(OriginFilter::Drive).await.unwrap();

        let notice = screen.delete("A", &mut |_: &str| true).await.unwrap().unwrap();
        assert_eq!(notice.text, "Receta eliminada");
        assert_eq!(
            list_queries(&backend),
            [Some("filtro_origen=drive".to_string()), Some("filtro_origen=drive".to_string())]
        );
    }

    #[tokio::test]
    async fn force_sync_schedules_exactly_one_delayed_refresh_with_filter() {
        let backend = MockBackend::start().await;
        stock_backend(&backend);
        backend.on_json(
            "POST",
            "/local-admin/forzar-sincronizacion",
            200,
            json!({"msg": "Sincronización completada", "nuevos_descargados": 0, "timestamp": "2025-06-01T10:00:00"}),
        );
        let tmp = tempfile::tempdir().unwrap();
        let mut screen = screen_for(&backend, tmp.path(), Duration::from_millis(300));
        screen.load(OriginFilter::Drive).await.unwrap();
        assert_eq!(list_queries(&backend).len(), 1);

        let mut asked = Vec::new();
        let mut accept = |q: &str| {
            asked.push(q.to_string());
            true
        };
        let notice = screen.force_sync(&mut accept).await.unwrap().unwrap();
        assert_eq!(asked, [CONFIRM_SYNC]);
        assert!(notice.text.starts_with("Sincronización completada:\n"));
        assert!(notice.text.contains("nuevos_descargados"));

        assert_eq!(backend.requests_to("POST", "/local-admin/forzar-sincronizacion").len(), 1);
        // Nothing re-fetched before the delay elapses
        assert_eq!(list_queries(&backend).len(), 1);
        assert!(screen.has_pending_refresh());

        assert!(screen.settle_pending().await);
        let queries = list_queries(&backend);
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[1].as_deref(), Some("filtro_origen=drive"));
        assert!(!screen.settle_pending().await);
        assert_eq!(list_queries(&backend).len(), 2);
    }

    #[tokio::test]
    async fn declined_sync_schedules_nothing() {
        let backend = MockBackend::start().await;
        let tmp = tempfile::tempdir().unwrap();
        let mut screen = screen_for(&backend, tmp.path(), Duration::from_millis(10));

        let outcome = screen.force_sync(&mut |_: &str| false).await.unwrap();
        assert!(outcome.is_none());
        assert!(!screen.has_pending_refresh());
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn detail_selection_and_download() {
        let backend = MockBackend::start().await;
        stock_backend(&backend);
        backend.on_raw("GET", "/local-admin/recetas-locales/A/pdf", 200, "application/pdf", b"%PDF-A".to_vec());
        let tmp = tempfile::tempdir().unwrap();
        let mut screen = screen_for(&backend, tmp.path(), Duration::from_millis(10));
        screen.load(OriginFilter::All).await.unwrap();

        assert_eq!(screen.show_detail("A").unwrap().id_receta, "A");
        assert!(screen.actions_for("A").contains(&RowAction::OpenDocument));
        assert!(!screen.actions_for("B").contains(&RowAction::OpenDocument));
        screen.close_detail();
        assert!(screen.selected().is_none());

        let path = screen.download("A").await.unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"%PDF-A");
    }
}
