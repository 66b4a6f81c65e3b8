//! Row actions and pure row-state transitions for the prescription viewers.

use crate::models::{LocalPrescription, Prescription};

/// What the user can do with one list row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowAction {
    ShowDetail,
    OpenDocument,
    ResendNotification,
    RetryDelivery,
    Delete,
}

impl RowAction {
    pub fn label(&self) -> &'static str {
        match self {
            RowAction::ShowDetail => "Ver",
            RowAction::OpenDocument => "Ver PDF",
            RowAction::ResendNotification => "Reenviar correo",
            RowAction::RetryDelivery => "Reintentar subir a Drive",
            RowAction::Delete => "Eliminar",
        }
    }
}

/// Web rows: document when one exists, then resend if delivered or retry if not.
pub fn prescription_actions(row: &Prescription) -> Vec<RowAction> {
    let mut actions = Vec::with_capacity(2);
    if row.has_document() {
        actions.push(RowAction::OpenDocument);
    }
    if row.sent {
        actions.push(RowAction::ResendNotification);
    } else {
        actions.push(RowAction::RetryDelivery);
    }
    actions
}

/// Catalog rows: detail, document when one exists, delete.
pub fn local_actions(row: &LocalPrescription) -> Vec<RowAction> {
    let mut actions = vec![RowAction::ShowDetail];
    if row.has_document() {
        actions.push(RowAction::OpenDocument);
    }
    actions.push(RowAction::Delete);
    actions
}

/// Rows identified by `id_receta`.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for Prescription {
    fn key(&self) -> &str {
        &self.id_receta
    }
}

impl Keyed for LocalPrescription {
    fn key(&self) -> &str {
        &self.id_receta
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowChange<T> {
    /// Fresh list from the server.
    Loaded(Vec<T>),
    Removed(String),
    Selected(String),
    Deselected,
}

/// Rows plus the key of the row whose detail is open.
///
/// The selection always names a row present in `rows`, or nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct RowState<T> {
    rows: Vec<T>,
    selected: Option<String>,
}

impl<T> Default for RowState<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            selected: None,
        }
    }
}

impl<T: Keyed> RowState<T> {
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn find(&self, key: &str) -> Option<&T> {
        self.rows.iter().find(|r| r.key() == key)
    }

    pub fn selected(&self) -> Option<&T> {
        self.selected.as_deref().and_then(|key| self.find(key))
    }

    pub fn apply(mut self, change: RowChange<T>) -> Self {
        match change {
            RowChange::Loaded(rows) => {
                self.rows = rows;
            }
            RowChange::Removed(key) => {
                self.rows.retain(|r| r.key() != key);
            }
            RowChange::Selected(key) => {
                self.selected = Some(key);
            }
            RowChange::Deselected => {
                self.selected = None;
            }
        }
        if let Some(key) = self.selected.as_deref() {
            if !self.rows.iter().any(|r| r.key() == key) {
                self.selected = None;
            }
        }
        self
    }
}
