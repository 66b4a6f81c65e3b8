use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{parse_timestamp, Origin};

/// Row of the locally-synced catalog (`GET /local-admin/recetas-locales`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalPrescription {
    pub id_receta: String,
    #[serde(rename = "paciente_id", default)]
    pub patient_id: Option<String>,
    #[serde(rename = "medico_id", default)]
    pub doctor_id: Option<String>,
    #[serde(rename = "diagnostico", default)]
    pub diagnosis: Option<String>,
    #[serde(rename = "indicaciones", default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub xml_path: Option<String>,
    #[serde(default)]
    pub pdf_path: Option<String>,
    #[serde(default)]
    pub checksum: Option<String>,
    #[serde(rename = "fecha_emision", default)]
    pub issued_at: Option<String>,
    #[serde(rename = "origen", default)]
    pub origin: Option<Origin>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl LocalPrescription {
    pub fn has_document(&self) -> bool {
        self.pdf_path.as_deref().is_some_and(|p| !p.is_empty())
    }

    pub fn issued_at(&self) -> Option<NaiveDateTime> {
        self.issued_at.as_deref().and_then(parse_timestamp)
    }

    /// First 12 characters of the identifier, for compact tables.
    pub fn short_id(&self) -> String {
        let mut chars = self.id_receta.chars();
        let head: String = chars.by_ref().take(12).collect();
        if chars.next().is_some() {
            format!("{head}...")
        } else {
            head
        }
    }
}

/// Aggregate counters from `GET /local-admin/stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalStats {
    #[serde(default)]
    pub total: u64,
    /// Only origins with at least one record are present.
    #[serde(rename = "por_origen", default)]
    pub by_origin: BTreeMap<String, u64>,
    #[serde(rename = "con_pdf", default)]
    pub with_document: u64,
    #[serde(rename = "sin_pdf", default)]
    pub without_document: u64,
}

impl LocalStats {
    pub fn count_for(&self, origin: &Origin) -> u64 {
        self.by_origin.get(origin.as_str()).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_catalog_row() {
        let json = r#"{
            "id_receta": "3f2a9c1e-77aa-4bde-9a0f-0123456789ab",
            "paciente_id": "P1",
            "medico_id": "D1",
            "diagnostico": "Otitis",
            "indicaciones": null,
            "xml_path": "data/inbox/r.xml",
            "pdf_path": null,
            "checksum": "abc",
            "fecha_emision": "2025-01-05T12:00:00",
            "origen": "drive",
            "created_at": "2025-01-05T12:00:03"
        }"#;
        let row: LocalPrescription = serde_json::from_str(json).unwrap();
        assert_eq!(row.origin, Some(Origin::Drive));
        assert!(!row.has_document());
        assert_eq!(row.short_id(), "3f2a9c1e-77a...");
        assert!(row.issued_at().is_some());
    }

    #[test]
    fn short_id_keeps_short_ids_intact() {
        let row: LocalPrescription = serde_json::from_str(r#"{"id_receta":"RX1"}"#).unwrap();
        assert_eq!(row.short_id(), "RX1");
    }

    #[test]
    fn stats_decode_and_count() {
        let json = r#"{"total":5,"por_origen":{"drive":3,"local":2},"con_pdf":4,"sin_pdf":1}"#;
        let stats: LocalStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.total, 5);
        assert_eq!(stats.count_for(&Origin::Drive), 3);
        assert_eq!(stats.count_for(&Origin::Web), 0);
        assert_eq!(stats.with_document, 4);
    }
}
