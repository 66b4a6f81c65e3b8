use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{parse_timestamp, DoctorSnapshot, MedicationItem, Origin};

/// Body of `POST /recetas`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPrescription {
    #[serde(rename = "paciente_id")]
    pub patient_id: String,
    #[serde(rename = "medico")]
    pub doctor: DoctorSnapshot,
    #[serde(rename = "diagnostico")]
    pub diagnosis: String,
    #[serde(rename = "indicaciones")]
    pub instructions: String,
    /// Never contains an item with a blank name.
    #[serde(rename = "medicamentos")]
    pub medications: Vec<MedicationItem>,
}

/// Response of `POST /recetas`.
#[derive(Debug, Clone, Deserialize)]
pub struct PrescriptionReceipt {
    #[serde(default)]
    pub status: Option<String>,
    pub id_receta: String,
    /// Raw upload result reported by the backend's storage step.
    #[serde(default)]
    pub upload: Option<serde_json::Value>,
    #[serde(default)]
    pub pdf_path: Option<String>,
}

impl PrescriptionReceipt {
    pub fn document_generated(&self) -> bool {
        self.pdf_path.as_deref().is_some_and(|p| !p.is_empty())
    }

    pub fn uploaded(&self) -> bool {
        self.upload.as_ref().is_some_and(|u| !u.is_null())
    }
}

/// Row of `GET /recetas`: a prescription authored and tracked by the web backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    /// Backend row number; `id_receta` is the public identifier.
    #[serde(default)]
    pub id: Option<i64>,
    pub id_receta: String,
    #[serde(rename = "paciente_id", default)]
    pub patient_id: Option<String>,
    #[serde(rename = "medico_id", default)]
    pub doctor_id: Option<String>,
    #[serde(rename = "diagnostico", default)]
    pub diagnosis: Option<String>,
    #[serde(rename = "indicaciones", default)]
    pub instructions: Option<String>,
    #[serde(rename = "medicamentos", default)]
    pub medications: Vec<MedicationItem>,
    #[serde(rename = "fecha_emision", default)]
    pub issued_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub sent: bool,
    #[serde(default)]
    pub pdf_path: Option<String>,
}

impl Prescription {
    pub fn origin(&self) -> Origin {
        Origin::Web
    }

    pub fn has_document(&self) -> bool {
        self.pdf_path.as_deref().is_some_and(|p| !p.is_empty())
    }

    pub fn issued_at(&self) -> Option<NaiveDateTime> {
        self.issued_at.as_deref().and_then(parse_timestamp)
    }

    pub fn created_at(&self) -> Option<NaiveDateTime> {
        self.created_at.as_deref().and_then(parse_timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_list_row() {
        let json = r#"{
            "id": 4,
            "id_receta": "RX-2025-0004",
            "paciente_id": "P1",
            "medico_id": "D1",
            "diagnostico": "Faringitis",
            "fecha_emision": "2025-02-01T08:00:00",
            "created_at": "2025-02-01T08:00:01.120000",
            "sent": true,
            "pdf_path": "data/generados/receta_RX-2025-0004.pdf",
            "medicamentos": [{"nombre": "Amoxicilina", "dosis": "500mg", "frecuencia": "8h"}]
        }"#;
        let rx: Prescription = serde_json::from_str(json).unwrap();
        assert!(rx.sent);
        assert!(rx.has_document());
        assert_eq!(rx.medications.len(), 1);
        assert!(rx.issued_at().is_some());
        assert!(rx.created_at().is_some());
        assert_eq!(rx.origin(), Origin::Web);
    }

    #[test]
    fn missing_optional_fields_default() {
        let rx: Prescription = serde_json::from_str(r#"{"id_receta":"X"}"#).unwrap();
        assert!(!rx.sent);
        assert!(!rx.has_document());
        assert!(rx.medications.is_empty());
    }

    #[test]
    fn receipt_flags() {
        let json = r#"{"status":"created","id_receta":"RX1","upload":{"id":"f1"},"pdf_path":null}"#;
        let receipt: PrescriptionReceipt = serde_json::from_str(json).unwrap();
        assert!(receipt.uploaded());
        assert!(!receipt.document_generated());
    }

    #[test]
    fn new_prescription_wire_names() {
        let payload = NewPrescription {
            patient_id: "P1".into(),
            doctor: DoctorSnapshot {
                id: "D1".into(),
                name: "N".into(),
                license: "L".into(),
                email: "".into(),
            },
            diagnosis: "Dx".into(),
            instructions: "".into(),
            medications: vec![MedicationItem::named("Ibuprofen")],
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["paciente_id"], "P1");
        assert_eq!(value["medico"]["id"], "D1");
        assert_eq!(value["medicamentos"][0]["nombre"], "Ibuprofen");
        assert_eq!(value["diagnostico"], "Dx");
    }
}
