use serde::{Deserialize, Serialize};

use super::null_as_default;

/// One medication line of a prescription.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationItem {
    #[serde(rename = "nombre", default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "dosis", default, deserialize_with = "null_as_default")]
    pub dose: String,
    #[serde(rename = "frecuencia", default, deserialize_with = "null_as_default")]
    pub frequency: String,
    #[serde(rename = "duracion", default, deserialize_with = "null_as_default")]
    pub duration: String,
}

impl MedicationItem {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// "Ibuprofeno - 400mg (cada 8h)" style summary for list rows.
    pub fn summary(&self) -> String {
        let mut line = self.name.clone();
        if !self.dose.trim().is_empty() {
            line.push_str(&format!(" - {}", self.dose));
        }
        if !self.frequency.trim().is_empty() {
            line.push_str(&format!(" ({})", self.frequency));
        }
        line
    }
}
