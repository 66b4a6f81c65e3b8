use serde::{Deserialize, Serialize};

use super::{non_blank, null_as_default};

/// Doctor as returned by `GET /medicos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: String,
    #[serde(rename = "nombre", default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "cedula", default)]
    pub license: Option<String>,
    #[serde(rename = "correo", default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DoctorForm {
    pub id: String,
    pub name: String,
    pub license: String,
    pub email: String,
}

impl DoctorForm {
    /// Body for `POST /medicos`.
    pub fn to_record(&self) -> Doctor {
        Doctor {
            id: self.id.trim().to_string(),
            name: self.name.trim().to_string(),
            license: non_blank(&self.license),
            email: non_blank(&self.email),
        }
    }
}

/// Point-in-time copy of a doctor embedded in a prescription.
///
/// Taken when the doctor is selected; later edits to the doctor record do not
/// reach an existing draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorSnapshot {
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "cedula")]
    pub license: String,
    #[serde(rename = "correo")]
    pub email: String,
}

impl From<&Doctor> for DoctorSnapshot {
    fn from(doctor: &Doctor) -> Self {
        Self {
            id: doctor.id.clone(),
            name: doctor.name.clone(),
            license: doctor.license.clone().unwrap_or_default(),
            email: doctor.email.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_fills_missing_email_with_empty() {
        let doctor = Doctor {
            id: "D1".into(),
            name: "Dra. Paz".into(),
            license: Some("LIC-77".into()),
            email: None,
        };
        let snap = DoctorSnapshot::from(&doctor);
        let value = serde_json::to_value(&snap).unwrap();
        assert_eq!(value["cedula"], "LIC-77");
        assert_eq!(value["correo"], "");
        assert_eq!(value["nombre"], "Dra. Paz");
    }

    #[test]
    fn form_to_record() {
        let form = DoctorForm {
            id: "D2".into(),
            name: " Juan ".into(),
            license: "".into(),
            email: "j@example.org".into(),
        };
        let rec = form.to_record();
        assert_eq!(rec.name, "Juan");
        assert!(rec.license.is_none());
        assert_eq!(rec.email.as_deref(), Some("j@example.org"));
    }
}
