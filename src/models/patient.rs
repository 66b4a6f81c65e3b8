use serde::{Deserialize, Serialize};

use super::{blank_as_none, non_blank, null_as_default, Sex};

/// Patient as returned by `GET /pacientes` and `GET /pacientes/{id}`.
///
/// The list endpoint only returns id, name, surname and email; the remaining
/// fields are filled by the single-record endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    #[serde(rename = "nombre", default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "apellido", default)]
    pub surname: Option<String>,
    #[serde(rename = "fecha_nacimiento", default)]
    pub birth_date: Option<String>,
    #[serde(rename = "sexo", default, deserialize_with = "blank_as_none")]
    pub sex: Option<Sex>,
    #[serde(rename = "telefono", default)]
    pub phone: Option<String>,
    #[serde(rename = "correo", default)]
    pub email: Option<String>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        match self.surname.as_deref().map(str::trim) {
            Some(surname) if !surname.is_empty() => format!("{} {}", self.name, surname),
            _ => self.name.clone(),
        }
    }
}

/// Creation form for a patient. Values are kept as typed so a failed
/// submission can be corrected in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientForm {
    pub id: String,
    pub name: String,
    pub surname: String,
    pub birth_date: String,
    pub sex: Option<Sex>,
    pub phone: String,
    pub email: String,
}

impl PatientForm {
    /// Body for `POST /pacientes`. Blank optional fields are sent as null.
    pub fn to_record(&self) -> Patient {
        Patient {
            id: self.id.trim().to_string(),
            name: self.name.trim().to_string(),
            surname: non_blank(&self.surname),
            birth_date: non_blank(&self.birth_date),
            sex: self.sex,
            phone: non_blank(&self.phone),
            email: non_blank(&self.email),
        }
    }
}
