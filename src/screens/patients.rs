use crate::api::Patients;
use crate::models::{Patient, PatientForm};

use super::entities::{EntityKind, EntityScreen};

pub type PatientsScreen = EntityScreen<Patients>;

impl EntityKind for Patients {
    type Form = PatientForm;

    const REQUIRED_MESSAGE: &'static str = "Complete los campos obligatorios: ID, Nombre y Apellido";
    const CREATED_MESSAGE: &'static str = "Paciente creado exitosamente";

    fn is_complete(form: &PatientForm) -> bool {
        [&form.id, &form.name, &form.surname]
            .iter()
            .all(|field| !field.trim().is_empty())
    }

    fn to_record(form: &PatientForm) -> Patient {
        form.to_record()
    }

    fn describe(record: &Patient) -> String {
        match record.email.as_deref() {
            Some(email) if !email.is_empty() => {
                format!("{} - {} ({})", record.id, record.full_name(), email)
            }
            _ => format!("{} - {}", record.id, record.full_name()),
        }
    }
}
