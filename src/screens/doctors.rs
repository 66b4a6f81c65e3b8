use crate::api::Doctors;
use crate::models::{Doctor, DoctorForm};

use super::entities::{EntityKind, EntityScreen};

pub type DoctorsScreen = EntityScreen<Doctors>;

impl EntityKind for Doctors {
    type Form = DoctorForm;

    const REQUIRED_MESSAGE: &'static str = "Complete los campos obligatorios: ID y Nombre";
    const CREATED_MESSAGE: &'static str = "Médico creado exitosamente";

    fn is_complete(form: &DoctorForm) -> bool {
        !form.id.trim().is_empty() && !form.name.trim().is_empty()
    }

    fn to_record(form: &DoctorForm) -> Doctor {
        form.to_record()
    }

    fn describe(record: &Doctor) -> String {
        let mut line = format!("{} - {}", record.id, record.name);
        if let Some(license) = record.license.as_deref().filter(|l| !l.is_empty()) {
            line.push_str(&format!(" | Cédula: {license}"));
        }
        if let Some(email) = record.email.as_deref().filter(|e| !e.is_empty()) {
            line.push_str(&format!(" | {email}"));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::api::ApiClient;
    use crate::session::SessionStore;
    use crate::testing::MockBackend;

    #[test]
    fn license_is_optional() {
        let form = DoctorForm {
            id: "D1".into(),
            name: "Dra. Sol".into(),
            ..Default::default()
        };
        assert!(Doctors::is_complete(&form));
        assert!(!Doctors::is_complete(&DoctorForm::default()));
    }

    #[test]
    fn describe_includes_license() {
        let d = Doctor {
            id: "D1".into(),
            name: "Dra. Sol".into(),
            license: Some("C-77".into()),
            email: None,
        };
        assert_eq!(Doctors::describe(&d), "D1 - Dra. Sol | Cédula: C-77");
    }

    #[tokio::test]
    async fn create_failure_keeps_doctor_form() {
        let backend = MockBackend::start().await;
        backend.on_json("POST", "/medicos", 500, json!({"detail": null}));
        let client = ApiClient::new(&backend.base_url(), Arc::new(SessionStore::in_memory())).unwrap();
        let mut screen = DoctorsScreen::new(client);
        screen.form_mut().id = "D2".into();
        screen.form_mut().name = "Dr. Paz".into();
        screen.form_mut().license = "L-1".into();
        let before = screen.form().clone();

        let err = screen.create().await.unwrap_err();
        assert_eq!(err.to_string(), "Error: Error desconocido");
        assert_eq!(screen.form(), &before);
    }
}
