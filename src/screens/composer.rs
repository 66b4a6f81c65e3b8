//! Prescription composer.
//!
//! A `Draft` is plain in-memory state: patient id, doctor snapshot, free text
//! and a variable-length medication list. `Draft::validate` is the only path
//! to a `NewPrescription`, so an invalid draft never reaches the network.

use crate::api::ApiClient;
use crate::models::{Doctor, DoctorSnapshot, MedicationItem, NewPrescription, Patient};

use super::{Notice, ScreenError};

pub const MSG_SELECT_PATIENT: &str = "Seleccione un paciente";
pub const MSG_SELECT_DOCTOR: &str = "Seleccione un médico";
pub const MSG_DIAGNOSIS: &str = "Ingrese un diagnóstico";
pub const MSG_MEDICATION: &str = "Agregue al menos un medicamento con nombre";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    patient_id: Option<String>,
    doctor: Option<DoctorSnapshot>,
    pub diagnosis: String,
    pub instructions: String,
    medications: Vec<MedicationItem>,
}

impl Default for Draft {
    /// Empty draft with one blank medication row.
    fn default() -> Self {
        Self {
            patient_id: None,
            doctor: None,
            diagnosis: String::new(),
            instructions: String::new(),
            medications: vec![MedicationItem::default()],
        }
    }
}

impl Draft {
    pub fn patient_id(&self) -> Option<&str> {
        self.patient_id.as_deref()
    }

    pub fn doctor(&self) -> Option<&DoctorSnapshot> {
        self.doctor.as_ref()
    }

    pub fn medications(&self) -> &[MedicationItem] {
        &self.medications
    }

    pub fn select_patient(&mut self, patient_id: &str) {
        let id = patient_id.trim();
        self.patient_id = (!id.is_empty()).then(|| id.to_string());
    }

    /// Copy the doctor's current data into the draft.
    pub fn select_doctor(&mut self, doctor: &Doctor) {
        self.doctor = Some(DoctorSnapshot::from(doctor));
    }

    pub fn add_medication(&mut self) {
        self.medications.push(MedicationItem::default());
    }

    /// Remove the row at `index`. The list may become empty; an out-of-range
    /// index is ignored.
    pub fn remove_medication(&mut self, index: usize) {
        if index < self.medications.len() {
            self.medications.remove(index);
        }
    }

    pub fn medication_mut(&mut self, index: usize) -> Option<&mut MedicationItem> {
        self.medications.get_mut(index)
    }

    /// Check the draft in order: patient, doctor, diagnosis, medications.
    /// Blank-named rows are dropped from the payload.
    pub fn validate(&self) -> Result<NewPrescription, ScreenError> {
        let patient_id = self
            .patient_id
            .clone()
            .ok_or_else(|| ScreenError::validation(MSG_SELECT_PATIENT))?;
        let doctor = self
            .doctor
            .clone()
            .ok_or_else(|| ScreenError::validation(MSG_SELECT_DOCTOR))?;
        if self.diagnosis.trim().is_empty() {
            return Err(ScreenError::validation(MSG_DIAGNOSIS));
        }

        let medications: Vec<MedicationItem> = self
            .medications
            .iter()
            .filter(|item| item.has_name())
            .cloned()
            .collect();
        if medications.is_empty() {
            return Err(ScreenError::validation(MSG_MEDICATION));
        }

        Ok(NewPrescription {
            patient_id,
            doctor,
            diagnosis: self.diagnosis.clone(),
            instructions: self.instructions.clone(),
            medications,
        })
    }
}

/// Composer screen: the draft plus the selector options.
pub struct Composer {
    client: ApiClient,
    patients: Vec<Patient>,
    doctors: Vec<Doctor>,
    draft: Draft,
}

impl Composer {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            patients: Vec::new(),
            doctors: Vec::new(),
            draft: Draft::default(),
        }
    }

    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn doctors(&self) -> &[Doctor] {
        &self.doctors
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut Draft {
        &mut self.draft
    }

    /// Fetch patient and doctor lists for the selectors. A failed list stays
    /// empty and is only logged.
    pub async fn load_options(&mut self) {
        let (patients, doctors) =
            tokio::join!(self.client.list_patients(), self.client.list_doctors());

        match patients {
            Ok(rows) => self.patients = rows,
            Err(e) => tracing::warn!(error = %e, "Could not load patients for composer"),
        }
        match doctors {
            Ok(rows) => self.doctors = rows,
            Err(e) => tracing::warn!(error = %e, "Could not load doctors for composer"),
        }
    }

    /// Select a doctor from the loaded options by id.
    pub fn select_doctor_by_id(&mut self, doctor_id: &str) -> Result<(), ScreenError> {
        let doctor = self
            .doctors
            .iter()
            .find(|d| d.id == doctor_id)
            .ok_or_else(|| ScreenError::validation(MSG_SELECT_DOCTOR))?;
        self.draft.select_doctor(doctor);
        Ok(())
    }

    /// Validate and submit. The draft resets only on success.
    pub async fn submit(&mut self) -> Result<Notice, ScreenError> {
        let payload = self.draft.validate()?;

        let receipt = self
            .client
            .create_prescription(&payload)
            .await
            .map_err(|e| ScreenError::api("Error", e))?;

        tracing::info!(
            id_receta = %receipt.id_receta,
            medications = payload.medications.len(),
            "Prescription created"
        );

        let mut text = format!(
            "Receta creada exitosamente\n\nID de Receta: {}\n",
            receipt.id_receta
        );
        if receipt.document_generated() {
            text.push_str("✓ PDF generado correctamente\n");
        }
        if receipt.uploaded() {
            text.push_str("✓ XML enviado al Drive\n");
        }

        self.draft = Draft::default();
        Ok(Notice::new(text.trim_end()))
    }
}
