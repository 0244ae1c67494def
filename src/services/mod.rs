pub mod auth_service;
pub mod patient_service;

pub use auth_service::{AuthService, LoginOutcome};
pub use patient_service::{NewPatient, PatientService};
