use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid source system name: {0:?}")]
    InvalidSourceSystem(String),
    #[error("patient key {0} exceeds {max} digits", max = crate::ids::PATIENT_KEY_DIGITS)]
    PatientKeyTooLong(u64),
}

pub type Result<T> = std::result::Result<T, ModelError>;
