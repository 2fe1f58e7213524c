pub mod error;
pub mod ids;
pub mod raw;
pub mod record;

pub use error::{ModelError, Result};
pub use ids::{PATIENT_KEY_DIGITS, PatientKey, RecordId, SourceSystem};
pub use raw::{RawSourceRecord, RawValue};
pub use record::{CanonicalField, CanonicalPatientRecord, CompositeKey, Sex};
