//! Raw record to canonical record mapping.

use mpi_model::{
    CanonicalField, CanonicalPatientRecord, PatientKey, RawSourceRecord, RawValue, Sex,
    SourceSystem,
};
use tracing::{debug, info};

use crate::error::RecordError;
use crate::table::MappingTable;
use crate::transform::MappedValue;

/// Result of mapping one batch. Failed rows are counted and kept for reporting.
#[derive(Debug, Clone, Default)]
pub struct MappedBatch {
    pub records: Vec<CanonicalPatientRecord>,
    pub failures: Vec<RecordError>,
}

impl MappedBatch {
    pub fn unidentifiable_count(&self) -> usize {
        self.failures
            .iter()
            .filter(|failure| failure.is_unidentifiable())
            .count()
    }

    pub fn malformed_count(&self) -> usize {
        self.failures.len() - self.unidentifiable_count()
    }
}

/// Canonical record under construction; the patient key may still be missing.
#[derive(Debug, Default)]
struct Draft {
    patient_key: Option<PatientKey>,
    given_name: Option<String>,
    family_name: Option<String>,
    maternal_family_name: Option<String>,
    address: Option<String>,
    national_id: Option<String>,
    age: Option<u32>,
    sex: Option<Sex>,
    phone: Option<String>,
}

impl Draft {
    fn assign(&mut self, field: CanonicalField, value: MappedValue) {
        match (field, value) {
            (CanonicalField::PatientKey, MappedValue::Integer(n)) => {
                self.patient_key = PatientKey::new(n).ok();
            }
            (CanonicalField::Age, MappedValue::Integer(n)) => {
                self.age = u32::try_from(n).ok();
            }
            (CanonicalField::Sex, MappedValue::Sex(sex)) => self.sex = Some(sex),
            (CanonicalField::GivenName, MappedValue::Text(text)) => self.given_name = Some(text),
            (CanonicalField::FamilyName, MappedValue::Text(text)) => self.family_name = Some(text),
            (CanonicalField::MaternalFamilyName, MappedValue::Text(text)) => {
                self.maternal_family_name = Some(text);
            }
            (CanonicalField::Address, MappedValue::Text(text)) => self.address = Some(text),
            (CanonicalField::NationalId, MappedValue::Text(text)) => self.national_id = Some(text),
            (CanonicalField::Phone, MappedValue::Text(text)) => self.phone = Some(text),
            // Null values and kinds rejected at table validation leave the field empty.
            _ => {}
        }
    }

    fn finish(self, source_system: SourceSystem) -> Option<CanonicalPatientRecord> {
        let mut record = CanonicalPatientRecord::new(self.patient_key?, source_system);
        record.given_name = self.given_name;
        record.family_name = self.family_name;
        record.maternal_family_name = self.maternal_family_name;
        record.address = self.address;
        record.national_id = self.national_id;
        record.age = self.age;
        record.sex = self.sex;
        record.phone = self.phone;
        Some(record)
    }
}

/// Maps one raw record through `table`.
///
/// The output carries the table's source system. A missing source field maps
/// to null unless its rule is `required`; a required rule must also produce a
/// value after its transform, so `second_token` on a one-word name rejects the row.
///
/// # Errors
///
/// - [`RecordError::MalformedRow`] when a required rule yields no value
/// - [`RecordError::Unidentifiable`] when no patient key can be derived
pub fn map_record(
    raw: &RawSourceRecord,
    table: &MappingTable,
) -> Result<CanonicalPatientRecord, RecordError> {
    let source_system = table.source_system();
    let mut draft = Draft::default();

    for rule in table.rules() {
        let value = rule
            .transform
            .apply(raw.get(&rule.source_field).and_then(RawValue::as_text));
        if rule.required && value == MappedValue::Null {
            return Err(RecordError::MalformedRow {
                source_system: source_system.clone(),
                ordinal: raw.ordinal,
                field: rule.source_field.clone(),
            });
        }
        draft.assign(rule.canonical_field, value);
    }

    draft
        .finish(source_system.clone())
        .ok_or_else(|| RecordError::Unidentifiable {
            source_system: source_system.clone(),
            ordinal: raw.ordinal,
        })
}

/// Maps a whole batch, isolating failures per record.
pub fn map_batch(raws: &[RawSourceRecord], table: &MappingTable) -> MappedBatch {
    let mut batch = MappedBatch {
        records: Vec::with_capacity(raws.len()),
        failures: Vec::new(),
    };
    for raw in raws {
        match map_record(raw, table) {
            Ok(record) => batch.records.push(record),
            Err(failure) => {
                debug!(
                    source_system = %table.source_system(),
                    ordinal = failure.ordinal(),
                    unidentifiable = failure.is_unidentifiable(),
                    "skipping raw record"
                );
                batch.failures.push(failure);
            }
        }
    }
    info!(
        source_system = %table.source_system(),
        read = raws.len(),
        mapped = batch.records.len(),
        unidentifiable = batch.unidentifiable_count(),
        malformed = batch.malformed_count(),
        "mapped batch"
    );
    batch
}
