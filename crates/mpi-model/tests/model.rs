use mpi_model::{
    CanonicalField, CanonicalPatientRecord, ModelError, PatientKey, RawSourceRecord, RawValue,
    SourceSystem,
};

fn record(key: u64) -> CanonicalPatientRecord {
    CanonicalPatientRecord::new(
        PatientKey::new(key).expect("key"),
        SourceSystem::new("MedicaSur").expect("source"),
    )
}

#[test]
fn patient_key_is_capped_at_eight_digits() {
    assert!(PatientKey::new(99_999_999).is_ok());
    assert_eq!(
        PatientKey::new(100_000_000),
        Err(ModelError::PatientKeyTooLong(100_000_000))
    );
}

#[test]
fn source_system_rejects_blank_names() {
    assert!(SourceSystem::new("   ").is_err());
    assert_eq!(SourceSystem::new(" ABC ").unwrap().as_str(), "ABC");
}

#[test]
fn canonical_field_parses_case_insensitively() {
    assert_eq!(
        "Given_Name".parse::<CanonicalField>(),
        Ok(CanonicalField::GivenName)
    );
    assert!("nombrePac".parse::<CanonicalField>().is_err());
    assert!(!CanonicalField::PatientKey.is_optional());
    assert_eq!(CanonicalField::optional_fields().count(), 8);
}

#[test]
fn full_name_joins_available_parts() {
    let mut rec = record(1);
    assert_eq!(rec.full_name(), None);
    rec.family_name = Some("PEREZ".to_string());
    assert_eq!(rec.full_name().as_deref(), Some("PEREZ"));
    rec.given_name = Some("JUAN".to_string());
    assert_eq!(rec.full_name().as_deref(), Some("JUAN PEREZ"));
}

#[test]
fn empty_fields_include_blank_text() {
    let mut rec = record(7);
    rec.address = Some("  ".to_string());
    assert!(rec.is_empty(CanonicalField::Address));
    assert!(rec.is_empty(CanonicalField::Phone));
    assert!(!rec.is_empty(CanonicalField::PatientKey));
    assert_eq!(rec.field_text(CanonicalField::PatientKey).as_deref(), Some("7"));
}

#[test]
fn raw_cells_treat_blank_as_null() {
    let raw = RawSourceRecord::new(SourceSystem::new("ABC").unwrap(), 0)
        .with_field("NOMBRE", RawValue::from_cell("Ana"))
        .with_field("Direccion", RawValue::from_cell("   "));
    assert_eq!(raw.text("NOMBRE"), Some("Ana"));
    assert_eq!(raw.get("Direccion"), Some(&RawValue::Null));
    assert!(raw.get("NSS").is_none());
}
