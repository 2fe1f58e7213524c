use mpi_map::{MappingError, MappingRuleConfig, MappingTable, RecordError, map_batch, map_record};
use mpi_model::{RawSourceRecord, RawValue, Sex, SourceSystem};

fn source(name: &str) -> SourceSystem {
    SourceSystem::new(name).expect("source name")
}

fn raw(source_name: &str, ordinal: usize, cells: &[(&str, &str)]) -> RawSourceRecord {
    let mut record = RawSourceRecord::new(source(source_name), ordinal);
    for (name, value) in cells {
        record.insert(*name, RawValue::from_cell(value));
    }
    record
}

fn siglo21_table() -> MappingTable {
    MappingTable::new(
        source("Siglo21"),
        &[
            MappingRuleConfig::new("NOMBRE", "given_name", Some("normalize")),
            MappingRuleConfig::new("APELLIDO", "family_name", Some("normalize")),
            MappingRuleConfig::new("NSS", "patient_key", None),
            MappingRuleConfig::new("Direccion", "address", Some("normalize")),
        ],
    )
    .expect("valid table")
}

fn medica_sur_table() -> MappingTable {
    MappingTable::new(
        source("MedicaSur"),
        &[
            MappingRuleConfig::new("NoPaciente", "patient_key", Some("digits")),
            MappingRuleConfig::new("NombreCompleto", "given_name", Some("first_token")).required(),
            MappingRuleConfig::new("NombreCompleto", "family_name", Some("second_token")).required(),
            MappingRuleConfig::new("ubicacion", "address", Some("normalize")),
            MappingRuleConfig::new("sexo", "sex", None),
            MappingRuleConfig::new("edad", "age", None),
            MappingRuleConfig::new("tel", "phone", None),
        ],
    )
    .expect("valid table")
}

#[test]
fn maps_and_normalizes_a_row() {
    let row = raw(
        "Siglo21",
        0,
        &[
            ("NOMBRE", "  José "),
            ("APELLIDO", "Martínez"),
            ("NSS", "123-456-789-01"),
            ("Direccion", "  Calle   Reforma 10 "),
        ],
    );
    let record = map_record(&row, &siglo21_table()).expect("mapped");
    assert_eq!(record.patient_key.get(), 12_345_678);
    assert_eq!(record.given_name.as_deref(), Some("JOSE"));
    assert_eq!(record.family_name.as_deref(), Some("MARTINEZ"));
    assert_eq!(record.address.as_deref(), Some("CALLE REFORMA 10"));
    assert_eq!(record.source_system.as_str(), "Siglo21");
}

#[test]
fn missing_optional_field_maps_to_null() {
    let row = raw("Siglo21", 3, &[("NOMBRE", "Ana"), ("NSS", "77")]);
    let record = map_record(&row, &siglo21_table()).expect("mapped");
    assert_eq!(record.family_name, None);
    assert_eq!(record.address, None);
}

#[test]
fn identifier_without_digits_is_unidentifiable() {
    let row = raw("Siglo21", 4, &[("NOMBRE", "Ana"), ("NSS", "N/A")]);
    assert_eq!(
        map_record(&row, &siglo21_table()),
        Err(RecordError::Unidentifiable {
            source_system: source("Siglo21"),
            ordinal: 4,
        })
    );
}

#[test]
fn splits_full_name_and_maps_demographics() {
    let row = raw(
        "MedicaSur",
        0,
        &[
            ("NoPaciente", "MS-0042"),
            ("NombreCompleto", "maría garcía lópez"),
            ("ubicacion", "Tlalpan"),
            ("sexo", "Femenino"),
            ("edad", "32"),
            ("tel", "55-5987-6543"),
        ],
    );
    let record = map_record(&row, &medica_sur_table()).expect("mapped");
    assert_eq!(record.patient_key.get(), 42);
    assert_eq!(record.given_name.as_deref(), Some("MARIA"));
    assert_eq!(record.family_name.as_deref(), Some("GARCIA"));
    assert_eq!(record.sex, Some(Sex::Female));
    assert_eq!(record.age, Some(32));
    assert_eq!(record.phone.as_deref(), Some("5559876543"));
}

#[test]
fn batch_isolates_bad_rows() {
    let rows = vec![
        raw("MedicaSur", 0, &[("NoPaciente", "1"), ("NombreCompleto", "Ana Ruiz")]),
        raw("MedicaSur", 1, &[("NoPaciente", "2")]),
        raw("MedicaSur", 2, &[("NoPaciente", "sin dato"), ("NombreCompleto", "Luis Mora")]),
        raw("MedicaSur", 3, &[("NoPaciente", "4"), ("NombreCompleto", "Eva Sol")]),
    ];
    let batch = map_batch(&rows, &medica_sur_table());
    assert_eq!(batch.records.len(), 2);
    assert_eq!(batch.unidentifiable_count(), 1);
    assert_eq!(batch.malformed_count(), 1);
    assert!(matches!(
        batch.failures[0],
        RecordError::MalformedRow { ordinal: 1, .. }
    ));
}

#[test]
fn rules_deserialize_from_json_rows() {
    let rows: Vec<MappingRuleConfig> = serde_json::from_str(
        r#"[
            {"source_field": "NSS", "canonical_field": "patient_key"},
            {"source_field": "NOMBRE", "canonical_field": "given_name", "transform": "normalize", "required": true}
        ]"#,
    )
    .expect("parse rows");
    assert!(!rows[0].required);
    assert!(rows[1].required);
    let table = MappingTable::new(source("ABC"), &rows).expect("valid table");
    assert_eq!(table.rules().len(), 2);
}

#[test]
fn names_and_address_normalize_without_an_explicit_transform() {
    let table = MappingTable::new(
        source("ABC"),
        &[
            MappingRuleConfig::new("NSS", "patient_key", None),
            MappingRuleConfig::new("NOMBRE", "given_name", None),
            MappingRuleConfig::new("APELLIDO", "family_name", None),
            MappingRuleConfig::new("Direccion", "address", None),
        ],
    )
    .expect("valid table");
    let accented = raw(
        "ABC",
        0,
        &[
            ("NSS", "12345678"),
            ("NOMBRE", "José"),
            ("APELLIDO", "Pérez"),
            ("Direccion", "  Calle 123  "),
        ],
    );
    let upper = raw(
        "ABC",
        1,
        &[("NSS", "12345678"), ("NOMBRE", "JOSE"), ("APELLIDO", "PEREZ")],
    );
    let first = map_record(&accented, &table).expect("mapped");
    let second = map_record(&upper, &table).expect("mapped");
    assert_eq!(first.given_name.as_deref(), Some("JOSE"));
    assert_eq!(first.family_name.as_deref(), Some("PEREZ"));
    assert_eq!(first.address.as_deref(), Some("CALLE 123"));
    assert_eq!(first.composite_key(), second.composite_key());
}

#[test]
fn trim_cannot_populate_a_name() {
    let result = MappingTable::new(
        source("ABC"),
        &[
            MappingRuleConfig::new("NSS", "patient_key", None),
            MappingRuleConfig::new("APELLIDO", "family_name", Some("trim")),
        ],
    );
    assert!(matches!(
        result,
        Err(MappingError::IncompatibleTransform {
            transform: "trim",
            ..
        })
    ));
}

#[test]
fn single_word_full_name_is_malformed() {
    let cher = raw(
        "MedicaSur",
        7,
        &[("NoPaciente", "30000007"), ("NombreCompleto", "Cher")],
    );
    assert_eq!(
        map_record(&cher, &medica_sur_table()),
        Err(RecordError::MalformedRow {
            source_system: source("MedicaSur"),
            ordinal: 7,
            field: "NombreCompleto".to_string(),
        })
    );

    let three_words = raw(
        "MedicaSur",
        8,
        &[("NoPaciente", "30000008"), ("NombreCompleto", "María García López")],
    );
    let record = map_record(&three_words, &medica_sur_table()).expect("mapped");
    assert_eq!(record.given_name.as_deref(), Some("MARIA"));
    assert_eq!(record.family_name.as_deref(), Some("GARCIA"));
}
