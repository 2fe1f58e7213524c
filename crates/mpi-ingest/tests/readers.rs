use std::fs;

use mpi_ingest::{IngestError, RecordSource, SourceFormat, open_source};
use mpi_model::SourceSystem;
use tempfile::TempDir;

fn source(name: &str) -> SourceSystem {
    SourceSystem::new(name).expect("source")
}

#[test]
fn csv_source_reads_file() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("medicasur.csv");
    fs::write(
        &path,
        "NoPaciente,NombreCompleto,ubicacion\n501,Ana Ruiz,Insurgentes Sur 300\n502,,\n",
    )
    .expect("write csv");

    let reader = open_source(
        source("MedicaSur"),
        SourceFormat::Csv {
            path,
            delimiter: None,
        },
    );
    assert_eq!(reader.source_system().as_str(), "MedicaSur");
    let batch = reader.read_batch().expect("read");
    assert_eq!(batch.records.len(), 2);
    assert_eq!(batch.records[0].text("NombreCompleto"), Some("Ana Ruiz"));
    assert!(batch.records[1].get("NombreCompleto").is_some_and(|v| v.is_blank()));
}

#[test]
fn json_source_reads_file() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("abc.json");
    fs::write(&path, r#"[{"NSS": "11112222", "NOMBRE": "Luis"}]"#).expect("write json");

    let batch = open_source(source("ABC"), SourceFormat::Json { path })
        .read_batch()
        .expect("read");
    assert_eq!(batch.records.len(), 1);
    assert_eq!(batch.records[0].text("NSS"), Some("11112222"));
}

#[test]
fn sql_dump_source_uses_configured_columns() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("siglo21.sql");
    fs::write(&path, "INSERT INTO Pacientes VALUES ('1','Ana','Ruiz','Calle 1');\n")
        .expect("write dump");

    let format = SourceFormat::SqlDump {
        path,
        table: "Pacientes".to_string(),
        columns: ["NSS", "NOMBRE", "APELLIDO", "Direccion"].map(String::from).to_vec(),
    };
    let batch = open_source(source("Siglo21"), format).read_batch().expect("read");
    assert_eq!(batch.records[0].text("APELLIDO"), Some("Ruiz"));
}

#[test]
fn missing_file_is_reported() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("absent.json");
    let err = open_source(source("ABC"), SourceFormat::Json { path: path.clone() })
        .read_batch()
        .unwrap_err();
    match err {
        IngestError::FileNotFound { path: reported } => assert_eq!(reported, path),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn reader_config_deserializes_from_toml() {
    #[derive(serde::Deserialize)]
    struct Wrapper {
        reader: SourceFormat,
    }

    let parsed: Wrapper = toml::from_str(
        r#"
        [reader]
        format = "sql_dump"
        path = "data/siglo21.sql"
        table = "Pacientes"
        "#,
    )
    .expect("toml");
    assert_eq!(
        parsed.reader,
        SourceFormat::SqlDump {
            path: "data/siglo21.sql".into(),
            table: "Pacientes".to_string(),
            columns: Vec::new(),
        }
    );

    let csv: Wrapper = toml::from_str("[reader]\nformat = \"csv\"\npath = \"a.csv\"\ndelimiter = \";\"\n")
        .expect("toml");
    assert_eq!(csv.reader.name(), "csv");
    assert!(toml::from_str::<Wrapper>("[reader]\nformat = \"xlsx\"\npath = \"a\"\n").is_err());
}
