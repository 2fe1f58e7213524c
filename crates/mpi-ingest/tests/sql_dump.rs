use mpi_ingest::{IngestError, parse_sql_dump};
use mpi_model::{RawValue, SourceSystem};

const SIGLO21_DUMP: &str = r"-- MySQL dump 10.13  Distrib 8.0.36
/*!40101 SET NAMES utf8mb4 */;
DROP TABLE IF EXISTS `Pacientes`;
CREATE TABLE `Pacientes` (
  `NSS` varchar(20) NOT NULL,
  `NOMBRE` varchar(80) DEFAULT NULL,
  `APELLIDO` varchar(80) DEFAULT NULL,
  `Direccion` varchar(200) DEFAULT NULL,
  PRIMARY KEY (`NSS`)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4;

LOCK TABLES `Pacientes` WRITE;
INSERT INTO `Pacientes` (`NSS`, `NOMBRE`, `APELLIDO`, `Direccion`) VALUES
  ('12345678','José','Martínez','Av. Reforma 10, Col. Centro'),
  ('87654321','María','O\'Connor',NULL),
  ('N/A','Sin','Clave',''),
  ('1','corto');
INSERT INTO `Citas` VALUES (1,'2024-01-01');
UNLOCK TABLES;
";

fn siglo21() -> SourceSystem {
    SourceSystem::new("Siglo21").expect("source")
}

#[test]
fn reads_patient_rows_from_mysql_dump() {
    let batch = parse_sql_dump(SIGLO21_DUMP, &siglo21(), "Pacientes", &[]).expect("parse dump");

    assert_eq!(batch.records.len(), 3);
    assert_eq!(batch.skipped_rows, 1);

    let jose = &batch.records[0];
    assert_eq!(jose.ordinal, 0);
    assert_eq!(jose.source_system, siglo21());
    assert_eq!(jose.text("NOMBRE"), Some("José"));
    assert_eq!(jose.text("Direccion"), Some("Av. Reforma 10, Col. Centro"));

    let maria = &batch.records[1];
    assert_eq!(maria.text("APELLIDO"), Some("O'Connor"));
    assert_eq!(maria.get("Direccion"), Some(&RawValue::Null));

    let blank = &batch.records[2];
    assert_eq!(blank.text("NSS"), Some("N/A"));
    assert_eq!(blank.get("Direccion"), Some(&RawValue::Null));
}

#[test]
fn other_tables_are_ignored() {
    let batch = parse_sql_dump(SIGLO21_DUMP, &siglo21(), "Medicos", &[]).expect("parse dump");
    assert!(batch.records.is_empty());
    assert_eq!(batch.skipped_rows, 0);
}

#[test]
fn ordinals_span_multiple_statements() {
    let dump = "INSERT INTO p (a) VALUES ('1');\nINSERT INTO p (a) VALUES ('2'),('3');";
    let batch = parse_sql_dump(dump, &siglo21(), "P", &[]).expect("parse dump");
    let ordinals: Vec<usize> = batch.records.iter().map(|record| record.ordinal).collect();
    assert_eq!(ordinals, vec![0, 1, 2]);
}

#[test]
fn unterminated_string_reports_line() {
    let dump = "INSERT INTO p (a) VALUES\n('abc);";
    let err = parse_sql_dump(dump, &siglo21(), "p", &[]).unwrap_err();
    assert!(matches!(err, IngestError::SqlLex { line: 2, .. }), "{err:?}");
}
