use mpi_link::{
    BlockingStrategy, ComparatorConfig, LinkageConfig, LinkageEngine, MatchOutcome, PairScope,
    PolicyConfig,
};
use mpi_model::{CanonicalPatientRecord, PatientKey, RecordId, Sex, SourceSystem};

struct Row {
    source: &'static str,
    curp: &'static str,
    given: &'static str,
    family: &'static str,
    age: u32,
    sex: Sex,
    phone: &'static str,
}

fn build(rows: &[Row]) -> Vec<CanonicalPatientRecord> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let mut record = CanonicalPatientRecord::new(
                PatientKey::new(index as u64 + 1).expect("key"),
                SourceSystem::new(row.source).expect("source"),
            );
            record.national_id = Some(row.curp.to_string());
            record.given_name = Some(row.given.to_string());
            record.family_name = Some(row.family.to_string());
            record.age = Some(row.age);
            record.sex = Some(row.sex);
            record.phone = Some(row.phone.to_string());
            record
        })
        .collect()
}

/// Two small hospital extracts sharing two patients.
fn hospital_extracts() -> Vec<CanonicalPatientRecord> {
    build(&[
        Row { source: "A", curp: "ABCD123456", given: "Juan", family: "Pérez", age: 45, sex: Sex::Male, phone: "5551234567" },
        Row { source: "A", curp: "EFGH789012", given: "María", family: "García", age: 32, sex: Sex::Female, phone: "5559876543" },
        Row { source: "A", curp: "IJKL345678", given: "Pedro", family: "López", age: 58, sex: Sex::Male, phone: "5554567890" },
        Row { source: "B", curp: "ABCD123456", given: "Juan A", family: "Pérez", age: 45, sex: Sex::Male, phone: "5551234567" },
        Row { source: "B", curp: "EFGH789012", given: "María", family: "García G", age: 33, sex: Sex::Female, phone: "5559876544" },
        Row { source: "B", curp: "XYZW123456", given: "Ana", family: "Martínez", age: 29, sex: Sex::Female, phone: "5551122334" },
    ])
}

fn default_engine() -> LinkageEngine {
    LinkageConfig::default().build().expect("default linkage config")
}

fn ids(members: &[usize]) -> Vec<RecordId> {
    members.iter().copied().map(RecordId::new).collect()
}

#[test]
fn weighted_policy_matches_shared_patients() {
    let records = hospital_extracts();
    let result = default_engine().run(&records);

    assert_eq!(result.bucket_count, 2);
    assert_eq!(result.candidate_pairs, 6);
    assert_eq!(result.links.len(), 2);

    let juan = &result.links[0];
    assert_eq!((juan.left, juan.right), (RecordId::new(0), RecordId::new(3)));
    assert_eq!(juan.decision.outcome, MatchOutcome::Match);
    assert!(juan.decision.score >= 5.0);
    assert!(
        juan.comparison
            .get("full_name")
            .and_then(|entry| entry.similarity)
            .is_some_and(|score| score >= 0.85)
    );

    // Phone differs in the last digit and age by one year.
    let maria = &result.links[1];
    assert_eq!((maria.left, maria.right), (RecordId::new(1), RecordId::new(4)));
    assert_eq!(maria.decision.outcome, MatchOutcome::PossibleDuplicate);
    assert!((maria.decision.score - 4.5).abs() < 1e-9);

    assert_eq!(result.clusters.len(), 2);
    assert_eq!(result.clusters[0].members, ids(&[0, 3]));
    assert_eq!(result.clusters[1].members, ids(&[1, 4]));
    assert_eq!(result.cluster_for(RecordId::new(2)), None);
    assert_eq!(result.cluster_of[4], Some(1));
}

#[test]
fn agreement_count_policy_accepts_three_of_four() {
    let config = LinkageConfig {
        policy: PolicyConfig::AgreementCount { min_agreements: 3 },
        ..LinkageConfig::default()
    };
    let result = config.build().expect("config").run(&hospital_extracts());
    assert_eq!(result.links.len(), 2);
    assert!(result.links.iter().all(|link| link.decision.outcome == MatchOutcome::Match));
    assert!((result.links[1].decision.score - 3.0).abs() < 1e-9);
}

#[test]
fn full_blocking_finds_fuzzy_names() {
    let config = LinkageConfig {
        blocking: mpi_link::BlockingConfig::Full,
        policy: PolicyConfig::AgreementCount { min_agreements: 1 },
        comparators: vec![ComparatorConfig::new("full_name", "string")],
        ..LinkageConfig::default()
    };
    let result = config.build().expect("config").run(&hospital_extracts());
    assert_eq!(result.bucket_count, 1);
    assert_eq!(result.candidate_pairs, 15);
    let pairs: Vec<(usize, usize)> = result
        .links
        .iter()
        .map(|link| (link.left.index(), link.right.index()))
        .collect();
    assert!(pairs.contains(&(0, 3)));
    assert!(pairs.contains(&(1, 4)));
}

#[test]
fn sex_blocking_never_compares_across_sexes() {
    let mut records = build(&[
        Row { source: "A", curp: "ABCD123456", given: "Alex", family: "Ruiz", age: 40, sex: Sex::Male, phone: "5550000000" },
        Row { source: "B", curp: "ABCD123456", given: "Alex", family: "Ruiz", age: 40, sex: Sex::Female, phone: "5550000000" },
    ]);
    let result = default_engine().run(&records);
    assert_eq!(result.candidate_pairs, 0);
    assert!(result.clusters.is_empty());

    records[1].sex = Some(Sex::Male);
    let result = default_engine().run(&records);
    assert_eq!(result.clusters.len(), 1);
}

#[test]
fn clusters_are_transitive() {
    let records = build(&[
        Row { source: "A", curp: "CURP000001", given: "Juan", family: "Pérez", age: 45, sex: Sex::Male, phone: "5551111111" },
        Row { source: "B", curp: "CURP000001", given: "Juan", family: "Pérez", age: 45, sex: Sex::Male, phone: "5552222222" },
        Row { source: "C", curp: "CURP999999", given: "Juan", family: "Pérez", age: 46, sex: Sex::Male, phone: "5552222222" },
    ]);
    let config = LinkageConfig {
        policy: PolicyConfig::AgreementCount { min_agreements: 3 },
        ..LinkageConfig::default()
    };
    let result = config.build().expect("config").run(&records);

    let linked: Vec<(usize, usize)> = result
        .links
        .iter()
        .map(|link| (link.left.index(), link.right.index()))
        .collect();
    assert_eq!(linked, vec![(0, 1), (1, 2)]);
    assert_eq!(result.clusters.len(), 1);
    assert_eq!(result.clusters[0].members, ids(&[0, 1, 2]));
}

#[test]
fn cross_source_scope_skips_same_source_pairs() {
    let records = build(&[
        Row { source: "A", curp: "ABCD123456", given: "Juan", family: "Pérez", age: 45, sex: Sex::Male, phone: "5551234567" },
        Row { source: "A", curp: "ABCD123456", given: "Juan", family: "Pérez", age: 45, sex: Sex::Male, phone: "5551234567" },
    ]);
    let engine = default_engine();
    assert_eq!(engine.run(&records).clusters.len(), 1);

    let engine = engine.with_pair_scope(PairScope::CrossSource);
    let result = engine.run(&records);
    assert_eq!(result.candidate_pairs, 0);
    assert!(result.clusters.is_empty());
}

#[test]
fn missing_values_never_link() {
    let records: Vec<CanonicalPatientRecord> = (1..=3)
        .map(|key| {
            CanonicalPatientRecord::new(
                PatientKey::new(key).expect("key"),
                SourceSystem::new("A").expect("source"),
            )
        })
        .collect();
    let result = default_engine().with_blocking(BlockingStrategy::Full).run(&records);
    assert_eq!(result.candidate_pairs, 3);
    assert!(result.links.is_empty());
}
