use std::fs;
use std::path::{Path, PathBuf};
use uvspec::config::{Program, EV_TO_WAVENUMBER};
use uvspec::logfile::{Logfile, LogfileError};
use uvspec::qm_output::ParseError;

fn data_file(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {}, got {}",
        expected,
        actual
    );
}

#[test]
fn test_placeholder_logfile() {
    let mut logfile = Logfile::default();
    assert!(logfile.excited_state_energy.is_empty());
    assert!(logfile.oscillator_strength.is_empty());

    let err = logfile.parse().unwrap_err();
    assert!(matches!(err, LogfileError::PathUnset));
}

#[test]
fn test_missing_file_names_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does_not_exist.log");
    let mut logfile = Logfile::new(&path);

    let err = logfile.parse().unwrap_err();
    match &err {
        LogfileError::NotFound(p) => assert_eq!(p, &path),
        other => panic!("Expected NotFound, got {:?}", other),
    }
    assert!(err.to_string().contains(&path.display().to_string()));
}

#[test]
fn test_gaussian_logfile() {
    let mut logfile = Logfile::new(data_file("formaldehyde_g16.log"));
    logfile.parse().unwrap();

    assert_eq!(logfile.program(), Some(Program::Gaussian));
    assert_eq!(logfile.excited_state_energy.len(), 4);
    assert_eq!(logfile.oscillator_strength.len(), 4);
    assert_close(logfile.excited_state_energy[0], 3.9741 * EV_TO_WAVENUMBER);
    assert_close(logfile.excited_state_energy[3], 8.8542 * EV_TO_WAVENUMBER);
    assert_close(logfile.oscillator_strength[0], 0.0);
    assert_close(logfile.oscillator_strength[1], 0.0324);
    assert_close(logfile.oscillator_strength[3], 0.1745);
}

#[test]
fn test_gamess_logfile() {
    let mut logfile = Logfile::new(data_file("water_gamess.log"));
    logfile.parse().unwrap();

    assert_eq!(logfile.program(), Some(Program::Gamess));
    assert_eq!(logfile.len(), 4);
    assert_close(logfile.excited_state_energy[0], 6.114 * EV_TO_WAVENUMBER);
    assert_close(logfile.oscillator_strength[0], 0.0095);
    assert_close(logfile.excited_state_energy[3], 10.171 * EV_TO_WAVENUMBER);
    assert_close(logfile.oscillator_strength[3], 0.0993);
}

#[test]
fn test_adf_logfile_sorted_across_symmetries() {
    let mut logfile = Logfile::new(data_file("ethylene_adf.out"));
    logfile.parse().unwrap();

    assert_eq!(logfile.program(), Some(Program::Adf));
    assert_eq!(logfile.len(), 3);
    assert_close(logfile.excited_state_energy[0], 6.8355 * EV_TO_WAVENUMBER);
    assert_close(logfile.oscillator_strength[0], 0.0681);
    assert_close(logfile.excited_state_energy[1], 7.4668 * EV_TO_WAVENUMBER);
    assert_close(logfile.oscillator_strength[1], 0.3354);
    assert_close(logfile.oscillator_strength[2], 0.01221);
}

#[test]
fn test_jaguar_logfile() {
    let mut logfile = Logfile::new(data_file("pyridine_jaguar.out"));
    logfile.parse().unwrap();

    assert_eq!(logfile.program(), Some(Program::Jaguar));
    assert_eq!(logfile.len(), 3);
    assert_close(logfile.excited_state_energy[2], 6.401 * EV_TO_WAVENUMBER);
    assert_close(logfile.oscillator_strength[2], 0.5123);
}

#[test]
fn test_orca_logfile_uses_electric_dipole_table() {
    let mut logfile = Logfile::new(data_file("phenol_orca.out"));
    logfile.parse().unwrap();

    assert_eq!(logfile.program(), Some(Program::Orca));
    assert_eq!(logfile.len(), 3);
    assert_close(logfile.excited_state_energy[0], 38774.3);
    assert_close(logfile.oscillator_strength[0], 0.031545230);
    assert_close(logfile.excited_state_energy[2], 46120.5);
    assert_close(logfile.oscillator_strength[2], 0.145223101);
}

#[test]
fn test_parse_twice_is_identical() {
    let mut logfile = Logfile::new(data_file("formaldehyde_g16.log"));
    logfile.parse().unwrap();
    let first_energy = logfile.excited_state_energy.clone();
    let first_strength = logfile.oscillator_strength.clone();

    logfile.parse().unwrap();
    assert_eq!(logfile.excited_state_energy, first_energy);
    assert_eq!(logfile.oscillator_strength, first_strength);
}

#[test]
fn test_failed_reparse_keeps_previous_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("copy.log");
    fs::copy(data_file("pyridine_jaguar.out"), &path).unwrap();

    let mut logfile = Logfile::new(&path);
    logfile.parse().unwrap();
    fs::remove_file(&path).unwrap();

    assert!(matches!(logfile.parse(), Err(LogfileError::NotFound(_))));
    assert_eq!(logfile.len(), 3);
    assert_eq!(logfile.oscillator_strength.len(), 3);
}

#[test]
fn test_no_excited_states() {
    let mut logfile = Logfile::new(data_file("ground_state_g09.log"));
    let err = logfile.parse().unwrap_err();
    assert!(matches!(
        err,
        LogfileError::Parse(ParseError::NoExcitedStates {
            program: Program::Gaussian,
            ..
        })
    ));
    assert!(logfile.is_empty());
}

#[test]
fn test_unknown_format() {
    let mut logfile = Logfile::new(data_file("unknown_program.out"));
    let err = logfile.parse().unwrap_err();
    assert!(matches!(err, LogfileError::Parse(ParseError::UnknownFormat(_))));
}

#[test]
fn test_display_contains_path() {
    let path = data_file("phenol_orca.out");
    let logfile = Logfile::new(&path);
    assert!(logfile.to_string().contains(&path.display().to_string()));
}

#[test]
fn test_excited_states_record_matches_sequences() {
    let mut logfile = Logfile::new(data_file("water_gamess.log"));
    logfile.parse().unwrap();

    let states = logfile.excited_states().unwrap();
    assert_eq!(states.energies(), &logfile.excited_state_energy);
    assert_eq!(states.oscillator_strengths(), &logfile.oscillator_strength);
    assert_eq!(states.strongest().map(|(i, _, _)| i), Some(3));
}

#[test]
fn test_excited_states_after_truncating_strengths() {
    let mut logfile = Logfile::new(data_file("water_gamess.log"));
    logfile.parse().unwrap();
    logfile.oscillator_strength = logfile.oscillator_strength.rows(0, 1).into_owned();

    let err = logfile.excited_states().unwrap_err();
    assert!(matches!(err, LogfileError::Inconsistent(_)));
    assert_eq!(logfile.excited_state_energy.len(), 4);
}
