//! Excited-state data holder for a single calculation output file.
//!
//! [`Logfile`] is a thin adapter over [`qm_output`](crate::qm_output): it holds
//! a path and two index-aligned sequences, and fills them in from the parser
//! chosen for the file when [`Logfile::parse`] is called. Supported programs:
//! ADF, GAMESS, Gaussian (03/09/16), Jaguar and ORCA.
//!
//! Failures are returned as [`LogfileError`]. The caller (usually the CLI)
//! decides whether to report and exit.

use crate::config::Program;
use crate::qm_output::{self, ParseError};
use crate::states::ExcitedStates;
use log::{debug, LevelFilter};
use nalgebra::DVector;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors returned by [`Logfile::parse`].
#[derive(Error, Debug)]
pub enum LogfileError {
    /// `parse()` was called on a `Logfile` constructed without a path
    #[error("The `parse()` method requires the `filename` argument in `Logfile`")]
    PathUnset,
    /// The path does not refer to an existing file system entry
    #[error("The logfile `{}` could not be found", .0.display())]
    NotFound(PathBuf),
    /// The file was written by a program whose parser is not compiled in
    #[error("{}", .0.missing_backend_message())]
    MissingBackend(Program),
    /// The parsing layer failed to read or interpret the file
    #[error(transparent)]
    Parse(ParseError),
    /// The public sequences were edited to different lengths
    #[error("Excited-state data of the logfile is out of step: {0}")]
    Inconsistent(String),
}

impl From<ParseError> for LogfileError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::BackendDisabled(program) => LogfileError::MissingBackend(program),
            other => LogfileError::Parse(other),
        }
    }
}

/// Excited-state energies and oscillator strengths read from one output file.
///
/// A `Logfile` is created with or without a path. Both sequences start empty
/// and are filled in by [`parse`](Self::parse). Element *i* of
/// [`excited_state_energy`](Self::excited_state_energy) (cm⁻¹) and of
/// [`oscillator_strength`](Self::oscillator_strength) describe the same
/// excited state.
///
/// # Examples
///
/// ```no_run
/// use uvspec::logfile::Logfile;
///
/// let mut logfile = Logfile::new("benzene_td.log");
/// logfile.parse()?;
/// for (e, f) in logfile.excited_state_energy.iter().zip(logfile.oscillator_strength.iter()) {
///     println!("{:>12.2} cm-1  f = {:.4}", e, f);
/// }
/// # Ok::<(), uvspec::logfile::LogfileError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Logfile {
    /// Path of the output file, `None` for a placeholder instance
    pub name: Option<PathBuf>,
    /// Excitation energies in cm⁻¹, one per excited state
    pub excited_state_energy: DVector<f64>,
    /// Oscillator strengths, index-aligned with `excited_state_energy`
    pub oscillator_strength: DVector<f64>,
    program: Option<Program>,
}

impl Logfile {
    /// Creates a `Logfile` for the output file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            name: Some(path.into()),
            ..Self::default()
        }
    }

    /// Path of the output file, if one was given.
    pub fn path(&self) -> Option<&Path> {
        self.name.as_deref()
    }

    /// Program detected by the last successful parse.
    pub fn program(&self) -> Option<Program> {
        self.program
    }

    /// Returns true once a parse has succeeded.
    pub fn is_parsed(&self) -> bool {
        self.program.is_some()
    }

    /// Number of excited states currently held.
    pub fn len(&self) -> usize {
        self.excited_state_energy.len()
    }

    /// Returns true when no excited states are held.
    pub fn is_empty(&self) -> bool {
        self.excited_state_energy.is_empty()
    }

    /// Copies the current data into an [`ExcitedStates`] record.
    ///
    /// # Errors
    ///
    /// [`LogfileError::Inconsistent`] if `excited_state_energy` and
    /// `oscillator_strength` no longer have the same length.
    pub fn excited_states(&self) -> Result<ExcitedStates, LogfileError> {
        ExcitedStates::new(
            self.excited_state_energy.iter().copied().collect(),
            self.oscillator_strength.iter().copied().collect(),
        )
        .map_err(LogfileError::Inconsistent)
    }

    /// Parses the output file and assigns the discrete spectrum values.
    ///
    /// The program that wrote the file is detected from its content, the
    /// matching parser is quieted to error-level diagnostics, and its result
    /// replaces both sequences. Calling `parse` again re-reads the file.
    ///
    /// # Errors
    ///
    /// - [`LogfileError::PathUnset`] if the instance has no path
    /// - [`LogfileError::NotFound`] if the path does not exist
    /// - [`LogfileError::MissingBackend`] if the program's parser is not compiled in
    /// - [`LogfileError::Parse`] for any failure inside the parser
    ///
    /// On error both sequences are left as they were.
    pub fn parse(&mut self) -> Result<(), LogfileError> {
        self.parse_with_log_level(LevelFilter::Error)
    }

    /// Same as [`parse`](Self::parse), with the parser's diagnostics passed up
    /// to `level` instead of error-level only.
    pub fn parse_with_log_level(&mut self, level: LevelFilter) -> Result<(), LogfileError> {
        let path = self.name.as_deref().ok_or(LogfileError::PathUnset)?;
        if !path.exists() {
            return Err(LogfileError::NotFound(path.to_path_buf()));
        }

        let mut output = qm_output::open(path)?;
        output.set_log_level(level);
        let states = output.parse()?;
        debug!(
            "{}: {} excited states from {} output",
            self,
            states.len(),
            output.program()
        );

        let program = output.program();
        let (energies, strengths) = states.into_parts();
        self.excited_state_energy = energies;
        self.oscillator_strength = strengths;
        self.program = Some(program);
        Ok(())
    }
}

impl fmt::Display for Logfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(path) => write!(f, "Logfile: {}", path.display()),
            None => write!(f, "Logfile: None"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_logfile_is_empty() {
        let logfile = Logfile::default();
        assert!(logfile.name.is_none());
        assert!(logfile.excited_state_energy.is_empty());
        assert!(logfile.oscillator_strength.is_empty());
        assert!(!logfile.is_parsed());
    }

    #[test]
    fn test_parse_without_path() {
        let mut logfile = Logfile::default();
        let err = logfile.parse().unwrap_err();
        assert!(matches!(err, LogfileError::PathUnset));
        assert!(err.to_string().contains("requires the `filename` argument"));
    }

    #[test]
    fn test_display_contains_path() {
        let logfile = Logfile::new("runs/benzene_td.log");
        assert_eq!(logfile.to_string(), "Logfile: runs/benzene_td.log");
        assert_eq!(Logfile::default().to_string(), "Logfile: None");
    }

    #[test]
    fn test_excited_states_rejects_mismatched_sequences() {
        let mut logfile = Logfile::default();
        logfile.excited_state_energy = DVector::from_vec(vec![32_000.0, 41_000.0]);
        logfile.oscillator_strength = DVector::from_vec(vec![0.02]);

        let err = logfile.excited_states().unwrap_err();
        assert!(matches!(err, LogfileError::Inconsistent(_)));
        assert!(err.to_string().contains("2 excitation energies but 1 oscillator strengths"));
    }

    #[test]
    fn test_backend_disabled_maps_to_missing_backend() {
        let err: LogfileError = ParseError::BackendDisabled(Program::Adf).into();
        assert!(matches!(err, LogfileError::MissingBackend(Program::Adf)));
        assert!(err.to_string().contains("ADF"));
    }
}
