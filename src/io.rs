//! Rendering and writing of excited-state data.
//!
//! Parsed states are written as "stick" data: one line per excited state with
//! its energy (cm⁻¹) and oscillator strength. Three renderings are provided:
//! an aligned text table, CSV, and JSON. Each takes every parsed file at once,
//! so that several inputs end up in one table stream, one CSV sheet or one
//! JSON document.

use crate::config::Program;
use crate::settings::OutputFormat;
use crate::states::ExcitedStates;
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

/// Header row written by [`format_csv`].
pub const CSV_HEADER: [&str; 4] = ["file", "state", "energy_cm-1", "oscillator_strength"];

/// Errors raised while rendering excited-state data.
#[derive(Error, Debug)]
pub enum OutputError {
    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// CSV writing failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// Flushing the CSV buffer failed
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// One parsed output file, as handed to the renderers.
#[derive(Debug, Clone, Copy)]
pub struct FileStates<'a> {
    /// Path of the output file as given by the user
    pub file: &'a str,
    /// Program that wrote the file
    pub program: Option<Program>,
    /// Excited states in file order
    pub states: &'a ExcitedStates,
}

/// One excited state as written to JSON.
#[derive(Debug, Clone, Serialize)]
pub struct StickRecord {
    /// 1-based excited state number
    pub state: usize,
    /// Excitation energy in cm⁻¹
    pub energy_cm: f64,
    /// Oscillator strength
    pub oscillator_strength: f64,
}

/// All excited states of one output file as written to JSON.
#[derive(Debug, Clone, Serialize)]
pub struct LogfileRecord<'a> {
    /// Path of the output file
    pub file: &'a str,
    /// Program that wrote the file
    pub program: Option<Program>,
    /// Excited states in file order
    pub states: Vec<StickRecord>,
}

fn sticks(states: &ExcitedStates) -> Vec<StickRecord> {
    states
        .iter()
        .enumerate()
        .map(|(i, (energy_cm, oscillator_strength))| StickRecord {
            state: i + 1,
            energy_cm,
            oscillator_strength,
        })
        .collect()
}

/// Renders an aligned text table headed by `name`.
///
/// # Examples
///
/// ```
/// use uvspec::io::format_table;
/// use uvspec::states::ExcitedStates;
///
/// let states = ExcitedStates::new(vec![41_234.5], vec![0.0123]).unwrap();
/// let table = format_table("benzene.log", &states, 4);
/// assert!(table.contains("41234.50"));
/// assert!(table.contains("0.0123"));
/// ```
pub fn format_table(name: &str, states: &ExcitedStates, precision: usize) -> String {
    let mut content = format!("# {}\n", name);
    content.push_str(&format!(
        "{:>6}  {:>14}  {:>20}\n",
        "State", "Energy (cm-1)", "Oscillator strength"
    ));
    for (i, (energy, strength)) in states.iter().enumerate() {
        content.push_str(&format!(
            "{:>6}  {:>14.2}  {:>20.prec$}\n",
            i + 1,
            energy,
            strength,
            prec = precision
        ));
    }
    content
}

/// Renders one CSV sheet with a single [`CSV_HEADER`] row; the `file` column
/// tells the inputs apart.
pub fn format_csv(files: &[FileStates<'_>], precision: usize) -> Result<String, OutputError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for entry in files {
        for (i, (energy, strength)) in entry.states.iter().enumerate() {
            writer.write_record([
                entry.file.to_string(),
                (i + 1).to_string(),
                format!("{:.4}", energy),
                format!("{:.prec$}", strength, prec = precision),
            ])?;
        }
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Renders a list of files as pretty-printed JSON.
pub fn format_json(records: &[LogfileRecord<'_>]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(records)
}

/// Builds the JSON record for one file.
pub fn record<'a>(file: &'a str, program: Option<Program>, states: &ExcitedStates) -> LogfileRecord<'a> {
    LogfileRecord {
        file,
        program,
        states: sticks(states),
    }
}

/// Renders every file in the requested `format`.
///
/// Tables are written one block per file separated by a blank line, CSV as
/// one sheet, JSON as one array with a record per file.
pub fn render(
    format: OutputFormat,
    files: &[FileStates<'_>],
    precision: usize,
) -> Result<String, OutputError> {
    match format {
        OutputFormat::Table => Ok(files
            .iter()
            .map(|entry| format_table(entry.file, entry.states, precision))
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Csv => format_csv(files, precision),
        OutputFormat::Json => {
            let records: Vec<LogfileRecord<'_>> = files
                .iter()
                .map(|entry| record(entry.file, entry.program, entry.states))
                .collect();
            Ok(format_json(&records)?)
        }
    }
}

/// Writes `content` to `path`, or to standard output when `path` is `None`.
pub fn write_output(content: &str, path: Option<&Path>) -> io::Result<()> {
    match path {
        Some(path) => fs::write(path, content),
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(content.as_bytes())?;
            if !content.ends_with('\n') {
                handle.write_all(b"\n")?;
            }
            handle.flush()
        }
    }
}
