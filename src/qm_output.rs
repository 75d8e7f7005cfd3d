//! Quantum chemistry output file parsing for excited-state data.
//!
//! This module reads the text output of electronic-structure programs and
//! extracts the excitation energies and oscillator strengths of CIS, TD-HF and
//! TD-DFT calculations. It provides:
//!
//! - Format detection ([`detect_program`]) from signature lines in the file
//! - A factory ([`open`]) returning an [`OutputFile`] bound to the detected parser
//! - One [`ExcitedStateParser`] implementation per supported program
//!
//! # Supported Programs
//!
//! - **Gaussian** (03/09/16): `Excited State n:` lines, energies in eV
//! - **GAMESS**: `SUMMARY OF TDDFT RESULTS` table, energies in eV
//! - **ADF**: Davidson summary, one table per irreducible representation
//! - **Jaguar**: `Excitation energy` / `Oscillator strength` listings
//! - **ORCA**: absorption spectrum via transition electric dipole moments
//!
//! All energies are returned in wavenumbers (cm⁻¹). When a file holds several
//! excited-state blocks (optimisations, restarted jobs) the last complete block
//! is returned.
//!
//! # Usage Pattern
//!
//! ```no_run
//! use uvspec::qm_output;
//! use log::LevelFilter;
//! use std::path::Path;
//!
//! let mut output = qm_output::open(Path::new("benzene_td.log"))?;
//! output.set_log_level(LevelFilter::Error);
//! let states = output.parse()?;
//! println!("{} excited states from {}", states.len(), output.program());
//! # Ok::<(), uvspec::qm_output::ParseError>(())
//! ```
//!
//! # Diagnostics
//!
//! Parsers report recoverable oddities (skipped rows, renumbered states) through
//! the `log` facade. The threshold is stored on each [`OutputFile`], so quieting
//! one parser never changes the logging of anything else in the process.

use crate::config::{Program, EV_TO_WAVENUMBER};
use crate::states::ExcitedStates;
use lazy_static::lazy_static;
use log::{Level, LevelFilter};
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for output parsing operations.
#[derive(Error, Debug)]
pub enum ParseError {
    /// File system or I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// No supported program signature was found in the file
    #[error("Could not determine the program that wrote {}", .0.display())]
    UnknownFormat(PathBuf),
    /// The program was recognised but its parser is not compiled in
    #[error("{}", .0.missing_backend_message())]
    BackendDisabled(Program),
    /// The file contains no excited-state block
    #[error("No excited states found in {program} output file {}", .path.display())]
    NoExcitedStates {
        /// Program that wrote the file
        program: Program,
        /// Path of the output file
        path: PathBuf,
    },
    /// Energies and oscillator strengths could not be paired up
    #[error("Inconsistent excited state data: {0}")]
    Inconsistent(String),
    /// A line inside an excited-state block could not be interpreted
    #[error("Parse error: {0}")]
    Malformed(String),
}

/// Type alias for parsing results
pub type Result<T> = std::result::Result<T, ParseError>;

/// Raw energies (cm⁻¹) and oscillator strengths collected by a parser.
pub type RawStates = (Vec<f64>, Vec<f64>);

lazy_static! {
    // Robust floating-point regex: handles 1.23, -0.032, 0.2436E-01, .123, etc.
    static ref FLOAT_RE: String = r"[-+]?(?:\d+\.\d*|\.\d+)(?:[eEdD][-+]?\d+)?".to_string();

    // Gaussian: " Excited State   1:      Singlet-B2     7.1393 eV  173.66 nm  f=0.0324  <S**2>=0.000"
    static ref GAUSSIAN_STATE_RE: Regex = Regex::new(&format!(
        r"^\s*Excited\s+State\s+(\d+)\s*:\s*.*?({0})\s+eV\s+({0})\s+nm\s+f=\s*({0})",
        *FLOAT_RE
    )).unwrap();

    // GAMESS: "    1  B2         -76.0901735183      7.860    0.0000    0.0000    0.2950    0.0167"
    static ref GAMESS_ROW_RE: Regex = Regex::new(&format!(
        r"^\s*(\d+)\s+\S+\s+({0})\s+({0})\s+({0})\s+({0})\s+({0})\s+({0})\s*$",
        *FLOAT_RE
    )).unwrap();

    // GAMESS row without transition dipole (ground state or spin-forbidden)
    static ref GAMESS_SHORT_ROW_RE: Regex = Regex::new(&format!(
        r"^\s*(\d+)\s+\S+\s+({0})\s+({0})\s*$",
        *FLOAT_RE
    )).unwrap();

    // ADF: "       1 0.35540        9.6709    0.2436E-01  0.14E-08"
    static ref ADF_ROW_RE: Regex = Regex::new(&format!(
        r"^\s*(\d+)\s+({0})\s+({0})\s+({0})",
        *FLOAT_RE
    )).unwrap();

    // Jaguar: "  Excitation energy    1:    5.123456 eV"
    static ref JAGUAR_ENERGY_RE: Regex = Regex::new(&format!(
        r"^\s*Excitation\s+energy\s+(\d+)\s*:\s*({0})\s+eV",
        *FLOAT_RE
    )).unwrap();

    // Jaguar: "  Oscillator strength for excited state    1:   0.012345"
    static ref JAGUAR_OSC_RE: Regex = Regex::new(&format!(
        r"^\s*Oscillator\s+strength\s+for\s+excited\s+state\s+(\d+)\s*:\s*({0})",
        *FLOAT_RE
    )).unwrap();

    // ORCA <= 5: "   2   45218.4    221.1   0.000765094   0.00557   0.00000  -0.07461   0.00000"
    static ref ORCA_ROW_RE: Regex = Regex::new(&format!(
        r"^\s*(\d+)\s+({0})\s+({0})\s+({0})",
        *FLOAT_RE
    )).unwrap();

    // ORCA 6: "  0-1A  ->  1-1A    4.438502   35798.6   279.3   0.000000000 ..."
    static ref ORCA6_ROW_RE: Regex = Regex::new(&format!(
        r"^\s*\d+-\S+\s+->\s+(\d+)-\S+\s+({0})\s+({0})\s+({0})\s+({0})",
        *FLOAT_RE
    )).unwrap();
}

/// Parses a Fortran-style float, accepting `D` exponents.
fn parse_float(token: &str) -> Result<f64> {
    token
        .replace(|c: char| c == 'D' || c == 'd', "E")
        .parse::<f64>()
        .map_err(|_| ParseError::Malformed(format!("Invalid number: {}", token)))
}

/// Parses a state index captured by one of the row regexes.
fn parse_index(token: &str) -> Result<usize> {
    token
        .parse::<usize>()
        .map_err(|_| ParseError::Malformed(format!("Invalid state number: {}", token)))
}

/// Scoped diagnostic sink handed to parsers.
///
/// Messages below the configured threshold are discarded before they reach
/// the global logger.
pub struct Diagnostics<'a> {
    program: Program,
    path: &'a Path,
    level: LevelFilter,
}

impl<'a> Diagnostics<'a> {
    /// Creates a sink for `program` parsing `path`, passing messages up to `level`.
    pub fn new(program: Program, path: &'a Path, level: LevelFilter) -> Self {
        Self {
            program,
            path,
            level,
        }
    }

    fn emit(&self, level: Level, args: fmt::Arguments<'_>) {
        if level <= self.level {
            log::log!(
                target: "uvspec::qm_output",
                level,
                "[{} {}] {}",
                self.program,
                self.path.display(),
                args
            );
        }
    }

    /// Emits a debug-level message.
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Debug, args);
    }

    /// Emits an info-level message.
    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Info, args);
    }

    /// Emits a warning.
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Warn, args);
    }
}

/// Trait implemented by each program's excited-state parser.
///
/// A parser receives the whole file content and returns index-aligned
/// energies (cm⁻¹) and oscillator strengths. Returning empty vectors means the
/// file holds no excited-state block; [`OutputFile::parse`] turns that into
/// [`ParseError::NoExcitedStates`].
pub trait ExcitedStateParser {
    /// Program whose output this parser understands.
    fn program(&self) -> Program;

    /// Extracts excited-state data from the file content.
    fn extract(&self, content: &str, diag: &Diagnostics<'_>) -> Result<RawStates>;
}

/// Gaussian 03/09/16 excited-state parser.
///
/// Each `Excitation energies and oscillator strengths:` header starts a new
/// block; the energies are read in eV from the `Excited State` lines.
pub struct GaussianParser;

impl ExcitedStateParser for GaussianParser {
    fn program(&self) -> Program {
        Program::Gaussian
    }

    fn extract(&self, content: &str, diag: &Diagnostics<'_>) -> Result<RawStates> {
        let mut energies = Vec::new();
        let mut strengths = Vec::new();
        let mut blocks = 0usize;

        for line in content.lines() {
            if line.contains("Excitation energies and oscillator strengths:") {
                blocks += 1;
                energies.clear();
                strengths.clear();
            } else if let Some(caps) = GAUSSIAN_STATE_RE.captures(line) {
                let index = parse_index(&caps[1])?;
                if index != energies.len() + 1 {
                    diag.warn(format_args!(
                        "Excited State {} follows state {}",
                        index,
                        energies.len()
                    ));
                }
                energies.push(parse_float(&caps[2])? * EV_TO_WAVENUMBER);
                strengths.push(parse_float(&caps[4])?);
            }
        }

        if blocks > 1 {
            diag.info(format_args!("{} excited-state blocks, keeping the last", blocks));
        }
        Ok((energies, strengths))
    }
}

/// GAMESS (US) TD-DFT parser.
///
/// Reads the `SUMMARY OF TDDFT RESULTS` table. The ground state (state 0) is
/// skipped; rows without a transition dipole are spin-forbidden and get a zero
/// oscillator strength.
pub struct GamessParser;

impl ExcitedStateParser for GamessParser {
    fn program(&self) -> Program {
        Program::Gamess
    }

    fn extract(&self, content: &str, diag: &Diagnostics<'_>) -> Result<RawStates> {
        let mut energies = Vec::new();
        let mut strengths = Vec::new();
        let mut in_summary = false;
        let mut seen_rows = false;

        for line in content.lines() {
            if line.contains("SUMMARY OF TDDFT RESULTS") {
                in_summary = true;
                seen_rows = false;
                energies.clear();
                strengths.clear();
                continue;
            }
            if !in_summary {
                continue;
            }

            if let Some(caps) = GAMESS_ROW_RE.captures(line) {
                seen_rows = true;
                if parse_index(&caps[1])? == 0 {
                    continue;
                }
                energies.push(parse_float(&caps[3])? * EV_TO_WAVENUMBER);
                strengths.push(parse_float(&caps[7])?);
            } else if let Some(caps) = GAMESS_SHORT_ROW_RE.captures(line) {
                seen_rows = true;
                let index = parse_index(&caps[1])?;
                if index == 0 {
                    continue;
                }
                diag.debug(format_args!(
                    "State {} has no transition dipole, oscillator strength set to zero",
                    index
                ));
                energies.push(parse_float(&caps[3])? * EV_TO_WAVENUMBER);
                strengths.push(0.0);
            } else if seen_rows && line.trim().is_empty() {
                in_summary = false;
            }
        }

        Ok((energies, strengths))
    }
}

/// Progress through an ADF Davidson summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdfStage {
    Outside,
    Preamble,
    Table,
    AfterTable,
}

/// ADF TD-DFT parser.
///
/// The `Final excitation energies from Davidson algorithm` section lists one
/// table per symmetry. States from all symmetries are merged and returned in
/// order of increasing energy.
pub struct AdfParser;

impl ExcitedStateParser for AdfParser {
    fn program(&self) -> Program {
        Program::Adf
    }

    fn extract(&self, content: &str, diag: &Diagnostics<'_>) -> Result<RawStates> {
        let mut pairs: Vec<(f64, f64)> = Vec::new();
        let mut stage = AdfStage::Outside;
        let mut table_rows = 0usize;

        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.contains("Final excitation energies from Davidson algorithm") {
                stage = AdfStage::Preamble;
                pairs.clear();
                continue;
            }

            match stage {
                AdfStage::Outside => {}
                AdfStage::Preamble => {
                    if trimmed.starts_with("no.") {
                        stage = AdfStage::Table;
                        table_rows = 0;
                    }
                }
                AdfStage::Table => {
                    if trimmed.starts_with("---") {
                        continue;
                    }
                    if let Some(caps) = ADF_ROW_RE.captures(line) {
                        pairs.push((
                            parse_float(&caps[3])? * EV_TO_WAVENUMBER,
                            parse_float(&caps[4])?,
                        ));
                        table_rows += 1;
                    } else {
                        diag.debug(format_args!("Symmetry table closed after {} rows", table_rows));
                        stage = AdfStage::AfterTable;
                    }
                }
                AdfStage::AfterTable => {
                    if trimmed.is_empty() {
                        continue;
                    }
                    stage = if trimmed.starts_with("Symmetry") {
                        AdfStage::Preamble
                    } else {
                        AdfStage::Outside
                    };
                }
            }
        }

        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(pairs.into_iter().unzip())
    }
}

/// Jaguar CIS/TD-DFT parser.
///
/// Energies and oscillator strengths are printed in separate listings and
/// paired by state number. Seeing state 1 again starts a new block.
pub struct JaguarParser;

impl ExcitedStateParser for JaguarParser {
    fn program(&self) -> Program {
        Program::Jaguar
    }

    fn extract(&self, content: &str, _diag: &Diagnostics<'_>) -> Result<RawStates> {
        let mut states: BTreeMap<usize, (Option<f64>, Option<f64>)> = BTreeMap::new();

        for line in content.lines() {
            if let Some(caps) = JAGUAR_ENERGY_RE.captures(line) {
                let index = parse_index(&caps[1])?;
                if index == 1 {
                    states.clear();
                }
                states.entry(index).or_default().0 =
                    Some(parse_float(&caps[2])? * EV_TO_WAVENUMBER);
            } else if let Some(caps) = JAGUAR_OSC_RE.captures(line) {
                let index = parse_index(&caps[1])?;
                states.entry(index).or_default().1 = Some(parse_float(&caps[2])?);
            }
        }

        let mut energies = Vec::with_capacity(states.len());
        let mut strengths = Vec::with_capacity(states.len());
        for (index, (energy, strength)) in states {
            match (energy, strength) {
                (Some(e), Some(f)) => {
                    energies.push(e);
                    strengths.push(f);
                }
                (Some(_), None) => {
                    return Err(ParseError::Inconsistent(format!(
                        "excited state {} has an energy but no oscillator strength",
                        index
                    )))
                }
                (None, _) => {
                    return Err(ParseError::Inconsistent(format!(
                        "excited state {} has an oscillator strength but no energy",
                        index
                    )))
                }
            }
        }
        Ok((energies, strengths))
    }
}

/// ORCA TD-DFT/CIS parser.
///
/// Reads the absorption spectrum computed from transition electric dipole
/// moments, whose energies are already in cm⁻¹. Both the ORCA 4/5 layout and
/// the ORCA 6 `0-1A -> 1-1A` layout are understood.
pub struct OrcaParser;

impl ExcitedStateParser for OrcaParser {
    fn program(&self) -> Program {
        Program::Orca
    }

    fn extract(&self, content: &str, diag: &Diagnostics<'_>) -> Result<RawStates> {
        let mut energies = Vec::new();
        let mut strengths = Vec::new();
        let mut in_table = false;
        let mut seen_rows = false;

        for line in content.lines() {
            if line.contains("ABSORPTION SPECTRUM VIA TRANSITION ELECTRIC DIPOLE MOMENTS") {
                in_table = true;
                seen_rows = false;
                energies.clear();
                strengths.clear();
                continue;
            }
            if !in_table {
                continue;
            }

            if let Some(caps) = ORCA6_ROW_RE.captures(line) {
                seen_rows = true;
                energies.push(parse_float(&caps[3])?);
                strengths.push(parse_float(&caps[5])?);
            } else if let Some(caps) = ORCA_ROW_RE.captures(line) {
                seen_rows = true;
                energies.push(parse_float(&caps[2])?);
                strengths.push(parse_float(&caps[4])?);
            } else if seen_rows && line.trim().is_empty() {
                diag.debug(format_args!("Absorption table closed after {} rows", energies.len()));
                in_table = false;
            }
        }

        Ok((energies, strengths))
    }
}

/// Returns the parser for `program`.
pub fn parser_for(program: Program) -> Box<dyn ExcitedStateParser> {
    match program {
        Program::Adf => Box::new(AdfParser),
        Program::Gamess => Box::new(GamessParser),
        Program::Gaussian => Box::new(GaussianParser),
        Program::Jaguar => Box::new(JaguarParser),
        Program::Orca => Box::new(OrcaParser),
    }
}

/// Determines which program wrote the output file at `path`.
///
/// Lines are streamed until one carries a program signature, so large files
/// are not read in full. Non-UTF-8 bytes are tolerated.
pub fn detect_program(path: &Path) -> Result<Program> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        if let Some(program) = Program::ALL.iter().copied().find(|p| p.matches(&line)) {
            return Ok(program);
        }
    }

    Err(ParseError::UnknownFormat(path.to_path_buf()))
}

/// An output file bound to the parser for the program that wrote it.
pub struct OutputFile {
    path: PathBuf,
    log_level: LevelFilter,
    parser: Box<dyn ExcitedStateParser>,
}

impl OutputFile {
    /// Binds `path` to the parser for `program`, bypassing detection.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::BackendDisabled`] when the program's parser was
    /// not compiled in.
    pub fn with_program(path: &Path, program: Program) -> Result<Self> {
        if !program.is_enabled() {
            return Err(ParseError::BackendDisabled(program));
        }
        Ok(Self {
            path: path.to_path_buf(),
            log_level: LevelFilter::Warn,
            parser: parser_for(program),
        })
    }

    /// Program that wrote the file.
    pub fn program(&self) -> Program {
        self.parser.program()
    }

    /// Path of the bound output file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current diagnostic threshold of this parser.
    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    /// Sets the diagnostic threshold of this parser only.
    pub fn set_log_level(&mut self, level: LevelFilter) {
        self.log_level = level;
    }

    /// Reads the file and extracts its excited states.
    ///
    /// # Errors
    ///
    /// - [`ParseError::Io`] if the file cannot be read
    /// - [`ParseError::NoExcitedStates`] if no excited-state block is present
    /// - [`ParseError::Inconsistent`] / [`ParseError::Malformed`] for broken blocks
    pub fn parse(&self) -> Result<ExcitedStates> {
        let bytes = fs::read(&self.path)?;
        let content = String::from_utf8_lossy(&bytes);
        let diag = Diagnostics::new(self.program(), &self.path, self.log_level);

        let (energies, strengths) = self.parser.extract(&content, &diag)?;
        if energies.is_empty() && strengths.is_empty() {
            return Err(ParseError::NoExcitedStates {
                program: self.program(),
                path: self.path.clone(),
            });
        }

        let states = ExcitedStates::new(energies, strengths).map_err(ParseError::Inconsistent)?;
        diag.info(format_args!("Parsed {} excited states", states.len()));
        Ok(states)
    }
}

impl fmt::Debug for OutputFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputFile")
            .field("path", &self.path)
            .field("program", &self.program())
            .field("log_level", &self.log_level)
            .finish()
    }
}

/// Detects the program that wrote `path` and returns a bound parser.
///
/// # Errors
///
/// - [`ParseError::Io`] if the file cannot be opened
/// - [`ParseError::UnknownFormat`] if no program signature is found
/// - [`ParseError::BackendDisabled`] if the program's parser is not compiled in
pub fn open(path: &Path) -> Result<OutputFile> {
    let program = detect_program(path)?;
    OutputFile::with_program(path, program)
}
