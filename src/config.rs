//! Supported quantum chemistry programs and unit constants.
//!
//! This module defines:
//!
//! - [`Program`]: the electronic-structure packages whose output files can be read
//! - Signature strings used to recognise each program's output
//! - The backend capability check ([`check_backends`]) run at startup
//! - Energy conversion constants into wavenumbers (cm⁻¹)
//!
//! Every program parser is a *backend* that can be switched off at compile time
//! through its Cargo feature (`adf`, `gamess`, `gaussian`, `jaguar`, `orca`).
//! All backends are enabled by default.

use crate::settings::ConfigError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit conversion constant: electronvolt to wavenumber (cm⁻¹)
pub const EV_TO_WAVENUMBER: f64 = 8065.543_937;
/// Unit conversion constant: hartree to wavenumber (cm⁻¹)
pub const HARTREE_TO_WAVENUMBER: f64 = 219_474.631_363;

/// Electronic-structure package that produced an output file.
///
/// | Program | Excited-state source |
/// |---------|----------------------|
/// | `Adf` | Davidson summary of excitation energies |
/// | `Gamess` | TDDFT results summary table |
/// | `Gaussian` | `Excited State` lines (G03, G09, G16) |
/// | `Jaguar` | CIS/TDDFT excitation energy listing |
/// | `Orca` | Absorption spectrum via transition electric dipoles |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Program {
    /// Amsterdam Density Functional
    Adf,
    /// GAMESS (US)
    Gamess,
    /// Gaussian 03, 09 and 16
    Gaussian,
    /// Schrödinger Jaguar
    Jaguar,
    /// ORCA
    Orca,
}

impl Program {
    /// All programs, in detection priority order.
    pub const ALL: [Program; 5] = [
        Program::Gaussian,
        Program::Gamess,
        Program::Adf,
        Program::Jaguar,
        Program::Orca,
    ];

    /// Human-readable program name.
    pub fn name(self) -> &'static str {
        match self {
            Program::Adf => "ADF",
            Program::Gamess => "GAMESS",
            Program::Gaussian => "Gaussian",
            Program::Jaguar => "Jaguar",
            Program::Orca => "ORCA",
        }
    }

    /// Cargo feature that compiles in this program's parser.
    pub fn feature(self) -> &'static str {
        match self {
            Program::Adf => "adf",
            Program::Gamess => "gamess",
            Program::Gaussian => "gaussian",
            Program::Jaguar => "jaguar",
            Program::Orca => "orca",
        }
    }

    /// Substrings whose presence on any line identifies the program.
    pub fn signatures(self) -> &'static [&'static str] {
        match self {
            Program::Adf => &["Amsterdam Density Functional"],
            Program::Gamess => &["GAMESS VERSION"],
            Program::Gaussian => &["Gaussian, Inc.", "This is part of the Gaussian"],
            Program::Jaguar => &["Jaguar version"],
            Program::Orca => &["O   R   C   A"],
        }
    }

    /// Returns true when `line` carries one of this program's signatures.
    pub fn matches(self, line: &str) -> bool {
        self.signatures().iter().any(|sig| line.contains(sig))
    }

    /// Returns true when this program's backend was compiled in.
    pub fn is_enabled(self) -> bool {
        match self {
            Program::Adf => cfg!(feature = "adf"),
            Program::Gamess => cfg!(feature = "gamess"),
            Program::Gaussian => cfg!(feature = "gaussian"),
            Program::Jaguar => cfg!(feature = "jaguar"),
            Program::Orca => cfg!(feature = "orca"),
        }
    }

    /// Message explaining how to enable a disabled backend.
    ///
    /// Each program gets its own message so a missing backend is never
    /// confused with another.
    pub fn missing_backend_message(self) -> String {
        format!(
            "The {} output parser is required but was not compiled in\n         \
             rebuild with `--features {}` to enable it",
            self.name(),
            self.feature()
        )
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Program {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "adf" => Ok(Program::Adf),
            "gamess" | "gamess-us" => Ok(Program::Gamess),
            "gaussian" | "g03" | "g09" | "g16" => Ok(Program::Gaussian),
            "jaguar" => Ok(Program::Jaguar),
            "orca" => Ok(Program::Orca),
            other => Err(format!("Unknown program: {}", other)),
        }
    }
}

/// Checks which program backends are available.
///
/// Returns the enabled programs in detection order, or
/// [`ConfigError::NoBackends`] if the crate was built without any of them.
pub fn check_backends() -> Result<Vec<Program>, ConfigError> {
    let enabled: Vec<Program> = Program::ALL
        .iter()
        .copied()
        .filter(|p| p.is_enabled())
        .collect();

    for program in Program::ALL.iter().filter(|p| !p.is_enabled()) {
        debug!("{} backend disabled (feature `{}`)", program, program.feature());
    }

    if enabled.is_empty() {
        return Err(ConfigError::NoBackends);
    }
    Ok(enabled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_matching() {
        assert!(Program::Gaussian.matches(" Copyright (c) 1988-2019, Gaussian, Inc.  All Rights Reserved."));
        assert!(Program::Orca.matches("                                 * O   R   C   A *"));
        assert!(Program::Adf.matches(" *                    Amsterdam Density Functional  (ADF)    2019 *"));
        assert!(!Program::Jaguar.matches(" Entering Gaussian System, Link 0=g16"));
    }

    #[test]
    fn test_missing_backend_messages_are_distinct() {
        let messages: Vec<String> = Program::ALL
            .iter()
            .map(|p| p.missing_backend_message())
            .collect();
        for (i, a) in messages.iter().enumerate() {
            for b in messages.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
        assert!(Program::Jaguar.missing_backend_message().contains("--features jaguar"));
    }

    #[test]
    fn test_program_from_str() {
        assert_eq!("g09".parse::<Program>().unwrap(), Program::Gaussian);
        assert_eq!("ORCA".parse::<Program>().unwrap(), Program::Orca);
        assert!("turbomole".parse::<Program>().is_err());
    }

    #[test]
    fn test_default_backends_enabled() {
        let enabled = check_backends().unwrap();
        assert_eq!(enabled.len(), Program::ALL.len());
    }

    #[test]
    fn test_wavenumber_constants() {
        assert!((EV_TO_WAVENUMBER - HARTREE_TO_WAVENUMBER / 27.211_386).abs() < 0.1);
    }
}
