#![deny(missing_docs)]

//! uvspec - Discrete UV-Vis spectra from quantum chemistry output files
//!
//! uvspec reads the output of CIS, TD-HF and TD-DFT calculations and extracts,
//! for every excited state, its excitation energy (in cm⁻¹) and oscillator
//! strength. These "stick" spectra are the input of UV-Vis spectrum synthesis
//! (broadening, plotting), which happens downstream.
//!
//! # Overview
//!
//! The entry point is [`Logfile`]: construct it with a path, call
//! [`Logfile::parse`], and read the two index-aligned sequences. The program
//! that wrote the file is detected from its content; all format-specific work
//! lives in [`qm_output`].
//!
//! # Quick Start
//!
//! ```no_run
//! use uvspec::Logfile;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut logfile = Logfile::new("benzene_td.log");
//!     logfile.parse()?;
//!
//!     println!("{}", logfile);
//!     for (energy, strength) in logfile.excited_states()?.iter() {
//!         println!("{:>10.1} cm-1  f = {:.4}", energy, strength);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Supported QM Programs
//!
//! | Program | Versions | Feature |
//! |---------|----------|---------|
//! | ADF | 2013+ | `adf` |
//! | GAMESS (US) | 2013+ | `gamess` |
//! | Gaussian | 03, 09, 16 | `gaussian` |
//! | Jaguar | 7+ | `jaguar` |
//! | ORCA | 4, 5, 6 | `orca` |
//!
//! All features are enabled by default. A file written by a program whose
//! feature is disabled is rejected with [`LogfileError::MissingBackend`].
//!
//! # Modules
//!
//! - [`logfile`](logfile/index.html) - The `Logfile` adapter and its errors
//! - [`qm_output`](qm_output/index.html) - Format detection and per-program parsers
//! - [`states`](states/index.html) - The `ExcitedStates` record
//! - [`config`](config/index.html) - Supported programs and unit constants
//! - [`settings`](settings/index.html) - INI configuration files
//! - [`io`](io/index.html) - Table, CSV and JSON rendering
//! - [`help`](help/index.html) - Built-in help system

pub mod config;
/// Built-in help system
pub mod help;
pub mod io;
pub mod logfile;
pub mod qm_output;
/// Configuration management system
pub mod settings;
pub mod states;

pub use logfile::{Logfile, LogfileError};
pub use states::ExcitedStates;
