//! uvspec Command-Line Interface
//!
//! Reads excited-state energies and oscillator strengths from quantum chemistry
//! output files and prints them as a table, CSV or JSON.
//!
//! # Usage
//!
//! ```bash
//! # Print the excited states of one calculation
//! uvspec benzene_td.log
//!
//! # Several files into one JSON document
//! uvspec --format json --output sticks.json a.log b.out
//!
//! # Create a settings template
//! uvspec ci uvspec_config.cfg
//! ```
//!
//! Any error (missing file, unrecognised format, missing parser backend) is
//! reported once on stderr and the program exits with status 1.

use log::{error, info, warn};
use std::env;
use std::path::{Path, PathBuf};
use std::process;
use uvspec::config::check_backends;
use uvspec::io::{self, FileStates};
use uvspec::logfile::Logfile;
use uvspec::settings::{OutputFormat, SettingsManager, CONFIG_FILE_NAME};

/// Options collected from the command line.
#[derive(Debug, Default)]
struct CliOptions {
    format: Option<OutputFormat>,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    files: Vec<PathBuf>,
}

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage(program_name(&args));
        process::exit(1);
    }

    check_help_flags(&args);

    if args[1] == "ci" {
        run_ci(&args);
        return;
    }

    let options = match parse_args(&args[1..]) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage(program_name(&args));
            process::exit(1);
        }
    };

    let settings = match load_settings(options.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    env_logger::Builder::new()
        .filter_level(settings.log_level())
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp_millis()
        .init();
    info!("Configuration loaded from: {}", settings.config_source());
    for skipped in settings.skipped() {
        warn!("{}", skipped);
    }

    match check_backends() {
        Ok(programs) => {
            let names: Vec<&str> = programs.iter().map(|p| p.name()).collect();
            info!("Output parsers available: {}", names.join(", "));
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }

    if let Err(e) = run(&options, &settings) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Name the binary was invoked as, for usage text.
fn program_name(args: &[String]) -> &str {
    args.first().map(String::as_str).unwrap_or("uvspec")
}

/// Parses options and file arguments (everything after the program name).
fn parse_args(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-f" | "--format" => {
                let value = iter
                    .next()
                    .ok_or_else(|| format!("Missing value for {}", arg))?;
                options.format = Some(value.parse().map_err(|e| format!("{}", e))?);
            }
            "-o" | "--output" => {
                let value = iter
                    .next()
                    .ok_or_else(|| format!("Missing value for {}", arg))?;
                options.output = Some(PathBuf::from(value));
            }
            "-c" | "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| format!("Missing value for {}", arg))?;
                options.config = Some(PathBuf::from(value));
            }
            other if other.starts_with('-') => {
                return Err(format!("Unknown option: {}", other));
            }
            file => options.files.push(PathBuf::from(file)),
        }
    }

    if options.files.is_empty() {
        return Err("No output files given".to_string());
    }
    Ok(options)
}

fn load_settings(config: Option<&Path>) -> Result<SettingsManager, Box<dyn std::error::Error>> {
    match config {
        Some(path) => Ok(SettingsManager::load_file(path)?),
        None => Ok(SettingsManager::load()?),
    }
}

/// Parses every file, then renders and writes the combined output.
///
/// Files are parsed in order and the first failure stops the run.
fn run(options: &CliOptions, settings: &SettingsManager) -> Result<(), Box<dyn std::error::Error>> {
    let format = options.format.unwrap_or(settings.output().format);
    let precision = settings.output().precision;
    let parser_level = settings.parser_log_level();

    let mut logfiles = Vec::with_capacity(options.files.len());
    for path in &options.files {
        let mut logfile = Logfile::new(path);
        logfile.parse_with_log_level(parser_level)?;
        info!(
            "{}: {} excited states ({})",
            logfile,
            logfile.len(),
            logfile
                .program()
                .map(|p| p.name())
                .unwrap_or("unknown program")
        );
        logfiles.push(logfile);
    }

    let names: Vec<String> = logfiles
        .iter()
        .map(|l| l.path().map(|p| p.display().to_string()).unwrap_or_default())
        .collect();
    let states = logfiles
        .iter()
        .map(Logfile::excited_states)
        .collect::<Result<Vec<_>, _>>()?;
    let files: Vec<FileStates<'_>> = logfiles
        .iter()
        .zip(&names)
        .zip(&states)
        .map(|((logfile, name), states)| FileStates {
            file: name,
            program: logfile.program(),
            states,
        })
        .collect();

    let content = io::render(format, &files, precision)?;
    io::write_output(&content, options.output.as_deref())?;
    if let Some(path) = options.output.as_deref() {
        info!("Excited states written to {}", path.display());
    }
    Ok(())
}

/// Handles `uvspec ci uvspec_config.cfg`.
fn run_ci(args: &[String]) {
    match args.get(2).map(String::as_str) {
        Some(CONFIG_FILE_NAME) => match create_settings_template(Path::new(CONFIG_FILE_NAME)) {
            Ok(()) => {
                println!("✓ Settings template created successfully!");
                println!("  Output file: {}", CONFIG_FILE_NAME);
            }
            Err(e) => {
                eprintln!("Error creating settings template: {}", e);
                process::exit(1);
            }
        },
        _ => {
            eprintln!("Error: Missing file argument");
            eprintln!("Usage:");
            eprintln!(
                "  {} ci {}   - Create settings template",
                program_name(args),
                CONFIG_FILE_NAME
            );
            process::exit(1);
        }
    }
}

/// Writes the settings template to `settings_path`, never over an existing file.
fn create_settings_template(settings_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if settings_path.exists() {
        return Err(format!(
            "{} already exists. Please remove it first or choose a different location.",
            settings_path.display()
        )
        .into());
    }

    SettingsManager::create_template(settings_path)?;
    Ok(())
}

/// Check for help and version flags and print the matching text
fn check_help_flags(args: &[String]) {
    use uvspec::help::*;

    if args[1] == "--version" || args[1] == "-V" {
        println!("uvspec {}", env!("CARGO_PKG_VERSION"));
        process::exit(0);
    }

    if args.len() >= 3 && (args[1] == "--help" || args[1] == "-h") {
        match args[2].as_str() {
            "programs" => print_program_help(),
            "examples" => print_examples(),
            _ => print_global_help(),
        }
        process::exit(0);
    }

    if args.len() == 2 && (args[1] == "--help" || args[1] == "-h") {
        print_global_help();
        process::exit(0);
    }

    if args.len() >= 3 && args[1] == "ci" && (args[2] == "--help" || args[2] == "-h") {
        print_ci_help();
        process::exit(0);
    }
}

/// Prints usage information to stderr.
fn print_usage(program_name: &str) {
    eprintln!("uvspec - Excited-state energies and oscillator strengths from QM output files");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {} [OPTIONS] <logfile>...", program_name);
    eprintln!("                    Print the excited states of each output file");
    eprintln!();
    eprintln!("  {} ci {}", program_name, CONFIG_FILE_NAME);
    eprintln!("                    Create a settings template file for configuration");
    eprintln!();
    eprintln!("Supported programs: ADF, GAMESS, Gaussian, Jaguar, ORCA");
    eprintln!("Run '{} --help' for all options.", program_name);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_parse_args_options_and_files() {
        let options = parse_args(&args(&[
            "--format", "csv", "-o", "sticks.csv", "a.log", "-c", "my.cfg", "b.out",
        ]))
        .unwrap();
        assert_eq!(options.format, Some(OutputFormat::Csv));
        assert_eq!(options.output, Some(PathBuf::from("sticks.csv")));
        assert_eq!(options.config, Some(PathBuf::from("my.cfg")));
        assert_eq!(options.files, vec![PathBuf::from("a.log"), PathBuf::from("b.out")]);
    }

    #[test]
    fn test_parse_args_errors() {
        let err = parse_args(&args(&["--format", "xml", "a.log"])).unwrap_err();
        assert!(err.contains("Unknown output format"));

        let err = parse_args(&args(&["a.log", "--output"])).unwrap_err();
        assert_eq!(err, "Missing value for --output");

        let err = parse_args(&args(&["--verbose", "a.log"])).unwrap_err();
        assert_eq!(err, "Unknown option: --verbose");

        let err = parse_args(&args(&["-f", "json"])).unwrap_err();
        assert_eq!(err, "No output files given");
    }

    #[test]
    fn test_program_name_without_argv() {
        assert_eq!(program_name(&[]), "uvspec");
        assert_eq!(program_name(&args(&["/usr/bin/uvspec"])), "/usr/bin/uvspec");
    }

    #[test]
    fn test_settings_template_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        create_settings_template(&path).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("[output]"));

        fs::write(&path, "[logging]\nlevel = trace\n").unwrap();
        let err = create_settings_template(&path).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "[logging]\nlevel = trace\n");
    }
}
