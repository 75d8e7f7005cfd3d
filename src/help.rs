//! Built-in help for the uvspec command line.

use crate::config::Program;

/// Information about a supported quantum chemistry program.
#[derive(Debug, Clone)]
pub struct ProgramInfo {
    /// Program the entry describes
    pub program: Program,
    /// Versions whose output has been checked
    pub versions: &'static str,
    /// Where in the output the excited states are read from
    pub source: &'static str,
    /// Route or input keywords that produce that section
    pub keywords: &'static str,
}

/// Program information
pub fn get_programs() -> &'static [ProgramInfo] {
    &[
        ProgramInfo {
            program: Program::Gaussian,
            versions: "G03, G09, G16",
            source: "'Excited State n:' lines after 'Excitation energies and oscillator strengths:'",
            keywords: "# TD(NStates=10) B3LYP/6-31G(d)   or   # CIS(NStates=10)",
        },
        ProgramInfo {
            program: Program::Gamess,
            versions: "GAMESS (US) 2013 and later",
            source: "'SUMMARY OF TDDFT RESULTS' table",
            keywords: "$CONTRL TDDFT=EXCITE $END  $TDDFT NSTATE=10 $END",
        },
        ProgramInfo {
            program: Program::Adf,
            versions: "ADF 2013 and later",
            source: "'Final excitation energies from Davidson algorithm', all symmetries",
            keywords: "EXCITATIONS / LOWEST 10 / END",
        },
        ProgramInfo {
            program: Program::Jaguar,
            versions: "Jaguar 7 and later",
            source: "'Excitation energy' and 'Oscillator strength for excited state' listings",
            keywords: "itddft=1 nroot=10",
        },
        ProgramInfo {
            program: Program::Orca,
            versions: "ORCA 4, 5, 6",
            source: "'ABSORPTION SPECTRUM VIA TRANSITION ELECTRIC DIPOLE MOMENTS' table",
            keywords: "%tddft nroots 10 end",
        },
    ]
}

/// Print global help
pub fn print_global_help() {
    println!("uvspec - Excited-state energies and oscillator strengths from QM output files");
    println!();
    println!("USAGE:");
    println!("    uvspec [OPTIONS] <logfile>...");
    println!("    uvspec ci uvspec_config.cfg");
    println!();
    println!("COMMANDS:");
    println!("    <logfile>...");
    println!("                        Parse each output file and print its excited states");
    println!("                        The program that wrote the file is detected automatically");
    println!();
    println!("    ci uvspec_config.cfg");
    println!("                        Create a configuration template file");
    println!();
    println!("OPTIONS:");
    println!("    -f, --format <fmt>   Output format: table, csv, json (default from settings)");
    println!("    -o, --output <file>  Write to a file instead of standard output");
    println!("    -c, --config <file>  Read settings from this file only");
    println!("    -V, --version        Print version information");
    println!("    -h, --help [topic]   Show help. Topics: programs, examples");
    println!();
    println!("CONFIGURATION FILE:");
    println!("    Supported locations:");
    println!("      - ./uvspec_config.cfg (local, highest priority)");
    println!("      - ~/.config/uvspec/uvspec_config.cfg (user)");
    println!("      - /etc/uvspec/uvspec_config.cfg (system)");
    println!();
    println!("UNITS:");
    println!("    Energies are reported in cm-1; oscillator strengths are dimensionless.");
    println!();
}

/// Print help for 'ci' command
pub fn print_ci_help() {
    println!("Create Settings Template (ci) Command");
    println!("═════════════════════════════════════");
    println!();
    println!("USAGE:");
    println!("    uvspec ci uvspec_config.cfg");
    println!();
    println!("DESCRIPTION:");
    println!("    Writes a commented uvspec_config.cfg with every setting at its");
    println!("    default value. An existing file is never overwritten.");
    println!();
}

/// Print the supported program table
pub fn print_program_help() {
    println!("SUPPORTED PROGRAMS");
    println!("═══════════════════════════════════════════════════════════════════════");
    println!();
    for info in get_programs() {
        let status = if info.program.is_enabled() {
            "enabled"
        } else {
            "disabled"
        };
        println!("{} ({}) [{}]", info.program, info.versions, status);
        println!("    Reads:    {}", info.source);
        println!("    Keywords: {}", info.keywords);
        if !info.program.is_enabled() {
            println!("    Enable:   cargo build --features {}", info.program.feature());
        }
        println!();
    }
}

/// Print usage examples
pub fn print_examples() {
    println!("EXAMPLES");
    println!("═══════════════════════════════════════════════════════════════════════");
    println!();
    println!("  Print the excited states of a Gaussian TD-DFT run:");
    println!("      uvspec benzene_td.log");
    println!();
    println!("  Collect several calculations into one JSON file:");
    println!("      uvspec --format json --output sticks.json *.log *.out");
    println!();
    println!("  CSV for a spreadsheet or a broadening script:");
    println!("      uvspec -f csv phenol.out > phenol_sticks.csv");
    println!();
    println!("  See parser diagnostics (also set [parser] log_level = debug):");
    println!("      RUST_LOG=uvspec=debug uvspec molecule.log");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_program_documented() {
        for program in Program::ALL {
            assert!(get_programs().iter().any(|info| info.program == program));
        }
    }
}
