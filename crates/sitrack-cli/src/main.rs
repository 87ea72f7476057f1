mod commands;
mod logging;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use sitrack_core::reference::DEFAULT_REFERENCE_PATH;

#[derive(Parser)]
#[command(
    name = "sitrack",
    version,
    about = "Child growth spreadsheet checker: reads posyandu measurement sheets and flags growth issues"
)]
struct Cli {
    /// Growth reference table (semicolon-delimited CSV)
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        env = "SITRACK_REFERENCE_TABLE",
        default_value = DEFAULT_REFERENCE_PATH
    )]
    reference: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that a workbook follows the supported template
    Check {
        /// Path to the .xlsx or .xls workbook
        input_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Show which sheet layout a workbook uses
    Detect {
        /// Path to the .xlsx or .xls workbook
        input_file: PathBuf,
    },
    /// Extract and assess every child in a workbook
    Parse {
        /// Path to the .xlsx or .xls workbook
        input_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write the JSON result to a file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// Reject workbooks that fail the template check
        #[arg(long)]
        strict: bool,
    },
    /// List every measurement with an OK / WARNING / DANGER verdict
    Review {
        /// Path to the .xlsx or .xls workbook
        input_file: PathBuf,

        /// Also write the review rows to a CSV file
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,
    },
    /// Show the growth reference table, or one entry of it
    Reference {
        /// Age in months (0-59)
        #[arg(long, requires = "gender")]
        age: Option<i32>,

        /// Gender tag: L or P
        #[arg(long, requires = "age")]
        gender: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(&logging::LogConfig::from_verbosity(cli.verbose));

    let reference = cli.reference;
    let result = match cli.command {
        Commands::Check { input_file, output } => commands::check::run(&input_file, &output),
        Commands::Detect { input_file } => commands::detect::run(&input_file),
        Commands::Parse {
            input_file,
            output,
            out,
            strict,
        } => commands::parse::run(&input_file, &reference, &output, out, strict),
        Commands::Review { input_file, csv } => {
            commands::review::run(&input_file, &reference, csv)
        }
        Commands::Reference { age, gender } => {
            commands::reference::run(&reference, age, gender.as_deref())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
