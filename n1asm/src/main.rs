use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::prelude::*;

use n1asm::{Config, Loader, Module};

/// Assembler front end for the N1: loads a program and every module it includes.
#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
struct Cli {
    /// Root module of the program.
    input: PathBuf,

    /// Standard library directory.
    #[clap(long)]
    stdlib: Option<PathBuf>,
}

fn init_tracing() -> Result<(), String> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info"))
        .map_err(|e| format!("failed to initialise tracing filter: {e}"))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    Ok(())
}

fn summary(module: &Module) -> String {
    let mut out = format!("{}\n", module.path.display());
    let counts = [
        ("includes", module.includes.len()),
        ("exports", module.exports.len()),
        ("constants", module.constants.len()),
        ("variables", module.variables.len()),
        ("resources", module.resources.len()),
        ("macros", module.macros.len()),
        ("labels", module.labels.len()),
        ("instructions", module.instructions.len()),
    ];
    for (name, count) in counts.iter().filter(|(_, count)| *count > 0) {
        out.push_str(&format!("    {name:<13}{count}\n"));
    }
    for path in &module.include_paths {
        out.push_str(&format!("    -> {}\n", path.display()));
    }
    out
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_tracing() {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    let config = match cli.stdlib {
        Some(stdlib) => Config::with_stdlib(stdlib),
        None => Config::default(),
    };
    let mut loader = Loader::new(config);
    match loader.load(&cli.input) {
        Ok(root) => {
            tracing::info!(root = %root.display(), modules = loader.len(), "program loaded");
            for module in loader.modules() {
                print!("{}", summary(module));
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e.report());
            ExitCode::FAILURE
        }
    }
}
