use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use n1asm::isa::Register;
use tracing_subscriber::prelude::*;

use n1vm::{VmError, EXIT_CLEAN, EXIT_RUNNING, N1};

/// Emulator for the N1: runs a ROM image until it exits or faults.
#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
struct Cli {
    /// Raw ROM image, loaded at address 0.
    rom: PathBuf,

    /// Stop after this many instructions.
    #[clap(long)]
    max_steps: Option<u64>,
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

fn boot(cli: &Cli) -> Result<N1, VmError> {
    let image = std::fs::read(&cli.rom)?;
    let mut n1 = N1::new();
    n1.load_rom(&image)?;
    Ok(n1)
}

fn state(n1: &N1) -> String {
    let regs: Vec<String> = Register::ALL
        .iter()
        .map(|r| format!("{r}={:02x}", n1.reg(*r)))
        .collect();
    format!(
        "{}\npc={:04x} sp={:04x} mb={:02x} exit={}",
        regs.join(" "),
        n1.pc(),
        n1.sp(),
        n1.mb,
        n1.exit
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_tracing() {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }
    let mut n1 = match boot(&cli) {
        Ok(n1) => n1,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let exit = n1.run(cli.max_steps);
    println!("{}", state(&n1));
    if !n1.output.is_empty() {
        println!("output: {:02x?}", n1.output);
    }
    match (exit, n1.fault()) {
        (EXIT_RUNNING, _) => {
            tracing::info!("step limit reached");
            ExitCode::SUCCESS
        }
        (EXIT_CLEAN, _) => ExitCode::SUCCESS,
        (_, Some(fault)) => {
            tracing::error!(%fault, "machine faulted");
            ExitCode::from(exit as u8)
        }
        (code, None) => ExitCode::from(code as u8),
    }
}
