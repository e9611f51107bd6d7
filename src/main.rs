//! Superscalar Pipeline Simulator CLI.
//!
//! The main executable for the simulator. It handles command-line argument
//! parsing, configuration, program loading, and the main simulation loop.
//!
//! # Usage
//!
//! ```text
//! superscalar-sim --program prog.asm [--config configs/default.toml]
//!                 [--lanes N] [--predictor Bimodal] [--break-at CYCLE]...
//!                 [--stats-json stats.json] [--dump]
//! ```

use clap::Parser;
use std::{fs, process};
use tracing_subscriber::EnvFilter;

use superscalar_sim::common::SimResult;
use superscalar_sim::config::{BranchPredictor, Config};
use superscalar_sim::core::{Cpu, RunState};
use superscalar_sim::sim::{build_cpu, Program};

/// Command-line arguments for the superscalar simulator.
#[derive(Parser, Debug)]
#[command(author, version, about = "Cycle-Accurate Superscalar Pipeline Simulator")]
struct Args {
    /// Assembly program to run.
    #[arg(short, long)]
    program: String,

    /// TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<String>,

    /// Override `pipeline.lanes`.
    #[arg(long)]
    lanes: Option<usize>,

    /// Override `pipeline.branch_predictor` (static, btfn, bimodal).
    #[arg(long)]
    predictor: Option<BranchPredictor>,

    /// Pause before this cycle and print the core state. Repeatable.
    #[arg(long = "break-at")]
    break_at: Vec<u64>,

    /// Write statistics as JSON to this path.
    #[arg(long)]
    stats_json: Option<String>,

    /// Print the final register file and memory.
    #[arg(long)]
    dump: bool,
}

/// Main entry point for the superscalar simulator.
///
/// # Behavior
///
/// 1. **Configuration**: Parses arguments, loads the TOML configuration, and
///    applies command-line overrides.
/// 2. **Logging**: Installs a `tracing` subscriber (trace level when
///    `general.trace_instructions` is set; `RUST_LOG` overrides).
/// 3. **Loader**: Parses the program and places it at address 0.
/// 4. **Simulation Loop**: Runs the core, printing a state snapshot at each
///    breakpoint, until it halts or a fatal error occurs.
/// 5. **Teardown**: Prints statistics and optional dumps.
fn main() {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("\n[!] FATAL: {}", e);
        process::exit(1);
    });
    init_tracing(&config);

    let mut cpu = Program::from_file(&args.program)
        .and_then(|program| build_cpu(&program, &config))
        .unwrap_or_else(|e| {
            eprintln!("\n[!] FATAL: {}", e);
            process::exit(1);
        });

    println!("Global Configuration");
    println!("--------------------");
    println!("  Program:            {}", args.program);
    println!("  Lanes:              {}", config.pipeline.lanes);
    println!("  Write-back Width:   {}", config.pipeline.writeback_width);
    println!(
        "  Branch Predictor:   {:?}",
        config.pipeline.branch_predictor
    );
    if config.pipeline.branch_predictor == BranchPredictor::Bimodal {
        println!(
            "  Bimodal Table:      {} x {}-bit",
            config.pipeline.bimodal.table_size, config.pipeline.bimodal.counter_bits
        );
    }
    println!("  Memory:             {} bytes", config.memory.size_bytes);
    println!("  Max Cycles:         {}", config.general.max_cycles);
    println!("--------------------");

    for &cycle in &args.break_at {
        cpu.add_breakpoint(cycle);
    }

    loop {
        match cpu.run() {
            Ok(RunState::Paused(cycle)) => {
                println!("\n[*] Breakpoint before cycle {}", cycle);
                println!("{}", cpu.dump_state(false));
            }
            Ok(RunState::Halted) => break,
            Err(e) => {
                eprintln!("\n[!] FATAL: {}", e);
                eprintln!("{}", cpu.dump_state(false));
                cpu.stats.print();
                process::exit(1);
            }
        }
    }

    println!("\n[*] Halted after {} cycles", cpu.stats.cycles);
    cpu.stats.print();

    if args.dump {
        dump(&cpu);
    }

    if let Some(path) = &args.stats_json {
        if let Err(e) = write_stats(&cpu, path) {
            eprintln!("[!] Could not write statistics to '{}': {}", path, e);
            process::exit(1);
        }
    }
}

fn load_config(args: &Args) -> SimResult<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_toml(&fs::read_to_string(path)?)?,
        None => Config::default(),
    };
    if let Some(lanes) = args.lanes {
        config.pipeline.lanes = lanes;
    }
    if let Some(predictor) = args.predictor {
        config.pipeline.branch_predictor = predictor;
    }
    config.validate()?;
    Ok(config)
}

fn init_tracing(config: &Config) {
    let default_level = if config.general.trace_instructions || cfg!(feature = "always-trace") {
        "trace"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn dump(cpu: &Cpu) {
    println!("\nREGISTERS");
    println!("----------------------------------------------------------");
    print!("{}", cpu.regs().dump(false));
    println!("\nMEMORY");
    println!("----------------------------------------------------------");
    print!("{}", cpu.memory().dump());
}

fn write_stats(cpu: &Cpu, path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(cpu.stats())?;
    fs::write(path, json)?;
    Ok(())
}
