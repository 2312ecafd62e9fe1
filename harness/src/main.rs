use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use eightbit_harness::image::load_image;
use eightbit_harness::registry::{self, CpuEntry};
use eightbit_harness::{RunConfig, RunLog, record, replay};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Record or replay instruction-by-instruction CPU run logs.
#[derive(Parser, Debug)]
#[command(name = "runlog", version)]
struct Cli {
    /// CPU to run (6800, 6502, z80, 6809)
    #[arg(short, long, default_value = registry::DEFAULT_CPU)]
    cpu: String,

    /// Log every instruction
    #[arg(short, long)]
    verbose: bool,

    /// Only digest memory at the first and last state; skip digest checks on replay
    #[arg(long)]
    disable_hash: bool,

    /// Write the recorded log to this file
    #[arg(short, long, value_name = "OUT")]
    json: Option<PathBuf>,

    /// TOML run configuration
    #[arg(long, value_name = "RUN.toml")]
    config: Option<PathBuf>,

    /// Number of instructions to record (overrides the config)
    #[arg(short = 'n', long)]
    instructions: Option<usize>,

    /// Replay a recorded log instead of recording
    #[arg(long, value_name = "LOG.json", conflicts_with_all = ["json", "config", "instructions"])]
    check: Option<PathBuf>,

    #[arg(long = "input", value_name = "FILE", conflicts_with = "file")]
    input: Option<PathBuf>,

    /// Program image: raw binary, .gz or .zip
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,
}

impl Cli {
    fn image(&self) -> Option<&Path> {
        self.input.as_deref().or(self.file.as_deref())
    }
}

fn init_tracing(verbose: bool) -> Result<()> {
    let directive = if verbose {
        "eightbit=debug"
    } else {
        "eightbit=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .with_writer(io::stderr)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let entry = registry::find(&cli.cpu).unwrap_or_else(|| {
        let names: Vec<_> = registry::all().iter().map(|e| e.name).collect();
        eprintln!("Unknown CPU: {}", cli.cpu);
        eprintln!("Available: {}", names.join(", "));
        std::process::exit(1);
    });

    match &cli.check {
        Some(log_path) => check(&cli, entry, log_path),
        None => run(&cli, entry),
    }
}

fn run(cli: &Cli, entry: &CpuEntry) -> Result<()> {
    let Some(image_path) = cli.image() else {
        bail!("no program image given");
    };

    let mut config = match &cli.config {
        Some(path) => RunConfig::load(path)
            .with_context(|| format!("loading run configuration {}", path.display()))?,
        None => RunConfig::default(),
    };
    if let Some(n) = cli.instructions {
        config.instructions = n;
    }
    if cli.disable_hash {
        config.digest = false;
    }

    let image = load_image(image_path)
        .with_context(|| format!("loading program image {}", image_path.display()))?;

    info!("{} running {} instructions", entry.description, config.instructions);
    let mut target = (entry.create)();
    let log = record(
        target.as_mut(),
        &config,
        &image,
        &image_path.to_string_lossy(),
        cli.verbose,
    )?;

    if let Some(last) = log.states.last() {
        info!("final registers: {}", last.regs);
        if let Some(digest) = &last.digest {
            info!("final memory digest: {digest}");
        }
    }

    if let Some(out) = &cli.json {
        log.save(out)
            .with_context(|| format!("writing run log {}", out.display()))?;
        info!("wrote {} states to {}", log.states.len(), out.display());
    }
    Ok(())
}

fn check(cli: &Cli, entry: &CpuEntry, log_path: &Path) -> Result<()> {
    let log = RunLog::load(log_path)
        .with_context(|| format!("reading run log {}", log_path.display()))?;

    let image_path = match cli.image() {
        Some(path) => path.to_path_buf(),
        None => log.image_path(log_path),
    };
    let image = load_image(&image_path)
        .with_context(|| format!("loading program image {}", image_path.display()))?;

    info!(
        "comparing {} against {} ({} states, hash check {})",
        entry.description,
        log_path.display(),
        log.states.len(),
        if cli.disable_hash { "off" } else { "on" }
    );

    let mut target = (entry.create)();
    let result = replay(target.as_mut(), &log, &image, !cli.disable_hash, cli.verbose)
        .with_context(|| format!("replaying {}", log_path.display()))?;
    info!(
        "successfully ran {} instructions ({} cycles)",
        result.instructions, result.cycles
    );
    Ok(())
}
