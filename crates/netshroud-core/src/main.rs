use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use netshroud_core::{report, resolver, Cli, HostOps, RealHostOps, StealthEngine};

fn main() {
    init_logging();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        emit_error(&err);
        std::process::exit(1);
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    ensure_elevated()?;

    let ops: Arc<dyn HostOps> =
        Arc::new(RealHostOps::new().context("initializing host operations")?);
    let targets = resolver::resolve_targets(cli.interface.as_deref(), ops.as_ref())?;

    report::announce(&targets, cli.direction(), cli.output_format);

    let engine = StealthEngine::new(ops);
    let outcome = engine.run(&targets, cli.direction(), cli.filter(), cli.save);

    report::render(&outcome, cli.output_format)
}

fn ensure_elevated() -> Result<()> {
    if !netshroud_system::check_privileges() {
        bail!("netshroud must run as root (try sudo)");
    }
    Ok(())
}

fn emit_error(err: &anyhow::Error) {
    eprintln!("\x1b[91merror: {err}\x1b[0m");
    for cause in err.chain().skip(1) {
        eprintln!("  -> {cause}");
    }
}
