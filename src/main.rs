//! Subprobe - enumerate candidate subdomains and probe them over HTTPS

use clap::Parser;
use std::process;
use subprobe::{
    config::Cli,
    generate::generate_candidates,
    probe::ProbeEngine,
    report::{self, ConsoleReporter},
    types::fqdn,
    Result,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize the library
    if let Err(e) = subprobe::init() {
        eprintln!("❌ Failed to initialize: {}", e);
        process::exit(1);
    }

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{}", e.user_message());
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "subprobe=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with_writer(std::io::stderr)
        .init();
}

/// Main workflow: configure, generate, probe, report
async fn run(cli: Cli) -> Result<()> {
    let list_only = cli.list;
    let json = cli.json;
    let config = cli.into_config()?;

    if !json {
        println!("Generating subdomains from {}...", config.strategy.source_name());
    }
    let candidates = generate_candidates(&config);

    if list_only {
        for label in &candidates {
            println!("{}", fqdn(label, &config.base_domain));
        }
        return Ok(());
    }

    if !json {
        println!("Checking {} domains/subdomains...", candidates.len());
    }

    let engine = ProbeEngine::from_config(&config)?;
    let reporter = ConsoleReporter::new(candidates.len(), &config.redirect_target, !json);
    let report = engine.run(&candidates, &reporter).await;
    reporter.finish();

    if json {
        report::print_json(&report)?;
    } else {
        report::print_summary(&report);
    }

    Ok(())
}
