mod commands;
mod logging;
mod progress;
mod report;

use std::process;

use clap::{CommandFactory, Parser};
use colored::*;
use commands::{AuditArgs, Cli, Commands};
use dotenv::dotenv;
use night_audit_core::engine::{AuditEngine, AuditOptions};
use night_audit_core::provider::{open_provider, FileListingProvider};
use night_audit_core::AppConfig;
use progress::CliReporter;
use tracing::{error, info};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let args = Cli::parse();
    let Some(command) = args.command else {
        let _ = Cli::command().print_long_help();
        return Ok(());
    };

    let config = match night_audit_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    if let Commands::PrintConfig = command {
        println!("Configuration: {:#?}", config);
        return Ok(());
    }

    // No command runs against a provider that failed to connect
    let provider = match open_provider(&config) {
        Ok(provider) => provider,
        Err(err) => {
            error!("{}", err);
            process::exit(1);
        }
    };

    let result = match command {
        Commands::Audit(audit_args) => run_audit(&config, provider.as_ref(), &audit_args),
        Commands::ListCameras => run_list_cameras(provider.as_ref()),
        Commands::MacAddresses => run_mac_addresses(provider.as_ref()),
        Commands::Fetch { path } => run_fetch(provider.as_ref(), &path),
        Commands::PrintConfig => Ok(()),
    };

    if let Err(err) = result {
        error!("Error: {}", err);
        process::exit(1);
    }

    Ok(())
}

fn run_audit(
    config: &AppConfig,
    provider: &dyn FileListingProvider,
    args: &AuditArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = AuditOptions {
        trim_empty_last_date: config.trim_empty_last_date && !args.no_trim,
    };
    let reporter = CliReporter::new();
    let report = AuditEngine::new(provider)
        .with_options(options)
        .run(&reporter)?;

    info!(
        "Listing: {}, Reconcile: {}",
        format!("{:.2}s", report.listing_duration.as_secs_f64()).green(),
        format!("{:.2}s", report.reconcile_duration.as_secs_f64()).green(),
    );

    report::print_summary(&report);
    report::print_heatmap(&report.matrix, &config.report_title());
    report::print_diagnostics(&report);
    report::print_zero_byte_files(&report);

    if let Some(dir) = &args.csv_dir {
        report::write_csv(dir, &report)?;
        info!("CSV reports written to {}", dir.display());
    }

    Ok(())
}

fn run_list_cameras(provider: &dyn FileListingProvider) -> Result<(), Box<dyn std::error::Error>> {
    let camera_ids = provider.list_camera_ids()?;
    for camera_id in &camera_ids {
        println!("{}", camera_id);
    }
    info!("{} cameras", camera_ids.len());
    Ok(())
}

fn run_mac_addresses(provider: &dyn FileListingProvider) -> Result<(), Box<dyn std::error::Error>> {
    for (camera_id, per_date) in provider.list_mac_addresses()? {
        if per_date.is_empty() {
            println!("{}: {}", camera_id, "no MAC address found".yellow());
            continue;
        }
        for (date, mac) in per_date {
            println!("{}\t{}\t{}", camera_id, date, mac);
        }
    }
    Ok(())
}

fn run_fetch(
    provider: &dyn FileListingProvider,
    path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let local = provider.fetch_file(path)?;
    println!("{}", local.display());
    Ok(())
}
