use clap;
use clap::ArgMatches;
use colored::Colorize;
use commands::command_argument_builder;
use indicatif::{ProgressBar, ProgressStyle};
use pagelens_core::{print_banner, ReportFormat};
use pagelens_engine::AnalyzerConfig;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber;

mod commands;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    if chosen_command.subcommand().is_none() {
        // No subcommand provided, just show the banner
        return;
    }

    match chosen_command.subcommand() {
        Some(("analyze", primary_command)) => handle_analyze(primary_command, quiet).await,
        _ => unreachable!("clap should ensure we don't get here"),
    }
}

async fn handle_analyze(sub_matches: &ArgMatches, quiet: bool) {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let url = sub_matches.get_one::<String>("URL").unwrap();
    let format = sub_matches
        .get_one::<String>("format")
        .and_then(|s| ReportFormat::from_str(s))
        .unwrap_or(ReportFormat::Text);
    let output = sub_matches.get_one::<PathBuf>("output");
    let timeout = sub_matches.get_one::<u64>("timeout").unwrap_or(&15);
    let api_key = sub_matches.get_one::<String>("api-key").cloned();

    let spinner = if quiet {
        ProgressBar::hidden()
    } else {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner.set_message(format!("Analyzing {}", url));
        spinner
    };

    let config = AnalyzerConfig {
        fetch_timeout_secs: *timeout,
        pagespeed_api_key: api_key,
        pagespeed_endpoint: None,
    };

    let report = match pagelens_engine::analyze(url, &config).await {
        Ok(report) => {
            spinner.finish_and_clear();
            report
        }
        Err(e) => {
            spinner.finish_and_clear();
            eprintln!("{} {} (status {})", "✗".red(), e, e.status_code());
            std::process::exit(1);
        }
    };

    let rendered = match format {
        ReportFormat::Text => pagelens_core::generate_text_report(&report),
        ReportFormat::Json => match pagelens_core::generate_json_report(&report) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("{} Failed to serialize report: {}", "✗".red(), e);
                std::process::exit(1);
            }
        },
    };

    match output {
        Some(path) => {
            if let Err(e) = pagelens_core::save_report(&rendered, path) {
                eprintln!("{} Failed to write {}: {}", "✗".red(), path.display(), e);
                std::process::exit(1);
            }
            if !quiet {
                println!("{} Report saved to {}", "✓".green(), path.display());
                print_severity_summary(&report);
            }
        }
        None => {
            print!("{}", rendered);
            if !quiet && matches!(format, ReportFormat::Text) {
                print_severity_summary(&report);
            }
        }
    }
}

fn print_severity_summary(report: &pagelens_engine::AnalysisReport) {
    let counts = pagelens_core::count_severities(report);
    let score = pagelens_core::aggregate_score(report);

    println!(
        "{}  {}  {}   score: {}/100",
        format!("✓ {} passed", counts.pass).green(),
        format!("⚠ {} warnings", counts.warning).yellow(),
        format!("✗ {} failed", counts.fail).red(),
        score
    );
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
