use crate::CLAP_STYLING;
use clap::{arg, command};

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("pagelens")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("pagelens")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("analyze")
                .about(
                    "Analyze a single page: fetch it, run every SEO/AEO/GEO check and \
                render a report.",
                )
                .arg(
                    arg!([URL])
                        .required(true)
                        .help("The URL to analyze (https:// is assumed if no scheme is given)"),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Page fetch timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("15"),
                )
                .arg(
                    arg!(--"api-key" <KEY>)
                        .required(false)
                        .help("PageSpeed API key (default: PAGESPEED_API_KEY env var)"),
                ),
        )
}
