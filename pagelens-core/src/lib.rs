pub mod report;

use colored::Colorize;

pub use report::{
    aggregate_score, count_severities, generate_json_report, generate_text_report, save_report,
    ReportFormat, SeverityCounts,
};

pub fn print_banner() {
    let banner = r#"
                            _
   ___  ___  ___ ____ _____/ /__ ___  ___
  / _ \/ _ `/ _ `/ -_) / -_) _ \(_-< (_-<
 / .__/\_,_/\_, /\__/_/\__/_//_/___//___/
/_/        /___/
"#;
    println!("{}", banner.cyan());
    println!(
        "{} v{}\n",
        "Pagelens - single-page SEO/AEO/GEO analyzer".bold(),
        env!("CARGO_PKG_VERSION")
    );
}
