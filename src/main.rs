//! llmperf-summary - merge llmperf benchmark results into one table
//!
//! A CLI tool that reads the `*_summary.json` files produced by llmperf
//! runs from one or more result folders and writes a single sorted
//! `<folders>_summary_results.csv` report.
//!
//! Exit codes:
//!   0 - Success, or no summary files found (nothing written)
//!   1 - Runtime error (missing folder, unreadable or malformed file, etc.)

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod report;
mod scanner;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config(&args.base_dir());
    }

    // Config is loaded before logging so `[general] verbose` can apply
    let mut config = match load_config(&args, &args.base_dir()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(args.log_level(config.general.verbose));

    info!("llmperf-summary v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Config: {:?}", config);

    if let Err(e) = run(&args, &config) {
        error!("Aggregation failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .llmperf-summary.toml.
fn handle_init_config(base_dir: &Path) -> Result<()> {
    let path = base_dir.join(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            path.display()
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(&path, &content)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("✅ Created {} with default settings.", path.display());
    println!("   Edit it to change the result folders, file suffix, and output format.");
    Ok(())
}

/// Initialize logging. `RUST_LOG` overrides the level picked from the flags.
fn init_logging(level: tracing::Level) {
    let env_directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(log_filter(level, &env_directives))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: failed to set tracing subscriber: {}", e);
    }
}

/// Log filter: `env_directives` when given, otherwise `level`.
fn log_filter(level: tracing::Level, env_directives: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .parse_lossy(env_directives)
}

/// Result of one aggregation pass.
#[derive(Debug)]
enum Outcome {
    /// No folder held a summary file; nothing was written.
    NoData,
    /// The report was written.
    Written { path: PathBuf, records: usize },
}

/// Aggregate `folders` and write the report into `output_dir`.
fn summarize(
    summary_scanner: &scanner::SummaryScanner,
    folders: &[String],
    format: OutputFormat,
    output_dir: &Path,
) -> Result<Outcome> {
    let table = match analysis::aggregate(summary_scanner, folders)? {
        Some(table) => table,
        None => return Ok(Outcome::NoData),
    };

    debug!(
        "Columns: {}",
        table
            .columns()
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(",")
    );

    let path = report::write_report(&table, folders, format, output_dir)?;
    Ok(Outcome::Written {
        path,
        records: table.len(),
    })
}

/// Run the aggregation: scan folders, merge, sort, write the report.
fn run(args: &Args, config: &Config) -> Result<()> {
    let folders = &config.general.folders;
    if folders.is_empty() {
        anyhow::bail!("No result folders configured");
    }
    for folder in folders {
        cli::validate_folder_name(folder).map_err(anyhow::Error::msg)?;
    }

    let scan_config = scanner::ScanConfig::from(&config.scanner);
    let summary_scanner = scanner::SummaryScanner::new(args.base_dir(), scan_config);
    info!("Base directory: {}", summary_scanner.base_dir().display());

    // Handle --dry-run: list files and exit
    if args.dry_run {
        return handle_dry_run(&summary_scanner, folders);
    }

    println!("📂 Reading summaries from: {}", folders.join(", "));

    match summarize(
        &summary_scanner,
        folders,
        config.report.format,
        &args.output_dir(),
    )? {
        Outcome::NoData => {
            println!(
                "No data was read from any folder. Check the folder paths and the {} files.",
                config.scanner.suffix
            );
        }
        Outcome::Written { path, records } => {
            println!("\n📊 Records: {} from {} folder(s)", records, folders.len());
            println!("✅ Report saved to: {}", path.display());
        }
    }

    Ok(())
}

/// Handle --dry-run: list the summary files per folder, write nothing.
fn handle_dry_run(summary_scanner: &scanner::SummaryScanner, folders: &[String]) -> Result<()> {
    println!("\n🔍 Dry run: scanning result folders (no report written)...\n");

    let mut total = 0;
    for folder in folders {
        let files = summary_scanner.locate(folder)?;
        println!("   {} ({} files)", folder, files.len());
        for file in &files {
            println!("     📄 {}", file.file_name);
        }
        total += files.len();
    }

    println!("\n   Total: {} summary files", total);
    println!("\n✅ Dry run complete.");
    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args, base_dir: &Path) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    Ok(Config::load_from_dir(base_dir)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_summary(dir: &Path, folder: &str, name: &str, content: &str) {
        let folder_path = dir.join(folder);
        fs::create_dir_all(&folder_path).unwrap();
        fs::write(folder_path.join(name), content).unwrap();
    }

    fn summary_scanner(dir: &TempDir) -> scanner::SummaryScanner {
        scanner::SummaryScanner::new(dir.path().to_path_buf(), scanner::ScanConfig::default())
    }

    fn report_files(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|name| name.contains("_summary_results"))
            .collect()
    }

    #[test]
    fn test_summarize_writes_expected_csv() {
        let dir = TempDir::new().unwrap();
        write_summary(
            dir.path(),
            "recaculation",
            "a_summary.json",
            r#"{"model":"m1","mean_input_tokens":100,"concurrent_requests":4,
                "results_ttft_s_mean":0.5,"results_inter_token_latency_s_mean":0.02,
                "results_end_to_end_latency_s_mean":3.0}"#,
        );
        write_summary(
            dir.path(),
            "recaculation",
            "b_summary.json",
            r#"{"model":"m1","mean_input_tokens":50,"concurrent_requests":4,
                "results_ttft_s_mean":0.3,"results_inter_token_latency_s_mean":0.01,
                "results_end_to_end_latency_s_mean":2.0}"#,
        );

        let folders = vec!["recaculation".to_string()];
        let outcome =
            summarize(&summary_scanner(&dir), &folders, OutputFormat::Csv, dir.path()).unwrap();

        let path = match outcome {
            Outcome::Written { path, records } => {
                assert_eq!(records, 2);
                path
            }
            Outcome::NoData => panic!("expected a report"),
        };
        assert_eq!(path, dir.path().join("recaculation_summary_results.csv"));

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "folder_name,file_name,model,mean_input_tokens,concurrent_requests,\
             results_ttft_s_mean,results_inter_token_latency_s_mean,\
             results_end_to_end_latency_s_mean\n\
             recaculation,b_summary.json,m1,50,4,0.3,10,2\n\
             recaculation,a_summary.json,m1,100,4,0.5,20,3\n"
        );
    }

    #[test]
    fn test_summarize_no_data_writes_nothing() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nocache")).unwrap();
        write_summary(dir.path(), "baseline", "notes.json", "{}");

        let folders = vec!["nocache".to_string(), "baseline".to_string()];
        let outcome =
            summarize(&summary_scanner(&dir), &folders, OutputFormat::Csv, dir.path()).unwrap();

        assert!(matches!(outcome, Outcome::NoData));
        assert!(report_files(dir.path()).is_empty());
    }

    #[test]
    fn test_summarize_missing_folder_writes_nothing() {
        let dir = TempDir::new().unwrap();
        write_summary(dir.path(), "present", "a_summary.json", "{}");

        let folders = vec!["present".to_string(), "absent".to_string()];
        let result = summarize(&summary_scanner(&dir), &folders, OutputFormat::Csv, dir.path());
        assert!(result.is_err());
        assert!(report_files(dir.path()).is_empty());
    }

    #[test]
    fn test_log_filter() {
        assert_eq!(
            log_filter(tracing::Level::DEBUG, "").max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
        assert_eq!(
            log_filter(tracing::Level::INFO, "trace").max_level_hint(),
            Some(LevelFilter::TRACE)
        );
    }

    #[test]
    fn test_load_config_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let args = <Args as clap::Parser>::parse_from(["llmperf-summary"]);

        let config = load_config(&args, dir.path()).unwrap();
        assert_eq!(config.general.folders, vec!["recaculation"]);
        assert!(!config.general.verbose);
    }
}
