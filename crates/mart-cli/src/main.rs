//! `mart`: batch builder for the Olist analytics mart.
//!
//! Reads `mart.toml` (or the path given with `--config`), overlays `MART_*`
//! environment variables and any command-line overrides, then runs one stage.
//!
//! ```text
//! mart audit --write-report docs/data_quality_report.md
//! mart fact-orders
//! mart fact-items --sink sqlite --database data/mart.sqlite
//! mart dim-date
//! mart load-raw --database data/mart.sqlite --if-exists replace
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use mart_audit::ReportFormat;
use mart_cli::{MartConfig, SinkKind, stages};
use mart_core::IfExists;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Olist analytics mart builder")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, env = "MART_CONFIG", default_value = "mart.toml", global = true)]
  config: PathBuf,

  /// Directory holding the raw Olist CSV files.
  #[arg(long, global = true)]
  raw_dir: Option<PathBuf>,

  /// Directory the mart CSV files are written to.
  #[arg(long, global = true)]
  mart_dir: Option<PathBuf>,

  /// SQLite database for `load-raw` and `--sink sqlite`.
  #[arg(long, global = true)]
  database: Option<PathBuf>,

  /// Existing-table policy for SQLite writes: replace, append or fail.
  #[arg(long, global = true)]
  if_exists: Option<IfExists>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Report data-quality measures over the raw tables.
  Audit {
    /// Write the report here instead of printing it.
    #[arg(long)]
    write_report: Option<PathBuf>,

    #[arg(long, default_value_t = ReportFormat::Markdown)]
    format: ReportFormat,
  },
  /// Build `fact_orders` (one row per order).
  FactOrders {
    #[arg(long, default_value_t = SinkKind::Csv)]
    sink: SinkKind,
  },
  /// Build `fact_order_items` (one row per order line item).
  FactItems {
    #[arg(long, default_value_t = SinkKind::Csv)]
    sink: SinkKind,
  },
  /// Build `dim_date` over the purchase date range.
  DimDate {
    #[arg(long, default_value_t = SinkKind::Csv)]
    sink: SinkKind,
  },
  /// Copy the raw CSV files into `raw_*` tables of the SQLite database.
  LoadRaw,
}

impl Cli {
  fn settings(&self) -> anyhow::Result<MartConfig> {
    let mut cfg = MartConfig::load(&self.config)
      .with_context(|| format!("failed to read config {}", self.config.display()))?;
    if let Some(dir) = &self.raw_dir {
      cfg.raw_dir = dir.clone();
    }
    if let Some(dir) = &self.mart_dir {
      cfg.mart_dir = dir.clone();
    }
    if let Some(path) = &self.database {
      cfg.database_path = Some(path.clone());
    }
    if let Some(policy) = self.if_exists {
      cfg.if_exists = policy;
    }
    Ok(cfg)
  }
}

fn main() -> anyhow::Result<()> {
  // Logs go to stderr; stdout is reserved for the audit report.
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = cli.settings()?;
  tracing::debug!(?cfg, "resolved configuration");

  match cli.command {
    Command::Audit {
      write_report,
      format,
    } => {
      let report = stages::run_audit(&cfg).context("audit failed")?;
      let text = report.render(format).context("failed to render report")?;
      match write_report {
        Some(path) => {
          std::fs::write(&path, text)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
          tracing::info!(path = %path.display(), "wrote audit report");
        }
        None => print!("{text}"),
      }
    }
    Command::FactOrders { sink } => {
      stages::run_fact_orders(&cfg, sink).context("fact-orders failed")?;
    }
    Command::FactItems { sink } => {
      stages::run_fact_items(&cfg, sink).context("fact-items failed")?;
    }
    Command::DimDate { sink } => {
      stages::run_dim_date(&cfg, sink).context("dim-date failed")?;
    }
    Command::LoadRaw => {
      let loaded = stages::run_load_raw(&cfg).context("load-raw failed")?;
      for (table, rows) in loaded {
        tracing::info!(table = table.raw_table_name(), rows, "loaded");
      }
    }
  }

  Ok(())
}
