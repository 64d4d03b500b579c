use crate::infra::parse_timestamp;
use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use veille::config::AppConfig;
use veille::error::AppError;
use veille::telemetry;
use veille::workflows::opportunities::export::write_csv;
use veille::workflows::opportunities::{BatchContext, OpportunityBatch, OpportunityEngine};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Generator response to score (`-` reads stdin)
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Processing instant (RFC 3339 or YYYY-MM-DD, defaults to now)
    #[arg(long, value_parser = parse_timestamp)]
    pub(crate) processed_at: Option<DateTime<Utc>>,
    /// Output format written to stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub(crate) format: OutputFormat,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let engine = OpportunityEngine::new(config.scoring)?;
    let payload = read_input(&args.input)?;

    let ctx = BatchContext::new(args.processed_at.unwrap_or_else(Utc::now));
    let batch = engine.process_str(&payload, &ctx);
    info!(
        input = %args.input.display(),
        opportunities = batch.opportunities.len(),
        "scored generator response"
    );

    let stdout = io::stdout();
    render(&batch, args.format, stdout.lock())
}

fn read_input(path: &Path) -> Result<String, AppError> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        return Ok(buffer);
    }

    Ok(std::fs::read_to_string(path)?)
}

fn render<W: Write>(
    batch: &OpportunityBatch,
    format: OutputFormat,
    mut writer: W,
) -> Result<(), AppError> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, batch)?;
            writeln!(writer)?;
        }
        OutputFormat::Csv => write_csv(batch, &mut writer)?,
    }

    Ok(())
}
