use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::error;
use tracing_subscriber::EnvFilter;

use salescube::config::pipeline_config::PipelineConfig;
use salescube::{run_all, run_etl, run_olap, CubeResult, FactSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Stage {
    /// Generate sources, build and load the fact table, print reports
    Etl,
    /// Drill-down, slices, pivot and conclusions over the fact table
    Olap,
    /// ETL followed by OLAP
    All,
}

#[derive(Parser)]
#[command(name = "salescube")]
#[command(about = "Retail sales ETL and OLAP reporting")]
#[command(version)]
struct Args {
    /// Stage to run
    #[arg(value_enum, default_value_t = Stage::All)]
    stage: Stage,

    /// Directory for every input and output file
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Render the summary chart (needs the `dashboard` feature)
    #[arg(long)]
    chart: bool,
}

fn build_config(args: &Args) -> CubeResult<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    if args.chart {
        config.render_chart = true;
    }
    Ok(config)
}

async fn run(args: Args) -> CubeResult<()> {
    let config = build_config(&args)?;
    match args.stage {
        Stage::Etl => {
            run_etl(&config).await?;
        }
        Stage::Olap => {
            let source = FactSource::for_path(config.fact_path());
            run_olap(&config, source).await?;
        }
        Stage::All => {
            run_all(&config).await?;
        }
    }
    println!("\n🎉 Done");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("salescube=info")),
        )
        .init();

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = ?e, "pipeline failed");
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
