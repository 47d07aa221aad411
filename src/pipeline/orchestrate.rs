use crate::prelude::*;
use crate::features::chart::render_summary_chart;
use crate::helper_funcs::display::{print_banner, print_batches, print_heading, print_schema};
use crate::load::loader::{load_fact_table, LoadedFacts, FACT_ALIAS};
use crate::loaders::csv_loader::extract_sources;
use crate::loaders::fact_source::FactSource;
use crate::olap::calendar::with_calendar;
use crate::olap::conclusions::{headline_metrics, write_conclusions, HeadlineMetrics};
use crate::olap::cube::{drill_down, slice_by_category, slice_by_region, DrillCell};
use crate::olap::pivot::{build_pivot, PivotTable};
use crate::reporting::aggregates::{run_aggregate_reports, AggregateReports, GroupTotals, Report};
use crate::reporting::summary::{print_fact_summary, FactSummary, RunSummary};
use crate::source_gen::generator::write_source_files;
use crate::transform::transformer::{transform, NullAnalysis};

/// Everything the ETL stage produced.
#[derive(Debug, Clone)]
pub struct EtlOutcome {
    pub facts: LoadedFacts,
    pub null_analysis: NullAnalysis,
    pub summary: FactSummary,
    pub reports: AggregateReports,
    pub run: RunSummary,
}

/// Everything the OLAP stage produced. `headline` is `None` when the fact
/// table was empty; conclusions and chart are skipped in that case.
#[derive(Debug, Clone)]
pub struct OlapOutcome {
    pub source: FactSource,
    pub drill_down: Report<DrillCell>,
    pub region_slice: Report<GroupTotals>,
    pub category_slice: Report<GroupTotals>,
    pub pivot: PivotTable,
    pub headline: Option<HeadlineMetrics>,
    pub conclusions: Option<String>,
}

/// Generate → extract → transform → load → report.
pub async fn run_etl(config: &PipelineConfig) -> CubeResult<EtlOutcome> {
    print_banner("🚀 SALES ETL PIPELINE");
    info!(data_dir = %config.data_dir.display(), "starting ETL");

    let mut files = write_source_files(config)?;

    let tables = extract_sources(config).await;
    if !tables.is_complete() {
        warn!("continuing with incomplete source tables");
    }

    let output = transform(&tables, &config.null_defaults).await?;
    let facts = load_fact_table(&output.joined, &config.fact_path()).await?;
    files.push(facts.path.clone());

    print_schema(&facts.frame.alias, facts.frame.dataframe.schema().inner().as_ref());
    let summary = print_fact_summary(&facts.frame, config.preview_rows).await?;
    let reports = run_aggregate_reports(&facts.frame, config.top_n).await?;

    let run = RunSummary::new(&summary, files);
    run.print();
    info!(records = run.records, revenue = run.revenue, "ETL finished");

    Ok(EtlOutcome {
        null_analysis: output.null_analysis,
        facts,
        summary,
        reports,
        run,
    })
}

/// Drill-down, slices, pivot and conclusions over the fact table from `source`.
pub async fn run_olap(config: &PipelineConfig, source: FactSource) -> CubeResult<OlapOutcome> {
    print_banner("📊 OLAP ANALYSIS");
    info!(source = ?source, "starting OLAP");

    let facts = source.load(FACT_ALIAS).await?;
    println!("✅ Fact table loaded: {} rows", facts.row_count().await?);
    let cube = with_calendar(&facts).await?;

    let drill = drill_down(&cube).await?;
    drill.print("1️⃣  Drill-down: month → week")?;

    let region_slice = slice_by_region(&cube, &config.slice_region).await?;
    region_slice.print(&format!("2️⃣  Slice: region = {}", config.slice_region))?;

    let category_slice = slice_by_category(&cube, &config.slice_category).await?;
    category_slice.print(&format!("3️⃣  Slice: category = {}", config.slice_category))?;

    let pivot = build_pivot(&cube).await?;
    print_heading("4️⃣  Pivot: region × category by month");
    print_batches(&pivot.batches)?;
    pivot.write_csv(&config.pivot_path())?;
    println!("✅ Pivot table saved to {}", config.pivot_path().display());

    let (headline, conclusions) = match headline_metrics(&facts).await {
        Ok(metrics) => {
            let text = write_conclusions(&metrics, &config.conclusions_path())?;
            if config.render_chart {
                render_summary_chart(&metrics, &config.chart_path())?;
            }
            (Some(metrics), Some(text))
        }
        Err(CubeError::EmptyFactTable { operation }) => {
            warn!(%operation, "fact table is empty, skipping conclusions");
            println!("⚠️  No sales to summarize; conclusions and chart skipped");
            (None, None)
        }
        Err(e) => return Err(e),
    };

    info!(pivot_rows = pivot.rows.len(), "OLAP finished");
    Ok(OlapOutcome {
        source,
        drill_down: drill,
        region_slice,
        category_slice,
        pivot,
        headline,
        conclusions,
    })
}

/// ETL followed by OLAP on the fact table it just wrote.
pub async fn run_all(config: &PipelineConfig) -> CubeResult<(EtlOutcome, OlapOutcome)> {
    let etl = run_etl(config).await?;
    let source = FactSource::for_path(config.fact_path());
    let olap = run_olap(config, source).await?;
    Ok((etl, olap))
}
