use crate::prelude::*;
use crate::olap::conclusions::HeadlineMetrics;

#[cfg(feature = "dashboard")]
use crate::helper_funcs::money::format_currency;
#[cfg(feature = "dashboard")]
use crate::writers::text_writer::write_text_file;

pub const BAR_COLORS: [&str; 4] = ["#4A90E2", "#F5A623", "#7ED321", "#9013FE"];

/// `(label, value)` for each bar, in display order.
pub fn chart_bars(metrics: &HeadlineMetrics) -> [(&'static str, f64); 4] {
    [
        ("Top product", metrics.top_product_amount),
        ("Top region", metrics.top_region_amount),
        ("Total revenue", metrics.total_revenue),
        ("Average ticket", metrics.average_ticket),
    ]
}

pub fn chart_title(metrics: &HeadlineMetrics) -> String {
    format!(
        "OLAP Conclusions<br>Product: {} | Region: {}",
        metrics.top_product, metrics.top_region
    )
}

/// Horizontal bar chart of the four headline amounts.
#[cfg(feature = "dashboard")]
pub fn summary_chart(metrics: &HeadlineMetrics) -> PlotlyPlot {
    let bars = chart_bars(metrics);
    let labels: Vec<String> = bars.iter().map(|(label, _)| label.to_string()).collect();
    let values: Vec<f64> = bars.iter().map(|(_, value)| *value).collect();
    let texts: Vec<String> = values.iter().map(|v| format_currency(*v)).collect();

    let trace = Bar::new(values, labels)
        .orientation(Orientation::Horizontal)
        .text_array(texts)
        .text_position(TextPosition::Outside)
        .marker(Marker::new().color_array(BAR_COLORS.to_vec()))
        .name("Headline metrics");

    let mut plot = PlotlyPlot::new();
    plot.add_trace(trace);

    let layout = Layout::new()
        .title(chart_title(metrics).as_str())
        .x_axis(Axis::new().title("Amount ($)"));
    plot.set_layout(layout);
    plot
}

/// Writes the summary chart as a standalone HTML page.
#[cfg(feature = "dashboard")]
pub fn render_summary_chart(metrics: &HeadlineMetrics, path: &Path) -> CubeResult<()> {
    let plot = summary_chart(metrics);
    write_text_file(path, &plot.to_html())?;
    println!("✅ Summary chart saved to {}", path.display());
    Ok(())
}

#[cfg(not(feature = "dashboard"))]
pub fn render_summary_chart(_metrics: &HeadlineMetrics, path: &Path) -> CubeResult<()> {
    warn!(path = %path.display(), "chart requested but the 'dashboard' feature is not enabled");
    println!("⚠️  Chart skipped: rebuild with --features dashboard");
    Ok(())
}
