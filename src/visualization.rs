/// Visualization module: summary charts for the dashboard.
///
/// Produces a self-contained HTML string with inline SVG:
/// - Bar chart of total trips per season
/// - Grouped bar chart of casual/registered trips per day type
/// - Line chart of hourly demand, one polyline per season
///
/// The season and day-type sections carry the two headline metric tiles
/// (max / sum of total). All rendering is done server-side; the output embeds
/// no scripts and can be dropped into any HTML-capable frontend.
use std::collections::BTreeMap;
use std::fmt::Write as FmtWrite;

use polars::prelude::*;

use crate::error::DashError;
use crate::metrics::{self, HeadlineMetrics};
use crate::schema::summary;

const DASHBOARD_CSS: &str = r#"
.bdk-dashboard { font-family: sans-serif; color: #343a40; }
.bdk-section { margin-bottom: 24px; }
.bdk-metrics { display: flex; gap: 16px; margin: 8px 0; }
.bdk-metric { border: 1px solid #dee2e6; border-radius: 4px; padding: 8px 16px; background: #fff; }
.bdk-metric .label { font-size: 12px; color: #868e96; }
.bdk-metric .value { font-size: 20px; font-weight: 600; }
.bdk-legend { display: flex; gap: 12px; font-size: 12px; margin-top: 4px; }
.bdk-legend .swatch { display: inline-block; width: 10px; height: 10px; margin-right: 4px; border-radius: 2px; }
"#;

/// Line/marker colors, one per season curve.
const PALETTE: [&str; 6] = [
    "#4dabf7", "#f59f00", "#40c057", "#e64980", "#7950f2", "#15aabf",
];

const CASUAL_COLOR: &str = "#4dabf7";
const REGISTERED_COLOR: &str = "#f59f00";

const MARGIN_LEFT: f64 = 48.0;
const MARGIN_RIGHT: f64 = 8.0;
const MARGIN_TOP: f64 = 12.0;
const MARGIN_BOTTOM: f64 = 32.0;

// ── Config ──────────────────────────────────────────────────────────────────

/// Configuration for the dashboard rendering.
pub struct VisualizationConfig {
    /// Heading shown above the dashboard
    pub title: String,
    /// Pixel width of each chart
    pub chart_width_px: u32,
    /// Pixel height of each chart
    pub chart_height_px: u32,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            title: "Bike Sharing Dashboard".to_string(),
            chart_width_px: 640,
            chart_height_px: 320,
        }
    }
}

// ── Intermediate data structures ────────────────────────────────────────────

struct SeasonBar {
    season: String,
    total: i64,
}

struct DayTypeBar {
    label: String,
    casual: i64,
    registered: i64,
}

struct HourCurve {
    season: String,
    points: Vec<(i64, i64)>,
}

// ── Data extraction ─────────────────────────────────────────────────────────

fn extract_season_bars(per_season: &DataFrame) -> Result<Vec<SeasonBar>, DashError> {
    let seasons = per_season.column(summary::SEASON)?.i64()?;
    let totals = per_season.column(summary::TOTAL)?.i64()?;

    let mut bars = Vec::with_capacity(per_season.height());
    for i in 0..per_season.height() {
        bars.push(SeasonBar {
            season: seasons.get(i).map(|v| v.to_string()).unwrap_or_default(),
            total: totals.get(i).unwrap_or(0),
        });
    }
    Ok(bars)
}

fn extract_day_type_bars(per_day_type: &DataFrame) -> Result<Vec<DayTypeBar>, DashError> {
    let labels = per_day_type.column(summary::WORKINGDAY)?.str()?;
    let casual = per_day_type.column(summary::CASUAL)?.i64()?;
    let registered = per_day_type.column(summary::REGISTERED)?.i64()?;

    let mut bars = Vec::with_capacity(per_day_type.height());
    for i in 0..per_day_type.height() {
        bars.push(DayTypeBar {
            label: labels.get(i).unwrap_or("").to_string(),
            casual: casual.get(i).unwrap_or(0),
            registered: registered.get(i).unwrap_or(0),
        });
    }
    Ok(bars)
}

/// One curve per season, points ordered by hour. Missing hours stay absent;
/// the polyline simply connects the hours that are present.
fn extract_hour_curves(per_hour: &DataFrame) -> Result<Vec<HourCurve>, DashError> {
    let seasons = per_hour.column(summary::SEASON)?.i64()?;
    let hours = per_hour.column(summary::HOUR)?.i64()?;
    let totals = per_hour.column(summary::TOTAL)?.i64()?;

    let mut by_season: BTreeMap<i64, Vec<(i64, i64)>> = BTreeMap::new();
    for i in 0..per_hour.height() {
        let (Some(season), Some(hour)) = (seasons.get(i), hours.get(i)) else {
            continue;
        };
        by_season
            .entry(season)
            .or_default()
            .push((hour, totals.get(i).unwrap_or(0)));
    }

    let curves = by_season
        .into_iter()
        .map(|(season, mut points)| {
            points.sort_by_key(|&(hour, _)| hour);
            HourCurve {
                season: season.to_string(),
                points,
            }
        })
        .collect();
    Ok(curves)
}

// ── SVG rendering ───────────────────────────────────────────────────────────

fn plot_area(config: &VisualizationConfig) -> (f64, f64) {
    let plot_w = (config.chart_width_px as f64 - MARGIN_LEFT - MARGIN_RIGHT).max(1.0);
    let plot_h = (config.chart_height_px as f64 - MARGIN_TOP - MARGIN_BOTTOM).max(1.0);
    (plot_w, plot_h)
}

fn open_svg(s: &mut String, config: &VisualizationConfig) {
    write!(
        s,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = config.chart_width_px,
        h = config.chart_height_px,
    )
    .unwrap();
}

/// Axis lines plus the two axis captions.
fn write_axes(s: &mut String, config: &VisualizationConfig, x_caption: &str, y_caption: &str) {
    let (plot_w, plot_h) = plot_area(config);
    let x0 = MARGIN_LEFT;
    let y0 = MARGIN_TOP + plot_h;

    write!(
        s,
        r##"<line x1="{x0}" y1="{y1}" x2="{x0}" y2="{y0}" stroke="#adb5bd"/>"##,
        x0 = x0,
        y1 = MARGIN_TOP,
        y0 = y0,
    )
    .unwrap();
    write!(
        s,
        r##"<line x1="{x0}" y1="{y0}" x2="{x1}" y2="{y0}" stroke="#adb5bd"/>"##,
        x0 = x0,
        x1 = x0 + plot_w,
        y0 = y0,
    )
    .unwrap();
    write!(
        s,
        r##"<text x="{x}" y="{y}" font-size="11" fill="#868e96" text-anchor="middle">{caption}</text>"##,
        x = x0 + plot_w / 2.0,
        y = y0 + 26.0,
        caption = escape_html(x_caption),
    )
    .unwrap();
    write!(
        s,
        r##"<text x="12" y="{y}" font-size="11" fill="#868e96" text-anchor="middle" transform="rotate(-90 12 {y})">{caption}</text>"##,
        y = MARGIN_TOP + plot_h / 2.0,
        caption = escape_html(y_caption),
    )
    .unwrap();
}

fn render_season_chart(bars: &[SeasonBar], config: &VisualizationConfig) -> String {
    let (plot_w, plot_h) = plot_area(config);
    let max_total = bars.iter().map(|b| b.total).max().unwrap_or(0).max(1) as f64;

    let mut s = String::new();
    open_svg(&mut s, config);
    write_axes(&mut s, config, "Season", "Total trips");

    let slot = plot_w / bars.len().max(1) as f64;
    for (i, bar) in bars.iter().enumerate() {
        let bar_w = slot * 0.6;
        let x = MARGIN_LEFT + slot * i as f64 + (slot - bar_w) / 2.0;
        let h = plot_h * bar.total as f64 / max_total;
        let y = MARGIN_TOP + plot_h - h;

        write!(
            s,
            r#"<rect x="{x:.1}" y="{y:.1}" width="{w:.1}" height="{h:.1}" fill="{color}"/>"#,
            x = x,
            y = y,
            w = bar_w,
            h = h,
            color = PALETTE[0],
        )
        .unwrap();
        write!(
            s,
            r##"<text x="{x:.1}" y="{y:.1}" font-size="11" fill="#343a40" text-anchor="middle">{v}</text>"##,
            x = x + bar_w / 2.0,
            y = y - 4.0,
            v = bar.total,
        )
        .unwrap();
        write!(
            s,
            r##"<text x="{x:.1}" y="{y:.1}" font-size="11" fill="#495057" text-anchor="middle">{label}</text>"##,
            x = x + bar_w / 2.0,
            y = MARGIN_TOP + plot_h + 14.0,
            label = escape_html(&bar.season),
        )
        .unwrap();
    }

    s.push_str("</svg>");
    s
}

fn render_day_type_chart(bars: &[DayTypeBar], config: &VisualizationConfig) -> String {
    let (plot_w, plot_h) = plot_area(config);
    let max_count = bars
        .iter()
        .map(|b| b.casual.max(b.registered))
        .max()
        .unwrap_or(0)
        .max(1) as f64;

    let mut s = String::new();
    open_svg(&mut s, config);
    write_axes(&mut s, config, "Day type", "Trips");

    let slot = plot_w / bars.len().max(1) as f64;
    for (i, bar) in bars.iter().enumerate() {
        let bar_w = slot * 0.3;
        let x_casual = MARGIN_LEFT + slot * i as f64 + slot / 2.0 - bar_w;
        let x_registered = x_casual + bar_w;

        for (x, count, color) in [
            (x_casual, bar.casual, CASUAL_COLOR),
            (x_registered, bar.registered, REGISTERED_COLOR),
        ] {
            let h = plot_h * count as f64 / max_count;
            let y = MARGIN_TOP + plot_h - h;
            write!(
                s,
                r#"<rect x="{x:.1}" y="{y:.1}" width="{w:.1}" height="{h:.1}" fill="{color}"/>"#,
                x = x,
                y = y,
                w = bar_w,
                h = h,
                color = color,
            )
            .unwrap();
            write!(
                s,
                r##"<text x="{x:.1}" y="{y:.1}" font-size="10" fill="#343a40" text-anchor="middle">{v}</text>"##,
                x = x + bar_w / 2.0,
                y = y - 4.0,
                v = count,
            )
            .unwrap();
        }

        write!(
            s,
            r##"<text x="{x:.1}" y="{y:.1}" font-size="11" fill="#495057" text-anchor="middle">{label}</text>"##,
            x = MARGIN_LEFT + slot * i as f64 + slot / 2.0,
            y = MARGIN_TOP + plot_h + 14.0,
            label = escape_html(&bar.label),
        )
        .unwrap();
    }

    s.push_str("</svg>");
    s
}

fn render_hour_chart(curves: &[HourCurve], config: &VisualizationConfig) -> String {
    let (plot_w, plot_h) = plot_area(config);
    let max_total = curves
        .iter()
        .flat_map(|c| c.points.iter().map(|&(_, total)| total))
        .max()
        .unwrap_or(0)
        .max(1) as f64;

    let x_of = |hour: i64| MARGIN_LEFT + plot_w * hour as f64 / 23.0;
    let y_of = |total: i64| MARGIN_TOP + plot_h - plot_h * total as f64 / max_total;

    let mut s = String::new();
    open_svg(&mut s, config);
    write_axes(&mut s, config, "Hour", "Total trips");

    for hour in (0..24).step_by(4) {
        write!(
            s,
            r##"<text x="{x:.1}" y="{y:.1}" font-size="10" fill="#868e96" text-anchor="middle">{hour}</text>"##,
            x = x_of(hour),
            y = MARGIN_TOP + plot_h + 14.0,
            hour = hour,
        )
        .unwrap();
    }

    for (i, curve) in curves.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        let points: Vec<String> = curve
            .points
            .iter()
            .map(|&(hour, total)| format!("{:.1},{:.1}", x_of(hour), y_of(total)))
            .collect();

        write!(
            s,
            r#"<polyline points="{points}" fill="none" stroke="{color}" stroke-width="2"/>"#,
            points = points.join(" "),
            color = color,
        )
        .unwrap();
        for &(hour, total) in &curve.points {
            write!(
                s,
                r#"<circle cx="{x:.1}" cy="{y:.1}" r="2.5" fill="{color}"/>"#,
                x = x_of(hour),
                y = y_of(total),
                color = color,
            )
            .unwrap();
        }
    }

    s.push_str("</svg>");
    s
}

// ── HTML generation ─────────────────────────────────────────────────────────

fn write_metric_tiles(s: &mut String, m: &HeadlineMetrics) {
    write!(
        s,
        r#"<div class="bdk-metrics"><div class="bdk-metric"><div class="label">Maximum</div><div class="value">{max}</div></div><div class="bdk-metric"><div class="label">Total transactions</div><div class="value">{sum}</div></div></div>"#,
        max = m.max_total,
        sum = m.sum_total,
    )
    .unwrap();
}

fn write_legend(s: &mut String, entries: &[(&str, String)]) {
    s.push_str(r#"<div class="bdk-legend">"#);
    for (color, label) in entries {
        write!(
            s,
            r#"<span><span class="swatch" style="background:{color}"></span>{label}</span>"#,
            color = color,
            label = escape_html(label),
        )
        .unwrap();
    }
    s.push_str("</div>");
}

/// Main entry point: generates a self-contained HTML string from the three
/// summary frames of one selected year.
///
/// An empty selection still renders every section, with zero-valued metric
/// tiles and bare axes.
pub fn generate_dashboard_html(
    per_season: &DataFrame,
    per_day_type: &DataFrame,
    per_hour: &DataFrame,
    config: &VisualizationConfig,
) -> Result<String, DashError> {
    let season_bars = extract_season_bars(per_season)?;
    let day_type_bars = extract_day_type_bars(per_day_type)?;
    let hour_curves = extract_hour_curves(per_hour)?;

    let season_metrics = metrics::headline(per_season)?;
    let day_type_metrics = metrics::headline(per_day_type)?;

    let mut html = String::new();
    write!(
        html,
        r#"<div class="bdk-dashboard"><style>{css}</style><h1>{title}</h1>"#,
        css = DASHBOARD_CSS,
        title = escape_html(&config.title),
    )
    .unwrap();

    // Season section
    html.push_str(r#"<div class="bdk-section"><h2>Transaction Per Season</h2>"#);
    write_metric_tiles(&mut html, &season_metrics);
    html.push_str(&render_season_chart(&season_bars, config));
    html.push_str("</div>");

    // Day-type section
    html.push_str(r#"<div class="bdk-section"><h2>Transaction Per Day Type</h2>"#);
    write_metric_tiles(&mut html, &day_type_metrics);
    html.push_str(&render_day_type_chart(&day_type_bars, config));
    write_legend(
        &mut html,
        &[
            (CASUAL_COLOR, "Casual".to_string()),
            (REGISTERED_COLOR, "Registered".to_string()),
        ],
    );
    html.push_str("</div>");

    // Hourly section
    html.push_str(r#"<div class="bdk-section"><h2>Transaction Per Hour</h2>"#);
    html.push_str(&render_hour_chart(&hour_curves, config));
    let legend: Vec<(&str, String)> = hour_curves
        .iter()
        .enumerate()
        .map(|(i, c)| (PALETTE[i % PALETTE.len()], format!("Season {}", c.season)))
        .collect();
    write_legend(&mut html, &legend);
    html.push_str("</div></div>");

    Ok(html)
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation;
    use crate::schema::trip;
    use polars::df;

    fn summaries() -> (DataFrame, DataFrame, DataFrame) {
        let trips = df!(
            trip::YR => [0i64, 0, 0, 0],
            trip::SEASON => [1i64, 1, 2, 2],
            trip::HR => [5i64, 6, 5, 6],
            trip::WORKINGDAY => [0i64, 1, 0, 1],
            trip::CASUAL => [2i64, 4, 6, 8],
            trip::REGISTERED => [3i64, 6, 9, 12],
            trip::CNT => [5i64, 10, 15, 20],
        )
        .unwrap();
        (
            aggregation::per_season(&trips).unwrap(),
            aggregation::per_day_type(&trips).unwrap(),
            aggregation::per_hour(&trips).unwrap(),
        )
    }

    #[test]
    fn dashboard_html_contains_all_sections() {
        let (per_season, per_day_type, per_hour) = summaries();
        let html = generate_dashboard_html(
            &per_season,
            &per_day_type,
            &per_hour,
            &VisualizationConfig::default(),
        )
        .unwrap();

        assert!(html.contains("Transaction Per Season"));
        assert!(html.contains("Transaction Per Day Type"));
        assert!(html.contains("Transaction Per Hour"));
        assert_eq!(html.matches("<svg").count(), 3);
        assert!(html.contains("polyline"));
        assert!(!html.contains("<script"));
    }

    #[test]
    fn dashboard_html_shows_headline_metrics() {
        let (per_season, per_day_type, per_hour) = summaries();
        let html = generate_dashboard_html(
            &per_season,
            &per_day_type,
            &per_hour,
            &VisualizationConfig::default(),
        )
        .unwrap();

        // Season totals are 15 and 35: max 35, sum 50.
        assert!(html.contains(r#"<div class="value">35</div>"#));
        assert!(html.contains(r#"<div class="value">50</div>"#));
    }

    #[test]
    fn empty_summaries_render_zero_metrics() {
        let trips = df!(
            trip::YR => Vec::<i64>::new(),
            trip::SEASON => Vec::<i64>::new(),
            trip::HR => Vec::<i64>::new(),
            trip::WORKINGDAY => Vec::<i64>::new(),
            trip::CASUAL => Vec::<i64>::new(),
            trip::REGISTERED => Vec::<i64>::new(),
            trip::CNT => Vec::<i64>::new(),
        )
        .unwrap();

        let html = generate_dashboard_html(
            &aggregation::per_season(&trips).unwrap(),
            &aggregation::per_day_type(&trips).unwrap(),
            &aggregation::per_hour(&trips).unwrap(),
            &VisualizationConfig::default(),
        )
        .unwrap();

        assert!(html.contains(r#"<div class="value">0</div>"#));
        assert_eq!(html.matches("<svg").count(), 3);
    }

    #[test]
    fn titles_are_escaped() {
        let (per_season, per_day_type, per_hour) = summaries();
        let config = VisualizationConfig {
            title: "<b>Bikes & Co</b>".to_string(),
            ..Default::default()
        };
        let html =
            generate_dashboard_html(&per_season, &per_day_type, &per_hour, &config).unwrap();
        assert!(html.contains("&lt;b&gt;Bikes &amp; Co&lt;/b&gt;"));
    }
}
