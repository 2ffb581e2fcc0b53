//! SVG chart rendering with `plotters`.

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;

use super::stats::{EntityStatistics, ReportEntity, label_of};
use super::label_color;
use crate::{Error, Result};

/// Number of bins in the confidence histogram.
pub const HISTOGRAM_BINS: usize = 20;

const CAPTION_FONT: (&str, i32) = ("sans-serif", 26);
const LABEL_FONT: (&str, i32) = ("sans-serif", 14);

fn chart_err(e: impl std::fmt::Display) -> Error {
    Error::Chart(e.to_string())
}

fn rgb((r, g, b): (u8, u8, u8)) -> RGBColor {
    RGBColor(r, g, b)
}

fn segment_label(labels: &[String], v: &SegmentValue<usize>) -> String {
    match v {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
            labels.get(*i).cloned().unwrap_or_default()
        }
        SegmentValue::Last => String::new(),
    }
}

/// Vertical bars, one per label, colored by entity label.
fn draw_label_bars<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    caption: &str,
    y_desc: &str,
    bars: &[(String, f64)],
    y_max: f64,
    value_fmt: impl Fn(f64) -> String,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let labels: Vec<String> = bars.iter().map(|(l, _)| l.clone()).collect();

    let mut chart = ChartBuilder::on(area)
        .caption(caption, CAPTION_FONT)
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d((0..bars.len()).into_segmented(), 0f64..y_max)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(bars.len())
        .x_label_formatter(&|v| segment_label(&labels, v))
        .y_desc(y_desc)
        .label_style(LABEL_FONT)
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(bars.iter().enumerate().map(|(i, (label, value))| {
            Rectangle::new(
                [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), *value)],
                rgb(label_color(label)).filled(),
            )
        }))
        .map_err(chart_err)?;

    chart
        .draw_series(bars.iter().enumerate().map(|(i, (_, value))| {
            Text::new(
                value_fmt(*value),
                (SegmentValue::CenterOf(i), *value + y_max * 0.02),
                LABEL_FONT,
            )
        }))
        .map_err(chart_err)?;

    Ok(())
}

/// Bar chart of entity counts per label.
pub fn entity_type_distribution(stats: &EntityStatistics, path: &Path) -> Result<()> {
    let root = SVGBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let bars: Vec<(String, f64)> = stats
        .by_label
        .iter()
        .map(|g| (g.label.clone(), g.count() as f64))
        .collect();
    let y_max = bars.iter().map(|(_, v)| *v).fold(1.0, f64::max) * 1.15;

    draw_label_bars(
        &root,
        "Entity type distribution",
        "Count",
        &bars,
        y_max,
        |v| format!("{v:.0}"),
    )?;

    root.present().map_err(chart_err)?;
    Ok(())
}

/// Confidence histogram over all entities with a mean marker.
pub fn confidence_distribution(entities: &[ReportEntity], path: &Path) -> Result<()> {
    let values: Vec<f64> = entities.iter().map(|e| e.confidence).collect();
    if values.is_empty() {
        return Ok(());
    }

    let x_max = values.iter().copied().fold(1.0, f64::max);
    let width = x_max / HISTOGRAM_BINS as f64;
    let mut bins = [0usize; HISTOGRAM_BINS];
    for v in &values {
        let idx = ((v.max(0.0) / width) as usize).min(HISTOGRAM_BINS - 1);
        bins[idx] += 1;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let y_max = bins.iter().copied().max().unwrap_or(1).max(1) as f64 * 1.15;

    let root = SVGBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Confidence distribution", CAPTION_FONT)
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..x_max, 0f64..y_max)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .x_desc("Confidence")
        .y_desc("Frequency")
        .label_style(LABEL_FONT)
        .draw()
        .map_err(chart_err)?;

    let sky_blue = RGBColor(0x87, 0xCE, 0xEB);
    chart
        .draw_series(bins.iter().enumerate().map(|(i, count)| {
            let lo = i as f64 * width;
            Rectangle::new([(lo, 0.0), (lo + width, *count as f64)], sky_blue.filled())
        }))
        .map_err(chart_err)?;

    chart
        .draw_series(std::iter::once(PathElement::new(
            vec![(mean, 0.0), (mean, y_max)],
            RED.stroke_width(2),
        )))
        .map_err(chart_err)?
        .label(format!("mean: {mean:.3}"))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}

/// Two panels: count per label and mean confidence per label.
pub fn entity_by_type_analysis(stats: &EntityStatistics, path: &Path) -> Result<()> {
    let root = SVGBackend::new(path, (1400, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;
    let (left, right) = root.split_horizontally(700);

    let counts: Vec<(String, f64)> = stats
        .by_label
        .iter()
        .map(|g| (g.label.clone(), g.count() as f64))
        .collect();
    let count_max = counts.iter().map(|(_, v)| *v).fold(1.0, f64::max) * 1.15;
    draw_label_bars(
        &left,
        "Entities per type",
        "Count",
        &counts,
        count_max,
        |v| format!("{v:.0}"),
    )?;

    let means: Vec<(String, f64)> = stats
        .by_label
        .iter()
        .map(|g| (g.label.clone(), g.confidence.mean))
        .collect();
    let mean_max = means.iter().map(|(_, v)| *v).fold(1.0, f64::max) * 1.1;
    draw_label_bars(
        &right,
        "Mean confidence per type",
        "Mean confidence",
        &means,
        mean_max,
        |v| format!("{v:.3}"),
    )?;

    root.present().map_err(chart_err)?;
    Ok(())
}

/// Horizontal bars of the most frequent entity texts.
pub fn top_entities(stats: &EntityStatistics, entities: &[ReportEntity], path: &Path) -> Result<()> {
    if stats.top.is_empty() {
        return Ok(());
    }

    // most frequent at the top
    let rows: Vec<&(String, usize)> = stats.top.iter().rev().collect();
    let labels: Vec<String> = rows.iter().map(|(text, _)| text.clone()).collect();
    let x_max = rows.iter().map(|(_, c)| *c).max().unwrap_or(1) as f64 * 1.15;

    let root = SVGBackend::new(path, (1000, 700)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Most frequent entities (top {})", stats.top.len()),
            CAPTION_FONT,
        )
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(160)
        .build_cartesian_2d(0f64..x_max, (0..rows.len()).into_segmented())
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(rows.len())
        .y_label_formatter(&|v| segment_label(&labels, v))
        .x_desc("Occurrences")
        .label_style(LABEL_FONT)
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(rows.iter().enumerate().map(|(i, (text, count))| {
            let color = label_color(label_of(entities, text).unwrap_or(""));
            Rectangle::new(
                [(0.0, SegmentValue::Exact(i)), (*count as f64, SegmentValue::Exact(i + 1))],
                rgb(color).mix(0.7).filled(),
            )
        }))
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}
