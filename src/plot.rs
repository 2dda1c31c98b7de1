//! Rendering of the JLPT level histograms

use crate::{
    config::HistogramConfig,
    density::{Histogram, LevelRanks},
    jlpt::JlptLevel,
    Result,
};
use anyhow::Context;
use plotters::prelude::*;
use std::path::Path;

/// Title of the figure
const TITLE: &str = "Histogram of JLPT Levels Mapped to Word Frequency List";

/// Size of the figure in pixels
const SIZE: (u32, u32) = (1200, 900);

/// Draw one density histogram of matched frequency ranks per JLPT level
///
/// Levels are stacked from N1 (top) to N5 (bottom), and share a frequency rank
/// axis that spans from 0 to the configured maximal rank. Levels without any
/// matched rank are drawn as empty rows.
pub fn render(path: &Path, levels: &LevelRanks, config: &HistogramConfig) -> Result<()> {
    let context = || format!("drawing histograms into {}", path.display());
    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).with_context(context)?;
    let root = root
        .titled(TITLE, ("sans-serif", 24))
        .with_context(context)?;

    let max_rank = config.max_rank.get() as f64;
    let rank_formatter = |rank: &f64| format!("{rank:.0}");
    let rows = root.split_evenly((JlptLevel::ALL.len(), 1));
    for (row, level) in rows.iter().zip(JlptLevel::ALL) {
        let histogram = levels
            .get(&level)
            .and_then(|ranks| Histogram::density(ranks, config.bins));
        let y_max = histogram
            .as_ref()
            .map(Histogram::max_density)
            .filter(|&max| max > 0.0)
            .unwrap_or(1.0);

        // Only the bottom row carries the shared rank axis labels
        let is_bottom = level == JlptLevel::N5;
        let mut chart = ChartBuilder::on(row)
            .margin(5)
            .y_label_area_size(40)
            .x_label_area_size(if is_bottom { 40 } else { 0 })
            .build_cartesian_2d(0.0..max_rank, 0.0..y_max * 1.05)
            .with_context(context)?;
        let mut mesh = chart.configure_mesh();
        mesh.disable_mesh()
            .y_labels(0)
            .y_desc(level.to_string())
            .x_label_formatter(&rank_formatter);
        if is_bottom {
            mesh.x_desc("Word frequency rank (most to least frequent)");
        } else {
            mesh.x_labels(0);
        }
        mesh.draw().with_context(context)?;

        if let Some(histogram) = histogram {
            debug_assert!(
                (histogram.area() - 1.0).abs() < 1e-6,
                "density histograms should have unit area"
            );
            let (r, g, b) = level.rgb();
            let color = RGBColor(r, g, b);
            chart
                .draw_series(
                    AreaSeries::new(histogram.step_outline(max_rank), 0.0, color.filled())
                        .border_style(color.stroke_width(1)),
                )
                .with_context(context)?;
        } else {
            log::warn!("No {level} word was found in the frequency list");
        }
    }

    root.present().with_context(context)?;
    log::info!("Saved JLPT histograms to {}", path.display());
    Ok(())
}
