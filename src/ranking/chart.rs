//! Horizontal bar chart of the ranking, drawn with plotters.

use std::path::Path;

use course_ranking::RankingTable;
use log::debug;
use plotters::coord::ranged1d::SegmentValue;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::ranking::{RankError, RankResult};

pub const CHART_TITLE: &str = "Course Ranking by Student Preference";
pub const X_AXIS_LABEL: &str = "Average Rating (1 = Best, 8 = Worst)";
const CHART_SIZE: (u32, u32) = (1200, 800);
const BAR_COLOR: RGBColor = RGBColor(0x18, 0x5C, 0x33);
const GRID_COLOR: RGBColor = RGBColor(0xD0, 0xD0, 0xD0);

/// One bar of the chart.
#[derive(PartialEq, Debug, Clone)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    /// The value printed at the end of the bar.
    pub annotation: String,
}

/// The bars from bottom to top. The chart draws the first bar at the bottom,
/// so the best course comes last and ends up at the top.
pub fn chart_bars(table: &RankingTable) -> Vec<Bar> {
    table
        .worst_first()
        .into_iter()
        .map(|r| Bar {
            annotation: format!("{:.2}", r.average_rating),
            label: r.course,
            value: r.average_rating,
        })
        .collect()
}

/// Upper bound of the x axis, with room for the annotations.
fn x_axis_end(bars: &[Bar]) -> f64 {
    let max = bars.iter().map(|b| b.value).fold(0.0_f64, f64::max);
    max.ceil() + 1.0
}

fn chart_error<E: std::fmt::Display>(e: E) -> RankError {
    RankError::Chart {
        message: e.to_string(),
    }
}

pub fn render_chart(table: &RankingTable, output_path: &Path, axis_label: &str) -> RankResult<()> {
    let bars = chart_bars(table);
    let n = bars.len() as u32;
    let x_end = x_axis_end(&bars);
    debug!("render_chart: {} bars, x axis up to {}", n, x_end);

    let root = BitMapBackend::new(output_path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(CHART_TITLE, ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(240)
        .build_cartesian_2d(0.0..x_end, (0u32..n).into_segmented())
        .map_err(chart_error)?;

    let label_of = |v: &SegmentValue<u32>| match v {
        SegmentValue::CenterOf(i) => bars
            .get(*i as usize)
            .map(|b| b.label.clone())
            .unwrap_or_default(),
        _ => String::new(),
    };
    chart
        .configure_mesh()
        .disable_y_mesh()
        .light_line_style(&WHITE)
        .bold_line_style(&GRID_COLOR)
        .x_desc(X_AXIS_LABEL)
        .y_desc(axis_label)
        .y_labels(bars.len())
        .y_label_formatter(&label_of)
        .label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(chart_error)?;

    chart
        .draw_series(bars.iter().enumerate().map(|(idx, b)| {
            let idx = idx as u32;
            let mut rect = Rectangle::new(
                [
                    (0.0, SegmentValue::Exact(idx)),
                    (b.value, SegmentValue::Exact(idx + 1)),
                ],
                BAR_COLOR.filled(),
            );
            rect.set_margin(8, 8, 0, 0);
            rect
        }))
        .map_err(chart_error)?;

    let annotation_style = TextStyle::from(("sans-serif", 16).into_font())
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Center));
    chart
        .draw_series(bars.iter().enumerate().map(|(idx, b)| {
            Text::new(
                b.annotation.clone(),
                (b.value + 0.05, SegmentValue::CenterOf(idx as u32)),
                annotation_style.clone(),
            )
        }))
        .map_err(chart_error)?;

    root.present().map_err(chart_error)?;
    Ok(())
}
