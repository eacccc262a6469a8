use plotters::coord::Shift;
use plotters::prelude::*;

use crate::chart::render::PageSubject;
use crate::chart::style::{
    ChartStyle, ReferenceLine, BOX_LINE_HEIGHT, BOX_PADDING, FONT_FAMILY, INFO_BOX_FILL,
    INFO_BOX_HEIGHT, INFO_BOX_WIDTH, LEGEND_BOX_FILL, LEGEND_BOX_HEIGHT, LEGEND_BOX_WIDTH,
};
use crate::error::EetError;
use crate::stats::MetricSummary;
use crate::EetResult;

const TEXT_SIZE: u32 = 16;

/// Text of the summary box, one entry per line.
pub fn info_lines(subject: &PageSubject, summary: &MetricSummary) -> Vec<String> {
    summary.describe(&subject.identifier)
}

/// Text of the static legend key box.
pub fn legend_lines() -> Vec<String> {
    let mut lines = vec!["Legende:".to_string()];
    lines.extend(ReferenceLine::ALL.iter().map(|l| l.key()));
    lines
}

/// Paint both opaque boxes onto an already rendered page.
pub fn composite_overlay<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    style: &ChartStyle,
    subject: &PageSubject,
    summary: &MetricSummary,
) -> EetResult<()> {
    draw_box(
        root,
        style.info_box_origin(),
        (INFO_BOX_WIDTH, INFO_BOX_HEIGHT),
        INFO_BOX_FILL,
        &info_lines(subject, summary),
    )?;
    draw_box(
        root,
        style.legend_box_origin(),
        (LEGEND_BOX_WIDTH, LEGEND_BOX_HEIGHT),
        LEGEND_BOX_FILL,
        &legend_lines(),
    )
}

fn draw_box<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    (x, y): (i32, i32),
    (w, h): (u32, u32),
    fill: RGBColor,
    lines: &[String],
) -> EetResult<()> {
    root.draw(&Rectangle::new(
        [(x, y), (x + w as i32, y + h as i32)],
        fill.filled(),
    ))
    .map_err(render_err)?;

    let font = (FONT_FAMILY, TEXT_SIZE).into_font().color(&BLACK);
    for (i, line) in lines.iter().enumerate() {
        let pos = (
            x + BOX_PADDING as i32,
            y + BOX_PADDING as i32 + (i as u32 * BOX_LINE_HEIGHT) as i32,
        );
        root.draw(&Text::new(line.as_str(), pos, font.clone()))
            .map_err(render_err)?;
    }
    Ok(())
}

pub(crate) fn render_err<E: std::fmt::Display>(e: E) -> EetError {
    EetError::Render(e.to_string())
}
