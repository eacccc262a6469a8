use image::{ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

use crate::chart::annotate::{composite_overlay, render_err};
use crate::chart::style::{
    ChartStyle, ReferenceLine, FONT_FAMILY, HISTOGRAM_ALPHA, HISTOGRAM_FILL, OVERLAY_BAND_HEIGHT,
};
use crate::error::EetError;
use crate::stats::{bin_values, HistogramBins, MetricSummary};
use crate::types::{Classification, Metric, MetricValue};
use crate::EetResult;

/// Whose values a page describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSubject {
    pub identifier: String,
    pub classification: Classification,
}

/// One rendered report page.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPage {
    pub metric: Metric,
    pub image: RgbImage,
}

impl ReportPage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn to_png(&self) -> EetResult<Vec<u8>> {
        let mut bytes = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(render_err)?;
        Ok(bytes)
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> EetResult<()> {
        self.image
            .save_with_format(path, ImageFormat::Png)
            .map_err(render_err)
    }
}

/// Render the histogram page for one metric.
///
/// `peer_values` must be the same value set `summary` was computed from;
/// rendering is deterministic in its inputs.
pub fn render(
    subject: &PageSubject,
    summary: &MetricSummary,
    peer_values: &[MetricValue],
    style: &ChartStyle,
) -> EetResult<ReportPage> {
    style.validate()?;

    let values: Vec<f64> = peer_values.iter().filter_map(|v| v.to_f64()).collect();
    let bins = bin_values(&values, style.bins).ok_or_else(|| EetError::InvalidInput {
        field: "peer_values".into(),
        reason: "nothing to plot".into(),
    })?;

    let (width, height) = (style.width, style.height);
    let len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(3))
        .ok_or_else(|| EetError::InvalidInput {
            field: "width".into(),
            reason: "raster size overflows memory".into(),
        })?;
    let mut buffer = vec![0u8; len];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        if style.include_annotation_overlay {
            let (_, plot_area) = root.split_vertically(OVERLAY_BAND_HEIGHT);
            draw_histogram(&plot_area, subject, summary, &bins, style)?;
            composite_overlay(&root, style, subject, summary)?;
        } else {
            draw_histogram(&root, subject, summary, &bins, style)?;
        }

        root.present().map_err(render_err)?;
    }

    let image = RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| EetError::Render("raster buffer does not match page size".into()))?;

    debug!(metric = %summary.metric, width, height, "rendered page");
    Ok(ReportPage {
        metric: summary.metric,
        image,
    })
}

fn draw_histogram<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    subject: &PageSubject,
    summary: &MetricSummary,
    bins: &HistogramBins,
    style: &ChartStyle,
) -> EetResult<()> {
    let markers = [
        (ReferenceLine::Target, summary.user_value),
        (ReferenceLine::Mean, summary.mean),
        (ReferenceLine::Median, summary.median),
    ];

    let (x_min, x_max) = x_range(bins, &markers);
    let y_max = (bins.max_count() as f64 * 1.1).max(1.0);

    let mut builder = ChartBuilder::on(area);
    builder
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(70);
    if style.titled {
        builder.caption(
            format!("{} ({})", summary.metric, subject.classification.label()),
            (FONT_FAMILY, 24),
        );
    }
    let mut chart = builder
        .build_cartesian_2d(x_min..x_max, 0f64..y_max)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc(summary.metric.column())
        .y_desc("Häufigkeit")
        .axis_desc_style((FONT_FAMILY, 18))
        .label_style((FONT_FAMILY, 14))
        .light_line_style(BLACK.mix(0.08))
        .draw()
        .map_err(render_err)?;

    let fill = HISTOGRAM_FILL.mix(HISTOGRAM_ALPHA);
    chart
        .draw_series(
            bins.iter()
                .map(|(lo, hi, count)| Rectangle::new([(lo, 0.0), (hi, count as f64)], fill.filled())),
        )
        .map_err(render_err)?
        .label("Verteilung")
        .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 20, y + 6)], fill.filled()));

    // Bin edges on top of the fill.
    chart
        .draw_series(
            bins.iter()
                .map(|(lo, hi, count)| Rectangle::new([(lo, 0.0), (hi, count as f64)], BLACK.stroke_width(1))),
        )
        .map_err(render_err)?;

    for (line, value) in markers {
        let x = value.to_f64().unwrap_or(x_min);
        let (dash, gap) = line.dash();
        let stroke = line.color().stroke_width(2);
        chart
            .draw_series(DashedLineSeries::new(
                vec![(x, 0.0), (x, y_max)],
                dash,
                gap,
                stroke,
            ))
            .map_err(render_err)?
            .label(line.label())
            .legend(move |(lx, ly)| PathElement::new(vec![(lx, ly), (lx + 20, ly)], stroke));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK)
        .label_font((FONT_FAMILY, 14))
        .draw()
        .map_err(render_err)?;

    Ok(())
}

/// Histogram span widened to include every marker, with a 5% margin.
fn x_range(bins: &HistogramBins, markers: &[(ReferenceLine, MetricValue)]) -> (f64, f64) {
    let mut lo = bins.lower();
    let mut hi = bins.upper();
    for (_, value) in markers {
        if let Some(v) = value.to_f64() {
            lo = lo.min(v);
            hi = hi.max(v);
        }
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}
