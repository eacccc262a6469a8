use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};

use crate::error::EetError;
use crate::stats::DEFAULT_BIN_COUNT;
use crate::EetResult;

// ---------------------------------------------------------------------------
// Layout constants (pixels)
// ---------------------------------------------------------------------------

pub const DEFAULT_WIDTH: u32 = 1600;
pub const DEFAULT_HEIGHT: u32 = 800;

/// Height of the strip above the plot reserved for the overlay boxes.
pub const OVERLAY_BAND_HEIGHT: u32 = 180;

/// Summary box: left edge sits this far from the right edge of the raster.
pub const INFO_BOX_RIGHT_OFFSET: u32 = 1080;
pub const INFO_BOX_WIDTH: u32 = 640;
pub const INFO_BOX_HEIGHT: u32 = 150;

pub const LEGEND_BOX_RIGHT_OFFSET: u32 = 420;
pub const LEGEND_BOX_WIDTH: u32 = 400;
pub const LEGEND_BOX_HEIGHT: u32 = 100;

pub const BOX_TOP: u32 = 10;
pub const BOX_PADDING: u32 = 10;
pub const BOX_LINE_HEIGHT: u32 = 22;

const MIN_OVERLAY_WIDTH: u32 = INFO_BOX_RIGHT_OFFSET + 20;
const MIN_WIDTH: u32 = 400;
const MIN_HEIGHT: u32 = 300;
/// Upper bound for either raster side.
pub const MAX_DIMENSION: u32 = 10_000;

pub const FONT_FAMILY: &str = "sans-serif";

pub const HISTOGRAM_FILL: RGBColor = RGBColor(31, 119, 180);
pub const HISTOGRAM_ALPHA: f64 = 0.3;
pub const INFO_BOX_FILL: RGBColor = RGBColor(0xe0, 0xe0, 0xe0);
pub const LEGEND_BOX_FILL: RGBColor = RGBColor(0xf0, 0xf0, 0xf0);

// ---------------------------------------------------------------------------
// Reference lines
// ---------------------------------------------------------------------------

/// The three vertical markers drawn over every histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceLine {
    Target,
    Mean,
    Median,
}

impl ReferenceLine {
    pub const ALL: [ReferenceLine; 3] =
        [ReferenceLine::Target, ReferenceLine::Mean, ReferenceLine::Median];

    pub fn color(self) -> RGBColor {
        match self {
            ReferenceLine::Target => RGBColor(220, 20, 20),
            ReferenceLine::Mean => RGBColor(0, 128, 0),
            ReferenceLine::Median => RGBColor(0, 0, 255),
        }
    }

    /// `(dash length, gap)` in pixels.
    pub fn dash(self) -> (i32, i32) {
        match self {
            ReferenceLine::Target => (10, 6),
            ReferenceLine::Mean => (2, 5),
            ReferenceLine::Median => (18, 5),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReferenceLine::Target => "Wert zur ISIN",
            ReferenceLine::Mean => "Mittelwert",
            ReferenceLine::Median => "Median",
        }
    }

    /// Line of the static legend key box.
    pub fn key(self) -> String {
        let colour = match self {
            ReferenceLine::Target => "Rot",
            ReferenceLine::Mean => "Grün",
            ReferenceLine::Median => "Blau",
        };
        format!("- {colour}: {}", self.label())
    }
}

// ---------------------------------------------------------------------------
// Chart style
// ---------------------------------------------------------------------------

/// Rendering options shared by every page of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    /// Composite the summary box and legend key onto the raster.
    pub include_annotation_overlay: bool,
    /// Caption the chart with the metric and classification.
    pub titled: bool,
    pub width: u32,
    pub height: u32,
    pub bins: usize,
}

impl Default for ChartStyle {
    fn default() -> Self {
        ChartStyle {
            include_annotation_overlay: true,
            titled: false,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            bins: DEFAULT_BIN_COUNT,
        }
    }
}

impl ChartStyle {
    /// The plain on-screen variant: no overlay boxes, titled chart.
    pub fn plain() -> Self {
        ChartStyle {
            include_annotation_overlay: false,
            titled: true,
            ..ChartStyle::default()
        }
    }

    pub fn validate(&self) -> EetResult<()> {
        if self.include_annotation_overlay && self.width < MIN_OVERLAY_WIDTH {
            return Err(EetError::InvalidInput {
                field: "width".into(),
                reason: format!("must be at least {MIN_OVERLAY_WIDTH}px to fit the overlay boxes"),
            });
        }
        if self.width < MIN_WIDTH {
            return Err(EetError::InvalidInput {
                field: "width".into(),
                reason: format!("must be at least {MIN_WIDTH}px"),
            });
        }
        if self.width > MAX_DIMENSION {
            return Err(EetError::InvalidInput {
                field: "width".into(),
                reason: format!("must be at most {MAX_DIMENSION}px"),
            });
        }
        if self.height > MAX_DIMENSION {
            return Err(EetError::InvalidInput {
                field: "height".into(),
                reason: format!("must be at most {MAX_DIMENSION}px"),
            });
        }
        if self.height < MIN_HEIGHT {
            return Err(EetError::InvalidInput {
                field: "height".into(),
                reason: format!("must be at least {MIN_HEIGHT}px"),
            });
        }
        if self.bins == 0 {
            return Err(EetError::InvalidInput {
                field: "bins".into(),
                reason: "must be positive".into(),
            });
        }
        Ok(())
    }

    pub fn info_box_origin(&self) -> (i32, i32) {
        (
            self.width as i32 - INFO_BOX_RIGHT_OFFSET as i32,
            BOX_TOP as i32,
        )
    }

    pub fn legend_box_origin(&self) -> (i32, i32) {
        (
            self.width as i32 - LEGEND_BOX_RIGHT_OFFSET as i32,
            BOX_TOP as i32,
        )
    }
}
