pub mod annotate;
pub mod render;
pub mod style;

pub use render::{render, PageSubject, ReportPage};
pub use style::{ChartStyle, ReferenceLine};
