#![cfg(feature = "report")]

use eet_peer_core::analysis::build_report;
use eet_peer_core::chart::{render, ChartStyle, PageSubject};
use eet_peer_core::dataset::{Dataset, Record};
use eet_peer_core::report::{assemble, report_file_name, PDF_MIME_TYPE};
use eet_peer_core::stats::summary::summarize_values;
use eet_peer_core::{Classification, EetError, Metric};
use image::Rgb;
use lopdf::Document;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn dataset() -> Dataset {
    let records = (0..30u32)
        .map(|i| Record {
            identifier: format!("LU{:010}", i),
            classification: Classification(if i % 3 == 0 { 9 } else { 8 }),
            values: [Some(Decimal::from(i * 3)); 7],
        })
        .collect();
    Dataset::new("generated", records)
}

fn subject() -> PageSubject {
    PageSubject {
        identifier: "DE000A1EWWW0".into(),
        classification: Classification(8),
    }
}

// ===========================================================================
// Rendering
// ===========================================================================

#[test]
fn test_render_is_deterministic() {
    let values = vec![dec!(10), dec!(20), dec!(30), dec!(40)];
    let summary = summarize_values(&values, Metric::MinSustainableShare, dec!(20)).unwrap();
    let style = ChartStyle::default();

    let first = render(&subject(), &summary, &values, &style).unwrap();
    let second = render(&subject(), &summary, &values, &style).unwrap();
    assert_eq!(first.width(), 1600);
    assert_eq!(first.height(), 800);
    assert!(first == second);
}

#[test]
fn test_overlay_boxes_are_painted_at_fixed_offsets() {
    let values = vec![dec!(1), dec!(2), dec!(2), dec!(5)];
    let summary = summarize_values(&values, Metric::Scope1Emissions, dec!(2)).unwrap();
    let with_overlay = ChartStyle::default();
    let without_overlay = ChartStyle {
        include_annotation_overlay: false,
        ..ChartStyle::default()
    };

    let annotated = render(&subject(), &summary, &values, &with_overlay).unwrap();
    let bare = render(&subject(), &summary, &values, &without_overlay).unwrap();
    assert!(annotated != bare);

    let width = annotated.width();
    // Lower right corner of each box, clear of its text.
    assert_eq!(
        *annotated.image.get_pixel(width - 1080 + 630, 150),
        Rgb([0xe0, 0xe0, 0xe0])
    );
    assert_eq!(
        *annotated.image.get_pixel(width - 420 + 390, 100),
        Rgb([0xf0, 0xf0, 0xf0])
    );
}

#[test]
fn test_single_peer_renders() {
    let values = vec![dec!(42)];
    let summary = summarize_values(&values, Metric::Scope3Emissions, dec!(42)).unwrap();
    let page = render(&subject(), &summary, &values, &ChartStyle::default()).unwrap();
    assert_eq!(page.metric, Metric::Scope3Emissions);

    let png = page.to_png().unwrap();
    assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
}

#[test]
fn test_invalid_style_is_rejected() {
    let values = vec![dec!(1)];
    let summary = summarize_values(&values, Metric::Scope3Emissions, dec!(1)).unwrap();
    let style = ChartStyle {
        bins: 0,
        ..ChartStyle::default()
    };
    let err = render(&subject(), &summary, &values, &style).unwrap_err();
    assert!(matches!(err, EetError::InvalidInput { .. }));
}

// ===========================================================================
// Report assembly
// ===========================================================================

#[test]
fn test_report_has_one_page_per_metric_in_order() {
    let ds = dataset();
    let out = build_report(&ds, "lu0000000004", &ChartStyle::default()).unwrap();
    let report = out.result;

    assert_eq!(report.file_name, "LU0000000004_analyse.pdf");
    assert_eq!(report.pages.len(), 7);
    let order: Vec<Metric> = report.pages.iter().map(|p| p.metric).collect();
    assert_eq!(order, Metric::ALL.to_vec());

    let document = report.document.unwrap();
    assert_eq!(document.page_count(), 7);
    assert_eq!(document.mime_type(), PDF_MIME_TYPE);
    assert_eq!(document.metrics, Metric::ALL.to_vec());

    let pdf = Document::load_mem(&document.bytes).unwrap();
    assert_eq!(pdf.get_pages().len(), 7);
}

#[test]
fn test_skipped_metric_drops_its_page() {
    let mut records = dataset().records().to_vec();
    records[4].values[Metric::Scope2Emissions.index()] = None;
    let ds = Dataset::new("gappy", records);

    let out = build_report(&ds, "LU0000000004", &ChartStyle::default()).unwrap();
    let report = out.result;
    assert_eq!(report.pages.len(), 6);
    assert!(report.pages.iter().all(|p| p.metric != Metric::Scope2Emissions));
    assert_eq!(report.analysis.skipped.len(), 1);
    assert_eq!(report.document.unwrap().page_count(), 6);
}

#[test]
fn test_no_summaries_means_no_document() {
    let mut records = dataset().records().to_vec();
    records[4].values = [None; 7];
    let ds = Dataset::new("blank", records);

    let out = build_report(&ds, "LU0000000004", &ChartStyle::default()).unwrap();
    assert!(out.result.pages.is_empty());
    assert!(out.result.document.is_none());
}

#[test]
fn test_unknown_isin_produces_no_report() {
    let ds = dataset();
    let err = build_report(&ds, "XX0000000000", &ChartStyle::default()).unwrap_err();
    assert!(matches!(err, EetError::NotFound { .. }));
}

#[test]
fn test_assemble_empty_and_file_name() {
    assert!(assemble(&[]).unwrap().is_none());
    assert_eq!(report_file_name("lu0000000004"), "LU0000000004_analyse.pdf");
}
