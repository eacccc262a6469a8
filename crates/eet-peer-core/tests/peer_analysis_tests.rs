use eet_peer_core::analysis::analyze;
use eet_peer_core::dataset::{find_record, load, peer_group, Dataset, LoaderOptions, Record};
use eet_peer_core::stats::summarize;
use eet_peer_core::{Classification, EetError, Metric, MetricValue};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const SAMPLE_SHEET: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../EET_Beispieldaten_100_ISINs_variiert.csv"
);

/// 100 records: every fourth is Art. 9, the rest alternate Art. 6 / Art. 8.
/// Each metric value equals the row number, so peer statistics are easy to
/// state by hand.
fn hundred_records() -> Dataset {
    let records = (0..100u32)
        .map(|i| {
            let class = if i % 4 == 0 {
                9
            } else if i % 2 == 0 {
                6
            } else {
                8
            };
            Record {
                identifier: format!("DE{:010}", i),
                classification: Classification(class),
                values: [Some(Decimal::from(i)); 7],
            }
        })
        .collect();
    Dataset::new("generated", records)
}

// ===========================================================================
// Lookup and peer groups
// ===========================================================================

#[test]
fn test_unknown_isin_is_not_found() {
    let ds = hundred_records();
    match analyze(&ds, "XX0000000000") {
        Err(EetError::NotFound { identifier }) => assert_eq!(identifier, "XX0000000000"),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn test_lookup_ignores_case_and_whitespace() {
    let ds = hundred_records();
    let record = find_record(&ds, "  de0000000042 ").unwrap();
    assert_eq!(record.identifier, "DE0000000042");
}

#[test]
fn test_peer_groups_partition_the_dataset() {
    let ds = hundred_records();
    let sizes: Vec<usize> = ["DE0000000000", "DE0000000001", "DE0000000002"]
        .iter()
        .map(|id| peer_group(&ds, find_record(&ds, id).unwrap()).len())
        .collect();
    // Art. 9, Art. 8, Art. 6
    assert_eq!(sizes, vec![25, 50, 25]);
    assert_eq!(sizes.iter().sum::<usize>(), ds.len());
}

// ===========================================================================
// Statistics over a full peer group
// ===========================================================================

#[test]
fn test_art9_statistics() {
    // Art. 9 rows are 0, 4, ..., 96: mean = median = 48.
    let ds = hundred_records();
    let out = analyze(&ds, "DE0000000048").unwrap();
    let analysis = out.result;

    assert_eq!(analysis.peer_group_size, 25);
    assert_eq!(analysis.summaries.len(), 7);
    for summary in &analysis.summaries {
        assert_eq!(summary.peer_count, 25);
        assert_eq!(summary.mean, dec!(48));
        assert_eq!(summary.median, dec!(48));
        // 12 of 25 peers sit strictly below 48.
        assert_eq!(summary.percentile_rank, dec!(48));
    }
}

#[test]
fn test_lowest_and_highest_in_group() {
    let ds = hundred_records();

    let lowest = analyze(&ds, "DE0000000001").unwrap();
    assert!(lowest
        .result
        .summaries
        .iter()
        .all(|s| s.percentile_rank == Decimal::ZERO));

    // Art. 8 holds 50 odd rows; 49 of them are below 99.
    let highest = analyze(&ds, "DE0000000099").unwrap();
    assert!(highest
        .result
        .summaries
        .iter()
        .all(|s| s.percentile_rank == dec!(98)));
}

#[test]
fn test_even_group_median_is_central_average() {
    // Art. 8 = 1, 3, ..., 99: median (49 + 51) / 2 = 50.
    let ds = hundred_records();
    let record = find_record(&ds, "DE0000000007").unwrap();
    let peers = peer_group(&ds, record);
    let summary = summarize(&peers, Metric::Scope2Emissions, dec!(7)).unwrap();
    assert_eq!(summary.median, dec!(50));
    assert_eq!(summary.mean, dec!(50));
    assert_eq!(summary.percentile_rank, dec!(6));
}

#[test]
fn test_statistics_are_independent_of_row_order() {
    let ds = hundred_records();
    let mut reversed: Vec<Record> = ds.records().to_vec();
    reversed.reverse();
    let rev = Dataset::new("reversed", reversed);

    let a = analyze(&ds, "DE0000000050").unwrap().result.summaries;
    let b = analyze(&rev, "DE0000000050").unwrap().result.summaries;
    assert_eq!(a, b);
}

#[test]
fn test_missing_values_are_excluded_everywhere() {
    let mut records = hundred_records().records().to_vec();
    let blank = |r: &mut Record| r.values[Metric::Scope3Emissions.index()] = None;
    for r in records.iter_mut().filter(|r| r.classification == Classification(9)) {
        if r.identifier != "DE0000000048" {
            blank(r);
        }
    }
    let ds = Dataset::new("gappy", records);

    let out = analyze(&ds, "DE0000000048").unwrap();
    let scope3 = out
        .result
        .summaries
        .iter()
        .find(|s| s.metric == Metric::Scope3Emissions)
        .unwrap();
    assert_eq!(scope3.peer_count, 1);
    assert_eq!(scope3.mean, dec!(48));
    assert_eq!(scope3.percentile_rank, Decimal::ZERO);

    let scope1 = &out.result.summaries[Metric::Scope1Emissions.index()];
    assert_eq!(scope1.peer_count, 25);
}

#[test]
fn test_record_without_any_value_has_no_summaries() {
    let mut records = hundred_records().records().to_vec();
    records[3].values = [None::<MetricValue>; 7];
    let ds = Dataset::new("blank", records);

    let out = analyze(&ds, "DE0000000003").unwrap();
    assert!(out.result.summaries.is_empty());
    assert_eq!(out.result.skipped.len(), 7);
    assert_eq!(out.warnings.len(), 7);
    assert_eq!(out.result.overview.values.len(), 7);
}

#[test]
fn test_sheet_values_beyond_decimal_sum_are_skipped() {
    let mut header = vec!["ISIN".to_string(), "Klassifikation".to_string()];
    header.extend(Metric::ALL.iter().map(|m| m.column().to_string()));
    let csv = format!(
        "{}\nDE0001,8,1,2,3,4,50000000000000000000000000000,6,7\nDE0002,8,1,2,3,4,50000000000000000000000000000,6,7\n",
        header.join(",")
    );
    let ds = Dataset::from_reader(csv.as_bytes(), &LoaderOptions::default()).unwrap();

    let out = analyze(&ds, "DE0001").unwrap();
    assert_eq!(out.result.summaries.len(), 6);
    assert_eq!(out.result.skipped.len(), 1);
    assert_eq!(out.result.skipped[0].metric, Metric::Scope1Emissions);
    assert_eq!(out.warnings.len(), 1);
}

// ===========================================================================
// Sample sheet
// ===========================================================================

#[test]
fn test_sample_sheet_loads_one_hundred_isins() {
    let ds = load(SAMPLE_SHEET).unwrap();
    assert_eq!(ds.len(), 100);
    assert_eq!(ds.metrics(), &Metric::ALL[..]);
}

#[test]
fn test_sample_sheet_analysis() {
    let ds = load(SAMPLE_SHEET).unwrap();
    let out = analyze(&ds, "lu0000079191").unwrap();
    let analysis = out.result;

    assert_eq!(analysis.overview.identifier, "LU0000079191");
    assert_eq!(analysis.overview.classification, Classification(8));
    assert_eq!(analysis.peer_group_size, 48);
    assert_eq!(analysis.summaries.len(), 7);
    assert_eq!(
        analysis.overview.values[Metric::MinSustainableShare.index()].value,
        Some(dec!(9.5))
    );
    for summary in &analysis.summaries {
        assert!(summary.peer_count >= 1 && summary.peer_count <= 48);
        assert!(summary.percentile_rank >= Decimal::ZERO);
        assert!(summary.percentile_rank < dec!(100));
    }
}

#[test]
fn test_sample_sheet_with_semicolon_options_is_rejected() {
    let err = eet_peer_core::dataset::load_with_options(
        SAMPLE_SHEET,
        &LoaderOptions { delimiter: b';' },
    )
    .unwrap_err();
    assert!(matches!(err, EetError::DataUnavailable { .. }));
}

#[test]
fn test_missing_sheet_is_data_unavailable() {
    let err = load("no/such/EET_sheet.csv").unwrap_err();
    assert!(matches!(err, EetError::DataUnavailable { .. }));
    assert!(!err.is_soft());
}
