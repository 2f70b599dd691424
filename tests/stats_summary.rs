use chrono::NaiveDate;
use eurostat_macro::models::SeriesTable;
use eurostat_macro::stats::column_summary;

fn month(m: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, m, 1).unwrap()
}

#[test]
fn per_column_stats_with_even_and_odd_counts() {
    // AA: [4, 1, 3, 2] -> median 2.5; BB: [10, 30, 20] over three rows
    let table = SeriesTable {
        dates: vec![month(1), month(2), month(3), month(4)],
        columns: vec!["AA_hicp".into(), "BB_hicp".into()],
        values: vec![
            vec![4.0, 10.0],
            vec![1.0, 30.0],
            vec![3.0, 20.0],
            vec![2.0, 20.0],
        ],
    };
    let got = column_summary(&table);
    assert_eq!(got.len(), 2);

    let a = &got[0];
    assert_eq!(a.column, "AA_hicp");
    assert_eq!(a.count, 4);
    assert_eq!(a.min, Some(1.0));
    assert_eq!(a.max, Some(4.0));
    assert!((a.mean.unwrap() - 2.5).abs() < 1e-9);
    assert!((a.median.unwrap() - 2.5).abs() < 1e-9);
    assert_eq!(a.last, Some((month(4), 2.0)));

    let b = &got[1];
    assert_eq!(b.column, "BB_hicp");
    assert_eq!(b.median, Some(20.0));
    assert_eq!(b.mean, Some(20.0));
}

#[test]
fn columns_without_rows() {
    let table = SeriesTable {
        dates: vec![],
        columns: vec!["PL_gdp".into()],
        values: vec![],
    };
    let got = column_summary(&table);
    assert_eq!(got[0].count, 0);
    assert_eq!(got[0].mean, None);
    assert_eq!(got[0].median, None);
    assert_eq!(got[0].last, None);
}
