use wbi_dash::Observation;
use wbi_dash::format::NumberFormat;
use wbi_dash::map::{Bucket, ColorRange, MISSING_SENTINEL, MapFrame, NO_DATA_COLOR};

fn obs(iso3: &str, year: i32, value: Option<f64>) -> Observation {
    Observation {
        country: format!("Country {iso3}"),
        country_id: iso3[..2].to_string(),
        year,
        value,
        iso3: Some(iso3.to_string()),
    }
}

#[test]
fn sentinel_is_outside_the_data_range() {
    let range = ColorRange::from_values([MISSING_SENTINEL, 100.0, 500.0]);
    assert_eq!(range, ColorRange { min: 100.0, max: 500.0 });

    assert_eq!(range.bucket(MISSING_SENTINEL), Bucket::NoData);
    assert_eq!(range.color_for(MISSING_SENTINEL), NO_DATA_COLOR);
    assert_eq!(range.bucket(100.0), Bucket::Data(0.0));
    assert_eq!(range.bucket(500.0), Bucket::Data(1.0));
    assert_ne!(range.color_for(100.0), NO_DATA_COLOR);
}

#[test]
fn frame_uses_sentinel_for_missing_values() {
    let rows = vec![
        obs("AAA", 2010, None),
        obs("BBB", 2010, Some(100.0)),
        obs("CCC", 2010, Some(500.0)),
        obs("CCC", 2011, Some(9000.0)),
    ];
    let frame = MapFrame::for_year(&rows, 2010, &NumberFormat::default());

    assert_eq!(frame.rows.len(), 3);
    assert_eq!(frame.range, ColorRange { min: 100.0, max: 500.0 });

    let missing = &frame.rows[0];
    assert_eq!(missing.iso3, "AAA");
    assert_eq!(missing.value, MISSING_SENTINEL);
    assert_eq!(missing.formatted, "N/A");

    assert_eq!(frame.data_rows().count(), 2);
    assert_eq!(frame.no_data_rows().count(), 1);
}

#[test]
fn rows_without_iso3_stay_off_the_map() {
    let mut o = obs("AAA", 2010, Some(3.0));
    o.iso3 = None;
    let frame = MapFrame::for_year(&[o], 2010, &NumberFormat::default());
    assert!(frame.is_empty());
}

#[test]
fn single_value_range_still_colors() {
    let range = ColorRange::from_values([42.0]);
    assert_eq!(range.bucket(42.0), Bucket::Data(1.0));
}

#[test]
fn duplicate_rows_keep_greatest_value_in_any_order() {
    let a = vec![obs("AAA", 2010, Some(3.0)), obs("AAA", 2010, Some(7.0)), obs("AAA", 2010, None)];
    let mut b = a.clone();
    b.reverse();
    let fmt = NumberFormat::default();
    for rows in [a, b] {
        let frame = MapFrame::for_year(&rows, 2010, &fmt);
        assert_eq!(frame.rows.len(), 1);
        assert_eq!(frame.rows[0].value, 7.0);
    }
}
