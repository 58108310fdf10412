use wbi_dash::format::{NO_DATA, NumberFormat};
use wbi_dash::{Observation, YearRange, reshape, reshape_over, widen};

fn obs(country: &str, year: i32, value: Option<f64>) -> Observation {
    Observation {
        country: country.into(),
        country_id: String::new(),
        year,
        value,
        iso3: None,
    }
}

fn fmt() -> NumberFormat {
    NumberFormat::default()
}

#[test]
fn empty_input_gives_empty_table() {
    assert!(reshape(&[], &fmt()).is_empty());
    let r = YearRange::new(2000, 2010).unwrap();
    assert!(reshape_over(&[], r, &fmt()).is_empty());
}

#[test]
fn every_year_country_pair_is_filled() {
    let rows = vec![
        obs("France", 2000, Some(1.0)),
        obs("France", 2002, Some(3.0)),
        obs("Germany", 2001, Some(2.0)),
    ];
    let t = reshape(&rows, &fmt());
    // 3 years x 2 countries
    assert_eq!(t.len(), 6);
    assert_eq!(t.years().into_iter().collect::<Vec<_>>(), [2000, 2001, 2002]);

    let missing: Vec<(i32, &str)> = t
        .rows
        .iter()
        .filter(|r| r.value.is_none())
        .map(|r| (r.year, r.country.as_str()))
        .collect();
    assert_eq!(
        missing,
        [(2000, "Germany"), (2001, "France"), (2002, "Germany")]
    );
    assert!(
        t.rows
            .iter()
            .filter(|r| r.value.is_none())
            .all(|r| r.formatted == NO_DATA)
    );
}

#[test]
fn input_order_does_not_matter() {
    let rows = vec![
        obs("France", 2000, Some(1.5e12)),
        obs("Germany", 2000, Some(2.0e12)),
        obs("France", 2001, None),
        obs("Germany", 2001, Some(2.1e12)),
        obs("Italy", 2001, Some(9.0e11)),
    ];
    let expected = reshape(&rows, &fmt());

    let mut reversed = rows.clone();
    reversed.reverse();
    assert_eq!(reshape(&reversed, &fmt()), expected);

    let mut rotated = rows.clone();
    rotated.rotate_left(2);
    assert_eq!(reshape(&rotated, &fmt()), expected);
}

#[test]
fn duplicates_resolve_to_greatest_value_in_any_order() {
    let a = vec![
        obs("France", 2000, Some(1.0)),
        obs("France", 2000, None),
        obs("France", 2000, Some(5.0)),
    ];
    let mut b = a.clone();
    b.reverse();

    let wa = widen(&a);
    let wb = widen(&b);
    assert_eq!(wa, wb);
    assert_eq!(wa.get(2000, "France"), Some(Some(5.0)));

    // A present value wins over a missing one.
    let c = vec![obs("France", 2000, Some(2.0)), obs("France", 2000, None)];
    assert_eq!(widen(&c).get(2000, "France"), Some(Some(2.0)));
}

#[test]
fn formatted_column_abbreviates() {
    let t = reshape(&[obs("France", 2000, Some(2_715_518_274_227.0))], &fmt());
    assert_eq!(t.rows[0].formatted, "2.72 trillion");
}

// France, 2015..=2020, data only for 2015..=2019.
#[test]
fn requested_span_is_padded() {
    let rows: Vec<Observation> = (2015..=2019)
        .map(|y| obs("France", y, Some(2.4e12 + y as f64)))
        .collect();
    let range = YearRange::new(2015, 2020).unwrap();
    let t = reshape_over(&rows, range, &fmt());

    assert_eq!(t.len(), 6);
    assert_eq!(t.rows.iter().filter(|r| r.value.is_some()).count(), 5);
    let last = t.rows.last().unwrap();
    assert_eq!((last.year, last.value), (2020, None));
    assert_eq!(last.formatted, NO_DATA);
}
