//! Store selection: satellite merge, liquidation threshold, zero-area
//! exclusion and the brand, geography and channel filters.

use retail_report_core::{
    config::{ChannelScope, EntityProfile, GeoScope},
    period::Span,
    rules::{is_liquidating, ExclusionReason, SelectionBasis, Selector},
    snapshot::{DashboardSnapshot, PeriodFigures, StoreAreas, StoreRecord},
};

// ── Helpers ────────────────────────────────────────────────────────

fn store(code: &str, country: &str, channel: &str, sales: f64, prior_sales: f64) -> StoreRecord {
    StoreRecord {
        code: code.into(),
        store_name: format!("Store {code}"),
        brand: "MLB".into(),
        country: country.into(),
        channel: channel.into(),
        closed: false,
        current: PeriodFigures {
            net_sales: sales,
            tag_sales: sales * 1.2,
            direct_profit: sales * 0.1,
            ..PeriodFigures::default()
        },
        previous: PeriodFigures {
            net_sales: prior_sales,
            tag_sales: prior_sales * 1.2,
            direct_profit: prior_sales * 0.1,
            ..PeriodFigures::default()
        },
        ..StoreRecord::default()
    }
}

fn closed(mut record: StoreRecord) -> StoreRecord {
    record.closed = true;
    record
}

fn areas(pairs: &[(&str, f64)]) -> StoreAreas {
    pairs.iter().map(|(c, a)| (c.to_string(), *a)).collect()
}

// ── Satellite merge ────────────────────────────────────────────────

#[test]
fn satellite_folds_into_parent() {
    let profile = EntityProfile::hong_kong();
    let dashboard = DashboardSnapshot::from_records([
        store("M10", "HK", "Retail", 100.0, 90.0),
        store("M10A", "HK", "Retail", 20.0, 10.0),
    ]);
    let areas = areas(&[("M10", 10.0)]);

    let sel = Selector::area_scope(&profile).select(&dashboard, &areas, Span::Current, SelectionBasis::Area);
    assert_eq!(sel.codes(), vec!["M10"]);
    let m10 = sel.get("M10").unwrap();
    assert_eq!(m10.sales, 120.0);
    assert_eq!(m10.area, 10.0);
    assert_eq!(m10.merged, vec!["M10A".to_string()]);
    assert!(sel.get("M10A").is_none(), "satellite must not appear on its own");
}

#[test]
fn satellite_area_is_never_added() {
    let profile = EntityProfile::hong_kong();
    let dashboard = DashboardSnapshot::from_records([
        store("M10", "HK", "Retail", 100.0, 90.0),
        store("M10A", "HK", "Retail", 20.0, 10.0),
    ]);
    let areas = areas(&[("M10", 10.0), ("M10A", 4.0)]);

    let sel = Selector::area_scope(&profile).select(&dashboard, &areas, Span::Current, SelectionBasis::Area);
    assert_eq!(sel.total_area(), 10.0);
}

#[test]
fn orphan_satellite_stays_standalone() {
    let profile = EntityProfile::hong_kong();
    let dashboard = DashboardSnapshot::from_records([store("M10A", "HK", "Retail", 20.0, 10.0)]);
    let areas = areas(&[("M10A", 4.0)]);

    let sel = Selector::area_scope(&profile).select(&dashboard, &areas, Span::Current, SelectionBasis::Area);
    assert_eq!(sel.codes(), vec!["M10A"]);
    assert!(sel.get("M10A").unwrap().merged.is_empty());
}

/// The threshold check reads the merged sales, not the parent's alone.
#[test]
fn merge_happens_before_liquidation_check() {
    let profile = EntityProfile::hong_kong();
    // Parent alone: 5_000 / 1000 / 10 = 0.5 < 1 → would liquidate.
    // With satellite: 15_000 / 1000 / 10 = 1.5 → stays.
    let dashboard = DashboardSnapshot::from_records([
        closed(store("M10", "HK", "Retail", 5_000.0, 0.0)),
        store("M10A", "HK", "Retail", 10_000.0, 0.0),
    ]);
    let areas = areas(&[("M10", 10.0)]);

    let sel = Selector::area_scope(&profile).select(&dashboard, &areas, Span::Current, SelectionBasis::Area);
    assert_eq!(sel.codes(), vec!["M10"]);
    assert!(sel.excluded.is_empty());
}

// ── Liquidation ────────────────────────────────────────────────────

#[test]
fn liquidation_threshold_formula() {
    assert!(!is_liquidating(true, 5_000_000.0, 10.0, 1.0));
    assert!(is_liquidating(true, 5.0, 10.0, 1.0));
    assert!(!is_liquidating(false, 5.0, 10.0, 1.0), "open stores never liquidate");
    assert!(!is_liquidating(true, 5.0, 0.0, 1.0), "no area means no liquidation test");
    // Exactly at the threshold is not below it.
    assert!(!is_liquidating(true, 10_000.0, 10.0, 1.0));
}

#[test]
fn closed_store_with_healthy_sales_is_included() {
    let profile = EntityProfile::hong_kong();
    let dashboard = DashboardSnapshot::from_records([closed(store("M12", "HK", "Retail", 5_000_000.0, 0.0))]);
    let areas = areas(&[("M12", 10.0)]);

    let sel = Selector::area_scope(&profile).select(&dashboard, &areas, Span::Current, SelectionBasis::Area);
    assert_eq!(sel.codes(), vec!["M12"]);
    assert_eq!(sel.total_area(), 10.0);
}

#[test]
fn liquidating_store_leaves_area_totals() {
    let profile = EntityProfile::hong_kong();
    let dashboard = DashboardSnapshot::from_records([
        store("M01", "HK", "Retail", 1_000_000.0, 900_000.0),
        closed(store("M12", "HK", "Retail", 5.0, 0.0)),
    ]);
    let areas = areas(&[("M01", 20.0), ("M12", 10.0)]);
    let selector = Selector::area_scope(&profile);

    let by_area = selector.select(&dashboard, &areas, Span::Current, SelectionBasis::Area);
    assert_eq!(by_area.codes(), vec!["M01"]);
    assert_eq!(by_area.total_area(), 20.0);
    assert_eq!(by_area.is_excluded("M12"), Some(ExclusionReason::Liquidating));

    // Sales-based views still count the store's sales, with no area.
    let by_sales = selector.select(&dashboard, &areas, Span::Current, SelectionBasis::Sales);
    assert_eq!(by_sales.codes(), vec!["M01", "M12"]);
    assert_eq!(by_sales.get("M12").unwrap().area, 0.0);
    assert_eq!(by_sales.total_area(), 20.0);
}

/// Each span tests liquidation against its own sales.
#[test]
fn prior_year_uses_its_own_sales() {
    let profile = EntityProfile::hong_kong();
    let dashboard = DashboardSnapshot::from_records([closed(store("M12", "HK", "Retail", 5.0, 2_000_000.0))]);
    let areas = areas(&[("M12", 10.0)]);
    let selector = Selector::area_scope(&profile);

    let now = selector.select(&dashboard, &areas, Span::Current, SelectionBasis::Area);
    let before = selector.select(&dashboard, &areas, Span::Previous, SelectionBasis::Area);
    assert!(now.stores.is_empty());
    assert_eq!(before.codes(), vec!["M12"]);
    assert_eq!(before.total_sales(), 2_000_000.0);
}

// ── Zero area ──────────────────────────────────────────────────────

#[test]
fn stores_without_area_are_excluded_from_area_basis() {
    let profile = EntityProfile::hong_kong();
    let dashboard = DashboardSnapshot::from_records([
        store("M01", "HK", "Retail", 1000.0, 0.0),
        store("M02", "HK", "Retail", 500.0, 0.0),
        store("M03", "HK", "Retail", 700.0, 0.0),
    ]);
    let areas = areas(&[("M01", 10.0), ("M02", 0.0), ("M03", -3.0)]);

    let sel = Selector::area_scope(&profile).select(&dashboard, &areas, Span::Current, SelectionBasis::Area);
    assert_eq!(sel.codes(), vec!["M01"]);
    assert_eq!(sel.total_sales(), 1000.0);
    assert_eq!(sel.is_excluded("M02"), Some(ExclusionReason::NoArea));
    assert_eq!(sel.is_excluded("M03"), Some(ExclusionReason::NoArea));
}

// ── Filters ────────────────────────────────────────────────────────

#[test]
fn other_brands_never_participate() {
    let profile = EntityProfile::hong_kong();
    let mut other = store("M20", "HK", "Retail", 1000.0, 0.0);
    other.brand = "DISCOVERY".into();
    let dashboard = DashboardSnapshot::from_records([store("M01", "HK", "Retail", 500.0, 0.0), other]);
    let areas = areas(&[("M01", 10.0), ("M20", 10.0)]);

    let sel = Selector::new(&profile, GeoScope::All, ChannelScope::All).select(
        &dashboard,
        &areas,
        Span::Current,
        SelectionBasis::Sales,
    );
    assert_eq!(sel.codes(), vec!["M01"]);
}

#[test]
fn geography_scopes_follow_code_prefixes() {
    let profile = EntityProfile::hong_kong();
    let dashboard = DashboardSnapshot::from_records([
        store("M01", "HK", "Retail", 1.0, 0.0),
        store("MC01", "MC", "Retail", 1.0, 0.0),
        store("T01", "TW", "Retail", 1.0, 0.0),
    ]);
    let areas = StoreAreas::default();
    let codes = |geo| {
        Selector::new(&profile, geo, ChannelScope::All)
            .select(&dashboard, &areas, Span::Current, SelectionBasis::Sales)
            .codes()
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>()
    };

    assert_eq!(codes(GeoScope::HkOnly), vec!["M01"]);
    assert_eq!(codes(GeoScope::HkAndMacau), vec!["M01", "MC01"]);
    assert_eq!(codes(GeoScope::MacauOnly), vec!["MC01"]);
    assert_eq!(codes(GeoScope::All), vec!["M01", "MC01", "T01"]);
}

#[test]
fn online_prefix_excludes_store_from_offline_scope() {
    let profile = EntityProfile::taiwan();
    // Labelled Retail, but the TE prefix marks it online.
    let dashboard = DashboardSnapshot::from_records([
        store("T01", "TW", "Retail", 1000.0, 0.0),
        store("TE01", "TW", "Retail", 300.0, 0.0),
        store("T50", "TW", "Online", 200.0, 0.0),
    ]);
    let areas = areas(&[("T01", 10.0), ("TE01", 5.0), ("T50", 5.0)]);

    let offline = Selector::area_scope(&profile).select(&dashboard, &areas, Span::Current, SelectionBasis::Area);
    assert_eq!(offline.codes(), vec!["T01"]);

    let online = Selector::new(&profile, GeoScope::All, ChannelScope::Online).select(
        &dashboard,
        &areas,
        Span::Current,
        SelectionBasis::Sales,
    );
    assert_eq!(online.codes(), vec!["T50", "TE01"]);
}
