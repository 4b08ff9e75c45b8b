//! End-to-end report runs over the bundled Hong Kong and Taiwan snapshots.

use retail_report_core::{
    config::ReportConfig,
    period::ReportPeriod,
    profit_loss_section::waterfall,
    report::{EntityReport, ReportEngine},
    rules::ExclusionReason,
    section::{ReportInput, SectionOutput},
    snapshot::{PlLine, PlSegment, StoreStatusBuckets},
    source::{BundledSource, Dataset, SnapshotLoader},
    store_status_section::{BucketOrigin, StoreStatus},
    types::Entity,
};

// ── Helpers ────────────────────────────────────────────────────────

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn period() -> ReportPeriod {
    ReportPeriod::parse("2511").unwrap()
}

fn load(entity: Entity) -> ReportInput {
    init_logging();
    SnapshotLoader::new(Box::new(BundledSource))
        .load_input(entity, period())
        .unwrap()
}

fn run(entity: Entity) -> EntityReport {
    ReportEngine::build(ReportConfig::builtin()).run(&load(entity)).unwrap()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

// ── Engine ─────────────────────────────────────────────────────────

#[test]
fn sections_run_in_fixed_order() {
    let engine = ReportEngine::build(ReportConfig::builtin());
    assert_eq!(
        engine.section_names(),
        vec!["area_efficiency", "region_breakdown", "channel_mix", "profit_loss", "store_status"]
    );

    let report = run(Entity::Hk);
    assert_eq!(report.sections.len(), 5);
    assert!(matches!(report.sections[0], SectionOutput::AreaEfficiency(_)));
    assert!(matches!(report.sections[4], SectionOutput::StoreStatus(_)));
    assert!(report.skipped().is_empty());
}

#[test]
fn bundled_default_files_are_marked_as_fallback() {
    let report = run(Entity::Hk);
    assert_eq!(report.label, "Hong Kong / Macau");
    // No 2511 files are bundled, so periodic datasets fall back to the default.
    let dashboard = report
        .origins
        .iter()
        .find(|o| o.dataset == Dataset::Dashboard)
        .unwrap();
    assert_eq!(dashboard.file, "hk-dashboard-data.json");
    assert!(dashboard.fell_back);

    let areas = report
        .origins
        .iter()
        .find(|o| o.dataset == Dataset::StoreAreas)
        .unwrap();
    assert!(!areas.fell_back);
}

#[test]
fn missing_pl_skips_only_that_section() {
    let mut input = load(Entity::Hk);
    input.pl = None;
    let report = ReportEngine::build(ReportConfig::builtin()).run(&input).unwrap();

    assert_eq!(report.skipped(), vec!["profit_loss"]);
    assert!(report.area_efficiency().is_some());
    assert!(report.store_status().is_some());
}

#[test]
fn report_serializes_with_section_tags() {
    let report = run(Entity::Tw);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["entity"], "tw");
    assert_eq!(json["sections"][0]["section"], "area_efficiency");
    assert_eq!(json["sections"][3]["section"], "profit_loss");
}

// ── Area efficiency ────────────────────────────────────────────────

#[test]
fn hong_kong_area_efficiency() {
    let report = run(Entity::Hk);
    let area = report.area_efficiency().unwrap();
    let m = &area.current_month;

    // M01, M02, M05, M10 (+M10A). M12 is closed and liquidating this month.
    assert_eq!(m.store_count, 4);
    assert!(close(m.total_sales, 12_960_000.0));
    assert!(close(m.total_area, 206.0));
    assert_eq!(m.days, 30);
    assert!(close(m.sales_per_area, 12_960_000.0 / 206.0));
    assert!(close(m.daily_sales_per_area, m.sales_per_area * 1000.0 / 30.0));
    assert!(m
        .excluded
        .iter()
        .any(|e| e.code == "M12" && e.reason == ExclusionReason::Liquidating));

    // A year earlier M12 still traded well above the threshold.
    assert_eq!(m.prior_store_count, 5);
    assert!(close(m.prior_total_sales, 13_680_000.0));
    assert!(close(m.prior_total_area, 236.0));
    assert!(close(m.yoy, m.sales_per_area / m.prior_sales_per_area * 100.0));

    assert_eq!(area.cumulative.days, 334);
}

/// The headline figure and the regional breakdown share one unit.
#[test]
fn area_efficiency_and_regions_agree_on_units() {
    let report = run(Entity::Hk);
    let headline = &report.area_efficiency().unwrap().current_month;
    let hk = report.regions().unwrap().current_month.group("HK").unwrap();

    // Same four stores on both sides.
    assert_eq!(hk.store_count, headline.store_count);
    assert!(close(hk.sales_per_area, headline.sales_per_area));
}

#[test]
fn hong_kong_store_lines_merge_satellite() {
    let report = run(Entity::Hk);
    let area = report.area_efficiency().unwrap();

    let m10 = area.stores.iter().find(|l| l.code == "M10").unwrap();
    assert!(close(m10.sales, 3_010_000.0));
    assert_eq!(m10.merged, vec!["M10A".to_string()]);
    assert!(area.stores.iter().all(|l| l.code != "M10A"));

    let m12 = area.stores.iter().find(|l| l.code == "M12").unwrap();
    assert_eq!(m12.excluded, Some(ExclusionReason::Liquidating));
    assert_eq!(m12.area, 0.0);

    // Online and other-brand stores are outside the headline scope.
    assert!(area.stores.iter().all(|l| l.code != "ME01" && l.code != "X01"));
}

#[test]
fn taiwan_area_efficiency_excludes_online_prefix() {
    let report = run(Entity::Tw);
    let m = &report.area_efficiency().unwrap().current_month;
    assert_eq!(m.store_count, 5);
    assert!(close(m.total_sales, 15_250_000.0));
    assert!(close(m.total_area, 239.5));
}

// ── Regions ────────────────────────────────────────────────────────

#[test]
fn hong_kong_regions_by_country() {
    let report = run(Entity::Hk);
    let regions = report.regions().unwrap();

    assert_eq!(regions.current_month.region_names(), vec!["HK", "MC"]);
    assert_eq!(regions.current_month.group("HK").unwrap().store_count, 4);
    assert_eq!(regions.current_month.group("MC").unwrap().store_count, 2);
    assert_eq!(regions.month_yoy.len(), 2);
    assert!(regions.current_month.unassigned.is_empty());
}

#[test]
fn taiwan_regions_by_location() {
    let report = run(Entity::Tw);
    let grouped = &report.regions().unwrap().current_month;

    assert_eq!(grouped.region_names(), vec!["North", "Central", "South"]);
    assert_eq!(grouped.group("North").unwrap().store_count, 2);
    assert_eq!(grouped.group("Central").unwrap().store_count, 1);
    assert_eq!(grouped.group("South").unwrap().store_count, 2);
    assert!(close(grouped.total.total_sales, 15_250_000.0));
}

// ── Channel mix ────────────────────────────────────────────────────

#[test]
fn channel_shares_sum_to_one_hundred() {
    for entity in Entity::all() {
        let report = run(entity);
        let table = &report.channel_mix().unwrap().current_month;
        let sum: f64 = table.channels.iter().map(|c| c.share).sum();
        assert!(close(sum, 100.0), "{entity}: shares sum to {sum}");
    }
}

#[test]
fn online_channel_picks_up_prefixed_stores() {
    let hk = run(Entity::Hk);
    let online = hk
        .channel_mix()
        .unwrap()
        .current_month
        .channels
        .iter()
        .find(|c| c.channel == "Online")
        .unwrap()
        .sales;
    assert!(close(online, 880_000.0));

    // TE01 is labelled Retail but counts as Online.
    let tw = run(Entity::Tw);
    let channels = &tw.channel_mix().unwrap().current_month.channels;
    let online = channels.iter().find(|c| c.channel == "Online").unwrap();
    let retail = channels.iter().find(|c| c.channel == "Retail").unwrap();
    assert!(close(online.sales, 2_300_000.0));
    assert!(close(retail.sales, 13_650_000.0));
}

// ── P&L ────────────────────────────────────────────────────────────

#[test]
fn hong_kong_pl_rows_and_waterfall() {
    let report = run(Entity::Hk);
    let pl = report.profit_loss().unwrap();
    let segments: Vec<PlSegment> = pl.current_month.rows.iter().map(|r| r.segment).collect();
    assert_eq!(segments, PlSegment::ORDER.to_vec());

    let total = &pl.current_month.rows[0];
    assert!(close(total.discount_rate, (20_920_000.0 - 16_800_000.0) / 20_920_000.0 * 100.0));
    assert!(close(total.net_sales_yoy, 16_800_000.0 / 16_660_000.0 * 100.0));
    assert!(close(total.operating_margin, 1_310_000.0 / 16_800_000.0 * 100.0));

    let wf = &pl.current_month.waterfall;
    assert_eq!(wf.steps.first().unwrap().label, "tag_sales");
    assert_eq!(wf.steps.last().unwrap().label, "operating_profit");
    assert!(close(wf.steps.last().unwrap().amount, 1_310_000.0));
    assert!(close(wf.reconciliation_gap, 0.0));
}

#[test]
fn taiwan_discount_uses_vat_multiplier() {
    let report = run(Entity::Tw);
    let pl = report.profit_loss().unwrap();
    assert_eq!(pl.current_month.rows.len(), 2);

    let total = &pl.current_month.rows[0];
    let expected = (22_050_000.0 - 17_550_000.0 * 1.05) / 22_050_000.0 * 100.0;
    assert!(close(total.discount_rate, expected));
}

#[test]
fn waterfall_reports_gap_when_lines_disagree() {
    let line = PlLine {
        net_sales: 1000.0,
        tag_sales: 1200.0,
        operating_profit: 150.0,
        cogs: 400.0,
        direct_cost: 300.0,
        sga: 200.0,
        ..PlLine::default()
    };
    let wf = waterfall(&line);
    // 1000 - 400 - 300 - 200 = 100 against a reported 150.
    assert!(close(wf.steps.last().unwrap().amount, 100.0));
    assert!(close(wf.reconciliation_gap, 50.0));
    assert!(close(wf.steps[1].amount, -200.0));
}

// ── Store status ───────────────────────────────────────────────────

#[test]
fn hong_kong_store_status_is_derived() {
    let report = run(Entity::Hk);
    let status = report.store_status().unwrap();

    assert_eq!(status.origin, BucketOrigin::Derived);
    assert_eq!(status.buckets.profit_improving, vec!["M01", "M10", "MC01"]);
    assert_eq!(status.buckets.profit_deteriorating, vec!["M02"]);
    assert_eq!(status.buckets.loss_improving, vec!["M05"]);
    assert_eq!(status.buckets.loss_deteriorating, vec!["MC02"]);
    // Closed M12 is not bucketed.
    assert!(status.rows.iter().all(|r| r.code != "M12"));
    assert_eq!(status.buckets.total(), status.rows.len());
}

#[test]
fn provided_buckets_take_precedence() {
    let provided = StoreStatusBuckets {
        profit_improving: vec!["M02".into()],
        ..StoreStatusBuckets::default()
    };
    let input = load(Entity::Hk).with_status(provided.clone());
    let report = ReportEngine::build(ReportConfig::builtin()).run(&input).unwrap();
    let status = report.store_status().unwrap();

    assert_eq!(status.origin, BucketOrigin::Provided);
    assert_eq!(status.buckets, provided);
    assert!(!status.rows.is_empty());
}

#[test]
fn status_classification() {
    assert_eq!(StoreStatus::classify(100.0, 50.0), StoreStatus::ProfitImproving);
    assert_eq!(StoreStatus::classify(100.0, 150.0), StoreStatus::ProfitDeteriorating);
    assert_eq!(StoreStatus::classify(-10.0, -50.0), StoreStatus::LossImproving);
    assert_eq!(StoreStatus::classify(-10.0, 5.0), StoreStatus::LossDeteriorating);
    assert_eq!(StoreStatus::classify(0.0, 0.0), StoreStatus::LossImproving);
}
