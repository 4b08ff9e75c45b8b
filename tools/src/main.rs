//! report-runner: headless report runner for the retail dashboard data.
//!
//! Usage:
//!   report-runner --entity hk --period 2511 --data-dir ./data
//!   report-runner --entity tw --period 2511 --json
//!   report-runner --entity hk --period 2511 --config profiles.json --no-bundled

use anyhow::{Context, Result};
use retail_report_core::{
    config::ReportConfig,
    period::ReportPeriod,
    report::{EntityReport, ReportEngine},
    source::{DirSource, SnapshotLoader},
    types::Entity,
};
use std::env;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let json_mode = args.iter().any(|a| a == "--json");
    let no_bundled = args.iter().any(|a| a == "--no-bundled");
    let data_dir = flag_value(&args, "--data-dir").unwrap_or("./data");
    let entity: Entity = flag_value(&args, "--entity")
        .unwrap_or("hk")
        .parse()
        .context("--entity must be hk or tw")?;
    let period = match flag_value(&args, "--period") {
        Some(code) => ReportPeriod::parse(code)?,
        None => anyhow::bail!("--period YYMM is required"),
    };

    let config = match flag_value(&args, "--config") {
        Some(path) => ReportConfig::load_file(path)?,
        None if Path::new(data_dir).join("config/report_profiles.json").exists() => {
            ReportConfig::load(data_dir)?
        }
        None => ReportConfig::builtin(),
    };

    if !json_mode {
        println!("Retail report runner");
        println!("  entity:    {entity}");
        println!("  period:    {period} ({})", period.code());
        println!("  data_dir:  {data_dir}");
        println!("  bundled:   {}", !no_bundled);
        println!();
    }

    let primary = Box::new(DirSource::new(data_dir));
    let loader = if no_bundled {
        SnapshotLoader::new(primary)
    } else {
        SnapshotLoader::with_bundled(primary)
    };

    let engine = ReportEngine::build(config);
    let report = match engine.load_and_run(&loader, entity, period) {
        Ok(report) => report,
        Err(e) => {
            log::error!("{e}");
            if json_mode {
                println!("{}", serde_json::json!({ "error": e.to_string() }));
                return Err(e.into());
            }
            anyhow::bail!("cannot load data for {entity} {period}: {e}");
        }
    };

    if json_mode {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn print_summary(report: &EntityReport) {
    println!("=== {} | {} ===", report.label, report.period);
    for origin in &report.origins {
        let note = if origin.fell_back { " (fallback)" } else { "" };
        println!("  {:?}: {}/{}{note}", origin.dataset, origin.source, origin.file);
    }

    if let Some(area) = report.area_efficiency() {
        println!();
        println!("=== AREA EFFICIENCY ===");
        for (label, m) in [("month", &area.current_month), ("ytd", &area.cumulative)] {
            println!(
                "  {label:<5} | {:>3} stores | {:>8.1} pyeong | {:>9.0}/pyeong | {:>7.0}/day | YOY {:>6.1}%",
                m.store_count, m.total_area, m.sales_per_area, m.daily_sales_per_area, m.yoy
            );
        }
        for line in &area.stores {
            let flag = match line.excluded {
                Some(reason) => format!(" [{reason:?}]"),
                None => String::new(),
            };
            println!(
                "    {:<6} {:<22} {:>12.0} | {:>9.0}/pyeong | YOY {:>6.1}%{flag}",
                line.code, line.store_name, line.sales, line.sales_per_area, line.sales_yoy
            );
        }
    }

    if let Some(regions) = report.regions() {
        println!();
        println!("=== REGIONS ({:?}) ===", regions.key);
        for (agg, yoy) in regions.current_month.groups.iter().zip(&regions.month_yoy) {
            println!(
                "  {:<18} | {:>3} stores | {:>7.0}/pyeong | eff {:>6.1}% | YOY {:>6.1}%",
                agg.region, agg.store_count, agg.sales_per_area, agg.efficiency_score, yoy.sales_yoy
            );
        }
        let total = &regions.current_month.total;
        println!(
            "  {:<18} | {:>3} stores | {:>7.0}/pyeong | eff {:>6.1}%",
            total.region, total.store_count, total.sales_per_area, total.efficiency_score
        );
    }

    if let Some(mix) = report.channel_mix() {
        println!();
        println!("=== CHANNEL MIX ===");
        for c in &mix.current_month.channels {
            println!(
                "  {:<8} | {:>12.0} | share {:>5.1}% | YOY {:>6.1}%",
                c.channel, c.sales, c.share, c.yoy
            );
        }
    }

    if let Some(pl) = report.profit_loss() {
        println!();
        println!("=== P&L ===");
        for row in &pl.current_month.rows {
            println!(
                "  {:<10} | net {:>12.0} | YOY {:>6.1}% | disc {:>5.1}% | OP margin {:>5.1}%",
                format!("{:?}", row.segment),
                row.net_sales,
                row.net_sales_yoy,
                row.discount_rate,
                row.operating_margin
            );
        }
    }

    if let Some(status) = report.store_status() {
        println!();
        println!("=== STORE STATUS ({:?}) ===", status.origin);
        println!("  profit improving:     {}", status.buckets.profit_improving.join(", "));
        println!("  profit deteriorating: {}", status.buckets.profit_deteriorating.join(", "));
        println!("  loss improving:       {}", status.buckets.loss_improving.join(", "));
        println!("  loss deteriorating:   {}", status.buckets.loss_deteriorating.join(", "));
    }

    for name in report.skipped() {
        println!("  ({name} skipped)");
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
