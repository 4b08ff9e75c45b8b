//! P&L summary: sales YOY, discount rate and operating margin per
//! sub-entity, plus the profit waterfall for the entity total.
//!
//! The P&L file is already aggregated; this section only derives ratios.
//! Discount rates use the entity's configured policy.

use crate::{
    config::{DiscountPolicy, EntityProfile},
    error::ReportResult,
    metrics,
    period::Span,
    section::{ReportInput, ReportSection, SectionOutput},
    snapshot::{PlLine, PlSegment, PlSnapshot},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlRow {
    pub segment: PlSegment,
    pub net_sales: f64,
    pub prior_net_sales: f64,
    pub net_sales_yoy: f64,
    pub tag_sales: f64,
    pub discount_rate: f64,
    pub prior_discount_rate: f64,
    pub operating_profit: f64,
    pub prior_operating_profit: f64,
    pub operating_profit_yoy: f64,
    pub operating_margin: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Start,
    Delta,
    Subtotal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterfallStep {
    pub label: String,
    pub kind: StepKind,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waterfall {
    pub steps: Vec<WaterfallStep>,
    /// Reported operating profit minus the one the steps arrive at.
    pub reconciliation_gap: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlTable {
    pub span: Span,
    pub rows: Vec<PlRow>,
    pub waterfall: Waterfall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitLossSummary {
    pub current_month: PlTable,
    pub cumulative: PlTable,
}

pub fn pl_row(segment: PlSegment, now: &PlLine, before: &PlLine, policy: DiscountPolicy) -> PlRow {
    PlRow {
        segment,
        net_sales: now.net_sales,
        prior_net_sales: before.net_sales,
        net_sales_yoy: metrics::yoy(now.net_sales, before.net_sales),
        tag_sales: now.tag_sales,
        discount_rate: metrics::discount_rate(now.tag_sales, now.net_sales, policy),
        prior_discount_rate: metrics::discount_rate(before.tag_sales, before.net_sales, policy),
        operating_profit: now.operating_profit,
        prior_operating_profit: before.operating_profit,
        operating_profit_yoy: metrics::yoy(now.operating_profit, before.operating_profit),
        operating_margin: metrics::operating_margin(now.operating_profit, now.net_sales),
    }
}

/// Tag sales down to operating profit.
pub fn waterfall(line: &PlLine) -> Waterfall {
    let discount = line.net_sales - line.tag_sales;
    let gross_profit = line.net_sales - line.cogs;
    let direct_profit = gross_profit - line.direct_cost;
    let operating_profit = direct_profit - line.sga;

    let step = |label: &str, kind: StepKind, amount: f64| WaterfallStep {
        label: label.to_string(),
        kind,
        amount,
    };

    let steps = vec![
        step("tag_sales", StepKind::Start, line.tag_sales),
        step("discount", StepKind::Delta, discount),
        step("net_sales", StepKind::Subtotal, line.net_sales),
        step("cogs", StepKind::Delta, -line.cogs),
        step("gross_profit", StepKind::Subtotal, gross_profit),
        step("direct_cost", StepKind::Delta, -line.direct_cost),
        step("direct_profit", StepKind::Subtotal, direct_profit),
        step("sga", StepKind::Delta, -line.sga),
        step("operating_profit", StepKind::Subtotal, operating_profit),
    ];

    Waterfall {
        steps,
        reconciliation_gap: line.operating_profit - operating_profit,
    }
}

pub fn pl_table(pl: &PlSnapshot, span: Span, policy: DiscountPolicy) -> PlTable {
    let now = pl.period(span);
    let before = pl.period(span.prior_year());
    let empty = PlLine::default();

    let rows = PlSegment::ORDER
        .iter()
        .filter_map(|seg| {
            let line = now.segment(*seg)?;
            let prior = before.segment(*seg).unwrap_or(&empty);
            Some(pl_row(*seg, line, prior, policy))
        })
        .collect();

    PlTable {
        span,
        rows,
        waterfall: waterfall(&now.total),
    }
}

pub struct ProfitLossSection;

impl ReportSection for ProfitLossSection {
    fn name(&self) -> &'static str {
        "profit_loss"
    }

    fn compute(&self, profile: &EntityProfile, input: &ReportInput) -> ReportResult<SectionOutput> {
        let Some(pl) = &input.pl else {
            return Ok(SectionOutput::Skipped {
                name: self.name().to_string(),
                reason: "no P&L snapshot loaded".into(),
            });
        };

        let current_month = pl_table(pl, Span::Current, profile.discount);
        let cumulative = pl_table(pl, Span::Cumulative, profile.discount);

        if let Some(total) = current_month.rows.first() {
            log::info!(
                "{} {}: net {:.0} YOY {:.1}% disc {:.1}% OP margin {:.1}%",
                input.entity,
                input.period,
                total.net_sales,
                total.net_sales_yoy,
                total.discount_rate,
                total.operating_margin
            );
        }
        if current_month.waterfall.reconciliation_gap.abs() > 0.5 {
            log::warn!(
                "{} {}: P&L lines miss reported operating profit by {:.0}",
                input.entity,
                input.period,
                current_month.waterfall.reconciliation_gap
            );
        }

        Ok(SectionOutput::ProfitLoss(ProfitLossSummary { current_month, cumulative }))
    }
}
