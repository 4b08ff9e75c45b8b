//! Ratio formulas shared by every section.
//!
//! Division by zero is never an error here: an undefined ratio is 0.
//! Non-finite inputs are treated as 0 before any arithmetic.

use crate::{config::DiscountPolicy, numeric::finite_or_zero};

/// Thousand-currency ↔ whole-currency factor used by the daily rate.
pub const UNITS_PER_THOUSAND: f64 = 1000.0;

/// `sales / area`, or 0 when there is no area.
pub fn sales_per_area(sales: f64, area: f64) -> f64 {
    let (sales, area) = (finite_or_zero(sales), finite_or_zero(area));
    if area > 0.0 {
        sales / area
    } else {
        0.0
    }
}

/// Daily per-area sales in whole currency units.
///
/// `(per_area × 1000) / days`. The factor converts exports kept in
/// thousands of currency to whole units and stays fixed whatever the
/// source's scale.
pub fn daily_sales_per_area(per_area: f64, days: u32) -> f64 {
    let per_area = finite_or_zero(per_area);
    if days > 0 && per_area > 0.0 {
        (per_area * UNITS_PER_THOUSAND) / days as f64
    } else {
        0.0
    }
}

/// Direct profit as a percentage of sales.
pub fn efficiency_score(direct_profit: f64, sales: f64) -> f64 {
    let (profit, sales) = (finite_or_zero(direct_profit), finite_or_zero(sales));
    if sales != 0.0 {
        (profit / sales) * 100.0
    } else {
        0.0
    }
}

/// Year-over-year percentage. A non-positive base means there is nothing
/// to compare against and yields 0.
pub fn yoy(current: f64, previous: f64) -> f64 {
    let (current, previous) = (finite_or_zero(current), finite_or_zero(previous));
    if previous > 0.0 {
        (current / previous) * 100.0
    } else {
        0.0
    }
}

/// `(tag - net × multiplier) / tag × 100`, 0 without tag sales.
pub fn discount_rate(tag_sales: f64, net_sales: f64, policy: DiscountPolicy) -> f64 {
    let (tag, net) = (finite_or_zero(tag_sales), finite_or_zero(net_sales));
    if tag == 0.0 {
        return 0.0;
    }
    (tag - net * policy.net_sales_multiplier) / tag * 100.0
}

/// `part / total × 100`, 0 when the total is not positive.
pub fn share(part: f64, total: f64) -> f64 {
    let (part, total) = (finite_or_zero(part), finite_or_zero(total));
    if total > 0.0 {
        part / total * 100.0
    } else {
        0.0
    }
}

/// Operating profit as a percentage of net sales.
pub fn operating_margin(operating_profit: f64, net_sales: f64) -> f64 {
    efficiency_score(operating_profit, net_sales)
}
