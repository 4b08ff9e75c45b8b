//! Region aggregation: folds a selection into per-group totals.
//!
//! Groups are always emitted in the caller's order, one entry per name,
//! including groups no store fell into. The grand total is the sum of the
//! emitted groups.

use crate::{metrics, rules::SelectedStore};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionAggregate {
    pub region: String,
    pub store_count: usize,
    pub total_sales: f64,
    pub total_area: f64,
    pub total_direct_profit: f64,
    pub total_rent: f64,
    pub total_labor_cost: f64,
    // Derived
    pub sales_per_area: f64,
    pub direct_profit_per_area: f64,
    pub rent_per_area: f64,
    pub labor_cost_per_area: f64,
    pub efficiency_score: f64,
}

impl RegionAggregate {
    pub fn zero(region: &str) -> Self {
        Self {
            region: region.to_string(),
            store_count: 0,
            total_sales: 0.0,
            total_area: 0.0,
            total_direct_profit: 0.0,
            total_rent: 0.0,
            total_labor_cost: 0.0,
            sales_per_area: 0.0,
            direct_profit_per_area: 0.0,
            rent_per_area: 0.0,
            labor_cost_per_area: 0.0,
            efficiency_score: 0.0,
        }
    }

    fn add_store(&mut self, store: &SelectedStore) {
        self.store_count += 1;
        self.total_sales += store.sales;
        self.total_area += store.area;
        self.total_direct_profit += store.direct_profit;
        self.total_rent += store.rent;
        self.total_labor_cost += store.labor_cost;
    }

    fn add_group(&mut self, other: &RegionAggregate) {
        self.store_count += other.store_count;
        self.total_sales += other.total_sales;
        self.total_area += other.total_area;
        self.total_direct_profit += other.total_direct_profit;
        self.total_rent += other.total_rent;
        self.total_labor_cost += other.total_labor_cost;
    }

    /// Recompute the derived ratios from the sums.
    fn derive(&mut self) {
        self.sales_per_area = metrics::sales_per_area(self.total_sales, self.total_area);
        self.direct_profit_per_area =
            metrics::sales_per_area(self.total_direct_profit, self.total_area);
        self.rent_per_area = metrics::sales_per_area(self.total_rent, self.total_area);
        self.labor_cost_per_area = metrics::sales_per_area(self.total_labor_cost, self.total_area);
        self.efficiency_score =
            metrics::efficiency_score(self.total_direct_profit, self.total_sales);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedAggregates {
    pub groups: Vec<RegionAggregate>,
    pub total: RegionAggregate,
    /// Stores whose group is not in the fixed order.
    pub unassigned: Vec<String>,
}

impl GroupedAggregates {
    pub fn group(&self, region: &str) -> Option<&RegionAggregate> {
        self.groups.iter().find(|g| g.region == region)
    }

    pub fn region_names(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.region.as_str()).collect()
    }
}

/// Sum a whole selection into one aggregate labelled `label`.
pub fn aggregate_all(stores: &[SelectedStore], label: &str) -> RegionAggregate {
    let mut agg = RegionAggregate::zero(label);
    for store in stores {
        agg.add_store(store);
    }
    agg.derive();
    agg
}

/// Group `stores` by `key` into the fixed `order`.
pub fn aggregate_by<F>(stores: &[SelectedStore], order: &[String], key: F) -> GroupedAggregates
where
    F: Fn(&SelectedStore) -> Option<String>,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<RegionAggregate> = Vec::new();
    for name in order {
        if !index.contains_key(name.as_str()) {
            index.insert(name.as_str(), groups.len());
            groups.push(RegionAggregate::zero(name));
        }
    }

    let mut unassigned = Vec::new();
    for store in stores {
        let slot = key(store).and_then(|k| index.get(k.as_str()).copied());
        match slot {
            Some(i) => groups[i].add_store(store),
            None => unassigned.push(store.code.clone()),
        }
    }

    if !unassigned.is_empty() {
        log::warn!(
            "{} store(s) outside the region list were left out of regional totals: {}",
            unassigned.len(),
            unassigned.join(", ")
        );
    }

    let mut total = RegionAggregate::zero("Total");
    for group in &mut groups {
        group.derive();
        total.add_group(group);
    }
    total.derive();

    GroupedAggregates { groups, total, unassigned }
}
