use serde::{Deserialize, Serialize};
use serde_json::Value;

use std::collections::{BTreeMap, BTreeSet};

use crate::{inventory::Inventory, sales::Sales};

/// Commercial metrics for one brand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandMetric {
    pub brand: String,
    pub revenue: f64,
    pub units: f64,
    /// Received cost per unit; `None` when no units were received.
    pub avg_unit_cost: Option<f64>,
    /// Unit cost as a percentage of the average across brands; 0 when there
    /// is no cost to compare.
    pub ppi_index: f64,
    pub sell_through_pct: f64,
    pub category_mix: BTreeMap<String, f64>,
    /// Set when the brand is placed in a document.
    pub revenue_share: f64,
    /// Per-period entries; always empty until periods are tracked.
    pub history: Vec<Value>,
}

/// Joins inventory and sales totals into metrics for every brand that
/// appears in either.
///
/// The PPI index compares each brand's average unit cost with the plain
/// (unweighted) mean of the average unit costs of all brands with received
/// stock. Sell-through is units sold as a fraction of units sold plus units
/// received. Revenue share is left at zero for the document to fill in.
#[must_use]
pub fn compute(inventory: &Inventory, sales: &Sales) -> BTreeMap<String, BrandMetric> {
    let overall = overall_avg_cost(inventory);
    let brands: BTreeSet<&str> = inventory
        .iter()
        .map(|(brand, _)| brand)
        .chain(sales.iter().map(|(brand, _)| brand))
        .collect();
    brands
        .into_iter()
        .map(|brand| {
            let received = inventory.get(brand).copied().unwrap_or_default();
            let sold = sales.get(brand).cloned().unwrap_or_default();
            let avg_unit_cost = received.avg_unit_cost();
            let metric = BrandMetric {
                brand: brand.to_string(),
                revenue: sold.revenue,
                units: sold.units,
                avg_unit_cost,
                ppi_index: ppi_index(avg_unit_cost, overall),
                sell_through_pct: sell_through(sold.units, received.quantity),
                category_mix: category_mix(&sold.categories),
                revenue_share: 0.0,
                history: Vec::new(),
            };
            (brand.to_string(), metric)
        })
        .collect()
}

/// Returns the mean of the average unit costs of brands with received stock,
/// or `None` if there are none.
#[must_use]
pub fn overall_avg_cost(inventory: &Inventory) -> Option<f64> {
    let costs: Vec<f64> = inventory
        .iter()
        .filter_map(|(_, received)| received.avg_unit_cost())
        .collect();
    if costs.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let count = costs.len() as f64;
    Some(costs.iter().sum::<f64>() / count)
}

#[must_use]
pub fn ppi_index(avg_unit_cost: Option<f64>, overall_avg_cost: Option<f64>) -> f64 {
    match (avg_unit_cost, overall_avg_cost) {
        (Some(cost), Some(overall)) if overall > 0.0 => cost / overall * 100.0,
        _ => 0.0,
    }
}

/// Returns `sold / (sold + received)`, kept within 0 and 1, or 0 when
/// nothing was sold or received.
#[must_use]
pub fn sell_through(sold: f64, received: f64) -> f64 {
    let total = sold + received;
    if total > 0.0 {
        (sold / total).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Returns each category's fraction of the categorised revenue, or an empty
/// mix when that revenue is not positive.
#[must_use]
pub fn category_mix(categories: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
    let total: f64 = categories.values().sum();
    if total <= 0.0 {
        return BTreeMap::new();
    }
    categories
        .iter()
        .map(|(category, revenue)| (category.clone(), revenue / total))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::Received;

    const EPSILON: f64 = 1e-9;

    fn inventory(brands: &[(&str, f64, f64)]) -> Inventory {
        let mut inventory = Inventory::default();
        for &(brand, cost, quantity) in brands {
            inventory.add(brand, Received { cost, quantity });
        }
        inventory
    }

    #[test]
    fn compute_fn_gives_ppi_of_100_for_average_cost_brand() {
        let inventory = inventory(&[("Acme", 1000.0, 100.0)]);
        let metrics = compute(&inventory, &Sales::default());
        let acme = &metrics["Acme"];
        assert_eq!(acme.avg_unit_cost, Some(10.0));
        assert_eq!(acme.ppi_index, 100.0);
        assert_eq!(acme.sell_through_pct, 0.0);
        assert_eq!(acme.revenue, 0.0);
    }

    #[test]
    fn compute_fn_defaults_cost_fields_for_sales_only_brand() {
        let inventory = inventory(&[("Acme", 1000.0, 100.0)]);
        let mut sales = Sales::default();
        sales.add("Hudson Valley", None, 50.0, 5000.0);
        let metrics = compute(&inventory, &sales);
        let hudson = &metrics["Hudson Valley"];
        assert_eq!(hudson.revenue, 5000.0);
        assert_eq!(hudson.units, 50.0);
        assert_eq!(hudson.avg_unit_cost, None);
        assert_eq!(hudson.ppi_index, 0.0);
        assert_eq!(hudson.sell_through_pct, 1.0);
        assert!(hudson.category_mix.is_empty());
        assert!(hudson.history.is_empty());
    }

    #[test]
    fn compute_fn_covers_union_of_inventory_and_sales_brands() {
        let inventory = inventory(&[("Acme", 10.0, 1.0), ("Blue Sky", 20.0, 2.0)]);
        let mut sales = Sales::default();
        sales.add("Blue Sky", Some("Vapes"), 1.0, 30.0);
        sales.add("Hudson Valley", Some("Flower"), 1.0, 40.0);
        let metrics = compute(&inventory, &sales);
        let brands: Vec<_> = metrics.keys().map(String::as_str).collect();
        assert_eq!(brands, ["Acme", "Blue Sky", "Hudson Valley"]);
        assert_eq!(metrics["Blue Sky"].revenue, 30.0);
    }

    #[test]
    fn compute_fn_excludes_brands_without_quantity_from_overall_average() {
        let inventory = inventory(&[
            ("Cheap", 500.0, 100.0),
            ("Dear", 1500.0, 100.0),
            ("Empty", 0.0, 0.0),
        ]);
        assert_eq!(overall_avg_cost(&inventory), Some(10.0));
        let metrics = compute(&inventory, &Sales::default());
        assert_eq!(metrics["Cheap"].ppi_index, 50.0);
        assert_eq!(metrics["Dear"].ppi_index, 150.0);
        assert_eq!(metrics["Empty"].avg_unit_cost, None);
        assert_eq!(metrics["Empty"].ppi_index, 0.0);
    }

    #[test]
    fn overall_avg_cost_fn_is_unweighted_mean_of_brand_averages() {
        let inventory = inventory(&[("Bulk", 1000.0, 1000.0), ("Boutique", 30.0, 1.0)]);
        assert_eq!(overall_avg_cost(&inventory), Some(15.5));
        assert_eq!(overall_avg_cost(&Inventory::default()), None);
    }

    #[test]
    fn ppi_index_fn_falls_back_to_zero_without_basis() {
        assert_eq!(ppi_index(Some(12.0), Some(8.0)), 150.0);
        assert_eq!(ppi_index(None, Some(8.0)), 0.0);
        assert_eq!(ppi_index(Some(12.0), None), 0.0);
        assert_eq!(ppi_index(Some(0.0), Some(0.0)), 0.0);
    }

    #[test]
    fn sell_through_fn_stays_between_zero_and_one() {
        assert_eq!(sell_through(0.0, 0.0), 0.0);
        assert_eq!(sell_through(50.0, 0.0), 1.0);
        assert_eq!(sell_through(25.0, 75.0), 0.25);
        assert_eq!(sell_through(-5.0, 10.0), 0.0);
        assert_eq!(sell_through(12.0, -2.0), 1.0);
        assert_eq!(sell_through(-5.0, 0.0), 0.0);
    }

    #[test]
    fn category_mix_fn_fractions_sum_to_one() {
        let categories = BTreeMap::from([
            ("Edibles".to_string(), 60.0),
            ("Flower".to_string(), 30.0),
            ("Vapes".to_string(), 10.0),
        ]);
        let mix = category_mix(&categories);
        assert!((mix["Edibles"] - 0.6).abs() < EPSILON);
        assert!((mix.values().sum::<f64>() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn category_mix_fn_is_empty_without_positive_category_revenue() {
        assert!(category_mix(&BTreeMap::new()).is_empty());
        let refunds = BTreeMap::from([("Edibles".to_string(), 0.0), ("Flower".to_string(), -5.0)]);
        assert!(category_mix(&refunds).is_empty());
    }
}
