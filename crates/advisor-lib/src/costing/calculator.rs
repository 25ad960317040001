use crate::models::{BaselineProfile, NodeFlavor, ZoneCount};
use serde::{Deserialize, Serialize};

/// Billing hours per month (fixed constant, not calendar-accurate)
pub const HOURS_PER_MONTH: f64 = 730.0;
/// Billing hours per year
pub const HOURS_PER_YEAR: f64 = 8760.0;

/// Hourly rate projected to month and year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostRates {
    pub hourly: f64,
    pub monthly: f64,
    pub yearly: f64,
}

impl CostRates {
    pub fn from_hourly(hourly: f64) -> Self {
        Self {
            hourly,
            monthly: hourly * HOURS_PER_MONTH,
            yearly: hourly * HOURS_PER_YEAR,
        }
    }
}

/// Projected spend for a baseline on a flavor across zones
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub workers: u32,
    pub zones: ZoneCount,
    pub total_nodes: u64,
    pub flavor_name: String,
    pub hourly_rate: f64,
    pub per_node: CostRates,
    /// One worker replicated across every zone
    pub per_worker: CostRates,
    pub total: CostRates,
    pub formula: String,
    pub calculation: String,
}

/// Compute the cost breakdown for `baseline.workers` nodes in each zone
///
/// Zero workers yields an all-zero breakdown rather than an error.
pub fn compute_costs(baseline: &BaselineProfile, flavor: &NodeFlavor, zones: ZoneCount) -> CostBreakdown {
    let workers = baseline.workers;
    let total_nodes = u64::from(workers) * u64::from(zones.get());
    let rate = flavor.hourly_rate;

    let per_node = CostRates::from_hourly(rate);
    let per_worker = CostRates::from_hourly(rate * zones.as_f64());
    let total = CostRates::from_hourly(rate * total_nodes as f64);

    CostBreakdown {
        workers,
        zones,
        total_nodes,
        flavor_name: flavor.name.clone(),
        hourly_rate: rate,
        per_node,
        per_worker,
        total,
        formula: format!("{} workers × {} zones × ${}/hr", workers, zones, rate),
        calculation: format!(
            "{} × {} × ${} = ${:.2}/hr",
            workers, zones, rate, total.hourly
        ),
    }
}

/// One entry of a [`CostComparison`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparedScenario {
    pub id: String,
    pub monthly: f64,
    pub diff_from_min: f64,
    pub diff_from_avg: f64,
    pub percent_diff_from_min: f64,
    pub is_cheapest: bool,
    pub is_most_expensive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostComparison {
    pub scenarios: Vec<ComparedScenario>,
    pub min: f64,
    pub max: f64,
    pub average: f64,
    pub range: f64,
    pub count: usize,
}

/// Compare monthly totals of several labelled breakdowns
///
/// Returns `None` for empty input.
pub fn compare_scenarios<'a, I>(entries: I) -> Option<CostComparison>
where
    I: IntoIterator<Item = (&'a str, &'a CostBreakdown)>,
{
    let entries: Vec<(&str, f64)> = entries
        .into_iter()
        .map(|(id, costs)| (id, costs.total.monthly))
        .collect();
    if entries.is_empty() {
        return None;
    }

    let min = entries.iter().map(|(_, c)| *c).fold(f64::INFINITY, f64::min);
    let max = entries.iter().map(|(_, c)| *c).fold(f64::NEG_INFINITY, f64::max);
    let average = entries.iter().map(|(_, c)| c).sum::<f64>() / entries.len() as f64;

    let scenarios = entries
        .iter()
        .map(|(id, cost)| {
            let diff_from_min = cost - min;
            ComparedScenario {
                id: id.to_string(),
                monthly: *cost,
                diff_from_min,
                diff_from_avg: cost - average,
                percent_diff_from_min: if min > 0.0 {
                    diff_from_min / min * 100.0
                } else {
                    0.0
                },
                is_cheapest: *cost == min,
                is_most_expensive: *cost == max,
            }
        })
        .collect();

    Some(CostComparison {
        scenarios,
        min,
        max,
        average,
        range: max - min,
        count: entries.len(),
    })
}

/// Savings from moving `current` to `alternative`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Savings {
    pub current_monthly: f64,
    pub alternative_monthly: f64,
    pub monthly: f64,
    pub yearly: f64,
    pub percent: f64,
    pub is_cheaper: bool,
    pub recommendation: String,
}

pub fn calculate_savings(current: &CostBreakdown, alternative: &CostBreakdown) -> Savings {
    let current_monthly = current.total.monthly;
    let alternative_monthly = alternative.total.monthly;
    let monthly = current_monthly - alternative_monthly;
    let is_cheaper = monthly > 0.0;

    Savings {
        current_monthly,
        alternative_monthly,
        monthly,
        yearly: monthly * 12.0,
        percent: if current_monthly > 0.0 {
            monthly / current_monthly * 100.0
        } else {
            0.0
        },
        is_cheaper,
        recommendation: if is_cheaper {
            format!("Switch to alternative to save ${:.2}/month", monthly.abs())
        } else {
            "Current configuration is more cost-effective".to_string()
        },
    }
}

/// An hourly rate projected over common billing periods
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostPeriods {
    pub hourly: f64,
    pub daily: f64,
    pub weekly: f64,
    pub monthly: f64,
    pub quarterly: f64,
    pub yearly: f64,
}

pub fn estimate_cost_periods(hourly: f64) -> CostPeriods {
    CostPeriods {
        hourly,
        daily: hourly * 24.0,
        weekly: hourly * 168.0,
        monthly: hourly * HOURS_PER_MONTH,
        quarterly: hourly * 2190.0,
        yearly: hourly * HOURS_PER_YEAR,
    }
}

/// Monthly cost divided across the provisioned resources
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceUnitCosts {
    pub per_worker: f64,
    pub per_node: f64,
    pub per_vcpu: f64,
    pub per_gb_ram: f64,
    pub per_gb_disk: f64,
}

pub fn cost_per_resource(costs: &CostBreakdown, baseline: &BaselineProfile) -> ResourceUnitCosts {
    let monthly = costs.total.monthly;
    let nodes = costs.total_nodes as f64;
    let share = |units: f64| if units > 0.0 { monthly / units } else { 0.0 };

    ResourceUnitCosts {
        per_worker: share(f64::from(costs.workers)),
        per_node: share(nodes),
        per_vcpu: share(f64::from(baseline.vcpu) * nodes),
        per_gb_ram: share(f64::from(baseline.ram_gb) * nodes),
        per_gb_disk: share(f64::from(baseline.disk_gb) * nodes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FlavorSeries;
    use proptest::prelude::*;

    fn baseline(workers: u32) -> BaselineProfile {
        BaselineProfile {
            id: "config-1".into(),
            name: "Core + Manage".into(),
            components: vec!["Core".into(), "Manage".into()],
            workers,
            vcpu: 16,
            ram_gb: 32,
            disk_gb: 250,
            description: String::new(),
            use_case: String::new(),
            industry_solutions: Vec::new(),
        }
    }

    fn flavor(rate: f64) -> NodeFlavor {
        NodeFlavor {
            id: "bx2-16x32".into(),
            name: "bx2.16x32".into(),
            series: FlavorSeries::Bx2,
            vcpu: 16,
            ram_gb: 32,
            storage_gb: 100,
            storage_type: "BLOCK".into(),
            network: "24Gbps".into(),
            hourly_rate: rate,
            category: "Balanced".into(),
            description: String::new(),
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_two_zone_breakdown() {
        let costs = compute_costs(&baseline(3), &flavor(0.74), ZoneCount::Two);

        assert_eq!(costs.total_nodes, 6);
        assert!(approx(costs.total.hourly, 4.44));
        assert!(approx(costs.total.monthly, 3241.2));
        assert!(approx(costs.total.yearly, 38894.4));
        assert!(approx(costs.per_node.hourly, 0.74));
        assert!(approx(costs.per_worker.hourly, 1.48));
        assert_eq!(costs.formula, "3 workers × 2 zones × $0.74/hr");
        assert_eq!(costs.calculation, "3 × 2 × $0.74 = $4.44/hr");
    }

    #[test]
    fn test_zero_workers_is_zero_cost() {
        let costs = compute_costs(&baseline(0), &flavor(0.74), ZoneCount::Three);

        assert_eq!(costs.total_nodes, 0);
        assert_eq!(costs.total.hourly, 0.0);
        assert_eq!(costs.total.monthly, 0.0);
        assert!(approx(costs.per_node.hourly, 0.74));
    }

    #[test]
    fn test_large_worker_count_does_not_overflow() {
        let costs = compute_costs(&baseline(2_000_000_000), &flavor(1.0), ZoneCount::Three);

        assert_eq!(costs.total_nodes, 6_000_000_000);
        assert!(approx(costs.total.hourly, 6_000_000_000.0));
        assert!(approx(costs.per_worker.hourly, 3.0));
    }

    #[test]
    fn test_compare_scenarios() {
        let cheap = compute_costs(&baseline(3), &flavor(0.5), ZoneCount::One);
        let pricey = compute_costs(&baseline(3), &flavor(1.0), ZoneCount::One);

        let comparison = compare_scenarios([("a", &cheap), ("b", &pricey)]).unwrap();

        assert_eq!(comparison.count, 2);
        assert!(comparison.scenarios[0].is_cheapest);
        assert!(comparison.scenarios[1].is_most_expensive);
        assert!(approx(comparison.scenarios[1].percent_diff_from_min, 100.0));
        assert!(approx(comparison.range, cheap.total.monthly));
        assert!(compare_scenarios(std::iter::empty::<(&str, &CostBreakdown)>()).is_none());
    }

    #[test]
    fn test_calculate_savings() {
        let current = compute_costs(&baseline(3), &flavor(1.0), ZoneCount::One);
        let alternative = compute_costs(&baseline(3), &flavor(0.5), ZoneCount::One);

        let savings = calculate_savings(&current, &alternative);
        assert!(savings.is_cheaper);
        assert!(approx(savings.monthly, 1095.0));
        assert!(approx(savings.yearly, 13140.0));
        assert!(approx(savings.percent, 50.0));
        assert_eq!(savings.recommendation, "Switch to alternative to save $1095.00/month");

        let reverse = calculate_savings(&alternative, &current);
        assert!(!reverse.is_cheaper);
        assert_eq!(reverse.recommendation, "Current configuration is more cost-effective");
    }

    #[test]
    fn test_cost_periods() {
        let periods = estimate_cost_periods(2.0);
        assert_eq!(periods.daily, 48.0);
        assert_eq!(periods.weekly, 336.0);
        assert_eq!(periods.monthly, 1460.0);
        assert_eq!(periods.quarterly, 4380.0);
        assert_eq!(periods.yearly, 17520.0);
    }

    #[test]
    fn test_cost_per_resource() {
        let b = baseline(3);
        let costs = compute_costs(&b, &flavor(1.0), ZoneCount::Two);
        let units = cost_per_resource(&costs, &b);

        assert!(approx(units.per_worker, 4380.0 / 3.0));
        assert!(approx(units.per_node, 730.0));
        assert!(approx(units.per_vcpu, 730.0 / 16.0));

        let empty = compute_costs(&baseline(0), &flavor(1.0), ZoneCount::Two);
        assert_eq!(cost_per_resource(&empty, &baseline(0)).per_node, 0.0);
    }

    proptest! {
        #[test]
        fn prop_projection_constants_hold(workers in 0u32..50, rate in 0.0f64..50.0, z in 1u8..=3) {
            let zones = ZoneCount::try_from(z).unwrap();
            let costs = compute_costs(&baseline(workers), &flavor(rate), zones);

            prop_assert_eq!(costs.total.monthly, costs.total.hourly * HOURS_PER_MONTH);
            prop_assert_eq!(costs.total.yearly, costs.total.hourly * HOURS_PER_YEAR);
            prop_assert_eq!(costs.total_nodes, u64::from(workers) * u64::from(z));
        }

        #[test]
        fn prop_compute_is_deterministic(workers in 0u32..50, rate in 0.0f64..50.0, z in 1u8..=3) {
            let zones = ZoneCount::try_from(z).unwrap();
            let first = compute_costs(&baseline(workers), &flavor(rate), zones);
            let second = compute_costs(&baseline(workers), &flavor(rate), zones);

            prop_assert_eq!(first.total.hourly.to_bits(), second.total.hourly.to_bits());
            prop_assert_eq!(first.total.monthly.to_bits(), second.total.monthly.to_bits());
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_more_zones_never_cheaper(workers in 0u32..50, rate in 0.0f64..50.0) {
            let b = baseline(workers);
            let f = flavor(rate);
            let monthly: Vec<f64> = ZoneCount::ALL
                .iter()
                .map(|z| compute_costs(&b, &f, *z).total.monthly)
                .collect();

            prop_assert!(monthly[0] <= monthly[1]);
            prop_assert!(monthly[1] <= monthly[2]);
        }
    }
}
