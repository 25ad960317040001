//! Tests for cluster analysis over fixed worker inventories

#[cfg(test)]
mod analysis_tests {
    use crate::cloud::{ClusterDetails, ClusterSummary, WorkerRecord};
    use crate::cluster::{analyze_cluster, ClusterScore, PriceTable, OPTIMAL_RECOMMENDATION};
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn prices() -> PriceTable {
        PriceTable::new(BTreeMap::from([
            ("bx2.4x16".to_string(), 0.20),
            ("bx2.16x32".to_string(), 0.27),
            ("bx3d.16x64".to_string(), 0.59),
            ("mx2.8x64".to_string(), 0.59),
        ]))
    }

    fn cluster(name: &str, flavor: &str, zones: &[&str], per_zone: usize) -> ClusterDetails {
        let mut workers = Vec::new();
        for zone in zones {
            for i in 0..per_zone {
                workers.push(WorkerRecord {
                    id: format!("{}-{}", zone, i),
                    flavor: Some(flavor.to_string()),
                    location: Some(zone.to_string()),
                    ..Default::default()
                });
            }
        }

        ClusterDetails {
            cluster: ClusterSummary {
                id: format!("{}-id", name),
                name: name.to_string(),
                state: Some("normal".to_string()),
                created_date: Some("2024-01-01T00:00:00+0000".to_string()),
                region: Some("us-south".to_string()),
                ..Default::default()
            },
            workers,
        }
    }

    #[test]
    fn test_reference_cloud_cluster_scores_amber() {
        let details = cluster("prod", "bx3d.16x64", &["dal10", "dal12", "dal13"], 3);
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

        let analysis = analyze_cluster(&details, &prices(), now);

        assert_eq!(analysis.workers, 9);
        assert_eq!(analysis.zones, 3);
        assert!(analysis.priced);
        assert!((analysis.price_per_worker - 0.59).abs() < 1e-9);
        assert!((analysis.costs.hourly - 5.31).abs() < 1e-9);
        assert!((analysis.costs.monthly - 5.31 * 730.0).abs() < 1e-6);
        assert_eq!(analysis.score, ClusterScore::Amber);
        assert_eq!(analysis.cpu, 16);
        assert_eq!(analysis.memory, 64);
        assert_eq!(analysis.location, "us-south");
        assert_eq!(analysis.resource_group, "default");
        assert_eq!(analysis.created_date.as_deref(), Some("2024-01-01"));
        assert_eq!(analysis.uptime_days, 60);
        assert_eq!(analysis.uptime, "2 months");
        assert!((analysis.total_cost_to_date - analysis.costs.monthly * 2.0).abs() < 1e-6);

        assert_eq!(
            analysis.recommendations,
            vec![
                "⚠️ High cost detected - Consider downsizing or using fewer zones".to_string(),
                "💡 Using memory-dense flavor - Verify if high memory is needed".to_string(),
                "💰 Consider bx2.16x32 instead - Save $2102/month".to_string(),
            ]
        );
    }

    #[test]
    fn test_downsize_saving_rounds_half_up() {
        let prices = PriceTable::new(BTreeMap::from([
            ("bx2.16x32".to_string(), 0.75),
            ("bx3d.16x64".to_string(), 1.0),
        ]));
        // 0.25 × 3 workers × 730 = 547.5
        let details = cluster("edge", "bx3d.16x64", &["dal10", "dal12", "dal13"], 1);
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

        let analysis = analyze_cluster(&details, &prices, now);

        assert_eq!(
            analysis.recommendations.last().map(String::as_str),
            Some("💰 Consider bx2.16x32 instead - Save $548/month")
        );
    }

    #[test]
    fn test_provider_flavor_is_normalized_before_pricing() {
        let details = cluster("edge", "b3c.16x64.encrypted", &["dal10"], 1);
        let analysis = analyze_cluster(&details, &prices(), Utc::now());

        assert_eq!(analysis.flavor, "b3c.16x64.encrypted");
        assert_eq!(analysis.normalized_flavor, "bx3d.16x64");
        assert!(analysis.priced);
        assert_eq!(analysis.score, ClusterScore::Green);
    }

    #[test]
    fn test_unpriced_flavor_is_flagged() {
        let details = cluster("ml", "gx3.16x80.l4", &["dal10"], 2);
        let analysis = analyze_cluster(&details, &prices(), Utc::now());

        assert!(!analysis.priced);
        assert_eq!(analysis.costs.monthly, 0.0);
        assert_eq!(analysis.score, ClusterScore::Unpriced);
        assert!(analysis.recommendations[0].contains("No price found for flavor gx3.16x80.l4"));
    }

    #[test]
    fn test_dev_cluster_on_three_zones() {
        let details = cluster("team-dev", "bx2.4x16", &["dal10", "dal12", "dal13"], 1);
        let analysis = analyze_cluster(&details, &prices(), Utc::now());

        assert_eq!(analysis.score, ClusterScore::Green);
        assert_eq!(
            analysis.recommendations,
            vec!["💡 Dev/test environment with 3 zones - Consider using 1-2 zones to save costs"
                .to_string()]
        );
    }

    #[test]
    fn test_small_cluster_looks_optimal() {
        let details = cluster("api", "bx2.4x16", &["dal10", "dal12"], 1);
        let analysis = analyze_cluster(&details, &prices(), Utc::now());

        assert_eq!(analysis.recommendations, vec![OPTIMAL_RECOMMENDATION.to_string()]);
        assert!(analysis.uptime_days >= 0);
    }

    #[test]
    fn test_high_worker_count_warning() {
        let details = cluster("batch", "bx2.4x16", &["dal10"], 10);
        let analysis = analyze_cluster(&details, &prices(), Utc::now());

        assert!(analysis
            .recommendations
            .contains(&"⚠️ High worker count - Review if all workers are necessary".to_string()));
        assert_eq!(analysis.score, ClusterScore::Amber);
    }

    #[test]
    fn test_explicit_worker_resources_win_over_flavor_name() {
        let mut details = cluster("db", "mx2.8x64", &["dal10"], 1);
        details.workers[0].cpu = Some(12);
        details.workers[0].memory = Some(96);
        details.workers[0].disk = Some(250);

        let analysis = analyze_cluster(&details, &prices(), Utc::now());

        assert_eq!((analysis.cpu, analysis.memory, analysis.disk), (12, 96, 250));
    }

    #[test]
    fn test_cluster_without_workers() {
        let mut details = cluster("empty", "bx2.4x16", &[], 0);
        details.cluster.created_date = None;

        let analysis = analyze_cluster(&details, &prices(), Utc::now());

        assert_eq!(analysis.workers, 0);
        assert_eq!(analysis.flavor, "unknown");
        assert_eq!(analysis.score, ClusterScore::Unpriced);
        assert_eq!(analysis.created_date, None);
        assert_eq!(analysis.uptime, "0 days");
    }
}

#[cfg(test)]
mod aggregate_tests {
    use crate::cloud::{ClusterDetails, ClusterSummary, StaticClusterSource, WorkerRecord};
    use crate::cluster::{AnalyzerConfig, ClusterAnalyzer, PriceTable};
    use std::collections::BTreeMap;

    fn details(id: &str, flavor: &str, workers: usize) -> ClusterDetails {
        ClusterDetails {
            cluster: ClusterSummary {
                id: id.to_string(),
                name: id.to_string(),
                created_date: Some("2024-01-01T00:00:00Z".to_string()),
                ..Default::default()
            },
            workers: (0..workers)
                .map(|i| WorkerRecord {
                    id: format!("{}-w{}", id, i),
                    flavor: Some(flavor.to_string()),
                    zone: Some("dal10".to_string()),
                    ..Default::default()
                })
                .collect(),
        }
    }

    fn analyzer(concurrency: usize) -> ClusterAnalyzer {
        let prices = PriceTable::new(BTreeMap::from([
            ("bx2.4x16".to_string(), 0.20),
            ("bx2.16x32".to_string(), 0.27),
        ]));
        ClusterAnalyzer::new(
            prices,
            AnalyzerConfig {
                fetch_concurrency: concurrency,
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_failed_cluster_is_excluded_from_totals() {
        let source = StaticClusterSource::new(vec![
            details("a", "bx2.4x16", 2),
            details("b", "bx2.16x32", 3),
        ])
        .fail(
            ClusterSummary {
                id: "c".into(),
                name: "broken".into(),
                ..Default::default()
            },
            "upstream unavailable",
        );

        let aggregate = analyzer(2).analyze_all(&source).await.unwrap();

        assert_eq!(aggregate.total_clusters, 2);
        assert_eq!(aggregate.total_workers, 5);
        let expected_monthly = (0.20 * 2.0 + 0.27 * 3.0) * 730.0;
        assert!((aggregate.total_monthly_cost - expected_monthly).abs() < 1e-6);
        assert!((aggregate.total_yearly_cost - expected_monthly * 12.0).abs() < 1e-6);
        assert_eq!(aggregate.failed.len(), 1);
        assert_eq!(aggregate.failed[0].id, "c");
        assert_eq!(aggregate.score_counts.green, 2);
        assert_eq!(aggregate.score_counts.amber, 0);
    }

    #[tokio::test]
    async fn test_results_keep_listing_order() {
        let source = StaticClusterSource::new(
            (0..6).map(|i| details(&format!("c{}", i), "bx2.4x16", 1)).collect(),
        );

        let aggregate = analyzer(3).analyze_all(&source).await.unwrap();
        let ids: Vec<_> = aggregate.clusters.iter().map(|c| c.id.as_str()).collect();

        assert_eq!(ids, vec!["c0", "c1", "c2", "c3", "c4", "c5"]);
    }

    #[tokio::test]
    async fn test_empty_account() {
        let aggregate = analyzer(0)
            .analyze_all(&StaticClusterSource::default())
            .await
            .unwrap();

        assert_eq!(aggregate.total_clusters, 0);
        assert_eq!(aggregate.total_monthly_cost, 0.0);
        assert!(aggregate.clusters.is_empty());
    }
}
