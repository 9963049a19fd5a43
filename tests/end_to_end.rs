use ego_metrics::community::{louvain_communities, louvain_from, modularity, Partition};
use ego_metrics::config::{Config, EgoConfig, LouvainConfig, MetricSelection};
use ego_metrics::graph::ego;
use ego_metrics::{compute_metrics, CompressedGraph, GraphBuilder};

const SCENARIO: [(&str, &str); 7] = [
    ("A", "B"),
    ("A", "C"),
    ("B", "D"),
    ("B", "E"),
    ("C", "F"),
    ("D", "E"),
    ("E", "F"),
];

fn scenario(directed: bool) -> CompressedGraph {
    let mut builder = GraphBuilder::default();
    if !directed {
        builder = builder.undirected();
    }
    for (src, dst) in SCENARIO {
        builder.add_edge(src, dst);
    }
    builder.build()
}

fn star(leaves: usize) -> CompressedGraph {
    let mut builder = GraphBuilder::default();
    for leaf in 0..leaves {
        builder.add_edge("center", &format!("leaf{leaf}"));
    }
    builder.build()
}

fn assert_close(actual: Option<f64>, expected: f64) {
    let actual = actual.expect("metric should be selected");
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn directed_scenario_metrics() {
    let store = scenario(true);
    let record = compute_metrics(&store, "A", &Config::default()).unwrap();

    assert_eq!(record.node_count, 6);
    assert_eq!(record.edge_count, 7);
    assert_close(record.density, 7.0 / 30.0);
    assert_close(record.clustering_coefficient, 0.0);
    assert_close(record.average_nearest_neighbor_degree, 2.5);
    assert_eq!(record.global_out_degree, 2);
    assert_eq!(record.global_in_degree, 0);
    assert_eq!(record.global_total_degree, 2);
    // Acyclic, so every eigenvalue is zero
    assert!(record.spectral_radius.unwrap().abs() < 1e-9);
}

#[test]
fn undirected_scenario_metrics() {
    let store = scenario(false);
    let record = compute_metrics(&store, "A", &Config::default()).unwrap();

    assert_eq!(record.node_count, 6);
    assert_eq!(record.edge_count, 7);
    assert_close(record.density, 7.0 / 15.0);
    assert_close(record.clustering_coefficient, 0.0);
    assert_close(record.average_nearest_neighbor_degree, 2.5);
    assert!(record.spectral_radius.unwrap() > 0.0);
    assert!(record.modularity.unwrap() >= 0.0);
}

#[test]
fn scenario_ego_membership() {
    let store = scenario(true);
    let ego = ego::extract(&store, "A", 2, true).unwrap();
    let mut ids: Vec<&str> = ego.members.iter().filter_map(|&m| store.node_id(m)).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["A", "B", "C", "D", "E", "F"]);

    // One hop only reaches the direct followings
    let ego = ego::extract(&store, "A", 1, true).unwrap();
    assert_eq!(ego.node_count(), 3);
    assert_eq!(ego.edge_count(), 2);
}

#[test]
fn star_single_community_and_clustering() {
    for directed in [true, false] {
        let mut store = star(6);
        if !directed {
            let edges: Vec<(u32, u32, f64)> = store.edge_triples().collect();
            let ids: Vec<String> = (0..store.node_count as u32)
                .map(|n| store.node_id(n).unwrap().to_string())
                .collect();
            store = CompressedGraph::from_edges(store.node_count, false, &edges).with_node_ids(ids);
        }

        let ego = ego::extract(&store, "center", 2, true).unwrap();
        let q = modularity(&ego.graph, &Partition::single(ego.node_count()));
        assert!(q.abs() < 1e-12, "directed={directed}: {q}");

        let record = compute_metrics(&store, "center", &Config::default()).unwrap();
        assert_close(record.clustering_coefficient, 0.0);
    }
}

#[test]
fn global_degrees_do_not_depend_on_radius() {
    let store = scenario(true);
    let degrees: Vec<(usize, usize, usize)> = (0..4)
        .map(|radius| {
            let config = Config {
                ego: EgoConfig {
                    radius,
                    ..EgoConfig::default()
                },
                min_ego_nodes: 1,
                ..Config::default()
            };
            let record = compute_metrics(&store, "E", &config).unwrap();
            (record.global_in_degree, record.global_out_degree, record.global_total_degree)
        })
        .collect();

    assert!(degrees.iter().all(|&d| d == (2, 1, 3)));
}

#[test]
fn louvain_is_idempotent_on_scenario() {
    let store = scenario(false);
    let ego = ego::extract(&store, "A", 2, true).unwrap();
    let config = LouvainConfig::default();

    let first = louvain_communities(&ego.graph, &config);
    assert!(first.partition.covers(ego.node_count()));

    let second = louvain_from(&ego.graph, first.partition.clone(), &config).unwrap();
    assert!(second.modularity <= first.modularity + 1e-12);
    assert_eq!(second.partition, first.partition);

    let directed = scenario(true);
    let ego = ego::extract(&directed, "A", 2, true).unwrap();
    let first = louvain_communities(&ego.graph, &config);
    let second = louvain_from(&ego.graph, first.partition.clone(), &config).unwrap();
    assert!(second.modularity <= first.modularity + 1e-12);
}

#[test]
fn cyclic_directed_ego_network_has_positive_radius() {
    let mut builder = GraphBuilder::default();
    for (src, dst) in SCENARIO {
        builder.add_edge(src, dst);
    }
    // Close loops back to the center and between B and E
    builder.add_edge("F", "A");
    builder.add_edge("E", "B");
    let store = builder.build();

    let record = compute_metrics(&store, "A", &Config::default()).unwrap();
    assert_eq!(record.node_count, 6);
    let radius = record.spectral_radius.unwrap();
    assert!(radius >= 1.0, "got {radius}");
    assert!(radius.is_finite());
}

#[test]
fn only_selected_metrics_are_reported() {
    let store = scenario(true);
    let config = Config {
        metrics: MetricSelection::from_numbers(&[2, 6]).unwrap(),
        ..Config::default()
    };
    let record = compute_metrics(&store, "A", &config).unwrap();

    assert!(record.density.is_none());
    assert!(record.spectral_radius.is_none());
    assert!(record.betweenness_centrality.is_none());
    assert!(record.clustering_coefficient.is_some());
    assert!(record.modularity.is_some());
}
