use ego_metrics::community::{louvain_communities, modularity, Partition};
use ego_metrics::config::LouvainConfig;
use ego_metrics::graph::ego;
use ego_metrics::metrics::{calculate_density, global_degrees, spectral_radius};
use ego_metrics::CompressedGraph;
use proptest::prelude::*;

type EdgeList = Vec<(u32, u32, f64)>;

fn edge_list(max_nodes: usize, max_edges: usize) -> impl Strategy<Value = (usize, EdgeList)> {
    (1..=max_nodes).prop_flat_map(move |n| {
        let edge = (0..n as u32, 0..n as u32, 1u8..4).prop_map(|(s, d, w)| (s, d, w as f64));
        (Just(n), prop::collection::vec(edge, 0..max_edges))
    })
}

fn relabelled() -> impl Strategy<Value = (usize, EdgeList, Vec<u32>, bool)> {
    edge_list(10, 30).prop_flat_map(|(n, edges)| {
        let perm = Just((0..n as u32).collect::<Vec<u32>>()).prop_shuffle();
        (Just(n), Just(edges), perm, any::<bool>())
    })
}

fn permute(edges: &EdgeList, perm: &[u32]) -> EdgeList {
    edges
        .iter()
        .map(|&(s, d, w)| (perm[s as usize], perm[d as usize], w))
        .collect()
}

/// Sorted nodes within `radius` hops of `source`, straight from the edge list
fn hop_ball(
    n: usize,
    edges: &EdgeList,
    source: u32,
    radius: usize,
    both_ways: bool,
) -> Vec<u32> {
    let mut reached = vec![false; n];
    reached[source as usize] = true;
    let mut frontier = vec![source];
    for _ in 0..radius {
        let mut next = Vec::new();
        for &(s, d, _) in edges {
            let mut hops = vec![];
            if frontier.contains(&s) {
                hops.push(d);
            }
            if both_ways && frontier.contains(&d) {
                hops.push(s);
            }
            for node in hops {
                if !reached[node as usize] {
                    reached[node as usize] = true;
                    next.push(node);
                }
            }
        }
        frontier = next;
    }
    (0..n as u32).filter(|&v| reached[v as usize]).collect()
}

/// Whether the directed edge list has a cycle, self-loops included (Kahn)
fn has_cycle(n: usize, edges: &EdgeList) -> bool {
    let mut in_degree = vec![0usize; n];
    for &(_, d, _) in edges {
        in_degree[d as usize] += 1;
    }
    let mut ready: Vec<u32> = (0..n as u32).filter(|&v| in_degree[v as usize] == 0).collect();
    let mut removed = 0;
    while let Some(v) = ready.pop() {
        removed += 1;
        for &(s, d, _) in edges {
            if s == v {
                in_degree[d as usize] -= 1;
                if in_degree[d as usize] == 0 {
                    ready.push(d);
                }
            }
        }
    }
    removed < n
}

fn with_ids(n: usize, directed: bool, edges: &EdgeList) -> CompressedGraph {
    let ids = (0..n).map(|i| format!("n{i}")).collect();
    CompressedGraph::from_edges(n, directed, edges).with_node_ids(ids)
}

proptest! {
    #[test]
    fn density_is_relabel_invariant((n, edges, perm, directed) in relabelled()) {
        let original = CompressedGraph::from_edges(n, directed, &edges);
        let shuffled = CompressedGraph::from_edges(n, directed, &permute(&edges, &perm));
        prop_assert_eq!(calculate_density(&original), calculate_density(&shuffled));
        if n <= 1 {
            prop_assert_eq!(calculate_density(&original), 0.0);
        }
    }

    #[test]
    fn spectral_radius_is_relabel_invariant((n, edges, perm, directed) in relabelled()) {
        let original = spectral_radius(&CompressedGraph::from_edges(n, directed, &edges));
        let permuted = permute(&edges, &perm);
        let shuffled = spectral_radius(&CompressedGraph::from_edges(n, directed, &permuted));
        prop_assert!(original >= 0.0);
        prop_assert!((original - shuffled).abs() <= 1e-6 * original.max(1.0));
    }

    #[test]
    fn ego_members_are_exactly_the_radius_ball(
        (n, edges) in edge_list(15, 40),
        radius in 0usize..4,
        bidirectional in any::<bool>(),
    ) {
        let store = with_ids(n, true, &edges);
        let ego = ego::extract(&store, "n0", radius, bidirectional).unwrap();

        prop_assert_eq!(ego.center_local, Some(0));
        prop_assert_eq!(ego.members[0], 0);

        let mut members = ego.members.clone();
        members.sort_unstable();
        prop_assert_eq!(members, hop_ball(n, &edges, 0, radius, bidirectional));

        // Induced: every store edge between members is kept
        let inside = edges
            .iter()
            .filter(|(s, d, _)| ego.members.contains(s) && ego.members.contains(d))
            .count();
        prop_assert_eq!(ego.edge_count(), inside);
    }

    #[test]
    fn directed_spectral_radius_tracks_cycles((n, edges) in edge_list(14, 40)) {
        // Every weight is at least 1, so a cycle forces a radius of at least 1
        let radius = spectral_radius(&CompressedGraph::from_edges(n, true, &edges));
        if n >= 2 && has_cycle(n, &edges) {
            prop_assert!(radius >= 1.0 - 1e-9, "cyclic graph gave {}", radius);
        } else {
            prop_assert_eq!(radius, 0.0);
        }
    }

    #[test]
    fn global_degrees_match_store((n, edges) in edge_list(12, 30)) {
        let store = with_ids(n, true, &edges);
        let degrees = global_degrees(&store, "n0").unwrap();
        let out = edges.iter().filter(|e| e.0 == 0).count();
        let inc = edges.iter().filter(|e| e.1 == 0).count();
        prop_assert_eq!(degrees.out_degree, out);
        prop_assert_eq!(degrees.in_degree, inc);
        prop_assert_eq!(degrees.total_degree, out + inc);
    }

    #[test]
    fn louvain_returns_a_valid_partition(
        (n, edges) in edge_list(12, 30),
        directed in any::<bool>(),
    ) {
        let graph = CompressedGraph::from_edges(n, directed, &edges);
        let result = louvain_communities(&graph, &LouvainConfig::default());

        prop_assert!(result.partition.covers(n));
        prop_assert!((result.modularity - modularity(&graph, &result.partition)).abs() < 1e-9);
        prop_assert!(result.modularity >= modularity(&graph, &Partition::singletons(n)) - 1e-9);
        prop_assert!(result.modularity <= 1.0 + 1e-9);
    }
}
