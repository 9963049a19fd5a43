//! Louvain modularity optimization.
//!
//! Each level runs local moving on the working graph: every node is moved
//! to the neighboring community with the largest strictly positive
//! modularity gain, pass after pass, until a pass moves nothing, the
//! oscillation guard trips or `max_iterations` passes have run. The
//! communities found are then collapsed into the nodes of the next working
//! graph. Levels stop once the modularity gain drops to `threshold`,
//! `max_levels` is reached or a level moves nothing.
//!
//! Reported modularity is always scored on the input graph with the
//! partition mapped back to its nodes, and only levels that strictly
//! improve it are kept.

use crate::community::modularity::modularity;
use crate::community::Partition;
use crate::config::LouvainConfig;
use crate::error::{MetricsError, Result};
use crate::graph::CompressedGraph;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Best partition found and its modularity on the input graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityResult {
    pub partition: Partition,
    pub modularity: f64,
    /// Levels that ran, including the final non-improving one
    pub levels: usize,
}

/// Outcome of one local-moving phase
#[derive(Debug, Clone)]
struct LevelOutcome {
    /// Dense community label per working-graph node
    labels: Vec<usize>,
    community_count: usize,
    moves: usize,
}

/// Run Louvain starting from singleton communities
pub fn louvain_communities(graph: &CompressedGraph, config: &LouvainConfig) -> CommunityResult {
    let n = graph.node_count;
    match louvain_from(graph, Partition::singletons(n), config) {
        Ok(result) => result,
        // Singletons always cover the graph
        Err(_) => CommunityResult {
            partition: Partition::singletons(n),
            modularity: 0.0,
            levels: 0,
        },
    }
}

/// Run Louvain starting from `initial`, which must cover the graph's nodes
pub fn louvain_from(
    graph: &CompressedGraph,
    initial: Partition,
    config: &LouvainConfig,
) -> Result<CommunityResult> {
    let n = graph.node_count;
    if !initial.covers(n) {
        return Err(MetricsError::InvalidPartition {
            covered: initial.iter().map(Vec::len).sum(),
            expected: n,
        });
    }

    if n == 0 || graph.total_weight() == 0.0 {
        return Ok(CommunityResult {
            partition: Partition::singletons(n),
            modularity: 0.0,
            levels: 0,
        });
    }

    let mut best = initial;
    let mut best_q = modularity(graph, &best);
    let mut working = coarsen(graph, &best.assignment(n), best.len());
    let mut levels = 0;

    while levels < config.max_levels {
        levels += 1;

        let outcome = one_level(&working, config);
        if outcome.moves == 0 {
            log::debug!("Louvain level {}: no moves, stopping", levels);
            break;
        }

        let candidate = compose(&best, n, &outcome);
        let q = modularity(graph, &candidate);
        let gain = q - best_q;

        log::debug!(
            "Louvain level {}: {} moves, {} communities, Q {:.6} (gain {:.6})",
            levels,
            outcome.moves,
            outcome.community_count,
            q,
            gain
        );

        if gain > 0.0 {
            best = candidate;
            best_q = q;
        }
        if gain <= config.threshold {
            break;
        }

        working = coarsen(&working, &outcome.labels, outcome.community_count);
    }

    Ok(CommunityResult {
        partition: best,
        modularity: best_q,
        levels,
    })
}

/// Local moving phase on the working graph
fn one_level(graph: &CompressedGraph, config: &LouvainConfig) -> LevelOutcome {
    let n = graph.node_count;
    let m = graph.total_weight();
    let directed = graph.directed;

    // Undirected graphs report the plain weighted degree for both
    let out_deg: Vec<f64> = (0..n).map(|u| graph.out_weight(u)).collect();
    let in_deg: Vec<f64> = (0..n).map(|u| graph.in_weight(u)).collect();
    let mut stot_out = out_deg.clone();
    let mut stot_in = in_deg.clone();

    let nbrs = neighbor_weights(graph);
    let mut node2com: Vec<usize> = (0..n).collect();

    // Null-model penalty of placing u next to a community's totals
    let penalty = |u: usize, stot_out: &[f64], stot_in: &[f64], c: usize| -> f64 {
        if directed {
            (out_deg[u] * stot_in[c] + in_deg[u] * stot_out[c]) / (m * m)
        } else {
            out_deg[u] * stot_out[c] / (2.0 * m * m)
        }
    };

    let mut total_moves = 0;
    let mut recent_moves: VecDeque<usize> = VecDeque::with_capacity(config.oscillation_window + 1);

    for pass in 1..=config.max_iterations {
        let mut moves = 0;

        for u in 0..n {
            let current = node2com[u];

            let mut weights2com: BTreeMap<usize, f64> = BTreeMap::new();
            for &(v, w) in &nbrs[u] {
                *weights2com.entry(node2com[v as usize]).or_insert(0.0) += w;
            }

            stot_out[current] -= out_deg[u];
            stot_in[current] -= in_deg[u];

            let own = weights2com.get(&current).copied().unwrap_or(0.0);
            let remove_cost = -own / m + penalty(u, &stot_out, &stot_in, current);

            let mut best_gain = 0.0;
            let mut best_com = current;
            for (&c, &wt) in &weights2com {
                let gain = remove_cost + wt / m - penalty(u, &stot_out, &stot_in, c);
                if gain > best_gain {
                    best_gain = gain;
                    best_com = c;
                }
            }

            stot_out[best_com] += out_deg[u];
            stot_in[best_com] += in_deg[u];

            if best_com != current {
                node2com[u] = best_com;
                moves += 1;
            }
        }

        total_moves += moves;
        if moves == 0 {
            break;
        }

        recent_moves.push_back(moves);
        if recent_moves.len() > config.oscillation_window {
            recent_moves.pop_front();
        }
        if recent_moves.len() == config.oscillation_window
            && recent_moves.iter().all(|&count| count == moves)
        {
            log::debug!(
                "Oscillation detected after {} passes ({} moves per pass), stopping level",
                pass,
                moves
            );
            break;
        }
    }

    let (labels, community_count) = renumber(&node2com);
    LevelOutcome {
        labels,
        community_count,
        moves: total_moves,
    }
}

/// Summed edge weight to each distinct neighbor, both directions, self-loops skipped
fn neighbor_weights(graph: &CompressedGraph) -> Vec<Vec<(u32, f64)>> {
    (0..graph.node_count)
        .map(|u| {
            let mut weights: BTreeMap<u32, f64> = BTreeMap::new();
            let outgoing = graph.outgoing_edges(u).iter().zip(graph.outgoing_weights(u));
            let incoming = graph.incoming_edges(u).iter().zip(graph.incoming_weights(u));
            for (&v, &w) in outgoing.chain(incoming) {
                if v as usize != u {
                    *weights.entry(v).or_insert(0.0) += w;
                }
            }
            weights.into_iter().collect()
        })
        .collect()
}

/// Map arbitrary community IDs to `0..k` in order of first appearance
fn renumber(node2com: &[usize]) -> (Vec<usize>, usize) {
    let mut mapping: BTreeMap<usize, usize> = BTreeMap::new();
    let mut labels = Vec::with_capacity(node2com.len());
    for &c in node2com {
        let next = mapping.len();
        labels.push(*mapping.entry(c).or_insert(next));
    }
    (labels, mapping.len())
}

/// Collapse communities into nodes; edge weights are summed per community pair
fn coarsen(graph: &CompressedGraph, labels: &[usize], community_count: usize) -> CompressedGraph {
    let mut weights: BTreeMap<(u32, u32), f64> = BTreeMap::new();
    for (src, dst, w) in graph.edge_triples() {
        let cu = labels[src as usize] as u32;
        let cv = labels[dst as usize] as u32;
        let key = if graph.directed || cu <= cv { (cu, cv) } else { (cv, cu) };
        *weights.entry(key).or_insert(0.0) += w;
    }

    let edges: Vec<(u32, u32, f64)> = weights.into_iter().map(|((u, v), w)| (u, v, w)).collect();
    CompressedGraph::from_edges(community_count, graph.directed, &edges)
}

/// Push a level's result down to the input graph's nodes.
///
/// Working-graph node `i` is community `i` of `current`, so each original
/// node takes the new label of its current community.
fn compose(current: &Partition, node_count: usize, outcome: &LevelOutcome) -> Partition {
    let mut communities: Vec<Vec<u32>> = vec![Vec::new(); outcome.community_count];
    for (node, label) in current.assignment(node_count).into_iter().enumerate() {
        communities[outcome.labels[label]].push(node as u32);
    }
    Partition::from_dense(communities)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_triangles(directed: bool) -> CompressedGraph {
        CompressedGraph::from_edges(
            6,
            directed,
            &[
                (0, 1, 1.0),
                (1, 2, 1.0),
                (2, 0, 1.0),
                (3, 4, 1.0),
                (4, 5, 1.0),
                (5, 3, 1.0),
                (2, 3, 1.0),
            ],
        )
    }

    fn same(labels: &[usize], nodes: &[usize]) -> bool {
        nodes.iter().all(|&n| labels[n] == labels[nodes[0]])
    }

    #[test]
    fn test_two_triangles_split() {
        for directed in [false, true] {
            let g = two_triangles(directed);
            let result = louvain_communities(&g, &LouvainConfig::default());
            let labels = result.partition.assignment(6);

            assert!(result.partition.covers(6));
            assert!(same(&labels, &[0, 1, 2]), "directed={directed}");
            assert!(same(&labels, &[3, 4, 5]), "directed={directed}");
            assert_ne!(labels[0], labels[3]);
            assert!((result.modularity - modularity(&g, &result.partition)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_rerun_from_result_finds_nothing_better() {
        let g = two_triangles(false);
        let config = LouvainConfig::default();
        let first = louvain_communities(&g, &config);
        let second = louvain_from(&g, first.partition.clone(), &config).unwrap();

        assert!(second.modularity <= first.modularity + 1e-12);
        assert_eq!(second.partition, first.partition);
    }

    #[test]
    fn test_zero_weight_returns_singletons() {
        let g = CompressedGraph::from_edges(4, true, &[]);
        let result = louvain_communities(&g, &LouvainConfig::default());
        assert_eq!(result.partition, Partition::singletons(4));
        assert_eq!(result.modularity, 0.0);
        assert_eq!(result.levels, 0);
    }

    #[test]
    fn test_empty_graph() {
        let g = CompressedGraph::from_edges(0, false, &[]);
        let result = louvain_communities(&g, &LouvainConfig::default());
        assert!(result.partition.is_empty());
    }

    #[test]
    fn test_invalid_initial_partition() {
        let g = two_triangles(false);
        let bad = Partition::singletons(3);
        assert!(matches!(
            louvain_from(&g, bad, &LouvainConfig::default()),
            Err(MetricsError::InvalidPartition { expected: 6, .. })
        ));
    }

    #[test]
    fn test_single_pass_cap_still_terminates() {
        let g = two_triangles(false);
        let config = LouvainConfig {
            max_iterations: 1,
            max_levels: 1,
            ..LouvainConfig::default()
        };
        let result = louvain_communities(&g, &config);
        assert!(result.partition.covers(6));
        assert_eq!(result.levels, 1);
        assert!(result.modularity >= modularity(&g, &Partition::singletons(6)));
    }

    #[test]
    fn test_renumber_is_dense() {
        let (labels, k) = renumber(&[4, 4, 1, 9, 1]);
        assert_eq!(labels, vec![0, 0, 1, 2, 1]);
        assert_eq!(k, 3);
    }

    #[test]
    fn test_coarsen_preserves_total_weight() {
        let g = two_triangles(false);
        let coarse = coarsen(&g, &[0, 0, 0, 1, 1, 1], 2);
        assert_eq!(coarse.node_count, 2);
        assert_eq!(coarse.total_weight(), g.total_weight());
        assert_eq!(coarse.edge_weight(0, 0), 3.0);
        assert_eq!(coarse.edge_weight(0, 1), 1.0);

        let partition = Partition::from_assignment(&[0, 0, 0, 1, 1, 1]);
        let coarse_q = modularity(&coarse, &Partition::singletons(2));
        assert!((coarse_q - modularity(&g, &partition)).abs() < 1e-12);
    }
}
