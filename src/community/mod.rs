//! Community detection: partitions, modularity scoring and Louvain optimization

pub mod louvain;
pub mod modularity;

pub use louvain::{louvain_communities, louvain_from, CommunityResult};
pub use modularity::modularity;

use crate::error::{MetricsError, Result};
use serde::{Deserialize, Serialize};

/// Disjoint node sets covering a graph's nodes `0..n`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    communities: Vec<Vec<u32>>,
}

impl Partition {
    /// One community per node
    pub fn singletons(node_count: usize) -> Self {
        Self {
            communities: (0..node_count as u32).map(|n| vec![n]).collect(),
        }
    }

    /// Every node in one community (empty when there are no nodes)
    pub fn single(node_count: usize) -> Self {
        if node_count == 0 {
            return Self { communities: Vec::new() };
        }
        Self {
            communities: vec![(0..node_count as u32).collect()],
        }
    }

    /// Build from a community label per node; labels need not be contiguous
    pub fn from_assignment(assignment: &[usize]) -> Self {
        let mut relabel = std::collections::HashMap::new();
        let mut communities: Vec<Vec<u32>> = Vec::new();

        for (node, &label) in assignment.iter().enumerate() {
            let slot = *relabel.entry(label).or_insert_with(|| {
                communities.push(Vec::new());
                communities.len() - 1
            });
            communities[slot].push(node as u32);
        }

        Self { communities }
    }

    /// Build from explicit sets, checking they cover `0..node_count` exactly once
    pub fn from_communities(communities: Vec<Vec<u32>>, node_count: usize) -> Result<Self> {
        let partition = Self {
            communities: communities.into_iter().filter(|c| !c.is_empty()).collect(),
        };
        if !partition.covers(node_count) {
            let covered = partition.communities.iter().map(Vec::len).sum();
            return Err(MetricsError::InvalidPartition {
                covered,
                expected: node_count,
            });
        }
        Ok(partition)
    }

    /// Wrap communities already known to be a non-empty cover
    pub(crate) fn from_dense(communities: Vec<Vec<u32>>) -> Self {
        Self { communities }
    }

    /// Community label of each node
    pub fn assignment(&self, node_count: usize) -> Vec<usize> {
        let mut labels = vec![0; node_count];
        for (label, community) in self.communities.iter().enumerate() {
            for &node in community {
                labels[node as usize] = label;
            }
        }
        labels
    }

    /// Whether every node of `0..node_count` appears in exactly one community
    pub fn covers(&self, node_count: usize) -> bool {
        let mut seen = vec![false; node_count];
        for &node in self.communities.iter().flatten() {
            match seen.get_mut(node as usize) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
        seen.into_iter().all(|s| s)
    }

    pub fn len(&self) -> usize {
        self.communities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.communities.is_empty()
    }

    pub fn communities(&self) -> &[Vec<u32>] {
        &self.communities
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vec<u32>> {
        self.communities.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_roundtrip_relabels() {
        let partition = Partition::from_assignment(&[7, 7, 3, 7, 3]);
        assert_eq!(partition.communities(), &[vec![0, 1, 3], vec![2, 4]]);
        assert_eq!(partition.assignment(5), vec![0, 0, 1, 0, 1]);
        assert!(partition.covers(5));
    }

    #[test]
    fn test_cover_check() {
        assert!(Partition::from_communities(vec![vec![0, 1], vec![1]], 2).is_err());
        assert!(Partition::from_communities(vec![vec![0]], 2).is_err());
        let ok = Partition::from_communities(vec![vec![1], vec![], vec![0]], 2).unwrap();
        assert_eq!(ok.len(), 2);
    }

    #[test]
    fn test_trivial_partitions() {
        assert_eq!(Partition::singletons(3).len(), 3);
        assert_eq!(Partition::single(3).len(), 1);
        assert!(Partition::single(0).is_empty());
        assert!(Partition::singletons(0).covers(0));
    }
}
