// Undirected adjacency over validated node indices.
//
// Used by the force simulation to split each spring's correction between
// its endpoints (the end with fewer links moves more) and to soften
// parallel edges.

use std::collections::HashMap;

/// Edge counts per node pair and per node, counted bidirectionally.
#[derive(Debug, Clone)]
pub struct Adjacency {
    /// Edges between each unordered pair (a <= b).
    pair_counts: HashMap<(usize, usize), usize>,
    /// Total degree (edge count) per node. Self loops are not counted.
    degree: Vec<usize>,
}

impl Adjacency {
    pub fn from_links(node_count: usize, links: &[(usize, usize)]) -> Self {
        let mut pair_counts: HashMap<(usize, usize), usize> = HashMap::new();
        let mut degree = vec![0; node_count];
        for &(a, b) in links {
            if a == b || a >= node_count || b >= node_count {
                continue;
            }
            let pair = if a <= b { (a, b) } else { (b, a) };
            *pair_counts.entry(pair).or_default() += 1;
            degree[a] += 1;
            degree[b] += 1;
        }
        Self { pair_counts, degree }
    }

    /// Number of edges joining `a` and `b` in either direction.
    pub fn edge_count(&self, a: usize, b: usize) -> usize {
        let pair = if a <= b { (a, b) } else { (b, a) };
        self.pair_counts.get(&pair).copied().unwrap_or(0)
    }

    pub fn degree(&self, node: usize) -> usize {
        self.degree.get(node).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degree_counts_both_directions() {
        // A -> B -> C, plus a duplicate B -> A and a self loop on C
        let adj = Adjacency::from_links(3, &[(0, 1), (1, 2), (1, 0), (2, 2)]);

        assert_eq!(adj.degree(0), 2);
        assert_eq!(adj.degree(1), 3);
        assert_eq!(adj.degree(2), 1);
        assert_eq!(adj.edge_count(1, 0), 2);
        assert_eq!(adj.edge_count(2, 2), 0);
    }

    #[test]
    fn test_out_of_range_is_empty() {
        let adj = Adjacency::from_links(1, &[(0, 4)]);
        assert_eq!(adj.degree(0), 0);
        assert_eq!(adj.degree(5), 0);
    }
}
