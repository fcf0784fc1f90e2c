use crate::domain::model::{NodeId, RoadGraph};
use std::collections::HashMap;

/// Disjoint-set forest over dense indices, with path halving and union by size.
struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl UnionFind {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            size: vec![1; len],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
    }
}

/// Components of the graph with edge direction ignored.
///
/// Ordered by size descending, ties broken by the smallest node id; ids inside
/// a component are ascending. Edges touching unknown nodes are skipped.
pub fn weakly_connected_components(graph: &RoadGraph) -> Vec<Vec<NodeId>> {
    // BTreeMap iteration gives ascending ids, so index order matches id order.
    let ids: Vec<NodeId> = graph.nodes.keys().copied().collect();
    let index: HashMap<NodeId, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();

    let mut forest = UnionFind::new(ids.len());
    for edge in &graph.edges {
        if let (Some(&a), Some(&b)) = (index.get(&edge.source), index.get(&edge.target)) {
            forest.union(a, b);
        }
    }

    let mut groups: HashMap<usize, Vec<NodeId>> = HashMap::new();
    for (i, id) in ids.iter().enumerate() {
        let root = forest.find(i);
        groups.entry(root).or_default().push(*id);
    }

    let mut components: Vec<Vec<NodeId>> = groups.into_values().collect();
    components.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a[0].cmp(&b[0])));
    components
}

pub fn is_weakly_connected(graph: &RoadGraph) -> bool {
    !graph.is_empty() && weakly_connected_components(graph).len() == 1
}
