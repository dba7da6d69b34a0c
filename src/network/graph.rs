// src/network/graph.rs
//! Графовая часть сети: минимальное остовное дерево и обходы по нему.
//!
//! Вершины — центры крупных поселений (индексы), рёбра — найденные пути
//! между ними со стоимостью A*.

use petgraph::algo::dijkstra;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;

/// Ребро между центрами `a` и `b` со стоимостью пути
pub type WeightedEdge = (usize, usize, f32);

/// Краскал: индексы рёбер, вошедших в минимальный остов.
///
/// Рёбра перебираются по возрастанию стоимости (при равенстве — по
/// исходному порядку), перебор прекращается на `node_count - 1` рёбрах.
/// Для несвязного графа получается остовный лес.
pub fn minimum_spanning_edges(node_count: usize, edges: &[WeightedEdge]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..edges.len()).collect();
    order.sort_by(|&i, &j| edges[i].2.total_cmp(&edges[j].2).then(i.cmp(&j)));

    let mut sets = UnionFind::<usize>::new(node_count);
    let mut accepted = Vec::new();
    for idx in order {
        if accepted.len() + 1 >= node_count {
            break;
        }
        let (a, b, _) = edges[idx];
        if a < node_count && b < node_count && sets.union(a, b) {
            accepted.push(idx);
        }
    }
    accepted
}

/// Кратчайшие расстояния по набору рёбер от каждой вершины до каждой.
///
/// `None` — вершины в разных компонентах.
pub struct TreeDistances {
    rows: Vec<Vec<Option<f32>>>,
}

impl TreeDistances {
    pub fn new(node_count: usize, edges: &[WeightedEdge]) -> Self {
        let mut graph = UnGraph::<(), f32>::with_capacity(node_count, edges.len());
        let nodes: Vec<NodeIndex> = (0..node_count).map(|_| graph.add_node(())).collect();
        for &(a, b, cost) in edges {
            graph.add_edge(nodes[a], nodes[b], cost);
        }

        let rows = nodes
            .iter()
            .map(|&source| {
                let reached = dijkstra(&graph, source, None, |e| *e.weight());
                nodes.iter().map(|n| reached.get(n).copied()).collect()
            })
            .collect();
        Self { rows }
    }

    pub fn get(&self, a: usize, b: usize) -> Option<f32> {
        self.rows.get(a).and_then(|row| row.get(b).copied().flatten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total(edges: &[WeightedEdge], picked: &[usize]) -> f32 {
        picked.iter().map(|&i| edges[i].2).sum()
    }

    fn spans(node_count: usize, edges: &[WeightedEdge], picked: &[usize]) -> bool {
        let mut sets = UnionFind::<usize>::new(node_count);
        for &i in picked {
            sets.union(edges[i].0, edges[i].1);
        }
        (1..node_count).all(|n| sets.equiv(0, n))
    }

    /// Минимум по всем подмножествам из `n - 1` рёбер, образующим остов
    fn brute_force_minimum(node_count: usize, edges: &[WeightedEdge]) -> f32 {
        let mut best = f32::INFINITY;
        for mask in 0u32..(1 << edges.len()) {
            if mask.count_ones() as usize != node_count - 1 {
                continue;
            }
            let picked: Vec<usize> = (0..edges.len()).filter(|i| mask & (1 << i) != 0).collect();
            if spans(node_count, edges, &picked) {
                best = best.min(total(edges, &picked));
            }
        }
        best
    }

    #[test]
    fn test_mst_matches_brute_force() {
        let edges = vec![
            (0, 1, 4.0),
            (0, 2, 1.0),
            (1, 2, 2.0),
            (1, 3, 5.0),
            (2, 3, 8.0),
            (3, 4, 3.0),
            (2, 4, 9.0),
            (0, 4, 7.5),
        ];
        let picked = minimum_spanning_edges(5, &edges);
        assert_eq!(picked.len(), 4);
        assert!(spans(5, &edges, &picked));
        assert!((total(&edges, &picked) - brute_force_minimum(5, &edges)).abs() < 1e-5);
    }

    #[test]
    fn test_mst_equal_costs_keep_input_order() {
        let edges = vec![(0, 1, 1.0), (1, 2, 1.0), (0, 2, 1.0)];
        assert_eq!(minimum_spanning_edges(3, &edges), vec![0, 1]);
    }

    #[test]
    fn test_disconnected_graph_gives_forest() {
        let edges = vec![(0, 1, 2.0), (2, 3, 1.0)];
        let picked = minimum_spanning_edges(4, &edges);
        assert_eq!(picked, vec![1, 0]);
    }

    #[test]
    fn test_tree_distances() {
        let edges = vec![(0, 1, 2.0), (1, 2, 3.0)];
        let distances = TreeDistances::new(4, &edges);
        assert_eq!(distances.get(0, 2), Some(5.0));
        assert_eq!(distances.get(2, 0), Some(5.0));
        assert_eq!(distances.get(1, 1), Some(0.0));
        assert_eq!(distances.get(0, 3), None);
    }
}
