// src/network/merge.rs
//! Слияние маршрутов в непересекающиеся полилинии.
//!
//! Все пути раскладываются на рёбра между соседними гексами, из них
//! строится граф смежности. Полилинии тянутся между «узловыми» гексами
//! (степень не равна 2) через цепочки гексов степени 2. Оставшиеся
//! замкнутые кольца без узлов обходятся отдельным проходом.
//! Каждое ребро попадает ровно в одну полилинию.

use super::EdgeSet;
use crate::hex::HexCoord;
use std::collections::{BTreeMap, BTreeSet};

type Adjacency = BTreeMap<HexCoord, BTreeSet<HexCoord>>;

/// Сливает пути в полилинии без повторяющихся рёбер
pub fn merge_paths(paths: &[Vec<HexCoord>]) -> Vec<Vec<HexCoord>> {
    let mut adjacency: Adjacency = BTreeMap::new();
    for path in paths {
        for pair in path.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a == b {
                continue;
            }
            adjacency.entry(a).or_default().insert(b);
            adjacency.entry(b).or_default().insert(a);
        }
    }

    let junctions: BTreeSet<HexCoord> = adjacency
        .iter()
        .filter(|(_, neighbors)| neighbors.len() != 2)
        .map(|(coord, _)| *coord)
        .collect();

    let mut visited = EdgeSet::default();
    let mut polylines = Vec::new();

    for &start in &junctions {
        for &next in &adjacency[&start] {
            if !visited.contains(start, next) {
                polylines.push(walk(&adjacency, &junctions, &mut visited, start, next));
            }
        }
    }

    // Кольца, в которых все гексы степени 2
    for (&start, neighbors) in &adjacency {
        for &next in neighbors {
            if !visited.contains(start, next) {
                polylines.push(walk(&adjacency, &junctions, &mut visited, start, next));
            }
        }
    }

    polylines
}

fn walk(
    adjacency: &Adjacency,
    junctions: &BTreeSet<HexCoord>,
    visited: &mut EdgeSet,
    start: HexCoord,
    first: HexCoord,
) -> Vec<HexCoord> {
    let mut line = vec![start, first];
    visited.insert(start, first);
    let mut current = first;

    while !junctions.contains(&current) {
        let next = adjacency
            .get(&current)
            .and_then(|ns| ns.iter().find(|n| !visited.contains(current, **n)).copied());
        let Some(next) = next else {
            break;
        };
        visited.insert(current, next);
        line.push(next);
        current = next;
    }
    line
}
