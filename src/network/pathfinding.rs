// src/network/pathfinding.rs
//! A* по гексам с учётом стоимости местности
//!
//! - Приоритет: `f = g + h`, где `g` — накопленная стоимость, `h` — гекс-расстояние
//!   до цели, умноженное на минимальную стоимость шага (эвристика допустима).
//! - Вход в гекс стоит по таблице местности; вода и горы непроходимы.
//! - Если ребро уже принадлежит построенному пути — вход стоит `reuse_cost`,
//!   это стягивает новые маршруты в общие коридоры.

use super::EdgeSet;
use crate::config::TerrainCosts;
use crate::hex::HexCoord;
use crate::map::HexMap;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Результат поиска пути. `Unreachable` — не ошибка: соединение просто пропускается.
#[derive(Debug, Clone, PartialEq)]
pub enum PathResult {
    Found { hexes: Vec<HexCoord>, cost: f32 },
    Unreachable,
}

impl PathResult {
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, PathResult::Found { .. })
    }
}

/// Стоимости для одного поиска
#[derive(Debug, Clone, Copy)]
pub struct PathCosts<'a> {
    pub terrain: &'a TerrainCosts,
    pub reuse_cost: f32,
    pub reused: &'a EdgeSet,
}

impl PathCosts<'_> {
    fn min_step(&self) -> f32 {
        let terrain_min = self.terrain.min_cost();
        if self.reused.is_empty() {
            terrain_min
        } else {
            terrain_min.min(self.reuse_cost)
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Node {
    f: f32,
    g: f32,
    idx: usize,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Node {}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        // Обратный порядок для min-кучи: меньший f первым,
        // при равенстве — больший g (ближе к цели), затем меньший индекс
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| self.g.total_cmp(&other.g))
            .then_with(|| other.idx.cmp(&self.idx))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Ищет путь минимальной стоимости от `start` до `goal`
pub fn find_path(map: &HexMap, start: HexCoord, goal: HexCoord, costs: &PathCosts<'_>) -> PathResult {
    let (Some(start_idx), Some(goal_idx)) = (map.index(start), map.index(goal)) else {
        return PathResult::Unreachable;
    };
    let passable = |idx: usize| costs.terrain.cost(map.cell(idx).terrain).is_some();
    if !passable(start_idx) || !passable(goal_idx) {
        return PathResult::Unreachable;
    }
    if start_idx == goal_idx {
        return PathResult::Found {
            hexes: vec![start],
            cost: 0.0,
        };
    }

    let min_step = costs.min_step();
    let heuristic = |coord: HexCoord| coord.distance(goal) as f32 * min_step;

    let mut g_scores = vec![f32::INFINITY; map.len()];
    let mut came_from: Vec<Option<usize>> = vec![None; map.len()];
    let mut closed = vec![false; map.len()];
    let mut open = BinaryHeap::new();

    g_scores[start_idx] = 0.0;
    open.push(Node {
        f: heuristic(start),
        g: 0.0,
        idx: start_idx,
    });

    while let Some(current) = open.pop() {
        // Дубликат в куче
        if closed[current.idx] {
            continue;
        }
        closed[current.idx] = true;

        if current.idx == goal_idx {
            return PathResult::Found {
                hexes: reconstruct(map, &came_from, goal_idx),
                cost: current.g,
            };
        }

        let current_coord = map.cell(current.idx).coord;
        for neighbor in map.neighbors(current_coord) {
            let Some(n_idx) = map.index(neighbor) else {
                continue;
            };
            if closed[n_idx] {
                continue;
            }
            let Some(terrain_cost) = costs.terrain.cost(map.cell(n_idx).terrain) else {
                continue;
            };
            let step = if costs.reused.contains(current_coord, neighbor) {
                costs.reuse_cost
            } else {
                terrain_cost
            };

            let tentative = current.g + step;
            if tentative < g_scores[n_idx] {
                g_scores[n_idx] = tentative;
                came_from[n_idx] = Some(current.idx);
                open.push(Node {
                    f: tentative + heuristic(neighbor),
                    g: tentative,
                    idx: n_idx,
                });
            }
        }
    }

    PathResult::Unreachable
}

fn reconstruct(map: &HexMap, came_from: &[Option<usize>], goal_idx: usize) -> Vec<HexCoord> {
    let mut path = vec![map.cell(goal_idx).coord];
    let mut current = goal_idx;
    while let Some(prev) = came_from[current] {
        path.push(map.cell(prev).coord);
        current = prev;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::offset_to_axial;
    use crate::map::TerrainType;

    fn uniform() -> TerrainCosts {
        TerrainCosts::uniform(1.0)
    }

    #[test]
    fn test_straight_path_on_plains() {
        let map = HexMap::filled(3, 3, TerrainType::Plains);
        let terrain = uniform();
        let reused = EdgeSet::default();
        let costs = PathCosts {
            terrain: &terrain,
            reuse_cost: 0.2,
            reused: &reused,
        };
        let result = find_path(&map, HexCoord::new(0, 0), HexCoord::new(2, 0), &costs);
        assert_eq!(
            result,
            PathResult::Found {
                hexes: vec![HexCoord::new(0, 0), HexCoord::new(1, 0), HexCoord::new(2, 0)],
                cost: 2.0,
            }
        );
    }

    #[test]
    fn test_goal_walled_by_mountains_is_unreachable() {
        let mut map = HexMap::filled(5, 5, TerrainType::Plains);
        let goal = HexCoord::new(2, 2);
        assert!(map.contains(goal));
        for n in goal.neighbors() {
            map.set_terrain(n, TerrainType::Mountain);
        }
        let terrain = uniform();
        let reused = EdgeSet::default();
        let costs = PathCosts {
            terrain: &terrain,
            reuse_cost: 0.2,
            reused: &reused,
        };
        assert_eq!(
            find_path(&map, HexCoord::new(0, 0), goal, &costs),
            PathResult::Unreachable
        );
    }

    #[test]
    fn test_impassable_endpoints() {
        let mut map = HexMap::filled(4, 4, TerrainType::Plains);
        let water = offset_to_axial(3, 3);
        map.set_terrain(water, TerrainType::Water);
        let terrain = uniform();
        let reused = EdgeSet::default();
        let costs = PathCosts {
            terrain: &terrain,
            reuse_cost: 0.2,
            reused: &reused,
        };
        assert!(!find_path(&map, HexCoord::new(0, 0), water, &costs).is_found());
        assert!(!find_path(&map, HexCoord::new(0, 0), HexCoord::new(40, 0), &costs).is_found());
    }

    #[test]
    fn test_path_avoids_expensive_terrain() {
        // Полоса болота поперёк прямого пути, с проходом по равнине в стороне
        let mut map = HexMap::filled(7, 7, TerrainType::Plains);
        let start = offset_to_axial(0, 3);
        let goal = offset_to_axial(6, 3);
        for row in 0..6 {
            map.set_terrain(offset_to_axial(3, row), TerrainType::Marsh);
        }
        let mut terrain = uniform();
        terrain.marsh = 20.0;
        let reused = EdgeSet::default();
        let costs = PathCosts {
            terrain: &terrain,
            reuse_cost: 0.2,
            reused: &reused,
        };
        let PathResult::Found { hexes, cost } = find_path(&map, start, goal, &costs) else {
            panic!("path expected");
        };
        assert!(cost < 20.0);
        assert!(hexes.iter().all(|h| map.terrain(*h) != Some(TerrainType::Marsh)));
        for pair in hexes.windows(2) {
            assert_eq!(pair[0].distance(pair[1]), 1);
        }
    }

    #[test]
    fn test_reused_edges_are_preferred() {
        let map = HexMap::filled(8, 8, TerrainType::Plains);
        let terrain = uniform();
        let start = offset_to_axial(1, 4);
        let goal = offset_to_axial(6, 4);

        let empty = EdgeSet::default();
        let plain_costs = PathCosts {
            terrain: &terrain,
            reuse_cost: 0.1,
            reused: &empty,
        };
        let PathResult::Found { cost: direct, .. } = find_path(&map, start, goal, &plain_costs) else {
            panic!("path expected");
        };

        // Один из кратчайших коридоров между точками
        let mut corridor = vec![start];
        let mut c = start;
        while c != goal {
            let next = c
                .neighbors()
                .into_iter()
                .filter(|n| map.contains(*n))
                .min_by_key(|n| n.distance(goal))
                .unwrap();
            corridor.push(next);
            c = next;
        }
        let mut reused = EdgeSet::default();
        reused.insert_path(&corridor);
        let reuse_costs = PathCosts {
            terrain: &terrain,
            reuse_cost: 0.1,
            reused: &reused,
        };
        let PathResult::Found { cost: cheap, hexes } = find_path(&map, start, goal, &reuse_costs) else {
            panic!("path expected");
        };
        assert!(cheap < direct);
        assert_eq!(hexes, corridor);
    }
}
