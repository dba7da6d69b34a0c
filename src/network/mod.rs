// src/network/mod.rs
//! Транспортная сеть: дороги и железные дороги между поселениями
//!
//! Пайплайн для каждого вида сети:
//! 1. Пути A* от каждого крупного центра до `k` ближайших, с удешевлением
//!    уже проложенных рёбер.
//! 2. Минимальный остов по стоимостям путей (Краскал).
//! 3. На уровне `Developed`: дороги-«срезки» там, где объезд по остову
//!    слишком дорог; для железных дорог — самые дешёвые пути вне остова.
//! 4. Только дороги: каждый городок подключается к ближайшему гексу сети.
//! 5. Слияние всех путей в полилинии без повторяющихся рёбер.

mod graph;
mod merge;
mod pathfinding;

pub use graph::{TreeDistances, WeightedEdge, minimum_spanning_edges};
pub use merge::merge_paths;
pub use pathfinding::{PathCosts, PathResult, find_path};

use crate::config::{InfrastructureTier, NetworkSettings, TerrainCosts};
use crate::hex::HexCoord;
use crate::map::{HexMap, RouteKind, RoutePath, UrbanCluster};
use log::{debug, info};
use std::collections::HashSet;

/// Множество неориентированных рёбер между соседними гексами
#[derive(Debug, Clone, Default)]
pub struct EdgeSet {
    edges: HashSet<(HexCoord, HexCoord)>,
}

impl EdgeSet {
    fn key(a: HexCoord, b: HexCoord) -> (HexCoord, HexCoord) {
        if a <= b { (a, b) } else { (b, a) }
    }

    pub fn insert(&mut self, a: HexCoord, b: HexCoord) -> bool {
        self.edges.insert(Self::key(a, b))
    }

    pub fn insert_path(&mut self, hexes: &[HexCoord]) {
        for pair in hexes.windows(2) {
            self.insert(pair[0], pair[1]);
        }
    }

    #[must_use]
    pub fn contains(&self, a: HexCoord, b: HexCoord) -> bool {
        self.edges.contains(&Self::key(a, b))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Путь между двумя крупными центрами
#[derive(Debug, Clone)]
pub struct PairRoute {
    pub a: usize,
    pub b: usize,
    pub cost: f32,
    pub hexes: Vec<HexCoord>,
}

/// Результат синтеза сети
#[derive(Debug, Clone, Default)]
pub struct TransportNetwork {
    /// Полилинии после слияния
    pub roads: Vec<RoutePath>,
    pub railways: Vec<RoutePath>,
    /// Все проложенные пути в порядке построения
    pub road_routes: Vec<RoutePath>,
    pub railway_routes: Vec<RoutePath>,
}

/// Строит дороги на всех уровнях и железные дороги начиная с `Basic`
pub fn synthesize_network(
    map: &HexMap,
    clusters: &[UrbanCluster],
    settings: &NetworkSettings,
    tier: InfrastructureTier,
) -> TransportNetwork {
    let majors: Vec<HexCoord> = clusters
        .iter()
        .filter(|c| c.tier.is_major())
        .map(|c| c.center)
        .collect();
    let towns: Vec<HexCoord> = clusters
        .iter()
        .filter(|c| !c.tier.is_major())
        .map(|c| c.center)
        .collect();

    let road_paths = build_roads(map, &majors, &towns, settings, tier);
    let railway_paths = if tier >= InfrastructureTier::Basic {
        build_railways(map, &majors, settings, tier)
    } else {
        Vec::new()
    };

    let network = TransportNetwork {
        roads: to_routes(merge_paths(&road_paths), RouteKind::Road),
        railways: to_routes(merge_paths(&railway_paths), RouteKind::Railway),
        road_routes: to_routes(road_paths, RouteKind::Road),
        railway_routes: to_routes(railway_paths, RouteKind::Railway),
    };
    info!(
        "Сеть ({tier:?}): дорог {} ({} путей), железных дорог {} ({} путей)",
        network.roads.len(),
        network.road_routes.len(),
        network.railways.len(),
        network.railway_routes.len()
    );
    network
}

fn to_routes(paths: Vec<Vec<HexCoord>>, kind: RouteKind) -> Vec<RoutePath> {
    paths
        .into_iter()
        .map(|hexes| RoutePath { hexes, kind })
        .collect()
}

fn build_roads(
    map: &HexMap,
    majors: &[HexCoord],
    towns: &[HexCoord],
    settings: &NetworkSettings,
    tier: InfrastructureTier,
) -> Vec<Vec<HexCoord>> {
    let costs = &settings.road_costs;
    let pairs = pairwise_routes(map, majors, settings.nearest_neighbors, costs, settings.reuse_cost);
    let mst = spanning_routes(majors.len(), &pairs);

    let mut paths: Vec<Vec<HexCoord>> = mst.iter().map(|&i| pairs[i].hexes.clone()).collect();
    let mut edges = EdgeSet::default();
    for path in &paths {
        edges.insert_path(path);
    }

    if tier == InfrastructureTier::Developed {
        let shortcuts = detour_shortcuts(map, majors, &pairs, &mst, &mut edges, settings);
        debug!("Дорожных срезок: {}", shortcuts.len());
        paths.extend(shortcuts);
    }

    let branches = connect_towns(map, majors, towns, &paths, &mut edges, costs, settings.reuse_cost);
    debug!("Подключено городков: {} из {}", branches.len(), towns.len());
    paths.extend(branches);
    paths
}

fn build_railways(
    map: &HexMap,
    majors: &[HexCoord],
    settings: &NetworkSettings,
    tier: InfrastructureTier,
) -> Vec<Vec<HexCoord>> {
    let pairs = pairwise_routes(
        map,
        majors,
        settings.nearest_neighbors,
        &settings.rail_costs,
        settings.reuse_cost,
    );
    let mst = spanning_routes(majors.len(), &pairs);
    let mut paths: Vec<Vec<HexCoord>> = mst.iter().map(|&i| pairs[i].hexes.clone()).collect();

    if tier == InfrastructureTier::Developed {
        let in_tree: HashSet<usize> = mst.iter().copied().collect();
        let mut spare: Vec<usize> = (0..pairs.len()).filter(|i| !in_tree.contains(i)).collect();
        spare.sort_by(|&i, &j| pairs[i].cost.total_cmp(&pairs[j].cost).then(i.cmp(&j)));
        paths.extend(
            spare
                .into_iter()
                .take(settings.rail_redundancy)
                .map(|i| pairs[i].hexes.clone()),
        );
    }
    paths
}

/// Пары «центр — k ближайших центров», без повторов, в порядке обнаружения
pub fn candidate_pairs(centers: &[HexCoord], k: usize) -> Vec<(usize, usize)> {
    let mut seen = HashSet::new();
    let mut pairs = Vec::new();
    for (i, center) in centers.iter().enumerate() {
        let mut nearest: Vec<usize> = (0..centers.len()).filter(|&j| j != i).collect();
        nearest.sort_by_key(|&j| (center.distance(centers[j]), j));
        for j in nearest.into_iter().take(k) {
            let key = (i.min(j), i.max(j));
            if seen.insert(key) {
                pairs.push(key);
            }
        }
    }
    pairs
}

/// Шаг 1: пути между парами центров. Каждый следующий путь видит
/// рёбра предыдущих как дешёвые.
fn pairwise_routes(
    map: &HexMap,
    centers: &[HexCoord],
    k: usize,
    terrain: &TerrainCosts,
    reuse_cost: f32,
) -> Vec<PairRoute> {
    let mut reused = EdgeSet::default();
    let mut routes = Vec::new();
    for (a, b) in candidate_pairs(centers, k) {
        let costs = PathCosts {
            terrain,
            reuse_cost,
            reused: &reused,
        };
        match find_path(map, centers[a], centers[b], &costs) {
            PathResult::Found { hexes, cost } => {
                reused.insert_path(&hexes);
                routes.push(PairRoute { a, b, cost, hexes });
            }
            PathResult::Unreachable => {
                debug!("Нет пути между {} и {}", centers[a], centers[b]);
            }
        }
    }
    routes
}

/// Шаг 2: индексы путей, вошедших в минимальный остов
fn spanning_routes(node_count: usize, pairs: &[PairRoute]) -> Vec<usize> {
    let edges: Vec<WeightedEdge> = pairs.iter().map(|p| (p.a, p.b, p.cost)).collect();
    minimum_spanning_edges(node_count, &edges)
}

/// Шаг 3 для дорог: прямые дороги между близкими центрами, если объезд
/// по остову дороже прямого пути более чем в `detour_factor` раз
fn detour_shortcuts(
    map: &HexMap,
    centers: &[HexCoord],
    pairs: &[PairRoute],
    mst: &[usize],
    edges: &mut EdgeSet,
    settings: &NetworkSettings,
) -> Vec<Vec<HexCoord>> {
    let tree_edges: Vec<WeightedEdge> = mst
        .iter()
        .map(|&i| (pairs[i].a, pairs[i].b, pairs[i].cost))
        .collect();
    let tree = TreeDistances::new(centers.len(), &tree_edges);
    let in_tree: HashSet<usize> = mst.iter().copied().collect();
    let max_distance = settings.max_connection_distance as i32;

    let mut shortcuts = Vec::new();
    for (idx, pair) in pairs.iter().enumerate() {
        if in_tree.contains(&idx) {
            continue;
        }
        let (from, to) = (centers[pair.a], centers[pair.b]);
        if from.distance(to) > max_distance {
            continue;
        }
        let too_long = tree
            .get(pair.a, pair.b)
            .is_none_or(|detour| detour > settings.detour_factor * pair.cost);
        if !too_long {
            continue;
        }
        let costs = PathCosts {
            terrain: &settings.road_costs,
            reuse_cost: settings.reuse_cost,
            reused: edges,
        };
        if let PathResult::Found { hexes, .. } = find_path(map, from, to, &costs) {
            edges.insert_path(&hexes);
            shortcuts.push(hexes);
        }
    }
    shortcuts
}

/// Шаг 4: ветки от городков к ближайшему гексу сети.
///
/// Если крупных центров меньше двух, остова нет: каждый городок ведётся
/// напрямую к ближайшему крупному центру, а без них — к ближайшему городку.
fn connect_towns(
    map: &HexMap,
    majors: &[HexCoord],
    towns: &[HexCoord],
    built: &[Vec<HexCoord>],
    edges: &mut EdgeSet,
    terrain: &TerrainCosts,
    reuse_cost: f32,
) -> Vec<Vec<HexCoord>> {
    let direct = majors.len() < 2;
    let mut network: Vec<HexCoord> = Vec::new();
    let mut on_network: HashSet<HexCoord> = HashSet::new();
    let mut extend = |hexes: &[HexCoord], network: &mut Vec<HexCoord>| {
        for &h in hexes {
            if on_network.insert(h) {
                network.push(h);
            }
        }
    };
    for path in built {
        extend(path, &mut network);
    }

    let mut branches = Vec::new();
    for (i, &town) in towns.iter().enumerate() {
        let target = if direct {
            nearest(town, majors).or_else(|| {
                let others: Vec<HexCoord> = towns
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i)
                    .map(|(_, t)| *t)
                    .collect();
                nearest(town, &others)
            })
        } else {
            nearest(town, &network)
        };
        let Some(target) = target else {
            continue;
        };
        if target == town {
            continue;
        }

        let costs = PathCosts {
            terrain,
            reuse_cost,
            reused: edges,
        };
        match find_path(map, town, target, &costs) {
            PathResult::Found { hexes, .. } => {
                edges.insert_path(&hexes);
                extend(&hexes, &mut network);
                branches.push(hexes);
            }
            PathResult::Unreachable => debug!("Городок {town} не подключён к сети"),
        }
    }
    branches
}

/// Ближайший гекс из списка; при равенстве — первый
fn nearest(from: HexCoord, candidates: &[HexCoord]) -> Option<HexCoord> {
    candidates.iter().copied().min_by_key(|c| from.distance(*c))
}
