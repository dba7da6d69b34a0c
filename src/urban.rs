// src/urban.rs
//! Многогексовые поселения трёх уровней
//!
//! Уровни обрабатываются по приоритету: метрополии, города, городки —
//! крупные поселения занимают лучшие места первыми. Центр выбирается по
//! оценке соседства (река, вода, равнины), затем кластер растёт случайным
//! взвешенным расширением границы. Занятые клетки навсегда становятся `Urban`.

use crate::config::{TierSettings, UrbanSettings};
use crate::hex::HexCoord;
use crate::map::{ClusterTier, HexCell, HexMap, TerrainType, UrbanCluster};
use crate::rng::DeterministicRng;
use log::{debug, info};
use std::collections::HashSet;

/// Пригодна для застройки: равнина, лес или холмы, ещё не занятая поселением.
fn is_buildable(cell: &HexCell) -> bool {
    matches!(
        cell.terrain,
        TerrainType::Plains | TerrainType::Forest | TerrainType::Hills
    ) && cell.urban_cluster_id.is_none()
}

/// Размещает и выращивает поселения всех уровней
pub fn generate_urban_clusters(
    map: &mut HexMap,
    settings: &UrbanSettings,
    rng: &mut DeterministicRng,
) -> Vec<UrbanCluster> {
    let tiers = [
        (ClusterTier::Metropolis, &settings.metropolis),
        (ClusterTier::City, &settings.city),
        (ClusterTier::Town, &settings.town),
    ];
    let mut clusters: Vec<UrbanCluster> = Vec::new();
    let mut seeds: Vec<HexCoord> = Vec::new();

    for (tier, tier_settings) in tiers {
        let target = tier_count(map.len(), settings.settlements_per_1000_hexes, tier_settings);
        if target == 0 {
            continue;
        }

        let candidates = score_candidates(map, settings);
        let spacing = tier_settings.min_spacing as i32;
        let mut placed = 0;

        for (idx, _) in candidates {
            if placed >= target {
                break;
            }
            // Рост предыдущих кластеров этого уровня мог занять клетку
            if !is_buildable(map.cell(idx)) {
                continue;
            }
            let seed = map.cell(idx).coord;
            if seeds.iter().any(|s| s.distance(seed) < spacing) {
                continue;
            }

            let id = clusters.len() as u32;
            let size = rng.range_inclusive(tier_settings.min_size, tier_settings.max_size);
            let cells = grow_cluster(map, seed, id, size, settings.elevation_tolerance, rng);
            if cells.len() < size {
                debug!("Поселение {id} ({tier:?}) упёрлось в границу: {} из {size}", cells.len());
            }

            seeds.push(seed);
            clusters.push(UrbanCluster {
                id,
                tier,
                center: seed,
                cells,
            });
            placed += 1;
        }
        info!("Поселения {tier:?}: размещено {placed} из {target}");
    }

    clusters
}

/// Сколько поселений уровня положено на карту такого размера
pub fn tier_count(area: usize, per_1000: f32, tier: &TierSettings) -> usize {
    (area as f32 / 1000.0 * per_1000 * tier.density).round().max(0.0) as usize
}

/// Оценка пригодных клеток по соседству; по убыванию оценки, затем по индексу
pub fn score_candidates(map: &HexMap, settings: &UrbanSettings) -> Vec<(usize, f32)> {
    let mut scored: Vec<(usize, f32)> = map
        .cells()
        .iter()
        .enumerate()
        .filter(|(_, c)| is_buildable(c))
        .map(|(idx, cell)| {
            let score = map
                .neighbors(cell.coord)
                .filter_map(|n| map.terrain(n))
                .map(|t| match t {
                    TerrainType::River => settings.river_bonus,
                    TerrainType::Water => settings.water_bonus,
                    TerrainType::Plains => settings.plains_bonus,
                    _ => 0.0,
                })
                .sum::<f32>();
            (idx, score)
        })
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    scored
}

/// Выращивает кластер от центра до `size` клеток (или пока есть граница)
///
/// Клетки границы с высотой в пределах `elevation_tolerance` от центра
/// выбираются с двойным весом.
pub fn grow_cluster(
    map: &mut HexMap,
    seed: HexCoord,
    id: u32,
    size: usize,
    elevation_tolerance: f32,
    rng: &mut DeterministicRng,
) -> Vec<HexCoord> {
    let Some(seed_elevation) = map.get(seed).map(|c| c.elevation) else {
        return Vec::new();
    };
    let mut cells = Vec::with_capacity(size);
    let mut frontier: Vec<HexCoord> = Vec::new();
    let mut in_frontier: HashSet<HexCoord> = HashSet::new();

    claim(map, seed, id);
    cells.push(seed);
    extend_frontier(map, seed, &mut frontier, &mut in_frontier);

    while cells.len() < size && !frontier.is_empty() {
        let weights: Vec<f32> = frontier
            .iter()
            .map(|c| {
                let elevation = map.get(*c).map_or(0.0, |cell| cell.elevation);
                if (elevation - seed_elevation).abs() <= elevation_tolerance {
                    2.0
                } else {
                    1.0
                }
            })
            .collect();
        let Some(pick) = rng.weighted_index(&weights) else {
            break;
        };
        let coord = frontier.remove(pick);
        in_frontier.remove(&coord);
        if !map.get(coord).is_some_and(is_buildable) {
            continue;
        }
        claim(map, coord, id);
        cells.push(coord);
        extend_frontier(map, coord, &mut frontier, &mut in_frontier);
    }
    cells
}

fn claim(map: &mut HexMap, coord: HexCoord, id: u32) {
    if let Some(cell) = map.get_mut(coord) {
        cell.terrain = TerrainType::Urban;
        cell.urban_cluster_id = Some(id);
    }
}

fn extend_frontier(
    map: &HexMap,
    from: HexCoord,
    frontier: &mut Vec<HexCoord>,
    in_frontier: &mut HashSet<HexCoord>,
) {
    for n in from.neighbors() {
        if map.get(n).is_some_and(is_buildable) && in_frontier.insert(n) {
            frontier.push(n);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::offset_to_axial;

    fn tier(min_size: usize, max_size: usize, density: f32, min_spacing: u32) -> TierSettings {
        TierSettings {
            min_size,
            max_size,
            density,
            min_spacing,
        }
    }

    #[test]
    fn test_cluster_grows_to_target_size() {
        let mut map = HexMap::filled(10, 10, TerrainType::Plains);
        let mut rng = DeterministicRng::new(4);
        let seed = offset_to_axial(5, 5);
        let cells = grow_cluster(&mut map, seed, 0, 6, 0.1, &mut rng);

        assert_eq!(cells.len(), 6);
        assert_eq!(cells[0], seed);
        for c in &cells {
            let cell = map.get(*c).unwrap();
            assert_eq!(cell.terrain, TerrainType::Urban);
            assert_eq!(cell.urban_cluster_id, Some(0));
        }
        // Кластер связный: каждая клетка, кроме центра, соседствует с другой клеткой кластера
        for c in &cells[1..] {
            assert!(cells.iter().any(|o| o.distance(*c) == 1));
        }
    }

    #[test]
    fn test_cluster_stops_when_frontier_empties() {
        let mut map = HexMap::filled(7, 7, TerrainType::Mountain);
        let seed = offset_to_axial(3, 3);
        map.set_terrain(seed, TerrainType::Plains);
        map.set_terrain(seed.neighbor(0), TerrainType::Plains);
        let mut rng = DeterministicRng::new(1);
        let cells = grow_cluster(&mut map, seed, 2, 5, 0.1, &mut rng);
        assert_eq!(cells.len(), 2);
    }

    #[test]
    fn test_scoring_prefers_river_and_water() {
        let mut map = HexMap::filled(8, 8, TerrainType::Forest);
        let riverside = offset_to_axial(3, 3);
        map.set_terrain(riverside.neighbor(0), TerrainType::River);
        map.set_terrain(riverside.neighbor(1), TerrainType::Water);

        let scored = score_candidates(&map, &UrbanSettings::default());
        assert_eq!(map.cell(scored[0].0).coord, riverside);
        assert!(scored.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn test_clusters_do_not_overlap_and_respect_spacing() {
        let mut map = HexMap::filled(40, 30, TerrainType::Plains);
        let mut settings = UrbanSettings::default();
        settings.settlements_per_1000_hexes = 10.0;
        settings.metropolis = tier(5, 8, 0.2, 10);
        settings.city = tier(3, 5, 0.4, 6);
        settings.town = tier(1, 2, 0.8, 3);
        let mut rng = DeterministicRng::new(99);
        let clusters = generate_urban_clusters(&mut map, &settings, &mut rng);

        assert!(!clusters.is_empty());
        let mut seen = HashSet::new();
        for cluster in &clusters {
            for c in &cluster.cells {
                assert!(seen.insert(*c), "hex {c} claimed twice");
                assert_eq!(map.get(*c).unwrap().urban_cluster_id, Some(cluster.id));
            }
        }
        for (i, a) in clusters.iter().enumerate() {
            for b in &clusters[i + 1..] {
                let spacing = match b.tier {
                    ClusterTier::Metropolis => 10,
                    ClusterTier::City => 6,
                    ClusterTier::Town => 3,
                };
                assert!(a.center.distance(b.center) >= spacing);
            }
        }
        // Порядок уровней: метрополии, затем города, затем городки
        assert!(clusters.windows(2).all(|w| w[0].tier <= w[1].tier));
    }

    #[test]
    fn test_tier_count_scales_with_area() {
        let t = tier(1, 1, 0.5, 1);
        assert_eq!(tier_count(2000, 4.0, &t), 4);
        assert_eq!(tier_count(0, 4.0, &t), 0);
    }
}
