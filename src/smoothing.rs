use crate::config::SmoothingSettings;
use crate::map::{HexMap, TerrainType};
use log::info;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SmoothingReport {
    pub anomalies_replaced: usize,
    pub isolated_water_removed: usize,
}

/// Один проход сглаживания: аномалии, затем одиночная вода
pub fn smooth_terrain(map: &mut HexMap, settings: &SmoothingSettings) -> SmoothingReport {
    let anomalies_replaced = remove_anomalies(map, settings);
    let isolated_water_removed = remove_isolated_water(map);
    info!(
        "Сглаживание: заменено аномалий {anomalies_replaced}, убрано одиночной воды {isolated_water_removed}"
    );
    SmoothingReport {
        anomalies_replaced,
        isolated_water_removed,
    }
}

/// Заменяет одиночные гексы, чья группа не похожа ни на одного соседа
/// и заметно отклоняется от средней группы соседей.
///
/// Решения принимаются по снимку до прохода, каскада нет.
pub fn remove_anomalies(map: &mut HexMap, settings: &SmoothingSettings) -> usize {
    let mut changes = Vec::new();

    for (idx, cell) in map.cells().iter().enumerate() {
        if cell.terrain == TerrainType::River {
            continue;
        }
        let neighbors: Vec<TerrainType> = map
            .neighbors(cell.coord)
            .filter_map(|n| map.terrain(n))
            .collect();
        if neighbors.is_empty() {
            continue;
        }

        let group = i32::from(cell.terrain.group());
        let tolerance = i32::from(settings.group_tolerance);
        let shares_group = neighbors
            .iter()
            .any(|t| (i32::from(t.group()) - group).abs() <= tolerance);
        if shares_group {
            continue;
        }

        let average = neighbors.iter().map(|t| f32::from(t.group())).sum::<f32>()
            / neighbors.len() as f32;
        if (group as f32 - average).abs() <= settings.deviation_threshold {
            continue;
        }

        if let Some(replacement) = most_frequent(&neighbors) {
            changes.push((idx, replacement));
        }
    }

    for &(idx, terrain) in &changes {
        map.cell_mut(idx).terrain = terrain;
    }
    changes.len()
}

/// Вода без единого водного соседа становится болотом.
pub fn remove_isolated_water(map: &mut HexMap) -> usize {
    let isolated: Vec<usize> = map
        .cells()
        .iter()
        .enumerate()
        .filter(|(_, cell)| cell.terrain == TerrainType::Water)
        .filter(|(_, cell)| {
            !map
                .neighbors(cell.coord)
                .any(|n| map.terrain(n) == Some(TerrainType::Water))
        })
        .map(|(idx, _)| idx)
        .collect();

    for &idx in &isolated {
        map.cell_mut(idx).terrain = TerrainType::Marsh;
    }
    isolated.len()
}

/// Самый частый тип; при равенстве — меньший по порядку перечисления.
fn most_frequent(terrains: &[TerrainType]) -> Option<TerrainType> {
    let mut counts: BTreeMap<TerrainType, usize> = BTreeMap::new();
    for &t in terrains {
        *counts.entry(t).or_insert(0) += 1;
    }
    let mut best: Option<(TerrainType, usize)> = None;
    for (terrain, count) in counts {
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((terrain, count));
        }
    }
    best.map(|(t, _)| t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::offset_to_axial;

    #[test]
    fn test_lone_mountain_in_plains_is_replaced() {
        let mut map = HexMap::filled(5, 5, TerrainType::Plains);
        let center = offset_to_axial(2, 2);
        map.set_terrain(center, TerrainType::Mountain);

        let replaced = remove_anomalies(&mut map, &SmoothingSettings::default());
        assert_eq!(replaced, 1);
        assert_eq!(map.terrain(center), Some(TerrainType::Plains));
    }

    #[test]
    fn test_similar_neighbor_prevents_replacement() {
        let mut map = HexMap::filled(5, 5, TerrainType::Plains);
        let center = offset_to_axial(2, 2);
        map.set_terrain(center, TerrainType::Mountain);
        map.set_terrain(center.neighbor(0), TerrainType::Mountain);

        remove_anomalies(&mut map, &SmoothingSettings::default());
        assert_eq!(map.terrain(center), Some(TerrainType::Mountain));
    }

    #[test]
    fn test_small_deviation_is_kept() {
        let mut map = HexMap::filled(5, 5, TerrainType::Plains);
        let center = offset_to_axial(2, 2);
        // Лес (3) среди равнин (2): отклонение 1 не превышает порог
        map.set_terrain(center, TerrainType::Forest);
        assert_eq!(remove_anomalies(&mut map, &SmoothingSettings::default()), 0);
        assert_eq!(map.terrain(center), Some(TerrainType::Forest));
    }

    #[test]
    fn test_no_cascade_within_pass() {
        let mut map = HexMap::filled(6, 6, TerrainType::Plains);
        let a = offset_to_axial(2, 2);
        let b = a.neighbor(0);
        map.set_terrain(a, TerrainType::Mountain);
        map.set_terrain(b, TerrainType::Water);

        // Гора и вода соседствуют, но их группы 5 и 0 далеки друг от друга
        let replaced = remove_anomalies(&mut map, &SmoothingSettings::default());
        assert_eq!(replaced, 2);
        assert_eq!(map.terrain(a), Some(TerrainType::Plains));
        assert_eq!(map.terrain(b), Some(TerrainType::Plains));
    }

    #[test]
    fn test_rivers_are_never_replaced() {
        let mut map = HexMap::filled(5, 5, TerrainType::Mountain);
        let center = offset_to_axial(2, 2);
        map.set_terrain(center, TerrainType::River);
        assert_eq!(remove_anomalies(&mut map, &SmoothingSettings::default()), 0);
        assert_eq!(map.terrain(center), Some(TerrainType::River));
    }

    #[test]
    fn test_isolated_water_becomes_marsh() {
        let mut map = HexMap::filled(6, 6, TerrainType::Plains);
        let lone = offset_to_axial(1, 1);
        let pair_a = offset_to_axial(4, 4);
        let pair_b = pair_a.neighbor(1);
        map.set_terrain(lone, TerrainType::Water);
        map.set_terrain(pair_a, TerrainType::Water);
        map.set_terrain(pair_b, TerrainType::Water);

        assert_eq!(remove_isolated_water(&mut map), 1);
        assert_eq!(map.terrain(lone), Some(TerrainType::Marsh));
        assert_eq!(map.terrain(pair_a), Some(TerrainType::Water));
        assert_eq!(map.terrain(pair_b), Some(TerrainType::Water));
    }

    #[test]
    fn test_most_frequent_prefers_lower_variant_on_tie() {
        let t = [TerrainType::Forest, TerrainType::Plains, TerrainType::Forest, TerrainType::Plains];
        assert_eq!(most_frequent(&t), Some(TerrainType::Plains));
        assert_eq!(most_frequent(&[]), None);
    }

    #[test]
    fn test_report_counts_both_passes() {
        let mut map = HexMap::filled(8, 8, TerrainType::Plains);
        map.set_terrain(offset_to_axial(1, 1), TerrainType::Mountain);
        let pond = offset_to_axial(5, 5);
        for n in pond.neighbors() {
            map.set_terrain(n, TerrainType::Marsh);
        }
        map.set_terrain(pond, TerrainType::Water);

        let report = smooth_terrain(&mut map, &SmoothingSettings::default());
        assert_eq!(
            report,
            SmoothingReport {
                anomalies_replaced: 1,
                isolated_water_removed: 1,
            }
        );
        assert_eq!(map.terrain(pond), Some(TerrainType::Marsh));
    }
}
