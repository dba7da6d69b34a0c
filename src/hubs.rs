use crate::config::HubSettings;
use crate::map::{HexMap, HubSize, SupplyHub, TerrainType, UrbanCluster};
use crate::rng::DeterministicRng;
use log::info;

/// Узлы снабжения: по одному в центре каждого поселения
/// плюс редкие сельские узлы на удалении от остальных
pub fn place_supply_hubs(
    map: &HexMap,
    clusters: &[UrbanCluster],
    settings: &HubSettings,
    rng: &mut DeterministicRng,
) -> Vec<SupplyHub> {
    let mut hubs: Vec<SupplyHub> = clusters
        .iter()
        .map(|cluster| SupplyHub {
            coord: cluster.center,
            size: if cluster.tier.is_major() {
                HubSize::Large
            } else {
                HubSize::Small
            },
        })
        .collect();
    let settlement_hubs = hubs.len();

    let target = (map.len() as f32 / 1000.0 * settings.rural_per_1000_hexes).round() as usize;
    let spacing = settings.rural_min_spacing as i32;
    let mut rural = 0;

    for idx in rank_rural_candidates(map, rng) {
        if rural >= target {
            break;
        }
        let coord = map.cell(idx).coord;
        if hubs.iter().all(|h| h.coord.distance(coord) >= spacing) {
            hubs.push(SupplyHub {
                coord,
                size: HubSize::Small,
            });
            rural += 1;
        }
    }

    info!("Узлы снабжения: {settlement_hubs} в поселениях, {rural} сельских");
    hubs
}

/// Сухопутные клетки вне поселений, по убыванию оценки.
///
/// Оценка: тип местности, соседство с рекой и небольшой шум от сида,
/// чтобы узлы не выстраивались только вдоль рек.
fn rank_rural_candidates(map: &HexMap, rng: &mut DeterministicRng) -> Vec<usize> {
    let mut scored: Vec<(usize, f32)> = Vec::new();
    for (idx, cell) in map.cells().iter().enumerate() {
        let base = match cell.terrain {
            TerrainType::Plains => 2.0,
            TerrainType::Hills => 1.5,
            TerrainType::Forest => 1.0,
            _ => continue,
        };
        let near_river = map
            .neighbors(cell.coord)
            .any(|n| map.terrain(n) == Some(TerrainType::River));
        let river_bonus = if near_river { 1.5 } else { 0.0 };
        scored.push((idx, base + river_bonus + rng.next_f32() * 0.5));
    }
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    scored.into_iter().map(|(idx, _)| idx).collect()
}
