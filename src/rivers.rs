// src/rivers.rs
//! Генерация рек
//!
//! 1. Истоки — самые высокие гексы выше порога, с минимальным расстоянием между ними.
//! 2. Трассировка — жадный спуск к самому низкому непосещённому соседу
//!    до края карты, воды, другой реки или тупика.
//! 3. Проверка устья: вода, край карты или другая река рядом.
//! 4. Применение: клетки становятся рекой, длинные реки расширяются в нижнем
//!    течении, застрявшие заканчиваются выкопанным озером.

use crate::config::RiverSettings;
use crate::hex::{self, HexCoord};
use crate::map::{HexMap, River, RiverTerminus, TerrainType};
use crate::rng::DeterministicRng;
use log::{debug, info};
use std::collections::HashSet;

/// Генерирует реки на карте; возвращает принятые реки в порядке размещения
pub fn generate_rivers(
    map: &mut HexMap,
    settings: &RiverSettings,
    rng: &mut DeterministicRng,
) -> Vec<River> {
    let sources = select_sources(map, settings, rng);
    let mut river_ids: Vec<Option<u32>> = vec![None; map.len()];
    let mut rivers = Vec::new();
    let mut lakes = 0;

    for source in sources {
        let Some(source_idx) = map.index(source) else {
            continue;
        };
        if river_ids[source_idx].is_some() || map.cell(source_idx).terrain == TerrainType::Water {
            continue;
        }

        let mut path = trace_river(map, source, &river_ids, settings.max_length);
        if path.len() < settings.min_length {
            debug!("Река из {source} слишком короткая ({} гексов)", path.len());
            continue;
        }

        let id = rivers.len() as u32;
        let last = path[path.len() - 1];
        let terminus = classify_terminus(map, last, id, &river_ids);
        // Тупиковый конец уйдёт под озеро, русло должно остаться не короче минимума
        if terminus.is_none() && path.len() <= settings.min_length {
            debug!("Река из {source} застряла слишком рано ({} гексов)", path.len());
            continue;
        }

        for &coord in &path {
            if let Some(idx) = map.index(coord) {
                map.cell_mut(idx).terrain = TerrainType::River;
                river_ids[idx] = Some(id);
            }
        }

        let terminus = if let Some(terminus) = terminus {
            terminus
        } else {
            debug!("Река {id} застряла в {last}, копаем озеро");
            let lake_size = rng.range_inclusive(settings.lake_min_size, settings.lake_max_size);
            carve_lake(map, last, lake_size, &mut river_ids);
            path.pop();
            lakes += 1;
            RiverTerminus::Lake
        };

        if path.len() >= settings.wide_length {
            widen_river(map, &path, settings.wide_fraction, id, &mut river_ids);
        }

        rivers.push(River {
            id,
            hexes: path,
            terminus,
        });
    }

    info!("Реки: {} (озёр выкопано: {lakes})", rivers.len());
    rivers
}

/// Выбирает истоки: по убыванию высоты, с соблюдением минимального расстояния
pub fn select_sources(
    map: &HexMap,
    settings: &RiverSettings,
    rng: &mut DeterministicRng,
) -> Vec<HexCoord> {
    let mut candidates: Vec<(usize, f32)> = map
        .cells()
        .iter()
        .enumerate()
        .filter(|(_, c)| c.elevation > settings.source_elevation)
        .filter(|(_, c)| !matches!(c.terrain, TerrainType::Water | TerrainType::Marsh))
        .map(|(i, c)| (i, c.elevation))
        .collect();
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let target = rng.range_inclusive(settings.min_count, settings.max_count);
    let spacing = settings.min_source_spacing as i32;
    let mut sources: Vec<HexCoord> = Vec::with_capacity(target);

    for (idx, _) in candidates {
        if sources.len() >= target {
            break;
        }
        let coord = map.cell(idx).coord;
        if sources.iter().all(|s| s.distance(coord) >= spacing) {
            sources.push(coord);
        }
    }
    sources
}

/// Жадный спуск от истока
///
/// На каждом шаге — непосещённый сосед на карте, не вода, не выше текущего,
/// с минимальной высотой. Без отката и без просмотра вперёд.
pub fn trace_river(
    map: &HexMap,
    source: HexCoord,
    river_ids: &[Option<u32>],
    max_length: usize,
) -> Vec<HexCoord> {
    let mut path = vec![source];
    let mut visited = HashSet::from([source]);

    loop {
        let current = path[path.len() - 1];
        if map.is_edge(current) {
            break;
        }
        let touches_stop = map.neighbors(current).any(|n| {
            map.index(n).is_some_and(|i| {
                map.cell(i).terrain == TerrainType::Water || river_ids[i].is_some()
            })
        });
        if touches_stop || path.len() >= max_length {
            break;
        }

        let Some(current_elevation) = map.get(current).map(|c| c.elevation) else {
            break;
        };
        let next = map
            .neighbors(current)
            .filter(|n| !visited.contains(n))
            .filter_map(|n| map.get(n))
            .filter(|c| c.terrain != TerrainType::Water && c.elevation <= current_elevation)
            .min_by(|a, b| a.elevation.total_cmp(&b.elevation))
            .map(|c| c.coord);

        match next {
            Some(coord) => {
                visited.insert(coord);
                path.push(coord);
            }
            None => break,
        }
    }
    path
}

/// Проверка устья: `None`, если река застряла
pub fn classify_terminus(
    map: &HexMap,
    last: HexCoord,
    river_id: u32,
    river_ids: &[Option<u32>],
) -> Option<RiverTerminus> {
    if map.is_edge(last) {
        return Some(RiverTerminus::MapEdge);
    }
    let mut confluence = false;
    for n in map.neighbors(last) {
        let Some(idx) = map.index(n) else { continue };
        if map.cell(idx).terrain == TerrainType::Water {
            return Some(RiverTerminus::Coast);
        }
        if river_ids[idx].is_some_and(|other| other != river_id) {
            confluence = true;
        }
    }
    confluence.then_some(RiverTerminus::Confluence)
}

/// Копает озеро: конец реки и его самые низкие соседи становятся водой
pub fn carve_lake(
    map: &mut HexMap,
    endpoint: HexCoord,
    size: usize,
    river_ids: &mut [Option<u32>],
) -> Vec<HexCoord> {
    let Some(end_idx) = map.index(endpoint) else {
        return Vec::new();
    };
    map.cell_mut(end_idx).terrain = TerrainType::Water;
    river_ids[end_idx] = None;
    let mut lake = vec![endpoint];

    while lake.len() < size {
        let next = lake
            .iter()
            .flat_map(|&c| map.neighbors(c))
            .filter_map(|n| map.index(n))
            .filter(|&i| {
                let cell = map.cell(i);
                river_ids[i].is_none()
                    && !matches!(cell.terrain, TerrainType::Water | TerrainType::River)
            })
            .min_by(|&a, &b| {
                map.cell(a)
                    .elevation
                    .total_cmp(&map.cell(b).elevation)
                    .then(a.cmp(&b))
            });
        let Some(idx) = next else { break };
        map.cell_mut(idx).terrain = TerrainType::Water;
        lake.push(map.cell(idx).coord);
    }
    lake
}

/// Расширяет нижнее течение: по одной соседней клетке поперёк течения
/// на каждую клетку русла. Расширенные клетки судоходны.
pub fn widen_river(
    map: &mut HexMap,
    path: &[HexCoord],
    fraction: f32,
    river_id: u32,
    river_ids: &mut [Option<u32>],
) -> usize {
    let len = path.len();
    if len < 2 {
        return 0;
    }
    let start = ((1.0 - fraction) * len as f32).floor() as usize;
    let mut widened = 0;

    for i in start.min(len)..len {
        let flow = if i > 0 {
            hex::edge_direction(path[i - 1], path[i])
        } else {
            hex::edge_direction(path[i], path[i + 1])
        };
        let Some(direction) = flow else { continue };

        if let Some(idx) = map.index(path[i]) {
            map.cell_mut(idx).navigable = true;
        }

        // Поперёк течения: сначала ±60°, потом ±120°
        let side = [1, 5, 2, 4]
            .iter()
            .map(|offset| path[i].neighbor(direction + offset))
            .filter_map(|n| map.index(n))
            .filter(|&idx| river_ids[idx].is_none())
            .filter(|&idx| {
                matches!(
                    map.cell(idx).terrain,
                    TerrainType::Plains | TerrainType::Marsh | TerrainType::Forest | TerrainType::Hills
                )
            })
            .min_by(|&a, &b| {
                let (ca, cb) = (map.cell(a), map.cell(b));
                let hills = |t: TerrainType| u8::from(t == TerrainType::Hills);
                hills(ca.terrain)
                    .cmp(&hills(cb.terrain))
                    .then(ca.elevation.total_cmp(&cb.elevation))
            });

        if let Some(idx) = side {
            let cell = map.cell_mut(idx);
            cell.terrain = TerrainType::River;
            cell.navigable = true;
            river_ids[idx] = Some(river_id);
            widened += 1;
        }
    }
    widened
}
