// src/map.rs
//! Данные сгенерированной карты
//!
//! `HexMap` — арена клеток: непрерывный `Vec<HexCell>`, индексируемый по
//! `row * width + col` в прямоугольной раскладке со сдвигом строк
//! (`col = q`, `row = r + floor(q / 2)`). Клетка создаётся один раз при генерации
//! рельефа; `terrain` меняют последующие проходы, `elevation`/`moisture` — никогда.
//!
//! `GameMap` — итог генерации, который получают внешние потребители (рендер,
//! симуляция, UI). Они только читают его.

use crate::hex::{self, HexCoord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TerrainType {
    Water,
    River,
    Plains,
    Marsh,
    Forest,
    Hills,
    Mountain,
    Urban,
}

impl TerrainType {
    /// Порядковая группа похожих типов местности (используется при сглаживании).
    #[must_use]
    pub fn group(self) -> u8 {
        match self {
            TerrainType::Water | TerrainType::River => 0,
            TerrainType::Marsh => 1,
            TerrainType::Plains | TerrainType::Urban => 2,
            TerrainType::Forest => 3,
            TerrainType::Hills => 4,
            TerrainType::Mountain => 5,
        }
    }

    /// Вода и горы непроходимы для дорог и железных дорог.
    #[must_use]
    pub fn is_passable(self) -> bool {
        !matches!(self, TerrainType::Water | TerrainType::Mountain)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HexCell {
    pub coord: HexCoord,
    pub terrain: TerrainType,
    /// Высота в `[0, 1]`
    pub elevation: f32,
    /// Влажность в `[0, 1]`
    pub moisture: f32,
    /// Судоходный участок (расширенное нижнее течение реки)
    pub navigable: bool,
    pub urban_cluster_id: Option<u32>,
}

impl HexCell {
    #[must_use]
    pub fn new(coord: HexCoord, elevation: f32, moisture: f32, terrain: TerrainType) -> Self {
        Self {
            coord,
            terrain,
            elevation,
            moisture,
            navigable: false,
            urban_cluster_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HexMap {
    pub width: u32,
    pub height: u32,
    cells: Vec<HexCell>,
}

impl HexMap {
    /// Строит карту, вызывая `f(col, row, coord)` для каждой позиции по строкам.
    pub fn from_fn(
        width: u32,
        height: u32,
        mut f: impl FnMut(u32, u32, HexCoord) -> HexCell,
    ) -> Self {
        let mut cells = Vec::with_capacity((width as usize) * (height as usize));
        for row in 0..height {
            for col in 0..width {
                cells.push(f(col, row, hex::offset_to_axial(col as i32, row as i32)));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    /// Карта, целиком заполненная одним типом местности (высота и влажность 0.5).
    #[must_use]
    pub fn filled(width: u32, height: u32, terrain: TerrainType) -> Self {
        Self::from_fn(width, height, |_, _, coord| {
            HexCell::new(coord, 0.5, 0.5, terrain)
        })
    }

    /// Индекс клетки в арене, `None` — вне карты.
    #[must_use]
    pub fn index(&self, coord: HexCoord) -> Option<usize> {
        let (col, row) = hex::axial_to_offset(coord);
        if col < 0 || row < 0 || col as u32 >= self.width || row as u32 >= self.height {
            return None;
        }
        Some(row as usize * self.width as usize + col as usize)
    }

    #[must_use]
    pub fn contains(&self, coord: HexCoord) -> bool {
        self.index(coord).is_some()
    }

    #[must_use]
    pub fn get(&self, coord: HexCoord) -> Option<&HexCell> {
        self.index(coord).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, coord: HexCoord) -> Option<&mut HexCell> {
        self.index(coord).map(|i| &mut self.cells[i])
    }

    #[must_use]
    pub fn terrain(&self, coord: HexCoord) -> Option<TerrainType> {
        self.get(coord).map(|c| c.terrain)
    }

    pub fn set_terrain(&mut self, coord: HexCoord, terrain: TerrainType) {
        if let Some(cell) = self.get_mut(coord) {
            cell.terrain = terrain;
        }
    }

    #[must_use]
    pub fn cell(&self, index: usize) -> &HexCell {
        &self.cells[index]
    }

    pub fn cell_mut(&mut self, index: usize) -> &mut HexCell {
        &mut self.cells[index]
    }

    #[must_use]
    pub fn cells(&self) -> &[HexCell] {
        &self.cells
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Соседи, у которых есть клетка на карте.
    pub fn neighbors(&self, coord: HexCoord) -> impl Iterator<Item = HexCoord> + '_ {
        coord.neighbors().into_iter().filter(|n| self.contains(*n))
    }

    /// Клетка на краю карты: хотя бы один сосед за её пределами.
    #[must_use]
    pub fn is_edge(&self, coord: HexCoord) -> bool {
        coord.neighbors().iter().any(|n| !self.contains(*n))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClusterTier {
    Metropolis,
    City,
    Town,
}

impl ClusterTier {
    /// Метрополии и города — крупные центры сети.
    #[must_use]
    pub fn is_major(self) -> bool {
        matches!(self, ClusterTier::Metropolis | ClusterTier::City)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UrbanCluster {
    pub id: u32,
    pub tier: ClusterTier,
    pub center: HexCoord,
    pub cells: Vec<HexCoord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HubSize {
    Large,
    Small,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SupplyHub {
    pub coord: HexCoord,
    pub size: HubSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteKind {
    Road,
    Railway,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoutePath {
    pub hexes: Vec<HexCoord>,
    pub kind: RouteKind,
}

/// Чем закончилась река
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiverTerminus {
    Coast,
    MapEdge,
    Confluence,
    /// Застряла в низине, в конце выкопано озеро
    Lake,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct River {
    pub id: u32,
    /// От истока к устью; без клеток расширения
    pub hexes: Vec<HexCoord>,
    pub terminus: RiverTerminus,
}

/// Итог генерации
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameMap {
    pub seed: u32,
    pub width: u32,
    pub height: u32,
    pub cells: HexMap,
    pub rivers: Vec<River>,
    pub urban_clusters: Vec<UrbanCluster>,
    pub supply_hubs: Vec<SupplyHub>,
    /// Дороги после слияния: без повторяющихся рёбер
    pub roads: Vec<RoutePath>,
    pub railways: Vec<RoutePath>,
    /// Исходные пути до слияния
    pub road_routes: Vec<RoutePath>,
    pub railway_routes: Vec<RoutePath>,
}

impl GameMap {
    /// Число клеток каждого типа местности.
    #[must_use]
    pub fn terrain_histogram(&self) -> BTreeMap<TerrainType, usize> {
        let mut histogram = BTreeMap::new();
        for cell in self.cells.cells() {
            *histogram.entry(cell.terrain).or_insert(0) += 1;
        }
        histogram
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled_map_indexes_every_cell() {
        let map = HexMap::filled(5, 4, TerrainType::Plains);
        assert_eq!(map.len(), 20);
        for (i, cell) in map.cells().iter().enumerate() {
            assert_eq!(map.index(cell.coord), Some(i));
        }
    }

    #[test]
    fn test_contains_uses_row_offset_layout() {
        let map = HexMap::filled(4, 3, TerrainType::Plains);
        // col = 3, row = 0 → r = -1
        assert!(map.contains(HexCoord::new(3, -1)));
        assert!(!map.contains(HexCoord::new(3, 2)));
        assert!(!map.contains(HexCoord::new(-1, 0)));
        assert!(!map.contains(HexCoord::new(4, 0)));
    }

    #[test]
    fn test_edge_detection() {
        let map = HexMap::filled(5, 5, TerrainType::Plains);
        assert!(map.is_edge(hex::offset_to_axial(0, 2)));
        assert!(map.is_edge(hex::offset_to_axial(2, 0)));
        assert!(!map.is_edge(hex::offset_to_axial(2, 2)));
    }

    #[test]
    fn test_passability() {
        assert!(!TerrainType::Water.is_passable());
        assert!(!TerrainType::Mountain.is_passable());
        assert!(TerrainType::River.is_passable());
        assert!(TerrainType::Urban.is_passable());
    }
}
