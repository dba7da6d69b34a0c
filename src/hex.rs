// src/hex.rs
//! Геометрия гексагональной сетки (flat-top, осевые координаты)
//!
//! Модуль чистый и без состояния: соседи, расстояние, кольца,
//! перевод в пиксели и обратно, направление ребра.
//!
//! Направления пронумерованы 0–5 по часовой стрелке, начиная с восточной стороны
//! (ось Y экрана направлена вниз). Противоположное ребро: `(edge + 3) % 6`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Осевая координата гекса `(q, r)`; неявная третья ось `s = -q - r`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

/// Единичные смещения шести соседей: ЮВ, Ю, ЮЗ, СЗ, С, СВ.
pub const DIRECTIONS: [HexCoord; 6] = [
    HexCoord { q: 1, r: 0 },
    HexCoord { q: 0, r: 1 },
    HexCoord { q: -1, r: 1 },
    HexCoord { q: -1, r: 0 },
    HexCoord { q: 0, r: -1 },
    HexCoord { q: 1, r: -1 },
];

const SQRT_3: f32 = 1.732_050_8;

impl HexCoord {
    #[must_use]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    #[must_use]
    pub const fn s(self) -> i32 {
        -self.q - self.r
    }

    /// Сосед в направлении `direction` (берётся по модулю 6).
    #[must_use]
    pub fn neighbor(self, direction: usize) -> Self {
        let d = DIRECTIONS[direction % 6];
        Self::new(self.q + d.q, self.r + d.r)
    }

    /// Все шесть соседей в порядке направлений.
    #[must_use]
    pub fn neighbors(self) -> [Self; 6] {
        std::array::from_fn(|i| self.neighbor(i))
    }

    /// Осевое расстояние: `max(|dq|, |dr|, |ds|)`.
    #[must_use]
    pub fn distance(self, other: Self) -> i32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        dq.max(dr).max(ds)
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.q, self.r)
    }
}

/// Ошибка разбора канонического ключа `"q,r"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseHexCoordError(String);

impl fmt::Display for ParseHexCoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid hex key {:?}, expected \"q,r\"", self.0)
    }
}

impl std::error::Error for ParseHexCoordError {}

impl FromStr for HexCoord {
    type Err = ParseHexCoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseHexCoordError(s.to_string());
        let (q, r) = s.split_once(',').ok_or_else(err)?;
        let q = q.trim().parse().map_err(|_| err())?;
        let r = r.trim().parse().map_err(|_| err())?;
        Ok(Self::new(q, r))
    }
}

/// Противоположное ребро.
#[must_use]
pub const fn opposite_edge(edge: usize) -> usize {
    (edge + 3) % 6
}

/// Гексы ровно на расстоянии `radius` от центра.
///
/// Обход: 6 сторон по `radius` шагов от фиксированного угла (`center + DIRECTIONS[4] * radius`).
/// При `radius == 0` возвращается `[center]`.
#[must_use]
pub fn ring(center: HexCoord, radius: u32) -> Vec<HexCoord> {
    if radius == 0 {
        return vec![center];
    }
    let radius_i = radius as i32;
    let corner = DIRECTIONS[4];
    let mut current = HexCoord::new(center.q + corner.q * radius_i, center.r + corner.r * radius_i);
    let mut result = Vec::with_capacity(6 * radius as usize);
    for direction in 0..6 {
        for _ in 0..radius {
            result.push(current);
            current = current.neighbor(direction);
        }
    }
    result
}

/// Центр гекса в пикселях для flat-top ориентации.
#[must_use]
pub fn to_pixel(coord: HexCoord, size: f32) -> (f32, f32) {
    let q = coord.q as f32;
    let r = coord.r as f32;
    let x = size * 1.5 * q;
    let y = size * SQRT_3 * (r + q / 2.0);
    (x, y)
}

/// Гекс, содержащий точку. Округление через кубические координаты
/// с коррекцией компоненты с наибольшей погрешностью.
#[must_use]
pub fn from_pixel(x: f32, y: f32, size: f32) -> HexCoord {
    let q = (2.0 / 3.0 * x) / size;
    let r = (-1.0 / 3.0 * x + SQRT_3 / 3.0 * y) / size;
    cube_round(q, r, -q - r)
}

fn cube_round(q: f32, r: f32, s: f32) -> HexCoord {
    let mut rq = q.round();
    let mut rr = r.round();
    let rs = s.round();

    let dq = (rq - q).abs();
    let dr = (rr - r).abs();
    let ds = (rs - s).abs();

    if dq > dr && dq > ds {
        rq = -rr - rs;
    } else if dr > ds {
        rr = -rq - rs;
    }
    HexCoord::new(rq as i32, rr as i32)
}

/// Проверка по «сырому» осевому окну `[0, width) × [0, height)`.
///
/// Это не то же самое, что наличие клетки на карте: генератор раскладывает
/// гексы со сдвигом строк, см. [`crate::map::HexMap::contains`].
#[must_use]
pub fn in_bounds(coord: HexCoord, width: u32, height: u32) -> bool {
    coord.q >= 0 && coord.r >= 0 && (coord.q as u32) < width && (coord.r as u32) < height
}

/// Индекс направления 0–5 от `from` к `to`, либо `None`, если гексы не соседние.
#[must_use]
pub fn edge_direction(from: HexCoord, to: HexCoord) -> Option<usize> {
    let dq = to.q - from.q;
    let dr = to.r - from.r;
    DIRECTIONS.iter().position(|d| d.q == dq && d.r == dr)
}

/// Осевая координата для колонки/строки прямоугольной раскладки (`r = row - floor(col / 2)`).
#[must_use]
pub fn offset_to_axial(col: i32, row: i32) -> HexCoord {
    HexCoord::new(col, row - col.div_euclid(2))
}

/// Обратное к [`offset_to_axial`]: `(col, row)`.
#[must_use]
pub fn axial_to_offset(coord: HexCoord) -> (i32, i32) {
    (coord.q, coord.r + coord.q.div_euclid(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors_are_at_distance_one() {
        let c = HexCoord::new(3, -2);
        for n in c.neighbors() {
            assert_eq!(c.distance(n), 1);
        }
    }

    #[test]
    fn test_opposite_directions_cancel() {
        for (edge, d) in DIRECTIONS.iter().enumerate() {
            let o = DIRECTIONS[opposite_edge(edge)];
            assert_eq!(d.q + o.q, 0);
            assert_eq!(d.r + o.r, 0);
        }
    }

    #[test]
    fn test_distance_uses_third_axis() {
        let a = HexCoord::new(0, 0);
        assert_eq!(a.distance(HexCoord::new(2, 0)), 2);
        assert_eq!(a.distance(HexCoord::new(2, -2)), 2);
        assert_eq!(a.distance(HexCoord::new(2, 2)), 4);
        assert_eq!(a.distance(HexCoord::new(-3, 1)), 3);
    }

    #[test]
    fn test_ring_zero_is_center() {
        let c = HexCoord::new(5, 5);
        assert_eq!(ring(c, 0), vec![c]);
    }

    #[test]
    fn test_ring_has_exact_radius_and_size() {
        let c = HexCoord::new(1, 2);
        for radius in 1..5 {
            let hexes = ring(c, radius);
            assert_eq!(hexes.len(), 6 * radius as usize);
            assert!(hexes.iter().all(|h| h.distance(c) == radius as i32));
            let mut unique = hexes.clone();
            unique.sort();
            unique.dedup();
            assert_eq!(unique.len(), hexes.len());
        }
    }

    #[test]
    fn test_pixel_round_trip_on_centers() {
        for q in -4..5 {
            for r in -4..5 {
                let c = HexCoord::new(q, r);
                let (x, y) = to_pixel(c, 10.0);
                assert_eq!(from_pixel(x, y, 10.0), c);
                assert_eq!(from_pixel(x + 2.0, y - 3.0, 10.0), c);
            }
        }
    }

    #[test]
    fn test_edge_direction() {
        let c = HexCoord::new(2, 2);
        for dir in 0..6 {
            assert_eq!(edge_direction(c, c.neighbor(dir)), Some(dir));
        }
        assert_eq!(edge_direction(c, HexCoord::new(4, 2)), None);
        assert_eq!(edge_direction(c, c), None);
    }

    #[test]
    fn test_in_bounds_is_axial_window() {
        assert!(in_bounds(HexCoord::new(0, 0), 3, 3));
        assert!(in_bounds(HexCoord::new(2, 2), 3, 3));
        assert!(!in_bounds(HexCoord::new(3, 0), 3, 3));
        assert!(!in_bounds(HexCoord::new(1, -1), 3, 3));
    }

    #[test]
    fn test_key_format() {
        let c = HexCoord::new(-3, 7);
        assert_eq!(c.to_string(), "-3,7");
        assert_eq!("-3,7".parse::<HexCoord>(), Ok(c));
        assert!("7".parse::<HexCoord>().is_err());
        assert!("a,b".parse::<HexCoord>().is_err());
    }

    #[test]
    fn test_offset_layout_round_trip() {
        for col in 0..6 {
            for row in 0..6 {
                let axial = offset_to_axial(col, row);
                assert_eq!(axial_to_offset(axial), (col, row));
            }
        }
        assert_eq!(offset_to_axial(3, 0), HexCoord::new(3, -1));
    }
}
