use crate::config::{Geography, ThresholdSettings};
use crate::heightmap::Heightmap;
use crate::map::{HexCell, HexMap, TerrainType};

/// Классифицирует гекс по высоте и влажности
///
/// Все пороги высоты сдвигаются на [`Geography::threshold_offset`].
/// Чистая функция: переопределения (реки, города) делают последующие проходы.
pub fn classify(
    elevation: f32,
    moisture: f32,
    geography: Geography,
    thresholds: &ThresholdSettings,
) -> TerrainType {
    let offset = geography.threshold_offset();
    let wet = moisture > thresholds.moisture;

    if elevation < thresholds.water + offset {
        TerrainType::Water
    } else if elevation < thresholds.coastal + offset {
        // Прибрежная низина: очень влажно — озеро, влажно — болото
        if moisture > thresholds.lake_moisture {
            TerrainType::Water
        } else if wet {
            TerrainType::Marsh
        } else {
            TerrainType::Plains
        }
    } else if elevation < thresholds.lowland + offset {
        if wet { TerrainType::Forest } else { TerrainType::Plains }
    } else if elevation < thresholds.highland + offset {
        if wet { TerrainType::Forest } else { TerrainType::Hills }
    } else {
        TerrainType::Mountain
    }
}

/// Создаёт клетки карты из полей высоты и влажности
pub fn build_terrain(
    heightmap: &Heightmap,
    geography: Geography,
    thresholds: &ThresholdSettings,
) -> HexMap {
    HexMap::from_fn(heightmap.width, heightmap.height, |col, row, coord| {
        let (elevation, moisture) = heightmap.get(col, row);
        let terrain = classify(elevation, moisture, geography, thresholds);
        HexCell::new(coord, elevation, moisture, terrain)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mixed(elevation: f32, moisture: f32) -> TerrainType {
        classify(elevation, moisture, Geography::Mixed, &ThresholdSettings::default())
    }

    #[test]
    fn test_extremes() {
        assert_eq!(mixed(0.1, 0.5), TerrainType::Water);
        assert_eq!(mixed(0.9, 0.5), TerrainType::Mountain);
    }

    #[test]
    fn test_coastal_band() {
        assert_eq!(mixed(0.35, 0.9), TerrainType::Water);
        assert_eq!(mixed(0.35, 0.6), TerrainType::Marsh);
        assert_eq!(mixed(0.35, 0.2), TerrainType::Plains);
    }

    #[test]
    fn test_lowland_and_highland() {
        assert_eq!(mixed(0.45, 0.7), TerrainType::Forest);
        assert_eq!(mixed(0.45, 0.3), TerrainType::Plains);
        assert_eq!(mixed(0.6, 0.7), TerrainType::Forest);
        assert_eq!(mixed(0.6, 0.3), TerrainType::Hills);
    }

    #[test]
    fn test_geography_shifts_thresholds() {
        let t = ThresholdSettings::default();
        assert_eq!(classify(0.63, 0.3, Geography::Mixed, &t), TerrainType::Hills);
        assert_eq!(classify(0.63, 0.3, Geography::Mountainous, &t), TerrainType::Mountain);
        assert_eq!(classify(0.55, 0.3, Geography::Plains, &t), TerrainType::Plains);
        assert_eq!(classify(0.55, 0.3, Geography::Mixed, &t), TerrainType::Hills);
    }

    #[test]
    fn test_build_terrain_covers_every_hex() {
        let heightmap = Heightmap {
            width: 3,
            height: 2,
            elevation: vec![0.1, 0.45, 0.9, 0.1, 0.45, 0.9],
            moisture: vec![0.3; 6],
        };
        let map = build_terrain(&heightmap, Geography::Mixed, &ThresholdSettings::default());
        assert_eq!(map.len(), 6);
        assert_eq!(map.cell(0).terrain, TerrainType::Water);
        assert_eq!(map.cell(1).terrain, TerrainType::Plains);
        assert_eq!(map.cell(2).terrain, TerrainType::Mountain);
        assert_eq!(map.cell(4).coord, crate::hex::offset_to_axial(1, 1));
    }
}
