pub mod config;
pub mod error;
pub mod heightmap;
pub mod hex;
pub mod hubs;
pub mod map;
pub mod network;
pub mod rivers;
pub mod rng;
pub mod smoothing;
pub mod terrain;
pub mod urban;

pub use config::{GenerationConfig, Geography, InfrastructureTier, MapSize, SeaSides};
pub use error::ConfigError;
pub use heightmap::{Heightmap, generate_heightmap};
pub use hex::HexCoord;
pub use map::{GameMap, HexCell, HexMap, RoutePath, TerrainType, UrbanCluster};
pub use rng::DeterministicRng;

use log::info;

/// Генерирует карту целиком: рельеф, сглаживание, реки, поселения,
/// узлы снабжения и транспортную сеть — строго в этом порядке.
///
/// Конфигурация проверяется до начала работы; дальше генерация не падает.
/// Один и тот же конфиг всегда даёт одну и ту же карту.
pub fn generate(config: &GenerationConfig) -> Result<GameMap, ConfigError> {
    config.validate()?;
    let (width, height) = config.dimensions();
    info!(
        "Генерация карты {width}×{height}, сид {}, {:?}, инфраструктура {:?}",
        config.seed, config.geography, config.infrastructure
    );

    let mut rng = DeterministicRng::new(config.seed);

    let heightmap = generate_heightmap(config.seed, width, height, &config.noise, config.sea_sides);
    let mut cells = terrain::build_terrain(&heightmap, config.geography, &config.thresholds);
    info!("Рельеф: {} клеток", cells.len());

    let smoothed = smoothing::smooth_terrain(&mut cells, &config.smoothing);
    let rivers = rivers::generate_rivers(&mut cells, &config.rivers, &mut rng);
    let urban_clusters = urban::generate_urban_clusters(&mut cells, &config.urban, &mut rng);
    let supply_hubs = hubs::place_supply_hubs(&cells, &urban_clusters, &config.hubs, &mut rng);
    let network = network::synthesize_network(
        &cells,
        &urban_clusters,
        &config.network,
        config.infrastructure,
    );

    info!(
        "Готово: сглажено {} клеток, рек {}, поселений {}, узлов {}, дорог {}, железных дорог {}",
        smoothed.anomalies_replaced + smoothed.isolated_water_removed,
        rivers.len(),
        urban_clusters.len(),
        supply_hubs.len(),
        network.roads.len(),
        network.railways.len()
    );

    Ok(GameMap {
        seed: config.seed,
        width,
        height,
        cells,
        rivers,
        urban_clusters,
        supply_hubs,
        roads: network.roads,
        railways: network.railways,
        road_routes: network.road_routes,
        railway_routes: network.railway_routes,
    })
}
