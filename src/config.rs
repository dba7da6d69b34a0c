// src/config.rs
//! Конфигурация генерации карты
//!
//! Этот модуль определяет все параметры, управляющие процедурной генерацией:
//! - Размер карты (пресет или явные ширина/высота)
//! - Тип географии (равнины, смешанная, горы) и стороны, уходящие в океан
//! - Параметры шума, порогов классификации, рек, городов, узлов снабжения
//! - Стоимости местности и уровень развития инфраструктуры
//!
//! Все структуры поддерживают сериализацию в TOML/JSON. Обязателен только `seed`,
//! остальное имеет значения по умолчанию.

use crate::error::ConfigError;
use crate::map::TerrainType;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Наибольшая допустимая ширина или высота карты в гексах
pub const MAX_DIMENSION: u32 = 4096;

/// Пресет размера карты
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MapSize {
    /// 40×30 гексов
    Small,
    /// 64×48 гексов
    #[default]
    Medium,
    /// 96×72 гекса
    Large,
}

impl MapSize {
    #[must_use]
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            MapSize::Small => (40, 30),
            MapSize::Medium => (64, 48),
            MapSize::Large => (96, 72),
        }
    }
}

/// Тип географии: сдвигает все пороги классификации,
/// чтобы одно и то же поле шума давало более плоский или более гористый мир.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Geography {
    Plains,
    #[default]
    Mixed,
    Mountainous,
}

impl Geography {
    /// Сдвиг порогов высоты.
    ///
    /// # Примеры
    /// ```
    /// use hexmapgen::config::Geography;
    /// assert_eq!(Geography::Mixed.threshold_offset(), 0.0);
    /// assert!(Geography::Plains.threshold_offset() > 0.0);
    /// ```
    #[must_use]
    pub fn threshold_offset(self) -> f32 {
        match self {
            Geography::Plains => 0.05,
            Geography::Mixed => 0.0,
            Geography::Mountainous => -0.05,
        }
    }
}

/// Уровень развития транспортной сети
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum InfrastructureTier {
    /// Только дороги (остов + ветки к городкам), железных дорог нет
    None,
    /// Дороги и железнодорожный остов
    #[default]
    Basic,
    /// Плюс дублирующие ветки железной дороги и дорожные «срезки»
    Developed,
}

/// Набор сторон карты, у которых суша уходит в океан (битовая маска).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeaSides(pub u8);

impl SeaSides {
    pub const NONE: Self = Self(0);
    pub const NORTH: Self = Self(1);
    pub const SOUTH: Self = Self(2);
    pub const EAST: Self = Self(4);
    pub const WEST: Self = Self(8);
    pub const ALL: Self = Self(15);

    #[must_use]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    #[must_use]
    pub fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for SeaSides {
    fn default() -> Self {
        Self::ALL
    }
}

/// Параметры шумовых полей высоты и влажности
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NoiseSettings {
    /// Частота базовой октавы высоты (в единицах пиксельной раскладки с размером гекса 1)
    pub elevation_scale: f32,
    /// Веса трёх октав высоты; каждая следующая октава в 2 раза чаще
    pub octave_weights: [f32; 3],
    /// Частота поля влажности
    pub moisture_scale: f32,
    /// Смещение координат поля влажности для декорреляции с высотой
    pub moisture_offset: f32,
    /// Ширина прибрежной полосы (доля размера карты), в которой гасится высота
    pub falloff_band: f32,
    /// Экспонента затухания высоты к «морским» сторонам
    pub falloff_exponent: f32,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            elevation_scale: 0.05,
            octave_weights: [1.0, 0.5, 0.25],
            moisture_scale: 0.07,
            moisture_offset: 1000.0,
            falloff_band: 0.3,
            falloff_exponent: 1.5,
        }
    }
}

/// Пороги классификации местности (для `Geography::Mixed`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ThresholdSettings {
    pub water: f32,
    pub coastal: f32,
    pub lowland: f32,
    pub highland: f32,
    /// Выше — лес/болото вместо равнины/холмов
    pub moisture: f32,
    /// Выше — внутреннее озеро в прибрежной низине
    pub lake_moisture: f32,
}

impl Default for ThresholdSettings {
    fn default() -> Self {
        Self {
            water: 0.32,
            coastal: 0.40,
            lowland: 0.52,
            highland: 0.66,
            moisture: 0.55,
            lake_moisture: 0.78,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SmoothingSettings {
    /// Допуск, при котором группа соседа считается «своей»
    pub group_tolerance: u8,
    /// Минимальное отклонение от средней группы соседей для замены
    pub deviation_threshold: f32,
}

impl Default for SmoothingSettings {
    fn default() -> Self {
        Self {
            group_tolerance: 0,
            deviation_threshold: 1.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RiverSettings {
    pub min_count: usize,
    pub max_count: usize,
    /// Исток должен быть выше этой отметки
    pub source_elevation: f32,
    /// Минимальное расстояние между истоками в гексах
    pub min_source_spacing: u32,
    /// Более короткие реки отбрасываются
    pub min_length: usize,
    pub max_length: usize,
    /// С этой длины нижнее течение расширяется
    pub wide_length: usize,
    /// Доля длины реки (от устья), которая расширяется
    pub wide_fraction: f32,
    pub lake_min_size: usize,
    pub lake_max_size: usize,
}

impl Default for RiverSettings {
    fn default() -> Self {
        Self {
            min_count: 3,
            max_count: 6,
            source_elevation: 0.58,
            min_source_spacing: 6,
            min_length: 5,
            max_length: 80,
            wide_length: 14,
            wide_fraction: 0.4,
            lake_min_size: 3,
            lake_max_size: 6,
        }
    }
}

/// Параметры одного уровня поселений
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TierSettings {
    pub min_size: usize,
    pub max_size: usize,
    /// Множитель к базовой плотности поселений
    pub density: f32,
    /// Минимальное расстояние от центра до любого уже размещённого центра
    pub min_spacing: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UrbanSettings {
    /// Базовое число поселений на 1000 гексов
    pub settlements_per_1000_hexes: f32,
    /// Клетки с высотой в пределах допуска от центра растут с двойным весом
    pub elevation_tolerance: f32,
    pub river_bonus: f32,
    pub water_bonus: f32,
    pub plains_bonus: f32,
    pub metropolis: TierSettings,
    pub city: TierSettings,
    pub town: TierSettings,
}

impl Default for UrbanSettings {
    fn default() -> Self {
        Self {
            settlements_per_1000_hexes: 4.0,
            elevation_tolerance: 0.08,
            river_bonus: 3.0,
            water_bonus: 2.0,
            plains_bonus: 1.0,
            metropolis: TierSettings {
                min_size: 7,
                max_size: 12,
                density: 0.25,
                min_spacing: 12,
            },
            city: TierSettings {
                min_size: 4,
                max_size: 7,
                density: 0.75,
                min_spacing: 8,
            },
            town: TierSettings {
                min_size: 1,
                max_size: 3,
                density: 2.0,
                min_spacing: 4,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HubSettings {
    pub rural_per_1000_hexes: f32,
    /// Минимальное расстояние сельского узла до любого другого узла
    pub rural_min_spacing: u32,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            rural_per_1000_hexes: 1.5,
            rural_min_spacing: 8,
        }
    }
}

/// Стоимость входа в гекс для поиска пути. Вода и горы непроходимы всегда.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TerrainCosts {
    pub plains: f32,
    pub marsh: f32,
    pub forest: f32,
    pub hills: f32,
    pub river: f32,
    pub urban: f32,
}

impl TerrainCosts {
    #[must_use]
    pub fn road() -> Self {
        Self {
            plains: 1.0,
            marsh: 3.0,
            forest: 2.0,
            hills: 2.5,
            river: 4.0,
            urban: 1.0,
        }
    }

    #[must_use]
    pub fn railway() -> Self {
        Self {
            plains: 1.0,
            marsh: 4.0,
            forest: 2.0,
            hills: 4.0,
            river: 6.0,
            urban: 1.0,
        }
    }

    /// Одинаковая стоимость для всей проходимой местности.
    #[must_use]
    pub fn uniform(cost: f32) -> Self {
        Self {
            plains: cost,
            marsh: cost,
            forest: cost,
            hills: cost,
            river: cost,
            urban: cost,
        }
    }

    /// `None` — непроходимо.
    #[must_use]
    pub fn cost(&self, terrain: TerrainType) -> Option<f32> {
        match terrain {
            TerrainType::Water | TerrainType::Mountain => None,
            TerrainType::Plains => Some(self.plains),
            TerrainType::Marsh => Some(self.marsh),
            TerrainType::Forest => Some(self.forest),
            TerrainType::Hills => Some(self.hills),
            TerrainType::River => Some(self.river),
            TerrainType::Urban => Some(self.urban),
        }
    }

    /// Минимальная стоимость шага по проходимой местности.
    #[must_use]
    pub fn min_cost(&self) -> f32 {
        [
            self.plains,
            self.marsh,
            self.forest,
            self.hills,
            self.river,
            self.urban,
        ]
        .into_iter()
        .fold(f32::INFINITY, f32::min)
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        let min = self.min_cost();
        let all_finite = [
            self.plains,
            self.marsh,
            self.forest,
            self.hills,
            self.river,
            self.urban,
        ]
        .iter()
        .all(|c| c.is_finite());
        if !all_finite || min <= 0.0 {
            return Err(ConfigError::invalid(
                name,
                "passable terrain costs must be finite and positive",
            ));
        }
        Ok(())
    }
}

impl Default for TerrainCosts {
    fn default() -> Self {
        Self::road()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkSettings {
    /// Сколько ближайших крупных центров соединять с каждым
    pub nearest_neighbors: usize,
    /// Стоимость входа по уже построенному ребру
    pub reuse_cost: f32,
    /// Если путь по остову дороже прямого в столько раз — строится прямая дорога
    pub detour_factor: f32,
    /// Максимальное расстояние (в гексах) для дорожных «срезок»
    pub max_connection_distance: u32,
    /// Число дополнительных (не входящих в остов) веток железной дороги
    pub rail_redundancy: usize,
    pub road_costs: TerrainCosts,
    #[serde(default = "TerrainCosts::railway")]
    pub rail_costs: TerrainCosts,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            nearest_neighbors: 8,
            reuse_cost: 0.2,
            detour_factor: 1.5,
            max_connection_distance: 30,
            rail_redundancy: 2,
            road_costs: TerrainCosts::road(),
            rail_costs: TerrainCosts::railway(),
        }
    }
}

/// Основные параметры генерации
///
/// Полная конфигурация одного прогона. Поддерживает загрузку из TOML-файлов.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Сид генератора (детерминированная генерация)
    pub seed: u32,

    /// Пресет размера (по умолчанию `Medium`)
    #[serde(default)]
    pub size: MapSize,

    /// Явная ширина, перекрывает пресет
    #[serde(default)]
    pub width: Option<u32>,

    /// Явная высота, перекрывает пресет
    #[serde(default)]
    pub height: Option<u32>,

    #[serde(default)]
    pub geography: Geography,

    #[serde(default)]
    pub sea_sides: SeaSides,

    #[serde(default)]
    pub infrastructure: InfrastructureTier,

    #[serde(default)]
    pub noise: NoiseSettings,

    #[serde(default)]
    pub thresholds: ThresholdSettings,

    #[serde(default)]
    pub smoothing: SmoothingSettings,

    #[serde(default)]
    pub rivers: RiverSettings,

    #[serde(default)]
    pub urban: UrbanSettings,

    #[serde(default)]
    pub hubs: HubSettings,

    #[serde(default)]
    pub network: NetworkSettings,
}

impl GenerationConfig {
    /// Конфигурация по умолчанию с заданным сидом.
    #[must_use]
    pub fn with_seed(seed: u32) -> Self {
        Self {
            seed,
            size: MapSize::default(),
            width: None,
            height: None,
            geography: Geography::default(),
            sea_sides: SeaSides::default(),
            infrastructure: InfrastructureTier::default(),
            noise: NoiseSettings::default(),
            thresholds: ThresholdSettings::default(),
            smoothing: SmoothingSettings::default(),
            rivers: RiverSettings::default(),
            urban: UrbanSettings::default(),
            hubs: HubSettings::default(),
            network: NetworkSettings::default(),
        }
    }

    /// Загружает параметры из TOML-файла
    ///
    /// # Пример
    /// ```toml
    /// # map.toml
    /// seed = 42
    /// size = "Large"
    /// geography = "Mountainous"
    /// infrastructure = "Developed"
    /// ```
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Итоговые размеры карты `(width, height)`.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        let (w, h) = self.size.dimensions();
        (self.width.unwrap_or(w), self.height.unwrap_or(h))
    }

    /// Проверяет конфигурацию до начала генерации.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (width, height) = self.dimensions();
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(ConfigError::InvalidDimensions { width, height });
        }

        let weights = &self.noise.octave_weights;
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) || weights.iter().sum::<f32>() <= 0.0 {
            return Err(ConfigError::invalid(
                "noise.octave_weights",
                "weights must be non-negative with a positive sum",
            ));
        }
        if self.noise.elevation_scale <= 0.0 || self.noise.moisture_scale <= 0.0 {
            return Err(ConfigError::invalid("noise", "noise scales must be positive"));
        }
        if self.noise.falloff_band <= 0.0 || self.noise.falloff_exponent <= 0.0 {
            return Err(ConfigError::invalid(
                "noise",
                "falloff band and exponent must be positive",
            ));
        }

        let t = &self.thresholds;
        if !(t.water <= t.coastal && t.coastal <= t.lowland && t.lowland <= t.highland) {
            return Err(ConfigError::invalid(
                "thresholds",
                "expected water <= coastal <= lowland <= highland",
            ));
        }

        let r = &self.rivers;
        check_range("rivers.count", r.min_count, r.max_count)?;
        check_range("rivers.lake_size", r.lake_min_size, r.lake_max_size)?;
        check_range("rivers.length", r.min_length, r.max_length)?;
        if r.min_length < 2 {
            return Err(ConfigError::invalid("rivers.min_length", "must be at least 2"));
        }
        check_fraction("rivers.wide_fraction", r.wide_fraction)?;

        let u = &self.urban;
        for (name, tier) in [
            ("urban.metropolis", &u.metropolis),
            ("urban.city", &u.city),
            ("urban.town", &u.town),
        ] {
            check_range(name, tier.min_size, tier.max_size)?;
            if tier.min_size == 0 {
                return Err(ConfigError::invalid(name, "cluster size must be at least 1"));
            }
            if tier.density < 0.0 {
                return Err(ConfigError::invalid(name, "density must be non-negative"));
            }
        }

        let n = &self.network;
        n.road_costs.validate("network.road_costs")?;
        n.rail_costs.validate("network.rail_costs")?;
        if !n.reuse_cost.is_finite() || n.reuse_cost <= 0.0 {
            return Err(ConfigError::invalid(
                "network.reuse_cost",
                "must be finite and positive",
            ));
        }
        if n.detour_factor < 1.0 {
            return Err(ConfigError::invalid("network.detour_factor", "must be >= 1"));
        }

        Ok(())
    }
}

fn check_range(name: &'static str, min: usize, max: usize) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::InvalidRange {
            name,
            min: min as f64,
            max: max as f64,
        });
    }
    Ok(())
}

fn check_fraction(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::invalid(name, "must be within [0, 1]"));
    }
    Ok(())
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::with_seed(0)
    }
}
