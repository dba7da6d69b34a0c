use crate::config::{NoiseSettings, SeaSides};
use crate::hex;
use fastnoise_lite::{FastNoiseLite, NoiseType};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Поля высоты и влажности в раскладке `row * width + col`, значения в `[0, 1]`
#[derive(Debug, Clone)]
pub struct Heightmap {
    pub width: u32,
    pub height: u32,
    pub elevation: Vec<f32>,
    pub moisture: Vec<f32>,
}

impl Heightmap {
    pub fn get(&self, col: u32, row: u32) -> (f32, f32) {
        let idx = row as usize * self.width as usize + col as usize;
        (self.elevation[idx], self.moisture[idx])
    }
}

/// Смещение октав, чтобы соседние частоты не совпадали в начале координат
const OCTAVE_OFFSET: f32 = 97.31;

/// Генерирует высоту и влажность для каждого гекса
///
/// Высота — три октавы 2D-шума с удвоением частоты, смешанные по весам,
/// затем гасится к «морским» сторонам карты. Влажность — отдельное поле,
/// сдвинутое по координатам. Шум сидируется напрямую от `seed`.
pub fn generate_heightmap(
    seed: u32,
    width: u32,
    height: u32,
    noise: &NoiseSettings,
    sea_sides: SeaSides,
) -> Heightmap {
    let mut elevation_noise = FastNoiseLite::new();
    elevation_noise.set_seed(Some(seed as i32));
    elevation_noise.set_noise_type(Some(NoiseType::OpenSimplex2));
    elevation_noise.set_frequency(Some(noise.elevation_scale));

    let mut moisture_noise = FastNoiseLite::new();
    moisture_noise.set_seed(Some(seed as i32));
    moisture_noise.set_noise_type(Some(NoiseType::OpenSimplex2));
    moisture_noise.set_frequency(Some(noise.moisture_scale));

    let weight_sum: f32 = noise.octave_weights.iter().sum();
    let span_x = (width.max(2) - 1) as f32;
    let span_y = (height.max(2) - 1) as f32;

    let columns = width as usize;
    let sample = |i: usize| -> (f32, f32) {
        let col = (i % columns) as u32;
        let row = (i / columns) as u32;
        let (x, y) = hex::to_pixel(hex::offset_to_axial(col as i32, row as i32), 1.0);

        // === 1. Высота: три октавы ===
        let mut value = 0.0;
        let mut frequency = 1.0;
        for (octave, &weight) in noise.octave_weights.iter().enumerate() {
            let shift = octave as f32 * OCTAVE_OFFSET;
            value += weight * elevation_noise.get_noise_2d(x * frequency + shift, y * frequency + shift);
            frequency *= 2.0;
        }
        let mut elevation = (value / weight_sum + 1.0) * 0.5;

        // === 2. Затухание к морским сторонам ===
        let nx = col as f32 / span_x;
        let ny = row as f32 / span_y;
        elevation *= edge_falloff(nx, ny, sea_sides, noise.falloff_band, noise.falloff_exponent);

        // === 3. Влажность ===
        let ox = x + noise.moisture_offset;
        let oy = y + noise.moisture_offset;
        let m = moisture_noise.get_noise_2d(ox, oy) + 0.5 * moisture_noise.get_noise_2d(ox * 2.0, oy * 2.0);
        let moisture = (m / 1.5 + 1.0) * 0.5;

        (elevation.clamp(0.0, 1.0), moisture.clamp(0.0, 1.0))
    };

    let total = columns * height as usize;
    #[cfg(feature = "parallel")]
    let samples: Vec<(f32, f32)> = (0..total).into_par_iter().map(sample).collect();
    #[cfg(not(feature = "parallel"))]
    let samples: Vec<(f32, f32)> = (0..total).map(sample).collect();

    let (elevation, moisture) = samples.into_iter().unzip();
    Heightmap {
        width,
        height,
        elevation,
        moisture,
    }
}

/// Множитель высоты в `[0, 1]` по нормированной позиции `(nx, ny)`.
///
/// Для каждой включённой стороны: `(d / band)^exponent`, где `d` — расстояние до края.
pub fn edge_falloff(nx: f32, ny: f32, sea_sides: SeaSides, band: f32, exponent: f32) -> f32 {
    let sides = [
        (SeaSides::NORTH, ny),
        (SeaSides::SOUTH, 1.0 - ny),
        (SeaSides::WEST, nx),
        (SeaSides::EAST, 1.0 - nx),
    ];
    sides
        .iter()
        .filter(|(side, _)| sea_sides.contains(*side))
        .map(|&(_, d)| (d / band).clamp(0.0, 1.0).powf(exponent))
        .product()
}
