use fastnoise_lite::{FastNoiseLite, NoiseType};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Гладкое детерминированное скалярное поле со значениями в `[0, 1)`
///
/// Значение зависит только от сида, масштаба, смещения и координат клетки.
/// Смещение выбирается из генератора случайных чисел один раз на генерацию,
/// чтобы несколько полей с одним сидом не давали одинаковых артефактов.
pub struct NoiseField {
    noise: FastNoiseLite,
    scale_x: f32,
    scale_y: f32,
    offset: (f32, f32),
}

impl NoiseField {
    pub fn new(seed: u64, scale: f32, offset: (f32, f32)) -> Self {
        Self::anisotropic(seed, scale, scale, offset)
    }

    pub fn anisotropic(seed: u64, scale_x: f32, scale_y: f32, offset: (f32, f32)) -> Self {
        let mut noise = FastNoiseLite::new();
        noise.set_seed(Some(seed as i32));
        noise.set_noise_type(Some(NoiseType::Perlin));
        // Масштаб применяем сами, частота шума единичная
        noise.set_frequency(Some(1.0));
        Self {
            noise,
            scale_x,
            scale_y,
            offset,
        }
    }

    pub fn sample(&self, x: u32, y: u32) -> f32 {
        let nx = x as f32 * self.scale_x + self.offset.0;
        let ny = y as f32 * self.scale_y + self.offset.1;
        let value = (self.noise.get_noise_2d(nx, ny) + 1.0) * 0.5;
        value.clamp(0.0, 1.0 - f32::EPSILON)
    }

    /// Поле целиком, построчно (`y * width + x`)
    pub fn sample_grid(&self, width: u32, height: u32) -> Vec<f32> {
        let sample = |i: u32| self.sample(i % width, i / width);

        #[cfg(feature = "parallel")]
        let data = (0..width * height).into_par_iter().map(sample).collect();
        #[cfg(not(feature = "parallel"))]
        let data = (0..width * height).map(sample).collect();

        data
    }
}
