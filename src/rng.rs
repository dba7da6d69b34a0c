// src/rng.rs
//! Детерминированный генератор случайных чисел
//!
//! Один экземпляр создаётся из сида в начале генерации и передаётся
//! по `&mut` во все этапы по порядку. Глобального состояния нет.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone)]
pub struct DeterministicRng {
    inner: ChaCha8Rng,
}

impl DeterministicRng {
    #[must_use]
    pub fn new(seed: u32) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(u64::from(seed)),
        }
    }

    /// Следующее число из `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        self.inner.gen_range(0.0..1.0)
    }

    /// Целое из замкнутого диапазона `[min, max]`. При `min >= max` возвращает `min`.
    pub fn range_inclusive(&mut self, min: usize, max: usize) -> usize {
        if min >= max {
            return min;
        }
        self.inner.gen_range(min..=max)
    }

    /// Индекс, выбранный пропорционально весам. `None` для пустого списка
    /// или при нулевой сумме весов.
    pub fn weighted_index(&mut self, weights: &[f32]) -> Option<usize> {
        let total: f32 = weights.iter().sum();
        if weights.is_empty() || total <= 0.0 {
            return None;
        }
        let mut target = self.next_f32() * total;
        for (i, &w) in weights.iter().enumerate() {
            if target < w {
                return Some(i);
            }
            target -= w;
        }
        // Накопленная погрешность float: последний ненулевой вес
        weights.iter().rposition(|&w| w > 0.0)
    }
}
