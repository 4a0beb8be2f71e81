use crate::error::WheelError;
use crate::participant::{Participant, normalize_name};
use rand::rngs::OsRng;
use rand::{RngCore, SeedableRng, TryRngCore};
use rand_chacha::{ChaCha8Rng, ChaCha20Rng};
use std::time::{SystemTime, UNIX_EPOCH};

pub trait RandomSource {
    fn next_u32(&mut self) -> u32;

    /// True once the source has fallen back to a non-cryptographic generator.
    fn is_degraded(&self) -> bool {
        false
    }
}

/// OS entropy, failing closed to a time-seeded ChaCha stream if the OS source errors.
#[derive(Debug, Default)]
pub struct SecureRandom {
    fallback: Option<ChaCha20Rng>,
}

impl SecureRandom {
    pub fn new() -> Self {
        Self::default()
    }

    fn degrade(&mut self) -> &mut ChaCha20Rng {
        self.fallback
            .get_or_insert_with(|| ChaCha20Rng::seed_from_u64(fallback_seed()))
    }
}

fn fallback_seed() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    nanos ^ ((std::process::id() as u64) << 32)
}

impl RandomSource for SecureRandom {
    fn next_u32(&mut self) -> u32 {
        if let Some(rng) = self.fallback.as_mut() {
            return rng.next_u32();
        }

        match OsRng.try_next_u32() {
            Ok(value) => value,
            Err(e) => {
                log::warn!(
                    "OS random source failed ({}); winner draws are running in degraded-fairness mode",
                    e
                );
                self.degrade().next_u32()
            }
        }
    }

    fn is_degraded(&self) -> bool {
        self.fallback.is_some()
    }
}

/// Reproducible draws for simulations and tests.
#[derive(Debug, Clone)]
pub struct SeededRandom(ChaCha8Rng);

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl RandomSource for SeededRandom {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }
}

/// Scales a 32-bit draw onto `[0, count)`, i.e. `floor(value / 2^32 * count)`.
pub fn scale_draw(value: u32, count: usize) -> usize {
    debug_assert!(count > 0);
    let scaled = ((value as u64 * count as u64) >> 32) as usize;
    scaled.min(count.saturating_sub(1))
}

/// A draw mapped onto `[0, 1)`.
pub fn unit_draw(value: u32) -> f64 {
    value as f64 / (u32::MAX as f64 + 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    Declared,
    Drawn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub index: usize,
    pub source: SelectionSource,
}

pub struct FairSelector<R = SecureRandom> {
    rng: R,
}

impl Default for FairSelector<SecureRandom> {
    fn default() -> Self {
        Self::new(SecureRandom::new())
    }
}

impl<R: RandomSource> FairSelector<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    pub fn is_degraded(&self) -> bool {
        self.rng.is_degraded()
    }

    /// Resolves the authoritative winner. A declared name that is on the wheel wins outright,
    /// otherwise one strong random draw picks the index.
    pub fn select_winner(
        &mut self,
        participant_count: usize,
        declared: Option<&str>,
        participants: &[Participant],
    ) -> Result<Selection, WheelError> {
        if participant_count == 0 {
            return Err(WheelError::EmptyPool);
        }

        if let Some(name) = declared {
            let pool = &participants[..participant_count.min(participants.len())];
            match resolve_declared(name, pool) {
                Some(index) => {
                    return Ok(Selection {
                        index,
                        source: SelectionSource::Declared,
                    });
                }
                None => log::warn!(
                    "{}; falling back to a local draw",
                    WheelError::DeclaredWinnerNotFound(name.to_string())
                ),
            }
        }

        Ok(Selection {
            index: self.draw_index(participant_count),
            source: SelectionSource::Drawn,
        })
    }

    pub fn draw_index(&mut self, count: usize) -> usize {
        let index = scale_draw(self.rng.next_u32(), count);
        if self.rng.is_degraded() {
            log::debug!("Index {} drawn from degraded random source", index);
        }
        index
    }

    pub fn draw_unit(&mut self) -> f64 {
        unit_draw(self.rng.next_u32())
    }
}

/// First exact match wins; names that only differ in spacing match as a second resort.
fn resolve_declared(name: &str, participants: &[Participant]) -> Option<usize> {
    participants
        .iter()
        .position(|p| p.as_str() == name)
        .or_else(|| {
            let wanted = normalize_name(name);
            (!wanted.is_empty())
                .then(|| participants.iter().position(|p| p.normalized() == wanted))
                .flatten()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(n: usize) -> Vec<Participant> {
        (0..n).map(|i| Participant::new(format!("p{i}"))).collect()
    }

    #[test]
    fn test_empty_pool_is_rejected() {
        let mut selector = FairSelector::new(SeededRandom::new(1));
        assert_eq!(
            selector.select_winner(0, Some("x"), &[]),
            Err(WheelError::EmptyPool)
        );
    }

    #[test]
    fn test_declared_winner_is_authoritative() {
        let mut selector = FairSelector::new(SeededRandom::new(7));
        let names = pool(5);
        let selection = selector.select_winner(5, Some("p3"), &names).unwrap();
        assert_eq!(selection.index, 3);
        assert_eq!(selection.source, SelectionSource::Declared);
    }

    #[test]
    fn test_declared_duplicate_resolves_to_first() {
        let mut selector = FairSelector::new(SeededRandom::new(7));
        let names: Vec<Participant> = vec!["a".into(), "b".into(), "a".into()];
        let selection = selector.select_winner(3, Some("a"), &names).unwrap();
        assert_eq!(selection.index, 0);
    }

    #[test]
    fn test_declared_matches_after_normalization() {
        let mut selector = FairSelector::new(SeededRandom::new(7));
        let names: Vec<Participant> = vec!["Ada  Lovelace".into(), "Alan Turing".into()];
        let selection = selector
            .select_winner(2, Some(" Ada Lovelace "), &names)
            .unwrap();
        assert_eq!(selection.index, 0);
        assert_eq!(selection.source, SelectionSource::Declared);
    }

    #[test]
    fn test_missing_declared_winner_falls_back_to_draw() {
        let mut selector = FairSelector::new(SeededRandom::new(11));
        let names = pool(4);
        let selection = selector.select_winner(4, Some("nobody"), &names).unwrap();
        assert_eq!(selection.source, SelectionSource::Drawn);
        assert!(selection.index < 4);
    }

    #[test]
    fn test_scale_draw_bounds() {
        assert_eq!(scale_draw(0, 10), 0);
        assert_eq!(scale_draw(u32::MAX, 10), 9);
        assert_eq!(scale_draw(u32::MAX, 1), 0);
        assert_eq!(scale_draw(1 << 31, 2), 1);
        assert_eq!(scale_draw((1 << 31) - 1, 2), 0);
    }

    #[test]
    fn test_unit_draw_is_half_open() {
        assert_eq!(unit_draw(0), 0.0);
        assert!(unit_draw(u32::MAX) < 1.0);
    }

    #[test]
    fn test_draws_are_uniform_chi_square() {
        // 99.9th percentile of chi-square for the given degrees of freedom.
        let cases = [(2usize, 10.83), (5, 18.47), (10, 27.88), (37, 67.99)];
        let trials = 20_000;

        for (n, critical) in cases {
            let mut selector = FairSelector::new(SeededRandom::new(n as u64 * 31));
            let mut counts = vec![0usize; n];
            for _ in 0..trials {
                counts[selector.draw_index(n)] += 1;
            }

            let expected = trials as f64 / n as f64;
            let chi: f64 = counts
                .iter()
                .map(|&c| (c as f64 - expected).powi(2) / expected)
                .sum();
            assert!(chi < critical, "n={n} chi={chi} counts={counts:?}");
        }
    }

    #[test]
    fn test_secure_random_reports_healthy() {
        let mut rng = SecureRandom::new();
        let _ = rng.next_u32();
        let _ = rng.next_u32();
        assert!(!rng.is_degraded());
    }

    #[test]
    fn test_degraded_source_still_draws_in_range() {
        let mut rng = SecureRandom::new();
        rng.degrade();
        assert!(rng.is_degraded());
        let mut selector = FairSelector::new(rng);
        for _ in 0..100 {
            assert!(selector.draw_index(7) < 7);
        }
        assert!(selector.is_degraded());
    }
}
