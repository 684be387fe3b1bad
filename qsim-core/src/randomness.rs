//! Randomness facade for reproducible runs.
//!
//! The engine never touches a generator directly. Every draw goes through a
//! [`RandomProvider`] together with the [`DrawSite`] it was made from, so a
//! seeded provider reproduces a trajectory and a scripted provider (tests) can
//! drive one exactly.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Exp};

use crate::error::{check_rate, SimError};
use crate::logging::events;

/// A labeled sampling location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawSite {
    pub tag: &'static str,
    pub site_id: u64,
}

impl DrawSite {
    pub const INTER_ARRIVAL: DrawSite = DrawSite::new("inter_arrival");
    pub const SERVICE: DrawSite = DrawSite::new("service");

    pub const fn new(tag: &'static str) -> Self {
        Self {
            tag,
            site_id: fnv1a64(tag),
        }
    }
}

/// Sampling interface the engine draws through.
///
/// Implementations consume exactly one value from their stream per call.
pub trait RandomProvider {
    /// Sample an exponential distribution with the given `rate` (events per
    /// minute). Returns a value in minutes.
    fn sample_exp(&mut self, site: DrawSite, rate: f64) -> Result<f64, SimError>;
}

/// Const-friendly 64-bit FNV-1a hash.
pub const fn fnv1a64(s: &str) -> u64 {
    let bytes = s.as_bytes();
    let mut hash: u64 = 0xcbf29ce484222325;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(0x100000001b3);
        i += 1;
    }
    hash
}

/// Default provider backed by ChaCha8.
///
/// ChaCha8 has a documented, portable output stream, so the same seed gives
/// the same trajectory on every platform and release of this crate.
#[derive(Debug, Clone)]
pub struct SeededRandomProvider {
    rng: ChaCha8Rng,
    seed: Option<u64>,
    draws: u64,
}

impl SeededRandomProvider {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            rng,
            seed,
            draws: 0,
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(Some(seed))
    }

    /// Seed the stream was created from, `None` for entropy-seeded runs.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }
}

impl RandomProvider for SeededRandomProvider {
    fn sample_exp(&mut self, site: DrawSite, rate: f64) -> Result<f64, SimError> {
        let rate = check_rate(site.tag, rate)?;
        let exp = Exp::new(rate).map_err(|_| SimError::invalid_rate(site.tag, rate))?;
        let value = exp.sample(&mut self.rng);
        self.draws += 1;
        events::variate_drawn(site, self.draws, value);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_sites_have_distinct_stable_ids() {
        assert_ne!(DrawSite::INTER_ARRIVAL.site_id, DrawSite::SERVICE.site_id);
        assert_eq!(DrawSite::new("service"), DrawSite::SERVICE);
        assert_eq!(fnv1a64(""), 0xcbf29ce484222325);
    }

    #[test]
    fn test_seed_is_reported_back() {
        assert_eq!(SeededRandomProvider::seeded(42).seed(), Some(42));
        assert_eq!(SeededRandomProvider::new(None).seed(), None);
    }

    #[test]
    fn test_same_seed_gives_same_stream() {
        let mut a = SeededRandomProvider::seeded(42);
        let mut b = SeededRandomProvider::seeded(42);

        for _ in 0..100 {
            let x = a.sample_exp(DrawSite::SERVICE, 0.2).unwrap();
            let y = b.sample_exp(DrawSite::SERVICE, 0.2).unwrap();
            assert_eq!(x.to_bits(), y.to_bits());
        }
        assert_eq!(a.draws(), 100);
    }

    #[test]
    fn test_samples_are_non_negative_with_expected_mean() {
        let mut provider = SeededRandomProvider::seeded(7);
        let n = 50_000;
        let mut sum = 0.0;
        for _ in 0..n {
            let x = provider.sample_exp(DrawSite::INTER_ARRIVAL, 0.5).unwrap();
            assert!(x >= 0.0);
            sum += x;
        }
        let mean = sum / n as f64;
        assert!((mean - 2.0).abs() < 0.05, "mean {mean} should be close to 1/rate");
    }

    #[test]
    fn test_invalid_rate_is_rejected_without_consuming_a_draw() {
        let mut provider = SeededRandomProvider::seeded(1);
        let err = provider.sample_exp(DrawSite::SERVICE, 0.0).unwrap_err();

        assert!(matches!(err, SimError::InvalidRate { parameter: "service", .. }));
        assert_eq!(provider.draws(), 0);
    }
}
