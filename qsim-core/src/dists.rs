//! Exponential variates for inter-arrival and service times
//!
//! Rates are configured per hour (the unit callers think in) and sampled per
//! minute (the unit of the simulation clock).

use crate::error::{check_rate, SimError};
use crate::randomness::{DrawSite, RandomProvider};

/// Exponentially distributed duration source bound to one draw site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialVariate {
    /// Rate parameter in events per minute
    rate_per_minute: f64,
    site: DrawSite,
}

impl ExponentialVariate {
    /// Create a variate from a rate in events per hour.
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvalidRate` if the rate is not positive and finite.
    pub fn per_hour(rate_per_hour: f64, site: DrawSite) -> Result<Self, SimError> {
        let rate = check_rate(site.tag, rate_per_hour)?;
        Ok(Self {
            rate_per_minute: rate / 60.0,
            site,
        })
    }

    /// Variate for customer inter-arrival times (rate λ).
    pub fn inter_arrival(lambda_per_hour: f64) -> Result<Self, SimError> {
        Self::per_hour(lambda_per_hour, DrawSite::INTER_ARRIVAL)
    }

    /// Variate for service times (rate μ).
    pub fn service(mu_per_hour: f64) -> Result<Self, SimError> {
        Self::per_hour(mu_per_hour, DrawSite::SERVICE)
    }

    pub fn rate_per_minute(&self) -> f64 {
        self.rate_per_minute
    }

    pub fn site(&self) -> DrawSite {
        self.site
    }

    /// Mean of the distribution in minutes (1 / rate).
    pub fn mean_minutes(&self) -> f64 {
        1.0 / self.rate_per_minute
    }

    /// Draw one duration in minutes.
    pub fn sample(&self, rng: &mut dyn RandomProvider) -> Result<f64, SimError> {
        rng.sample_exp(self.site, self.rate_per_minute)
    }
}
