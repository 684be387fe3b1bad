//! Simulation time management

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};

use crate::error::SimError;

/// Simulation time in minutes since the start of a run
///
/// SimTime wraps a non-negative, non-NaN `f64`. `SimTime::INFINITY` stands for
/// "no event pending" (an idle server has no departure scheduled). Ordering is
/// total, so times can be compared and used with `min`/`max` directly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimTime(f64);

impl SimTime {
    /// A time later than every finite time.
    pub const INFINITY: SimTime = SimTime(f64::INFINITY);

    /// Create a new SimTime at the simulation start (time zero)
    pub const fn zero() -> Self {
        SimTime(0.0)
    }

    /// Create a SimTime from minutes
    ///
    /// # Panics
    ///
    /// Panics if `minutes` is negative or NaN.
    pub fn from_minutes(minutes: f64) -> Self {
        match Self::try_from_minutes(minutes) {
            Ok(time) => time,
            Err(_) => panic!("SimTime cannot be negative or NaN: {minutes}"),
        }
    }

    /// Create a SimTime from hours
    pub fn from_hours(hours: f64) -> Self {
        Self::from_minutes(hours * 60.0)
    }

    /// Create a SimTime from seconds
    pub fn from_secs(secs: f64) -> Self {
        Self::from_minutes(secs / 60.0)
    }

    /// Fallible constructor used on configuration boundaries.
    pub fn try_from_minutes(minutes: f64) -> Result<Self, SimError> {
        if minutes.is_nan() || minutes < 0.0 {
            return Err(SimError::Configuration(format!(
                "simulation time must be non-negative, got {minutes}"
            )));
        }
        Ok(SimTime(minutes))
    }

    /// Get the raw value in minutes
    pub const fn as_minutes(&self) -> f64 {
        self.0
    }

    /// Get the value in hours
    pub fn as_hours(&self) -> f64 {
        self.0 / 60.0
    }

    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }

    /// Minutes elapsed since `earlier`, saturating at zero.
    pub fn minutes_since(&self, earlier: SimTime) -> f64 {
        (self.0 - earlier.0).max(0.0)
    }
}

impl PartialEq for SimTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Add<f64> for SimTime {
    type Output = SimTime;

    /// Offset by a non-negative number of minutes.
    fn add(self, minutes: f64) -> Self::Output {
        SimTime(self.0 + minutes.max(0.0))
    }
}

impl Sub<SimTime> for SimTime {
    type Output = f64;

    fn sub(self, rhs: SimTime) -> Self::Output {
        self.minutes_since(rhs)
    }
}

impl Default for SimTime {
    fn default() -> Self {
        SimTime::zero()
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_infinite() {
            write!(f, "∞")
        } else {
            write!(f, "{:.3}min", self.0)
        }
    }
}
