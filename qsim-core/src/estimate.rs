//! Point estimates with normal-approximation confidence intervals

use serde::{Deserialize, Serialize};

/// Inverse CDF (quantile) of the standard normal distribution.
///
/// Uses the Peter J. Acklam rational approximation.
///
/// # Panics
/// Panics if `p` is not in `(0, 1)`.
pub fn inv_norm_cdf(p: f64) -> f64 {
    assert!(p > 0.0 && p < 1.0, "p must be in (0, 1)");

    const A: [f64; 6] = [
        -3.969_683_028_665_376e+01,
        2.209_460_984_245_205e+02,
        -2.759_285_104_469_687e+02,
        1.383_577_518_672_690e+02,
        -3.066_479_806_614_716e+01,
        2.506_628_277_459_239e+00,
    ];
    const B: [f64; 5] = [
        -5.447_609_879_822_406e+01,
        1.615_858_368_580_409e+02,
        -1.556_989_798_598_866e+02,
        6.680_131_188_771_972e+01,
        -1.328_068_155_288_572e+01,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-03,
        -3.223_964_580_411_365e-01,
        -2.400_758_277_161_838e+00,
        -2.549_732_539_343_734e+00,
        4.374_664_141_464_968e+00,
        2.938_163_982_698_783e+00,
    ];
    const D: [f64; 4] = [
        7.784_695_709_041_462e-03,
        3.224_671_290_700_398e-01,
        2.445_134_137_142_996e+00,
        3.754_408_661_907_416e+00,
    ];
    const P_LOW: f64 = 0.02425;

    let tail = |q: f64| {
        let num = ((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5];
        let den = (((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0;
        num / den
    };

    if p < P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p > 1.0 - P_LOW {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    } else {
        let q = p - 0.5;
        let r = q * q;
        let num = (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q;
        let den = ((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0;
        num / den
    }
}

/// Two-sided z value, e.g. ~1.96 for `confidence = 0.95`.
///
/// # Panics
/// Panics if `confidence` is not in `(0, 1)`.
pub fn z_for_confidence(confidence: f64) -> f64 {
    assert!(
        confidence > 0.0 && confidence < 1.0,
        "confidence must be in (0, 1)"
    );
    inv_norm_cdf(0.5 + confidence / 2.0)
}

pub fn mean(xs: &[f64]) -> Option<f64> {
    if xs.is_empty() {
        return None;
    }
    Some(xs.iter().sum::<f64>() / xs.len() as f64)
}

pub fn sample_variance(xs: &[f64]) -> Option<f64> {
    if xs.len() < 2 {
        return None;
    }
    let m = mean(xs)?;
    let ss: f64 = xs.iter().map(|&x| (x - m) * (x - m)).sum();
    Some(ss / (xs.len() as f64 - 1.0))
}

/// Mean of independent samples with its standard error and interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricEstimate {
    pub samples: usize,
    pub mean: f64,
    pub std_err: f64,
    pub ci_low: f64,
    pub ci_high: f64,
}

impl MetricEstimate {
    /// Estimate from at least one sample.
    ///
    /// A single sample yields a zero-width interval.
    pub fn from_samples(xs: &[f64], confidence: f64) -> Option<Self> {
        let m = mean(xs)?;
        let std_err = sample_variance(xs)
            .map(|var| (var / xs.len() as f64).sqrt())
            .unwrap_or(0.0);
        let half_width = z_for_confidence(confidence) * std_err;

        Some(Self {
            samples: xs.len(),
            mean: m,
            std_err,
            ci_low: m - half_width,
            ci_high: m + half_width,
        })
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.ci_low && value <= self.ci_high
    }

    pub fn half_width(&self) -> f64 {
        (self.ci_high - self.ci_low) / 2.0
    }
}
