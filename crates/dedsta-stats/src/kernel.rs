//! Smoothing kernels.
//!
//! Every kernel is rescaled to unit variance, so a bandwidth `h` is the
//! standard deviation of each placed kernel regardless of its shape. Kernels
//! with compact support are nonzero on `|x| <= 1 / sqrt(var_raw)`.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StatsError;

/// A one-dimensional smoothing kernel, identified by its conventional name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kernel {
    Gaussian,
    Exponential,
    Box,
    Tri,
    Epa,
    Biweight,
    Triweight,
    Tricube,
    Cosine,
}

impl Default for Kernel {
    fn default() -> Self {
        Self::Gaussian
    }
}

impl Kernel {
    /// All supported kernels.
    pub const ALL: [Kernel; 9] = [
        Kernel::Gaussian,
        Kernel::Exponential,
        Kernel::Box,
        Kernel::Tri,
        Kernel::Epa,
        Kernel::Biweight,
        Kernel::Triweight,
        Kernel::Tricube,
        Kernel::Cosine,
    ];

    /// Canonical identifier.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gaussian => "gaussian",
            Self::Exponential => "exponential",
            Self::Box => "box",
            Self::Tri => "tri",
            Self::Epa => "epa",
            Self::Biweight => "biweight",
            Self::Triweight => "triweight",
            Self::Tricube => "tricube",
            Self::Cosine => "cosine",
        }
    }

    /// Whether the kernel vanishes outside a bounded interval.
    pub fn has_compact_support(&self) -> bool {
        !matches!(self, Self::Gaussian | Self::Exponential)
    }

    /// Support radius of the unit-variance kernel, `None` when unbounded.
    pub fn support_radius(&self) -> Option<f64> {
        self.has_compact_support()
            .then(|| 1.0 / self.raw_variance().sqrt())
    }

    /// Evaluate the unit-variance kernel at `x`.
    pub fn evaluate(&self, x: f64) -> f64 {
        let s = self.raw_variance().sqrt();
        (s * self.raw(s * x)).max(0.0)
    }

    /// Variance of the kernel in its textbook parameterization.
    fn raw_variance(&self) -> f64 {
        match self {
            Self::Gaussian => 1.0,
            Self::Exponential => 2.0,
            Self::Box => 1.0 / 3.0,
            Self::Tri => 1.0 / 6.0,
            Self::Epa => 1.0 / 5.0,
            Self::Biweight => 1.0 / 7.0,
            Self::Triweight => 1.0 / 9.0,
            Self::Tricube => 35.0 / 243.0,
            Self::Cosine => 1.0 - 8.0 / (PI * PI),
        }
    }

    /// Textbook form; compact kernels live on `[-1, 1]`.
    fn raw(&self, x: f64) -> f64 {
        let a = x.abs();
        if self.has_compact_support() && a > 1.0 {
            return 0.0;
        }
        match self {
            Self::Gaussian => (-0.5 * x * x).exp() / (2.0 * PI).sqrt(),
            Self::Exponential => 0.5 * (-a).exp(),
            Self::Box => 0.5,
            Self::Tri => 1.0 - a,
            Self::Epa => 0.75 * (1.0 - x * x),
            Self::Biweight => 15.0 / 16.0 * (1.0 - x * x).powi(2),
            Self::Triweight => 35.0 / 32.0 * (1.0 - x * x).powi(3),
            Self::Tricube => 70.0 / 81.0 * (1.0 - a.powi(3)).powi(3),
            Self::Cosine => FRAC_PI_4 * (FRAC_PI_2 * x).cos(),
        }
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Kernel {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gaussian" | "normal" => Ok(Self::Gaussian),
            "exponential" => Ok(Self::Exponential),
            "box" | "uniform" => Ok(Self::Box),
            "tri" | "triangular" => Ok(Self::Tri),
            "epa" | "epanechnikov" => Ok(Self::Epa),
            "biweight" | "quartic" => Ok(Self::Biweight),
            "triweight" => Ok(Self::Triweight),
            "tricube" => Ok(Self::Tricube),
            "cosine" => Ok(Self::Cosine),
            other => Err(StatsError::UnknownKernel(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Trapezoidal integral of `f` over `[-r, r]`.
    fn integrate(f: impl Fn(f64) -> f64, r: f64) -> f64 {
        let n = 200_000;
        let h = 2.0 * r / n as f64;
        let mut total = 0.5 * (f(-r) + f(r));
        for i in 1..n {
            total += f(-r + i as f64 * h);
        }
        total * h
    }

    #[test]
    fn kernels_integrate_to_one() {
        for kernel in Kernel::ALL {
            let mass = integrate(|x| kernel.evaluate(x), 40.0);
            assert!((mass - 1.0).abs() < 1e-3, "{} mass = {}", kernel, mass);
        }
    }

    #[test]
    fn kernels_have_unit_variance() {
        for kernel in Kernel::ALL {
            let var = integrate(|x| x * x * kernel.evaluate(x), 40.0);
            assert!((var - 1.0).abs() < 1e-2, "{} variance = {}", kernel, var);
        }
    }

    #[test]
    fn compact_kernels_vanish_outside_support() {
        for kernel in Kernel::ALL.iter().filter(|k| k.has_compact_support()) {
            let r = kernel.support_radius().unwrap();
            assert_eq!(kernel.evaluate(r * 1.01), 0.0);
            assert!(kernel.evaluate(r * 0.5) > 0.0);
        }
        assert!(Kernel::Gaussian.support_radius().is_none());
    }

    #[test]
    fn parse_names_and_aliases() {
        assert_eq!("gaussian".parse::<Kernel>().unwrap(), Kernel::Gaussian);
        assert_eq!("Epanechnikov".parse::<Kernel>().unwrap(), Kernel::Epa);
        assert_eq!(" tri ".parse::<Kernel>().unwrap(), Kernel::Tri);
        assert!(matches!(
            "laplace".parse::<Kernel>(),
            Err(StatsError::UnknownKernel(_))
        ));
    }

    #[test]
    fn display_round_trips_through_parse() {
        for kernel in Kernel::ALL {
            assert_eq!(kernel.to_string().parse::<Kernel>().unwrap(), kernel);
        }
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Kernel::Triweight).unwrap();
        assert_eq!(json, "\"triweight\"");
        let k: Kernel = serde_json::from_str("\"cosine\"").unwrap();
        assert_eq!(k, Kernel::Cosine);
    }
}
