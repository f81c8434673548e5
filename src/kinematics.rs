//! Four-momentum arithmetic used by the mass-window selectors and the
//! femtoscopy trigger.
//!
//! All arithmetic runs in `f64` and is narrowed to `f32` at the API edge,
//! matching the precision of the stored track parameters.

use crate::consts::MASS_PROTON;
use crate::track::Track;
use nalgebra::Vector3;
use std::ops::{Add, Sub};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FourMomentum {
    pub e: f64,
    pub p: Vector3<f64>,
}

impl FourMomentum {
    pub fn from_momentum_mass(p: Vector3<f64>, mass: f64) -> Self {
        Self {
            e: (p.norm_squared() + mass * mass).sqrt(),
            p,
        }
    }

    pub fn mass(&self) -> f64 {
        let m2 = self.e * self.e - self.p.norm_squared();
        // Rounding can push massless systems slightly negative.
        if m2 > 0.0 {
            m2.sqrt()
        } else {
            -(-m2).sqrt()
        }
    }

    /// Velocity of the frame in which this system is at rest, as seen from
    /// the current frame, with the sign chosen so that boosting by it brings
    /// the system to rest.
    pub fn boost_to_cm(&self) -> Vector3<f64> {
        -self.p / self.e
    }

    /// Pure Lorentz boost by velocity `beta` (in units of c).
    pub fn boosted(&self, beta: &Vector3<f64>) -> Self {
        let b2 = beta.norm_squared();
        if b2 <= 0.0 {
            return *self;
        }
        let gamma = 1.0 / (1.0 - b2).sqrt();
        let bp = beta.dot(&self.p);
        let gamma2 = (gamma - 1.0) / b2;

        Self {
            e: gamma * (self.e + bp),
            p: self.p + beta * (gamma2 * bp + gamma * self.e),
        }
    }
}

impl Add for FourMomentum {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            e: self.e + rhs.e,
            p: self.p + rhs.p,
        }
    }
}

impl Sub for FourMomentum {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            e: self.e - rhs.e,
            p: self.p - rhs.p,
        }
    }
}

/// Invariant mass of a system of daughters with positional mass hypotheses.
///
/// `momenta` and `masses` must have the same length.
pub fn inv_mass(momenta: &[Vector3<f64>], masses: &[f32]) -> f32 {
    debug_assert_eq!(momenta.len(), masses.len());
    let (e, p) = momenta.iter().zip(masses).fold(
        (0.0f64, Vector3::zeros()),
        |(e_sum, p_sum), (p, &m)| {
            let m = m as f64;
            (e_sum + (p.norm_squared() + m * m).sqrt(), p_sum + p)
        },
    );
    FourMomentum { e, p }.mass() as f32
}

/// Half the magnitude of the momentum difference of two particles, evaluated
/// in the rest frame of the pair.
pub fn relative_momentum(p1: Vector3<f64>, m1: f32, p2: Vector3<f64>, m2: f32) -> f32 {
    let part1 = FourMomentum::from_momentum_mass(p1, m1 as f64);
    let part2 = FourMomentum::from_momentum_mass(p2, m2 as f64);

    let beta = (part1 + part2).boost_to_cm();
    let rel = part1.boosted(&beta) - part2.boosted(&beta);

    (0.5 * rel.p.norm()) as f32
}

/// kstar between a track taken as a proton and a charm candidate.
pub fn compute_relative_momentum(track: &Track, charm_momentum: Vector3<f64>, charm_mass: f32) -> f32 {
    relative_momentum(track.momentum(), MASS_PROTON, charm_momentum, charm_mass)
}

#[inline(always)]
pub fn pt_of(p: &Vector3<f64>) -> f32 {
    (p.x * p.x + p.y * p.y).sqrt() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boost_brings_pair_to_rest() {
        let a = FourMomentum::from_momentum_mass(Vector3::new(1.0, 0.5, -0.2), 0.938);
        let b = FourMomentum::from_momentum_mass(Vector3::new(-0.3, 2.0, 0.7), 1.865);
        let sum = a + b;
        let rest = sum.boosted(&sum.boost_to_cm());
        assert!(rest.p.norm() < 1e-9, "residual momentum {}", rest.p.norm());
        assert!((rest.e - sum.mass()).abs() < 1e-9);
    }

    #[test]
    fn test_zero_beta_is_identity() {
        let a = FourMomentum::from_momentum_mass(Vector3::new(1.0, 2.0, 3.0), 0.5);
        assert_eq!(a.boosted(&Vector3::zeros()), a);
    }
}
