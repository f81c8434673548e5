#![allow(dead_code)]

use hftrigger::kinematics::FourMomentum;
use hftrigger::species::PidSpecies;
use hftrigger::track::{GammaCandidate, Track};
use nalgebra::Vector3;
use strum::EnumCount;

/// A track compatible with every PID hypothesis (all n-sigma at zero).
pub fn track(p: Vector3<f64>, sign: i8) -> Track {
    let pt = (p.x * p.x + p.y * p.y).sqrt();
    let eta = if pt > 0.0 { (p.z / pt).asinh() } else { 0.0 };
    Track {
        global_index: 0,
        px: p.x as f32,
        py: p.y as f32,
        pz: p.z as f32,
        eta: eta as f32,
        sign,
        dca_xy: 0.01,
        dca_z: 0.1,
        tpc_nsigma: [0.0; PidSpecies::COUNT],
        tof_nsigma: [0.0; PidSpecies::COUNT],
        tpc_ncls_found: 120,
        tpc_inner_param: p.norm() as f32,
        has_tof: true,
        is_global_track: true,
    }
}

pub fn track_xyz(px: f32, py: f32, pz: f32, sign: i8) -> Track {
    track(Vector3::new(px as f64, py as f64, pz as f64), sign)
}

/// Same track with a fixed TPC and TOF response for one species.
pub fn with_nsigma(mut t: Track, species: PidSpecies, tpc: f32, tof: f32) -> Track {
    t.tpc_nsigma[species.index()] = tpc;
    t.tof_nsigma[species.index()] = tof;
    t
}

/// Momentum of either daughter in a two-body decay at rest.
pub fn two_body_momentum(m: f64, m1: f64, m2: f64) -> f64 {
    ((m * m - (m1 + m2).powi(2)) * (m * m - (m1 - m2).powi(2))).sqrt() / (2.0 * m)
}

fn boost_x(p: Vector3<f64>, mass: f64, beta_x: f64) -> Vector3<f64> {
    FourMomentum::from_momentum_mass(p, mass)
        .boosted(&Vector3::new(beta_x, 0.0, 0.0))
        .p
}

/// Daughters of a two-body decay emitted along y, then boosted along x.
/// All momenta stay in the transverse plane.
pub fn two_body(m: f32, m1: f32, m2: f32, beta_x: f64) -> [Vector3<f64>; 2] {
    let q = two_body_momentum(m as f64, m1 as f64, m2 as f64);
    [
        boost_x(Vector3::new(0.0, q, 0.0), m1 as f64, beta_x),
        boost_x(Vector3::new(0.0, -q, 0.0), m2 as f64, beta_x),
    ]
}

/// Decay `m -> a + (b c)` with the `bc` system of mass `m_bc`, returned as
/// `[a, b, c]`. The result is boosted along x.
pub fn three_body(m: f32, ma: f32, mb: f32, mc: f32, m_bc: f32, beta_x: f64) -> [Vector3<f64>; 3] {
    let (m, ma, mb, mc, m_bc) = (m as f64, ma as f64, mb as f64, mc as f64, m_bc as f64);

    let q = two_body_momentum(m, ma, m_bc);
    let pa = Vector3::new(0.0, q, 0.0);
    let p_bc = Vector3::new(0.0, -q, 0.0);

    // b and c along x in the bc rest frame, then boosted with the bc system
    let q_bc = two_body_momentum(m_bc, mb, mc);
    let beta_bc = FourMomentum::from_momentum_mass(p_bc, m_bc).boost_to_cm() * -1.0;
    let pb = FourMomentum::from_momentum_mass(Vector3::new(q_bc, 0.0, 0.0), mb)
        .boosted(&beta_bc)
        .p;
    let pc = FourMomentum::from_momentum_mass(Vector3::new(-q_bc, 0.0, 0.0), mc)
        .boosted(&beta_bc)
        .p;

    [
        boost_x(pa, ma, beta_x),
        boost_x(pb, mb, beta_x),
        boost_x(pc, mc, beta_x),
    ]
}

pub fn good_gamma() -> GammaCandidate {
    GammaCandidate {
        px: 1.0,
        py: 0.0,
        pz: 0.0,
        eta: 0.0,
        v0_radius: 90.0,
        alpha: 0.0,
        qt_arm: 0.0,
        psi_pair: 0.0,
        cos_pa: 0.99,
    }
}

/// Track that fails every proton selection, so it never enters femto pairs.
pub fn hadron(p: Vector3<f64>, sign: i8) -> Track {
    with_nsigma(track(p, sign), PidSpecies::Proton, 10.0, 10.0)
}

/// Two-body decay of a moving parent. Daughters are emitted along the
/// transverse direction perpendicular to the parent, so they stay at eta 0.
pub fn decay_in_flight(parent: Vector3<f64>, m: f32, m1: f32, m2: f32) -> [Vector3<f64>; 2] {
    let pt = (parent.x * parent.x + parent.y * parent.y).sqrt();
    let axis = Vector3::new(-parent.y / pt, parent.x / pt, 0.0);
    let q = two_body_momentum(m as f64, m1 as f64, m2 as f64);
    let beta = FourMomentum::from_momentum_mass(parent, m as f64).boost_to_cm() * -1.0;
    [
        FourMomentum::from_momentum_mass(axis * q, m1 as f64).boosted(&beta).p,
        FourMomentum::from_momentum_mass(axis * -q, m2 as f64).boosted(&beta).p,
    ]
}

/// Boost daughters produced at rest into the frame where their parent has
/// momentum `parent`.
pub fn boost_into(daughters: &[Vector3<f64>], masses: &[f32], parent: Vector3<f64>, m: f32) -> Vec<Vector3<f64>> {
    let beta = FourMomentum::from_momentum_mass(parent, m as f64).boost_to_cm() * -1.0;
    daughters
        .iter()
        .zip(masses)
        .map(|(p, &mass)| FourMomentum::from_momentum_mass(*p, mass as f64).boosted(&beta).p)
        .collect()
}
