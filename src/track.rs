use crate::calo::CaloCluster;
use crate::species::PidSpecies;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use strum::EnumCount;

/// Per-species n-sigma response of one detector, indexed by `PidSpecies`.
pub type NSigmaArray = [f32; PidSpecies::COUNT];

/// A reconstructed charged track, read-only to every selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub global_index: usize,
    pub px: f32,
    pub py: f32,
    pub pz: f32,
    pub eta: f32,
    pub sign: i8,
    #[serde(default)]
    pub dca_xy: f32,
    #[serde(default)]
    pub dca_z: f32,

    /// TPC response in the order electron, kaon, pion, proton.
    #[serde(default)]
    pub tpc_nsigma: NSigmaArray,
    /// TOF response, meaningful only when `has_tof` is set.
    #[serde(default)]
    pub tof_nsigma: NSigmaArray,

    #[serde(default)]
    pub tpc_ncls_found: u16,
    /// Momentum at the TPC inner wall.
    #[serde(default)]
    pub tpc_inner_param: f32,
    #[serde(default)]
    pub has_tof: bool,
    #[serde(default = "default_true")]
    pub is_global_track: bool,
}

fn default_true() -> bool {
    true
}

impl Track {
    #[inline(always)]
    pub fn pt(&self) -> f32 {
        (self.px * self.px + self.py * self.py).sqrt()
    }

    #[inline(always)]
    pub fn p(&self) -> f32 {
        (self.px * self.px + self.py * self.py + self.pz * self.pz).sqrt()
    }

    #[inline(always)]
    pub fn momentum(&self) -> Vector3<f64> {
        Vector3::new(self.px as f64, self.py as f64, self.pz as f64)
    }

    #[inline(always)]
    pub fn tpc(&self, species: PidSpecies) -> f32 {
        self.tpc_nsigma[species.index()]
    }

    #[inline(always)]
    pub fn tof(&self, species: PidSpecies) -> f32 {
        self.tof_nsigma[species.index()]
    }
}

/// A photon-conversion (V0) candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GammaCandidate {
    pub px: f32,
    pub py: f32,
    pub pz: f32,
    pub eta: f32,
    pub v0_radius: f32,
    /// Armenteros-Podolanski alpha.
    pub alpha: f32,
    /// Armenteros-Podolanski qT.
    pub qt_arm: f32,
    pub psi_pair: f32,
    pub cos_pa: f32,
}

impl GammaCandidate {
    pub fn momentum(&self) -> Vector3<f64> {
        Vector3::new(self.px as f64, self.py as f64, self.pz as f64)
    }
}

/// Two-prong candidate built from a positive and a negative track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwoProng {
    pub pos: usize,
    pub neg: usize,
    /// Features for the BDT, if a model is configured for D0.
    #[serde(default)]
    pub features: Option<Vec<f32>>,
}

/// Three-prong candidate. The first and second prongs share the sign,
/// the third has the opposite sign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreeProng {
    pub same_first: usize,
    pub same_second: usize,
    pub opposite: usize,
    #[serde(default)]
    pub features: Option<Vec<f32>>,
}

/// All inputs of one collision.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub id: u64,
    pub tracks: Vec<Track>,
    #[serde(default)]
    pub two_prongs: Vec<TwoProng>,
    #[serde(default)]
    pub three_prongs: Vec<ThreeProng>,
    #[serde(default)]
    pub gammas: Vec<GammaCandidate>,
    #[serde(default)]
    pub calo_clusters: Vec<CaloCluster>,
}
