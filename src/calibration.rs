//! TPC n-sigma post-calibration.
//!
//! Calibration maps are 3D tables over (TPC clusters, TPC inner-wall momentum,
//! eta) holding the mean and width of the n-sigma distribution. Bin lookup
//! follows the usual histogram convention (0 = underflow, n + 1 = overflow)
//! and is clamped into the valid range, so the correction never extrapolates.

use crate::error::{TrResult, TriggerError};
use crate::species::PidSpecies;
use crate::track::Track;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Axis {
    Uniform { bins: usize, min: f32, max: f32 },
    Variable { edges: Vec<f32> },
}

impl Axis {
    pub fn n_bins(&self) -> usize {
        match self {
            Self::Uniform { bins, .. } => *bins,
            Self::Variable { edges } => edges.len().saturating_sub(1),
        }
    }

    /// Raw bin index: 0 for underflow, `n_bins() + 1` for overflow.
    pub fn find_bin(&self, x: f32) -> usize {
        let n = self.n_bins();
        match self {
            Self::Uniform { min, max, .. } => {
                if x < *min {
                    0
                } else if x >= *max {
                    n + 1
                } else {
                    let width = (max - min) / n as f32;
                    // Guard float rounding at the upper edge.
                    (((x - min) / width) as usize + 1).min(n)
                }
            }
            Self::Variable { edges } => {
                if n == 0 || x < edges[0] {
                    0
                } else if x >= edges[n] {
                    n + 1
                } else {
                    edges.partition_point(|&e| e <= x)
                }
            }
        }
    }

    /// Bin index clamped into `1..=n_bins()`.
    pub fn find_bin_clamped(&self, x: f32) -> usize {
        self.find_bin(x).clamp(1, self.n_bins().max(1))
    }

    fn validate(&self, name: &str) -> TrResult<()> {
        let ok = match self {
            Self::Uniform { bins, min, max } => *bins > 0 && max > min,
            Self::Variable { edges } => {
                edges.len() >= 2 && edges.windows(2).all(|w| w[1] > w[0])
            }
        };
        if ok {
            Ok(())
        } else {
            Err(TriggerError::Validation(format!(
                "Calibration axis '{}' is malformed: {:?}",
                name, self
            )))
        }
    }
}

/// Dense 3D table. Values are stored x-fastest: `values[(iz * ny + iy) * nx + ix]`
/// with zero-based bin indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table3D {
    pub x: Axis,
    pub y: Axis,
    pub z: Axis,
    pub values: Vec<f32>,
}

impl Table3D {
    pub fn validate(&self) -> TrResult<()> {
        self.x.validate("x")?;
        self.y.validate("y")?;
        self.z.validate("z")?;
        let expected = self.x.n_bins() * self.y.n_bins() * self.z.n_bins();
        if self.values.len() != expected {
            return Err(TriggerError::Validation(format!(
                "Calibration table holds {} values, axes require {}",
                self.values.len(),
                expected
            )));
        }
        Ok(())
    }

    /// One-based, clamped bin coordinates for a point.
    pub fn locate(&self, x: f32, y: f32, z: f32) -> (usize, usize, usize) {
        (
            self.x.find_bin_clamped(x),
            self.y.find_bin_clamped(y),
            self.z.find_bin_clamped(z),
        )
    }

    /// Content of a one-based bin.
    pub fn bin_content(&self, bx: usize, by: usize, bz: usize) -> f32 {
        let nx = self.x.n_bins();
        let ny = self.y.n_bins();
        self.values[((bz - 1) * ny + (by - 1)) * nx + (bx - 1)]
    }
}

/// Mean and width maps for one particle hypothesis. Both tables share the
/// binning of `mean`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationMaps {
    pub mean: Table3D,
    pub sigma: Table3D,
}

impl CalibrationMaps {
    pub fn validate(&self) -> TrResult<()> {
        self.mean.validate()?;
        self.sigma.validate()?;
        // sigma is read through the strides of mean
        let same_binning = self.mean.x == self.sigma.x
            && self.mean.y == self.sigma.y
            && self.mean.z == self.sigma.z;
        if !same_binning {
            return Err(TriggerError::Validation(
                "Mean and sigma calibration tables have different binning".to_string(),
            ));
        }
        if self.sigma.values.iter().any(|&s| s == 0.0 || !s.is_finite()) {
            return Err(TriggerError::Validation(
                "Sigma calibration table contains zero or non-finite widths".to_string(),
            ));
        }
        Ok(())
    }

    /// Bias-corrected significance at the given detector coordinates.
    pub fn corrected_significance(&self, raw: f32, ncls: f32, pin: f32, eta: f32) -> f32 {
        let (bx, by, bz) = self.mean.locate(ncls, pin, eta);
        let mean = self.mean.bin_content(bx, by, bz);
        let width = self.sigma.bin_content(bx, by, bz);
        (raw - mean) / width
    }
}

/// Hypotheses that have TPC post-calibration maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalibratedSpecies {
    Kaon,
    Pion,
    Proton,
}

impl From<CalibratedSpecies> for PidSpecies {
    fn from(s: CalibratedSpecies) -> Self {
        match s {
            CalibratedSpecies::Kaon => PidSpecies::Kaon,
            CalibratedSpecies::Pion => PidSpecies::Pion,
            CalibratedSpecies::Proton => PidSpecies::Proton,
        }
    }
}

impl TryFrom<PidSpecies> for CalibratedSpecies {
    type Error = TriggerError;

    fn try_from(s: PidSpecies) -> TrResult<Self> {
        match s {
            PidSpecies::Kaon => Ok(Self::Kaon),
            PidSpecies::Pion => Ok(Self::Pion),
            PidSpecies::Proton => Ok(Self::Proton),
            PidSpecies::Electron => Err(TriggerError::UnsupportedSpecies(s)),
        }
    }
}

fn corrected_tpc(maps: &CalibrationMaps, track: &Track, species: CalibratedSpecies) -> f32 {
    maps.corrected_significance(
        track.tpc(species.into()),
        track.tpc_ncls_found as f32,
        track.tpc_inner_param,
        track.eta,
    )
}

/// Post-calibrated TPC n-sigma of `track` for `species`.
///
/// Electrons have no calibration and are rejected as a configuration error.
pub fn tpc_post_calib(maps: &CalibrationMaps, track: &Track, species: PidSpecies) -> TrResult<f32> {
    let species = CalibratedSpecies::try_from(species)?;
    Ok(corrected_tpc(maps, track, species))
}

/// The two map sets used by the filter. Kaon hypotheses are corrected with
/// the pion maps.
#[derive(Debug, Clone, PartialEq)]
pub struct PidCalibration {
    pub proton: CalibrationMaps,
    pub pion: CalibrationMaps,
}

impl PidCalibration {
    pub fn maps_for(&self, species: CalibratedSpecies) -> &CalibrationMaps {
        match species {
            CalibratedSpecies::Proton => &self.proton,
            CalibratedSpecies::Pion | CalibratedSpecies::Kaon => &self.pion,
        }
    }

    pub fn corrected(&self, track: &Track, species: CalibratedSpecies) -> f32 {
        corrected_tpc(self.maps_for(species), track, species)
    }
}

/// TPC n-sigma for a hadron hypothesis, post-calibrated when maps are given.
#[inline(always)]
pub fn tpc_nsigma(track: &Track, species: CalibratedSpecies, calib: Option<&PidCalibration>) -> f32 {
    match calib {
        Some(c) => c.corrected(track, species),
        None => track.tpc(species.into()),
    }
}

/// Source of calibration maps, keyed by object path and validity timestamp.
pub trait CalibrationProvider {
    fn fetch(&self, path: &str, timestamp: i64) -> TrResult<CalibrationMaps>;

    fn fetch_pid(&self, proton_path: &str, pion_path: &str, timestamp: i64) -> TrResult<PidCalibration> {
        Ok(PidCalibration {
            proton: self.fetch(proton_path, timestamp)?,
            pion: self.fetch(pion_path, timestamp)?,
        })
    }
}

/// Reads `<root>/<path>.json`. The timestamp is only logged: the directory is
/// assumed to hold the objects valid for the run being processed.
pub struct JsonCalibrationProvider {
    root: PathBuf,
}

impl JsonCalibrationProvider {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl CalibrationProvider for JsonCalibrationProvider {
    fn fetch(&self, path: &str, timestamp: i64) -> TrResult<CalibrationMaps> {
        let file = self.root.join(format!("{}.json", path));
        info!("Fetching calibration '{}' (timestamp {})", path, timestamp);

        let content = fs::read_to_string(&file).map_err(|e| {
            TriggerError::CalibrationFetch(format!("{}: {}", file.display(), e))
        })?;
        let maps: CalibrationMaps = serde_json::from_str(&content).map_err(|e| {
            TriggerError::CalibrationFetch(format!("{}: {}", file.display(), e))
        })?;
        maps.validate()?;

        debug!(
            "   -> {} x {} x {} bins",
            maps.mean.x.n_bins(),
            maps.mean.y.n_bins(),
            maps.mean.z.n_bins()
        );
        Ok(maps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_axis_edges() {
        let axis = Axis::Uniform {
            bins: 4,
            min: 0.0,
            max: 4.0,
        };
        assert_eq!(axis.find_bin(-0.1), 0);
        assert_eq!(axis.find_bin(0.0), 1);
        assert_eq!(axis.find_bin(3.99), 4);
        assert_eq!(axis.find_bin(4.0), 5);
        assert_eq!(axis.find_bin_clamped(-100.0), 1);
        assert_eq!(axis.find_bin_clamped(100.0), 4);
    }

    #[test]
    fn test_variable_axis_edges() {
        let axis = Axis::Variable {
            edges: vec![0.0, 0.5, 2.0, 10.0],
        };
        assert_eq!(axis.find_bin(0.25), 1);
        assert_eq!(axis.find_bin(0.5), 2);
        assert_eq!(axis.find_bin(9.0), 3);
        assert_eq!(axis.find_bin(10.0), 4);
        assert_eq!(axis.find_bin_clamped(10.0), 3);
    }
}
