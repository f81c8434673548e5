//! Dalitz electron-pair tagging.
//!
//! Tracks are first tested against a list of track cuts, producing one bit
//! per cut. Opposite-sign pairs sharing a bit are then tested against the
//! pair cut with the same index; a passing pair sets that bit on both of its
//! tracks. Track cut `i` and pair cut `i` form one selection.

use crate::consts::{MASS_ELECTRON, MAX_CUTS_PER_MAP};
use crate::error::{TrResult, TriggerError};
use crate::kinematics::inv_mass;
use crate::monitoring::{names, MonitoringSink};
use crate::species::PidSpecies;
use crate::track::Track;
use itertools::Itertools;
use tracing::debug;

pub trait TrackCut: Send + Sync {
    fn name(&self) -> &str;
    fn is_selected(&self, track: &Track) -> bool;
}

pub trait PairCut: Send + Sync {
    fn name(&self) -> &str;
    fn is_selected(&self, first: &Track, second: &Track) -> bool;
}

/// Barrel electron candidate: TPC inner-wall momentum floor, acceptance and
/// a TPC electron n-sigma window.
#[derive(Debug, Clone, PartialEq)]
pub struct ElectronTrackCut {
    pub name: String,
    pub min_tpc_inner_param: f32,
    pub max_abs_eta: f32,
    pub min_nsigma_el: f32,
    pub max_nsigma_el: f32,
}

impl ElectronTrackCut {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            min_tpc_inner_param: 0.1,
            max_abs_eta: 0.9,
            min_nsigma_el: -3.0,
            max_nsigma_el: 3.0,
        }
    }
}

impl TrackCut for ElectronTrackCut {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_selected(&self, track: &Track) -> bool {
        let nsigma = track.tpc(PidSpecies::Electron);
        track.tpc_inner_param >= self.min_tpc_inner_param
            && track.eta.abs() <= self.max_abs_eta
            && nsigma >= self.min_nsigma_el
            && nsigma <= self.max_nsigma_el
    }
}

/// Upper bound on the e+e- invariant mass.
#[derive(Debug, Clone, PartialEq)]
pub struct PairMassCut {
    pub name: String,
    pub max_mass: f32,
}

impl PairMassCut {
    pub fn new(name: &str, max_mass: f32) -> Self {
        Self {
            name: name.to_string(),
            max_mass,
        }
    }
}

impl PairCut for PairMassCut {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_selected(&self, first: &Track, second: &Track) -> bool {
        let mass = inv_mass(
            &[first.momentum(), second.momentum()],
            &[MASS_ELECTRON, MASS_ELECTRON],
        );
        mass < self.max_mass
    }
}

pub struct DalitzSelector {
    track_cuts: Vec<Box<dyn TrackCut>>,
    pair_cuts: Vec<Box<dyn PairCut>>,
}

impl DalitzSelector {
    pub fn new(track_cuts: Vec<Box<dyn TrackCut>>, pair_cuts: Vec<Box<dyn PairCut>>) -> TrResult<Self> {
        if track_cuts.len() != pair_cuts.len() {
            return Err(TriggerError::CutCardinality {
                track_cuts: track_cuts.len(),
                pair_cuts: pair_cuts.len(),
            });
        }
        if track_cuts.len() > MAX_CUTS_PER_MAP {
            return Err(TriggerError::Config(format!(
                "At most {} Dalitz selections fit in a bitmap, got {}",
                MAX_CUTS_PER_MAP,
                track_cuts.len()
            )));
        }

        for (t, p) in track_cuts.iter().zip(&pair_cuts) {
            debug!("Dalitz selection {}_{}", t.name(), p.name());
        }

        Ok(Self {
            track_cuts,
            pair_cuts,
        })
    }

    pub fn n_cuts(&self) -> usize {
        self.track_cuts.len()
    }

    /// Label of selection `i`, `<track cut>_<pair cut>`.
    pub fn label(&self, i: usize) -> Option<String> {
        let t = self.track_cuts.get(i)?;
        let p = self.pair_cuts.get(i)?;
        Some(format!("{}_{}", t.name(), p.name()))
    }

    /// Track cut map per track, in input order. Zero means rejected by every cut.
    pub fn run_track_selection(&self, tracks: &[Track]) -> Vec<u8> {
        tracks
            .iter()
            .map(|track| {
                self.track_cuts
                    .iter()
                    .enumerate()
                    .filter(|(_, cut)| cut.is_selected(track))
                    .fold(0u8, |map, (i, _)| map | (1 << i))
            })
            .collect()
    }

    /// Dalitz map per track from the track maps of `run_track_selection`.
    pub fn run_pairing(&self, tracks: &[Track], track_maps: &[u8]) -> Vec<u8> {
        let mut dalitz_maps = vec![0u8; tracks.len()];

        let retained = track_maps
            .iter()
            .enumerate()
            .filter(|&(_, &m)| m != 0)
            .map(|(i, _)| i);

        for (i1, i2) in retained.tuple_combinations() {
            let (t1, t2) = (&tracks[i1], &tracks[i2]);
            if t1.sign as i32 * t2.sign as i32 > 0 {
                continue;
            }

            let pair_map = track_maps[i1] & track_maps[i2];
            if pair_map == 0 {
                continue;
            }

            for (icut, cut) in self.pair_cuts.iter().enumerate() {
                if pair_map & (1 << icut) == 0 {
                    continue;
                }
                if cut.is_selected(t1, t2) {
                    dalitz_maps[i1] |= 1 << icut;
                    dalitz_maps[i2] |= 1 << icut;
                }
            }
        }

        dalitz_maps
    }

    /// Full selection for the tracks of one collision. With `qa` set, each
    /// tagged track fills the selection index of every bit it carries.
    pub fn process(&self, tracks: &[Track], qa: bool, sink: &dyn MonitoringSink) -> Vec<u8> {
        let track_maps = self.run_track_selection(tracks);
        let dalitz_maps = self.run_pairing(tracks, &track_maps);

        if qa {
            for &map in dalitz_maps.iter().filter(|&&m| m != 0) {
                (0..self.n_cuts())
                    .filter(|icut| map & (1 << icut) != 0)
                    .for_each(|icut| sink.fill_1d(names::DALITZ_TRACK_STATS, icut as f32));
            }
        }

        dalitz_maps
    }
}
