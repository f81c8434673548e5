//! Single-track predicates.

use crate::calibration::{tpc_nsigma, CalibratedSpecies, PidCalibration};
use crate::config::{FemtoCuts, PidCuts, SingleTrackCuts};
use crate::consts::{MAX_ABS_DCA_Z_BEAUTY, MAX_ABS_ETA};
use crate::monitoring::{names, MonitoringSink};
use crate::species::{BachelorTag, PidSpecies};
use crate::track::Track;

/// Classify a track as a bachelor for beauty candidates.
///
/// Soft pions only need the soft-pion pT floor; regular bachelors also need
/// the bachelor floor. Both share the acceptance and impact-parameter cuts.
pub fn is_selected_track_for_beauty(
    track: &Track,
    pt_min_soft_pion: f32,
    pt_min_beauty_bachelor: f32,
    cuts: &SingleTrackCuts,
) -> BachelorTag {
    let pt = track.pt();
    let bin = match cuts.find_pt_bin(pt) {
        Some(b) => b,
        None => return BachelorTag::Rejected,
    };

    if pt < pt_min_soft_pion {
        return BachelorTag::Rejected;
    }
    if track.eta.abs() > MAX_ABS_ETA {
        return BachelorTag::Rejected;
    }
    if track.dca_z.abs() > MAX_ABS_DCA_Z_BEAUTY {
        return BachelorTag::Rejected;
    }
    if track.dca_xy.abs() < cuts.min_dca_xy[bin] {
        return BachelorTag::Rejected;
    }
    if track.dca_xy.abs() > cuts.max_dca_xy[bin] {
        return BachelorTag::Rejected;
    }

    if pt < pt_min_beauty_bachelor {
        return BachelorTag::SoftPion;
    }

    BachelorTag::Regular
}

/// Loose proton selection for femtoscopy triggers.
///
/// The TOF response alone, or TPC and TOF combined in quadrature, is compared
/// to the configured maximum.
pub fn is_selected_proton_for_femto(
    track: &Track,
    cuts: &FemtoCuts,
    calib: Option<&PidCalibration>,
    qa_level: u8,
    sink: &dyn MonitoringSink,
) -> bool {
    if track.pt() < cuts.femto_min_proton_pt {
        return false;
    }
    if track.eta.abs() > MAX_ABS_ETA {
        return false;
    }
    if !track.is_global_track {
        return false;
    }

    let nsigma_tpc = tpc_nsigma(track, CalibratedSpecies::Proton, calib);
    let nsigma_tof = track.tof(PidSpecies::Proton);

    let nsigma = if cuts.femto_proton_only_tof {
        nsigma_tof.abs()
    } else {
        (nsigma_tpc * nsigma_tpc + nsigma_tof * nsigma_tof).sqrt()
    };

    if nsigma > cuts.femto_max_nsigma_proton {
        return false;
    }

    if qa_level > 1 {
        sink.fill_2d(names::PROTON_TPC_PID, track.p(), nsigma_tpc);
        sink.fill_2d(names::PROTON_TOF_PID, track.p(), nsigma_tof);
    }

    true
}

/// TPC window always; TOF window only for tracks that reached the TOF.
#[inline(always)]
fn passes_tpc_tof(nsigma_tpc: f32, max_tpc: f32, track: &Track, species: PidSpecies, max_tof: f32) -> bool {
    if nsigma_tpc.abs() > max_tpc {
        return false;
    }
    if track.has_tof && track.tof(species).abs() > max_tof {
        return false;
    }
    true
}

/// Proton hypothesis for the same-charge prongs of Lc and Xic candidates.
pub fn is_selected_proton_for_charm_baryon(
    track: &Track,
    cuts: &PidCuts,
    calib: Option<&PidCalibration>,
) -> bool {
    if track.eta.abs() > MAX_ABS_ETA {
        return false;
    }
    let nsigma_tpc = tpc_nsigma(track, CalibratedSpecies::Proton, calib);
    passes_tpc_tof(
        nsigma_tpc,
        cuts.nsigma_tpc_proton_lc,
        track,
        PidSpecies::Proton,
        cuts.nsigma_tof_proton_lc,
    )
}

/// Kaon hypothesis for the opposite-charge prong of three-prong candidates.
pub fn is_selected_kaon_for_charm_3prong(
    track: &Track,
    cuts: &PidCuts,
    calib: Option<&PidCalibration>,
) -> bool {
    if track.eta.abs() > MAX_ABS_ETA {
        return false;
    }
    let nsigma_tpc = tpc_nsigma(track, CalibratedSpecies::Kaon, calib);
    passes_tpc_tof(
        nsigma_tpc,
        cuts.nsigma_tpc_kaon_3prong,
        track,
        PidSpecies::Kaon,
        cuts.nsigma_tof_kaon_3prong,
    )
}

/// Pion or kaon hypothesis for D0 prongs. Boundaries are inclusive.
pub fn is_selected_pion_or_kaon_for_dzero(
    track: &Track,
    species: CalibratedSpecies,
    cuts: &PidCuts,
    calib: Option<&PidCalibration>,
) -> bool {
    if track.eta.abs() > MAX_ABS_ETA {
        return false;
    }
    let nsigma_tpc = tpc_nsigma(track, species, calib);
    let nsigma_tof = track.tof(species.into());
    nsigma_tpc.abs() <= cuts.nsigma_tpc_pion_kaon_dzero
        && (!track.has_tof || nsigma_tof.abs() <= cuts.nsigma_tof_pion_kaon_dzero)
}
