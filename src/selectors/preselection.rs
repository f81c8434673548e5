//! PID preselection of charm candidates, run before any mass computation.
//!
//! Each function returns a hypothesis bitmask. Bit meanings are positional
//! and shared with the mass-window selectors:
//!
//! | candidate | bit 0            | bit 1              |
//! |-----------|------------------|--------------------|
//! | D0        | pi+ K- (D0)      | K+ pi- (D0bar)     |
//! | D+        | K pi pi          | -                  |
//! | Ds        | KK from 1st+opp  | KK from 2nd+opp    |
//! | Lc / Xic  | 1st is proton    | 2nd is proton      |

use super::track::{
    is_selected_kaon_for_charm_3prong, is_selected_pion_or_kaon_for_dzero,
    is_selected_proton_for_charm_baryon,
};
use crate::calibration::{CalibratedSpecies, PidCalibration};
use crate::config::PidCuts;
use crate::consts::{DELTA_MASS_PHI, MASS_KAON, MASS_PHI};
use crate::kinematics::inv_mass;
use crate::track::Track;

pub const BIT_D0: u8 = 1 << 0;
pub const BIT_D0BAR: u8 = 1 << 1;
pub const BIT_DPLUS: u8 = 1 << 0;
pub const BIT_DS_KKPI: u8 = 1 << 0;
pub const BIT_DS_PIKK: u8 = 1 << 1;
pub const BIT_PKPI: u8 = 1 << 0;
pub const BIT_PIKP: u8 = 1 << 1;

pub fn is_dzero_preselected(
    track_pos: &Track,
    track_neg: &Track,
    cuts: &PidCuts,
    calib: Option<&PidCalibration>,
) -> u8 {
    let mut ret = 0;

    let pid = |t: &Track, s: CalibratedSpecies| is_selected_pion_or_kaon_for_dzero(t, s, cuts, calib);

    if pid(track_pos, CalibratedSpecies::Pion) && pid(track_neg, CalibratedSpecies::Kaon) {
        ret |= BIT_D0;
    }
    if pid(track_neg, CalibratedSpecies::Pion) && pid(track_pos, CalibratedSpecies::Kaon) {
        ret |= BIT_D0BAR;
    }

    ret
}

pub fn is_dplus_preselected(
    track_opposite: &Track,
    cuts: &PidCuts,
    calib: Option<&PidCalibration>,
) -> u8 {
    if !is_selected_kaon_for_charm_3prong(track_opposite, cuts, calib) {
        return 0;
    }
    BIT_DPLUS
}

pub fn is_ds_preselected(
    track_same_first: &Track,
    track_same_second: &Track,
    track_opposite: &Track,
    cuts: &PidCuts,
    calib: Option<&PidCalibration>,
) -> u8 {
    let mut ret = 0;

    if !is_selected_kaon_for_charm_3prong(track_opposite, cuts, calib) {
        return ret;
    }

    // KK pair must come from a phi
    let kk = [MASS_KAON, MASS_KAON];
    let mass_kk_first = inv_mass(&[track_same_first.momentum(), track_opposite.momentum()], &kk);
    let mass_kk_second = inv_mass(&[track_same_second.momentum(), track_opposite.momentum()], &kk);

    if (mass_kk_first - MASS_PHI).abs() < DELTA_MASS_PHI {
        ret |= BIT_DS_KKPI;
    }
    if (mass_kk_second - MASS_PHI).abs() < DELTA_MASS_PHI {
        ret |= BIT_DS_PIKK;
    }

    ret
}

pub fn is_charm_baryon_preselected(
    track_same_first: &Track,
    track_same_second: &Track,
    track_opposite: &Track,
    cuts: &PidCuts,
    calib: Option<&PidCalibration>,
) -> u8 {
    let mut ret = 0;

    if !is_selected_kaon_for_charm_3prong(track_opposite, cuts, calib) {
        return ret;
    }

    if is_selected_proton_for_charm_baryon(track_same_first, cuts, calib) {
        ret |= BIT_PKPI;
    }
    if is_selected_proton_for_charm_baryon(track_same_second, cuts, calib) {
        ret |= BIT_PIKP;
    }

    ret
}
