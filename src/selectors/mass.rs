//! Mass-window selectors.
//!
//! Each selector reconstructs the candidate mass only for the hypotheses
//! still set in the incoming bitmask and keeps a bit when the mass lies
//! within the tolerance of the nominal mass. Three-prong masses are
//! evaluated on (same first, opposite, same second).

use crate::consts::*;
use crate::kinematics::inv_mass;
use crate::monitoring::MonitoringSink;
use crate::species::CharmParticle;
use nalgebra::Vector3;

const D0_HYPOTHESES: [&[f32]; 2] = [&[MASS_PION, MASS_KAON], &[MASS_KAON, MASS_PION]];
const DPLUS_HYPOTHESES: [&[f32]; 1] = [&[MASS_PION, MASS_KAON, MASS_PION]];
const DS_HYPOTHESES: [&[f32]; 2] = [
    &[MASS_KAON, MASS_KAON, MASS_PION],
    &[MASS_PION, MASS_KAON, MASS_KAON],
];
const BARYON_HYPOTHESES: [&[f32]; 2] = [
    &[MASS_PROTON, MASS_KAON, MASS_PION],
    &[MASS_PION, MASS_KAON, MASS_PROTON],
];

/// Destination of the mass-vs-pT entries of one selector call.
#[derive(Clone, Copy)]
pub struct MassQa<'a> {
    pub sink: &'a dyn MonitoringSink,
    pub series: &'a str,
}

impl MassQa<'_> {
    #[inline(always)]
    fn fill(&self, pt: f32, mass: f32) {
        self.sink.fill_2d(self.series, pt, mass);
    }
}

/// Shared loop over bit-indexed hypotheses with strict `<` acceptance.
fn select_hypotheses(
    momenta: &[Vector3<f64>],
    hypotheses: &[&[f32]],
    nominal: f32,
    pt: f32,
    is_selected: u8,
    delta_mass: f32,
    qa: Option<&MassQa>,
) -> u8 {
    let mut ret = 0;
    for (bit, masses) in hypotheses.iter().enumerate() {
        if is_selected & (1 << bit) == 0 {
            continue;
        }
        let mass = inv_mass(momenta, masses);
        if let Some(qa) = qa {
            qa.fill(pt, mass);
        }
        if (mass - nominal).abs() < delta_mass {
            ret |= 1 << bit;
        }
    }
    ret
}

/// Bit 0 for D0 (pi+ K-), bit 1 for D0bar (K+ pi-).
pub fn is_selected_dzero_in_mass_range(
    p_pos: Vector3<f64>,
    p_neg: Vector3<f64>,
    pt: f32,
    is_selected: u8,
    delta_mass: f32,
    qa: Option<&MassQa>,
) -> u8 {
    select_hypotheses(
        &[p_pos, p_neg],
        &D0_HYPOTHESES,
        MASS_D0,
        pt,
        is_selected,
        delta_mass,
        qa,
    )
}

/// D+ has a single hypothesis; the window is inclusive.
pub fn is_selected_dplus_in_mass_range(
    p_same_first: Vector3<f64>,
    p_same_second: Vector3<f64>,
    p_opposite: Vector3<f64>,
    pt: f32,
    delta_mass: f32,
    qa: Option<&MassQa>,
) -> u8 {
    let mass = inv_mass(&[p_same_first, p_opposite, p_same_second], DPLUS_HYPOTHESES[0]);
    if let Some(qa) = qa {
        qa.fill(pt, mass);
    }

    if (mass - MASS_DPLUS).abs() > delta_mass {
        return 0;
    }

    1 << 0
}

/// Bit 0 for KKpi, bit 1 for piKK.
pub fn is_selected_ds_in_mass_range(
    p_same_first: Vector3<f64>,
    p_same_second: Vector3<f64>,
    p_opposite: Vector3<f64>,
    pt: f32,
    is_selected: u8,
    delta_mass: f32,
    qa: Option<&MassQa>,
) -> u8 {
    select_hypotheses(
        &[p_same_first, p_opposite, p_same_second],
        &DS_HYPOTHESES,
        MASS_DS,
        pt,
        is_selected,
        delta_mass,
        qa,
    )
}

/// Bit 0 for pKpi, bit 1 for piKp.
pub fn is_selected_lc_in_mass_range(
    p_same_first: Vector3<f64>,
    p_same_second: Vector3<f64>,
    p_opposite: Vector3<f64>,
    pt: f32,
    is_selected: u8,
    delta_mass: f32,
    qa: Option<&MassQa>,
) -> u8 {
    select_hypotheses(
        &[p_same_first, p_opposite, p_same_second],
        &BARYON_HYPOTHESES,
        MASS_LC,
        pt,
        is_selected,
        delta_mass,
        qa,
    )
}

/// Same hypotheses as Lc around the Xic mass.
pub fn is_selected_xic_in_mass_range(
    p_same_first: Vector3<f64>,
    p_same_second: Vector3<f64>,
    p_opposite: Vector3<f64>,
    pt: f32,
    is_selected: u8,
    delta_mass: f32,
    qa: Option<&MassQa>,
) -> u8 {
    select_hypotheses(
        &[p_same_first, p_opposite, p_same_second],
        &BARYON_HYPOTHESES,
        MASS_XIC,
        pt,
        is_selected,
        delta_mass,
        qa,
    )
}

/// Daughter masses behind hypothesis `bit`, in the prong order used above,
/// or `None` if the particle has no such hypothesis.
pub fn hypothesis_masses(particle: CharmParticle, bit: u8) -> Option<&'static [f32]> {
    let table: &[&'static [f32]] = match particle {
        CharmParticle::D0 => &D0_HYPOTHESES,
        CharmParticle::Dplus => &DPLUS_HYPOTHESES,
        CharmParticle::Ds => &DS_HYPOTHESES,
        CharmParticle::Lc | CharmParticle::Xic => &BARYON_HYPOTHESES,
    };
    table.get(bit as usize).copied()
}
