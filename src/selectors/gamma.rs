use crate::consts::{
    GAMMA_ALPHA_SCALE, GAMMA_MAX_PSI_PAIR, GAMMA_MAX_V0_RADIUS, GAMMA_MIN_COS_PA, GAMMA_QT_SCALE,
    MAX_ABS_ETA,
};
use crate::monitoring::{names, MonitoringSink};
use crate::track::GammaCandidate;

/// Selection stages recorded in the gamma counter. A rejected candidate is
/// counted at the stage that vetoed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GammaStage {
    All = 0,
    Eta,
    Radius,
    ArmenterosPodolanski,
    PsiPair,
    CosPointingAngle,
    Selected,
}

/// Photon-conversion quality selection.
///
/// With `qa_level > 1` every call records its entry, the vetoing stage (or
/// the pass), and eta and the Armenteros-Podolanski point before and after.
pub fn is_selected_gamma(gamma: &GammaCandidate, qa_level: u8, sink: &dyn MonitoringSink) -> bool {
    let qa = qa_level > 1;
    let count = |stage: GammaStage| {
        if qa {
            sink.fill_1d(names::GAMMA_SELECTED, stage as u8 as f32);
        }
    };

    count(GammaStage::All);
    if qa {
        sink.fill_1d(names::GAMMA_ETA_BEFORE, gamma.eta);
        sink.fill_2d(names::GAMMA_ARM_POD_BEFORE, gamma.alpha, gamma.qt_arm);
    }

    if gamma.eta.abs() > MAX_ABS_ETA {
        count(GammaStage::Eta);
        return false;
    }

    if gamma.v0_radius < 0.0 || gamma.v0_radius > GAMMA_MAX_V0_RADIUS {
        count(GammaStage::Radius);
        return false;
    }

    let ellipse = (gamma.alpha / GAMMA_ALPHA_SCALE).powi(2) + (gamma.qt_arm / GAMMA_QT_SCALE).powi(2);
    if ellipse >= 1.0 {
        count(GammaStage::ArmenterosPodolanski);
        return false;
    }

    if gamma.psi_pair.abs() > GAMMA_MAX_PSI_PAIR {
        count(GammaStage::PsiPair);
        return false;
    }

    if gamma.cos_pa < GAMMA_MIN_COS_PA {
        count(GammaStage::CosPointingAngle);
        return false;
    }

    count(GammaStage::Selected);
    if qa {
        sink.fill_1d(names::GAMMA_ETA_AFTER, gamma.eta);
        sink.fill_2d(names::GAMMA_ARM_POD_AFTER, gamma.alpha, gamma.qt_arm);
    }
    true
}
