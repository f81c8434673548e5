use crate::species::{CharmParticle, HfTrigger};
use serde::Serialize;
use strum::IntoEnumIterator;

/// Three-prong species, in the order their tags are stored.
pub const THREE_PRONG_SPECIES: [CharmParticle; 4] = [
    CharmParticle::Dplus,
    CharmParticle::Ds,
    CharmParticle::Lc,
    CharmParticle::Xic,
];

/// Hypothesis bitmasks of one candidate under one charm species, one per
/// stage. Every stage is gated by the previous one, so bits only disappear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CandidateTags {
    pub particle: CharmParticle,
    pub preselection: u8,
    pub charm_mass: u8,
    pub beauty_mass: u8,
    /// Origin bits from the BDT, zero when no model ran.
    pub bdt: u8,
}

impl CandidateTags {
    pub fn new(particle: CharmParticle) -> Self {
        Self {
            particle,
            preselection: 0,
            charm_mass: 0,
            beauty_mass: 0,
            bdt: 0,
        }
    }

    #[inline(always)]
    pub fn is_selected(&self) -> bool {
        self.charm_mass != 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventDecision {
    pub event_id: u64,
    pub triggers: u16,
    pub two_prongs: Vec<CandidateTags>,
    /// One entry per three-prong, tags ordered as `THREE_PRONG_SPECIES`.
    pub three_prongs: Vec<[CandidateTags; 4]>,
    /// kstar of every proton-charm pair that fired a femto trigger.
    pub femto_kstar: Vec<f32>,
    pub n_selected_gammas: usize,
    pub n_calo_photons: usize,
    /// Dalitz map per track; empty when no Dalitz selection is configured.
    pub dalitz_maps: Vec<u8>,
}

impl EventDecision {
    pub fn new(event_id: u64) -> Self {
        Self {
            event_id,
            triggers: 0,
            two_prongs: Vec::new(),
            three_prongs: Vec::new(),
            femto_kstar: Vec::new(),
            n_selected_gammas: 0,
            n_calo_photons: 0,
            dalitz_maps: Vec::new(),
        }
    }

    #[inline(always)]
    pub fn set(&mut self, trigger: HfTrigger) {
        self.triggers |= trigger.bit();
    }

    #[inline(always)]
    pub fn has(&self, trigger: HfTrigger) -> bool {
        self.triggers & trigger.bit() != 0
    }

    pub fn is_triggered(&self) -> bool {
        self.triggers != 0
    }

    pub fn fired(&self) -> Vec<HfTrigger> {
        HfTrigger::iter().filter(|t| self.has(*t)).collect()
    }
}
