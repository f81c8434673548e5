use crate::consts::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumCount, EnumIter, IntoStaticStr};

/// Species for which the detectors publish an n-sigma response.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    EnumCount,
    Display,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PidSpecies {
    Electron = 0,
    Kaon,
    Pion,
    Proton,
}

impl PidSpecies {
    pub fn mass(&self) -> f32 {
        match self {
            Self::Electron => MASS_ELECTRON,
            Self::Kaon => MASS_KAON,
            Self::Pion => MASS_PION,
            Self::Proton => MASS_PROTON,
        }
    }

    #[inline(always)]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    EnumCount,
    Display,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
pub enum CharmParticle {
    D0 = 0,
    Dplus,
    Ds,
    Lc,
    Xic,
}

impl CharmParticle {
    pub fn mass(&self) -> f32 {
        match self {
            Self::D0 => MASS_D0,
            Self::Dplus => MASS_DPLUS,
            Self::Ds => MASS_DS,
            Self::Lc => MASS_LC,
            Self::Xic => MASS_XIC,
        }
    }

    pub fn is_two_prong(&self) -> bool {
        matches!(self, Self::D0)
    }

    /// Beauty hadron reconstructed from this charm hadron plus a pion.
    pub fn beauty_mother(&self) -> BeautyParticle {
        match self {
            Self::D0 => BeautyParticle::Bplus,
            Self::Dplus => BeautyParticle::B0,
            Self::Ds => BeautyParticle::Bs,
            Self::Lc => BeautyParticle::Lb,
            Self::Xic => BeautyParticle::Xib,
        }
    }

    #[inline(always)]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    EnumCount,
    Display,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
pub enum BeautyParticle {
    Bplus = 0,
    B0toDStar,
    B0,
    Bs,
    Lb,
    Xib,
}

impl BeautyParticle {
    pub fn mass(&self) -> f32 {
        match self {
            Self::Bplus => MASS_BPLUS,
            Self::B0toDStar | Self::B0 => MASS_B0,
            Self::Bs => MASS_BS,
            Self::Lb => MASS_LB,
            Self::Xib => MASS_XIB,
        }
    }

    #[inline(always)]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Trigger categories. The discriminant is the bit position in the event bitmap.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    EnumCount,
    Display,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
pub enum HfTrigger {
    HighPt2P = 0,
    HighPt3P,
    Beauty3P,
    Beauty4P,
    Femto2P,
    Femto3P,
    DoubleCharm2P,
    DoubleCharm3P,
    DoubleCharmMix,
    GammaCharm2P,
    GammaCharm3P,
}

impl HfTrigger {
    #[inline(always)]
    pub fn bit(&self) -> u16 {
        1 << (*self as u16)
    }
}

/// Outcome of the beauty-bachelor single-track selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum BachelorTag {
    Rejected = 0,
    SoftPion = 1,
    Regular = 2,
}
