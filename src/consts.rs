/// Nominal masses in GeV/c^2.
pub const MASS_PION: f32 = 0.139_570_39;
pub const MASS_KAON: f32 = 0.493_677;
pub const MASS_PROTON: f32 = 0.938_272_1;
pub const MASS_ELECTRON: f32 = 0.000_510_998_95;
pub const MASS_PHI: f32 = 1.019_461;
pub const MASS_D0: f32 = 1.864_84;
pub const MASS_DPLUS: f32 = 1.869_66;
pub const MASS_DS: f32 = 1.968_35;
pub const MASS_LC: f32 = 2.286_46;
pub const MASS_XIC: f32 = 2.467_71;
pub const MASS_DSTAR: f32 = 2.010_26;
pub const MASS_BPLUS: f32 = 5.279_34;
pub const MASS_B0: f32 = 5.279_65;
pub const MASS_BS: f32 = 5.366_88;
pub const MASS_LB: f32 = 5.619_60;
pub const MASS_XIB: f32 = 5.797_0;
pub const MASS_GAMMA: f32 = 0.0;

/// Detector acceptance shared by all track and V0 selections.
pub const MAX_ABS_ETA: f32 = 0.8;

/// Hard cut on the longitudinal impact parameter of beauty bachelors (cm).
pub const MAX_ABS_DCA_Z_BEAUTY: f32 = 2.0;

/// Half-width of the KK window around the phi mass in Ds preselection.
pub const DELTA_MASS_PHI: f32 = 0.02;

/// Gamma conversion cuts.
pub const GAMMA_MAX_V0_RADIUS: f32 = 180.0;
pub const GAMMA_ALPHA_SCALE: f32 = 0.95;
pub const GAMMA_QT_SCALE: f32 = 0.05;
pub const GAMMA_MAX_PSI_PAIR: f32 = 0.1;
pub const GAMMA_MIN_COS_PA: f32 = 0.85;

/// Maximum number of independent cuts packed into an 8-bit map.
pub const MAX_CUTS_PER_MAP: usize = 8;
