//! Candidate selection predicates, from single tracks up to mass windows.

pub mod gamma;
pub mod mass;
pub mod preselection;
pub mod track;

pub use gamma::{is_selected_gamma, GammaStage};
pub use mass::{
    hypothesis_masses, is_selected_dplus_in_mass_range, is_selected_ds_in_mass_range,
    is_selected_dzero_in_mass_range, is_selected_lc_in_mass_range, is_selected_xic_in_mass_range,
    MassQa,
};
pub use preselection::{
    is_charm_baryon_preselected, is_dplus_preselected, is_ds_preselected, is_dzero_preselected,
};
pub use track::{
    is_selected_kaon_for_charm_3prong, is_selected_pion_or_kaon_for_dzero,
    is_selected_proton_for_charm_baryon, is_selected_proton_for_femto, is_selected_track_for_beauty,
};
