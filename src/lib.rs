pub mod calibration;
pub mod calo;
pub mod combinatorics;
pub mod config;
pub mod consts;
pub mod dalitz;
pub mod error;
pub mod filter;
pub mod kinematics;
pub mod ml;
pub mod monitoring;
pub mod selectors;
pub mod species;
pub mod track;
// cmd and reports belong to the binary (main.rs).
