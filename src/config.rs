use crate::error::{TrResult, TriggerError};
use crate::ml::BdtThresholds;
use crate::species::{BeautyParticle, CharmParticle};
use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use strum::EnumCount;

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FilterConfig {
    #[command(flatten)]
    pub beauty: BeautyCuts,
    #[command(flatten)]
    pub femto: FemtoCuts,
    #[command(flatten)]
    pub pid: PidCuts,
    #[command(flatten)]
    pub mass: MassWindows,
    #[command(flatten)]
    pub ml: MlCuts,
    #[command(flatten)]
    pub general: GeneralParams,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BeautyCuts {
    #[arg(long, default_value_t = 0.1)]
    pub pt_min_soft_pion: f32,
    #[arg(long, default_value_t = 0.5)]
    pub pt_min_beauty_bachelor: f32,

    // One dcaXY window per pT bin
    #[arg(long, default_value = "0,0.5,1,1.5,2,3,1000")]
    pub pt_bins_track: String,
    #[arg(long, default_value = "0.0025,0.0025,0.0025,0,0,0")]
    pub min_dca_xy_track: String,
    #[arg(long, default_value = "10,10,10,10,10,10")]
    pub max_dca_xy_track: String,
}

impl Default for BeautyCuts {
    fn default() -> Self {
        Self {
            pt_min_soft_pion: 0.1,
            pt_min_beauty_bachelor: 0.5,
            pt_bins_track: "0,0.5,1,1.5,2,3,1000".to_string(),
            min_dca_xy_track: "0.0025,0.0025,0.0025,0,0,0".to_string(),
            max_dca_xy_track: "10,10,10,10,10,10".to_string(),
        }
    }
}

#[derive(Args, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FemtoCuts {
    #[arg(long, default_value_t = 0.5)]
    pub femto_min_proton_pt: f32,
    #[arg(long, default_value_t = 3.0)]
    pub femto_max_nsigma_proton: f32,
    #[arg(long, default_value_t = false)]
    pub femto_proton_only_tof: bool,
    #[arg(long, default_value_t = 2.0)]
    pub femto_max_relative_momentum: f32,
}

impl Default for FemtoCuts {
    fn default() -> Self {
        Self {
            femto_min_proton_pt: 0.5,
            femto_max_nsigma_proton: 3.0,
            femto_proton_only_tof: false,
            femto_max_relative_momentum: 2.0,
        }
    }
}

#[derive(Args, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PidCuts {
    #[arg(long, default_value_t = 3.0)]
    pub nsigma_tpc_pion_kaon_dzero: f32,
    #[arg(long, default_value_t = 3.0)]
    pub nsigma_tof_pion_kaon_dzero: f32,
    #[arg(long, default_value_t = 3.0)]
    pub nsigma_tpc_kaon_3prong: f32,
    #[arg(long, default_value_t = 3.0)]
    pub nsigma_tof_kaon_3prong: f32,
    #[arg(long, default_value_t = 3.0)]
    pub nsigma_tpc_proton_lc: f32,
    #[arg(long, default_value_t = 3.0)]
    pub nsigma_tof_proton_lc: f32,
    #[arg(long, default_value_t = false)]
    pub compute_tpc_post_calib: bool,
}

impl Default for PidCuts {
    fn default() -> Self {
        Self {
            nsigma_tpc_pion_kaon_dzero: 3.0,
            nsigma_tof_pion_kaon_dzero: 3.0,
            nsigma_tpc_kaon_3prong: 3.0,
            nsigma_tof_kaon_3prong: 3.0,
            nsigma_tpc_proton_lc: 3.0,
            nsigma_tof_proton_lc: 3.0,
            compute_tpc_post_calib: false,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MassWindows {
    // Order: D0, Dplus, Ds, Lc, Xic
    #[arg(long, default_value = "0.08,0.08,0.08,0.08,0.08")]
    pub delta_mass_charm: String,
    #[arg(long, default_value = "0.04,0.04,0.04,0.04,0.04")]
    pub delta_mass_charm_for_beauty: String,
    // Order: Bplus, B0toDStar, B0, Bs, Lb, Xib
    #[arg(long, default_value = "0.3,0.3,0.3,0.3,0.3,0.3")]
    pub delta_mass_beauty: String,
    #[arg(long, default_value_t = 0.04)]
    pub delta_mass_dstar: f32,
    #[arg(long, default_value_t = 0.25)]
    pub max_delta_mass_gamma_charm: f32,
}

impl Default for MassWindows {
    fn default() -> Self {
        Self {
            delta_mass_charm: "0.08,0.08,0.08,0.08,0.08".to_string(),
            delta_mass_charm_for_beauty: "0.04,0.04,0.04,0.04,0.04".to_string(),
            delta_mass_beauty: "0.3,0.3,0.3,0.3,0.3,0.3".to_string(),
            delta_mass_dstar: 0.04,
            max_delta_mass_gamma_charm: 0.25,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MlCuts {
    #[arg(long, default_value_t = false)]
    pub apply_ml: bool,
    // Order: D0, Dplus, Ds, Lc, Xic
    #[arg(long, default_value = "0.1,0.1,0.1,0.1,0.1")]
    pub bdt_max_bkg: String,
    #[arg(long, default_value = "0.5,0.5,0.5,0.5,0.5")]
    pub bdt_min_prompt: String,
    #[arg(long, default_value = "0.5,0.5,0.5,0.5,0.5")]
    pub bdt_min_nonprompt: String,
    /// Models are fetched from `<model_path>/<particle>`
    #[arg(long, default_value = "EventFiltering/PWGHF/BDT")]
    pub model_path: String,
}

impl Default for MlCuts {
    fn default() -> Self {
        Self {
            apply_ml: false,
            bdt_max_bkg: "0.1,0.1,0.1,0.1,0.1".to_string(),
            bdt_min_prompt: "0.5,0.5,0.5,0.5,0.5".to_string(),
            bdt_min_nonprompt: "0.5,0.5,0.5,0.5,0.5".to_string(),
            model_path: "EventFiltering/PWGHF/BDT".to_string(),
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralParams {
    /// 0 = off, 1 = mass monitoring, 2 = full PID and V0 monitoring
    #[arg(long, default_value_t = 0)]
    pub qa_level: u8,
    #[arg(long, default_value_t = 8.0)]
    pub pt_threshold_2prong: f32,
    #[arg(long, default_value_t = 8.0)]
    pub pt_threshold_3prong: f32,
    #[arg(long, default_value = "Analysis/PID/TPC/Proton")]
    pub calib_path_proton: String,
    #[arg(long, default_value = "Analysis/PID/TPC/Pion")]
    pub calib_path_pion: String,
    #[arg(long, default_value_t = 0)]
    pub calib_timestamp: i64,
}

impl Default for GeneralParams {
    fn default() -> Self {
        Self {
            qa_level: 0,
            pt_threshold_2prong: 8.0,
            pt_threshold_3prong: 8.0,
            calib_path_proton: "Analysis/PID/TPC/Proton".to_string(),
            calib_path_pion: "Analysis/PID/TPC/Pion".to_string(),
            calib_timestamp: 0,
        }
    }
}

/// Per-pT-bin dcaXY windows for beauty bachelors.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleTrackCuts {
    pub pt_bins: Vec<f32>,
    pub min_dca_xy: Vec<f32>,
    pub max_dca_xy: Vec<f32>,
}

impl SingleTrackCuts {
    /// Index of the bin containing `pt`, or `None` outside the binning.
    pub fn find_pt_bin(&self, pt: f32) -> Option<usize> {
        let n = self.pt_bins.len();
        // written so that NaN falls outside
        if n < 2 || !(pt >= self.pt_bins[0] && pt < self.pt_bins[n - 1]) {
            return None;
        }
        self.pt_bins.partition_point(|&e| e <= pt).checked_sub(1)
    }
}

/// Typed, validated thresholds. Built once at startup and shared read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct Selections {
    pub track_beauty: SingleTrackCuts,
    pub pt_min_soft_pion: f32,
    pub pt_min_beauty_bachelor: f32,
    pub femto: FemtoCuts,
    pub pid: PidCuts,
    pub delta_mass_charm: [f32; CharmParticle::COUNT],
    pub delta_mass_charm_for_beauty: [f32; CharmParticle::COUNT],
    pub delta_mass_beauty: [f32; BeautyParticle::COUNT],
    pub delta_mass_dstar: f32,
    pub max_delta_mass_gamma_charm: f32,
    pub apply_ml: bool,
    pub bdt: [BdtThresholds; CharmParticle::COUNT],
    pub qa_level: u8,
    pub pt_threshold_2prong: f32,
    pub pt_threshold_3prong: f32,
}

impl FilterConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> TrResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn validate(&self) -> TrResult<()> {
        self.resolve().map(|_| ())
    }

    /// Overwrite fields with values given explicitly on the command line.
    pub fn merge_from_cli(&mut self, cli: &FilterConfig, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($group:ident . $field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$group.$field = cli.$group.$field.clone();
                }
            };
        }

        update_if_present!(beauty.pt_min_soft_pion);
        update_if_present!(beauty.pt_min_beauty_bachelor);
        update_if_present!(beauty.pt_bins_track);
        update_if_present!(beauty.min_dca_xy_track);
        update_if_present!(beauty.max_dca_xy_track);

        update_if_present!(femto.femto_min_proton_pt);
        update_if_present!(femto.femto_max_nsigma_proton);
        update_if_present!(femto.femto_proton_only_tof);
        update_if_present!(femto.femto_max_relative_momentum);

        update_if_present!(pid.nsigma_tpc_pion_kaon_dzero);
        update_if_present!(pid.nsigma_tof_pion_kaon_dzero);
        update_if_present!(pid.nsigma_tpc_kaon_3prong);
        update_if_present!(pid.nsigma_tof_kaon_3prong);
        update_if_present!(pid.nsigma_tpc_proton_lc);
        update_if_present!(pid.nsigma_tof_proton_lc);
        update_if_present!(pid.compute_tpc_post_calib);

        update_if_present!(mass.delta_mass_charm);
        update_if_present!(mass.delta_mass_charm_for_beauty);
        update_if_present!(mass.delta_mass_beauty);
        update_if_present!(mass.delta_mass_dstar);
        update_if_present!(mass.max_delta_mass_gamma_charm);

        update_if_present!(ml.apply_ml);
        update_if_present!(ml.bdt_max_bkg);
        update_if_present!(ml.bdt_min_prompt);
        update_if_present!(ml.bdt_min_nonprompt);
        update_if_present!(ml.model_path);

        update_if_present!(general.qa_level);
        update_if_present!(general.pt_threshold_2prong);
        update_if_present!(general.pt_threshold_3prong);
        update_if_present!(general.calib_path_proton);
        update_if_present!(general.calib_path_pion);
        update_if_present!(general.calib_timestamp);
    }

    /// Parse and cross-check every list. Any mismatch is fatal.
    pub fn resolve(&self) -> TrResult<Selections> {
        let pt_bins = parse_f32_list(&self.beauty.pt_bins_track, "pt_bins_track")?;
        let min_dca_xy = parse_f32_list(&self.beauty.min_dca_xy_track, "min_dca_xy_track")?;
        let max_dca_xy = parse_f32_list(&self.beauty.max_dca_xy_track, "max_dca_xy_track")?;

        if pt_bins.len() < 2 || pt_bins.windows(2).any(|w| w[1] <= w[0]) {
            return Err(TriggerError::Config(
                "--pt-bins-track must hold at least two strictly increasing edges".to_string(),
            ));
        }
        let n_bins = pt_bins.len() - 1;
        if min_dca_xy.len() != n_bins || max_dca_xy.len() != n_bins {
            return Err(TriggerError::Config(format!(
                "{} pT bins but {} min and {} max dcaXY cuts",
                n_bins,
                min_dca_xy.len(),
                max_dca_xy.len()
            )));
        }

        let delta_mass_charm = parse_f32_array::<{ CharmParticle::COUNT }>(
            &self.mass.delta_mass_charm,
            "delta_mass_charm",
        )?;
        let delta_mass_charm_for_beauty = parse_f32_array::<{ CharmParticle::COUNT }>(
            &self.mass.delta_mass_charm_for_beauty,
            "delta_mass_charm_for_beauty",
        )?;
        let delta_mass_beauty = parse_f32_array::<{ BeautyParticle::COUNT }>(
            &self.mass.delta_mass_beauty,
            "delta_mass_beauty",
        )?;
        let all_windows = delta_mass_charm
            .iter()
            .chain(&delta_mass_charm_for_beauty)
            .chain(&delta_mass_beauty)
            .chain(std::iter::once(&self.mass.delta_mass_dstar))
            .chain(std::iter::once(&self.mass.max_delta_mass_gamma_charm));
        for &dm in all_windows {
            if dm < 0.0 || !dm.is_finite() {
                return Err(TriggerError::Config(format!(
                    "Mass tolerances must be finite and non-negative, got {}",
                    dm
                )));
            }
        }

        let max_bkg = parse_f32_array::<{ CharmParticle::COUNT }>(&self.ml.bdt_max_bkg, "bdt_max_bkg")?;
        let min_prompt =
            parse_f32_array::<{ CharmParticle::COUNT }>(&self.ml.bdt_min_prompt, "bdt_min_prompt")?;
        let min_nonprompt = parse_f32_array::<{ CharmParticle::COUNT }>(
            &self.ml.bdt_min_nonprompt,
            "bdt_min_nonprompt",
        )?;
        let bdt = std::array::from_fn(|i| BdtThresholds {
            max_bkg: max_bkg[i],
            min_prompt: min_prompt[i],
            min_nonprompt: min_nonprompt[i],
        });

        Ok(Selections {
            track_beauty: SingleTrackCuts {
                pt_bins,
                min_dca_xy,
                max_dca_xy,
            },
            pt_min_soft_pion: self.beauty.pt_min_soft_pion,
            pt_min_beauty_bachelor: self.beauty.pt_min_beauty_bachelor,
            femto: self.femto,
            pid: self.pid,
            delta_mass_charm,
            delta_mass_charm_for_beauty,
            delta_mass_beauty,
            delta_mass_dstar: self.mass.delta_mass_dstar,
            max_delta_mass_gamma_charm: self.mass.max_delta_mass_gamma_charm,
            apply_ml: self.ml.apply_ml,
            bdt,
            qa_level: self.general.qa_level,
            pt_threshold_2prong: self.general.pt_threshold_2prong,
            pt_threshold_3prong: self.general.pt_threshold_3prong,
        })
    }
}

pub fn parse_f32_list(s: &str, name: &str) -> TrResult<Vec<f32>> {
    s.split(',')
        .map(|p| {
            p.trim().parse::<f32>().map_err(|_| {
                TriggerError::Config(format!("Invalid number '{}' in --{}", p.trim(), name))
            })
        })
        .collect()
}

fn parse_f32_array<const N: usize>(s: &str, name: &str) -> TrResult<[f32; N]> {
    let values = parse_f32_list(s, name)?;
    values.try_into().map_err(|v: Vec<f32>| {
        TriggerError::Config(format!("--{} requires {} values, got {}", name, N, v.len()))
    })
}
