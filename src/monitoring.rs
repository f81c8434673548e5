use std::collections::BTreeMap;
use std::sync::Mutex;

/// Write-only side channel for QA series. Selectors never read it back.
pub trait MonitoringSink: Send + Sync {
    fn fill_1d(&self, series: &str, x: f32);
    fn fill_2d(&self, series: &str, x: f32, y: f32);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl MonitoringSink for NullSink {
    fn fill_1d(&self, _series: &str, _x: f32) {}
    fn fill_2d(&self, _series: &str, _x: f32, _y: f32) {}
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Series {
    pub xs: Vec<f32>,
    pub ys: Vec<f32>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Number of entries whose x lies in [value - 0.5, value + 0.5).
    /// Stage counters are filled with integer positions, so this is the
    /// count at that stage.
    pub fn count_at(&self, value: f32) -> usize {
        self.xs
            .iter()
            .filter(|&&x| x >= value - 0.5 && x < value + 0.5)
            .count()
    }
}

/// Thread-safe in-memory recorder. Entries from parallel workers interleave
/// in arbitrary order; only the multiset of values is meaningful.
#[derive(Debug, Default)]
pub struct CountingSink {
    series: Mutex<BTreeMap<String, Series>>,
}

impl CountingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, series: &str) -> Series {
        self.series
            .lock()
            .map(|m| m.get(series).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    pub fn names(&self) -> Vec<String> {
        self.series
            .lock()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn push(&self, series: &str, x: f32, y: Option<f32>) {
        if let Ok(mut m) = self.series.lock() {
            let entry = m.entry(series.to_string()).or_default();
            entry.xs.push(x);
            if let Some(y) = y {
                entry.ys.push(y);
            }
        }
    }
}

impl MonitoringSink for CountingSink {
    fn fill_1d(&self, series: &str, x: f32) {
        self.push(series, x, None);
    }

    fn fill_2d(&self, series: &str, x: f32, y: f32) {
        self.push(series, x, Some(y));
    }
}

/// Series names, kept in one place so producers and readers agree.
pub mod names {
    pub const GAMMA_SELECTED: &str = "hGammaSelected";
    pub const GAMMA_ETA_BEFORE: &str = "hGammaEtaBefore";
    pub const GAMMA_ETA_AFTER: &str = "hGammaEtaAfter";
    pub const GAMMA_ARM_POD_BEFORE: &str = "hGammaArmPodBefore";
    pub const GAMMA_ARM_POD_AFTER: &str = "hGammaArmPodAfter";
    pub const PROTON_TPC_PID: &str = "hProtonTPCPID";
    pub const PROTON_TOF_PID: &str = "hProtonTOFPID";
    pub const CALO_CLUSTER_FILTER: &str = "hCaloClusterFilter";
    pub const CALO_CLUSTER_E_IN: &str = "hCaloClusterEIn";
    pub const CALO_CLUSTER_E_OUT: &str = "hCaloClusterEOut";
    pub const KSTAR: &str = "hKstar";
    pub const DALITZ_TRACK_STATS: &str = "TrackStats";

    /// Mass-vs-pT series of a species, e.g. `hMassVsPtD0` or `hMassVsPtBplus`.
    pub fn mass_vs_pt(particle: &str) -> String {
        format!("hMassVsPt{}", particle)
    }

    pub fn bdt_score(particle: &str, class: usize) -> String {
        format!("hBDTScore{}_{}", class, particle)
    }
}
