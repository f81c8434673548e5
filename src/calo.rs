//! Calorimeter cluster skim for photon reconstruction.

use crate::monitoring::{names, MonitoringSink};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaloCluster {
    #[serde(default)]
    pub global_index: usize,
    pub energy: f32,
    pub eta: f32,
    pub phi: f32,
    /// Cluster time in ns.
    pub time: f32,
    /// Shower-shape long axis.
    pub m02: f32,
}

/// A cluster that survived the skim, reduced to what photon analyses read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaloPhoton {
    pub energy: f32,
    pub eta: f32,
    pub phi: f32,
    pub cluster_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaloClusterCuts {
    pub min_time: f32,
    pub max_time: f32,
    pub min_m02: f32,
    pub max_m02: f32,
}

impl Default for CaloClusterCuts {
    fn default() -> Self {
        Self {
            min_time: -200.0,
            max_time: 200.0,
            min_m02: 0.0,
            max_m02: 1.0,
        }
    }
}

impl CaloClusterCuts {
    pub fn log_summary(&self) {
        info!("| Timing cut: {} < t < {}", self.min_time, self.max_time);
        info!("| M02 cut: {} < M02 < {}", self.min_m02, self.max_m02);
    }

    /// Time window, then M02 window. Stage counter: 0 in, 1 time reject,
    /// 2 M02 reject, 3 out.
    pub fn is_selected(&self, cluster: &CaloCluster, sink: &dyn MonitoringSink) -> bool {
        sink.fill_1d(names::CALO_CLUSTER_E_IN, cluster.energy);
        sink.fill_1d(names::CALO_CLUSTER_FILTER, 0.0);

        if cluster.time > self.max_time || cluster.time < self.min_time {
            sink.fill_1d(names::CALO_CLUSTER_FILTER, 1.0);
            return false;
        }
        if cluster.m02 > self.max_m02 || cluster.m02 < self.min_m02 {
            sink.fill_1d(names::CALO_CLUSTER_FILTER, 2.0);
            return false;
        }

        sink.fill_1d(names::CALO_CLUSTER_E_OUT, cluster.energy);
        sink.fill_1d(names::CALO_CLUSTER_FILTER, 3.0);
        true
    }

    pub fn select(&self, clusters: &[CaloCluster], sink: &dyn MonitoringSink) -> Vec<CaloPhoton> {
        clusters
            .iter()
            .filter(|c| self.is_selected(c, sink))
            .map(|c| CaloPhoton {
                energy: c.energy,
                eta: c.eta,
                phi: c.phi,
                cluster_index: c.global_index,
            })
            .collect()
    }
}
