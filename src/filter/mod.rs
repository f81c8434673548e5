pub mod engine;
pub mod types;

pub use self::types::{CandidateTags, EventDecision, THREE_PRONG_SPECIES};

use crate::calibration::{CalibrationProvider, PidCalibration};
use crate::calo::CaloClusterCuts;
use crate::config::{FilterConfig, Selections};
use crate::dalitz::DalitzSelector;
use crate::error::TrResult;
use crate::ml::{ModelSession, ModelStore};
use crate::monitoring::{MonitoringSink, NullSink};
use crate::species::{CharmParticle, HfTrigger};
use crate::track::Event;
use rayon::prelude::*;
use std::sync::Arc;
use strum::{EnumCount, IntoEnumIterator};
use tracing::{debug, info, warn};

/// Event-level trigger engine. Built once, then shared read-only by the
/// workers processing events.
pub struct HfFilter {
    pub selections: Selections,

    // TPC post-calibration, used only when enabled in the PID cuts
    pub calibration: Option<PidCalibration>,
    pub models: [Option<ModelSession>; CharmParticle::COUNT],

    pub calo_cuts: Option<CaloClusterCuts>,
    pub dalitz: Option<DalitzSelector>,

    pub sink: Arc<dyn MonitoringSink>,
}

impl HfFilter {
    pub fn new(selections: Selections) -> Self {
        Self {
            selections,
            calibration: None,
            models: Default::default(),
            calo_cuts: None,
            dalitz: None,
            sink: Arc::new(NullSink),
        }
    }

    pub fn from_config(config: &FilterConfig) -> TrResult<Self> {
        Ok(Self::new(config.resolve()?))
    }

    pub fn with_calibration(mut self, calibration: PidCalibration) -> Self {
        self.calibration = Some(calibration);
        self
    }

    /// Fetch the proton and pion maps. Any failure is fatal.
    pub fn load_calibration(self, provider: &dyn CalibrationProvider, config: &FilterConfig) -> TrResult<Self> {
        let general = &config.general;
        let calibration = provider.fetch_pid(
            &general.calib_path_proton,
            &general.calib_path_pion,
            general.calib_timestamp,
        )?;
        info!("Loaded TPC post-calibration maps");
        Ok(self.with_calibration(calibration))
    }

    pub fn with_model(mut self, particle: CharmParticle, session: ModelSession) -> Self {
        self.models[particle.index()] = Some(session);
        self
    }

    /// Fetch one model per charm species from `<model_path>/<particle>`.
    pub fn load_models(mut self, store: &dyn ModelStore, config: &FilterConfig) -> TrResult<Self> {
        for particle in CharmParticle::iter() {
            let name: &'static str = particle.into();
            let path = format!("{}/{}", config.ml.model_path, name);
            let session = ModelSession::load_from_store(store, &path, name, config.general.calib_timestamp)?;
            self.models[particle.index()] = Some(session);
        }
        info!("Loaded {} BDT models", CharmParticle::COUNT);
        Ok(self)
    }

    pub fn with_calo_cuts(mut self, cuts: CaloClusterCuts) -> Self {
        cuts.log_summary();
        self.calo_cuts = Some(cuts);
        self
    }

    pub fn with_dalitz(mut self, selector: DalitzSelector) -> Self {
        self.dalitz = Some(selector);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn MonitoringSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Calibration handed to the PID selectors, if post-calibration is on.
    pub fn active_calibration(&self) -> Option<&PidCalibration> {
        if !self.selections.pid.compute_tpc_post_calib {
            return None;
        }
        self.calibration.as_ref()
    }

    pub fn process_event(&self, event: &Event) -> EventDecision {
        engine::process_event(self, event)
    }

    /// Process events in parallel. Decisions come back in input order.
    pub fn process_events(&self, events: &[Event]) -> Vec<EventDecision> {
        if self.selections.pid.compute_tpc_post_calib && self.calibration.is_none() {
            warn!("TPC post-calibration requested but no maps loaded, using raw n-sigma");
        }
        if self.selections.apply_ml && self.models.iter().any(Option::is_none) {
            warn!("ML selection requested but not every species has a model, unmodelled species are not BDT-gated");
        }

        let decisions: Vec<EventDecision> = events.par_iter().map(|e| self.process_event(e)).collect();

        let n_triggered = decisions.iter().filter(|d| d.is_triggered()).count();
        info!("Processed {} events, {} triggered", decisions.len(), n_triggered);
        for trigger in HfTrigger::iter() {
            let n = decisions.iter().filter(|d| d.has(trigger)).count();
            if n > 0 {
                debug!("   {}: {}", trigger, n);
            }
        }

        decisions
    }
}
