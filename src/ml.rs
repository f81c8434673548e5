//! BDT score thresholds and the glue around an external inference runtime.

use crate::error::{TrResult, TriggerError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};

/// Origin bits, positioned like the origin enum of the reconstruction
/// framework (None = 0, Prompt = 1, NonPrompt = 2).
pub const ORIGIN_PROMPT: u8 = 1 << 1;
pub const ORIGIN_NON_PROMPT: u8 = 1 << 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BdtThresholds {
    pub max_bkg: f32,
    pub min_prompt: f32,
    pub min_nonprompt: f32,
}

impl Default for BdtThresholds {
    fn default() -> Self {
        Self {
            max_bkg: 0.1,
            min_prompt: 0.5,
            min_nonprompt: 0.5,
        }
    }
}

/// Map (background, prompt, non-prompt) scores to an origin bitmask.
///
/// Fewer than three scores or a background score above threshold give 0.
pub fn is_bdt_selected(scores: &[f32], thresholds: &BdtThresholds) -> u8 {
    let mut ret = 0;
    if scores.len() < 3 {
        return ret;
    }

    if scores[0] > thresholds.max_bkg {
        return ret;
    }
    if scores[1] > thresholds.min_prompt {
        ret |= ORIGIN_PROMPT;
    }
    if scores[2] > thresholds.min_nonprompt {
        ret |= ORIGIN_NON_PROMPT;
    }

    ret
}

/// Opaque inference runtime: flat features in, class scores out.
pub trait InferenceProvider: Send + Sync {
    /// Declared input shapes, one per model input. A negative dimension
    /// means "unknown".
    fn input_shapes(&self) -> Vec<Vec<i64>>;

    fn run(&self, features: &[f32], shape: &[i64]) -> TrResult<Vec<f32>>;
}

/// Source of inference providers, e.g. a model repository addressed by
/// path and validity timestamp.
pub trait ModelStore {
    fn load(&self, path: &str, particle: &str, timestamp: i64) -> TrResult<Arc<dyn InferenceProvider>>;
}

/// A loaded model with a normalised input shape.
#[derive(Clone)]
pub struct ModelSession {
    name: String,
    provider: Arc<dyn InferenceProvider>,
    input_shape: Vec<i64>,
}

impl std::fmt::Debug for ModelSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSession")
            .field("name", &self.name)
            .field("input_shape", &self.input_shape)
            .finish()
    }
}

impl ModelSession {
    pub fn new(name: &str, provider: Arc<dyn InferenceProvider>) -> TrResult<Self> {
        let mut input_shape = provider
            .input_shapes()
            .into_iter()
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                TriggerError::Inference(format!("Model for {} declares no input shape", name))
            })?;

        if input_shape[0] < 0 {
            warn!(
                "Model for {} with negative input shape likely because converted with hummingbird, setting it to 1.",
                name
            );
            input_shape[0] = 1;
        }

        Ok(Self {
            name: name.to_string(),
            provider,
            input_shape,
        })
    }

    pub fn load_from_store(
        store: &dyn ModelStore,
        path: &str,
        particle: &str,
        timestamp: i64,
    ) -> TrResult<Self> {
        let provider = store.load(path, particle, timestamp).map_err(|e| {
            TriggerError::Inference(format!(
                "Failed to fetch model for {} at '{}' (timestamp {}): {}",
                particle, path, timestamp, e
            ))
        })?;
        Self::new(particle, provider)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input_shape(&self) -> &[i64] {
        &self.input_shape
    }

    /// Number of features expected when every dimension is known.
    fn expected_len(&self) -> Option<usize> {
        self.input_shape
            .iter()
            .try_fold(1usize, |acc, &d| (d >= 0).then(|| acc * d as usize))
    }

    /// Run the model. A feature vector that does not fit the declared shape
    /// is an error; a failing runtime is logged and yields `None`.
    pub fn predict(&self, features: &[f32]) -> TrResult<Option<[f32; 3]>> {
        if let Some(expected) = self.expected_len() {
            if features.len() != expected {
                return Err(TriggerError::Inference(format!(
                    "Model for {} expects {} features, got {}",
                    self.name,
                    expected,
                    features.len()
                )));
            }
        }

        match self.provider.run(features, &self.input_shape) {
            Ok(out) if out.len() == 3 => Ok(Some([out[0], out[1], out[2]])),
            Ok(out) => {
                error!(
                    "Error running model inference for {}: expected 3 scores, got {}",
                    self.name,
                    out.len()
                );
                Ok(None)
            }
            Err(e) => {
                error!("Error running model inference for {}: {}", self.name, e);
                Ok(None)
            }
        }
    }
}
