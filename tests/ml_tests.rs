use hftrigger::error::{TrResult, TriggerError};
use hftrigger::ml::*;
use rstest::rstest;
use std::sync::Arc;

#[rstest]
#[case::prompt(&[0.05, 0.9, 0.1], ORIGIN_PROMPT)]
#[case::non_prompt(&[0.05, 0.1, 0.9], ORIGIN_NON_PROMPT)]
#[case::both(&[0.05, 0.9, 0.9], ORIGIN_PROMPT | ORIGIN_NON_PROMPT)]
#[case::background_veto(&[0.5, 0.9, 0.9], 0)]
#[case::at_threshold(&[0.1, 0.5, 0.5], 0)]
#[case::too_few_scores(&[0.0, 0.9], 0)]
#[case::empty(&[], 0)]
fn test_bdt_selection(#[case] scores: &[f32], #[case] expected: u8) {
    assert_eq!(is_bdt_selected(scores, &BdtThresholds::default()), expected);
}

struct FakeModel {
    shape: Vec<i64>,
    output: TrResult<Vec<f32>>,
}

impl InferenceProvider for FakeModel {
    fn input_shapes(&self) -> Vec<Vec<i64>> {
        if self.shape.is_empty() {
            vec![]
        } else {
            vec![self.shape.clone()]
        }
    }

    fn run(&self, _features: &[f32], _shape: &[i64]) -> TrResult<Vec<f32>> {
        match &self.output {
            Ok(v) => Ok(v.clone()),
            Err(e) => Err(TriggerError::Inference(e.to_string())),
        }
    }
}

fn session(shape: Vec<i64>, output: TrResult<Vec<f32>>) -> TrResult<ModelSession> {
    ModelSession::new("D0", Arc::new(FakeModel { shape, output }))
}

#[test]
fn test_negative_leading_dim_becomes_one() {
    let s = session(vec![-1, 4], Ok(vec![0.0, 1.0, 0.0])).unwrap();
    assert_eq!(s.input_shape(), &[1, 4]);
    assert_eq!(s.name(), "D0");
}

#[test]
fn test_missing_shape_is_an_error() {
    assert!(matches!(
        session(vec![], Ok(vec![])),
        Err(TriggerError::Inference(_))
    ));
}

#[test]
fn test_predict_outcomes() {
    let ok = session(vec![1, 3], Ok(vec![0.01, 0.8, 0.2])).unwrap();
    assert_eq!(ok.predict(&[1.0, 2.0, 3.0]).unwrap(), Some([0.01, 0.8, 0.2]));

    // Wrong feature count rejects the candidate
    assert!(ok.predict(&[1.0]).is_err());

    // Runtime failure means no score
    let failing = session(vec![1, 3], Err(TriggerError::Inference("boom".into()))).unwrap();
    assert_eq!(failing.predict(&[1.0, 2.0, 3.0]).unwrap(), None);

    let short = session(vec![1, 3], Ok(vec![0.2])).unwrap();
    assert_eq!(short.predict(&[1.0, 2.0, 3.0]).unwrap(), None);
}

#[test]
fn test_unknown_inner_dims_skip_length_check() {
    let s = session(vec![1, -1], Ok(vec![0.0, 0.0, 0.9])).unwrap();
    let scores = s.predict(&[0.5; 7]).unwrap().unwrap();
    assert_eq!(is_bdt_selected(&scores, &BdtThresholds::default()), ORIGIN_NON_PROMPT);
}

struct Store;

impl ModelStore for Store {
    fn load(&self, path: &str, _particle: &str, _timestamp: i64) -> TrResult<Arc<dyn InferenceProvider>> {
        if path.ends_with("missing") {
            return Err(TriggerError::CalibrationFetch(path.to_string()));
        }
        Ok(Arc::new(FakeModel {
            shape: vec![-1, 2],
            output: Ok(vec![0.0, 1.0, 0.0]),
        }))
    }
}

#[test]
fn test_store_failures_surface_as_inference_errors() {
    let s = ModelSession::load_from_store(&Store, "EventFiltering/PWGHF/BDT/D0", "D0", 0).unwrap();
    assert_eq!(s.input_shape(), &[1, 2]);

    let err = ModelSession::load_from_store(&Store, "models/missing", "Lc", 0).unwrap_err();
    assert!(matches!(err, TriggerError::Inference(_)));
}
