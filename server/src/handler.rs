//! Per-request pipeline: parse, reconstruct, score, decide.

use shared::{DrawingRequest, GuessResult};

use crate::canvas;
use crate::error::ServiceError;
use crate::scorer::{validate_probabilities, SimilarityScorer};

const EMPTY_CANDIDATES: &str = "candidates must not be empty";

/// Parse a frame payload into a drawing request.
pub fn parse_request(payload: &[u8]) -> Result<DrawingRequest, ServiceError> {
    let request =
        DrawingRequest::from_json(payload).map_err(|e| ServiceError::parse(e.to_string()))?;

    if request.candidates.is_empty() {
        return Err(ServiceError::parse(EMPTY_CANDIDATES));
    }
    Ok(request)
}

/// Score one drawing against its candidates.
///
/// Fails without a partial result if the candidates are empty or the scorer
/// fails or returns output that is not one finite value per candidate.
pub fn handle<S>(request: &DrawingRequest, scorer: &S) -> Result<GuessResult, ServiceError>
where
    S: SimilarityScorer + ?Sized,
{
    if request.candidates.is_empty() {
        return Err(ServiceError::parse(EMPTY_CANDIDATES));
    }

    let canvas = canvas::reconstruct(&request.drawing);
    let probs = scorer.score(&canvas, &request.candidates)?;

    decide(&request.candidates, &request.target, &probs)
}

/// Full payload-in, payload-out pipeline for one frame.
pub fn handle_payload<S>(payload: &[u8], scorer: &S) -> Result<(GuessResult, Vec<u8>), ServiceError>
where
    S: SimilarityScorer + ?Sized,
{
    let request = parse_request(payload)?;
    let result = handle(&request, scorer)?;
    let body = result.to_json().map_err(|e| ServiceError::Encode {
        message: e.to_string(),
    })?;
    Ok((result, body))
}

/// Turn index-aligned probabilities into a verdict.
///
/// The prediction is the first candidate holding the maximum probability. The
/// score is the target's probability as a percentage, looked up at the
/// target's first occurrence, and 0 when the target is not a candidate.
///
/// Fails when `candidates` is empty or `probs` is not one finite value per
/// candidate.
pub fn decide(
    candidates: &[String],
    target: &str,
    probs: &[f64],
) -> Result<GuessResult, ServiceError> {
    if candidates.is_empty() {
        return Err(ServiceError::parse(EMPTY_CANDIDATES));
    }
    validate_probabilities(probs, candidates.len())?;

    let best = probs
        .iter()
        .enumerate()
        .fold(0, |best, (i, p)| if *p > probs[best] { i } else { best });
    let predicted_word = candidates[best].clone();

    let score = candidates
        .iter()
        .position(|c| c == target)
        .map(|i| percent(probs[i]))
        .unwrap_or(0);

    Ok(GuessResult {
        is_correct: predicted_word == target,
        predicted_word,
        score,
    })
}

/// `floor(p * 100)` clamped to `[0, 100]`.
fn percent(probability: f64) -> u8 {
    (probability * 100.0).floor().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::scorer::ScorerError;
    use shared::StrokeEvent;
    use std::sync::Mutex;

    struct FixedScorer(Vec<f64>);

    impl SimilarityScorer for FixedScorer {
        fn score(&self, _image: &Canvas, _labels: &[String]) -> Result<Vec<f64>, ScorerError> {
            Ok(self.0.clone())
        }
    }

    struct FailingScorer;

    impl SimilarityScorer for FailingScorer {
        fn score(&self, _image: &Canvas, _labels: &[String]) -> Result<Vec<f64>, ScorerError> {
            Err(ScorerError::Inference("out of memory".into()))
        }
    }

    /// Records the inked pixel count of every canvas it is shown.
    #[derive(Default)]
    struct RecordingScorer {
        seen: Mutex<Vec<usize>>,
    }

    impl SimilarityScorer for RecordingScorer {
        fn score(&self, image: &Canvas, labels: &[String]) -> Result<Vec<f64>, ScorerError> {
            self.seen.lock().unwrap().push(image.inked_pixels());
            Ok(vec![1.0 / labels.len() as f64; labels.len()])
        }
    }

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    fn request(candidates: &[&str], target: &str) -> DrawingRequest {
        DrawingRequest {
            drawing: vec![StrokeEvent::press(10, 10), StrokeEvent::moved(40, 40)],
            candidates: words(candidates),
            target: target.to_string(),
        }
    }

    #[test]
    fn test_correct_guess() {
        let result = handle(&request(&["cat", "dog"], "cat"), &FixedScorer(vec![0.9, 0.1])).unwrap();
        assert_eq!(
            result,
            GuessResult {
                predicted_word: "cat".to_string(),
                is_correct: true,
                score: 90,
            }
        );
    }

    #[test]
    fn test_wrong_guess_still_scores_target() {
        let result = handle(&request(&["cat", "dog"], "dog"), &FixedScorer(vec![0.9, 0.1])).unwrap();
        assert_eq!(result.predicted_word, "cat");
        assert!(!result.is_correct);
        assert_eq!(result.score, 10);
    }

    #[test]
    fn test_absent_target_scores_zero() {
        for probs in [vec![0.9, 0.1], vec![0.5, 0.5], vec![0.0, 1.0]] {
            let result = handle(&request(&["cat", "dog"], "fish"), &FixedScorer(probs)).unwrap();
            assert_eq!(result.score, 0);
            assert!(!result.is_correct);
        }
    }

    #[test]
    fn test_tie_goes_to_first_candidate() {
        let result = decide(&words(&["a", "b"]), "b", &[0.5, 0.5]).unwrap();
        assert_eq!(result.predicted_word, "a");
        assert!(!result.is_correct);
        assert_eq!(result.score, 50);

        let result = decide(&words(&["a", "b", "c"]), "c", &[0.2, 0.4, 0.4]).unwrap();
        assert_eq!(result.predicted_word, "b");
    }

    #[test]
    fn test_duplicate_candidates_use_first_index() {
        let result = decide(&words(&["cat", "dog", "cat"]), "cat", &[0.2, 0.3, 0.5]).unwrap();
        assert_eq!(result.predicted_word, "cat");
        assert!(result.is_correct);
        assert_eq!(result.score, 20);
    }

    #[test]
    fn test_score_is_floored_and_clamped() {
        assert_eq!(percent(0.999), 99);
        assert_eq!(percent(0.0), 0);
        assert_eq!(percent(1.0), 100);
        assert_eq!(percent(1.2), 100);
        assert_eq!(percent(-0.3), 0);
    }

    #[test]
    fn test_score_matches_double_precision_floor() {
        // 0.57 * 100 and 0.29 * 100 fall just below the integer in f64.
        for (p, expected) in [(0.57, 56), (0.29, 28), (0.9, 90), (0.1, 10)] {
            let result = decide(&words(&["a", "b"]), "a", &[p, 1.0 - p]).unwrap();
            assert_eq!(result.score, expected, "probability {}", p);
        }
    }

    #[test]
    fn test_decide_rejects_unusable_input() {
        assert_eq!(decide(&[], "a", &[]).unwrap_err().kind(), "parse");
        assert!(matches!(
            decide(&words(&["a", "b"]), "a", &[1.0]),
            Err(ServiceError::Scorer(ScorerError::LengthMismatch {
                expected: 2,
                actual: 1
            }))
        ));
        assert!(matches!(
            decide(&words(&["a"]), "a", &[f64::INFINITY]),
            Err(ServiceError::Scorer(ScorerError::NonFinite { index: 0 }))
        ));
    }

    #[test]
    fn test_single_candidate() {
        let result = decide(&words(&["sun"]), "sun", &[1.0]).unwrap();
        assert_eq!(result.predicted_word, "sun");
        assert!(result.is_correct);
        assert_eq!(result.score, 100);
    }

    #[test]
    fn test_empty_candidates_rejected() {
        let err = handle(&request(&[], "cat"), &FixedScorer(vec![])).unwrap_err();
        assert_eq!(err.kind(), "parse");
    }

    #[test]
    fn test_scorer_failure_aborts() {
        let err = handle(&request(&["cat"], "cat"), &FailingScorer).unwrap_err();
        assert_eq!(err.kind(), "scorer");
    }

    #[test]
    fn test_malformed_scorer_output_aborts() {
        let err = handle(&request(&["cat", "dog"], "cat"), &FixedScorer(vec![1.0])).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Scorer(ScorerError::LengthMismatch { .. })
        ));

        let err = handle(
            &request(&["cat", "dog"], "cat"),
            &FixedScorer(vec![f64::NAN, 0.5]),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Scorer(ScorerError::NonFinite { index: 0 })
        ));
    }

    #[test]
    fn test_scorer_sees_reconstructed_drawing() {
        let scorer = RecordingScorer::default();
        let mut cleared = request(&["a", "b"], "a");
        cleared.drawing.push(StrokeEvent::clear());

        handle(&request(&["a", "b"], "a"), &scorer).unwrap();
        handle(&cleared, &scorer).unwrap();

        let seen = scorer.seen.lock().unwrap();
        assert!(seen[0] > 0);
        assert_eq!(seen[1], 0);
    }

    #[test]
    fn test_parse_request_errors() {
        assert_eq!(parse_request(b"not json").unwrap_err().kind(), "parse");
        assert_eq!(
            parse_request(br#"{"drawing": [], "candidates": [], "target": "x"}"#)
                .unwrap_err()
                .kind(),
            "parse"
        );
        assert_eq!(
            parse_request(br#"{"drawing": [], "target": "x"}"#)
                .unwrap_err()
                .kind(),
            "parse"
        );
    }

    #[test]
    fn test_handle_payload_produces_wire_json() {
        let payload = br#"{"drawing": [{"x": 1, "y": 2, "action": 1}], "candidates": ["cat", "dog"], "target": "cat"}"#;
        let (result, body) = handle_payload(payload, &FixedScorer(vec![0.9, 0.1])).unwrap();
        assert!(result.is_correct);

        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["predicted_word"], "cat");
        assert_eq!(json["is_correct"], 1);
        assert_eq!(json["score"], 90);
    }
}
