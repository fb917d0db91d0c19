//! Response parsing for the zero-shot inference API
//!
//! The API has answered in two shapes over time:
//! - `{"sequence": "...", "labels": [...], "scores": [...]}`
//! - `[{"label": "...", "score": 0.9}, ...]` (sometimes wrapped in an outer list)
//!
//! Errors arrive as `{"error": "...", "estimated_time": 20.0}`, with or
//! without a failing HTTP status.

use serde::Deserialize;
use serde_json::Value;

use super::{BackendError, BackendResult};

/// Truncate a raw body for logs and error messages
pub(crate) fn truncate_body(body: &str) -> String {
    const LIMIT: usize = 200;
    if body.len() <= LIMIT {
        return body.to_string();
    }
    let mut end = LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[derive(Debug, Deserialize)]
struct ScoredLabel {
    label: String,
    #[serde(default)]
    score: f64,
}

/// Parse an inference response into labels ranked by confidence
///
/// An empty label list is returned as `Ok(vec![])`; deciding what that means
/// is left to the caller.
pub fn parse_zero_shot_response(status: u16, body: &str) -> BackendResult<Vec<String>> {
    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            if (200..300).contains(&status) {
                return Err(BackendError::Malformed(format!(
                    "{} | Raw: {}",
                    e,
                    truncate_body(body)
                )));
            }
            return Err(BackendError::Api {
                status,
                message: truncate_body(body),
            });
        }
    };

    if let Some(error) = value.get("error") {
        let message = match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        if message.to_lowercase().contains("loading") {
            return Err(BackendError::Loading(message));
        }
        return Err(BackendError::Api { status, message });
    }

    if !(200..300).contains(&status) {
        return Err(BackendError::Api {
            status,
            message: truncate_body(body),
        });
    }

    match value {
        Value::Object(ref map) => match map.get("labels") {
            Some(Value::Array(labels)) => labels
                .iter()
                .map(|l| {
                    l.as_str().map(str::to_string).ok_or_else(|| {
                        BackendError::Malformed(format!("non-string label: {}", l))
                    })
                })
                .collect(),
            _ => Err(BackendError::Malformed(format!(
                "missing labels | Raw: {}",
                truncate_body(body)
            ))),
        },
        Value::Array(items) => {
            // Unwrap a single nested batch: [[{label, score}, ...]]
            let nested = matches!(items.first(), Some(Value::Array(_)));
            let items = if nested {
                match items.into_iter().next() {
                    Some(Value::Array(inner)) => inner,
                    _ => Vec::new(),
                }
            } else {
                items
            };
            let mut scored: Vec<ScoredLabel> = items
                .into_iter()
                .map(serde_json::from_value)
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| BackendError::Malformed(e.to_string()))?;
            // Stable: equal scores keep the API's own order
            scored.sort_by(|a, b| {
                b.score
                    .partial_cmp(&a.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            Ok(scored.into_iter().map(|s| s.label).collect())
        }
        _ => Err(BackendError::Malformed(format!(
            "unexpected payload | Raw: {}",
            truncate_body(body)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labels_object() {
        let body = r#"{"sequence":"rent","labels":["Rent Payments","Utility Bills"],"scores":[0.9,0.1]}"#;
        let labels = parse_zero_shot_response(200, body).unwrap();
        assert_eq!(labels, vec!["Rent Payments", "Utility Bills"]);
    }

    #[test]
    fn test_parse_scored_list_is_ranked() {
        let body = r#"[{"label":"Utility Bills","score":0.2},{"label":"Rent Payments","score":0.7}]"#;
        let labels = parse_zero_shot_response(200, body).unwrap();
        assert_eq!(labels, vec!["Rent Payments", "Utility Bills"]);
    }

    #[test]
    fn test_parse_scored_list_ties_keep_api_order() {
        let body = r#"[{"label":"Loan Repayment","score":0.5},{"label":"Rent Payments","score":0.5}]"#;
        let labels = parse_zero_shot_response(200, body).unwrap();
        assert_eq!(labels, vec!["Loan Repayment", "Rent Payments"]);
    }

    #[test]
    fn test_parse_nested_list() {
        let body = r#"[[{"label":"Loan Repayment","score":0.8}]]"#;
        let labels = parse_zero_shot_response(200, body).unwrap();
        assert_eq!(labels, vec!["Loan Repayment"]);
    }

    #[test]
    fn test_loading_error_in_ok_response() {
        let body = r#"{"error":"Model MoritzLaurer/x is currently loading","estimated_time":20.0}"#;
        let err = parse_zero_shot_response(200, body).unwrap_err();
        assert!(err.is_loading());
    }

    #[test]
    fn test_loading_error_with_503() {
        let body = r#"{"error":"Model is currently loading"}"#;
        assert!(parse_zero_shot_response(503, body).unwrap_err().is_loading());
    }

    #[test]
    fn test_other_error_is_api_error() {
        let body = r#"{"error":"Authorization header is invalid"}"#;
        let err = parse_zero_shot_response(401, body).unwrap_err();
        assert!(matches!(err, BackendError::Api { status: 401, .. }));
    }

    #[test]
    fn test_missing_labels_is_malformed() {
        let err = parse_zero_shot_response(200, r#"{"sequence":"x"}"#).unwrap_err();
        assert!(matches!(err, BackendError::Malformed(_)));
        let err = parse_zero_shot_response(200, "not json").unwrap_err();
        assert!(matches!(err, BackendError::Malformed(_)));
    }

    #[test]
    fn test_empty_labels_are_passed_through() {
        let labels = parse_zero_shot_response(200, r#"{"labels":[],"scores":[]}"#).unwrap();
        assert!(labels.is_empty());
    }

    #[test]
    fn test_non_json_failure_is_api_error() {
        let err = parse_zero_shot_response(502, "<html>Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, BackendError::Api { status: 502, .. }));
    }
}
