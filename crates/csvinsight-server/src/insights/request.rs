use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

use super::pipeline::{InsightError, CSV_REQUIRED};

/// Body of `POST /insights`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsightRequest {
    /// Tabular data to analyze, already trimmed to a size the model accepts
    pub csv_data: String,
    /// Original file name, `unknown.csv` when omitted
    #[serde(default)]
    pub filename: Option<String>,
}

impl InsightRequest {
    /// Parses a raw request body.
    ///
    /// Parsing goes through [`Value`] so a missing or non-string `csvData`
    /// is reported as a client error rather than a generic decode failure.
    /// A non-string `filename` is treated as absent.
    pub fn from_slice(body: &[u8]) -> Result<Self, InsightError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|_| InsightError::InvalidInput("Request body must be valid JSON".to_string()))?;
        Self::from_json(&value)
    }

    pub fn from_json(value: &Value) -> Result<Self, InsightError> {
        let csv_data = value
            .get("csvData")
            .and_then(Value::as_str)
            .ok_or_else(|| InsightError::InvalidInput(CSV_REQUIRED.to_string()))?;
        let filename = value
            .get("filename")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self {
            csv_data: csv_data.to_string(),
            filename,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_csv_data_and_filename() {
        let req = InsightRequest::from_json(&json!({"csvData": "[{\"a\":1}]", "filename": "x.csv"}))
            .unwrap();
        assert_eq!(req.csv_data, "[{\"a\":1}]");
        assert_eq!(req.filename.as_deref(), Some("x.csv"));
    }

    #[test]
    fn missing_or_mistyped_csv_data_is_rejected() {
        for body in [
            json!({}),
            json!({"csvData": null}),
            json!({"csvData": 42}),
            json!({"csvData": ["a", "b"]}),
            json!({"csvData": {"a": 1}}),
            json!("just a string"),
        ] {
            let err = InsightRequest::from_json(&body).unwrap_err();
            assert!(matches!(err, InsightError::InvalidInput(_)), "{body}");
            assert_eq!(err.to_string(), "CSV data is required");
        }
    }

    #[test]
    fn non_string_filename_is_ignored() {
        let req = InsightRequest::from_json(&json!({"csvData": "a", "filename": 7})).unwrap();
        assert_eq!(req.filename, None);
    }

    #[test]
    fn invalid_json_body_is_client_error() {
        let err = InsightRequest::from_slice(b"{not json").unwrap_err();
        assert!(matches!(err, InsightError::InvalidInput(_)));
        assert_eq!(err.to_string(), "Request body must be valid JSON");
    }
}
