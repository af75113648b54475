//! Structured-output schema for board summaries.

/// Tool/schema name sent to providers that require one.
pub const SUMMARY_SCHEMA_NAME: &str = "publish_summary";

/// JSON schema constraining the reply to exactly two required strings.
#[must_use]
pub fn summary_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "detailedSummary": {
                "type": "string",
                "description": "Markdown analysis of the submitted content."
            },
            "shortSummary": {
                "type": "string",
                "description": "One-sentence headline followed by an emoji."
            }
        },
        "required": ["detailedSummary", "shortSummary"],
        "additionalProperties": false
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_requires_both_fields() {
        let schema = summary_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert_eq!(required, ["detailedSummary", "shortSummary"]);
        assert_eq!(schema["properties"]["shortSummary"]["type"], "string");
        assert_eq!(schema["additionalProperties"], false);
    }
}
