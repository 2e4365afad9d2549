use crate::datamodel::{DataPoint, TimestampExt};
use anyhow::Result;
use serde_json::{Map, Value, json};

/// Converter for merged rows to JSON Lines format
pub struct JsonlConverter;

impl JsonlConverter {
    /// One JSON object per row, fields flattened: `{"date":100,"pressure":10.0}`
    pub fn to_jsonl(rows: &[DataPoint]) -> Result<String> {
        let mut jsonl_output = String::new();
        for row in rows {
            jsonl_output.push_str(&serde_json::to_string(row)?);
            jsonl_output.push('\n');
        }
        Ok(jsonl_output)
    }

    /// Same as [`JsonlConverter::to_jsonl`] with an extra RFC3339 `timestamp`
    /// field next to the raw millisecond `date`.
    pub fn to_jsonl_with_timestamps(rows: &[DataPoint]) -> Result<String> {
        let mut jsonl_output = String::new();
        for row in rows {
            let mut line = Map::new();
            line.insert("date".to_string(), json!(row.date));
            line.insert(
                "timestamp".to_string(),
                Value::String(row.date.to_epoch().to_rfc3339()),
            );
            for (metric, value) in &row.values {
                line.insert(metric.clone(), json!(value));
            }
            jsonl_output.push_str(&Value::Object(line).to_string());
            jsonl_output.push('\n');
        }
        Ok(jsonl_output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_jsonl() {
        let mut first = DataPoint::with_value(100, "pressure", 10.0);
        first.set("temperature", 70.0);
        let rows = vec![first, DataPoint::with_value(200, "pressure", 12.0)];

        let jsonl = JsonlConverter::to_jsonl(&rows).unwrap();
        let lines: Vec<&str> = jsonl.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"date":100,"pressure":10.0,"temperature":70.0}"#);
        assert_eq!(lines[1], r#"{"date":200,"pressure":12.0}"#);
    }

    #[test]
    fn test_to_jsonl_with_timestamps() {
        let rows = vec![DataPoint::with_value(1_704_067_200_000, "pressure", 10.0)];
        let jsonl = JsonlConverter::to_jsonl_with_timestamps(&rows).unwrap();
        let parsed: Value = serde_json::from_str(jsonl.trim()).unwrap();
        assert_eq!(parsed["date"], 1_704_067_200_000_i64);
        assert_eq!(parsed["pressure"], 10.0);
        assert!(parsed["timestamp"].as_str().unwrap().starts_with("2024-01-01T00:00:00"));
    }

    #[test]
    fn test_empty() {
        assert_eq!(JsonlConverter::to_jsonl(&[]).unwrap(), "");
    }
}
