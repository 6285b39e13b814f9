//! Typed optional-field accessors for loosely-structured CR payloads
//!
//! Fluid CR status objects arrive as untyped JSON. Every accessor here
//! returns `Option` and never panics: a missing or wrong-typed field
//! reads as absent, so partially-populated objects parse to snapshots
//! with absent optional fields instead of aborting resolution.

use serde_json::Value;

use crate::graph::ConditionBrief;

/// Navigate a path of object keys and read a string leaf
pub(crate) fn str_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    at(value, path)?.as_str()
}

/// Navigate a path of object keys and read an integer leaf. Accepts
/// floats with integral values since JSON numbers are untyped upstream.
pub(crate) fn i64_at(value: &Value, path: &[&str]) -> Option<i64> {
    let leaf = at(value, path)?;
    leaf.as_i64()
        .or_else(|| leaf.as_f64().map(|f| f as i64))
}

/// Navigate a path of object keys and read an array leaf
pub(crate) fn seq_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Vec<Value>> {
    at(value, path)?.as_array()
}

fn at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for key in path {
        current = current.get(key)?;
    }
    Some(current)
}

/// Parse a Kubernetes-style condition list. Entries that are not objects
/// are skipped; absent fields default to empty.
pub(crate) fn parse_conditions(status: &Value) -> Vec<ConditionBrief> {
    let Some(conditions) = seq_at(status, &["conditions"]) else {
        return Vec::new();
    };
    conditions
        .iter()
        .filter(|c| c.is_object())
        .map(|c| ConditionBrief {
            condition_type: str_at(c, &["type"]).unwrap_or_default().to_string(),
            status: str_at(c, &["status"]).unwrap_or_default().to_string(),
            reason: str_at(c, &["reason"]).map(str::to_string),
            message: str_at(c, &["message"]).map(str::to_string),
            last_transition_time: str_at(c, &["lastTransitionTime"]).map(str::to_string),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_str_at() {
        let value = json!({ "status": { "phase": "Bound" } });
        assert_eq!(str_at(&value, &["status", "phase"]), Some("Bound"));
        assert_eq!(str_at(&value, &["status", "missing"]), None);
        assert_eq!(str_at(&value, &["missing", "phase"]), None);
        // Wrong type reads as absent
        let value = json!({ "status": { "phase": 3 } });
        assert_eq!(str_at(&value, &["status", "phase"]), None);
    }

    #[test]
    fn test_i64_at_accepts_floats() {
        let value = json!({ "desired": 2, "current": 1.0 });
        assert_eq!(i64_at(&value, &["desired"]), Some(2));
        assert_eq!(i64_at(&value, &["current"]), Some(1));
        assert_eq!(i64_at(&value, &["missing"]), None);
    }

    #[test]
    fn test_parse_conditions_skips_malformed() {
        let status = json!({
            "conditions": [
                { "type": "Ready", "status": "True", "reason": "DatasetReady" },
                "not-an-object",
                { "status": "False" },
            ]
        });
        let conditions = parse_conditions(&status);
        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions[0].condition_type, "Ready");
        assert_eq!(conditions[0].reason.as_deref(), Some("DatasetReady"));
        assert_eq!(conditions[1].condition_type, "");
        assert_eq!(conditions[1].status, "False");
    }

    #[test]
    fn test_parse_conditions_absent() {
        assert!(parse_conditions(&json!({})).is_empty());
        assert!(parse_conditions(&json!({ "conditions": "bogus" })).is_empty());
    }
}
