use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const IMPACT_LEVELS: [&str; 4] = ["Low", "Medium", "High", "Catastrophic"];
pub const SUGGESTED_STATUSES: [&str; 3] = ["PENDING", "ACTIVE", "CRITICAL"];

/// Classification service response contract. The service is untrusted:
/// every payload goes through `parse_classification_v1` before use.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationV1 {
    pub disaster_type: String,
    pub impact_level: String,
    pub suggested_status: String,
    pub resource_requirements: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_score: Option<f64>,
}

/// JSON schema of the expected response, embedded in the classifier prompt.
pub fn classification_schema_json() -> Result<String, String> {
    let schema = schemars::schema_for!(ClassificationV1);
    serde_json::to_string(&schema).map_err(|e| e.to_string())
}

pub fn validate_classification_v1(c: &ClassificationV1) -> Result<(), String> {
    if c.disaster_type.trim().is_empty() {
        return Err("disasterType is required".into());
    }
    canonical_impact_level(&c.impact_level)?;
    canonical_suggested_status(&c.suggested_status)?;
    if let Some(score) = c.priority_score {
        if !(1.0..=10.0).contains(&score) {
            return Err(format!("priorityScore {score} outside 1-10"));
        }
    }
    Ok(())
}

/// Coerce a raw service payload into a validated `ClassificationV1`.
/// Any missing required field, wrong type, or enum deviation is an error;
/// callers map that to "classification unavailable", never a partial result.
pub fn parse_classification_v1(payload: &serde_json::Value) -> Result<ClassificationV1, String> {
    let disaster_type = required_string(payload, "disasterType")?;
    let impact_level = canonical_impact_level(&required_string(payload, "impactLevel")?)?;
    let suggested_status =
        canonical_suggested_status(&required_string(payload, "suggestedStatus")?)?;

    let requirements = payload
        .get("resourceRequirements")
        .and_then(serde_json::Value::as_array)
        .ok_or("resourceRequirements must be an array")?;
    let mut resource_requirements = Vec::with_capacity(requirements.len());
    for item in requirements {
        let Some(tag) = item.as_str() else {
            return Err("resourceRequirements entries must be strings".into());
        };
        resource_requirements.push(tag.to_string());
    }

    let priority_score = match payload.get("priorityScore") {
        None | Some(serde_json::Value::Null) => None,
        Some(v) => Some(v.as_f64().ok_or("priorityScore must be a number")?),
    };

    let classification = ClassificationV1 {
        disaster_type,
        impact_level,
        suggested_status,
        resource_requirements,
        priority_score,
    };
    validate_classification_v1(&classification)?;
    Ok(classification)
}

fn required_string(payload: &serde_json::Value, key: &str) -> Result<String, String> {
    payload
        .get(key)
        .and_then(serde_json::Value::as_str)
        .map(ToString::to_string)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| format!("{key} is required"))
}

fn canonical_impact_level(value: &str) -> Result<String, String> {
    IMPACT_LEVELS
        .iter()
        .find(|level| level.eq_ignore_ascii_case(value))
        .map(|level| level.to_string())
        .ok_or_else(|| format!("invalid impactLevel '{value}'"))
}

fn canonical_suggested_status(value: &str) -> Result<String, String> {
    // RESOLVED is deliberately absent: classification only proposes
    // initial or escalating statuses.
    SUGGESTED_STATUSES
        .iter()
        .find(|status| status.eq_ignore_ascii_case(value))
        .map(|status| status.to_string())
        .ok_or_else(|| format!("invalid suggestedStatus '{value}'"))
}
