use crate::incidents::{ImpactLevel, IncidentStatus};
use futures::executor::block_on;
use report_schema::{classification_schema_json, parse_classification_v1};
use rig::client::{completion::CompletionClient, ProviderClient};
use rig::completion::Prompt;
use rig::providers::openai;
use serde::{Deserialize, Serialize};
use std::future::IntoFuture;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub provider: String,
    pub model: String,
    pub api_key_env: String,
    pub temperature: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            provider: "openai".into(),
            model: "gpt-4o-mini".into(),
            api_key_env: "OPENAI_API_KEY".into(),
            temperature: 0.2,
        }
    }
}

impl ClassifierConfig {
    /// None when the API key is absent: intake then runs manual-only.
    pub fn from_env() -> Option<ClassifierConfig> {
        let api_key_env =
            std::env::var("CLASSIFIER_API_KEY_ENV").unwrap_or_else(|_| "OPENAI_API_KEY".into());
        if std::env::var(&api_key_env).is_err() {
            return None;
        }

        Some(ClassifierConfig {
            provider: std::env::var("CLASSIFIER_PROVIDER").unwrap_or_else(|_| "openai".into()),
            model: std::env::var("CLASSIFIER_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into()),
            api_key_env,
            temperature: std::env::var("CLASSIFIER_TEMPERATURE")
                .ok()
                .and_then(|v| v.parse::<f64>().ok())
                .unwrap_or(0.2),
        })
    }
}

/// Typed classifier output, produced only from a schema-valid payload.
/// Pre-populates an incident draft; the operator can still override
/// everything before finalization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub disaster_type: String,
    pub impact_level: ImpactLevel,
    pub suggested_status: IncidentStatus,
    pub resource_requirements: Vec<String>,
    pub priority_score: Option<f64>,
}

/// One outbound request per invocation; no retries, no caching. Every
/// failure mode (transport, malformed JSON, schema deviation) collapses to
/// `None` — "classification unavailable", never a propagating fault.
pub fn analyze_report(config: &ClassifierConfig, narrative: &str) -> Option<Classification> {
    let schema = classification_schema_json().ok()?;
    let prompt = format!(
        "Analyze the following disaster field report and return JSON only, \
         conforming to this schema:\n{schema}\nReport: \"{narrative}\""
    );

    let raw = run_prompt(config, "You are a disaster-report classifier.", &prompt).ok()?;
    parse_classification(&raw).ok()
}

pub fn parse_classification(raw: &str) -> Result<Classification, String> {
    let payload: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| format!("invalid classification json: {e}"))?;
    let wire = parse_classification_v1(&payload)?;

    let impact_level = ImpactLevel::from_wire(&wire.impact_level)
        .ok_or_else(|| format!("invalid impactLevel '{}'", wire.impact_level))?;
    let suggested_status = IncidentStatus::from_wire(&wire.suggested_status)
        .ok_or_else(|| format!("invalid suggestedStatus '{}'", wire.suggested_status))?;
    if suggested_status == IncidentStatus::Resolved {
        return Err("suggestedStatus RESOLVED is not a classification outcome".into());
    }

    Ok(Classification {
        disaster_type: wire.disaster_type,
        impact_level,
        suggested_status,
        resource_requirements: wire.resource_requirements,
        priority_score: wire.priority_score,
    })
}

fn run_prompt(config: &ClassifierConfig, preamble: &str, prompt: &str) -> Result<String, String> {
    if config.provider.to_lowercase() != "openai" {
        return Err(format!("unsupported classifier provider '{}'", config.provider));
    }

    let client = if config.api_key_env == "OPENAI_API_KEY" {
        openai::Client::from_env()
    } else {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| format!("missing env var {}", config.api_key_env))?;
        openai::Client::new(&api_key).map_err(|e| format!("openai client error: {e}"))?
    };

    let agent = client
        .agent(&config.model)
        .preamble(preamble)
        .temperature(config.temperature)
        .build();

    let fut = agent.prompt(prompt).into_future();
    let out: Result<String, _> = block_on(fut);
    out.map_err(|e| format!("classification prompt failed: {e}"))
}
