use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IncidentStatus {
    Pending,
    Active,
    Resolved,
    Critical,
}

impl IncidentStatus {
    /// Wire spelling used by the classification service and the store.
    pub fn as_wire(&self) -> &'static str {
        match self {
            IncidentStatus::Pending => "PENDING",
            IncidentStatus::Active => "ACTIVE",
            IncidentStatus::Resolved => "RESOLVED",
            IncidentStatus::Critical => "CRITICAL",
        }
    }

    pub fn from_wire(value: &str) -> Option<IncidentStatus> {
        match value.to_uppercase().as_str() {
            "PENDING" => Some(IncidentStatus::Pending),
            "ACTIVE" => Some(IncidentStatus::Active),
            "RESOLVED" => Some(IncidentStatus::Resolved),
            "CRITICAL" => Some(IncidentStatus::Critical),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
    Catastrophic,
}

impl ImpactLevel {
    pub fn from_wire(value: &str) -> Option<ImpactLevel> {
        match value.to_lowercase().as_str() {
            "low" => Some(ImpactLevel::Low),
            "medium" => Some(ImpactLevel::Medium),
            "high" => Some(ImpactLevel::High),
            "catastrophic" => Some(ImpactLevel::Catastrophic),
            _ => None,
        }
    }
}

/// A finalized reported event. Built only by the intake controller;
/// immutable once handed to the store collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: String,
    #[serde(rename = "type")]
    pub incident_type: String,
    pub location: Option<String>,
    pub coordinates: Option<(f64, f64)>,
    pub status: IncidentStatus,
    pub impact_level: Option<ImpactLevel>,
    pub required_resources: Vec<String>,
    pub reporter: String,
    pub reported_at: String,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceStatus {
    Available,
    Deployed,
    Maintenance,
}

/// Resource lifecycle is owned by the management collaborator; intake only
/// consumes resource-type labels as free-text tags.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub name: String,
    pub category: String,
    pub status: ResourceStatus,
    pub location: String,
}
