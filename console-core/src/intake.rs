use crate::classify::Classification;
use crate::incidents::{ImpactLevel, Incident, IncidentStatus};
use crate::roles::Operator;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Minimum narrative length before the classify trigger opens.
pub const MIN_NARRATIVE_LEN: usize = 20;

/// How long the submission acknowledgment stays up before the draft is
/// cleared. The caller owns the timer and must keep the submit trigger
/// disabled for the whole window.
pub const ACK_WINDOW: Duration = Duration::from_secs(3);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntakePhase {
    Drafting,
    Classifying,
    Reviewing,
    Submitted,
}

/// Operator-entered form fields, merged into the finalized incident.
/// Operator input always overrides classifier suggestions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftFields {
    pub incident_type: Option<String>,
    pub location: Option<String>,
    pub coordinates: Option<(f64, f64)>,
    pub impact_level: Option<ImpactLevel>,
    pub required_resources: Vec<String>,
}

/// Token handed out by `begin_classification`. Carries the generation so a
/// result arriving after the operator edited or abandoned the draft can be
/// told apart from a live one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassificationRequest {
    pub generation: u64,
    pub narrative: String,
}

/// State machine over a single in-progress report:
/// Drafting -> Classifying -> Reviewing -> Submitted, with re-entrant
/// Drafting when the operator edits the narrative after classification.
/// Owns the draft exclusively; finalized incidents leave by value.
pub struct IntakeController {
    phase: IntakePhase,
    narrative: String,
    fields: DraftFields,
    classification: Option<Classification>,
    generation: u64,
}

impl Default for IntakeController {
    fn default() -> Self {
        Self::new()
    }
}

impl IntakeController {
    pub fn new() -> Self {
        Self {
            phase: IntakePhase::Drafting,
            narrative: String::new(),
            fields: DraftFields::default(),
            classification: None,
            generation: 0,
        }
    }

    pub fn phase(&self) -> IntakePhase {
        self.phase
    }

    pub fn narrative(&self) -> &str {
        &self.narrative
    }

    pub fn fields(&self) -> &DraftFields {
        &self.fields
    }

    pub fn classification(&self) -> Option<&Classification> {
        self.classification.as_ref()
    }

    /// Replace the narrative text. Editing after classification drops the
    /// shown result and re-enters Drafting; editing while a classification
    /// is in flight invalidates its eventual result. No-op once Submitted.
    pub fn set_narrative(&mut self, text: &str) {
        match self.phase {
            IntakePhase::Drafting => {
                self.narrative = text.to_string();
            }
            IntakePhase::Classifying | IntakePhase::Reviewing => {
                self.narrative = text.to_string();
                self.classification = None;
                self.generation += 1;
                self.phase = IntakePhase::Drafting;
            }
            IntakePhase::Submitted => {}
        }
    }

    /// Update operator-entered fields. Allowed while Drafting or Reviewing;
    /// does not touch the classification.
    pub fn set_fields(&mut self, fields: DraftFields) {
        if matches!(self.phase, IntakePhase::Drafting | IntakePhase::Reviewing) {
            self.fields = fields;
        }
    }

    pub fn can_classify(&self) -> bool {
        self.phase == IntakePhase::Drafting && self.narrative.chars().count() >= MIN_NARRATIVE_LEN
    }

    pub fn can_submit(&self) -> bool {
        matches!(self.phase, IntakePhase::Drafting | IntakePhase::Reviewing)
    }

    /// Confirm-and-dispatch needs a classification to confirm.
    pub fn can_confirm(&self) -> bool {
        self.phase == IntakePhase::Reviewing && self.classification.is_some()
    }

    /// Move to Classifying and hand back the request to run. Returns None
    /// when the length gate fails or a request is already outstanding; a
    /// duplicate trigger is a no-op, not a queued retry.
    pub fn begin_classification(&mut self) -> Option<ClassificationRequest> {
        if !self.can_classify() {
            return None;
        }
        self.phase = IntakePhase::Classifying;
        Some(ClassificationRequest {
            generation: self.generation,
            narrative: self.narrative.clone(),
        })
    }

    /// Feed the adapter outcome back in. A stale generation (the operator
    /// edited or the draft was cleared while the call was in flight) is
    /// discarded silently. `None` is "classification unavailable", not an
    /// error: Reviewing is still entered, offering manual submission only.
    pub fn apply_classification(&mut self, generation: u64, result: Option<Classification>) {
        if generation != self.generation || self.phase != IntakePhase::Classifying {
            return;
        }
        self.classification = result;
        self.phase = IntakePhase::Reviewing;
    }

    /// Finalize using the classifier-suggested status/impact/resources,
    /// with operator-entered fields taking precedence where set.
    pub fn confirm_dispatch(&mut self, operator: &Operator) -> Option<Incident> {
        if !self.can_confirm() {
            return None;
        }
        let classification = self.classification.clone()?;

        let incident_type = self
            .fields
            .incident_type
            .clone()
            .unwrap_or(classification.disaster_type);
        let impact_level = self.fields.impact_level.or(Some(classification.impact_level));
        let required_resources = if self.fields.required_resources.is_empty() {
            classification.resource_requirements
        } else {
            self.fields.required_resources.clone()
        };

        Some(self.finalize(
            operator,
            incident_type,
            classification.suggested_status,
            impact_level,
            required_resources,
        ))
    }

    /// Finalize from operator-entered fields only; any classifier output is
    /// discarded. Always available while a draft is open, with or without a
    /// classification.
    pub fn submit_manual(&mut self, operator: &Operator) -> Option<Incident> {
        if !self.can_submit() {
            return None;
        }

        let incident_type = self
            .fields
            .incident_type
            .clone()
            .unwrap_or_else(|| "Unclassified".into());
        let impact_level = self.fields.impact_level;
        let required_resources = self.fields.required_resources.clone();

        Some(self.finalize(
            operator,
            incident_type,
            IncidentStatus::Pending,
            impact_level,
            required_resources,
        ))
    }

    /// Clear the draft once the acknowledgment window has elapsed,
    /// returning to a fresh Drafting state. No-op unless Submitted.
    pub fn acknowledge(&mut self) {
        if self.phase != IntakePhase::Submitted {
            return;
        }
        self.narrative.clear();
        self.fields = DraftFields::default();
        self.classification = None;
        self.generation += 1;
        self.phase = IntakePhase::Drafting;
    }

    fn finalize(
        &mut self,
        operator: &Operator,
        incident_type: String,
        status: IncidentStatus,
        impact_level: Option<ImpactLevel>,
        required_resources: Vec<String>,
    ) -> Incident {
        self.phase = IntakePhase::Submitted;
        Incident {
            id: new_incident_id(),
            incident_type,
            location: self.fields.location.clone(),
            coordinates: self.fields.coordinates,
            status,
            impact_level,
            required_resources,
            reporter: operator.name.clone(),
            reported_at: now_string(),
            description: self.narrative.clone(),
        }
    }
}

fn new_incident_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let Ok(duration) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return "INC-0".into();
    };
    format!("INC-{}", duration.as_nanos())
}

fn now_string() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let Ok(duration) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return "0".into();
    };
    duration.as_secs().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::parse_classification;
    use crate::roles::Role;

    const FLOOD_NARRATIVE: &str = "Flood depth 1m, 2 houses damaged, needs boat evacuation";

    fn officer() -> Operator {
        Operator {
            id: "op-1".into(),
            name: "Budi".into(),
            role: Role::FieldOfficer,
            avatar: "avatar-1".into(),
        }
    }

    fn flood_classification() -> Classification {
        parse_classification(
            r#"{"disasterType":"Flood","impactLevel":"High","suggestedStatus":"ACTIVE",
                "resourceRequirements":["Boat","Evacuation Team"],"priorityScore":7}"#,
        )
        .expect("classification")
    }

    #[test]
    fn short_narrative_keeps_classify_trigger_disabled() {
        let mut intake = IntakeController::new();
        intake.set_narrative("fire");
        assert!(!intake.can_classify());
        assert_eq!(intake.begin_classification(), None);
        assert_eq!(intake.phase(), IntakePhase::Drafting);
    }

    #[test]
    fn gate_opens_at_twenty_characters() {
        let mut intake = IntakeController::new();
        intake.set_narrative(&"x".repeat(19));
        assert!(!intake.can_classify());
        intake.set_narrative(&"x".repeat(20));
        assert!(intake.can_classify());
    }

    #[test]
    fn duplicate_classify_trigger_is_suppressed() {
        let mut intake = IntakeController::new();
        intake.set_narrative(FLOOD_NARRATIVE);

        let first = intake.begin_classification().expect("first trigger");
        assert_eq!(first.narrative, FLOOD_NARRATIVE);
        assert_eq!(intake.phase(), IntakePhase::Classifying);
        assert_eq!(intake.begin_classification(), None);
    }

    #[test]
    fn reviewing_exposes_classifier_fields_unmodified() {
        let mut intake = IntakeController::new();
        intake.set_narrative(FLOOD_NARRATIVE);
        let request = intake.begin_classification().expect("trigger");

        intake.apply_classification(request.generation, Some(flood_classification()));
        assert_eq!(intake.phase(), IntakePhase::Reviewing);

        let shown = intake.classification().expect("classification");
        assert_eq!(shown.impact_level, ImpactLevel::High);
        assert_eq!(shown.priority_score, Some(7.0));
        assert_eq!(
            shown.resource_requirements,
            vec!["Boat".to_string(), "Evacuation Team".to_string()]
        );
    }

    #[test]
    fn confirm_dispatch_merges_classifier_suggestions() {
        let mut intake = IntakeController::new();
        intake.set_narrative(FLOOD_NARRATIVE);
        let request = intake.begin_classification().expect("trigger");
        intake.apply_classification(request.generation, Some(flood_classification()));

        let incident = intake.confirm_dispatch(&officer()).expect("incident");
        assert!(!incident.id.is_empty());
        assert_eq!(incident.status, IncidentStatus::Active);
        assert_eq!(incident.impact_level, Some(ImpactLevel::High));
        assert_eq!(
            incident.required_resources,
            vec!["Boat".to_string(), "Evacuation Team".to_string()]
        );
        assert_eq!(incident.incident_type, "Flood");
        assert_eq!(incident.reporter, "Budi");
        assert_eq!(incident.description, FLOOD_NARRATIVE);
        assert!(!incident.reported_at.is_empty());
        assert_eq!(intake.phase(), IntakePhase::Submitted);
    }

    #[test]
    fn operator_fields_override_classifier_on_confirm() {
        let mut intake = IntakeController::new();
        intake.set_narrative(FLOOD_NARRATIVE);
        let request = intake.begin_classification().expect("trigger");
        intake.apply_classification(request.generation, Some(flood_classification()));

        intake.set_fields(DraftFields {
            incident_type: Some("Flash Flood".into()),
            location: Some("Riverside district".into()),
            impact_level: Some(ImpactLevel::Catastrophic),
            ..DraftFields::default()
        });

        let incident = intake.confirm_dispatch(&officer()).expect("incident");
        assert_eq!(incident.incident_type, "Flash Flood");
        assert_eq!(incident.location.as_deref(), Some("Riverside district"));
        assert_eq!(incident.impact_level, Some(ImpactLevel::Catastrophic));
        // Resources not overridden, so the classifier's list carries over.
        assert_eq!(incident.required_resources.len(), 2);
    }

    #[test]
    fn null_classification_leaves_only_manual_path() {
        let mut intake = IntakeController::new();
        intake.set_narrative(FLOOD_NARRATIVE);
        let request = intake.begin_classification().expect("trigger");

        intake.apply_classification(request.generation, None);
        assert_eq!(intake.phase(), IntakePhase::Reviewing);
        assert!(!intake.can_confirm());
        assert_eq!(intake.confirm_dispatch(&officer()), None);

        let incident = intake.submit_manual(&officer()).expect("manual incident");
        assert_eq!(incident.status, IncidentStatus::Pending);
        assert_eq!(incident.impact_level, None);
        assert!(incident.required_resources.is_empty());
    }

    #[test]
    fn manual_submit_uses_operator_fields_only() {
        let mut intake = IntakeController::new();
        intake.set_narrative("Power lines down across the main road");
        intake.set_fields(DraftFields {
            incident_type: Some("Infrastructure".into()),
            impact_level: Some(ImpactLevel::Medium),
            required_resources: vec!["Repair Crew".into()],
            ..DraftFields::default()
        });

        let incident = intake.submit_manual(&officer()).expect("incident");
        assert_eq!(incident.incident_type, "Infrastructure");
        assert_eq!(incident.status, IncidentStatus::Pending);
        assert_eq!(incident.impact_level, Some(ImpactLevel::Medium));
        assert_eq!(incident.required_resources, vec!["Repair Crew".to_string()]);
    }

    #[test]
    fn editing_after_classification_reenters_drafting() {
        let mut intake = IntakeController::new();
        intake.set_narrative(FLOOD_NARRATIVE);
        let request = intake.begin_classification().expect("trigger");
        intake.apply_classification(request.generation, Some(flood_classification()));

        intake.set_narrative("Flood has receded, only one house affected now");
        assert_eq!(intake.phase(), IntakePhase::Drafting);
        assert!(intake.classification().is_none());
    }

    #[test]
    fn stale_result_after_edit_is_discarded() {
        let mut intake = IntakeController::new();
        intake.set_narrative(FLOOD_NARRATIVE);
        let request = intake.begin_classification().expect("trigger");

        // Operator edits while the call is in flight.
        intake.set_narrative("Completely different situation, landslide on hill road");
        assert_eq!(intake.phase(), IntakePhase::Drafting);

        intake.apply_classification(request.generation, Some(flood_classification()));
        assert_eq!(intake.phase(), IntakePhase::Drafting);
        assert!(intake.classification().is_none());
    }

    #[test]
    fn stale_result_after_acknowledged_submit_is_discarded() {
        let mut intake = IntakeController::new();
        intake.set_narrative(FLOOD_NARRATIVE);
        let request = intake.begin_classification().expect("trigger");
        intake.apply_classification(request.generation, None);
        intake.submit_manual(&officer()).expect("incident");
        intake.acknowledge();

        // Late result from the abandoned draft must not touch the new one.
        intake.apply_classification(request.generation, Some(flood_classification()));
        assert_eq!(intake.phase(), IntakePhase::Drafting);
        assert!(intake.classification().is_none());
    }

    #[test]
    fn submitted_state_suppresses_resubmission_until_acknowledged() {
        let mut intake = IntakeController::new();
        intake.set_narrative(FLOOD_NARRATIVE);
        intake.submit_manual(&officer()).expect("incident");

        assert_eq!(intake.phase(), IntakePhase::Submitted);
        assert!(!intake.can_submit());
        assert_eq!(intake.submit_manual(&officer()), None);
        assert_eq!(intake.begin_classification(), None);

        // The draft survives until the acknowledgment window elapses.
        assert_eq!(intake.narrative(), FLOOD_NARRATIVE);

        intake.acknowledge();
        assert_eq!(intake.phase(), IntakePhase::Drafting);
        assert!(intake.narrative().is_empty());
        assert!(intake.classification().is_none());
        assert_eq!(intake.fields(), &DraftFields::default());
    }

    #[test]
    fn acknowledge_outside_submitted_is_a_noop() {
        let mut intake = IntakeController::new();
        intake.set_narrative(FLOOD_NARRATIVE);
        intake.acknowledge();
        assert_eq!(intake.narrative(), FLOOD_NARRATIVE);
        assert_eq!(intake.phase(), IntakePhase::Drafting);
    }
}
