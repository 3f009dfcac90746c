use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Administrator,
    FieldOfficer,
    Monitoring,
}

pub const ALL_ROLES: [Role; 3] = [Role::Administrator, Role::FieldOfficer, Role::Monitoring];

/// Logical console views, addressed by stable identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Dashboard,
    Map,
    Management,
    Intake,
}

pub const ALL_VIEWS: [View; 4] = [View::Dashboard, View::Map, View::Management, View::Intake];

impl View {
    pub fn identifier(&self) -> &'static str {
        match self {
            View::Dashboard => "dashboard",
            View::Map => "map",
            View::Management => "management",
            View::Intake => "intake",
        }
    }

    pub fn from_identifier(value: &str) -> Option<View> {
        ALL_VIEWS
            .iter()
            .copied()
            .find(|view| view.identifier() == value.to_lowercase())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    ViewDashboard,
    ViewMap,
    ManageResources,
    SubmitReport,
}

/// Identity payload supplied by the external identity collaborator at
/// session start. The role is trusted as-is; no verification happens here.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Operator {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub avatar: String,
}

pub fn reachable_views(role: Role) -> &'static [View] {
    match role {
        Role::Administrator => &[View::Dashboard, View::Map, View::Management],
        Role::Monitoring => &[View::Dashboard, View::Map],
        Role::FieldOfficer => &[View::Intake],
    }
}

pub fn capabilities_for(role: Role) -> Vec<Capability> {
    reachable_views(role)
        .iter()
        .map(|view| match view {
            View::Dashboard => Capability::ViewDashboard,
            View::Map => Capability::ViewMap,
            View::Management => Capability::ManageResources,
            View::Intake => Capability::SubmitReport,
        })
        .collect()
}

pub fn default_view(role: Role) -> View {
    match role {
        Role::Administrator | Role::Monitoring => View::Dashboard,
        Role::FieldOfficer => View::Intake,
    }
}

pub fn is_reachable(role: Role, view: View) -> bool {
    reachable_views(role).contains(&view)
}

/// Navigation resolution: an unauthorized view request is a silent
/// redirect to the role's default view, never an error.
pub fn resolve_view(role: Role, requested: View) -> View {
    if is_reachable(role, requested) {
        requested
    } else {
        default_view(role)
    }
}
