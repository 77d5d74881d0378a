use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status shared by steps and variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Status {
    Running,
    Paused,
    Winner,
    Launched,
    #[default]
    Backlog,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Running => "Running",
            Status::Paused => "Paused",
            Status::Winner => "Winner",
            Status::Launched => "Launched",
            Status::Backlog => "Backlog",
        };
        f.write_str(name)
    }
}

/// Opaque identifier of a visual object materialized by a host adapter.
///
/// The core only stores and copies these; it never generates or inspects them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalRef(String);

impl ExternalRef {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stage in the experiment funnel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub kpi: Option<String>,
    pub status: Status,
    /// Owned variants in display order.
    pub variant_ids: Vec<String>,
    #[serde(default)]
    pub external_ref: Option<ExternalRef>,
}

impl Step {
    pub(crate) fn new(id: String, title: String, status: Status) -> Self {
        Self {
            id,
            title,
            description: None,
            kpi: None,
            status,
            variant_ids: Vec::new(),
            external_ref: None,
        }
    }

    pub fn contains_variant(&self, variant_id: &str) -> bool {
        self.variant_ids.iter().any(|id| id == variant_id)
    }
}

/// One treatment tested within a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: String,
    pub title: String,
    pub traffic_percent: f64,
    pub status: Status,
    pub winner: bool,
    pub launched: bool,
    #[serde(default)]
    pub external_ref: Option<ExternalRef>,
}

impl Variant {
    pub(crate) fn new(id: String, title: String, traffic_percent: f64, status: Status) -> Self {
        Self {
            id,
            title,
            traffic_percent,
            status,
            winner: false,
            launched: false,
            external_ref: None,
        }
    }

    /// Control variants are recognized by title alone, ignoring case.
    pub fn is_control(&self) -> bool {
        self.title.eq_ignore_ascii_case("control")
    }
}

/// Directed link: traffic leaving `from_variant_id` continues into `to_step_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub from_variant_id: String,
    pub to_step_id: String,
    #[serde(default)]
    pub external_ref: Option<ExternalRef>,
}

impl Edge {
    pub fn connects(&self, from_variant_id: &str, to_step_id: &str) -> bool {
        self.from_variant_id == from_variant_id && self.to_step_id == to_step_id
    }
}

/// Addresses one entity of a flow by kind and id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id")]
pub enum EntityRef {
    Step(String),
    Variant(String),
    Edge(String),
}

impl EntityRef {
    pub fn id(&self) -> &str {
        match self {
            EntityRef::Step(id) | EntityRef::Variant(id) | EntityRef::Edge(id) => id,
        }
    }

    pub fn kind(&self) -> crate::error::EntityKind {
        use crate::error::EntityKind;
        match self {
            EntityRef::Step(_) => EntityKind::Step,
            EntityRef::Variant(_) => EntityKind::Variant,
            EntityRef::Edge(_) => EntityKind::Edge,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind(), self.id())
    }
}
