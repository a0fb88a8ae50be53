use serde::Deserialize;
use serde_json::{Map, Value};

/// Discriminant separating persistent actors from dated occurrences and
/// flagged concerns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeGroup {
    Entity,
    Event,
    Risk,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub group: NodeGroup,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl Node {
    pub fn is_event(&self) -> bool {
        self.group == NodeGroup::Event
    }

    /// Projects the loose per-node attribute bag through the group
    /// discriminant. A malformed bag degrades to empty attributes rather
    /// than failing the whole snapshot.
    pub fn attrs(&self) -> NodeAttrs {
        let bag = Value::Object(self.data.clone());
        match self.group {
            NodeGroup::Entity => NodeAttrs::Entity(
                serde_json::from_value(bag).unwrap_or_default(),
            ),
            NodeGroup::Event | NodeGroup::Risk => NodeAttrs::Event(
                serde_json::from_value(bag).unwrap_or_default(),
            ),
        }
    }

    pub fn event_attrs(&self) -> Option<EventAttrs> {
        match self.attrs() {
            NodeAttrs::Event(attrs) => Some(attrs),
            NodeAttrs::Entity(_) => None,
        }
    }
}

/// Typed view over `Node::data`, keyed by the node group. Unknown fields
/// land in `extra` instead of being lost.
#[derive(Clone, Debug)]
pub enum NodeAttrs {
    Event(EventAttrs),
    Entity(EntityAttrs),
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct EventAttrs {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub actors: Vec<String>,
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct EntityAttrs {
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Edge {
    #[serde(default)]
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub edge_type: String,
    #[serde(default)]
    pub strength: Option<f32>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Edge {
    pub fn kind(&self) -> EdgeKind {
        EdgeKind::of(&self.edge_type)
    }
}

/// Styling/physics tier of an edge type. `evolves_to` outranks `involves`
/// outranks everything else.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeKind {
    EvolvesTo,
    Involves,
    Other,
}

impl EdgeKind {
    pub fn of(edge_type: &str) -> Self {
        match edge_type {
            "evolves_to" => Self::EvolvesTo,
            "involves" => Self::Involves,
            _ => Self::Other,
        }
    }
}

/// One fetched, immutable graph. Normalization guarantees every edge
/// references two known node ids.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct EventRecord {
    #[serde(rename = "eventId")]
    pub event_id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub actors: Vec<String>,
    #[serde(default)]
    pub targets: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EventPage {
    pub data: Vec<EventRecord>,
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    #[serde(default)]
    pub total_events: u64,
    #[serde(default)]
    pub total_entities: u64,
    #[serde(default)]
    pub evolution_links: u64,
    #[serde(default)]
    pub total_relationships: u64,
    #[serde(default)]
    pub top_entities: Vec<EntityDegree>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EntityDegree {
    pub label: String,
    pub degree: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Entity {
    #[serde(rename = "entityId")]
    pub entity_id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub entity_type: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EvolutionLink {
    pub from: String,
    pub to: String,
    pub score: f32,
    #[serde(rename = "type")]
    pub link_type: String,
    #[serde(default)]
    pub temporal: Option<f32>,
    #[serde(default)]
    pub entity_overlap: Option<f32>,
    #[serde(default)]
    pub semantic: Option<f32>,
    #[serde(default)]
    pub topic: Option<f32>,
    #[serde(default)]
    pub causality: Option<f32>,
    #[serde(default)]
    pub emotional: Option<f32>,
}
