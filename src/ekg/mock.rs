//! Built-in offline dataset, a miniature of the real backend's financial
//! event graph. Selected with `--mock`.

use serde_json::{Map, Value, json};

use super::types::{
    Edge, Entity, EntityDegree, EventPage, EventRecord, EvolutionLink, GraphSnapshot, GraphStats,
    Node, NodeGroup, Severity,
};

fn bag(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

fn entity(id: &str, label: &str, entity_type: &str) -> Node {
    Node {
        id: id.to_owned(),
        label: label.to_owned(),
        node_type: entity_type.to_owned(),
        group: NodeGroup::Entity,
        data: Map::new(),
    }
}

fn event(id: &str, label: &str, event_type: &str, data: Value) -> Node {
    Node {
        id: id.to_owned(),
        label: label.to_owned(),
        node_type: event_type.to_owned(),
        group: NodeGroup::Event,
        data: bag(data),
    }
}

fn edge(source: &str, target: &str, edge_type: &str, strength: Option<f32>) -> Edge {
    Edge {
        id: String::new(),
        source: source.to_owned(),
        target: target.to_owned(),
        edge_type: edge_type.to_owned(),
        strength,
        properties: Map::new(),
    }
}

pub(super) fn graph_snapshot() -> GraphSnapshot {
    let nodes = vec![
        entity("en-cs", "Credit Suisse", "bank"),
        entity("en-ubs", "UBS", "bank"),
        entity("en-finma", "FINMA", "regulator"),
        entity("en-archegos", "Archegos Capital", "investment_bank"),
        entity("en-svb", "Silicon Valley Bank", "bank"),
        event(
            "ev-greensill",
            "Greensill supply-chain funds suspended",
            "fund_suspension",
            json!({
                "date": "2021-03-01",
                "severity": "medium",
                "description": "Credit Suisse freezes $10bn of supply-chain finance funds.",
                "actors": ["Credit Suisse"],
                "targets": ["Greensill Capital"]
            }),
        ),
        event(
            "ev-archegos",
            "Archegos margin call and forced unwind",
            "liquidity_crisis",
            json!({
                "date": "2021-03-26",
                "severity": "high",
                "description": "Prime brokers liquidate concentrated swap positions at a loss.",
                "actors": ["Archegos Capital"],
                "targets": ["Credit Suisse", "Nomura"]
            }),
        ),
        event(
            "ev-finma-probe",
            "FINMA opens enforcement proceedings",
            "regulatory_action",
            json!({
                "date": "2021-04-22",
                "severity": "medium",
                "description": "Swiss regulator investigates risk management failures.",
                "actors": ["FINMA"],
                "targets": ["Credit Suisse"]
            }),
        ),
        event(
            "ev-svb-run",
            "Deposit run closes Silicon Valley Bank",
            "bank_failure",
            json!({
                "date": "2023-03-10",
                "severity": "high",
                "description": "Largest US bank failure since 2008 after a bond-loss disclosure.",
                "actors": ["Silicon Valley Bank"]
            }),
        ),
        event(
            "ev-cs-outflows",
            "Record client outflows at Credit Suisse",
            "liquidity_crisis",
            json!({
                "date": "2023-03-15",
                "severity": "high",
                "description": "Counterparties cut exposure as funding costs spike.",
                "actors": ["Credit Suisse"]
            }),
        ),
        event(
            "ev-ubs-rescue",
            "UBS agrees to acquire Credit Suisse",
            "merger",
            json!({
                "date": "2023-03-19",
                "severity": "medium",
                "description": "State-brokered takeover with loss guarantees.",
                "actors": ["UBS", "FINMA"],
                "targets": ["Credit Suisse"]
            }),
        ),
        event(
            "ev-at1-writedown",
            "AT1 bonds written down to zero",
            "default",
            json!({
                "date": "2023-03-19",
                "severity": "low",
                "description": "CHF 16bn of additional tier 1 capital wiped out.",
                "actors": ["FINMA"]
            }),
        ),
    ];

    let edges = vec![
        edge("ev-greensill", "en-cs", "involves", Some(0.9)),
        edge("ev-archegos", "en-archegos", "involves", Some(0.95)),
        edge("ev-archegos", "en-cs", "involves", Some(0.8)),
        edge("ev-finma-probe", "en-finma", "involves", Some(0.85)),
        edge("ev-finma-probe", "en-cs", "involves", Some(0.7)),
        edge("ev-svb-run", "en-svb", "involves", Some(0.95)),
        edge("ev-cs-outflows", "en-cs", "involves", Some(0.9)),
        edge("ev-ubs-rescue", "en-ubs", "involves", Some(0.9)),
        edge("ev-ubs-rescue", "en-cs", "involves", Some(0.85)),
        edge("ev-at1-writedown", "en-finma", "involves", Some(0.6)),
        edge("ev-greensill", "ev-archegos", "evolves_to", Some(0.55)),
        edge("ev-archegos", "ev-finma-probe", "evolves_to", Some(0.8)),
        edge("ev-svb-run", "ev-cs-outflows", "evolves_to", Some(0.7)),
        edge("ev-cs-outflows", "ev-ubs-rescue", "evolves_to", Some(0.9)),
        edge("ev-ubs-rescue", "ev-at1-writedown", "evolves_to", Some(0.75)),
        edge("en-cs", "en-ubs", "related_to", Some(0.5)),
    ];

    GraphSnapshot { nodes, edges }
}

fn all_events() -> Vec<EventRecord> {
    graph_snapshot()
        .nodes
        .iter()
        .filter(|node| node.is_event())
        .filter_map(|node| {
            let attrs = node.event_attrs()?;
            Some(EventRecord {
                event_id: node.id.clone(),
                label: node.label.clone(),
                event_type: node.node_type.clone(),
                date: attrs.date,
                severity: attrs.severity,
                description: attrs.description,
                actors: attrs.actors,
                targets: attrs.targets,
            })
        })
        .collect()
}

pub(super) fn events_page(offset: usize, limit: usize) -> EventPage {
    let events = all_events();
    let total = events.len();
    let data = events
        .into_iter()
        .skip(offset)
        .take(limit)
        .collect::<Vec<_>>();
    EventPage {
        data,
        total,
        offset,
        limit,
    }
}

pub(super) fn stats() -> GraphStats {
    let snapshot = graph_snapshot();
    let total_events = snapshot.nodes.iter().filter(|node| node.is_event()).count() as u64;
    let total_entities = snapshot.nodes.len() as u64 - total_events;
    let evolution_links = snapshot
        .edges
        .iter()
        .filter(|edge| edge.edge_type == "evolves_to")
        .count() as u64;

    GraphStats {
        total_events,
        total_entities,
        evolution_links,
        total_relationships: snapshot.edges.len() as u64,
        top_entities: vec![
            EntityDegree {
                label: "Credit Suisse".to_owned(),
                degree: 6,
            },
            EntityDegree {
                label: "FINMA".to_owned(),
                degree: 3,
            },
            EntityDegree {
                label: "UBS".to_owned(),
                degree: 2,
            },
        ],
    }
}

pub(super) fn entities() -> Vec<Entity> {
    graph_snapshot()
        .nodes
        .iter()
        .filter(|node| node.group == NodeGroup::Entity)
        .map(|node| Entity {
            entity_id: node.id.clone(),
            label: node.label.clone(),
            entity_type: node.node_type.clone(),
        })
        .collect()
}

pub(super) fn neighborhood(node_id: &str) -> GraphSnapshot {
    let full = graph_snapshot();
    let edges = full
        .edges
        .iter()
        .filter(|edge| edge.source == node_id || edge.target == node_id)
        .cloned()
        .collect::<Vec<_>>();
    let nodes = full
        .nodes
        .iter()
        .filter(|node| {
            node.id == node_id
                || edges
                    .iter()
                    .any(|edge| edge.source == node.id || edge.target == node.id)
        })
        .cloned()
        .collect();
    GraphSnapshot { nodes, edges }
}

pub(super) fn evolution_links(min_score: f32) -> Vec<EvolutionLink> {
    graph_snapshot()
        .edges
        .iter()
        .filter(|edge| edge.edge_type == "evolves_to")
        .filter_map(|edge| {
            let score = edge.strength.unwrap_or(0.0);
            (score >= min_score).then(|| EvolutionLink {
                from: edge.source.clone(),
                to: edge.target.clone(),
                score,
                link_type: edge.edge_type.clone(),
                temporal: None,
                entity_overlap: None,
                semantic: None,
                topic: None,
                causality: None,
                emotional: None,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_events_all_carry_dates() {
        for event in all_events() {
            assert!(!event.date.is_empty(), "{} has no date", event.event_id);
        }
    }

    #[test]
    fn events_page_slices_and_reports_total() {
        let page = events_page(2, 3);
        assert_eq!(page.data.len(), 3);
        assert_eq!(page.total, all_events().len());
        assert_eq!(page.offset, 2);
    }

    #[test]
    fn mock_severity_spread_covers_all_tiers() {
        let severities = all_events()
            .into_iter()
            .filter_map(|event| event.severity)
            .collect::<Vec<_>>();
        assert!(severities.contains(&Severity::High));
        assert!(severities.contains(&Severity::Medium));
        assert!(severities.contains(&Severity::Low));
    }

    #[test]
    fn neighborhood_is_limited_to_incident_edges() {
        let fragment = neighborhood("en-svb");
        assert!(fragment.nodes.iter().any(|node| node.id == "en-svb"));
        for edge in &fragment.edges {
            assert!(edge.source == "en-svb" || edge.target == "en-svb");
        }
    }
}
