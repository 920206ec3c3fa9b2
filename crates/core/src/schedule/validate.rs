//! Local checks for a proposed dependency, used for immediate UI feedback.
//!
//! This is a fast filter, not the last word on acyclicity: with no
//! `existing` edges the cycle step can only see the candidate itself.
//! [`critical_path`](super::critical_path) runs the authoritative full-graph
//! check and must still pass before an edge is persisted.

use std::collections::{HashMap, HashSet};

use chronolane_protocol::{Attachment, Dependency, DependencyType, SharedStr};
use serde::Serialize;
use thiserror::Error;

/// Why a dependency was refused. Expected outcome, not a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rejection {
    #[error("dependency is missing an endpoint")]
    MissingEndpoints,
    #[error("an attachment cannot depend on itself")]
    #[serde(rename = "self")]
    SelfLoop,
    #[error("dependency references an unknown attachment")]
    MissingAttachment,
    #[error("endpoints are on different timelines")]
    DifferentTimeline,
    #[error("target starts before its source")]
    TemporalOrder,
    #[error("dependency would close a cycle")]
    Cycle,
}

impl Rejection {
    /// Stable reason code surfaced to the host.
    pub fn reason(self) -> &'static str {
        match self {
            Rejection::MissingEndpoints => "missing-endpoints",
            Rejection::SelfLoop => "self",
            Rejection::MissingAttachment => "missing-attachment",
            Rejection::DifferentTimeline => "different-timeline",
            Rejection::TemporalOrder => "temporal-order",
            Rejection::Cycle => "cycle",
        }
    }
}

/// Check a single candidate edge with no knowledge of other edges.
pub fn validate_dependency(
    dep: &Dependency,
    attachments: &HashMap<SharedStr, Attachment>,
) -> Result<(), Rejection> {
    validate_dependency_against(dep, attachments, &[])
}

/// Check a candidate edge, walking `existing` edges for the cycle step.
///
/// Checks run in a fixed order and the first failure is reported:
/// missing ids, self loop, unknown attachment, timeline mismatch,
/// finish-to-start ordering, then reachability of the source from the target.
pub fn validate_dependency_against(
    dep: &Dependency,
    attachments: &HashMap<SharedStr, Attachment>,
    existing: &[Dependency],
) -> Result<(), Rejection> {
    let from = &dep.from_attachment_id;
    let to = &dep.to_attachment_id;

    if from.is_empty() || to.is_empty() {
        return Err(Rejection::MissingEndpoints);
    }
    if from == to {
        return Err(Rejection::SelfLoop);
    }

    let (Some(source), Some(target)) = (attachments.get(from), attachments.get(to)) else {
        return Err(Rejection::MissingAttachment);
    };

    if source.timeline_id != target.timeline_id {
        return Err(Rejection::DifferentTimeline);
    }

    if dep.kind() == DependencyType::FinishToStart && target.start < source.start {
        return Err(Rejection::TemporalOrder);
    }

    if reaches(to, from, existing, dep) {
        tracing::trace!(from = %from, to = %to, "candidate dependency closes a cycle");
        return Err(Rejection::Cycle);
    }

    Ok(())
}

/// Depth-first search from `start` looking for `goal` over `existing`
/// plus the candidate edge.
fn reaches(start: &str, goal: &str, existing: &[Dependency], candidate: &Dependency) -> bool {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in existing.iter().chain(std::iter::once(candidate)) {
        adjacency
            .entry(edge.from_attachment_id.as_str())
            .or_default()
            .push(edge.to_attachment_id.as_str());
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let mut stack = vec![start];
    while let Some(node) = stack.pop() {
        if node == goal {
            return true;
        }
        if !seen.insert(node) {
            continue;
        }
        if let Some(next) = adjacency.get(node) {
            stack.extend(next.iter().copied());
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn att(id: &str, timeline: &str, start: i64, end: i64) -> (SharedStr, Attachment) {
        (
            id.into(),
            Attachment {
                id: id.into(),
                timeline_id: timeline.into(),
                project_id: "p".into(),
                start,
                end,
            },
        )
    }

    fn fixture() -> HashMap<SharedStr, Attachment> {
        HashMap::from([
            att("a", "t1", 0, 10),
            att("b", "t1", 10, 20),
            att("c", "t1", 20, 30),
            att("x", "t2", 0, 10),
        ])
    }

    #[test]
    fn accepts_forward_edge() {
        assert_eq!(validate_dependency(&Dependency::new("d", "a", "b"), &fixture()), Ok(()));
    }

    #[test]
    fn missing_endpoint_reported_first() {
        let dep = Dependency::new("d", "", "");
        assert_eq!(validate_dependency(&dep, &fixture()), Err(Rejection::MissingEndpoints));
    }

    #[test]
    fn self_loop_rejected_even_for_unknown_ids() {
        for id in ["a", "nope"] {
            let dep = Dependency::new("d", id, id);
            assert_eq!(validate_dependency(&dep, &fixture()), Err(Rejection::SelfLoop));
        }
    }

    #[test]
    fn unknown_attachment() {
        let dep = Dependency::new("d", "a", "ghost");
        assert_eq!(validate_dependency(&dep, &fixture()), Err(Rejection::MissingAttachment));
    }

    #[test]
    fn timelines_must_match() {
        let dep = Dependency::new("d", "a", "x");
        assert_eq!(validate_dependency(&dep, &fixture()), Err(Rejection::DifferentTimeline));
    }

    #[test]
    fn finish_to_start_needs_forward_order() {
        let dep = Dependency::new("d", "b", "a");
        assert_eq!(validate_dependency(&dep, &fixture()), Err(Rejection::TemporalOrder));
    }

    #[test]
    fn other_types_skip_temporal_check() {
        let dep = Dependency::new("d", "b", "a").with_kind(DependencyType::FinishToFinish);
        assert_eq!(validate_dependency(&dep, &fixture()), Ok(()));
    }

    #[test]
    fn single_edge_check_cannot_see_cycles() {
        let dep = Dependency::new("d", "b", "a").with_kind(DependencyType::StartToStart);
        assert_eq!(validate_dependency(&dep, &fixture()), Ok(()));
    }

    #[test]
    fn existing_edges_expose_cycles() {
        let existing = [
            Dependency::new("e1", "a", "b").with_kind(DependencyType::StartToStart),
            Dependency::new("e2", "b", "c").with_kind(DependencyType::StartToStart),
        ];
        let closing = Dependency::new("d", "c", "a").with_kind(DependencyType::StartToStart);
        assert_eq!(
            validate_dependency_against(&closing, &fixture(), &existing),
            Err(Rejection::Cycle)
        );
    }

    #[test]
    fn reason_codes() {
        assert_eq!(Rejection::SelfLoop.reason(), "self");
        assert_eq!(Rejection::TemporalOrder.reason(), "temporal-order");
        let json = serde_json::to_string(&Rejection::MissingEndpoints).unwrap_or_default();
        assert_eq!(json, "\"missing-endpoints\"");
        let json = serde_json::to_string(&Rejection::SelfLoop).unwrap_or_default();
        assert_eq!(json, "\"self\"");
    }
}
