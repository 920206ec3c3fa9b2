use serde::{Deserialize, Serialize};

use crate::shared_str::SharedStr;

/// A project's placement on a timeline: the half-open span `[start, end)`.
///
/// Timestamps are integer milliseconds. Callers are expected to supply
/// `end > start`; the engine does not enforce it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: SharedStr,
    pub timeline_id: SharedStr,
    #[serde(default)]
    pub project_id: SharedStr,
    pub start: i64,
    pub end: i64,
}

impl Attachment {
    pub fn duration(&self) -> i64 {
        self.end.saturating_sub(self.start)
    }

    /// Half-open overlap: touching spans do not overlap.
    pub fn overlaps(&self, other: &Attachment) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// How the two endpoints of a dependency are tied together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyType {
    #[default]
    #[serde(rename = "fs")]
    FinishToStart,
    #[serde(rename = "ss")]
    StartToStart,
    #[serde(rename = "ff")]
    FinishToFinish,
    #[serde(rename = "sf")]
    StartToFinish,
}

/// A directed edge `from -> to` between two attachments.
///
/// Endpoint ids default to empty when the host omits them; the validator
/// reports that as a missing endpoint instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    #[serde(default)]
    pub id: SharedStr,
    #[serde(default)]
    pub from_attachment_id: SharedStr,
    #[serde(default)]
    pub to_attachment_id: SharedStr,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<DependencyType>,
}

impl Dependency {
    pub fn new(
        id: impl Into<SharedStr>,
        from: impl Into<SharedStr>,
        to: impl Into<SharedStr>,
    ) -> Self {
        Self {
            id: id.into(),
            from_attachment_id: from.into(),
            to_attachment_id: to.into(),
            kind: None,
        }
    }

    pub fn with_kind(mut self, kind: DependencyType) -> Self {
        self.kind = Some(kind);
        self
    }

    /// The declared type, or finish-to-start when unspecified.
    pub fn kind(&self) -> DependencyType {
        self.kind.unwrap_or_default()
    }
}
