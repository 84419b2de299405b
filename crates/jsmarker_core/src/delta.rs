//! Build triggers, change deltas and build requests.

use serde::{Deserialize, Serialize};

use crate::resource::Resource;

/// What happened to a resource since the last pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Removed,
    Changed,
}

/// One node of a change delta.
///
/// A container event may carry the events of its members in `children`, so a
/// delta is a forest walked depth-first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub resource: Resource,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ChangeEvent>,
}

impl ChangeEvent {
    pub fn new(kind: ChangeKind, resource: Resource) -> Self {
        Self {
            kind,
            resource,
            children: Vec::new(),
        }
    }

    pub fn added(resource: Resource) -> Self {
        Self::new(ChangeKind::Added, resource)
    }

    pub fn removed(resource: Resource) -> Self {
        Self::new(ChangeKind::Removed, resource)
    }

    pub fn changed(resource: Resource) -> Self {
        Self::new(ChangeKind::Changed, resource)
    }

    pub fn with_children(mut self, children: Vec<ChangeEvent>) -> Self {
        self.children = children;
        self
    }

    /// Visits this event and all nested events in pre-order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a ChangeEvent)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// Kind of build the host asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildKind {
    Full,
    Incremental,
    /// Triggered by the host's auto-build; handled like `Incremental`.
    Auto,
}

/// A build trigger as supplied by the host build framework.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTrigger {
    pub kind: BuildKind,
    /// `None` when the host has no change history (e.g. first build after a restart).
    pub delta: Option<Vec<ChangeEvent>>,
}

impl BuildTrigger {
    pub fn full() -> Self {
        Self {
            kind: BuildKind::Full,
            delta: None,
        }
    }

    pub fn incremental(delta: Option<Vec<ChangeEvent>>) -> Self {
        Self {
            kind: BuildKind::Incremental,
            delta,
        }
    }

    pub fn auto(delta: Option<Vec<ChangeEvent>>) -> Self {
        Self {
            kind: BuildKind::Auto,
            delta,
        }
    }
}

/// Strategy label of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Full,
    Incremental,
}

/// The immutable request a pass works from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildRequest {
    Full,
    Incremental(Vec<ChangeEvent>),
}

impl BuildRequest {
    /// Forms the request for a trigger.
    ///
    /// A full trigger, or any trigger without delta, becomes [`BuildRequest::Full`]:
    /// without change history an incremental pass cannot be trusted.
    pub fn from_trigger(trigger: &BuildTrigger) -> Self {
        match (trigger.kind, &trigger.delta) {
            (BuildKind::Full, _) | (_, None) => BuildRequest::Full,
            (BuildKind::Incremental | BuildKind::Auto, Some(delta)) => {
                BuildRequest::Incremental(delta.clone())
            }
        }
    }

    pub fn mode(&self) -> BuildMode {
        match self {
            BuildRequest::Full => BuildMode::Full,
            BuildRequest::Incremental(_) => BuildMode::Incremental,
        }
    }
}
