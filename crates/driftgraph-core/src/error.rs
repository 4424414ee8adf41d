use std::fmt;

/// Machine-readable error codes for callers that map engine failures onto
/// their own surface (HTTP status, CLI exit, JSON error body).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    SnapshotParseError,
    NodeNotFound,
    RelationshipNotFound,
    CyclicDependency,
    InvalidPath,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::SnapshotParseError => "E1002",
            Self::NodeNotFound => "E2001",
            Self::RelationshipNotFound => "E2002",
            Self::CyclicDependency => "E2003",
            Self::InvalidPath => "E2004",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::SnapshotParseError => "Graph snapshot parse error",
            Self::NodeNotFound => "Node not found",
            Self::RelationshipNotFound => "Relationship not found",
            Self::CyclicDependency => "Cyclic dependency",
            Self::InvalidPath => "No path between nodes",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .driftgraph/config.toml and retry."),
            Self::SnapshotParseError => {
                Some("The snapshot must be a JSON object with `nodes` and `relationships` arrays.")
            }
            Self::NodeNotFound => Some("Check the node id; ids are case-sensitive."),
            Self::RelationshipNotFound => None,
            Self::CyclicDependency => Some("Remove a DEPENDS_ON edge to break the cycle."),
            Self::InvalidPath => Some("The nodes are in disconnected parts of the graph."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Failures returned by graph store mutations and path queries.
///
/// Bounded traversals (`find_impact_radius`, `find_dependencies`,
/// `find_dependents`) never return these; an unknown start node yields an
/// empty result instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A relationship endpoint or a path endpoint is not in the store.
    #[error("node not found: {id}")]
    NodeNotFound { id: String },

    /// Reserved for strict-mode relationship lookups.
    #[error("relationship not found: {id}")]
    RelationshipNotFound { id: String },

    /// Reserved for strict-mode dependency insertion.
    #[error("cyclic dependency: {}", path.join(" -> "))]
    CyclicDependency { path: Vec<String> },

    /// Both nodes exist but no route connects them.
    #[error("no path from {from} to {to}")]
    InvalidPath { from: String, to: String },
}

impl GraphError {
    pub(crate) fn node_not_found(id: &str) -> Self {
        Self::NodeNotFound { id: id.to_string() }
    }

    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NodeNotFound { .. } => ErrorCode::NodeNotFound,
            Self::RelationshipNotFound { .. } => ErrorCode::RelationshipNotFound,
            Self::CyclicDependency { .. } => ErrorCode::CyclicDependency,
            Self::InvalidPath { .. } => ErrorCode::InvalidPath,
        }
    }

    /// Optional remediation hint for operators.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}

pub type Result<T, E = GraphError> = std::result::Result<T, E>;
