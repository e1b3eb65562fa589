//! # Identifier Newtypes
//!
//! Distinct UUID-backed identifiers for documents, versions, workflows and
//! actors. Each serializes as its bare UUID string.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LexdocError;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Parse from a UUID string.
            pub fn parse(s: &str) -> Result<Self, LexdocError> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|e| LexdocError::Parse(format!("invalid {}: {e}", $prefix)))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}:{}", $prefix, self.0)
            }
        }
    };
}

uuid_id!(
    /// Identifier of a document (the aggregate root).
    DocumentId,
    "document"
);

uuid_id!(
    /// Identifier of one immutable version row.
    VersionId,
    "version"
);

uuid_id!(
    /// Identifier of an approval workflow.
    WorkflowId,
    "workflow"
);

uuid_id!(
    /// Identifier of a user acting on documents (editor, assignee, signer).
    ActorId,
    "actor"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_prefixed() {
        let id = DocumentId(Uuid::nil());
        assert_eq!(id.to_string(), "document:00000000-0000-0000-0000-000000000000");
    }

    #[test]
    fn serializes_as_bare_uuid() {
        let id = ActorId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.0));
        let back: ActorId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(WorkflowId::parse("not-a-uuid").is_err());
        let v = VersionId::new();
        assert_eq!(VersionId::parse(&v.0.to_string()).unwrap(), v);
    }

    #[test]
    fn fresh_ids_differ() {
        assert_ne!(DocumentId::new(), DocumentId::new());
    }
}
