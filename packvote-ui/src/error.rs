//! Errors reported by the element tree.

use indextree::NodeId;

/// Failures of element-tree lookups and mutations.
///
/// Widgets treat most of these as soft failures: a page that lacks an
/// optional field simply doesn't get the widget.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UiError {
    /// No element carries the requested `id` attribute.
    #[error("no element with id `{id}`")]
    MissingElement {
        /// The id that was looked up.
        id: String,
    },
    /// The node handle does not belong to this document, or was removed.
    #[error("node {0} is not part of the document")]
    UnknownNode(NodeId),
    /// The reference node passed to an insertion is not a child of the parent.
    #[error("node {child} is not a child of {parent}")]
    NotAChild {
        /// The expected parent.
        parent: NodeId,
        /// The node that was expected to be its child.
        child: NodeId,
    },
    /// Another element already uses this id.
    #[error("duplicate element id `{id}`")]
    DuplicateId {
        /// The conflicting id.
        id: String,
    },
}
