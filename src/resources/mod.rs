//! Idempotent resource primitives (check + apply pattern).
pub mod download;
pub mod helpers;
pub mod link;

use anyhow::Result;

/// Minimal interface for resources that can be described and applied.
pub trait Applicable {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Apply the resource change.
    ///
    /// This method should:
    /// - Create parent directories if needed
    /// - Update the resource to match the desired state
    /// - Return the appropriate `ResourceChange` result
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be applied due to I/O failures,
    /// permission issues, failed downloads, or other system errors.
    fn apply(&self) -> Result<ResourceChange>;
}

/// State of a resource (link, downloaded executable, etc.).
///
/// # Examples
///
/// ```
/// use appstrap::resources::ResourceState;
///
/// let missing = ResourceState::Missing;
/// let correct = ResourceState::Correct;
/// let skip = ResourceState::Invalid { reason: "source missing".into() };
///
/// assert_ne!(missing, correct);
/// assert_ne!(skip, correct);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Resource does not exist or is not present.
    Missing,
    /// Resource exists and matches the desired state.
    Correct,
    /// Resource exists but does not match the desired state.
    Incorrect {
        /// The current value of the resource.
        current: String,
    },
    /// Resource cannot be applied (e.g. the file a link would point to is absent).
    Invalid {
        /// Reason why the resource cannot be applied.
        reason: String,
    },
}

/// Result of applying a resource change.
///
/// # Examples
///
/// ```
/// use appstrap::resources::ResourceChange;
///
/// let applied = ResourceChange::Applied;
/// let noop = ResourceChange::AlreadyCorrect;
/// let skipped = ResourceChange::Skipped { reason: "source missing".into() };
///
/// assert_eq!(applied, ResourceChange::Applied);
/// assert_ne!(applied, noop);
/// assert_ne!(noop, skipped);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// Resource was created or updated.
    Applied,
    /// Resource was already correct (no change needed).
    AlreadyCorrect,
    /// Resource was skipped (e.g. missing source file).
    Skipped {
        /// Reason why the resource was skipped.
        reason: String,
    },
}

/// A resource whose state can be inspected before it is applied.
///
/// `apply` implementations consult [`Resource::current_state`] first, so
/// applying an already-correct resource changes nothing.
pub trait Resource: Applicable {
    /// Check the current state of the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource state cannot be determined due to I/O
    /// failures or permission issues.
    fn current_state(&self) -> Result<ResourceState>;
}
