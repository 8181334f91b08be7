//! Inbound Ports (Driving Ports)
//!
//! The registry API and the listener callback owners supply to it.

use std::sync::Arc;

use ccn_01_interest_matching::{ContentObject, Interest, Name};

use crate::domain::VersionNumber;
use crate::error::{ListenerError, VersioningError};

/// Receives each newly discovered version
///
/// Called inline on the delivery thread, one listener after another. A
/// listener must return quickly. Errors are logged and do not affect other
/// listeners.
pub trait ContentListener: Send + Sync {
    fn on_content(&self, content: &ContentObject, interest: &Interest) -> Result<(), ListenerError>;
}

impl<F> ContentListener for F
where
    F: Fn(&ContentObject, &Interest) -> Result<(), ListenerError> + Send + Sync,
{
    fn on_content(&self, content: &ContentObject, interest: &Interest) -> Result<(), ListenerError> {
        self(content, interest)
    }
}

/// Listener handle; identity is the allocation it points to
pub type SharedListener = Arc<dyn ContentListener>;

/// True if both handles point to the same listener
pub fn same_listener(a: &SharedListener, b: &SharedListener) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Versioned retrieval API (Driving Port)
pub trait VersioningApi: Send + Sync {
    /// Register `listener` for every version published under `name`
    fn express_interest(&self, name: &Name, listener: SharedListener) -> Result<(), VersioningError>;

    /// As `express_interest`, seeding a new registration with known versions
    /// and a floor below which versions are never delivered
    ///
    /// Both are ignored when `name` is already registered.
    fn express_interest_excluding(
        &self,
        name: &Name,
        listener: SharedListener,
        exclusions: &[VersionNumber],
        starting_version: Option<VersionNumber>,
    ) -> Result<(), VersioningError>;

    /// Remove `listener`; the last listener for a name stops its retrieval
    fn cancel_interest(&self, name: &Name, listener: &SharedListener) -> bool;

    /// Stop every retrieval
    fn close(&self);
}
