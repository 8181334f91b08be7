//! Outbound Ports (Driven Ports)
//!
//! The transport that carries Interests and reports arrivals. Arrivals and
//! expiries are delivered on whatever thread the transport uses.

use std::sync::Arc;

use ccn_01_interest_matching::{ContentObject, Interest};

use crate::error::TransportError;

/// Receives arrivals for an expressed Interest
pub trait ContentHandler: Send + Sync {
    /// `content` satisfied `interest`; the Interest is consumed
    fn handle_content(&self, content: &ContentObject, interest: &Interest);

    /// `interest` expired without an answer
    fn handle_timeout(&self, interest: &Interest);
}

/// Interest transport (Driven Port)
///
/// Implementations must not hold internal locks while calling back into a
/// handler; handlers may express or cancel Interests from the callback.
pub trait InterestTransport: Send + Sync + 'static {
    /// Send `interest`; `handler` is told about the answer or expiry
    fn express_interest(
        &self,
        interest: &Interest,
        handler: Arc<dyn ContentHandler>,
    ) -> Result<(), TransportError>;

    /// Withdraw an Interest expressed with `handler`; unknown Interests are ignored
    fn cancel_interest(&self, interest: &Interest, handler: &Arc<dyn ContentHandler>);
}
