//! In-memory Interest transport
//!
//! A content store plus a pending Interest table, driven by the matching
//! predicate. Everything is delivered synchronously on the calling thread
//! and no lock is held during callbacks.
//!
//! It is available with the `test-utils` feature flag.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use ccn_01_interest_matching::{
    ContentObject, ExactKeyTrustManager, Interest, InterestMatcher, InterestMatchingApi,
};
use parking_lot::Mutex;
use tracing::trace;

use crate::error::TransportError;
use crate::ports::{ContentHandler, InterestTransport};

struct PendingInterest {
    interest: Interest,
    handler: Arc<dyn ContentHandler>,
}

#[derive(Default)]
struct TransportState {
    store: Vec<ContentObject>,
    pending: Vec<PendingInterest>,
}

/// Loopback transport for tests
#[derive(Default)]
pub struct InMemoryTransport {
    matcher: InterestMatcher<ExactKeyTrustManager>,
    state: Mutex<TransportState>,
    fail_next: AtomicUsize,
    expressed: AtomicU64,
    cancelled: AtomicU64,
    delivered: AtomicU64,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `content` and answer the oldest pending Interest it satisfies
    ///
    /// Returns true if a pending Interest was answered.
    pub fn publish(&self, content: ContentObject) -> bool {
        let answered = {
            let mut state = self.state.lock();
            state.store.push(content.clone());
            let position = state
                .pending
                .iter()
                .position(|p| self.matcher.matches_content(&p.interest, &content));
            position.map(|i| state.pending.remove(i))
        };

        match answered {
            Some(pending) => {
                self.delivered.fetch_add(1, Ordering::Relaxed);
                pending.handler.handle_content(&content, &pending.interest);
                true
            }
            None => false,
        }
    }

    /// Expire every pending Interest
    pub fn expire_all(&self) -> usize {
        let expired: Vec<PendingInterest> = std::mem::take(&mut self.state.lock().pending);
        let count = expired.len();
        for pending in expired {
            pending.handler.handle_timeout(&pending.interest);
        }
        count
    }

    /// Refuse the next `count` expressions
    pub fn fail_next_expressions(&self, count: usize) {
        self.fail_next.store(count, Ordering::SeqCst);
    }

    pub fn pending_count(&self) -> usize {
        self.state.lock().pending.len()
    }

    pub fn pending_interests(&self) -> Vec<Interest> {
        self.state
            .lock()
            .pending
            .iter()
            .map(|p| p.interest.clone())
            .collect()
    }

    pub fn stored_count(&self) -> usize {
        self.state.lock().store.len()
    }

    pub fn expressed_count(&self) -> u64 {
        self.expressed.load(Ordering::Relaxed)
    }

    pub fn cancelled_count(&self) -> u64 {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn delivered_count(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    fn take_failure(&self) -> bool {
        self.fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    /// Best stored answer: leftmost by name, rightmost if the Interest asks
    fn best_match(&self, store: &[ContentObject], interest: &Interest) -> Option<ContentObject> {
        let candidates = store
            .iter()
            .filter(|content| self.matcher.matches_content(interest, content));
        let rightmost = interest
            .order_preference
            .is_some_and(|order| order.prefers_right());
        let best = if rightmost {
            candidates.max_by(|a, b| a.name().cmp(b.name()))
        } else {
            candidates.min_by(|a, b| a.name().cmp(b.name()))
        };
        best.cloned()
    }
}

impl InterestTransport for InMemoryTransport {
    fn express_interest(
        &self,
        interest: &Interest,
        handler: Arc<dyn ContentHandler>,
    ) -> Result<(), TransportError> {
        if self.take_failure() {
            return Err(TransportError::Rejected("injected failure".to_string()));
        }
        self.expressed.fetch_add(1, Ordering::Relaxed);

        let answer = {
            let mut state = self.state.lock();
            let answer = self.best_match(&state.store, interest);
            if answer.is_none() {
                state.pending.push(PendingInterest {
                    interest: interest.clone(),
                    handler: Arc::clone(&handler),
                });
            }
            answer
        };

        if let Some(content) = answer {
            trace!(interest = %interest, content = %content.name(), "[InMemoryTransport] Answered from store");
            self.delivered.fetch_add(1, Ordering::Relaxed);
            handler.handle_content(&content, interest);
        }
        Ok(())
    }

    fn cancel_interest(&self, interest: &Interest, handler: &Arc<dyn ContentHandler>) {
        let mut state = self.state.lock();
        if let Some(i) = state.pending.iter().position(|p| {
            p.interest == *interest && std::ptr::addr_eq(Arc::as_ptr(&p.handler), Arc::as_ptr(handler))
        }) {
            state.pending.remove(i);
            self.cancelled.fetch_add(1, Ordering::Relaxed);
        }
    }
}
