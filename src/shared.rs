use crate::{error::Error, policy::Policy, request::RequestPolicy};
use parking_lot::RwLock;
use std::sync::Arc;

pub const HEADER: &str = "content-security-policy";
pub const REPORT_ONLY_HEADER: &str = "content-security-policy-report-only";

/// Process wide handle to a compiled policy.
///
/// Readers only ever see a fully built snapshot, `reconfigure` builds the
/// next one aside and swaps it in under the write lock.
#[derive(Clone)]
pub struct SharedPolicy {
    current: Arc<RwLock<Arc<Policy>>>,
    report_only: bool,
}

impl SharedPolicy {
    pub fn new(mut policy: Policy) -> Self {
        policy.build();
        Self {
            current: Arc::new(RwLock::new(Arc::new(policy))),
            report_only: false,
        }
    }

    /// Send `Content-Security-Policy-Report-Only` instead of enforcing.
    pub fn report_only(mut self, report_only: bool) -> Self {
        self.report_only = report_only;
        self
    }

    pub fn header_name(&self) -> &'static str {
        if self.report_only {
            REPORT_ONLY_HEADER
        } else {
            HEADER
        }
    }

    pub fn load(&self) -> Arc<Policy> {
        self.current.read().clone()
    }

    pub fn reconfigure<F>(&self, f: F)
    where
        F: FnOnce(&mut Policy),
    {
        let mut current = self.current.write();
        let mut next = Policy::clone(&current);
        f(&mut next);
        let header = next.build().to_owned();
        tracing::info!(%header, "content security policy reconfigured");
        *current = Arc::new(next);
    }

    /// Per request state, with a fresh nonce if the policy asks for one.
    pub fn request(&self) -> Result<RequestPolicy, Error> {
        RequestPolicy::new(self.load(), self.header_name())
    }
}
