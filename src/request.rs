use crate::{
    additions::Additions, directive::Directive, error::Error, hash::HashAlgorithm, nonce::Nonce,
    policy::Policy,
};
use std::{borrow::Cow, sync::Arc};

/// Content security policy state owned by one request.
///
/// The nonce is drawn up front so the body can use it, additions collected
/// while rendering are merged in by `header_value`.
pub struct RequestPolicy {
    policy: Arc<Policy>,
    header_name: &'static str,
    nonce: Option<Nonce>,
    additions: Additions,
}

impl RequestPolicy {
    pub fn new(policy: Arc<Policy>, header_name: &'static str) -> Result<Self, Error> {
        let nonce = if policy.template().requires_nonce() {
            Some(Nonce::generate()?)
        } else {
            None
        };

        Ok(Self {
            policy,
            header_name,
            nonce,
            additions: Additions::new(),
        })
    }

    pub fn nonce(&self) -> Option<&Nonce> {
        self.nonce.as_ref()
    }

    pub fn header_name(&self) -> &'static str {
        self.header_name
    }

    pub fn additions(&self) -> &Additions {
        &self.additions
    }

    pub fn add(&mut self, name: impl Into<String>, directive: Directive) -> &mut Self {
        self.additions.insert(name, directive);
        self
    }

    /// Allows inline `content` rendered for this response only.
    pub fn hash(
        &mut self,
        name: &str,
        algorithm: HashAlgorithm,
        content: impl AsRef<[u8]>,
    ) -> &mut Self {
        self.additions.hash(name, algorithm, content);
        self
    }

    pub fn header_value(&self) -> Result<String, Error> {
        let template = if self.additions.is_empty() {
            self.policy.template()
        } else {
            Cow::Owned(self.policy.merge_build(&self.additions))
        };

        if !template.requires_nonce() {
            return Ok(template.header().to_owned());
        }

        match &self.nonce {
            Some(nonce) => Ok(template.with_nonce(nonce)),
            None => {
                // only additions asked for a nonce, nothing in the body can carry it
                tracing::warn!("request additions require a nonce the policy doesn't declare");
                Ok(template.with_nonce(&Nonce::generate()?))
            }
        }
    }
}
