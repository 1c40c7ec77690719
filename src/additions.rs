use crate::{directive::Directive, hash::HashAlgorithm};
use std::collections::BTreeMap;

/// Directives added for a single response, merged over the static policy
/// by `Policy::merge_build`. Names the policy doesn't declare are ignored there.
#[derive(Debug, Default, Clone, derive_more::Deref)]
pub struct Additions(BTreeMap<String, Directive>);

impl Additions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any directive already added under `name`.
    pub fn insert(&mut self, name: impl Into<String>, directive: Directive) -> &mut Self {
        self.0.insert(name.into(), directive);
        self
    }

    pub fn directive_mut(&mut self, name: &str) -> &mut Directive {
        self.0.entry(name.to_owned()).or_default()
    }

    /// Allows the inline `content` in directive `name` by its hash.
    pub fn hash(
        &mut self,
        name: &str,
        algorithm: HashAlgorithm,
        content: impl AsRef<[u8]>,
    ) -> &mut Self {
        self.directive_mut(name).push_hash(algorithm, content);
        self
    }
}
