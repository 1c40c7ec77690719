use crate::{
    additions::Additions,
    directive::Directive,
    error::Error,
    name::{
        BASE_URI, CONNECT_SRC, DEFAULT_SRC, FORM_ACTION, IMG_SRC, REPORT_URI, SCRIPT_SRC,
        STYLE_SRC, UPGRADE_INSECURE_REQUESTS,
    },
    nonce::{Nonce, DEFAULT_PLACEHOLDER},
};
use std::{borrow::Cow, collections::BTreeMap};

/// Result of compiling a policy. The header may still contain the nonce
/// placeholder, see `with_nonce`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiled {
    header: String,
    requires_nonce: bool,
    placeholder: String,
}

impl Compiled {
    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn requires_nonce(&self) -> bool {
        self.requires_nonce
    }

    /// Header with every placeholder replaced by `'nonce-<nonce>'`.
    pub fn with_nonce(&self, nonce: &Nonce) -> String {
        self.header.replace(&self.placeholder, &nonce.source())
    }
}

#[derive(Debug, Clone)]
pub struct Policy {
    directives: BTreeMap<String, Directive>,
    upgrade_insecure_requests: bool,
    report_uri: Option<String>,
    nonce_placeholder: String,
    compiled: Option<Compiled>,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            directives: BTreeMap::new(),
            upgrade_insecure_requests: false,
            report_uri: None,
            nonce_placeholder: DEFAULT_PLACEHOLDER.to_owned(),
            compiled: None,
        }
    }
}

impl Policy {
    pub fn new() -> Self {
        Self::default()
    }

    /// `default-src 'none'` and `'self'` for scripts, styles, images,
    /// connections, forms and the base uri.
    pub fn starter() -> Self {
        let mut policy = Self::new();
        policy.with(DEFAULT_SRC, Directive::NONE_ONLY);
        for name in &[BASE_URI, SCRIPT_SRC, CONNECT_SRC, IMG_SRC, STYLE_SRC, FORM_ACTION] {
            policy.with(*name, Directive::SELF_ONLY);
        }
        policy
    }

    /// Inserts `directive` under `name`, replacing an existing one.
    pub fn with(&mut self, name: impl Into<String>, directive: Directive) -> &mut Self {
        self.directives.insert(name.into(), directive);
        self
    }

    /// Existing directive `name`, or a new empty one.
    pub fn directive_mut(&mut self, name: &str) -> &mut Directive {
        self.directives.entry(name.to_owned()).or_default()
    }

    pub fn remove(&mut self, name: &str) -> Option<Directive> {
        self.directives.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Directive> {
        self.directives.get(name)
    }

    pub fn directives(&self) -> impl Iterator<Item = (&str, &Directive)> {
        self.directives
            .iter()
            .map(|(name, directive)| (name.as_str(), directive))
    }

    pub fn set_upgrade_insecure_requests(&mut self, upgrade: bool) -> &mut Self {
        self.upgrade_insecure_requests = upgrade;
        self
    }

    pub fn upgrade_insecure_requests(&self) -> bool {
        self.upgrade_insecure_requests
    }

    pub fn set_report_uri(&mut self, uri: impl Into<String>) -> &mut Self {
        let uri = uri.into();
        self.report_uri = if uri.is_empty() { None } else { Some(uri) };
        self
    }

    pub fn report_uri(&self) -> Option<&str> {
        self.report_uri.as_deref()
    }

    /// Token standing in for the nonce in compiled output.
    /// An empty placeholder resets to `$NONCE`.
    pub fn set_nonce_placeholder(&mut self, placeholder: impl Into<String>) -> &mut Self {
        let placeholder = placeholder.into();
        self.nonce_placeholder = if placeholder.is_empty() {
            DEFAULT_PLACEHOLDER.to_owned()
        } else {
            placeholder
        };
        self
    }

    pub fn nonce_placeholder(&self) -> &str {
        &self.nonce_placeholder
    }

    /// Upserts every directive of `other` and takes over its global flags
    /// where they are set.
    pub fn overlay(&mut self, other: &Policy) -> &mut Self {
        for (name, directive) in &other.directives {
            self.directives.insert(name.clone(), directive.clone());
        }
        self.upgrade_insecure_requests |= other.upgrade_insecure_requests;
        if other.report_uri.is_some() {
            self.report_uri = other.report_uri.clone();
        }
        self
    }

    /// Compiles the policy and caches the result.
    ///
    /// The cache isn't touched by the setters, call this again after
    /// changing the policy.
    pub fn build(&mut self) -> &str {
        let compiled = self.compile(None);
        tracing::debug!(
            directives = self.directives.len(),
            requires_nonce = compiled.requires_nonce,
            "compiled content security policy"
        );
        &self.compiled.insert(compiled).header
    }

    /// Last `build` result.
    pub fn compiled(&self) -> Option<&str> {
        self.compiled.as_ref().map(|compiled| compiled.header.as_str())
    }

    /// Whether the last `build` found a directive asking for a nonce.
    pub fn requires_nonce(&self) -> bool {
        self.compiled
            .as_ref()
            .map_or(false, |compiled| compiled.requires_nonce)
    }

    /// The cached compilation, or a fresh one if `build` never ran.
    pub fn template(&self) -> Cow<'_, Compiled> {
        match &self.compiled {
            Some(compiled) => Cow::Borrowed(compiled),
            None => Cow::Owned(self.compile(None)),
        }
    }

    /// Header with a freshly generated nonce substituted, plus that nonce.
    /// Without a nonce directive the template is returned as is and no
    /// randomness is drawn.
    pub fn with_nonce(&self) -> Result<(String, Option<Nonce>), Error> {
        let template = self.template();
        if !template.requires_nonce {
            return Ok((template.header.clone(), None));
        }

        let nonce = Nonce::generate()?;
        Ok((template.with_nonce(&nonce), Some(nonce)))
    }

    /// Compiles the policy with `additions` appended to the directives of
    /// the same name. Leaves the policy and its cache alone; placeholder
    /// substitution is up to the caller.
    pub fn merge_build(&self, additions: &Additions) -> Compiled {
        self.compile(Some(additions))
    }

    /// Directive name to rendered source list, nonce left out.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.directives
            .iter()
            .map(|(name, directive)| (name.clone(), directive.render(None)))
            .collect()
    }

    // default-src first, the rest sorted by name
    fn ordered(&self) -> impl Iterator<Item = (&String, &Directive)> {
        self.directives.get_key_value(DEFAULT_SRC).into_iter().chain(
            self.directives
                .iter()
                .filter(|(name, _)| name.as_str() != DEFAULT_SRC),
        )
    }

    fn compile(&self, additions: Option<&Additions>) -> Compiled {
        let placeholder = Some(self.nonce_placeholder.as_str());
        let mut header = String::new();
        let mut requires_nonce = false;

        for (name, directive) in self.ordered() {
            requires_nonce |= directive.requires_nonce();
            let extra = additions
                .and_then(|additions| additions.get(name))
                .filter(|extra| !extra.is_empty());

            header.push_str(name);
            header.push(' ');
            match extra {
                Some(extra) => {
                    requires_nonce |= extra.requires_nonce();
                    header.push_str(&directive.render(placeholder));
                    header.push(' ');
                    header.push_str(&extra.render(placeholder));
                }
                None => header.push_str(&directive.render(placeholder)),
            }
            header.push(';');
        }

        if self.upgrade_insecure_requests {
            header.push_str(UPGRADE_INSECURE_REQUESTS);
            header.push(';');
        }

        if let Some(uri) = &self.report_uri {
            header.push_str(REPORT_URI);
            header.push(' ');
            header.push_str(uri);
        }

        if header.ends_with(';') {
            header.pop();
        }

        Compiled {
            header,
            requires_nonce,
            placeholder: self.nonce_placeholder.clone(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        hash::HashAlgorithm,
        name::{FONT_SRC, FRAME_ANCESTORS, REQUIRE_TRUSTED_TYPES_FOR},
        source::{Keyword, Scheme, DATA, TRUSTED_SCRIPT, UNSAFE_INLINE},
    };
    use base64::{engine::general_purpose, Engine as _};

    const DO_SOMETHING_SHA512: &str = "'sha512-NrS2FABurNzIW2yTKRxF8X+HMhJh29vd9syOLut1MW4Cd1JeGzZqughLzC+LQr0O8XFhCuR4zyjLgrTQct7jAA=='";

    fn nonce_policy() -> Policy {
        let mut policy = Policy::starter();
        policy.with(
            SCRIPT_SRC,
            Directive::new().keyword(Keyword::SelfOrigin).nonce(),
        );
        policy
    }

    fn assert_well_formed(header: &str) {
        assert!(!header.contains(";;"), "{}", header);
        assert!(!header.ends_with(';'), "{}", header);
    }

    #[test]
    fn starter_policy() {
        let mut policy = Policy::starter();
        assert_eq!(
            policy.build(),
            "default-src 'none';base-uri 'self';connect-src 'self';form-action 'self';img-src 'self';script-src 'self';style-src 'self'"
        );
        assert!(!policy.requires_nonce());
    }

    #[test]
    fn end_to_end() {
        let mut policy = Policy::new();
        policy
            .with(
                SCRIPT_SRC,
                Directive::new()
                    .sources(vec!["cdnjs.cloudflare.com", "cdn.jsdelivr.net"])
                    .hash(HashAlgorithm::Sha512, "doSomething()")
                    .sources(vec!["www.google-analytics.com", UNSAFE_INLINE, DATA]),
            )
            .set_upgrade_insecure_requests(true)
            .set_report_uri("/_csp-report");

        let header = policy.build().to_owned();
        assert!(header.contains(&format!(
            "script-src cdnjs.cloudflare.com cdn.jsdelivr.net {} www.google-analytics.com 'unsafe-inline' data:",
            DO_SOMETHING_SHA512
        )));
        assert!(header.ends_with("upgrade-insecure-requests;report-uri /_csp-report"));
        assert_well_formed(&header);
    }

    #[test]
    fn mixed_directives_are_ordered_and_well_formed() {
        let mut policy = Policy::starter();
        policy
            .with(
                STYLE_SRC,
                Directive::SELF_ONLY.sources(vec![
                    UNSAFE_INLINE,
                    "cdnjs.cloudflare.com",
                    "fonts.googleapis.com",
                ]),
            )
            .with(IMG_SRC, Directive::new().all())
            .with(
                FONT_SRC,
                Directive::new().sources(vec!["fonts.googleapis.com", "fonts.gstatic.com"]),
            )
            .with(FRAME_ANCESTORS, Directive::new())
            .with(REQUIRE_TRUSTED_TYPES_FOR, Directive::new().source(TRUSTED_SCRIPT))
            .with("x-experimental-src", Directive::new().scheme(Scheme::Blob))
            .set_upgrade_insecure_requests(true);

        let header = policy.build().to_owned();
        assert_eq!(
            header,
            "default-src 'none';base-uri 'self';connect-src 'self';font-src fonts.googleapis.com fonts.gstatic.com;form-action 'self';frame-ancestors 'none';img-src *;require-trusted-types-for 'script';script-src 'self';style-src 'self' 'unsafe-inline' cdnjs.cloudflare.com fonts.googleapis.com;x-experimental-src blob:;upgrade-insecure-requests"
        );
        assert_well_formed(&header);
    }

    #[test]
    fn build_is_idempotent() {
        let mut policy = nonce_policy();
        policy.set_report_uri("/report");
        let first = policy.build().to_owned();
        let second = policy.build().to_owned();
        assert_eq!(first, second);
        assert_eq!(policy.compiled(), Some(first.as_str()));
    }

    #[test]
    fn empty_policy() {
        let mut policy = Policy::new();
        assert_eq!(policy.build(), "");

        policy.set_upgrade_insecure_requests(true);
        assert_eq!(policy.build(), "upgrade-insecure-requests");

        policy.set_report_uri("https://example.com/r");
        assert_eq!(
            policy.build(),
            "upgrade-insecure-requests;report-uri https://example.com/r"
        );

        policy.set_report_uri("");
        assert_eq!(policy.report_uri(), None);
    }

    #[test]
    fn upsert_replaces() {
        let mut policy = Policy::new();
        policy.with(SCRIPT_SRC, Directive::new().source("a.example"));
        policy.with(SCRIPT_SRC, Directive::new().source("b.example"));
        policy.directive_mut(SCRIPT_SRC).push_source("c.example");
        assert_eq!(policy.build(), "script-src b.example c.example");

        assert!(policy.remove(SCRIPT_SRC).is_some());
        assert_eq!(policy.build(), "");
    }

    #[test]
    fn cache_only_moves_on_build() {
        let mut policy = Policy::starter();
        assert_eq!(policy.compiled(), None);
        let before = policy.build().to_owned();

        policy.with(SCRIPT_SRC, Directive::new().nonce());
        assert_eq!(policy.compiled(), Some(before.as_str()));
        assert!(!policy.requires_nonce());

        policy.build();
        assert!(policy.requires_nonce());
        assert!(policy.compiled().unwrap().contains("script-src $NONCE"));
    }

    #[test]
    fn nonce_is_substituted() {
        let mut policy = nonce_policy();
        let template = policy.build().to_owned();
        assert!(policy.requires_nonce());
        assert!(template.contains("script-src $NONCE 'self'"));

        let (header, nonce) = policy.with_nonce().unwrap();
        let nonce = nonce.unwrap();
        assert!(header.contains(&format!("script-src 'nonce-{}' 'self'", nonce)));
        assert!(!header.contains("$NONCE"));
        assert_ne!(header, template);

        let raw = general_purpose::URL_SAFE_NO_PAD
            .decode(nonce.as_str())
            .unwrap();
        assert!(raw.len() >= 16);
    }

    #[test]
    fn nonces_are_fresh_per_call() {
        let mut policy = nonce_policy();
        policy.build();
        let (first_header, first) = policy.with_nonce().unwrap();
        let (second_header, second) = policy.with_nonce().unwrap();
        assert_ne!(first, second);
        assert_ne!(first_header, second_header);
    }

    #[test]
    fn no_nonce_without_nonce_directive() {
        let mut policy = Policy::starter();
        let template = policy.build().to_owned();
        let (header, nonce) = policy.with_nonce().unwrap();
        assert_eq!(header, template);
        assert!(nonce.is_none());
    }

    #[test]
    fn with_nonce_before_build() {
        let policy = nonce_policy();
        let (header, nonce) = policy.with_nonce().unwrap();
        assert!(header.contains(&nonce.unwrap().source()));
        assert_eq!(policy.compiled(), None);
    }

    #[test]
    fn custom_placeholder() {
        let mut policy = nonce_policy();
        policy.set_nonce_placeholder("{{nonce}}");
        assert!(policy.build().contains("script-src {{nonce}} 'self'"));
        let (header, nonce) = policy.with_nonce().unwrap();
        assert!(header.contains(&nonce.unwrap().source()));
        assert!(!header.contains("{{nonce}}"));

        policy.set_nonce_placeholder("");
        assert_eq!(policy.nonce_placeholder(), DEFAULT_PLACEHOLDER);
    }

    #[test]
    fn merge_appends_without_mutating() {
        let mut policy = Policy::starter();
        policy.set_upgrade_insecure_requests(true);
        let template = policy.build().to_owned();
        let directives_before = policy.to_map();

        let mut additions = Additions::new();
        additions
            .hash(SCRIPT_SRC, HashAlgorithm::Sha512, "doSomething()")
            .insert("not-in-policy", Directive::new().source("ignored.example"));

        let merged = policy.merge_build(&additions);
        assert!(merged
            .header()
            .contains(&format!("script-src 'self' {};", DO_SOMETHING_SHA512)));
        assert!(!merged.header().contains("ignored.example"));
        assert!(!merged.header().contains("not-in-policy"));
        assert!(!merged.requires_nonce());
        assert_well_formed(merged.header());

        assert_eq!(policy.compiled(), Some(template.as_str()));
        assert_eq!(policy.to_map(), directives_before);
    }

    #[test]
    fn merge_edge_cases() {
        let mut policy = Policy::new();
        policy
            .with(DEFAULT_SRC, Directive::NONE_ONLY)
            .with(IMG_SRC, Directive::new().all())
            .with(STYLE_SRC, Directive::SELF_ONLY);
        policy.build();

        let mut additions = Additions::new();
        additions
            .hash(DEFAULT_SRC, HashAlgorithm::Sha256, "")
            .insert(IMG_SRC, Directive::new().source("img.example"))
            .insert(STYLE_SRC, Directive::new());

        assert_eq!(
            policy.merge_build(&additions).header(),
            "default-src 'none' 'sha256-47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=';img-src * img.example;style-src 'self'"
        );
    }

    #[test]
    fn merge_keeps_hash_on_wildcard() {
        let mut policy = Policy::new();
        policy.with(SCRIPT_SRC, Directive::new().all());
        let template = policy.build().to_owned();

        let mut additions = Additions::new();
        additions.hash(SCRIPT_SRC, HashAlgorithm::Sha256, "");

        let merged = policy.merge_build(&additions);
        assert_eq!(
            merged.header(),
            "script-src * 'sha256-47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU='"
        );
        assert_eq!(policy.compiled(), Some(template.as_str()));
    }

    #[test]
    fn merge_recomputes_nonce_requirement() {
        let mut policy = Policy::starter();
        policy.build();

        let mut additions = Additions::new();
        additions.insert(SCRIPT_SRC, Directive::new().nonce());

        let merged = policy.merge_build(&additions);
        assert!(merged.requires_nonce());
        assert!(merged.header().contains("script-src 'self' $NONCE"));
        assert!(!policy.requires_nonce());

        let nonce = Nonce::generate().unwrap();
        assert!(merged
            .with_nonce(&nonce)
            .contains(&format!("script-src 'self' {}", nonce.source())));
    }

    #[test]
    fn map_leaves_out_nonce() {
        let map = nonce_policy().to_map();
        assert_eq!(map[SCRIPT_SRC], "'self'");
        assert_eq!(map[DEFAULT_SRC], "'none'");
        assert_eq!(map.len(), 7);
    }

    #[test]
    fn overlay_upserts() {
        let mut base = Policy::starter();
        let mut other = Policy::new();
        other
            .with(SCRIPT_SRC, Directive::new().source("cdn.example"))
            .set_report_uri("/r");
        base.overlay(&other);

        assert_eq!(base.get(SCRIPT_SRC).unwrap().to_string(), "cdn.example");
        assert_eq!(base.get(STYLE_SRC).unwrap().to_string(), "'self'");
        assert_eq!(base.report_uri(), Some("/r"));
        assert!(!base.upgrade_insecure_requests());
    }
}
