use crate::{
    hash::{hash_source, HashAlgorithm},
    nonce::DEFAULT_PLACEHOLDER,
    source::{Keyword, Scheme, NONE, WILDCARD},
};
use itertools::Itertools;
use std::{convert::Infallible, fmt, str::FromStr};

/// Allowed sources of one directive, without the directive name.
///
/// Rendering is a pure function of the fields:
/// `all` wins over everything, an empty directive is `'none'`,
/// otherwise nonce placeholder, keywords, schemes and literal sources
/// in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directive {
    all: bool,
    none: bool,
    nonce: bool,
    keywords: [bool; Keyword::COUNT],
    schemes: [bool; Scheme::COUNT],
    sources: Vec<String>,
}

impl Directive {
    /// `'self'`
    pub const SELF_ONLY: Directive = Directive::keyword_only(Keyword::SelfOrigin);

    /// `'none'`
    pub const NONE_ONLY: Directive = Directive {
        all: false,
        none: true,
        nonce: false,
        keywords: [false; Keyword::COUNT],
        schemes: [false; Scheme::COUNT],
        sources: Vec::new(),
    };

    const fn keyword_only(keyword: Keyword) -> Self {
        let mut keywords = [false; Keyword::COUNT];
        keywords[keyword as usize] = true;
        Directive {
            all: false,
            none: false,
            nonce: false,
            keywords,
            schemes: [false; Scheme::COUNT],
            sources: Vec::new(),
        }
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(mut self) -> Self {
        self.all = true;
        self
    }

    pub fn none(mut self) -> Self {
        self.none = true;
        self
    }

    /// Marks the directive as needing a per response nonce.
    pub fn nonce(mut self) -> Self {
        self.nonce = true;
        self
    }

    pub fn keyword(mut self, keyword: Keyword) -> Self {
        self.set_keyword(keyword);
        self
    }

    pub fn scheme(mut self, scheme: Scheme) -> Self {
        self.set_scheme(scheme);
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.push_source(source);
        self
    }

    pub fn sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources.extend(sources.into_iter().map(Into::into));
        self
    }

    pub fn hash(mut self, algorithm: HashAlgorithm, content: impl AsRef<[u8]>) -> Self {
        self.push_hash(algorithm, content);
        self
    }

    pub fn set_keyword(&mut self, keyword: Keyword) {
        self.keywords[keyword as usize] = true;
    }

    pub fn set_scheme(&mut self, scheme: Scheme) {
        self.schemes[scheme as usize] = true;
    }

    pub fn set_nonce(&mut self) {
        self.nonce = true;
    }

    pub fn push_source(&mut self, source: impl Into<String>) {
        self.sources.push(source.into());
    }

    pub fn push_hash(&mut self, algorithm: HashAlgorithm, content: impl AsRef<[u8]>) {
        self.sources.push(hash_source(algorithm, content));
    }

    pub fn requires_nonce(&self) -> bool {
        self.nonce
    }

    pub fn is_all(&self) -> bool {
        self.all
    }

    pub fn is_none(&self) -> bool {
        self.none
    }

    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.keywords[keyword as usize]
    }

    pub fn has_scheme(&self, scheme: Scheme) -> bool {
        self.schemes[scheme as usize]
    }

    pub fn literal_sources(&self) -> &[String] {
        &self.sources
    }

    /// True if nothing but possibly the `none` flag is set.
    pub fn is_empty(&self) -> bool {
        !self.all
            && !self.nonce
            && !self.keywords.iter().any(|set| *set)
            && !self.schemes.iter().any(|set| *set)
            && self.sources.is_empty()
    }

    fn tokens<'a>(&'a self, placeholder: Option<&'a str>) -> impl Iterator<Item = &'a str> + 'a {
        let nonce = placeholder.filter(|_| self.nonce);
        let keywords = Keyword::VARIANTS
            .iter()
            .filter(move |keyword| self.has_keyword(**keyword))
            .map(|keyword| keyword.as_str());
        let schemes = Scheme::VARIANTS
            .iter()
            .filter(move |scheme| self.has_scheme(**scheme))
            .map(|scheme| scheme.as_str());

        nonce
            .into_iter()
            .chain(keywords)
            .chain(schemes)
            .chain(self.sources.iter().map(String::as_str))
    }

    /// Source list with `placeholder` standing in for the nonce.
    /// `None` leaves the nonce out entirely.
    pub fn render(&self, placeholder: Option<&str>) -> String {
        if self.all {
            return WILDCARD.to_owned();
        }

        let rendered = self.tokens(placeholder).join(" ");
        if rendered.is_empty() {
            NONE.to_owned()
        } else {
            rendered
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.render(Some(DEFAULT_PLACEHOLDER)))
    }
}

impl Directive {
    /// Parses a whitespace separated source list. Known keywords and schemes
    /// become flags, `placeholder` the nonce flag, anything else a literal source.
    pub fn parse_with_placeholder(s: &str, placeholder: &str) -> Self {
        let mut directive = Directive::new();
        for token in s.split_whitespace() {
            match token {
                WILDCARD => directive.all = true,
                NONE => directive.none = true,
                token if token == placeholder => directive.nonce = true,
                token => {
                    if let Ok(keyword) = token.parse::<Keyword>() {
                        directive.set_keyword(keyword);
                    } else if let Ok(scheme) = token.parse::<Scheme>() {
                        directive.set_scheme(scheme);
                    } else {
                        directive.push_source(token);
                    }
                }
            }
        }

        directive
    }
}

/// Same as `Directive::parse_with_placeholder` with `$NONCE`.
impl FromStr for Directive {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse_with_placeholder(s, DEFAULT_PLACEHOLDER))
    }
}
