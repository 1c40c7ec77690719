use crate::{
    directive::Directive,
    error::Error,
    name::{is_well_known, REPORT_URI, UPGRADE_INSECURE_REQUESTS},
    nonce::DEFAULT_PLACEHOLDER,
    policy::Policy,
};
use serde::{
    de::{Deserializer, Visitor},
    Deserialize, Serialize, Serializer,
};
use std::str::FromStr;

impl Policy {
    /// Parses header shaped text, e.g.
    /// `default-src 'none'; script-src 'self' $NONCE; upgrade-insecure-requests; report-uri /r`,
    /// with `placeholder` marking the nonce. The parsed policy keeps that placeholder.
    /// A repeated directive name replaces the earlier one.
    pub fn parse_with_placeholder(s: &str, placeholder: &str) -> Result<Self, Error> {
        let mut policy = Policy::new();
        policy.set_nonce_placeholder(placeholder);
        let placeholder = policy.nonce_placeholder().to_owned();

        for entry in s.split(';').map(str::trim).filter(|entry| !entry.is_empty()) {
            let (name, sources) = match entry.find(char::is_whitespace) {
                Some(idx) => (&entry[..idx], entry[idx..].trim()),
                None => (entry, ""),
            };

            match name {
                UPGRADE_INSECURE_REQUESTS => {
                    policy.set_upgrade_insecure_requests(true);
                }
                REPORT_URI if sources.is_empty() => {
                    return Err(Error::Parse("report-uri without uri".to_owned()))
                }
                REPORT_URI => {
                    policy.set_report_uri(sources);
                }
                name => {
                    if !is_well_known(name) {
                        tracing::debug!(name, "custom directive name");
                    }
                    policy.with(name, Directive::parse_with_placeholder(sources, &placeholder));
                }
            }
        }

        Ok(policy)
    }
}

impl FromStr for Policy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Policy::parse_with_placeholder(s, DEFAULT_PLACEHOLDER)
    }
}

impl Serialize for Policy {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.template().header())
    }
}

impl<'de> Deserialize<'de> for Policy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PolicyVisitor;
        impl Visitor<'_> for PolicyVisitor {
            type Value = Policy;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("A semicolon separated list of directives")
            }

            fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                s.parse::<Policy>().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(PolicyVisitor)
    }
}
