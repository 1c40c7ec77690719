use crate::{error::Error, hash::HashAlgorithm, nonce::DEFAULT_PLACEHOLDER, policy::Policy};
use std::net::{IpAddr, Ipv4Addr};

/// Settings read from `CSP_*` environment variables.
#[derive(serde::Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_ip_addr")]
    pub ip_addr: IpAddr,

    #[serde(default)]
    pub report_only: bool,

    /// Start from `Policy::starter` before applying `policy`.
    #[serde(default = "tru")]
    pub starter: bool,

    /// Header shaped policy text, parsed with `nonce_placeholder` as the nonce token.
    pub policy: Option<String>,

    #[serde(default)]
    pub upgrade_insecure_requests: bool,

    pub report_uri: Option<String>,

    #[serde(default = "default_nonce_placeholder")]
    pub nonce_placeholder: String,

    #[serde(default)]
    pub hash_algorithm: HashAlgorithm,
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed("CSP_").from_env()
    }

    pub fn policy(&self) -> Result<Policy, Error> {
        let mut policy = if self.starter {
            Policy::starter()
        } else {
            Policy::new()
        };

        if let Some(text) = &self.policy {
            policy.overlay(&Policy::parse_with_placeholder(text, &self.nonce_placeholder)?);
        }
        if self.upgrade_insecure_requests {
            policy.set_upgrade_insecure_requests(true);
        }
        if let Some(uri) = &self.report_uri {
            policy.set_report_uri(uri.as_str());
        }
        policy.set_nonce_placeholder(self.nonce_placeholder.as_str());

        Ok(policy)
    }
}

fn tru() -> bool {
    true
}

fn default_port() -> u16 {
    8080
}

fn default_ip_addr() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_nonce_placeholder() -> String {
    DEFAULT_PLACEHOLDER.to_owned()
}
