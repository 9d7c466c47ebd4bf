//! Registry request construction.
//!
//! # Responsibilities
//! - Map a `RequestIntent` to its registry endpoint
//! - Encode server identity into the query string
//! - Attach content-type and bearer credentials
//!
//! # Design Decisions
//! - Parameters travel in the query string; the body is always empty
//! - Content-Type is form-urlencoded even with an empty body
//! - Building is pure: no I/O, no clock, same input gives the same descriptor

use std::collections::BTreeMap;
use std::fmt;

use reqwest::Method;
use url::form_urlencoded;

use crate::config::RegistrarConfig;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const AUTHORIZATION: &str = "Authorization";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

/// What a request asks the registry to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestIntent {
    Register,
    RegisterFallback,
    Unregister,
}

impl RequestIntent {
    /// Registration intent matching the fallback flag.
    pub fn registration(is_fallback: bool) -> Self {
        if is_fallback {
            RequestIntent::RegisterFallback
        } else {
            RequestIntent::Register
        }
    }

    /// Registry endpoint path.
    pub fn path(self) -> &'static str {
        match self {
            RequestIntent::Register => "/api/register",
            RequestIntent::RegisterFallback => "/api/register-fallback",
            RequestIntent::Unregister => "/api/unregister",
        }
    }

    /// Short label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            RequestIntent::Register => "register",
            RequestIntent::RegisterFallback => "register-fallback",
            RequestIntent::Unregister => "unregister",
        }
    }
}

impl fmt::Display for RequestIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully formed request, inert until handed to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub intent: RequestIntent,
    pub url: String,
    pub method: Method,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

/// Build the registry request for `intent`.
pub fn build_request(config: &RegistrarConfig, intent: RequestIntent) -> RequestDescriptor {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("name", &config.server_name);
    if intent != RequestIntent::Unregister {
        query.append_pair("host", &config.server_host);
        query.append_pair("port", &config.server_port);
    }

    let url = format!(
        "{}{}?{}",
        base_url(&config.proxy_host, &config.proxy_port),
        intent.path(),
        query.finish()
    );

    let mut headers = BTreeMap::new();
    headers.insert(CONTENT_TYPE.to_string(), FORM_CONTENT_TYPE.to_string());
    if let Some(key) = config
        .proxy_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
    {
        headers.insert(AUTHORIZATION.to_string(), format!("Bearer {}", key));
    }

    RequestDescriptor {
        intent,
        url,
        method: Method::POST,
        headers,
        body: Vec::new(),
    }
}

fn base_url(host: &str, port: &str) -> String {
    // Bare IPv6 literals need brackets to be valid in the authority.
    if host.contains(':') && !host.starts_with('[') {
        format!("http://[{}]:{}", host, port)
    } else {
        format!("http://{}:{}", host, port)
    }
}
