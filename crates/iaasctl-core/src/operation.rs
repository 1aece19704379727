//! Per-call operation descriptors

use std::fmt;
use std::sync::Arc;

use crate::config::Config;
use crate::marshal::ParameterList;

/// HTTP method an action is sent with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    /// Parameters in the query string
    #[default]
    Get,
    /// Parameters in a form-encoded body, for large payloads
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }

    /// Whether a failed attempt may be re-sent
    pub fn is_idempotent(&self) -> bool {
        matches!(self, HttpMethod::Get)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service-scoping properties shared by every operation of a service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    pub zone: Option<String>,
}

impl Properties {
    pub fn zone(zone: impl Into<String>) -> Self {
        Self {
            zone: Some(zone.into()),
        }
    }
}

/// One API call: action name, method, configuration and scope.
///
/// Built fresh for every call and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Operation {
    action: String,
    method: HttpMethod,
    config: Arc<Config>,
    properties: Properties,
}

impl Operation {
    pub fn new(
        config: Arc<Config>,
        action: impl Into<String>,
        method: HttpMethod,
        properties: Properties,
    ) -> Self {
        Self {
            action: action.into(),
            method,
            config,
            properties,
        }
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Parameters every request of this operation starts with
    pub fn base_params(&self) -> ParameterList {
        let mut params = ParameterList::new();
        params.push("action", self.action.as_str());
        if let Some(zone) = &self.properties.zone {
            params.push("zone", zone.as_str());
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_display_and_idempotency() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Post.to_string(), "POST");
        assert!(HttpMethod::Get.is_idempotent());
        assert!(!HttpMethod::Post.is_idempotent());
    }

    #[test]
    fn test_base_params_include_zone_when_scoped() {
        let config = Arc::new(Config::new("key", "secret"));

        let scoped = Operation::new(
            config.clone(),
            "DescribeCaches",
            HttpMethod::Get,
            Properties::zone("pek3"),
        );
        let params = scoped.base_params();
        assert_eq!(params.get("action"), Some("DescribeCaches"));
        assert_eq!(params.get("zone"), Some("pek3"));

        let global = Operation::new(config, "DescribeZones", HttpMethod::Get, Properties::default());
        assert!(!global.base_params().contains_key("zone"));
    }
}
