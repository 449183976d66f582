//! Configuration for the mock API server.
//!
//! Defines projects, their endpoint definitions, and global settings.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

use crate::dispatcher::{is_known_status, parse_status};
use crate::schema::SchemaTemplate;

/// Upper bound for `EndpointDefinition::count`.
pub const MAX_COUNT: u32 = 10_000;

/// Upper bound for `EndpointDefinition::delay`, in milliseconds.
pub const MAX_DELAY_MS: u64 = 5_000;

static PROJECT_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").unwrap());
static MOUNT_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// Returns true if `id` has the shape of a project identifier.
pub fn is_valid_project_id(id: &str) -> bool {
    PROJECT_ID.is_match(id)
}

/// Main configuration for the mock API server.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct MockServerConfig {
    /// Global settings
    #[serde(default)]
    pub settings: GlobalSettings,

    /// Projects and their endpoints
    #[serde(default)]
    pub projects: Vec<ProjectDefinition>,
}

impl MockServerConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse, normalize and validate configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        let mut config: Self = serde_yaml::from_str(yaml)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Bring stored values into canonical form.
    pub fn normalize(&mut self) {
        for project in &mut self.projects {
            for endpoint in &mut project.endpoints {
                endpoint.normalize();
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Hard errors are returned; problems the engine handles at request time
    /// are only logged.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !MOUNT_PREFIX.is_match(&self.settings.mount_prefix) {
            anyhow::bail!("Invalid mount prefix: {:?}", self.settings.mount_prefix);
        }
        if self.settings.list_cap == 0 {
            anyhow::bail!("list_cap must be at least 1");
        }

        let mut seen = HashSet::new();
        for project in &self.projects {
            if !seen.insert(project.id.as_str()) {
                anyhow::bail!("Duplicate project id: {}", project.id);
            }
            project
                .validate()
                .map_err(|e| anyhow::anyhow!("Project {}: {}", project.id, e))?;
        }
        Ok(())
    }

    /// Total number of endpoint definitions across all projects.
    pub fn endpoint_count(&self) -> usize {
        self.projects.iter().map(|p| p.endpoints.len()).sum()
    }
}

/// A project: a named group of endpoint definitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectDefinition {
    /// Identifier used in the mock URL
    pub id: String,

    /// Optional display name
    #[serde(default)]
    pub name: Option<String>,

    /// Keys accepted by every endpoint of the project
    #[serde(default)]
    pub api_keys: Vec<String>,

    /// Endpoint definitions, in matching order
    #[serde(default)]
    pub endpoints: Vec<EndpointDefinition>,
}

impl ProjectDefinition {
    /// Validate the project and its endpoints.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !is_valid_project_id(&self.id) {
            anyhow::bail!("Invalid project id: {:?}", self.id);
        }

        let mut routes = HashSet::new();
        for (i, endpoint) in self.endpoints.iter().enumerate() {
            endpoint
                .validate(&self.api_keys)
                .map_err(|e| anyhow::anyhow!("Endpoint {}: {}", i, e))?;

            if !routes.insert((&endpoint.path, endpoint.method, endpoint.response_type)) {
                warn!(
                    project = %self.id,
                    path = %endpoint.path,
                    method = %endpoint.method,
                    "Duplicate endpoint route; the first definition wins"
                );
            }
        }
        Ok(())
    }

    /// The project record without its endpoints.
    pub fn project(&self) -> Project {
        Project {
            id: self.id.clone(),
            name: self.name.clone(),
            api_keys: self.api_keys.clone(),
        }
    }
}

/// Project metadata as seen by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: String,
    pub name: Option<String>,
    pub api_keys: Vec<String>,
}

/// A single configured mock route.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointDefinition {
    /// Path pattern, static segments and `:param` segments
    pub path: String,

    /// HTTP method
    #[serde(default)]
    pub method: HttpMethod,

    /// Response template; a string holds JSON text
    #[serde(default = "default_schema")]
    pub schema_definition: serde_json::Value,

    /// Number of items for list responses
    #[serde(default = "default_count")]
    pub count: u32,

    /// Whether an API key is required
    #[serde(default)]
    pub require_auth: bool,

    /// Keys accepted by this endpoint
    #[serde(default)]
    pub api_keys: Vec<String>,

    /// Response delay in milliseconds
    #[serde(default)]
    pub delay: u64,

    /// List or single-object response
    #[serde(default)]
    pub response_type: ResponseType,

    /// Path segment naming the item identifier, e.g. `:id`
    #[serde(default)]
    pub parameter_path: Option<String>,

    /// Status code to respond with
    #[serde(
        default = "default_status",
        deserialize_with = "deserialize_status"
    )]
    pub response_http_status: String,

    /// Page list responses with `page`/`limit` query parameters
    #[serde(default)]
    pub support_pagination: bool,
}

fn default_schema() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

fn default_count() -> u32 {
    1
}

fn default_status() -> String {
    "200".to_string()
}

fn deserialize_status<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Status {
        Text(String),
        Code(u64),
    }

    Ok(match Status::deserialize(deserializer)? {
        Status::Text(s) => s,
        Status::Code(n) => n.to_string(),
    })
}

impl EndpointDefinition {
    /// Create a GET endpoint with defaults for everything but path and schema.
    pub fn new(path: impl Into<String>, schema_definition: serde_json::Value) -> Self {
        let mut endpoint = Self {
            path: path.into(),
            method: HttpMethod::default(),
            schema_definition,
            count: default_count(),
            require_auth: false,
            api_keys: Vec::new(),
            delay: 0,
            response_type: ResponseType::default(),
            parameter_path: None,
            response_http_status: default_status(),
            support_pagination: false,
        };
        endpoint.normalize();
        endpoint
    }

    /// Ensure the path starts with `/` and the parameter path does not.
    pub fn normalize(&mut self) {
        let trimmed = self.path.trim();
        self.path = if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{}", trimmed)
        };

        if let Some(param) = &self.parameter_path {
            let param = param.trim().trim_start_matches('/');
            self.parameter_path = if param.is_empty() {
                None
            } else {
                Some(param.to_string())
            };
        }
    }

    /// Validate the endpoint definition.
    ///
    /// `project_keys` are the keys the owning project accepts.
    pub fn validate(&self, project_keys: &[String]) -> anyhow::Result<()> {
        if !(1..=MAX_COUNT).contains(&self.count) {
            anyhow::bail!("count must be within 1..={}, got {}", MAX_COUNT, self.count);
        }
        if self.delay > MAX_DELAY_MS {
            anyhow::bail!("delay must be at most {} ms, got {}", MAX_DELAY_MS, self.delay);
        }
        if self.require_auth && self.api_keys.is_empty() && project_keys.is_empty() {
            anyhow::bail!("require_auth is set but no api_keys are configured");
        }

        if !parse_status(&self.response_http_status).is_some_and(is_known_status) {
            warn!(
                path = %self.path,
                status = %self.response_http_status,
                "Unsupported response status; requests will fail with 500"
            );
        }
        if let Err(e) = SchemaTemplate::from_stored(&self.schema_definition) {
            warn!(path = %self.path, error = %e, "Schema definition cannot be parsed");
        }
        Ok(())
    }
}

/// Methods an endpoint can be defined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            other => Err(format!("Unsupported method: {}", other)),
        }
    }
}

impl TryFrom<String> for HttpMethod {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HttpMethod> for String {
    fn from(method: HttpMethod) -> Self {
        method.as_str().to_string()
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// `{ "data": [...] }`
    #[default]
    List,
    /// A single generated object
    Single,
}

/// Global settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlobalSettings {
    /// Address the HTTP server binds to
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    /// First path segment of mock traffic
    #[serde(default = "default_mount_prefix")]
    pub mount_prefix: String,

    /// Hard cap on generated list items per request
    #[serde(default = "default_list_cap")]
    pub list_cap: usize,

    /// Header carrying the API key
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,

    /// Log all matched endpoints
    #[serde(default = "default_true")]
    pub log_matches: bool,

    /// Log unmatched requests
    #[serde(default = "default_true")]
    pub log_unmatched: bool,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            mount_prefix: default_mount_prefix(),
            list_cap: default_list_cap(),
            api_key_header: default_api_key_header(),
            log_matches: true,
            log_unmatched: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn default_mount_prefix() -> String {
    "mock".to_string()
}

fn default_list_cap() -> usize {
    100
}

fn default_api_key_header() -> String {
    "x-api-key".to_string()
}
