//! Service settings, loaded once from the environment at startup.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Path this service would serve NEF notifications on.
pub const NOTIFICATION_PATH: &str = "/qod/callback/v0";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required setting {0}")]
    Missing(&'static str),

    #[error("Invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl FromStr for Scheme {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Redis,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "redis" => Ok(StoreBackend::Redis),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NefSettings {
    pub scheme: Scheme,
    pub host: String,
    pub port: Option<u16>,
    pub service_name: String,
    pub supported_features: String,
    pub timeout: Duration,
}

impl NefSettings {
    /// Base URL of the AsSessionWithQoS API.
    pub fn api_root(&self) -> String {
        let service = self.service_name.trim_start_matches('/');
        match self.port {
            Some(port) => format!("{}://{}:{}/{}", self.scheme.as_str(), self.host, port, service),
            None => format!("{}://{}/{}", self.scheme.as_str(), self.host, service),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OAuth2Settings {
    pub auth_server_url: String,
    pub issuer_url: String,
    pub cache_duration: Duration,
    pub audience: Vec<String>,
    pub authorized_scope: Vec<String>,
    pub client_token_url: String,
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub comp_name: String,
    pub scheme: Scheme,
    pub binding_addr: String,
    pub register_addr: String,
    pub port: u16,
    pub notify_port: Option<u16>,
    pub tls_env: String,
    pub tls_dir: PathBuf,
    pub store: StoreBackend,
    pub redis_url: String,
    pub provision_file: Option<PathBuf>,
    pub log_level: String,
    pub nef: NefSettings,
    pub oauth2: OAuth2Settings,
}

struct Env<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.optional(key).ok_or(ConfigError::Missing(key))
    }

    fn parsed<T: FromStr>(&self, key: &'static str) -> Result<Option<T>, ConfigError> {
        match self.optional(key) {
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::Invalid { key, value }),
            None => Ok(None),
        }
    }

    /// Like `parsed`, with 0 treated as unset.
    fn nonzero(&self, key: &'static str) -> Result<Option<u64>, ConfigError> {
        Ok(self.parsed::<u64>(key)?.filter(|v| *v != 0))
    }

    fn list(&self, key: &'static str) -> Result<Vec<String>, ConfigError> {
        let list: Vec<String> = self
            .required(key)?
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if list.is_empty() {
            return Err(ConfigError::Missing(key));
        }
        Ok(list)
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };

        let nef = NefSettings {
            scheme: env.parsed("NEF_SCHEME")?.unwrap_or(Scheme::Http),
            host: env.or("NEF_HOST", "127.0.0.1"),
            port: env.parsed("NEF_PORT")?,
            service_name: env.or("NEF_SERVICE_NAME", "/3gpp-as-session-with-qos/v1"),
            supported_features: env.or("NEF_SUPP_FEAT", "0"),
            timeout: Duration::from_secs(env.nonzero("NEF_TIMEOUT_SECS")?.unwrap_or(5)),
        };

        let auth_server_url = env.required("OAUTH2_AUTH_SERVER_URL")?;
        let oauth2 = OAuth2Settings {
            issuer_url: env.or("OAUTH2_ISSUER_URL", &auth_server_url),
            auth_server_url,
            cache_duration: Duration::from_secs(
                60 * env.nonzero("OAUTH2_CACHE_DURATION_MINS")?.unwrap_or(5),
            ),
            audience: env.list("OAUTH2_AUDIENCE")?,
            authorized_scope: env.list("OAUTH2_AUTHORIZED_SCOPE")?,
            client_token_url: env.required("OAUTH2_CLIENT_TOKEN_URL")?,
            client_id: env.required("OAUTH2_CLIENT_ID")?,
            client_secret: env.required("OAUTH2_CLIENT_SECRET")?,
        };

        Ok(Settings {
            comp_name: env.or("QOD_COMP_NAME", "qodservice"),
            scheme: env.parsed("QOD_SCHEME")?.unwrap_or(Scheme::Http),
            binding_addr: env.or("QOD_BINDING_ADDR", "0.0.0.0"),
            register_addr: env.or("QOD_REGISTER_ADDR", "127.0.0.1"),
            port: env.parsed("QOD_PORT")?.unwrap_or(9000),
            notify_port: env.parsed("QOD_NOTIFY_PORT")?,
            tls_env: env.or("QOD_TLS_ENV", "local"),
            tls_dir: PathBuf::from(env.or("QOD_TLS_DIR", ".")),
            store: env.parsed("QOD_STORE")?.unwrap_or(StoreBackend::Redis),
            redis_url: env.or("REDIS_URL", "redis://localhost:6379"),
            provision_file: env.optional("QOD_PROVISION_FILE").map(PathBuf::from),
            log_level: env.or("QOD_LOG_LEVEL", "info"),
            nef,
            oauth2,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.binding_addr, self.port)
    }

    /// Callback URL advertised to the NEF, when a notify port is configured.
    pub fn notification_url(&self) -> Option<String> {
        self.notify_port.map(|port| {
            format!(
                "{}://{}:{}{}",
                self.scheme.as_str(),
                self.register_addr,
                port,
                NOTIFICATION_PATH
            )
        })
    }
}
