use std::time::Duration;

#[derive(clap::ValueEnum, Clone, Debug, Copy)]
pub enum CargoEnv {
    Development,
    Production,
}

/// how candidate streams get probed, both give the same answer for the same list
#[derive(clap::ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum ProbeStrategyKind {
    Concurrent,
    Sequential,
}

/// what the movie and tv routes answer with when the request doesn't say
#[derive(clap::ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    Json,
    Redirect,
    Player,
    Playlist,
}

impl ResponseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Redirect => "redirect",
            Self::Player => "player",
            Self::Playlist => "playlist",
        }
    }
}

/// name of the env variable that has to be set for the stream routes to work, it's echoed back in
/// the 503 body
pub const MANIFEST_URL_VAR: &str = "ADDON_MANIFEST_URL";

#[derive(clap::Parser, Clone, Debug)]
pub struct AppConfig {
    // production or development
    #[clap(long, env, value_enum, default_value = "development")]
    pub cargo_env: CargoEnv,

    // port that the app will bind to
    #[clap(long, env, default_value = "3000")]
    pub port: u16,

    // all interfaces unless told otherwise
    #[clap(long, env, default_value = "0.0.0.0")]
    pub host: String,

    // the addon manifest, has to end in /manifest.json. If it's missing or broken the server still
    // starts but every stream route answers 503
    #[clap(long, env)]
    pub addon_manifest_url: Option<String>,

    // this should be either * for allowing everything, or a comma seperated list of domains like
    // example.com,something.com
    #[clap(long, env, default_value = "*")]
    pub cors_origin: String,

    // HEAD probe timeout per candidate stream
    #[clap(long, env, default_value = "5")]
    pub probe_timeout_secs: u64,

    // timeout for the manifest and stream listing fetches
    #[clap(long, env, default_value = "15")]
    pub upstream_timeout_secs: u64,

    #[clap(long, env, value_enum, default_value = "concurrent")]
    pub probe_strategy: ProbeStrategyKind,

    // max probes in flight for the concurrent strategy
    #[clap(long, env, default_value = "5")]
    pub probe_concurrency: usize,

    // can be overridden per request with ?mode=
    #[clap(long, env, value_enum, default_value = "json")]
    pub response_mode: ResponseMode,

    // optional sentry integration
    #[clap(long, env)]
    pub sentry_dsn: Option<String>,
}

impl AppConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}

impl Default for AppConfig {
    // mostly used by tests, the binary always goes through clap
    fn default() -> Self {
        Self {
            cargo_env: CargoEnv::Development,
            port: 3000,
            host: "0.0.0.0".to_string(),
            addon_manifest_url: None,
            cors_origin: "*".to_string(),
            probe_timeout_secs: 5,
            upstream_timeout_secs: 15,
            probe_strategy: ProbeStrategyKind::Concurrent,
            probe_concurrency: 5,
            response_mode: ResponseMode::Json,
            sentry_dsn: None,
        }
    }
}
