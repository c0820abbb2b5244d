//! §6.6 configuration. Every option is an environment variable; `clap`
//! gives us `--flag` overrides and `--help` for free without a config
//! file (there is no multi-tenant config store to layer here, unlike
//! the egress-routing teacher this crate started from).

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "ingestgate-server")]
#[command(about = "Ingestion & Processing Core gateway", long_about = None)]
pub struct ServerConfig {
    /// Bind host.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Bind port.
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// HMAC secret for signed identity tokens (§4.1 mode 1). Required.
    #[arg(long, env = "INTERNAL_JWT_SECRET", default_value = "")]
    pub internal_jwt_secret: String,

    #[arg(long, env = "INTERNAL_JWT_ISSUER", default_value = "")]
    pub internal_jwt_issuer: String,

    #[arg(long, env = "INTERNAL_JWT_AUDIENCE", default_value = "")]
    pub internal_jwt_audience: String,

    /// §4.1 mode 2. Off in production.
    #[arg(long, env = "ALLOW_LEGACY_HEADER_AUTH", default_value_t = false)]
    pub allow_legacy_header_auth: bool,

    #[arg(long, env = "MOCK_TENANT_ID")]
    pub mock_tenant_id: Option<String>,

    #[arg(long, env = "MOCK_USER_ID")]
    pub mock_user_id: Option<String>,

    #[arg(long, env = "UPLOAD_BUCKET_NAME", default_value = "")]
    pub upload_bucket_name: String,

    #[arg(long, env = "UPLOAD_REGION", default_value = "us-east-1")]
    pub upload_region: String,

    #[arg(long, env = "KINESIS_STREAM_NAME", default_value = "eq-interactions-stream-dev")]
    pub kinesis_stream_name: String,

    #[arg(long, env = "EVENTBRIDGE_BUS_NAME", default_value = "default")]
    pub eventbridge_bus_name: String,

    #[arg(long, env = "EVENT_SOURCE", default_value = "com.yourapp.transcription")]
    pub event_source: String,

    /// Required. Async Postgres DSN.
    #[arg(long, env = "DATABASE_URL", default_value = "")]
    pub database_url: String,

    /// Optional. Falls back to the in-process store when unset.
    #[arg(long, env = "SESSION_BUFFER_URL")]
    pub session_buffer_url: Option<String>,

    /// §4.7/§5: the orchestrator's two permitted shapes — await both lanes
    /// inline before responding (default), or detach them to a background
    /// task so a caller disconnect can never be observed as cancellation.
    #[arg(long, env = "DETACH_ORCHESTRATOR_LANES", default_value_t = false)]
    pub detach_orchestrator_lanes: bool,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
