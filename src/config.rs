use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use structopt::StructOpt;

/// server settings. every option can also come from the environment (or `.env`).
#[derive(Debug, Clone, StructOpt)]
#[structopt(name = "exercise-log-server", about = "http api for registering users and logging exercises")]
pub struct Config {
    /// postgres connection string
    #[structopt(long, env = "DATABASE_URL", default_value = "postgres://localhost:5432/exercise_log")]
    pub database_url: String,

    #[structopt(long, env = "LISTEN_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    #[structopt(long, env = "PORT", default_value = "3030")]
    pub port: u16,

    /// upper bound on each storage call
    #[structopt(long, env = "REQUEST_TIMEOUT_MS", default_value = "5000")]
    pub request_timeout_ms: u64,

    /// default tracing filter; RUST_LOG takes precedence
    #[structopt(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// keep everything in process memory instead of postgres (lost on exit)
    #[structopt(long)]
    pub in_memory: bool,
}

impl Config {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
