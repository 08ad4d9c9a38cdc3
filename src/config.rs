use std::env;

use anyhow::{bail, Context};

const WEBHOOK_SECRET: &str = "WEBHOOK_SECRET";
const PORT: &str = "PORT";

const DEFAULT_PORT: u16 = 9000;

#[derive(Debug)]
pub struct Config {
    /// Shared secret used to authenticate webhook payloads
    pub webhook_secret: String,
    /// Port the HTTP listener binds to
    pub port: u16,
}

impl Config {
    /// Loads the configuration from the environment, once, at startup.
    pub fn from_env() -> anyhow::Result<Self> {
        let webhook_secret = match env::var(WEBHOOK_SECRET) {
            Ok(secret) if !secret.is_empty() => secret,
            _ => bail!("{} environment variable required", WEBHOOK_SECRET),
        };

        let port = match env::var(PORT) {
            Ok(port) => port
                .parse()
                .with_context(|| format!("couldn't parse {} value `{}`", PORT, port))?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Config {
            webhook_secret,
            port,
        })
    }
}
