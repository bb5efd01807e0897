use std::time::Duration;

use anyhow::{bail, Context, Result};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: String,
    pub upload_url: Option<String>,
    pub compose_url: Option<String>,
    /// Overrides the simulated progress interval (synthetic mode only).
    pub sim_tick: Option<Duration>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr =
            std::env::var("STUDIO_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let upload_url = std::env::var("UPLOAD_API_URL").ok();
        let compose_url = std::env::var("COMPOSE_API_URL").ok();

        // Tiny sanity checks (fail fast, fail loud)
        if upload_url.is_some() != compose_url.is_some() {
            bail!("UPLOAD_API_URL and COMPOSE_API_URL must be set together");
        }
        for url in upload_url.iter().chain(compose_url.iter()) {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                bail!("backend URL must start with http:// or https://: {url}");
            }
        }

        let sim_tick = std::env::var("SIM_TICK_MS")
            .ok()
            .map(|v| {
                v.parse::<u64>()
                    .map(Duration::from_millis)
                    .with_context(|| format!("SIM_TICK_MS must be an integer, got {v}"))
            })
            .transpose()?;

        Ok(Self { bind_addr, upload_url, compose_url, sim_tick })
    }

    /// Both remote endpoints, when the service is configured for one.
    pub fn remote(&self) -> Option<(String, String)> {
        match (&self.upload_url, &self.compose_url) {
            (Some(upload), Some(compose)) => Some((upload.clone(), compose.clone())),
            _ => None,
        }
    }
}
