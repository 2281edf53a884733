use std::env;

use crate::services::places::DEFAULT_MIRRORS;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub nvidia_api_key: String,
    pub nvidia_model: String,
    pub nvidia_base_url: String,
    pub nominatim_url: String,
    pub osrm_url: String,
    pub overpass_mirrors: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "concierge.db".to_string()),
            nvidia_api_key: env::var("NVIDIA_API_KEY").unwrap_or_default(),
            nvidia_model: env::var("NVIDIA_MODEL")
                .unwrap_or_else(|_| "meta/llama3-70b-instruct".to_string()),
            nvidia_base_url: env::var("NVIDIA_BASE_URL")
                .unwrap_or_else(|_| "https://integrate.api.nvidia.com/v1".to_string()),
            nominatim_url: env::var("NOMINATIM_URL")
                .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string()),
            osrm_url: env::var("OSRM_URL")
                .unwrap_or_else(|_| "https://router.project-osrm.org".to_string()),
            overpass_mirrors: env::var("OVERPASS_MIRRORS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_else(|_| DEFAULT_MIRRORS.iter().map(|s| s.to_string()).collect()),
        }
    }
}
