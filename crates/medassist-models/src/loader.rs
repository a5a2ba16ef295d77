//! Device-aware construction of the inference service from [`CoreConfig`].

use crate::model_router::{Endpoint, LlmMode, ModelRouter};
use medassist_core::{CoreConfig, Device, InferenceService, InitializationError, ServiceLoader};
use std::sync::Arc;
use std::time::Duration;

/// Builds a [`ModelRouter`] per device.
///
/// Mock mode loads on any device. Live mode needs `accelerated_api_url` for
/// [`Device::Accelerated`] and `api_url` for [`Device::Cpu`].
pub struct ModelLoader {
    mode: LlmMode,
    model: String,
    api_url: Option<String>,
    accelerated_api_url: Option<String>,
    api_key: Option<String>,
    timeout: Duration,
}

impl ModelLoader {
    pub fn from_config(config: &CoreConfig) -> Self {
        Self {
            mode: LlmMode::from_config(&config.llm_mode),
            model: config.model.clone(),
            api_url: config.api_url.clone(),
            accelerated_api_url: config.accelerated_api_url.clone(),
            api_key: config.api_key.clone(),
            timeout: Duration::from_secs(config.request_timeout_secs.max(1)),
        }
    }

    fn url_for(&self, device: Device) -> Option<&str> {
        let url = match device {
            Device::Accelerated => self.accelerated_api_url.as_deref(),
            Device::Cpu => self.api_url.as_deref(),
        };
        url.map(str::trim).filter(|u| !u.is_empty())
    }
}

impl ServiceLoader for ModelLoader {
    fn load(&self, device: Device) -> Result<Arc<dyn InferenceService>, InitializationError> {
        match self.mode {
            LlmMode::Mock => Ok(Arc::new(ModelRouter::mock())),
            LlmMode::Live => {
                let url = self.url_for(device).ok_or_else(|| InitializationError::Unavailable {
                    device,
                    reason: "no endpoint configured".to_string(),
                })?;
                let router = ModelRouter::live(Endpoint {
                    url: url.to_string(),
                    model: self.model.clone(),
                    api_key: self.api_key.clone(),
                    timeout: self.timeout,
                })
                .map_err(|e| InitializationError::Unavailable {
                    device,
                    reason: e.to_string(),
                })?;
                tracing::debug!(%device, url, model = %self.model, "Live model router built");
                Ok(Arc::new(router))
            }
        }
    }
}
