use crate::config::Config;
use crate::providers::OpenAIProvider;
use crate::traits::Provider;
use anyhow::{Result, anyhow};
use std::sync::Arc;

struct Preset {
    name: &'static str,
    base_url: &'static str,
    key_env_vars: &'static [&'static str],
    needs_key: bool,
}

const PRESETS: &[Preset] = &[
    Preset {
        name: "groq",
        base_url: "https://api.groq.com/openai/v1",
        key_env_vars: &["GROQ_API_KEY", "GUIDELY_GROQ_API_KEY"],
        needs_key: true,
    },
    Preset {
        name: "openai",
        base_url: "https://api.openai.com/v1",
        key_env_vars: &["OPENAI_API_KEY", "GUIDELY_OPENAI_API_KEY"],
        needs_key: true,
    },
    Preset {
        name: "openrouter",
        base_url: "https://openrouter.ai/api/v1",
        key_env_vars: &["OPENROUTER_API_KEY", "GUIDELY_OPENROUTER_API_KEY"],
        needs_key: true,
    },
    Preset {
        name: "ollama",
        base_url: "http://localhost:11434/v1",
        key_env_vars: &[],
        needs_key: false,
    },
];

pub fn provider_names() -> Vec<&'static str> {
    PRESETS.iter().map(|p| p.name).collect()
}

pub fn create_provider(config: &Config) -> Result<Arc<dyn Provider>> {
    let provider_name = config.provider.to_lowercase();

    let preset = PRESETS
        .iter()
        .find(|p| p.name == provider_name)
        .ok_or_else(|| {
            anyhow!(
                "Unknown provider: {}. Available: {}",
                config.provider,
                provider_names().join(", ")
            )
        })?;

    let api_key = resolve_api_key_with_fallback(preset.key_env_vars, config.api_key.as_deref());
    if preset.needs_key && api_key.is_none() {
        return Err(anyhow!(
            "No API key found for {}. Set {} or api_key in the config file",
            preset.name,
            preset.key_env_vars.first().copied().unwrap_or("api_key")
        ));
    }

    let provider = OpenAIProvider::new(api_key)
        .with_name(preset.name)
        .with_base_url(config.base_url.as_deref().unwrap_or(preset.base_url));

    tracing::info!(
        provider = preset.name,
        model = %config.model,
        base_url = provider.base_url(),
        "Reasoning provider ready"
    );

    Ok(Arc::new(provider))
}

fn resolve_api_key_with_fallback(env_vars: &[&str], config_key: Option<&str>) -> Option<String> {
    env_vars
        .iter()
        .filter_map(|var_name| std::env::var(var_name).ok())
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
        .or_else(|| {
            config_key
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(str::to_string)
        })
}
