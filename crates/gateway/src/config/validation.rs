use obsgate_common::config::GatewayConfig;

use super::loader::ConfigError;
use crate::tools::guard::{MODIFIER_LOG_TRUNCATION, MODIFIER_NONE};

/// Validate the complete gateway configuration.
///
/// Collects every problem before failing so one run reports them all.
pub fn validate(config: &GatewayConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_server(config, &mut errors);
    validate_backend(config, &mut errors);
    validate_guards(config, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation(errors.join("; ")))
    }
}

fn validate_server(config: &GatewayConfig, errors: &mut Vec<String>) {
    if config.server.port == 0 {
        errors.push("server.port must be > 0".into());
    }
}

fn validate_backend(config: &GatewayConfig, errors: &mut Vec<String>) {
    let b = &config.backend;

    if b.base_url.is_empty() {
        errors.push("backend.base_url must not be empty".into());
    } else if !(b.base_url.starts_with("http://") || b.base_url.starts_with("https://")) {
        errors.push("backend.base_url must start with http:// or https://".into());
    }
    if b.timeout_seconds == 0 {
        errors.push("backend.timeout_seconds must be > 0".into());
    }
}

fn validate_guards(config: &GatewayConfig, errors: &mut Vec<String>) {
    let mut names: Vec<&String> = config.guard.tools.keys().collect();
    names.sort();

    for name in names {
        let tool = &config.guard.tools[name];

        if let Some(max_tokens) = tool.max_tokens {
            if max_tokens <= 0 {
                errors.push(format!("guard.tools.{}.max_tokens must be > 0", name));
            }
        }
        if tool
            .too_large_message
            .as_deref()
            .is_some_and(|m| m.trim().is_empty())
        {
            errors.push(format!(
                "guard.tools.{}.too_large_message must not be empty",
                name
            ));
        }
        if let Some(modifier) = tool.modifier.as_deref() {
            if modifier != MODIFIER_LOG_TRUNCATION && modifier != MODIFIER_NONE {
                errors.push(format!(
                    "guard.tools.{}.modifier must be one of '{}', '{}'",
                    name, MODIFIER_LOG_TRUNCATION, MODIFIER_NONE
                ));
            }
        }
    }
}
