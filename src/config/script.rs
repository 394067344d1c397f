use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::sync::Arc;
use log::info;
use crate::error::AgentError;

/// A fixed, named interview protocol: a list of topics with a primary
/// question and optional follow-ups, given verbatim to the completion
/// provider as the only permissible source of questions. Immutable once
/// loaded; shared read-only across all requests.
#[derive(Debug, Clone)]
pub struct Script {
    pub name: String,
    pub content: String,
}

#[derive(Deserialize, Debug)]
struct ScriptFile {
    default_script: String,
    scripts: HashMap<String, String>,
}

#[derive(Debug)]
pub struct ScriptRegistry {
    scripts: HashMap<String, Script>,
    default_name: String,
}

impl ScriptRegistry {
    /// Loads the registry from a JSON file of the form
    /// `{ "default_script": "...", "scripts": { name: text } }`.
    /// A missing file, empty script set, or dangling default is a
    /// startup configuration error.
    pub fn load(path: &str) -> Result<Arc<Self>, AgentError> {
        let file_content = fs
            ::read_to_string(path)
            .map_err(|e| {
                AgentError::Configuration(format!("failed to read scripts file '{}': {}", path, e))
            })?;
        let parsed: ScriptFile = serde_json
            ::from_str(&file_content)
            .map_err(|e| {
                AgentError::Configuration(format!("failed to parse scripts file '{}': {}", path, e))
            })?;

        let registry = Self::from_parts(&parsed.default_script, parsed.scripts)?;
        info!(
            "Loaded {} interview script(s) from {}, default: '{}'",
            registry.scripts.len(),
            path,
            registry.default_name
        );
        Ok(Arc::new(registry))
    }

    pub fn from_parts(
        default_name: &str,
        scripts: HashMap<String, String>
    ) -> Result<Self, AgentError> {
        if scripts.is_empty() {
            return Err(AgentError::Configuration("script registry is empty".to_string()));
        }
        if !scripts.contains_key(default_name) {
            return Err(
                AgentError::Configuration(
                    format!("default script '{}' is not defined in the registry", default_name)
                )
            );
        }

        let scripts = scripts
            .into_iter()
            .map(|(name, content)| {
                let script = Script {
                    name: name.clone(),
                    content,
                };
                (name, script)
            })
            .collect();

        Ok(Self {
            scripts,
            default_name: default_name.to_string(),
        })
    }

    /// Resolves a request's script choice. `None` selects the configured
    /// default; an unknown name is a request error, not a panic.
    pub fn get(&self, name: Option<&str>) -> Result<&Script, AgentError> {
        match name {
            Some(requested) =>
                self.scripts
                    .get(requested)
                    .ok_or_else(|| AgentError::ScriptNotFound(requested.to_string())),
            None => Ok(self.default_script()),
        }
    }

    pub fn default_script(&self) -> &Script {
        // from_parts guarantees the default exists
        &self.scripts[&self.default_name]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_scripts() -> HashMap<String, String> {
        let mut scripts = HashMap::new();
        scripts.insert("cardio".to_string(), "1. Chest Pain ...".to_string());
        scripts.insert("respiratory".to_string(), "1. Cough ...".to_string());
        scripts
    }

    #[test]
    fn resolves_named_and_default_scripts() {
        let registry = ScriptRegistry::from_parts("cardio", sample_scripts()).unwrap();
        assert_eq!(registry.get(Some("respiratory")).unwrap().name, "respiratory");
        assert_eq!(registry.get(None).unwrap().name, "cardio");
    }

    #[test]
    fn unknown_script_is_a_request_error() {
        let registry = ScriptRegistry::from_parts("cardio", sample_scripts()).unwrap();
        match registry.get(Some("neuro")) {
            Err(AgentError::ScriptNotFound(name)) => assert_eq!(name, "neuro"),
            other => panic!("expected ScriptNotFound, got {:?}", other.map(|s| s.name.clone())),
        }
    }

    #[test]
    fn empty_registry_is_rejected() {
        let result = ScriptRegistry::from_parts("cardio", HashMap::new());
        assert!(matches!(result, Err(AgentError::Configuration(_))));
    }

    #[test]
    fn dangling_default_is_rejected() {
        let result = ScriptRegistry::from_parts("missing", sample_scripts());
        assert!(matches!(result, Err(AgentError::Configuration(_))));
    }

    #[test]
    fn loads_from_json_file() {
        let path = std::env::temp_dir().join("interview_agent_scripts_test.json");
        std::fs
            ::write(
                &path,
                r#"{"default_script":"cardio","scripts":{"cardio":"1. Chest Pain ..."}}"#
            )
            .unwrap();

        let registry = ScriptRegistry::load(path.to_str().unwrap()).unwrap();
        assert_eq!(registry.default_script().name, "cardio");
        std::fs::remove_file(&path).ok();
    }
}
