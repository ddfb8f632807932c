use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "semcss.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub compiler: CompilerConfig,
    #[serde(default)]
    pub ai: AiConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Theme {
    #[serde(default = "default_theme_name")]
    pub name: String,
    /// Extra palette families, `family -> shade -> hex`.
    #[serde(default)]
    pub colors: BTreeMap<String, BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    /// Emit CSS-module references for every input flavor, not only jsx/tsx.
    #[serde(default)]
    pub css_module: bool,
    #[serde(default = "default_true")]
    pub header: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompilerConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_compiler_command")]
    pub command: String,
    #[serde(default = "default_compiler_args")]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AiConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_ai_model")]
    pub model: String,
    #[serde(default = "default_ai_base_url")]
    pub base_url: String,
    #[serde(default = "default_ai_key_env")]
    pub api_key_env: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ConfigError {
    pub message: String,
}

pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let text = fs::read_to_string(path).map_err(|err| ConfigError {
        message: format!("failed to read config {}: {}", path.display(), err),
    })?;
    toml::from_str(&text).map_err(|err| ConfigError {
        message: format!("failed to parse config {}: {}", path.display(), err),
    })
}

/// Loads `path` when given, else `semcss.toml` from `base_dir` when it exists,
/// else the defaults.
pub fn load_or_default(path: Option<&Path>, base_dir: &Path) -> Result<Config, ConfigError> {
    if let Some(path) = path {
        return load(path);
    }
    let candidate = base_dir.join(DEFAULT_CONFIG_FILE);
    if candidate.is_file() {
        return load(&candidate);
    }
    Ok(Config::default())
}

fn default_theme_name() -> String {
    "default".to_string()
}

fn default_true() -> bool {
    true
}

fn default_compiler_command() -> String {
    "npx".to_string()
}

fn default_compiler_args() -> Vec<String> {
    vec!["tailwindcss".to_string()]
}

fn default_ai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_ai_base_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_ai_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: default_theme_name(),
            colors: BTreeMap::new(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            css_module: false,
            header: true,
        }
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            command: default_compiler_command(),
            args: default_compiler_args(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model: default_ai_model(),
            base_url: default_ai_base_url(),
            api_key_env: default_ai_key_env(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, DEFAULT_CONFIG_FILE, load, load_or_default};
    use std::fs;

    #[test]
    fn loads_toml_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("semcss.toml");
        fs::write(&path, "theme = { name = \"custom\" }").expect("write config");
        let config = load(&path).expect("config should parse");
        assert_eq!(config.theme.name, "custom");
    }

    #[test]
    fn defaults_when_sections_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("empty.toml");
        fs::write(&path, "").expect("write config");
        let config = load(&path).expect("config should parse");
        assert_eq!(config, Config::default());
        assert!(config.output.header);
        assert_eq!(config.compiler.command, "npx");
        assert_eq!(config.compiler.args, vec!["tailwindcss".to_string()]);
        assert_eq!(config.ai.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn loads_theme_colors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("colors.toml");
        fs::write(
            &path,
            r##"
[theme.colors.brand]
500 = "#ff0066"

[theme.colors.lime]
600 = "#65a30d"
"##,
        )
        .expect("write config");
        let config = load(&path).expect("config should parse");
        assert_eq!(config.theme.colors["brand"]["500"], "#ff0066");
        assert_eq!(config.theme.colors["lime"]["600"], "#65a30d");
    }

    #[test]
    fn loads_collaborator_sections() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("full.toml");
        fs::write(
            &path,
            r#"
[output]
css_module = true
header = false

[compiler]
enabled = true
command = "bunx"

[ai]
enabled = true
model = "gpt-4o-mini"
"#,
        )
        .expect("write config");
        let config = load(&path).expect("config should parse");
        assert!(config.output.css_module);
        assert!(!config.output.header);
        assert!(config.compiler.enabled);
        assert_eq!(config.compiler.command, "bunx");
        assert_eq!(config.compiler.args, vec!["tailwindcss".to_string()]);
        assert!(config.ai.enabled);
        assert_eq!(config.ai.model, "gpt-4o-mini");
    }

    #[test]
    fn reports_parse_errors_with_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[theme").expect("write config");
        let err = load(&path).expect_err("config should fail");
        assert!(err.message.starts_with("failed to parse config"));
        assert!(err.message.contains("broken.toml"));
    }

    #[test]
    fn picks_up_default_file_from_base_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "[compiler]\nenabled = true\n",
        )
        .expect("write config");
        let config = load_or_default(None, dir.path()).expect("config should load");
        assert!(config.compiler.enabled);

        let empty = tempfile::tempdir().expect("tempdir");
        let config = load_or_default(None, empty.path()).expect("defaults");
        assert_eq!(config, Config::default());
    }
}
