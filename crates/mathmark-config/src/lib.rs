use mathmark_engine::{CompiledMatcher, DelimiterError, DelimiterSpec, RenderOptions, compile};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid delimiter list: {0}")]
    DelimiterError(#[from] DelimiterError),
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ordered delimiter list; `None` selects [`DelimiterSpec::defaults`].
    pub delimiters: Option<Vec<DelimiterSpec>>,
    /// Options passed through to KaTeX.
    pub katex: RenderOptions,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = Self::expand_path(config_path.as_ref());
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.clone(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.clone(),
                source,
            })?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/mathmark");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// The configured delimiter list, or the defaults.
    pub fn delimiters(&self) -> Vec<DelimiterSpec> {
        self.delimiters
            .clone()
            .unwrap_or_else(DelimiterSpec::defaults)
    }

    /// Compiles the configured delimiter list.
    pub fn matcher(&self) -> Result<CompiledMatcher, ConfigError> {
        Ok(compile(&self.delimiters())?)
    }

    fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => PathBuf::from(expanded.as_ref()),
            Err(_) => path.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathmark_engine::OutputFormat;
    use pretty_assertions::assert_eq;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/mathmark/config.toml"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.delimiters(), DelimiterSpec::defaults());
    }

    #[test]
    fn test_parse_delimiters_and_katex_options() {
        let config_content = r##"
[[delimiters]]
left = "$$"
right = "$$"
display = true

[[delimiters]]
left = "\\("
right = "\\)"

[katex]
throw_on_error = false
output = "mathml"
error_color = "#cc0000"

[katex.macros]
"\\RR" = "\\mathbb{R}"
"##;

        let config: Config = toml::from_str(config_content).unwrap();

        assert_eq!(
            config.delimiters(),
            vec![
                DelimiterSpec::block("$$", "$$"),
                DelimiterSpec::inline(r"\(", r"\)"),
            ]
        );
        assert_eq!(config.katex.throw_on_error, Some(false));
        assert_eq!(config.katex.output, Some(OutputFormat::Mathml));
        assert_eq!(config.katex.error_color.as_deref(), Some("#cc0000"));
        assert_eq!(
            config.katex.macros.get(r"\RR").map(String::as_str),
            Some(r"\mathbb{R}")
        );
    }

    #[test]
    fn test_configured_matcher_uses_listed_delimiters() {
        let config = Config {
            delimiters: Some(vec![DelimiterSpec::inline(r"\(", r"\)")]),
            ..Default::default()
        };

        let matcher = config.matcher().unwrap();

        assert!(matcher.match_inline("$x$").is_none());
        assert_eq!(matcher.match_inline(r"\(x\)").unwrap().text, "x");
    }

    #[test]
    fn test_empty_delimiter_is_rejected() {
        let config = Config {
            delimiters: Some(vec![DelimiterSpec::inline("", "$")]),
            ..Default::default()
        };

        let err = config.matcher().unwrap_err();

        assert!(matches!(err, ConfigError::DelimiterError(_)));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_load_invalid_toml_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "delimiters = 3").unwrap();

        let err = Config::load_from_path(&config_file).unwrap_err();

        match err {
            ConfigError::ConfigParseError { config_path, .. } => {
                assert_eq!(config_path, config_file);
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");
        let mut test_config = Config {
            delimiters: Some(vec![
                DelimiterSpec::block("$$", "$$"),
                DelimiterSpec::inline("$", "$"),
            ]),
            ..Default::default()
        };
        test_config.katex.leqno = Some(true);
        test_config
            .katex
            .macros
            .insert(r"\RR".to_string(), r"\mathbb{R}".to_string());

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }

    #[test]
    fn test_load_expands_env_var_in_path() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("config.toml"), "[katex]\ntrust = true\n").unwrap();
        unsafe {
            env::set_var("MATHMARK_TEST_CONFIG_DIR", temp_dir.path());
        }

        let loaded = Config::load_from_path("$MATHMARK_TEST_CONFIG_DIR/config.toml")
            .unwrap()
            .unwrap();

        assert_eq!(loaded.katex.trust, Some(true));

        unsafe {
            env::remove_var("MATHMARK_TEST_CONFIG_DIR");
        }
    }
}
