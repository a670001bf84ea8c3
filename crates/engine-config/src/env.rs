use crate::settings::error::SettingsError;
use std::{collections::HashMap, fs, path::Path};

/// Variables gathered from the process environment and, optionally, a
/// `.env` file. Values read from the file override the process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvManager {
    vars: HashMap<String, String>,
}

impl EnvManager {
    pub fn new() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), SettingsError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| SettingsError::EnvFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        self.parse_env_content(&content)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn all(&self) -> &HashMap<String, String> {
        &self.vars
    }

    /// Keys whose values must never appear in logs.
    pub fn is_sensitive(key: &str) -> bool {
        const PATTERNS: [&str; 6] = ["secret", "token", "key", "password", "credential", "code"];
        let key = key.to_ascii_lowercase();
        PATTERNS.iter().any(|p| key.contains(p))
    }

    fn parse_env_content(&mut self, content: &str) -> Result<(), SettingsError> {
        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let line = line.strip_prefix("export ").unwrap_or(line);
            let Some((key, value)) = line.split_once('=') else {
                return Err(SettingsError::EnvSyntax {
                    line: line_num + 1,
                    reason: "expected KEY=VALUE".into(),
                });
            };

            let key = key.trim();
            if key.is_empty() {
                return Err(SettingsError::EnvSyntax {
                    line: line_num + 1,
                    reason: "empty key".into(),
                });
            }

            self.vars
                .insert(key.to_string(), Self::unquote_value(value.trim()));
        }

        Ok(())
    }

    fn unquote_value(value: &str) -> String {
        for quote in ['"', '\''] {
            if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
                return value[1..value.len() - 1].to_string();
            }
        }
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_env() {
        let mut env = EnvManager::empty();
        let content = r#"
# Comment
TABLESCOPE_ENDPOINT=https://fn.example.net/api/list
export TABLESCOPE_FETCH_MODE=incremental
        "#;

        env.parse_env_content(content).unwrap();
        assert_eq!(
            env.get("TABLESCOPE_ENDPOINT"),
            Some("https://fn.example.net/api/list")
        );
        assert_eq!(env.get("TABLESCOPE_FETCH_MODE"), Some("incremental"));
    }

    #[test]
    fn test_parse_quoted_values() {
        let mut env = EnvManager::empty();
        let content = r#"
QUOTED="value with spaces"
SINGLE='single quoted'
WITH_EQUALS=a=b
        "#;

        env.parse_env_content(content).unwrap();
        assert_eq!(env.get("QUOTED"), Some("value with spaces"));
        assert_eq!(env.get("SINGLE"), Some("single quoted"));
        assert_eq!(env.get("WITH_EQUALS"), Some("a=b"));
    }

    #[test]
    fn test_invalid_env_format() {
        let mut env = EnvManager::empty();
        let err = env.parse_env_content("A=1\nINVALID LINE").unwrap_err();
        assert!(matches!(err, SettingsError::EnvSyntax { line: 2, .. }));
        assert!(env.parse_env_content("=value").is_err());
    }

    #[test]
    fn test_file_overrides_existing_values() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "TABLESCOPE_VIEW_PAGE_SIZE=50").unwrap();

        let mut env = EnvManager::empty();
        env.set("TABLESCOPE_VIEW_PAGE_SIZE", "10");
        env.load_from_file(file.path()).unwrap();
        assert_eq!(env.get("TABLESCOPE_VIEW_PAGE_SIZE"), Some("50"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut env = EnvManager::empty();
        let err = env.load_from_file(dir.path().join("missing.env")).unwrap_err();
        assert!(matches!(err, SettingsError::EnvFile { .. }));
    }

    #[test]
    fn test_blank_values_read_as_unset() {
        let mut env = EnvManager::empty();
        env.set("TABLESCOPE_API_KEY", "  ");
        assert_eq!(env.get("TABLESCOPE_API_KEY"), None);
    }

    #[test]
    fn test_sensitive_keys() {
        assert!(EnvManager::is_sensitive("TABLESCOPE_API_KEY"));
        assert!(EnvManager::is_sensitive("TABLESCOPE_CLIENT_SECRET"));
        assert!(!EnvManager::is_sensitive("TABLESCOPE_ENDPOINT"));
    }
}
