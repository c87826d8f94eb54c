//! careerpath configuration and collaborator factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use careerpath_core::catalog::CareerCatalog;
use careerpath_core::parser::FileQuestionBank;
use careerpath_core::session::SessionConfig;
use careerpath_core::traits::{AchievementNotifier, QuestionBank, RecommendationService};

use crate::achievements::{HttpAchievementNotifier, LogNotifier};
use crate::questions::HttpQuestionBank;
use crate::recommendations::HttpRecommendationService;

/// Where the quiz questions come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QuestionBankConfig {
    /// A TOML or JSON question bank on disk.
    File { path: PathBuf },
    /// The backend's `/api/career-questions` endpoint.
    Http {
        base_url: String,
        #[serde(default = "default_bank_timeout")]
        timeout_secs: u64,
    },
}

impl Default for QuestionBankConfig {
    fn default() -> Self {
        QuestionBankConfig::File {
            path: PathBuf::from("question-banks/riasec-basics.toml"),
        }
    }
}

/// Remote recommendation service settings.
///
/// Note: Custom Debug impl masks the API key to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_service_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_service_timeout")]
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_service_url(),
            api_key: None,
            timeout_secs: default_service_timeout(),
        }
    }
}

/// Achievement ledger settings. Without a `base_url` achievements are only
/// logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementsConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_notify_timeout")]
    pub timeout_secs: u64,
}

impl Default for AchievementsConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_notify_timeout(),
        }
    }
}

/// Top-level careerpath configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareerPathConfig {
    /// User credited with the completion achievement.
    #[serde(default = "default_user_id")]
    pub user_id: String,
    #[serde(default)]
    pub question_bank: QuestionBankConfig,
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub achievements: AchievementsConfig,
    /// Replacement career catalog. The built-in catalog is used when unset.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    /// Upper bound on the whole remote scoring step, on top of the HTTP
    /// client timeout.
    #[serde(default = "default_service_timeout")]
    pub remote_timeout_secs: u64,
    #[serde(default = "default_notify_timeout")]
    pub notify_timeout_secs: u64,
}

fn default_user_id() -> String {
    "local-user".to_string()
}
fn default_service_url() -> String {
    "http://localhost:3001".to_string()
}
fn default_service_timeout() -> u64 {
    30
}
fn default_bank_timeout() -> u64 {
    15
}
fn default_notify_timeout() -> u64 {
    5
}

impl Default for CareerPathConfig {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            question_bank: QuestionBankConfig::default(),
            service: ServiceConfig::default(),
            achievements: AchievementsConfig::default(),
            catalog_path: None,
            remote_timeout_secs: default_service_timeout(),
            notify_timeout_secs: default_notify_timeout(),
        }
    }
}

impl CareerPathConfig {
    /// Session settings for one attempt, sharing an already loaded catalog.
    pub fn session_config(&self, catalog: Arc<CareerCatalog>) -> SessionConfig {
        SessionConfig::new(self.user_id.clone(), catalog)
            .with_remote_timeout(Some(Duration::from_secs(self.remote_timeout_secs)))
            .with_notify_timeout(Duration::from_secs(self.notify_timeout_secs))
    }

    /// Load the configured catalog, or the built-in one.
    pub fn load_catalog(&self) -> Result<CareerCatalog> {
        CareerCatalog::load_or_builtin(self.catalog_path.as_deref())
    }

    fn resolve_env(&mut self) {
        self.user_id = resolve_env_vars(&self.user_id);
        self.question_bank = match &self.question_bank {
            QuestionBankConfig::File { path } => QuestionBankConfig::File {
                path: PathBuf::from(resolve_env_vars(&path.to_string_lossy())),
            },
            QuestionBankConfig::Http {
                base_url,
                timeout_secs,
            } => QuestionBankConfig::Http {
                base_url: resolve_env_vars(base_url),
                timeout_secs: *timeout_secs,
            },
        };
        self.service.base_url = resolve_env_vars(&self.service.base_url);
        self.service.api_key = self.service.api_key.as_deref().map(resolve_env_vars);
        self.achievements.base_url = self.achievements.base_url.as_deref().map(resolve_env_vars);
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `careerpath.toml` in the current directory
/// 2. `~/.config/careerpath/config.toml`
///
/// Environment variable overrides: `CAREERPATH_SERVICE_URL`, `CAREERPATH_API_KEY`.
pub fn load_config() -> Result<CareerPathConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<CareerPathConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("careerpath.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<CareerPathConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            config
        }
        None => CareerPathConfig::default(),
    };

    if let Ok(url) = std::env::var("CAREERPATH_SERVICE_URL") {
        config.service.base_url = url;
    }
    if let Ok(key) = std::env::var("CAREERPATH_API_KEY") {
        config.service.api_key = Some(key);
    }

    config.resolve_env();
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("careerpath"))
}

/// Create the question bank described by `config`.
pub fn create_question_bank(config: &QuestionBankConfig) -> Result<Arc<dyn QuestionBank>> {
    match config {
        QuestionBankConfig::File { path } => Ok(Arc::new(FileQuestionBank::new(path.clone()))),
        QuestionBankConfig::Http {
            base_url,
            timeout_secs,
        } => Ok(Arc::new(HttpQuestionBank::with_timeout(
            base_url,
            *timeout_secs,
        )?)),
    }
}

/// Create the remote recommendation service.
pub fn create_recommendation_service(
    config: &ServiceConfig,
) -> Result<Arc<dyn RecommendationService>> {
    Ok(Arc::new(HttpRecommendationService::with_timeout(
        &config.base_url,
        config.api_key.clone(),
        config.timeout_secs,
    )?))
}

/// Create the achievement notifier; logs only when no ledger is configured.
pub fn create_notifier(config: &AchievementsConfig) -> Result<Arc<dyn AchievementNotifier>> {
    match &config.base_url {
        Some(url) if !url.is_empty() => Ok(Arc::new(HttpAchievementNotifier::with_timeout(
            url,
            config.timeout_secs,
        )?)),
        _ => Ok(Arc::new(LogNotifier)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_CAREERPATH_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_CAREERPATH_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_CAREERPATH_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("${unterminated"), "${unterminated");
        std::env::remove_var("_CAREERPATH_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = CareerPathConfig::default();
        assert_eq!(config.service.base_url, "http://localhost:3001");
        assert_eq!(config.remote_timeout_secs, 30);
        assert_eq!(config.notify_timeout_secs, 5);
        assert!(matches!(
            config.question_bank,
            QuestionBankConfig::File { .. }
        ));
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
user_id = "student-42"
catalog_path = "catalog.toml"
remote_timeout_secs = 10

[question_bank]
type = "http"
base_url = "http://quiz.internal:3001"

[service]
base_url = "http://quiz.internal:3001"
api_key = "sk-test"

[achievements]
base_url = "http://ledger.internal"
timeout_secs = 2
"#;
        let config: CareerPathConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.user_id, "student-42");
        assert_eq!(
            config.question_bank,
            QuestionBankConfig::Http {
                base_url: "http://quiz.internal:3001".into(),
                timeout_secs: 15,
            }
        );
        assert_eq!(config.service.timeout_secs, 30);
        assert_eq!(config.achievements.timeout_secs, 2);
        assert_eq!(config.notify_timeout_secs, 5);

        let session = config.session_config(Arc::new(CareerCatalog::builtin()));
        assert_eq!(session.user_id, "student-42");
        assert_eq!(session.remote_timeout, Some(Duration::from_secs(10)));
    }

    #[test]
    fn debug_masks_api_key() {
        let config = ServiceConfig {
            api_key: Some("sk-very-secret".into()),
            ..ServiceConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-very-secret"));
        assert!(rendered.contains("***"));
    }

    #[test]
    fn load_from_file_resolves_env() {
        std::env::set_var("_CAREERPATH_TEST_USER", "from-env");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("careerpath.toml");
        std::fs::write(
            &path,
            "user_id = \"${_CAREERPATH_TEST_USER}\"\n\n[question_bank]\ntype = \"file\"\npath = \"bank.json\"\n",
        )
        .unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.user_id, "from-env");
        assert_eq!(
            config.question_bank,
            QuestionBankConfig::File {
                path: PathBuf::from("bank.json")
            }
        );
        std::env::remove_var("_CAREERPATH_TEST_USER");
    }

    #[test]
    fn missing_explicit_config_fails() {
        let err = load_config_from(Some(Path::new("/nonexistent/careerpath.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn notifier_without_ledger_logs() {
        assert!(create_notifier(&AchievementsConfig::default()).is_ok());
        assert!(create_question_bank(&QuestionBankConfig::default()).is_ok());
    }
}
