use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// File name of a diplomacy document, both in the module's own data folder
/// and in every dependent sub-mod directory.
pub const DOCUMENT_FILE_NAME: &str = "Diplomacy.xml";

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    match profiled_env_opt(profile, key) {
        Some(v) => matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}

fn profiled_env_paths(profile: &str, key: &str) -> Vec<PathBuf> {
    profiled_env_opt(profile, key)
        .map(|v| env::split_paths(&v).filter(|p| !p.as_os_str().is_empty()).collect())
        .unwrap_or_default()
}

// ── Top-level config ──────────────────────────────────────────

/// Where the diplomacy documents live and how they are discovered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiplomacyConfig {
    /// Active profile name (empty = default).
    pub profile: String,
    /// Game installation root; the module's own data is resolved below it.
    pub base_path: PathBuf,
    pub module_name: String,
    /// In API mode the module ships no data of its own and only dependent
    /// sub-mods contribute documents.
    pub api_mode: bool,
    /// Dependent sub-mod directories, in declaration order.
    pub submod_dirs: Vec<PathBuf>,
    pub roster_path: Option<PathBuf>,
}

impl Default for DiplomacyConfig {
    fn default() -> Self {
        Self {
            profile: String::new(),
            base_path: PathBuf::from("."),
            module_name: "CustomSpawns".to_string(),
            api_mode: false,
            submod_dirs: Vec::new(),
            roster_path: None,
        }
    }
}

impl DiplomacyConfig {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `DIPLOMACY_PROFILE`. When set (e.g. `TEST`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("DIPLOMACY_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        let defaults = Self::default();
        Self {
            profile: p.to_string(),
            base_path: PathBuf::from(profiled_env_or(p, "DIPLOMACY_BASE_PATH", ".")),
            module_name: profiled_env_or(p, "DIPLOMACY_MODULE_NAME", &defaults.module_name),
            api_mode: profiled_env_bool(p, "DIPLOMACY_API_MODE", defaults.api_mode),
            submod_dirs: profiled_env_paths(p, "DIPLOMACY_SUBMOD_DIRS"),
            roster_path: profiled_env_opt(p, "DIPLOMACY_ROSTER").map(PathBuf::from),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// `<base>/Modules/<module>/ModuleData/Data/Diplomacy.xml`, or `None` in API mode.
    pub fn primary_document_path(&self) -> Option<PathBuf> {
        if self.api_mode {
            return None;
        }
        Some(
            self.base_path
                .join("Modules")
                .join(&self.module_name)
                .join("ModuleData")
                .join("Data")
                .join(DOCUMENT_FILE_NAME),
        )
    }

    /// `<dir>/Diplomacy.xml` for every sub-mod directory, in declaration order.
    pub fn submod_document_paths(&self) -> Vec<PathBuf> {
        self.submod_dirs
            .iter()
            .map(|dir| dir.join(DOCUMENT_FILE_NAME))
            .collect()
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  base_path:   {}", self.base_path.display());
        tracing::info!("  module:      {} (api_mode={})", self.module_name, self.api_mode);
        tracing::info!("  submods:     {}", self.submod_dirs.len());
        tracing::info!(
            "  roster:      {}",
            self.roster_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(none)".to_string())
        );
    }
}
