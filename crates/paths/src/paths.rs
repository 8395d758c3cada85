//! Project-aware file locations for settings and logs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where the binary was started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuntimeEnvironment {
    /// `cargo run` or a binary inside a `target/` directory
    Development,
    /// Installed binary
    Production,
}

/// Directory layout rooted at `<base>/<studio>/<project_id>`.
#[derive(Debug, Clone)]
pub struct PathContext {
    base_path: Arc<Path>,
    studio: String,
    project_id: String,
    app_id: &'static str,
}

impl PathContext {
    /// Detects the environment and picks the matching base directory.
    pub fn new(
        studio: impl Into<String>,
        project_id: impl Into<String>,
        app_id: &'static str,
    ) -> Self {
        let environment = Self::detect_environment();
        Self::with_base_path(
            Self::determine_base_path(environment),
            studio,
            project_id,
            app_id,
        )
    }

    /// Uses an explicit base directory (development builds and tests).
    pub fn with_base_path(
        base_path: PathBuf,
        studio: impl Into<String>,
        project_id: impl Into<String>,
        app_id: &'static str,
    ) -> Self {
        Self {
            base_path: base_path.into(),
            studio: studio.into(),
            project_id: project_id.into(),
            app_id,
        }
    }

    fn detect_environment() -> RuntimeEnvironment {
        if let Ok(exe_path) = std::env::current_exe()
            && exe_path.components().any(|c| c.as_os_str() == "target")
        {
            return RuntimeEnvironment::Development;
        }
        if std::env::var("CARGO").is_ok() || std::env::var("CARGO_MANIFEST_DIR").is_ok() {
            return RuntimeEnvironment::Development;
        }
        RuntimeEnvironment::Production
    }

    fn determine_base_path(environment: RuntimeEnvironment) -> PathBuf {
        match environment {
            RuntimeEnvironment::Development => std::env::var("CARGO_MANIFEST_DIR")
                .map(PathBuf::from)
                .or_else(|_| std::env::current_dir())
                .unwrap_or_else(|_| PathBuf::from(".")),
            // data_local_dir: Application Support (macOS), LocalAppData (Windows), XDG_DATA_HOME
            RuntimeEnvironment::Production => dirs::data_local_dir()
                .map(|dir| dir.join("Card_Table"))
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    /// `<base>/<studio>/<project_id>`
    pub fn project_root(&self) -> PathBuf {
        self.base_path.join(&self.studio).join(&self.project_id)
    }

    /// `<project_root>/<app_id>.settings.ron`
    pub fn settings_file(&self) -> PathBuf {
        self.project_root()
            .join(format!("{}.settings.ron", self.app_id))
    }

    /// `<project_root>/logs/`
    pub fn logs_dir(&self) -> PathBuf {
        self.project_root().join("logs")
    }

    /// `<project_root>/logs/<app_id>.<timestamp>.log`
    pub fn log_file(&self, timestamp: &str) -> PathBuf {
        self.logs_dir()
            .join(format!("{}.{}.log", self.app_id, timestamp))
    }

    pub fn log_file_now(&self) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();
        self.log_file(&timestamp)
    }

    pub fn ensure_directories(&self) -> std::io::Result<()> {
        for dir in [self.project_root(), self.logs_dir()] {
            if !dir.exists() {
                std::fs::create_dir_all(&dir)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> PathContext {
        PathContext::with_base_path(PathBuf::from("/base"), "studio", "project", "card_table")
    }

    #[test]
    fn test_path_context_structure() {
        assert_eq!(context().project_root(), PathBuf::from("/base/studio/project"));
    }

    #[test]
    fn test_settings_path() {
        assert_eq!(
            context().settings_file(),
            PathBuf::from("/base/studio/project/card_table.settings.ron")
        );
    }

    #[test]
    fn test_log_file_path() {
        assert_eq!(
            context().log_file("20240315-120000"),
            PathBuf::from("/base/studio/project/logs/card_table.20240315-120000.log")
        );
        assert_eq!(context().log_file_now().parent(), Some(context().logs_dir().as_path()));
    }

    #[test]
    fn test_ensure_directories_creates_log_dir() {
        let tmp = std::env::temp_dir().join(format!("paths-test-{}", std::process::id()));
        let ctx = PathContext::with_base_path(tmp.clone(), "studio", "project", "card_table");
        ctx.ensure_directories().unwrap();
        assert!(ctx.logs_dir().is_dir());
        std::fs::remove_dir_all(tmp).unwrap();
    }
}
