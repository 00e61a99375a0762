// Analyzer toolchain management
//
// Owns the external analyzer artifact: decides when it is stale, rebuilds
// it, and serializes concurrent builds so overlapping runs never race a
// partial binary.

use crate::config::AnalyzerConfig;
use crate::error::{Error, Result};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use tokio::process::Command;
use tokio::sync::Mutex;

/// Builds and locates the external analyzer binary.
///
/// The artifact is considered current when the recorded SHA-256 digest of
/// the analyzer source matches the source on disk. The digest is recorded
/// only after a successful build, so a failed or interrupted build leaves
/// the toolchain stale and the next run rebuilds.
pub struct Toolchain {
    config: AnalyzerConfig,
    build_lock: Mutex<()>,
}

impl Toolchain {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            build_lock: Mutex::new(()),
        }
    }

    /// Path of the compiled analyzer binary
    pub fn binary_path(&self) -> PathBuf {
        self.config.source_dir.join(&self.config.binary_name)
    }

    fn source_path(&self) -> PathBuf {
        self.config.source_dir.join(&self.config.source_file)
    }

    fn digest_path(&self) -> PathBuf {
        self.config
            .source_dir
            .join(format!(".{}.sha256", self.config.binary_name))
    }

    /// Ensure the analyzer binary exists and is current, building it if
    /// needed. Concurrent callers wait on the build lock; the second one
    /// observes a fresh artifact and skips its own build.
    pub async fn ensure_built(&self) -> Result<PathBuf> {
        let _guard = self.build_lock.lock().await;

        let source_digest = self.source_digest()?;
        if !self.needs_build(&source_digest) {
            return Ok(self.binary_path());
        }

        self.run_build().await?;

        if !self.binary_path().exists() {
            return Err(Error::build(format!(
                "build command succeeded but produced no binary at {}",
                self.binary_path().display()
            )));
        }

        std::fs::write(self.digest_path(), &source_digest)?;
        Ok(self.binary_path())
    }

    fn needs_build(&self, source_digest: &str) -> bool {
        if self.config.always_rebuild {
            return true;
        }
        if !self.binary_path().exists() {
            return true;
        }
        match std::fs::read_to_string(self.digest_path()) {
            Ok(recorded) => recorded.trim() != source_digest,
            Err(_) => true,
        }
    }

    fn source_digest(&self) -> Result<String> {
        let source = std::fs::read(self.source_path()).map_err(|e| {
            Error::build(format!(
                "cannot read analyzer source {}: {}",
                self.source_path().display(),
                e
            ))
        })?;
        Ok(format!("{:x}", Sha256::digest(&source)))
    }

    async fn run_build(&self) -> Result<()> {
        let program = self
            .config
            .build_command
            .first()
            .ok_or_else(|| Error::build("empty build command"))?;
        let output = Command::new(program)
            .args(&self.config.build_command[1..])
            .current_dir(&self.config.source_dir)
            .output()
            .await
            .map_err(|e| Error::build(format!("cannot run {}: {}", program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::build(format!(
                "{} ({})",
                stderr.trim(),
                output.status
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Toolchain whose "build" copies the source file to the binary path
    fn fake_toolchain(dir: &TempDir) -> Toolchain {
        fs::write(dir.path().join("analyzer.go"), "fake source v1").unwrap();

        let config = AnalyzerConfig {
            source_dir: dir.path().to_path_buf(),
            source_file: "analyzer.go".to_string(),
            binary_name: "analyzer".to_string(),
            build_command: vec![
                "cp".to_string(),
                "analyzer.go".to_string(),
                "analyzer".to_string(),
            ],
            timeout_secs: 5,
            always_rebuild: false,
        };

        Toolchain::new(config)
    }

    #[tokio::test]
    async fn test_first_build_creates_binary_and_digest() {
        let dir = TempDir::new().unwrap();
        let toolchain = fake_toolchain(&dir);

        let binary = toolchain.ensure_built().await.unwrap();
        assert!(binary.exists());
        assert!(toolchain.digest_path().exists());
    }

    #[tokio::test]
    async fn test_unchanged_source_skips_rebuild() {
        let dir = TempDir::new().unwrap();
        let toolchain = fake_toolchain(&dir);

        toolchain.ensure_built().await.unwrap();
        let digest = toolchain.source_digest().unwrap();
        assert!(!toolchain.needs_build(&digest));
    }

    #[tokio::test]
    async fn test_changed_source_triggers_rebuild() {
        let dir = TempDir::new().unwrap();
        let toolchain = fake_toolchain(&dir);

        toolchain.ensure_built().await.unwrap();
        fs::write(dir.path().join("analyzer.go"), "fake source v2").unwrap();

        let digest = toolchain.source_digest().unwrap();
        assert!(toolchain.needs_build(&digest));

        toolchain.ensure_built().await.unwrap();
        assert!(!toolchain.needs_build(&digest));
    }

    #[tokio::test]
    async fn test_always_rebuild_ignores_digest() {
        let dir = TempDir::new().unwrap();
        let mut toolchain = fake_toolchain(&dir);
        toolchain.config.always_rebuild = true;

        toolchain.ensure_built().await.unwrap();
        let digest = toolchain.source_digest().unwrap();
        assert!(toolchain.needs_build(&digest));
    }

    #[tokio::test]
    async fn test_missing_source_is_build_error() {
        let dir = TempDir::new().unwrap();
        let toolchain = fake_toolchain(&dir);
        fs::remove_file(dir.path().join("analyzer.go")).unwrap();

        let result = toolchain.ensure_built().await;
        assert!(matches!(result, Err(Error::Build(_))));
    }

    #[tokio::test]
    async fn test_failing_build_is_build_error() {
        let dir = TempDir::new().unwrap();
        let mut toolchain = fake_toolchain(&dir);
        toolchain.config.build_command =
            vec!["sh".to_string(), "-c".to_string(), "exit 1".to_string()];

        let result = toolchain.ensure_built().await;
        assert!(matches!(result, Err(Error::Build(_))));
        // A failed build must not record a digest, so the next run rebuilds.
        assert!(!toolchain.digest_path().exists());
    }

    #[tokio::test]
    async fn test_build_without_artifact_is_build_error() {
        let dir = TempDir::new().unwrap();
        let mut toolchain = fake_toolchain(&dir);
        toolchain.config.build_command = vec!["true".to_string()];

        let result = toolchain.ensure_built().await;
        assert!(matches!(result, Err(Error::Build(_))));
    }

    #[tokio::test]
    async fn test_missing_build_program_is_build_error() {
        let dir = TempDir::new().unwrap();
        let mut toolchain = fake_toolchain(&dir);
        toolchain.config.build_command = vec!["callmap-no-such-tool".to_string()];

        let result = toolchain.ensure_built().await;
        assert!(matches!(result, Err(Error::Build(_))));
    }

    #[tokio::test]
    async fn test_concurrent_builds_run_once() {
        let dir = TempDir::new().unwrap();
        let mut toolchain = fake_toolchain(&dir);
        // Count build invocations through a side-effect log.
        toolchain.config.build_command = vec![
            "sh".to_string(),
            "-c".to_string(),
            "echo build >> build.log && cp analyzer.go analyzer".to_string(),
        ];

        let (a, b) = tokio::join!(toolchain.ensure_built(), toolchain.ensure_built());
        a.unwrap();
        b.unwrap();

        let log = fs::read_to_string(dir.path().join("build.log")).unwrap();
        assert_eq!(log.lines().count(), 1);
    }
}
