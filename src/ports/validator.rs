//! Terraform/Checkov validator with an owned workdir sink.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Output;

use async_trait::async_trait;
use tokio::process::Command;

use super::{CheckReport, ValidatorError, ValidatorPort};

const ARTIFACT_FILE: &str = "main.tf";

/// [`ValidatorPort`] that persists the artifact as `main.tf` in an owned
/// workdir, then shells out to `terraform` for the structural check and
/// `checkov` for the policy check.
///
/// The workdir must not be shared between concurrent runs: the sink is a
/// fixed path, and both checkers read it. Give each run its own validator.
///
/// A checker binary that is not on `PATH` yields a
/// [`CheckReport::skipped`] pass, never a failure.
#[derive(Clone, Debug)]
pub struct TerraformValidator {
    workdir: PathBuf,
    terraform_bin: String,
    checkov_bin: String,
}

impl TerraformValidator {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            terraform_bin: "terraform".to_string(),
            checkov_bin: "checkov".to_string(),
        }
    }

    /// Overrides the checker binaries, e.g. for wrappers or pinned versions.
    #[must_use]
    pub fn with_tools(mut self, terraform: impl Into<String>, checkov: impl Into<String>) -> Self {
        self.terraform_bin = terraform.into();
        self.checkov_bin = checkov.into();
        self
    }

    #[must_use]
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Runs a checker in the workdir. `Ok(None)` means the binary is not
    /// installed.
    async fn run_tool(
        &self,
        program: &str,
        args: &[&str],
    ) -> Result<Option<Output>, ValidatorError> {
        match Command::new(program)
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .await
        {
            Ok(output) => Ok(Some(output)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(tool = program, "checker not installed; skipping");
                Ok(None)
            }
            Err(err) => Err(ValidatorError::Io(err)),
        }
    }
}

#[async_trait]
impl ValidatorPort for TerraformValidator {
    async fn persist(&self, artifact: &str) -> Result<(), ValidatorError> {
        tokio::fs::create_dir_all(&self.workdir).await?;
        tokio::fs::write(self.workdir.join(ARTIFACT_FILE), artifact).await?;
        Ok(())
    }

    // Checks run against the persisted copy; the artifact argument is part
    // of the port contract but the CLI tools only see the sink.
    async fn check_structure(&self, _artifact: &str) -> Result<CheckReport, ValidatorError> {
        let Some(init) = self.run_tool(&self.terraform_bin, &["init"]).await? else {
            return Ok(CheckReport::skipped("terraform"));
        };
        if !init.status.success() {
            let stderr = String::from_utf8_lossy(&init.stderr);
            return Ok(CheckReport::fail(format!("Syntax Error:\n{stderr}")));
        }

        let Some(validate) = self.run_tool(&self.terraform_bin, &["validate"]).await? else {
            return Ok(CheckReport::skipped("terraform"));
        };
        if !validate.status.success() {
            let stderr = String::from_utf8_lossy(&validate.stderr);
            return Ok(CheckReport::fail(format!("Syntax Error:\n{stderr}")));
        }
        Ok(CheckReport::pass())
    }

    async fn check_policy(&self, _artifact: &str) -> Result<CheckReport, ValidatorError> {
        let Some(scan) = self
            .run_tool(&self.checkov_bin, &["-f", ARTIFACT_FILE, "--quiet", "--compact"])
            .await?
        else {
            return Ok(CheckReport::skipped("checkov"));
        };
        if !scan.status.success() {
            let stdout = String::from_utf8_lossy(&scan.stdout);
            return Ok(CheckReport::fail(format!("Security Violations:\n{stdout}")));
        }
        Ok(CheckReport::pass())
    }
}
