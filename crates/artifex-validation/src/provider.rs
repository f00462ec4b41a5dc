//! Grammar checker seams and the built-in providers
//!
//! A [`CheckerProvider`] loads a [`GrammarChecker`] once; the
//! [`Validator`](crate::Validator) caches whatever it returns. Three providers
//! ship with the crate:
//!
//! - [`ExternalProvider`]: runs a checker executable found on `PATH`
//! - [`BuiltinProvider`]: in-process structural checker
//! - [`NullProvider`]: always unavailable, so every validation is skipped

use crate::error::CheckError;
use crate::grammar::{self, KNOWN_HEADERS};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Loaded grammar checker
#[async_trait]
pub trait GrammarChecker: Send + Sync {
    /// Check `code`; `Ok(())` when it parses
    ///
    /// # Errors
    /// [`CheckError::Syntax`] for grammar violations, [`CheckError::Unavailable`]
    /// when the checker cannot run at all.
    async fn parse(&self, code: &str) -> Result<(), CheckError>;
}

/// Loader for a [`GrammarChecker`]
#[async_trait]
pub trait CheckerProvider: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Load the checker
    ///
    /// # Errors
    /// [`CheckError::Unavailable`] when the checker is absent.
    async fn load(&self) -> Result<Arc<dyn GrammarChecker>, CheckError>;
}

// ============================================================================
// External process checker
// ============================================================================

/// Provider for an external checker executable
///
/// The source is written to the process's stdin. Exit status 0 means
/// valid; otherwise stderr is classified with [`CheckError::classify`].
#[derive(Debug, Clone)]
pub struct ExternalProvider {
    command: String,
    args: Vec<String>,
}

impl ExternalProvider {
    /// Provider for `command` with no extra arguments
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
        }
    }

    /// Extra arguments passed before the source is piped in
    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Configured command
    #[inline]
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    async fn resolve(&self) -> Option<PathBuf> {
        let command = Path::new(&self.command);
        if command.components().count() > 1 {
            return is_executable(command).await.then(|| command.to_path_buf());
        }
        let path = std::env::var_os("PATH")?;
        for dir in std::env::split_paths(&path) {
            let candidate = dir.join(command);
            if is_executable(&candidate).await {
                return Some(candidate);
            }
        }
        None
    }
}

/// Whether `path` is a regular file the current user may execute
async fn is_executable(path: &Path) -> bool {
    let Ok(meta) = tokio::fs::metadata(path).await else {
        return false;
    };
    if !meta.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        meta.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}

#[async_trait]
impl CheckerProvider for ExternalProvider {
    fn name(&self) -> &str {
        "external"
    }

    async fn load(&self) -> Result<Arc<dyn GrammarChecker>, CheckError> {
        let program = self.resolve().await.ok_or_else(|| {
            CheckError::Unavailable(format!("command not found or not executable: {}", self.command))
        })?;
        tracing::debug!(program = %program.display(), "resolved external grammar checker");
        Ok(Arc::new(ExternalChecker {
            program,
            args: self.args.clone(),
        }))
    }
}

struct ExternalChecker {
    program: PathBuf,
    args: Vec<String>,
}

impl ExternalChecker {
    /// Process-level failures mean the checker cannot run, never a grammar verdict
    fn launch_failed(&self, err: &std::io::Error) -> CheckError {
        CheckError::Unavailable(format!(
            "cannot run checker {}: {err}",
            self.program.display()
        ))
    }
}

#[async_trait]
impl GrammarChecker for ExternalChecker {
    async fn parse(&self, code: &str) -> Result<(), CheckError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.launch_failed(&e))?;

        if let Some(mut stdin) = child.stdin.take() {
            // The checker may exit before reading everything; its status decides.
            if let Err(err) = stdin.write_all(code.as_bytes()).await {
                tracing::debug!(error = %err, "checker closed stdin early");
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| self.launch_failed(&e))?;
        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let message = if stderr.is_empty() {
            format!("checker exited with {}", output.status)
        } else {
            stderr
        };
        Err(CheckError::classify(&message))
    }
}

impl fmt::Debug for ExternalChecker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalChecker")
            .field("program", &self.program)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Built-in structural checker
// ============================================================================

static ER_CARDINALITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[|}][|o](?:--|\.\.)[|o][|{]").expect("cardinality regex is valid")
});

/// Provider for [`StructuralChecker`]
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinProvider;

#[async_trait]
impl CheckerProvider for BuiltinProvider {
    fn name(&self) -> &str {
        "builtin"
    }

    async fn load(&self) -> Result<Arc<dyn GrammarChecker>, CheckError> {
        Ok(Arc::new(StructuralChecker))
    }
}

/// In-process checker for the structural rules every format shares
///
/// Checks for a known header token, a non-empty body, terminated quotes
/// and balanced brackets outside quoted text. It does not know any
/// format's statement grammar.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralChecker;

impl StructuralChecker {
    /// Run the checks synchronously
    ///
    /// # Errors
    /// [`CheckError::Syntax`] describing the first violation found.
    pub fn check(code: &str) -> Result<(), CheckError> {
        let mut lines = code
            .lines()
            .enumerate()
            .filter(|(_, line)| grammar::is_significant(line));

        let Some((_, header)) = lines.next() else {
            return Err(CheckError::Syntax("empty diagram source".to_string()));
        };
        let token = grammar::first_token(header);
        if !KNOWN_HEADERS.contains(&token) {
            return Err(CheckError::Syntax(format!(
                "unknown diagram type '{token}' on line 1"
            )));
        }
        let is_er = token == "erDiagram";

        let mut body_lines = 0usize;
        let mut stack: Vec<char> = Vec::new();
        for (idx, line) in lines {
            body_lines += 1;
            let line_no = idx + 1;
            if line.matches('"').count() % 2 != 0 {
                return Err(CheckError::Syntax(format!(
                    "unterminated string on line {line_no}"
                )));
            }
            let line = if is_er {
                ER_CARDINALITY.replace_all(line, " ").into_owned()
            } else {
                line.to_string()
            };
            let mut quoted = false;
            for c in line.chars() {
                match c {
                    '"' => quoted = !quoted,
                    _ if quoted => {}
                    '(' | '[' | '{' => stack.push(c),
                    ')' | ']' | '}' => {
                        let open = match c {
                            ')' => '(',
                            ']' => '[',
                            _ => '{',
                        };
                        if stack.pop() != Some(open) {
                            return Err(CheckError::Syntax(format!(
                                "unexpected '{c}' on line {line_no}"
                            )));
                        }
                    }
                    _ => {}
                }
            }
        }

        if body_lines == 0 {
            return Err(CheckError::Syntax(format!("{token} diagram has no body")));
        }
        if let Some(open) = stack.pop() {
            return Err(CheckError::Syntax(format!("unclosed '{open}'")));
        }
        Ok(())
    }
}

#[async_trait]
impl GrammarChecker for StructuralChecker {
    async fn parse(&self, code: &str) -> Result<(), CheckError> {
        Self::check(code)
    }
}

// ============================================================================
// Null provider
// ============================================================================

/// Provider that never loads; every validation is skipped
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProvider;

#[async_trait]
impl CheckerProvider for NullProvider {
    fn name(&self) -> &str {
        "null"
    }

    async fn load(&self) -> Result<Arc<dyn GrammarChecker>, CheckError> {
        Err(CheckError::Unavailable("grammar checker disabled".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_accepts_generated_shapes() {
        for code in [
            "flowchart TD\n    S1([\"Start\"])\n    S2{\"Is it (valid)?\"}\n    S1 --> S2",
            "%%{init: {'theme':'dark'}}%%\nsequenceDiagram\n    User->>System: Request",
            "erDiagram\n    CUSTOMER ||--o{ ORDER : \"places\"\n    ORDER }o--|| CUSTOMER : \"belongs to\"",
            "mindmap\n  root((Topic))\n    Idea",
            "stateDiagram-v2\n    [*] --> Idle",
        ] {
            assert_eq!(StructuralChecker::check(code), Ok(()), "{code}");
        }
    }

    #[test]
    fn structural_rejects_violations() {
        let cases = [
            ("", "empty diagram source"),
            ("A --> B", "unknown diagram type"),
            ("pie", "no body"),
            ("flowchart TD\n    A[\"open --> B", "unterminated string"),
            ("flowchart TD\n    A[Start --> B", "unclosed '['"),
            ("flowchart TD\n    A] --> B", "unexpected ']'"),
        ];
        for (code, expected) in cases {
            let err = StructuralChecker::check(code).unwrap_err();
            assert!(!err.is_unavailable());
            assert!(err.message().contains(expected), "{code}: {err}");
        }
    }

    #[tokio::test]
    async fn null_provider_is_unavailable() {
        let err = NullProvider.load().await.err().unwrap();
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn missing_external_command_is_unavailable() {
        let provider = ExternalProvider::new("artifex-definitely-not-installed-checker");
        let err = provider.load().await.err().unwrap();
        assert!(err.is_unavailable());
        assert!(err.message().contains("command not found"));
    }

    #[tokio::test]
    async fn missing_external_path_is_unavailable() {
        let provider = ExternalProvider::new("/nonexistent/dir/checker");
        assert!(provider.load().await.err().unwrap().is_unavailable());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_executable_checker_is_unavailable() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_string_lossy().into_owned();

        let err = ExternalProvider::new(path.clone()).load().await.err().unwrap();
        assert!(err.is_unavailable());

        let validator = crate::Validator::new(Arc::new(ExternalProvider::new(path)));
        let result = validator.validate("flowchart TD\n    A --> B").await;
        assert!(result.is_valid());
        assert!(result.is_skipped());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn launch_failure_is_unavailable() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let checker = ExternalChecker {
            program: file.path().to_path_buf(),
            args: Vec::new(),
        };
        let err = checker.parse("flowchart TD\n    A --> B").await.unwrap_err();
        assert!(err.is_unavailable(), "{err}");
        assert!(err.message().contains("cannot run checker"));
    }
}
