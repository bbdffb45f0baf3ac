//! Locating and invoking the external GROMACS binary.

use super::error::EngineError;
use super::selection::ScriptedInput;
use std::env;
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, trace, warn};

/// Resolves `program` to an executable file.
///
/// A value containing a path separator is checked as-is; a bare name is
/// searched for in every `PATH` entry.
pub fn locate_executable(program: &Path) -> Option<PathBuf> {
    if program.components().count() > 1 {
        return is_executable(program).then(|| program.to_path_buf());
    }

    let path_var = env::var_os("PATH")?;
    env::split_paths(&path_var)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}

/// A fully specified call of an external program.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub stdin: ScriptedInput,
    pub working_dir: PathBuf,
}

impl Invocation {
    pub fn command_line(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStatus {
    pub code: Option<i32>,
    pub stderr_tail: String,
}

impl ToolStatus {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs an [`Invocation`] to completion.
pub trait ToolRunner {
    fn run(&self, invocation: &Invocation) -> Result<ToolStatus, EngineError>;
}

const STDERR_TAIL_LINES: usize = 5;

/// Runs invocations as child processes, blocking until each exits.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation) -> Result<ToolStatus, EngineError> {
        debug!("Running: {}", invocation.command_line());
        trace!("Scripted input: {}", invocation.stdin);

        let spawn_error = |source| EngineError::Spawn {
            program: invocation.program.display().to_string(),
            source,
        };

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(invocation.stdin.to_stdin().as_bytes()) {
                // The tool may exit before reading its prompts.
                warn!("Could not write scripted input to {:?}: {}", invocation.program, e);
            }
        }

        let output = child.wait_with_output().map_err(spawn_error)?;
        trace!("stdout: {}", String::from_utf8_lossy(&output.stdout));

        let stderr = String::from_utf8_lossy(&output.stderr);
        let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
        let stderr_tail = lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("\n");

        Ok(ToolStatus {
            code: output.status.code(),
            stderr_tail,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_explicit_path_is_not_located() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(locate_executable(&dir.path().join("gmx")), None);
    }

    #[cfg(unix)]
    #[test]
    fn explicit_path_requires_execute_bit() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("gmx");
        std::fs::write(&tool, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o644)).unwrap();
        assert_eq!(locate_executable(&tool), None);

        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(locate_executable(&tool), Some(tool));
    }

    #[cfg(unix)]
    #[test]
    fn process_runner_pipes_input_and_reports_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let invocation = Invocation {
            program: PathBuf::from("/bin/sh"),
            args: vec![
                "-c".into(),
                "read a; read b; echo \"$a-$b\" > picked.txt; echo boom >&2; exit 3".into(),
            ],
            stdin: ScriptedInput::new().with("fit", "4").with("output", "1"),
            working_dir: dir.path().to_path_buf(),
        };

        let status = ProcessRunner.run(&invocation).unwrap();

        assert_eq!(status.code, Some(3));
        assert!(!status.success());
        assert_eq!(status.stderr_tail, "boom");
        assert_eq!(
            std::fs::read_to_string(dir.path().join("picked.txt")).unwrap(),
            "4-1\n"
        );
    }

    #[test]
    fn spawn_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let invocation = Invocation {
            program: dir.path().join("no-such-tool"),
            args: Vec::new(),
            stdin: ScriptedInput::new(),
            working_dir: dir.path().to_path_buf(),
        };
        assert!(matches!(
            ProcessRunner.run(&invocation),
            Err(EngineError::Spawn { .. })
        ));
    }
}
