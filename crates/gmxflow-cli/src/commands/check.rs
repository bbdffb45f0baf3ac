use crate::cli::CheckArgs;
use crate::error::Result;
use gmxflow::engine::{error::EngineError, toolchain::locate_executable};

pub fn run(args: CheckArgs) -> Result<()> {
    match locate_executable(&args.gmx) {
        Some(path) => {
            println!("✓ Found {} at {}", args.gmx.display(), path.display());
            Ok(())
        }
        None => Err(EngineError::ToolNotFound {
            tool: args.gmx.display().to_string(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use tempfile::tempdir;

    #[test]
    fn missing_binary_is_tool_not_found() {
        let dir = tempdir().unwrap();

        let result = run(CheckArgs {
            gmx: dir.path().join("bin/gmx"),
        });

        assert!(matches!(
            result,
            Err(CliError::Engine(EngineError::ToolNotFound { .. }))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn executable_at_explicit_path_is_found() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempdir().unwrap();
        let gmx = dir.path().join("gmx_mpi");
        std::fs::write(&gmx, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&gmx, std::fs::Permissions::from_mode(0o755)).unwrap();

        assert!(run(CheckArgs { gmx }).is_ok());
    }
}
