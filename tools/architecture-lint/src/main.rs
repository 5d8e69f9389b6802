//! CLI for the architecture lint.
//!
//! `architecture-lint [BACKEND_DIR]` checks `BACKEND_DIR/src`; without an
//! argument it checks the `backend` crate next to this tool.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use architecture_lint::{ArchitectureLintError, lint_backend_sources};

fn default_backend_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("backend")
}

fn main() -> ExitCode {
    let backend_dir = std::env::args_os()
        .nth(1)
        .map_or_else(default_backend_dir, PathBuf::from);

    if !backend_dir.join("src").is_dir() {
        let _ = writeln!(
            io::stderr().lock(),
            "no backend sources under {}",
            backend_dir.display()
        );
        return ExitCode::from(2);
    }

    match lint_backend_sources(&backend_dir) {
        Ok(report) => {
            let _ = writeln!(
                io::stdout().lock(),
                "architecture lint: {} files clean",
                report.files_checked
            );
            ExitCode::SUCCESS
        }
        Err(err @ ArchitectureLintError::Violations(_)) => {
            let _ = write!(io::stderr().lock(), "{err}");
            ExitCode::FAILURE
        }
        Err(err) => {
            let _ = writeln!(io::stderr().lock(), "{err}");
            ExitCode::from(2)
        }
    }
}
