use crate::error::{Result, StepperError};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::Arc;
use tracing::debug;

/// A single external command: program, arguments and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub dir: PathBuf,
}

impl Invocation {
    pub fn new<P: AsRef<Path>>(program: &str, args: &[&str], dir: P) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Shell-like rendering of the command, quoting arguments with whitespace.
    pub fn printable(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(self.program.clone());
        for arg in &self.args {
            if arg.is_empty() || arg.chars().any(|c| c.is_whitespace() || c == '"') {
                parts.push(format!("{arg:?}"));
            } else {
                parts.push(arg.clone());
            }
        }
        parts.join(" ")
    }
}

/// Runs external commands and returns their trimmed combined output.
pub trait CommandRunner: Send + Sync {
    fn run(&self, invocation: &Invocation) -> Result<String>;
}

/// CommandRunner backed by `std::process::Command`.
#[derive(Debug, Default)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    pub fn shared() -> Arc<dyn CommandRunner> {
        Arc::new(Self)
    }

    fn combined_output(output: &Output) -> String {
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        combined.trim().to_string()
    }
}

impl CommandRunner for SystemCommandRunner {
    fn run(&self, invocation: &Invocation) -> Result<String> {
        debug!(command = %invocation.printable(), dir = %invocation.dir.display(), "running");

        let output = Command::new(&invocation.program)
            .current_dir(&invocation.dir)
            .args(&invocation.args)
            .output()
            .map_err(|e| StepperError::ProcessSpawn {
                command: invocation.printable(),
                reason: e.to_string(),
            })?;

        let combined = Self::combined_output(&output);
        if !output.status.success() {
            return Err(StepperError::ExternalTool {
                command: invocation.printable(),
                output: combined,
            });
        }

        Ok(combined)
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Answers invocations by their printable form and records every call.
    #[derive(Default)]
    pub struct FakeRunner {
        responses: HashMap<String, std::result::Result<String, String>>,
        pub calls: Mutex<Vec<Invocation>>,
    }

    impl FakeRunner {
        pub fn with(mut self, command: &str, output: &str) -> Self {
            self.responses
                .insert(command.to_string(), Ok(output.to_string()));
            self
        }

        pub fn failing(mut self, command: &str, output: &str) -> Self {
            self.responses
                .insert(command.to_string(), Err(output.to_string()));
            self
        }

        pub fn called(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(Invocation::printable)
                .collect()
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(&self, invocation: &Invocation) -> Result<String> {
            self.calls.lock().unwrap().push(invocation.clone());
            let command = invocation.printable();
            match self.responses.get(&command) {
                Some(Ok(out)) => Ok(out.clone()),
                Some(Err(out)) => Err(StepperError::ExternalTool {
                    command,
                    output: out.clone(),
                }),
                None => Err(StepperError::ProcessSpawn {
                    command,
                    reason: "unexpected command".to_string(),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_quotes_arguments_with_spaces() {
        let inv = Invocation::new("go", &["list", "-f", "{{ join .Imports \"\\n\" }}", "./..."], ".");
        assert_eq!(
            inv.printable(),
            r#"go list -f "{{ join .Imports \"\\n\" }}" ./..."#
        );
    }

    #[test]
    fn system_runner_reports_failure_with_output() {
        let dir = tempfile::tempdir().unwrap();
        let inv = Invocation::new("sh", &["-c", "echo boom >&2; exit 3"], dir.path());
        let err = SystemCommandRunner.run(&inv).unwrap_err();
        match err {
            StepperError::ExternalTool { output, .. } => assert_eq!(output, "boom"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn system_runner_returns_trimmed_output() {
        let dir = tempfile::tempdir().unwrap();
        let inv = Invocation::new("sh", &["-c", "echo hello"], dir.path());
        assert_eq!(SystemCommandRunner.run(&inv).unwrap(), "hello");
    }
}
