//! Bounded execution of external commands
//!
//! Each command runs in its own process group so a timeout can take down whatever it
//! spawned. Output is drained on reader threads, a full pipe never stalls the deadline,
//! and collecting that output is bounded by the same deadline as the exit.

use log::debug;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use std::io::{ErrorKind, Read};
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crate::utils::{ExecError, InvocationMode};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone)]
pub struct Runner {
    program: String,
    mode: InvocationMode,
    timeout: Duration,
}

impl Runner {
    pub fn new(program: impl Into<String>, mode: InvocationMode, timeout: Duration) -> Self {
        Runner { program: program.into(), mode, timeout }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run to completion and return stdout, failing on non-zero exit or timeout.
    pub fn run(&self, args: &[&str]) -> Result<String, ExecError> {
        self.run_with_env(args, &[])
    }

    pub fn run_with_env(&self, args: &[&str], env: &[(&str, &str)]) -> Result<String, ExecError> {
        debug!("exec ({}): {} {}", self.mode, self.program, args.join(" "));

        let mut cmd = self.command(args, env);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0);

        let mut child = cmd.spawn().map_err(|e| match e.kind() {
            ErrorKind::NotFound => ExecError::NotFound(self.launcher().to_string()),
            _ => ExecError::Spawn { program: self.program.clone(), source: e },
        })?;

        let deadline = Instant::now() + self.timeout;
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match wait_until(&mut child, deadline) {
            Ok(Some(status)) => status,
            Ok(None) => {
                terminate(&mut child);
                return Err(self.timed_out());
            }
            Err(e) => {
                terminate(&mut child);
                return Err(ExecError::Spawn { program: self.program.clone(), source: e });
            }
        };

        // Background members of the group still hold the pipes open
        kill_group(&child);
        let (Some(stdout), Some(stderr)) = (collect(&stdout, deadline), collect(&stderr, deadline)) else {
            return Err(self.timed_out());
        };

        if status.success() {
            Ok(stdout)
        } else {
            Err(ExecError::Failed {
                program: self.program.clone(),
                status: describe(status),
                stderr: first_line(&stderr),
            })
        }
    }

    fn timed_out(&self) -> ExecError {
        ExecError::TimedOut { program: self.program.clone(), secs: self.timeout.as_secs() }
    }

    fn launcher(&self) -> &str {
        match self.mode {
            InvocationMode::Direct => &self.program,
            InvocationMode::Sudo => "sudo",
        }
    }

    fn command(&self, args: &[&str], env: &[(&str, &str)]) -> Command {
        match self.mode {
            InvocationMode::Direct => {
                let mut cmd = Command::new(&self.program);
                cmd.args(args).envs(env.iter().copied());
                cmd
            }
            InvocationMode::Sudo => {
                // sudo resets the environment, pass variables through env(1)
                let mut cmd = Command::new("sudo");
                cmd.arg("-n");
                if !env.is_empty() {
                    cmd.arg("env");
                    cmd.args(env.iter().map(|(k, v)| format!("{}={}", k, v)));
                }
                cmd.arg(&self.program).args(args);
                cmd
            }
        }
    }
}

/// Locate a program the way a shell would: as a path when it has a slash, else on `PATH`.
pub fn find_program(program: &str) -> Option<PathBuf> {
    if program.contains('/') {
        let path = Path::new(program);
        return path.is_file().then(|| path.to_path_buf());
    }

    std::env::var_os("PATH").and_then(|paths| {
        std::env::split_paths(&paths)
            .map(|dir| dir.join(program))
            .find(|candidate| candidate.is_file())
    })
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
    });
    rx
}

/// `None` when the pipe is still open at the deadline.
fn collect(rx: &Receiver<String>, deadline: Instant) -> Option<String> {
    match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(out) => Some(out),
        Err(RecvTimeoutError::Disconnected) => Some(String::new()),
        Err(RecvTimeoutError::Timeout) => None,
    }
}

fn wait_until(child: &mut Child, deadline: Instant) -> std::io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

// A sudo-launched group belongs to root and may refuse the signal; the child is then
// left behind and reaped when this process exits.
fn terminate(child: &mut Child) {
    kill_group(child);
    let _ = child.kill();
    let _ = child.try_wait();
}

fn kill_group(child: &Child) {
    if let Ok(pid) = i32::try_from(child.id()) {
        let _ = killpg(Pid::from_raw(pid), Signal::SIGKILL);
    }
}

fn describe(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit code {}", code),
        None => "signal".to_string(),
    }
}

fn first_line(s: &str) -> String {
    s.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("").to_string()
}
