//! Runs embedded `PostgreSQL` lifecycle steps on behalf of the Postgres
//! integration tests when they run as `root`.
//!
//! ```text
//! pg_worker <setup|start|stop> <payload-path>
//! ```
//!
//! The payload is the JSON form of a [`WorkerPayload`]: the cluster settings
//! plus environment overrides. `PostgreSQL` refuses to run as `root`, so the
//! worker re-executes itself as `nobody` before touching the data directory.

#[cfg(unix)]
use camino::{Utf8Path, Utf8PathBuf};
#[cfg(unix)]
use nix::unistd::{Uid, User, initgroups, setgid, setuid};
#[cfg(unix)]
use pg_embedded_setup_unpriv::ambient_dir_and_path;
#[cfg(unix)]
use pg_embedded_setup_unpriv::worker::{PlainSecret, WorkerPayload};
#[cfg(unix)]
use postgresql_embedded::{PostgreSQL, Status};
#[cfg(unix)]
use std::ffi::CString;
#[cfg(unix)]
use std::io::Read;
#[cfg(unix)]
use std::process::{Command, ExitStatus};
#[cfg(unix)]
use std::{env, io};
#[cfg(unix)]
use thiserror::Error;

/// Boxed error type returned from `main`.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[cfg(unix)]
const REEXEC_MARKER_ENV: &str = "ERRAND_PG_WORKER_REEXEC";
#[cfg(unix)]
const TRUSTED_PATH: &str = "/usr/sbin:/usr/bin:/sbin:/bin";
#[cfg(unix)]
const UNPRIVILEGED_USER: &str = "nobody";

#[cfg(unix)]
#[derive(Debug, Error)]
enum PgWorkerError {
    #[error("usage: pg_worker <setup|start|stop> <payload-path>: {0}")]
    Usage(String),
    #[error("failed to read payload: {0}")]
    PayloadRead(#[source] BoxError),
    #[error("failed to parse payload: {0}")]
    PayloadParse(#[source] serde_json::Error),
    #[error("invalid cluster settings: {0}")]
    Settings(String),
    #[error("failed to build runtime: {0}")]
    Runtime(#[source] io::Error),
    #[error("failed to drop privileges: {0}")]
    PrivilegeDrop(String),
    #[error("postgres {step} failed: {message}")]
    Postgres { step: &'static str, message: String },
}

#[cfg(unix)]
#[derive(Debug, Clone, Copy)]
enum Step {
    Setup,
    Start,
    Stop,
}

#[cfg(unix)]
impl Step {
    fn parse(arg: &str) -> Result<Self, PgWorkerError> {
        match arg {
            "setup" => Ok(Self::Setup),
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            other => Err(PgWorkerError::Usage(format!("unknown step '{other}'"))),
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }
}

#[cfg(unix)]
fn main() -> Result<(), BoxError> {
    let args = utf8_args()?;
    reexec_unprivileged_if_root(&args)?;
    let (step, payload_path) = parse_args(&args)?;
    run(step, &payload_path)?;
    Ok(())
}

#[cfg(not(unix))]
fn main() -> Result<(), BoxError> {
    Err("pg_worker only runs on Unix".into())
}

#[cfg(unix)]
fn utf8_args() -> Result<Vec<Utf8PathBuf>, PgWorkerError> {
    env::args_os()
        .map(|arg| {
            arg.into_string()
                .map(Utf8PathBuf::from)
                .map_err(|_| PgWorkerError::Usage("arguments must be UTF-8".to_owned()))
        })
        .collect()
}

#[cfg(unix)]
fn parse_args(args: &[Utf8PathBuf]) -> Result<(Step, Utf8PathBuf), PgWorkerError> {
    match args {
        [_, step, payload] => Ok((Step::parse(step.as_str())?, payload.clone())),
        _ => Err(PgWorkerError::Usage(format!(
            "expected 2 arguments, got {}",
            args.len().saturating_sub(1)
        ))),
    }
}

#[cfg(unix)]
fn run(step: Step, payload_path: &Utf8Path) -> Result<(), PgWorkerError> {
    let payload = load_payload(payload_path)?;
    drop_privileges_if_root()?;
    let settings = payload
        .settings
        .into_settings()
        .map_err(|err| PgWorkerError::Settings(err.to_string()))?;
    apply_environment(&payload.environment);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(PgWorkerError::Runtime)?;
    let mut postgres = PostgreSQL::new(settings);
    if matches!(step, Step::Stop) {
        return runtime
            .block_on(postgres.stop())
            .map_err(|err| failed(step, &err));
    }

    runtime.block_on(async {
        if matches!(step, Step::Setup) {
            postgres.setup().await.map_err(|err| failed(step, &err))?;
        }
        start_unless_running(&mut postgres, step).await
    })?;

    // The server must outlive this process; dropping the handle would stop it.
    std::mem::forget(postgres);
    Ok(())
}

#[cfg(unix)]
async fn start_unless_running(postgres: &mut PostgreSQL, step: Step) -> Result<(), PgWorkerError> {
    if matches!(postgres.status(), Status::Started) {
        return Ok(());
    }
    postgres.start().await.map_err(|err| failed(step, &err))
}

#[cfg(unix)]
fn failed(step: Step, err: &impl std::fmt::Display) -> PgWorkerError {
    PgWorkerError::Postgres {
        step: step.name(),
        message: err.to_string(),
    }
}

#[cfg(unix)]
fn load_payload(path: &Utf8Path) -> Result<WorkerPayload, PgWorkerError> {
    let bytes = read_payload(path).map_err(PgWorkerError::PayloadRead)?;
    serde_json::from_slice(&bytes).map_err(PgWorkerError::PayloadParse)
}

#[cfg(unix)]
fn read_payload(path: &Utf8Path) -> Result<Vec<u8>, BoxError> {
    let (dir, relative) = ambient_dir_and_path(path)?;
    let mut file = dir.open(relative.as_std_path())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(bytes)
}

#[cfg(unix)]
fn apply_environment(environment: &[(String, Option<PlainSecret>)]) {
    for (key, value) in environment {
        // SAFETY: the worker is single-threaded until the runtime is built.
        unsafe {
            match value {
                Some(secret) => env::set_var(key, secret.expose()),
                None => env::remove_var(key),
            }
        }
    }
}

#[cfg(unix)]
fn reexec_unprivileged_if_root(args: &[Utf8PathBuf]) -> Result<(), PgWorkerError> {
    if !Uid::effective().is_root() || env::var_os(REEXEC_MARKER_ENV).is_some() {
        return Ok(());
    }

    let exe = env::current_exe()
        .map_err(PgWorkerError::Runtime)?
        .into_os_string()
        .into_string()
        .map(Utf8PathBuf::from)
        .map_err(|_| PgWorkerError::Usage("executable path must be UTF-8".to_owned()))?;
    let forwarded = args.get(1..).unwrap_or_default();

    let status = match Command::new("runuser")
        .args(["-u", UNPRIVILEGED_USER, "--"])
        .arg(exe.as_std_path())
        .args(forwarded.iter().map(|arg| arg.as_std_path()))
        .env(REEXEC_MARKER_ENV, "1")
        .env("PATH", TRUSTED_PATH)
        .status()
    {
        Ok(status) => status,
        Err(err) if err.kind() == io::ErrorKind::NotFound => reexec_via_su(&exe, forwarded)?,
        Err(err) => return Err(PgWorkerError::PrivilegeDrop(err.to_string())),
    };

    std::process::exit(status.code().unwrap_or(1));
}

#[cfg(unix)]
fn reexec_via_su(exe: &Utf8Path, forwarded: &[Utf8PathBuf]) -> Result<ExitStatus, PgWorkerError> {
    let mut script = format!("{REEXEC_MARKER_ENV}=1 exec {}", shell_quote(exe.as_str()));
    for arg in forwarded {
        script.push(' ');
        script.push_str(&shell_quote(arg.as_str()));
    }

    Command::new("/bin/su")
        .args(["-s", "/bin/sh", UNPRIVILEGED_USER, "-c"])
        .arg(script)
        .env("PATH", TRUSTED_PATH)
        .status()
        .map_err(|err| PgWorkerError::PrivilegeDrop(err.to_string()))
}

/// Single-quotes `value` for `/bin/sh`.
#[cfg(unix)]
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(unix)]
fn drop_privileges_if_root() -> Result<(), PgWorkerError> {
    if !Uid::effective().is_root() {
        return Ok(());
    }

    let user = User::from_name(UNPRIVILEGED_USER)
        .map_err(|err| PgWorkerError::PrivilegeDrop(err.to_string()))?
        .ok_or_else(|| {
            PgWorkerError::PrivilegeDrop(format!("user '{UNPRIVILEGED_USER}' not found"))
        })?;
    let name = CString::new(user.name.clone())
        .map_err(|err| PgWorkerError::PrivilegeDrop(err.to_string()))?;
    initgroups(&name, user.gid).map_err(|err| PgWorkerError::PrivilegeDrop(err.to_string()))?;
    setgid(user.gid).map_err(|err| PgWorkerError::PrivilegeDrop(err.to_string()))?;
    setuid(user.uid).map_err(|err| PgWorkerError::PrivilegeDrop(err.to_string()))?;

    // SAFETY: no other thread exists yet.
    unsafe {
        env::set_var("HOME", &user.dir);
        env::set_var("USER", &user.name);
        env::set_var("LOGNAME", &user.name);
    }
    Ok(())
}
