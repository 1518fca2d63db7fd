//! Embedded `PostgreSQL` cluster shared by the Postgres integration tests.
//!
//! One cluster starts per test binary. Tests get their own database cloned
//! from a migrated template and dropped when the test ends. When no cluster
//! can be started (no network to fetch binaries, no `nobody` user) the tests
//! log a `SKIP-TEST-CLUSTER` line and pass, unless `ERRAND_REQUIRE_POSTGRES`
//! is set.

use crate::test_helpers::EnvVarGuard;
use cap_std::ambient_authority;
use cap_std::fs::{Dir, Permissions, PermissionsExt};
use diesel::prelude::*;
use pg_embedded_setup_unpriv::worker_process_test_api::{
    WorkerOperation, WorkerRequest, WorkerRequestArgs, run as run_worker,
};
use pg_embedded_setup_unpriv::{
    ExecutionPrivileges, TestBootstrapSettings, bootstrap_for_tests, detect_execution_privileges,
};
use postgresql_embedded::{PostgreSQL, Settings, Status};
use rstest::fixture;
use std::env;
use std::ffi::{OsStr, OsString};
use std::io;
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock, PoisonError};
use tokio::runtime::Runtime;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared `PostgreSQL` cluster handle for integration tests.
pub type PostgresCluster = &'static ManagedCluster;

/// Turns a missing cluster into a failure instead of a skip.
pub const REQUIRE_CLUSTER_ENV: &str = "ERRAND_REQUIRE_POSTGRES";

static SHARED_CLUSTER: OnceLock<Result<ManagedCluster, String>> = OnceLock::new();
static TEMPLATE_LOCK: Mutex<()> = Mutex::new(());

/// Running embedded cluster.
///
/// In-process clusters keep their runtime and handle alive here. Clusters
/// started through `pg_worker` are owned by the worker's leaked handle.
pub struct ManagedCluster {
    settings: Settings,
    _runtime: Option<Runtime>,
    _postgres: Option<PostgreSQL>,
}

impl ManagedCluster {
    fn start() -> Result<Self, BoxError> {
        let worker_env = worker_env_changes()?;
        let worker_guard = EnvVarGuard::set_many(&worker_env);
        let bootstrapped = bootstrap_for_tests();
        drop(worker_guard);
        let mut bootstrap = bootstrapped.map_err(boxed)?;
        sync_password_from_file(&mut bootstrap.settings)?;

        match bootstrap.privileges {
            ExecutionPrivileges::Root => Self::start_via_worker(&bootstrap),
            ExecutionPrivileges::Unprivileged => Self::start_in_process(&bootstrap),
        }
    }

    fn start_in_process(bootstrap: &TestBootstrapSettings) -> Result<Self, BoxError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(boxed)?;
        let env_guard = EnvVarGuard::set_many(&env_vars_to_os(&bootstrap.environment.to_env()));
        let mut postgres = PostgreSQL::new(bootstrap.settings.clone());
        let started = runtime.block_on(async {
            postgres.setup().await.map_err(boxed)?;
            if !matches!(postgres.status(), Status::Started) {
                postgres.start().await.map_err(boxed)?;
            }
            Ok::<(), BoxError>(())
        });
        drop(env_guard);
        started?;

        let mut settings = postgres.settings().clone();
        sync_port_from_pid(&mut settings)?;
        Ok(Self {
            settings,
            _runtime: Some(runtime),
            _postgres: Some(postgres),
        })
    }

    fn start_via_worker(bootstrap: &TestBootstrapSettings) -> Result<Self, BoxError> {
        let worker = bootstrap.worker_binary.as_ref().ok_or_else(|| {
            boxed(io::Error::new(
                io::ErrorKind::NotFound,
                "PG_EMBEDDED_WORKER is not set for a root test run",
            ))
        })?;
        let env_vars = bootstrap.environment.to_env();
        for (operation, timeout) in [
            (WorkerOperation::Setup, bootstrap.setup_timeout),
            (WorkerOperation::Start, bootstrap.start_timeout),
        ] {
            let args = WorkerRequestArgs {
                worker: worker.as_path(),
                settings: &bootstrap.settings,
                env_vars: &env_vars,
                operation,
                timeout,
            };
            run_worker(&WorkerRequest::new(args)).map_err(boxed)?;
        }

        let mut settings = bootstrap.settings.clone();
        sync_port_from_pid(&mut settings)?;
        Ok(Self {
            settings,
            _runtime: None,
            _postgres: None,
        })
    }

    /// Returns the connection URL for `database`.
    #[must_use]
    pub fn database_url(&self, database: &str) -> String {
        self.settings.url(database)
    }

    /// Creates `template` and runs `migrate` against its URL, once per
    /// cluster.
    ///
    /// A failed migration drops the half-built template so the next caller
    /// retries.
    pub fn ensure_template_exists<F>(&self, template: &str, migrate: F) -> Result<(), BoxError>
    where
        F: FnOnce(&str) -> Result<(), BoxError>,
    {
        let _guard = TEMPLATE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        if self.database_exists(template)? {
            return Ok(());
        }

        self.execute_admin_sql(&format!("CREATE DATABASE {}", quote_identifier(template)))?;
        if let Err(err) = migrate(&self.database_url(template)) {
            self.drop_database(template)?;
            return Err(err);
        }
        Ok(())
    }

    /// Clones `template` into a fresh database dropped with the returned
    /// guard.
    pub fn temporary_database_from_template(
        &'static self,
        name: &str,
        template: &str,
    ) -> Result<TemporaryDatabase, BoxError> {
        {
            let _guard = TEMPLATE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
            self.execute_admin_sql(&format!(
                "CREATE DATABASE {} TEMPLATE {}",
                quote_identifier(name),
                quote_identifier(template),
            ))?;
        }
        Ok(TemporaryDatabase {
            cluster: self,
            name: name.to_owned(),
            url: self.database_url(name),
        })
    }

    fn drop_database(&self, name: &str) -> Result<(), BoxError> {
        self.execute_admin_sql(&format!(
            "DROP DATABASE IF EXISTS {} WITH (FORCE)",
            quote_identifier(name)
        ))
    }

    fn execute_admin_sql(&self, sql: &str) -> Result<(), BoxError> {
        let mut connection = PgConnection::establish(&self.database_url("postgres"))?;
        diesel::sql_query(sql).execute(&mut connection)?;
        Ok(())
    }

    fn database_exists(&self, name: &str) -> Result<bool, BoxError> {
        #[derive(diesel::QueryableByName)]
        struct ExistsRow {
            #[diesel(sql_type = diesel::sql_types::Bool)]
            exists: bool,
        }

        let mut connection = PgConnection::establish(&self.database_url("postgres"))?;
        let row = diesel::sql_query(
            "SELECT EXISTS (SELECT 1 FROM pg_database WHERE datname = $1) AS exists",
        )
        .bind::<diesel::sql_types::Text, _>(name)
        .get_result::<ExistsRow>(&mut connection)?;
        Ok(row.exists)
    }
}

/// Database cloned from a template for one test.
pub struct TemporaryDatabase {
    cluster: PostgresCluster,
    name: String,
    url: String,
}

impl TemporaryDatabase {
    /// Returns the connection URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for TemporaryDatabase {
    fn drop(&mut self) {
        if let Err(err) = self.cluster.drop_database(&self.name) {
            eprintln!("failed to drop test database {}: {err}", self.name);
        }
    }
}

/// Provides the shared cluster, or `None` when it is unavailable and not
/// required.
#[fixture]
pub fn postgres_cluster() -> Result<Option<PostgresCluster>, BoxError> {
    match shared_cluster() {
        Ok(cluster) => Ok(Some(cluster)),
        Err(reason) if env::var_os(REQUIRE_CLUSTER_ENV).is_some() => Err(reason.into()),
        Err(reason) => {
            eprintln!("SKIP-TEST-CLUSTER: {reason}");
            Ok(None)
        }
    }
}

fn shared_cluster() -> Result<PostgresCluster, String> {
    SHARED_CLUSTER
        .get_or_init(|| {
            // A fresh thread keeps the cluster's runtime clear of the
            // caller's runtime.
            std::thread::spawn(ManagedCluster::start)
                .join()
                .unwrap_or_else(|_| Err("cluster start-up panicked".into()))
                .map_err(|err| format!("failed to start PostgreSQL: {err}"))
        })
        .as_ref()
        .map_err(Clone::clone)
}

fn boxed(err: impl std::error::Error + Send + Sync + 'static) -> BoxError {
    Box::new(err)
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn env_vars_to_os(env_vars: &[(String, Option<String>)]) -> Vec<(OsString, Option<OsString>)> {
    env_vars
        .iter()
        .map(|(key, value)| (OsString::from(key), value.as_ref().map(OsString::from)))
        .collect()
}

fn sync_password_from_file(settings: &mut Settings) -> Result<(), BoxError> {
    let (dir, file_name) = open_parent_dir(&settings.password_file)?;
    match dir.read_to_string(file_name) {
        Ok(contents) => {
            let password = contents.trim_end();
            if !password.is_empty() {
                password.clone_into(&mut settings.password);
            }
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(boxed(err)),
    }
}

/// Reads the listening port from `postmaster.pid`, which wins over the
/// configured one when the server picked its own.
fn sync_port_from_pid(settings: &mut Settings) -> Result<(), BoxError> {
    let data_dir = Dir::open_ambient_dir(&settings.data_dir, ambient_authority())?;
    let contents = match data_dir.read_to_string("postmaster.pid") {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(boxed(err)),
    };
    if let Some(port) = contents
        .lines()
        .nth(3)
        .and_then(|line| line.trim().parse::<u16>().ok())
    {
        settings.port = port;
    }
    Ok(())
}

fn worker_env_changes() -> Result<Vec<(OsString, Option<OsString>)>, BoxError> {
    let mut changes = Vec::new();
    if env::var_os("PG_PORT").is_none() {
        changes.push((OsString::from("PG_PORT"), Some(free_port()?)));
    }

    if matches!(detect_execution_privileges(), ExecutionPrivileges::Root)
        && env::var_os("PG_EMBEDDED_WORKER").is_none()
    {
        let worker = locate_pg_worker().ok_or_else(|| {
            boxed(io::Error::new(
                io::ErrorKind::NotFound,
                "PG_EMBEDDED_WORKER is not set and the pg_worker binary was not found",
            ))
        })?;
        changes.push((
            OsString::from("PG_EMBEDDED_WORKER"),
            Some(copy_worker_somewhere_readable(&worker)?),
        ));
    }
    Ok(changes)
}

fn free_port() -> Result<OsString, BoxError> {
    let listener = TcpListener::bind(("127.0.0.1", 0))?;
    let port = listener.local_addr()?.port();
    Ok(OsString::from(port.to_string()))
}

fn locate_pg_worker() -> Option<PathBuf> {
    option_env!("CARGO_BIN_EXE_pg_worker")
        .map(PathBuf::from)
        .filter(|path| path.is_file())
        .or_else(|| {
            let exe = env::current_exe().ok()?;
            let candidate = exe.parent()?.parent()?.join("pg_worker");
            candidate.is_file().then_some(candidate)
        })
}

/// Copies the worker into the temp directory with mode `0755`.
///
/// The worker drops to `nobody`, which usually cannot traverse the target
/// directory.
fn copy_worker_somewhere_readable(source: &Path) -> Result<OsString, BoxError> {
    let destination = env::temp_dir().join(format!("errand_pg_worker_{}", std::process::id()));
    let (source_dir, source_name) = open_parent_dir(source)?;
    let (destination_dir, destination_name) = open_parent_dir(&destination)?;

    if destination_dir.exists(destination_name) {
        destination_dir.remove_file(destination_name)?;
    }
    source_dir.copy(source_name, &destination_dir, destination_name)?;
    destination_dir.set_permissions(destination_name, Permissions::from_mode(0o755))?;
    Ok(destination.into_os_string())
}

fn open_parent_dir(path: &Path) -> Result<(Dir, &OsStr), BoxError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| boxed(io::Error::other("path must include a file name")))?;
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}
