//! Process-environment guard shared by integration test harnesses.

use std::env;
use std::ffi::OsString;
use std::sync::{Mutex, MutexGuard, PoisonError};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Applies environment changes and restores the previous values on drop.
///
/// Holding the guard also holds a process-wide lock, so two harnesses never
/// interleave their edits.
pub struct EnvVarGuard {
    restore: Vec<(OsString, Option<OsString>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvVarGuard {
    /// Sets (`Some`) or removes (`None`) each variable for the guard's life.
    pub fn set_many(changes: &[(OsString, Option<OsString>)]) -> Self {
        let lock = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let restore = changes
            .iter()
            .map(|(key, value)| {
                let previous = env::var_os(key);
                apply(key, value.as_ref());
                (key.clone(), previous)
            })
            .collect();
        Self {
            restore,
            _lock: lock,
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        for (key, value) in self.restore.drain(..).rev() {
            apply(&key, value.as_ref());
        }
    }
}

fn apply(key: &OsString, value: Option<&OsString>) {
    // SAFETY: every mutation goes through `ENV_LOCK`.
    unsafe {
        match value {
            Some(new_value) => env::set_var(key, new_value),
            None => env::remove_var(key),
        }
    }
}
