use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use ritornello::app_dirs::CONFIG_HOME_ENV;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Points `RITORNELLO_CONFIG_HOME` at a temp directory for the guard's
/// lifetime, serializing tests that touch the process environment.
pub struct ConfigHomeGuard {
    _lock: MutexGuard<'static, ()>,
    previous: Option<String>,
}

impl ConfigHomeGuard {
    pub fn set(path: PathBuf) -> Self {
        let lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let previous = std::env::var(CONFIG_HOME_ENV).ok();
        std::env::set_var(CONFIG_HOME_ENV, &path);
        Self {
            _lock: lock,
            previous,
        }
    }
}

impl Drop for ConfigHomeGuard {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(value) => std::env::set_var(CONFIG_HOME_ENV, value),
            None => std::env::remove_var(CONFIG_HOME_ENV),
        }
    }
}
