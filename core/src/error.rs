//! Possible errors of the host environment
use config::ConfigError;
use thiserror::Error;

use crate::env::EnvError;

/// Possible errors that the environment can generate outside of a guest call.
/// Errors raised by native functions during a call are reported as [EnvError].
#[derive(Error, Debug)]
pub enum Error {
    #[error("Settings Load Error")]
    SettingsError {
        #[from]
        source: ConfigError,
    },
    #[error("Native call failed: {0}")]
    NativeCallError(#[from] EnvError),
}
