//! Logging shortcuts shared by every crate.
//!
//! The macros forward to [`tracing`] so that any subscriber works. The `success!`
//! macro emits on a dedicated target which the CLI formatter renders differently
//! from plain `info!` lines.

/// Target used by [`success!`] events.
pub const SUCCESS_TARGET: &str = "cleanip::success";

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        ::tracing::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        ::tracing::info!(target: $crate::logging::SUCCESS_TARGET, $($arg)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        ::tracing::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        ::tracing::error!($($arg)*)
    };
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        ::tracing::debug!($($arg)*)
    };
}
