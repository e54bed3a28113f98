//! Logging shims that expand to nothing without the `tracing` feature.
//!
//! Call sites whose arguments are only read for logging use `tracing`
//! directly under `#[cfg(feature = "tracing")]` instead.

macro_rules! trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        {
            ::tracing::trace!($($arg)*);
        }
    };
}

macro_rules! debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        {
            ::tracing::debug!($($arg)*);
        }
    };
}
