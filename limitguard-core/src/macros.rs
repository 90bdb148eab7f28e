//! Optional logging
//!
//! Thin wrappers over the `log` facade. With the `log` feature disabled the
//! arguments are still type-checked but nothing is emitted.

#[cfg(feature = "log")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        if false {
            let _ = format_args!($($arg)*);
        }
    }};
}

#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        if false {
            let _ = format_args!($($arg)*);
        }
    }};
}
