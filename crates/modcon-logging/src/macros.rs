//! ---
//! mc_section: "06-logging"
//! mc_subsection: "module"
//! mc_type: "source"
//! mc_scope: "code"
//! mc_description: "Logger handle, tracing adapter, and logging macros."
//! mc_version: "v0.0.0-prealpha"
//! mc_owner: "tbd"
//! ---

/// Emit a tracing event at `$level` enriched with a [`LogContext`](crate::LogContext).
#[doc(hidden)]
#[macro_export]
macro_rules! mc_event {
    ($level:expr, $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        $crate::__tracing::event!(
            $level,
            module = ctx.module.unwrap_or(""),
            command = ctx.command.unwrap_or(""),
            phase = ctx.phase.unwrap_or(""),
            message = %format_args!($($arg)+)
        );
    }};
}

/// Emit a debug log enriched with module context.
#[macro_export]
macro_rules! mc_debug {
    (context = $ctx:expr, $($arg:tt)+) => {
        $crate::mc_event!($crate::__tracing::Level::DEBUG, $ctx, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::mc_event!($crate::__tracing::Level::DEBUG, $crate::LogContext::default(), $($arg)+)
    };
}

/// Emit an informational log enriched with module context.
#[macro_export]
macro_rules! mc_info {
    (context = $ctx:expr, $($arg:tt)+) => {
        $crate::mc_event!($crate::__tracing::Level::INFO, $ctx, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::mc_event!($crate::__tracing::Level::INFO, $crate::LogContext::default(), $($arg)+)
    };
}

/// Emit a warning enriched with module context.
#[macro_export]
macro_rules! mc_warn {
    (context = $ctx:expr, $($arg:tt)+) => {
        $crate::mc_event!($crate::__tracing::Level::WARN, $ctx, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::mc_event!($crate::__tracing::Level::WARN, $crate::LogContext::default(), $($arg)+)
    };
}

/// Emit an error log enriched with module context.
#[macro_export]
macro_rules! mc_error {
    (context = $ctx:expr, $($arg:tt)+) => {
        $crate::mc_event!($crate::__tracing::Level::ERROR, $ctx, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::mc_event!($crate::__tracing::Level::ERROR, $crate::LogContext::default(), $($arg)+)
    };
}
