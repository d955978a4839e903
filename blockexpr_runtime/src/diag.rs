//! Dispatch tracing (grounded on the teacher's `call_dynamic.rs`
//! `SJULIA_DISPATCH_DEBUG` pattern). Set `BLOCKEXPR_TRACE=1` to print one
//! line per evaluated node to stderr in debug builds; a no-op in release
//! builds to avoid the env lookup and formatting cost on the hot path.

#![deny(clippy::print_stdout)]

#[cfg(debug_assertions)]
pub(crate) fn trace_enabled() -> bool {
    use std::sync::OnceLock;
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| std::env::var("BLOCKEXPR_TRACE").is_ok())
}

#[cfg(not(debug_assertions))]
pub(crate) fn trace_enabled() -> bool {
    false
}

#[cfg(debug_assertions)]
pub(crate) fn trace_log(args: std::fmt::Arguments<'_>) {
    use std::io::Write;
    let _ = writeln!(std::io::stderr(), "{args}");
}

#[cfg(not(debug_assertions))]
pub(crate) fn trace_log(_args: std::fmt::Arguments<'_>) {}

macro_rules! trace {
    ($($arg:tt)*) => {
        if $crate::diag::trace_enabled() {
            $crate::diag::trace_log(format_args!($($arg)*));
        }
    };
}

pub(crate) use trace;
