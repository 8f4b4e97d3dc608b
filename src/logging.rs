//! Tracing setup for both targets. Call [`init`] once at startup; later calls
//! keep the subscriber that is already installed.

use cfg_if::cfg_if;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset. Per-frame detail stays at `trace`.
pub const DEFAULT_FILTER: &str = "info,cvroom=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        pub fn init() {
            let console = tracing_wasm::WASMLayer::new(tracing_wasm::WASMLayerConfig::default());
            // Two navigators on one page share the first subscriber.
            let _ = tracing_subscriber::registry().with(env_filter()).with(console).try_init();

            #[cfg(feature = "console_error_panic_hook")]
            console_error_panic_hook::set_once();
        }
    } else {
        use std::ffi::OsStr;
        use std::panic::PanicHookInfo;
        use std::path::Path;

        use once_cell::sync::OnceCell;
        use tracing_appender::non_blocking::WorkerGuard;
        use tracing_subscriber::fmt;

        const DEFAULT_LOG_FILE: &str = "logs/cvroom.log";

        // Dropping the guard would stop the background writer.
        static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

        /// stderr plus a daily-rolling file (`RUST_LOG_FILE`, default `logs/cvroom.log`).
        pub fn init() {
            let log_file = std::env::var("RUST_LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
            let log_file = Path::new(&log_file);
            let dir = log_file.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = log_file.file_name().unwrap_or(OsStr::new("cvroom.log"));

            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, name));
            let _ = FILE_GUARD.set(guard);

            let stderr_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(true)
                .compact();
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .compact();

            let installed = tracing_subscriber::registry()
                .with(env_filter())
                .with(stderr_layer)
                .with(file_layer)
                .try_init()
                .is_ok();

            if installed {
                std::panic::set_hook(Box::new(|info| {
                    let backtrace = std::backtrace::Backtrace::force_capture();
                    tracing::error!("{}\nBacktrace:\n{backtrace}", panic_message(info));
                }));
            }
        }

        fn panic_message(info: &PanicHookInfo<'_>) -> String {
            let payload = info
                .payload()
                .downcast_ref::<&str>()
                .copied()
                .or_else(|| info.payload().downcast_ref::<String>().map(String::as_str))
                .unwrap_or("<non-string panic>");
            match info.location() {
                Some(loc) => format!("panic at {}:{}:{} {payload}", loc.file(), loc.line(), loc.column()),
                None => format!("panic {payload}"),
            }
        }
    }
}
