use tracing_appender::non_blocking::WorkerGuard;

// NOTE: The return WorkerGuard MUST be hold by caller, otherwise the tracing thread is dropped.
pub fn setup() -> WorkerGuard {
    let worker_guard = init_non_blocking_tracing(tracing_subscriber::EnvFilter::from_default_env());
    set_panic_hook();
    worker_guard
}

/// Same as [`setup`], falling back to `default_directive` when `RUST_LOG` is unset.
pub fn setup_with_default(default_directive: &str) -> WorkerGuard {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));
    let worker_guard = init_non_blocking_tracing(filter);
    set_panic_hook();
    worker_guard
}

// logs go to stderr so command output on stdout stays machine readable
fn init_non_blocking_tracing(filter: tracing_subscriber::EnvFilter) -> WorkerGuard {
    let (non_blocking, worker_guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .init();
    worker_guard
}

pub fn set_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| l.to_string())
            .unwrap_or_else(|| "<unknown>".to_owned());

        let message = match info.payload().downcast_ref::<&'static str>() {
            Some(s) => *s,
            None => match info.payload().downcast_ref::<String>() {
                Some(s) => &s[..],
                None => "Box<dyn Any>",
            },
        };

        let thread = std::thread::current();
        let thread_name = thread.name().unwrap_or("<unnamed>");

        let overall = format!(
            "thread '{}' panicked at '{}', {}\n{}",
            thread_name,
            message,
            location,
            get_backtrace(),
        );

        // Logs with non-blocking-tracing if the Error level is enabled, otherwise prints directly.
        if tracing::enabled!(tracing::Level::ERROR) {
            tracing::error!("{}", overall);
        } else {
            eprintln!("{}", overall);
        }
    }));
}

fn get_backtrace() -> String {
    match std::env::var("RUST_BACKTRACE").ok() {
        None => "".to_owned(),
        Some(ref val) if val == "0" => "".to_owned(),
        _ => format!("{:?}", backtrace::Backtrace::new()),
    }
}
