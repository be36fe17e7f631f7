use std::sync::Mutex;

use slog::Drain;
use slog::{Discard, Fuse};
use slog_async::Async;
use slog_json::Json;

pub use slog::{debug, error, info, o, trace, warn, Logger};

/// Builds the root logger: JSON lines on stderr, written from a
/// background thread.
pub fn initialize_logger() -> Logger {
    let drain = Mutex::new(Json::default(std::io::stderr())).map(Fuse);

    #[cfg(feature = "env_logging")]
    let drain = slog_envlogger::new(drain).ignore_res();

    let drain = Async::new(drain).build().fuse();

    Logger::root(
        drain,
        o!(
            "name" => info::NAME,
            "version" => info::VERSION,
            "revision" => info::REVISION,
            "build_timestamp" => info::BUILD_TIMESTAMP
        ),
    )
}

/// A logger that swallows everything. Meant for tests.
pub fn discard_logger() -> Logger {
    Logger::root(Discard, o!("name" => info::NAME))
}
