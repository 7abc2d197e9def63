//! Console logging gated by runtime environment.
//!
//! The four channels are the `tracing` macros: `info!` and `warn!` are
//! silent in production, `error!` always prints, and `debug!` prints only
//! when `DEBUG=true` regardless of environment. Errors and warnings go to
//! stderr, everything else to stdout.

use tracing::{Level, Subscriber};
use tracing_subscriber::{
    filter::{filter_fn, FilterExt, LevelFilter},
    fmt::{
        self,
        writer::{MakeWriterExt, OrElse, WithMaxLevel},
        MakeWriter,
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogGate {
    production: bool,
    debug: bool,
}

impl LogGate {
    pub fn new(production: bool, debug: bool) -> Self {
        Self { production, debug }
    }

    pub fn allows(&self, level: &Level) -> bool {
        match *level {
            Level::ERROR => true,
            Level::WARN | Level::INFO => !self.production,
            Level::DEBUG => self.debug,
            _ => false,
        }
    }
}

/// Narrowing used when `RUST_LOG` is unset: our own debug output, but only
/// info and above from dependencies.
pub fn default_filter() -> EnvFilter {
    EnvFilter::new("info,civic_gateway=debug")
}

/// Send warn and error to `stderr`, everything else to `stdout`.
pub fn split_writer<E, O>(stderr: E, stdout: O) -> OrElse<WithMaxLevel<E>, O>
where
    E: for<'w> MakeWriter<'w>,
    O: for<'w> MakeWriter<'w>,
{
    stderr.with_max_level(Level::WARN).or_else(stdout)
}

/// A `fmt` layer showing what both `gate` and `narrowing` allow. Errors
/// bypass `narrowing`, so no `RUST_LOG` value can hide them.
pub fn console_layer<S, W>(gate: LogGate, narrowing: EnvFilter, make_writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let gated = filter_fn(move |metadata| gate.allows(metadata.level())).and(narrowing);

    fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(make_writer)
        .with_filter(gated.or(LevelFilter::ERROR))
}

/// Install the global subscriber. `RUST_LOG` can narrow output further but
/// never re-enables what the gate suppresses.
pub fn init(gate: LogGate) {
    let narrowing = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter());

    tracing_subscriber::registry()
        .with(console_layer(
            gate,
            narrowing,
            split_writer(std::io::stderr, std::io::stdout),
        ))
        .init();
}
