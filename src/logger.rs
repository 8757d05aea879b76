use slog::{Drain, Fuse, Level, LevelFilter};
use slog_atomic::{AtomicSwitch, AtomicSwitchCtrl};
use slog_term::{CompactFormat, TermDecorator};
use std::io;
use std::sync::Mutex;
use time::OffsetDateTime;

use crate::helpers::datetime::Timezone;

type TermDrain = Fuse<Mutex<Fuse<LevelFilter<CompactFormat<TermDecorator>>>>>;

/// Terminal logger, the `log` crate macros used across the library are
/// routed to it once `set_global` is called
pub struct Logger {
    log_level: u8,
    logger: slog::Logger,
    ctrl: AtomicSwitchCtrl,
}

/// 0 (critical) .. 5 (trace), anything else is debug
pub fn level_from_u8(log_level: u8) -> Level {
    match log_level {
        0 => Level::Critical,
        1 => Level::Error,
        2 => Level::Warning,
        3 => Level::Info,
        4 => Level::Debug,
        5 => Level::Trace,
        _ => Level::Debug,
    }
}

fn new_drain(level: Level) -> TermDrain {
    let decorator = slog_term::TermDecorator::new().stderr().build();
    let drain = slog_term::CompactFormat::new(decorator)
        .use_custom_timestamp(|w: &mut dyn io::Write| {
            write!(
                w,
                "{}",
                OffsetDateTime::now_utc()
                    .to_localtime()
                    .to_formatted_string()
            )
        })
        .build()
        .filter_level(level)
        .fuse();
    Mutex::new(drain).fuse()
}

impl Logger {
    pub fn new(log_level: u8) -> Self {
        let drain = AtomicSwitch::new(new_drain(level_from_u8(log_level)));
        let ctrl = drain.ctrl();
        let logger = slog::Logger::root(drain, slog::o!("version" => env!("CARGO_PKG_VERSION")));
        Logger {
            log_level,
            logger,
            ctrl,
        }
    }

    pub fn log_level(&self) -> u8 {
        self.log_level
    }

    /// Routes `log` records to this logger for the rest of the process
    pub fn set_global(&self) -> eyre::Result<&Self> {
        // slog_stdlog uses the logger from slog_scope, so set a logger there
        let guard = slog_scope::set_global_logger(self.logger.clone());
        // https://github.com/slog-rs/slog/issues/249
        guard.cancel_reset();
        slog_stdlog::init_with_level(log_level_filter(self.log_level))?;
        Ok(self)
    }

    pub fn set_log_level(&mut self, log_level: u8) -> &Self {
        self.ctrl.set(new_drain(level_from_u8(log_level)));
        log::set_max_level(log_level_filter(log_level).to_level_filter());
        self.log_level = log_level;
        self
    }
}

// `log` drops records above its max level before slog sees them
fn log_level_filter(log_level: u8) -> log::Level {
    match level_from_u8(log_level) {
        Level::Critical | Level::Error => log::Level::Error,
        Level::Warning => log::Level::Warn,
        Level::Info => log::Level::Info,
        Level::Debug => log::Level::Debug,
        Level::Trace => log::Level::Trace,
    }
}
