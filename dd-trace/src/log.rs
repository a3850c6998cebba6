// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Library logging
//!
//! The tracer must not depend on the logging setup of the host application, so it carries its
//! own minimal logger. Messages are emitted through the `dd_error!`, `dd_warn!`, `dd_info!` and
//! `dd_debug!` macros and filtered against a process wide maximum level.

use std::{
    fmt::{self, Display},
    str::FromStr,
    sync::atomic::{AtomicUsize, Ordering},
};

static MAX_LOG_LEVEL: AtomicUsize = AtomicUsize::new(LevelFilter::Error as usize);

pub(crate) fn set_max_level(lvl: LevelFilter) {
    MAX_LOG_LEVEL.store(lvl as usize, Ordering::Relaxed)
}

pub fn max_level() -> LevelFilter {
    match MAX_LOG_LEVEL.load(Ordering::Relaxed) {
        0 => LevelFilter::Off,
        1 => LevelFilter::Error,
        2 => LevelFilter::Warn,
        3 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

#[repr(usize)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd)]
#[non_exhaustive]
/// The level at which the library will log
pub enum LevelFilter {
    Off,
    #[default]
    Error,
    Warn,
    Info,
    Debug,
}

impl FromStr for LevelFilter {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("debug") {
            Ok(LevelFilter::Debug)
        } else if s.eq_ignore_ascii_case("info") {
            Ok(LevelFilter::Info)
        } else if s.eq_ignore_ascii_case("warn") {
            Ok(LevelFilter::Warn)
        } else if s.eq_ignore_ascii_case("error") {
            Ok(LevelFilter::Error)
        } else if s.eq_ignore_ascii_case("off") {
            Ok(LevelFilter::Off)
        } else {
            Err("log level filter should be one of DEBUG, INFO, WARN, ERROR, OFF")
        }
    }
}

impl Display for LevelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filter = match self {
            LevelFilter::Debug => "DEBUG",
            LevelFilter::Info => "INFO",
            LevelFilter::Warn => "WARN",
            LevelFilter::Error => "ERROR",
            LevelFilter::Off => "OFF",
        };

        write!(f, "{filter}")
    }
}

#[repr(usize)]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Level {
    Error = 1, // must match LevelFilter::Error
    Warn,
    Info,
    Debug,
}

impl Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        };

        write!(f, "{level}")
    }
}

impl PartialEq<LevelFilter> for Level {
    #[inline]
    fn eq(&self, other: &LevelFilter) -> bool {
        (*self as usize) == (*other as usize)
    }
}

impl PartialOrd<LevelFilter> for Level {
    #[inline]
    fn partial_cmp(&self, other: &LevelFilter) -> Option<std::cmp::Ordering> {
        Some((*self as usize).cmp(&(*other as usize)))
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod test_logger {
    //! Thread local, overridable logger
    //!
    //! Tests can intercept logs by calling `activate_test_logger`
    //!
    //! ```no_run
    //! let _log_guard = dd_trace::log::test_logger::activate_test_logger();
    //! // whatever is logged by the dd_(level)! macros is stored
    //! dd_trace::dd_warn!("my log");
    //! let logs = dd_trace::log::test_logger::take_test_logs().unwrap();
    //! // logs contains (Warn, "my log")
    //!
    //! // threads spawned from the test only see the logger if the closure
    //! // is wrapped by `with_local_logger`
    //! std::thread::spawn(dd_trace::log::test_logger::with_local_logger(|| {
    //!     dd_trace::dd_warn!("my log");
    //! }))
    //! .join();
    //! ```
    use std::{cell::RefCell, sync::Arc, sync::Mutex};

    use super::Level;

    #[derive(Default)]
    struct TestLogger(Mutex<Vec<(Level, String)>>);

    thread_local! {
        static LOCAL_LOGGER: RefCell<Option<Arc<TestLogger>>> = const { RefCell::new(None) };
    }

    pub(super) fn capture(lvl: Level, log: std::fmt::Arguments) {
        let _ = LOCAL_LOGGER.try_with(|l| {
            if let Some(l) = &*l.borrow() {
                l.0.lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .push((lvl, log.to_string()))
            }
        });
    }

    pub fn with_local_logger<F: FnOnce() -> R, R>(f: F) -> impl FnOnce() -> R {
        let logger = LOCAL_LOGGER.try_with(|l| l.borrow().clone()).ok().flatten();
        move || {
            let _guard = LoggerGuard {
                prev: LOCAL_LOGGER.replace(logger),
            };
            f()
        }
    }

    pub struct LoggerGuard {
        prev: Option<Arc<TestLogger>>,
    }

    impl Drop for LoggerGuard {
        fn drop(&mut self) {
            LOCAL_LOGGER.set(self.prev.take());
        }
    }

    pub fn activate_test_logger() -> LoggerGuard {
        let prev = LOCAL_LOGGER.replace(Some(Arc::new(TestLogger::default())));
        LoggerGuard { prev }
    }

    pub fn take_test_logs() -> Option<Vec<(Level, String)>> {
        LOCAL_LOGGER
            .try_with(|l| {
                l.borrow().as_deref().map(|l| {
                    std::mem::take(&mut *l.0.lock().unwrap_or_else(|e| e.into_inner()))
                })
            })
            .ok()
            .flatten()
    }
}

pub fn print_log(lvl: Level, log: fmt::Arguments, file: &str, line: u32) {
    match lvl {
        Level::Error => eprintln!("\x1b[91m{lvl}\x1b[0m {file}:{line} - {log}"),
        _ => eprintln!("\x1b[93m{lvl}\x1b[0m {file}:{line} - {log}"),
    }
}

#[doc(hidden)]
pub fn __private_log(lvl: Level, log: fmt::Arguments, file: &str, line: u32) {
    if lvl <= max_level() {
        print_log(lvl, log, file, line);
    }
    #[cfg(any(test, feature = "test-utils"))]
    test_logger::capture(lvl, log);
}

#[macro_export]
macro_rules! dd_debug {
    // dd_debug!("a {} event", "log")
    ($($arg:tt)+) => {
        $crate::dd_log!($crate::log::Level::Debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! dd_info {
    // dd_info!("a {} event", "log")
    ($($arg:tt)+) => {
        $crate::dd_log!($crate::log::Level::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! dd_warn {
    // dd_warn!("a {} event", "log")
    ($($arg:tt)+) => {
        $crate::dd_log!($crate::log::Level::Warn, $($arg)+)
    };
}

#[macro_export]
macro_rules! dd_error {
    // dd_error!("a {} event", "log")
    ($($arg:tt)+) => {
        $crate::dd_log!($crate::log::Level::Error, $($arg)+)
    };
}

#[macro_export]
macro_rules! dd_log {
    ($lvl:expr, $($arg:tt)+) => {{
        let loc = ::std::panic::Location::caller();
        $crate::log::__private_log($lvl, format_args!($($arg)+), loc.file(), loc.line());
    }};
}

#[cfg(test)]
mod tests {
    use crate::log::{max_level, set_max_level, test_logger, Level, LevelFilter};

    #[test]
    fn test_max_level() {
        let default_lvl = max_level();

        set_max_level(LevelFilter::Warn);

        assert!(LevelFilter::Warn == max_level());
        assert!(LevelFilter::Debug > max_level());
        assert!(LevelFilter::Error < max_level());

        set_max_level(default_lvl);
    }

    #[test]
    fn test_level_and_filter() {
        const LEVELS: [Level; 4] = [Level::Error, Level::Warn, Level::Info, Level::Debug];
        const FILTERS: [LevelFilter; 4] = [
            LevelFilter::Error,
            LevelFilter::Warn,
            LevelFilter::Info,
            LevelFilter::Debug,
        ];

        for (lvl_index, lvl) in LEVELS.iter().enumerate() {
            assert!(*lvl > LevelFilter::Off);
            assert!(*lvl == FILTERS[lvl_index]);

            for filter in &FILTERS[lvl_index + 1..] {
                assert!(*lvl < *filter);
            }
        }
    }

    #[test]
    fn test_parse_level_filter() {
        assert_eq!("warn".parse::<LevelFilter>(), Ok(LevelFilter::Warn));
        assert_eq!("DEBUG".parse::<LevelFilter>(), Ok(LevelFilter::Debug));
        assert_eq!("Off".parse::<LevelFilter>(), Ok(LevelFilter::Off));
        assert!("verbose".parse::<LevelFilter>().is_err());
        assert_eq!(LevelFilter::Info.to_string(), "INFO");
    }

    #[test]
    fn test_test_logger() {
        let _g = test_logger::activate_test_logger();
        dd_debug!("debug log {}", "foo");
        std::thread::spawn(test_logger::with_local_logger(|| {
            dd_warn!("warn log {}", "bar");
        }))
        .join()
        .unwrap();
        let test_logs = test_logger::take_test_logs().unwrap();
        assert_eq!(
            &test_logs,
            &[
                (Level::Debug, "debug log foo".into()),
                (Level::Warn, "warn log bar".into())
            ]
        );
    }

    #[test]
    fn test_no_capture_without_logger() {
        dd_error!("nobody listens");
        assert!(test_logger::take_test_logs().is_none());
    }
}
