#[macro_export]
/// print string macro
macro_rules! print {
    ($fmt: literal $(, $($arg: tt)+)?) => {
        $crate::console::_print(format_args!($fmt $(, $($arg)+)?));
    }
}

#[macro_export]
/// println string macro
macro_rules! println {
    () => {
        $crate::console::_print(format_args!("\n"));
    };
    ($fmt: literal $(, $($arg: tt)+)?) => {
        $crate::console::_print(format_args!(concat!($fmt, "\n") $(, $($arg)+)?));
    }
}

use core::sync::atomic::{AtomicBool, Ordering};

/// every backend impls core::fmt::Write for Stdout
struct Stdout;

static CONSOLE_MUTEX: AtomicBool = AtomicBool::new(false);

pub fn _print(args: core::fmt::Arguments) {
    loop {
        if CONSOLE_MUTEX.compare_exchange(
            false, true,
            Ordering::Acquire, Ordering::Relaxed
        ).is_ok() {
            // a console that refuses bytes has nowhere to report it
            let _ = core::fmt::Write::write_fmt(&mut Stdout, args);
            CONSOLE_MUTEX.store(false, Ordering::Release);
            break;
        }
        core::hint::spin_loop();
    }
}

struct Logger;

impl log::Log for Logger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }
    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let color = match record.level() {
            log::Level::Error => 31, // Red
            log::Level::Warn => 93,  // BrightYellow
            log::Level::Info => 34,  // Blue
            log::Level::Debug => 32, // Green
            log::Level::Trace => 90, // BrightBlack
        };
        println!(
            "\u{1B}[{}m[{:>5}] {}\u{1B}[0m",
            color,
            record.level(),
            record.args(),
        );
    }
    fn flush(&self) {}
}

/// Install the console logger. Later calls are no-ops.
pub fn init() {
    static LOGGER: Logger = Logger;
    static INIT: spin::Once = spin::Once::new();
    INIT.call_once(|| {
        if log::set_logger(&LOGGER).is_err() {
            // someone else owns the facade, leave it alone
            return;
        }
        log::set_max_level(match option_env!("LOG") {
            Some("ERROR") => log::LevelFilter::Error,
            Some("WARN") => log::LevelFilter::Warn,
            Some("INFO") => log::LevelFilter::Info,
            Some("DEBUG") => log::LevelFilter::Debug,
            Some("TRACE") => log::LevelFilter::Trace,
            _ => log::LevelFilter::Info,
        });
    });
}

#[cfg(feature = "sim")]
mod sim;

#[cfg(all(not(feature = "sim"), target_arch = "x86_64"))]
mod x86_64;
