/// Logging macro with explicit level selection.
///
/// Forwards to [`tracing`] macros. During tests it prints to `stdout`,
/// preserving the log level for context.
///
/// # Examples
/// ```
/// use wkd::wkd_log;
/// # fn main() {
/// wkd_log!(debug, "requesting {}", "https://example.com/");
/// wkd_log!(warn, "slow response from {}", "example.com");
/// # }
/// ```
#[macro_export]
macro_rules! wkd_log {
    ($level:ident, $($arg:tt)*) => {
        #[cfg(not(test))]
        tracing::$level!($($arg)*);
        #[cfg(test)]
        println!("[{}] {}", stringify!($level), format_args!($($arg)*));
    };
}
