//! User-facing adapters: notice sinks for the console and for tests.

pub mod console;
