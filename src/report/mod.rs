//! Renderers for the import run summary.
//!
//! - [`terminal`] — colored summary box plus license tables; respects
//!   `--verbose` / `--quiet`. JSON output is produced directly in `main`.

pub mod terminal;
