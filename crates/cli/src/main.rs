//! Command-line interface for the `helpix` application.
//!
//! This crate serves as the main entry point for the executable, delegating
//! its functionality to the `helpix-server` crate.

fn main() -> anyhow::Result<()> {
    helpix_server::run()
}
