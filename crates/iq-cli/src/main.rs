//! inline-query - Inline comment query CLI
//!
//! Loads the inline comments a viewer can see from a file-system store.
//!
//! ## Quick Start
//!
//! ```bash
//! # Write a default configuration
//! inline-query config init
//!
//! # Everything visible to a viewer on one revision, with context
//! inline-query query --store ./store --viewer PHID-USER-alice \
//!     --object PHID-DREV-1 --published --publishable --context
//! ```

mod commands;

fn main() {
    if let Err(err) = commands::run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
