//! Mirror Migrate: batch rewriter from UNet to Mirror
//!
//! Scans a Unity project for C# scripts and rewrites the parts of the legacy
//! `UnityEngine.Networking` API that have a direct Mirror equivalent. Work
//! is purely textual: regular expressions and a little argument surgery, no
//! C# parsing.
//!
//! # Architecture
//!
//! - [`rules`]: the ordered substitution table
//! - [`scan`]: candidate file discovery, skipping the vendored `Mirror` folder
//! - [`rewrite`]: the pure text pipeline applied to one file
//! - [`processor`]: read, back up, write back, per file
//! - [`report`] and [`migration`]: run orchestration and totals
//!
//! # Guarantees
//!
//! - A file is written only if its text changed
//! - Existing `.bak` files are never overwritten
//! - Writes are atomic (tempfile + fsync + rename)
//! - One failing file never stops the batch
//! - Rewriting is idempotent
//!
//! # Example
//!
//! ```no_run
//! use mirror_migrate::{Migration, ProcessOptions};
//! use std::path::Path;
//!
//! let migration = Migration::new(ProcessOptions {
//!     backup: true,
//!     dry_run: false,
//! });
//!
//! match migration.run(Path::new("Assets")) {
//!     Ok(report) => println!("{} file(s) changed", report.files_changed),
//!     Err(e) => eprintln!("Migration aborted: {}", e),
//! }
//! ```

pub mod config;
pub mod migration;
pub mod processor;
pub mod report;
pub mod rewrite;
pub mod rules;
pub mod scan;

// Re-exports
pub use config::{load_from_path, load_from_str, ConfigError, MigrationConfig};
pub use migration::{migrate_files, Migration, MigrationError};
pub use processor::{backup_path, process_file, FileOutcome, ProcessError, ProcessOptions};
pub use report::{FileError, MigrationReport};
pub use rewrite::{rewrite, Rewrite};
pub use rules::{Rule, RuleError, RuleSpec, RuleTable};
pub use scan::{enumerate, ScanError, ScanOptions};
