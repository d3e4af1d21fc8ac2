//! Oxidiff: linear-time binary differencing and hex-dump line projection.
//!
//! The crate provides:
//! - A near-optimal copy/add differ after Burns & Long (`engine`)
//! - Rolling footprint hashing and the match table (`footprint`)
//! - Edit scripts and pluggable emission sinks (`script`)
//! - Projection of a script into side-by-side hex-dump lines (`lines`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```
//! use oxidiff::{BinaryDiffer, LineProjector, MemorySource};
//!
//! let base = b"hello old world";
//! let version = b"hello new world";
//!
//! let script = BinaryDiffer::default().diff_slices(base, version).unwrap();
//! assert_eq!(script.apply(base).unwrap(), version);
//!
//! let lines = LineProjector::new(16)
//!     .unwrap()
//!     .build(&mut MemorySource::new(base.as_slice()), script.ops())
//!     .unwrap();
//! assert!(!lines.version_lines.is_empty());
//! ```

pub mod cancel;
pub mod engine;
pub mod error;
pub mod footprint;
pub mod io;
pub mod lines;
pub mod script;
pub mod source;

#[cfg(feature = "cli")]
pub mod cli;

pub use cancel::CancelToken;
pub use engine::BinaryDiffer;
pub use error::{DiffError, Result};
pub use footprint::DiffOptions;
pub use lines::{LINE_PREFIX_LENGTH, LineKind, LineProjector, ProjectedLines};
pub use script::{EditOp, EditScript, EditSink, OpWriter, ScriptSummary};
pub use source::{ByteSource, ForwardOnly, MemorySource, ReaderSource};
