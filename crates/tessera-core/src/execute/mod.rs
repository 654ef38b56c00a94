//! Execution of code cells.
//!
//! # Architecture
//!
//! ```text
//! Notebook::execute()
//!     │
//!     └── ExecutionPipeline (Idle → Running{cell} → Idle)
//!             │
//!             ├── focus cell, cursor at end
//!             │
//!             └── code cell? ── ExecutionContext::execute(source).await
//!                                   │
//!                                   └── ExecutionObserver callbacks
//! ```
//!
//! # Module Structure
//!
//! - `context` - Execution context trait, observer callbacks and run summary
//! - `pipeline` - Sequential full-notebook run
//! - `command` - Context that runs each cell through an interpreter process

mod command;
mod context;
mod pipeline;

pub use command::{CommandConfig, CommandContext};
pub use context::{ExecutionContext, ExecutionObserver, ExecutionSummary};
pub use pipeline::{ExecutionPipeline, PipelineState};
