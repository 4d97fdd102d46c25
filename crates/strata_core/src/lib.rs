//! # STRATA Core
//!
//! Shared plumbing for the terrain engine.
//!
//! ## Architecture Rules
//!
//! 1. **No globals** - Event sources and pools are owned and passed explicitly
//! 2. **Recycle, don't destroy** - Streaming reuses render resources
//! 3. **Single owner** - A pool or binding is mutated by exactly one manager
//!
//! ## Example
//!
//! ```rust,ignore
//! use strata_core::{EventSource, SourceBinding};
//!
//! let source = EventSource::new(16);
//! let mut binding = SourceBinding::new();
//! binding.bind_source(&source);
//! source.publish(&42u32);
//! assert_eq!(binding.drain(), vec![42]);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod events;
pub mod memory;

pub use events::{EventReceiver, EventSource, SourceBinding, DEFAULT_EVENT_CAPACITY};
pub use memory::ResourcePool;
