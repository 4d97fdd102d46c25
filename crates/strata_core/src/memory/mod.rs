//! # Memory Management
//!
//! Reuse pools for objects whose creation is expensive (render resources).
//!
//! ## Design Philosophy
//!
//! Streaming churns through the same kinds of objects every frame:
//! - Released objects are recycled, not destroyed
//! - A pool never holds more objects than were ever in use at once

mod pool;

pub use pool::ResourcePool;
