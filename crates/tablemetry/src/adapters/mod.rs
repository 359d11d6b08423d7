//! Concrete adapters shipped with the engine.
//!
//! Heavyweight extraction backends live outside this crate; what ships here
//! is the plumbing to reach them: a subprocess wrapper speaking a small JSON
//! protocol, and a replay adapter for externally produced results.

mod precomputed;
mod subprocess;

pub use precomputed::PrecomputedAdapter;
pub use subprocess::SubprocessAdapter;
