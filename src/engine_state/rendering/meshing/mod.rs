//! Mesh generation and rebuild budgeting.
//!
//! Chunks are re-meshed lazily: a mutation only marks the chunk dirty, and the engine
//! rebuilds dirty chunks once per tick, stopping after a bounded number of rebuilds that
//! produced geometry. Rebuilds that come out empty (all-air or fully buried chunks) are
//! cheap to upload and do not count against the budget.

use serde::{Deserialize, Serialize};

/// Core mesh generation algorithms and data structures.
mod mesh;

// Re-export the mesh module's public interface for external use
pub use mesh::*;

/// Limits on mesh rebuild work per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshingConfig {
    /// Dirty chunks are rebuilt until this many rebuilds produced a non-empty mesh.
    pub max_nonempty_rebuilds_per_tick: usize,
}

impl Default for MeshingConfig {
    fn default() -> Self {
        Self {
            max_nonempty_rebuilds_per_tick: 1,
        }
    }
}
