//! # Voxel World Core
//!
//! This module contains the block data of the world and everything that changes it.
//!
//! ## Architecture
//!
//! * **Block**: block types, faces and the packed per-cell storage type
//! * **Terrain**: the procedural generator filling new chunks
//! * **Chunk**: fixed-size 32x32x32 block arrays with their live-block work lists
//! * **World**: the chunk registry, streaming chunks in around the player and evicting
//!   far ones
//! * **Automaton**: local block rules (trees, leaves, water) driven by the work lists
//!
//! ## Data Flow
//!
//! 1. The world streams in missing chunks around the player; each is filled by the
//!    terrain generator and queues its tree seeds as live blocks
//! 2. Block writes go through the world, which marks the owning chunk and any touched
//!    neighbor dirty
//! 3. Dirty chunks are re-meshed by the engine before the next draw
//! 4. The automaton consumes a bounded number of live blocks per chunk each tick and
//!    writes new blocks back through the world
//!
//! Everything runs on one thread, in fixed phases; nothing here locks.

pub mod automaton;
pub mod block;
pub mod chunk;
pub mod terrain;
pub mod world;
