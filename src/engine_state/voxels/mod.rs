//! # Voxels
//!
//! The block grid the simulation runs against.
//!
//! * **Block**: The closed set of block kinds and their properties
//! * **World**: The dense `VoxelGrid`, its terrain and its collision queries

pub mod block;
pub mod world;
