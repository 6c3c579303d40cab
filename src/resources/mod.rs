//! Resource management
//!
//! Meshes, materials, textures and the asset tables that own them.

mod assets;
mod material;
mod mesh;
pub mod shaders;
mod texture;

pub use assets::*;
pub use material::*;
pub use mesh::*;
pub use texture::*;
