/// Mesh decoders (OBJ text, GLB binary), procedural shapes and background loading.

pub mod error;
pub mod glb;
pub mod loader;
pub mod obj;
pub mod procedural;
pub mod reader;

pub use error::MeshError;
pub use loader::{DecodeJob, MeshFormat, MeshSlot};
