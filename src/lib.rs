// src/lib.rs
//! texbind — texture unit allocation and binding cache for a stateful
//! graphics device.
//!
//! Registers named textures against recycled sampler ids, computes a cached
//! per-program assignment of samplers to the device's limited texture units
//! (around any units reserved for externally managed textures), and realizes
//! those assignments with minimal-diff bind/unbind calls so unchanged units
//! cost nothing per draw.
//!
//! The device surface is two small traits: [`TextureBind`] for the opaque
//! texture objects and [`ShaderProgram`] for linked programs. Everything is
//! single-threaded, matching the device context it drives.

pub mod error;
pub mod layout;
pub mod program;
pub mod sampler_table;
pub mod texture;
pub mod unit_manager;

pub use error::{Error, Result};
pub use layout::UnitLayout;
pub use program::{ProgramId, SamplerUniform, ShaderProgram};
pub use sampler_table::SamplerId;
pub use texture::{TextureBind, TextureRef};
pub use unit_manager::{BinderStats, TextureUnitManager};
