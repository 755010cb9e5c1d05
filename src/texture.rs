// src/texture.rs
//! The opaque texture capability the binder consumes.
//!
//! The binder never inspects a texture; it only needs identity equality
//! (`Arc::ptr_eq`) and the two device operations below. Concrete wrappers
//! (2D textures, rectangle textures, render-target color buffers, ...) live
//! outside this crate and implement [`TextureBind`] over their device handle.

use std::sync::Arc;

/// Device operations the binder issues against a texture.
///
/// Both calls must be safe to issue redundantly; no return value is consulted.
/// A concrete implementation typically selects the active unit and binds or
/// unbinds its target there. Releasing the underlying device object belongs in
/// the implementor's `Drop`.
pub trait TextureBind {
    /// Bind this texture on the given texture unit.
    fn bind_to(&self, unit: u32);

    /// Unbind this texture from the given texture unit.
    fn unbind_from(&self, unit: u32);
}

/// Shared handle to a texture. Identity, not content, is what the binder
/// tracks: two `TextureRef`s are the same texture iff they are clones of one
/// `Arc`. Dropping the binder's clones is how "the store destroys a texture" —
/// the device object goes away when the last clone anywhere is dropped.
pub type TextureRef = Arc<dyn TextureBind>;
