// src/program.rs
//! The shader program capability the binder consumes.

/// Stable identity token for a linked program.
///
/// Keys the layout cache. Callers mint these however they like (device object
/// id, handle-table index, counter) as long as a token is never reused while
/// the program it named is still registered here. A raw address would work but
/// is deliberately not required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u64);

/// One active sampler-typed uniform as reported by the driver after linking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplerUniform {
    /// Reported uniform name. Drivers disagree on array spelling: a
    /// single-element array may come back as `shadow` or `shadow[0]`.
    pub name: String,
    /// Raw driver type tag (e.g. `GL_SAMPLER_2D`). Opaque to the binder.
    pub ty: u32,
    /// Declared array size, >= 1.
    pub size: u32,
}

impl SamplerUniform {
    pub fn new(name: impl Into<String>, ty: u32, size: u32) -> Self {
        Self {
            name: name.into(),
            ty,
            size,
        }
    }
}

/// What a linked shader program exposes to the binder.
///
/// Valid only post-link; enumerating uniforms on an unlinked program is the
/// implementor's problem, not ours.
pub trait ShaderProgram {
    /// Identity token, stable for this program's lifetime.
    fn program_id(&self) -> ProgramId;

    /// Active sampler-typed uniforms (already filtered to sampler types).
    fn sampler_uniforms(&self) -> Vec<SamplerUniform>;

    /// Point the named sampler uniform at a texture unit.
    fn assign_unit(&mut self, name: &str, unit: u32);
}
