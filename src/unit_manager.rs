// src/unit_manager.rs
//! Texture unit manager: named sampler registry, reserved slots, per-program
//! layout cache, and a minimal-diff binding mirror of the device.
//!
//! - Layouts are computed once per program and cached; `apply()` touches only
//!   units whose occupant actually changed.
//! - All device bind/unbind traffic funnels through one choke point
//!   (`rebind_unit`) so the mirror never drifts from hardware state.
//! - Single-threaded by design: the device context itself is not reentrant,
//!   so everything here takes `&mut self` and nothing locks.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::layout::UnitLayout;
use crate::program::{ProgramId, SamplerUniform, ShaderProgram};
use crate::sampler_table::{SamplerId, SamplerTable};
use crate::texture::TextureRef;

/// Snapshot of the binder's bookkeeping, for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinderStats {
    /// Registered (live) samplers.
    pub live_samplers: usize,
    /// Recycled sampler ids waiting for reuse.
    pub free_ids: usize,
    /// Programs with a cached layout.
    pub cached_layouts: usize,
    /// Units excluded from allocation by reservations.
    pub reserved_units: usize,
    /// Units with a texture currently bound on the device.
    pub bound_units: usize,
}

/// Owns the sampler table, the reserved-slot table, the layout cache and the
/// device binding mirror for one device context.
///
/// The unit count is queried from the device once (by the caller) and fixed
/// for the manager's lifetime. Dropping the manager unbinds everything it
/// still has bound.
pub struct TextureUnitManager {
    max_units: u32,
    table: SamplerTable,
    /// Textures registered with `take_ownership`, kept alive by name.
    store: HashMap<String, TextureRef>,
    /// Units whose binding is managed by an external caller.
    reserved: HashMap<String, u32>,
    layouts: HashMap<ProgramId, UnitLayout>,
    current: Option<ProgramId>,
    /// Mirror of the device: what is bound on each physical unit.
    bound: Vec<Option<TextureRef>>,
}

impl TextureUnitManager {
    /// Create a manager for a device exposing `max_units` texture image units
    /// (e.g. the `GL_MAX_TEXTURE_IMAGE_UNITS` query result).
    pub fn new(max_units: u32) -> Self {
        debug_assert!(max_units > 0, "device reports zero texture units");
        tracing::debug!(max_units, "texture unit manager created");
        Self {
            max_units,
            table: SamplerTable::new(),
            store: HashMap::new(),
            reserved: HashMap::new(),
            layouts: HashMap::new(),
            current: None,
            bound: vec![None; max_units as usize],
        }
    }

    /// Device texture unit limit, immutable for this manager's lifetime.
    #[inline]
    pub fn max_units(&self) -> u32 {
        self.max_units
    }

    pub fn stats(&self) -> BinderStats {
        BinderStats {
            live_samplers: self.table.len(),
            free_ids: self.table.free_count(),
            cached_layouts: self.layouts.len(),
            reserved_units: self.reserved.len(),
            bound_units: self.bound.iter().filter(|b| b.is_some()).count(),
        }
    }

    // ------------------------------------------------------------------
    // Sampler table & texture store
    // ------------------------------------------------------------------

    /// Register `tex` under `name`, allocating (or reusing) a sampler id.
    ///
    /// If the slot already held an *owned* texture different from `tex`, the
    /// old texture is destroyed (its store reference dropped). The slot always
    /// ends up holding `tex`, which may be `None`. With `take_ownership` the
    /// store additionally keeps `tex` alive under `name` until it is replaced
    /// or deleted.
    ///
    /// Reserved names live in a separate namespace; registering a texture
    /// under a name that is also reserved is unsupported caller behavior.
    pub fn register(
        &mut self,
        name: &str,
        tex: Option<TextureRef>,
        take_ownership: bool,
    ) -> SamplerId {
        let id = self.table.ensure(name);

        // True replace: drop the store's copy of a differing old texture.
        if self.table.texture(id).is_some() {
            if let Some(old) = self.store.get(name) {
                let differs = match &tex {
                    Some(new) => !Arc::ptr_eq(old, new),
                    None => true,
                };
                if differs {
                    self.store.remove(name);
                }
            }
        }

        self.table.set(id, tex.clone());
        if take_ownership {
            if let Some(tex) = tex {
                self.store.insert(name.to_string(), tex);
            }
        }
        id
    }

    /// Sampler id registered under `name`, if any.
    #[inline]
    pub fn sampler_id(&self, name: &str) -> Option<SamplerId> {
        self.table.sampler_id(name)
    }

    /// Texture registered under `name` with ownership, if any.
    pub fn owned_texture(&self, name: &str) -> Option<TextureRef> {
        self.store.get(name).cloned()
    }

    /// Overwrite the texture on a slot directly, returning the previous
    /// occupant. The name index stays authoritative: when the slot's name has
    /// an owned store entry, that entry is updated to the new texture (or
    /// cleared for `None`), so by-name lookups never go stale. The previous
    /// texture is handed back, never destroyed here.
    ///
    /// Precondition: `id` names a live slot (fatal in debug builds).
    pub fn replace_on_slot(
        &mut self,
        id: SamplerId,
        tex: Option<TextureRef>,
    ) -> Option<TextureRef> {
        let prev = self.table.set(id, tex.clone());
        if let Some(name) = self.table.name_of(id) {
            if self.store.contains_key(name) {
                let name = name.to_string();
                match tex {
                    Some(tex) => {
                        self.store.insert(name, tex);
                    }
                    None => {
                        self.store.remove(&name);
                    }
                }
            }
        }
        prev
    }

    /// Unregister `name` and return its texture to the caller undestroyed.
    ///
    /// For a reserved name this only drops the reservation. For a registered
    /// sampler the texture is force-unbound from any unit still holding it,
    /// the name is removed, and the sampler id is recycled. Unknown names are
    /// a no-op.
    ///
    /// Layouts that referenced the sampler are not recomputed; stale entries
    /// read as empty slots and simply unbind on the next `apply()`.
    pub fn unregister(&mut self, name: &str) -> Option<TextureRef> {
        if self.reserved.remove(name).is_some() {
            tracing::debug!(name, "reservation removed");
            return None;
        }

        self.table.sampler_id(name)?;
        let tex = self.table.remove(name);
        if let Some(tex) = &tex {
            self.force_unbind(tex);
        }
        // The store's clone goes with the name; the returned handle keeps the
        // texture alive for the caller.
        self.store.remove(name);
        tex
    }

    /// Unregister `name` and destroy the texture (drop the subsystem's
    /// references). Destroys the device object only if the caller retained no
    /// handle of their own.
    pub fn delete(&mut self, name: &str) {
        drop(self.unregister(name));
    }

    // ------------------------------------------------------------------
    // Reserved slots
    // ------------------------------------------------------------------

    /// Reserve `unit` for the externally managed texture known to programs as
    /// `name`. The unit is excluded from layout allocation while reserved; if
    /// something is dynamically bound there right now it is force-unbound.
    ///
    /// Precondition: `unit < max_units` (fatal in debug builds).
    pub fn reserve(&mut self, name: &str, unit: u32) {
        debug_assert!(
            unit < self.max_units,
            "reserved unit {unit} out of range (device limit {})",
            self.max_units
        );
        self.reserved.insert(name.to_string(), unit);
        if self.bound[unit as usize].is_some() {
            self.rebind_unit(unit, None);
        }
        tracing::debug!(name, unit, "texture unit reserved");
    }

    /// Unit reserved under `name`, if any.
    pub fn reserved_unit(&self, name: &str) -> Option<u32> {
        self.reserved.get(name).copied()
    }

    // ------------------------------------------------------------------
    // Layout cache
    // ------------------------------------------------------------------

    /// Compute (or reuse) the unit layout for `program` and push the chosen
    /// unit indices into it.
    ///
    /// With `refresh` false this is an idempotent no-op when a layout is
    /// already cached. Otherwise units are assigned to each resolvable sampler
    /// element in uniform order, skipping reserved units; reserved names get
    /// their fixed unit with no allocation.
    ///
    /// Unresolvable names are collected and reported as
    /// [`Error::MissingSamplers`] after the full pass — the layout is still
    /// cached and usable for everything that did resolve. Running out of
    /// units is [`Error::OutOfUnits`]: the computation aborts and no layout
    /// stays cached for this program.
    pub fn compute_layout(&mut self, program: &mut dyn ShaderProgram, refresh: bool) -> Result<()> {
        let pid = program.program_id();
        if !refresh && self.layouts.contains_key(&pid) {
            return Ok(());
        }

        let unit_count = self.max_units as usize;
        let mut layout = UnitLayout::new(unit_count);
        let mut in_use = vec![false; unit_count];
        for &unit in self.reserved.values() {
            in_use[unit as usize] = true;
        }

        // The cursor only advances, so a unit is assigned at most once.
        let mut next_free = 0usize;
        let mut missing: Vec<String> = Vec::new();

        let uniforms = program.sampler_uniforms();
        for uniform in &uniforms {
            for element in 0..uniform.size.max(1) {
                let name = element_name(uniform, element);

                // Reserved name: fixed unit, no slot allocation.
                if let Some(&unit) = self.reserved.get(&*name) {
                    program.assign_unit(&name, unit);
                    continue;
                }

                let mut id = self.table.sampler_id(&name);
                if id.is_none() && uniform.size == 1 {
                    // Some drivers report a single-element array as "name",
                    // others as "name[0]"; accept either registration.
                    let alt = format!("{}[0]", base_name(&uniform.name));
                    id = self.table.sampler_id(&alt);
                }
                let Some(id) = id else {
                    tracing::warn!(sampler = %name, "program requires unknown sampler");
                    missing.push(name.into_owned());
                    continue;
                };

                while next_free < unit_count && in_use[next_free] {
                    next_free += 1;
                }
                if next_free == unit_count {
                    tracing::warn!(limit = self.max_units, "ran out of texture units");
                    // Hard failure: no partial layout stays cached.
                    self.layouts.remove(&pid);
                    return Err(Error::OutOfUnits {
                        limit: self.max_units,
                    });
                }

                layout.assign(next_free as u32, id);
                in_use[next_free] = true;
                program.assign_unit(&name, next_free as u32);
            }
        }

        self.layouts.insert(pid, layout);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::MissingSamplers(missing))
        }
    }

    /// Cached layout for a program, if one exists.
    pub fn layout(&self, program: ProgramId) -> Option<&UnitLayout> {
        self.layouts.get(&program)
    }

    /// Make `program` the current program for subsequent `apply()` calls.
    /// Touches no device state.
    #[inline]
    pub fn activate(&mut self, program: ProgramId) {
        self.current = Some(program);
    }

    /// Realize the current program's cached layout on the device, rebinding
    /// only units whose occupant differs from the mirror. Returns the number
    /// of units touched; a second call with nothing changed returns 0 and
    /// issues no device calls.
    ///
    /// A layout entry whose sampler slot has since been emptied (sampler
    /// unregistered without refreshing the program) unbinds that unit rather
    /// than faulting.
    pub fn apply(&mut self) -> usize {
        let Some(pid) = self.current else { return 0 };
        let Some(layout) = self.layouts.get(&pid) else {
            return 0;
        };

        // Diff against the mirror first, then funnel changes through the
        // choke point.
        let mut changes: Vec<(u32, Option<TextureRef>)> = Vec::new();
        for (unit, id) in layout.assigned() {
            let tex = self.table.texture(id);
            let same = match (&tex, &self.bound[unit as usize]) {
                (Some(new), Some(cur)) => Arc::ptr_eq(new, cur),
                (None, None) => true,
                _ => false,
            };
            if !same {
                changes.push((unit, tex));
            }
        }

        let touched = changes.len();
        for (unit, tex) in changes {
            self.rebind_unit(unit, tex);
        }
        touched
    }

    /// Force-unbind every unit with a texture bound.
    pub fn unbind_all(&mut self) {
        for unit in 0..self.max_units {
            if self.bound[unit as usize].is_some() {
                self.rebind_unit(unit, None);
            }
        }
    }

    /// Drop every cached layout and the current program. Reserved slots and
    /// registered samplers are untouched. Call at pass boundaries, e.g. when
    /// reservations change between passes.
    pub fn begin_new_pass(&mut self) {
        tracing::debug!(
            dropped = self.layouts.len(),
            "new pass, layout cache cleared"
        );
        self.layouts.clear();
        self.current = None;
    }

    /// Drop exactly one program's cached layout.
    pub fn unregister_program(&mut self, program: ProgramId) {
        self.layouts.remove(&program);
        if self.current == Some(program) {
            self.current = None;
        }
    }

    // ------------------------------------------------------------------
    // Device choke point
    // ------------------------------------------------------------------

    /// The only path that issues device bind/unbind calls. Keeps the mirror
    /// in lock-step with the device.
    fn rebind_unit(&mut self, unit: u32, tex: Option<TextureRef>) {
        let slot = &mut self.bound[unit as usize];
        if let Some(old) = slot.take() {
            old.unbind_from(unit);
        }
        if let Some(tex) = &tex {
            tex.bind_to(unit);
        }
        *slot = tex;
    }

    /// Unbind `tex` from every unit currently holding it.
    fn force_unbind(&mut self, tex: &TextureRef) {
        for unit in 0..self.max_units {
            let held = match &self.bound[unit as usize] {
                Some(cur) => Arc::ptr_eq(cur, tex),
                None => false,
            };
            if held {
                self.rebind_unit(unit, None);
            }
        }
    }
}

impl Drop for TextureUnitManager {
    fn drop(&mut self) {
        // Leave no texture bound past the manager's lifetime.
        self.unbind_all();
    }
}

/// Uniform name with any `[...]` suffix stripped.
fn base_name(name: &str) -> &str {
    name.split('[').next().unwrap_or(name)
}

/// Lookup name for one element of a sampler uniform. Declared arrays always
/// use the explicit `base[element]` form; scalars use the reported name as-is.
fn element_name(uniform: &SamplerUniform, element: u32) -> Cow<'_, str> {
    if uniform.size > 1 {
        Cow::Owned(format!("{}[{element}]", base_name(&uniform.name)))
    } else {
        Cow::Borrowed(uniform.name.as_str())
    }
}
