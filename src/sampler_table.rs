// src/sampler_table.rs
//! Dense sampler slot table with free-list id recycling.
//!
//! A sampler is a named slot holding (at most) one texture reference. Ids are
//! compact `u32` indices into the slot vector; unregistering pushes the id
//! onto a free-list so the table never grows past its high-water mark.

use std::collections::HashMap;

use crate::texture::TextureRef;

/// Compact handle naming a sampler slot.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct SamplerId(u32);

impl SamplerId {
    /// Sentinel for "no such sampler" (layout entries, failed lookups).
    pub const INVALID: SamplerId = SamplerId(u32::MAX);

    #[inline]
    pub fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Slot storage plus the name→id map.
///
/// Invariants: every id in `by_name` indexes a live slot; `names[i]` is the
/// registered name of slot `i` whenever slot `i` is live; distinct live names
/// hold distinct ids.
#[derive(Default)]
pub struct SamplerTable {
    slots: Vec<Option<TextureRef>>,
    names: Vec<Option<String>>,
    free: Vec<SamplerId>,
    by_name: HashMap<String, SamplerId>,
}

impl SamplerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id registered under `name`, if any.
    #[inline]
    pub fn sampler_id(&self, name: &str) -> Option<SamplerId> {
        self.by_name.get(name).copied()
    }

    /// Texture currently on the slot, if the id is live and the slot is
    /// non-empty. An out-of-range or recycled id reads as empty.
    #[inline]
    pub fn texture(&self, id: SamplerId) -> Option<TextureRef> {
        if !id.is_valid() {
            return None;
        }
        self.slots.get(id.index()).and_then(|s| s.clone())
    }

    /// Registered name of a live slot.
    pub fn name_of(&self, id: SamplerId) -> Option<&str> {
        self.names.get(id.index()).and_then(|n| n.as_deref())
    }

    /// Id for `name`, allocating a slot if the name is new. Reuses a freed id
    /// when one is available, otherwise extends the table.
    pub fn ensure(&mut self, name: &str) -> SamplerId {
        if let Some(id) = self.sampler_id(name) {
            return id;
        }
        let id = match self.free.pop() {
            Some(id) => id,
            None => {
                let id = SamplerId(self.slots.len() as u32);
                self.slots.push(None);
                self.names.push(None);
                id
            }
        };
        self.names[id.index()] = Some(name.to_string());
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Overwrite the slot's texture, returning the previous occupant.
    /// Precondition: `id` is live (programming error otherwise).
    pub fn set(&mut self, id: SamplerId, tex: Option<TextureRef>) -> Option<TextureRef> {
        debug_assert!(
            id.is_valid() && id.index() < self.slots.len(),
            "invalid sampler id {:?}",
            id
        );
        std::mem::replace(&mut self.slots[id.index()], tex)
    }

    /// Unregister `name`: clears the slot, recycles the id, returns the
    /// slot's texture. Unknown names are a no-op.
    pub fn remove(&mut self, name: &str) -> Option<TextureRef> {
        let id = self.by_name.remove(name)?;
        let tex = self.slots[id.index()].take();
        self.names[id.index()] = None;
        self.free.push(id);
        tex
    }

    /// Number of live (registered) samplers.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Depth of the recycle free-list.
    pub fn free_count(&self) -> usize {
        self.free.len()
    }
}
