// src/layout.rs
//! Per-program unit→sampler assignment.

use crate::sampler_table::SamplerId;

/// Which sampler occupies each texture unit for one program.
///
/// Computed once per program and cached; entries are `SamplerId::INVALID` for
/// units this program leaves alone (unused or reserved). Construction
/// guarantees a unit is assigned at most once per layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitLayout {
    units: Vec<SamplerId>,
}

impl UnitLayout {
    pub(crate) fn new(unit_count: usize) -> Self {
        Self {
            units: vec![SamplerId::INVALID; unit_count],
        }
    }

    pub(crate) fn assign(&mut self, unit: u32, id: SamplerId) {
        debug_assert!(!self.units[unit as usize].is_valid(), "unit assigned twice");
        self.units[unit as usize] = id;
    }

    /// Sampler assigned to `unit`, or `SamplerId::INVALID`.
    #[inline]
    pub fn sampler_at(&self, unit: u32) -> SamplerId {
        self.units
            .get(unit as usize)
            .copied()
            .unwrap_or(SamplerId::INVALID)
    }

    /// Units this layout assigns, in unit order.
    pub fn assigned(&self) -> impl Iterator<Item = (u32, SamplerId)> + '_ {
        self.units
            .iter()
            .enumerate()
            .filter(|(_, id)| id.is_valid())
            .map(|(unit, &id)| (unit as u32, id))
    }

    /// Number of units assigned by this layout.
    pub fn assigned_count(&self) -> usize {
        self.units.iter().filter(|id| id.is_valid()).count()
    }

    /// Total unit count (the device limit at computation time).
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_layout_reads_invalid() {
        let layout = UnitLayout::new(4);
        assert_eq!(layout.unit_count(), 4);
        assert_eq!(layout.assigned_count(), 0);
        assert!(!layout.sampler_at(0).is_valid());
        // Out-of-range reads are invalid, not a panic.
        assert!(!layout.sampler_at(99).is_valid());
    }

    #[test]
    fn assigned_iterates_in_unit_order() {
        let mut table = crate::sampler_table::SamplerTable::new();
        let a = table.ensure("a");
        let b = table.ensure("b");

        let mut layout = UnitLayout::new(4);
        layout.assign(3, a);
        layout.assign(1, b);
        let assigned: Vec<_> = layout.assigned().collect();
        assert_eq!(assigned, vec![(1, b), (3, a)]);
        assert_eq!(layout.assigned_count(), 2);
    }
}
