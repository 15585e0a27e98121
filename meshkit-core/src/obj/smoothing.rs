//! Vertex sharing per smoothing group.

use std::collections::HashMap;

/// Smoothing group identifier. `0` means smoothing is off.
pub type SmoothingGroupId = u32;

/// 0-based pool indices of one face corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CornerKey {
    pub position: usize,
    pub texcoord: Option<usize>,
    pub normal: Option<usize>,
}

/// Maps corner keys to already emitted local vertices, one map per group.
///
/// Local vertex indices are only comparable within one sub-mesh, so the
/// owner must [`clear`](SmoothingGroups::clear) this whenever a new group or
/// sub-mesh starts.
#[derive(Debug, Default)]
pub struct SmoothingGroups {
    maps: HashMap<SmoothingGroupId, HashMap<CornerKey, u32>>,
}

impl SmoothingGroups {
    /// Return the shared vertex for `key`, calling `allocate` when there is none.
    ///
    /// Group `0` never shares: `allocate` is called every time.
    pub fn resolve(
        &mut self,
        group: SmoothingGroupId,
        key: CornerKey,
        allocate: impl FnOnce() -> u32,
    ) -> u32 {
        if group == 0 {
            return allocate();
        }
        *self.maps.entry(group).or_default().entry(key).or_insert_with(allocate)
    }

    pub fn clear(&mut self) {
        self.maps.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.maps.values().all(HashMap::is_empty)
    }
}
