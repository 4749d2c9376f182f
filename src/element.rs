// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! GPU-resident data structures shared between the host and the WGSL
//! kernels. Layout is per-component `f32`/`u32`/`i32` fields with no
//! alignment padding — these mirror the kernels' storage-buffer element
//! types exactly, so field order and types must not change independently
//! of the shaders in `shaders/wgsl/`.

use bytemuck::{Pod, Zeroable};

/// One input primitive: a triangle's AABB plus the index that identifies it
/// in the caller's own primitive array.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct Element {
    pub primitive_id: u32,
    pub aabb_min: [f32; 3],
    pub aabb_max: [f32; 3],
}

/// A Morton-coded reference to an `Element`, sorted in place by the radix
/// sort stage.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct MortonCodeElement {
    pub morton_code: u32,
    pub element_index: u32,
}

/// The sentinel value used in `LbvhNode::left`/`right` to denote "no child"
/// (a leaf node).
pub const INVALID_POINTER: i32 = 0;

/// One node of the `2N-1`-entry flat hierarchy. Internal nodes occupy
/// indices `[0, N-2]` (with `0` always the root); leaves occupy
/// `[N-1, 2N-2]`.
///
/// Whether `left`/`right` are absolute node indices or offsets relative to
/// the node's own index is controlled by `absolute_pointers` at build time
/// (see [`crate::config::BuildConfig`]); the field layout itself does not
/// change between the two modes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct LbvhNode {
    pub left: i32,
    pub right: i32,
    pub primitive_id: u32,
    pub aabb_min: [f32; 3],
    pub aabb_max: [f32; 3],
}

impl LbvhNode {
    pub fn is_leaf(&self) -> bool {
        self.left == INVALID_POINTER && self.right == INVALID_POINTER
    }

    /// Resolve a child pointer to an absolute node index, given the node's
    /// own index and the build's pointer mode.
    pub fn resolve_child(node_index: u32, pointer: i32, absolute_pointers: bool) -> u32 {
        if absolute_pointers {
            pointer as u32
        } else {
            (node_index as i64 + pointer as i64) as u32
        }
    }
}

/// Per-node scratch state used during hierarchy emission and bottom-up AABB
/// fitting. Never surfaced outside the build.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct LbvhConstructionInfo {
    pub parent: u32,
    pub visitation_count: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_has_both_children_invalid() {
        let leaf = LbvhNode {
            left: INVALID_POINTER,
            right: INVALID_POINTER,
            primitive_id: 7,
            aabb_min: [0.0; 3],
            aabb_max: [1.0; 3],
        };
        assert!(leaf.is_leaf());
    }

    #[test]
    fn resolve_child_absolute_vs_relative() {
        assert_eq!(LbvhNode::resolve_child(3, 9, true), 9);
        assert_eq!(LbvhNode::resolve_child(3, 6, false), 9);
    }

    #[test]
    fn struct_sizes_match_expected_packing() {
        assert_eq!(std::mem::size_of::<Element>(), 4 + 12 + 12);
        assert_eq!(std::mem::size_of::<MortonCodeElement>(), 8);
        assert_eq!(std::mem::size_of::<LbvhNode>(), 4 + 4 + 4 + 12 + 12);
        assert_eq!(std::mem::size_of::<LbvhConstructionInfo>(), 8);
    }
}
