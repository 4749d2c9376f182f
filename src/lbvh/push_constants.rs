// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-stage push-constant layouts. Field order and types mirror the
//! corresponding `PushConstants` struct declared in each `.wgsl` kernel
//! byte-for-byte — see `src/shaders/wgsl/`.

use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct MortonPushConstants {
    pub num_elements: u32,
    pub min_x: f32,
    pub min_y: f32,
    pub min_z: f32,
    pub max_x: f32,
    pub max_y: f32,
    pub max_z: f32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct RadixSortPushConstants {
    pub num_elements: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct HierarchyPushConstants {
    pub num_elements: u32,
    pub absolute_pointers: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct AabbFitPushConstants {
    pub num_elements: u32,
    pub absolute_pointers: u32,
}

/// Tagged union over the four stages' push-constant layouts, replacing what
/// would otherwise be four unrelated C-style structs selected by an
/// external stage enum.
pub enum PushConstants {
    Morton(MortonPushConstants),
    RadixSort(RadixSortPushConstants),
    Hierarchy(HierarchyPushConstants),
    Aabb(AabbFitPushConstants),
}

impl PushConstants {
    pub fn bytes(&self) -> Vec<u8> {
        match self {
            PushConstants::Morton(p) => bytemuck::bytes_of(p).to_vec(),
            PushConstants::RadixSort(p) => bytemuck::bytes_of(p).to_vec(),
            PushConstants::Hierarchy(p) => bytemuck::bytes_of(p).to_vec(),
            PushConstants::Aabb(p) => bytemuck::bytes_of(p).to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn morton_push_constants_match_kernel_layout() {
        assert_eq!(std::mem::size_of::<MortonPushConstants>(), 4 + 6 * 4);
    }

    #[test]
    fn hierarchy_and_aabb_push_constants_are_eight_bytes() {
        assert_eq!(std::mem::size_of::<HierarchyPushConstants>(), 8);
        assert_eq!(std::mem::size_of::<AabbFitPushConstants>(), 8);
    }

    #[test]
    fn bytes_round_trip_through_bytemuck() {
        let pc = PushConstants::Hierarchy(HierarchyPushConstants {
            num_elements: 42,
            absolute_pointers: 1,
        });
        let bytes = pc.bytes();
        assert_eq!(bytes.len(), 8);
        let back: HierarchyPushConstants = *bytemuck::from_bytes(&bytes);
        assert_eq!(back.num_elements, 42);
        assert_eq!(back.absolute_pointers, 1);
    }
}
