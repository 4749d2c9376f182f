// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Reflects a composed WGSL source string for its `@group`/`@binding`
//! resource declarations and `@compute @workgroup_size` entry point.
//!
//! Upstream engines that compile to SPIR-V reflect compiled bytecode (via
//! `spirv-reflect` or similar); since this crate hands WGSL source directly
//! to `wgpu`, there is no binary to reflect. This scans the source text for
//! the same information instead — a small, deliberately non-general WGSL
//! scanner, not a full parser.

use std::collections::BTreeMap;

use crate::error::LbvhError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingInfo {
    pub binding: u32,
    pub read_only: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ReflectionInfo {
    pub descriptor_sets: BTreeMap<u32, Vec<BindingInfo>>,
    pub workgroup_size: (u32, u32, u32),
}

/// Scan `source` for `@group(N) @binding(M) var<storage, ...>` declarations
/// and the `@compute @workgroup_size(x, y, z)` entry point.
pub fn reflect(source: &str) -> Result<ReflectionInfo, LbvhError> {
    let mut descriptor_sets: BTreeMap<u32, Vec<BindingInfo>> = BTreeMap::new();
    let mut workgroup_size = None;

    for line in source.lines() {
        let trimmed = line.trim();

        if let Some((group, binding)) = parse_group_binding(trimmed) {
            let read_only = !trimmed.contains("read_write");
            descriptor_sets
                .entry(group)
                .or_default()
                .push(BindingInfo { binding, read_only });
        }

        if let Some(size) = parse_workgroup_size(trimmed) {
            workgroup_size = Some(size);
        }
    }

    let workgroup_size = workgroup_size.ok_or_else(|| {
        LbvhError::ShaderBuildFailed("no @workgroup_size entry point found".to_string())
    })?;

    Ok(ReflectionInfo {
        descriptor_sets,
        workgroup_size,
    })
}

fn parse_group_binding(line: &str) -> Option<(u32, u32)> {
    if !line.starts_with("@group") {
        return None;
    }
    let group = extract_number(line, "@group(")?;
    let binding_start = line.find("@binding(")?;
    let binding = extract_number(&line[binding_start..], "@binding(")?;
    Some((group, binding))
}

fn parse_workgroup_size(line: &str) -> Option<(u32, u32, u32)> {
    let idx = line.find("@workgroup_size(")?;
    let rest = &line[idx + "@workgroup_size(".len()..];
    let close = rest.find(')')?;
    let args: Vec<u32> = rest[..close]
        .split(',')
        .filter_map(|s| s.trim().parse::<u32>().ok())
        .collect();
    match args.as_slice() {
        [x] => Some((*x, 1, 1)),
        [x, y] => Some((*x, *y, 1)),
        [x, y, z] => Some((*x, *y, *z)),
        _ => None,
    }
}

fn extract_number(s: &str, prefix: &str) -> Option<u32> {
    let start = s.find(prefix)? + prefix.len();
    let rest = &s[start..];
    let end = rest.find(')')?;
    rest[..end].trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MORTON_SHADER: &str = r#"
@group(0) @binding(0) var<storage, read_write> morton_codes: array<MortonCodeElement>;
@group(0) @binding(1) var<storage, read> elements: array<Element>;

@compute @workgroup_size(64)
fn main(@builtin(global_invocation_id) gid: vec3<u32>) {
}
"#;

    #[test]
    fn extracts_bindings_and_workgroup_size() {
        let info = reflect(MORTON_SHADER).unwrap();
        assert_eq!(info.workgroup_size, (64, 1, 1));
        let group0 = info.descriptor_sets.get(&0).unwrap();
        assert_eq!(group0.len(), 2);
        assert!(!group0[0].read_only);
        assert!(group0[1].read_only);
    }

    #[test]
    fn fails_without_entry_point() {
        let result = reflect("fn helper() -> f32 { return 1.0; }");
        assert!(result.is_err());
    }
}
