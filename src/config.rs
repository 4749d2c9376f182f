// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

fn default_scene_bounds_padding() -> f32 {
    8.0
}

fn is_default_scene_bounds_padding(v: &f32) -> bool {
    *v == default_scene_bounds_padding()
}

fn default_true() -> bool {
    true
}

fn default_output_path() -> PathBuf {
    PathBuf::from("lbvh.csv")
}

/// Host-side configuration for one build. Everything here is fixed for the
/// lifetime of a single `Lbvh::execute` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Path to the input mesh (OBJ).
    pub mesh_path: PathBuf,

    /// Directory containing the `.wgsl` kernels, resolved relative to the
    /// executable if not set.
    #[serde(default)]
    pub shader_dir: Option<PathBuf>,

    /// Whether child pointers in `LbvhNode` are absolute node indices
    /// (`true`) or offsets relative to the node's own index (`false`).
    #[serde(default = "default_true")]
    pub absolute_pointers: bool,

    /// Scene AABB is scaled by this factor before Morton-code quantization.
    /// Carried forward from the reference implementation without a known
    /// rationale for the exact value.
    #[serde(
        default = "default_scene_bounds_padding",
        skip_serializing_if = "is_default_scene_bounds_padding"
    )]
    pub scene_bounds_padding: f32,

    /// Run host-side invariant verification after the build.
    #[serde(default = "default_true")]
    pub verify: bool,

    /// Where to write the CSV dump of the resulting tree, if any.
    #[serde(default = "default_output_path")]
    pub output_csv: PathBuf,
}

impl BuildConfig {
    pub fn for_mesh(mesh_path: impl Into<PathBuf>) -> Self {
        Self {
            mesh_path: mesh_path.into(),
            shader_dir: None,
            absolute_pointers: true,
            scene_bounds_padding: default_scene_bounds_padding(),
            verify: true,
            output_csv: default_output_path(),
        }
    }

    /// Load a config from a JSON or YAML file, dispatching on extension.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config file: {}", path.display()))?,
            _ => serde_yml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config file: {}", path.display()))?,
        };

        log::info!("Loaded build config: mesh={}", config.mesh_path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = BuildConfig::for_mesh("dragon.obj");
        assert!(cfg.absolute_pointers);
        assert_eq!(cfg.scene_bounds_padding, 8.0);
        assert!(cfg.verify);
    }

    #[test]
    fn round_trips_through_json() {
        let cfg = BuildConfig::for_mesh("dragon.obj");
        let json = serde_json::to_string(&cfg).unwrap();
        let back: BuildConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.mesh_path, cfg.mesh_path);
        assert_eq!(back.absolute_pointers, cfg.absolute_pointers);
    }
}
