use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use lbvh_builder::config::BuildConfig;
use lbvh_builder::gpu::context::GpuContext;
use lbvh_builder::lbvh::Lbvh;

fn main() -> Result<()> {
    env_logger::init();

    let first = env::args()
        .nth(1)
        .context("usage: lbvh-builder <mesh.obj | config.json|yaml>")?;
    let path = PathBuf::from(&first);

    let config = match path.extension().and_then(|e| e.to_str()) {
        Some("json") | Some("yaml") | Some("yml") => BuildConfig::load(&path)?,
        _ => BuildConfig::for_mesh(path),
    };

    let gpu = GpuContext::new().context("failed to initialize GPU context")?;
    let nodes = Lbvh::new(config).execute(&gpu)?;
    log::info!("build produced {} nodes", nodes.len());

    Ok(())
}
