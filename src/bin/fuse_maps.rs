use depth_fusion::camera::MultiViewParams;
use depth_fusion::config::{load_config, FuseToolConfig};
use depth_fusion::export::{JsonCodec, PngExporter};
use depth_fusion::image::io::write_json_file;
use depth_fusion::{fuse_into_full_resolution, DepthSimMap, DepthSimSummary};
use log::{info, warn};
use serde::Serialize;
use std::env;
use std::path::Path;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path))?;
    let views = MultiViewParams::from_json_file(&config.cameras)?;
    let codec = JsonCodec::new(&config.maps_dir);

    let sources = load_sources(&config, &views, &codec)?;
    let fused = fuse_into_full_resolution(&views, config.view, &sources)
        .map_err(|e| format!("Fusion failed for view {}: {e}", config.view))?;

    let output = &config.output;
    let saved = match (&output.depth_map, &output.sim_map) {
        (Some(depth), Some(sim)) => fused.save_refine(&views, &codec, depth, sim),
        _ => fused.save(&views, &codec),
    };
    saved.map_err(|e| format!("Failed to save fused view {}: {e}", config.view))?;

    if let Some(preview) = &output.preview {
        if !fused.save_to_image(preview, output.sim_threshold, &PngExporter) {
            warn!("Preview {} was not written", preview.display());
        }
    }

    let summary = FuseSummary {
        inputs: sources.iter().map(DepthSimMap::summary).collect(),
        fused: fused.summary(),
    };
    if let Some(path) = &output.summary_json {
        write_json_file(path, &summary)?;
    }

    println!(
        "Fused {} estimates for view {} into {}x{} ({} valid cells)",
        sources.len(),
        config.view,
        fused.width(),
        fused.height(),
        summary.fused.valid_cells
    );
    Ok(())
}

fn load_sources(
    config: &FuseToolConfig,
    views: &MultiViewParams,
    codec: &JsonCodec,
) -> Result<Vec<DepthSimMap>, String> {
    config
        .inputs
        .iter()
        .map(|input| {
            let mut map = DepthSimMap::for_view(views, config.view, input.scale, input.step)
                .map_err(|e| e.to_string())?;
            map.load(codec, input.stored_scale()).map_err(|e| {
                format!(
                    "Failed to load view {} at scale {}: {e}",
                    config.view,
                    input.stored_scale()
                )
            })?;
            info!(
                "Loaded view {} scale {} step {}: {} valid cells",
                config.view,
                input.scale,
                input.step,
                map.valid_count()
            );
            Ok(map)
        })
        .collect()
}

fn usage() -> String {
    "Usage: fuse_maps <config.json>".to_string()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FuseSummary {
    inputs: Vec<DepthSimSummary>,
    fused: DepthSimSummary,
}
