//! Export through the codec and preview collaborators.
//!
//! Codec failures propagate. Preview export is best effort: failures are
//! logged and reported as `false`.

use super::DepthSimMap;
use crate::camera::{MetadataBag, ViewParams};
use crate::error::DepthSimError;
use crate::export::{jet_color, DepthSimCodec, EncodedMaps, MapTarget, PreviewExporter};
use crate::image::ImageF32;
use log::{debug, error};
use serde_json::json;
use std::path::{Path, PathBuf};

/// Preview depth clip: `[p01 * 0.8, p90 * 1.1]`.
const PREVIEW_DEPTH_LOW: (f32, f32) = (0.01, 0.8);
const PREVIEW_DEPTH_HIGH: (f32, f32) = (0.9, 1.1);

impl DepthSimMap {
    /// Write the maps at full resolution (at `scale`) to the conventional
    /// location for `(view, scale)`.
    pub fn save<V, C>(&self, views: &V, codec: &C) -> Result<(), DepthSimError>
    where
        V: ViewParams + ?Sized,
        C: DepthSimCodec + ?Sized,
    {
        let depth = self.full_res_depth();
        let sim = self.full_res_similarity();
        let maps = EncodedMaps {
            width: depth.w,
            height: depth.h,
            depth: depth.data,
            sim: sim.data,
            metadata: self.export_metadata(views)?,
        };
        let target = MapTarget::Indexed {
            view: self.view,
            scale: self.scale,
        };
        codec.write(&target, &maps)?;
        debug!(
            "DepthSimMap::save view={} scale={} {}x{}",
            self.view, self.scale, maps.width, maps.height
        );
        Ok(())
    }

    /// Write the internal grid as-is to explicit destinations.
    pub fn save_refine<V, C>(
        &self,
        views: &V,
        codec: &C,
        depth_path: &Path,
        sim_path: &Path,
    ) -> Result<(), DepthSimError>
    where
        V: ViewParams + ?Sized,
        C: DepthSimCodec + ?Sized,
    {
        let maps = EncodedMaps {
            width: self.w,
            height: self.h,
            depth: self.depth_values(),
            sim: self.similarity_values(),
            metadata: self.export_metadata(views)?,
        };
        let target = MapTarget::Paths {
            depth: PathBuf::from(depth_path),
            sim: PathBuf::from(sim_path),
        };
        codec.write(&target, &maps)?;
        Ok(())
    }

    /// Read the maps stored for `(view, from_scale)` and resample them into
    /// this grid.
    pub fn load<C: DepthSimCodec + ?Sized>(
        &mut self,
        codec: &C,
        from_scale: usize,
    ) -> Result<(), DepthSimError> {
        if from_scale == 0 {
            return Err(DepthSimError::InvalidScale {
                scale: from_scale,
                step: 1,
            });
        }
        let target = MapTarget::Indexed {
            view: self.view,
            scale: from_scale,
        };
        let maps = codec.read(&target)?;
        let depth = ImageF32::from_vec(maps.width, maps.height, maps.depth)?;
        let sim = ImageF32::from_vec(maps.width, maps.height, maps.sim)?;
        self.init_from_depth_sim_at_scale(&depth, &sim, from_scale)
    }

    /// Metadata attached to persisted maps: the view's own tags plus
    /// `downscale`, `CArr`, `iCamArr`, `minDepth`/`maxDepth` and `P`.
    pub fn export_metadata<V: ViewParams + ?Sized>(
        &self,
        views: &V,
    ) -> Result<MetadataBag, DepthSimError> {
        let unknown = || DepthSimError::UnknownView(self.view);
        let geom = views.geometry(self.view).ok_or_else(unknown)?;
        let meta = views.metadata(self.view).ok_or_else(unknown)?;

        let mut bag = meta.tags;
        bag.insert("downscale".into(), json!(meta.downscale));
        bag.insert(
            "CArr".into(),
            json!([geom.center.x, geom.center.y, geom.center.z]),
        );
        let inv_k: Vec<f64> = geom.inv_k.transpose().iter().copied().collect();
        bag.insert("iCamArr".into(), json!(inv_k));

        let range = self.depth_range();
        if range.is_empty() {
            debug!("DepthSimMap::export_metadata view={} has no valid depth", self.view);
        } else {
            bag.insert("minDepth".into(), json!(range.min));
            bag.insert("maxDepth".into(), json!(range.max));
        }
        if let Some(p) = meta.projection {
            let p: Vec<f64> = p.transpose().iter().copied().collect();
            bag.insert("P".into(), json!(p));
        }
        Ok(bag)
    }

    /// Side-by-side jet preview: depth in the left half, similarity in the
    /// right half, `2·w × h` pixels.
    ///
    /// Similarity is normalized over `[-1, sim_threshold]`; without a
    /// threshold the map's own similarity range is used when it is not
    /// degenerate. Fails when the map has no valid depth.
    pub fn render_preview(&self, sim_threshold: Option<f32>) -> Result<Vec<[u8; 3]>, String> {
        let (lo_p, lo_k) = PREVIEW_DEPTH_LOW;
        let (hi_p, hi_k) = PREVIEW_DEPTH_HIGH;
        let no_depth = || format!("view {} has no valid depth", self.view);
        let depth_min = self.percentile_depth(lo_p).ok_or_else(no_depth)? * lo_k;
        let depth_max = self.percentile_depth(hi_p).ok_or_else(no_depth)? * hi_k;

        let (mut sim_min, mut sim_max) = (-1.0, sim_threshold.unwrap_or(1.0));
        if sim_threshold.is_none() {
            let auto = self.similarity_range();
            if (auto.max - auto.min).abs() > f32::EPSILON && !auto.is_empty() {
                sim_min = auto.min;
                sim_max = auto.max;
            }
            debug!(
                "DepthSimMap::render_preview view={} sim range [{sim_min}, {sim_max}]",
                self.view
            );
        }

        let out_w = 2 * self.w;
        let mut pixels = vec![[0u8; 3]; out_w * self.h];
        for (y, row) in self.cells.chunks(self.w.max(1)).enumerate() {
            let out = &mut pixels[y * out_w..(y + 1) * out_w];
            let (left, right) = out.split_at_mut(self.w);
            for ((cell, l), r) in row.iter().zip(left).zip(right) {
                *l = jet_color(normalize(cell.depth, depth_min, depth_max));
                *r = jet_color(normalize(cell.sim, sim_min, sim_max));
            }
        }
        Ok(pixels)
    }

    /// Render and export a preview. Failures are logged and yield `false`.
    pub fn save_to_image<E: PreviewExporter + ?Sized>(
        &self,
        path: &Path,
        sim_threshold: Option<f32>,
        exporter: &E,
    ) -> bool {
        let result = self
            .render_preview(sim_threshold)
            .and_then(|pixels| exporter.write_rgb(path, 2 * self.w, self.h, &pixels));
        match result {
            Ok(()) => true,
            Err(err) => {
                error!(
                    "Failed to save '{}' (sim threshold: {:?}): {err}",
                    path.display(),
                    sim_threshold
                );
                false
            }
        }
    }
}

#[inline]
fn normalize(v: f32, min: f32, max: f32) -> f32 {
    (v - min) / (max - min)
}
