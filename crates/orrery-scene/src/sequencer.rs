//! The per-frame render sequence.
//!
//! Each frame walks [`FramePhase`] in order, never going back:
//!
//! 1. `Clear` resets color and depth.
//! 2. `UpdateCamera` pushes the camera matrices, updates body transforms and
//!    sorts the draw list.
//! 3. `DrawBodiesFarToNear` draws, per body in sorted order, its sphere, ring
//!    system, orbit and label, with blending on.
//! 4. `DrawBelts` draws the instanced belts opaque.
//! 5. `DrawSkybox` draws the sky at the far plane with `LessEqual`, then puts
//!    the previous depth comparison back.
//! 6. `Present` submits the frame.

use std::collections::HashSet;

use glam::Vec3;
use orrery_orbit::BodyId;
use orrery_render::{BackendError, Camera, DepthCompare, MaterialKey, MeshKey, RenderBackend};

use crate::draw_list::DepthSortedDrawList;
use crate::entity::{Renderable, dispatch};
use crate::scene::Scene;

const LIGHT_COLOR: Vec3 = Vec3::ONE;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FramePhase {
    #[default]
    Idle,
    Clear,
    UpdateCamera,
    DrawBodiesFarToNear,
    DrawBelts,
    DrawSkybox,
    Present,
}

/// Draw counts for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draws: u32,
    /// Draws the backend rejected, usually for a missing resource.
    pub skipped: u32,
}

#[derive(Debug, Default)]
pub struct RenderPassSequencer {
    draw_list: DepthSortedDrawList,
    renderables: Vec<Renderable>,
    phase: FramePhase,
    warned: HashSet<(MeshKey, MaterialKey)>,
    stats: FrameStats,
    frames: u64,
}

impl RenderPassSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> FramePhase {
        self.phase
    }

    /// Sorted order from the most recent frame.
    pub fn draw_list(&self) -> &DepthSortedDrawList {
        &self.draw_list
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Render one frame of `scene` at simulated time `t_days`.
    pub fn render_frame(
        &mut self,
        scene: &mut Scene,
        camera: &Camera,
        t_days: f64,
        backend: &mut dyn RenderBackend,
    ) -> FrameStats {
        self.stats = FrameStats::default();

        self.enter(FramePhase::Clear);
        backend.clear(scene.settings().clear_color);

        self.enter(FramePhase::UpdateCamera);
        scene.update(t_days);
        let uniforms =
            camera.to_uniform(scene.light_position(), LIGHT_COLOR, scene.settings().ambient);
        backend.set_frame_uniforms(&uniforms);
        self.draw_list
            .build_from_hierarchy(camera.position.as_dvec3(), scene.hierarchy());

        self.enter(FramePhase::DrawBodiesFarToNear);
        backend.set_depth_test(true);
        backend.set_blending(true);
        let mut renderables = std::mem::take(&mut self.renderables);
        renderables.clear();
        for id in self.draw_list.iter() {
            push_body_renderables(scene, camera, id, &mut renderables);
        }
        self.submit_all(&renderables, backend);

        self.enter(FramePhase::DrawBelts);
        backend.set_blending(false);
        renderables.clear();
        renderables.extend(
            scene
                .belts()
                .iter()
                .enumerate()
                .filter(|(_, belt)| !belt.is_empty())
                .map(|(index, _)| Renderable::BeltBatch {
                    index: index as u32,
                }),
        );
        self.submit_all(&renderables, backend);
        self.renderables = renderables;

        self.enter(FramePhase::DrawSkybox);
        let previous = backend.depth_compare();
        backend.set_depth_compare(DepthCompare::LessEqual);
        self.submit(&Renderable::Skybox, backend);
        backend.set_depth_compare(previous);

        self.enter(FramePhase::Present);
        backend.present();
        self.frames += 1;

        self.stats
    }

    fn enter(&mut self, phase: FramePhase) {
        debug_assert!(
            phase > self.phase || phase == FramePhase::Clear,
            "frame phase went from {:?} back to {phase:?}",
            self.phase
        );
        log::trace!("Frame {}: {phase:?}", self.frames);
        self.phase = phase;
    }

    fn submit_all(&mut self, renderables: &[Renderable], backend: &mut dyn RenderBackend) {
        for renderable in renderables {
            self.submit(renderable, backend);
        }
    }

    /// Dispatch one draw; a rejected draw is logged once per resource pair
    /// and the frame carries on.
    fn submit(&mut self, renderable: &Renderable, backend: &mut dyn RenderBackend) {
        match dispatch(renderable, backend) {
            Ok(()) => self.stats.draws += 1,
            Err(e) => {
                self.stats.skipped += 1;
                self.warn_once(renderable, &e);
            }
        }
    }

    fn warn_once(&mut self, renderable: &Renderable, error: &BackendError) {
        if self.warned.insert((renderable.mesh(), renderable.material())) {
            log::warn!("Skipping draw of {renderable:?}: {error}");
        }
    }
}

/// Sphere, then ring system, then orbit, then label, all from transforms
/// computed this frame.
fn push_body_renderables(scene: &Scene, camera: &Camera, id: BodyId, out: &mut Vec<Renderable>) {
    let transform = scene.hierarchy().transform(id);

    out.push(Renderable::Body {
        id,
        model: transform.model_matrix(),
    });

    if let Some(ring) = scene.ring(id) {
        out.push(Renderable::Ring {
            id,
            model: ring.model_matrix(transform),
        });
    }

    if let Some(orbit) = scene.orbit(id) {
        let center = scene.hierarchy().orbit_center(scene.body(id));
        out.push(Renderable::Orbit {
            id,
            model: orbit.model_matrix(center),
        });
    }

    if scene.show_labels
        && let Some(label) = scene.label(id)
    {
        out.push(Renderable::Label {
            id,
            model: label.model_matrix(
                transform.position_f32(),
                transform.radius as f32,
                camera.position,
                camera.right(),
                camera.up(),
                scene.settings().label_scale,
            ),
        });
    }
}
