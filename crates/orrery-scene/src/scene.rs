//! Scene assembly: the body table plus every entity attached to it.
//!
//! Construction is the second phase of a two-phase build. The body table is
//! complete and immutable before any orbit, ring, label or belt is derived
//! from it, so nothing ever looks up a body that is still being populated.

use glam::Vec3;
use orrery_config::Config;
use orrery_orbit::{BodyHierarchy, BodyId, BodyTable, CelestialBody};
use orrery_render::{
    BackendError, InstanceKey, Material, MaterialKey, MaterialTexture, MeshKey, ResourceUploader,
    ShaderFamily,
};

use crate::belt::{Belt, BeltConfig};
use crate::label::{Billboard, rasterize_label};
use crate::mesh;
use crate::orbit::{Orbit, RingSystem};
use crate::starfield;
use crate::surface;

const RING_SEGMENTS: u32 = 128;
const ASTEROID_COLOR: [f32; 4] = [0.52, 0.47, 0.42, 1.0];
const KUIPER_COLOR: [f32; 4] = [0.62, 0.66, 0.74, 1.0];
const ORBIT_ALPHA: f32 = 0.45;
const LABEL_ALPHA: f32 = 0.9;

/// Scene-level settings, usually taken from the render and simulation config.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSettings {
    pub clear_color: [f32; 4],
    pub sphere_subdivisions: u32,
    pub orbit_segments: u32,
    pub label_scale: f32,
    pub ambient: f32,
    pub show_labels: bool,
    pub belt_seed: u64,
    pub starfield_seed: u64,
    pub asteroid_count: u32,
    pub kuiper_count: u32,
    pub star_count: u32,
    pub skybox_face_size: u32,
}

impl SceneSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            clear_color: config.render.clear_color,
            sphere_subdivisions: config.render.sphere_subdivisions,
            orbit_segments: config.render.orbit_segments,
            label_scale: config.render.label_scale,
            ambient: config.render.ambient,
            show_labels: config.simulation.show_labels,
            belt_seed: config.simulation.belt_seed,
            starfield_seed: config.simulation.starfield_seed,
            asteroid_count: config.simulation.asteroid_count,
            kuiper_count: config.simulation.kuiper_count,
            star_count: starfield::DEFAULT_STAR_COUNT,
            skybox_face_size: starfield::DEFAULT_FACE_SIZE,
        }
    }
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Bodies, their attached entities, and the two belts.
#[derive(Debug, Clone)]
pub struct Scene {
    table: BodyTable,
    hierarchy: BodyHierarchy,
    orbits: Vec<Option<Orbit>>,
    rings: Vec<Option<RingSystem>>,
    labels: Vec<Billboard>,
    belts: Vec<Belt>,
    light_source: Option<BodyId>,
    settings: SceneSettings,
    pub show_labels: bool,
}

impl Scene {
    pub fn new(table: BodyTable, settings: SceneSettings) -> Self {
        let orbits: Vec<_> = table.iter().map(Orbit::for_body).collect();
        let rings: Vec<_> = table.iter().map(RingSystem::for_body).collect();
        let labels = table
            .iter()
            .map(|body| Billboard::new(body.id, &rasterize_label(&body.name)))
            .collect();

        // Kuiper seed is offset so the two belts never share a layout.
        let belts = vec![
            Belt::generate(
                "asteroid belt",
                BeltConfig::asteroid(settings.asteroid_count, settings.belt_seed),
            ),
            Belt::generate(
                "kuiper belt",
                BeltConfig::kuiper(settings.kuiper_count, settings.belt_seed.wrapping_add(1)),
            ),
        ];

        let light_source = table.iter().find(|body| body.emissive).map(|body| body.id);
        if light_source.is_none() {
            log::warn!("No emissive body in the table, lighting from the origin");
        }

        log::info!(
            "Scene built: {} bodies, {} orbits, {} ring systems",
            table.len(),
            orbits.iter().flatten().count(),
            rings.iter().flatten().count()
        );

        let mut hierarchy = BodyHierarchy::new(&table);
        hierarchy.update(&table, 0.0);

        Self {
            show_labels: settings.show_labels,
            table,
            hierarchy,
            orbits,
            rings,
            labels,
            belts,
            light_source,
            settings,
        }
    }

    /// Recompute every body's world transform for simulated time `t_days`.
    pub fn update(&mut self, t_days: f64) {
        self.hierarchy.update(&self.table, t_days);
    }

    pub fn table(&self) -> &BodyTable {
        &self.table
    }

    pub fn hierarchy(&self) -> &BodyHierarchy {
        &self.hierarchy
    }

    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    pub fn body(&self, id: BodyId) -> &CelestialBody {
        self.table.get(id)
    }

    pub fn orbit(&self, id: BodyId) -> Option<&Orbit> {
        self.orbits.get(id.index()).and_then(Option::as_ref)
    }

    pub fn ring(&self, id: BodyId) -> Option<&RingSystem> {
        self.rings.get(id.index()).and_then(Option::as_ref)
    }

    pub fn label(&self, id: BodyId) -> Option<&Billboard> {
        self.labels.get(id.index())
    }

    pub fn belts(&self) -> &[Belt] {
        &self.belts
    }

    /// Current position of the light-emitting body.
    pub fn light_position(&self) -> Vec3 {
        self.light_source
            .map(|id| self.hierarchy.transform(id).position_f32())
            .unwrap_or(Vec3::ZERO)
    }

    /// Take the per-frame parts of `settings` (clear color, label scale,
    /// ambient, label visibility). Returns `true` when a field baked into
    /// uploaded resources also changed; those keep their old value.
    pub fn retune(&mut self, settings: &SceneSettings) -> bool {
        let baked_changed = SceneSettings {
            clear_color: self.settings.clear_color,
            label_scale: self.settings.label_scale,
            ambient: self.settings.ambient,
            show_labels: self.settings.show_labels,
            ..settings.clone()
        } != self.settings;

        self.settings.clear_color = settings.clear_color;
        self.settings.label_scale = settings.label_scale;
        self.settings.ambient = settings.ambient;
        self.settings.show_labels = settings.show_labels;
        self.show_labels = settings.show_labels;
        baked_changed
    }

    /// Generate and upload every mesh, material and instance buffer the scene
    /// draws with. Failures are logged and skipped; the affected draws will
    /// be reported missing at render time. Returns the number of failures.
    pub fn upload(&self, uploader: &mut dyn ResourceUploader) -> usize {
        let mut failures = 0;
        let mut check = |what: &str, result: Result<(), BackendError>| {
            if let Err(e) = result {
                log::error!("Failed to upload {what}: {e}");
                failures += 1;
            }
        };

        let sphere = mesh::icosphere(self.settings.sphere_subdivisions);
        check("sphere mesh", uploader.upload_mesh(MeshKey::Sphere, &sphere));
        let circle = mesh::orbit_circle(self.settings.orbit_segments);
        check("orbit mesh", uploader.upload_mesh(MeshKey::OrbitCircle, &circle));
        check("label mesh", uploader.upload_mesh(MeshKey::Quad, &mesh::quad()));
        check(
            "rock mesh",
            uploader.upload_mesh(MeshKey::Rock, &mesh::rock(self.settings.belt_seed)),
        );
        let fullscreen = orrery_render::MeshData::fullscreen_triangle();
        check("skybox mesh", uploader.upload_mesh(MeshKey::Fullscreen, &fullscreen));

        for body in self.table.iter() {
            let id = body.id.0;
            let surface = Material::new(ShaderFamily::Lit, [1.0; 4])
                .with_texture(MaterialTexture::Rgba(surface::body_surface(body)))
                .emissive(body.emissive);
            check(&body.name, uploader.upload_material(MaterialKey::Body(id), &surface));

            if self.orbit(body.id).is_some() {
                let [r, g, b] = body.color;
                let orbit = Material::new(ShaderFamily::Line, [r, g, b, ORBIT_ALPHA]);
                check(&body.name, uploader.upload_material(MaterialKey::Orbit(id), &orbit));
            }

            if let Some(ring) = self.ring(body.id) {
                let d = &ring.descriptor;
                check(
                    &body.name,
                    uploader.upload_mesh(
                        MeshKey::Ring(id),
                        &mesh::annulus(d.inner_radius as f32, d.outer_radius as f32, RING_SEGMENTS),
                    ),
                );
                let [r, g, b] = d.color;
                let material = Material::new(ShaderFamily::Flat, [r, g, b, 1.0])
                    .with_texture(MaterialTexture::Rgba(surface::ring_profile(d, id)));
                check(&body.name, uploader.upload_material(MaterialKey::Ring(id), &material));
            }

            let label = Material::new(ShaderFamily::Flat, [1.0, 1.0, 1.0, LABEL_ALPHA])
                .with_texture(MaterialTexture::Rgba(rasterize_label(&body.name)));
            check(&body.name, uploader.upload_material(MaterialKey::Label(id), &label));
        }

        let belt_colors = [ASTEROID_COLOR, KUIPER_COLOR];
        for (index, (belt, color)) in self.belts.iter().zip(belt_colors).enumerate() {
            if belt.is_empty() {
                continue;
            }
            let index = index as u32;
            check(belt.name, uploader.upload_instances(InstanceKey(index), belt.instances()));
            check(
                belt.name,
                uploader.upload_material(
                    MaterialKey::Belt(index),
                    &Material::new(ShaderFamily::LitInstanced, color),
                ),
            );
        }

        let stars =
            starfield::generate_stars(self.settings.starfield_seed, self.settings.star_count);
        let sky = starfield::bake_cubemap(&stars, self.settings.skybox_face_size);
        let skybox =
            Material::new(ShaderFamily::Skybox, [1.0; 4]).with_texture(MaterialTexture::Cube(sky));
        check("skybox", uploader.upload_material(MaterialKey::Skybox, &skybox));

        if failures == 0 {
            log::info!("Uploaded scene resources");
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_orbit::{BodyDescriptor, BodyTableBuilder};
    use orrery_render::RecordingBackend;

    fn small_settings() -> SceneSettings {
        SceneSettings {
            asteroid_count: 10,
            kuiper_count: 10,
            star_count: 50,
            skybox_face_size: 8,
            sphere_subdivisions: 1,
            ..SceneSettings::default()
        }
    }

    #[test]
    fn test_origin_body_gets_no_orbit() {
        let scene = Scene::new(BodyTable::builtin().unwrap(), small_settings());
        let sun = scene.table().lookup("Sun").id;
        let earth = scene.table().lookup("Earth").id;
        assert!(scene.orbit(sun).is_none());
        assert!(scene.orbit(earth).is_some());
    }

    #[test]
    fn test_only_ringed_bodies_get_rings() {
        let scene = Scene::new(BodyTable::builtin().unwrap(), small_settings());
        let ringed: Vec<_> = scene
            .table()
            .iter()
            .filter(|b| scene.ring(b.id).is_some())
            .map(|b| b.name.as_str())
            .collect();
        assert_eq!(ringed, vec!["Saturn", "Uranus"]);
    }

    #[test]
    fn test_light_follows_emissive_body() {
        let table = BodyTableBuilder::new()
            .with(BodyDescriptor::new("Planet", 1.0, 10.0, 100.0))
            .build()
            .unwrap();
        let scene = Scene::new(table, small_settings());
        assert_eq!(scene.light_position(), Vec3::ZERO);

        let scene = Scene::new(BodyTable::builtin().unwrap(), small_settings());
        assert_eq!(scene.light_position(), Vec3::ZERO);
    }

    #[test]
    fn test_upload_covers_every_draw_key() {
        let scene = Scene::new(BodyTable::builtin().unwrap(), small_settings());
        let mut backend = RecordingBackend::strict();
        assert_eq!(scene.upload(&mut backend), 0);

        for body in scene.table().iter() {
            let id = body.id.0;
            assert_eq!(backend.material_family(MaterialKey::Body(id)), Some(ShaderFamily::Lit));
            assert!(backend.material_family(MaterialKey::Label(id)).is_some());
            assert_eq!(
                backend.material_family(MaterialKey::Orbit(id)).is_some(),
                scene.orbit(body.id).is_some()
            );
            assert_eq!(backend.has_mesh(MeshKey::Ring(id)), scene.ring(body.id).is_some());
        }
        assert_eq!(backend.instance_count(InstanceKey(0)), Some(10));
        assert_eq!(backend.material_family(MaterialKey::Skybox), Some(ShaderFamily::Skybox));
    }

    #[test]
    fn test_empty_belts_are_not_uploaded() {
        let settings = SceneSettings {
            asteroid_count: 0,
            ..small_settings()
        };
        let scene = Scene::new(BodyTable::builtin().unwrap(), settings);
        let mut backend = RecordingBackend::new();
        scene.upload(&mut backend);
        assert_eq!(backend.instance_count(InstanceKey(0)), None);
        assert_eq!(backend.instance_count(InstanceKey(1)), Some(10));
    }

    #[test]
    fn test_retune_updates_frame_settings_only() {
        let mut scene = Scene::new(BodyTable::builtin().unwrap(), small_settings());
        let mut settings = scene.settings().clone();
        settings.ambient = 0.5;
        settings.show_labels = !scene.show_labels;
        assert!(!scene.retune(&settings));
        assert_eq!(scene.settings().ambient, 0.5);
        assert_eq!(scene.show_labels, settings.show_labels);

        settings.asteroid_count += 1;
        assert!(scene.retune(&settings));
        assert_ne!(scene.settings().asteroid_count, settings.asteroid_count);
    }
}
