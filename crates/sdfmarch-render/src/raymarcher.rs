//! CPU ray marcher for composite SDF scenes
//!
//! One primary ray per pixel is reconstructed from the inverse projection and
//! camera-to-world transforms, sphere traced against the scene's
//! [`Evaluator`], and shaded with a diffuse plus ambient term. Pixels are
//! independent, so [`RayMarcher::render`] hands them to the tiled parallel
//! dispatch.

use std::time::Instant;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3, Vec4};
use sdfmarch_core::Evaluator;
use serde::{Deserialize, Serialize};

use crate::camera::CameraTransforms;
use crate::dispatch::dispatch_tiles;
use crate::environment::Environment;
use crate::surface::Surface;

/// Sphere tracing limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarchSettings {
    /// Maximum number of marching steps per ray
    pub max_steps: u32,
    /// Rays travelling further than this are misses
    pub max_distance: f32,
    /// Distance threshold for a surface hit
    pub epsilon: f32,
    /// Multiplier on each step. Values below 1 trade speed for robustness
    /// against distance bounds that overestimate.
    pub step_scale: f32,
    /// Offset of the central differences used for normals
    pub normal_offset: f32,
}

impl Default for MarchSettings {
    fn default() -> Self {
        Self {
            max_steps: 256,
            max_distance: 100.0,
            epsilon: 1e-3,
            step_scale: 1.0,
            normal_offset: 1e-3,
        }
    }
}

/// Uniform block for one frame.
///
/// Laid out for a GPU uniform buffer; the CPU path reads it through the
/// accessors.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Uniforms {
    pub camera_to_world: [[f32; 4]; 4],
    pub inverse_projection: [[f32; 4]; 4],
    pub light_position: [f32; 3],
    /// Nonzero when smooth operations blend
    pub blend: u32,
    pub resolution: [u32; 2],
    pub _pad: [u32; 2],
}

impl Uniforms {
    pub fn new(
        transforms: CameraTransforms,
        light_position: Vec3,
        blend: bool,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            camera_to_world: transforms.camera_to_world.to_cols_array_2d(),
            inverse_projection: transforms.inverse_projection.to_cols_array_2d(),
            light_position: light_position.to_array(),
            blend: u32::from(blend),
            resolution: [width, height],
            _pad: [0; 2],
        }
    }

    pub fn camera_to_world(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.camera_to_world)
    }

    pub fn inverse_projection(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.inverse_projection)
    }

    pub fn light_position(&self) -> Vec3 {
        Vec3::from_array(self.light_position)
    }

    pub fn blend_enabled(&self) -> bool {
        self.blend != 0
    }

    pub fn width(&self) -> u32 {
        self.resolution[0]
    }

    pub fn height(&self) -> u32 {
        self.resolution[1]
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// A ray with a normalized direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Surface point found by sphere tracing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Distance travelled along the ray
    pub t: f32,
    pub point: Vec3,
    pub color: Vec3,
    pub steps: u32,
}

/// How a march ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum March {
    Hit(Hit),
    /// Travelled past the far bound
    Miss,
    /// Ran out of steps before deciding; shaded like a miss
    Exhausted,
}

impl March {
    pub fn hit(&self) -> Option<&Hit> {
        match self {
            March::Hit(hit) => Some(hit),
            March::Miss | March::Exhausted => None,
        }
    }
}

/// Sphere trace `ray` against `field`.
pub fn sphere_trace(field: &Evaluator<'_>, ray: &Ray, settings: &MarchSettings) -> March {
    if field.is_empty() {
        return March::Miss;
    }

    let mut t = 0.0;
    for steps in 0..settings.max_steps {
        let point = ray.at(t);
        let sample = field.evaluate(point);
        if sample.distance < settings.epsilon {
            return March::Hit(Hit {
                t,
                point,
                color: sample.color,
                steps,
            });
        }
        t += sample.distance * settings.step_scale;
        if t > settings.max_distance {
            return March::Miss;
        }
    }
    March::Exhausted
}

/// Surface normal from central differences of the distance field
pub fn estimate_normal(field: &Evaluator<'_>, p: Vec3, offset: f32) -> Vec3 {
    let dx = Vec3::new(offset, 0.0, 0.0);
    let dy = Vec3::new(0.0, offset, 0.0);
    let dz = Vec3::new(0.0, 0.0, offset);
    Vec3::new(
        field.distance(p + dx) - field.distance(p - dx),
        field.distance(p + dy) - field.distance(p - dy),
        field.distance(p + dz) - field.distance(p - dz),
    )
    .normalize_or_zero()
}

/// True when a surface lies between `point` and `light`
pub fn occluded(
    field: &Evaluator<'_>,
    point: Vec3,
    normal: Vec3,
    light: Vec3,
    settings: &MarchSettings,
) -> bool {
    let origin = point + normal * settings.epsilon * 4.0;
    let to_light = light - origin;
    let limit = to_light.length();
    let ray = Ray::new(origin, to_light);

    let mut t = 0.0;
    for _ in 0..settings.max_steps {
        if t >= limit {
            return false;
        }
        let d = field.distance(ray.at(t));
        if d < settings.epsilon {
            return true;
        }
        t += d * settings.step_scale;
    }
    false
}

/// Per-frame ray marcher over one scene snapshot
#[derive(Debug, Clone)]
pub struct RayMarcher<'a> {
    field: Option<&'a Evaluator<'a>>,
    camera_to_world: Mat4,
    inverse_projection: Mat4,
    eye: Vec3,
    light: Vec3,
    resolution: Vec2,
    march: MarchSettings,
    environment: Environment,
}

impl<'a> RayMarcher<'a> {
    pub fn new(
        field: &'a Evaluator<'a>,
        uniforms: &Uniforms,
        march: MarchSettings,
        environment: Environment,
    ) -> Self {
        let mut marcher = Self::background_only(uniforms, march, environment);
        marcher.field = Some(field);
        marcher
    }

    /// A marcher for a scene with nothing in it: every ray misses
    pub fn background_only(uniforms: &Uniforms, march: MarchSettings, environment: Environment) -> Self {
        let camera_to_world = uniforms.camera_to_world();
        Self {
            field: None,
            camera_to_world,
            inverse_projection: uniforms.inverse_projection(),
            eye: camera_to_world.transform_point3(Vec3::ZERO),
            light: uniforms.light_position(),
            resolution: Vec2::new(uniforms.width() as f32, uniforms.height() as f32),
            march,
            environment,
        }
    }

    /// Primary ray through the center of pixel `(x, y)`, row 0 at the top
    pub fn primary_ray(&self, x: u32, y: u32) -> Ray {
        let ndc = Vec2::new(
            (x as f32 + 0.5) / self.resolution.x * 2.0 - 1.0,
            1.0 - (y as f32 + 0.5) / self.resolution.y * 2.0,
        );
        let view = self
            .inverse_projection
            .project_point3(Vec3::new(ndc.x, ndc.y, 0.0));
        Ray::new(self.eye, self.camera_to_world.transform_vector3(view))
    }

    pub fn trace(&self, ray: &Ray) -> March {
        match self.field {
            Some(field) => sphere_trace(field, ray, &self.march),
            None => March::Miss,
        }
    }

    /// Linear color of pixel `(x, y)` with alpha 1
    pub fn shade_pixel(&self, x: u32, y: u32) -> Vec4 {
        self.shade(&self.primary_ray(x, y)).extend(1.0)
    }

    pub fn shade(&self, ray: &Ray) -> Vec3 {
        match (self.field, self.trace(ray)) {
            (Some(field), March::Hit(hit)) => self.shade_hit(field, &hit),
            _ => self.environment.background.color(ray.direction),
        }
    }

    fn shade_hit(&self, field: &Evaluator<'_>, hit: &Hit) -> Vec3 {
        let normal = estimate_normal(field, hit.point, self.march.normal_offset);
        let to_light = (self.light - hit.point).normalize_or_zero();
        let mut diffuse = normal.dot(to_light).max(0.0);
        if diffuse > 0.0
            && self.environment.shadows
            && occluded(field, hit.point, normal, self.light, &self.march)
        {
            diffuse = 0.0;
        }
        (hit.color * (diffuse + self.environment.ambient)).clamp(Vec3::ZERO, Vec3::ONE)
    }

    /// Shade every pixel of `surface` in parallel tiles.
    ///
    /// The surface must match the resolution the uniforms were built for.
    pub fn render(&self, surface: &mut Surface, tile_size: u32) {
        let start = Instant::now();
        dispatch_tiles(surface, tile_size, |x, y| self.shade_pixel(x, y));
        tracing::debug!(
            width = surface.width(),
            height = surface.height(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Dispatch complete"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use approx::assert_relative_eq;
    use sdfmarch_core::EvalOptions;
    use sdfmarch_sdf::{CsgNode, PrimitiveDesc, SceneBuffers};

    const RED: Vec3 = Vec3::new(1.0, 0.0, 0.0);

    fn uniforms(camera: &Camera, size: u32) -> Uniforms {
        Uniforms::new(
            camera.transforms(size, size),
            Vec3::new(0.0, 5.0, 0.0),
            false,
            size,
            size,
        )
    }

    fn red_ball() -> SceneBuffers {
        CsgNode::from(PrimitiveDesc::sphere(1.0).with_color(RED))
            .flatten()
            .unwrap()
    }

    #[test]
    fn uniform_block_is_gpu_sized() {
        assert_eq!(std::mem::size_of::<Uniforms>(), 160);
        let u = uniforms(&Camera::default(), 8);
        assert_eq!(u.as_bytes().len(), 160);
        assert_eq!(u.light_position(), Vec3::new(0.0, 5.0, 0.0));
        assert!(!u.blend_enabled());
    }

    #[test]
    fn sphere_on_axis_hits_at_expected_depth() {
        for (distance, radius) in [(5.0, 1.0), (12.0, 2.5), (3.0, 0.25)] {
            let buffers = CsgNode::from(PrimitiveDesc::sphere(radius)).flatten().unwrap();
            let field = Evaluator::new(&buffers, EvalOptions::default());
            let ray = Ray::new(Vec3::new(0.0, 0.0, distance), Vec3::NEG_Z);
            let march = sphere_trace(&field, &ray, &MarchSettings::default());
            let hit = march.hit().unwrap();
            assert_relative_eq!(hit.t, distance - radius, epsilon = 1e-3);
        }
    }

    #[test]
    fn center_pixel_ray_looks_forward() {
        let camera = Camera::default();
        let u = uniforms(&camera, 9);
        let marcher = RayMarcher::background_only(&u, MarchSettings::default(), Environment::default());
        let ray = marcher.primary_ray(4, 4);
        assert_relative_eq!(ray.origin.z, 5.0, epsilon = 1e-5);
        assert_relative_eq!(ray.direction.dot(Vec3::NEG_Z), 1.0, epsilon = 1e-5);
        // Row 0 is the top of the image
        assert!(marcher.primary_ray(4, 0).direction.y > 0.0);
        assert!(marcher.primary_ray(0, 4).direction.x < 0.0);
    }

    #[test]
    fn step_exhaustion_is_not_a_hit() {
        let buffers = red_ball();
        let field = Evaluator::new(&buffers, EvalOptions::default());
        let settings = MarchSettings {
            max_steps: 1,
            ..MarchSettings::default()
        };
        // Grazing ray that needs many small steps
        let ray = Ray::new(Vec3::new(1.001, 0.0, 5.0), Vec3::NEG_Z);
        assert_eq!(sphere_trace(&field, &ray, &settings), March::Exhausted);
    }

    #[test]
    fn ray_pointing_away_misses() {
        let buffers = red_ball();
        let field = Evaluator::new(&buffers, EvalOptions::default());
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        assert_eq!(sphere_trace(&field, &ray, &MarchSettings::default()), March::Miss);
    }

    #[test]
    fn normals_point_out_of_sphere() {
        let buffers = red_ball();
        let field = Evaluator::new(&buffers, EvalOptions::default());
        for p in [Vec3::X, Vec3::NEG_Y, Vec3::new(0.6, 0.0, 0.8)] {
            let n = estimate_normal(&field, p, 1e-3);
            assert_relative_eq!(n.dot(p), 1.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn lit_side_is_brighter_than_ambient() {
        let buffers = red_ball();
        let field = Evaluator::new(&buffers, EvalOptions::default());
        let u = uniforms(&Camera::default(), 32);
        let marcher = RayMarcher::new(&field, &u, MarchSettings::default(), Environment::default());

        // Straight down from above the ball: the normal faces the light
        let top = marcher.shade(&Ray::new(Vec3::new(0.0, 3.0, 0.0), Vec3::NEG_Y));
        assert_relative_eq!(top.x, 1.0, epsilon = 1e-3);
        assert_eq!(top.y, 0.0);

        // The bottom only gets ambient
        let bottom = marcher.shade(&Ray::new(Vec3::new(0.0, -3.0, 0.0), Vec3::Y));
        assert_relative_eq!(bottom.x, 0.1, epsilon = 1e-3);
    }

    #[test]
    fn shadow_ray_blocks_light() {
        let buffers = CsgNode::from(PrimitiveDesc::sphere(1.0).with_color(RED))
            .union(PrimitiveDesc::cuboid(Vec3::new(3.0, 0.1, 3.0)).at(Vec3::new(0.0, 3.0, 0.0)))
            .flatten()
            .unwrap();
        let field = Evaluator::new(&buffers, EvalOptions::default());
        let u = uniforms(&Camera::default(), 16);
        let ray = Ray::new(Vec3::new(0.0, 1.5, 0.0), Vec3::NEG_Y);

        let lit = RayMarcher::new(&field, &u, MarchSettings::default(), Environment::default());
        assert!(lit.shade(&ray).x > 0.9);

        let shadowed = Environment {
            shadows: true,
            ..Environment::default()
        };
        let dark = RayMarcher::new(&field, &u, MarchSettings::default(), shadowed);
        assert_relative_eq!(dark.shade(&ray).x, 0.1, epsilon = 1e-3);
    }

    #[test]
    fn background_only_marcher_misses_everything() {
        let u = uniforms(&Camera::default(), 4);
        let env = Environment::default();
        let marcher = RayMarcher::background_only(&u, MarchSettings::default(), env);
        let mut surface = Surface::new(4, 4);
        marcher.render(&mut surface, 8);
        let bg = env.background.color(Vec3::Z).extend(1.0);
        assert!(surface.pixels().iter().all(|&p| p == bg));
    }
}
