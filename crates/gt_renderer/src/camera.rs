//! Pinhole and thin-lens camera for ray generation.

use gt_math::{Ray, Vec2, Vec3};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::sampling::{gen_f32, random_in_unit_disk};

/// Lens opening for depth of field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aperture {
    /// Lens radius in world units
    Radius(f32),
    /// Photographic f-number; radius is `focal_length / (2 * f)`
    FStop(f32),
}

/// Camera placement and lens settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
    pub width: u32,
    pub height: u32,
    /// Distance from the eye to the image plane, in units of image height
    pub focal_length: f32,
    /// `None` renders with a pinhole
    pub aperture: Option<Aperture>,
    /// Distance to the plane of perfect focus; defaults to `look_at`
    pub focus_distance: Option<f32>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            look_at: Vec3::ZERO,
            up: Vec3::Y,
            width: 800,
            height: 400,
            focal_length: 1.0,
            aperture: None,
            focus_distance: None,
        }
    }
}

/// Camera for generating rays into the scene.
///
/// Pixel (x, y) with x to the right and y downward maps to the image plane
/// point `((x + 0.5) / height - aspect / 2, 0.5 - (y + 0.5) / height)` at
/// `focal_length` in front of the eye.
#[derive(Debug, Clone)]
pub struct Camera {
    width: u32,
    height: u32,
    origin: Vec3,
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    focal_length: f32,
    aspect: f32,
    lens_radius: f32,
    focus_distance: f32,
}

impl Camera {
    pub fn new(config: &CameraConfig) -> Self {
        let forward = (config.look_at - config.position).normalize_or_zero();
        let forward = if forward == Vec3::ZERO { Vec3::NEG_Z } else { forward };

        // Fall back to any perpendicular when `up` is parallel to the view
        let right = forward.cross(config.up).normalize_or_zero();
        let right = if right == Vec3::ZERO {
            forward.any_orthonormal_vector()
        } else {
            right
        };
        let up = right.cross(forward);

        let height = config.height.max(1);
        let lens_radius = match config.aperture {
            None => 0.0,
            Some(Aperture::Radius(r)) => r.max(0.0),
            Some(Aperture::FStop(f)) if f > 0.0 => config.focal_length / (2.0 * f),
            Some(Aperture::FStop(_)) => 0.0,
        };
        let focus_distance = config
            .focus_distance
            .unwrap_or_else(|| (config.look_at - config.position).length())
            .max(f32::EPSILON);

        Self {
            width: config.width,
            height: config.height,
            origin: config.position,
            forward,
            right,
            up,
            focal_length: config.focal_length,
            aspect: config.width as f32 / height as f32,
            lens_radius,
            focus_distance,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn focal_length(&self) -> f32 {
        self.focal_length
    }

    /// Generate a ray for pixel (x, y).
    ///
    /// With `jitter` the sample position is uniform over the pixel,
    /// otherwise it is the pixel center.
    pub fn get_ray(&self, x: u32, y: u32, jitter: bool, rng: &mut dyn RngCore) -> Ray {
        let offset = if jitter {
            Vec2::new(gen_f32(rng), gen_f32(rng))
        } else {
            Vec2::splat(0.5)
        };

        let h = self.height.max(1) as f32;
        let sx = (x as f32 + offset.x) / h - self.aspect * 0.5;
        let sy = 0.5 - (y as f32 + offset.y) / h;
        let direction = self.right * sx + self.up * sy + self.forward * self.focal_length;

        if self.lens_radius <= 0.0 {
            return Ray::new(self.origin, direction);
        }

        // Thin lens: every ray through this pixel meets on the focus plane
        let unit = direction.normalize();
        let focus_point = self.origin + unit * (self.focus_distance / unit.dot(self.forward));
        let disk = random_in_unit_disk(rng) * self.lens_radius;
        let lens_origin = self.origin + self.right * disk.x + self.up * disk.y;

        Ray::new(lens_origin, focus_point - lens_origin)
    }

    /// Continuous pixel coordinates of a world point, or `None` if it lies
    /// behind the camera.
    pub fn project(&self, p: Vec3) -> Option<Vec2> {
        let rel = p - self.origin;
        let depth = rel.dot(self.forward);
        if depth <= 0.0 {
            return None;
        }

        let sx = rel.dot(self.right) / depth * self.focal_length;
        let sy = rel.dot(self.up) / depth * self.focal_length;
        let h = self.height.max(1) as f32;

        Some(Vec2::new((sx + self.aspect * 0.5) * h, (0.5 - sy) * h))
    }
}
