//! Perspective camera rig shared by picking, panel anchoring and rendering.
//!
//! The rig always looks down `-Z`; only its position moves.

use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub direction: Vec3,
}

impl Ray {
    /// Distance along the ray to the first hit on a sphere, if any.
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let to_center = center - self.origin;
        let along = to_center.dot(self.direction);
        let closest_sq = to_center.length_squared() - along * along;
        let radius_sq = radius * radius;
        if closest_sq > radius_sq {
            return None;
        }
        let half_chord = (radius_sq - closest_sq).sqrt();
        let near = along - half_chord;
        let far = along + half_chord;
        if far < 0.0 {
            None
        } else if near < 0.0 {
            Some(0.0)
        } else {
            Some(near)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub position: Vec3,
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl CameraRig {
    pub fn new(position: Vec3, fov_y: f32, aspect: f32) -> Self {
        Self {
            position,
            fov_y,
            aspect,
            near: 0.1,
            far: 1000.0,
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, Vec3::NEG_Z, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// World point to normalized device coordinates. `None` behind the camera.
    pub fn project(&self, world: Vec3) -> Option<Vec2> {
        let clip = self.view_projection() * world.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        Some(clip.xy() / clip.w)
    }

    /// Ray from the camera through a normalized device position.
    pub fn ray_through(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_projection().inverse();
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        Ray {
            origin: self.position,
            direction: (far - near).normalize_or(Vec3::NEG_Z),
        }
    }

    /// Height of the view frustum at `distance` in front of the camera.
    pub fn visible_height_at(&self, distance: f32) -> f32 {
        2.0 * (self.fov_y.to_radians() / 2.0).tan() * distance
    }

    pub fn visible_width_at(&self, distance: f32) -> f32 {
        self.visible_height_at(distance) * self.aspect
    }
}
