//! Mesh data, bounds and procedural shapes

use crate::backend::types::Vertex;
use glam::{Mat4, Vec2, Vec3, Vec4};

/// Axis-aligned box stored as center and half extents
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub center: Vec3,
    pub half_size: Vec3,
}

impl BoundingBox {
    pub fn new(center: Vec3, half_size: Vec3) -> Self {
        Self { center, half_size }
    }

    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self {
            center: (min + max) * 0.5,
            half_size: (max - min) * 0.5,
        }
    }

    /// Smallest box enclosing all points, or an empty box at the origin
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut iter = points.into_iter();
        let Some(first) = iter.next() else {
            return Self::new(Vec3::ZERO, Vec3::ZERO);
        };
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Self::from_min_max(min, max)
    }

    pub fn min(&self) -> Vec3 {
        self.center - self.half_size
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.half_size
    }

    /// World-space box enclosing this box after `model` is applied
    pub fn transformed(&self, model: &Mat4) -> BoundingBox {
        let center = model.transform_point3(self.center);
        // |M| * h gives the extents of the rotated box along each world axis
        let abs_x = model.x_axis.truncate().abs();
        let abs_y = model.y_axis.truncate().abs();
        let abs_z = model.z_axis.truncate().abs();
        let half_size =
            abs_x * self.half_size.x + abs_y * self.half_size.y + abs_z * self.half_size.z;
        BoundingBox { center, half_size }
    }
}

/// A mesh with vertex and index data
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    /// Local-space bounds of the vertex positions
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_points(self.vertices.iter().map(|v| v.position))
    }

    /// Axis-aligned cube centered at the origin
    pub fn cube(size: f32) -> Self {
        let mut mesh = Mesh::new("cube");
        let h = size * 0.5;

        let faces = [
            (Vec3::Z, Vec3::X, Vec3::Y),
            (-Vec3::Z, -Vec3::X, Vec3::Y),
            (Vec3::X, -Vec3::Z, Vec3::Y),
            (-Vec3::X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, -Vec3::Z),
            (-Vec3::Y, Vec3::X, Vec3::Z),
        ];

        for (normal, right, up) in faces {
            let base = mesh.vertices.len() as u32;
            let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
            for (u, v) in corners {
                mesh.vertices.push(Vertex {
                    position: (normal + right * u + up * v) * h,
                    normal,
                    uv: Vec2::new((u + 1.0) * 0.5, 1.0 - (v + 1.0) * 0.5),
                    tangent: right.extend(1.0),
                });
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        mesh
    }

    /// UV sphere, counter-clockwise when seen from outside
    pub fn sphere(radius: f32, segments: u32, rings: u32) -> Self {
        let mut mesh = Mesh::new("sphere");
        let segments = segments.max(3);
        let rings = rings.max(2);

        let segment_angle = std::f32::consts::TAU / segments as f32;
        let ring_angle = std::f32::consts::PI / rings as f32;

        for ring in 0..=rings {
            let phi = ring as f32 * ring_angle;
            let y = phi.cos();
            let ring_radius = phi.sin();

            for segment in 0..=segments {
                let theta = segment as f32 * segment_angle;
                let normal = Vec3::new(ring_radius * theta.cos(), y, ring_radius * theta.sin());
                mesh.vertices.push(Vertex {
                    position: normal * radius,
                    normal,
                    uv: Vec2::new(
                        segment as f32 / segments as f32,
                        ring as f32 / rings as f32,
                    ),
                    tangent: Vec4::new(-theta.sin(), 0.0, theta.cos(), 1.0),
                });
            }
        }

        for ring in 0..rings {
            for segment in 0..segments {
                let current = ring * (segments + 1) + segment;
                let next = current + segments + 1;
                mesh.indices.extend_from_slice(&[
                    current,
                    current + 1,
                    next,
                    current + 1,
                    next + 1,
                    next,
                ]);
            }
        }

        mesh
    }

    /// Plane on the XZ axis facing +Y
    pub fn plane(width: f32, depth: f32, subdivisions: u32) -> Self {
        let mut mesh = Mesh::new("plane");
        let subdivisions = subdivisions.max(1);

        let step_x = width / subdivisions as f32;
        let step_z = depth / subdivisions as f32;

        for z in 0..=subdivisions {
            for x in 0..=subdivisions {
                mesh.vertices.push(Vertex {
                    position: Vec3::new(
                        -width * 0.5 + x as f32 * step_x,
                        0.0,
                        -depth * 0.5 + z as f32 * step_z,
                    ),
                    normal: Vec3::Y,
                    uv: Vec2::new(
                        x as f32 / subdivisions as f32,
                        z as f32 / subdivisions as f32,
                    ),
                    tangent: Vec4::new(1.0, 0.0, 0.0, 1.0),
                });
            }
        }

        for z in 0..subdivisions {
            for x in 0..subdivisions {
                let current = z * (subdivisions + 1) + x;
                let next = current + subdivisions + 1;
                mesh.indices.extend_from_slice(&[
                    current,
                    next,
                    current + 1,
                    current + 1,
                    next,
                    next + 1,
                ]);
            }
        }

        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cube_bounds() {
        let bounds = Mesh::cube(2.0).bounds();
        assert_relative_eq!(bounds.center.length(), 0.0);
        assert_relative_eq!(bounds.half_size.x, 1.0);
        assert_relative_eq!(bounds.half_size.y, 1.0);
        assert_relative_eq!(bounds.half_size.z, 1.0);
    }

    #[test]
    fn test_sphere_radius() {
        let sphere = Mesh::sphere(3.0, 16, 8);
        for v in &sphere.vertices {
            assert_relative_eq!(v.position.length(), 3.0, epsilon = 1e-4);
        }
        assert_eq!(sphere.triangle_count(), 16 * 8 * 2);
    }

    #[test]
    fn test_transformed_bounds_rotation() {
        let bounds = BoundingBox::new(Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0));
        let model = Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0))
            * Mat4::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let world = bounds.transformed(&model);
        assert_relative_eq!(world.center.x, 5.0, epsilon = 1e-5);
        assert_relative_eq!(world.half_size.x, 3.0, epsilon = 1e-5);
        assert_relative_eq!(world.half_size.y, 2.0, epsilon = 1e-5);
        assert_relative_eq!(world.half_size.z, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_empty_mesh() {
        assert!(Mesh::new("empty").is_empty());
        assert!(!Mesh::plane(1.0, 1.0, 1).is_empty());
    }
}
