/// Geometry primitives for the cube mesh
use nalgebra::{Point2, Point3, Vector3};

/// A 3D vertex with position, normal and texture coordinate
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
    pub uv: Point2<f32>,
}

impl Vertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>, uv: Point2<f32>) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Calculate the face normal from the triangle's winding
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let v0 = self.vertices[0].position;
        let v1 = self.vertices[1].position;
        let v2 = self.vertices[2].position;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1.cross(&edge2).normalize()
    }
}

/// Triangle soup describing a shape in local space
#[derive(Debug, Clone)]
pub struct Geometry {
    pub triangles: Vec<Triangle>,
}

/// Face layout of a box: outward normal, then the in-plane axes mapped to
/// the texture's u and v. `u x v == normal`, so faces wind counter-clockwise
/// seen from outside.
const BOX_FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
    ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
];

impl Geometry {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// The 1x1x1 box the component draws
    pub fn unit_box() -> Self {
        Self::cuboid(1.0, 1.0, 1.0)
    }

    /// Axis-aligned box centred on the origin. Every face maps the whole
    /// texture, with v growing towards the face's "up" axis.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let half = Vector3::new(width / 2.0, height / 2.0, depth / 2.0);
        let mut geometry = Self::with_capacity(12);

        for (normal, u_axis, v_axis) in BOX_FACES {
            let normal = Vector3::from(normal);
            let u_axis = Vector3::from(u_axis);
            let v_axis = Vector3::from(v_axis);

            let corner = |s: f32, t: f32| {
                let offset = normal + u_axis * s + v_axis * t;
                Vertex::new(
                    Point3::from(offset.component_mul(&half)),
                    normal,
                    Point2::new((s + 1.0) / 2.0, (t + 1.0) / 2.0),
                )
            };

            geometry.add_triangle(Triangle::new(
                corner(-1.0, -1.0),
                corner(1.0, -1.0),
                corner(1.0, 1.0),
            ));
            geometry.add_triangle(Triangle::new(
                corner(-1.0, -1.0),
                corner(1.0, 1.0),
                corner(-1.0, 1.0),
            ));
        }

        geometry
    }

    /// Interleaved `[x, y, z, u, v]` per vertex, as uploaded to GPU buffers
    pub fn interleaved_position_uv(&self) -> Vec<f32> {
        let mut data = Vec::with_capacity(self.vertex_count() * 5);
        for triangle in &self.triangles {
            for vertex in &triangle.vertices {
                data.extend_from_slice(&[
                    vertex.position.x,
                    vertex.position.y,
                    vertex.position.z,
                    vertex.uv.x,
                    vertex.uv.y,
                ]);
            }
        }
        data
    }

    pub fn vertex_count(&self) -> usize {
        self.triangles.len() * 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_box_shape() {
        let geometry = Geometry::unit_box();
        assert_eq!(geometry.triangles.len(), 12);
        for triangle in &geometry.triangles {
            for vertex in &triangle.vertices {
                assert!((vertex.position.x.abs() - 0.5).abs() < 1e-6
                    || (vertex.position.y.abs() - 0.5).abs() < 1e-6
                    || (vertex.position.z.abs() - 0.5).abs() < 1e-6);
                assert!(vertex.position.coords.amax() <= 0.5 + 1e-6);
            }
        }
    }

    #[test]
    fn test_winding_matches_normals() {
        let geometry = Geometry::unit_box();
        for triangle in &geometry.triangles {
            let expected = triangle.vertices[0].normal;
            assert!((triangle.calculate_normal() - expected).norm() < 1e-6);
        }
    }

    #[test]
    fn test_uvs_cover_texture() {
        let geometry = Geometry::unit_box();
        for face in geometry.triangles.chunks(2) {
            let uvs: Vec<_> = face.iter().flat_map(|t| t.vertices.iter().map(|v| v.uv)).collect();
            assert!(uvs.iter().any(|uv| uv.x == 0.0 && uv.y == 0.0));
            assert!(uvs.iter().any(|uv| uv.x == 1.0 && uv.y == 1.0));
        }
    }

    #[test]
    fn test_interleaved_layout() {
        let geometry = Geometry::unit_box();
        let data = geometry.interleaved_position_uv();
        assert_eq!(geometry.vertex_count(), 36);
        assert_eq!(data.len(), 36 * 5);
        let first = &geometry.triangles[0].vertices[0];
        assert_eq!(&data[..5], &[first.position.x, first.position.y, first.position.z, first.uv.x, first.uv.y]);
    }
}
