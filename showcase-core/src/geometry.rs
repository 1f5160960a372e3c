/// Geometry primitives for the showcase model
use nalgebra::{Point3, Vector3};

/// Index of a material slot inside an engine's material table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MaterialId(pub usize);

/// A 3D vertex with position and normal
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(x: f32, y: f32, z: f32, nx: f32, ny: f32, nz: f32) -> Self {
        Self {
            position: Point3::new(x, y, z),
            normal: Vector3::new(nx, ny, nz),
        }
    }
}

/// A triangle face defined by three vertices and the material it is shaded with
#[derive(Debug, Clone)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
    pub material: MaterialId,
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
            material: MaterialId::default(),
        }
    }

    pub fn with_material(mut self, material: MaterialId) -> Self {
        self.material = material;
        self
    }

    /// Calculate the face normal from the triangle's vertices
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let v0 = self.vertices[0].position;
        let v1 = self.vertices[1].position;
        let v2 = self.vertices[2].position;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1.cross(&edge2).normalize()
    }
}

/// A 3D mesh composed of triangles
#[derive(Debug, Clone)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn append(&mut self, other: Mesh) {
        self.triangles.extend(other.triangles);
    }

    /// Axis-aligned box spanning `min`..`max`, every face using `material`
    pub fn cuboid(min: Point3<f32>, max: Point3<f32>, material: MaterialId) -> Self {
        let (x0, y0, z0) = (min.x, min.y, min.z);
        let (x1, y1, z1) = (max.x, max.y, max.z);

        // Corners listed counter-clockwise when seen from outside
        let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
            ([0.0, 0.0, 1.0], [[x0, y0, z1], [x1, y0, z1], [x1, y1, z1], [x0, y1, z1]]),
            ([0.0, 0.0, -1.0], [[x1, y0, z0], [x0, y0, z0], [x0, y1, z0], [x1, y1, z0]]),
            ([0.0, 1.0, 0.0], [[x0, y1, z1], [x1, y1, z1], [x1, y1, z0], [x0, y1, z0]]),
            ([0.0, -1.0, 0.0], [[x0, y0, z0], [x1, y0, z0], [x1, y0, z1], [x0, y0, z1]]),
            ([1.0, 0.0, 0.0], [[x1, y0, z1], [x1, y0, z0], [x1, y1, z0], [x1, y1, z1]]),
            ([-1.0, 0.0, 0.0], [[x0, y0, z0], [x0, y0, z1], [x0, y1, z1], [x0, y1, z0]]),
        ];

        let mut mesh = Self::new();
        for (n, quad) in faces {
            let v = |c: [f32; 3]| Vertex::new(c[0], c[1], c[2], n[0], n[1], n[2]);
            mesh.add_triangle(Triangle::new(v(quad[0]), v(quad[1]), v(quad[2])).with_material(material));
            mesh.add_triangle(Triangle::new(v(quad[0]), v(quad[2]), v(quad[3])).with_material(material));
        }
        mesh
    }

    /// Number of triangles shaded with `material`
    pub fn count_material(&self, material: MaterialId) -> usize {
        self.triangles
            .iter()
            .filter(|t| t.material == material)
            .count()
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}
