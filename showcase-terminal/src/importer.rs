/// Staged procedural drill "import": one part per poll, reported as importer events
use nalgebra::Point3;
use showcase_core::{ImporterEvent, MaterialId, Mesh};

/// Bytes a binary STL spends on one triangle, used to size the fake download
const BYTES_PER_TRIANGLE: u64 = 50;

/// Materials of the drill model, in material-id order
pub const DRILL_MATERIALS: [(&str, u32); 5] = [
    ("Drill_01", 0xe8b020),
    ("Chuck", 0x505458),
    ("Battery", 0x202020),
    ("Bit", 0xc8ccd0),
    ("Trigger", 0x303030),
];

fn part(min: [f32; 3], max: [f32; 3], material: usize) -> Mesh {
    Mesh::cuboid(
        Point3::new(min[0], min[1], min[2]),
        Point3::new(max[0], max[1], max[2]),
        MaterialId(material),
    )
}

/// The drill, built from boxes around the point the camera poses look at
pub fn drill_parts() -> Vec<Mesh> {
    vec![
        // Barrel and motor housing
        part([-2.3, 1.6, -0.8], [-0.2, 2.6, 0.0], 0),
        // Grip
        part([-2.0, 0.2, -0.6], [-1.4, 1.6, -0.2], 0),
        part([-1.4, 1.1, -0.5], [-1.25, 1.45, -0.3], 4),
        part([-2.3, -0.2, -0.9], [-1.1, 0.2, 0.1], 2),
        part([-0.2, 1.8, -0.6], [0.4, 2.4, -0.2], 1),
        part([0.4, 2.0, -0.45], [1.6, 2.2, -0.35], 3),
    ]
}

/// Hands out the drill one part at a time
#[derive(Debug)]
pub struct DrillImporter {
    path: String,
    pending: Vec<Mesh>,
    loaded: u64,
    total: u64,
}

impl DrillImporter {
    pub fn new(path: &str) -> Self {
        let mut pending = drill_parts();
        let total = pending
            .iter()
            .map(|mesh| mesh.triangles.len() as u64 * BYTES_PER_TRIANGLE)
            .sum();
        pending.reverse();
        Self {
            path: path.to_string(),
            pending,
            loaded: 0,
            total,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Next part with its progress event, or `Loaded` once everything arrived
    pub fn poll(&mut self) -> (Option<Mesh>, ImporterEvent) {
        match self.pending.pop() {
            Some(mesh) => {
                self.loaded += mesh.triangles.len() as u64 * BYTES_PER_TRIANGLE;
                let event = ImporterEvent::Progress {
                    loaded: self.loaded,
                    total: self.total,
                };
                (Some(mesh), event)
            }
            None => (None, ImporterEvent::Loaded),
        }
    }

    pub fn is_done(&self) -> bool {
        self.pending.is_empty()
    }
}
