//! Unit icosphere meshes and the LOD chain bodies are drawn from.

use std::collections::HashMap;
use std::f32::consts::{PI, TAU};

use glam::Vec3;
use orrery_render::VertexPositionNormalUv;

/// Indexed triangle mesh on the unit sphere.
#[derive(Debug, Clone)]
pub struct Icosphere {
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl Icosphere {
    /// The 12-vertex, 20-face icosahedron (subdivision 0).
    pub fn icosahedron() -> Self {
        let t = (1.0 + 5.0_f32.sqrt()) * 0.5;
        let positions = [
            (-1.0, t, 0.0),
            (1.0, t, 0.0),
            (-1.0, -t, 0.0),
            (1.0, -t, 0.0),
            (0.0, -1.0, t),
            (0.0, 1.0, t),
            (0.0, -1.0, -t),
            (0.0, 1.0, -t),
            (t, 0.0, -1.0),
            (t, 0.0, 1.0),
            (-t, 0.0, -1.0),
            (-t, 0.0, 1.0),
        ]
        .into_iter()
        .map(|(x, y, z)| Vec3::new(x, y, z).normalize())
        .collect();

        #[rustfmt::skip]
        let indices = vec![
            0, 11, 5,   0, 5, 1,    0, 1, 7,    0, 7, 10,   0, 10, 11,
            1, 5, 9,    5, 11, 4,   11, 10, 2,  10, 7, 6,   7, 1, 8,
            3, 9, 4,    3, 4, 2,    3, 2, 6,    3, 6, 8,    3, 8, 9,
            4, 9, 5,    2, 4, 11,   6, 2, 10,   8, 6, 7,    9, 8, 1,
        ];

        Self { positions, indices }
    }

    /// Icosahedron subdivided `level` times.
    pub fn new(level: u32) -> Self {
        (0..level).fold(Self::icosahedron(), |sphere, _| sphere.subdivided())
    }

    /// Split every triangle into four, pushing shared edge midpoints onto the sphere.
    pub fn subdivided(&self) -> Self {
        let mut positions = self.positions.clone();
        let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
        let mut midpoint = |a: u32, b: u32| -> u32 {
            let key = (a.min(b), a.max(b));
            *midpoints.entry(key).or_insert_with(|| {
                positions.push((positions[a as usize] + positions[b as usize]).normalize());
                (positions.len() - 1) as u32
            })
        };

        let mut indices = Vec::with_capacity(self.indices.len() * 4);
        for triangle in self.indices.chunks_exact(3) {
            let [a, b, c] = [triangle[0], triangle[1], triangle[2]];
            let ab = midpoint(a, b);
            let bc = midpoint(b, c);
            let ca = midpoint(c, a);
            indices.extend_from_slice(&[a, ab, ca, b, bc, ab, c, ca, bc, ab, bc, ca]);
        }

        Self { positions, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// GPU vertices: normal equals position, equirectangular UVs.
    pub fn vertices(&self) -> Vec<VertexPositionNormalUv> {
        self.positions
            .iter()
            .map(|p| VertexPositionNormalUv {
                position: p.to_array(),
                normal: p.to_array(),
                uv: [0.5 + p.z.atan2(p.x) / TAU, 0.5 - p.y.asin() / PI],
            })
            .collect()
    }
}

/// Icospheres for every level from 0 to `max_level`, each built from the previous.
pub fn lod_chain(max_level: u32) -> Vec<Icosphere> {
    let mut chain = Vec::with_capacity(max_level as usize + 1);
    chain.push(Icosphere::icosahedron());
    for _ in 0..max_level {
        let next = chain[chain.len() - 1].subdivided();
        chain.push(next);
    }
    chain
}
