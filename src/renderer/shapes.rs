//! Procedural meshes for the scene
//!
//! All shapes are unit-sized and centred on the origin, emitted as plain
//! triangle lists with counter-clockwise outward faces.

use glam::Vec3;
use std::f32::consts::{PI, TAU};

use super::vertex::Vertex;

fn push_smooth(out: &mut Vec<Vertex>, tri: [(Vec3, Vec3); 3]) {
    for (p, n) in tri {
        out.push(Vertex::new(p, n.normalize_or_zero()));
    }
}

/// Push a flat-shaded triangle, flipping it if it faces the origin.
/// Only valid for convex shapes around the origin.
fn push_outward(out: &mut Vec<Vertex>, a: Vec3, b: Vec3, c: Vec3) {
    let mut n = (b - a).cross(c - a).normalize_or_zero();
    let (b, c) = if n.dot(a + b + c) < 0.0 {
        n = -n;
        (c, b)
    } else {
        (b, c)
    };
    out.push(Vertex::new(a, n));
    out.push(Vertex::new(b, n));
    out.push(Vertex::new(c, n));
}

/// Cone with base radius 1 at y = -0.5 and apex at y = 0.5
pub fn cone(segments: u32, open_ended: bool) -> Vec<Vertex> {
    let segments = segments.max(3);
    let cap = if open_ended { 0 } else { 3 };
    let mut vertices = Vec::with_capacity((segments * (3 + cap)) as usize);
    let apex = Vec3::new(0.0, 0.5, 0.0);
    let slope = |theta: f32| Vec3::new(theta.cos(), 1.0, theta.sin());

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * TAU;
        let theta2 = ((i + 1) as f32 / segments as f32) * TAU;
        let base1 = Vec3::new(theta1.cos(), -0.5, theta1.sin());
        let base2 = Vec3::new(theta2.cos(), -0.5, theta2.sin());

        push_smooth(
            &mut vertices,
            [
                (base1, slope(theta1)),
                (apex, slope((theta1 + theta2) / 2.0)),
                (base2, slope(theta2)),
            ],
        );

        if !open_ended {
            let centre = Vec3::new(0.0, -0.5, 0.0);
            push_outward(&mut vertices, centre, base1, base2);
        }
    }

    vertices
}

/// Frustum of height 1 with the given end radii, capped
pub fn cylinder(top_radius: f32, bottom_radius: f32, segments: u32) -> Vec<Vertex> {
    let segments = segments.max(3);
    let mut vertices = Vec::with_capacity((segments * 12) as usize);
    let side = |theta: f32| Vec3::new(theta.cos(), bottom_radius - top_radius, theta.sin());
    let top_centre = Vec3::new(0.0, 0.5, 0.0);
    let bottom_centre = Vec3::new(0.0, -0.5, 0.0);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * TAU;
        let theta2 = ((i + 1) as f32 / segments as f32) * TAU;
        let ring = |r: f32, y: f32, theta: f32| Vec3::new(r * theta.cos(), y, r * theta.sin());

        let top1 = ring(top_radius, 0.5, theta1);
        let top2 = ring(top_radius, 0.5, theta2);
        let bottom1 = ring(bottom_radius, -0.5, theta1);
        let bottom2 = ring(bottom_radius, -0.5, theta2);

        push_smooth(
            &mut vertices,
            [
                (top1, side(theta1)),
                (bottom2, side(theta2)),
                (bottom1, side(theta1)),
            ],
        );
        push_smooth(
            &mut vertices,
            [
                (top1, side(theta1)),
                (top2, side(theta2)),
                (bottom2, side(theta2)),
            ],
        );

        if top_radius > 0.0 {
            push_outward(&mut vertices, top_centre, top1, top2);
        }
        if bottom_radius > 0.0 {
            push_outward(&mut vertices, bottom_centre, bottom1, bottom2);
        }
    }

    vertices
}

/// Unit-radius UV sphere
pub fn uv_sphere(rings: u32, segments: u32) -> Vec<Vertex> {
    let rings = rings.max(2);
    let segments = segments.max(3);
    let mut vertices = Vec::with_capacity((segments * (2 * rings - 2) * 3) as usize);

    let point = |r: u32, s: u32| {
        let phi = PI * r as f32 / rings as f32;
        let theta = TAU * s as f32 / segments as f32;
        Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin())
    };

    for r in 0..rings {
        for s in 0..segments {
            let a = point(r, s);
            let b = point(r + 1, s);
            let c = point(r + 1, s + 1);
            let d = point(r, s + 1);

            // Skip the degenerate halves of the pole quads
            if r != rings - 1 {
                push_smooth(&mut vertices, [(a, a), (c, c), (b, b)]);
            }
            if r != 0 {
                push_smooth(&mut vertices, [(a, a), (d, d), (c, c)]);
            }
        }
    }

    vertices
}

/// Octahedron with vertices on the unit axes
pub fn octahedron() -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(24);
    for sx in [-1.0, 1.0] {
        for sy in [-1.0, 1.0] {
            for sz in [-1.0, 1.0] {
                push_outward(
                    &mut vertices,
                    Vec3::X * sx,
                    Vec3::Y * sy,
                    Vec3::Z * sz,
                );
            }
        }
    }
    vertices
}

/// Regular dodecahedron with circumradius 1
pub fn dodecahedron() -> Vec<Vertex> {
    let phi = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let inv = 1.0 / phi;

    let mut corners = Vec::with_capacity(20);
    for sx in [-1.0, 1.0] {
        for sy in [-1.0, 1.0] {
            for sz in [-1.0, 1.0] {
                corners.push(Vec3::new(sx, sy, sz));
            }
        }
    }
    for a in [-1.0, 1.0] {
        for b in [-1.0, 1.0] {
            corners.push(Vec3::new(0.0, a * inv, b * phi));
            corners.push(Vec3::new(a * inv, b * phi, 0.0));
            corners.push(Vec3::new(a * phi, 0.0, b * inv));
        }
    }

    // Face centres point along cyclic permutations of (0, ±phi, ±1)
    let mut normals = Vec::with_capacity(12);
    for a in [-1.0, 1.0] {
        for b in [-1.0, 1.0] {
            normals.push(Vec3::new(0.0, a * phi, b));
            normals.push(Vec3::new(b, 0.0, a * phi));
            normals.push(Vec3::new(a * phi, b, 0.0));
        }
    }

    let scale = 1.0 / 3.0_f32.sqrt();
    let mut vertices = Vec::with_capacity(12 * 9);
    for normal in normals {
        let n = normal.normalize();
        let best = corners
            .iter()
            .map(|c| c.dot(n))
            .fold(f32::NEG_INFINITY, f32::max);
        let mut face: Vec<Vec3> = corners
            .iter()
            .copied()
            .filter(|c| c.dot(n) > best - 1e-3)
            .collect();

        let centre = face.iter().copied().sum::<Vec3>() / face.len() as f32;
        let u = (face[0] - centre).normalize();
        let w = n.cross(u);
        face.sort_by(|a, b| {
            let angle = |p: &Vec3| (*p - centre).dot(w).atan2((*p - centre).dot(u));
            angle(a).total_cmp(&angle(b))
        });

        for i in 1..face.len() - 1 {
            push_outward(
                &mut vertices,
                face[0] * scale,
                face[i] * scale,
                face[i + 1] * scale,
            );
        }
    }

    vertices
}

/// Unit square in the XZ plane facing +Y
pub fn plane() -> Vec<Vertex> {
    let a = Vec3::new(-0.5, 0.0, -0.5);
    let b = Vec3::new(-0.5, 0.0, 0.5);
    let c = Vec3::new(0.5, 0.0, 0.5);
    let d = Vec3::new(0.5, 0.0, -0.5);
    let n = Vec3::Y;
    [a, b, c, a, c, d]
        .into_iter()
        .map(|p| Vertex::new(p, n))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_well_formed(vertices: &[Vertex]) {
        assert!(!vertices.is_empty());
        assert_eq!(vertices.len() % 3, 0);
        for v in vertices {
            let n = Vec3::from_array(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-4, "normal {n:?}");
        }
    }

    /// Winding normal agrees with the stored normals
    fn assert_ccw_outward(vertices: &[Vertex]) {
        for tri in vertices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|i| Vec3::from_array(tri[i].position));
            let winding = (b - a).cross(c - a);
            let stored = Vec3::from_array(tri[0].normal);
            assert!(winding.dot(stored) > 0.0, "triangle {a:?} {b:?} {c:?}");
        }
    }

    #[test]
    fn test_cone() {
        let open = cone(64, true);
        assert_eq!(open.len(), 64 * 3);
        assert_well_formed(&open);
        assert_ccw_outward(&open);

        let closed = cone(8, false);
        assert_eq!(closed.len(), 8 * 6);
        assert_ccw_outward(&closed);
    }

    #[test]
    fn test_cylinder() {
        let stand = cylinder(0.3, 0.5, 8);
        assert_eq!(stand.len(), 8 * 12);
        assert_well_formed(&stand);
        assert_ccw_outward(&stand);
    }

    #[test]
    fn test_sphere_normals_point_out() {
        let sphere = uv_sphere(16, 32);
        assert_eq!(sphere.len(), (32 * (2 * 16 - 2) * 3) as usize);
        assert_well_formed(&sphere);
        assert_ccw_outward(&sphere);
        for v in &sphere {
            let p = Vec3::from_array(v.position);
            assert!((p.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_octahedron() {
        let octa = octahedron();
        assert_eq!(octa.len(), 24);
        assert_well_formed(&octa);
        assert_ccw_outward(&octa);
    }

    #[test]
    fn test_dodecahedron() {
        let dodeca = dodecahedron();
        assert_eq!(dodeca.len(), 12 * 3 * 3);
        assert_well_formed(&dodeca);
        assert_ccw_outward(&dodeca);
        for v in &dodeca {
            let p = Vec3::from_array(v.position);
            assert!((p.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_plane_faces_up() {
        let quad = plane();
        assert_eq!(quad.len(), 6);
        assert_ccw_outward(&quad);
    }
}
