/// Triangle-list meshes for hosts that draw individual triangles
use nalgebra::{Point3, Vector3};

use crate::linalg;
use crate::ribbon::{Color, Gradient, RibbonMesh, TriangleStrip, VertexAttributes};

/// A 3D vertex with position and color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub color: Color,
}

impl Vertex {
    pub fn new(position: Point3<f32>, color: Color) -> Self {
        Self { position, color }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Counter-clockwise face normal, `None` for a zero-area triangle
    pub fn calculate_normal(&self) -> Option<Vector3<f32>> {
        let [v0, v1, v2] = self.vertices.map(|v| v.position);
        linalg::normalize(&(v1 - v0).cross(&(v2 - v0)))
    }

    pub fn average_color(&self) -> Color {
        let [a, b, c] = self.vertices.map(|v| v.color);
        [0, 1, 2].map(|i| (a[i] + b[i] + c[i]) / 3.0)
    }
}

/// A 3D mesh composed of triangles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Two triangles `(a, b, c)` and `(a, c, d)` of one color
    fn add_quad(&mut self, corners: [Point3<f32>; 4], color: Color) {
        let [a, b, c, d] = corners.map(|p| Vertex::new(p, color));
        self.add_triangle(Triangle::new(a, b, c));
        self.add_triangle(Triangle::new(a, c, d));
    }

    /// Expand every strip into individual triangles.
    ///
    /// Odd triangles swap their first two vertices so the whole strip keeps
    /// one winding. Strips shaded by UV take their color from `palette` at u.
    pub fn from_ribbon(ribbon: &RibbonMesh, palette: &Gradient) -> Self {
        let triangle_count = ribbon
            .strips
            .iter()
            .map(|s| s.vertex_count().saturating_sub(2))
            .sum();
        let mut mesh = Self::with_capacity(triangle_count);

        for strip in &ribbon.strips {
            let vertex = |index: usize| Vertex::new(strip.position(index), strip_color(strip, index, palette));
            for j in 0..strip.vertex_count().saturating_sub(2) {
                let (a, b) = if j % 2 == 0 { (j, j + 1) } else { (j + 1, j) };
                mesh.add_triangle(Triangle::new(vertex(a), vertex(b), vertex(j + 2)));
            }
        }

        mesh
    }

    /// Cube centered on the origin with one solid color per face.
    ///
    /// Front (−z) blue, back yellow, right magenta, left green, top red,
    /// bottom cyan. All faces wind counter-clockwise seen from outside.
    pub fn colored_cube(size: f32) -> Self {
        let h = size / 2.0;
        let p = Point3::new;
        let mut mesh = Self::with_capacity(12);

        // Front face
        mesh.add_quad([p(h, -h, -h), p(-h, -h, -h), p(-h, h, -h), p(h, h, -h)], [0.0, 0.0, 1.0]);
        // Back face
        mesh.add_quad([p(-h, -h, h), p(h, -h, h), p(h, h, h), p(-h, h, h)], [1.0, 1.0, 0.0]);
        // Right face
        mesh.add_quad([p(h, -h, h), p(h, -h, -h), p(h, h, -h), p(h, h, h)], [1.0, 0.0, 1.0]);
        // Left face
        mesh.add_quad([p(-h, -h, -h), p(-h, -h, h), p(-h, h, h), p(-h, h, -h)], [0.0, 1.0, 0.0]);
        // Top face
        mesh.add_quad([p(-h, h, h), p(h, h, h), p(h, h, -h), p(-h, h, -h)], [1.0, 0.0, 0.0]);
        // Bottom face
        mesh.add_quad([p(-h, -h, -h), p(h, -h, -h), p(h, -h, h), p(-h, -h, h)], [0.0, 1.0, 1.0]);

        mesh
    }
}

fn strip_color(strip: &TriangleStrip, index: usize, palette: &Gradient) -> Color {
    match &strip.attributes {
        VertexAttributes::Colors(colors) => [colors[index * 3], colors[index * 3 + 1], colors[index * 3 + 2]],
        VertexAttributes::Uv(uvs) => palette.sample(uvs[index * 2]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{banking_ramp, Polyline};
    use crate::frame::generate_frames;
    use crate::ribbon::{build_ribbon, Shading, RAINBOW_COLORS};

    #[test]
    fn test_cube_faces_point_outwards() {
        let cube = Mesh::colored_cube(1.0);
        assert_eq!(cube.triangles.len(), 12);

        for triangle in &cube.triangles {
            let normal = triangle.calculate_normal().unwrap();
            let centroid = triangle
                .vertices
                .iter()
                .fold(Vector3::zeros(), |sum, v| sum + v.position.coords)
                / 3.0;
            assert!(normal.dot(&centroid) > 0.0);
        }
    }

    #[test]
    fn test_cube_front_is_blue() {
        let cube = Mesh::colored_cube(2.0);
        let front = &cube.triangles[0];
        assert!(front.vertices.iter().all(|v| v.position.z == -1.0));
        assert_eq!(front.average_color(), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_degenerate_triangle_has_no_normal() {
        let v = Vertex::new(Point3::origin(), [1.0; 3]);
        assert!(Triangle::new(v, v, v).calculate_normal().is_none());
    }

    #[test]
    fn test_ribbon_expansion_keeps_winding() {
        let line = Polyline::straight(Point3::origin(), Vector3::x(), 1.0, 4).unwrap();
        let frames = generate_frames(&line, &Vector3::z(), &[0.0; 4]).unwrap();
        let ribbon = build_ribbon(&frames, 1.0, 7, &Shading::Colors(RAINBOW_COLORS.to_vec())).unwrap();
        let mesh = Mesh::from_ribbon(&ribbon, &Gradient::rainbow());

        assert_eq!(mesh.triangles.len(), 3 * (14 - 2));
        let first = mesh.triangles[0].calculate_normal().unwrap();
        for triangle in &mesh.triangles {
            let normal = triangle.calculate_normal().unwrap();
            assert!((normal - first).norm() < 1e-5);
        }
    }

    #[test]
    fn test_uv_ribbon_takes_palette_colors() {
        let curve = Polyline::sine_sweep(10, 0.1, 2.0).unwrap();
        let frames = generate_frames(&curve, &Vector3::x(), &banking_ramp(10, 90.0)).unwrap();
        let ribbon = build_ribbon(&frames, 1.0, 5, &Shading::Uv).unwrap();
        let mesh = Mesh::from_ribbon(&ribbon, &Gradient::rainbow());

        // u = 0 on the first cross-section vertex, which is red.
        assert_eq!(mesh.triangles[0].vertices[0].color, RAINBOW_COLORS[0]);
        assert_eq!(mesh.triangles.len(), 9 * (10 - 2));
    }
}
