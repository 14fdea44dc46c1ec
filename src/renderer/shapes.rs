//! Shape generation for 2D primitives

use glam::Vec2;

use super::vertex::Vertex;
use crate::sim::Rect;

/// Two triangles covering a rectangle, with per-corner colors
fn quad(min: Vec2, max: Vec2, top: [f32; 4], bottom: [f32; 4]) -> [Vertex; 6] {
    [
        Vertex::new(min.x, min.y, top),
        Vertex::new(min.x, max.y, bottom),
        Vertex::new(max.x, min.y, top),
        Vertex::new(max.x, min.y, top),
        Vertex::new(min.x, max.y, bottom),
        Vertex::new(max.x, max.y, bottom),
    ]
}

/// Solid filled rectangle
pub fn filled_rect(rect: &Rect, color: [f32; 4]) -> [Vertex; 6] {
    quad(rect.min(), rect.max(), color, color)
}

/// Rectangle shaded from `top` to `bottom`
pub fn vertical_gradient(rect: &Rect, top: [f32; 4], bottom: [f32; 4]) -> [Vertex; 6] {
    quad(rect.min(), rect.max(), top, bottom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled_rect_covers_corners() {
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0);
        let vertices = filled_rect(&rect, [1.0; 4]);
        let xs: Vec<f32> = vertices.iter().map(|v| v.position[0]).collect();
        let ys: Vec<f32> = vertices.iter().map(|v| v.position[1]).collect();
        assert!(xs.iter().all(|&x| x == 10.0 || x == 40.0));
        assert!(ys.iter().all(|&y| y == 20.0 || y == 60.0));
    }

    #[test]
    fn test_gradient_colors_follow_y() {
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        let top = [1.0, 0.0, 0.0, 1.0];
        let bottom = [0.0, 0.0, 1.0, 1.0];
        for v in vertical_gradient(&rect, top, bottom) {
            let expected = if v.position[1] == 0.0 { top } else { bottom };
            assert_eq!(v.color, expected);
        }
    }
}
