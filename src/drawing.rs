use crate::{
    body::Rgba,
    rendering::{GpuCircle, GpuQuad},
    vector::VectorExt,
};
use cgmath::{InnerSpace, Vector2, Vector3};

/// Drawing surface the simulation renders into once per tick.
pub trait Canvas {
    fn clear(&mut self, color: Rgba);
    fn circle(&mut self, center: Vector2<f64>, radius: f64, color: Rgba);
    fn line(&mut self, from: Vector2<f64>, to: Vector2<f64>, color: Rgba);
}

const LINE_THICKNESS: f32 = 1.0;
const DEPTH_STEP: f32 = 1.0e-6;

/// Records draw calls as GPU instances for [`crate::rendering::RenderData`].
///
/// Every primitive gets a slightly smaller depth than the one before it, so
/// later draws end up on top.
#[derive(Clone)]
pub struct DrawHandler {
    pub clear_color: Rgba,
    pub quads: Vec<GpuQuad>,
    pub circles: Vec<GpuCircle>,
    depth: f32,
}

impl DrawHandler {
    pub fn new() -> DrawHandler {
        DrawHandler {
            clear_color: Rgba::BLACK,
            quads: vec![],
            circles: vec![],
            depth: 1.0,
        }
    }

    fn next_depth(&mut self) -> f32 {
        self.depth = (self.depth - DEPTH_STEP).max(0.0);
        self.depth
    }

    pub fn push_circle(&mut self, pos: Vector2<f32>, radius: f32, color: Vector3<f32>) {
        let depth = self.next_depth();
        self.circles.push(GpuCircle {
            position: Vector3 {
                x: pos.x,
                y: pos.y,
                z: depth,
            },
            color,
            radius,
        });
    }

    pub fn push_line(
        &mut self,
        start_pos: Vector2<f32>,
        end_pos: Vector2<f32>,
        thickness: f32,
        color: Vector3<f32>,
    ) {
        let start_to_end = end_pos - start_pos;
        let middle = start_pos + start_to_end * 0.5;
        let direction = start_to_end.normalize_or_zero();
        let rotation = direction.y.atan2(direction.x);
        let length = start_to_end.magnitude();
        let depth = self.next_depth();
        self.quads.push(GpuQuad {
            position: Vector3 {
                x: middle.x,
                y: middle.y,
                z: depth,
            },
            rotation,
            color,
            size: Vector2 {
                x: length,
                y: thickness,
            },
        });
    }
}

impl Canvas for DrawHandler {
    fn clear(&mut self, color: Rgba) {
        self.clear_color = color;
        self.quads.clear();
        self.circles.clear();
        self.depth = 1.0;
    }

    fn circle(&mut self, center: Vector2<f64>, radius: f64, color: Rgba) {
        let Some(center) = center.cast::<f32>() else {
            return;
        };
        self.push_circle(center, radius as f32, color.to_vector());
    }

    fn line(&mut self, from: Vector2<f64>, to: Vector2<f64>, color: Rgba) {
        let (Some(from), Some(to)) = (from.cast::<f32>(), to.cast::<f32>()) else {
            return;
        };
        self.push_line(from, to, LINE_THICKNESS, color.to_vector());
    }
}

impl Default for DrawHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_drops_previous_frame() {
        let mut d = DrawHandler::new();
        d.circle(Vector2::new(1.0, 2.0), 3.0, Rgba::WHITE);
        d.line(Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.0), Rgba::WHITE);
        d.clear(Rgba::opaque(1, 2, 3));
        assert!(d.circles.is_empty());
        assert!(d.quads.is_empty());
        assert_eq!(d.clear_color, Rgba::opaque(1, 2, 3));
    }

    #[test]
    fn later_draws_are_in_front() {
        let mut d = DrawHandler::new();
        d.circle(Vector2::new(0.0, 0.0), 1.0, Rgba::WHITE);
        d.circle(Vector2::new(0.0, 0.0), 1.0, Rgba::BLACK);
        assert!(d.circles[1].position.z < d.circles[0].position.z);
    }

    #[test]
    fn line_becomes_rotated_quad() {
        let mut d = DrawHandler::new();
        d.line(Vector2::new(0.0, 0.0), Vector2::new(0.0, 10.0), Rgba::WHITE);
        let quad = &d.quads[0];
        assert_eq!(quad.size.x, 10.0);
        assert_eq!((quad.position.x, quad.position.y), (0.0, 5.0));
        assert!((quad.rotation - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn zero_length_line_has_no_nan() {
        let mut d = DrawHandler::new();
        d.line(Vector2::new(4.0, 4.0), Vector2::new(4.0, 4.0), Rgba::WHITE);
        let quad = &d.quads[0];
        assert_eq!(quad.size.x, 0.0);
        assert!(!quad.rotation.is_nan());
    }
}
