//! Overlay draw list
//!
//! Components describe themselves as an ordered list of quads in pixel
//! coordinates (top-left origin). Quads without a UV rect are solid fills;
//! quads with one sample the bitmap-font atlas.

/// An axis-aligned rectangle in pixel coordinates, top-left origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }
}

/// One overlay quad. `uv` is `[u0, v0, u1, v1]` into the font atlas, or
/// `None` for a solid fill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawQuad {
    pub rect: Rect,
    pub uv: Option<[f32; 4]>,
    pub color: [f32; 4],
}

/// Ordered quads for one frame of the overlay
#[derive(Debug, Default)]
pub struct DrawList {
    pub quads: Vec<DrawQuad>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.quads.clear();
    }

    pub fn push_fill(&mut self, rect: Rect, color: [f32; 4]) {
        self.quads.push(DrawQuad {
            rect,
            uv: None,
            color,
        });
    }

    pub fn push_glyph(&mut self, rect: Rect, uv: [f32; 4], color: [f32; 4]) {
        self.quads.push(DrawQuad {
            rect,
            uv: Some(uv),
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_contains_is_edge_inclusive() {
        let r = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert!(r.contains(10.0, 20.0));
        assert!(r.contains(110.0, 70.0));
        assert!(r.contains(50.0, 40.0));
        assert!(!r.contains(9.9, 40.0));
        assert!(!r.contains(50.0, 70.1));
    }

    #[test]
    fn draw_list_preserves_push_order() {
        let mut list = DrawList::new();
        list.push_fill(Rect::new(0.0, 0.0, 1.0, 1.0), [1.0; 4]);
        list.push_glyph(Rect::new(1.0, 0.0, 1.0, 1.0), [0.0, 0.0, 0.5, 0.5], [1.0; 4]);

        assert_eq!(list.quads.len(), 2);
        assert!(list.quads[0].uv.is_none());
        assert!(list.quads[1].uv.is_some());
    }
}
