//=========================================================================
// View & Render Target
//=========================================================================
//
// Camera value shared by the systems of a world during a frame, and the
// trait the external renderer implements.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;

//=== View ================================================================

/// 2D camera: center and size in world units, rotation in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    pub center: (f32, f32),
    pub size: (f32, f32),
    pub rotation: f32,
}

impl View {
    /// Creates an unrotated view.
    pub fn new(center: (f32, f32), size: (f32, f32)) -> Self {
        Self {
            center,
            size,
            rotation: 0.0,
        }
    }

    /// Translates the center.
    pub fn move_by(&mut self, dx: f32, dy: f32) {
        self.center.0 += dx;
        self.center.1 += dy;
    }

    /// Scales the visible area. A factor above 1 shows more of the world.
    pub fn zoom(&mut self, factor: f32) {
        self.size.0 *= factor;
        self.size.1 *= factor;
    }

    /// Rotates by `degrees`, keeping the angle in `[0, 360)`.
    pub fn rotate(&mut self, degrees: f32) {
        self.rotation = (self.rotation + degrees).rem_euclid(360.0);
    }
}

impl Default for View {
    fn default() -> Self {
        Self::new((400.0, 300.0), (800.0, 600.0))
    }
}

//=== RenderTarget ========================================================

/// Drawing surface provided by the renderer.
pub trait RenderTarget {
    /// Applies the camera used for the following draw calls.
    fn set_view(&mut self, view: &View);

    /// Access to the concrete backend for graphical systems that know it.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_and_zoom() {
        let mut view = View::new((0.0, 0.0), (100.0, 50.0));
        view.move_by(10.0, -5.0);
        view.zoom(2.0);

        assert_eq!(view.center, (10.0, -5.0));
        assert_eq!(view.size, (200.0, 100.0));
    }

    #[test]
    fn rotate_wraps() {
        let mut view = View::default();
        view.rotate(350.0);
        view.rotate(20.0);
        assert_eq!(view.rotation, 10.0);

        view.rotate(-20.0);
        assert_eq!(view.rotation, 350.0);
    }
}
