use flagline_scene::{CameraPose, FlagScene};
use glam::Vec3;

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self::from(CameraPose::default())
    }
}

impl From<CameraPose> for RenderView {
    fn from(pose: CameraPose) -> Self {
        Self {
            eye: pose.eye,
            target: pose.target,
            fov_degrees: pose.fov_degrees,
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads scene state and a view configuration, then produces
/// output. It never mutates the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given scene state and view.
    fn render(&self, scene: &FlagScene, view: &RenderView) -> Self::Output;
}

/// Headless text renderer for CLI output, logging, and tests.
///
/// Produces a human-readable summary of the deformed scene: per-flag
/// placement, phase, and the depth range its cloth currently spans.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &FlagScene, view: &RenderView) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "=== Flag Line (t={:.2}s, flags={}) ===\n",
            scene.time(),
            scene.flags().len()
        ));
        out.push_str(&format!(
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}\n",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.fov_degrees
        ));
        out.push_str(&format!(
            "Rope: {} vertices, {} triangles\n",
            scene.rope().positions().len(),
            scene.rope().indices().len() / 3
        ));

        for (i, flag) in scene.flags().iter().enumerate() {
            let (mut z_min, mut z_max) = (f32::INFINITY, f32::NEG_INFINITY);
            for p in flag.grid().positions() {
                z_min = z_min.min(p.z);
                z_max = z_max.max(p.z);
            }
            out.push_str(&format!(
                "  flag {i}: x={:+.2} phase={:.2} depth=[{:+.4}, {:+.4}]\n",
                flag.x_offset(),
                flag.phase(),
                z_min,
                z_max
            ));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flagline_common::SceneConfig;

    #[test]
    fn debug_renderer_fresh_scene() {
        let scene = FlagScene::new(SceneConfig::default()).unwrap();
        let output = DebugTextRenderer::new().render(&scene, &RenderView::default());

        assert!(output.contains("t=0.00"));
        assert!(output.contains("flags=5"));
        assert!(output.contains("flag 0"));
        assert!(output.contains("flag 4"));
    }

    #[test]
    fn debug_renderer_reports_deformation() {
        let mut scene = FlagScene::new(SceneConfig::default()).unwrap();
        scene.advance(1.5);
        let output = DebugTextRenderer::new().render(&scene, &RenderView::default());

        assert!(output.contains("t=1.50"));
        // A deformed flag spans a nonzero depth range.
        assert!(!output.contains("depth=[+0.0000, +0.0000]"));
    }

    #[test]
    fn render_view_matches_camera_pose() {
        let view = RenderView::default();
        assert_eq!(view.fov_degrees, 40.0);
        assert_eq!(view.target, Vec3::new(0.0, -0.1, 0.0));
    }
}
