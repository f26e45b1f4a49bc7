use crate::flag::Flag;
use crate::rope::{RopeCurve, RopeMesh};
use flagline_cloth::GridError;
use flagline_common::{parse_hex_rgb, ConfigError, SceneConfig};
use glam::Vec3;

/// Errors from scene construction.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// A directional light: color, direction toward the scene, intensity.
#[derive(Debug, Clone, Copy)]
pub struct DirectionalLight {
    pub color: [f32; 3],
    pub position: Vec3,
    pub intensity: f32,
}

/// The three-light rig: warm ambient, white key light, warm back light.
#[derive(Debug, Clone, Copy)]
pub struct LightRig {
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
    pub key: DirectionalLight,
    pub back: DirectionalLight,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            ambient_color: [1.0, 0.973, 0.941], // #FFF8F0
            ambient_intensity: 0.7,
            key: DirectionalLight {
                color: [1.0, 1.0, 1.0],
                position: Vec3::new(2.0, 3.0, 4.0),
                intensity: 0.5,
            },
            back: DirectionalLight {
                color: [1.0, 0.941, 0.878], // #FFF0E0
                position: Vec3::new(-1.0, 1.0, -2.0),
                intensity: 0.2,
            },
        }
    }
}

/// Fixed camera placement: slightly above the flag line, looking a touch
/// below center for subtle depth.
#[derive(Debug, Clone, Copy)]
pub struct CameraPose {
    pub eye: Vec3,
    pub target: Vec3,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.3, 4.2),
            target: Vec3::new(0.0, -0.1, 0.0),
            fov_degrees: 40.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

/// The assembled scene: rope, flags, lights, camera placement.
pub struct FlagScene {
    config: SceneConfig,
    flags: Vec<Flag>,
    rope: RopeMesh,
    lights: LightRig,
    camera: CameraPose,
    time: f32,
}

impl FlagScene {
    /// Build a scene from a validated configuration.
    pub fn new(config: SceneConfig) -> Result<Self, SceneError> {
        config.validate()?;

        let total_width = (config.flag_count - 1) as f32 * config.spacing;
        let mut flags = Vec::with_capacity(config.flag_count);
        for i in 0..config.flag_count {
            let x = -total_width / 2.0 + i as f32 * config.spacing;
            flags.push(Flag::new(
                config.flag,
                x,
                i as f32 * config.phase_step,
                config.color_for(i),
            )?);
        }

        let curve = RopeCurve::spanning(total_width);
        let rope = RopeMesh::sweep(&curve, 40, 0.012, 6);

        tracing::info!(
            flags = flags.len(),
            rope_vertices = rope.positions().len(),
            "assembled flag scene"
        );

        Ok(Self {
            config,
            flags,
            rope,
            lights: LightRig::default(),
            camera: CameraPose::default(),
            time: 0.0,
        })
    }

    /// Deform every flag for elapsed time `t`.
    ///
    /// Stateless in `t`: the same elapsed time always produces the same
    /// vertex buffers, regardless of what was rendered before.
    pub fn advance(&mut self, t: f32) {
        for flag in &mut self.flags {
            flag.deform(t, &self.config.wind);
        }
        self.time = t;
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Replace the wind field; takes effect on the next `advance`.
    pub fn set_wind(&mut self, wind: flagline_common::WindParams) {
        self.config.wind = wind;
    }

    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    pub fn rope(&self) -> &RopeMesh {
        &self.rope
    }

    pub fn lights(&self) -> &LightRig {
        &self.lights
    }

    pub fn camera(&self) -> &CameraPose {
        &self.camera
    }

    /// Elapsed time of the most recent `advance`.
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Window clear color from the config.
    pub fn clear_color(&self) -> [f32; 3] {
        parse_hex_rgb(&self.config.clear_color).unwrap_or([0.1, 0.1, 0.15])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flagline_common::WindParams;

    #[test]
    fn default_scene_has_five_flags() {
        let scene = FlagScene::new(SceneConfig::default()).unwrap();
        assert_eq!(scene.flags().len(), 5);

        // Flags centered on the origin, spaced 1.25 apart.
        let xs: Vec<f32> = scene.flags().iter().map(|f| f.x_offset()).collect();
        assert!((xs[0] + 2.5).abs() < 1e-6);
        assert!((xs[4] - 2.5).abs() < 1e-6);
        assert!((xs[1] - xs[0] - 1.25).abs() < 1e-6);
    }

    #[test]
    fn phases_step_per_flag() {
        let scene = FlagScene::new(SceneConfig::default()).unwrap();
        for (i, flag) in scene.flags().iter().enumerate() {
            assert!((flag.phase() - i as f32 * 0.7).abs() < 1e-6);
        }
    }

    #[test]
    fn invalid_config_rejected() {
        let config = SceneConfig {
            flag_count: 0,
            ..SceneConfig::default()
        };
        assert!(matches!(
            FlagScene::new(config),
            Err(SceneError::Config(_))
        ));
    }

    #[test]
    fn advance_is_deterministic() {
        let mut a = FlagScene::new(SceneConfig::default()).unwrap();
        let mut b = FlagScene::new(SceneConfig::default()).unwrap();
        a.advance(0.5);
        a.advance(2.75);
        b.advance(2.75);
        for (fa, fb) in a.flags().iter().zip(b.flags()) {
            assert_eq!(fa.grid().positions(), fb.grid().positions());
        }
        assert_eq!(a.time(), 2.75);
    }

    #[test]
    fn flags_move_out_of_sync() {
        let mut scene = FlagScene::new(SceneConfig::default()).unwrap();
        scene.advance(1.0);
        let first = scene.flags()[0].grid().positions();
        let second = scene.flags()[1].grid().positions();
        assert_ne!(first, second);
    }

    #[test]
    fn set_wind_changes_next_advance() {
        let mut scene = FlagScene::new(SceneConfig::default()).unwrap();
        scene.advance(1.0);
        let before: Vec<_> = scene.flags()[0].grid().positions().to_vec();

        scene.set_wind(WindParams {
            gust_amplitude: 0.3,
            ..WindParams::default()
        });
        scene.advance(1.0);
        assert_ne!(scene.flags()[0].grid().positions(), &before[..]);
    }

    #[test]
    fn camera_pose_uses_default_framing() {
        let scene = FlagScene::new(SceneConfig::default()).unwrap();
        let cam = scene.camera();
        assert_eq!(cam.fov_degrees, 40.0);
        assert!((cam.eye - Vec3::new(0.0, 0.3, 4.2)).length() < 1e-6);
    }
}
