//! Build-time configuration, embedded from `assets/settings.ron`.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::camera::{CameraError, CameraState};
use crate::color::rgb_to_color;
use crate::input::Motion;
use crate::renderer::RenderView;
use crate::world::WorldMap;

const EMBEDDED: &str = include_str!("../assets/settings.ron");

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to parse settings: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("panel must be at least 1x1, got {width}x{height}")]
    EmptyPanel { width: usize, height: usize },

    #[error("{columns} ray columns do not evenly divide a {width} pixel wide panel")]
    Columns { columns: usize, width: usize },

    #[error("pixel scale must be non-zero")]
    PixelScale,

    #[error(transparent)]
    Camera(#[from] CameraError),

    #[error("start position ({x}, {y}) is not in an open cell")]
    StartBlocked { x: f32, y: f32 },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Panel {
    pub width: usize,
    pub height: usize,
    pub columns: usize,
    /// Window pixels per LED in the desktop preview.
    pub pixel_scale: u32,
    pub led_gap: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Timing {
    pub frame_delay_ms: u64,
    pub refresh_interval_ms: u64,
}

impl Timing {
    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(self.frame_delay_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms.max(1))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartPose {
    pub position: (f32, f32),
    pub direction: (f32, f32),
    pub plane: (f32, f32),
}

#[derive(Debug, Clone, Deserialize)]
pub struct MotionSettings {
    pub move_speed: f32,
    pub rot_speed: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub panel: Panel,
    pub motion: MotionSettings,
    pub timing: Timing,
    pub camera: StartPose,
    pub marker_rgb: (u8, u8, u8),
}

impl Settings {
    pub fn embedded() -> Result<Self, SettingsError> {
        Self::from_ron(EMBEDDED)
    }

    pub fn from_ron(source: &str) -> Result<Self, SettingsError> {
        let settings: Settings = ron::from_str(source)?;
        settings.check_panel()?;
        Ok(settings)
    }

    fn check_panel(&self) -> Result<(), SettingsError> {
        let Panel {
            width,
            height,
            columns,
            pixel_scale,
            ..
        } = self.panel;
        if width == 0 || height == 0 {
            return Err(SettingsError::EmptyPanel { width, height });
        }
        if columns == 0 || columns > width || width % columns != 0 {
            return Err(SettingsError::Columns { columns, width });
        }
        if pixel_scale == 0 {
            return Err(SettingsError::PixelScale);
        }
        Ok(())
    }

    /// Starting camera, checked against the map it will move in.
    pub fn start_camera(&self, world: &WorldMap) -> Result<CameraState, SettingsError> {
        let StartPose {
            position,
            direction,
            plane,
        } = self.camera;
        let camera = CameraState::new(
            [position.0, position.1],
            [direction.0, direction.1],
            [plane.0, plane.1],
        )?;

        let (x, y) = camera.cell();
        let inside = x > 0 && y > 0 && (x as usize) < world.width() && (y as usize) < world.height();
        if !inside || !world.is_open(x, y) {
            return Err(SettingsError::StartBlocked {
                x: position.0,
                y: position.1,
            });
        }
        Ok(camera)
    }

    pub fn motion(&self) -> Motion {
        Motion {
            move_speed: self.motion.move_speed,
            rot_speed: self.motion.rot_speed,
        }
    }

    pub fn view(&self) -> RenderView {
        let (r, g, b) = self.marker_rgb;
        RenderView {
            width: self.panel.width,
            height: self.panel.height,
            columns: self.panel.columns,
            marker: rgb_to_color(r, g, b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_settings_load() {
        let settings = Settings::embedded().unwrap();
        assert_eq!((settings.panel.width, settings.panel.height), (32, 16));
        assert_eq!(settings.timing.frame_delay(), Duration::from_millis(100));
        let camera = settings.start_camera(&WorldMap::classic().unwrap()).unwrap();
        assert_eq!(camera.pos, [22.0, 12.0]);
        assert_eq!(camera.plane, [0.0, 0.66]);
        assert_eq!(settings.view().marker, rgb_to_color(0, 255, 0));
    }

    #[test]
    fn rejects_uneven_columns() {
        let source = EMBEDDED.replace("columns: 32", "columns: 12");
        assert!(matches!(
            Settings::from_ron(&source),
            Err(SettingsError::Columns {
                columns: 12,
                width: 32
            })
        ));
    }

    #[test]
    fn rejects_start_inside_a_wall() {
        let source = EMBEDDED.replace("position: (22.0, 12.0)", "position: (4.5, 6.5)");
        let settings = Settings::from_ron(&source).unwrap();
        assert!(matches!(
            settings.start_camera(&WorldMap::classic().unwrap()),
            Err(SettingsError::StartBlocked { .. })
        ));
    }

    #[test]
    fn rejects_zero_direction() {
        let source = EMBEDDED.replace("direction: (-1.0, 0.0)", "direction: (0.0, 0.0)");
        let settings = Settings::from_ron(&source).unwrap();
        assert!(matches!(
            settings.start_camera(&WorldMap::classic().unwrap()),
            Err(SettingsError::Camera(_))
        ));
    }

    #[test]
    fn reports_parse_errors() {
        assert!(matches!(
            Settings::from_ron("(panel: ()"),
            Err(SettingsError::Parse(_))
        ));
    }
}
