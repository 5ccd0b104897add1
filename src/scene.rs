use anyhow::{anyhow, Context, Result};
use glam::{Mat4, Vec2, Vec3};
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

/// Tunable parameters for the demo scene.
///
/// Every field carries the default the demo ships with; a scene XML file can
/// override any subset of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default = "default_grid_size")]
    pub grid_size: f32,
    #[serde(default = "default_grid_divisions")]
    pub grid_divisions: u32,
    #[serde(default = "default_rotation_step")]
    pub rotation_step: f32,
    #[serde(default = "default_fov")]
    pub fov: f32,
    #[serde(default = "default_camera_distance")]
    pub camera_distance: f32,
    #[serde(default = "default_texture")]
    pub texture: String,
    #[serde(default = "default_ambient_intensity")]
    pub ambient_intensity: f32,
    #[serde(default = "default_directional_intensity")]
    pub directional_intensity: f32,
    #[serde(default = "default_directional_position")]
    pub directional_position: Vec3,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            grid_size: default_grid_size(),
            grid_divisions: default_grid_divisions(),
            rotation_step: default_rotation_step(),
            fov: default_fov(),
            camera_distance: default_camera_distance(),
            texture: default_texture(),
            ambient_intensity: default_ambient_intensity(),
            directional_intensity: default_directional_intensity(),
            directional_position: default_directional_position(),
        }
    }
}

fn default_grid_size() -> f32 {
    12.0
}

fn default_grid_divisions() -> u32 {
    10
}

fn default_rotation_step() -> f32 {
    0.01
}

fn default_fov() -> f32 {
    45.0
}

fn default_camera_distance() -> f32 {
    6.0
}

fn default_texture() -> String {
    "images/image-300.png".to_string()
}

fn default_ambient_intensity() -> f32 {
    0.3
}

fn default_directional_intensity() -> f32 {
    1.0
}

fn default_directional_position() -> Vec3 {
    Vec3::new(0.0, 1.0, 0.0)
}

impl SceneConfig {
    /// Parses a scene override file.
    ///
    /// All tags are optional; missing values keep their defaults.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid scene XML")?;
        let root = document.root_element();
        if !root.has_tag_name("scene") {
            return Err(anyhow!("expected <scene> root element"));
        }

        let mut config = Self::default();
        if let Some(grid) = child(&root, "grid") {
            config.grid_size = parse_f32(optional_text(&grid, "size"), config.grid_size)?;
            config.grid_divisions =
                parse_u32(optional_text(&grid, "divisions"), config.grid_divisions)?;
        }
        if let Some(cube) = child(&root, "cube") {
            if let Some(texture) = optional_text(&cube, "texture") {
                config.texture = texture;
            }
            config.rotation_step =
                parse_f32(optional_text(&cube, "rotation-step"), config.rotation_step)?;
        }
        if let Some(camera) = child(&root, "camera") {
            config.fov = parse_f32(optional_text(&camera, "fov"), config.fov)?;
            config.camera_distance =
                parse_f32(optional_text(&camera, "distance"), config.camera_distance)?;
        }
        if let Some(lights) = child(&root, "lights") {
            config.ambient_intensity =
                parse_f32(optional_text(&lights, "ambient"), config.ambient_intensity)?;
            config.directional_intensity = parse_f32(
                optional_text(&lights, "directional"),
                config.directional_intensity,
            )?;
            config.directional_position = parse_vec3(
                optional_text(&lights, "direction"),
                config.directional_position,
            )?;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.grid_size <= 0.0 {
            return Err(anyhow!("grid size must be positive"));
        }
        if self.grid_divisions == 0 {
            return Err(anyhow!("grid needs at least one division"));
        }
        if self.camera_distance <= 0.0 {
            return Err(anyhow!("camera distance must be positive"));
        }
        Ok(())
    }
}

/// The spinning textured cube. Rotation grows without bound; only its value
/// modulo a full turn affects appearance.
#[derive(Debug, Clone, PartialEq)]
pub struct Cube {
    pub rotation: Vec2,
    pub texture: String,
}

/// One wall of the grid room.
#[derive(Debug, Clone, PartialEq)]
pub struct GridPanel {
    pub name: &'static str,
    pub position: Vec3,
    /// Euler rotation in radians, applied Z * Y * X.
    pub rotation: Vec3,
}

impl GridPanel {
    /// Six panels centered on the faces of a `size`-unit cube. The grid
    /// geometry lies in the XZ plane, so the four walls are tilted up by a
    /// quarter turn.
    pub fn room(size: f32) -> Vec<GridPanel> {
        use std::f32::consts::FRAC_PI_2;
        let half = size / 2.0;
        vec![
            GridPanel {
                name: "back",
                position: Vec3::new(0.0, 0.0, -half),
                rotation: Vec3::new(FRAC_PI_2, 0.0, 0.0),
            },
            GridPanel {
                name: "front",
                position: Vec3::new(0.0, 0.0, half),
                rotation: Vec3::new(FRAC_PI_2, 0.0, 0.0),
            },
            GridPanel {
                name: "top",
                position: Vec3::new(0.0, half, 0.0),
                rotation: Vec3::ZERO,
            },
            GridPanel {
                name: "bottom",
                position: Vec3::new(0.0, -half, 0.0),
                rotation: Vec3::ZERO,
            },
            GridPanel {
                name: "left",
                position: Vec3::new(-half, 0.0, 0.0),
                rotation: Vec3::new(0.0, 0.0, FRAC_PI_2),
            },
            GridPanel {
                name: "right",
                position: Vec3::new(half, 0.0, 0.0),
                rotation: Vec3::new(0.0, 0.0, FRAC_PI_2),
            },
        ]
    }

    pub fn model_matrix(&self) -> Mat4 {
        let rotation = Mat4::from_rotation_z(self.rotation.z)
            * Mat4::from_rotation_y(self.rotation.y)
            * Mat4::from_rotation_x(self.rotation.x);
        Mat4::from_translation(self.position) * rotation
    }
}

/// Light sources in the room.
#[derive(Debug, Clone, PartialEq)]
pub enum Light {
    /// Soft fill with no directional component.
    Ambient { color: Vec3, intensity: f32 },
    /// Sun-style light; only the direction of `position` matters.
    Directional {
        position: Vec3,
        color: Vec3,
        intensity: f32,
    },
}

/// The full demo scene: one cube, six grid panels, two lights.
///
/// Built exactly once per session; the only mutable state afterwards is the
/// cube rotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub config: SceneConfig,
    pub cube: Cube,
    pub grids: Vec<GridPanel>,
    pub lights: Vec<Light>,
}

impl Scene {
    pub fn new(config: SceneConfig) -> Self {
        let cube = Cube {
            rotation: Vec2::ZERO,
            texture: config.texture.clone(),
        };
        let grids = GridPanel::room(config.grid_size);
        let lights = vec![
            Light::Ambient {
                color: Vec3::ONE,
                intensity: config.ambient_intensity,
            },
            Light::Directional {
                position: config.directional_position,
                color: Vec3::ONE,
                intensity: config.directional_intensity,
            },
        ];
        Self {
            config,
            cube,
            grids,
            lights,
        }
    }

    /// Advances the cube by one frame's worth of rotation on both axes.
    pub fn advance_frame(&mut self) {
        let step = self.config.rotation_step;
        self.cube.rotation.x += step;
        self.cube.rotation.y += step;
    }

    pub fn ambient(&self) -> (Vec3, f32) {
        self.lights
            .iter()
            .find_map(|light| match light {
                Light::Ambient { color, intensity } => Some((*color, *intensity)),
                _ => None,
            })
            .unwrap_or((Vec3::ONE, default_ambient_intensity()))
    }

    pub fn directional(&self) -> (Vec3, Vec3, f32) {
        self.lights
            .iter()
            .find_map(|light| match light {
                Light::Directional {
                    position,
                    color,
                    intensity,
                } => Some((*position, *color, *intensity)),
                _ => None,
            })
            .unwrap_or((
                default_directional_position(),
                Vec3::ONE,
                default_directional_intensity(),
            ))
    }

    pub fn summary(&self) -> String {
        format!(
            "Scene ready: 1 cube, {} grid panels, {} lights",
            self.grids.len(),
            self.lights.len()
        )
    }
}

fn child<'a, 'input>(node: &Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|c| c.has_tag_name(tag))
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    node.children()
        .find(|c| c.has_tag_name(tag))
        .and_then(|c| c.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_f32(value: Option<String>, default: f32) -> Result<f32> {
    match value {
        Some(value) => value
            .parse::<f32>()
            .map_err(|err| anyhow!("failed to parse float: {err}")),
        None => Ok(default),
    }
}

fn parse_u32(value: Option<String>, default: u32) -> Result<u32> {
    match value {
        Some(value) => value
            .parse::<u32>()
            .map_err(|err| anyhow!("failed to parse integer: {err}")),
        None => Ok(default),
    }
}

fn parse_vec3(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    let mut numbers = value
        .split_whitespace()
        .filter_map(|component| component.parse::<f32>().ok());
    let x = numbers
        .next()
        .ok_or_else(|| anyhow!("vector is missing components"))?;
    let y = numbers
        .next()
        .ok_or_else(|| anyhow!("vector is missing components"))?;
    let z = numbers
        .next()
        .ok_or_else(|| anyhow!("vector is missing components"))?;
    Ok(Vec3::new(x, y, z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_scene_has_fixed_object_counts() {
        let scene = Scene::new(SceneConfig::default());
        assert_eq!(scene.grids.len(), 6);
        assert_eq!(scene.lights.len(), 2);
        assert_eq!(scene.cube.rotation, Vec2::ZERO);
    }

    #[test]
    fn room_panels_sit_on_each_face() {
        let panels = GridPanel::room(12.0);
        let positions: Vec<Vec3> = panels.iter().map(|p| p.position).collect();
        assert!(positions.contains(&Vec3::new(0.0, 0.0, -6.0)));
        assert!(positions.contains(&Vec3::new(0.0, 6.0, 0.0)));
        assert!(positions.contains(&Vec3::new(6.0, 0.0, 0.0)));
        // walls are tilted, floor and ceiling are not
        let top = panels.iter().find(|p| p.name == "top").unwrap();
        assert_eq!(top.rotation, Vec3::ZERO);
        let back = panels.iter().find(|p| p.name == "back").unwrap();
        assert_relative_eq!(back.rotation.x, std::f32::consts::FRAC_PI_2);
    }

    #[test]
    fn advance_frame_increments_both_axes() {
        let mut scene = Scene::new(SceneConfig::default());
        for _ in 0..3 {
            scene.advance_frame();
        }
        assert_relative_eq!(scene.cube.rotation.x, 0.03, epsilon = 1e-6);
        assert_relative_eq!(scene.cube.rotation.y, 0.03, epsilon = 1e-6);
    }

    #[test]
    fn xml_overrides_selected_fields() {
        let xml = r#"
        <scene>
            <grid><size>20</size></grid>
            <cube><rotation-step>0.02</rotation-step></cube>
            <camera><fov>60</fov></camera>
            <lights><ambient>0.5</ambient><direction>1 2 3</direction></lights>
        </scene>
        "#;
        let config = SceneConfig::from_xml(xml).unwrap();
        assert_eq!(config.grid_size, 20.0);
        assert_eq!(config.grid_divisions, 10);
        assert_eq!(config.rotation_step, 0.02);
        assert_eq!(config.fov, 60.0);
        assert_eq!(config.ambient_intensity, 0.5);
        assert_eq!(config.directional_position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(config.texture, "images/image-300.png");
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(SceneConfig::from_xml("<scene><grid><size>0</size></grid></scene>").is_err());
        assert!(
            SceneConfig::from_xml("<scene><grid><divisions>0</divisions></grid></scene>").is_err()
        );
        assert!(SceneConfig::from_xml("<room/>").is_err());
        assert!(SceneConfig::from_xml("not xml").is_err());
    }

    #[test]
    fn panel_matrix_moves_the_grid_plane() {
        let panels = GridPanel::room(12.0);
        let back = panels.iter().find(|p| p.name == "back").unwrap();
        let moved = back.model_matrix().transform_point3(Vec3::ZERO);
        assert_relative_eq!(moved.z, -6.0);
    }
}
