//! Fallback values used when a document omits a property or carries an
//! unusable one.

use serde::Deserialize;

use storey_core::color::HexColor;

/// Reader fallbacks for element dimensions and colors.
///
/// Loaded from the `[defaults]` section of the application config; every
/// field is optional there.
///
/// # Examples
///
/// ```
/// # use storey_reader::ReaderConfig;
/// let config = ReaderConfig::default();
/// assert_eq!(config.wall_height(), 300.0);
/// assert_eq!(config.hole_width(), 90.0);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    wall_height: f64,
    wall_thickness: f64,
    hole_width: f64,
    hole_height: f64,
    hole_altitude: f64,
    item_width: f64,
    item_depth: f64,
    item_height: f64,
    item_altitude: f64,
    floor_color: HexColor,
    item_color: HexColor,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            wall_height: 300.0,
            wall_thickness: 20.0,
            hole_width: 90.0,
            hole_height: 210.0,
            hole_altitude: 0.0,
            item_width: 80.0,
            item_depth: 80.0,
            item_height: 80.0,
            item_altitude: 0.0,
            floor_color: HexColor::new(0xdcdcdc),
            item_color: HexColor::new(0xcfcfcf),
        }
    }
}

impl ReaderConfig {
    pub fn with_wall_height(mut self, wall_height: f64) -> Self {
        self.wall_height = wall_height;
        self
    }

    pub fn with_wall_thickness(mut self, wall_thickness: f64) -> Self {
        self.wall_thickness = wall_thickness;
        self
    }

    pub fn wall_height(&self) -> f64 {
        self.wall_height
    }

    pub fn wall_thickness(&self) -> f64 {
        self.wall_thickness
    }

    pub fn hole_width(&self) -> f64 {
        self.hole_width
    }

    pub fn hole_height(&self) -> f64 {
        self.hole_height
    }

    pub fn hole_altitude(&self) -> f64 {
        self.hole_altitude
    }

    pub fn item_width(&self) -> f64 {
        self.item_width
    }

    /// Only used when an item has none of `depth`, `width` or `length`.
    pub fn item_depth(&self) -> f64 {
        self.item_depth
    }

    pub fn item_height(&self) -> f64 {
        self.item_height
    }

    pub fn item_altitude(&self) -> f64 {
        self.item_altitude
    }

    pub fn floor_color(&self) -> HexColor {
        self.floor_color
    }

    pub fn item_color(&self) -> HexColor {
        self.item_color
    }
}
