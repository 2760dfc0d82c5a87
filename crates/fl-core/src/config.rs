//! Canvas configuration, loaded from JSON handed in by the host page.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Tunables of one canvas session. Every field has a default, so `{}` is a
/// valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanvasConfig {
    /// Grid cell edge in world units.
    pub grid_size: f64,
    /// Marker radius in screen pixels.
    pub point_radius: f64,
    /// Click/placement hit radius, in marker radii.
    pub click_radius_factor: f64,
    /// Hover hit radius, in marker radii.
    pub hover_radius_factor: f64,
    /// Half-width of the square used to detect co-located markers (world units).
    pub collision_tolerance: f64,
    /// Screen-space shift applied to a demand hidden under a facility.
    pub collision_shift_px: f64,
    /// Number of coin flips kept for display.
    pub coin_history_len: usize,
    pub request_timeout_ms: u32,
    pub service_url: String,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            grid_size: 50.0,
            point_radius: 8.0,
            click_radius_factor: 2.0,
            hover_radius_factor: 3.0,
            collision_tolerance: 25.0,
            collision_shift_px: 20.0,
            coin_history_len: 16,
            request_timeout_ms: 10_000,
            service_url: "http://localhost:8001".to_string(),
        }
    }
}

impl CanvasConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: CanvasConfig = serde_json::from_str(json)?;
        for (field, value) in [
            ("gridSize", config.grid_size),
            ("pointRadius", config.point_radius),
            ("clickRadiusFactor", config.click_radius_factor),
            ("hoverRadiusFactor", config.hover_radius_factor),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::OutOfRange { field, value });
            }
        }
        Ok(config)
    }

    /// World-space click tolerance at `zoom`.
    pub fn click_tolerance(&self, zoom: f64) -> f64 {
        self.point_radius * self.click_radius_factor / zoom
    }

    /// World-space hover tolerance at `zoom`.
    pub fn hover_tolerance(&self, zoom: f64) -> f64 {
        self.point_radius * self.hover_radius_factor / zoom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_is_default() {
        assert_eq!(CanvasConfig::from_json("{}").unwrap(), CanvasConfig::default());
    }

    #[test]
    fn overrides_are_camel_case() {
        let c = CanvasConfig::from_json(r#"{"gridSize": 25, "serviceUrl": "http://solver:9000"}"#)
            .unwrap();
        assert_eq!(c.grid_size, 25.0);
        assert_eq!(c.service_url, "http://solver:9000");
        assert_eq!(c.point_radius, 8.0);
    }

    #[test]
    fn zero_grid_is_rejected() {
        assert!(CanvasConfig::from_json(r#"{"gridSize": 0}"#).is_err());
    }

    #[test]
    fn tolerances_scale_with_zoom() {
        let c = CanvasConfig::default();
        assert_eq!(c.click_tolerance(1.0), 16.0);
        assert_eq!(c.hover_tolerance(2.0), 12.0);
    }
}
