//! Scene configuration
//!
//! Produced by the overlay controls and read by the frame loop. An initial
//! value can be embedded in the page as JSON.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Error, Result};

/// User-facing scene settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SceneConfig {
    /// Tree rotation in radians per second
    pub spin_speed: f32,
    /// Bloom strength (0.0 - 4.0)
    pub bloom_intensity: f32,
    /// Storm mode: denser gold dust
    pub is_snowing: bool,
    /// Colour of the pointer-following spotlight
    pub light_color: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            spin_speed: DEFAULT_SPIN_SPEED,
            bloom_intensity: DEFAULT_BLOOM_INTENSITY,
            is_snowing: false,
            light_color: "#ffffff".to_string(),
        }
    }
}

impl SceneConfig {
    /// Parse a (possibly partial) JSON config; missing keys take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    /// Clamp values into the ranges the overlay allows and drop an
    /// unparseable light colour
    pub fn normalized(mut self) -> Self {
        if !self.spin_speed.is_finite() || self.spin_speed < 0.0 {
            self.spin_speed = 0.0;
        }
        self.set_bloom_intensity(self.bloom_intensity);
        if let Err(e) = parse_hex_color(&self.light_color) {
            log::warn!("{}; using #ffffff", e);
            self.light_color = "#ffffff".to_string();
        }
        self
    }

    pub fn is_spinning(&self) -> bool {
        self.spin_speed > 0.0
    }

    /// Spin on/off; turning on restores the default speed
    pub fn toggle_spin(&mut self) {
        self.spin_speed = if self.spin_speed == 0.0 {
            DEFAULT_SPIN_SPEED
        } else {
            0.0
        };
    }

    pub fn toggle_snow(&mut self) {
        self.is_snowing = !self.is_snowing;
    }

    pub fn set_bloom_intensity(&mut self, value: f32) {
        self.bloom_intensity = if value.is_finite() {
            value.clamp(0.0, MAX_BLOOM_INTENSITY)
        } else {
            DEFAULT_BLOOM_INTENSITY
        };
    }

    /// Gold dust particle count for the current mode
    pub fn dust_count(&self) -> usize {
        if self.is_snowing {
            DUST_COUNT_STORM
        } else {
            DUST_COUNT_CALM
        }
    }

    /// Spotlight colour as sRGB components in 0..1
    pub fn light_rgb(&self) -> Result<[f32; 3]> {
        parse_hex_color(&self.light_color)
    }

    /// Element holding the embedded JSON config
    pub const CONFIG_ELEMENT_ID: &'static str = "scene-config";

    /// Read the embedded config from the page, falling back to defaults (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let json = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(Self::CONFIG_ELEMENT_ID))
            .and_then(|el| el.text_content());

        if let Some(json) = json {
            match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded scene config from page");
                    return config;
                }
                Err(e) => log::warn!("Ignoring embedded scene config: {}", e),
            }
        }

        log::info!("Using default scene config");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

/// Parse `#rgb` or `#rrggbb` into sRGB components in 0..1
pub fn parse_hex_color(s: &str) -> Result<[f32; 3]> {
    let invalid = || Error::InvalidColor(s.to_string());
    let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());
    let [r, g, b] = match hex.len() {
        3 => {
            let mut out = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = channel(&c.to_string())?;
                out[i] = v * 17;
            }
            out
        }
        6 => [
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        ],
        _ => return Err(invalid()),
    };

    Ok([r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SceneConfig::default();
        assert_eq!(config.spin_speed, 0.3);
        assert_eq!(config.bloom_intensity, 1.5);
        assert!(!config.is_snowing);
        assert_eq!(config.light_rgb().unwrap(), [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_toggle_spin() {
        let mut config = SceneConfig::default();
        config.toggle_spin();
        assert_eq!(config.spin_speed, 0.0);
        assert!(!config.is_spinning());
        config.toggle_spin();
        assert_eq!(config.spin_speed, DEFAULT_SPIN_SPEED);
    }

    #[test]
    fn test_dust_count_follows_storm() {
        let mut config = SceneConfig::default();
        assert_eq!(config.dust_count(), 100);
        config.toggle_snow();
        assert_eq!(config.dust_count(), 500);
    }

    #[test]
    fn test_bloom_clamped() {
        let mut config = SceneConfig::default();
        config.set_bloom_intensity(9.0);
        assert_eq!(config.bloom_intensity, 4.0);
        config.set_bloom_intensity(-1.0);
        assert_eq!(config.bloom_intensity, 0.0);
        config.set_bloom_intensity(f32::NAN);
        assert_eq!(config.bloom_intensity, DEFAULT_BLOOM_INTENSITY);
    }

    #[test]
    fn test_partial_json() {
        let config = SceneConfig::from_json(r#"{"isSnowing": true, "bloomIntensity": 7}"#).unwrap();
        assert!(config.is_snowing);
        assert_eq!(config.bloom_intensity, 4.0);
        assert_eq!(config.spin_speed, DEFAULT_SPIN_SPEED);
        assert_eq!(config.light_color, "#ffffff");
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            SceneConfig::from_json("{not json"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_negative_spin_normalized() {
        let config = SceneConfig::from_json(r#"{"spinSpeed": -2.0}"#).unwrap();
        assert_eq!(config.spin_speed, 0.0);
    }

    #[test]
    fn test_bad_light_color_reset() {
        let config = SceneConfig::from_json(r##"{"lightColor": "red"}"##).unwrap();
        assert_eq!(config.light_color, "#ffffff");

        let config = SceneConfig::from_json(r##"{"lightColor": "#f0c"}"##).unwrap();
        assert_eq!(config.light_color, "#f0c");
        assert_eq!(config.light_rgb().unwrap(), [1.0, 0.0, 0.8]);
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#fff").unwrap(), [1.0, 1.0, 1.0]);
        assert_eq!(parse_hex_color("#000000").unwrap(), [0.0, 0.0, 0.0]);
        let gold = parse_hex_color("#FFD700").unwrap();
        assert_eq!(gold[0], 1.0);
        assert!((gold[1] - 215.0 / 255.0).abs() < 1e-6);
        assert_eq!(gold[2], 0.0);
    }

    #[test]
    fn test_parse_hex_color_rejects_garbage() {
        for bad in ["ffffff", "#ffff", "#gggggg", "", "#", "#ffé"] {
            assert!(
                matches!(parse_hex_color(bad), Err(Error::InvalidColor(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}
