use serde::Deserialize;

/// Height-noise parameters. All fields have serde defaults so partial TOML
/// tables deserialize into a working configuration.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct NoiseParams {
    #[serde(default)]
    pub seed: i32,
    #[serde(default = "default_octaves")]
    pub octaves: u32,
    #[serde(default = "default_persistence")]
    pub persistence: f32,
    #[serde(default = "default_lacunarity")]
    pub lacunarity: f32,
    #[serde(default = "default_min_height")]
    pub min_height: f32,
    #[serde(default = "default_max_height")]
    pub max_height: f32,
    /// Divisor applied to sample coordinates to smooth the terrain.
    #[serde(default = "default_divisor")]
    pub divisor: f32,
}

fn default_octaves() -> u32 {
    5
}
fn default_persistence() -> f32 {
    0.5
}
fn default_lacunarity() -> f32 {
    2.0
}
fn default_min_height() -> f32 {
    0.0
}
fn default_max_height() -> f32 {
    10.0
}
fn default_divisor() -> f32 {
    25.0
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            seed: 0,
            octaves: default_octaves(),
            persistence: default_persistence(),
            lacunarity: default_lacunarity(),
            min_height: default_min_height(),
            max_height: default_max_height(),
            divisor: default_divisor(),
        }
    }
}
