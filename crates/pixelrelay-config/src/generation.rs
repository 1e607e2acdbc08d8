use serde::Deserialize;

/// Fixed generation options applied to every upstream request
///
/// `variant` picks a preset; the remaining fields override single values of
/// that preset. None of these are ever taken from the caller.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    #[serde(default)]
    pub variant: GenerationVariant,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub steps: Option<u32>,
    /// Replaces the built-in negative prompt; an empty string disables it
    #[serde(default)]
    pub negative_prompt: Option<String>,
    #[serde(default)]
    pub n: Option<u32>,
}

/// Generation presets offered by the upstream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationVariant {
    /// Free-tier model, 4 diffusion steps
    #[default]
    Free,
    /// Paid-tier model, 8 diffusion steps
    Standard,
}
