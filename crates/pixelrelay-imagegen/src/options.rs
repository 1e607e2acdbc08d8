use pixelrelay_config::{GenerationConfig, GenerationVariant};
use serde::Serialize;

/// Model served on the upstream's free tier
pub const FREE_MODEL: &str = "black-forest-labs/FLUX.1-schnell-Free";

/// Model served on the upstream's paid tier
pub const STANDARD_MODEL: &str = "black-forest-labs/FLUX.1-schnell";

pub const DEFAULT_WIDTH: u32 = 512;
pub const DEFAULT_HEIGHT: u32 = 512;
pub const FREE_STEPS: u32 = 4;
pub const STANDARD_STEPS: u32 = 8;
pub const IMAGE_COUNT: u32 = 1;

/// Steers outputs away from clean, polished, photorealistic renders
pub const NEGATIVE_PROMPT: &str = "photorealistic, photograph, photo, realistic, hyperrealistic, \
    ultra realistic, 3d render, octane render, unreal engine, cgi, clean, polished, glossy, smooth, \
    sleek, perfect, pristine, flawless, symmetrical, professional, studio lighting, soft lighting, \
    bokeh, depth of field, sharp focus, highly detailed, intricate details, 8k, 4k, uhd, hdr, \
    high resolution, masterpiece, best quality, award winning, trending on artstation, \
    digital painting, airbrushed, stock photo, corporate, minimalist, vector art, flat design, \
    gradient, lens flare, cinematic, beautiful, pretty, cute, smiling faces";

/// Fixed options merged with the caller's prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOptions {
    pub model: String,
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub negative_prompt: Option<String>,
    pub n: u32,
}

impl GenerationOptions {
    /// Preset for a variant, before any overrides
    pub fn preset(variant: GenerationVariant) -> Self {
        let (model, steps) = match variant {
            GenerationVariant::Free => (FREE_MODEL, FREE_STEPS),
            GenerationVariant::Standard => (STANDARD_MODEL, STANDARD_STEPS),
        };

        Self {
            model: model.to_string(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            steps,
            negative_prompt: Some(NEGATIVE_PROMPT.to_string()),
            n: IMAGE_COUNT,
        }
    }

    /// Preset selected by configuration with its overrides applied
    pub fn from_config(config: &GenerationConfig) -> Self {
        let preset = Self::preset(config.variant);

        Self {
            model: config.model.clone().unwrap_or(preset.model),
            width: config.width.unwrap_or(preset.width),
            height: config.height.unwrap_or(preset.height),
            steps: config.steps.unwrap_or(preset.steps),
            negative_prompt: match &config.negative_prompt {
                Some(text) if text.is_empty() => None,
                Some(text) => Some(text.clone()),
                None => preset.negative_prompt,
            },
            n: config.n.unwrap_or(preset.n),
        }
    }

    /// Merge a validated prompt into an upstream request body
    pub fn payload<'a>(&'a self, prompt: &'a str) -> UpstreamPayload<'a> {
        UpstreamPayload {
            model: &self.model,
            prompt,
            negative_prompt: self.negative_prompt.as_deref(),
            width: self.width,
            height: self.height,
            steps: self.steps,
            n: self.n,
        }
    }
}

/// Wire format for the upstream image generation request
#[derive(Debug, Serialize)]
pub struct UpstreamPayload<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<&'a str>,
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub n: u32,
}
