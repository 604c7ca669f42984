use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::detectors::gait::GaitDetectorConfig;
use crate::error::GaitError;
use crate::render::RenderConfig;
use crate::smooth::DEFAULT_DEPTH;
use crate::stride::DEFAULT_STRIDE_POINTS;

/// Every tunable of a pipeline run. Missing TOML keys fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Capture rate of the raw recording (Hz).
    pub source_fs: f64,
    /// Analysis rate after resampling (Hz).
    pub sample_fs: f64,
    /// Trailing window depth of the smoother.
    pub smoothing_depth: usize,
    pub detector: GaitDetectorConfig,
    /// Output points of the canonical stride.
    pub stride_points: usize,
    pub render: RenderConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_fs: 15.0,
            sample_fs: 30.0,
            smoothing_depth: DEFAULT_DEPTH,
            detector: GaitDetectorConfig::default(),
            stride_points: DEFAULT_STRIDE_POINTS,
            render: RenderConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), GaitError> {
        let invalid = |msg: String| Err(GaitError::InvalidConfig(msg));
        if !(self.source_fs.is_finite() && self.source_fs > 0.0) {
            return invalid(format!("source_fs must be positive, got {}", self.source_fs));
        }
        if !(self.sample_fs.is_finite() && self.sample_fs > 0.0) {
            return invalid(format!("sample_fs must be positive, got {}", self.sample_fs));
        }
        if self.smoothing_depth == 0 {
            return invalid("smoothing_depth must be at least 1".into());
        }
        if self.stride_points < 2 {
            return invalid(format!(
                "stride_points must be at least 2, got {}",
                self.stride_points
            ));
        }
        if self.detector.axis > 2 {
            return invalid(format!("detector axis must be 0..=2, got {}", self.detector.axis));
        }
        if self.detector.policy.reset_after == Some(0) {
            return invalid("reset_after must be at least 1".into());
        }
        Ok(())
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let cfg: PipelineConfig = toml::from_str(text).context("parsing pipeline config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&contents).with_context(|| format!("loading {}", path.display()))
    }
}
