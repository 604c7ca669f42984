use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::PipelineConfig;
use crate::detectors::gait::{detect_gait_events, GaitDetection};
use crate::error::GaitError;
use crate::io::run::{parse_run_str, read_run_file, RunFile};
use crate::plot::{figure_from_cadence, figure_from_stride, Figure};
use crate::render::{render_frames, RenderFrame};
use crate::resample::Resampler;
use crate::signal::{Frame, Series};
use crate::smooth::DecaySmoother;
use crate::stride::{canonical_stride, median_nearest_rank, CanonicalStride};

/// Recoverable faults met while processing one recording.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingReport {
    /// Rows accepted from the Frame Source.
    pub raw_frames: usize,
    /// Rows skipped by the Frame Source.
    pub malformed: Vec<GaitError>,
    /// Channels that could not be interpolated.
    pub missing: Vec<GaitError>,
    /// Resampled frames excluded from detection and alignment.
    pub invalid_frames: usize,
}

/// Resampled and smoothed series with the recoverable faults hit on the way.
#[derive(Debug, Clone)]
pub struct Filtered {
    pub series: Series,
    pub missing: Vec<GaitError>,
}

/// Output of one pipeline run.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub config: PipelineConfig,
    /// Smoothed series at `config.sample_fs`.
    pub series: Series,
    pub detection: GaitDetection,
    pub report: ProcessingReport,
}

/// Serializable digest of an [`Analysis`], stride failures included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub fs: f64,
    pub sample_count: usize,
    pub duration_s: f64,
    pub crossings: usize,
    pub events: usize,
    pub median_cadence_spm: Option<f64>,
    pub cadence: Vec<[f64; 2]>,
    pub stride: Option<CanonicalStride>,
    pub stride_error: Option<GaitError>,
    pub report: ProcessingReport,
}

impl Analysis {
    /// Fails with `NoValidStride` when fewer than two events were found.
    pub fn canonical_stride(&self) -> Result<CanonicalStride, GaitError> {
        canonical_stride(
            &self.series,
            &self.detection.events,
            self.config.stride_points,
        )
    }

    pub fn median_cadence(&self) -> Option<f64> {
        let cadences: Vec<f64> = self
            .detection
            .events
            .iter()
            .map(|e| e.cadence_spm)
            .collect();
        median_nearest_rank(&cadences)
    }

    pub fn cadence_figure(&self) -> Figure {
        figure_from_cadence(&self.detection)
    }

    pub fn stride_figure(&self) -> Result<Figure, GaitError> {
        self.canonical_stride().map(|stride| figure_from_stride(&stride))
    }

    pub fn render_frames(&self) -> Vec<RenderFrame> {
        render_frames(
            &self.series,
            &self.detection,
            &self.config.render,
            self.config.detector.projection.leg_length,
        )
    }

    pub fn summary(&self) -> AnalysisSummary {
        let (stride, stride_error) = match self.canonical_stride() {
            Ok(stride) => (Some(stride), None),
            Err(err) => (None, Some(err)),
        };
        AnalysisSummary {
            fs: self.series.fs,
            sample_count: self.series.len(),
            duration_s: self.series.duration(),
            crossings: self.detection.crossings.len(),
            events: self.detection.events.len(),
            median_cadence_spm: self.median_cadence(),
            cadence: self.detection.cadence_series(),
            stride,
            stride_error,
            report: self.report.clone(),
        }
    }
}

/// Resampler → smoother → gait-event detector. Each call builds fresh
/// smoother and detector state, so one pipeline can serve many recordings.
#[derive(Debug, Clone)]
pub struct GaitPipeline {
    cfg: PipelineConfig,
}

impl GaitPipeline {
    pub fn new(cfg: PipelineConfig) -> Result<Self, GaitError> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.cfg
    }

    pub fn filter(&self, raw: &[Frame]) -> Filtered {
        let resampled = Resampler::new(self.cfg.source_fs, self.cfg.sample_fs).resample(raw);
        let series = DecaySmoother::new(self.cfg.smoothing_depth).smooth(&resampled.series);
        Filtered {
            series,
            missing: resampled.missing,
        }
    }

    pub fn run(&self, run: RunFile) -> Analysis {
        let Filtered { series, missing } = self.filter(&run.frames);
        let detection = detect_gait_events(&series, &self.cfg.detector);
        let report = ProcessingReport {
            raw_frames: run.frames.len(),
            malformed: run.malformed,
            missing,
            invalid_frames: series.len() - series.valid_count(),
        };
        info!(
            "processed {} raw frames into {} samples at {} Hz: {} gait events, {} malformed rows, {} missing channels",
            report.raw_frames,
            series.len(),
            series.fs,
            detection.events.len(),
            report.malformed.len(),
            report.missing.len()
        );
        Analysis {
            config: self.cfg,
            series,
            detection,
            report,
        }
    }

    pub fn run_str(&self, text: &str) -> Result<Analysis> {
        Ok(self.run(parse_run_str(text)?))
    }

    pub fn run_file(&self, path: &Path) -> Result<Analysis> {
        Ok(self.run(read_run_file(path)?))
    }
}
