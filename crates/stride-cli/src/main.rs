use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use plotters::prelude::*;
use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};
use stride_lib::{
    io::run::{parse_run, read_run_file, write_run, write_run_file, RunFile},
    pipeline::{Analysis, GaitPipeline},
    plot::{Figure, PlotBackend, Series},
    PipelineConfig,
};

#[derive(Parser)]
#[command(
    name = "stride",
    version,
    about = "Stride: running cadence and median-stride analysis for joint-angle recordings"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Input selection and pipeline overrides shared by every subcommand.
#[derive(Args)]
struct RunArgs {
    /// Recording to read; stdin when omitted
    #[arg(long)]
    input: Option<PathBuf>,
    /// TOML pipeline configuration
    #[arg(long)]
    config: Option<PathBuf>,
    /// Capture rate of the recording (Hz)
    #[arg(long)]
    source_fs: Option<f64>,
    /// Analysis rate after resampling (Hz)
    #[arg(long)]
    fs: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resample and smooth a recording, writing it back in the same format
    Filter {
        #[command(flatten)]
        run: RunArgs,
        /// Output path; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the cadence series (time, strides/min) as JSON
    Cadence {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Print the canonical median stride as JSON
    Stride {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Print a full analysis summary as JSON
    Analyze {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Print per-frame limb geometry as JSON lines
    Frames {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Render the cadence series to a PNG via plotters
    PlotCadence {
        #[command(flatten)]
        run: RunArgs,
        #[arg(long)]
        out: PathBuf,
    },
    /// Render the median stride to a PNG via plotters
    PlotStride {
        #[command(flatten)]
        run: RunArgs,
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Filter { run, out } => cmd_filter(&run, out.as_deref())?,
        Commands::Cadence { run } => cmd_cadence(&run)?,
        Commands::Stride { run } => cmd_stride(&run)?,
        Commands::Analyze { run } => cmd_analyze(&run)?,
        Commands::Frames { run } => cmd_frames(&run)?,
        Commands::PlotCadence { run, out } => {
            let analysis = analyze(&run)?;
            PngBackend::new(&out).draw(&analysis.cadence_figure())?;
        }
        Commands::PlotStride { run, out } => {
            let analysis = analyze(&run)?;
            PngBackend::new(&out).draw(&analysis.stride_figure()?)?;
        }
    }
    Ok(())
}

fn load_config(run: &RunArgs) -> Result<PipelineConfig> {
    let mut cfg = match &run.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(source_fs) = run.source_fs {
        cfg.source_fs = source_fs;
    }
    if let Some(fs) = run.fs {
        cfg.sample_fs = fs;
    }
    Ok(cfg)
}

fn read_recording(input: Option<&Path>) -> Result<RunFile> {
    match input {
        Some(path) => read_run_file(path),
        None => parse_run(io::stdin().lock()),
    }
}

fn pipeline(run: &RunArgs) -> Result<GaitPipeline> {
    Ok(GaitPipeline::new(load_config(run)?)?)
}

fn analyze(run: &RunArgs) -> Result<Analysis> {
    let pipeline = pipeline(run)?;
    match run.input.as_deref() {
        Some(path) => pipeline.run_file(path),
        None => Ok(pipeline.run(parse_run(io::stdin().lock())?)),
    }
}

fn cmd_filter(run: &RunArgs, out: Option<&Path>) -> Result<()> {
    let pipeline = pipeline(run)?;
    let recording = read_recording(run.input.as_deref())?;
    let filtered = pipeline.filter(&recording.frames);
    info!(
        "filtered {} frames into {} ({} malformed rows, {} missing channels)",
        recording.frames.len(),
        filtered.series.len(),
        recording.malformed.len(),
        filtered.missing.len()
    );
    match out {
        Some(path) => write_run_file(path, &filtered.series)?,
        None => write_run(io::stdout().lock(), &filtered.series)?,
    }
    Ok(())
}

fn cmd_cadence(run: &RunArgs) -> Result<()> {
    let analysis = analyze(run)?;
    let js = serde_json::to_string(&analysis.detection)?;
    println!("{}", js);
    Ok(())
}

fn cmd_stride(run: &RunArgs) -> Result<()> {
    let analysis = analyze(run)?;
    let stride = analysis.canonical_stride()?;
    println!("{}", serde_json::to_string(&stride)?);
    Ok(())
}

fn cmd_analyze(run: &RunArgs) -> Result<()> {
    let analysis = analyze(run)?;
    println!("{}", serde_json::to_string(&analysis.summary())?);
    Ok(())
}

fn cmd_frames(run: &RunArgs) -> Result<()> {
    let analysis = analyze(run)?;
    let mut stdout = io::stdout().lock();
    for frame in analysis.render_frames() {
        writeln!(stdout, "{}", serde_json::to_string(&frame)?)?;
    }
    Ok(())
}

/// Draws a [`Figure`] into a PNG file.
struct PngBackend<'a> {
    path: &'a Path,
    size: (u32, u32),
}

impl<'a> PngBackend<'a> {
    fn new(path: &'a Path) -> Self {
        Self {
            path,
            size: (800, 480),
        }
    }
}

impl PlotBackend for PngBackend<'_> {
    fn draw(&mut self, fig: &Figure) -> Result<()> {
        let (x_min, x_max, y_min, y_max) = fig
            .bounds()
            .ok_or_else(|| anyhow!("nothing to plot: figure has no points"))?;
        let (x_max, y_max) = (widen(x_min, x_max), widen(y_min, y_max));
        let root = BitMapBackend::new(self.path, self.size).into_drawing_area();
        root.fill(&WHITE)?;
        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption(
                fig.title.clone().unwrap_or_else(|| "Plot".into()),
                ("sans-serif", 24),
            )
            .x_label_area_size(30)
            .y_label_area_size(40)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)?;
        chart
            .configure_mesh()
            .x_desc(fig.x.label.clone().unwrap_or_default())
            .y_desc(fig.y.label.clone().unwrap_or_default())
            .draw()?;
        for series in &fig.series {
            match series {
                Series::Line(line) => {
                    let (r, g, b) = line.style.color.rgb();
                    let color = RGBColor(r, g, b);
                    let points: Vec<(f64, f64)> = line.points.iter().map(|p| (p[0], p[1])).collect();
                    chart
                        .draw_series(LineSeries::new(points.iter().copied(), &color))?
                        .label(line.name.clone())
                        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
                    if line.style.markers {
                        chart.draw_series(
                            points
                                .iter()
                                .map(|&(x, y)| Circle::new((x, y), 3, color.filled())),
                        )?;
                    }
                }
            }
        }
        if fig.series.len() > 1 {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }
        root.present()?;
        Ok(())
    }
}

/// Plot ranges must not be empty.
fn widen(min: f64, max: f64) -> f64 {
    if max > min {
        max
    } else {
        min + 1.0
    }
}
