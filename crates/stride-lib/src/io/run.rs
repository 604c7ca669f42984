//! Frame Source: `.run` recordings, a header line followed by 12 comma-separated
//! angle columns per row (radians).

use anyhow::{Context, Result};
use csv::WriterBuilder;
use log::warn;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::GaitError;
use crate::signal::{Frame, Series, CHANNELS, CHANNEL_NAMES};

/// Parsed recording plus the rows that had to be skipped.
#[derive(Debug, Clone, Default)]
pub struct RunFile {
    pub frames: Vec<Frame>,
    pub malformed: Vec<GaitError>,
}

/// Parse a recording from any reader. Only I/O failures are fatal.
pub fn parse_run<R: Read>(mut reader: R) -> Result<RunFile> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .context("reading run data")?;
    parse_run_str(&text)
}

/// Parse recording text. The first non-blank line is the header; blank lines
/// are skipped and bad rows are collected as [`GaitError::MalformedFrame`]
/// carrying their 1-based line number in `text`.
pub fn parse_run_str(text: &str) -> Result<RunFile> {
    let mut run = RunFile::default();
    let rows = text
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx as u64 + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .skip(1);
    for (line, row) in rows {
        let fields: Vec<&str> = row.split(',').map(str::trim).collect();
        match parse_frame(&fields) {
            Ok(frame) => run.frames.push(frame),
            Err(reason) => skip_row(&mut run, line, reason),
        }
    }
    Ok(run)
}

pub fn read_run_file(path: &Path) -> Result<RunFile> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_run_str(&text)
}

/// Write a series back out in the same column layout; missing channels are empty fields.
pub fn write_run<W: Write>(writer: W, series: &Series) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    writer.write_record(CHANNEL_NAMES)?;
    for frame in &series.frames {
        writer.write_record(
            frame
                .channels
                .iter()
                .map(|v| v.map(|x| x.to_string()).unwrap_or_default()),
        )?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_run_file(path: &Path, series: &Series) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_run(file, series).with_context(|| format!("writing {}", path.display()))
}

fn skip_row(run: &mut RunFile, line: u64, reason: String) {
    let err = GaitError::MalformedFrame { line, reason };
    warn!("{err}");
    run.malformed.push(err);
}

fn parse_frame(fields: &[&str]) -> std::result::Result<Frame, String> {
    if fields.len() != CHANNELS {
        return Err(format!(
            "expected {} fields, found {}",
            CHANNELS,
            fields.len()
        ));
    }
    let mut channels = [None; CHANNELS];
    for (col, field) in fields.iter().enumerate() {
        if field.is_empty() {
            continue;
        }
        let value: f64 = field
            .parse()
            .map_err(|_| format!("{} is not a number: {}", CHANNEL_NAMES[col], field))?;
        if !value.is_finite() {
            return Err(format!("{} is not finite: {}", CHANNEL_NAMES[col], field));
        }
        channels[col] = Some(value);
    }
    Ok(Frame { channels })
}
