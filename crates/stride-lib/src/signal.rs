use serde::{Deserialize, Serialize};

/// Scalar channels per sampled instant: four segments, three axes each.
pub const CHANNELS: usize = 12;

/// Column names in Frame Source order.
pub const CHANNEL_NAMES: [&str; CHANNELS] = [
    "l_shank_x",
    "l_shank_y",
    "l_shank_z",
    "l_thigh_x",
    "l_thigh_y",
    "l_thigh_z",
    "r_shank_x",
    "r_shank_y",
    "r_shank_z",
    "r_thigh_x",
    "r_thigh_y",
    "r_thigh_z",
];

/// Sagittal rotation axis, the channel used for joint angles.
pub const SAGITTAL_AXIS: usize = 1;
/// Swing-plane axis, the default channel for gait-event detection.
pub const SWING_AXIS: usize = 2;

pub type Vec3 = [f64; 3];

/// Limb segment carrying one 3-axis angle vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Segment {
    LeftShank,
    LeftThigh,
    RightShank,
    RightThigh,
}

impl Segment {
    /// Index of the segment's x channel within a frame.
    pub fn offset(self) -> usize {
        match self {
            Segment::LeftShank => 0,
            Segment::LeftThigh => 3,
            Segment::RightShank => 6,
            Segment::RightThigh => 9,
        }
    }

    pub fn channel(self, axis: usize) -> usize {
        self.offset() + axis.min(2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Leg {
    Left,
    Right,
}

impl Leg {
    pub const BOTH: [Leg; 2] = [Leg::Left, Leg::Right];

    pub fn thigh(self) -> Segment {
        match self {
            Leg::Left => Segment::LeftThigh,
            Leg::Right => Segment::RightThigh,
        }
    }

    pub fn shank(self) -> Segment {
        match self {
            Leg::Left => Segment::LeftShank,
            Leg::Right => Segment::RightShank,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Leg::Left => "Left",
            Leg::Right => "Right",
        }
    }
}

/// One complete instant of motion capture (radians).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub left_shank: Vec3,
    pub left_thigh: Vec3,
    pub right_shank: Vec3,
    pub right_thigh: Vec3,
}

impl Sample {
    pub fn segment(&self, segment: Segment) -> Vec3 {
        match segment {
            Segment::LeftShank => self.left_shank,
            Segment::LeftThigh => self.left_thigh,
            Segment::RightShank => self.right_shank,
            Segment::RightThigh => self.right_thigh,
        }
    }

    pub fn from_channels(values: [f64; CHANNELS]) -> Self {
        let vec = |offset: usize| [values[offset], values[offset + 1], values[offset + 2]];
        Self {
            left_shank: vec(Segment::LeftShank.offset()),
            left_thigh: vec(Segment::LeftThigh.offset()),
            right_shank: vec(Segment::RightShank.offset()),
            right_thigh: vec(Segment::RightThigh.offset()),
        }
    }

    pub fn channels(&self) -> [f64; CHANNELS] {
        let mut out = [0.0; CHANNELS];
        for segment in [
            Segment::LeftShank,
            Segment::LeftThigh,
            Segment::RightShank,
            Segment::RightThigh,
        ] {
            let offset = segment.offset();
            out[offset..offset + 3].copy_from_slice(&self.segment(segment));
        }
        out
    }

    /// Sagittal thigh-minus-shank angle for one leg (radians).
    pub fn knee_angle(&self, leg: Leg) -> f64 {
        self.segment(leg.thigh())[SAGITTAL_AXIS] - self.segment(leg.shank())[SAGITTAL_AXIS]
    }
}

/// A possibly incomplete instant; `None` marks a missing channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub channels: [Option<f64>; CHANNELS],
}

impl Frame {
    pub fn complete(values: [f64; CHANNELS]) -> Self {
        Self {
            channels: values.map(Some),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.channels.iter().all(Option::is_some)
    }

    pub fn first_missing(&self) -> Option<usize> {
        self.channels.iter().position(Option::is_none)
    }

    pub fn channel(&self, segment: Segment, axis: usize) -> Option<f64> {
        self.channels[segment.channel(axis)]
    }

    /// The complete sample, or `None` when any channel is missing.
    pub fn sample(&self) -> Option<Sample> {
        let mut values = [0.0; CHANNELS];
        for (slot, value) in values.iter_mut().zip(self.channels.iter()) {
            *slot = (*value)?;
        }
        Some(Sample::from_channels(values))
    }
}

impl From<Sample> for Frame {
    fn from(sample: Sample) -> Self {
        Frame::complete(sample.channels())
    }
}

/// Frames at a uniform sampling frequency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    /// Uniform sampling frequency in Hz
    pub fs: f64,
    pub frames: Vec<Frame>,
}

impl Series {
    pub fn new(fs: f64, frames: Vec<Frame>) -> Self {
        Self { fs, frames }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn duration(&self) -> f64 {
        self.frames.len() as f64 / self.fs
    }

    pub fn sample(&self, index: usize) -> Option<Sample> {
        self.frames.get(index).and_then(Frame::sample)
    }

    pub fn valid_count(&self) -> usize {
        self.frames.iter().filter(|f| f.is_valid()).count()
    }

    /// Valid samples paired with their index; invalid frames are skipped.
    pub fn samples(&self) -> impl Iterator<Item = (usize, Sample)> + '_ {
        self.frames
            .iter()
            .enumerate()
            .filter_map(|(i, frame)| frame.sample().map(|s| (i, s)))
    }
}
