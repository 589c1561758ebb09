//! Frame-differencing motion analysis
//!
//! Pure core of the sensor: takes downsampled RGBA frames and derives the
//! normalized control position from the centroid of changed pixels. Only the
//! bottom 30% of the frame is analyzed - the band where the moving subject's
//! lower body appears - which keeps face/upper-body noise out of the signal.

use crate::consts::*;

use super::{MotionSample, MoveCommand};

pub struct FrameAnalyzer {
    width: usize,
    height: usize,
    /// RGBA baseline from the previous processed frame
    prev: Option<Vec<u8>>,
    /// Last trusted control position; held across low-motion frames
    last_x: f32,
    /// Front-facing cameras are mirrored on screen, so the centroid flips
    mirrored: bool,
}

impl FrameAnalyzer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            prev: None,
            last_x: 0.5,
            mirrored: false,
        }
    }

    /// Start analyzing a (possibly different) camera stream. Drops the
    /// frame baseline - frames from two cameras must never be differenced
    /// against each other - but keeps the last control position.
    pub fn begin_stream(&mut self, mirrored: bool) {
        self.prev = None;
        self.mirrored = mirrored;
    }

    pub fn mirrored(&self) -> bool {
        self.mirrored
    }

    /// Process one downsampled RGBA frame.
    ///
    /// Returns `None` on the first frame after `begin_stream` (baseline
    /// only) and on frames of unexpected size (transient source glitch).
    /// The baseline is replaced unconditionally on every accepted frame.
    pub fn process(&mut self, rgba: &[u8]) -> Option<MotionSample> {
        if rgba.len() != self.width * self.height * 4 {
            return None;
        }

        let Some(prev) = self.prev.as_deref() else {
            self.prev = Some(rgba.to_vec());
            return None;
        };

        let start_row = (self.height as f32 * SENSE_REGION_START).floor() as usize;
        let start = start_row * self.width * 4;

        let mut left_energy = 0u32;
        let mut right_energy = 0u32;
        let mut column_sum = 0u64;
        let mut motion_pixels = 0u32;

        for i in (start..rgba.len()).step_by(4) {
            let curr = (rgba[i] as f32 + rgba[i + 1] as f32 + rgba[i + 2] as f32) / 3.0;
            let base = (prev[i] as f32 + prev[i + 1] as f32 + prev[i + 2] as f32) / 3.0;

            if (curr - base).abs() > PIXEL_DIFF_THRESHOLD {
                let px = (i / 4) % self.width;
                if px < self.width / 2 {
                    left_energy += 1;
                } else {
                    right_energy += 1;
                }
                column_sum += px as u64;
                motion_pixels += 1;
            }
        }

        let mut command = MoveCommand::Idle;
        let mut intensity = 0.0;

        if motion_pixels > MOTION_ENERGY_MIN {
            let centroid = column_sum as f32 / motion_pixels as f32;
            let raw_x = centroid / self.width as f32;
            self.last_x = if self.mirrored { 1.0 - raw_x } else { raw_x };

            let side_energy = if self.last_x < 0.5 {
                command = MoveCommand::Left;
                left_energy
            } else {
                command = MoveCommand::Right;
                right_energy
            };
            intensity = (side_energy as f32 / INTENSITY_FULL_ENERGY).min(1.0);
        }

        self.prev = Some(rgba.to_vec());

        Some(MotionSample {
            command,
            intensity,
            x: self.last_x,
        })
    }
}

impl Default for FrameAnalyzer {
    fn default() -> Self {
        Self::new(SENSE_WIDTH as usize, SENSE_HEIGHT as usize)
    }
}
