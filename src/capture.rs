use anyhow::{bail, Context, Result};
use enum_dispatch::enum_dispatch;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::color::Rgb;
use crate::grid::{CaptureBounds, PixelGrid};

/// Where the picker reads pixels from.
#[enum_dispatch]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureSource {
    FrameSource,
    TestPatternSource,
}

#[enum_dispatch(CaptureSource)]
pub trait ScreenSource {
    fn dimensions(&self) -> (u32, u32);

    /// `None` when `(x, y)` lies outside the screen.
    fn pixel(&self, x: i64, y: i64) -> Option<Rgb>;

    fn capture(&self, bounds: &CaptureBounds) -> PixelGrid {
        let mut grid = PixelGrid::new(bounds.size);
        for gy in 0..bounds.size {
            for gx in 0..bounds.size {
                let color = self.pixel(bounds.left + gx as i64, bounds.top + gy as i64);
                grid.set(gx, gy, color);
            }
        }
        grid
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    /// 4 bytes per pixel, blue first. What most screen grabbers hand out.
    Bgra32,
    Rgba32,
}

/// Describes an uncompressed 32-bit frame dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RawFrameLayout {
    pub width: u32,
    pub height: u32,
    /// Bytes per row. Defaults to `width * 4`.
    pub stride: Option<usize>,
    /// Bytes to skip before the first row.
    #[serde(default)]
    pub offset: usize,
    pub format: PixelFormat,
}

impl RawFrameLayout {
    pub fn stride(&self) -> usize {
        self.stride.unwrap_or(self.width as usize * 4)
    }
}

/// A captured frame held in memory as packed RGB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSource {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl FrameSource {
    pub fn from_rgb(width: u32, height: u32, pixels: Vec<Rgb>) -> Result<Self> {
        if width == 0 || height == 0 {
            bail!("Frame must not be empty, got {width}x{height}");
        }
        if pixels.len() != width as usize * height as usize {
            bail!(
                "Frame of {width}x{height} needs {} pixels, got {}",
                width as usize * height as usize,
                pixels.len()
            );
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn from_raw(bytes: &[u8], layout: &RawFrameLayout) -> Result<Self> {
        let stride = layout.stride();
        let row_len = layout.width as usize * 4;
        if stride < row_len {
            bail!("Stride {stride} is shorter than a row of {row_len} bytes");
        }
        let needed = match layout.height as usize {
            0 => Some(layout.offset),
            height => stride
                .checked_mul(height - 1)
                .and_then(|rows| rows.checked_add(row_len))
                .and_then(|rows| rows.checked_add(layout.offset)),
        };
        let Some(needed) = needed else {
            bail!(
                "Raw frame of {}x{} with stride {stride} does not fit in memory",
                layout.width,
                layout.height
            );
        };
        if bytes.len() < needed {
            bail!(
                "Raw frame is truncated: need {needed} bytes, got {}",
                bytes.len()
            );
        }

        let mut pixels = Vec::with_capacity(layout.width as usize * layout.height as usize);
        for y in 0..layout.height as usize {
            let row = &bytes[layout.offset + y * stride..][..row_len];
            for px in row.chunks_exact(4) {
                pixels.push(match layout.format {
                    PixelFormat::Bgra32 => Rgb::new(px[2], px[1], px[0]),
                    PixelFormat::Rgba32 => Rgb::new(px[0], px[1], px[2]),
                });
            }
        }
        Self::from_rgb(layout.width, layout.height, pixels)
    }

    /// Parses a binary PPM (`P6`) image.
    pub fn from_ppm(bytes: &[u8]) -> Result<Self> {
        let mut header = PpmHeader { bytes, pos: 0 };
        if header.token()? != b"P6" {
            bail!("Not a binary PPM image (expected P6 magic)");
        }
        let width = header.number().with_context(|| "Invalid PPM width")?;
        let height = header.number().with_context(|| "Invalid PPM height")?;
        let maxval = header.number().with_context(|| "Invalid PPM maxval")?;
        if maxval == 0 || maxval > 255 {
            bail!("Unsupported PPM maxval {maxval}, only 8-bit images are supported");
        }
        // exactly one whitespace byte separates the header from the raster
        let data = bytes.get(header.pos + 1..).unwrap_or_default();

        let Some(needed) = (width as usize)
            .checked_mul(height as usize)
            .and_then(|count| count.checked_mul(3))
        else {
            bail!("PPM image of {width}x{height} does not fit in memory");
        };
        if data.len() < needed {
            bail!(
                "PPM raster is truncated: need {needed} bytes, got {}",
                data.len()
            );
        }
        let scale = |v: u8| (u32::from(v).min(maxval) * 255 / maxval) as u8;
        let pixels = data[..needed]
            .chunks_exact(3)
            .map(|px| Rgb::new(scale(px[0]), scale(px[1]), scale(px[2])))
            .collect();
        Self::from_rgb(width, height, pixels)
    }
}

impl ScreenSource for FrameSource {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn pixel(&self, x: i64, y: i64) -> Option<Rgb> {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }
}

struct PpmHeader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> PpmHeader<'a> {
    fn skip_whitespace_and_comments(&mut self) {
        while let Some(&b) = self.bytes.get(self.pos) {
            if b == b'#' {
                while self.bytes.get(self.pos).is_some_and(|&c| c != b'\n') {
                    self.pos += 1;
                }
            } else if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn token(&mut self) -> Result<&'a [u8]> {
        self.skip_whitespace_and_comments();
        let start = self.pos;
        while self
            .bytes
            .get(self.pos)
            .is_some_and(|b| !b.is_ascii_whitespace())
        {
            self.pos += 1;
        }
        if start == self.pos {
            bail!("Unexpected end of PPM header");
        }
        Ok(&self.bytes[start..self.pos])
    }

    fn number(&mut self) -> Result<u32> {
        let token = self.token()?;
        let text = std::str::from_utf8(token)?;
        Ok(text.parse()?)
    }
}

/// A generated gradient, used when no capture file is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestPatternSource {
    width: u32,
    height: u32,
}

impl TestPatternSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }
}

impl Default for TestPatternSource {
    fn default() -> Self {
        Self::new(256, 256)
    }
}

impl ScreenSource for TestPatternSource {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn pixel(&self, x: i64, y: i64) -> Option<Rgb> {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return None;
        }
        let ramp = |v: i64, len: u32| (v * 255 / i64::from(len.max(2) - 1)) as u8;
        Some(Rgb::new(ramp(x, self.width), ramp(y, self.height), 0x80))
    }
}

impl CaptureSource {
    /// Loads a capture file. PPM files are detected by their `.ppm` extension or
    /// their magic; anything else needs a `raw` layout.
    pub fn open(path: &Path, raw: Option<&RawFrameLayout>) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read capture file: {path:#?}"))?;
        let is_ppm = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ppm"));
        let frame = match raw {
            _ if is_ppm || bytes.starts_with(b"P6") => FrameSource::from_ppm(&bytes),
            Some(layout) => FrameSource::from_raw(&bytes, layout),
            None => bail!(
                "Capture file {path:#?} is not a PPM image and no raw_frame layout is configured"
            ),
        }
        .with_context(|| format!("Failed to decode capture file: {path:#?}"))?;
        log::info!(
            "Loaded capture {} ({}x{})",
            path.display(),
            frame.width,
            frame.height
        );
        Ok(frame.into())
    }
}
