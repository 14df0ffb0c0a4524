use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::detector::DetectorParams;

#[derive(Parser, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Folder containing the scanned photos. Prompted for interactively when omitted.
    pub input_dir: Option<PathBuf>,

    /// Name of the output subdirectory created inside the input folder.
    #[arg(long, default_value = "split_images_output")]
    pub output_dir_name: String,

    /// Pixels with intensity at or below this value count as "black" (0-255).
    #[arg(long, default_value_t = 25)]
    pub black_threshold: u8,

    /// Minimum width in pixels for a black column run to qualify as the divider.
    #[arg(long, default_value_t = 5)]
    pub min_line_width: u32,

    /// Minimum proportion of black pixels in a column (0.0-1.0).
    #[arg(long, default_value_t = 0.9, value_parser = check_fraction)]
    pub min_line_density: f32,

    /// Fraction of the image width searched around the horizontal midpoint.
    #[arg(long, default_value_t = 0.2, value_parser = check_fraction)]
    pub search_middle_fraction: f32,

    /// Which half receives the `(1)` suffix.
    #[arg(long, value_enum, default_value_t = NamingConvention::LeftFirst)]
    pub naming: NamingConvention,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self::parse()
    }

    /// 検出器に渡すパラメータ一式
    pub const fn detector_params(&self) -> DetectorParams {
        DetectorParams {
            black_threshold: self.black_threshold,
            min_line_width: self.min_line_width,
            min_line_density: self.min_line_density,
            search_middle_fraction: self.search_middle_fraction,
        }
    }
}

/// Output naming convention for the two halves.
///
/// 元実装は左半分に `(1)` を付ける版と `(2)` を付ける版が混在していたため、
/// 明示的な設定に統一する。
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum NamingConvention {
    /// Left half is saved as `name(1).ext`, right half as `name(2).ext`.
    LeftFirst,
    /// Right half is saved as `name(1).ext`, left half as `name(2).ext`.
    RightFirst,
}

impl NamingConvention {
    /// `(left, right)` suffix indices for this convention.
    pub const fn suffix_indices(self) -> (u8, u8) {
        match self {
            Self::LeftFirst => (1, 2),
            Self::RightFirst => (2, 1),
        }
    }
}

fn check_fraction(s: &str) -> Result<f32, String> {
    let value: f32 = s
        .parse()
        .map_err(|_| format!("`{}` is not a number", s))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("`{}` is out of range (expected 0.0-1.0)", s));
    }
    Ok(value)
}
