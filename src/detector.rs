use std::path::Path;

use image::{GrayImage, ImageBuffer, Luma, Primitive};
use ndarray::{Array1, Axis};
use nshare::AsNdarray2;
use num_traits::AsPrimitive;

use crate::traits::LineDetector;

/// 縦線検出のパラメータ一式
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorParams {
    /// Pixels with intensity at or below this value count as black (inclusive).
    pub black_threshold: u8,
    /// Minimum run width in columns for a candidate line.
    pub min_line_width: u32,
    /// Minimum proportion of black pixels per column (inclusive compare).
    pub min_line_density: f32,
    /// Fraction of the image width searched around the horizontal midpoint.
    pub search_middle_fraction: f32,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            black_threshold: 25,
            min_line_width: 5,
            min_line_density: 0.9,
            search_middle_fraction: 0.2,
        }
    }
}

/// Detects the center of a prominent vertical black line in a scanned photo.
///
/// The search is restricted to a window around the horizontal midpoint; within
/// it, the widest contiguous run of near-black columns wins.
pub struct VerticalLineDetector {
    params: DetectorParams,
}

impl VerticalLineDetector {
    pub const fn new(params: DetectorParams) -> Self {
        Self { params }
    }

    /// Scans grayscale pixel data for the dividing line.
    ///
    /// Returns the x-coordinate of the line center, or `None` when no run of
    /// columns qualifies. Degenerate inputs (empty image, empty search window,
    /// garbage parameters) also return `None` rather than failing.
    pub fn detect(&self, gray: &GrayImage) -> Option<u32> {
        let (width, height) = gray.dimensions();
        if width == 0 || height == 0 {
            return None;
        }

        let densities = column_densities(gray, self.params.black_threshold);
        let window = search_window(width, self.params.search_middle_fraction);

        widest_run_center(
            &densities,
            window,
            self.params.min_line_width,
            self.params.min_line_density,
        )
    }
}

impl LineDetector for VerticalLineDetector {
    fn detect_file(&self, path: &Path) -> Option<u32> {
        match image::open(path) {
            Ok(img) => self.detect(&img.into_luma8()),
            Err(e) => {
                log::debug!(
                    "{} の読み込みに失敗したため線検出をスキップ: {}",
                    path.display(),
                    e
                );
                None
            }
        }
    }
}

/// 列ごとの黒画素密度（黒画素数 / 画像高さ）を計算する
pub fn column_densities<S>(image: &ImageBuffer<Luma<S>, Vec<S>>, black_threshold: S) -> Array1<f32>
where
    S: Primitive + 'static,
{
    let height: f32 = image.height().as_();
    // (height, width) ビューを列方向に畳み込む
    let black_counts = image
        .as_ndarray2()
        .fold_axis(Axis(0), 0u32, |&count, &value| {
            count + u32::from(value <= black_threshold)
        });
    black_counts.mapv(|count| count as f32 / height)
}

/// The half-open column range `[start, end)` to scan, centered on the image
/// midpoint and clamped to the image bounds.
fn search_window(width: u32, middle_fraction: f32) -> (u32, u32) {
    let search_width = (width as f32 * middle_fraction) as u32;
    let start = width.saturating_sub(search_width) / 2;
    let end = width.min(start + search_width);
    (start, end)
}

/// Left-to-right scan for contiguous runs of columns with density at or above
/// `min_density`, keeping the midpoint of the widest qualifying run. Exact
/// width ties resolve to the leftmost run.
fn widest_run_center(
    densities: &Array1<f32>,
    (start_x, end_x): (u32, u32),
    min_width: u32,
    min_density: f32,
) -> Option<u32> {
    let mut best_width = 0u32;
    let mut best_center = None;
    let mut run_start: Option<u32> = None;

    for x in start_x..end_x {
        if densities[x as usize] >= min_density {
            if run_start.is_none() {
                run_start = Some(x);
            }
        } else if let Some(start) = run_start.take() {
            evaluate_run(start, x - 1, min_width, &mut best_width, &mut best_center);
        }
    }

    // 探索窓の右端で開いたままのランも内部のランと同じ扱いで閉じる
    if let Some(start) = run_start {
        evaluate_run(start, end_x - 1, min_width, &mut best_width, &mut best_center);
    }

    best_center
}

fn evaluate_run(
    start: u32,
    end: u32,
    min_width: u32,
    best_width: &mut u32,
    best_center: &mut Option<u32>,
) {
    let width = end - start + 1;
    if width >= min_width && width > *best_width {
        *best_width = width;
        *best_center = Some((start + end) / 2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ops::RangeInclusive;

    fn detector() -> VerticalLineDetector {
        VerticalLineDetector::new(DetectorParams::default())
    }

    fn gray_with_black_columns(
        width: u32,
        height: u32,
        black: &[RangeInclusive<u32>],
    ) -> GrayImage {
        GrayImage::from_fn(width, height, |x, _| {
            if black.iter().any(|run| run.contains(&x)) {
                Luma([0])
            } else {
                Luma([255])
            }
        })
    }

    #[test]
    fn detects_center_of_single_run() {
        // 1000x600、列495〜504が真っ黒 → 中心は (495+504)/2 = 499
        let gray = gray_with_black_columns(1000, 600, &[495..=504]);
        assert_eq!(detector().detect(&gray), Some(499));
    }

    #[test]
    fn returns_none_without_line() {
        let gray = gray_with_black_columns(1000, 600, &[]);
        assert_eq!(detector().detect(&gray), None);
    }

    #[test]
    fn prefers_widest_run() {
        // 7列と12列のラン、どちらも探索窓 [400, 600) 内
        let gray = gray_with_black_columns(1000, 600, &[490..=496, 500..=511]);
        assert_eq!(detector().detect(&gray), Some(505));
    }

    #[test]
    fn tie_resolves_to_leftmost_run() {
        let gray = gray_with_black_columns(1000, 600, &[480..=485, 520..=525]);
        assert_eq!(detector().detect(&gray), Some(482));
    }

    #[test]
    fn trailing_run_at_window_edge_counts() {
        // ランが探索窓の右端 (列599) を越えて続く場合、窓内の部分だけが
        // 内部のランと同じ規則で評価される
        let gray = gray_with_black_columns(1000, 600, &[590..=650]);
        assert_eq!(detector().detect(&gray), Some(594));
    }

    #[test]
    fn black_threshold_is_inclusive() {
        let at_threshold = GrayImage::from_pixel(1000, 600, Luma([25]));
        assert_eq!(detector().detect(&at_threshold), Some(499));

        let above_threshold = GrayImage::from_pixel(1000, 600, Luma([26]));
        assert_eq!(detector().detect(&above_threshold), None);
    }

    #[test]
    fn density_threshold_is_inclusive() {
        // 高さ600のうち540画素が黒 → 密度ちょうど0.9
        let exactly = GrayImage::from_fn(1000, 600, |x, y| {
            if (495..=504).contains(&x) && y < 540 {
                Luma([0])
            } else {
                Luma([255])
            }
        });
        assert_eq!(detector().detect(&exactly), Some(499));

        // 539画素では密度が0.9を下回る
        let below = GrayImage::from_fn(1000, 600, |x, y| {
            if (495..=504).contains(&x) && y < 539 {
                Luma([0])
            } else {
                Luma([255])
            }
        });
        assert_eq!(detector().detect(&below), None);
    }

    #[test]
    fn short_run_is_rejected() {
        let gray = gray_with_black_columns(1000, 600, &[498..=500]);
        assert_eq!(detector().detect(&gray), None);
    }

    #[test]
    fn degenerate_fraction_finds_nothing() {
        let gray = gray_with_black_columns(1000, 600, &[495..=504]);

        for fraction in [0.0, -1.0, f32::NAN] {
            let params = DetectorParams {
                search_middle_fraction: fraction,
                ..DetectorParams::default()
            };
            assert_eq!(VerticalLineDetector::new(params).detect(&gray), None);
        }
    }

    #[test]
    fn empty_image_finds_nothing() {
        assert_eq!(detector().detect(&GrayImage::new(0, 0)), None);
        assert_eq!(detector().detect(&GrayImage::new(10, 0)), None);
    }

    #[test]
    fn run_covering_whole_window_is_detected() {
        // 画像全体が黒でもランは窓内に限定される: [400, 599] → 中心499
        let gray = gray_with_black_columns(1000, 600, &[0..=999]);
        assert_eq!(detector().detect(&gray), Some(499));
    }

    #[test]
    fn run_outside_window_is_ignored() {
        let gray = gray_with_black_columns(1000, 600, &[100..=150]);
        assert_eq!(detector().detect(&gray), None);
    }

    #[test]
    fn column_densities_counts_black_pixels() {
        let gray = gray_with_black_columns(4, 10, &[1..=2]);
        let densities = column_densities(&gray, 25);
        assert_eq!(densities.to_vec(), vec![0.0, 1.0, 1.0, 0.0]);
    }
}
