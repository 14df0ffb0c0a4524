pub mod config;
pub mod detector;
pub mod errors;
pub mod traits;

pub mod mocks;

use image::GenericImageView;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub use config::{Config, NamingConvention};
pub use detector::{DetectorParams, VerticalLineDetector};
pub use errors::{Result, SplitError};
pub use traits::*;

/// 1フォルダ分の処理結果
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SplitReport {
    /// Files split into two halves.
    pub processed: usize,
    /// Files skipped because of per-file errors.
    pub skipped: usize,
    /// Of the processed files, how many fell back to the geometric center.
    pub fallback_splits: usize,
}

pub struct PhotoSplitter<D: LineDetector> {
    detector: D,
    config: Config,
}

impl<D: LineDetector> PhotoSplitter<D> {
    pub const fn new(detector: D, config: Config) -> Self {
        Self { detector, config }
    }

    /// フォルダ内のJPEG画像を順に分割する
    ///
    /// ファイル単位のエラーはスキップとして数え、処理を続行する。
    /// 入力フォルダの欠如と出力フォルダ作成の失敗のみが致命的エラーになる。
    pub fn process_directory(&self, input_dir: &Path) -> Result<SplitReport> {
        if !input_dir.is_dir() {
            return Err(SplitError::FileSystem {
                path: input_dir.to_path_buf(),
                operation: "入力ディレクトリ確認".to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "入力ディレクトリが存在しません",
                ),
            });
        }

        // 既に存在していても失敗しない
        let output_dir = input_dir.join(&self.config.output_dir_name);
        fs::create_dir_all(&output_dir).map_err(|e| SplitError::FileSystem {
            path: output_dir.clone(),
            operation: "出力ディレクトリ作成".to_string(),
            source: e,
        })?;

        let image_files = self.collect_image_files(input_dir);

        if image_files.is_empty() {
            println!("分割対象のJPEG画像が見つかりません");
            return Ok(SplitReport::default());
        }

        let pb = ProgressBar::new(image_files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                )
                .unwrap()
                .progress_chars("#>-"),
        );

        let mut report = SplitReport::default();
        for input_file in &image_files {
            match self.process_single_image(input_file, &output_dir) {
                Ok(used_fallback) => {
                    report.processed += 1;
                    if used_fallback {
                        report.fallback_splits += 1;
                    }
                }
                Err(e) => {
                    report.skipped += 1;
                    log::warn!("'{}' を処理できませんでした: {}", input_file.display(), e);
                }
            }
            pb.inc(1);
        }

        pb.finish_with_message("処理完了");
        Ok(report)
    }

    /// 処理開始前にファイル一覧を確定させる（出力フォルダ内のファイルは含めない）
    fn collect_image_files(&self, input_dir: &Path) -> Vec<PathBuf> {
        WalkDir::new(input_dir)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file() && self.is_supported_image_format(e.path()))
            .map(|e| e.into_path())
            .collect()
    }

    pub fn is_supported_image_format(&self, path: &Path) -> bool {
        if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
            matches!(extension.to_lowercase().as_str(), "jpg" | "jpeg")
        } else {
            false
        }
    }

    /// Splits one image, returning whether the geometric-center fallback was used.
    fn process_single_image(&self, input_file: &Path, output_dir: &Path) -> Result<bool> {
        let img = image::open(input_file).map_err(|e| SplitError::ImageProcessing {
            path: input_file.display().to_string(),
            operation: "画像読み込み".to_string(),
            source: Box::new(e),
        })?;

        let (width, height) = img.dimensions();
        if width < 2 {
            return Err(SplitError::Validation {
                field: "width".to_string(),
                reason: format!("= {} px では左右に分割できません", width),
            });
        }

        let (split_x, used_fallback) = match self.detector.detect_file(input_file) {
            Some(x) => {
                log::info!("'{}' で区切り線を検出: x={}", input_file.display(), x);
                (x, false)
            }
            None => {
                log::info!(
                    "'{}' に明確な区切り線が見つからないため中央で分割します",
                    input_file.display()
                );
                (width / 2, true)
            }
        };

        // 両半分の幅が必ず正になるよう 1..=width-1 に収める
        let split_x = split_x.clamp(1, width - 1);

        let left_half = img.crop_imm(0, 0, split_x, height);
        let right_half = img.crop_imm(split_x, 0, width - split_x, height);

        let (left_name, right_name) = self.output_names(input_file)?;
        for (half, name) in [(left_half, left_name), (right_half, right_name)] {
            half.save(output_dir.join(&name))
                .map_err(|e| SplitError::ImageProcessing {
                    path: name.clone(),
                    operation: "画像保存".to_string(),
                    source: Box::new(e),
                })?;
        }

        Ok(used_fallback)
    }

    /// `name.ext` から `name(1).ext` / `name(2).ext` を組み立てる
    pub fn output_names(&self, input_file: &Path) -> Result<(String, String)> {
        let stem = input_file
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| SplitError::Validation {
                field: "filename".to_string(),
                reason: format!("をUTF-8として解釈できません: {:?}", input_file),
            })?;
        let ext = input_file
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("jpg");

        let (left_index, right_index) = self.config.naming.suffix_indices();
        Ok((
            format!("{}({}).{}", stem, left_index, ext),
            format!("{}({}).{}", stem, right_index, ext),
        ))
    }
}
