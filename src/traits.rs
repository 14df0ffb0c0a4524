use std::path::Path;

/// 縦の区切り線検出器の抽象化
///
/// 具象検出器を差し替えることでオーケストレータを単体でテストできる
pub trait LineDetector: Send + Sync {
    /// 画像ファイル内の区切り線の中心X座標を検出する
    ///
    /// 読み込めないファイルは `None` として扱い、エラーは伝播させない
    fn detect_file(&self, path: &Path) -> Option<u32>;
}
