use std::path::Path;

use crate::traits::LineDetector;

/// テスト用のモック検出器
#[derive(Debug, Clone, Copy)]
pub struct MockLineDetector {
    pub answer: Option<u32>,
}

impl MockLineDetector {
    pub const fn new(answer: Option<u32>) -> Self {
        Self { answer }
    }
}

impl LineDetector for MockLineDetector {
    fn detect_file(&self, _path: &Path) -> Option<u32> {
        // テスト用の簡易実装：固定値を返す
        self.answer
    }
}

/// テスト用のファクトリー関数
pub const fn create_mock_detector(center: u32) -> MockLineDetector {
    MockLineDetector::new(Some(center))
}
