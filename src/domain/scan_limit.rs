// 一覧取得（Scan）の件数上限
//
// クエリパラメータ`limit`で指定されたページサイズを、常に1..=MAX_SCAN_LIMITの範囲に収める。

use tracing::debug;

/// 1回の一覧取得で返す最大件数
pub const MAX_SCAN_LIMIT: u32 = 100;

/// limitが指定されない場合のデフォルト値
pub const DEFAULT_SCAN_LIMIT: u32 = MAX_SCAN_LIMIT;

/// Scanのページサイズ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanLimit(u32);

impl Default for ScanLimit {
    fn default() -> Self {
        Self(DEFAULT_SCAN_LIMIT)
    }
}

impl ScanLimit {
    /// 要求値から作成
    ///
    /// 0はデフォルト値、MAX_SCAN_LIMITを超える値はMAX_SCAN_LIMITに丸める。
    pub fn new(requested: u32) -> Self {
        match requested {
            0 => Self::default(),
            n => Self(n.min(MAX_SCAN_LIMIT)),
        }
    }

    /// クエリパラメータの値から作成
    ///
    /// 未指定・数値として解釈できない値はデフォルト値として扱う（一覧取得はクライアントエラーを返さない）。
    pub fn from_query(value: Option<&str>) -> Self {
        let Some(raw) = value else {
            return Self::default();
        };

        match raw.trim().parse::<u32>() {
            Ok(n) => Self::new(n),
            Err(e) => {
                debug!(limit = raw, error = %e, "limitパラメータを解釈できないためデフォルト値を使用");
                Self::default()
            }
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}
