/// Procedureエンティティと複合キー
///
/// テーブルのレコードはPK（パーティションキー）とSK（ソートキー）の組で一意に識別される。
/// JSON上のフィールド名はAPIクライアントとテーブル属性名に合わせて`PK`, `SK`, `createdAt`を使う。
use serde::{Deserialize, Serialize};
use std::fmt;

use super::price::Price;

/// 施術（Procedure）レコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Procedure {
    /// パーティションキー（カテゴリ・テナント単位のグルーピング）
    #[serde(rename = "PK")]
    pub pk: String,
    /// ソートキー（パーティション内での識別子）
    #[serde(rename = "SK")]
    pub sk: String,
    /// 表示名
    pub title: String,
    /// 作成日時（呼び出し元が指定）
    #[serde(rename = "createdAt")]
    pub created_at: String,
    /// 価格の一覧（1件以上、順序を保持）
    pub prices: Vec<Price>,
}

impl Procedure {
    /// このレコードの複合キーを取得
    pub fn key(&self) -> ProcedureKey {
        ProcedureKey::new(self.pk.clone(), self.sk.clone())
    }

    /// 部分更新を適用する
    ///
    /// パッチで指定されたフィールドのみを置き換え、それ以外はそのまま残す。
    pub fn apply(&mut self, patch: &ProcedurePatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(created_at) = &patch.created_at {
            self.created_at = created_at.clone();
        }
        if let Some(prices) = &patch.prices {
            self.prices = prices.clone();
        }
    }
}

/// (PK, SK)の複合キー
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProcedureKey {
    #[serde(rename = "PK")]
    pub pk: String,
    #[serde(rename = "SK")]
    pub sk: String,
}

impl ProcedureKey {
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: sk.into(),
        }
    }
}

impl fmt::Display for ProcedureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PK={}, SK={}", self.pk, self.sk)
    }
}

/// 更新リクエストで指定された変更内容
///
/// `None`のフィールドは変更しない。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcedurePatch {
    pub title: Option<String>,
    pub created_at: Option<String>,
    pub prices: Option<Vec<Price>>,
}

impl ProcedurePatch {
    /// 変更対象のフィールドが1つもないか
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.created_at.is_none() && self.prices.is_none()
    }
}
