/// 価格
///
/// リクエストで受け取った表記（整数か小数か）のまま返却できるよう、整数と小数を区別して保持する。
/// DynamoDBのNumber型に収まらない値はバリデーションで弾く。
use serde::{Deserialize, Serialize};
use std::fmt;

/// 小数として受け付ける絶対値の上限（この値を含まない）
pub const MAX_PRICE_MAGNITUDE: f64 = 1e38;

/// 0以外の小数として受け付ける絶対値の下限
pub const MIN_PRICE_MAGNITUDE: f64 = 1e-38;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Integer(i64),
    Decimal(f64),
}

impl Price {
    /// DynamoDBのNumber文字列から復元
    pub fn parse(s: &str) -> Option<Self> {
        if let Ok(i) = s.parse::<i64>() {
            return Some(Price::Integer(i));
        }
        s.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Price::Decimal)
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Price::Integer(i) => i as f64,
            Price::Decimal(f) => f,
        }
    }

    /// DynamoDBのNumber型（有効桁38桁）として表現できるか
    pub fn is_storable(self) -> bool {
        match self {
            Price::Integer(_) => true,
            Price::Decimal(f) => {
                f == 0.0
                    || (f.is_finite()
                        && (MIN_PRICE_MAGNITUDE..MAX_PRICE_MAGNITUDE).contains(&f.abs()))
            }
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::Integer(i) => write!(f, "{}", i),
            Price::Decimal(d) => write!(f, "{}", d),
        }
    }
}
