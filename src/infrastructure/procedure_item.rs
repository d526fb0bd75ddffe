// ProcedureとDynamoDB属性マップの相互変換
//
// 属性レイアウト:
// - PK, SK, title, createdAt: S
// - prices: L（要素はN、順序を保持）

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;

use super::procedure_repository::RepositoryError;
use crate::domain::{Price, Procedure, ProcedureKey, ProcedurePatch};

pub const ATTR_PK: &str = "PK";
pub const ATTR_SK: &str = "SK";
pub const ATTR_TITLE: &str = "title";
pub const ATTR_CREATED_AT: &str = "createdAt";
pub const ATTR_PRICES: &str = "prices";

/// キーが存在しない場合のみ書き込む条件
pub const CONDITION_KEY_NOT_EXISTS: &str = "attribute_not_exists(PK) AND attribute_not_exists(SK)";

/// キーが存在する場合のみ更新・削除する条件
pub const CONDITION_KEY_EXISTS: &str = "attribute_exists(PK) AND attribute_exists(SK)";

pub type Item = HashMap<String, AttributeValue>;

/// 複合キーの属性マップ
pub fn key_to_item(key: &ProcedureKey) -> Item {
    HashMap::from([
        (ATTR_PK.to_string(), AttributeValue::S(key.pk.clone())),
        (ATTR_SK.to_string(), AttributeValue::S(key.sk.clone())),
    ])
}

/// Procedure全体の属性マップ
pub fn procedure_to_item(procedure: &Procedure) -> Item {
    let mut item = key_to_item(&procedure.key());
    item.insert(ATTR_TITLE.to_string(), AttributeValue::S(procedure.title.clone()));
    item.insert(
        ATTR_CREATED_AT.to_string(),
        AttributeValue::S(procedure.created_at.clone()),
    );
    item.insert(ATTR_PRICES.to_string(), prices_to_attribute(&procedure.prices));
    item
}

fn prices_to_attribute(prices: &[Price]) -> AttributeValue {
    AttributeValue::L(
        prices
            .iter()
            .map(|price| AttributeValue::N(price.to_string()))
            .collect(),
    )
}

/// 属性マップからProcedureを復元
pub fn procedure_from_item(item: &Item) -> Result<Procedure, RepositoryError> {
    Ok(Procedure {
        pk: string_attribute(item, ATTR_PK)?,
        sk: string_attribute(item, ATTR_SK)?,
        title: string_attribute(item, ATTR_TITLE)?,
        created_at: string_attribute(item, ATTR_CREATED_AT)?,
        prices: prices_attribute(item)?,
    })
}

fn string_attribute(item: &Item, name: &str) -> Result<String, RepositoryError> {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .cloned()
        .ok_or_else(|| RepositoryError::SerializationError(format!("Missing {} field", name)))
}

fn prices_attribute(item: &Item) -> Result<Vec<Price>, RepositoryError> {
    let list = item
        .get(ATTR_PRICES)
        .and_then(|v| v.as_l().ok())
        .ok_or_else(|| {
            RepositoryError::SerializationError(format!("Missing {} field", ATTR_PRICES))
        })?;

    list.iter()
        .map(|v| {
            v.as_n()
                .ok()
                .and_then(|n| Price::parse(n))
                .ok_or_else(|| {
                    RepositoryError::SerializationError(format!("Invalid {} element", ATTR_PRICES))
                })
        })
        .collect()
}

/// UpdateItem用の式
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateExpression {
    /// `SET #title = :title, ...`
    pub expression: String,
    pub names: HashMap<String, String>,
    pub values: Item,
}

/// パッチから`SET`式を構築する
///
/// 指定されたフィールドのみを式に含める。属性名は予約語との衝突を避けるため常にプレースホルダーを使う。
/// パッチが空の場合は`None`。
pub fn build_update_expression(patch: &ProcedurePatch) -> Option<UpdateExpression> {
    let mut assignments = Vec::new();
    let mut names = HashMap::new();
    let mut values = HashMap::new();

    let mut set = |attr: &str, value: AttributeValue| {
        assignments.push(format!("#{attr} = :{attr}"));
        names.insert(format!("#{attr}"), attr.to_string());
        values.insert(format!(":{attr}"), value);
    };

    if let Some(title) = &patch.title {
        set(ATTR_TITLE, AttributeValue::S(title.clone()));
    }
    if let Some(created_at) = &patch.created_at {
        set(ATTR_CREATED_AT, AttributeValue::S(created_at.clone()));
    }
    if let Some(prices) = &patch.prices {
        set(ATTR_PRICES, prices_to_attribute(prices));
    }

    if assignments.is_empty() {
        return None;
    }

    Some(UpdateExpression {
        expression: format!("SET {}", assignments.join(", ")),
        names,
        values,
    })
}
