/// リクエストボディのスキーマ検証
///
/// API Gatewayから渡されたJSONボディを、ドメインロジックに入る前に検証して型付きの値に変換する。
/// 検証はストアへのアクセスより前に行い、失敗時はクライアントエラーとして扱う。
use serde_json::{Map, Value};
use thiserror::Error;

use super::price::Price;
use super::procedure::{Procedure, ProcedureKey, ProcedurePatch};

const FIELD_PK: &str = "PK";
const FIELD_SK: &str = "SK";
const FIELD_TITLE: &str = "title";
const FIELD_CREATED_AT: &str = "createdAt";
const FIELD_PRICES: &str = "prices";

/// リクエストボディのバリデーションエラー
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// ボディが存在しない（空文字列・null含む）
    #[error("Missing body in request")]
    MissingBody,
    /// JSONとしてパースできない
    #[error("invalid JSON: {0}")]
    ParseError(String),
    /// ボディがJSONオブジェクトでない
    #[error("request body must be a JSON object")]
    NotAnObject,
    /// 必須フィールドが欠落
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    /// 文字列であるべきフィールドが文字列でない
    #[error("{0} must be a string")]
    NotAString(&'static str),
    /// 文字列フィールドが空
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
    /// pricesが数値の配列でない
    #[error("prices must be an array of numbers")]
    InvalidPrices,
    /// pricesが空配列
    #[error("prices must contain at least one price")]
    EmptyPrices,
    /// 価格がDynamoDBのNumber型で表現できる範囲外
    #[error("prices must be within the storable numeric range")]
    PriceOutOfRange,
    /// 更新リクエストに変更対象のフィールドがない
    #[error("at least one of title, createdAt, prices must be supplied")]
    NoFieldsToUpdate,
}

/// Procedureリクエストのバリデータ
///
/// 既知のフィールド以外は無視する。
pub struct ProcedureValidator;

impl ProcedureValidator {
    /// 生のボディをJSONオブジェクトとしてパース
    ///
    /// 空白のみのボディと`null`はボディなしとして扱う。
    pub fn parse_body(body: &[u8]) -> Result<Value, ValidationError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(ValidationError::MissingBody);
        }

        let value: Value =
            serde_json::from_slice(body).map_err(|e| ValidationError::ParseError(e.to_string()))?;

        match value {
            Value::Null => Err(ValidationError::MissingBody),
            Value::Object(_) => Ok(value),
            _ => Err(ValidationError::NotAnObject),
        }
    }

    /// 作成リクエストの検証
    ///
    /// チェック順: PK -> SK -> createdAt -> title -> prices
    pub fn validate_new(body: &Value) -> Result<Procedure, ValidationError> {
        let obj = Self::as_object(body)?;

        let pk = Self::required_string(obj, FIELD_PK)?;
        let sk = Self::required_string(obj, FIELD_SK)?;
        let created_at = Self::required_string(obj, FIELD_CREATED_AT)?;
        let title = Self::required_string(obj, FIELD_TITLE)?;
        let prices = Self::prices(obj.get(FIELD_PRICES).ok_or(ValidationError::MissingField(FIELD_PRICES))?)?;

        Ok(Procedure {
            pk,
            sk,
            title,
            created_at,
            prices,
        })
    }

    /// 更新リクエストの検証
    ///
    /// PK/SKは必須。title, createdAt, pricesは任意だが少なくとも1つ必要で、
    /// 指定された場合は作成時と同じ規則で検証する。
    pub fn validate_patch(body: &Value) -> Result<(ProcedureKey, ProcedurePatch), ValidationError> {
        let obj = Self::as_object(body)?;

        let key = Self::key_from(obj)?;

        let patch = ProcedurePatch {
            title: Self::optional_string(obj, FIELD_TITLE)?,
            created_at: Self::optional_string(obj, FIELD_CREATED_AT)?,
            prices: obj.get(FIELD_PRICES).map(Self::prices).transpose()?,
        };

        if patch.is_empty() {
            return Err(ValidationError::NoFieldsToUpdate);
        }

        Ok((key, patch))
    }

    /// キーのみを持つリクエスト（削除）の検証
    pub fn validate_key(body: &Value) -> Result<ProcedureKey, ValidationError> {
        let obj = Self::as_object(body)?;
        Self::key_from(obj)
    }

    fn as_object(body: &Value) -> Result<&Map<String, Value>, ValidationError> {
        match body {
            Value::Null => Err(ValidationError::MissingBody),
            Value::Object(obj) => Ok(obj),
            _ => Err(ValidationError::NotAnObject),
        }
    }

    fn key_from(obj: &Map<String, Value>) -> Result<ProcedureKey, ValidationError> {
        let pk = Self::required_string(obj, FIELD_PK)?;
        let sk = Self::required_string(obj, FIELD_SK)?;
        Ok(ProcedureKey { pk, sk })
    }

    fn required_string(
        obj: &Map<String, Value>,
        field: &'static str,
    ) -> Result<String, ValidationError> {
        Self::optional_string(obj, field)?.ok_or(ValidationError::MissingField(field))
    }

    /// nullは未指定として扱う
    fn optional_string(
        obj: &Map<String, Value>,
        field: &'static str,
    ) -> Result<Option<String>, ValidationError> {
        match obj.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Err(ValidationError::EmptyField(field)),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(ValidationError::NotAString(field)),
        }
    }

    fn prices(value: &Value) -> Result<Vec<Price>, ValidationError> {
        let arr = value.as_array().ok_or(ValidationError::InvalidPrices)?;
        if arr.is_empty() {
            return Err(ValidationError::EmptyPrices);
        }

        arr.iter().map(Self::price).collect()
    }

    fn price(value: &Value) -> Result<Price, ValidationError> {
        let price = match value.as_i64() {
            Some(i) => Price::Integer(i),
            None => Price::Decimal(value.as_f64().ok_or(ValidationError::InvalidPrices)?),
        };

        if !price.is_storable() {
            return Err(ValidationError::PriceOutOfRange);
        }

        Ok(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PROCEDURE_FIELDS: [&str; 5] = ["PK", "SK", "title", "createdAt", "prices"];

    // 有効な作成リクエストを作成するヘルパー関数
    fn valid_procedure_json() -> Value {
        json!({
            "PK": "cat#1",
            "SK": "proc#1",
            "title": "Oil Change",
            "createdAt": "2024-01-01T00:00:00Z",
            "prices": [49.99]
        })
    }

    fn without(field: &str) -> Value {
        let mut value = valid_procedure_json();
        value.as_object_mut().unwrap().remove(field);
        value
    }

    // ==================== parse_body ====================

    #[test]
    fn test_parse_body_empty_is_missing_body() {
        assert_eq!(ProcedureValidator::parse_body(b""), Err(ValidationError::MissingBody));
        assert_eq!(ProcedureValidator::parse_body(b"  \n"), Err(ValidationError::MissingBody));
    }

    #[test]
    fn test_parse_body_null_is_missing_body() {
        assert_eq!(ProcedureValidator::parse_body(b"null"), Err(ValidationError::MissingBody));
    }

    #[test]
    fn test_parse_body_invalid_json() {
        let result = ProcedureValidator::parse_body(b"{\"PK\":");
        assert!(matches!(result, Err(ValidationError::ParseError(_))));
    }

    #[test]
    fn test_parse_body_array_is_not_an_object() {
        assert_eq!(ProcedureValidator::parse_body(b"[1,2]"), Err(ValidationError::NotAnObject));
    }

    #[test]
    fn test_parse_body_object() {
        let value = ProcedureValidator::parse_body(br#"{"PK":"a"}"#).unwrap();
        assert_eq!(value, json!({"PK": "a"}));
    }

    // ==================== validate_new ====================

    #[test]
    fn test_validate_new_valid() {
        let procedure = ProcedureValidator::validate_new(&valid_procedure_json()).unwrap();

        assert_eq!(procedure.pk, "cat#1");
        assert_eq!(procedure.sk, "proc#1");
        assert_eq!(procedure.title, "Oil Change");
        assert_eq!(procedure.created_at, "2024-01-01T00:00:00Z");
        assert_eq!(procedure.prices, vec![Price::Decimal(49.99)]);
    }

    #[test]
    fn test_validate_new_missing_each_required_field() {
        for field in PROCEDURE_FIELDS {
            let result = ProcedureValidator::validate_new(&without(field));
            assert_eq!(
                result,
                Err(ValidationError::MissingField(field)),
                "field {} should be required",
                field
            );
        }
    }

    #[test]
    fn test_validate_new_checks_fields_in_order() {
        // PKとtitleの両方が欠落している場合、先にPKが報告される
        let mut value = without("PK");
        value.as_object_mut().unwrap().remove("title");

        assert_eq!(
            ProcedureValidator::validate_new(&value),
            Err(ValidationError::MissingField("PK"))
        );
    }

    #[test]
    fn test_validate_new_empty_strings_rejected() {
        for field in ["PK", "SK", "createdAt", "title"] {
            let mut value = valid_procedure_json();
            value[field] = json!("");
            assert_eq!(
                ProcedureValidator::validate_new(&value),
                Err(ValidationError::EmptyField(field))
            );
        }
    }

    #[test]
    fn test_validate_new_whitespace_strings_accepted() {
        let mut value = valid_procedure_json();
        value["title"] = json!(" ");
        value["createdAt"] = json!("  ");

        let procedure = ProcedureValidator::validate_new(&value).unwrap();
        assert_eq!(procedure.title, " ");
        assert_eq!(procedure.created_at, "  ");
    }

    #[test]
    fn test_validate_new_null_field_is_missing() {
        let mut value = valid_procedure_json();
        value["SK"] = Value::Null;

        assert_eq!(
            ProcedureValidator::validate_new(&value),
            Err(ValidationError::MissingField("SK"))
        );
    }

    #[test]
    fn test_validate_new_non_string_key() {
        let mut value = valid_procedure_json();
        value["PK"] = json!(1);

        assert_eq!(
            ProcedureValidator::validate_new(&value),
            Err(ValidationError::NotAString("PK"))
        );
    }

    #[test]
    fn test_validate_new_empty_prices() {
        let mut value = valid_procedure_json();
        value["prices"] = json!([]);

        assert_eq!(
            ProcedureValidator::validate_new(&value),
            Err(ValidationError::EmptyPrices)
        );
    }

    #[test]
    fn test_validate_new_prices_not_numbers() {
        let mut value = valid_procedure_json();
        value["prices"] = json!([10, "twenty"]);
        assert_eq!(
            ProcedureValidator::validate_new(&value),
            Err(ValidationError::InvalidPrices)
        );

        value["prices"] = json!(10);
        assert_eq!(
            ProcedureValidator::validate_new(&value),
            Err(ValidationError::InvalidPrices)
        );
    }

    #[test]
    fn test_validate_new_multiple_prices_keep_order() {
        let mut value = valid_procedure_json();
        value["prices"] = json!([30, 10.5, 20]);

        let procedure = ProcedureValidator::validate_new(&value).unwrap();
        assert_eq!(
            procedure.prices,
            vec![Price::Integer(30), Price::Decimal(10.5), Price::Integer(20)]
        );
    }

    #[test]
    fn test_validate_new_prices_out_of_range() {
        for price in [json!(1e200), json!(-1e200), json!(1e-200)] {
            let mut value = valid_procedure_json();
            value["prices"] = json!([10, price]);
            assert_eq!(
                ProcedureValidator::validate_new(&value),
                Err(ValidationError::PriceOutOfRange)
            );
        }
    }

    #[test]
    fn test_validate_new_ignores_extra_fields() {
        let mut value = valid_procedure_json();
        value["id"] = json!("x");

        let procedure = ProcedureValidator::validate_new(&value).unwrap();
        assert_eq!(procedure.key(), ProcedureKey::new("cat#1", "proc#1"));
        assert_eq!(serde_json::to_value(&procedure).unwrap(), valid_procedure_json());
    }

    #[test]
    fn test_validate_new_not_an_object() {
        assert_eq!(
            ProcedureValidator::validate_new(&json!("text")),
            Err(ValidationError::NotAnObject)
        );
    }

    // ==================== validate_patch ====================

    #[test]
    fn test_validate_patch_single_field() {
        let (key, patch) = ProcedureValidator::validate_patch(&json!({
            "PK": "cat#1",
            "SK": "proc#1",
            "title": "Full Service"
        }))
        .unwrap();

        assert_eq!(key, ProcedureKey::new("cat#1", "proc#1"));
        assert_eq!(patch.title, Some("Full Service".to_string()));
        assert!(patch.created_at.is_none());
        assert!(patch.prices.is_none());
    }

    #[test]
    fn test_validate_patch_all_fields() {
        let (_, patch) = ProcedureValidator::validate_patch(&json!({
            "PK": "cat#1",
            "SK": "proc#1",
            "title": "Full Service",
            "createdAt": "2024-02-01T00:00:00Z",
            "prices": [99, 120]
        }))
        .unwrap();

        assert_eq!(patch.created_at, Some("2024-02-01T00:00:00Z".to_string()));
        assert_eq!(patch.prices, Some(vec![Price::Integer(99), Price::Integer(120)]));
    }

    #[test]
    fn test_validate_patch_requires_key() {
        assert_eq!(
            ProcedureValidator::validate_patch(&json!({"SK": "proc#1", "title": "x"})),
            Err(ValidationError::MissingField("PK"))
        );
        assert_eq!(
            ProcedureValidator::validate_patch(&json!({"PK": "cat#1", "title": "x"})),
            Err(ValidationError::MissingField("SK"))
        );
    }

    #[test]
    fn test_validate_patch_no_fields() {
        assert_eq!(
            ProcedureValidator::validate_patch(&json!({"PK": "cat#1", "SK": "proc#1"})),
            Err(ValidationError::NoFieldsToUpdate)
        );
    }

    #[test]
    fn test_validate_patch_rejects_empty_supplied_fields() {
        assert_eq!(
            ProcedureValidator::validate_patch(&json!({"PK": "a", "SK": "b", "title": ""})),
            Err(ValidationError::EmptyField("title"))
        );
        assert_eq!(
            ProcedureValidator::validate_patch(&json!({"PK": "a", "SK": "b", "prices": []})),
            Err(ValidationError::EmptyPrices)
        );
    }

    #[test]
    fn test_validate_patch_extra_field_is_not_an_update() {
        // 既知でないフィールドだけでは更新対象にならない
        assert_eq!(
            ProcedureValidator::validate_patch(&json!({"PK": "a", "SK": "b", "cost": 1})),
            Err(ValidationError::NoFieldsToUpdate)
        );

        let (_, patch) = ProcedureValidator::validate_patch(&json!({
            "PK": "a",
            "SK": "b",
            "title": "x",
            "cost": 1
        }))
        .unwrap();
        assert_eq!(patch.title, Some("x".to_string()));
    }

    // ==================== validate_key ====================

    #[test]
    fn test_validate_key_valid() {
        let key = ProcedureValidator::validate_key(&json!({"PK": "cat#1", "SK": "proc#1"})).unwrap();
        assert_eq!(key, ProcedureKey::new("cat#1", "proc#1"));
    }

    #[test]
    fn test_validate_key_missing_sk() {
        assert_eq!(
            ProcedureValidator::validate_key(&json!({"PK": "cat#1"})),
            Err(ValidationError::MissingField("SK"))
        );
    }

    #[test]
    fn test_validate_key_accepts_full_record_body() {
        let key = ProcedureValidator::validate_key(&valid_procedure_json()).unwrap();
        assert_eq!(key, ProcedureKey::new("cat#1", "proc#1"));
    }

    // ==================== エラーメッセージ ====================

    #[test]
    fn test_validation_error_display() {
        assert_eq!(ValidationError::MissingBody.to_string(), "Missing body in request");
        assert_eq!(
            ValidationError::MissingField("title").to_string(),
            "missing required field: title"
        );
        assert_eq!(
            ValidationError::EmptyPrices.to_string(),
            "prices must contain at least one price"
        );
    }
}
