/// DynamoDBでProcedureを管理するためのリポジトリ
///
/// 一意性・存在チェックはすべてDynamoDBの条件付き書き込みに委ね、
/// 1リクエストにつきストアへの呼び出しは1回のみとする。
use async_trait::async_trait;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use thiserror::Error;
use tracing::{debug, warn};

use super::config::ProceduresConfig;
use super::procedure_item::{
    ATTR_PK, ATTR_SK, CONDITION_KEY_EXISTS, CONDITION_KEY_NOT_EXISTS, build_update_expression,
    procedure_from_item, procedure_to_item,
};
use crate::domain::{Procedure, ProcedureKey, ProcedurePatch, ScanLimit};

/// リポジトリ操作のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RepositoryError {
    /// 対象のキーが存在しない（更新・削除）
    #[error("Procedure not found: {0}")]
    NotFound(ProcedureKey),

    /// 同じキーのレコードが既に存在する（作成）
    #[error("Procedure already exists: {0}")]
    AlreadyExists(ProcedureKey),

    /// DynamoDBへの書き込みに失敗
    #[error("Write error: {0}")]
    WriteError(String),

    /// DynamoDBからの読み取りに失敗
    #[error("Read error: {0}")]
    ReadError(String),

    /// 属性マップとProcedureの変換に失敗
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Procedure永続化用トレイト
///
/// 実際のDynamoDB実装とインメモリ実装（テスト・ローカル用）を差し替えられるようにする。
#[async_trait]
pub trait ProcedureRepository: Send + Sync {
    /// キーで1件取得
    ///
    /// * 見つかった場合は`Ok(Some(Procedure))`
    /// * 見つからなかった場合は`Ok(None)`
    async fn get(&self, key: &ProcedureKey) -> Result<Option<Procedure>, RepositoryError>;

    /// 新規作成
    ///
    /// 同じキーが存在する場合は上書きせず`Err(RepositoryError::AlreadyExists)`
    async fn create(&self, procedure: &Procedure) -> Result<(), RepositoryError>;

    /// 部分更新
    ///
    /// 指定されたフィールドのみを変更し、更新後のレコードを返す。
    /// キーが存在しない場合は`Err(RepositoryError::NotFound)`
    async fn update(
        &self,
        key: &ProcedureKey,
        patch: &ProcedurePatch,
    ) -> Result<Procedure, RepositoryError>;

    /// 削除
    ///
    /// キーが存在しない場合は`Err(RepositoryError::NotFound)`
    async fn delete(&self, key: &ProcedureKey) -> Result<(), RepositoryError>;

    /// 件数上限付きのScan（1ページのみ、順序はストア依存）
    async fn scan(&self, limit: ScanLimit) -> Result<Vec<Procedure>, RepositoryError>;
}

/// ProcedureRepositoryのDynamoDB実装
#[derive(Debug, Clone)]
pub struct DynamoProcedureRepository {
    /// DynamoDBクライアント
    client: DynamoDbClient,
    /// Proceduresテーブル名
    table_name: String,
}

impl DynamoProcedureRepository {
    /// 新しいDynamoProcedureRepositoryを作成
    pub fn new(client: DynamoDbClient, table_name: String) -> Self {
        Self { client, table_name }
    }

    /// 設定から作成
    pub fn from_config(config: &ProceduresConfig) -> Self {
        Self::new(config.client().clone(), config.table_name().to_string())
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

#[async_trait]
impl ProcedureRepository for DynamoProcedureRepository {
    async fn get(&self, key: &ProcedureKey) -> Result<Option<Procedure>, RepositoryError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(ATTR_PK, AttributeValue::S(key.pk.clone()))
            .key(ATTR_SK, AttributeValue::S(key.sk.clone()))
            .send()
            .await
            .map_err(|e| RepositoryError::ReadError(e.into_service_error().to_string()))?;

        result.item.as_ref().map(procedure_from_item).transpose()
    }

    async fn create(&self, procedure: &Procedure) -> Result<(), RepositoryError> {
        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(procedure_to_item(procedure)))
            .condition_expression(CONDITION_KEY_NOT_EXISTS)
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) => {
                let service_error = err.into_service_error();
                if service_error.is_conditional_check_failed_exception() {
                    return Err(RepositoryError::AlreadyExists(procedure.key()));
                }
                Err(RepositoryError::WriteError(service_error.to_string()))
            }
        }
    }

    async fn update(
        &self,
        key: &ProcedureKey,
        patch: &ProcedurePatch,
    ) -> Result<Procedure, RepositoryError> {
        let update = build_update_expression(patch).ok_or_else(|| {
            RepositoryError::WriteError("update requires at least one field".to_string())
        })?;

        debug!(
            table = %self.table_name,
            expression = %update.expression,
            "UpdateItem実行"
        );

        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(ATTR_PK, AttributeValue::S(key.pk.clone()))
            .key(ATTR_SK, AttributeValue::S(key.sk.clone()))
            .update_expression(update.expression)
            .set_expression_attribute_names(Some(update.names))
            .set_expression_attribute_values(Some(update.values))
            .condition_expression(CONDITION_KEY_EXISTS)
            .return_values(ReturnValue::AllNew)
            .send()
            .await;

        match result {
            Ok(output) => {
                let attributes = output.attributes.ok_or_else(|| {
                    RepositoryError::SerializationError(
                        "UpdateItem returned no attributes".to_string(),
                    )
                })?;
                procedure_from_item(&attributes)
            }
            Err(err) => {
                let service_error = err.into_service_error();
                if service_error.is_conditional_check_failed_exception() {
                    return Err(RepositoryError::NotFound(key.clone()));
                }
                Err(RepositoryError::WriteError(service_error.to_string()))
            }
        }
    }

    async fn delete(&self, key: &ProcedureKey) -> Result<(), RepositoryError> {
        let result = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .key(ATTR_PK, AttributeValue::S(key.pk.clone()))
            .key(ATTR_SK, AttributeValue::S(key.sk.clone()))
            .condition_expression(CONDITION_KEY_EXISTS)
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) => {
                let service_error = err.into_service_error();
                if service_error.is_conditional_check_failed_exception() {
                    return Err(RepositoryError::NotFound(key.clone()));
                }
                Err(RepositoryError::WriteError(service_error.to_string()))
            }
        }
    }

    async fn scan(&self, limit: ScanLimit) -> Result<Vec<Procedure>, RepositoryError> {
        let result = self
            .client
            .scan()
            .table_name(&self.table_name)
            .limit(limit.get() as i32)
            .send()
            .await
            .map_err(|e| RepositoryError::ReadError(e.into_service_error().to_string()))?;

        let items = result.items.unwrap_or_default();
        let mut procedures = Vec::with_capacity(items.len());

        for item in &items {
            match procedure_from_item(item) {
                Ok(procedure) => procedures.push(procedure),
                Err(err) => {
                    // 壊れたレコード1件でページ全体を失敗させない
                    let pk = item
                        .get(ATTR_PK)
                        .and_then(|v| v.as_s().ok())
                        .map(String::as_str)
                        .unwrap_or("unknown");
                    warn!(
                        table = %self.table_name,
                        pk = pk,
                        error = %err,
                        "Procedureとして解釈できないアイテムをスキップ"
                    );
                }
            }
        }

        Ok(procedures)
    }
}
