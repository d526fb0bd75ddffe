/// Procedureリクエストハンドラー
///
/// 一覧・取得・作成・更新・削除の各リクエストを、検証 -> 永続化 -> レスポンス生成の順で処理する。
/// 検証エラーはストアにアクセスせずに返し、ストアのエラーはここでサーバーエラーに変換する。
/// 内部でのリトライは行わない。
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info};

use super::api_response::ApiResponse;
use crate::domain::{Procedure, ProcedureKey, ProcedureValidator, ScanLimit, ValidationError};
use crate::infrastructure::{ProcedureRepository, RepositoryError};

/// ハンドラーのエラー型
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProcedureHandlerError {
    /// リクエストボディの検証エラー（400）
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// 対象のキーが存在しない（404）
    #[error("Procedure not found: {0}")]
    NotFound(ProcedureKey),
    /// 同じキーが既に存在する（409）
    #[error("Procedure already exists: {0}")]
    Conflict(ProcedureKey),
    /// ストアのエラー（500）
    #[error("{0}")]
    Store(String),
}

impl From<RepositoryError> for ProcedureHandlerError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(key) => ProcedureHandlerError::NotFound(key),
            RepositoryError::AlreadyExists(key) => ProcedureHandlerError::Conflict(key),
            other => ProcedureHandlerError::Store(other.to_string()),
        }
    }
}

/// 処理対象の操作（サーバーエラー時のメッセージに使う）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl Operation {
    fn server_error_message(self) -> &'static str {
        match self {
            Operation::List | Operation::Get => "Error retrieving data",
            Operation::Create => "Error creating procedure",
            Operation::Update => "Error updating procedure",
            Operation::Delete => "Error deleting procedure",
        }
    }
}

impl ProcedureHandlerError {
    /// エラーをAPIレスポンスに変換
    pub fn into_response(self, operation: Operation) -> ApiResponse {
        match self {
            ProcedureHandlerError::Validation(ValidationError::MissingBody) => {
                ApiResponse::bad_request(ValidationError::MissingBody.to_string())
            }
            ProcedureHandlerError::Validation(err) => {
                ApiResponse::bad_request(format!("Invalid request body: {}", err))
            }
            err @ ProcedureHandlerError::NotFound(_) => ApiResponse::not_found(err.to_string()),
            err @ ProcedureHandlerError::Conflict(_) => ApiResponse::conflict(err.to_string()),
            ProcedureHandlerError::Store(message) => {
                ApiResponse::server_error(operation.server_error_message(), message)
            }
        }
    }
}

/// Procedureリクエストを処理するハンドラー
///
/// リポジトリはエントリポイントで構築して注入する。
pub struct ProcedureHandler<R>
where
    R: ProcedureRepository,
{
    /// Procedureリポジトリ
    repo: R,
}

impl<R> ProcedureHandler<R>
where
    R: ProcedureRepository,
{
    /// 新しいProcedureHandlerを作成
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// リポジトリへの参照を取得
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// 件数上限付きで一覧を取得
    pub async fn list(&self, limit: ScanLimit) -> Result<Vec<Procedure>, ProcedureHandlerError> {
        Ok(self.repo.scan(limit).await?)
    }

    /// キーで1件取得
    pub async fn get(&self, key: &ProcedureKey) -> Result<Procedure, ProcedureHandlerError> {
        self.repo
            .get(key)
            .await?
            .ok_or_else(|| ProcedureHandlerError::NotFound(key.clone()))
    }

    /// 作成
    ///
    /// # 処理フロー
    /// 1. ボディのパース（空ならMissingBody）
    /// 2. 必須フィールドの検証
    /// 3. 条件付き書き込み（同じキーが存在すればConflict）
    pub async fn create(&self, body: &[u8]) -> Result<Procedure, ProcedureHandlerError> {
        let value = ProcedureValidator::parse_body(body)?;
        let procedure = ProcedureValidator::validate_new(&value)?;

        self.repo.create(&procedure).await?;

        Ok(procedure)
    }

    /// 部分更新
    pub async fn update(&self, body: &[u8]) -> Result<Procedure, ProcedureHandlerError> {
        let value = ProcedureValidator::parse_body(body)?;
        let (key, patch) = ProcedureValidator::validate_patch(&value)?;

        Ok(self.repo.update(&key, &patch).await?)
    }

    /// 削除
    ///
    /// 存在しないキーはNotFound（404）として扱う。
    pub async fn delete(&self, body: &[u8]) -> Result<ProcedureKey, ProcedureHandlerError> {
        let value = ProcedureValidator::parse_body(body)?;
        let key = ProcedureValidator::validate_key(&value)?;

        self.repo.delete(&key).await?;

        Ok(key)
    }

    /// GET（一覧）リクエストを処理
    pub async fn handle_list(&self, limit: ScanLimit) -> ApiResponse {
        debug!(limit = limit.get(), "Procedure一覧取得開始");

        let result = match self.list(limit).await {
            Ok(procedures) => {
                info!(count = procedures.len(), "Procedure一覧取得");
                to_json(&procedures)
            }
            Err(err) => Err(err),
        };

        respond(Operation::List, result, ApiResponse::ok)
    }

    /// GET（キー指定）リクエストを処理
    pub async fn handle_get(&self, key: &ProcedureKey) -> ApiResponse {
        let result = match self.get(key).await {
            Ok(procedure) => to_json(&procedure),
            Err(err) => Err(err),
        };

        respond(Operation::Get, result, ApiResponse::ok)
    }

    /// POSTリクエストを処理
    pub async fn handle_create(&self, body: &[u8]) -> ApiResponse {
        let result = match self.create(body).await {
            Ok(procedure) => {
                info!(pk = %procedure.pk, sk = %procedure.sk, "Procedure作成");
                to_json(&procedure)
            }
            Err(err) => Err(err),
        };

        respond(Operation::Create, result, ApiResponse::created)
    }

    /// PUTリクエストを処理
    pub async fn handle_update(&self, body: &[u8]) -> ApiResponse {
        let result = match self.update(body).await {
            Ok(procedure) => {
                info!(pk = %procedure.pk, sk = %procedure.sk, "Procedure更新");
                to_json(&procedure)
            }
            Err(err) => Err(err),
        };

        respond(Operation::Update, result, ApiResponse::ok)
    }

    /// DELETEリクエストを処理
    pub async fn handle_delete(&self, body: &[u8]) -> ApiResponse {
        match self.delete(body).await {
            Ok(key) => {
                info!(pk = %key.pk, sk = %key.sk, "Procedure削除");
                ApiResponse::no_content()
            }
            Err(err) => {
                log_failure(Operation::Delete, &err);
                err.into_response(Operation::Delete)
            }
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, ProcedureHandlerError> {
    serde_json::to_value(value)
        .map_err(|e| ProcedureHandlerError::Store(format!("Serialization error: {}", e)))
}

fn respond(
    operation: Operation,
    result: Result<Value, ProcedureHandlerError>,
    success: fn(Value) -> ApiResponse,
) -> ApiResponse {
    match result {
        Ok(body) => success(body),
        Err(err) => {
            log_failure(operation, &err);
            err.into_response(operation)
        }
    }
}

/// クライアントエラーはdebug、ストアのエラーはerrorで記録
fn log_failure(operation: Operation, err: &ProcedureHandlerError) {
    match err {
        ProcedureHandlerError::Store(_) => {
            error!(operation = ?operation, error = %err, "ストア操作に失敗");
        }
        _ => {
            debug!(operation = ?operation, error = %err, "リクエストを拒否");
        }
    }
}
