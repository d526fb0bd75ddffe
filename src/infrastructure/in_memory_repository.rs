//! インメモリのProcedureRepository実装
//!
//! DynamoDBの条件付き書き込みと同じ意味論（作成時の重複拒否、更新・削除時の存在チェック）を再現する。
//! ハンドラーのテストやローカル実行でDynamoDBの代わりに注入する。

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use super::procedure_repository::{ProcedureRepository, RepositoryError};
use crate::domain::{Procedure, ProcedureKey, ProcedurePatch, ScanLimit};

/// インメモリのProcedureストア
///
/// キー順（PK, SK）に保持するため、Scanの結果順は決定的になる。
#[derive(Debug, Clone, Default)]
pub struct InMemoryProcedureRepository {
    procedures: Arc<RwLock<BTreeMap<ProcedureKey, Procedure>>>,
    /// 次の操作で返すエラー（エラーパスのテスト用）
    next_error: Arc<Mutex<Option<RepositoryError>>>,
}

impl InMemoryProcedureRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 次の1回の操作を指定したエラーで失敗させる
    pub async fn fail_next(&self, error: RepositoryError) {
        *self.next_error.lock().await = Some(error);
    }

    /// 保存されているレコード数
    pub async fn len(&self) -> usize {
        self.procedures.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.procedures.read().await.is_empty()
    }

    async fn take_error(&self) -> Result<(), RepositoryError> {
        match self.next_error.lock().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ProcedureRepository for InMemoryProcedureRepository {
    async fn get(&self, key: &ProcedureKey) -> Result<Option<Procedure>, RepositoryError> {
        self.take_error().await?;
        Ok(self.procedures.read().await.get(key).cloned())
    }

    async fn create(&self, procedure: &Procedure) -> Result<(), RepositoryError> {
        self.take_error().await?;

        let key = procedure.key();
        let mut procedures = self.procedures.write().await;
        if procedures.contains_key(&key) {
            return Err(RepositoryError::AlreadyExists(key));
        }
        procedures.insert(key, procedure.clone());
        Ok(())
    }

    async fn update(
        &self,
        key: &ProcedureKey,
        patch: &ProcedurePatch,
    ) -> Result<Procedure, RepositoryError> {
        self.take_error().await?;

        let mut procedures = self.procedures.write().await;
        let procedure = procedures
            .get_mut(key)
            .ok_or_else(|| RepositoryError::NotFound(key.clone()))?;
        procedure.apply(patch);
        Ok(procedure.clone())
    }

    async fn delete(&self, key: &ProcedureKey) -> Result<(), RepositoryError> {
        self.take_error().await?;

        match self.procedures.write().await.remove(key) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::NotFound(key.clone())),
        }
    }

    async fn scan(&self, limit: ScanLimit) -> Result<Vec<Procedure>, RepositoryError> {
        self.take_error().await?;

        Ok(self
            .procedures
            .read()
            .await
            .values()
            .take(limit.get() as usize)
            .cloned()
            .collect())
    }
}
