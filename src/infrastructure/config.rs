/// DynamoDB接続設定
///
/// Lambda関数の初期化時（main）に一度だけ構築し、リポジトリへ注入する。
use aws_sdk_dynamodb::Client as DynamoDbClient;
use thiserror::Error;

/// テーブル名を指定する環境変数
pub const ENV_TABLE_NAME: &str = "TABLE_NAME";

/// 設定読み込みのエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Environment variable is empty: {0}")]
    EmptyEnvVar(String),
}

/// テーブル名とクライアントを持つDynamoDB設定
///
/// - AWS認証情報・リージョン（AWS_REGION）: aws-configにより自動読み込み
/// - TABLE_NAME: Procedures保存用テーブル名
#[derive(Debug, Clone)]
pub struct ProceduresConfig {
    /// DynamoDBクライアントインスタンス
    client: DynamoDbClient,
    /// Proceduresテーブル名
    table_name: String,
}

impl ProceduresConfig {
    /// 環境からAWS設定とテーブル名を読み込んで作成
    pub async fn from_env() -> Result<Self, ConfigError> {
        let table_name = Self::read_env(ENV_TABLE_NAME)?;

        // 環境からAWS設定を読み込み（認証情報、リージョンなど）
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = DynamoDbClient::new(&aws_config);

        Ok(Self { client, table_name })
    }

    /// 明示的な値で作成（テスト用）
    pub fn new(client: DynamoDbClient, table_name: String) -> Self {
        Self { client, table_name }
    }

    /// DynamoDBクライアントへの参照を取得
    pub fn client(&self) -> &DynamoDbClient {
        &self.client
    }

    /// テーブル名を取得
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    fn read_env(key: &str) -> Result<String, ConfigError> {
        let value = std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))?;
        if value.trim().is_empty() {
            return Err(ConfigError::EmptyEnvVar(key.to_string()));
        }
        Ok(value)
    }
}
