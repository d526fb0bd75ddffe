// APIレスポンス
//
// ハンドラーの処理結果（ステータスコードとJSONボディ）を保持し、
// Lambda HTTPレスポンスへ変換する。エラーボディは以下の形式に統一する:
// - 4xx: {"message": "..."}
// - 5xx: {"message": "...", "error": "..."}

use lambda_http::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_TYPE, HeaderMap, HeaderValue,
};
use lambda_http::http::{self, StatusCode};
use lambda_http::{Body, Response};
use serde_json::{Value, json};

/// ハンドラーの処理結果
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    status: StatusCode,
    body: Option<Value>,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: Option<Value>) -> Self {
        Self { status, body }
    }

    /// 200 OK
    pub fn ok(body: Value) -> Self {
        Self::new(StatusCode::OK, Some(body))
    }

    /// 201 Created
    pub fn created(body: Value) -> Self {
        Self::new(StatusCode::CREATED, Some(body))
    }

    /// 204 No Content（ボディなし）
    pub fn no_content() -> Self {
        Self::new(StatusCode::NO_CONTENT, None)
    }

    /// 400 Bad Request
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::client_error(StatusCode::BAD_REQUEST, message)
    }

    /// 404 Not Found
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::client_error(StatusCode::NOT_FOUND, message)
    }

    /// 409 Conflict
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::client_error(StatusCode::CONFLICT, message)
    }

    /// 500 Internal Server Error
    ///
    /// `error`には原因となったストアのエラーメッセージをそのまま入れる。
    pub fn server_error(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            Some(json!({
                "message": message.into(),
                "error": error.into(),
            })),
        )
    }

    fn client_error(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, Some(json!({ "message": message.into() })))
    }

    /// ステータスコードを取得
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// ボディを取得
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Lambda HTTPレスポンスへ変換
    pub fn into_http_response(self) -> Result<Response<Body>, http::Error> {
        let has_body = self.body.is_some();
        let body = match self.body {
            Some(value) => Body::Text(value.to_string()),
            None => Body::Empty,
        };

        let mut response = Response::builder().status(self.status).body(body)?;
        *response.headers_mut() = Self::build_headers(has_body);

        Ok(response)
    }

    /// レスポンスヘッダーを生成
    ///
    /// API GatewayのCORSプリフライト設定（全オリジン・全メソッド許可）に合わせる。
    /// ボディがある場合のみContent-Type: application/jsonを付与する。
    pub fn build_headers(has_body: bool) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if has_body {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type, X-Api-Key"),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
        );

        headers
    }
}
