/// GET /procedures Lambdaエントリポイント
///
/// クエリパラメータにPKとSKの両方がある場合は1件取得、それ以外は件数上限付きの一覧取得を行う。
use lambda_http::{Body, Error, Request, RequestExt, Response, run, service_fn};
use procedures::application::ProcedureHandler;
use procedures::domain::{ProcedureKey, ScanLimit};
use procedures::infrastructure::{
    DynamoProcedureRepository, ProcedureRepository, ProceduresConfig, init_logging,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    // DynamoDBクライアントはコールドスタート時に一度だけ構築し、以降のリクエストで再利用する
    let config = ProceduresConfig::from_env().await?;
    let handler = ProcedureHandler::new(DynamoProcedureRepository::from_config(&config));

    info!(table = config.table_name(), "Procedure一覧Lambda関数を初期化");

    run(service_fn(|request| handle(&handler, request))).await
}

/// HTTPリクエストハンドラー
async fn handle<R>(handler: &ProcedureHandler<R>, request: Request) -> Result<Response<Body>, Error>
where
    R: ProcedureRepository,
{
    let params = request.query_string_parameters();
    let param = |name: &str| params.first(name).filter(|v| !v.is_empty());

    info!(
        method = %request.method(),
        path = request.uri().path(),
        "Procedure取得リクエスト受信"
    );

    let response = match (param("PK"), param("SK")) {
        (Some(pk), Some(sk)) => handler.handle_get(&ProcedureKey::new(pk, sk)).await,
        _ => handler.handle_list(ScanLimit::from_query(param("limit"))).await,
    };

    info!(status = response.status().as_u16(), "レスポンス送信");

    Ok(response.into_http_response()?)
}
