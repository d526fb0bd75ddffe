/// PUT /procedures Lambdaエントリポイント
///
/// ボディの`PK`/`SK`で対象を特定し、指定されたフィールドのみを更新する。
use lambda_http::{Body, Error, Request, Response, run, service_fn};
use procedures::application::ProcedureHandler;
use procedures::infrastructure::{
    DynamoProcedureRepository, ProcedureRepository, ProceduresConfig, init_logging,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_logging();

    let config = ProceduresConfig::from_env().await?;
    let handler = ProcedureHandler::new(DynamoProcedureRepository::from_config(&config));

    info!(table = config.table_name(), "Procedure更新Lambda関数を初期化");

    run(service_fn(|request| handle(&handler, request))).await
}

async fn handle<R>(handler: &ProcedureHandler<R>, request: Request) -> Result<Response<Body>, Error>
where
    R: ProcedureRepository,
{
    info!(
        method = %request.method(),
        path = request.uri().path(),
        body_size = request.body().len(),
        "Procedure更新リクエスト受信"
    );

    let response = handler.handle_update(request.body()).await;

    info!(status = response.status().as_u16(), "レスポンス送信");

    Ok(response.into_http_response()?)
}
