// アプリケーション層モジュール
pub mod api_response;
pub mod procedure_handler;

// 再エクスポート
pub use api_response::ApiResponse;
pub use procedure_handler::{ProcedureHandler, ProcedureHandlerError};
