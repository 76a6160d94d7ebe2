use axum::{http::StatusCode, response::IntoResponse, Json};

use crate::store::StoreError;
use crate::tokenizer::TokenizeError;

/// 业务层统一错误
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// 未知语言/类型、空查询等, 在访问存储之前就拒绝
    #[error("{0}")]
    Validation(String),

    #[error("tokenization failed: {0}")]
    Tokenization(TokenizeError),

    #[error("storage error: {0}")]
    Storage(StoreError),

    #[error("not found")]
    NotFound,

    #[error("config error: {0}")]
    Config(String),
}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => Error::NotFound,
            e => Error::Storage(e),
        }
    }
}

impl From<TokenizeError> for Error {
    fn from(e: TokenizeError) -> Self {
        match e {
            // 语言不存在是请求本身的问题
            TokenizeError::UnknownLang(id) => Error::Validation(format!("unknown language '{}'", id)),
            e => Error::Tokenization(e),
        }
    }
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::Tokenization(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Storage(_) | Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let message = match &self {
            // 服务端错误只记日志, 不把细节返回给调用方
            Error::Storage(e) => {
                tracing::error!("!!! 存储错误: {:?}", e);
                "internal error".to_string()
            }
            Error::Config(e) => {
                tracing::error!("!!! 配置错误: {}", e);
                "internal error".to_string()
            }
            e => e.to_string(),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(Error::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::Tokenization(TokenizeError::Timeout).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            Error::Storage(StoreError::Constraint("dup".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unknown_lang_is_a_client_fault() {
        let e = Error::from(TokenizeError::UnknownLang("tamil".into()));
        assert!(matches!(e, Error::Validation(_)));
        assert!(matches!(Error::from(TokenizeError::Timeout), Error::Tokenization(_)));
    }

    #[test]
    fn test_store_not_found_is_lifted() {
        assert!(matches!(Error::from(StoreError::NotFound), Error::NotFound));
    }
}
