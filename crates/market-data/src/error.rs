//! 데이터 모듈 오류 타입.

use std::fmt;

use thiserror::Error;

/// 스키마 객체 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaObject {
    Table,
    Index,
    View,
}

impl fmt::Display for SchemaObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Table => "table",
            Self::Index => "index",
            Self::View => "view",
        })
    }
}

/// 개별 스키마 객체 생성 실패.
///
/// 프로비저너는 이 에러를 기록만 하고 나머지 객체를 계속 생성합니다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to create {object} {name}: {message}")]
pub struct SchemaError {
    pub object: SchemaObject,
    pub name: String,
    pub message: String,
}

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 데이터베이스 연결 오류
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    /// 쿼리 실행 오류
    #[error("Query error: {0}")]
    QueryError(String),

    /// 중복 레코드 (PostgreSQL 23505)
    #[error("Duplicate record: {0}")]
    DuplicateError(String),

    /// 스키마 생성 오류
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// 연결 풀 소진
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// 타임아웃 오류
    #[error("Operation timeout: {0}")]
    Timeout(String),

    /// 잘못된 데이터 형식
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl DataError {
    /// 이미 저장된 자연 키와의 충돌인지 확인합니다.
    ///
    /// 재시도된 주기가 겹치는 캔들을 다시 저장하는 경우이며 정상 동작입니다.
    pub fn is_conflict(&self) -> bool {
        matches!(self, DataError::DuplicateError(_))
    }
}

impl From<sqlx::Error> for DataError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => DataError::PoolExhausted,
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().unwrap_or_default();
                if code == "23505" {
                    // PostgreSQL 고유 제약 조건 위반
                    DataError::DuplicateError(db_err.message().to_string())
                } else {
                    DataError::QueryError(db_err.message().to_string())
                }
            }
            _ => DataError::QueryError(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
