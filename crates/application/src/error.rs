use domain::DomainError;
use thiserror::Error;

use crate::repository::StorageError;

/// 应用层错误类型。传输层把每个变体映射为对应的协议状态，
/// 任何变体都不应终止进程。
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 非法输入（字段为空、未知消息类别等）
    #[error("invalid input: {0}")]
    Domain(#[from] DomainError),
    /// 名称冲突
    #[error("conflict: {0}")]
    Conflict(String),
    /// 参与者或消息不存在
    #[error("not found: {0}")]
    NotFound(String),
    /// 所有权校验失败
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// 存储协作者不可用，由调用方上报，不在本层重试
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// 应用层结果类型
pub type ApplicationResult<T> = Result<T, ApplicationError>;
