use crate::models::QuestionId;

/// 草稿操作错误
///
/// 所有变更操作失败时草稿保持原状，错误只需在本地展示给用户
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    /// 参数不合法（携带全部违反的约束）
    #[error("输入不合法: {}", .0.join("；"))]
    InvalidInput(Vec<String>),

    /// 题目不存在
    #[error("题目 #{id} 不存在")]
    NotFound { id: QuestionId },

    /// 位置越界
    #[error("位置 {index} 超出范围 [0, {len})")]
    OutOfRange { index: usize, len: usize },

    /// 保存/发布前校验未通过
    #[error("校验未通过: {}", .0.join("；"))]
    ValidationFailed(Vec<String>),
}

impl DraftError {
    /// 单条消息的输入错误
    pub fn invalid(message: impl Into<String>) -> Self {
        DraftError::InvalidInput(vec![message.into()])
    }

    /// 返回可直接展示的消息列表
    pub fn messages(&self) -> Vec<String> {
        match self {
            DraftError::InvalidInput(messages) | DraftError::ValidationFailed(messages) => {
                messages.clone()
            }
            other => vec![other.to_string()],
        }
    }
}

/// 存储层错误
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// 超出存储配额
    #[error("存储空间不足: 需要 {needed} 字节, 配额 {quota} 字节")]
    QuotaExceeded { needed: usize, quota: usize },

    /// 读写失败
    #[error("存储读写失败 ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 草稿操作结果类型
pub type DraftResult<T> = Result<T, DraftError>;
