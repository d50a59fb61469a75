//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 集中定义容器缓冲对调用方暴露的“可报告错误”，与仅以哨兵值表达的降级结果（返回 0、`None`、
//!   [`Acquire::Retry`](crate::Acquire::Retry) 等）严格区分；
//! - 每个变体携带稳定错误码，遵循 `<领域>.<语义>` 命名约定，便于在日志与告警中检索。
//!
//! ## 设计要求（What）
//! - 配置错误只会在构造阶段出现，属于致命错误；
//! - 租约相关错误表示调用方违反了零拷贝协议，缓冲状态保持不变；
//! - 内部一致性断言（`head <= valid_size <= capacity`）不属于本模块，违反时直接 panic。

use thiserror::Error;

use crate::mode::OpenMode;

/// 稳定错误码集合。
///
/// # 契约说明（What）
/// - 码值一经发布不得修改，新增语义需追加新常量；
/// - 与 [`ContainerBufferError::code`] 一一对应。
pub mod codes {
    /// 同时请求读与写模式。
    pub const INVALID_CONFIGURATION: &str = "container_buffer.invalid_configuration";
    /// 归还的直读租约已被后续变更作废。
    pub const STALE_LEASE: &str = "container_buffer.stale_lease";
    /// 归还或提交的元素数超过租约授予的范围。
    pub const LEASE_OVERRUN: &str = "container_buffer.lease_overrun";
    /// 调用 `commit` 前未通过 `alloc` 预留写入区域。
    pub const NO_PENDING_ALLOCATION: &str = "container_buffer.no_pending_allocation";
    /// 收割后的集合无法转换为目标文本编码。
    pub const ENCODING: &str = "container_buffer.encoding";
}

/// 容器缓冲错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：把“调用方违约”与“缓冲暂时无数据”区分开，前者必须显式处理，后者通过哨兵值表达；
/// - **契约 (What)**：所有变体满足 `Send + Sync + 'static`，可跨线程传播；`code()` 返回稳定错误码；
/// - **风险 (Trade-offs)**：租约错误不会回滚调用方已经消费的数据，调用方需在收到错误后重新 `acquire`。
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ContainerBufferError {
    /// 构造时同时请求了读与写模式。
    #[error("container buffer cannot be opened for reading and writing at once (mode: {mode})")]
    InvalidConfiguration { mode: OpenMode },

    /// 租约签发后缓冲发生过变更，租约不再有效。
    ///
    /// - **契约 (What)**：`issued` 为租约签发时的纪元，`current` 为缓冲当前纪元。
    #[error("direct-access lease issued at epoch {issued} is stale (current epoch {current})")]
    StaleLease { issued: u64, current: u64 },

    /// 归还/提交的数量超出租约范围。
    #[error("cannot settle {requested} elements against a lease of {granted}")]
    LeaseOverrun { requested: usize, granted: usize },

    /// 没有待提交的写入区域。
    #[error("commit called without a pending allocation")]
    NoPendingAllocation,

    /// 文本收割失败，例如写入的字节不是合法 UTF-8。
    #[error("collection is not valid text: {detail}")]
    Encoding { detail: String },
}

impl ContainerBufferError {
    /// 返回稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            ContainerBufferError::InvalidConfiguration { .. } => codes::INVALID_CONFIGURATION,
            ContainerBufferError::StaleLease { .. } => codes::STALE_LEASE,
            ContainerBufferError::LeaseOverrun { .. } => codes::LEASE_OVERRUN,
            ContainerBufferError::NoPendingAllocation => codes::NO_PENDING_ALLOCATION,
            ContainerBufferError::Encoding { .. } => codes::ENCODING,
        }
    }

    /// 是否由调用方违反零拷贝协议引起。
    pub fn is_lease_violation(&self) -> bool {
        matches!(
            self,
            ContainerBufferError::StaleLease { .. }
                | ContainerBufferError::LeaseOverrun { .. }
                | ContainerBufferError::NoPendingAllocation
        )
    }
}

/// crate 内统一的结果别名。
pub type Result<T, E = ContainerBufferError> = core::result::Result<T, E>;
