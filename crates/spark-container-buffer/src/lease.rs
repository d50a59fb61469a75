//! 零拷贝直读协议的租约类型。
//!
//! # 模块定位（Why）
//! - 高吞吐消费者希望直接在后备存储上解析数据，而非先复制到临时切片；
//! - 直读只是“借”，消费完毕后需要显式 `release` 才会推进读头。
//!
//! # 设计概要（How）
//! - 借用切片的生命周期由编译器约束：切片存活期间无法对缓冲发起任何可变调用；
//! - 归还凭据 [`LeaseTicket`] 则脱离借用独立存在，内含签发时的纪元（epoch）。缓冲的每次变更都会推进纪元，
//!   因此“过期租约”在归还时能够被检测出来，而不是依赖调用方自律。

use core::ops::Deref;

/// 一次直读授予的归还凭据。
///
/// # 契约说明（What）
/// - `epoch`：签发时缓冲的纪元，归还时必须与当前纪元一致；
/// - `offset`：授予区域在后备存储中的起点，即签发时的 `head`；
/// - `len`：授予的元素数，归还数量不得超过该值。
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LeaseTicket {
    epoch: u64,
    offset: usize,
    len: usize,
}

impl LeaseTicket {
    pub(crate) fn new(epoch: u64, offset: usize, len: usize) -> Self {
        Self { epoch, offset, len }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// `acquire` 的结果。
///
/// # 教案式说明
/// - **意图 (Why)**：调用方需要区分“暂时无数据、稍后再试”与“流已终结”，二者都不是错误；
/// - **契约 (What)**：
///   - `Granted`：授予直读视图；
///   - `Retry`：缓冲仍开启但当前无可读数据；
///   - `EndOfStream`：读侧已关闭，不会再有数据；
///   - `Refused`：缓冲不是以读模式打开的。
#[derive(Debug)]
pub enum Acquire<G> {
    Granted(G),
    Retry,
    EndOfStream,
    Refused,
}

impl<G> Acquire<G> {
    pub fn is_granted(&self) -> bool {
        matches!(self, Acquire::Granted(_))
    }

    /// 取出授予的视图，非 `Granted` 时返回 `None`。
    pub fn granted(self) -> Option<G> {
        match self {
            Acquire::Granted(view) => Some(view),
            _ => None,
        }
    }

    /// 对授予的视图做变换，保留其余分支。
    pub fn map<H>(self, f: impl FnOnce(G) -> H) -> Acquire<H> {
        match self {
            Acquire::Granted(view) => Acquire::Granted(f(view)),
            Acquire::Retry => Acquire::Retry,
            Acquire::EndOfStream => Acquire::EndOfStream,
            Acquire::Refused => Acquire::Refused,
        }
    }
}

/// 直接指向后备存储的只读视图。
///
/// 视图借用缓冲核心，存活期间核心无法被修改；消费完毕后用 [`ticket`](Self::ticket)
/// 调用 `release` 推进读头。
#[derive(Debug)]
pub struct DirectRead<'a, E> {
    slice: &'a [E],
    ticket: LeaseTicket,
}

impl<'a, E> DirectRead<'a, E> {
    pub(crate) fn new(slice: &'a [E], ticket: LeaseTicket) -> Self {
        Self { slice, ticket }
    }

    pub fn as_slice(&self) -> &'a [E] {
        self.slice
    }

    pub fn ticket(&self) -> LeaseTicket {
        self.ticket
    }
}

impl<E> Deref for DirectRead<'_, E> {
    type Target = [E];

    fn deref(&self) -> &[E] {
        self.slice
    }
}

/// 写侧直写区域的待提交记录。
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct PendingAlloc {
    pub(crate) epoch: u64,
    pub(crate) len: usize,
}
