//! 打开模式与读写互斥约束。
//!
//! # 设计背景（Why）
//! - 容器缓冲只允许“只读”或“只写”之一，读写同开会让读指针与写指针共用一个 `head`，语义不可判定；
//! - 打开后的关闭动作按方向独立进行，关闭读侧不影响写侧，反之亦然。
//!
//! # 契约说明（What）
//! - [`OpenMode`] 是 `IN`/`OUT` 的位集合，既用于构造也用于 `seek`/`close` 的方向参数；
//! - [`ModeState`] 在构造时校验互斥，随后提供 `can_read`/`can_write`/`is_open` 查询。

use core::{fmt, ops::BitOr};

use crate::error::{ContainerBufferError, Result};

/// 打开模式位集合。
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct OpenMode(u8);

impl OpenMode {
    /// 空集合，表示不请求任何方向。
    pub const NONE: OpenMode = OpenMode(0);
    /// 读方向。
    pub const IN: OpenMode = OpenMode(0b01);
    /// 写方向。
    pub const OUT: OpenMode = OpenMode(0b10);

    /// 是否包含 `other` 的全部方向。
    pub const fn contains(self, other: OpenMode) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    /// 是否包含读方向。
    pub const fn is_in(self) -> bool {
        self.contains(OpenMode::IN)
    }

    /// 是否包含写方向。
    pub const fn is_out(self) -> bool {
        self.contains(OpenMode::OUT)
    }

    /// 是否为空集合。
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for OpenMode {
    type Output = OpenMode;

    fn bitor(self, rhs: OpenMode) -> OpenMode {
        OpenMode(self.0 | rhs.0)
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.is_in(), self.is_out()) {
            (true, true) => f.write_str("in|out"),
            (true, false) => f.write_str("in"),
            (false, true) => f.write_str("out"),
            (false, false) => f.write_str("none"),
        }
    }
}

/// 模式不变量的执行者。
///
/// # 教案式说明
/// - **意图 (Why)**：把“能否读写”的判定集中在一处，核心缓冲的每个操作只需询问 `can_read`/`can_write`；
/// - **逻辑 (How)**：`mode` 固定不变，`read_open`/`write_open` 初始化为模式中对应方向是否存在，
///   `close` 只会把它们从 `true` 置为 `false`；
/// - **契约 (What)**：`is_open() == can_read() || can_write()`；关闭是幂等的；
/// - **风险 (Trade-offs)**：空模式被接受，此时缓冲一出生就是关闭状态，所有操作均为无操作。
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ModeState {
    mode: OpenMode,
    read_open: bool,
    write_open: bool,
}

impl ModeState {
    /// 校验并创建模式状态。
    ///
    /// # Errors
    /// 同时包含 `IN` 与 `OUT` 时返回 [`ContainerBufferError::InvalidConfiguration`]。
    pub fn new(mode: OpenMode) -> Result<Self> {
        validate(mode)?;
        Ok(Self {
            mode,
            read_open: mode.is_in(),
            write_open: mode.is_out(),
        })
    }

    /// 只读模式，无需校验。
    pub const fn read_only() -> Self {
        Self {
            mode: OpenMode::IN,
            read_open: true,
            write_open: false,
        }
    }

    /// 只写模式，无需校验。
    pub const fn write_only() -> Self {
        Self {
            mode: OpenMode::OUT,
            read_open: false,
            write_open: true,
        }
    }

    /// 构造时请求的模式。
    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    pub fn can_read(&self) -> bool {
        self.read_open
    }

    pub fn can_write(&self) -> bool {
        self.write_open
    }

    pub fn is_open(&self) -> bool {
        self.read_open || self.write_open
    }

    /// 关闭 `direction` 指定的方向，返回是否有方向由开转关。
    pub fn close(&mut self, direction: OpenMode) -> bool {
        let mut changed = false;
        if direction.is_in() && self.read_open {
            self.read_open = false;
            changed = true;
        }
        if direction.is_out() && self.write_open {
            self.write_open = false;
            changed = true;
        }
        changed
    }
}

/// 拒绝读写同开的组合。
///
/// # Errors
/// 见 [`ModeState::new`]。
pub fn validate(mode: OpenMode) -> Result<()> {
    if mode.is_in() && mode.is_out() {
        return Err(ContainerBufferError::InvalidConfiguration { mode });
    }
    Ok(())
}
