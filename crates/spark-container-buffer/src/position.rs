//! 读写头与有效数据边界的记账原语。

/// `PositionTracker` 记录 `head` 与 `valid_size`。
///
/// # 教案式说明
/// - **意图 (Why)**：核心缓冲的读、写、定位最终都落到“把 `head` 移到某处”这一动作上，
///   在同一处维护 `valid_size` 的抬升规则与不变量断言，避免各操作各自记账出现漂移；
/// - **逻辑 (How)**：
///   - `advance(new_head, extend)`：设置 `head`；当 `extend` 为真（写访问）且越过 `valid_size` 时抬升之；
///   - `available()`：`valid_size - head` 的饱和减法；
///   - `check(capacity)`：断言 `head <= valid_size <= capacity`；
/// - **契约 (What)**：所有偏移运算使用饱和或带检查的无符号算术；断言失败代表本 crate 的缺陷，直接 panic。
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PositionTracker {
    head: usize,
    valid_size: usize,
}

impl PositionTracker {
    /// 以给定的读写头与有效边界创建记账器。
    pub fn new(head: usize, valid_size: usize) -> Self {
        Self { head, valid_size }
    }

    pub fn head(&self) -> usize {
        self.head
    }

    pub fn valid_size(&self) -> usize {
        self.valid_size
    }

    /// 剩余可读元素数，`head` 短暂越过 `valid_size` 时返回 0 而非回绕。
    pub fn available(&self) -> usize {
        self.valid_size.saturating_sub(self.head)
    }

    /// 移动读写头。
    pub fn advance(&mut self, new_head: usize, extend: bool) {
        self.head = new_head;
        if extend && self.valid_size < new_head {
            self.valid_size = new_head;
        }
    }

    /// 断言记账不变量。
    ///
    /// # Panics
    /// `head > valid_size` 或 `valid_size > capacity` 时 panic。
    pub fn check(&self, capacity: usize) {
        assert!(
            self.head <= self.valid_size,
            "container buffer head {} ran past valid size {}",
            self.head,
            self.valid_size
        );
        assert!(
            self.valid_size <= capacity,
            "container buffer valid size {} exceeds capacity {}",
            self.valid_size,
            capacity
        );
    }
}
