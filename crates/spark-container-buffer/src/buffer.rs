use std::{borrow::Cow, fmt, io::SeekFrom, mem};

use tracing::{debug, trace, warn};

use crate::{
    collection::Collection,
    error::{ContainerBufferError, Result},
    lease::{Acquire, DirectRead, LeaseTicket, PendingAlloc},
    mode::{ModeState, OpenMode},
    position::PositionTracker,
};

/// 未指定时用于日志字段的缓冲标签。
pub const DEFAULT_LABEL: &str = "container";

/// `ContainerBufferCore` 是以单个容器为后备存储的流缓冲核心。
///
/// # 设计动机（Why）
/// - 为上层流框架提供“读不删数据”的内存缓冲：读取只移动 `head`，因此支持任意回退定位；
/// - 写入按需扩容，写定位可以越过当前末尾（缓冲没有真正的“尾”，新写入会继续扩展它）；
/// - 读定位则被 `valid_size` 限制，读头永远不会跑到已提交数据之前。
///
/// # 架构关系（How）
/// - `data`：后备存储，长度即容量，且通常与有效边界相等，只有未提交的 `alloc` 区域会让它暂时更长；
/// - `position`：`head` 与 `valid_size` 的记账器，每次变更后断言不变量；
/// - `state`：模式与开闭状态；
/// - `epoch`：变更纪元，每次改变 `head`/存储/开闭状态都会递增，用于识别过期的直读租约；
/// - `pending`：写侧直写区域的待提交记录。
///
/// # 契约说明（What）
/// - **前置条件**：单一所有者；需要共享时使用 [`ContainerBuffer`](crate::ContainerBuffer)；
/// - **后置条件**：模式不符或已关闭时，所有操作都是无操作并返回 0/`None`，不会 panic；
/// - **不变量**：`head <= valid_size <= capacity`，违反即为本 crate 缺陷。
///
/// # 风险与取舍（Trade-offs）
/// - 读取总是拷贝；需要避免拷贝时使用 [`acquire`](Self::acquire)/[`release`](Self::release)。
/// - 写定位越界会按目标位置扩容并以默认值填充空洞，极大的目标位置意味着同等规模的分配。
pub struct ContainerBufferCore<C: Collection> {
    data: C,
    position: PositionTracker,
    state: ModeState,
    epoch: u64,
    pending: Option<PendingAlloc>,
    label: Cow<'static, str>,
}

impl<C: Collection> ContainerBufferCore<C> {
    /// 以空集合创建缓冲，`head` 与 `valid_size` 均为 0。
    ///
    /// # Errors
    /// 读写同开时返回 [`ContainerBufferError::InvalidConfiguration`]。
    pub fn new(mode: OpenMode) -> Result<Self> {
        Self::from_collection(C::default(), mode)
    }

    /// 以已有集合创建缓冲。
    ///
    /// - 读模式从头开始读；写模式以追加方式从集合末尾开始写；
    /// - `valid_size` 等于集合长度。
    ///
    /// # Errors
    /// 读写同开时返回 [`ContainerBufferError::InvalidConfiguration`]。
    pub fn from_collection(data: C, mode: OpenMode) -> Result<Self> {
        Self::open(data, mode, Cow::Borrowed(DEFAULT_LABEL))
    }

    /// 以 `data` 为初始内容的只读缓冲。
    pub fn reader(data: C) -> Self {
        Self::assemble(data, ModeState::read_only(), Cow::Borrowed(DEFAULT_LABEL))
    }

    /// 空的只写缓冲。
    pub fn writer() -> Self {
        Self::assemble(
            C::default(),
            ModeState::write_only(),
            Cow::Borrowed(DEFAULT_LABEL),
        )
    }

    pub(crate) fn open(data: C, mode: OpenMode, label: Cow<'static, str>) -> Result<Self> {
        let state = ModeState::new(mode).inspect_err(|err| {
            warn!(%label, code = err.code(), %mode, "rejected container buffer configuration");
        })?;
        Ok(Self::assemble(data, state, label))
    }

    fn assemble(data: C, state: ModeState, label: Cow<'static, str>) -> Self {
        let len = data.len();
        let head = if state.mode().is_in() { 0 } else { len };
        let core = Self {
            data,
            position: PositionTracker::new(head, len),
            state,
            epoch: 0,
            pending: None,
            label,
        };
        core.position.check(core.data.len());
        debug!(label = %core.label, mode = %state.mode(), len, "container buffer opened");
        core
    }

    /// 设置日志标签。
    #[must_use]
    pub fn with_label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = label.into();
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn mode(&self) -> OpenMode {
        self.state.mode()
    }

    pub fn can_read(&self) -> bool {
        self.state.can_read()
    }

    pub fn can_write(&self) -> bool {
        self.state.can_write()
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    /// 只要仍有任一方向开启即可定位。
    pub fn can_seek(&self) -> bool {
        self.state.is_open()
    }

    pub fn head(&self) -> usize {
        self.position.head()
    }

    pub fn valid_size(&self) -> usize {
        self.position.valid_size()
    }

    /// 后备存储的当前长度。
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// 当前变更纪元。
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// 无需等待即可读取的元素数。
    pub fn in_avail(&self) -> usize {
        self.position.available()
    }

    /// 内存缓冲不做内部分段缓冲，恒为 0。
    pub fn buffer_size(&self, _direction: OpenMode) -> usize {
        0
    }

    /// 内存缓冲忽略分段缓冲设置。
    pub fn set_buffer_size(&mut self, size: usize, direction: OpenMode) {
        trace!(label = %self.label, size, %direction, "buffer size hint ignored");
    }

    /// 数据已在内存中，同步总是成功。
    pub fn sync(&mut self) -> bool {
        true
    }

    /// 后备集合的只读视图。
    pub fn collection(&self) -> &C {
        &self.data
    }

    /// 交出后备集合并把缓冲置为两侧关闭的空缓冲。
    ///
    /// 交出的集合只包含有效数据，未提交的直写区域会被截掉。
    pub fn take_collection(&mut self) -> C {
        self.close(OpenMode::IN | OpenMode::OUT);
        self.trim_uncommitted();
        self.position = PositionTracker::default();
        mem::take(&mut self.data)
    }

    /// 拷贝读取 `dst.len()` 个元素，允许部分读取。
    ///
    /// - 不可读或无可读数据时返回 0；
    /// - `advance` 为假时只拷贝不移动读头。
    pub fn read(&mut self, dst: &mut [C::Elem], advance: bool) -> usize {
        let count = self.copy_out(dst);
        if advance && count > 0 {
            let new_head = self.position.head() + count;
            self.move_head(new_head);
        }
        count
    }

    /// 与 `read(dst, false)` 等价的只读拷贝。
    pub fn copy_out(&self, dst: &mut [C::Elem]) -> usize {
        if !self.state.can_read() {
            return 0;
        }
        let count = dst.len().min(self.position.available());
        if count == 0 {
            return 0;
        }
        let start = self.position.head();
        dst[..count].copy_from_slice(&self.data.as_slice()[start..start + count]);
        count
    }

    /// 读取单个元素，无数据时返回 `None`（流结束哨兵）。
    pub fn read_one(&mut self, advance: bool) -> Option<C::Elem> {
        let mut slot = [C::Elem::default()];
        (self.read(&mut slot, advance) == 1).then_some(slot[0])
    }

    /// 前移一个元素后查看下一个元素。
    pub fn nextc(&mut self) -> Option<C::Elem> {
        self.read_one(true);
        self.read_one(false)
    }

    /// 读头回退一个元素并查看该元素。
    pub fn ungetc(&mut self) -> Option<C::Elem> {
        self.seekoff(SeekFrom::Current(-1), OpenMode::IN)?;
        self.read_one(false)
    }

    /// 在 `head` 处写入整个 `src`，必要时扩容。
    ///
    /// 写入要么整体成功，要么因模式、位置溢出或扩容失败整体被拒绝（返回 0），不存在部分写入。
    pub fn write(&mut self, src: &[C::Elem]) -> usize {
        if !self.state.can_write() || src.is_empty() {
            return 0;
        }
        let head = self.position.head();
        let Some(end) = head.checked_add(src.len()) else {
            warn!(label = %self.label, head, count = src.len(), "write rejected: position overflow");
            return 0;
        };
        self.trim_uncommitted();
        if !self.resize_for_write(end) {
            return 0;
        }
        self.data.as_mut_slice()[head..end].copy_from_slice(src);
        self.move_head(end);
        src.len()
    }

    /// 写入单个元素，成功时原样返回该元素。
    pub fn putc(&mut self, value: C::Elem) -> Option<C::Elem> {
        (self.write(&[value]) == 1).then_some(value)
    }

    /// 定位到绝对位置。
    ///
    /// - 读方向：仅当 `position <= valid_size` 时生效；
    /// - 写方向：按需扩容后生效，目标长度无法分配时拒绝；
    /// - 两个方向都无法满足时返回 `None`，读写头不变。
    pub fn seekpos(&mut self, position: usize, direction: OpenMode) -> Option<usize> {
        if direction.is_in() && self.state.can_read() && position <= self.position.valid_size() {
            self.move_head(position);
            return Some(position);
        }
        if direction.is_out() && self.state.can_write() {
            self.trim_uncommitted();
            if self.resize_for_write(position) {
                self.move_head(position);
                return Some(position);
            }
        }
        trace!(
            label = %self.label,
            position,
            %direction,
            valid_size = self.position.valid_size(),
            "seek rejected"
        );
        None
    }

    /// 相对定位：`End` 以当前有效边界为末尾，解析为负数或溢出时返回 `None`。
    pub fn seekoff(&mut self, target: SeekFrom, direction: OpenMode) -> Option<usize> {
        let resolved = match target {
            SeekFrom::Start(offset) => usize::try_from(offset).ok(),
            SeekFrom::Current(offset) => offset_from(self.position.head(), offset),
            SeekFrom::End(offset) => offset_from(self.position.valid_size(), offset),
        };
        match resolved {
            Some(position) => self.seekpos(position, direction),
            None => {
                trace!(label = %self.label, ?target, "seek rejected: unresolvable offset");
                None
            }
        }
    }

    /// 借出 `head` 起的全部可读数据，不做拷贝。
    pub fn acquire(&self) -> Acquire<DirectRead<'_, C::Elem>> {
        if !self.state.mode().is_in() {
            return Acquire::Refused;
        }
        if !self.state.can_read() {
            return Acquire::EndOfStream;
        }
        let available = self.position.available();
        if available == 0 {
            return Acquire::Retry;
        }
        let head = self.position.head();
        let slice = &self.data.as_slice()[head..head + available];
        Acquire::Granted(DirectRead::new(
            slice,
            LeaseTicket::new(self.epoch, head, available),
        ))
    }

    /// 归还直读租约并把读头推进 `count`，返回新的读头。
    ///
    /// # Errors
    /// - 租约签发后缓冲发生过变更：[`ContainerBufferError::StaleLease`]；
    /// - `count` 超过授予长度：[`ContainerBufferError::LeaseOverrun`]。
    pub fn release(&mut self, ticket: LeaseTicket, count: usize) -> Result<usize> {
        if ticket.epoch() != self.epoch {
            let err = ContainerBufferError::StaleLease {
                issued: ticket.epoch(),
                current: self.epoch,
            };
            warn!(label = %self.label, code = err.code(), "stale direct-access lease released");
            return Err(err);
        }
        if count > ticket.len() {
            let err = ContainerBufferError::LeaseOverrun {
                requested: count,
                granted: ticket.len(),
            };
            warn!(label = %self.label, code = err.code(), "direct-access lease overrun");
            return Err(err);
        }
        let new_head = ticket.offset() + count;
        self.move_head(new_head);
        Ok(new_head)
    }

    /// 在 `head` 处预留 `count` 个元素的可写区域，供调用方原地填充。
    ///
    /// 不可写、位置溢出或扩容失败时返回 `None`；填充后以 [`commit`](Self::commit) 宣告实际写入量。
    /// 新的预留会作废尚未提交的旧预留。
    pub fn alloc(&mut self, count: usize) -> Option<&mut [C::Elem]> {
        if !self.state.can_write() {
            return None;
        }
        let head = self.position.head();
        let end = head.checked_add(count)?;
        self.trim_uncommitted();
        if !self.resize_for_write(end) {
            return None;
        }
        self.bump_epoch();
        self.pending = Some(PendingAlloc {
            epoch: self.epoch,
            len: count,
        });
        Some(&mut self.data.as_mut_slice()[head..end])
    }

    /// 提交最近一次 `alloc` 中实际写入的 `actual` 个元素。
    ///
    /// # Errors
    /// - 没有待提交区域：[`ContainerBufferError::NoPendingAllocation`]；
    /// - 预留后缓冲又被修改：[`ContainerBufferError::StaleLease`]，未提交区域被截掉；
    /// - `actual` 超过预留长度：[`ContainerBufferError::LeaseOverrun`]，预留保持有效，
    ///   可以重新提交或以 [`cancel_alloc`](Self::cancel_alloc) 放弃。
    pub fn commit(&mut self, actual: usize) -> Result<usize> {
        let pending = self
            .pending
            .take()
            .ok_or(ContainerBufferError::NoPendingAllocation)?;
        if pending.epoch != self.epoch {
            self.trim_uncommitted();
            return Err(ContainerBufferError::StaleLease {
                issued: pending.epoch,
                current: self.epoch,
            });
        }
        if actual > pending.len {
            self.pending = Some(pending);
            return Err(ContainerBufferError::LeaseOverrun {
                requested: actual,
                granted: pending.len,
            });
        }
        let new_head = self.position.head() + actual;
        self.move_head(new_head);
        self.trim_uncommitted();
        Ok(actual)
    }

    /// 放弃尚未提交的预留，截掉越过有效边界的部分，返回是否存在预留。
    ///
    /// 预留区域落在有效边界以内的部分已经被原地改写，不会恢复。
    pub fn cancel_alloc(&mut self) -> bool {
        let had_pending = self.pending.take().is_some();
        self.trim_uncommitted();
        had_pending
    }

    pub fn close_read(&mut self) -> bool {
        self.close(OpenMode::IN)
    }

    pub fn close_write(&mut self) -> bool {
        self.close(OpenMode::OUT)
    }

    /// 关闭指定方向；任何状态变化都会作废未归还的租约。
    pub fn close(&mut self, direction: OpenMode) -> bool {
        let changed = self.state.close(direction);
        if changed {
            self.bump_epoch();
            self.pending = None;
            self.trim_uncommitted();
            debug!(
                label = %self.label,
                %direction,
                open = self.state.is_open(),
                "container buffer closed"
            );
        }
        changed
    }

    /// 按写位置扩容，分配失败时返回 `false` 且存储不变。
    fn resize_for_write(&mut self, new_position: usize) -> bool {
        // 存储长度跟随有效边界，只在越过 valid_size 时调整。
        if new_position <= self.position.valid_size() || new_position == self.data.len() {
            return true;
        }
        trace!(
            label = %self.label,
            from = self.data.len(),
            to = new_position,
            "resizing backing store"
        );
        if self.data.try_resize(new_position) {
            return true;
        }
        warn!(
            label = %self.label,
            from = self.data.len(),
            to = new_position,
            "backing store growth refused"
        );
        false
    }

    /// 截掉越过 `valid_size` 的未提交区域。
    ///
    /// 只有 `alloc` 会让存储长于有效边界；截断属于存储变更，会推进纪元使旧预留失效。
    fn trim_uncommitted(&mut self) {
        let valid_size = self.position.valid_size();
        if self.data.len() > valid_size {
            trace!(
                label = %self.label,
                from = self.data.len(),
                to = valid_size,
                "dropping uncommitted tail"
            );
            self.data.resize(valid_size);
            self.bump_epoch();
        }
    }

    fn move_head(&mut self, new_head: usize) {
        self.position.advance(new_head, self.state.can_write());
        self.bump_epoch();
        self.position.check(self.data.len());
    }

    fn bump_epoch(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
    }
}

fn offset_from(base: usize, offset: i64) -> Option<usize> {
    base.checked_add_signed(isize::try_from(offset).ok()?)
}

impl<C: Collection> fmt::Debug for ContainerBufferCore<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerBufferCore")
            .field("label", &self.label)
            .field("mode", &self.state.mode())
            .field("open", &self.state.is_open())
            .field("head", &self.position.head())
            .field("valid_size", &self.position.valid_size())
            .field("capacity", &self.data.len())
            .field("epoch", &self.epoch)
            .finish()
    }
}
