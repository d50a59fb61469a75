use std::{fmt, ops::Deref, sync::Arc};

use spin::{Mutex, MutexGuard};
use tracing::debug;

use crate::{
    buffer::ContainerBufferCore,
    collection::Collection,
    error::Result,
    lease::{Acquire, LeaseTicket},
    mode::OpenMode,
};

/// `ContainerBuffer` 是容器缓冲核心的引用计数句柄。
///
/// # 设计动机（Why）
/// - 输入流、输出流以及需要检查后备集合的代码往往同时持有同一块缓冲，
///   句柄让它们共享并扩展同一个后备存储；
/// - 核心本身保持单一所有者语义，句柄是唯一的共享访问机制。
///
/// # 架构关系（How）
/// - `Arc<Shared>` 记录持有者数量，`Shared` 内以 `spin::Mutex` 包裹核心，
///   每次调用在锁内完成，调用顺序即程序顺序；
/// - 最后一个句柄释放时，`Shared::drop` 先关闭读侧再关闭写侧，纪元推进使所有未归还的租约失效。
///
/// # 契约说明（What）
/// - **线程模型**：锁只用于满足别名规则，缓冲仍假定“同一时刻一个写者”；
/// - **后置条件**：克隆出的句柄观察到的是同一份状态。
///
/// # 风险与取舍（Trade-offs）
/// - 使用自旋锁而非阻塞锁，与池化缓冲保持一致；持有 [`DirectReadGuard`] 或
///   [`CollectionGuard`] 时在同一线程再调用句柄的任何方法都会自旋不止，守卫应尽快释放。
pub struct ContainerBuffer<C: Collection> {
    shared: Arc<Shared<C>>,
}

struct Shared<C: Collection> {
    core: Mutex<ContainerBufferCore<C>>,
}

impl<C: Collection> Drop for Shared<C> {
    fn drop(&mut self) {
        let core = self.core.get_mut();
        core.close_read();
        core.close_write();
        debug!(label = %core.label(), "container buffer released");
    }
}

impl<C: Collection> Clone for ContainerBuffer<C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<C: Collection> ContainerBuffer<C> {
    /// 接管一个已构造的核心。
    pub fn from_core(core: ContainerBufferCore<C>) -> Self {
        Self {
            shared: Arc::new(Shared {
                core: Mutex::new(core),
            }),
        }
    }

    /// 以已有集合与模式创建缓冲。
    ///
    /// # Errors
    /// 读写同开时返回 [`ContainerBufferError::InvalidConfiguration`](crate::ContainerBufferError::InvalidConfiguration)。
    pub fn from_collection(data: C, mode: OpenMode) -> Result<Self> {
        ContainerBufferCore::from_collection(data, mode).map(Self::from_core)
    }

    /// 以空集合与模式创建缓冲。
    ///
    /// # Errors
    /// 同 [`from_collection`](Self::from_collection)。
    pub fn new(mode: OpenMode) -> Result<Self> {
        ContainerBufferCore::new(mode).map(Self::from_core)
    }

    /// 读取 `data` 的只读缓冲。
    pub fn reader(data: C) -> Self {
        Self::from_core(ContainerBufferCore::reader(data))
    }

    /// 空的只写缓冲。
    pub fn writer() -> Self {
        Self::from_core(ContainerBufferCore::writer())
    }

    /// 在锁内对核心执行 `f`。
    pub fn with_core<R>(&self, f: impl FnOnce(&mut ContainerBufferCore<C>) -> R) -> R {
        f(&mut self.shared.core.lock())
    }

    pub fn head(&self) -> usize {
        self.with_core(|core| core.head())
    }

    pub fn valid_size(&self) -> usize {
        self.with_core(|core| core.valid_size())
    }

    pub fn capacity(&self) -> usize {
        self.with_core(|core| core.capacity())
    }

    /// 直读 `head` 起的全部可读数据。
    ///
    /// 授予的守卫持有缓冲锁，消费后调用 [`DirectReadGuard::release`] 推进读头；
    /// 直接丢弃守卫等同于归还 0 个元素，但不推进纪元。
    pub fn acquire(&self) -> Acquire<DirectReadGuard<'_, C>> {
        let guard = self.shared.core.lock();
        let outcome = guard.acquire().map(|view| view.ticket());
        outcome.map(|ticket| DirectReadGuard { guard, ticket })
    }

    /// 以凭据归还先前丢弃守卫时记下的租约。
    ///
    /// # Errors
    /// 见 [`ContainerBufferCore::release`]。
    pub fn release(&self, ticket: LeaseTicket, count: usize) -> Result<usize> {
        self.with_core(|core| core.release(ticket, count))
    }

    /// 在写头处预留 `count` 个元素交给 `fill` 原地填充，按其返回值提交。
    ///
    /// 缓冲不可写或无法扩容时不会调用 `fill`，直接返回 `Ok(0)`。
    ///
    /// # Errors
    /// `fill` 返回值超过 `count` 时返回 [`ContainerBufferError::LeaseOverrun`](crate::ContainerBufferError::LeaseOverrun)，
    /// 此时预留被放弃，越过有效边界的填充内容不会留在集合中。
    pub fn alloc_with(
        &self,
        count: usize,
        fill: impl FnOnce(&mut [C::Elem]) -> usize,
    ) -> Result<usize> {
        self.with_core(|core| {
            let Some(region) = core.alloc(count) else {
                return Ok(0);
            };
            let written = fill(region);
            let committed = core.commit(written);
            if committed.is_err() {
                core.cancel_alloc();
            }
            committed
        })
    }

    /// 后备集合的只读守卫。
    pub fn collection(&self) -> CollectionGuard<'_, C> {
        CollectionGuard {
            guard: self.shared.core.lock(),
        }
    }

    /// 克隆一份后备集合。
    pub fn collection_cloned(&self) -> C
    where
        C: Clone,
    {
        self.with_core(|core| core.collection().clone())
    }

    /// 当前句柄是最后一个持有者时交出后备集合，否则原样返还句柄。
    ///
    /// # Errors
    /// 仍有其它句柄存活时返回 `Err(self)`。
    pub fn try_into_collection(self) -> core::result::Result<C, Self> {
        match Arc::try_unwrap(self.shared) {
            Ok(mut shared) => Ok(shared.core.get_mut().take_collection()),
            Err(shared) => Err(Self { shared }),
        }
    }

    /// 共享同一核心的句柄数。
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.shared)
    }

    /// 两个句柄是否指向同一核心。
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl<C: Collection> fmt::Debug for ContainerBuffer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.shared.core.try_lock() {
            Some(core) => f.debug_tuple("ContainerBuffer").field(&*core).finish(),
            None => f.write_str("ContainerBuffer(<locked>)"),
        }
    }
}

/// 持锁的直读视图。
///
/// # 契约说明（What）
/// - 守卫存活期间其它调用方无法修改缓冲，视图始终有效；
/// - [`release`](Self::release) 消耗守卫并推进读头。
pub struct DirectReadGuard<'a, C: Collection> {
    guard: MutexGuard<'a, ContainerBufferCore<C>>,
    ticket: LeaseTicket,
}

impl<C: Collection> DirectReadGuard<'_, C> {
    pub fn as_slice(&self) -> &[C::Elem] {
        let start = self.ticket.offset();
        &self.guard.collection().as_slice()[start..start + self.ticket.len()]
    }

    pub fn ticket(&self) -> LeaseTicket {
        self.ticket
    }

    /// 归还租约，读头前移 `count`，返回新的读头。
    ///
    /// # Errors
    /// `count` 超过授予长度时返回 [`ContainerBufferError::LeaseOverrun`](crate::ContainerBufferError::LeaseOverrun)。
    pub fn release(self, count: usize) -> Result<usize> {
        let DirectReadGuard { mut guard, ticket } = self;
        guard.release(ticket, count)
    }
}

impl<C: Collection> Deref for DirectReadGuard<'_, C> {
    type Target = [C::Elem];

    fn deref(&self) -> &[C::Elem] {
        self.as_slice()
    }
}

impl<C: Collection> fmt::Debug for DirectReadGuard<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectReadGuard")
            .field("ticket", &self.ticket)
            .finish_non_exhaustive()
    }
}

/// 持锁的后备集合视图。
pub struct CollectionGuard<'a, C: Collection> {
    guard: MutexGuard<'a, ContainerBufferCore<C>>,
}

impl<C: Collection> Deref for CollectionGuard<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.guard.collection()
    }
}

impl<C: Collection + fmt::Debug> fmt::Debug for CollectionGuard<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}
