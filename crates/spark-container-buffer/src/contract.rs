use core::{future::Future, pin::Pin};
use std::io::SeekFrom;

use crate::mode::OpenMode;

/// `BoxFuture` 是流缓冲契约统一使用的 Future 包装。
///
/// # 契约说明（What）
/// - 约束 Future 为 `Send + 'a`，可安全跨线程。
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// `StreamBuffer` 定义异步流框架对任意流缓冲的统一期望。
///
/// # 设计背景（Why）
/// - 上层的可读/可写流只面向该契约编程，后端可以是内存容器，也可以是真正异步的网络或磁盘缓冲；
/// - 为了让两类后端共用一套调用方式，所有可能挂起的操作都返回 [`BoxFuture`]，
///   即便内存实现总是立即完成。
///
/// # 逻辑解析（How）
/// - 字符级：`putc`/`bumpc`/`getc`/`nextc`/`ungetc`；
/// - 块级：`putn`/`getn`；
/// - 定位：`seekpos`/`seekoff` 为同步调用，返回 `None` 表示流结束哨兵；
/// - 快速路径：`sbumpc`/`sgetc`/`sgetn`/`scopy` 在调用方确认 `in_avail() > 0` 时可免去 Future 开销。
///
/// # 契约说明（What）
/// - **返回值**：元素级操作以 `None` 作为流结束哨兵，块级操作返回实际传输的元素数，0 表示未能传输；
/// - **前置条件**：调用方需自行区分“暂时无数据”与“流已结束”，方法是检查 [`is_open`](Self::is_open)；
/// - **后置条件**：方法返回时状态变更已经生效，返回的 Future 只负责交付结果；
///   调用方无需轮询 Future 即可观察到新的读写头与有效边界。
///
/// # 设计考量（Trade-offs）
/// - 选择对象安全的 `BoxFuture` 而非关联 Future 类型，每次调用多一次堆分配，换取跨组件的动态分发；
/// - 方向参数复用 [`OpenMode`]，与构造模式共享同一套位集合语义。
pub trait StreamBuffer: Send + Sync {
    /// 流中的定宽元素类型。
    type Elem: Copy + Send + Sync + 'static;

    /// 构造时请求的模式。
    fn mode(&self) -> OpenMode;

    fn is_open(&self) -> bool;

    fn can_read(&self) -> bool;

    fn can_write(&self) -> bool;

    fn can_seek(&self) -> bool;

    /// 无需等待即可读取的元素数。
    fn in_avail(&self) -> usize;

    /// 内部分段缓冲的大小，不做分段缓冲的实现返回 0。
    fn buffer_size(&self, direction: OpenMode) -> usize;

    /// 设置内部分段缓冲大小，不支持的实现静默忽略。
    fn set_buffer_size(&self, size: usize, direction: OpenMode);

    /// 写入单个元素，成功时返回该元素。
    fn putc(&self, value: Self::Elem) -> BoxFuture<'_, Option<Self::Elem>>;

    /// 写入 `src` 中的全部元素，返回写入数。
    fn putn<'a>(&'a self, src: &'a [Self::Elem]) -> BoxFuture<'a, usize>;

    /// 读取至多 `dst.len()` 个元素，返回读取数。
    fn getn<'a>(&'a self, dst: &'a mut [Self::Elem]) -> BoxFuture<'a, usize>;

    /// 读取并前移一个元素。
    fn bumpc(&self) -> BoxFuture<'_, Option<Self::Elem>>;

    /// 查看当前元素但不前移。
    fn getc(&self) -> BoxFuture<'_, Option<Self::Elem>>;

    /// 前移一个元素后查看新的当前元素。
    fn nextc(&self) -> BoxFuture<'_, Option<Self::Elem>>;

    /// 回退一个元素并查看它。
    fn ungetc(&self) -> BoxFuture<'_, Option<Self::Elem>>;

    /// 刷新尚未落地的写入。
    fn sync(&self) -> BoxFuture<'_, bool>;

    /// 关闭 `direction` 指定的方向。
    fn close(&self, direction: OpenMode) -> BoxFuture<'_, ()>;

    fn close_read(&self) -> BoxFuture<'_, ()> {
        self.close(OpenMode::IN)
    }

    fn close_write(&self) -> BoxFuture<'_, ()> {
        self.close(OpenMode::OUT)
    }

    /// 同步读取并前移一个元素。
    fn sbumpc(&self) -> Option<Self::Elem>;

    /// 同步查看当前元素。
    fn sgetc(&self) -> Option<Self::Elem>;

    /// 同步读取至多 `dst.len()` 个元素并前移。
    fn sgetn(&self, dst: &mut [Self::Elem]) -> usize;

    /// 同步拷贝至多 `dst.len()` 个元素，不前移。
    fn scopy(&self, dst: &mut [Self::Elem]) -> usize;

    /// 定位到绝对位置，失败时返回 `None`。
    fn seekpos(&self, position: u64, direction: OpenMode) -> Option<u64>;

    /// 相对定位，失败时返回 `None`。
    fn seekoff(&self, target: SeekFrom, direction: OpenMode) -> Option<u64>;
}
