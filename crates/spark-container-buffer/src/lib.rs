#![deny(unsafe_code)]

//! `spark-container-buffer` 提供以内存容器为后备存储的流缓冲。
//!
//! # 模块定位（Why）
//! - 异步流框架需要一个“内存里的流”：写入者把数据写进容器，读取者把容器当作数据源，
//!   两者都通过同一套流缓冲契约交互，无需区分后端是网络、磁盘还是内存；
//! - 读取只移动读头、不删除数据，因此支持任意回退定位；写入按需扩容，写定位可越过末尾。
//!
//! # 设计概要（How）
//! - `mode`/`position`：模式互斥与 `head <= valid_size <= capacity` 不变量的执行者；
//! - `collection`：后备集合抽象，内建 `Vec<T>` 与 `bytes::BytesMut` 实现；
//! - `buffer`：单一所有者的同步核心，承载全部读、写、定位、直读与关闭语义；
//! - `handle`：`Arc` + 自旋锁的共享句柄，是唯一的共享访问机制；
//! - `contract`/`adapter`：流缓冲契约，以及把同步结果包装为已完成 Future 的适配实现；
//! - `stream`/`builder`：调用方入口，`io_compat`（默认 Feature）桥接 `std::io` 与 `futures::io`。
//!
//! # 命名约定（Consistency）
//! - 元素级操作以 `None` 作为流结束哨兵，块级操作以 0 表示“未传输”，错误类型只描述契约违约。

pub mod adapter;
pub mod buffer;
pub mod builder;
pub mod collection;
pub mod contract;
pub mod error;
pub mod handle;
#[cfg(feature = "io-compat")]
pub mod io_compat;
pub mod lease;
pub mod mode;
pub mod position;
pub mod stream;

pub use adapter::completed;
pub use buffer::{ContainerBufferCore, DEFAULT_LABEL};
pub use builder::ContainerBufferBuilder;
pub use collection::Collection;
pub use contract::{BoxFuture, StreamBuffer};
pub use error::{ContainerBufferError, Result, codes};
pub use handle::{CollectionGuard, ContainerBuffer, DirectReadGuard};
pub use lease::{Acquire, DirectRead, LeaseTicket};
pub use mode::{ModeState, OpenMode};
pub use position::PositionTracker;
pub use stream::{
    ByteStream, ContainerStream, InputStream, OutputStream, StringStream, WideStringStream,
};
