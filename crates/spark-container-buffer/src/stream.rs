//! 面向调用方的流工厂。
//!
//! # 设计背景（Why）
//! - 大多数调用方只想“从一段内存读”或“往一块内存写”，不关心缓冲的模式与句柄细节；
//! - 工厂隐藏模式选择：输入流总是只读缓冲，输出流总是空的只写缓冲。
//!
//! # 逻辑解析（How）
//! - [`InputStream`]/[`OutputStream`] 只依赖 [`StreamBuffer`] 契约，可包装任意后端；
//! - [`ContainerStream`] 为任意集合类型生产流，[`StringStream`]、[`WideStringStream`]、[`ByteStream`]
//!   是固定集合类型的便捷入口；
//! - 输出流写完后，通过 [`OutputStream::collection`] 随时查看，或以 `into_collection`/`into_string` 收割结果。
//!
//! # 契约说明（What）
//! - 流方法是契约方法的薄包装，拒绝语义（返回 0 或 `None`）原样透传；
//! - 收割时若仍有其它句柄共享缓冲，返回的是集合的拷贝。

use std::{io::SeekFrom, marker::PhantomData};

use bytes::BytesMut;

use crate::{
    collection::Collection,
    contract::StreamBuffer,
    error::{ContainerBufferError, Result},
    handle::{CollectionGuard, ContainerBuffer},
    mode::OpenMode,
};

const READ_CHUNK: usize = 256;

/// 读方向的流。
#[derive(Clone, Debug)]
pub struct InputStream<B: StreamBuffer> {
    buffer: B,
}

impl<B: StreamBuffer> InputStream<B> {
    pub fn new(buffer: B) -> Self {
        Self { buffer }
    }

    /// 底层流缓冲。
    pub fn streambuf(&self) -> &B {
        &self.buffer
    }

    pub fn into_streambuf(self) -> B {
        self.buffer
    }

    pub fn is_open(&self) -> bool {
        self.buffer.can_read()
    }

    /// 读取至多 `dst.len()` 个元素。
    pub async fn read(&self, dst: &mut [B::Elem]) -> usize {
        self.buffer.getn(dst).await
    }

    /// 读取单个元素，流结束时为 `None`。
    pub async fn read_one(&self) -> Option<B::Elem> {
        self.buffer.bumpc().await
    }

    /// 读取剩余的全部元素。
    pub async fn read_to_end(&self) -> Vec<B::Elem>
    where
        B::Elem: Default,
    {
        let mut out = Vec::with_capacity(self.buffer.in_avail());
        let mut chunk = [B::Elem::default(); READ_CHUNK];
        loop {
            let count = self.buffer.getn(&mut chunk).await;
            if count == 0 {
                break;
            }
            out.extend_from_slice(&chunk[..count]);
        }
        out
    }

    /// 读方向定位。
    pub fn seek(&self, target: SeekFrom) -> Option<u64> {
        self.buffer.seekoff(target, OpenMode::IN)
    }

    pub async fn close(&self) {
        self.buffer.close_read().await;
    }
}

/// 写方向的流。
#[derive(Clone, Debug)]
pub struct OutputStream<B: StreamBuffer> {
    buffer: B,
}

impl<B: StreamBuffer> OutputStream<B> {
    pub fn new(buffer: B) -> Self {
        Self { buffer }
    }

    /// 底层流缓冲。
    pub fn streambuf(&self) -> &B {
        &self.buffer
    }

    pub fn into_streambuf(self) -> B {
        self.buffer
    }

    pub fn is_open(&self) -> bool {
        self.buffer.can_write()
    }

    /// 写入整个 `src`，返回写入数；缓冲不可写时为 0。
    pub async fn write(&self, src: &[B::Elem]) -> usize {
        self.buffer.putn(src).await
    }

    pub async fn write_one(&self, value: B::Elem) -> Option<B::Elem> {
        self.buffer.putc(value).await
    }

    pub async fn flush(&self) -> bool {
        self.buffer.sync().await
    }

    /// 写方向定位，越过末尾时扩容。
    pub fn seek(&self, target: SeekFrom) -> Option<u64> {
        self.buffer.seekoff(target, OpenMode::OUT)
    }

    pub async fn close(&self) {
        self.buffer.close_write().await;
    }
}

impl<C: Collection> OutputStream<ContainerBuffer<C>> {
    /// 已写内容的只读守卫。
    pub fn collection(&self) -> CollectionGuard<'_, C> {
        self.buffer.collection()
    }

    /// 收割后备集合；仍有其它句柄时返回拷贝。
    pub fn into_collection(self) -> C
    where
        C: Clone,
    {
        match self.buffer.try_into_collection() {
            Ok(data) => data,
            Err(shared) => shared.collection_cloned(),
        }
    }
}

impl OutputStream<ContainerBuffer<Vec<u8>>> {
    /// 以 UTF-8 解码已写内容。
    ///
    /// # Errors
    /// 内容不是合法 UTF-8 时返回 [`ContainerBufferError::Encoding`]。
    pub fn into_string(self) -> Result<String> {
        String::from_utf8(self.into_collection()).map_err(|err| ContainerBufferError::Encoding {
            detail: err.utf8_error().to_string(),
        })
    }
}

impl OutputStream<ContainerBuffer<Vec<u16>>> {
    /// 以 UTF-16 解码已写内容。
    ///
    /// # Errors
    /// 内容含未配对代理项时返回 [`ContainerBufferError::Encoding`]。
    pub fn into_string(self) -> Result<String> {
        String::from_utf16(&self.into_collection()).map_err(|err| ContainerBufferError::Encoding {
            detail: err.to_string(),
        })
    }
}

/// 以集合类型 `C` 为后端的流工厂。
#[derive(Debug)]
pub struct ContainerStream<C>(PhantomData<fn() -> C>);

impl<C: Collection> ContainerStream<C> {
    /// 读取 `data` 的输入流。
    pub fn open_istream(data: C) -> InputStream<ContainerBuffer<C>> {
        InputStream::new(ContainerBuffer::reader(data))
    }

    /// 写入新空集合的输出流。
    pub fn open_ostream() -> OutputStream<ContainerBuffer<C>> {
        OutputStream::new(ContainerBuffer::writer())
    }
}

/// UTF-8 文本流。
#[derive(Debug)]
pub struct StringStream;

impl StringStream {
    pub fn open_istream(text: impl Into<String>) -> InputStream<ContainerBuffer<Vec<u8>>> {
        ContainerStream::open_istream(text.into().into_bytes())
    }

    pub fn open_ostream() -> OutputStream<ContainerBuffer<Vec<u8>>> {
        ContainerStream::open_ostream()
    }
}

/// UTF-16 文本流，元素为 `u16` 码元。
#[derive(Debug)]
pub struct WideStringStream;

impl WideStringStream {
    pub fn open_istream(text: &str) -> InputStream<ContainerBuffer<Vec<u16>>> {
        ContainerStream::open_istream(text.encode_utf16().collect())
    }

    pub fn open_ostream() -> OutputStream<ContainerBuffer<Vec<u16>>> {
        ContainerStream::open_ostream()
    }
}

/// 字节流，默认以 [`BytesMut`] 为后端，也可指定其它字节集合。
#[derive(Debug)]
pub struct ByteStream<C = BytesMut>(PhantomData<fn() -> C>);

impl<C: Collection<Elem = u8>> ByteStream<C> {
    pub fn open_istream(data: C) -> InputStream<ContainerBuffer<C>> {
        ContainerStream::open_istream(data)
    }

    pub fn open_ostream() -> OutputStream<ContainerBuffer<C>> {
        ContainerStream::open_ostream()
    }
}
