//! 字节缓冲与 `std::io`、`futures::io` 生态的桥接。
//!
//! # 设计背景（Why）
//! - 编解码器、压缩库等现成组件只认识 `Read`/`Write`/`Seek` 及其异步版本，
//!   桥接后内存缓冲可以直接喂给它们，无需额外拷贝到 `Vec`。
//!
//! # 契约说明（What）
//! - 读写语义与核心一致：模式不符时读返回 `Ok(0)`，写返回 `Ok(0)`（`write_all` 据此报告 `WriteZero`）；
//! - `Seek` 的方向取缓冲当前可用的方向，读模式优先；定位被拒绝时返回 `ErrorKind::InvalidInput`；
//! - 异步实现立即完成，从不返回 `Poll::Pending`；`poll_close` 关闭写侧。

use std::{
    io::{self, SeekFrom},
    pin::Pin,
    task::{Context, Poll},
};

use futures::io::{AsyncRead, AsyncSeek, AsyncWrite};

use crate::{collection::Collection, handle::ContainerBuffer, mode::OpenMode};

impl<C: Collection<Elem = u8>> ContainerBuffer<C> {
    fn seek_direction(&self) -> OpenMode {
        if self.with_core(|core| core.can_read()) {
            OpenMode::IN
        } else {
            OpenMode::OUT
        }
    }

    fn io_seek(&self, target: SeekFrom) -> io::Result<u64> {
        let direction = self.seek_direction();
        self.with_core(|core| core.seekoff(target, direction))
            .and_then(|position| u64::try_from(position).ok())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("container buffer rejected seek to {target:?}"),
                )
            })
    }
}

impl<C: Collection<Elem = u8>> io::Read for ContainerBuffer<C> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.with_core(|core| core.read(buf, true)))
    }
}

impl<C: Collection<Elem = u8>> io::Write for ContainerBuffer<C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.with_core(|core| core.write(buf)))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<C: Collection<Elem = u8>> io::Seek for ContainerBuffer<C> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.io_seek(pos)
    }
}

impl<C: Collection<Elem = u8>> AsyncRead for ContainerBuffer<C> {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut [u8],
    ) -> Poll<io::Result<usize>> {
        Poll::Ready(io::Read::read(self.get_mut(), buf))
    }
}

impl<C: Collection<Elem = u8>> AsyncWrite for ContainerBuffer<C> {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Poll::Ready(io::Write::write(self.get_mut(), buf))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.with_core(|core| core.close_write());
        Poll::Ready(Ok(()))
    }
}

impl<C: Collection<Elem = u8>> AsyncSeek for ContainerBuffer<C> {
    fn poll_seek(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        pos: SeekFrom,
    ) -> Poll<io::Result<u64>> {
        Poll::Ready(self.io_seek(pos))
    }
}
