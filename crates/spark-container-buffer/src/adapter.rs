//! 把同步的容器缓冲核心包装为 [`StreamBuffer`] 契约。
//!
//! # 设计背景（Why）
//! - 内存缓冲的每个操作都能立即给出结果，但上层流框架只认识 Future 形式的契约；
//! - 适配层不引入线程、队列或协作式挂起：先在调用线程完成状态变更，再把结果装进已完成的 Future。
//!
//! # 契约说明（What）
//! - 方法返回时状态变更已经发生，调用方即便尚未轮询 Future，也能立即观察到新的读写头；
//! - 返回的 Future 首次轮询即为 `Poll::Ready`。

use std::io::SeekFrom;

use futures::future;

use crate::{
    collection::Collection,
    contract::{BoxFuture, StreamBuffer},
    handle::ContainerBuffer,
    mode::OpenMode,
};

/// 以给定结果构造已完成的 Future。
pub fn completed<'a, T: Send + 'a>(value: T) -> BoxFuture<'a, T> {
    Box::pin(future::ready(value))
}

fn position_to_u64(position: usize) -> Option<u64> {
    u64::try_from(position).ok()
}

impl<C: Collection> StreamBuffer for ContainerBuffer<C> {
    type Elem = C::Elem;

    fn mode(&self) -> OpenMode {
        self.with_core(|core| core.mode())
    }

    fn is_open(&self) -> bool {
        self.with_core(|core| core.is_open())
    }

    fn can_read(&self) -> bool {
        self.with_core(|core| core.can_read())
    }

    fn can_write(&self) -> bool {
        self.with_core(|core| core.can_write())
    }

    fn can_seek(&self) -> bool {
        self.with_core(|core| core.can_seek())
    }

    fn in_avail(&self) -> usize {
        self.with_core(|core| core.in_avail())
    }

    fn buffer_size(&self, direction: OpenMode) -> usize {
        self.with_core(|core| core.buffer_size(direction))
    }

    fn set_buffer_size(&self, size: usize, direction: OpenMode) {
        self.with_core(|core| core.set_buffer_size(size, direction));
    }

    fn putc(&self, value: C::Elem) -> BoxFuture<'_, Option<C::Elem>> {
        completed(self.with_core(|core| core.putc(value)))
    }

    fn putn<'a>(&'a self, src: &'a [C::Elem]) -> BoxFuture<'a, usize> {
        completed(self.with_core(|core| core.write(src)))
    }

    fn getn<'a>(&'a self, dst: &'a mut [C::Elem]) -> BoxFuture<'a, usize> {
        completed(self.with_core(|core| core.read(dst, true)))
    }

    fn bumpc(&self) -> BoxFuture<'_, Option<C::Elem>> {
        completed(self.sbumpc())
    }

    fn getc(&self) -> BoxFuture<'_, Option<C::Elem>> {
        completed(self.sgetc())
    }

    fn nextc(&self) -> BoxFuture<'_, Option<C::Elem>> {
        completed(self.with_core(|core| core.nextc()))
    }

    fn ungetc(&self) -> BoxFuture<'_, Option<C::Elem>> {
        completed(self.with_core(|core| core.ungetc()))
    }

    fn sync(&self) -> BoxFuture<'_, bool> {
        completed(self.with_core(|core| core.sync()))
    }

    fn close(&self, direction: OpenMode) -> BoxFuture<'_, ()> {
        self.with_core(|core| core.close(direction));
        completed(())
    }

    fn sbumpc(&self) -> Option<C::Elem> {
        self.with_core(|core| core.read_one(true))
    }

    fn sgetc(&self) -> Option<C::Elem> {
        self.with_core(|core| core.read_one(false))
    }

    fn sgetn(&self, dst: &mut [C::Elem]) -> usize {
        self.with_core(|core| core.read(dst, true))
    }

    fn scopy(&self, dst: &mut [C::Elem]) -> usize {
        self.with_core(|core| core.copy_out(dst))
    }

    fn seekpos(&self, position: u64, direction: OpenMode) -> Option<u64> {
        let position = usize::try_from(position).ok()?;
        self.with_core(|core| core.seekpos(position, direction))
            .and_then(position_to_u64)
    }

    fn seekoff(&self, target: SeekFrom, direction: OpenMode) -> Option<u64> {
        self.with_core(|core| core.seekoff(target, direction))
            .and_then(position_to_u64)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        future::Future,
        task::{Context, Poll},
    };

    use futures::task::noop_waker_ref;

    use super::*;

    #[test]
    fn completed_future_is_ready_on_first_poll() {
        let mut fut = completed(7usize);
        let mut cx = Context::from_waker(noop_waker_ref());
        assert_eq!(fut.as_mut().poll(&mut cx), Poll::Ready(7));
    }

    #[test]
    fn mutation_is_visible_before_the_future_is_polled() {
        let buffer = ContainerBuffer::<Vec<u8>>::writer();
        let pending = buffer.putn(b"abc");
        assert_eq!(buffer.valid_size(), 3);
        drop(pending);
        assert_eq!(buffer.collection_cloned(), b"abc".to_vec());
    }
}
