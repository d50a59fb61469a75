//! `async_adapter_contract` 集成测试：通过 `StreamBuffer` 契约驱动容器缓冲。
//!
//! # 测试目标（Why）
//! - 上层流只面向契约编程，适配层必须让每个 Future 立即完成并携带与同步核心一致的结果；
//! - 状态变更发生在调用时而非轮询时，调用方据此可以“发起即生效”。
//!
//! # 结构安排（How）
//! - 使用 `futures::executor::block_on` 驱动 Future，不依赖任何运行时；
//! - 以 `dyn StreamBuffer` 调用验证契约的对象安全。

use std::io::SeekFrom;

use futures::executor::block_on;
use spark_container_buffer::{ContainerBuffer, OpenMode, StreamBuffer};

/// 字符级操作：`bumpc`/`getc`/`nextc`/`ungetc` 的组合语义。
#[test]
fn character_operations_follow_stream_semantics() {
    let buffer = ContainerBuffer::reader(b"xyz".to_vec());
    block_on(async {
        assert_eq!(buffer.getc().await, Some(b'x'));
        assert_eq!(buffer.bumpc().await, Some(b'x'));
        assert_eq!(buffer.nextc().await, Some(b'z'));
        assert_eq!(buffer.ungetc().await, Some(b'y'));
        assert_eq!(buffer.in_avail(), 2);
    });
}

/// 块级读写与定位经由契约对象完成。
#[test]
fn block_operations_through_trait_object() {
    let writer = ContainerBuffer::<Vec<u8>>::writer();
    let contract: &dyn StreamBuffer<Elem = u8> = &writer;
    block_on(async {
        assert_eq!(contract.putn(b"hello").await, 5);
        assert_eq!(contract.putc(b'!').await, Some(b'!'));
        assert_eq!(contract.seekoff(SeekFrom::Current(-6), OpenMode::OUT), Some(0));
        assert_eq!(contract.putn(b"J").await, 1);
        assert!(contract.sync().await);
    });
    assert_eq!(writer.collection_cloned(), b"Jello!".to_vec());

    let reader = ContainerBuffer::reader(writer.collection_cloned());
    let mut dst = [0u8; 4];
    block_on(async {
        assert_eq!(reader.getn(&mut dst).await, 4);
    });
    assert_eq!(&dst, b"Jell");
    assert_eq!(reader.seekpos(1, OpenMode::IN), Some(1));
    assert_eq!(reader.sgetc(), Some(b'e'));
    let mut peek = [0u8; 8];
    assert_eq!(reader.scopy(&mut peek), 5);
    assert_eq!(reader.sgetn(&mut dst), 4);
    assert_eq!(reader.sbumpc(), Some(b'!'));
    assert_eq!(reader.sbumpc(), None);
}

/// 模式不符的调用返回哨兵而非报错。
#[test]
fn wrong_direction_calls_return_sentinels() {
    let reader = ContainerBuffer::reader(b"abc".to_vec());
    let writer = ContainerBuffer::<Vec<u8>>::writer();
    block_on(async {
        assert_eq!(reader.putn(b"zz").await, 0);
        assert_eq!(reader.putc(b'z').await, None);
        assert_eq!(writer.bumpc().await, None);
        assert_eq!(writer.getn(&mut [0u8; 2]).await, 0);
    });
    assert_eq!(writer.seekpos(0, OpenMode::IN), None);
}

/// 关闭经由契约完成，关闭后的读写全部拒绝。
#[test]
fn close_through_contract_closes_each_direction() {
    let writer = ContainerBuffer::<Vec<u8>>::writer();
    block_on(async {
        writer.close_read().await;
        assert!(writer.is_open(), "写缓冲关闭读侧不影响写侧");
        writer.close_write().await;
        assert!(!writer.is_open());
        assert_eq!(writer.putn(b"late").await, 0);
    });
    assert!(!writer.can_seek());
    assert_eq!(writer.mode(), OpenMode::OUT);
}

/// 忽略分段缓冲设置，大小恒为 0。
#[test]
fn buffer_size_hint_is_ignored() {
    let buffer = ContainerBuffer::<Vec<u8>>::writer();
    buffer.set_buffer_size(4096, OpenMode::OUT);
    assert_eq!(StreamBuffer::buffer_size(&buffer, OpenMode::OUT), 0);
}

/// 无法分配的写定位返回哨兵而不是 panic，缓冲保持可用。
#[test]
fn oversized_write_seek_returns_sentinel() {
    let writer = ContainerBuffer::<Vec<u8>>::writer();
    block_on(async {
        writer.putn(b"ab").await;
    });
    assert_eq!(writer.seekpos(u64::MAX / 2 + 1, OpenMode::OUT), None);
    assert_eq!(writer.seekoff(SeekFrom::Current(i64::MAX), OpenMode::OUT), None);
    assert_eq!(writer.head(), 2);
    assert_eq!(block_on(writer.putc(b'c')), Some(b'c'));
    assert_eq!(writer.collection_cloned(), b"abc".to_vec());
}
