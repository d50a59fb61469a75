//! `stream_factory` 集成测试：流工厂与结果收割。
//!
//! # 测试目标（Why）
//! - 调用方最常见的用法是“写入后取出内容”或“把一段内存当作输入流”，工厂必须选对模式；
//! - 文本收割需要正确报告编码错误，而不是静默替换。

use std::io::SeekFrom;

use bytes::BytesMut;
use futures::executor::block_on;
use spark_container_buffer::{
    ByteStream, ContainerBufferBuilder, ContainerStream, InputStream, OpenMode, OutputStream,
    StreamBuffer, StringStream,
};

/// 输出流写入文本后收割为 `String`。
#[test]
fn string_output_stream_harvests_text() {
    let out = StringStream::open_ostream();
    block_on(async {
        out.write(b"status=").await;
        out.write(b"ok").await;
    });
    assert_eq!(&*out.collection(), b"status=ok");
    assert_eq!(out.into_string().expect("合法 UTF-8"), "status=ok");
}

/// 输入流可以回退后重读。
#[test]
fn input_stream_rereads_after_seek() {
    let input = StringStream::open_istream("abc");
    block_on(async {
        assert_eq!(input.read_to_end().await, b"abc");
        assert_eq!(input.seek(SeekFrom::Start(1)), Some(1));
        assert_eq!(input.read_one().await, Some(b'b'));
        input.close().await;
        assert!(!input.is_open());
        assert_eq!(input.read_one().await, None);
    });
}

/// 通用工厂适配任意集合类型。
#[test]
fn container_stream_over_u32_elements() {
    let out = ContainerStream::<Vec<u32>>::open_ostream();
    block_on(async {
        assert_eq!(out.write(&[7, 8, 9]).await, 3);
        assert_eq!(out.write_one(10).await, Some(10));
        out.close().await;
        assert!(!out.is_open());
        assert_eq!(out.write_one(11).await, None);
    });
    let input = ContainerStream::open_istream(out.into_collection());
    let mut dst = [0u32; 8];
    let read = block_on(input.read(&mut dst));
    assert_eq!(&dst[..read], &[7, 8, 9, 10]);
}

/// 字节流默认以 `BytesMut` 为后端。
#[test]
fn byte_stream_defaults_to_bytes_mut() {
    let out = ByteStream::<BytesMut>::open_ostream();
    block_on(out.write(b"\x00\x01"));
    assert!(block_on(out.flush()));
    let data: BytesMut = out.into_collection();
    assert_eq!(&data[..], b"\x00\x01");
}

/// 流可以包装 builder 构造的缓冲，标签随缓冲保留。
#[test]
fn streams_wrap_builder_made_buffers() {
    let buffer = ContainerBufferBuilder::<Vec<u8>>::new()
        .mode(OpenMode::IN)
        .collection(b"payload".to_vec())
        .label("fixture")
        .build()
        .expect("读模式合法");
    let input = InputStream::new(buffer);
    assert_eq!(input.streambuf().in_avail(), 7);
    assert_eq!(input.streambuf().with_core(|core| core.label().to_owned()), "fixture");

    let output = OutputStream::new(input.into_streambuf());
    assert!(!output.is_open(), "只读缓冲包装成输出流也不可写");
    assert_eq!(block_on(output.write(b"x")), 0);
}
