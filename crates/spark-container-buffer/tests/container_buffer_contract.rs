//! `container_buffer_contract` 集成测试：从 crate 公开 API 验证容器缓冲的读写与定位契约。
//!
//! # 测试目标（Why）
//! - 读写头、有效边界与容量三者的关系是缓冲正确性的根基，任何回归都会让上层流读到脏数据；
//! - 读/写定位的不对称（读受有效边界约束、写可越界扩容）必须在公开 API 下保持稳定。
//!
//! # 结构安排（How）
//! - 前两个用例复现典型的写入、读取、定位场景；
//! - 其余用例覆盖追加构造、覆盖写、关闭以及最后一个句柄释放等边界。

use std::io::SeekFrom;

use spark_container_buffer::{ContainerBuffer, ContainerBufferError, OpenMode};

/// 写缓冲写入的字节应原样出现在后备集合中。
#[test]
fn written_bytes_land_in_backing_collection() {
    let buffer = ContainerBuffer::<Vec<u8>>::new(OpenMode::OUT).expect("写模式合法");
    let written = buffer.with_core(|core| core.write(&[1, 2, 3]));
    assert_eq!(written, 3);
    assert_eq!(&*buffer.collection(), &[1u8, 2, 3]);
    assert_eq!(buffer.head(), 3);
    assert_eq!(buffer.valid_size(), 3);
}

/// 读缓冲读取、回退定位与越界定位。
///
/// # 步骤说明（How）
/// 1. 读取两个元素，读头应停在 2；
/// 2. 读方向定位到 0 应成功；
/// 3. 定位到 4 超过有效边界，应失败且读头不变。
#[test]
fn read_buffer_reads_and_seeks_within_valid_extent() {
    let buffer = ContainerBuffer::<Vec<u8>>::from_collection(vec![1, 2, 3], OpenMode::IN)
        .expect("读模式合法");
    let mut dst = [0u8; 2];
    assert_eq!(buffer.with_core(|core| core.read(&mut dst, true)), 2);
    assert_eq!(dst, [1, 2]);
    assert_eq!(buffer.head(), 2);

    assert_eq!(buffer.with_core(|core| core.seekpos(0, OpenMode::IN)), Some(0));
    assert_eq!(buffer.head(), 0);

    assert_eq!(buffer.with_core(|core| core.seekpos(4, OpenMode::IN)), None);
    assert_eq!(buffer.head(), 0);
}

/// 以非空集合构造写缓冲时应在末尾追加。
#[test]
fn write_buffer_over_existing_collection_appends() {
    let buffer = ContainerBuffer::from_collection(b"log:".to_vec(), OpenMode::OUT)
        .expect("写模式合法");
    buffer.with_core(|core| core.write(b"ok"));
    assert_eq!(buffer.collection_cloned(), b"log:ok".to_vec());
}

/// 读写同开应以配置错误拒绝，并携带稳定错误码。
#[test]
fn read_write_mode_is_rejected() {
    let err = ContainerBuffer::<Vec<u8>>::new(OpenMode::IN | OpenMode::OUT)
        .expect_err("读写同开非法");
    assert!(matches!(err, ContainerBufferError::InvalidConfiguration { .. }));
    assert_eq!(err.code(), "container_buffer.invalid_configuration");
}

/// 回退覆盖写只改写区间内的数据，区间外数据保持不变。
#[test]
fn overwrite_preserves_data_outside_written_range() {
    let buffer = ContainerBuffer::<Vec<u8>>::writer();
    buffer.with_core(|core| {
        core.write(b"abcdefgh");
        assert_eq!(core.seekoff(SeekFrom::Start(2), OpenMode::OUT), Some(2));
        core.write(b"XY");
    });
    assert_eq!(buffer.collection_cloned(), b"abXYefgh".to_vec());
    assert_eq!(buffer.head(), 4);
    assert_eq!(buffer.valid_size(), 8);
}

/// 关闭读侧后读取与定位都变为无操作。
#[test]
fn closed_read_side_refuses_further_reads() {
    let buffer = ContainerBuffer::reader(b"abc".to_vec());
    assert!(buffer.with_core(|core| core.close_read()));
    let mut dst = [0u8; 3];
    assert_eq!(buffer.with_core(|core| core.read(&mut dst, true)), 0);
    assert_eq!(buffer.with_core(|core| core.seekpos(1, OpenMode::IN)), None);
    assert!(!buffer.with_core(|core| core.is_open()));
}

/// 最后一个句柄释放时两侧都会关闭，提前记下的租约凭据随之失效。
#[test]
fn collection_harvested_after_last_clone_is_dropped() {
    let buffer = ContainerBuffer::<Vec<u8>>::writer();
    let clone = buffer.clone();
    clone.with_core(|core| core.write(b"shared"));
    drop(clone);
    assert_eq!(buffer.ref_count(), 1);
    let data = buffer.try_into_collection().expect("唯一持有者");
    assert_eq!(data, b"shared".to_vec());
}

/// 只读与只写缓冲的查询接口与模式一致。
#[test]
fn capability_queries_follow_mode() {
    let reader = ContainerBuffer::reader(vec![0u16; 4]);
    reader.with_core(|core| {
        assert!(core.can_read() && !core.can_write() && core.can_seek());
        assert_eq!(core.in_avail(), 4);
        assert_eq!(core.buffer_size(OpenMode::IN), 0);
        assert!(core.sync());
    });
    let writer = ContainerBuffer::<Vec<u16>>::writer();
    writer.with_core(|core| {
        assert!(!core.can_read() && core.can_write());
        assert_eq!(core.in_avail(), 0);
    });
}
