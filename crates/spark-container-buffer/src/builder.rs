use std::borrow::Cow;

use crate::{
    buffer::{ContainerBufferCore, DEFAULT_LABEL},
    collection::Collection,
    error::Result,
    handle::ContainerBuffer,
    mode::OpenMode,
};

/// `ContainerBufferBuilder` 汇总构造容器缓冲所需的全部配置。
///
/// # 设计背景（Why）
/// - 构造参数（模式、初始集合、容量预留、日志标签）逐渐增多，builder 让调用点只写关心的那几项；
/// - 模式校验集中在 [`build`](Self::build) 中完成，配置错误只会在这一处出现。
///
/// # 契约说明（What）
/// - 默认：写模式、空集合、不预留、标签为 `"container"`；
/// - 同时设置 `IN` 与 `OUT` 时 `build` 返回 [`ContainerBufferError::InvalidConfiguration`](crate::ContainerBufferError::InvalidConfiguration)；
/// - `reserve` 仅作为容量提示传给 [`Collection::reserve`]，不改变 `capacity`（即集合长度）。
#[derive(Debug)]
pub struct ContainerBufferBuilder<C: Collection> {
    mode: OpenMode,
    data: Option<C>,
    reserve: usize,
    label: Cow<'static, str>,
}

impl<C: Collection> Default for ContainerBufferBuilder<C> {
    fn default() -> Self {
        Self {
            mode: OpenMode::OUT,
            data: None,
            reserve: 0,
            label: Cow::Borrowed(DEFAULT_LABEL),
        }
    }
}

impl<C: Collection> ContainerBufferBuilder<C> {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn mode(mut self, mode: OpenMode) -> Self {
        self.mode = mode;
        self
    }

    /// 以已有集合作为初始内容。
    #[must_use]
    pub fn collection(mut self, data: C) -> Self {
        self.data = Some(data);
        self
    }

    /// 预留额外容量，减少写入过程中的重新分配。
    #[must_use]
    pub fn reserve(mut self, additional: usize) -> Self {
        self.reserve = additional;
        self
    }

    /// 日志事件中携带的缓冲标签。
    #[must_use]
    pub fn label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = label.into();
        self
    }

    /// 构造单一所有者的核心。
    ///
    /// # Errors
    /// 模式非法时返回 [`ContainerBufferError::InvalidConfiguration`](crate::ContainerBufferError::InvalidConfiguration)。
    pub fn build_core(self) -> Result<ContainerBufferCore<C>> {
        let mut data = self.data.unwrap_or_default();
        if self.reserve > 0 {
            data.reserve(self.reserve);
        }
        ContainerBufferCore::open(data, self.mode, self.label)
    }

    /// 构造共享句柄。
    ///
    /// # Errors
    /// 同 [`build_core`](Self::build_core)。
    pub fn build(self) -> Result<ContainerBuffer<C>> {
        self.build_core().map(ContainerBuffer::from_core)
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;
    use crate::error::ContainerBufferError;

    #[test]
    fn defaults_to_empty_writer() {
        let core = ContainerBufferBuilder::<Vec<u8>>::new()
            .build_core()
            .expect("default config is valid");
        assert!(core.can_write());
        assert_eq!(core.capacity(), 0);
        assert_eq!(core.label(), DEFAULT_LABEL);
    }

    #[test]
    fn label_and_reserve_are_applied() {
        let core = ContainerBufferBuilder::<BytesMut>::new()
            .reserve(64)
            .label("upload")
            .build_core()
            .expect("valid");
        assert_eq!(core.label(), "upload");
        assert_eq!(core.capacity(), 0, "预留不改变逻辑容量");
        assert!(core.collection().capacity() >= 64);
    }

    #[test]
    fn conflicting_mode_is_reported() {
        let err = ContainerBufferBuilder::<Vec<u8>>::new()
            .mode(OpenMode::IN | OpenMode::OUT)
            .collection(vec![1, 2])
            .build()
            .expect_err("读写同开应失败");
        assert!(matches!(err, ContainerBufferError::InvalidConfiguration { .. }));
    }
}
