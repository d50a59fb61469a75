use bytes::BytesMut;

/// `Collection` 抽象容器缓冲的后备存储。
///
/// # 设计背景（Why）
/// - 缓冲需要同时服务字节数组、UTF-16 文本、`BytesMut` 等多种内存序列，核心逻辑只依赖
///   “可按下标随机访问、可调整长度、元素定宽”这三项能力；
/// - 通过 trait 把存储细节挡在核心之外，核心即可用一套读写/定位算法覆盖所有容器。
///
/// # 契约说明（What）
/// - `len()` 即缓冲的 `capacity`；`resize` 扩展时以 `Elem::default()` 填充，收缩时截断尾部；
/// - `try_resize` 是扩展的可失败版本：目标长度超出集合能表示的上限或分配失败时返回 `false`，集合保持不变；
/// - `as_slice`/`as_mut_slice` 必须覆盖 `[0, len)` 的全部元素；
/// - `Default` 用于在交出集合所有权后留下一个空壳。
///
/// # 设计考量（Trade-offs）
/// - 元素要求 `Copy`，读写均按值拷贝，不支持携带析构逻辑的元素类型；
/// - `reserve` 仅为容量提示，实现可以忽略。
pub trait Collection: Default + Send + 'static {
    /// 定宽元素类型。
    type Elem: Copy + Default + Send + Sync + 'static;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 调整长度至 `new_len`。
    fn resize(&mut self, new_len: usize);

    /// 调整长度至 `new_len`，无法分配时返回 `false` 且不做修改。
    fn try_resize(&mut self, new_len: usize) -> bool;

    /// 预留至少 `additional` 个元素的空间。
    fn reserve(&mut self, additional: usize);

    fn as_slice(&self) -> &[Self::Elem];

    fn as_mut_slice(&mut self) -> &mut [Self::Elem];
}

impl<T> Collection for Vec<T>
where
    T: Copy + Default + Send + Sync + 'static,
{
    type Elem = T;

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn resize(&mut self, new_len: usize) {
        Vec::resize(self, new_len, T::default());
    }

    fn try_resize(&mut self, new_len: usize) -> bool {
        let additional = new_len.saturating_sub(Vec::len(self));
        if self.try_reserve(additional).is_err() {
            return false;
        }
        Vec::resize(self, new_len, T::default());
        true
    }

    fn reserve(&mut self, additional: usize) {
        Vec::reserve(self, additional);
    }

    fn as_slice(&self) -> &[T] {
        self
    }

    fn as_mut_slice(&mut self) -> &mut [T] {
        self
    }
}

impl Collection for BytesMut {
    type Elem = u8;

    fn len(&self) -> usize {
        BytesMut::len(self)
    }

    fn resize(&mut self, new_len: usize) {
        BytesMut::resize(self, new_len, 0);
    }

    fn try_resize(&mut self, new_len: usize) -> bool {
        // BytesMut 没有可失败的预留接口，只能拦下超过 isize::MAX 的长度。
        if isize::try_from(new_len).is_err() {
            return false;
        }
        BytesMut::resize(self, new_len, 0);
        true
    }

    fn reserve(&mut self, additional: usize) {
        BytesMut::reserve(self, additional);
    }

    fn as_slice(&self) -> &[u8] {
        self.as_ref()
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        self.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grow_then_shrink<C: Collection>(mut store: C) -> usize {
        store.resize(4);
        store.as_mut_slice()[3] = C::Elem::default();
        store.resize(2);
        store.len()
    }

    #[test]
    fn vec_and_bytes_mut_share_resize_semantics() {
        assert_eq!(grow_then_shrink(Vec::<u16>::new()), 2);
        assert_eq!(grow_then_shrink(BytesMut::new()), 2);
    }

    #[test]
    fn oversized_growth_is_refused_without_panicking() {
        let mut vec = vec![1u16, 2];
        assert!(!Collection::try_resize(&mut vec, usize::MAX / 2 + 1));
        assert_eq!(vec, [1, 2]);

        let mut bytes = BytesMut::from(&b"ab"[..]);
        assert!(!Collection::try_resize(&mut bytes, usize::MAX / 2 + 1));
        assert_eq!(&bytes[..], b"ab");

        assert!(Collection::try_resize(&mut vec, 3));
        assert_eq!(vec, [1, 2, 0]);
    }

    #[test]
    fn bytes_mut_growth_zero_fills() {
        let mut store = BytesMut::from(&b"ab"[..]);
        Collection::resize(&mut store, 4);
        assert_eq!(Collection::as_slice(&store), b"ab\0\0");
    }
}
