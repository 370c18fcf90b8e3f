use core::pin::Pin;

/// Project a pinned `Vec` onto one of its elements.
pub(crate) fn get_pin_mut_from_vec<T>(vec: Pin<&mut Vec<T>>, index: usize) -> Option<Pin<&mut T>> {
    // SAFETY: the vec is never resized while pinned, so elements are never
    // moved; handing out a pinned reference to one of them is the same as a
    // field projection.
    unsafe { vec.get_unchecked_mut() }
        .get_mut(index)
        .map(|t| unsafe { Pin::new_unchecked(t) })
}
