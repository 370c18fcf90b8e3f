use core::ops;

/// Hands out a polling order over `0..len` whose starting point advances on
/// every call.
///
/// `Combine` uses it with `len == 2` so that a `Request::Either` starts with
/// the other side on every poll pass, and `MergeAll` to take turns across all
/// of its sources.
#[derive(Debug)]
pub(crate) struct Rotation {
    offset: usize,
    len: usize,
}

impl Rotation {
    pub(crate) fn new(len: usize) -> Self {
        Self { offset: 0, len }
    }

    /// Generate the indices `0..len`, starting at the current offset, and
    /// advance the offset for next time.
    pub(crate) fn iter(&mut self) -> RotationIter {
        let offset = self.offset;
        if self.len > 0 {
            self.offset = (self.offset + 1).wrapping_rem(self.len);
        }

        RotationIter {
            iter: 0..self.len,
            offset,
        }
    }
}

pub(crate) struct RotationIter {
    iter: ops::Range<usize>,
    offset: usize,
}

impl Iterator for RotationIter {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter
            .next()
            .map(|pos| (pos + self.offset).wrapping_rem(self.iter.end))
    }
}
