use smallvec::SmallVec;

/// A list with a fixed upper bound.
///
/// The first `N` items live inline; a policy whose `cap` exceeds `N` spills to
/// the heap once and never past `cap`. `clear` keeps any spilled allocation so
/// a reset builder can be refilled without allocating again.
#[derive(Debug, Clone)]
pub(crate) struct BoundedVec<T, const N: usize> {
    items: SmallVec<[T; N]>,
    cap: usize,
}

impl<T, const N: usize> BoundedVec<T, N> {
    pub(crate) fn new(cap: usize) -> Self {
        Self {
            items: SmallVec::new(),
            cap,
        }
    }

    /// Push an item, handing it back if the list is full.
    pub(crate) fn try_push(&mut self, item: T) -> Result<(), T> {
        if self.items.len() >= self.cap {
            return Err(item);
        }
        if self.items.len() == N {
            self.items.reserve_exact(self.cap - N);
        }
        self.items.push(item);
        Ok(())
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub(crate) fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }
}
