/// Invokes a function with a clone of `self`.
///
/// This avoids the rightward drift of explicit clone-then-move blocks when
/// handing values to `'static` callbacks:
///
/// ```rust
/// use ripplet::value::Dynamic;
/// use ripplet::WithClone;
///
/// let count = Dynamic::new(0);
/// let mut increment = count.with_clone(|count| move |()| count.set(count.get() + 1));
/// increment(());
/// assert_eq!(count.get(), 1);
/// ```
///
/// Tuples of cloneable values clone element-wise, so several values can be
/// captured in one call.
pub trait WithClone: Sized {
    /// Calls `with` with a clone of `self`, returning its result.
    fn with_clone<R>(&self, with: impl FnOnce(Self) -> R) -> R;
}

impl<T> WithClone for T
where
    T: Clone,
{
    fn with_clone<R>(&self, with: impl FnOnce(Self) -> R) -> R {
        with(self.clone())
    }
}
