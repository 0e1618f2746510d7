/// The four ordering predicates the sorter is written against.
///
/// Only [`Comparator::lt`] has to be provided; it must describe a strict weak
/// ordering. The other predicates are derived from it with a single call
/// each, so every comparison the sorter makes costs exactly one call into
/// the user closure.
pub trait Comparator<T: ?Sized> {
    fn lt(&mut self, a: &T, b: &T) -> bool;

    #[inline]
    fn le(&mut self, a: &T, b: &T) -> bool {
        !self.lt(b, a)
    }

    #[inline]
    fn gt(&mut self, a: &T, b: &T) -> bool {
        self.lt(b, a)
    }

    #[inline]
    fn ge(&mut self, a: &T, b: &T) -> bool {
        !self.lt(a, b)
    }
}

impl<T: ?Sized, F> Comparator<T> for F
where
    F: FnMut(&T, &T) -> bool,
{
    #[inline]
    fn lt(&mut self, a: &T, b: &T) -> bool {
        self(a, b)
    }
}
