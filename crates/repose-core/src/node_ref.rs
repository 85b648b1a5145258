use std::fmt;
use std::rc::Rc;

/// Reference callback for a native element.
///
/// The runtime calls it with `Some(element)` once the element is available and
/// with `None` right before the element goes away or the binding changes.
pub struct NodeRef<E: 'static>(Rc<dyn Fn(Option<E>)>);

impl<E: 'static> NodeRef<E> {
    pub fn new(f: impl Fn(Option<E>) + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// A callback that ignores every element.
    pub fn noop() -> Self {
        Self(Rc::new(|_| {}))
    }

    pub fn set(&self, element: Option<E>) {
        (self.0)(element)
    }

    pub fn attach(&self, element: E) {
        self.set(Some(element))
    }

    pub fn detach(&self) {
        self.set(None)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<E: 'static> Clone for NodeRef<E> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<E: 'static> fmt::Debug for NodeRef<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeRef({:p})", Rc::as_ptr(&self.0))
    }
}
