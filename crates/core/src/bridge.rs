use crate::error::LoadError;
use std::rc::Rc;

/// Called once by the host when a script element finished loading or failed.
pub type LoadHandler = Box<dyn FnOnce(Result<(), LoadError>)>;

/// The host environment's DOM capabilities the script loader relies on.
///
/// Implementations are single-threaded: handlers are invoked from the same
/// thread that registered them, one at a time, and may re-enter the loader.
/// A handler may also be invoked synchronously from inside `append_to_head`.
pub trait DomBridge {
    type Element;

    fn create_element(&self, tag: &str) -> Result<Self::Element, LoadError>;

    fn set_attribute(&self, element: &mut Self::Element, name: &str, value: &str) -> Result<(), LoadError>;

    /// Registers the load-completion handler of `element`.
    fn on_load(&self, element: &mut Self::Element, handler: LoadHandler) -> Result<(), LoadError>;

    fn append_to_head(&self, element: Self::Element) -> Result<(), LoadError>;
}

impl<B: DomBridge + ?Sized> DomBridge for Rc<B> {
    type Element = B::Element;

    fn create_element(&self, tag: &str) -> Result<Self::Element, LoadError> {
        (**self).create_element(tag)
    }

    fn set_attribute(&self, element: &mut Self::Element, name: &str, value: &str) -> Result<(), LoadError> {
        (**self).set_attribute(element, name, value)
    }

    fn on_load(&self, element: &mut Self::Element, handler: LoadHandler) -> Result<(), LoadError> {
        (**self).on_load(element, handler)
    }

    fn append_to_head(&self, element: Self::Element) -> Result<(), LoadError> {
        (**self).append_to_head(element)
    }
}
