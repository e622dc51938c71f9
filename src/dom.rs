//! A headless stand-in for the hosting document.
//!
//! The elements modeled here carry exactly the state this crate observes and
//! mutates: an identifier, a style class, and, for checkbox controls, a
//! checked state. The class is stored as a whole string and replaced as a
//! whole string, matching how the surrounding page treats it.

use std::fmt::{self, Debug, Display};
use std::sync::Arc;

use ahash::RandomState;
use indexmap::IndexMap;
use parking_lot::Mutex;
use tracing::debug;

use crate::names::Name;
use crate::reactive::value::{Dynamic, IntoDynamic};

/// A registry of [`Element`]s in document order.
#[derive(Clone, Debug, Default)]
pub struct Document(Arc<DocumentData>);

#[derive(Debug, Default)]
struct DocumentData {
    elements: Mutex<IndexMap<Name, Element, RandomState>>,
}

impl Document {
    /// Returns an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an element with `id` and `class` and appends it to this
    /// document.
    pub fn create_element(&self, id: impl Into<Name>, class: impl Into<Name>) -> Element {
        self.insert(id.into(), class.into(), None)
    }

    /// Creates a checkbox control with `id` and `class` and appends it to
    /// this document.
    ///
    /// `checked` can be an existing [`Dynamic<bool>`] to share the checked
    /// state with other observers.
    pub fn create_checkbox(
        &self,
        id: impl Into<Name>,
        class: impl Into<Name>,
        checked: impl IntoDynamic<bool>,
    ) -> Element {
        self.insert(id.into(), class.into(), Some(checked.into_dynamic()))
    }

    fn insert(&self, id: Name, class: Name, checked: Option<Dynamic<bool>>) -> Element {
        let element = Element(Arc::new(ElementData {
            id: id.clone(),
            class: Dynamic::new(class),
            checked,
        }));
        debug!(id = %element.id(), "element created");
        self.0.elements.lock().insert(id, element.clone());
        element
    }

    /// Returns the element with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ElementNotFound`] if no element in this document has `id`.
    pub fn element_by_id(&self, id: impl Into<Name>) -> Result<Element, ElementNotFound> {
        let id = id.into();
        self.0
            .elements
            .lock()
            .get(&id)
            .cloned()
            .ok_or(ElementNotFound(Selector::Id(id)))
    }

    /// Returns the first element in document order whose class is `class`.
    ///
    /// # Errors
    ///
    /// Returns [`ElementNotFound`] if no element in this document currently
    /// has `class`.
    pub fn first_by_class(&self, class: impl Into<Name>) -> Result<Element, ElementNotFound> {
        let class = class.into();
        self.0
            .elements
            .lock()
            .values()
            .find(|element| element.class() == class)
            .cloned()
            .ok_or(ElementNotFound(Selector::Class(class)))
    }
}

/// A cloneable handle to an element within a [`Document`].
#[derive(Clone, Debug)]
pub struct Element(Arc<ElementData>);

#[derive(Debug)]
struct ElementData {
    id: Name,
    class: Dynamic<Name>,
    checked: Option<Dynamic<bool>>,
}

impl Element {
    /// Returns this element's identifier.
    #[must_use]
    pub fn id(&self) -> &Name {
        &self.0.id
    }

    /// Returns this element's current style class.
    #[must_use]
    pub fn class(&self) -> Name {
        self.0.class.get()
    }

    /// Replaces this element's style class with `class`.
    ///
    /// The class is replaced as a whole string, not added to.
    pub fn set_class(&self, class: impl Into<Name>) {
        self.0.class.set(class.into());
    }

    /// Returns this element's checked state, or `None` if this element is not
    /// a checkbox control.
    #[must_use]
    pub fn checked(&self) -> Option<&Dynamic<bool>> {
        self.0.checked.as_ref()
    }

    /// Updates this element's checked state, dispatching a change event to
    /// all registered observers if the state flips.
    ///
    /// This function does nothing if this element is not a checkbox control.
    pub fn set_checked(&self, checked: bool) {
        if let Some(state) = &self.0.checked {
            state.set(checked);
        } else {
            tracing::warn!(id = %self.id(), "set_checked on a non-checkbox element");
        }
    }
}

/// An element lookup matched no element in the document.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ElementNotFound(pub Selector);

impl Display for ElementNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Selector::Id(id) => write!(f, "no element with id `{id}`"),
            Selector::Class(class) => write!(f, "no element with class `{class}`"),
        }
    }
}

impl std::error::Error for ElementNotFound {}

/// The lookup that an [`ElementNotFound`] error failed to resolve.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Selector {
    /// A lookup by element identifier.
    Id(Name),
    /// A lookup by style class, taking the first match in document order.
    Class(Name),
}

#[test]
fn elements_resolve_by_id() {
    let document = Document::new();
    document.create_element("seeking_description", "hidden");

    let element = document.element_by_id("seeking_description").unwrap();
    assert_eq!(element.id(), &Name::new("seeking_description"));
    assert_eq!(element.class(), "hidden");
}

#[test]
fn missing_elements_are_typed_errors() {
    let document = Document::new();

    let err = document.element_by_id("seeking_description").unwrap_err();
    assert_eq!(err, ElementNotFound(Selector::Id(Name::new("seeking_description"))));
    assert_eq!(err.to_string(), "no element with id `seeking_description`");

    let err = document.first_by_class("form-checkbox").unwrap_err();
    assert_eq!(
        err,
        ElementNotFound(Selector::Class(Name::new("form-checkbox")))
    );
    assert_eq!(err.to_string(), "no element with class `form-checkbox`");
}

#[test]
fn first_by_class_uses_document_order() {
    let document = Document::new();
    document.create_element("first", "form-checkbox");
    document.create_element("second", "form-checkbox");

    let element = document.first_by_class("form-checkbox").unwrap();
    assert_eq!(element.id(), &Name::new("first"));
}

#[test]
fn set_class_replaces_the_whole_string() {
    let document = Document::new();
    let element = document.create_element("field", "form-control");

    element.set_class("hidden");
    assert_eq!(element.class(), "hidden");

    element.set_class(Name::none());
    assert_eq!(element.class(), "");
}

#[test]
fn checkboxes_expose_checked_state() {
    let document = Document::new();
    let checkbox = document.create_checkbox("seeking", "form-checkbox", false);
    let state = checkbox.checked().unwrap().clone();
    assert!(!state.get());

    checkbox.set_checked(true);
    assert!(state.get());

    let plain = document.create_element("field", "form-control");
    assert!(plain.checked().is_none());
    // A change event on a non-checkbox is ignored.
    plain.set_checked(true);
    assert!(plain.checked().is_none());
}
