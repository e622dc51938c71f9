//! A handler that keeps two dependent elements' visibility synchronized with
//! one checkbox's checked state.

use std::fmt::{self, Display};
use std::ops::Not;

use tracing::{debug, trace};

use crate::dom::{Document, Element, ElementNotFound};
use crate::names::Name;
use crate::reactive::CallbackHandle;

/// Whether an element is shown or hidden.
///
/// This is the entire state of a [`VisibilityToggle`]: the checkbox's checked
/// state maps onto it, and the style classes applied to the elements are
/// derived from it at the element boundary.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Visibility {
    /// The element is shown.
    Visible,
    /// The element is hidden.
    Hidden,
}

impl From<bool> for Visibility {
    fn from(checked: bool) -> Self {
        if checked {
            Self::Visible
        } else {
            Self::Hidden
        }
    }
}

impl Not for Visibility {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Self::Visible => Self::Hidden,
            Self::Hidden => Self::Visible,
        }
    }
}

impl Visibility {
    /// Returns true if this is [`Visibility::Hidden`].
    #[must_use]
    pub const fn is_hidden(self) -> bool {
        matches!(self, Self::Hidden)
    }
}

/// The style classes a [`VisibilityToggle`] applies at the element boundary.
///
/// The defaults preserve the class strings the original markup styles:
/// `"form-control"` for a visible field, the empty class for a visible label,
/// and `"hidden"` for both when hidden.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ToggleClasses {
    /// The class applied to the description field when it is visible.
    pub field_visible: Name,
    /// The class applied to the label when it is visible.
    pub label_visible: Name,
    /// The class applied to both elements when they are hidden.
    pub hidden: Name,
}

impl Default for ToggleClasses {
    fn default() -> Self {
        Self {
            field_visible: Name::new("form-control"),
            label_visible: Name::none(),
            hidden: Name::new("hidden"),
        }
    }
}

impl ToggleClasses {
    /// Returns the classes to apply to the field and the label for
    /// `visibility`.
    ///
    /// Both elements always receive classes from the same visibility state:
    /// the field and its label never diverge.
    #[must_use]
    pub fn classes_for(&self, visibility: Visibility) -> (Name, Name) {
        match visibility {
            Visibility::Visible => (self.field_visible.clone(), self.label_visible.clone()),
            Visibility::Hidden => (self.hidden.clone(), self.hidden.clone()),
        }
    }
}

/// Locators for the three elements a [`VisibilityToggle`] binds to.
///
/// The defaults preserve the selectors the original markup uses: the checkbox
/// is the first element with class `"form-checkbox"`, and the field and
/// label carry fixed identifiers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ToggleLocators {
    /// The style class that locates the checkbox control. The first element
    /// with this class in document order is used.
    pub checkbox_class: Name,
    /// The identifier of the description field.
    pub field_id: Name,
    /// The identifier of the description label.
    pub label_id: Name,
}

impl Default for ToggleLocators {
    fn default() -> Self {
        Self {
            checkbox_class: Name::new("form-checkbox"),
            field_id: Name::new("seeking_description"),
            label_id: Name::new("label_seeking_description"),
        }
    }
}

/// An error returned when binding a [`VisibilityToggle`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BindError {
    /// One of the three elements could not be located.
    NotFound(ElementNotFound),
    /// The element located by the checkbox class has no checked state.
    NotACheckbox(Name),
}

impl From<ElementNotFound> for BindError {
    fn from(err: ElementNotFound) -> Self {
        Self::NotFound(err)
    }
}

impl Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(err) => Display::fmt(err, f),
            Self::NotACheckbox(id) => {
                write!(f, "element `{id}` is not a checkbox control")
            }
        }
    }
}

impl std::error::Error for BindError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound(err) => Some(err),
            Self::NotACheckbox(_) => None,
        }
    }
}

/// A bound visibility toggle handler.
///
/// While this handler is alive, every change event on the bound checkbox
/// updates the description field's and label's style classes together: both
/// visible when checked, both hidden when unchecked. Dropping the handler
/// disconnects it from the checkbox.
///
/// The handler does not touch either class at bind time; until the first
/// change event, the classes remain whatever the document set.
#[derive(Debug)]
pub struct VisibilityToggle {
    field: Element,
    label: Element,
    classes: ToggleClasses,
    _callback: CallbackHandle,
}

impl VisibilityToggle {
    /// Binds a toggle to `document` using the default locators and classes.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the three elements cannot be located, or if
    /// the element located by the checkbox class is not a checkbox control.
    pub fn bind(document: &Document) -> Result<Self, BindError> {
        Self::bind_to(document, ToggleLocators::default(), ToggleClasses::default())
    }

    /// Binds a toggle to `document` using `locators` and `classes`.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the three elements cannot be located, or if
    /// the element located by the checkbox class is not a checkbox control.
    pub fn bind_to(
        document: &Document,
        locators: ToggleLocators,
        classes: ToggleClasses,
    ) -> Result<Self, BindError> {
        crate::initialize_tracing();

        let checkbox = document.first_by_class(locators.checkbox_class)?;
        let field = document.element_by_id(locators.field_id)?;
        let label = document.element_by_id(locators.label_id)?;
        let checked = checkbox
            .checked()
            .ok_or_else(|| BindError::NotACheckbox(checkbox.id().clone()))?;

        let callback = checked.for_each_subsequent({
            let field = field.clone();
            let label = label.clone();
            let classes = classes.clone();
            move |checked| apply(&field, &label, &classes, Visibility::from(*checked))
        });
        debug!(
            checkbox = %checkbox.id(),
            field = %field.id(),
            label = %label.id(),
            "visibility toggle bound"
        );

        Ok(Self {
            field,
            label,
            classes,
            _callback: callback,
        })
    }

    /// Returns the description field this toggle controls.
    #[must_use]
    pub fn field(&self) -> &Element {
        &self.field
    }

    /// Returns the label this toggle controls.
    #[must_use]
    pub fn label(&self) -> &Element {
        &self.label
    }

    /// Returns the classes this toggle applies.
    #[must_use]
    pub fn classes(&self) -> &ToggleClasses {
        &self.classes
    }
}

fn apply(field: &Element, label: &Element, classes: &ToggleClasses, visibility: Visibility) {
    let (field_class, label_class) = classes.classes_for(visibility);
    trace!(
        field = %field.id(),
        field_class = %field_class,
        label = %label.id(),
        label_class = %label_class,
        "applying visibility"
    );
    field.set_class(field_class);
    label.set_class(label_class);
}

#[cfg(test)]
fn seeking_fixture(checked: bool) -> (Document, Element) {
    let document = Document::new();
    let checkbox = document.create_checkbox("seeking_venues", "form-checkbox", checked);
    document.create_element("seeking_description", "hidden");
    document.create_element("label_seeking_description", "hidden");
    (document, checkbox)
}

#[cfg(test)]
fn toggle_classes(toggle: &VisibilityToggle) -> (Name, Name) {
    (toggle.field().class(), toggle.label().class())
}

#[test]
fn checking_reveals_field_and_label() {
    let (document, checkbox) = seeking_fixture(false);
    let toggle = VisibilityToggle::bind(&document).unwrap();

    checkbox.set_checked(true);
    assert_eq!(
        toggle_classes(&toggle),
        (Name::new("form-control"), Name::none())
    );
}

#[test]
fn unchecking_hides_both() {
    let (document, checkbox) = seeking_fixture(true);
    let toggle = VisibilityToggle::bind(&document).unwrap();

    checkbox.set_checked(false);
    assert_eq!(
        toggle_classes(&toggle),
        (Name::new("hidden"), Name::new("hidden"))
    );
}

#[test]
fn toggling_twice_returns_to_checked_classes() {
    let (document, checkbox) = seeking_fixture(false);
    let toggle = VisibilityToggle::bind(&document).unwrap();

    checkbox.set_checked(true);
    let checked_classes = toggle_classes(&toggle);

    checkbox.set_checked(false);
    checkbox.set_checked(true);
    assert_eq!(toggle_classes(&toggle), checked_classes);
}

#[test]
fn repeated_events_are_idempotent() {
    let (document, checkbox) = seeking_fixture(false);
    let toggle = VisibilityToggle::bind(&document).unwrap();

    checkbox.set_checked(true);
    let after_first = toggle_classes(&toggle);
    checkbox.set_checked(true);
    assert_eq!(toggle_classes(&toggle), after_first);

    checkbox.set_checked(false);
    let after_first = toggle_classes(&toggle);
    checkbox.set_checked(false);
    assert_eq!(toggle_classes(&toggle), after_first);
}

#[test]
fn field_and_label_never_diverge() {
    let (document, checkbox) = seeking_fixture(false);
    let toggle = VisibilityToggle::bind(&document).unwrap();
    let hidden = Name::new("hidden");

    for checked in [true, false, false, true, true, false] {
        checkbox.set_checked(checked);
        let (field, label) = toggle_classes(&toggle);
        let expected = Visibility::from(checked);
        assert_eq!(field == hidden, expected.is_hidden());
        assert_eq!(label == hidden, expected.is_hidden());
    }
}

#[test]
fn binding_without_checkbox_errors() {
    let document = Document::new();
    document.create_element("seeking_description", "hidden");
    document.create_element("label_seeking_description", "hidden");

    let err = VisibilityToggle::bind(&document).unwrap_err();
    assert_eq!(
        err.to_string(),
        "no element with class `form-checkbox`"
    );
}

#[test]
fn binding_without_field_errors() {
    use crate::dom::Selector;

    let document = Document::new();
    document.create_checkbox("seeking_venues", "form-checkbox", false);
    document.create_element("label_seeking_description", "hidden");

    let err = VisibilityToggle::bind(&document).unwrap_err();
    assert_eq!(
        err,
        BindError::NotFound(ElementNotFound(Selector::Id(Name::new(
            "seeking_description"
        ))))
    );
}

#[test]
fn binding_without_label_errors() {
    use crate::dom::Selector;

    let document = Document::new();
    document.create_checkbox("seeking_venues", "form-checkbox", false);
    document.create_element("seeking_description", "hidden");

    let err = VisibilityToggle::bind(&document).unwrap_err();
    assert_eq!(
        err,
        BindError::NotFound(ElementNotFound(Selector::Id(Name::new(
            "label_seeking_description"
        ))))
    );
}

#[test]
fn binding_to_a_non_checkbox_errors() {
    let document = Document::new();
    document.create_element("decoy", "form-checkbox");
    document.create_element("seeking_description", "hidden");
    document.create_element("label_seeking_description", "hidden");

    let err = VisibilityToggle::bind(&document).unwrap_err();
    assert_eq!(err, BindError::NotACheckbox(Name::new("decoy")));
}

#[test]
fn bind_leaves_initial_classes_untouched() {
    let (document, _checkbox) = seeking_fixture(true);
    let toggle = VisibilityToggle::bind(&document).unwrap();

    // No change event has fired yet; the markup's classes stand.
    assert_eq!(
        toggle_classes(&toggle),
        (Name::new("hidden"), Name::new("hidden"))
    );
}

#[test]
fn dropping_the_toggle_unbinds() {
    let (document, checkbox) = seeking_fixture(false);
    let toggle = VisibilityToggle::bind(&document).unwrap();
    let field = toggle.field().clone();

    drop(toggle);
    checkbox.set_checked(true);
    assert_eq!(field.class(), "hidden");
}

#[test]
fn custom_locators_and_classes() {
    let document = Document::new();
    let checkbox = document.create_checkbox("talent", "toggle-box", false);
    document.create_element("talent_description", "collapsed");
    document.create_element("talent_label", "collapsed");

    let locators = ToggleLocators {
        checkbox_class: Name::new("toggle-box"),
        field_id: Name::new("talent_description"),
        label_id: Name::new("talent_label"),
    };
    let classes = ToggleClasses {
        field_visible: Name::new("editable"),
        label_visible: Name::new("label"),
        hidden: Name::new("collapsed"),
    };
    let toggle = VisibilityToggle::bind_to(&document, locators, classes).unwrap();

    checkbox.set_checked(true);
    assert_eq!(
        toggle_classes(&toggle),
        (Name::new("editable"), Name::new("label"))
    );

    checkbox.set_checked(false);
    assert_eq!(
        toggle_classes(&toggle),
        (Name::new("collapsed"), Name::new("collapsed"))
    );
}

#[test]
fn visibility_mapping_is_pure() {
    let classes = ToggleClasses::default();
    assert_eq!(
        classes.classes_for(Visibility::Visible),
        (Name::new("form-control"), Name::none())
    );
    assert_eq!(
        classes.classes_for(Visibility::Hidden),
        (Name::new("hidden"), Name::new("hidden"))
    );

    assert_eq!(Visibility::from(true), Visibility::Visible);
    assert_eq!(Visibility::from(false), Visibility::Hidden);
    assert_eq!(!Visibility::Visible, Visibility::Hidden);
    assert!(Visibility::Hidden.is_hidden());
    assert!(!Visibility::Visible.is_hidden());
}
