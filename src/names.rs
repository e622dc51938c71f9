use std::borrow::Cow;
use std::fmt::{self, Display};
use std::ops::Deref;

use interner::global::{GlobalString, StringPool};

static NAMES: StringPool = StringPool::new();

/// A smart-string type used for element identifiers and style classes.
///
/// This type ensures that globally only one instance of any unique wrapped
/// string exists. Element lookups and class comparisons happen on every
/// change event, so keeping ids and class names interned lets those
/// comparisons avoid inspecting string contents.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Name(GlobalString);

impl Name {
    /// Returns a name for the given string.
    pub fn new<'a>(name: impl Into<Cow<'a, str>>) -> Self {
        Self(NAMES.get(name))
    }

    /// Returns the empty name.
    ///
    /// An element whose class is the empty name renders with its default
    /// presentation rules.
    #[must_use]
    pub fn none() -> Self {
        Self::new("")
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::none()
    }
}

impl Deref for Name {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self)
    }
}

impl<'a> From<&'a str> for Name {
    fn from(value: &'a str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        **self == *other
    }
}

impl<'a> PartialEq<&'a str> for Name {
    fn eq(&self, other: &&'a str) -> bool {
        **self == **other
    }
}

#[test]
fn interned_names_are_equal() {
    assert_eq!(Name::new("hidden"), Name::from(String::from("hidden")));
    assert_eq!(Name::new("hidden"), "hidden");
    assert_ne!(Name::new("hidden"), Name::new("form-control"));
}

#[test]
fn default_name_is_empty() {
    assert_eq!(Name::default(), "");
    assert!(Name::none().is_empty());
}
