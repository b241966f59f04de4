//! Defines the `CategoryName` type shared by transactions and budgets.
//! A category groups transactions and is what budgets are set against.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

use crate::Error;

/// The name of a category.
///
/// Category names are free-form and case-sensitive. They are stored exactly as
/// given, "Food" and "food" are different categories.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash, PartialOrd, Ord)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategory] if `name` is an empty string.
    pub fn new(name: &str) -> Result<Self, Error> {
        if name.is_empty() {
            Err(Error::EmptyCategory)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty, e.g. because it
    /// was read back from the database.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }

    /// Check a name that may have been built with [CategoryName::new_unchecked].
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategory] if the name is empty.
    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.0.is_empty() {
            Err(Error::EmptyCategory)
        } else {
            Ok(())
        }
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

impl From<CategoryName> for Value {
    fn from(name: CategoryName) -> Self {
        Value::Text(name.0)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Error, category::CategoryName};

    #[test]
    fn new_fails_on_empty_string() {
        let name = CategoryName::new("");

        assert_eq!(name, Err(Error::EmptyCategory));
    }

    #[test]
    fn new_keeps_name_as_given() {
        let name = CategoryName::new(" Eating Out ").unwrap();

        assert_eq!(name.as_ref(), " Eating Out ");
    }

    #[test]
    fn names_are_case_sensitive() {
        assert_ne!(
            CategoryName::new("Food").unwrap(),
            CategoryName::new("food").unwrap()
        );
    }
}
