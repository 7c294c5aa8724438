//! Locale-aware line comparator.

use std::cmp::Ordering;
use std::error::Error;
use std::fmt;

use icu_collator::{Collator, CollatorOptions};

/// Collator initialization error.
#[derive(Debug)]
pub struct CollatorError(String);

impl Error for CollatorError {}

impl fmt::Display for CollatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Compares lines using linguistic collation rules of the root locale
/// rather than raw code point order, so `"Äpfel"` sorts next to `"apple"`
/// instead of after `"Zebra"`.
pub struct LocaleCollator {
    inner: Collator,
}

impl LocaleCollator {
    /// Creates a collator with the default (tertiary) strength.
    pub fn new() -> Result<Self, CollatorError> {
        let inner = Collator::try_new(&Default::default(), CollatorOptions::new())
            .map_err(|err| CollatorError(err.to_string()))?;

        return Ok(LocaleCollator { inner });
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        self.inner.compare(a, b)
    }
}
