//! Label registry.
//!
//! Tracks the labels handed out during one run and resolves collisions by
//! appending a single lowercase letter.

use std::collections::HashSet;
use thiserror::Error;

/// Errors raised while finalizing a label.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("label '{candidate}' and all of '{candidate}a'..'{candidate}z' are already taken")]
    Exhausted { candidate: String },
}

/// The set of labels assigned so far in one run.
///
/// Labels are only ever added. Create a fresh registry per file.
#[derive(Debug, Default, Clone)]
pub struct LabelRegistry {
    used: HashSet<String>,
}

impl LabelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `candidate`, or the first free `candidate` + `a`..`z`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Exhausted`] when the candidate and all 26
    /// suffixed variants are already registered. Nothing is registered in
    /// that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use bib_labelmaker::LabelRegistry;
    ///
    /// let mut registry = LabelRegistry::new();
    /// assert_eq!(registry.finalize("doe2020").unwrap(), "doe2020");
    /// assert_eq!(registry.finalize("doe2020").unwrap(), "doe2020a");
    /// assert_eq!(registry.finalize("doe2020").unwrap(), "doe2020b");
    /// ```
    pub fn finalize(&mut self, candidate: &str) -> Result<String, RegistryError> {
        if self.used.insert(candidate.to_string()) {
            return Ok(candidate.to_string());
        }

        for suffix in 'a'..='z' {
            let label = format!("{}{}", candidate, suffix);
            if !self.used.contains(&label) {
                tracing::debug!(candidate, label = %label, "label collision resolved");
                self.used.insert(label.clone());
                return Ok(label);
            }
        }

        Err(RegistryError::Exhausted {
            candidate: candidate.to_string(),
        })
    }

    pub fn contains(&self, label: &str) -> bool {
        self.used.contains(label)
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    /// All registered labels, sorted.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.used.iter().map(String::as_str).collect();
        labels.sort_unstable();
        labels
    }
}
