//! Traffic class assignment from module paths.

use regex::RegexSet;

use crate::config::{ClassMap, ValidationError};

/// Compiled form of a [`ClassMap`]'s module patterns
#[derive(Debug)]
pub struct ClassMatcher {
    classes: Vec<(String, RegexSet)>,
}

impl ClassMatcher {
    pub fn new(map: &ClassMap) -> Result<Self, ValidationError> {
        let classes = map
            .traffic_classes
            .iter()
            .map(|class| {
                RegexSet::new(&class.patterns)
                    .map(|set| (class.name.clone(), set))
                    .map_err(|e| ValidationError::InvalidPattern {
                        class: class.name.clone(),
                        pattern: class.patterns.join(" | "),
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { classes })
    }

    /// Index of the first class (in map order) with a pattern matching `module`
    pub fn classify(&self, module: &str) -> Option<usize> {
        self.classes.iter().position(|(_, set)| set.is_match(module))
    }

    /// Name of the class at `index`
    pub fn class_name(&self, index: usize) -> &str {
        &self.classes[index].0
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
