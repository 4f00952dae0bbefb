//! Foreign class name translation.
//!
//! Foreign names are slash-separated with a leading `L` (`Ljava/lang/String`).
//! Source front ends name local and anonymous classes with a path segment that
//! contains `(` or `<`, for example `LOuter/foo()V/<anonymous>Runnable`; those are
//! numbered per enclosing class (`Outer1$Runnable`).

use crate::error::ConversionErrorKind;
use crate::types::ClassType;
use std::collections::HashMap;

/// Per-session memo of foreign class names.
#[derive(Debug, Clone, Default)]
pub struct ClassNameTable {
    converted: HashMap<String, ClassType>,
    local_class_counts: HashMap<String, u32>,
}

impl ClassNameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate a foreign class name; the same name always yields the same class.
    pub fn class_type(&mut self, foreign: &str) -> Result<ClassType, ConversionErrorKind> {
        if let Some(class) = self.converted.get(foreign) {
            return Ok(class.clone());
        }

        let Some(path) = foreign.strip_prefix('L') else {
            return Err(ConversionErrorKind::InvalidClassName(foreign.to_string()));
        };
        let path = path.strip_suffix(';').unwrap_or(path);
        if path.is_empty() {
            return Err(ConversionErrorKind::InvalidClassName(foreign.to_string()));
        }

        let segments: Vec<&str> = path.split('/').collect();
        let special = segments
            .iter()
            .position(|s| s.contains('(') || s.contains('<'));
        let outer_end = special.unwrap_or(segments.len());
        let mut name = segments[..outer_end].join(".");

        if special.is_some() {
            let last = segments[segments.len() - 1];
            let mut parts: Vec<&str> = last.split('>').collect();
            while parts.last() == Some(&"") {
                parts.pop();
            }
            if let Some(simple) = parts.last() {
                if !simple.contains('$') {
                    let count = self.local_class_counts.entry(name.clone()).or_insert(0);
                    *count += 1;
                    name.push_str(&format!("{}$", count));
                }
                name.push_str(simple);
            }
        }

        let class = ClassType::new(name);
        self.converted.insert(foreign.to_string(), class.clone());
        Ok(class)
    }

    /// Foreign name of a dotted class name (`java.lang.String` → `Ljava/lang/String`)
    pub fn to_foreign(class: &ClassType) -> String {
        format!("L{}", class.name().replace('.', "/"))
    }

    /// Number of distinct foreign names converted so far
    pub fn len(&self) -> usize {
        self.converted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converted.is_empty()
    }
}
