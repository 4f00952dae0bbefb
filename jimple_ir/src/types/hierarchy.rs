//! Class hierarchy queries.
//!
//! The type assigner never builds a class database; it asks a [`TypeHierarchy`] for
//! direct supertypes and derives subtyping and least upper bounds from them.

use super::{ClassType, JAVA_IO_SERIALIZABLE, JAVA_LANG_CLONEABLE, JAVA_LANG_OBJECT};
use std::collections::{HashMap, HashSet, VecDeque};

/// Read-only view of the class hierarchy.
pub trait TypeHierarchy: std::fmt::Debug {
    /// Direct supertypes of `class`, superclass first (if any), then interfaces.
    fn direct_supertypes(&self, class: &ClassType) -> Vec<ClassType>;

    fn is_interface(&self, class: &ClassType) -> bool;

    /// The direct superclass, or `None` for `java.lang.Object` and interfaces
    fn superclass(&self, class: &ClassType) -> Option<ClassType> {
        if self.is_interface(class) {
            return None;
        }
        self.direct_supertypes(class)
            .into_iter()
            .find(|s| !self.is_interface(s))
    }

    /// Reflexive, transitive subtype test over direct supertypes.
    fn is_subtype(&self, sub: &ClassType, sup: &ClassType) -> bool {
        if sub == sup || sup.is_object() {
            return true;
        }
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([sub.clone()]);
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.clone()) {
                continue;
            }
            for parent in self.direct_supertypes(&current) {
                if &parent == sup {
                    return true;
                }
                queue.push_back(parent);
            }
        }
        false
    }

    /// Least upper bound of two class types.
    ///
    /// Comparable types yield the supertype. Otherwise the nearest common superclass
    /// is chosen, falling back to `java.lang.Object`; shared interfaces are not
    /// considered.
    fn least_upper_bound(&self, a: &ClassType, b: &ClassType) -> ClassType {
        if self.is_subtype(a, b) {
            return b.clone();
        }
        if self.is_subtype(b, a) {
            return a.clone();
        }
        if self.is_interface(a) || self.is_interface(b) {
            return JAVA_LANG_OBJECT.clone();
        }

        let mut ancestors = HashSet::new();
        let mut current = Some(a.clone());
        while let Some(class) = current {
            if !ancestors.insert(class.clone()) {
                break;
            }
            current = self.superclass(&class);
        }

        let mut seen = HashSet::new();
        let mut current = Some(b.clone());
        while let Some(class) = current {
            if ancestors.contains(&class) {
                return class;
            }
            if !seen.insert(class.clone()) {
                break;
            }
            current = self.superclass(&class);
        }
        JAVA_LANG_OBJECT.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ClassEntry {
    superclass: Option<ClassType>,
    interfaces: Vec<ClassType>,
    is_interface: bool,
}

/// In-memory class table implementing [`TypeHierarchy`].
///
/// Classes that were never added are treated as direct subclasses of
/// `java.lang.Object`.
#[derive(Debug, Clone, Default)]
pub struct ClassHierarchy {
    classes: HashMap<ClassType, ClassEntry>,
}

impl ClassHierarchy {
    /// A table holding the `java.lang` roots every hierarchy needs.
    pub fn new() -> Self {
        let mut hierarchy = Self::default();
        hierarchy.classes.insert(
            JAVA_LANG_OBJECT.clone(),
            ClassEntry {
                superclass: None,
                interfaces: Vec::new(),
                is_interface: false,
            },
        );
        hierarchy.add_interface(JAVA_LANG_CLONEABLE.name(), &[]);
        hierarchy.add_interface(JAVA_IO_SERIALIZABLE.name(), &[]);
        hierarchy.add_class("java.lang.Throwable", None, &["java.io.Serializable"]);
        hierarchy.add_class("java.lang.Exception", Some("java.lang.Throwable"), &[]);
        hierarchy.add_class("java.lang.Error", Some("java.lang.Throwable"), &[]);
        hierarchy.add_class(
            "java.lang.RuntimeException",
            Some("java.lang.Exception"),
            &[],
        );
        hierarchy.add_class("java.lang.String", None, &["java.io.Serializable"]);
        hierarchy.add_class("java.lang.Class", None, &["java.io.Serializable"]);
        hierarchy
    }

    /// Add (or replace) a class. A missing superclass means `java.lang.Object`.
    pub fn add_class(&mut self, name: &str, superclass: Option<&str>, interfaces: &[&str]) {
        let class = ClassType::new(name);
        let superclass = match superclass {
            Some(s) => Some(ClassType::new(s)),
            None if class.is_object() => None,
            None => Some(JAVA_LANG_OBJECT.clone()),
        };
        self.classes.insert(
            class,
            ClassEntry {
                superclass,
                interfaces: interfaces.iter().map(|i| ClassType::new(*i)).collect(),
                is_interface: false,
            },
        );
    }

    /// Add (or replace) an interface with its super-interfaces.
    pub fn add_interface(&mut self, name: &str, superinterfaces: &[&str]) {
        self.classes.insert(
            ClassType::new(name),
            ClassEntry {
                superclass: None,
                interfaces: superinterfaces.iter().map(|i| ClassType::new(*i)).collect(),
                is_interface: true,
            },
        );
    }

    pub fn contains(&self, class: &ClassType) -> bool {
        self.classes.contains_key(class)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl TypeHierarchy for ClassHierarchy {
    fn direct_supertypes(&self, class: &ClassType) -> Vec<ClassType> {
        match self.classes.get(class) {
            Some(entry) => entry
                .superclass
                .iter()
                .chain(entry.interfaces.iter())
                .cloned()
                .collect(),
            None if class.is_object() => Vec::new(),
            None => vec![JAVA_LANG_OBJECT.clone()],
        }
    }

    fn is_interface(&self, class: &ClassType) -> bool {
        self.classes
            .get(class)
            .map(|entry| entry.is_interface)
            .unwrap_or(false)
    }
}
