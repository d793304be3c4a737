//! School entities: subjects and teachers.
//!
//! These mirror the records owned by the persistence layer; the scheduler
//! only reads them.

use serde::{Deserialize, Serialize};

/// An `{id, name}` reference as it appears in persisted schedules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamedRef {
    /// Entity identifier.
    pub id: String,
    /// Display name.
    pub name: String,
}

impl NamedRef {
    /// Creates a new reference.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A taught subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    /// Unique subject identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Whether the subject may be placed more than once on the same day.
    #[serde(default)]
    pub allows_multiple_per_day: bool,
}

impl Subject {
    /// Creates a subject limited to one session per day.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            allows_multiple_per_day: false,
        }
    }

    /// Allows several sessions of this subject on one day.
    pub fn with_multiple_per_day(mut self) -> Self {
        self.allows_multiple_per_day = true;
        self
    }
}

/// A teacher with the classes and subjects they are attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    /// Unique teacher identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Classes this teacher is attached to.
    #[serde(default)]
    pub class_ids: Vec<String>,
    /// Subjects this teacher can teach.
    #[serde(default)]
    pub subject_ids: Vec<String>,
}

impl Teacher {
    /// Creates a teacher with no class or subject links.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            class_ids: Vec::new(),
            subject_ids: Vec::new(),
        }
    }

    /// Links a class.
    pub fn with_class(mut self, class_id: impl Into<String>) -> Self {
        self.class_ids.push(class_id.into());
        self
    }

    /// Links a subject.
    pub fn with_subject(mut self, subject_id: impl Into<String>) -> Self {
        self.subject_ids.push(subject_id.into());
        self
    }

    /// Whether this teacher teaches a subject.
    pub fn teaches(&self, subject_id: &str) -> bool {
        self.subject_ids.iter().any(|s| s == subject_id)
    }

    /// Whether this teacher is attached to a class.
    pub fn knows_class(&self, class_id: &str) -> bool {
        self.class_ids.iter().any(|c| c == class_id)
    }
}

/// Subject names that are allowed to repeat within a day.
///
/// Used once, when subjects are loaded, to set
/// [`Subject::allows_multiple_per_day`]. Matching is case-insensitive and
/// ignores surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatAllowList {
    names: Vec<String>,
}

impl RepeatAllowList {
    /// An empty list: no subject repeats.
    pub fn empty() -> Self {
        Self { names: Vec::new() }
    }

    /// Adds a name.
    pub fn with_name(mut self, name: impl AsRef<str>) -> Self {
        self.names.push(normalize(name.as_ref()));
        self
    }

    /// Whether a subject name is on the list.
    pub fn matches(&self, subject_name: &str) -> bool {
        let needle = normalize(subject_name);
        self.names.iter().any(|n| *n == needle)
    }

    /// Sets the repeat flag on every listed subject. Flags already set stay set.
    pub fn apply(&self, subjects: &mut [Subject]) {
        for subject in subjects.iter_mut() {
            if self.matches(&subject.name) {
                subject.allows_multiple_per_day = true;
            }
        }
    }
}

impl Default for RepeatAllowList {
    fn default() -> Self {
        ["english", "english language", "انجليزي", "إنجليزي", "الانجليزية", "الإنجليزية", "لغة انجليزية", "اللغة الإنجليزية"]
            .iter()
            .fold(Self::empty(), |list, name| list.with_name(name))
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
