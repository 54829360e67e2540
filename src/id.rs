use std::fmt::{Display, Formatter};
use std::hash::{DefaultHasher, Hash, Hasher};
use std::panic::Location;
use std::sync::atomic::{AtomicU64, Ordering};

static FORM_ID_ALLOCATOR: AtomicU64 = AtomicU64::new(1);
static FIELD_ID_ALLOCATOR: AtomicU64 = AtomicU64::new(1);

/// Identity of one form controller instance.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FormId(u64);

impl FormId {
    pub fn next() -> Self {
        Self(FORM_ID_ALLOCATOR.fetch_add(1, Ordering::SeqCst))
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Process-unique token keying a mounted field in the form registries.
///
/// Tokens come from a monotonic counter and are never handed out twice, so two
/// live fields can never collide on the same registry key.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FieldId(u64);

impl FieldId {
    pub fn next() -> Self {
        Self(FIELD_ID_ALLOCATOR.fetch_add(1, Ordering::SeqCst))
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Display for FieldId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "field#{}", self.0)
    }
}

/// Name for a field mounted without one. The same call site inside the same
/// form always yields the same name; another form or call site yields another.
pub fn auto_field_name(form: FormId, site: &Location<'_>) -> String {
    let mut hasher = DefaultHasher::new();
    (site.file(), site.line(), site.column()).hash(&mut hasher);
    format!("field-{}-{:x}", form.get(), hasher.finish())
}
