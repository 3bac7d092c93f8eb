//! Error path tracking. Every layout pushes the name or index of the member it is working on onto a failing error
//! before handing it to its caller, so by the time an error leaves the outermost codec it carries the full access
//! path, innermost segment first. Rendering walks the segments backwards starting from the root `input`, which
//! yields paths such as `input.outputs[2].lock.args`.
//!
//! Packing through an option leaves a `?` after the option's own segment, so a bad argument of an optional script
//! stored in field `type` is reported at `input.type?.args`. Unpacking reports no marker.

use crate::error::{Error, Result};
use std::fmt::Write;

/// One step of an access path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathKey {
    /// A named member of a struct, table or union
    Field(String),
    /// A position within an array or vector
    Index(usize),
    /// The present value of an option
    Optional,
}

pub(crate) fn render_path(keys: &[PathKey]) -> String {
    keys.iter().rev().fold(String::from("input"), |mut acc, key| {
        match key {
            PathKey::Field(name) => { let _ = write!(acc, ".{}", name); },
            PathKey::Index(index) => { let _ = write!(acc, "[{}]", index); },
            PathKey::Optional => acc.push('?'),
        }
        acc
    })
}

/// Extension methods for recording where inside a nested value a failure happened.
pub trait Track<T> {
    /// Record that the failure happened inside the named member.
    fn in_field(self, name: &str) -> Result<T>;
    /// Record that the failure happened inside the item at `index`.
    fn in_index(self, index: usize) -> Result<T>;
    /// Record that the failure happened inside the value of an option.
    fn in_option(self) -> Result<T>;
}

impl<T> Track<T> for Result<T> {
    #[inline]
    fn in_field(self, name: &str) -> Result<T> {
        self.map_err(|e| e.push(PathKey::Field(name.to_owned())))
    }

    #[inline]
    fn in_index(self, index: usize) -> Result<T> {
        self.map_err(|e| e.push(PathKey::Index(index)))
    }

    #[inline]
    fn in_option(self) -> Result<T> {
        self.map_err(|e| e.push(PathKey::Optional))
    }
}

/// Run `f` on behalf of the member `key`, recording it in the path of any error that comes out.
pub fn track<T, F: FnOnce() -> Result<T>>(key: PathKey, f: F) -> Result<T> {
    f().map_err(|e: Error| e.push(key))
}
