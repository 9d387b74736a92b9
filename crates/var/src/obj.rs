// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt::{Debug, Display, Formatter};

/// A reference to a world object, by its unique string identity.
///
/// References are weak: holding an `Obj` keeps nothing alive, and the object it names may have
/// been destroyed since the reference was taken.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Obj(ArcStr);

impl Obj {
    pub fn mk_id(id: &str) -> Self {
        Self(ArcStr::from(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `id` is usable as an object identity: non-empty, starting with a letter or `_`,
    /// and otherwise made of ASCII letters, digits, `_` and `-`.
    pub fn is_valid_id(id: &str) -> bool {
        let mut chars = id.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        (first.is_ascii_alphabetic() || first == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    }
}

impl Borrow<str> for Obj {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Obj {
    fn from(value: &str) -> Self {
        Self::mk_id(value)
    }
}

impl Display for Obj {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Debug for Obj {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Obj({})", self.0)
    }
}
