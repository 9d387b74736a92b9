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

use crate::var::Var;
use arcstr::ArcStr;
use indexmap::IndexMap;
use std::sync::Arc;

/// A string-keyed record of values (a script object literal). Keys keep insertion order, which is
/// also the order they are displayed in.
#[derive(Clone, Default, PartialEq)]
pub struct Map(Arc<IndexMap<ArcStr, Var>>);

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Var> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: &str, value: Var) {
        Arc::make_mut(&mut self.0).insert(ArcStr::from(key), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ArcStr, &Var)> {
        self.0.iter()
    }
}

impl<K: AsRef<str>> FromIterator<(K, Var)> for Map {
    fn from_iter<T: IntoIterator<Item = (K, Var)>>(iter: T) -> Self {
        Self(Arc::new(
            iter.into_iter()
                .map(|(k, v)| (ArcStr::from(k.as_ref()), v))
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::Map;
    use crate::{v_int, v_str};

    #[test]
    fn test_insertion_order_kept() {
        let mut m = Map::new();
        m.insert("zebra", v_int(1));
        m.insert("apple", v_int(2));
        m.insert("zebra", v_str("striped"));
        let keys: Vec<_> = m.iter().map(|(k, _)| k.as_str().to_string()).collect();
        assert_eq!(keys, vec!["zebra", "apple"]);
        assert_eq!(m.get("zebra"), Some(&v_str("striped")));
    }
}
