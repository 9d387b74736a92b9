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
use std::sync::Arc;

/// An ordered sequence of values. Cloning is cheap; mutation copies on write.
#[derive(Clone, Default, PartialEq)]
pub struct List(Arc<Vec<Var>>);

impl List {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_slice(values: &[Var]) -> Self {
        Self(Arc::new(values.to_vec()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Var> {
        self.0.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Var> {
        self.0.iter()
    }

    pub fn push(&mut self, value: Var) {
        Arc::make_mut(&mut self.0).push(value);
    }

    /// Replace the element at `index`, growing the list with `undefined` if needed.
    pub fn set(&mut self, index: usize, value: Var) {
        let values = Arc::make_mut(&mut self.0);
        if index >= values.len() {
            values.resize(index + 1, Var::mk_undefined());
        }
        values[index] = value;
    }

    pub fn as_slice(&self) -> &[Var] {
        &self.0
    }
}

impl FromIterator<Var> for List {
    fn from_iter<T: IntoIterator<Item = Var>>(iter: T) -> Self {
        Self(Arc::new(iter.into_iter().collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::List;
    use crate::{v_int, v_undefined};

    #[test]
    fn test_copy_on_write() {
        let a: List = [v_int(1), v_int(2)].into_iter().collect();
        let mut b = a.clone();
        b.push(v_int(3));
        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 3);
    }

    #[test]
    fn test_set_grows() {
        let mut l = List::new();
        l.set(2, v_int(5));
        assert_eq!(l.as_slice(), &[v_undefined(), v_undefined(), v_int(5)]);
    }
}
