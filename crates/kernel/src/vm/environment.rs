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
use warren_var::{Lambda, Var};

/// Variable bindings visible to running code, innermost scope last, plus the `this` value.
#[derive(Debug, Clone)]
pub struct Environment {
    scopes: Vec<Vec<(ArcStr, Var)>>,
    this: Var,
}

impl Environment {
    pub fn new(this: Var) -> Self {
        Self {
            scopes: vec![vec![]],
            this,
        }
    }

    /// The environment a lambda's body starts with: what it captured, and the `this` it was
    /// created under.
    pub fn for_lambda(lambda: &Lambda) -> Self {
        let mut env = Self::new(lambda.this.clone());
        for (name, value) in &lambda.captured {
            env.declare(name, value.clone());
        }
        env.push_scope();
        env
    }

    pub fn this(&self) -> &Var {
        &self.this
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(vec![]);
    }

    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn get(&self, name: &str) -> Option<&Var> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.iter().rev().find(|(n, _)| n == name).map(|(_, v)| v))
    }

    /// Bind `name` in the innermost scope, replacing an existing binding there.
    pub fn declare(&mut self, name: &ArcStr, value: Var) {
        let Some(scope) = self.scopes.last_mut() else {
            return;
        };
        match scope.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = value,
            None => scope.push((name.clone(), value)),
        }
    }

    /// Update the nearest existing binding of `name`. Returns false if there is none.
    pub fn assign(&mut self, name: &str, value: Var) -> bool {
        for scope in self.scopes.iter_mut().rev() {
            if let Some((_, slot)) = scope.iter_mut().find(|(n, _)| n == name) {
                *slot = value;
                return true;
            }
        }
        false
    }

    /// Bind `name` in the outermost scope, as assigning to an undeclared name does.
    pub fn declare_global(&mut self, name: &ArcStr, value: Var) {
        if let Some(scope) = self.scopes.first_mut() {
            scope.push((name.clone(), value));
        }
    }

    /// Every visible binding, outer scopes first, for a closure to capture.
    pub fn capture(&self) -> Vec<(ArcStr, Var)> {
        self.scopes.iter().flatten().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use warren_var::{v_int, v_undefined};

    #[test]
    fn test_scoping() {
        let mut env = Environment::new(v_undefined());
        let x = ArcStr::from("x");
        env.declare(&x, v_int(1));
        env.push_scope();
        env.declare(&x, v_int(2));
        assert_eq!(env.get("x"), Some(&v_int(2)));
        env.pop_scope();
        assert_eq!(env.get("x"), Some(&v_int(1)));
        assert!(env.assign("x", v_int(3)));
        assert!(!env.assign("y", v_int(3)));
        assert_eq!(env.get("x"), Some(&v_int(3)));
    }

    #[test]
    fn test_capture_keeps_shadowing_order() {
        let mut env = Environment::new(v_undefined());
        let x = ArcStr::from("x");
        env.declare(&x, v_int(1));
        env.push_scope();
        env.declare(&x, v_int(2));
        let captured = env.capture();
        assert_eq!(captured.len(), 2);
        assert_eq!(captured[1].1, v_int(2));
    }
}
