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

use crate::error::Error;
use crate::list::List;
use crate::map::Map;
use crate::obj::Obj;
use crate::program::{BinaryOp, Builtin, Lambda};
use crate::variant::Variant;
use arcstr::ArcStr;
use std::cmp::Ordering;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

#[derive(Clone, PartialEq)]
pub struct Var(Variant);

impl Debug for Var {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.variant())
    }
}

impl Default for Var {
    fn default() -> Self {
        Self::mk_undefined()
    }
}

impl Var {
    pub fn from_variant(variant: Variant) -> Self {
        Var(variant)
    }

    pub fn mk_undefined() -> Self {
        Var(Variant::Undefined)
    }

    pub fn mk_null() -> Self {
        Var(Variant::Null)
    }

    pub fn mk_integer(i: i64) -> Self {
        Var(Variant::Int(i))
    }

    pub fn mk_float(f: f64) -> Self {
        Var(Variant::Float(f))
    }

    pub fn mk_str(s: &str) -> Self {
        Var(Variant::Str(s.into()))
    }

    pub fn mk_string(s: String) -> Self {
        Var(Variant::Str(s.into()))
    }

    pub fn mk_bool(b: bool) -> Self {
        Var(Variant::Bool(b))
    }

    pub fn mk_object(o: Obj) -> Self {
        Var(Variant::Obj(o))
    }

    pub fn mk_list(values: &[Var]) -> Self {
        Var(Variant::List(List::from_slice(values)))
    }

    pub fn mk_lambda(lambda: Lambda) -> Self {
        Var(Variant::Lambda(Arc::new(lambda)))
    }

    pub fn variant(&self) -> &Variant {
        &self.0
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self.0, Variant::Undefined | Variant::Null)
    }

    /// Anything a script can call: lambdas, host builtins, stored functions and verbs.
    pub fn is_callable(&self) -> bool {
        matches!(
            self.0,
            Variant::Lambda(_) | Variant::Builtin(_) | Variant::Function(_) | Variant::Verb(_)
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.0 {
            Variant::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match &self.0 {
            Variant::Int(i) => Some(*i as f64),
            Variant::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// The `typeof` name of the value.
    pub fn type_name(&self) -> &'static str {
        match &self.0 {
            Variant::Undefined => "undefined",
            Variant::Null | Variant::List(_) | Variant::Map(_) | Variant::Obj(_) => "object",
            Variant::Bool(_) => "boolean",
            Variant::Int(_) | Variant::Float(_) => "number",
            Variant::Str(_) => "string",
            Variant::Lambda(_) | Variant::Builtin(_) | Variant::Function(_) | Variant::Verb(_) => {
                "function"
            }
        }
    }

    pub fn is_true(&self) -> bool {
        match &self.0 {
            Variant::Undefined | Variant::Null => false,
            Variant::Bool(b) => *b,
            Variant::Int(i) => *i != 0,
            Variant::Float(f) => *f != 0.0 && !f.is_nan(),
            Variant::Str(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// String conversion as used by concatenation and by text sent to players. This is not the
    /// programmer-facing rendering, which lives with the result formatter.
    pub fn to_text(&self) -> String {
        match &self.0 {
            Variant::Undefined => "undefined".to_string(),
            Variant::Null => "null".to_string(),
            Variant::Bool(b) => b.to_string(),
            Variant::Int(i) => i.to_string(),
            Variant::Float(f) => format_float(*f),
            Variant::Str(s) => s.to_string(),
            Variant::List(l) => l.iter().map(|v| v.to_text()).collect::<Vec<_>>().join(","),
            Variant::Map(_) => "[object Object]".to_string(),
            Variant::Obj(o) => format!("[object {o}]"),
            Variant::Lambda(l) => l.source.to_string(),
            Variant::Builtin(b) => format!("function {}() {{ [native code] }}", b.name),
            Variant::Function(f) => f.source.to_string(),
            Variant::Verb(v) => v.code.to_string(),
        }
    }

    pub fn add(&self, other: &Var) -> Result<Var, Error> {
        match (&self.0, &other.0) {
            (Variant::Str(_), _) | (_, Variant::Str(_)) => {
                let mut s = self.to_text();
                s.push_str(&other.to_text());
                Ok(v_string(s))
            }
            (Variant::Int(l), Variant::Int(r)) => Ok(l
                .checked_add(*r)
                .map(v_int)
                .unwrap_or_else(|| v_float(*l as f64 + *r as f64))),
            _ => self.numeric(BinaryOp::Add, other, |l, r| l + r),
        }
    }

    pub fn sub(&self, other: &Var) -> Result<Var, Error> {
        if let (Variant::Int(l), Variant::Int(r)) = (&self.0, &other.0) {
            return Ok(l
                .checked_sub(*r)
                .map(v_int)
                .unwrap_or_else(|| v_float(*l as f64 - *r as f64)));
        }
        self.numeric(BinaryOp::Sub, other, |l, r| l - r)
    }

    pub fn mul(&self, other: &Var) -> Result<Var, Error> {
        if let (Variant::Int(l), Variant::Int(r)) = (&self.0, &other.0) {
            return Ok(l
                .checked_mul(*r)
                .map(v_int)
                .unwrap_or_else(|| v_float(*l as f64 * *r as f64)));
        }
        self.numeric(BinaryOp::Mul, other, |l, r| l * r)
    }

    /// Integer division stays integral only when exact; dividing by zero gives the IEEE result
    /// (`Infinity`, `NaN`) rather than an error.
    pub fn div(&self, other: &Var) -> Result<Var, Error> {
        if let (Variant::Int(l), Variant::Int(r)) = (&self.0, &other.0)
            && *r != 0
            && l.checked_rem(*r) == Some(0)
        {
            return Ok(v_int(l / r));
        }
        self.numeric(BinaryOp::Div, other, |l, r| l / r)
    }

    pub fn modulus(&self, other: &Var) -> Result<Var, Error> {
        if let (Variant::Int(l), Variant::Int(r)) = (&self.0, &other.0)
            && let Some(rem) = l.checked_rem(*r)
        {
            return Ok(v_int(rem));
        }
        self.numeric(BinaryOp::Mod, other, |l, r| l % r)
    }

    pub fn negative(&self) -> Result<Var, Error> {
        match &self.0 {
            Variant::Int(i) => Ok(i
                .checked_neg()
                .map(v_int)
                .unwrap_or_else(|| v_float(-(*i as f64)))),
            Variant::Float(f) => Ok(v_float(-*f)),
            _ => Err(Error::type_error(format!(
                "Cannot negate a value of type {}",
                self.type_name()
            ))),
        }
    }

    fn numeric(&self, op: BinaryOp, other: &Var, f: fn(f64, f64) -> f64) -> Result<Var, Error> {
        match (self.as_number(), other.as_number()) {
            (Some(l), Some(r)) => Ok(v_float(f(l, r))),
            _ => Err(Error::type_error(format!(
                "Cannot apply '{op}' to {} and {}",
                self.type_name(),
                other.type_name()
            ))),
        }
    }

    pub fn strict_eq(&self, other: &Var) -> bool {
        self == other
    }

    /// `==`: like `===`, except that `null` and `undefined` are equal to each other.
    pub fn loose_eq(&self, other: &Var) -> bool {
        (self.is_nullish() && other.is_nullish()) || self == other
    }

    /// Ordering for the relational operators; only numbers with numbers and strings with strings
    /// are comparable.
    pub fn compare(&self, op: BinaryOp, other: &Var) -> Result<Option<Ordering>, Error> {
        match (&self.0, &other.0) {
            (Variant::Str(l), Variant::Str(r)) => Ok(Some(l.cmp(r))),
            _ => match (self.as_number(), other.as_number()) {
                (Some(l), Some(r)) => Ok(l.partial_cmp(&r)),
                _ => Err(Error::type_error(format!(
                    "Cannot compare {} {op} {}",
                    self.type_name(),
                    other.type_name()
                ))),
            },
        }
    }
}

/// Number rendering: integral floats print without a fractional part, the IEEE specials print
/// by name.
pub(crate) fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        format!("{f}")
    }
}

pub fn v_undefined() -> Var {
    Var::mk_undefined()
}

pub fn v_null() -> Var {
    Var::mk_null()
}

pub fn v_int(i: i64) -> Var {
    Var::mk_integer(i)
}

pub fn v_float(f: f64) -> Var {
    Var::mk_float(f)
}

pub fn v_bool(b: bool) -> Var {
    Var::mk_bool(b)
}

pub fn v_str(s: &str) -> Var {
    Var::mk_str(s)
}

pub fn v_string(s: String) -> Var {
    Var::mk_string(s)
}

pub fn v_obj(o: Obj) -> Var {
    Var::mk_object(o)
}

pub fn v_list(values: &[Var]) -> Var {
    Var::mk_list(values)
}

pub fn v_list_iter<IT: IntoIterator<Item = Var>>(values: IT) -> Var {
    Var::from_variant(Variant::List(values.into_iter().collect()))
}

pub fn v_empty_list() -> Var {
    Var::from_variant(Variant::List(List::new()))
}

pub fn v_map(map: Map) -> Var {
    Var::from_variant(Variant::Map(map))
}

pub fn v_empty_map() -> Var {
    v_map(Map::new())
}

pub fn v_builtin(name: &str, receiver: Option<Obj>) -> Var {
    Var::from_variant(Variant::Builtin(Arc::new(Builtin {
        name: ArcStr::from(name),
        receiver,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(v_int(2), v_int(2), v_int(4); "ints")]
    #[test_case(v_int(1), v_float(0.5), v_float(1.5); "mixed")]
    #[test_case(v_str("a"), v_int(1), v_str("a1"); "concat")]
    #[test_case(v_str("n="), v_null(), v_str("n=null"); "concat null")]
    #[test_case(v_int(i64::MAX), v_int(1), v_float(i64::MAX as f64 + 1.0); "overflow")]
    fn test_add(l: Var, r: Var, expected: Var) {
        assert_eq!(l.add(&r).unwrap(), expected);
    }

    #[test]
    fn test_div() {
        assert_eq!(v_int(8).div(&v_int(2)).unwrap(), v_int(4));
        assert_eq!(v_int(7).div(&v_int(2)).unwrap(), v_float(3.5));
        let inf = v_int(1).div(&v_int(0)).unwrap();
        assert_eq!(inf.to_text(), "Infinity");
        assert_eq!(v_int(0).div(&v_int(0)).unwrap().to_text(), "NaN");
    }

    #[test]
    fn test_type_errors() {
        let e = v_str("a").sub(&v_int(1)).unwrap_err();
        assert_eq!(e.to_string(), "TypeError: Cannot apply '-' to string and number");
        assert!(v_list(&[]).compare(BinaryOp::Lt, &v_int(1)).is_err());
    }

    #[test]
    fn test_equality() {
        assert!(v_int(4).strict_eq(&v_float(4.0)));
        assert!(!v_null().strict_eq(&v_undefined()));
        assert!(v_null().loose_eq(&v_undefined()));
        assert!(!v_str("1").loose_eq(&v_int(1)));
    }

    #[test]
    fn test_truthiness() {
        assert!(!v_str("").is_true());
        assert!(v_empty_list().is_true());
        assert!(!v_float(f64::NAN).is_true());
        assert!(v_obj(Obj::mk_id("root")).is_true());
    }

    #[test]
    fn test_float_text() {
        assert_eq!(v_float(4.0).to_text(), "4");
        assert_eq!(v_float(0.25).to_text(), "0.25");
        assert_eq!(v_float(f64::NEG_INFINITY).to_text(), "-Infinity");
    }
}
