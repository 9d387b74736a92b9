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

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};

/// Which shape of direct or indirect object a verb accepts.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum ArgSpec {
    None,
    Any,
    This,
}

impl ArgSpec {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Any => "any",
            Self::This => "this",
        }
    }

    #[must_use]
    pub fn from_string(repr: &str) -> Option<Self> {
        match repr {
            "none" => Some(Self::None),
            "any" => Some(Self::Any),
            "this" => Some(Self::This),
            _ => None,
        }
    }
}

impl Display for ArgSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of prepositions that are valid for verbs, corresponding to the set of string constants
/// defined in LambdaMOO 1.8.1.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Preposition {
    WithUsing,
    AtTo,
    InFrontOf,
    IntoIn,
    OnTopOfOn,
    OutOf,
    Over,
    Through,
    Under,
    Behind,
    Beside,
    ForAbout,
    Is,
    As,
    OffOf,
}

impl Preposition {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "with" | "using" => Some(Self::WithUsing),
            "at" | "to" => Some(Self::AtTo),
            "in front of" => Some(Self::InFrontOf),
            "in" | "inside" | "into" => Some(Self::IntoIn),
            "on top of" | "on" | "onto" | "upon" => Some(Self::OnTopOfOn),
            "out of" | "from inside" | "from" => Some(Self::OutOf),
            "over" => Some(Self::Over),
            "through" => Some(Self::Through),
            "under" | "underneath" | "beneath" => Some(Self::Under),
            "behind" => Some(Self::Behind),
            "beside" => Some(Self::Beside),
            "for" | "about" => Some(Self::ForAbout),
            "is" => Some(Self::Is),
            "as" => Some(Self::As),
            "off" | "off of" => Some(Self::OffOf),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WithUsing => "with/using",
            Self::AtTo => "at/to",
            Self::InFrontOf => "in front of",
            Self::IntoIn => "in/inside/into",
            Self::OnTopOfOn => "on top of/on/onto/upon",
            Self::OutOf => "out of/from inside/from",
            Self::Over => "over",
            Self::Through => "through",
            Self::Under => "under/underneath/beneath",
            Self::Behind => "behind",
            Self::Beside => "beside",
            Self::ForAbout => "for/about",
            Self::Is => "is",
            Self::As => "as",
            Self::OffOf => "off/off of",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum PrepSpec {
    Any,
    None,
    Other(Preposition),
}

impl PrepSpec {
    /// Accepts `any`, `none`, any single preposition word, or the slash-joined form that
    /// `Display` produces (so a stored spec reads back as itself).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "any" => Some(Self::Any),
            "none" => Some(Self::None),
            _ => Preposition::parse(s)
                .or_else(|| s.split('/').next().and_then(Preposition::parse))
                .map(Self::Other),
        }
    }
}

impl Display for PrepSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::None => f.write_str("none"),
            Self::Other(p) => f.write_str(p.as_str()),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct VerbArgsSpec {
    pub dobj: ArgSpec,
    pub prep: PrepSpec,
    pub iobj: ArgSpec,
}

impl VerbArgsSpec {
    #[must_use]
    pub fn any() -> Self {
        Self {
            dobj: ArgSpec::Any,
            prep: PrepSpec::Any,
            iobj: ArgSpec::Any,
        }
    }
}

impl Display for VerbArgsSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}, {}", self.dobj, self.prep, self.iobj)
    }
}

// Argument roles travel as their string forms ("any", "none", "with/using"...) in both the
// persisted records and the edit descriptors.

impl Serialize for ArgSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ArgSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_string(&s)
            .ok_or_else(|| D::Error::custom(format!("invalid argument spec: {s:?}")))
    }
}

impl Serialize for PrepSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PrepSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).ok_or_else(|| D::Error::custom(format!("invalid preposition: {s:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("any", PrepSpec::Any)]
    #[test_case("none", PrepSpec::None)]
    #[test_case("with", PrepSpec::Other(Preposition::WithUsing))]
    #[test_case("with/using", PrepSpec::Other(Preposition::WithUsing))]
    #[test_case("on top of/on/onto/upon", PrepSpec::Other(Preposition::OnTopOfOn))]
    #[test_case("in front of", PrepSpec::Other(Preposition::InFrontOf))]
    fn test_prep_parse(s: &str, expected: PrepSpec) {
        assert_eq!(PrepSpec::parse(s), Some(expected));
    }

    #[test]
    fn test_stored_prep_reads_back() {
        let spec = PrepSpec::Other(Preposition::OutOf);
        assert_eq!(PrepSpec::parse(&spec.to_string()), Some(spec));
    }

    #[test]
    fn test_display_args() {
        assert_eq!(VerbArgsSpec::any().to_string(), "any, any, any");
        let spec = VerbArgsSpec {
            dobj: ArgSpec::This,
            prep: PrepSpec::Other(Preposition::AtTo),
            iobj: ArgSpec::None,
        };
        assert_eq!(spec.to_string(), "this, at/to, none");
    }

    #[test]
    fn test_serde_strings() {
        let json = serde_json::to_string(&ArgSpec::This).unwrap();
        assert_eq!(json, "\"this\"");
        let prep: PrepSpec = serde_json::from_str("\"at\"").unwrap();
        assert_eq!(prep, PrepSpec::Other(Preposition::AtTo));
        assert!(serde_json::from_str::<ArgSpec>("\"sometimes\"").is_err());
    }
}
