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
use indexmap::IndexMap;
use std::sync::Arc;
use strum::Display;
use warren_var::{Function, Obj, Var, Variant, Verb, v_bool};

/// The property that marks an object as a player.
pub const PLAYER_FLAG: &str = "player";

/// What a property bag entry holds.
#[derive(Clone, Debug, PartialEq)]
pub enum Member {
    Value(Var),
    Function(Arc<Function>),
    Verb(Arc<Verb>),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum MemberKind {
    Value,
    Function,
    Verb,
}

impl MemberKind {
    pub fn is_callable(&self) -> bool {
        !matches!(self, MemberKind::Value)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MemberInfo {
    pub name: ArcStr,
    pub kind: MemberKind,
}

impl Member {
    pub fn kind(&self) -> MemberKind {
        match self {
            Member::Value(_) => MemberKind::Value,
            Member::Function(_) => MemberKind::Function,
            Member::Verb(_) => MemberKind::Verb,
        }
    }

    pub fn to_var(&self) -> Var {
        match self {
            Member::Value(v) => v.clone(),
            Member::Function(f) => Var::from_variant(Variant::Function(f.clone())),
            Member::Verb(v) => Var::from_variant(Variant::Verb(v.clone())),
        }
    }

    /// Assigning a value to a property: lambdas become functions (keeping only their source),
    /// functions and verbs keep their kind, anything else is a plain value.
    pub fn from_var(var: Var) -> Self {
        match var.variant() {
            Variant::Lambda(l) => Member::Function(Arc::new(Function {
                source: l.source.clone(),
            })),
            Variant::Function(f) => Member::Function(f.clone()),
            Variant::Verb(v) => Member::Verb(v.clone()),
            _ => Member::Value(var),
        }
    }
}

/// A live object in the world.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldObject {
    pub id: Obj,
    pub name: String,
    pub aliases: Vec<String>,
    pub traits: Vec<Obj>,
    /// Where the object is. Weak: the location may no longer exist.
    pub location: Option<Obj>,
    /// Objects whose location is this one, maintained by the world.
    pub contents: Vec<Obj>,
    properties: IndexMap<ArcStr, Member>,
}

impl WorldObject {
    pub fn new(id: Obj, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            aliases: vec![],
            traits: vec![],
            location: None,
            contents: vec![],
            properties: IndexMap::new(),
        }
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.properties.get(name)
    }

    /// Create or overwrite a member. An overwritten member keeps its position.
    pub fn set_member(&mut self, name: &str, member: Member) {
        self.properties.insert(ArcStr::from(name), member);
    }

    pub fn members(&self) -> impl Iterator<Item = (&ArcStr, &Member)> {
        self.properties.iter()
    }

    /// Own members, in declaration order, with what kind each is.
    pub fn list_members(&self) -> Vec<MemberInfo> {
        self.properties
            .iter()
            .map(|(name, member)| MemberInfo {
                name: name.clone(),
                kind: member.kind(),
            })
            .collect()
    }

    pub fn is_player(&self) -> bool {
        matches!(self.member(PLAYER_FLAG), Some(Member::Value(v)) if v.is_true())
    }

    pub fn set_player(&mut self, player: bool) {
        self.set_member(PLAYER_FLAG, Member::Value(v_bool(player)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use warren_var::program::{Expr, LambdaBody};
    use warren_var::{Lambda, VerbArgsSpec, v_int, v_undefined};

    fn verb(name: &str) -> Arc<Verb> {
        Arc::new(Verb {
            name: ArcStr::from(name),
            code: ArcStr::from("() => 1"),
            pattern: ArcStr::from(name),
            args: VerbArgsSpec::any(),
        })
    }

    #[test]
    fn test_list_members_in_order() {
        let mut o = WorldObject::new(Obj::mk_id("root"), "root");
        o.set_member("greet", Member::Function(Arc::new(Function::new("() => 'hi'"))));
        o.set_member("echo", Member::Verb(verb("echo")));
        o.set_member("desc", Member::Value(v_int(1)));
        o.set_member("greet", Member::Value(v_int(2)));

        let members = o.list_members();
        let names: Vec<_> = members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["greet", "echo", "desc"]);
        assert_eq!(members[0].kind, MemberKind::Value);
        assert_eq!(members[1].kind, MemberKind::Verb);
        assert!(!members[2].kind.is_callable());
    }

    #[test]
    fn test_lambda_assignment_becomes_function() {
        let lambda = Lambda {
            params: vec![],
            body: Arc::new(LambdaBody::Expr(Expr::Value(v_int(1)))),
            source: ArcStr::from("() => 1"),
            captured: vec![],
            this: v_undefined(),
        };
        let member = Member::from_var(Var::mk_lambda(lambda));
        assert_eq!(member, Member::Function(Arc::new(Function::new("() => 1"))));
    }

    #[test]
    fn test_player_flag() {
        let mut o = WorldObject::new(Obj::mk_id("test"), "test");
        assert!(!o.is_player());
        o.set_player(true);
        assert!(o.is_player());
    }
}
