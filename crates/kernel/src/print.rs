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

//! Rendering of script values as the text a programmer sees.

use ahash::{AHashMap, AHashSet};
use warren_common::model::{Member, WorldObject};
use warren_var::{Obj, Var, Variant};

/// How the formatter finds the objects that values refer to.
pub trait ObjectResolver {
    fn resolve(&self, id: &Obj) -> Option<&WorldObject>;
}

/// A resolver which knows no objects, so that object references always render collapsed.
/// Used for values that have left the world they came from, such as thrown values.
pub struct Detached;

impl ObjectResolver for Detached {
    fn resolve(&self, _id: &Obj) -> Option<&WorldObject> {
        None
    }
}

/// Render `value`, expanding arrays, maps and objects while fewer than `depth` containers
/// enclose them. The same input and depth always produce the same text.
///
/// An object is expanded at most once per level it first appears at; a later reference at
/// the same or a deeper level renders collapsed, so shared references cannot multiply the
/// output.
pub fn format_value(resolver: &dyn ObjectResolver, value: &Var, depth: usize) -> String {
    let mut printer = Printer {
        resolver,
        depth,
        visiting: AHashSet::new(),
        expanded: AHashMap::new(),
    };
    printer.format(value, 0)
}

/// Quote a string the way results show them: single quotes, with quotes and backslashes escaped.
pub fn quote_str(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('\'');
    for c in s.chars() {
        match c {
            '\'' => quoted.push_str("\\'"),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            c => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

struct Printer<'a> {
    resolver: &'a dyn ObjectResolver,
    depth: usize,
    /// Objects currently being expanded, outermost first.
    visiting: AHashSet<Obj>,
    /// Every object expanded so far in this render, with the shallowest level it was expanded at.
    expanded: AHashMap<Obj, usize>,
}

impl Printer<'_> {
    fn format(&mut self, value: &Var, level: usize) -> String {
        match value.variant() {
            Variant::Str(s) => quote_str(s),
            Variant::Lambda(_) | Variant::Builtin(_) | Variant::Function(_) => {
                "[Function]".to_string()
            }
            Variant::Verb(v) => format!("[Verb {}({})]", v.name, v.args),
            Variant::List(l) => {
                if l.is_empty() {
                    return "[]".to_string();
                }
                if level >= self.depth {
                    return format!("[Array({})]", l.len());
                }
                let items: Vec<_> = l.iter().map(|v| self.format(v, level + 1)).collect();
                format!("[ {} ]", items.join(&separator(level)))
            }
            Variant::Map(m) => {
                if m.is_empty() {
                    return "{}".to_string();
                }
                if level >= self.depth {
                    return "[Object]".to_string();
                }
                let entries: Vec<_> = m
                    .iter()
                    .map(|(k, v)| format!("{}: {}", key(k), self.format(v, level + 1)))
                    .collect();
                format!("{{ {} }}", entries.join(&separator(level)))
            }
            Variant::Obj(o) => self.format_object(o, level),
            _ => value.to_text(),
        }
    }

    fn format_object(&mut self, id: &Obj, level: usize) -> String {
        if self.visiting.contains(id) {
            return format!("[Circular {id}]");
        }
        let resolver = self.resolver;
        let Some(object) = resolver.resolve(id) else {
            return format!("[object {id}]");
        };
        if level >= self.depth {
            return format!("[object {id}]");
        }
        if self.expanded.get(id).is_some_and(|seen| *seen <= level) {
            return format!("[object {id}]");
        }

        self.expanded.insert(id.clone(), level);
        self.visiting.insert(id.clone());
        let next = level + 1;
        let objs = |ids: &[Obj]| {
            Var::mk_list(&ids.iter().cloned().map(Var::mk_object).collect::<Vec<_>>())
        };
        let aliases: Vec<_> = object.aliases.iter().map(|a| Var::mk_str(a)).collect();
        let mut entries = vec![
            format!("id: {}", quote_str(object.id.as_str())),
            format!("name: {}", quote_str(&object.name)),
            format!("aliases: {}", self.format(&Var::mk_list(&aliases), next)),
            format!("traits: {}", self.format(&objs(&object.traits), next)),
            format!(
                "location: {}",
                match &object.location {
                    Some(location) => self.format(&Var::mk_object(location.clone()), next),
                    None => "null".to_string(),
                }
            ),
            format!("contents: {}", self.format(&objs(&object.contents), next)),
        ];
        for (name, member) in object.members() {
            let rendered = match member {
                Member::Value(v) => self.format(v, next),
                callable => self.format(&callable.to_var(), next),
            };
            entries.push(format!("{}: {rendered}", key(name)));
        }
        self.visiting.remove(id);

        format!("{{ {} }}", entries.join(&separator(level)))
    }
}

fn key(k: &str) -> String {
    if is_identifier(k) {
        k.to_string()
    } else {
        quote_str(k)
    }
}

/// Entries after the first go on their own line, indented two spaces per level of nesting.
fn separator(level: usize) -> String {
    format!(",\n{}", "  ".repeat(level + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use warren_var::{
        Function, Map, Verb, VerbArgsSpec, v_bool, v_empty_list, v_float, v_int, v_list, v_map,
        v_null, v_obj, v_str, v_undefined,
    };

    struct Objects(IndexMap<Obj, WorldObject>);

    impl ObjectResolver for Objects {
        fn resolve(&self, id: &Obj) -> Option<&WorldObject> {
            self.0.get(id)
        }
    }

    fn world() -> Objects {
        let mut root = WorldObject::new(Obj::mk_id("root"), "root");
        root.set_member(
            "greet",
            Member::Function(Arc::new(Function::new("(who) => 'Hello, ' + who.name"))),
        );
        root.set_member(
            "echo",
            Member::Verb(Arc::new(Verb {
                name: "echo".into(),
                code: "(args) => args".into(),
                pattern: "echo".into(),
                args: VerbArgsSpec::any(),
            })),
        );
        root.set_member("motto", Member::Value(v_str("it's fine")));
        let mut test = WorldObject::new(Obj::mk_id("test"), "test");
        test.traits.push(Obj::mk_id("root"));
        Objects(IndexMap::from([
            (root.id.clone(), root),
            (test.id.clone(), test),
        ]))
    }

    #[test]
    fn test_scalars() {
        let w = world();
        assert_eq!(format_value(&w, &v_int(4), 1), "4");
        assert_eq!(format_value(&w, &v_float(4.5), 1), "4.5");
        assert_eq!(format_value(&w, &v_bool(false), 1), "false");
        assert_eq!(format_value(&w, &v_null(), 1), "null");
        assert_eq!(format_value(&w, &v_undefined(), 1), "undefined");
        assert_eq!(format_value(&w, &v_str("it's"), 1), r"'it\'s'");
    }

    #[test]
    fn test_object_expansion() {
        let w = world();
        assert_eq!(
            format_value(&w, &v_obj(Obj::mk_id("root")), 1),
            "{ id: 'root',\n  name: 'root',\n  aliases: [],\n  traits: [],\n  location: null,\n  \
             contents: [],\n  greet: [Function],\n  echo: [Verb echo(any, any, any)],\n  \
             motto: 'it\\'s fine' }"
        );
    }

    #[test]
    fn test_collapsed_past_depth() {
        let w = world();
        let all = v_list(&[v_obj(Obj::mk_id("root")), v_obj(Obj::mk_id("test"))]);
        assert_eq!(format_value(&w, &all, 1), "[ [object root],\n  [object test] ]");
        assert_eq!(
            format_value(&w, &v_obj(Obj::mk_id("test")), 1),
            "{ id: 'test',\n  name: 'test',\n  aliases: [],\n  traits: [Array(1)],\n  \
             location: null,\n  contents: [] }"
        );
        assert_eq!(format_value(&w, &v_list(&[v_int(1)]), 0), "[Array(1)]");
        assert_eq!(format_value(&w, &v_empty_list(), 0), "[]");
        let m: Map = [("a", v_int(1))].into_iter().collect();
        assert_eq!(format_value(&w, &v_map(m.clone()), 0), "[Object]");
        assert_eq!(format_value(&w, &v_map(m), 1), "{ a: 1 }");
    }

    #[test]
    fn test_nested_indentation() {
        let w = world();
        let inner = v_list(&[v_int(1), v_int(2)]);
        let outer = v_list(&[inner.clone(), inner]);
        assert_eq!(
            format_value(&w, &outer, 2),
            "[ [ 1,\n    2 ],\n  [ 1,\n    2 ] ]"
        );
    }

    #[test]
    fn test_cycle_terminates() {
        let mut w = world();
        w.0.get_mut(&Obj::mk_id("test")).unwrap().location = Some(Obj::mk_id("root"));
        w.0.get_mut(&Obj::mk_id("root")).unwrap().contents = vec![Obj::mk_id("test")];
        let rendered = format_value(&w, &v_obj(Obj::mk_id("test")), usize::MAX);
        assert!(rendered.contains("contents: [ [Circular test] ]"));
        assert!(rendered.len() < 4096);
    }

    #[test]
    fn test_shared_references_expand_once() {
        let mut w = world();
        let ids: Vec<_> = (0..8).map(|i| Obj::mk_id(&format!("o{i}"))).collect();
        let peers = v_list(&ids.iter().cloned().map(v_obj).collect::<Vec<_>>());
        for id in &ids {
            let mut o = WorldObject::new(id.clone(), id.as_str());
            o.set_member("peers", Member::Value(peers.clone()));
            w.0.insert(id.clone(), o);
        }
        let rendered = format_value(&w, &v_obj(ids[0].clone()), 12);
        assert!(rendered.len() < 16 * 1024, "rendered {} bytes", rendered.len());
        assert_eq!(rendered.matches("id: 'o0'").count(), 1);
        for id in &ids {
            let expansions = rendered.matches(&format!("id: '{id}'")).count();
            assert!(expansions <= 6, "{id} expanded {expansions} times");
        }
        assert!(rendered.contains("peers: [ [Circular o0],
"));
        assert!(rendered.contains("[object o1]"));
    }

    #[test]
    fn test_repeated_reference_collapses() {
        let w = world();
        let twice = v_list(&[v_obj(Obj::mk_id("test")), v_obj(Obj::mk_id("test"))]);
        let rendered = format_value(&w, &twice, 2);
        assert_eq!(rendered.matches("id: 'test'").count(), 1);
        assert!(rendered.ends_with("[object test] ]"));
    }

    #[test]
    fn test_detached_objects_collapse() {
        assert_eq!(
            format_value(&Detached, &v_obj(Obj::mk_id("root")), 3),
            "[object root]"
        );
    }
}
