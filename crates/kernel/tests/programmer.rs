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

//! Programmer operations: eval, search, fetching and saving verbs and functions, and the JSON
//! dispatcher in front of them.

use pretty_assertions::assert_eq;
use serde_json::json;
use unindent::unindent;
use warren_common::model::{
    FunctionDescriptor, SaveOutcome, SaveVerbRequest, SearchHit, SearchResult, StoredProperty,
    VerbDescriptor,
};
use warren_db::Store;
use warren_kernel::Config;
use warren_kernel::testing::TestWorld;
use warren_var::{ArgSpec, PrepSpec, Preposition};

fn look_verb() -> SaveVerbRequest {
    SaveVerbRequest {
        object_id: "root".to_string(),
        verb: VerbDescriptor {
            name: "look".to_string(),
            code: "(args) => this.name".to_string(),
            pattern: "look l".to_string(),
            dobjarg: ArgSpec::Any,
            preparg: PrepSpec::Other(Preposition::AtTo),
            iobjarg: ArgSpec::None,
        },
    }
}

#[test]
fn test_eval_renders_results_and_errors() {
    let tw = TestWorld::new();
    let controller = tw.controller();
    assert_eq!(controller.eval("2 + 2"), "4");

    let error = controller.eval("asdf");
    assert!(error.contains("ReferenceError: asdf is not defined"));
    assert!(error.starts_with("\u{1b}["), "{error:?}");
}

#[test]
fn test_eval_respects_print_depth() {
    let mut config = Config::default();
    config.eval.print_depth = 2;
    let tw = TestWorld::with_config(config);
    assert_eq!(tw.controller().eval("[[1]]"), "[ [ 1 ] ]");
}

#[test]
fn test_step_budget() {
    let mut config = Config::default();
    config.eval.max_steps = Some(1000);
    let tw = TestWorld::with_config(config);
    assert!(
        tw.controller()
            .eval("while (true) {}")
            .contains("RangeError: step budget exhausted")
    );
}

#[test]
fn test_call_depth_limit() {
    let mut config = Config::default();
    config.eval.max_depth = 32;
    let tw = TestWorld::with_config(config);
    let controller = tw.controller();
    controller.eval("root.spin = (n) => this.spin(n + 1)");
    assert!(
        controller
            .eval("root.spin(0)")
            .contains("RangeError: Maximum call stack size exceeded")
    );
}

#[test]
fn test_search_lists_only_callables() {
    let tw = TestWorld::new();
    let all = tw.controller().search("");
    assert_eq!(
        all,
        vec![
            SearchResult {
                search_str: "root.greet".to_string(),
                object_id: "root".to_string(),
                hit: SearchHit::Function("greet".to_string()),
            },
            SearchResult {
                search_str: "root.echo".to_string(),
                object_id: "root".to_string(),
                hit: SearchHit::Verb("echo".to_string()),
            },
        ]
    );
}

#[test]
fn test_search_ranks_and_caps() {
    let mut config = Config::default();
    config.search.max_results = 3;
    let tw = TestWorld::with_config(config);
    let controller = tw.controller();
    controller.eval("test.echoes = () => 1; test.each = () => 2; test.etch = () => 3");

    let hits: Vec<_> = controller
        .search("echo")
        .into_iter()
        .map(|r| r.search_str)
        .collect();
    assert_eq!(hits, vec!["root.echo", "test.echoes"]);

    assert_eq!(controller.search("e").len(), 3);
    assert!(controller.search("zzz").is_empty());
}

#[test]
fn test_search_ties_keep_enumeration_order() {
    let tw = TestWorld::new();
    let controller = tw.controller();
    let code = unindent(
        "
        let i = 10
        while (i < 70) {
            root.new('o' + i, { ping: () => 1 })
            i = i + 1
        }
        ",
    );
    controller.eval(&code);

    let hits: Vec<_> = controller
        .search("ping")
        .into_iter()
        .map(|r| r.search_str)
        .collect();
    let expected: Vec<_> = (10..60).map(|i| format!("o{i}.ping")).collect();
    assert_eq!(hits, expected);
}

#[test]
fn test_search_sees_new_objects() {
    let tw = TestWorld::new();
    let controller = tw.controller();
    controller.eval("root.new('box', { open: () => true })");
    let hits: Vec<_> = controller
        .search("box.open")
        .into_iter()
        .map(|r| r.search_str)
        .collect();
    assert_eq!(hits, vec!["box.open"]);
}

#[test]
fn test_get_verb_and_function() {
    let tw = TestWorld::new();
    let controller = tw.controller();

    let verb = controller.get_verb("root", "echo").unwrap();
    assert_eq!(verb.object_id, "root");
    assert_eq!(verb.verb.code, "(args) => args");
    assert_eq!(verb.verb.pattern, "echo");
    assert_eq!(verb.verb.preparg, PrepSpec::Any);

    let function = controller.get_function("root", "greet").unwrap();
    assert_eq!(
        function,
        FunctionDescriptor {
            object_id: "root".to_string(),
            src: "(who) => who.send('Hello, ' + who.name + '!')".to_string(),
            name: "greet".to_string(),
        }
    );

    assert_eq!(controller.get_verb("root", "greet"), None);
    assert_eq!(controller.get_function("root", "echo"), None);
    assert_eq!(controller.get_function("root", "desc"), None);
    assert_eq!(controller.get_verb("root", "missing"), None);
    assert_eq!(controller.get_verb("nobody", "echo"), None);
}

#[test]
fn test_get_resolves_through_traits() {
    let tw = TestWorld::new();
    let controller = tw.controller();
    assert_eq!(controller.eval("test.echo"), "[Verb echo(any, any, any)]");

    let verb = controller.get_verb("test", "echo").unwrap();
    assert_eq!(verb.object_id, "test");
    assert_eq!(verb.verb.code, "(args) => args");

    let function = controller.get_function("test", "greet").unwrap();
    assert_eq!(function.object_id, "test");
    assert_eq!(function.src, "(who) => who.send('Hello, ' + who.name + '!')");

    controller.eval("test.greet = () => 'mine'");
    assert_eq!(controller.get_function("test", "greet").unwrap().src, "() => 'mine'");
    assert_eq!(
        controller.get_function("root", "greet").unwrap().src,
        "(who) => who.send('Hello, ' + who.name + '!')"
    );
    assert_eq!(controller.get_verb("test", "greet"), None);
}

#[test]
fn test_save_verb() {
    let tw = TestWorld::new();
    let controller = tw.controller();

    assert_eq!(controller.save_verb(&look_verb()), SaveOutcome::Saved);
    let record = tw.store.find_by_id("root").unwrap().unwrap();
    assert_eq!(
        record.properties.get("look"),
        Some(&StoredProperty::Verb {
            verb: "(args) => this.name".to_string(),
            pattern: "look l".to_string(),
            dobjarg: ArgSpec::Any,
            preparg: PrepSpec::Other(Preposition::AtTo),
            iobjarg: ArgSpec::None,
        })
    );

    // Saving again changes nothing.
    assert_eq!(controller.save_verb(&look_verb()), SaveOutcome::Saved);
    assert_eq!(tw.store.find_by_id("root").unwrap().unwrap(), record);

    // The live object only sees the edit after a reload.
    assert_eq!(controller.get_verb("root", "look"), None);
    tw.reload();
    let verb = controller.get_verb("root", "look").unwrap();
    assert_eq!(verb.verb.preparg.to_string(), "at/to");
    assert_eq!(controller.eval("root.look()"), "'root'");
}

#[test]
fn test_save_function_overwrites_in_place() {
    let tw = TestWorld::new();
    let controller = tw.controller();
    let request = FunctionDescriptor {
        object_id: "root".to_string(),
        src: "(who) => 'Hi ' + who.name".to_string(),
        name: "greet".to_string(),
    };
    assert_eq!(controller.save_function(&request), SaveOutcome::Saved);

    let record = tw.store.find_by_id("root").unwrap().unwrap();
    let names: Vec<_> = record.properties.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["greet", "echo", "desc", "empty"]);
    assert_eq!(record.id.as_str(), "root");
    assert_eq!(record.location, None);

    tw.reload();
    assert_eq!(controller.eval("root.greet(test)"), "'Hi test'");
}

#[test]
fn test_save_to_missing_object() {
    let tw = TestWorld::new();
    let controller = tw.controller();
    let before = tw.store.all_records().unwrap();

    let mut request = look_verb();
    request.object_id = "nobody".to_string();
    assert_eq!(controller.save_verb(&request), SaveOutcome::NoSuchObject);
    let function = FunctionDescriptor {
        object_id: "nobody".to_string(),
        src: "() => 1".to_string(),
        name: "f".to_string(),
    };
    assert_eq!(controller.save_function(&function), SaveOutcome::NoSuchObject);

    assert_eq!(tw.store.all_records().unwrap(), before);
}

#[test]
fn test_dispatch() {
    let tw = TestWorld::new();
    let controller = tw.controller();

    assert_eq!(
        controller.dispatch(r#"{"op": "eval", "code": "2 + 2"}"#),
        json!("4")
    );
    assert_eq!(
        controller.dispatch(r#"{"op": "search", "query": "greet"}"#),
        json!([{"searchStr": "root.greet", "objectId": "root", "function": "greet"}])
    );
    assert_eq!(
        controller.dispatch(r#"{"op": "getVerb", "objectId": "root", "name": "echo"}"#),
        json!({
            "objectId": "root",
            "verb": {
                "name": "echo",
                "code": "(args) => args",
                "pattern": "echo",
                "dobjarg": "any",
                "preparg": "any",
                "iobjarg": "any"
            }
        })
    );
    assert_eq!(
        controller.dispatch(r#"{"op": "getFunction", "objectId": "root", "name": "nope"}"#),
        json!(null)
    );
    assert_eq!(
        controller.dispatch(
            r#"{"op": "saveFunction", "objectId": "nobody", "src": "() => 1", "name": "f"}"#
        ),
        json!("no such object")
    );
}

#[test]
fn test_dispatch_rejects_malformed_requests() {
    let tw = TestWorld::new();
    let controller = tw.controller();
    for request in [
        "not json",
        r#"{"op": "getVerb"}"#,
        r#"{"op": "dance"}"#,
        r#"{"op": "saveVerb", "objectId": "root", "verb": {"name": "x", "code": "",
            "pattern": "x", "dobjarg": "string", "preparg": "none", "iobjarg": "none"}}"#,
    ] {
        let response = controller.dispatch(request);
        assert!(response.get("error").is_some(), "{request}: {response}");
    }
    assert_eq!(
        tw.store.find_by_id("root").unwrap().unwrap().properties.get("x"),
        None
    );
}

#[test]
fn test_saved_function_survives_restart() {
    use std::sync::{Arc, Mutex};
    use warren_common::tasks::NoopClientSession;
    use warren_db::{DatabaseConfig, FjallStore};
    use warren_kernel::WorldState;
    use warren_kernel::bootstrap::seed_records;
    use warren_var::Obj;

    let dir = tempfile::tempdir().unwrap();
    let db_config = DatabaseConfig::default();
    let open = || {
        let (store, fresh) = FjallStore::open(dir.path(), &db_config).unwrap();
        if fresh {
            for record in seed_records("test") {
                store.save(&record).unwrap();
            }
        }
        let store = Arc::new(store);
        let world = WorldState::from_records(
            &store.all_records().unwrap(),
            Arc::new(NoopClientSession::new()),
            Config::default().eval,
        );
        warren_kernel::ProgrammerController::new(
            Arc::new(Mutex::new(world)),
            store,
            Obj::mk_id("test"),
            Config::default(),
        )
    };

    let controller = open();
    let request = FunctionDescriptor {
        object_id: "root".to_string(),
        src: "(n) => n * 2".to_string(),
        name: "double".to_string(),
    };
    assert_eq!(controller.save_function(&request), SaveOutcome::Saved);
    controller.store().sync().unwrap();
    drop(controller);

    let controller = open();
    assert_eq!(controller.eval("root.double(21)"), "42");
    assert_eq!(controller.get_function("root", "double"), Some(request));
}
