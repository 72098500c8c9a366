//! Property-based round-trip tests
//!
//! For any document built through the model API, serializing, parsing the
//! result and serializing again must reproduce the first text exactly.

use proptest::collection::{btree_map, vec};
use proptest::option;
use proptest::prelude::*;
use scxmlkit_codec::{parse, serialize, SerializeOptions};
use scxmlkit_model::{
    Assign, Binding, Cancel, Content, Custom, Data, Datamodel, Document, Else, ElseIf,
    ExecutableContent, Final, Finalize, Foreach, History, HistoryType, If, Invoke, Log, OnEntry,
    OnExit, Parallel, Param, Script, SendEvent, State, StateChild, Transition, TransitionType,
};

/// Identifiers and event names
fn id_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,6}"
}

/// Opaque text: printable ASCII, including markup-significant characters
fn text_strategy() -> impl Strategy<Value = String> {
    "[ -~]{0,12}"
}

fn opt_text() -> impl Strategy<Value = Option<String>> {
    option::of(text_strategy())
}

/// Extension tag names that never collide with a known element
fn custom_name_strategy() -> impl Strategy<Value = String> {
    prop_oneof!["ext[a-z]{1,5}", "my:ext[a-z]{1,3}"]
}

/// Extension attributes with short names, so repeats are common
fn attributes_strategy(
    size: std::ops::Range<usize>,
) -> impl Strategy<Value = Vec<(String, String)>> {
    vec(("[a-z]{1,2}", text_strategy()), size)
}

fn param_strategy() -> impl Strategy<Value = Param> {
    (id_strategy(), opt_text(), opt_text()).prop_map(|(name, expr, location)| Param {
        name,
        expr,
        location,
    })
}

fn content_strategy() -> impl Strategy<Value = Content> {
    (opt_text(), opt_text()).prop_map(|(expr, body)| Content { expr, body })
}

fn send_strategy() -> impl Strategy<Value = ExecutableContent> {
    (
        option::of(id_strategy()),
        opt_text(),
        opt_text(),
        opt_text(),
        opt_text(),
        vec(param_strategy(), 0..2),
        option::of(content_strategy()),
    )
        .prop_map(|(event, target, kind, delay, namelist, params, content)| {
            ExecutableContent::Send(SendEvent {
                event,
                target,
                kind,
                delay,
                namelist,
                params,
                content,
                ..Default::default()
            })
        })
}

fn leaf_action_strategy() -> impl Strategy<Value = ExecutableContent> {
    prop_oneof![
        id_strategy().prop_map(ExecutableContent::raise),
        (opt_text(), opt_text())
            .prop_map(|(label, expr)| ExecutableContent::Log(Log { label, expr })),
        (opt_text(), opt_text()).prop_map(|(sendid, sendidexpr)| {
            ExecutableContent::Cancel(Cancel { sendid, sendidexpr })
        }),
        (text_strategy(), opt_text(), opt_text()).prop_map(|(location, expr, src)| {
            ExecutableContent::Assign(Assign {
                location,
                expr,
                src,
            })
        }),
        (opt_text(), text_strategy())
            .prop_map(|(src, content)| ExecutableContent::Script(Script { src, content })),
        send_strategy(),
        (
            custom_name_strategy(),
            attributes_strategy(0..4),
            text_strategy(),
        )
            .prop_map(|(name, attributes, text)| {
                let mut custom = Custom::new(name);
                custom.attributes = attributes;
                ExecutableContent::Custom(custom.with_text(text))
            }),
    ]
}

fn action_strategy() -> impl Strategy<Value = ExecutableContent> {
    leaf_action_strategy().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            (
                text_strategy(),
                vec(inner.clone(), 0..3),
                vec((text_strategy(), vec(inner.clone(), 0..2)), 0..2),
                option::of(vec(inner.clone(), 0..2)),
            )
                .prop_map(|(cond, actions, else_ifs, else_branch)| {
                    ExecutableContent::If(If {
                        cond,
                        actions,
                        else_ifs: else_ifs
                            .into_iter()
                            .map(|(cond, actions)| ElseIf { cond, actions })
                            .collect(),
                        else_branch: else_branch.map(|actions| Else { actions }),
                    })
                }),
            (
                text_strategy(),
                text_strategy(),
                opt_text(),
                vec(inner.clone(), 0..3),
            )
                .prop_map(|(array, item, index, actions)| {
                    ExecutableContent::Foreach(Foreach {
                        array,
                        item,
                        index,
                        actions,
                    })
                }),
            (
                custom_name_strategy(),
                attributes_strategy(0..3),
                vec(inner, 0..3),
            )
                .prop_map(|(name, attributes, children)| {
                    let mut custom = Custom::new(name);
                    custom.attributes = attributes;
                    ExecutableContent::Custom(custom.with_children(children))
                }),
        ]
    })
}

fn actions_strategy() -> impl Strategy<Value = Vec<ExecutableContent>> {
    vec(action_strategy(), 0..3)
}

fn onentry_strategy() -> impl Strategy<Value = OnEntry> {
    (option::of(id_strategy()), actions_strategy()).prop_map(|(id, actions)| OnEntry { id, actions })
}

fn onexit_strategy() -> impl Strategy<Value = OnExit> {
    (option::of(id_strategy()), actions_strategy()).prop_map(|(id, actions)| OnExit { id, actions })
}

fn transition_strategy() -> impl Strategy<Value = Transition> {
    (
        vec(id_strategy(), 0..3),
        opt_text(),
        vec(id_strategy(), 0..3),
        any::<bool>(),
        actions_strategy(),
    )
        .prop_map(|(events, cond, targets, internal, actions)| Transition {
            id: None,
            events,
            cond,
            targets,
            kind: if internal {
                TransitionType::Internal
            } else {
                TransitionType::External
            },
            actions,
        })
}

fn history_strategy() -> impl Strategy<Value = History> {
    (id_strategy(), any::<bool>(), option::of(id_strategy())).prop_map(|(id, deep, target)| {
        let kind = if deep {
            HistoryType::Deep
        } else {
            HistoryType::Shallow
        };
        let history = History::new(id).with_type(kind);
        match target {
            Some(target) => history.with_default_target(target),
            None => history,
        }
    })
}

fn datamodel_strategy() -> impl Strategy<Value = Datamodel> {
    (
        option::of(id_strategy()),
        vec(
            (id_strategy(), opt_text(), opt_text(), opt_text()).prop_map(
                |(id, expr, location, content)| Data {
                    id,
                    src: None,
                    expr,
                    location,
                    content,
                },
            ),
            0..3,
        ),
    )
        .prop_map(|(id, data)| Datamodel { id, data })
}

fn invoke_strategy() -> impl Strategy<Value = Invoke> {
    (
        option::of(id_strategy()),
        opt_text(),
        opt_text(),
        any::<bool>(),
        vec(param_strategy(), 0..2),
        option::of(actions_strategy()),
        option::of(content_strategy()),
    )
        .prop_map(
            |(id, kind, src, autoforward, params, finalize, content)| Invoke {
                id,
                kind,
                src,
                autoforward,
                params,
                finalize: finalize.map(Finalize::new),
                content,
                ..Default::default()
            },
        )
}

fn final_strategy() -> impl Strategy<Value = StateChild> {
    (
        id_strategy(),
        option::of(onentry_strategy()),
        option::of(onexit_strategy()),
    )
        .prop_map(|(id, onentry, onexit)| StateChild::Final(Final { id, onentry, onexit }))
}

fn atomic_state_strategy() -> impl Strategy<Value = StateChild> {
    (
        id_strategy(),
        vec(transition_strategy(), 0..3),
        option::of(onentry_strategy()),
        option::of(datamodel_strategy()),
    )
        .prop_map(|(id, transitions, onentry, datamodel)| {
            StateChild::State(State {
                id,
                transitions,
                onentry,
                datamodel,
                ..Default::default()
            })
        })
}

fn state_child_strategy() -> impl Strategy<Value = StateChild> {
    prop_oneof![atomic_state_strategy(), final_strategy()].prop_recursive(
        3,
        16,
        3,
        |inner| {
            prop_oneof![
                (
                    id_strategy(),
                    option::of(id_strategy()),
                    vec(transition_strategy(), 0..2),
                    vec(inner.clone(), 1..3),
                    vec(history_strategy(), 0..2),
                    vec(invoke_strategy(), 0..2),
                    option::of(onexit_strategy()),
                )
                    .prop_map(
                        |(id, initial, transitions, children, histories, invokes, onexit)| {
                            StateChild::State(State {
                                id,
                                initial,
                                transitions,
                                children,
                                histories,
                                invokes,
                                onexit,
                                ..Default::default()
                            })
                        }
                    ),
                (
                    id_strategy(),
                    vec(transition_strategy(), 0..2),
                    vec(inner, 1..3),
                    option::of(datamodel_strategy()),
                )
                    .prop_map(|(id, transitions, children, datamodel)| {
                        StateChild::Parallel(Parallel {
                            id,
                            transitions,
                            children,
                            datamodel,
                            ..Default::default()
                        })
                    }),
            ]
        },
    )
}

fn document_strategy() -> impl Strategy<Value = Document> {
    (
        option::of(id_strategy()),
        option::of(id_strategy()),
        option::of(prop_oneof![Just(Binding::Early), Just(Binding::Late)]),
        btree_map("ns[a-z]{1,3}", "urn:[a-z]{1,8}", 0..3),
        vec(state_child_strategy(), 0..4),
        option::of(datamodel_strategy()),
        option::of((opt_text(), text_strategy())),
    )
        .prop_map(
            |(name, initial, binding, namespaces, children, datamodel, script)| {
                let mut doc = Document::new();
                doc.name = name;
                doc.initial = initial;
                doc.binding = binding;
                doc.namespaces.extend(namespaces);
                doc.children = children;
                doc.datamodel = datamodel;
                doc.script = script.map(|(src, content)| Script { src, content });
                doc
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn test_serialize_parse_serialize_is_identity(doc in document_strategy()) {
        let options = SerializeOptions::default();
        let first = serialize(&doc, &options);
        let reparsed = parse(&first).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(serialize(&reparsed, &options), first);
    }

    #[test]
    fn test_compact_roundtrip_is_identity(doc in document_strategy()) {
        let options = SerializeOptions::compact();
        let first = serialize(&doc, &options);
        let reparsed = parse(&first).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(serialize(&reparsed, &options), first);
    }

    #[test]
    fn test_parse_preserves_state_kinds(doc in document_strategy()) {
        let reparsed = parse(&serialize(&doc, &SerializeOptions::default()))
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let before: Vec<_> = doc.states().map(|s| s.kind()).collect();
        let after: Vec<_> = reparsed.states().map(|s| s.kind()).collect();
        prop_assert_eq!(before, after);
    }
}
