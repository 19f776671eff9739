//! Property tests for heat dial bounds and the text round-trip

use proptest::prelude::*;
use style_overlay_core::{
    load_profile, parse_profile, Cadence, CognitiveDriver, Mode, OutputShape, OverlayError,
    StyleProfile,
};

fn word() -> impl Strategy<Value = String> {
    "[a-z]{1,6}"
}

fn phrase() -> impl Strategy<Value = String> {
    "[a-z]{1,6}( [a-z]{1,6}){0,2}"
}

fn optional(section: impl Strategy<Value = String>) -> impl Strategy<Value = String> {
    prop::option::of(section).prop_map(Option::unwrap_or_default)
}

fn polarity_text() -> impl Strategy<Value = String> {
    ("[A-Z]{2,4}", "[A-Z]{2,4}", any::<bool>()).prop_map(|(left, right, flow)| {
        if flow {
            format!("polarity_dual: [{}, {}]\n", left, right)
        } else {
            format!("polarity_dual: {} ↔ {}\n", left, right)
        }
    })
}

fn heat_text() -> impl Strategy<Value = String> {
    let sectioned = (1u8..=5, 1u8..=5)
        .prop_map(|(a, b)| (a.min(b), a.max(b)))
        .prop_flat_map(|(low, high)| {
            (
                Just((low, high)),
                low..=high,
                prop::option::of((low..=high, low..=high)),
                any::<bool>(),
            )
        })
        .prop_map(|((low, high), level, roast, inline)| {
            let mut text =
                format!("heat_dial:\n  - scale: {}–{}\n  - default: {}", low, high, level);
            match roast.map(|(a, b)| (a.min(b), a.max(b))) {
                Some((a, b)) if inline => text.push_str(&format!(" (roast: {}–{})\n", a, b)),
                Some((a, b)) => text.push_str(&format!("\n  - roast: {}–{}\n", a, b)),
                None => text.push('\n'),
            }
            text
        });
    prop_oneof![
        (1u8..=5).prop_map(|level| format!("heat_dial: {}\n", level)),
        sectioned,
    ]
}

fn lexicon_text() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(word(), 0..4),
        prop::collection::btree_map("[a-z]{1,6}_terms", prop::collection::vec(word(), 1..4), 0..3),
    )
        .prop_map(|(terms, categories)| {
            if terms.is_empty() && categories.is_empty() {
                return String::new();
            }
            let mut text = String::from("lexicon_bias:\n");
            if !terms.is_empty() {
                text.push_str(&format!("  - {}\n", terms.join(", ")));
            }
            for (name, terms) in categories {
                text.push_str(&format!("  - {}: {}\n", name, terms.join(", ")));
            }
            text
        })
}

fn drivers_text() -> impl Strategy<Value = String> {
    prop::sample::subsequence(CognitiveDriver::ALL.to_vec(), 1..=4)
        .prop_flat_map(|drivers| {
            let notes = prop::collection::vec(prop::option::of(phrase()), drivers.len());
            (Just(drivers), notes)
        })
        .prop_map(|(drivers, notes)| {
            let mut text = String::from("cognitive_drivers:\n");
            for (driver, note) in drivers.iter().zip(notes) {
                match note {
                    Some(note) => text.push_str(&format!("  - {}: {}\n", driver.token(), note)),
                    None => text.push_str(&format!("  - {}\n", driver.token())),
                }
            }
            text
        })
}

fn signal_item() -> impl Strategy<Value = String> {
    let with_note = |word: &'static str| {
        prop::option::of(phrase()).prop_map(move |note| match note {
            Some(note) => format!("{} {}", word, note),
            None => word.to_string(),
        })
    };
    prop_oneof![
        with_note("🔴⚠️🟢"),
        with_note("tabular_trace_grids"),
        with_note("yaml"),
        prop::collection::vec("[A-Z][a-z]{1,5}", 1..4)
            .prop_map(|sections| format!("“{}” surgeon template", sections.join("–"))),
    ]
}

fn signals_text() -> impl Strategy<Value = String> {
    prop::collection::vec(signal_item(), 1..4).prop_map(|items| {
        let mut text = String::from("formatting_signals:\n");
        for item in items {
            text.push_str(&format!("  - {}\n", item));
        }
        text
    })
}

/// Text that follows `key:` for a free-form scope value
fn scope_value() -> impl Strategy<Value = String> {
    prop_oneof![
        phrase().prop_map(|value| format!(" {}\n", value)),
        prop::collection::vec(word(), 1..3).prop_map(|items| {
            let lines: String = items.iter().map(|i| format!("\n      - {}", i)).collect();
            lines + "\n"
        }),
        prop::collection::btree_map(word(), phrase(), 1..3).prop_map(|entries| {
            let lines: String = entries
                .iter()
                .map(|(k, v)| format!("\n      {}: {}", k, v))
                .collect();
            lines + "\n"
        }),
    ]
}

fn scope_text() -> impl Strategy<Value = String> {
    prop::collection::btree_map("[a-z]{1,8}", scope_value(), 1..4).prop_map(|scope| {
        let mut text = String::from("ops_scope:\n");
        for (key, value) in scope {
            text.push_str(&format!("  - {}:{}", key, value));
        }
        text
    })
}

fn note_text() -> impl Strategy<Value = String> {
    prop::collection::vec(phrase(), 1..4).prop_map(|lines| {
        let body: String = lines.iter().map(|l| format!("  {}\n", l)).collect();
        if lines.len() == 1 {
            format!("integration_note: >\n{}", body)
        } else {
            format!("integration_note: |\n{}", body)
        }
    })
}

fn core_text() -> impl Strategy<Value = String> {
    (
        "[a-z][a-z0-9_]{0,12}",
        optional(word().prop_map(|origin| format!("origin: {}\n", origin))),
        optional(polarity_text()),
        prop::sample::subsequence(Mode::ALL.to_vec(), 1..=3),
        prop::sample::subsequence(OutputShape::ALL.to_vec(), 0..=6),
        prop::sample::select(Cadence::ALL.to_vec()),
        any::<bool>(),
    )
        .prop_map(|(id, origin, polarity, modes, shapes, cadence, no_revisions)| {
            let mut text = format!("id: {}\n{}{}", id, origin, polarity);
            let modes: Vec<String> = modes.iter().map(Mode::decorated).collect();
            text.push_str(&format!("mode_switch: [{}]\n", modes.join(", ")));
            if !shapes.is_empty() {
                let tokens: Vec<&str> = shapes.iter().map(OutputShape::token).collect();
                text.push_str(&format!("output_preference: {}\n", tokens.join(" + ")));
            }
            text.push_str(&format!("cadence: {}", cadence));
            if no_revisions {
                text.push_str(", no_revisions");
            }
            text.push('\n');
            text
        })
}

fn overlay_text() -> impl Strategy<Value = String> {
    (
        core_text(),
        heat_text(),
        lexicon_text(),
        optional(drivers_text()),
        optional(signals_text()),
        optional(scope_text()),
        optional(note_text()),
    )
        .prop_map(|(core, heat, lexicon, drivers, signals, scope, note)| {
            [core, heat, lexicon, drivers, signals, scope, note].concat()
        })
}

proptest! {
    #[test]
    fn prop_heat_dial_accepts_only_one_to_five(level in 0u32..1000) {
        let result = load_profile(&format!("id: dial\nheat_dial: {}\n", level));
        if (1..=5).contains(&level) {
            prop_assert_eq!(result.unwrap().heat_dial().level as u32, level);
        } else {
            match result {
                Err(OverlayError::Validation(err)) => prop_assert_eq!(err.field, "heat_dial"),
                other => prop_assert!(false, "expected validation error, got {:?}", other),
            }
        }
    }

    #[test]
    fn prop_round_trip_is_stable(text in overlay_text()) {
        let profile = load_profile(&text).unwrap();
        let rendered = profile.to_document();
        let reparsed = load_profile(&rendered).unwrap();
        prop_assert_eq!(&reparsed, &profile);
        prop_assert_eq!(reparsed.to_document(), rendered);

        let record = serde_json::to_value(&profile).unwrap();
        let restored: StyleProfile = serde_json::from_value(record).unwrap();
        prop_assert_eq!(&restored, &profile);
    }

    #[test]
    fn prop_parser_never_panics(text in "[a-z:\\- \\[\\],>|#\"\n]{0,80}") {
        let _ = parse_profile(&text);
    }
}
