//! End-to-end notation table plus a tracing capture proving key payloads are not logged.

use core_input::{Key, KeyInput, KeyTranslator, Modifiers, PlatformId};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::Subscriber;
use tracing::dispatcher::Dispatch;
use tracing::field::{Field, Visit};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::registry::Registry;

#[test]
fn notation_table_linux() {
    let tr = KeyTranslator::new(PlatformId::Linux);
    let table = [
        (KeyInput::new("a", Key::Char('A'), Modifiers::CONTROL), "<C-a>"),
        (KeyInput::new("<", Key::Char('<'), Modifiers::empty()), "<lt>"),
        (KeyInput::new("\t", Key::Tab, Modifiers::empty()), "<Tab>"),
        (KeyInput::new("A", Key::Char('A'), Modifiers::SHIFT), "A"),
        (
            KeyInput::new("x", Key::Char('x'), Modifiers::CONTROL | Modifiers::ALT),
            "<C-A-x>",
        ),
        (
            KeyInput::new("", Key::Char('x'), Modifiers::META | Modifiers::CONTROL | Modifiers::SHIFT | Modifiers::ALT),
            "<D-C-A-X>",
        ),
        (KeyInput::new("", Key::F(1), Modifiers::SHIFT), "<S-F1>"),
        (KeyInput::new("5", Key::Char('5'), Modifiers::KEYPAD), "<k5>"),
    ];
    let got: Vec<(String, &str)> = table
        .iter()
        .map(|(input, want)| (tr.translate(input), *want))
        .collect();
    let want: Vec<(String, &str)> = table
        .iter()
        .map(|(_, want)| (want.to_string(), *want))
        .collect();
    assert_eq!(got, want);
}

proptest! {
    #[test]
    fn plain_letters_translate_to_themselves(c in proptest::char::range('a', 'z'), shift in any::<bool>()) {
        let tr = KeyTranslator::new(PlatformId::Linux);
        let (text, mods) = if shift {
            (c.to_ascii_uppercase(), Modifiers::SHIFT)
        } else {
            (c, Modifiers::empty())
        };
        let out = tr.translate(&KeyInput::new(text.to_string(), Key::Char(c), mods));
        prop_assert_eq!(out, text.to_string());
    }

    #[test]
    fn control_output_is_always_bracketed(c in proptest::char::range('a', 'z')) {
        let tr = KeyTranslator::new(PlatformId::Linux);
        let out = tr.translate(&KeyInput::new("", Key::Char(c), Modifiers::CONTROL));
        prop_assert_eq!(out, format!("<C-{c}>"));
    }
}

#[derive(Clone, Default)]
struct Capture {
    events: Arc<Mutex<Vec<(String, Vec<(String, String)>)>>>,
}

#[derive(Default)]
struct FieldCollector {
    fields: Vec<(String, String)>,
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.fields
            .push((field.name().to_string(), format!("{:?}", value)));
    }
}

impl<S> Layer<S> for Capture
where
    S: Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut collector = FieldCollector::default();
        event.record(&mut collector);
        self.events
            .lock()
            .unwrap()
            .push((event.metadata().target().to_string(), collector.fields));
    }
}

#[test]
fn translate_log_redacts_payload() {
    let capture = Capture::default();
    let events = capture.events.clone();
    let dispatch = Dispatch::new(Registry::default().with(capture));

    tracing::dispatcher::with_default(&dispatch, || {
        let tr = KeyTranslator::new(PlatformId::Linux);
        tr.translate(&KeyInput::new("ж", Key::Char('ж'), Modifiers::empty()));
    });

    let events = events.lock().unwrap();
    let (_, fields) = events
        .iter()
        .find(|(target, _)| target == "input.translate")
        .expect("missing input.translate event");
    assert!(fields.iter().any(|(name, _)| name == "text_len"));
    for (_, value) in fields {
        assert!(!value.contains('ж'), "event leaked key payload: {value}");
    }
}
