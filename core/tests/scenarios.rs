//! End-to-end scenarios across containers, builders and settings.

use forewarn_core::prelude::*;
use forewarn_core::{DiagnosticSink, FormatError, Located, TracingSink};
use parking_lot::Mutex;
use std::fmt;
use std::io;
use std::sync::Arc;

const MY_FAULT: CustomMessage = CustomMessage::new("E-ORDER", 422, "order {} rejected");
const MY_ALERT: CustomMessage = CustomMessage::new("W-ORDER", 200, "order {} is late");

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("forewarn_core=debug")
        .with_test_writer()
        .try_init();
}

#[test]
fn map_success() {
    let out = Something::of(1).map(|k| Something::of(k + 1));
    assert!(out.complete_success());
    assert_eq!(*out.value(), 2);
}

#[test]
fn map_into_fault() {
    let out = Something::of(1).map(|k| Something::<i32>::fault(&MY_FAULT, &[&k]));
    assert!(out.complete_with_errors());
    assert_eq!(out.signals().len(), 1);
}

#[test]
fn warned_builder_then_fault_keeps_both() {
    let out = SomethingBuilder::with_alert(&MY_ALERT, &[&7])
        .build_with_value(1)
        .map(|_| Something::<i32>::fault(&MY_FAULT, &[&7]));
    assert!(out.complete_with_errors());
    assert_eq!(out.signals().len(), 2);
    assert!(out.signals()[0].is_warning());
    assert!(out.signals()[1].is_failure());
}

#[test]
fn zero_threads_is_a_usage_error() {
    init_tracing();
    let builder = Nothing::builder();
    let result = builder.for_each_parallel(0, 0..4, |_| Nothing::none());
    assert!(matches!(result, Err(UsageError::InvalidParallelism(0))));
    assert!(builder.build().complete_success());
}

#[test]
fn parallel_loop_keeps_every_signal() {
    init_tracing();
    let builder = SomethingBuilder::<usize>::new();
    builder
        .for_each_parallel(8, 0..200usize, |n| {
            if n % 10 == 0 {
                Nothing::alert(&MY_ALERT, &[&n])
            } else {
                Nothing::none()
            }
        })
        .unwrap();
    let built = builder.build_with_value(200);
    assert_eq!(built.alerts().len(), 20);
    assert_eq!(*built.value(), 200);
}

#[test]
fn value_after_error_keeps_original_error() {
    let builder = SomethingBuilder::<&str>::with_fault(&MY_FAULT, &[&3]);
    builder.value("late");
    let built = builder.build();
    assert!(built.complete_with_errors());
    assert_eq!(built.errors().len(), 1);
    assert_eq!(built.errors()[0].code(), "E-ORDER");
    assert_eq!(built.alerts().len(), 1);
}

#[test]
fn nope_and_hope_pipeline() {
    fn parse(raw: &str) -> Hope<u32> {
        match raw.parse::<u32>() {
            Ok(n) => Hope::of(n),
            Err(err) => Hope::capture(&err),
        }
    }
    fn reserve(n: u32) -> Nope {
        if n > 10 {
            Nope::fault(&MY_FAULT, &[&n])
        } else {
            Nope::nope()
        }
    }

    assert!(parse("4").ergo(reserve).complete_success());
    let too_many = parse("40").ergo(reserve);
    assert_eq!(too_many.failure().unwrap().message(), "order 40 rejected");
    let garbage = parse("x").ergo(reserve);
    assert_eq!(garbage.failure().unwrap().code(), "999E");
}

#[test]
fn captured_trail_spans_layers() {
    fn read_config() -> Result<String, Located> {
        Err(io::Error::new(io::ErrorKind::NotFound, "settings.toml")).locate()
    }
    fn boot() -> Result<String, Located> {
        read_config().map_err(|err| err.located())
    }

    let err = boot().unwrap_err();
    let full = Nothing::capture(&err);
    let place = full.signals()[0].place().unwrap();
    assert!(place.starts_with('['));
    assert_eq!(place.matches("scenarios.rs:").count(), 3);

    let builder = Nothing::builder();
    builder.capture_here(&err).capture_caller(&err);
    let built = builder.build();
    for signal in built.signals() {
        assert_eq!(signal.message(), "settings.toml");
        assert!(!signal.place().unwrap().starts_with('['));
    }
}

#[test]
fn anyhow_chain_becomes_causes() {
    let err = anyhow::anyhow!("connection reset")
        .context("loading customer 12")
        .context("rendering invoice");
    let boxed: Box<dyn std::error::Error + Send + Sync> = err.into();
    let signal = Signal::capture(boxed.as_ref());
    assert_eq!(signal.message(), "rendering invoice");
    assert_eq!(
        signal.property("causes"),
        Some(&serde_json::json!(["loading customer 12", "connection reset"]))
    );
}

struct Broken;

impl fmt::Display for Broken {
    fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Err(fmt::Error)
    }
}

#[derive(Default)]
struct Recording(Mutex<Vec<usize>>);

impl DiagnosticSink for Recording {
    fn report(&self, error: &FormatError) {
        self.0.lock().push(error.index);
    }
}

#[test]
fn format_failures_reach_the_configured_sink() {
    let sink = Arc::new(Recording::default());
    let settings = Arc::new(Settings::new().with_sink(sink.clone()));
    let builder = NothingBuilder::with_settings(settings);
    builder.fault(&MY_FAULT, &[&Broken]);
    let built = builder.build();
    assert_eq!(built.signals()[0].message(), "order {} rejected");
    assert_eq!(*sink.0.lock(), vec![0]);
}

#[test]
fn tracing_sink_does_not_disturb_results() {
    init_tracing();
    let settings = Arc::new(Settings::new().with_sink(Arc::new(TracingSink)));
    let builder = SomethingBuilder::<u8>::with_settings(settings);
    builder.alert(&MY_ALERT, &[&Broken]);
    let built = builder.build_with_value(1);
    assert!(built.complete_with_warnings());
}

#[test]
fn list_arguments_render_bracketed() {
    let skus = ["A1", "B2", "C3"];
    let signal = Signal::alert(&CustomMessage::new("W-SKU", 200, "missing {}"), &[&list(&skus)]);
    assert_eq!(signal.message(), "missing [A1, B2, C3]");
}

#[test]
fn containers_serialize_with_their_signals() {
    let warned = Nothing::alert(&MY_ALERT, &[&5]).map_of(|| 5u8);
    let json = serde_json::to_value(&warned).unwrap();
    assert_eq!(json["value"], 5);
    assert_eq!(json["signals"][0]["code"], "W-ORDER");
    let back: Something<u8> = serde_json::from_value(json).unwrap();
    assert_eq!(back, warned);
}
