//! Branch DSL behavior across every entry point.

use forewarn_core::prelude::*;
use forewarn_core::{DiagnosticSink, FormatError};
use forewarn_flow::prelude::*;
use parking_lot::Mutex;
use proptest::prelude::*;
use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::sync::Arc;

const OUT_OF_STOCK: CustomMessage = CustomMessage::new("E-STOCK", 409, "{} is out of stock");
const BACKORDER: CustomMessage = CustomMessage::new("W-BACK", 200, "{} ships late");
const NOT_FOUND: CustomMessage = CustomMessage::new("E-404", 404, "no item {}");

#[derive(Debug, Clone, PartialEq)]
enum Item {
    Book { pages: u32 },
    Album { tracks: u32 },
    Gift,
}

fn classify(item: Item) -> Nothing {
    ChooseContext::choose(item)
        .when(|i| matches!(i, Item::Gift))
        .fault(&OUT_OF_STOCK, &[&"gift"])
        .when(|i| matches!(i, Item::Album { tracks } if *tracks > 20))
        .alert(&BACKORDER, &[&"album"])
        .otherwise()
        .nop()
        .end()
}

#[test]
fn raw_subject_dispatch() {
    assert!(classify(Item::Book { pages: 100 }).complete_success());
    assert!(classify(Item::Album { tracks: 30 }).complete_with_warnings());
    assert!(classify(Item::Album { tracks: 3 }).complete_success());
    assert!(classify(Item::Gift).complete_with_errors());
}

#[test]
fn first_match_runs_exactly_once() {
    let hits = Cell::new(0);
    let out = Something::of(7)
        .choose()
        .when(|n| *n > 5)
        .peek(|_| hits.set(hits.get() + 1))
        .when(|n| *n > 3)
        .peek(|_| hits.set(hits.get() + 1))
        .otherwise()
        .peek(|_| hits.set(hits.get() + 1))
        .end();
    assert_eq!(hits.get(), 1);
    assert!(out.complete_success());
}

#[test]
fn errored_subject_never_evaluates_conditions() {
    let failed = Something::<u32>::fault(&NOT_FOUND, &[&12]);
    let original = failed.signals().to_vec();
    let out = failed
        .choose_map::<String>()
        .when(|_| panic!("condition must not run"))
        .map_of(|n| n.to_string())
        .when_eq(3)
        .map_of(|_| panic!("action must not run"))
        .otherwise()
        .map_of(|_| panic!("otherwise must not run"))
        .end();
    assert_eq!(out.signals(), original.as_slice());
}

#[test]
fn subject_warnings_lead_the_outcome() {
    let warned = Nothing::alert(&BACKORDER, &[&"desk"]).map_of(|| 4u32);
    let out = warned
        .choose_map::<u32>()
        .when(|n| n % 2 == 0)
        .map(|n| Nothing::alert(&BACKORDER, &[&"chair"]).map_of(|| n * 2))
        .end();
    assert_eq!(*out.value(), 8);
    let messages: Vec<_> = out.signals().iter().map(Signal::message).collect();
    assert_eq!(messages, ["desk ships late", "chair ships late"]);
}

#[test]
fn when_eq_selects_by_value() {
    let out = ChooseContext::choose_map::<_, &str>("EUR")
        .when_eq("USD")
        .map_of(|_| "$")
        .when_eq("EUR")
        .map_of(|_| "€")
        .end();
    assert_eq!(*out.value(), "€");
}

#[test]
fn when_instance_narrows_boxed_subjects() {
    let subjects = vec![
        Box::new(Item::Book { pages: 320 }) as Box<dyn Any + Send>,
        Box::new(7u8),
        Box::new("loose"),
    ];
    let described: Vec<_> = subjects
        .into_iter()
        .map(|subject| {
            ChooseContext::choose_map::<_, String>(subject)
                .when_instance::<Item>()
                .map_of(|item| format!("{item:?}"))
                .when_instance::<u8>()
                .map_of(|n| format!("byte {n}"))
                .otherwise()
                .map_of(|_| "unknown".to_string())
                .end()
                .into_value()
        })
        .collect();
    assert_eq!(
        described,
        [
            Some("Book { pages: 320 }".to_string()),
            Some("byte 7".to_string()),
            Some("unknown".to_string()),
        ]
    );
}

#[test]
fn unmatched_branches() {
    let status = ChooseContext::choose(1).when_flag(false).nop().end();
    assert!(status.complete_success());

    let value = ChooseContext::choose_map::<_, u8>(1).when_flag(false).map_of(|n| n).end();
    assert_eq!(value.signals()[0].code(), "NO_VAL");

    let single = OptoContext::opto_map::<_, u8>(1).when_flag(false).map_of(|n| n).end();
    assert_eq!(single.failure().unwrap().code(), "NO_VAL");
}

#[test]
fn nop_fires_without_outcome() {
    let later = Cell::new(false);
    let out = ChooseContext::choose("x")
        .when_flag(true)
        .nop()
        .when_flag(true)
        .peek(|_| later.set(true))
        .end();
    assert!(!later.get());
    assert!(out.complete_success());
}

#[test]
fn hope_opto_stays_single_failure() {
    let out = Hope::of(12u32)
        .opto()
        .when(|n| *n > 10)
        .fault(&OUT_OF_STOCK, &[&"widget"])
        .otherwise()
        .ergo(|_| Nope::nope())
        .end();
    assert_eq!(out.failure().unwrap().status(), 409);

    let mapped = Hope::of(3u32)
        .opto_map::<u64>()
        .when(|n| *n < 10)
        .map(|n| Hope::of(u64::from(n) * 1000))
        .end();
    assert_eq!(*mapped.value(), 3000);

    let failed = Hope::<u32>::fault(&NOT_FOUND, &[&1]).opto().when_flag(true).ergo(|_| Nope::nope()).end();
    assert_eq!(failed.failure().unwrap().code(), "E-404");
}

#[test]
fn hope_chooses_switches_to_multi_signal() {
    let out = Hope::of("kit")
        .chooses()
        .when(|name| name.len() == 3)
        .ergo(|name| {
            let builder = Nothing::builder();
            builder.alert(&BACKORDER, &[&name]).alert(&BACKORDER, &[&"manual"]);
            builder.build()
        })
        .end();
    assert_eq!(out.alerts().len(), 2);

    let value = Hope::of(2).chooses_map::<i32>().otherwise().map_of(|n| n + 1).end();
    assert_eq!(*value.value(), 3);
}

#[test]
fn nope_entry_points() {
    let ready = Cell::new(false);
    let out = Nope::nope()
        .opto()
        .when(|| true)
        .peek(|| ready.set(true))
        .end();
    assert!(ready.get());
    assert!(out.complete_success());

    let value = Nope::nope().opto_map::<u8>().otherwise().map_of(|| 5).end();
    assert_eq!(*value.value(), 5);

    let warned = Nope::nope().chooses().when_flag(true).alert(&BACKORDER, &[&"lamp"]).end();
    assert!(warned.complete_with_warnings());

    let failed = Nope::fault(&NOT_FOUND, &[&2])
        .chooses_map::<u8>()
        .when(|| panic!("condition must not run"))
        .map_of(|| 0)
        .end();
    assert_eq!(failed.signals().len(), 1);
}

#[test]
fn nothing_choice_variants() {
    let out = Nothing::alert(&BACKORDER, &[&"sofa"])
        .choice()
        .when_flag(true)
        .ergo(|| Nothing::fault(&OUT_OF_STOCK, &[&"sofa"]))
        .end();
    let codes: Vec<_> = out.signals().iter().map(Signal::code).collect();
    assert_eq!(codes, ["W-BACK", "E-STOCK"]);

    let value = Nothing::none().choice_map::<&str>().otherwise().map_of(|| "done").end();
    assert_eq!(*value.value(), "done");
}

#[test]
fn fault_place_points_at_the_clause() {
    let out = ChooseContext::choose(0)
        .otherwise()
        .fault(&OUT_OF_STOCK, &[&"pen"])
        .end();
    assert!(out.signals()[0].place().unwrap().contains("branching.rs:"));
}

#[derive(Default)]
struct Recording(Mutex<Vec<usize>>);

impl DiagnosticSink for Recording {
    fn report(&self, error: &FormatError) {
        self.0.lock().push(error.index);
    }
}

struct Unprintable;

impl fmt::Display for Unprintable {
    fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Err(fmt::Error)
    }
}

fn shop_settings(sink: Arc<Recording>) -> Arc<Settings> {
    let settings = Settings::new()
        .with_sink(sink)
        .with_overrides("[messages.NO_VAL]\ntemplate = \"no shelf matched\"\n")
        .unwrap();
    Arc::new(settings)
}

#[test]
fn branch_settings_drive_unmatched_and_faults() {
    let sink = Arc::new(Recording::default());
    let settings = shop_settings(sink.clone());

    let shelf = ChooseContext::choose_map::<u32, &str>(7)
        .with_settings(settings.clone())
        .when(|n| *n > 10)
        .map_of(|_| "bulk")
        .end();
    assert_eq!(shelf.signals()[0].code(), "NO_VAL");
    assert_eq!(shelf.signals()[0].message(), "no shelf matched");

    let hope = OptoContext::opto_map::<u32, &str>(7)
        .with_settings(settings.clone())
        .when_flag(false)
        .map_of(|_| "bulk")
        .end();
    assert_eq!(hope.signals()[0].message(), "no shelf matched");

    let faulted = ChooseContext::choose(3u32)
        .with_settings(settings)
        .when_flag(true)
        .fault(&OUT_OF_STOCK, &[&Unprintable])
        .end();
    assert!(faulted.complete_with_errors());
    assert_eq!(*sink.0.lock(), [0]);
}

#[test]
fn choice_settings_reach_the_sink() {
    let sink = Arc::new(Recording::default());
    let settings = shop_settings(sink.clone());

    let out = Nothing::none()
        .choice()
        .with_settings(settings.clone())
        .when_flag(true)
        .alert(&BACKORDER, &[&Unprintable])
        .end();
    assert!(out.complete_with_warnings());
    assert_eq!(out.alerts()[0].message(), "{} ships late");
    assert_eq!(*sink.0.lock(), [0]);

    let unmatched = Nothing::none()
        .choice_map::<u8>()
        .with_settings(settings)
        .when_flag(false)
        .map_of(|| 1)
        .end();
    assert_eq!(unmatched.signals()[0].message(), "no shelf matched");
}

proptest! {
    /// Only the first true condition fires, and no condition after it is evaluated.
    #[test]
    fn only_first_true_clause_fires(flags in prop::collection::vec(any::<bool>(), 1..12)) {
        let fired = Cell::new(None);
        let evaluated = Cell::new(0usize);
        let mut branch = ChooseContext::choose(());
        for (index, flag) in flags.iter().copied().enumerate() {
            branch = branch
                .when(|_| {
                    evaluated.set(evaluated.get() + 1);
                    flag
                })
                .peek(|_| fired.set(Some(index)));
        }
        let _ = branch.end();

        let first = flags.iter().position(|f| *f);
        prop_assert_eq!(fired.get(), first);
        prop_assert_eq!(evaluated.get(), first.map_or(flags.len(), |i| i + 1));
    }
}
