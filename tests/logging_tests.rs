use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use quadfall::{SimConfig, Simulation};
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Metadata, Subscriber};

/// Counts events whose message equals `message`.
struct MessageCounter {
    message: &'static str,
    hits: Arc<AtomicUsize>,
}

struct MessageMatch<'a> {
    message: &'a str,
    matched: bool,
}

impl Visit for MessageMatch<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" && format!("{value:?}") == self.message {
            self.matched = true;
        }
    }
}

impl Subscriber for MessageCounter {
    fn enabled(&self, _: &Metadata<'_>) -> bool {
        true
    }

    fn new_span(&self, _: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _: &Id, _: &Record<'_>) {}

    fn record_follows_from(&self, _: &Id, _: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let mut visitor = MessageMatch {
            message: self.message,
            matched: false,
        };
        event.record(&mut visitor);
        if visitor.matched {
            self.hits.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn enter(&self, _: &Id) {}

    fn exit(&self, _: &Id) {}
}

#[test]
fn pool_exhaustion_is_logged_once() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = MessageCounter {
        message: "body pool exhausted",
        hits: Arc::clone(&hits),
    };
    let config = SimConfig {
        spawn_count: 3,
        rng_seed: Some(1),
        ..SimConfig::default()
    };

    tracing::subscriber::with_default(counter, || {
        let mut sim = Simulation::new(&config).unwrap();

        for _ in 0..2 {
            sim.activate_next();
        }
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        for _ in 0..5 {
            sim.activate_next();
            sim.step(1.0 / 60.0);
        }
    });

    assert_eq!(hits.load(Ordering::SeqCst), 1);
}
