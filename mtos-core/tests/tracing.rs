//! Instrumentation emitted by a pipeline run.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex},
};

use mtos_core::{ExecutionStrategy, Image2d, MtosBuilder, MtosError};
use tracing::{
    Subscriber,
    field::{Field, Visit},
    span::{Attributes, Id},
};
use tracing_subscriber::{
    Layer,
    layer::{Context, SubscriberExt},
    registry::LookupSpan,
};

#[derive(Debug, Clone)]
struct SpanRecord {
    name: &'static str,
    fields: HashMap<String, String>,
}

/// Captures closed spans in completion order.
#[derive(Clone, Default)]
struct RecordingLayer {
    spans: Arc<Mutex<Vec<SpanRecord>>>,
}

impl RecordingLayer {
    fn spans(&self) -> Vec<SpanRecord> {
        self.spans.lock().expect("lock poisoned").clone()
    }
}

struct FieldRecorder<'a>(&'a mut HashMap<String, String>);

impl Visit for FieldRecorder<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_owned(), format!("{value:?}"));
    }
}

impl<S> Layer<S> for RecordingLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            let mut record = SpanRecord {
                name: attrs.metadata().name(),
                fields: HashMap::new(),
            };
            attrs.record(&mut FieldRecorder(&mut record.fields));
            span.extensions_mut().insert(record);
        }
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(&id) else {
            return;
        };
        let Some(record) = span.extensions_mut().remove::<SpanRecord>() else {
            return;
        };
        self.spans.lock().expect("lock poisoned").push(record);
    }
}

fn grey(rows: Vec<Vec<u8>>) -> Image2d<u8> {
    Image2d::from_rows(rows).expect("rectangular rows")
}

#[test]
fn run_records_one_span_per_stage() {
    let channels = [
        grey(vec![vec![0, 5, 0], vec![0, 5, 0]]),
        grey(vec![vec![1, 1, 0], vec![1, 1, 0]]),
    ];
    let mtos = MtosBuilder::new()
        .with_execution_strategy(ExecutionStrategy::Sequential)
        .build()
        .expect("valid config");

    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    tracing::subscriber::with_default(subscriber, || mtos.run(&channels)).expect("valid channels");

    let spans = layer.spans();
    let names: Vec<&str> = spans.iter().map(|span| span.name).collect();
    assert_eq!(
        names,
        [
            "mtos.tos",
            "mtos.tos",
            "mtos.inclusion_graph",
            "mtos.depth_map",
            "mtos.maxtree",
            "mtos.satmaxtree",
            "mtos.run",
        ]
    );

    let run = spans.last().expect("run span recorded");
    assert_eq!(run.fields.get("channels"), Some(&"2".to_owned()));
    assert_eq!(run.fields.get("padding"), Some(&"false".to_owned()));
    assert_eq!(run.fields.get("strategy"), Some(&"Sequential".to_owned()));
    assert_eq!(spans[0].fields.get("domain"), Some(&"2x3".to_owned()));
}

#[test]
fn invalid_input_closes_the_run_span() {
    let mtos = MtosBuilder::new().build().expect("valid config");
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());

    let err = tracing::subscriber::with_default(subscriber, || mtos.run::<u8>(&[]))
        .expect_err("no channels");
    assert_eq!(err, MtosError::NoChannels);

    let names: Vec<&str> = layer.spans().iter().map(|span| span.name).collect();
    assert_eq!(names, ["mtos.run"]);
}
