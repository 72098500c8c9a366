//! Serialize/parse throughput benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use scxmlkit_codec::{checksum, parse, serialize, MarkupParser, QuickXmlParser, SerializeOptions};
use scxmlkit_model::{
    Data, Datamodel, Document, ExecutableContent, Final, History, OnEntry, Parallel, State,
    Transition,
};

/// A document with `width` compound states, each holding a history, two
/// leaves and a parallel region.
fn create_test_document(width: usize) -> Document {
    let mut doc = Document::new()
        .with_name("bench")
        .with_initial("s0")
        .with_datamodel(Datamodel::new().with_data(Data::new("count").with_expr("0")));

    for i in 0..width {
        let id = format!("s{}", i);
        let next = format!("s{}", (i + 1) % width);
        let state = State::new(&id)
            .with_initial(format!("{}_a", id))
            .with_onentry(OnEntry::new(vec![
                ExecutableContent::assign("count", "count + 1"),
                ExecutableContent::log(Some("enter"), Some("count")),
            ]))
            .with_history(History::deep(format!("{}_h", id)).with_default_target(format!("{}_a", id)))
            .with_transition(Transition::on("next", &next).with_cond("count < 1000"))
            .with_transition(Transition::on("stop", "end"))
            .with_child(State::new(format!("{}_a", id)).with_transition(Transition::on("go", format!("{}_b", id))))
            .with_child(State::new(format!("{}_b", id)))
            .with_child(
                Parallel::new(format!("{}_p", id))
                    .with_child(State::new(format!("{}_p1", id)))
                    .with_child(State::new(format!("{}_p2", id))),
            );
        doc.add_child(state);
    }

    doc.with_child(Final::new("end"))
}

fn bench_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize");

    for width in [10, 100, 1000] {
        let doc = create_test_document(width);
        let options = SerializeOptions::default();
        let bytes = serialize(&doc, &options).len();

        group.throughput(Throughput::Bytes(bytes as u64));
        group.bench_with_input(BenchmarkId::from_parameter(width), &doc, |b, doc| {
            b.iter(|| black_box(serialize(doc, &options)));
        });
    }

    group.finish();
}

fn bench_serialize_compact(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize_compact");

    for width in [10, 100, 1000] {
        let doc = create_test_document(width);
        let options = SerializeOptions::compact();

        group.throughput(Throughput::Elements(width as u64));
        group.bench_with_input(BenchmarkId::from_parameter(width), &doc, |b, doc| {
            b.iter(|| black_box(serialize(doc, &options)));
        });
    }

    group.finish();
}

fn bench_tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize");
    let parser = QuickXmlParser::new();

    for width in [10, 100, 1000] {
        let text = serialize(&create_test_document(width), &SerializeOptions::default());

        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(width), &text, |b, text| {
            b.iter(|| black_box(parser.parse_tree(text).unwrap()));
        });
    }

    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for width in [10, 100, 1000] {
        let text = serialize(&create_test_document(width), &SerializeOptions::default());

        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(width), &text, |b, text| {
            b.iter(|| black_box(parse(text).unwrap()));
        });
    }

    group.finish();
}

fn bench_roundtrip(c: &mut Criterion) {
    let doc = create_test_document(100);
    let options = SerializeOptions::default();

    c.bench_function("roundtrip_100", |b| {
        b.iter(|| {
            let text = serialize(&doc, &options);
            black_box(serialize(&parse(&text).unwrap(), &options))
        });
    });
}

fn bench_checksum(c: &mut Criterion) {
    let mut group = c.benchmark_group("checksum");

    for width in [10, 100, 1000] {
        let doc = create_test_document(width);
        let options = SerializeOptions::default();

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(width), &doc, |b, doc| {
            b.iter(|| black_box(checksum(doc, &options)));
        });
    }

    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate");

    for width in [10, 100, 1000] {
        let doc = create_test_document(width);

        group.throughput(Throughput::Elements(width as u64));
        group.bench_with_input(BenchmarkId::from_parameter(width), &doc, |b, doc| {
            b.iter(|| black_box(doc.validate()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_serialize,
    bench_serialize_compact,
    bench_tokenize,
    bench_parse,
    bench_roundtrip,
    bench_checksum,
    bench_validate,
);

criterion_main!(benches);
