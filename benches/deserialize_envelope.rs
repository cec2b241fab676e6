//! Benchmarks for decoding inbound gateway traffic: the envelope itself, then the typed
//! payload of the events the session routes.
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use guild_gateway::gateway::types::response::Event;
use guild_gateway::gateway::types::{Envelope, EventType};

const HEARTBEAT_ACK: &str = r#"{"op":11}"#;

const READY: &str = r#"{
    "op": 0,
    "s": 1,
    "t": "READY",
    "d": {
        "version": 1,
        "session_id": "082ee18c-0be3-491b-9d8b-fbd95c51673a",
        "user": { "id": "424268190167377645", "username": "ledger", "bot": true },
        "shard": [0, 1]
    }
}"#;

const MENTION: &str = r#"{
    "op": 0,
    "s": 5,
    "t": "AT_MESSAGE_CREATE",
    "id": "AT_MESSAGE_CREATE:e4c9b7a6",
    "d": {
        "id": "08e092eeb983afef9e0110f1",
        "channel_id": "1049883",
        "guild_id": "9830183478343",
        "content": "<@!424268190167377645> lunch -15",
        "author": {
            "id": "144115218676936735",
            "username": "alice",
            "avatar": "https://thirdqq.qlogo.cn/0",
            "bot": false
        },
        "timestamp": "2022-05-01T12:00:00+08:00",
        "seq": 5
    }
}"#;

fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("gateway/envelope");

    for (name, frame) in [
        ("HeartbeatAck", HEARTBEAT_ACK),
        ("Ready", READY),
        ("AtMessageCreate", MENTION),
    ] {
        group.throughput(Throughput::Bytes(frame.len() as u64));
        group.bench_function(name, |b| {
            b.iter(|| {
                Envelope::decode(std::hint::black_box(frame.as_bytes()))
                    .expect("Decoding should succeed")
            });
        });
    }

    group.finish();
}

fn bench_event(c: &mut Criterion) {
    let mut group = c.benchmark_group("gateway/event");

    let ready = Envelope::decode(READY.as_bytes()).expect("Decoding should succeed");
    group.bench_function("Event::Ready", |b| {
        b.iter(|| {
            Event::from_dispatch(&EventType::Ready, std::hint::black_box(ready.d.clone()))
                .expect("Event should decode")
        });
    });

    let mention = Envelope::decode(MENTION.as_bytes()).expect("Decoding should succeed");
    group.bench_function("Event::AtMessageCreate", |b| {
        b.iter(|| {
            Event::from_dispatch(
                &EventType::AtMessageCreate,
                std::hint::black_box(mention.d.clone()),
            )
            .expect("Event should decode")
        });
    });

    group.finish();
}

criterion_group!(gateway_benches, bench_envelope, bench_event);
criterion_main!(gateway_benches);
