use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use eventvisor::{
    Config, Dispatcher, DispatcherState, EmitPayload, Handler, Message, MessageBus, Payload,
    RuntimeError, Source, Value, handler,
};
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

fn recorder() -> (Handler, mpsc::UnboundedReceiver<Vec<Value>>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let h = handler(move |args| {
        let _ = tx.send(args.to_vec());
    });
    (h, rx)
}

fn counter(hits: &Arc<AtomicUsize>) -> Handler {
    let hits = Arc::clone(hits);
    handler(move |_| {
        hits.fetch_add(1, Ordering::SeqCst);
    })
}

async fn recv(rx: &mut mpsc::UnboundedReceiver<Vec<Value>>) -> Vec<Value> {
    timeout(WAIT, rx.recv())
        .await
        .expect("listener not invoked in time")
        .expect("listener dropped")
}

async fn stop(bus: &MessageBus, dispatcher: &Dispatcher, run: tokio::task::JoinHandle<()>) {
    bus.publish(Message::quit()).unwrap();
    timeout(WAIT, run).await.expect("loop did not stop").unwrap();
    assert_eq!(dispatcher.state(), DispatcherState::Stopped);
}

#[tokio::test]
async fn end_to_end_on_then_emit() {
    let bus = MessageBus::new(16);
    let dispatcher = Dispatcher::new(&bus, Config::default()).unwrap();
    let run = dispatcher.start().unwrap();
    assert_eq!(dispatcher.state(), DispatcherState::Running);

    let (cb, mut rx) = recorder();
    bus.publish(Message::on("clicked", cb)).unwrap();
    bus.publish(Message::new(
        "event:emit:_:g",
        Payload::Emit(EmitPayload::new("clicked", vec![json!(1), json!(2), json!(3)])),
    ))
    .unwrap();

    assert_eq!(recv(&mut rx).await, vec![json!(1), json!(2), json!(3)]);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(rx.try_recv().is_err(), "listener invoked more than once");

    stop(&bus, &dispatcher, run).await;
}

#[tokio::test]
async fn frontend_and_backend_sources_both_notify() {
    let bus = MessageBus::new(16);
    let dispatcher = Dispatcher::new(&bus, Config::default()).unwrap();
    let run = dispatcher.start().unwrap();

    let (cb, mut rx) = recorder();
    dispatcher.register_listener("resize", cb);

    bus.publish(Message::emit("resize", vec![json!("j")], Source::Frontend))
        .unwrap();
    assert_eq!(recv(&mut rx).await, vec![json!("j")]);

    bus.publish(Message::emit("resize", vec![json!("g")], Source::Backend))
        .unwrap();
    assert_eq!(recv(&mut rx).await, vec![json!("g")]);

    stop(&bus, &dispatcher, run).await;
}

#[tokio::test]
async fn malformed_messages_do_not_stop_the_loop() {
    let bus = MessageBus::new(16);
    let dispatcher = Dispatcher::new(&bus, Config::default()).unwrap();
    let run = dispatcher.start().unwrap();

    let (cb, mut rx) = recorder();
    dispatcher.register_listener("clicked", cb);
    let emit = || Payload::Emit(EmitPayload::new("clicked", vec![json!("bad")]));

    for topic in ["event:bogus", "event", "event:emit:_", "event:emit:_:g:x", "event:emit:_:z"] {
        bus.publish(Message::new(topic, emit())).unwrap();
    }
    // Topic and payload disagree.
    bus.publish(Message::new("event:on", emit())).unwrap();
    bus.publish(Message::new("event:emit:_:j", Payload::Empty)).unwrap();

    bus.publish(Message::emit("clicked", vec![json!("ok")], Source::Backend))
        .unwrap();

    assert_eq!(recv(&mut rx).await, vec![json!("ok")]);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(rx.try_recv().is_err(), "a malformed message reached the listener");
    assert_eq!(dispatcher.state(), DispatcherState::Running);
    assert_eq!(dispatcher.registry().listener_count("clicked"), 1);

    stop(&bus, &dispatcher, run).await;
}

#[tokio::test]
async fn on_with_empty_name_is_dropped() {
    let bus = MessageBus::new(16);
    let dispatcher = Dispatcher::new(&bus, Config::default()).unwrap();
    let run = dispatcher.start().unwrap();

    let hits = Arc::new(AtomicUsize::new(0));
    bus.publish(Message::on("", counter(&hits))).unwrap();

    // Processed after the empty-name registration, in bus order.
    let (cb, mut rx) = recorder();
    bus.publish(Message::on("ready", cb)).unwrap();
    bus.publish(Message::emit("ready", vec![], Source::Backend))
        .unwrap();
    recv(&mut rx).await;

    let registry = dispatcher.registry();
    assert_eq!(registry.listener_count(""), 0);
    assert_eq!(registry.event_names(), vec!["ready".to_string()]);

    bus.publish(Message::emit("", vec![], Source::Backend)).unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    stop(&bus, &dispatcher, run).await;
}

#[tokio::test]
async fn emit_without_listeners_is_noop() {
    let bus = MessageBus::new(16);
    let dispatcher = Dispatcher::new(&bus, Config::default()).unwrap();
    let run = dispatcher.start().unwrap();

    bus.publish(Message::emit("unknown-event", vec![json!(1)], Source::Backend))
        .unwrap();

    let (cb, mut rx) = recorder();
    bus.publish(Message::on("later", cb)).unwrap();
    bus.publish(Message::emit("later", vec![], Source::Backend))
        .unwrap();
    assert_eq!(recv(&mut rx).await, Vec::<Value>::new());

    stop(&bus, &dispatcher, run).await;
}

#[tokio::test]
async fn listeners_registered_over_the_bus_never_expire() {
    let bus = MessageBus::new(256);
    let dispatcher = Dispatcher::new(&bus, Config::default()).unwrap();
    let run = dispatcher.start().unwrap();

    let hits = Arc::new(AtomicUsize::new(0));
    bus.publish(Message::on("tick", counter(&hits))).unwrap();
    for i in 0..100 {
        bus.publish(Message::emit("tick", vec![json!(i)], Source::Frontend))
            .unwrap();
    }

    timeout(WAIT, async {
        while hits.load(Ordering::SeqCst) < 100 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("not every emit reached the listener");
    assert_eq!(dispatcher.registry().listener_count("tick"), 1);

    stop(&bus, &dispatcher, run).await;
}

#[tokio::test]
async fn limited_listener_expires_after_last_invocation() {
    let bus = MessageBus::new(16);
    let dispatcher = Dispatcher::new(&bus, Config::default()).unwrap();
    let run = dispatcher.start().unwrap();

    let (cb, mut rx) = recorder();
    dispatcher.registry().register_with_limit("once", 1, cb);

    bus.publish(Message::emit("once", vec![json!(1)], Source::Backend))
        .unwrap();
    assert_eq!(recv(&mut rx).await, vec![json!(1)]);
    assert_eq!(dispatcher.registry().listener_count("once"), 0);

    bus.publish(Message::emit("once", vec![json!(2)], Source::Backend))
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err(), "expired listener invoked again");

    stop(&bus, &dispatcher, run).await;
}

#[tokio::test]
async fn start_twice_is_rejected() {
    let bus = MessageBus::new(4);
    let dispatcher = Dispatcher::new(&bus, Config::default()).unwrap();
    assert_eq!(dispatcher.state(), DispatcherState::Idle);

    let run = dispatcher.start().unwrap();
    assert!(matches!(dispatcher.start(), Err(RuntimeError::AlreadyStarted)));

    stop(&bus, &dispatcher, run).await;
}

#[tokio::test]
async fn construction_fails_when_bus_is_closed() {
    let bus = MessageBus::new(4);
    bus.close();
    let err = Dispatcher::new(&bus, Config::default()).err().unwrap();
    assert!(matches!(err, RuntimeError::Subscribe { .. }));
}

#[tokio::test]
async fn closing_the_bus_stops_the_loop() {
    let bus = MessageBus::new(4);
    let dispatcher = Dispatcher::new(&bus, Config::default()).unwrap();
    let run = dispatcher.start().unwrap();

    bus.close();
    timeout(WAIT, dispatcher.stopped()).await.unwrap();
    timeout(WAIT, run).await.unwrap().unwrap();
    assert_eq!(dispatcher.state(), DispatcherState::Stopped);
}

#[tokio::test]
async fn custom_channels_are_honoured() {
    let cfg = Config {
        quit_channel: "halt".into(),
        event_channel: "ui".into(),
        ..Config::default()
    };
    let dispatcher = Dispatcher::builder(cfg).build().unwrap();
    let bus = dispatcher.bus().clone();
    let run = dispatcher.start().unwrap();

    let (cb, mut rx) = recorder();
    bus.publish(Message::new("ui:on", Payload::On(eventvisor::OnPayload::new("x", cb))))
        .unwrap();
    bus.publish(Message::new(
        "ui:emit:from:j",
        Payload::Emit(EmitPayload::new("x", vec![json!(true)])),
    ))
    .unwrap();
    assert_eq!(recv(&mut rx).await, vec![json!(true)]);

    // The default quit channel is not the one this dispatcher listens to.
    assert_eq!(bus.publish(Message::quit()).unwrap(), 0);
    bus.publish(Message::new("halt", Payload::Empty)).unwrap();
    timeout(WAIT, run).await.unwrap().unwrap();
    assert_eq!(dispatcher.state(), DispatcherState::Stopped);
}
