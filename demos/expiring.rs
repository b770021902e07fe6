//! # Expiring Listeners Example
//!
//! Shows unlimited and limited listeners side by side, a panicking listener
//! that does not disturb the others, and OS-signal shutdown (press Ctrl-C).
//!
//! ## Run
//! ```bash
//! cargo run --example expiring
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use eventvisor::{Config, Dispatcher, Message, Source, handler};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_target(false).init();

    let cfg = Config {
        os_signals: true,
        ..Config::default()
    };
    let dispatcher = Dispatcher::builder(cfg).build()?;
    let bus = dispatcher.bus().clone();
    let registry = dispatcher.registry();

    let total = Arc::new(AtomicU64::new(0));
    {
        let total = Arc::clone(&total);
        registry.register(
            "tick",
            handler(move |args| {
                let n = total.fetch_add(1, Ordering::Relaxed) + 1;
                println!("[always] tick={args:?} total={n}");
            }),
        );
    }
    registry.register_with_limit("tick", 3, handler(|args| println!("[3 times] tick={args:?}")));
    registry.register_with_limit("tick", 1, handler(|_| panic!("one-shot listener failed")));

    let run = dispatcher.start()?;
    println!("emitting a tick every 200ms; press Ctrl-C to stop");

    let ticker = tokio::spawn(async move {
        for i in 0u64.. {
            if bus.publish(Message::emit("tick", vec![json!(i)], Source::Backend)).is_err() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    });

    run.await?;
    ticker.abort();
    println!(
        "stopped after {} ticks; listeners left: {}",
        total.load(Ordering::Relaxed),
        registry.listener_count("tick")
    );
    Ok(())
}
