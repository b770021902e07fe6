//! # Clicked Example
//!
//! Registers a listener over the bus, emits from both sides of the
//! application boundary, and stops the dispatcher with a quit message.
//!
//! ## Run
//! ```bash
//! RUST_LOG=eventvisor=trace cargo run --example clicked
//! ```

use std::time::Duration;

use eventvisor::{Config, Dispatcher, EmitPayload, Message, MessageBus, Payload, Source, handler};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let bus = MessageBus::new(64);
    let dispatcher = Dispatcher::new(&bus, Config::default())?;
    let run = dispatcher.start()?;

    bus.publish(Message::on(
        "clicked",
        handler(|args| println!("[clicked] args={args:?}")),
    ))?;

    // Backend-originated event.
    bus.publish(Message::emit(
        "clicked",
        vec![json!(1), json!(2), json!(3)],
        Source::Backend,
    ))?;

    // Frontend events usually arrive as JSON text.
    let payload = EmitPayload::from_json(r#"{"name":"clicked","data":["button-1"]}"#)?;
    bus.publish(Message::new("event:emit:from:j", Payload::Emit(payload)))?;

    // Malformed: logged and dropped, the loop keeps going.
    bus.publish(Message::new("event:bogus", Payload::Empty))?;

    tokio::time::sleep(Duration::from_millis(100)).await;

    bus.publish(Message::quit())?;
    run.await?;
    println!("dispatcher state: {:?}", dispatcher.state());
    Ok(())
}
