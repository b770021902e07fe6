//! # Listener callbacks and their fire-and-forget launch.
//!
//! A [`Handler`] is an opaque, shareable callback receiving the ordered event
//! arguments. Every invocation runs on its own Tokio task inside a panic
//! boundary:
//!
//! ```text
//! notify(name, args) ──► launch(handler, args) ──► tokio::spawn ──► handler(&args)
//!                                                       └─► panic caught → warn!(...)
//! ```
//!
//! ## Rules
//! - The launching code never awaits the task.
//! - A panicking handler is logged and forgotten; the registry and the
//!   dispatcher loop are unaffected.
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a handler uses `Arc<Mutex<T>>` and panics while holding the lock.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::Value;
use tokio::runtime::Handle;
use tracing::warn;

/// Callback invoked with the arguments of an emitted event.
pub type Handler = Arc<dyn Fn(&[Value]) + Send + Sync + 'static>;

/// Wraps a closure into a [`Handler`].
///
/// ## Example
/// ```rust
/// use eventvisor::{Handler, handler};
///
/// let h: Handler = handler(|args| println!("got {} args", args.len()));
/// h(&[]);
/// ```
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&[Value]) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Runs `callback(&args)` on a detached task of `rt`.
///
/// The caller resolves the runtime up front so that a missing runtime is
/// detected before any listener state changes.
pub(crate) fn launch(rt: &Handle, event: Arc<str>, callback: Handler, args: Arc<[Value]>) {
    rt.spawn(async move {
        let fut = async { callback(&args) };
        if let Err(panic_err) = AssertUnwindSafe(fut).catch_unwind().await {
            warn!(
                event = %event,
                info = %panic_message(&*panic_err),
                "listener panicked"
            );
        }
    });
}

fn panic_message(any: &(dyn Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_launch_runs_detached() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let h = handler(move |args| {
            let _ = tx.send(args.to_vec());
        });
        launch(&Handle::current(), "e".into(), h, Arc::from(vec![Value::from(7)]));

        let got = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got, vec![Value::from(7)]);
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let rt = Handle::current();
        let (tx, mut rx) = mpsc::unbounded_channel();
        launch(&rt, "e".into(), handler(|_| panic!("boom")), Arc::from(Vec::new()));
        launch(
            &rt,
            "e".into(),
            handler(move |_| {
                let _ = tx.send(());
            }),
            Arc::from(Vec::new()),
        );

        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();

        // The runtime still accepts work after the panic.
        let after = rt.spawn(async { 1 + 1 }).await.unwrap();
        assert_eq!(after, 2);
    }

    #[test]
    fn test_panic_message() {
        let s: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(&*s), "static");
        let s: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(&*s), "owned");
        let s: Box<dyn Any + Send> = Box::new(5_u8);
        assert_eq!(panic_message(&*s), "unknown panic");
    }
}
