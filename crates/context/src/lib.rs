//! Go-like context utilities for cancelling and waiting on trees of futures.
//!
//! A context can be created from a handler or another context, giving a
//! hierarchy of contexts. Contexts can be attached to futures or streams so
//! they are automatically cancelled when the context is cancelled.
//! [`Handler::shutdown`] blocks until every outstanding context has been
//! dropped, which is what makes graceful shutdown possible.
//!
//! ```rust
//! # use rtmpd_context::{Context, ContextFutExt};
//! # tokio_test::block_on(async {
//! let (ctx, handler) = Context::new();
//!
//! tokio::spawn(async {
//!     tokio::time::sleep(std::time::Duration::from_secs(10)).await;
//! }.with_context(ctx));
//!
//! handler.cancel();
//! # });
//! ```

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize};
use std::task::Poll;

use tokio_util::sync::{CancellationToken, WaitForCancellationFuture, WaitForCancellationFutureOwned};

mod ext;

pub use ext::*;

/// Created by calling [`ContextTrackerInner::child`].
#[derive(Debug)]
struct ContextTracker(Arc<ContextTrackerInner>);

impl Drop for ContextTracker {
    fn drop(&mut self) {
        let prev_active_count = self.0.active_count.fetch_sub(1, std::sync::atomic::Ordering::Relaxed);
        if prev_active_count == 1 && self.0.stopped.load(std::sync::atomic::Ordering::Relaxed) {
            self.0.notify.notify_waiters();
        }
    }
}

#[derive(Debug)]
struct ContextTrackerInner {
    stopped: AtomicBool,
    /// Number of live `ContextTracker`s for this inner.
    active_count: AtomicUsize,
    notify: tokio::sync::Notify,
}

impl ContextTrackerInner {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            stopped: AtomicBool::new(false),
            active_count: AtomicUsize::new(0),
            notify: tokio::sync::Notify::new(),
        })
    }

    fn child(self: &Arc<Self>) -> ContextTracker {
        self.active_count.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        ContextTracker(Arc::clone(self))
    }

    fn stop(&self) {
        self.stopped.store(true, std::sync::atomic::Ordering::Relaxed);
    }

    /// Waits for this tracker to be stopped and all its children dropped.
    async fn wait(&self) {
        let notify = self.notify.notified();

        if self.active_count.load(std::sync::atomic::Ordering::Relaxed) == 0 {
            return;
        }

        notify.await;
    }
}

/// A context for cancelling futures and waiting for shutdown.
#[derive(Debug)]
pub struct Context {
    token: CancellationToken,
    tracker: ContextTracker,
}

impl Clone for Context {
    fn clone(&self) -> Self {
        Self {
            token: self.token.clone(),
            tracker: self.tracker.0.child(),
        }
    }
}

impl Context {
    #[must_use]
    /// Creates a new context using the global handler.
    pub fn new() -> (Self, Handler) {
        Handler::global().new_child()
    }

    #[must_use]
    /// Creates a new child context from this context.
    pub fn new_child(&self) -> (Self, Handler) {
        let token = self.token.child_token();
        let tracker = ContextTrackerInner::new();

        (
            Self {
                tracker: tracker.child(),
                token: token.clone(),
            },
            Handler {
                token: Arc::new(TokenDropGuard(token)),
                tracker,
            },
        )
    }

    #[must_use]
    /// Returns the global context.
    pub fn global() -> Self {
        Handler::global().context()
    }

    /// Waits for the context to be cancelled.
    pub async fn done(&self) {
        self.token.cancelled().await;
    }

    /// Same as [`Context::done`] but takes ownership of the context.
    pub async fn into_done(self) {
        self.done().await;
    }

    #[must_use]
    /// Returns true if the context has already been cancelled.
    pub fn is_done(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Cancels the wrapped token as soon as it is dropped.
#[derive(Debug)]
struct TokenDropGuard(CancellationToken);

impl TokenDropGuard {
    #[must_use]
    fn child(&self) -> CancellationToken {
        self.0.child_token()
    }

    fn cancel(&self) {
        self.0.cancel();
    }
}

impl Drop for TokenDropGuard {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[derive(Debug, Clone)]
pub struct Handler {
    token: Arc<TokenDropGuard>,
    tracker: Arc<ContextTrackerInner>,
}

impl Default for Handler {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler {
    #[must_use]
    pub fn new() -> Handler {
        let token = CancellationToken::new();
        let tracker = ContextTrackerInner::new();

        Handler {
            token: Arc::new(TokenDropGuard(token)),
            tracker,
        }
    }

    #[must_use]
    /// Returns the process-wide handler.
    pub fn global() -> &'static Self {
        static GLOBAL: std::sync::OnceLock<Handler> = std::sync::OnceLock::new();

        GLOBAL.get_or_init(Handler::new)
    }

    /// Cancels the handler and waits for every outstanding context to drop.
    pub async fn shutdown(&self) {
        self.cancel();
        self.done().await;
    }

    /// Waits for the handler to be cancelled and drained.
    pub async fn done(&self) {
        self.token.0.cancelled().await;
        self.tracker.wait().await;
    }

    /// Waits for every outstanding context to drop, regardless of whether the
    /// handler itself has been cancelled.
    pub async fn wait(&self) {
        self.tracker.wait().await;
    }

    #[must_use]
    pub fn context(&self) -> Context {
        Context {
            token: self.token.child(),
            tracker: self.tracker.child(),
        }
    }

    #[must_use]
    pub fn new_child(&self) -> (Context, Handler) {
        self.context().new_child()
    }

    pub fn cancel(&self) {
        self.tracker.stop();
        self.token.cancel();
    }

    pub fn is_done(&self) -> bool {
        self.token.0.is_cancelled()
    }
}

pin_project_lite::pin_project! {
    /// A reference to a context, either owned or borrowed.
    #[project = ContextRefProj]
    pub enum ContextRef<'a> {
        Owned {
            #[pin] fut: WaitForCancellationFutureOwned,
            tracker: ContextTracker,
        },
        Ref {
            #[pin] fut: WaitForCancellationFuture<'a>,
        },
    }
}

impl std::future::Future for ContextRef<'_> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut std::task::Context<'_>) -> Poll<Self::Output> {
        match self.project() {
            ContextRefProj::Owned { fut, .. } => fut.poll(cx),
            ContextRefProj::Ref { fut } => fut.poll(cx),
        }
    }
}

impl From<Context> for ContextRef<'_> {
    fn from(ctx: Context) -> Self {
        ContextRef::Owned {
            fut: ctx.token.cancelled_owned(),
            tracker: ctx.tracker,
        }
    }
}

impl<'a> From<&'a Context> for ContextRef<'a> {
    fn from(ctx: &'a Context) -> Self {
        ContextRef::Ref { fut: ctx.token.cancelled() }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rtmpd_future_ext::FutureExt;

    use super::*;

    #[tokio::test]
    async fn cancel_propagates_to_children() {
        let (ctx, handler) = Context::new_child(&Context::global());
        let (child, _child_handler) = ctx.new_child();

        handler.cancel();

        child.done().with_timeout(Duration::from_millis(100)).await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_waits_for_drop() {
        let (ctx, handler) = Handler::new().new_child();
        let handle = tokio::spawn(async move {
            ctx.done().await;
        });

        handler.cancel();
        handler.done().with_timeout(Duration::from_secs(1)).await.unwrap();
        handle.await.unwrap();
    }
}
