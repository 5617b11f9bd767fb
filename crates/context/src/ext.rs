use std::future::Future;
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};

use pin_project_lite::pin_project;

use crate::ContextRef;

pin_project! {
    /// Future returned by [`ContextFutExt::with_context`].
    pub struct WithContext<'a, F> {
        #[pin]
        fut: F,
        #[pin]
        ctx: ContextRef<'a>,
    }
}

impl<'a, F: Future> Future for WithContext<'a, F> {
    type Output = Option<F::Output>;

    fn poll(self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Self::Output> {
        let this = self.project();

        if this.ctx.poll(cx).is_ready() {
            return Poll::Ready(None);
        }

        this.fut.poll(cx).map(Some)
    }
}

/// Extension trait that lets any future be cancelled by a [`Context`].
pub trait ContextFutExt: Future + Sized {
    /// Wraps this future so it resolves to `None` as soon as `ctx` is done,
    /// instead of running to completion.
    fn with_context<'a>(self, ctx: impl Into<ContextRef<'a>>) -> WithContext<'a, Self> {
        WithContext {
            fut: self,
            ctx: ctx.into(),
        }
    }
}

impl<F: Future> ContextFutExt for F {}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::Context;

    use super::*;

    #[tokio::test]
    async fn resolves_when_not_cancelled() {
        let (ctx, _handler) = Context::new();
        let result = std::future::ready(42).with_context(&ctx).await;
        assert_eq!(result, Some(42));
    }

    #[tokio::test]
    async fn resolves_to_none_when_cancelled() {
        let (ctx, handler) = Context::new();
        handler.cancel();
        let result = std::future::pending::<()>().with_context(ctx).await;
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn stops_a_sleeping_future() {
        let (ctx, handler) = Context::new();
        let task = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(10)).with_context(ctx).await
        });

        handler.cancel();
        let result = tokio::time::timeout(Duration::from_millis(200), task).await;
        assert_eq!(result.unwrap().unwrap(), None);
    }
}
