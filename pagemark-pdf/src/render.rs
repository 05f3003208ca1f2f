//! Cooperative cancellation for page renders.
//!
//! Each canvas owns one [`RenderScheduler`]. Starting a render cancels the
//! one before it; the superseded call returns [`RenderOutcome::Cancelled`]
//! rather than an error.

use crate::error::{PdfError, PdfResult};
use crate::source::{PageInfo, PdfSource};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// How a render request ended, short of failing.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome<T> {
    Rendered(T),
    /// A newer request superseded this one.
    Cancelled,
}

impl<T> RenderOutcome<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RenderOutcome::Cancelled)
    }

    pub fn rendered(self) -> Option<T> {
        match self {
            RenderOutcome::Rendered(output) => Some(output),
            RenderOutcome::Cancelled => None,
        }
    }
}

/// Draws one page.
///
/// Long renders should poll `cancel` and return [`PdfError::Cancelled`]
/// once it fires.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    type Output: Send;

    async fn render(
        &self,
        page: PageInfo,
        scale: f32,
        cancel: CancellationToken,
    ) -> PdfResult<Self::Output>;
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    token: Option<CancellationToken>,
}

/// Serializes renders for a single canvas.
#[derive(Debug, Default)]
pub struct RenderScheduler {
    current: Mutex<Slot>,
}

impl RenderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the in-flight render, if any, and hands out a fresh token.
    async fn begin(&self) -> (u64, CancellationToken) {
        let mut slot = self.current.lock().await;
        if let Some(previous) = slot.token.take() {
            debug!("Cancelling superseded render {}", slot.generation);
            previous.cancel();
        }
        slot.generation += 1;
        let token = CancellationToken::new();
        slot.token = Some(token.clone());
        (slot.generation, token)
    }

    async fn finish(&self, generation: u64) {
        let mut slot = self.current.lock().await;
        if slot.generation == generation {
            slot.token = None;
        }
    }

    /// Cancels the in-flight render without starting another.
    pub async fn cancel(&self) {
        if let Some(token) = self.current.lock().await.token.take() {
            token.cancel();
        }
    }

    /// Whether a render is currently in flight.
    pub async fn is_busy(&self) -> bool {
        self.current.lock().await.token.is_some()
    }

    /// Renders page `number` at `scale`, superseding any earlier request.
    pub async fn render<R>(
        &self,
        source: &dyn PdfSource,
        renderer: &R,
        number: u32,
        scale: f32,
    ) -> PdfResult<RenderOutcome<R::Output>>
    where
        R: PageRenderer + ?Sized,
    {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(PdfError::Render(format!("invalid scale {scale}")));
        }

        let (generation, token) = self.begin().await;
        let result = tokio::select! {
            biased;
            _ = token.cancelled() => Ok(RenderOutcome::Cancelled),
            result = async {
                let page = source.get_page(number).await?;
                renderer.render(page, scale, token.clone()).await
            } => match result {
                Ok(output) => Ok(RenderOutcome::Rendered(output)),
                Err(PdfError::Cancelled) => Ok(RenderOutcome::Cancelled),
                Err(e) => Err(e),
            },
        };
        self.finish(generation).await;

        if matches!(result, Ok(RenderOutcome::Cancelled)) {
            debug!("Render of page {} at {} cancelled", number, scale);
        }
        result
    }
}
