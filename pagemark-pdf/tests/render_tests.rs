mod common;

use async_trait::async_trait;
use common::FakeSource;
use pagemark_pdf::{
    CancellationToken, PageInfo, PageRenderer, PdfError, PdfResult, RenderOutcome,
    RenderScheduler,
};
use pretty_assertions::assert_eq;
use std::time::Duration;

/// Takes an hour on page 1 and is instant elsewhere.
struct SlowFirstPage;

#[async_trait]
impl PageRenderer for SlowFirstPage {
    type Output = String;

    async fn render(
        &self,
        page: PageInfo,
        scale: f32,
        _cancel: CancellationToken,
    ) -> PdfResult<String> {
        if page.number == 1 {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        Ok(format!("page {} @ {scale}", page.number))
    }
}

/// Honors the token itself and reports it as `PdfError::Cancelled`.
struct Cooperative;

#[async_trait]
impl PageRenderer for Cooperative {
    type Output = ();

    async fn render(
        &self,
        _page: PageInfo,
        _scale: f32,
        cancel: CancellationToken,
    ) -> PdfResult<()> {
        cancel.cancel();
        Err(PdfError::Cancelled)
    }
}

struct Failing;

#[async_trait]
impl PageRenderer for Failing {
    type Output = ();

    async fn render(
        &self,
        _page: PageInfo,
        _scale: f32,
        _cancel: CancellationToken,
    ) -> PdfResult<()> {
        Err(PdfError::Render("canvas lost".into()))
    }
}

// ── Supersession ────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn newer_render_cancels_older_one() {
    let source = FakeSource::with_pages(3);
    let scheduler = RenderScheduler::new();

    let (first, second) = tokio::join!(
        scheduler.render(&source, &SlowFirstPage, 1, 1.0),
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            scheduler.render(&source, &SlowFirstPage, 2, 1.5).await
        }
    );

    assert_eq!(first.unwrap(), RenderOutcome::Cancelled);
    assert_eq!(
        second.unwrap(),
        RenderOutcome::Rendered("page 2 @ 1.5".to_string())
    );
    assert!(!scheduler.is_busy().await);
}

#[tokio::test(start_paused = true)]
async fn explicit_cancel_stops_render() {
    let source = FakeSource::with_pages(3);
    let scheduler = RenderScheduler::new();

    let (outcome, ()) = tokio::join!(scheduler.render(&source, &SlowFirstPage, 1, 1.0), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        scheduler.cancel().await;
    });

    assert!(outcome.unwrap().is_cancelled());
}

#[tokio::test]
async fn renderer_reported_cancellation_is_not_an_error() {
    let source = FakeSource::with_pages(1);
    let outcome = RenderScheduler::new()
        .render(&source, &Cooperative, 1, 1.0)
        .await
        .unwrap();
    assert_eq!(outcome, RenderOutcome::Cancelled);
}

// ── Failures ────────────────────────────────────────────────────

#[tokio::test]
async fn render_failure_is_an_error() {
    let source = FakeSource::with_pages(1);
    let err = RenderScheduler::new()
        .render(&source, &Failing, 1, 1.0)
        .await
        .unwrap_err();
    assert!(matches!(err, PdfError::Render(_)));
}

#[tokio::test]
async fn missing_page_is_an_error() {
    let source = FakeSource::with_pages(1);
    let err = RenderScheduler::new()
        .render(&source, &SlowFirstPage, 4, 1.0)
        .await
        .unwrap_err();
    assert!(matches!(err, PdfError::PageOutOfRange { page: 4, .. }));
}

#[tokio::test]
async fn non_positive_scale_rejected() {
    let source = FakeSource::with_pages(1);
    let scheduler = RenderScheduler::new();
    for scale in [0.0, -1.0, f32::NAN] {
        let err = scheduler
            .render(&source, &SlowFirstPage, 2, scale)
            .await
            .unwrap_err();
        assert!(matches!(err, PdfError::Render(_)));
    }
}

#[tokio::test]
async fn completed_render_returns_output() {
    let source = FakeSource::with_pages(2);
    let outcome = RenderScheduler::new()
        .render(&source, &SlowFirstPage, 2, 2.0)
        .await
        .unwrap();
    assert_eq!(outcome.rendered().as_deref(), Some("page 2 @ 2"));
}
