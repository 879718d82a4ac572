//! Integration tests for token-paginated sources: an interrupted run must
//! resume with the saved token, never the first page or an earlier one.

mod common;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use common::{single_item_budget, test_driver};
use longrun::{
    ItemHandler, ItemOutcome, PageFetcher, PageResponse, RunOptions, SourceSpec, TimerRegistrar,
    TriggerEvent,
};

/// Page chain `None -> "a" -> "b" -> "c" -> done`, recording the token of
/// every request it receives.
struct ScriptedPages {
    calls: Mutex<Vec<Option<String>>>,
}

impl ScriptedPages {
    fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<Option<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher<String> for ScriptedPages {
    async fn fetch_page(&self, token: Option<&str>) -> anyhow::Result<PageResponse<String>> {
        self.calls.lock().unwrap().push(token.map(String::from));
        let (value, next_token) = match token {
            None => ("page-start", Some("a")),
            Some("a") => ("page-a", Some("b")),
            Some("b") => ("page-b", Some("c")),
            Some("c") => ("page-c", None),
            Some(other) => anyhow::bail!("unexpected token {other}"),
        };
        Ok(PageResponse {
            value: value.to_string(),
            next_token: next_token.map(String::from),
        })
    }
}

struct PageCollector {
    values: Mutex<Vec<String>>,
}

impl PageCollector {
    fn new() -> Self {
        Self {
            values: Mutex::new(Vec::new()),
        }
    }

    fn values(&self) -> Vec<String> {
        self.values.lock().unwrap().clone()
    }
}

#[async_trait]
impl ItemHandler<String> for PageCollector {
    async fn on_item(&self, item: String) -> anyhow::Result<ItemOutcome> {
        self.values.lock().unwrap().push(item);
        Ok(ItemOutcome::Continue)
    }
}

#[tokio::test]
async fn interrupted_run_resumes_with_saved_token() {
    let (driver, store, timers) = test_driver();
    let fetcher = Arc::new(ScriptedPages::new());
    let handler = PageCollector::new();
    let options = single_item_budget();

    let mut event: Option<TriggerEvent> = None;
    let mut legs = 0;
    loop {
        legs += 1;
        assert!(legs <= 10, "runaway pagination chain");
        let registration = driver
            .run(
                "drain_feed",
                event.as_ref(),
                SourceSpec::pages(fetcher.clone()),
                &handler,
                &options,
            )
            .await
            .unwrap();
        match registration {
            Some(registration) => event = Some(TriggerEvent::resumption(registration.id)),
            None => break,
        }
    }

    // One page per leg; each leg resumed with the exact token the previous
    // leg persisted, never None and never an earlier token.
    assert_eq!(legs, 4);
    assert_eq!(
        fetcher.calls(),
        vec![
            None,
            Some("a".to_string()),
            Some("b".to_string()),
            Some("c".to_string()),
        ]
    );
    assert_eq!(
        handler.values(),
        vec!["page-start", "page-a", "page-b", "page-c"]
    );
    assert_eq!(store.len().await, 0);
    assert!(timers.list_pending().await.unwrap().is_empty());
}

#[tokio::test]
async fn uninterrupted_run_sees_every_page_once() {
    let (driver, store, timers) = test_driver();
    let fetcher = Arc::new(ScriptedPages::new());
    let handler = PageCollector::new();

    let registration = driver
        .run(
            "drain_feed",
            None,
            SourceSpec::pages(fetcher.clone()),
            &handler,
            &RunOptions::default(),
        )
        .await
        .unwrap();

    assert!(registration.is_none());
    assert_eq!(
        fetcher.calls(),
        vec![
            None,
            Some("a".to_string()),
            Some("b".to_string()),
            Some("c".to_string()),
        ]
    );
    assert_eq!(
        handler.values(),
        vec!["page-start", "page-a", "page-b", "page-c"]
    );
    assert_eq!(store.len().await, 0);
    assert!(timers.list_pending().await.unwrap().is_empty());
}
