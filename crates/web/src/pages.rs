use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use floodaware_common::config::PageSessionConfig;
use floodaware_common::ids::PageId;

use crate::client::AnalysisCaller;
use crate::submission::{FlowSettings, SubmissionFlow};

/// Mounted flood-detection pages, each with its own independent
/// [`SubmissionFlow`]. Pages idle longer than the TTL are unmounted; at
/// capacity the least recently used page is unmounted to make room.
pub struct PageRegistry {
    pages: Mutex<HashMap<PageId, PageEntry>>,
    caller: Arc<dyn AnalysisCaller>,
    settings: FlowSettings,
    idle_ttl: Duration,
    max_pages: usize,
}

struct PageEntry {
    flow: Arc<SubmissionFlow>,
    last_seen: Instant,
}

impl PageRegistry {
    pub fn new(
        caller: Arc<dyn AnalysisCaller>,
        settings: FlowSettings,
        config: &PageSessionConfig,
    ) -> Self {
        Self {
            pages: Mutex::new(HashMap::new()),
            caller,
            settings,
            idle_ttl: Duration::from_secs(config.idle_ttl_seconds),
            max_pages: config.max_sessions.max(1),
        }
    }

    /// Mount a fresh page with empty state.
    pub async fn mount(&self) -> Arc<SubmissionFlow> {
        let mut pages = self.pages.lock().await;
        self.evict_expired_locked(&mut pages);

        while pages.len() >= self.max_pages {
            let oldest = pages
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| *id);
            let Some(id) = oldest else { break };
            if let Some(entry) = pages.remove(&id) {
                tracing::info!(page_id = %id, "Page evicted at capacity");
                metrics::counter!("pages.evicted", "reason" => "capacity").increment(1);
                entry.flow.unmount();
            }
        }

        let page_id = PageId::new();
        let flow = Arc::new(SubmissionFlow::new(
            page_id,
            Arc::clone(&self.caller),
            self.settings.clone(),
        ));
        pages.insert(
            page_id,
            PageEntry {
                flow: Arc::clone(&flow),
                last_seen: Instant::now(),
            },
        );

        tracing::debug!(page_id = %page_id, mounted = pages.len(), "Page mounted");
        metrics::gauge!("pages.mounted").set(pages.len() as f64);
        flow
    }

    /// Look up a mounted page and mark it as used. Expired pages are
    /// unmounted and reported as missing.
    pub async fn get(&self, page_id: PageId) -> Option<Arc<SubmissionFlow>> {
        let mut pages = self.pages.lock().await;
        let entry = pages.get_mut(&page_id)?;

        // A page with an attempt in flight is in use even if nobody looked.
        if entry.last_seen.elapsed() >= self.idle_ttl && !entry.flow.is_loading() {
            if let Some(entry) = pages.remove(&page_id) {
                entry.flow.unmount();
                metrics::counter!("pages.evicted", "reason" => "idle").increment(1);
                metrics::gauge!("pages.mounted").set(pages.len() as f64);
            }
            return None;
        }

        entry.last_seen = Instant::now();
        Some(Arc::clone(&entry.flow))
    }

    /// Unmount a page. Returns false if it was not mounted.
    pub async fn unmount(&self, page_id: PageId) -> bool {
        let mut pages = self.pages.lock().await;
        let Some(entry) = pages.remove(&page_id) else {
            return false;
        };
        entry.flow.unmount();

        tracing::debug!(page_id = %page_id, mounted = pages.len(), "Page unmounted");
        metrics::gauge!("pages.mounted").set(pages.len() as f64);
        true
    }

    /// Unmount every page idle longer than the TTL. Returns how many went.
    pub async fn evict_expired(&self) -> usize {
        let mut pages = self.pages.lock().await;
        self.evict_expired_locked(&mut pages)
    }

    pub async fn len(&self) -> usize {
        self.pages.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.pages.lock().await.is_empty()
    }

    fn evict_expired_locked(&self, pages: &mut HashMap<PageId, PageEntry>) -> usize {
        let ttl = self.idle_ttl;
        let expired: Vec<PageId> = pages
            .iter()
            .filter(|(_, e)| e.last_seen.elapsed() >= ttl && !e.flow.is_loading())
            .map(|(id, _)| *id)
            .collect();

        for id in &expired {
            if let Some(entry) = pages.remove(id) {
                entry.flow.unmount();
            }
        }

        if !expired.is_empty() {
            tracing::debug!(evicted = expired.len(), "Idle pages unmounted");
            metrics::counter!("pages.evicted", "reason" => "idle").increment(expired.len() as u64);
            metrics::gauge!("pages.mounted").set(pages.len() as f64);
        }
        expired.len()
    }
}

/// Periodically unmount idle pages.
pub fn spawn_sweeper(registry: Arc<PageRegistry>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            registry.evict_expired().await;
        }
    })
}
