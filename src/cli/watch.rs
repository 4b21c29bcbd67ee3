//! Live status view

use std::future::Future;
use std::time::Duration;

use log::{debug, info};
use tokio::time::MissedTickBehavior;

use crate::cli::{CommandContext, GlobalOptions};
use crate::error::Result;
use crate::status::StatusPoller;

/// Poll on a fixed interval until Ctrl-C.
///
/// The retry timer runs on its own while the backend is offline; regular
/// refreshes keep going regardless.
pub async fn run(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let poller = ctx.poller()?;
    info!("Watching {}", ctx.base_url);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let transitions = watch_loop(
        &poller,
        ctx.config.refresh_interval(),
        ctx.config.ip_refresh_interval(),
        shutdown,
    )
    .await;
    debug!("Watch ended after {} state changes", transitions);
    Ok(())
}

/// Drive refreshes until `shutdown` resolves; returns the number of state changes seen
async fn watch_loop<S>(
    poller: &StatusPoller,
    refresh: Duration,
    ip_refresh: Duration,
    shutdown: S,
) -> usize
where
    S: Future<Output = ()>,
{
    let mut connectivity = poller.watch();
    let mut shown = connectivity.current();
    let mut transitions = 0;

    let mut refresh = tokio::time::interval(refresh);
    refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut ip_refresh = tokio::time::interval(ip_refresh);
    ip_refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = refresh.tick() => {
                debug!("Scheduled status refresh");
                tokio::spawn(poller.poll());
            }
            _ = ip_refresh.tick() => {
                let poller = poller.clone();
                tokio::spawn(async move {
                    // Failures are logged by the poller
                    let _ = poller.refresh_network().await;
                });
            }
            Some(state) = connectivity.changed() => {
                if shown != Some(state) {
                    info!("Backend is now {}", state);
                    shown = Some(state);
                    transitions += 1;
                }
            }
            () = &mut shutdown => {
                info!("Stopping watch");
                break;
            }
        }
    }
    transitions
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use reqwest::Url;

    use crate::client::{MockFetcher, MockReply};
    use crate::clock::TokioClock;
    use crate::status::poller::{IP_PATH, SUMMARY_PATH};
    use crate::status::view::RecordingRenderer;
    use crate::status::{ConnectivityState, PollerOptions};

    const SUMMARY: &str = r#"{"client": {"isLocal": true},
        "server": {"hostname": "nas", "uptimeSec": 1, "os": "linux", "arch": "amd64", "goVersion": "go1.22"}}"#;

    fn poller(fetcher: Arc<MockFetcher>, renderer: Arc<RecordingRenderer>) -> StatusPoller {
        let options = PollerOptions::for_base(&Url::parse("http://dash.lan").unwrap()).unwrap();
        StatusPoller::new(fetcher, Arc::new(TokioClock), renderer, options)
    }

    #[tokio::test(start_paused = true)]
    async fn test_refreshes_on_schedule_until_shutdown() {
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.set(SUMMARY_PATH, MockReply::status(200, SUMMARY));
        fetcher.set(IP_PATH, MockReply::status(200, "{}"));
        let renderer = Arc::new(RecordingRenderer::default());
        let poller = poller(fetcher.clone(), renderer.clone());

        watch_loop(
            &poller,
            Duration::from_secs(30),
            Duration::from_secs(300),
            tokio::time::sleep(Duration::from_secs(65)),
        )
        .await;
        tokio::task::yield_now().await;

        // Polls at 0s, 30s and 60s
        assert_eq!(renderer.summary_count(), 3);
        // One network refresh at 0s
        assert_eq!(fetcher.calls(IP_PATH), 1);
        assert_eq!(poller.state(), Some(ConnectivityState::Online));
    }

    #[tokio::test(start_paused = true)]
    async fn test_offline_backend_keeps_indicator_offline() {
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.set(SUMMARY_PATH, MockReply::status(503, ""));
        fetcher.set(IP_PATH, MockReply::status(503, ""));
        let renderer = Arc::new(RecordingRenderer::default());
        let poller = poller(fetcher.clone(), renderer.clone());

        watch_loop(
            &poller,
            Duration::from_secs(30),
            Duration::from_secs(300),
            tokio::time::sleep(Duration::from_secs(12)),
        )
        .await;

        // First scheduled poll at 0s, retries at 5s and 10s
        assert_eq!(poller.state(), Some(ConnectivityState::Offline));
        assert!(poller.is_retry_armed());
        assert_eq!(renderer.summary_count(), 0);
        assert!(fetcher.calls(SUMMARY_PATH) >= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_counts_only_real_transitions() {
        let fetcher = Arc::new(MockFetcher::new());
        // The first poll and the first network refresh both see the outage
        fetcher.push(SUMMARY_PATH, MockReply::status(503, ""));
        fetcher.push(SUMMARY_PATH, MockReply::status(503, ""));
        fetcher.set(SUMMARY_PATH, MockReply::status(200, SUMMARY));
        fetcher.set(IP_PATH, MockReply::status(200, "{}"));
        let renderer = Arc::new(RecordingRenderer::default());
        let poller = poller(fetcher.clone(), renderer.clone());

        let transitions = watch_loop(
            &poller,
            Duration::from_secs(30),
            Duration::from_secs(300),
            tokio::time::sleep(Duration::from_secs(35)),
        )
        .await;

        // Offline at 0s, back online on the 5s retry; the 30s refresh repeats Online
        assert_eq!(transitions, 2);
        assert_eq!(poller.state(), Some(ConnectivityState::Online));
        assert!(!poller.is_retry_armed());
    }
}
