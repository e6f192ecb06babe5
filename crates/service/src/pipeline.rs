//! Pipeline wiring: source -> consumer -> controller -> publisher -> sink

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use txgate_core::TransactionEvent;
use txgate_engine::AdmissionController;
use txgate_stream::{
    ConsumerLoop, ConsumerStats, DecisionPublisher, EventHandler, RecordSink, RecordSource,
    RetryPolicy, RetryingPublisher, StreamError,
};

use crate::config::ServiceConfig;
use crate::error::ServiceError;

/// Event handler that evaluates each event and publishes its decisions.
///
/// Publish failures have already been retried by the publisher; here they
/// are logged and the decision dropped, trading a lost decision for
/// continued availability. The record is still acknowledged afterwards.
pub struct AdmissionHandler<P> {
    controller: Arc<AdmissionController>,
    publisher: P,
}

impl<P: DecisionPublisher> AdmissionHandler<P> {
    pub fn new(controller: Arc<AdmissionController>, publisher: P) -> Self {
        Self {
            controller,
            publisher,
        }
    }
}

#[async_trait]
impl<P: DecisionPublisher> EventHandler for AdmissionHandler<P> {
    async fn handle(&self, event: &TransactionEvent) -> Result<(), StreamError> {
        let decisions = self.controller.evaluate(event);
        for decision in &decisions {
            if let Err(err) = self.publisher.publish(decision).await {
                tracing::error!(
                    %err,
                    transaction_id = decision.transaction_id,
                    account_id = decision.account_id,
                    "decision dropped"
                );
            }
        }
        Ok(())
    }
}

/// Run the admission pipeline over the given transport until the source
/// ends. Returns the consumer counters.
pub async fn run<S, K>(config: ServiceConfig, source: S, sink: K) -> Result<ConsumerStats, ServiceError>
where
    S: RecordSource,
    K: RecordSink + 'static,
{
    let controller = Arc::new(AdmissionController::new(config.admission.clone()));

    let publisher = RetryingPublisher::new(
        sink,
        config.publisher.max_retries,
        config.publisher.backoff(),
    );
    let handler = AdmissionHandler::new(Arc::clone(&controller), publisher);

    let reaper = config.reaper_interval().map(|interval| {
        let controller = Arc::clone(&controller);
        tokio::spawn(reap_idle_ledgers(controller, interval))
    });

    let policy = RetryPolicy {
        max_attempts: config.consumer.max_attempts,
        backoff: config.consumer.backoff(),
    };
    let stats = ConsumerLoop::new(source, handler, policy).run().await?;

    if let Some(reaper) = reaper {
        reaper.abort();
    }
    Ok(stats)
}

/// Periodically drop ledgers whose window has fully expired
async fn reap_idle_ledgers(controller: Arc<AdmissionController>, interval: Duration) {
    let window = controller.config().window();
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        controller.store().sweep(Utc::now() - window);
    }
}
