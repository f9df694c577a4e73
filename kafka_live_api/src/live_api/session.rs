use crate::live_api::proto::StreamTopicsRequest;
use crate::live_api::proto_queries_to_internal;
use kafka_live::live_channel::LiveChannel;
use kafka_live::multiplexer::{StreamMultiplexer, TaggedFrame};
use tokio::select;
use tokio::sync::mpsc::Receiver;
use tokio_stream::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tonic::Status;
use tracing::{debug, info, info_span, warn, Instrument};

const OUTPUT_CHANNEL_CAPACITY: usize = 128;

/// Drives one panel's multiplexer: applies every query set arriving on
/// `requests` and forwards merged frames to the returned receiver. The
/// multiplexer, and with it every open subscription, is dropped when the
/// token is cancelled or the receiver goes away.
pub fn run_multiplexer_to_channel<C, R>(
    mut multiplexer: StreamMultiplexer<C>,
    mut requests: R,
    cancellation_token: CancellationToken,
) -> Receiver<TaggedFrame>
where
    C: LiveChannel + Unpin + Send + 'static,
    R: Stream<Item = Result<StreamTopicsRequest, Status>> + Unpin + Send + 'static,
{
    let (tx, rx) = tokio::sync::mpsc::channel(OUTPUT_CHANNEL_CAPACITY);
    let namespace = multiplexer.namespace().to_owned();

    let future = async move {
        let mut requests_open = true;

        loop {
            select! {
                _ = cancellation_token.cancelled() => {
                    info!("Streaming was cancelled");
                    break;
                }
                request = requests.next(), if requests_open => match request {
                    Some(Ok(request)) => {
                        if !request.datasource_uid.is_empty() && request.datasource_uid != namespace {
                            warn!(
                                "Ignoring query set for data source {}, stream is bound to {}",
                                request.datasource_uid, namespace
                            );
                            continue;
                        }

                        match proto_queries_to_internal(request.queries) {
                            Ok(queries) => {
                                let outcome = multiplexer.run(&queries);
                                debug!(
                                    "Queries updated. Opened {}, closed {}, failures {}",
                                    outcome.opened,
                                    outcome.closed,
                                    outcome.failures.len()
                                );
                            }
                            Err(e) => warn!("Ignoring invalid query set: {:?}", e),
                        }
                    }
                    Some(Err(status)) => {
                        warn!("Query stream failed: {}", status);
                        requests_open = false;
                    }
                    None => {
                        debug!("Query stream closed by client");
                        requests_open = false;
                    }
                },
                frame = multiplexer.next() => {
                    let Some(frame) = frame else {
                        break;
                    };

                    if tx.send(frame).await.is_err() {
                        debug!("Frame receiver is gone");
                        break;
                    }
                }
            }
        }

        debug!(
            "Stopping stream with {} open subscriptions",
            multiplexer.open_subscriptions()
        );
    }
    .instrument(info_span!("Streaming topics").or_current());

    tokio::task::spawn(future);

    rx
}
