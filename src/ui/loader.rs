use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::api::ArtworkSource;
use crate::controller::LoadRequest;
use crate::error::FetchError;
use crate::models::ArtworkPage;

/// A finished fetch, tagged with the sequence number of its request.
pub(crate) struct LoadMessage {
    pub(crate) seq: u64,
    pub(crate) result: Result<ArtworkPage, FetchError>,
}

/// Runs page fetches on the async runtime so the draw loop never blocks on
/// the network. Results arrive on the receiver returned by [`PageLoader::new`].
pub(crate) struct PageLoader {
    handle: Handle,
    source: Arc<dyn ArtworkSource>,
    sender: UnboundedSender<LoadMessage>,
}

impl PageLoader {
    pub(crate) fn new(
        handle: Handle,
        source: Arc<dyn ArtworkSource>,
    ) -> (Self, UnboundedReceiver<LoadMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                handle,
                source,
                sender,
            },
            receiver,
        )
    }

    /// Start fetching `request` in the background.
    pub(crate) fn spawn(&self, request: LoadRequest) {
        let source = Arc::clone(&self.source);
        let sender = self.sender.clone();
        self.handle.spawn(async move {
            let result = source.fetch_page(request.page, request.rows).await;
            if sender
                .send(LoadMessage {
                    seq: request.seq,
                    result,
                })
                .is_err()
            {
                debug!(seq = request.seq, "page loaded after the UI shut down");
            }
        });
    }
}
