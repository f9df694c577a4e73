use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio_stream::Stream;

pin_project! {
    /// Stream that keeps `data` alive for as long as it is polled, e.g. a
    /// drop guard stopping the producer once the client goes away.
    pub struct StreamWithData<S, D> {
        #[pin]
        stream: S,
        data: D,
    }
}

impl<T: Stream, D> Stream for StreamWithData<T, D> {
    type Item = T::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        this.stream.poll_next(cx)
    }
}

pub trait StreamDataExtension: Stream + Sized {
    fn with_data<D>(self, data: D) -> StreamWithData<Self, D> {
        StreamWithData { stream: self, data }
    }
}

impl<T: Stream + Sized> StreamDataExtension for T {}
