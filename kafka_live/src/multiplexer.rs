mod reconcile;
mod stream_multiplexer;
mod tagged_frame;

pub use reconcile::ReconcileOutcome;
pub use stream_multiplexer::*;
pub use tagged_frame::*;
