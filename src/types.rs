use jainam_rs::websocket::subscriptions::{FeedMode, Instrument};

/// Commands sent from main -> stream task.
#[derive(Debug, Clone)]
pub enum StreamCommand {
    /// Start streaming these instruments. Remembered across reconnects.
    Subscribe {
        instruments: Vec<Instrument>,
        mode: FeedMode,
    },
    /// Stop streaming these instruments and forget them.
    Unsubscribe {
        instruments: Vec<Instrument>,
        mode: FeedMode,
    },
    /// Close the connection and end the task.
    Shutdown,
}
