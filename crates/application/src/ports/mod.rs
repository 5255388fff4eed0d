mod answer_log;
mod forwarder;
mod response_sink;

pub use answer_log::{AnswerLog, NoopAnswerLog};
pub use forwarder::{ExchangeReply, Forwarder, TransferStats};
pub use response_sink::ResponseSink;
