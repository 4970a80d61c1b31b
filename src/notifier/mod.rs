mod hipchat;

use std::{fmt, rc::Rc};

use actix::prelude::*;
use secstr::SecUtf8;

pub use self::hipchat::Color;

pub const MAIN_ROOM: &str = "1s and 0s";
pub const ATHENA_ROOM: &str = "Athena";

#[derive(Debug, Clone, PartialEq, Eq, Message)]
#[rtype(result = "()")]
pub struct ChatMessage {
    pub room: String,
    pub from_name: String,
    pub body_html: String,
    pub color: Color,
}

impl ChatMessage {
    pub fn new(room: &str, from_name: &str, body_html: String) -> Self {
        Self {
            room: room.to_owned(),
            from_name: from_name.to_owned(),
            body_html,
            color: Color::Yellow,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub hipchat_token: SecUtf8,
}

/// Posts chat messages to HipChat. Failures are logged, never returned.
#[derive(Clone)]
pub struct Notifier {
    hipchat: Rc<hipchat::HipChat>,
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier").finish()
    }
}

impl Notifier {
    pub fn new(config: Config) -> Self {
        let http = Rc::new(awc::Client::new());
        let Config { hipchat_token } = config;
        Self {
            hipchat: Rc::new(hipchat::HipChat::new(http, &hipchat_token)),
        }
    }
}

impl Actor for Notifier {
    type Context = Context<Self>;
}

impl Handler<ChatMessage> for Notifier {
    type Result = ResponseFuture<()>;

    fn handle(&mut self, msg: ChatMessage, _ctx: &mut Self::Context) -> Self::Result {
        Box::pin(self.hipchat.clone().notify(msg))
    }
}

/// Delivers `msg` and waits for the outcome. A dead mailbox is logged like
/// any other delivery failure.
pub async fn deliver(notifier: &Recipient<ChatMessage>, msg: ChatMessage) {
    let room = msg.room.clone();
    if let Err(err) = notifier.send(msg).await {
        tracing::error!(room = room.as_str(), "Failed to queue chat message: {}", err);
    }
}
