use std::rc::Rc;

use color_eyre::eyre::{self, WrapErr as _};
use secstr::SecUtf8;

use super::ChatMessage;

const API_URL: &str = "https://api.hipchat.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Yellow,
}

#[derive(Debug, Clone, Copy, serde::Serialize)]
#[serde(rename_all = "lowercase")]
enum MessageFormat {
    Html,
}

#[derive(Debug, serde::Serialize)]
struct RoomMessage<'a> {
    from: &'a str,
    room_id: &'a str,
    color: Color,
    message_format: MessageFormat,
    message: &'a str,
}

impl<'a> From<&'a ChatMessage> for RoomMessage<'a> {
    fn from(msg: &'a ChatMessage) -> Self {
        Self {
            from: &msg.from_name,
            room_id: &msg.room,
            color: msg.color,
            message_format: MessageFormat::Html,
            message: &msg.body_html,
        }
    }
}

pub struct HipChat {
    http: Rc<awc::Client>,
    url: SecUtf8,
}

impl HipChat {
    pub fn new(http: Rc<awc::Client>, token: &SecUtf8) -> Self {
        Self::with_base_url(http, API_URL, token)
    }

    pub fn with_base_url(http: Rc<awc::Client>, base_url: &str, token: &SecUtf8) -> Self {
        let url = SecUtf8::from(format!(
            "{}/v1/rooms/message?auth_token={}",
            base_url,
            token.unsecure()
        ));
        Self { http, url }
    }

    async fn try_notify(&self, msg: &ChatMessage) -> eyre::Result<String> {
        let mut resp = self
            .http
            .post(self.url.unsecure())
            .send_form(&RoomMessage::from(msg))
            .await
            .map_err(|err| eyre::eyre!("Failed to send request to HipChat: {}", err))?;

        let body = resp
            .body()
            .await
            .wrap_err("Failed to fetch HipChat response body")?;
        let body = String::from_utf8_lossy(body.as_ref()).into_owned();

        if !resp.status().is_success() {
            eyre::bail!("HipChat API returned error: {}\n{}", resp.status(), body);
        }

        Ok(body)
    }

    pub async fn notify(self: Rc<Self>, msg: ChatMessage) {
        match self.try_notify(&msg).await {
            Ok(body) => tracing::info!(room = msg.room.as_str(), "Sent to HipChat: {}", body),
            Err(err) => tracing::error!(
                room = msg.room.as_str(),
                "Failed sending HipChat notification: {}",
                err
            ),
        }
    }
}
