use actix::Recipient;
use actix_web::{web, HttpResponse};
use tracing::Instrument as _;

use crate::{
    feed::FeedStory,
    github::PushEvent,
    http::{Webhook, WebhookError, MAX_PAYLOAD},
    notifier::{self, ChatMessage, MAIN_ROOM},
    phabricator::Phabricator,
    push::BranchPush,
};

const PHABRICATOR_SENDER: &str = "Phabricator Fox";
const GITHUB_SENDER: &str = "GitHub";

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/phabricator-feed")
            .app_data(
                web::FormConfig::default()
                    .limit(MAX_PAYLOAD)
                    .error_handler(|err, _req| WebhookError::from(err).into()),
            )
            .route(web::post().to(phabricator_feed)),
    )
    .service(
        web::resource("/github-feed")
            .app_data(web::PayloadConfig::new(MAX_PAYLOAD))
            .route(web::post().to(github_feed)),
    );
}

/// Registered in Phabricator's `feed.http-hooks`.
pub async fn phabricator_feed(
    web::Form(story): web::Form<FeedStory>,
    phabricator: web::Data<Phabricator>,
    notifier: web::Data<Recipient<ChatMessage>>,
) -> HttpResponse {
    tracing::info!(
        story_type = story.story_type.as_str(),
        "Processing story {:?}",
        story.story_text
    );

    let message = match story.to_html(phabricator.host()) {
        Some(message) => message,
        None => {
            tracing::info!("Skipping story {:?}", story.story_text);
            return HttpResponse::Ok().finish();
        }
    };

    notifier::deliver(
        &notifier,
        ChatMessage::new(MAIN_ROOM, PHABRICATOR_SENDER, message),
    )
    .await;

    // Only for the log, so it must never hold up the chat message
    if let Some(phid) = &story.author_phid {
        match phabricator.username_from_phid(phid).await {
            Ok(author) => tracing::info!(
                author = author.as_deref().unwrap_or("unknown"),
                "Announced story by {}",
                phid
            ),
            Err(err) => tracing::warn!("Failed to look up story author {}: {}", phid, err),
        }
    }

    HttpResponse::Ok().finish()
}

/// Registered as a GitHub webhook.
pub async fn github_feed(
    hook: Webhook,
    notifier: web::Data<Recipient<ChatMessage>>,
) -> Result<HttpResponse, WebhookError> {
    let event_type = hook.event.as_deref().unwrap_or_default();
    tracing::info!(event = event_type, "Processing {} event", event_type);
    tracing::debug!("Payload: {}", String::from_utf8_lossy(hook.body()));

    if event_type != "push" {
        tracing::info!("Skipping event type {:?}", event_type);
        return Ok(HttpResponse::Ok().finish());
    }

    let event: PushEvent = hook.payload()?;
    let push = match BranchPush::from_event(&event) {
        Some(push) => push,
        None => {
            tracing::info!("Skipping ref {}", event.reference);
            return Ok(HttpResponse::Ok().finish());
        }
    };

    let span = tracing::info_span!(
        "push",
        repo = push.short_repo_name.as_str(),
        branch = push.branch,
        kind = ?push.kind(),
    );
    let message = push.to_html();
    async {
        for room in push.rooms() {
            notifier::deliver(
                &notifier,
                ChatMessage::new(room, GITHUB_SENDER, message.clone()),
            )
            .await;
        }
    }
    .instrument(span)
    .await;

    Ok(HttpResponse::Ok().finish())
}
