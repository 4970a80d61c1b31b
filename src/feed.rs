//! Phabricator feed stories.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::html;

pub const TRANSACTION_STORY: &str = "PhabricatorApplicationTransactionFeedStory";

static STORY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-zA-Z0-9.]+) (created|abandoned) ((D[0-9]+): .*)\.(\n?)$")
        .expect("static regex compile")
});

/// Form body posted by Phabricator's `feed.http-hooks`.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct FeedStory {
    #[serde(rename = "storyType")]
    pub story_type: String,
    #[serde(rename = "storyText")]
    pub story_text: String,
    #[serde(rename = "storyAuthorPHID", default)]
    pub author_phid: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Created,
    Abandoned,
}

impl Verb {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "created" => Some(Verb::Created),
            "abandoned" => Some(Verb::Abandoned),
            _ => None,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verb::Created => "created",
            Verb::Abandoned => "abandoned",
        })
    }
}

/// A story about a differential revision, like
/// `alice created D123: Fix the thing.`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryMatch<'a> {
    pub actor: &'a str,
    pub verb: Verb,
    /// `D123`
    pub revision: &'a str,
    /// `D123: Fix the thing`
    pub description: &'a str,
    /// Newline left after the final period, if any.
    pub trailer: &'a str,
}

impl<'a> StoryMatch<'a> {
    pub fn parse(text: &'a str) -> Option<Self> {
        let caps = STORY_PATTERN.captures(text)?;
        Some(Self {
            actor: caps.get(1)?.as_str(),
            verb: Verb::parse(caps.get(2)?.as_str())?,
            description: caps.get(3)?.as_str(),
            revision: caps.get(4)?.as_str(),
            trailer: caps.get(5).map_or("", |m| m.as_str()),
        })
    }

    /// Renders the story with the revision description linked to `{host}/D123`.
    pub fn to_html(&self, host: &str) -> String {
        let url = format!("{}/{}", host, self.revision);
        format!(
            "{} {} {}.{}",
            self.actor,
            self.verb,
            html::link(&url, self.description),
            self.trailer
        )
    }
}

impl FeedStory {
    /// Returns the chat message for this story, or `None` if it isn't one we
    /// announce.
    pub fn to_html(&self, host: &str) -> Option<String> {
        if self.story_type != TRANSACTION_STORY {
            return None;
        }
        StoryMatch::parse(&self.story_text).map(|story| story.to_html(host))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOST: &str = "https://phabricator.example.org";

    fn story(story_type: &str, text: &str) -> FeedStory {
        FeedStory {
            story_type: story_type.to_owned(),
            story_text: text.to_owned(),
            author_phid: None,
        }
    }

    #[test]
    fn created_revision_is_linked() {
        let story = story(TRANSACTION_STORY, "alice created D123: Fix the thing.");
        assert_eq!(
            story.to_html(HOST).unwrap(),
            r#"alice created <a href="https://phabricator.example.org/D123">D123: Fix the thing</a>."#
        );
    }

    #[test]
    fn parse_yields_parts() {
        let m = StoryMatch::parse("j.doe abandoned D9: Try. Again.").unwrap();
        assert_eq!(
            m,
            StoryMatch {
                actor: "j.doe",
                verb: Verb::Abandoned,
                revision: "D9",
                description: "D9: Try. Again",
                trailer: "",
            }
        );
    }

    #[test]
    fn other_story_types_are_ignored() {
        let story = story(
            "PhabricatorTokenGivenFeedStory",
            "alice created D123: Fix the thing.",
        );
        assert_eq!(story.to_html(HOST), None);
    }

    #[test]
    fn unmatched_text_is_ignored() {
        for text in &[
            "alice accepted D123: Fix the thing.",
            "alice created D123: Fix the thing",
            "alice created T123: Fix the thing.",
            "alice created D123 Fix the thing.",
            "al ice created D123: Fix the thing.",
            "alice created D123: Fix\nthe thing.",
            " alice created D123: Fix the thing.",
            "",
        ] {
            assert_eq!(StoryMatch::parse(text), None, "{:?}", text);
        }
    }

    #[test]
    fn description_is_escaped() {
        let story = story(TRANSACTION_STORY, r#"bob created D7: Use <b> & "quotes"."#);
        assert_eq!(
            story.to_html(HOST).unwrap(),
            concat!(
                r#"bob created <a href="https://phabricator.example.org/D7">"#,
                r#"D7: Use &lt;b&gt; &amp; &quot;quotes&quot;</a>."#
            )
        );
    }

    #[test]
    fn trailing_newline_is_kept() {
        let story = story(TRANSACTION_STORY, "alice abandoned D1: Nope.\n");
        assert_eq!(
            story.to_html(HOST).unwrap(),
            "alice abandoned <a href=\"https://phabricator.example.org/D1\">D1: Nope</a>.\n"
        );
    }
}
