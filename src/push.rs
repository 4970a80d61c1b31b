//! Renders GitHub push events into short HTML summaries.

use crate::{
    github::{Commit, PushEvent},
    html,
    notifier::{ATHENA_ROOM, MAIN_ROOM},
};

pub const COMMITS_TO_SHOW: usize = 5;
const MAX_LINE_LENGTH: usize = 60;

/// What happened to the branch, in order of precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushKind {
    Created,
    Deleted,
    Forced,
    Pushed,
    FastForward,
}

impl PushKind {
    pub fn classify(event: &PushEvent, has_new_commits: bool) -> Self {
        if event.created {
            PushKind::Created
        } else if event.deleted {
            PushKind::Deleted
        } else if event.forced {
            PushKind::Forced
        } else if has_new_commits {
            PushKind::Pushed
        } else {
            PushKind::FastForward
        }
    }
}

/// A push to a branch, with its commits split by whether they are new to the
/// repository.
#[derive(Debug)]
pub struct BranchPush<'a> {
    event: &'a PushEvent,
    pub branch: &'a str,
    pub short_repo_name: String,
    old_commits: Vec<&'a Commit>,
    new_commits: Vec<&'a Commit>,
}

/// Returns the first `n` characters of `s`.
fn prefix(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn commit_title(message: &str) -> String {
    let title = message.split('\n').next().unwrap_or_default();
    if title.chars().count() > MAX_LINE_LENGTH {
        format!("{}...", prefix(title, MAX_LINE_LENGTH - 3))
    } else {
        title.to_owned()
    }
}

impl<'a> BranchPush<'a> {
    /// Returns `None` for refs that aren't branches, e.g. tags.
    pub fn from_event(event: &'a PushEvent) -> Option<Self> {
        let branch = event.reference.strip_prefix("refs/heads/")?;
        let (new_commits, old_commits) = event.commits.iter().partition(|c| c.distinct);
        Some(Self {
            event,
            branch,
            short_repo_name: event.repository.short_name(),
            old_commits,
            new_commits,
        })
    }

    pub fn kind(&self) -> PushKind {
        PushKind::classify(self.event, !self.new_commits.is_empty())
    }

    fn commit_link(&self, hash: &str) -> String {
        html::link(
            &format!("{}/commit/{}", self.event.repository.url, hash),
            prefix(hash, 6),
        )
    }

    fn header(&self) -> String {
        let url = &self.event.repository.url;
        let branch_link = html::link(&format!("{}/tree/{}", url, self.branch), self.branch);
        let repo_link = html::link(url, &self.short_repo_name);

        let verb = match self.kind() {
            PushKind::Created => format!("created branch {} of {}", branch_link, repo_link),
            PushKind::Deleted => format!(
                "deleted branch {} of {}",
                html::escape(self.branch),
                repo_link
            ),
            PushKind::Forced => format!(
                "force-pushed branch {} of {} from {} to {}",
                branch_link,
                repo_link,
                self.commit_link(&self.event.before),
                self.commit_link(&self.event.after),
            ),
            PushKind::Pushed => format!("pushed to branch {} of {}", branch_link, repo_link),
            PushKind::FastForward => format!(
                "fast-forward pushed branch {} of {} to {}",
                branch_link,
                repo_link,
                self.commit_link(&self.event.after),
            ),
        };

        let pusher = &self.event.pusher.name;
        format!(
            "{} {}",
            html::link(&format!("https://github.com/{}", pusher), pusher),
            verb
        )
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![self.header()];

        lines.extend(self.new_commits.iter().take(COMMITS_TO_SHOW).map(|commit| {
            format!(
                "- {} ({})",
                html::escape(&commit_title(&commit.message)),
                html::link(&commit.url, prefix(&commit.id, 7)),
            )
        }));

        if !self.old_commits.is_empty() {
            // A fast-forward has nothing to be "and"-ed to
            let and = if self.new_commits.is_empty() { "" } else { "and " };
            match self.old_commits.len() {
                1 => lines.push(format!("- {}1 existing commit", and)),
                n => lines.push(format!("- {}{} existing commits", and, n)),
            }
        }

        if self.new_commits.len() > COMMITS_TO_SHOW {
            lines.push(format!(
                "- and {} more...",
                self.new_commits.len() - COMMITS_TO_SHOW
            ));
        }

        lines
    }

    pub fn to_html(&self) -> String {
        self.lines().join("<br>")
    }

    /// Rooms that should hear about this push.
    pub fn rooms(&self) -> Vec<&'static str> {
        let mut rooms = vec![MAIN_ROOM];
        // Matches both `athena` and `athena-*`
        if self.short_repo_name == "Khan/webapp"
            && format!("{}-", self.branch).starts_with("athena-")
        {
            rooms.push(ATHENA_ROOM);
        }
        rooms
    }
}
