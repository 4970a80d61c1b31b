#[derive(Debug, Clone, serde::Deserialize)]
pub struct Owner {
    pub name: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Pusher {
    pub name: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Repository {
    pub name: String,
    pub owner: Owner,
    pub url: String,
}

impl Repository {
    /// Like `Khan/webapp`.
    pub fn short_name(&self) -> String {
        format!("{}/{}", self.owner.name, self.name)
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Commit {
    pub id: String,
    pub url: String,
    pub message: String,
    pub distinct: bool,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct PushEvent {
    #[serde(rename = "ref")]
    pub reference: String,
    pub before: String,
    pub after: String,
    pub created: bool,
    pub deleted: bool,
    pub forced: bool,
    pub pusher: Pusher,
    pub repository: Repository,
    pub commits: Vec<Commit>,
}
