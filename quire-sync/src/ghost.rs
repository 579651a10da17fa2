//! Ghost Admin API client.
//!
//! Posts are addressed at `<domain>/ghost/api/admin/posts/`. Every request
//! carries a freshly minted admin token (`Authorization: Ghost <jwt>`).
//! Markdown bodies are sent as a mobiledoc markdown card so the server does
//! the rendering.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Map, Value};

use quire_core::ContentDocument;

use crate::error::RemoteError;
use crate::remote::{RemoteClient, RemoteEntry};
use crate::token;

const ACCEPT_VERSION: &str = "v5.0";
const DEFAULT_STATUS: &str = "draft";
const BOOLEAN_FIELDS: &[&str] = &["featured"];

/// Blocking Ghost Admin API client.
pub struct GhostAdminClient {
    base_url: String,
    admin_key: String,
    agent: ureq::Agent,
}

#[derive(Debug, Deserialize)]
struct PostsEnvelope {
    posts: Vec<PostRecord>,
}

#[derive(Debug, Deserialize)]
struct PostRecord {
    id: String,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
}

impl GhostAdminClient {
    /// `domain` may omit the scheme (`https://` is assumed). `admin_key` is
    /// the raw `id:secret` pair; it is validated on every request.
    pub fn new(domain: &str, admin_key: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("quire/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            base_url: normalize_domain(domain),
            admin_key: admin_key.into(),
            agent,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn posts_url(&self, suffix: &str) -> String {
        format!("{}/ghost/api/admin/posts/{suffix}", self.base_url)
    }

    fn request(&self, method: &str, url: &str) -> Result<ureq::Request, RemoteError> {
        let token = token::prepare(&self.admin_key)?;
        Ok(self
            .agent
            .request(method, url)
            .set("Authorization", &format!("Ghost {token}"))
            .set("Accept-Version", ACCEPT_VERSION))
    }
}

impl RemoteClient for GhostAdminClient {
    fn find_by_slug(&self, slug: &str) -> Result<Option<RemoteEntry>, RemoteError> {
        let url = self.posts_url(&format!("slug/{slug}/?fields=id,slug,updated_at"));
        let response = match self.request("GET", &url)?.call() {
            Ok(response) => response,
            Err(ureq::Error::Status(404, _)) => return Ok(None),
            Err(err) => return Err(remote_error(err)),
        };
        let record = first_post(response)?;
        Ok(Some(RemoteEntry {
            id: record.id,
            slug: record.slug.unwrap_or_else(|| slug.to_string()),
            updated_at: record.updated_at,
        }))
    }

    fn create(&self, slug: &str, doc: &ContentDocument) -> Result<String, RemoteError> {
        let body = json!({ "posts": [post_payload(slug, doc)] });
        let response = self
            .request("POST", &self.posts_url(""))?
            .send_json(body)
            .map_err(remote_error)?;
        Ok(first_post(response)?.id)
    }

    fn update(&self, entry: &RemoteEntry, slug: &str, doc: &ContentDocument) -> Result<(), RemoteError> {
        let mut post = post_payload(slug, doc);
        if let Some(updated_at) = &entry.updated_at {
            post.insert("updated_at".to_string(), Value::String(updated_at.clone()));
        }
        self.request("PUT", &self.posts_url(&format!("{}/", entry.id)))?
            .send_json(json!({ "posts": [post] }))
            .map_err(remote_error)?;
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), RemoteError> {
        self.request("DELETE", &self.posts_url(&format!("{id}/")))?
            .call()
            .map_err(remote_error)?;
        Ok(())
    }
}

/// Build the post object for create/update.
///
/// Defaults come first and front matter overrides them, `status` included, so
/// authors can publish from front matter. `tags` becomes a list of tag names.
pub fn post_payload(slug: &str, doc: &ContentDocument) -> Map<String, Value> {
    let mut post = Map::new();
    post.insert("title".to_string(), Value::String(slug.to_string()));
    post.insert("status".to_string(), Value::String(DEFAULT_STATUS.to_string()));
    post.insert("mobiledoc".to_string(), Value::String(markdown_mobiledoc(&doc.body)));

    for (key, value) in &doc.metadata {
        let value = match key.as_str() {
            "tags" => Value::Array(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(|name| json!({ "name": name }))
                    .collect(),
            ),
            k if BOOLEAN_FIELDS.contains(&k) => match value.as_str() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => Value::String(value.clone()),
            },
            _ => Value::String(value.clone()),
        };
        post.insert(key.clone(), value);
    }

    post.insert("slug".to_string(), Value::String(slug.to_string()));
    post
}

/// Wrap markdown in a single-card mobiledoc document.
fn markdown_mobiledoc(markdown: &str) -> String {
    json!({
        "version": "0.3.1",
        "atoms": [],
        "cards": [["markdown", { "markdown": markdown }]],
        "markups": [],
        "sections": [[10, 0]],
    })
    .to_string()
}

/// Ensure a scheme and strip trailing slashes.
pub fn normalize_domain(domain: &str) -> String {
    let trimmed = domain.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

fn first_post(response: ureq::Response) -> Result<PostRecord, RemoteError> {
    let envelope: PostsEnvelope = response
        .into_json()
        .map_err(|e| RemoteError::Decode(e.to_string()))?;
    envelope
        .posts
        .into_iter()
        .next()
        .ok_or_else(|| RemoteError::Decode("response contained no posts".to_string()))
}

fn remote_error(err: ureq::Error) -> RemoteError {
    match err {
        ureq::Error::Status(status, response) => RemoteError::RemoteRejected {
            status,
            body: response.into_string().unwrap_or_default(),
        },
        ureq::Error::Transport(transport) => RemoteError::Transport(transport.to_string()),
    }
}
