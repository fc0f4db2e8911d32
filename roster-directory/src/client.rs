//! Directory API client.

use std::path::Path;

use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use roster_core::paging::{next_token, Page, Pages};
use roster_core::{DirectoryAdapter, DirectoryError, SourceGroup, SourceUser};

use crate::credentials::ServiceAccountKey;
use crate::http::{self, ureq_error};
use crate::token::{ServiceAccountTokens, TokenSource};

/// Largest page the directory API hands out for both listings.
const PAGE_SIZE: &str = "200";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupsPage {
    #[serde(default)]
    groups: Vec<SourceGroup>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsersPage {
    #[serde(default)]
    users: Vec<WireUser>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireUser {
    id: String,
    primary_email: String,
    #[serde(default)]
    name: WireName,
    #[serde(default)]
    suspended: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireName {
    #[serde(default)]
    full_name: String,
}

impl From<WireUser> for SourceUser {
    fn from(user: WireUser) -> Self {
        Self {
            id: user.id,
            primary_email: user.primary_email,
            full_name: user.name.full_name,
            suspended: user.suspended,
        }
    }
}

/// Directory adapter backed by the Admin Directory REST API.
pub struct GoogleDirectory<T> {
    agent: ureq::Agent,
    base_url: String,
    tokens: T,
}

impl GoogleDirectory<ServiceAccountTokens> {
    /// Load the service-account key at `credentials_path` and impersonate
    /// `admin_email` for every request.
    pub fn connect(
        credentials_path: &Path,
        admin_email: &str,
        base_url: impl Into<String>,
    ) -> Result<Self, DirectoryError> {
        let key = ServiceAccountKey::load(credentials_path)?;
        let agent = http::agent();
        let tokens = ServiceAccountTokens::new(key, admin_email, agent.clone())?;
        Ok(Self::with_token_source(base_url, tokens, agent))
    }
}

impl<T: TokenSource> GoogleDirectory<T> {
    pub fn with_token_source(base_url: impl Into<String>, tokens: T, agent: ureq::Agent) -> Self {
        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
        }
    }

    /// Force a token exchange; used to verify credentials before a run.
    pub fn authenticate(&self) -> Result<(), DirectoryError> {
        self.tokens.access_token().map(|_| ())
    }

    fn get_page<R: DeserializeOwned>(
        &self,
        resource: &str,
        params: &[(&str, &str)],
        page_token: Option<&String>,
    ) -> Result<R, DirectoryError> {
        let token = self.tokens.access_token()?;
        let url = format!("{}/admin/directory/v1/{resource}", self.base_url);

        let mut request = self
            .agent
            .get(&url)
            .set("Authorization", &format!("Bearer {}", token.expose_secret()))
            .query("maxResults", PAGE_SIZE);
        for (key, value) in params {
            request = request.query(key, value);
        }
        if let Some(page_token) = page_token {
            request = request.query("pageToken", page_token);
        }

        request
            .call()
            .map_err(ureq_error)?
            .into_json()
            .map_err(|e| DirectoryError::Decode(format!("{resource}: {e}")))
    }
}

impl<T: TokenSource> DirectoryAdapter for GoogleDirectory<T> {
    fn list_groups_for_user(&self, email: &str) -> Result<Vec<SourceGroup>, DirectoryError> {
        let pages = Pages::new(
            |cursor: Option<&String>| -> Result<Page<SourceGroup, String>, DirectoryError> {
                let page: GroupsPage = self.get_page("groups", &[("userKey", email)], cursor)?;
                Ok(Page {
                    items: page.groups,
                    next: next_token(page.next_page_token),
                })
            },
        );
        let groups = pages.exhaust()?;
        debug!(email, count = groups.len(), "listed directory groups for user");
        Ok(groups)
    }

    fn list_all_users(&self, customer_id: &str) -> Result<Vec<SourceUser>, DirectoryError> {
        let pages = Pages::new(
            |cursor: Option<&String>| -> Result<Page<SourceUser, String>, DirectoryError> {
                let page: UsersPage =
                    self.get_page("users", &[("customer", customer_id)], cursor)?;
                Ok(Page {
                    items: page.users.into_iter().map(SourceUser::from).collect(),
                    next: next_token(page.next_page_token),
                })
            },
        );
        let users = pages.exhaust()?;
        debug!(customer_id, count = users.len(), "listed directory users");
        Ok(users)
    }
}
