//! Target REST API client.

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use roster_core::paging::{Page, Pages};
use roster_core::{
    GroupId, Identity, MembershipPatch, NewGroup, Organization, OrganizationId, TargetAdapter,
    TargetError, TargetGroup,
};

/// Header carrying the session token on every request.
pub const SESSION_TOKEN_HEADER: &str = "Coder-Session-Token";

const USERS_PAGE_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
struct UsersPage {
    #[serde(default)]
    users: Vec<Identity>,
    #[serde(default)]
    count: usize,
}

/// Target adapter speaking the deployment's `/api/v2` REST API.
pub struct CoderClient {
    agent: ureq::Agent,
    base_url: String,
    session_token: SecretString,
}

impl CoderClient {
    pub fn new(base_url: impl Into<String>, session_token: SecretString) -> Self {
        Self::with_agent(base_url, session_token, roster_core::http::agent())
    }

    pub fn with_agent(
        base_url: impl Into<String>,
        session_token: SecretString,
        agent: ureq::Agent,
    ) -> Self {
        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        self.agent
            .request(method, &format!("{}/api/v2/{path}", self.base_url))
            .set(SESSION_TOKEN_HEADER, self.session_token.expose_secret())
    }

    fn get<R: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<R, TargetError> {
        let mut request = self.request("GET", path);
        for (key, value) in params {
            request = request.query(key, value);
        }
        decode(path, request.call())
    }

    fn send<R: DeserializeOwned, B: Serialize>(
        &self,
        method: &str,
        path: &str,
        body: &B,
    ) -> Result<R, TargetError> {
        decode(path, self.request(method, path).send_json(body))
    }
}

fn decode<R: DeserializeOwned>(
    path: &str,
    result: Result<ureq::Response, ureq::Error>,
) -> Result<R, TargetError> {
    result
        .map_err(ureq_error)?
        .into_json()
        .map_err(|e| TargetError::Decode(format!("{path}: {e}")))
}

fn ureq_error(err: ureq::Error) -> TargetError {
    match err {
        ureq::Error::Status(status, response) => TargetError::Http {
            status,
            message: response.into_string().unwrap_or_default(),
        },
        ureq::Error::Transport(transport) => TargetError::Transport(transport.to_string()),
    }
}

impl TargetAdapter for CoderClient {
    fn current_user(&self) -> Result<Identity, TargetError> {
        self.get("users/me", &[])
    }

    fn list_organizations(&self) -> Result<Vec<Organization>, TargetError> {
        self.get("organizations", &[])
    }

    fn list_groups(&self, org: OrganizationId) -> Result<Vec<TargetGroup>, TargetError> {
        let org = org.to_string();
        self.get("groups", &[("organization", org.as_str())])
    }

    fn list_users(&self) -> Result<Vec<Identity>, TargetError> {
        let limit = USERS_PAGE_LIMIT.to_string();
        let pages = Pages::new(|cursor: Option<&usize>| -> Result<Page<Identity, usize>, TargetError> {
            let offset = cursor.copied().unwrap_or(0);
            let offset_param = offset.to_string();
            let page: UsersPage = self.get(
                "users",
                &[("offset", offset_param.as_str()), ("limit", limit.as_str())],
            )?;
            let seen = offset + page.users.len();
            let next = (!page.users.is_empty() && seen < page.count).then_some(seen);
            Ok(Page { items: page.users, next })
        });
        let users = pages.exhaust()?;
        debug!(count = users.len(), "listed target users");
        Ok(users)
    }

    fn list_groups_for_user(
        &self,
        org: OrganizationId,
        username: &str,
    ) -> Result<Vec<TargetGroup>, TargetError> {
        let org = org.to_string();
        self.get(
            "groups",
            &[("organization", org.as_str()), ("has_member", username)],
        )
    }

    fn create_group(
        &self,
        org: OrganizationId,
        group: &NewGroup,
    ) -> Result<TargetGroup, TargetError> {
        self.send("POST", &format!("organizations/{org}/groups"), group)
    }

    fn patch_group_membership(
        &self,
        group: GroupId,
        patch: &MembershipPatch,
    ) -> Result<TargetGroup, TargetError> {
        self.send("PATCH", &format!("groups/{group}"), patch)
    }
}
