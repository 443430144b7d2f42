//! Jellyfin client adapter.
//!
//! REST calls go through `reqwest`; server events come from the
//! [`JellyfinSocket`](crate::websocket::JellyfinSocket).

use std::sync::{Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::{ClientIdentity, USER_AGENT};
use crate::error::{classify_reqwest_error, ClientError};
use crate::models::{
    Capabilities, ConnectionState, Item, ItemQuery, ServerCredentials, ServerRecord,
};
use crate::traits::{EventReceiver, MediaClient};
use crate::websocket::{JellyfinSocket, SocketConfig};

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// TCP connect timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
struct AuthState {
    address: String,
    user_id: String,
    access_token: String,
}

#[derive(Debug, Serialize)]
struct AuthenticateByName<'a> {
    #[serde(rename = "Username")]
    username: &'a str,
    #[serde(rename = "Pw")]
    password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    access_token: Option<String>,
    server_id: Option<String>,
    user: Option<UserDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct UserDto {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PublicSystemInfo {
    id: Option<String>,
    server_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ItemsResult {
    #[serde(default)]
    items: Vec<Item>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct CreatePlaylist<'a> {
    name: &'a str,
    ids: &'a [String],
    user_id: &'a str,
    media_type: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PlaylistCreated {
    id: Option<String>,
}

/// Client for one Jellyfin server.
///
/// # Example
///
/// ```ignore
/// use themefinder::adapters::JellyfinClient;
/// use themefinder::auth::ClientIdentity;
/// use themefinder::traits::MediaClient;
///
/// let client = JellyfinClient::new(ClientIdentity::generate(), false)?;
/// let creds = client.login("http://media.local:8096", "alice", "secret").await?;
/// ```
pub struct JellyfinClient {
    http: reqwest::Client,
    identity: ClientIdentity,
    ignore_ssl_cert: bool,
    auth: RwLock<Option<AuthState>>,
    socket: Mutex<Option<JellyfinSocket>>,
}

impl JellyfinClient {
    pub fn new(identity: ClientIdentity, ignore_ssl_cert: bool) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .danger_accept_invalid_certs(ignore_ssl_cert)
            .build()
            .map_err(|e| ClientError::Other(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            identity,
            ignore_ssl_cert,
            auth: RwLock::new(None),
            socket: Mutex::new(None),
        })
    }

    pub fn identity(&self) -> &ClientIdentity {
        &self.identity
    }

    fn auth_state(&self) -> Result<AuthState, ClientError> {
        self.auth
            .read()
            .map_err(|_| ClientError::Other("auth state poisoned".to_string()))?
            .clone()
            .ok_or(ClientError::NotAuthenticated)
    }

    fn set_auth_state(&self, state: AuthState) {
        if let Ok(mut auth) = self.auth.write() {
            *auth = Some(state);
        }
    }

    fn request(
        &self,
        method: reqwest::Method,
        url: &str,
        token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let header = self.identity.authorization_header(token);
        self.http
            .request(method, url)
            .header(reqwest::header::AUTHORIZATION, header.clone())
            .header("X-Emby-Authorization", header)
    }

    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<reqwest::Response, ClientError> {
        let response = builder
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e, url))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(ClientError::HttpStatus {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        token: Option<&str>,
        params: &[(&'static str, String)],
    ) -> Result<T, ClientError> {
        let builder = self.request(reqwest::Method::GET, url, token).query(params);
        let response = self.send(builder, url).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| classify_reqwest_error(&e, url))
    }

    /// Best-effort lookup of the server's display name.
    async fn server_name(&self, address: &str) -> Option<String> {
        let url = format!("{}/System/Info/Public", address);
        match self.get_json::<PublicSystemInfo>(&url, None, &[]).await {
            Ok(info) => info.server_name,
            Err(e) => {
                debug!("Could not read public info of {}: {}", address, e);
                None
            }
        }
    }
}

#[async_trait]
impl MediaClient for JellyfinClient {
    async fn login(
        &self,
        address: &str,
        username: &str,
        password: &str,
    ) -> Result<ServerCredentials, ClientError> {
        let url = format!("{}/Users/AuthenticateByName", address);
        let builder = self
            .request(reqwest::Method::POST, &url, None)
            .json(&AuthenticateByName { username, password });

        let result = match self.send(builder, &url).await {
            Ok(response) => response
                .json::<AuthenticationResult>()
                .await
                .map_err(|e| classify_reqwest_error(&e, &url))?,
            Err(ClientError::HttpStatus { status, .. })
                if status == StatusCode::UNAUTHORIZED.as_u16()
                    || status == StatusCode::FORBIDDEN.as_u16() =>
            {
                return Err(ClientError::AuthRejected {
                    username: username.to_string(),
                });
            }
            Err(e) => return Err(e),
        };

        let (Some(access_token), Some(user)) = (result.access_token, result.user) else {
            return Err(ClientError::AuthRejected {
                username: username.to_string(),
            });
        };

        let server_name = self.server_name(address).await;
        let server_id = match result.server_id {
            Some(id) => id,
            None => {
                let info_url = format!("{}/System/Info/Public", address);
                self.get_json::<PublicSystemInfo>(&info_url, None, &[])
                    .await?
                    .id
                    .ok_or_else(|| ClientError::InvalidResponse {
                        message: "server did not report its id".to_string(),
                    })?
            }
        };

        self.set_auth_state(AuthState {
            address: address.to_string(),
            user_id: user.id.clone(),
            access_token: access_token.clone(),
        });

        Ok(ServerCredentials {
            server_id,
            server_name,
            address: address.to_string(),
            user_id: user.id,
            access_token,
        })
    }

    async fn authenticate(&self, record: &ServerRecord) -> Result<ConnectionState, ClientError> {
        let (Some(token), Some(user_id)) = (&record.access_token, &record.user_id) else {
            return Ok(ConnectionState::ServerSignIn);
        };

        let url = format!("{}/System/Info", record.address);
        let builder = self.request(reqwest::Method::GET, &url, Some(token));
        match self.send(builder, &url).await {
            Ok(_) => {
                self.set_auth_state(AuthState {
                    address: record.address.clone(),
                    user_id: user_id.clone(),
                    access_token: token.clone(),
                });
                Ok(ConnectionState::SignedIn)
            }
            Err(ClientError::HttpStatus { status: 401, .. })
            | Err(ClientError::HttpStatus { status: 403, .. }) => {
                Ok(ConnectionState::ServerSignIn)
            }
            Err(e) if e.category().is_retryable() => {
                debug!("{} is unavailable: {}", record.address, e);
                Ok(ConnectionState::Unavailable)
            }
            Err(e) => Err(e),
        }
    }

    async fn start(&self) -> Result<EventReceiver, ClientError> {
        let auth = self.auth_state()?;
        let config = SocketConfig {
            address: auth.address,
            access_token: auth.access_token,
            device_id: self.identity.device_id.clone(),
            ignore_ssl_cert: self.ignore_ssl_cert,
        };
        let (socket, events) = JellyfinSocket::connect(config).await?;
        if let Ok(mut slot) = self.socket.lock() {
            if let Some(previous) = slot.replace(socket) {
                previous.shutdown();
            }
        }
        Ok(events)
    }

    async fn post_capabilities(&self, capabilities: &Capabilities) -> Result<(), ClientError> {
        let auth = self.auth_state()?;
        let url = format!("{}/Sessions/Capabilities/Full", auth.address);
        let builder = self
            .request(reqwest::Method::POST, &url, Some(&auth.access_token))
            .json(capabilities);
        self.send(builder, &url).await?;
        Ok(())
    }

    fn stop(&self) {
        match self.socket.lock() {
            Ok(mut slot) => {
                if let Some(socket) = slot.take() {
                    socket.shutdown();
                }
            }
            Err(_) => warn!("Socket slot poisoned, cannot stop"),
        }
    }

    async fn search_items(&self, query: &ItemQuery) -> Result<Vec<Item>, ClientError> {
        let auth = self.auth_state()?;
        let url = format!("{}/Users/{}/Items", auth.address, auth.user_id);
        let result: ItemsResult = self
            .get_json(&url, Some(&auth.access_token), &query.to_params())
            .await?;
        Ok(result.items)
    }

    async fn get_item(&self, id: &str) -> Result<Item, ClientError> {
        let auth = self.auth_state()?;
        let url = format!("{}/Users/{}/Items/{}", auth.address, auth.user_id, id);
        self.get_json(&url, Some(&auth.access_token), &[]).await
    }

    async fn create_playlist(
        &self,
        name: &str,
        item_ids: &[String],
    ) -> Result<Option<String>, ClientError> {
        let auth = self.auth_state()?;
        let url = format!("{}/Playlists", auth.address);
        let body = CreatePlaylist {
            name,
            ids: item_ids,
            user_id: &auth.user_id,
            media_type: None,
        };
        let builder = self
            .request(reqwest::Method::POST, &url, Some(&auth.access_token))
            .json(&body);
        let response = self.send(builder, &url).await?;
        let created = response
            .json::<PlaylistCreated>()
            .await
            .map_err(|e| classify_reqwest_error(&e, &url))?;
        Ok(created.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> JellyfinClient {
        JellyfinClient::new(ClientIdentity::generate(), false).unwrap()
    }

    async fn mount_login(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/Users/AuthenticateByName"))
            .and(body_json(serde_json::json!({"Username": "alice", "Pw": "secret"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "AccessToken": "tok-1",
                "ServerId": "srv-1",
                "User": {"Id": "user-1", "Name": "alice"}
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/System/Info/Public"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Id": "srv-1",
                "ServerName": "Living room"
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_login_success() {
        let server = MockServer::start().await;
        mount_login(&server).await;

        let client = client();
        let creds = client.login(&server.uri(), "alice", "secret").await.unwrap();
        assert_eq!(creds.server_id, "srv-1");
        assert_eq!(creds.server_name.as_deref(), Some("Living room"));
        assert_eq!(creds.user_id, "user-1");
        assert_eq!(creds.access_token, "tok-1");
        assert_eq!(creds.address, server.uri());
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/Users/AuthenticateByName"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client()
            .login(&server.uri(), "alice", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::AuthRejected { .. }));
    }

    #[tokio::test]
    async fn test_login_without_token_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/Users/AuthenticateByName"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let err = client()
            .login(&server.uri(), "alice", "secret")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::AuthRejected { .. }));
    }

    fn record(address: &str) -> ServerRecord {
        ServerRecord {
            uuid: "u1".to_string(),
            address: address.to_string(),
            access_token: Some("tok-1".to_string()),
            user_id: Some("user-1".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_authenticate_states() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/System/Info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"Id": "srv-1"})))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/System/Info"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client();
        let rec = record(&server.uri());
        assert_eq!(client.authenticate(&rec).await.unwrap(), ConnectionState::SignedIn);
        assert_eq!(
            client.authenticate(&rec).await.unwrap(),
            ConnectionState::ServerSignIn
        );

        let mut no_token = rec.clone();
        no_token.access_token = None;
        assert_eq!(
            client.authenticate(&no_token).await.unwrap(),
            ConnectionState::ServerSignIn
        );
    }

    #[tokio::test]
    async fn test_authenticate_unreachable() {
        let rec = record("http://127.0.0.1:1");
        assert_eq!(
            client().authenticate(&rec).await.unwrap(),
            ConnectionState::Unavailable
        );
    }

    #[tokio::test]
    async fn test_calls_require_authentication() {
        let client = client();
        assert!(matches!(
            client.get_item("x").await,
            Err(ClientError::NotAuthenticated)
        ));
        assert!(matches!(client.start().await, Err(ClientError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_search_items_and_playlist() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        Mock::given(method("GET"))
            .and(path("/Users/user-1/Items"))
            .and(query_param("HasThemeSong", "false"))
            .and(query_param("IncludeItemTypes", "Movie"))
            .and(header_exists("Authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Items": [{"Id": "m1", "Name": "Alien", "Type": "Movie"}],
                "TotalRecordCount": 1
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/Playlists"))
            .and(body_json(serde_json::json!({
                "Name": "Favourites",
                "Ids": ["m1"],
                "UserId": "user-1",
                "MediaType": null
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"Id": "pl-1"})))
            .mount(&server)
            .await;

        let client = client();
        client.login(&server.uri(), "alice", "secret").await.unwrap();

        let query = ItemQuery::new()
            .recursive()
            .with_has_theme_song(false)
            .with_include_types(&["Movie"]);
        let items = client.search_items(&query).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Alien");

        let id = client
            .create_playlist("Favourites", &["m1".to_string()])
            .await
            .unwrap();
        assert_eq!(id.as_deref(), Some("pl-1"));
    }

    #[tokio::test]
    async fn test_get_item_not_found() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        Mock::given(method("GET"))
            .and(path("/Users/user-1/Items/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let client = client();
        client.login(&server.uri(), "alice", "secret").await.unwrap();
        match client.get_item("missing").await {
            Err(ClientError::HttpStatus { status, .. }) => assert_eq!(status, 404),
            other => panic!("expected 404, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_post_capabilities() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        Mock::given(method("POST"))
            .and(path("/Sessions/Capabilities/Full"))
            .and(body_json(serde_json::json!({
                "PlayableMediaTypes": [],
                "SupportsMediaControl": false,
                "SupportedCommands": []
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client();
        client.login(&server.uri(), "alice", "secret").await.unwrap();
        client
            .post_capabilities(&Capabilities::announcement())
            .await
            .unwrap();
    }
}
