use std::time::Duration;

use bytes::Bytes;
use common::StoredObject;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::info;

use crate::{segments, BlobError};

pub const DEFAULT_API_URL: &str = "https://blob.vercel-storage.com";
const API_VERSION: &str = "7";
const PAGE_LIMIT: &str = "1000";

/// Hosted blob API reached with a read/write bearer token.
#[derive(Clone)]
pub struct RemoteBlobStore {
    client: Client,
    api_url: Url,
    token: String,
    timeout: Duration,
}

impl std::fmt::Debug for RemoteBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteBlobStore")
            .field("api_url", &self.api_url.as_str())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListPage {
    #[serde(default)]
    blobs: Vec<RemoteBlob>,
    #[serde(default)]
    cursor: Option<String>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Deserialize)]
struct RemoteBlob {
    url: String,
    pathname: String,
}

#[derive(Deserialize)]
struct PutResult {
    url: String,
}

impl RemoteBlobStore {
    pub fn new(
        client: Client,
        api_url: &str,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, BlobError> {
        let api_url = Url::parse(api_url.trim())
            .map_err(|err| BlobError::Url(format!("{}: {}", api_url, err)))?;
        if api_url.cannot_be_a_base() {
            return Err(BlobError::Url(format!("cannot be a base: {}", api_url)));
        }
        Ok(Self {
            client,
            api_url,
            token: token.into(),
            timeout,
        })
    }

    pub async fn list(&self) -> Result<Vec<StoredObject>, BlobError> {
        let mut objects = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let response = self
                .client
                .get(self.list_url(cursor.as_deref()))
                .bearer_auth(&self.token)
                .header("x-api-version", API_VERSION)
                .timeout(self.timeout)
                .send()
                .await?;
            if !response.status().is_success() {
                return Err(BlobError::Status(response.status().as_u16()));
            }
            let page: ListPage = response.json().await?;
            objects.extend(
                page.blobs
                    .into_iter()
                    .map(|blob| StoredObject::new(blob.pathname, blob.url)),
            );
            match page.cursor {
                Some(next) if page.has_more => cursor = Some(next),
                _ => break,
            }
        }
        Ok(objects)
    }

    pub async fn put(&self, name: &str, data: Bytes) -> Result<String, BlobError> {
        let content_type = mime_guess::from_path(name)
            .first_or_octet_stream()
            .to_string();
        let size = data.len();
        let response = self
            .client
            .put(self.put_url(name)?)
            .bearer_auth(&self.token)
            .header("x-api-version", API_VERSION)
            .header("x-add-random-suffix", "0")
            .header("x-content-type", content_type)
            .timeout(self.timeout)
            .body(data)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(BlobError::Status(response.status().as_u16()));
        }
        let result: PutResult = response.json().await?;
        info!("Uploaded {} ({} bytes)", name, size);
        Ok(result.url)
    }

    fn list_url(&self, cursor: Option<&str>) -> Url {
        let mut url = self.api_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("limit", PAGE_LIMIT);
            if let Some(cursor) = cursor {
                query.append_pair("cursor", cursor);
            }
        }
        url
    }

    fn put_url(&self, name: &str) -> Result<Url, BlobError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| BlobError::Url(format!("cannot be a base: {}", self.api_url)))?
            .pop_if_empty()
            .extend(segments(name));
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reqwest::Client;

    use super::{ListPage, RemoteBlobStore, DEFAULT_API_URL};

    fn store() -> RemoteBlobStore {
        RemoteBlobStore::new(Client::new(), DEFAULT_API_URL, "token", Duration::from_secs(5))
            .unwrap()
    }

    #[test]
    fn list_url_carries_cursor() {
        let store = store();
        assert_eq!(
            store.list_url(None).as_str(),
            "https://blob.vercel-storage.com/?limit=1000"
        );
        assert_eq!(
            store.list_url(Some("abc")).as_str(),
            "https://blob.vercel-storage.com/?limit=1000&cursor=abc"
        );
    }

    #[test]
    fn put_url_encodes_name() {
        let url = store().put_url("music/A-B-1999-My Song.mp3").unwrap();
        assert_eq!(
            url.as_str(),
            "https://blob.vercel-storage.com/music/A-B-1999-My%20Song.mp3"
        );
    }

    #[test]
    fn decodes_list_page() {
        let page: ListPage = serde_json::from_str(
            r#"{"blobs":[{"url":"https://x/A-B-1999-S.mp3","pathname":"A-B-1999-S.mp3","size":3}],"cursor":"next","hasMore":true}"#,
        )
        .unwrap();
        assert_eq!(page.blobs.len(), 1);
        assert_eq!(page.blobs[0].pathname, "A-B-1999-S.mp3");
        assert_eq!(page.cursor.as_deref(), Some("next"));
        assert!(page.has_more);

        let last: ListPage = serde_json::from_str(r#"{"blobs":[]}"#).unwrap();
        assert!(!last.has_more);
    }

    #[test]
    fn debug_hides_token() {
        let text = format!("{:?}", store());
        assert!(!text.contains("token"));
        assert!(text.contains("blob.vercel-storage.com"));
    }
}
