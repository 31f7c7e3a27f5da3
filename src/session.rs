use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::fmt::Display;
use std::path::Path;

use crate::client::Client;
use crate::endpoints;
use crate::error::Result;
use crate::util::parse_json;

/// An authenticated DSpace session.
///
/// Obtained from [`Client::login`] and released with [`Session::logout`]. All
/// operations that need the `rest-dspace-token` header live here; the write
/// methods on [`Client`] open a session around a single call of these.
///
/// Dropping a session without logging out leaves the token valid on the
/// server until it expires.
pub struct Session<'a> {
    client: &'a Client,
    token: String,
}

impl fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.client.base_url())
            .finish_non_exhaustive()
    }
}

impl<'a> Session<'a> {
    pub(crate) fn new(client: &'a Client, token: String) -> Self {
        Self { client, token }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn logout(self) {
        let client = self.client;
        client.logout(self);
    }

    /// Returns the server's status record for this token (authenticated flag,
    /// user email, API version).
    pub fn status(&self) -> Result<Value> {
        let endpoint = endpoints::status();
        let body = self.client.get(&endpoint, Some(&self.token), &[])?;
        parse_json(&endpoint, body)
    }

    pub fn create_community<T: Serialize + ?Sized>(&self, community: &T) -> Result<Value> {
        self.post_json(&endpoints::communities_create(), community)
    }

    pub fn create_community_collection<T: Serialize + ?Sized>(
        &self,
        community_id: impl Display,
        collection: &T,
    ) -> Result<Value> {
        self.post_json(&endpoints::community_collections(community_id), collection)
    }

    pub fn create_community_subcommunity<T: Serialize + ?Sized>(
        &self,
        community_id: impl Display,
        community: &T,
    ) -> Result<Value> {
        self.post_json(&endpoints::community_subcommunities(community_id), community)
    }

    pub fn update_community<T: Serialize + ?Sized>(
        &self,
        community_id: impl Display,
        community: &T,
    ) -> Result<String> {
        self.put(&endpoints::community(community_id), community)
    }

    pub fn delete_community(&self, community_id: impl Display) -> Result<String> {
        self.delete(&endpoints::community(community_id))
    }

    pub fn delete_community_collection(
        &self,
        community_id: impl Display,
        collection_id: impl Display,
    ) -> Result<String> {
        self.delete(&endpoints::community_collection(community_id, collection_id))
    }

    pub fn delete_community_subcommunity(
        &self,
        community_id: impl Display,
        subcommunity_id: impl Display,
    ) -> Result<String> {
        self.delete(&endpoints::community_subcommunity(
            community_id,
            subcommunity_id,
        ))
    }

    pub fn create_collection_item<T: Serialize + ?Sized>(
        &self,
        collection_id: impl Display,
        item: &T,
    ) -> Result<Value> {
        self.post_json(&endpoints::collection_items(collection_id), item)
    }

    pub fn update_collection<T: Serialize + ?Sized>(
        &self,
        collection_id: impl Display,
        collection: &T,
    ) -> Result<String> {
        self.put(&endpoints::collection(collection_id), collection)
    }

    pub fn delete_collection(&self, collection_id: impl Display) -> Result<String> {
        self.delete(&endpoints::collection(collection_id))
    }

    pub fn delete_collection_item(
        &self,
        collection_id: impl Display,
        item_id: impl Display,
    ) -> Result<String> {
        self.delete(&endpoints::collection_item(collection_id, item_id))
    }

    pub fn add_item_metadata<T: Serialize + ?Sized>(
        &self,
        item_id: impl Display,
        metadata: &T,
    ) -> Result<Value> {
        self.post_json(&endpoints::item_metadata(item_id), metadata)
    }

    pub fn add_item_bitstream(&self, item_id: impl Display, path: &Path) -> Result<Value> {
        let endpoint = endpoints::item_bitstreams(item_id);
        let body = self.client.post_data(&endpoint, Some(&self.token), path)?;
        parse_json(&endpoint, body)
    }

    pub fn update_item_metadata<T: Serialize + ?Sized>(
        &self,
        item_id: impl Display,
        metadata: &T,
    ) -> Result<String> {
        self.put(&endpoints::item_metadata(item_id), metadata)
    }

    pub fn delete_item(&self, item_id: impl Display) -> Result<String> {
        self.delete(&endpoints::item(item_id))
    }

    pub fn clear_item_metadata(&self, item_id: impl Display) -> Result<String> {
        self.delete(&endpoints::item_metadata(item_id))
    }

    pub fn delete_item_bitstream(
        &self,
        item_id: impl Display,
        bitstream_id: impl Display,
    ) -> Result<String> {
        self.delete(&endpoints::item_bitstream(item_id, bitstream_id))
    }

    pub fn resolve_handle(&self, handle: &str) -> Result<Value> {
        let endpoint = endpoints::handle(handle);
        let body = self
            .client
            .get(&endpoint, Some(&self.token), &[("expand", "bitstreams")])?;
        parse_json(&endpoint, body)
    }

    fn post_json<T: Serialize + ?Sized>(&self, endpoint: &str, body: &T) -> Result<Value> {
        let text = self.client.post_json(endpoint, Some(&self.token), body)?;
        parse_json(endpoint, text)
    }

    fn put<T: Serialize + ?Sized>(&self, endpoint: &str, body: &T) -> Result<String> {
        self.client.put(endpoint, Some(&self.token), body)
    }

    fn delete(&self, endpoint: &str) -> Result<String> {
        self.client.delete(endpoint, Some(&self.token))
    }
}
