//! Paths of the DSpace REST endpoints, relative to the configured base URL.

use std::fmt::Display;

pub(crate) const PREFIX: &str = "/RESTapi";

pub(crate) fn login() -> String {
    format!("{PREFIX}/login")
}

pub(crate) fn logout() -> String {
    format!("{PREFIX}/logout")
}

pub(crate) fn status() -> String {
    format!("{PREFIX}/status")
}

pub(crate) fn communities() -> String {
    format!("{PREFIX}/communities")
}

// The service only accepts top-level community creation with the trailing slash.
pub(crate) fn communities_create() -> String {
    format!("{PREFIX}/communities/")
}

pub(crate) fn top_communities() -> String {
    format!("{PREFIX}/communities/top-communities")
}

pub(crate) fn community(id: impl Display) -> String {
    format!("{PREFIX}/communities/{}", segment(id))
}

pub(crate) fn community_collections(id: impl Display) -> String {
    format!("{PREFIX}/communities/{}/collections", segment(id))
}

pub(crate) fn community_collection(id: impl Display, collection_id: impl Display) -> String {
    format!("{PREFIX}/communities/{}/collections/{}", segment(id), segment(collection_id))
}

pub(crate) fn community_subcommunities(id: impl Display) -> String {
    format!("{PREFIX}/communities/{}/communities", segment(id))
}

pub(crate) fn community_subcommunity(id: impl Display, subcommunity_id: impl Display) -> String {
    format!("{PREFIX}/communities/{}/communities/{}", segment(id), segment(subcommunity_id))
}

pub(crate) fn collections() -> String {
    format!("{PREFIX}/collections")
}

pub(crate) fn find_collection() -> String {
    format!("{PREFIX}/collections/find-collection")
}

pub(crate) fn collection(id: impl Display) -> String {
    format!("{PREFIX}/collections/{}", segment(id))
}

pub(crate) fn collection_items(id: impl Display) -> String {
    format!("{PREFIX}/collections/{}/items", segment(id))
}

pub(crate) fn collection_item(id: impl Display, item_id: impl Display) -> String {
    format!("{PREFIX}/collections/{}/items/{}", segment(id), segment(item_id))
}

pub(crate) fn items() -> String {
    format!("{PREFIX}/items")
}

pub(crate) fn find_items_by_metadata() -> String {
    format!("{PREFIX}/items/find-by-metadata-field")
}

pub(crate) fn item(id: impl Display) -> String {
    format!("{PREFIX}/items/{}", segment(id))
}

pub(crate) fn item_metadata(id: impl Display) -> String {
    format!("{PREFIX}/items/{}/metadata", segment(id))
}

pub(crate) fn item_bitstreams(id: impl Display) -> String {
    format!("{PREFIX}/items/{}/bitstreams", segment(id))
}

pub(crate) fn item_bitstream(id: impl Display, bitstream_id: impl Display) -> String {
    format!("{PREFIX}/items/{}/bitstreams/{}", segment(id), segment(bitstream_id))
}

/// Handles contain a slash (`123456789/42`) which is kept as a path separator.
pub(crate) fn handle(handle: &str) -> String {
    let path = handle
        .trim_matches('/')
        .split('/')
        .map(segment)
        .collect::<Vec<_>>()
        .join("/");
    format!("{PREFIX}/handle/{path}")
}

/// Percent-encodes everything outside the RFC 3986 unreserved set, so an id
/// can never add path segments, a query or a fragment.
fn segment(value: impl Display) -> String {
    let raw = value.to_string();
    let mut out = String::with_capacity(raw.len());
    for b in raw.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn community_paths() {
        assert_eq!(communities(), "/RESTapi/communities");
        assert_eq!(communities_create(), "/RESTapi/communities/");
        assert_eq!(top_communities(), "/RESTapi/communities/top-communities");
        assert_eq!(community(7), "/RESTapi/communities/7");
        assert_eq!(
            community_collection("a1b2", 3),
            "/RESTapi/communities/a1b2/collections/3"
        );
        assert_eq!(
            community_subcommunity(7, 8),
            "/RESTapi/communities/7/communities/8"
        );
    }

    #[test]
    fn item_paths() {
        assert_eq!(item_bitstreams(42), "/RESTapi/items/42/bitstreams");
        assert_eq!(item_bitstream(42, 9), "/RESTapi/items/42/bitstreams/9");
        assert_eq!(item_metadata(42), "/RESTapi/items/42/metadata");
        assert_eq!(
            find_items_by_metadata(),
            "/RESTapi/items/find-by-metadata-field"
        );
    }

    #[test]
    fn handle_keeps_inner_slash() {
        assert_eq!(handle("123456789/42"), "/RESTapi/handle/123456789/42");
        assert_eq!(handle("/123456789/42"), "/RESTapi/handle/123456789/42");
    }

    #[test]
    fn ids_and_handles_are_percent_encoded() {
        assert_eq!(
            handle("123456789/4?x#y"),
            "/RESTapi/handle/123456789/4%3Fx%23y"
        );
        assert_eq!(item("a b/c"), "/RESTapi/items/a%20b%2Fc");
        assert_eq!(
            community("5c2c1d5e-0b0a-4c43-9f0b-1e0e6b0c2a11"),
            "/RESTapi/communities/5c2c1d5e-0b0a-4c43-9f0b-1e0e6b0c2a11"
        );
        assert_eq!(item_bitstream("é", 1), "/RESTapi/items/%C3%A9/bitstreams/1");
    }
}
