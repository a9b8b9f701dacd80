//! /api/data/posts

use chrono::{DateTime, Utc};
use cfc_store::Document;

use super::crud::{field_filter, Kind, ListParams};
use crate::models::Post;

impl Kind for Post {
    const COLLECTION: &'static str = "posts";
    const PATH: &'static str = "/api/data/posts";
    const ITEM_PATH: &'static str = "/api/data/posts/{id}";
    const LABEL: &'static str = "Post";

    /// `?type=` matches the post's category in its metadata
    fn filter(params: &ListParams) -> Option<Document> {
        field_filter("metadata.type", params.kind.as_ref())
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.metadata.updated_at = Some(now);
    }
}
