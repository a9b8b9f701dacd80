//! /api/data/resources

use cfc_store::Document;

use super::crud::{field_filter, Kind, ListParams};
use crate::models::Resource;

impl Kind for Resource {
    const COLLECTION: &'static str = "resources";
    const PATH: &'static str = "/api/data/resources";
    const ITEM_PATH: &'static str = "/api/data/resources/{id}";
    const LABEL: &'static str = "Resource";

    fn filter(params: &ListParams) -> Option<Document> {
        field_filter("type", params.kind.as_ref())
    }
}
