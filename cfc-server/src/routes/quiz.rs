//! /api/data/quiz

use cfc_store::Document;

use super::crud::{field_filter, Kind, ListParams};
use crate::models::Question;

impl Kind for Question {
    const COLLECTION: &'static str = "quiz";
    const PATH: &'static str = "/api/data/quiz";
    const ITEM_PATH: &'static str = "/api/data/quiz/{id}";
    const LABEL: &'static str = "Question";

    fn filter(params: &ListParams) -> Option<Document> {
        field_filter("category", params.category.as_ref())
    }
}
