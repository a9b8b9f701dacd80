//! Seed command: replace a collection's contents from a JSON array file

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use cfc_store::{ConnectionRegistry, Document, RecordStore, ID_FIELD};
use clap::Parser;
use serde_json::Value;

/// Arguments for the seed command
#[derive(Parser, Debug)]
pub struct SeedArgs {
    /// JSON file holding an array of documents
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Collection to replace
    #[arg(long, default_value = "resources")]
    pub collection: String,

    /// Logical database holding the collection
    #[arg(long, default_value = "cfc_db")]
    pub database: String,
}

/// Counts reported after seeding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub deleted: usize,
    pub created: usize,
}

/// Parse a seed file: a JSON array whose every element is an object
pub fn parse_documents(contents: &str) -> Result<Vec<Document>> {
    let value: Value = serde_json::from_str(contents).context("Seed file is not valid JSON")?;

    let Value::Array(items) = value else {
        return Err(anyhow!("Seed file must contain a JSON array of documents"));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(doc) => Ok(doc),
            other => Err(anyhow!(
                "Seed entry {} is not an object: {}",
                index,
                other
            )),
        })
        .collect()
}

/// Delete every document in `collection`, then create each of `docs`
pub async fn seed_collection(
    store: &RecordStore,
    collection: &str,
    docs: Vec<Document>,
) -> Result<SeedReport> {
    let existing = store
        .list(collection, None)
        .await
        .with_context(|| format!("Failed to list {}", collection))?;

    let mut deleted = 0;
    for doc in existing {
        if let Some(Value::String(id)) = doc.get(ID_FIELD) {
            store
                .delete(collection, id)
                .await
                .with_context(|| format!("Failed to delete {} from {}", id, collection))?;
            deleted += 1;
        }
    }

    let mut created = 0;
    for doc in docs {
        store
            .create(collection, doc)
            .await
            .with_context(|| format!("Failed to create document {} in {}", created, collection))?;
        created += 1;
    }

    Ok(SeedReport { deleted, created })
}

pub async fn run_seed(args: SeedArgs) -> Result<()> {
    let contents = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let docs = parse_documents(&contents)?;

    let registry = Arc::new(
        ConnectionRegistry::mongo_from_env()
            .context("MONGODB not set. Set it in the environment or .env")?,
    );
    let store = RecordStore::new(registry.clone(), args.database.clone());

    tracing::info!(
        file = %args.file.display(),
        database = %args.database,
        collection = %args.collection,
        documents = docs.len(),
        "Seeding collection"
    );

    let result = seed_collection(&store, &args.collection, docs).await;
    registry.shutdown_all().await;
    let report = result?;

    println!(
        "Seeded {}.{}: removed {}, created {}",
        args.database, args.collection, report.deleted, report.created
    );
    Ok(())
}
