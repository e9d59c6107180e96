//! Document commands.

use super::{emit, open_store, CommandResult};
use crate::OutputFormat;
use graphdoc_core::QueryOptions;
use serde_json::Value;
use std::path::Path;

/// Arguments of the find command.
#[derive(Debug, Default)]
pub struct FindArgs<'a> {
    /// Filter expression as JSON text.
    pub filter: Option<&'a str>,
    /// Sort token.
    pub sort: Option<String>,
    /// Result limit.
    pub limit: Option<u64>,
    /// Result offset.
    pub offset: Option<u64>,
}

impl FindArgs<'_> {
    fn filter(&self) -> CommandResult<Value> {
        match self.filter {
            Some(text) => serde_json::from_str(text)
                .map_err(|e| format!("Invalid --filter JSON: {e}").into()),
            None => Ok(Value::Null),
        }
    }

    fn options(&self) -> QueryOptions {
        QueryOptions {
            sort: self.sort.clone(),
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// Runs the keys command.
pub fn keys(path: &Path, collection: &str, format: OutputFormat) -> CommandResult {
    let keys = open_store(path)?.collection(collection).keys()?;
    emit(format, &keys, |keys| {
        for key in keys {
            println!("{key}");
        }
    })
}

/// Runs the get command.
pub fn get(path: &Path, collection: &str, id: &str, format: OutputFormat) -> CommandResult {
    let doc = open_store(path)?
        .collection(collection)
        .get(id)?
        .ok_or_else(|| format!("No document {id:?} in {collection:?}"))?;
    emit(format, &doc, |doc| println!("{doc}"))
}

/// Runs the put command.
pub fn put(path: &Path, collection: &str, id: &str, json: &str) -> CommandResult {
    let doc: Value =
        serde_json::from_str(json).map_err(|e| format!("Invalid document JSON: {e}"))?;
    open_store(path)?.collection(collection).put(id, &doc)?;
    tracing::info!(collection, id, "document written");
    Ok(())
}

/// Runs the delete command.
pub fn delete(path: &Path, collection: &str, id: &str) -> CommandResult {
    if open_store(path)?.collection(collection).delete(id)? {
        tracing::info!(collection, id, "document deleted");
        Ok(())
    } else {
        Err(format!("No document {id:?} in {collection:?}").into())
    }
}

/// Runs the find command.
pub fn find(
    path: &Path,
    collection: &str,
    args: FindArgs<'_>,
    format: OutputFormat,
) -> CommandResult {
    let docs = open_store(path)?
        .collection(collection)
        .find(&args.filter()?, &args.options())?;
    emit(format, &docs, |docs| {
        for doc in docs {
            println!("{doc}");
        }
        println!("({} documents)", docs.len());
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn put_then_find_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("unit.db");
        graphdoc_core::Store::open_path(&path).unwrap();

        put(&path, "products", "a", r#"{"price": 999}"#).unwrap();
        put(&path, "products", "b", r#"{"price": 149}"#).unwrap();

        let args = FindArgs {
            filter: Some(r#"{"price": {"$gt": 500}}"#),
            ..FindArgs::default()
        };
        let store = open_store(&path).unwrap();
        let docs = store
            .collection("products")
            .find(&args.filter().unwrap(), &args.options())
            .unwrap();
        assert_eq!(docs, vec![json!({"price": 999})]);

        delete(&path, "products", "a").unwrap();
        assert!(delete(&path, "products", "a").is_err());
    }

    #[test]
    fn bad_json_is_rejected() {
        let args = FindArgs {
            filter: Some("{not json"),
            ..FindArgs::default()
        };
        assert!(args.filter().is_err());

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("unit.db");
        graphdoc_core::Store::open_path(&path).unwrap();
        assert!(put(&path, "c", "id", "[1, 2]").is_err());
        assert!(put(&path, "c", "id", "nope").is_err());
    }
}
