use crate::error::{AppError, Result};
use crate::pipeline::event::PipelineEvent;
use super::Sink;
use mongodb::{Client, Collection, bson::{self, doc}};

/// MongoDB database sink
pub struct DatabaseSink {
    client: Client,
    database: String,
    collection: String,
    insert_only: bool,
}

impl DatabaseSink {
    pub async fn new(connection_string: &str, collection: &str, insert_only: bool) -> Result<Self> {
        let (base_url, database) = parse_mongo_url(connection_string)?;

        let client = Client::with_uri_str(&base_url)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to MongoDB: {}", e)))?;

        Ok(Self {
            client,
            database,
            collection: collection.to_string(),
            insert_only,
        })
    }

    fn get_collection(&self) -> Collection<bson::Document> {
        self.client
            .database(&self.database)
            .collection(&self.collection)
    }

    /// Convert the pruned fields to a bson::Document
    fn to_document(&self, event: &PipelineEvent) -> Result<bson::Document> {
        let mut document = bson::to_document(&event.fields)
            .map_err(|e| AppError::Processing(format!("Failed to convert event to BSON: {}", e)))?;

        document.insert("_id", &event.id);
        document.insert("_source", &event.source);

        Ok(document)
    }
}

/// Splits `mongodb://host:port/database?opts` into the connection URL and database name
fn parse_mongo_url(url: &str) -> Result<(String, String)> {
    let url_without_protocol = url.strip_prefix("mongodb://")
        .or_else(|| url.strip_prefix("mongodb+srv://"))
        .ok_or_else(|| AppError::Config(
            "Invalid MongoDB URL: must start with mongodb:// or mongodb+srv://".to_string()
        ))?;

    let missing_database = || AppError::Config(
        "MongoDB URL must include database name (format: mongodb://host:port/database)".to_string()
    );

    let slash_pos = url_without_protocol.find('/').ok_or_else(missing_database)?;
    let base = &url[..url.len() - url_without_protocol.len() + slash_pos];
    let path = &url_without_protocol[slash_pos + 1..];

    let database = path.split(['?', '/']).next().unwrap_or_default();
    if database.is_empty() {
        return Err(missing_database());
    }

    Ok((base.to_string(), database.to_string()))
}

#[async_trait::async_trait]
impl Sink for DatabaseSink {
    async fn write(&self, event: &PipelineEvent) -> Result<()> {
        let collection = self.get_collection();
        let document = self.to_document(event)?;

        if self.insert_only {
            collection
                .insert_one(document)
                .await
                .map_err(|e| AppError::Database(format!("Failed to insert into MongoDB: {}", e)))?;
        } else {
            collection
                .replace_one(doc! { "_id": &event.id }, document)
                .upsert(true)
                .await
                .map_err(|e| AppError::Database(format!("Failed to write to MongoDB: {}", e)))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mongo_url() {
        let (base, database) = parse_mongo_url("mongodb://localhost:27017/events?retryWrites=true").unwrap();
        assert_eq!(base, "mongodb://localhost:27017");
        assert_eq!(database, "events");
    }

    #[test]
    fn test_parse_mongo_url_requires_database() {
        assert!(parse_mongo_url("mongodb://localhost:27017").is_err());
        assert!(parse_mongo_url("mongodb://localhost:27017/").is_err());
        assert!(parse_mongo_url("postgres://localhost/events").is_err());
    }
}
