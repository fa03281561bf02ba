//! Durable event stream backed by Redis streams.
//!
//! The queue engine appends JSON-encoded events under the `data` field
//! and reads them back through a consumer group, giving at-least-once
//! semantics across parallel workers.

use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use redis::streams::{StreamReadOptions, StreamReadReply};
use tracing::debug;

use beacon_core::error::{AppError, ErrorKind};
use beacon_core::result::AppResult;

use crate::keys::{CONSUMER_GROUP, QUEUE_STREAM, STREAM_DATA_FIELD};

use super::client::RedisClient;

/// How long a group read blocks waiting for messages, in milliseconds.
/// Bounds worker shutdown latency.
const READ_BLOCK_MS: usize = 5_000;

/// One raw entry read from the stream.
#[derive(Debug, Clone)]
pub struct StreamEntry {
    /// Stream-assigned entry id, used for acking.
    pub id: String,
    /// JSON payload from the `data` field.
    pub data: String,
}

/// Producer/ack side of the durable notification stream.
#[derive(Debug, Clone)]
pub struct EventStream {
    client: RedisClient,
}

impl EventStream {
    /// Create a new stream handle.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Create the consumer group, ignoring "already exists".
    pub async fn ensure_group(&self) -> AppResult<()> {
        let mut conn = self.client.conn_mut();
        let result: Result<String, redis::RedisError> = conn
            .xgroup_create_mkstream(QUEUE_STREAM, CONSUMER_GROUP, "0")
            .await;

        match result {
            Ok(_) => {
                debug!(stream = QUEUE_STREAM, group = CONSUMER_GROUP, "Consumer group created");
                Ok(())
            }
            Err(e) if e.code() == Some("BUSYGROUP") => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Cache,
                "Failed to create consumer group",
                e,
            )),
        }
    }

    /// Append an event payload; returns the stream entry id.
    pub async fn append(&self, payload: &str) -> AppResult<String> {
        let mut conn = self.client.conn_mut();
        let id: String = conn
            .xadd(QUEUE_STREAM, "*", &[(STREAM_DATA_FIELD, payload)])
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Cache, "Failed to append to stream", e)
            })?;
        Ok(id)
    }

    /// Acknowledge a processed entry.
    pub async fn ack(&self, entry_id: &str) -> AppResult<()> {
        let mut conn = self.client.conn_mut();
        let _: i64 = conn
            .xack(QUEUE_STREAM, CONSUMER_GROUP, &[entry_id])
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Cache, "Failed to ack stream entry", e)
            })?;
        Ok(())
    }

    /// Open a named consumer with its own blocking connection.
    pub async fn consumer(&self, name: &str) -> AppResult<StreamConsumer> {
        let conn = self.client.dedicated_connection().await?;
        Ok(StreamConsumer {
            name: name.to_string(),
            conn,
        })
    }
}

/// One worker's view of the consumer group.
///
/// Holds a dedicated connection because group reads block up to
/// [`READ_BLOCK_MS`] and must not stall the shared pipeline.
pub struct StreamConsumer {
    name: String,
    conn: MultiplexedConnection,
}

impl std::fmt::Debug for StreamConsumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamConsumer")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl StreamConsumer {
    /// The consumer name within the group.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read the next batch of undelivered entries, blocking up to 5 s.
    ///
    /// An empty vec means the block timed out with nothing to do.
    pub async fn read(&mut self) -> AppResult<Vec<StreamEntry>> {
        let options = StreamReadOptions::default()
            .group(CONSUMER_GROUP, &self.name)
            .count(1)
            .block(READ_BLOCK_MS);

        let reply: StreamReadReply = self
            .conn
            .xread_options(&[QUEUE_STREAM], &[">"], &options)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Cache, "Failed to read from stream", e)
            })?;

        let mut entries = Vec::new();
        for key in reply.keys {
            for id in key.ids {
                // A missing data field yields an empty payload; the worker
                // treats it as malformed and acks it away.
                let data = id.get::<String>(STREAM_DATA_FIELD).unwrap_or_default();
                entries.push(StreamEntry { id: id.id, data });
            }
        }
        Ok(entries)
    }
}
