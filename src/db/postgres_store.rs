// PostgreSQL document store
// Every collection lives in the `documents` table as jsonb rows

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Jsonb, Text};
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde_json::Value;
use tracing::debug;

use super::diesel_pool::DieselPool;
use super::document_store::{Document, DocumentStore, Fields, StoreError, DOCUMENT_ID_LENGTH};
use crate::schema::documents;
use crate::utils::ids::generate_id;

/// Row of the `documents` table
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DocumentRow {
    pub collection: String,
    pub id: String,
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = documents)]
struct NewDocumentRow<'a> {
    collection: &'a str,
    id: &'a str,
    data: &'a Value,
}

impl TryFrom<DocumentRow> for Document {
    type Error = StoreError;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        match row.data {
            Value::Object(fields) => Ok(Document::new(row.id, fields)),
            _ => Err(StoreError::Corrupted),
        }
    }
}

fn into_documents(rows: Vec<DocumentRow>) -> Result<Vec<Document>, StoreError> {
    rows.into_iter().map(Document::try_from).collect()
}

const RETURNING_COLUMNS: &str = "collection, id, data, created_at, updated_at";

pub struct PgDocumentStore {
    pool: DieselPool,
}

impl PgDocumentStore {
    pub fn new(pool: DieselPool) -> Self {
        Self { pool }
    }

    async fn connection(
        &self,
    ) -> Result<
        bb8::PooledConnection<
            '_,
            diesel_async::pooled_connection::AsyncDieselConnectionManager<AsyncPgConnection>,
        >,
        StoreError,
    > {
        self.pool
            .get()
            .await
            .map_err(|e| StoreError::Pool(e.to_string()))
    }

    async fn load_collection(
        conn: &mut AsyncPgConnection,
        collection_name: &str,
    ) -> Result<Vec<DocumentRow>, diesel::result::Error> {
        use crate::schema::documents::dsl::*;

        documents
            .filter(collection.eq(collection_name))
            .order((created_at.asc(), id.asc()))
            .select(DocumentRow::as_select())
            .load(conn)
            .await
    }

    async fn load_one(
        conn: &mut AsyncPgConnection,
        collection_name: &str,
        document_id: &str,
    ) -> Result<Option<DocumentRow>, diesel::result::Error> {
        use crate::schema::documents::dsl::*;

        documents
            .filter(collection.eq(collection_name))
            .filter(id.eq(document_id))
            .select(DocumentRow::as_select())
            .first(conn)
            .await
            .optional()
    }

    async fn insert_row(
        conn: &mut AsyncPgConnection,
        new_row: NewDocumentRow<'_>,
    ) -> Result<DocumentRow, diesel::result::Error> {
        diesel::insert_into(documents::table)
            .values(&new_row)
            .returning(DocumentRow::as_returning())
            .get_result(conn)
            .await
    }

    async fn merge_row(
        conn: &mut AsyncPgConnection,
        collection_name: &str,
        document_id: &str,
        patch: Value,
    ) -> Result<Option<DocumentRow>, diesel::result::Error> {
        // jsonb `||` replaces top-level keys and keeps the others
        sql_query(format!(
            "UPDATE documents SET data = data || $3, updated_at = NOW() \
             WHERE collection = $1 AND id = $2 \
             RETURNING {}",
            RETURNING_COLUMNS
        ))
        .bind::<Text, _>(collection_name)
        .bind::<Text, _>(document_id)
        .bind::<Jsonb, _>(patch)
        .get_result::<DocumentRow>(conn)
        .await
        .optional()
    }

    async fn remove_row(
        conn: &mut AsyncPgConnection,
        collection_name: &str,
        document_id: &str,
    ) -> Result<usize, diesel::result::Error> {
        use crate::schema::documents::dsl::*;

        diesel::delete(
            documents
                .filter(collection.eq(collection_name))
                .filter(id.eq(document_id)),
        )
        .execute(conn)
        .await
    }

    async fn load_matching(
        conn: &mut AsyncPgConnection,
        collection_name: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<DocumentRow>, diesel::result::Error> {
        sql_query(format!(
            "SELECT {} FROM documents \
             WHERE collection = $1 AND data -> $2 = $3 \
             ORDER BY created_at ASC, id ASC",
            RETURNING_COLUMNS
        ))
        .bind::<Text, _>(collection_name)
        .bind::<Text, _>(field)
        .bind::<Jsonb, _>(value.clone())
        .load::<DocumentRow>(conn)
        .await
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let mut conn = self.connection().await?;
        let rows = Self::load_collection(&mut conn, collection).await?;
        into_documents(rows)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let mut conn = self.connection().await?;
        Self::load_one(&mut conn, collection, id)
            .await?
            .map(Document::try_from)
            .transpose()
    }

    async fn insert(&self, collection: &str, fields: Fields) -> Result<Document, StoreError> {
        let mut conn = self.connection().await?;
        let id = generate_id(DOCUMENT_ID_LENGTH);
        let data = Value::Object(fields);

        let row = Self::insert_row(
            &mut conn,
            NewDocumentRow {
                collection,
                id: &id,
                data: &data,
            },
        )
        .await?;

        debug!("Inserted document {}/{}", collection, row.id);
        Document::try_from(row)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Fields,
    ) -> Result<Option<Document>, StoreError> {
        let mut conn = self.connection().await?;
        Self::merge_row(&mut conn, collection, id, Value::Object(patch))
            .await?
            .map(Document::try_from)
            .transpose()
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let mut conn = self.connection().await?;
        let removed = Self::remove_row(&mut conn, collection, id).await?;
        Ok(removed > 0)
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        let mut conn = self.connection().await?;
        let rows = Self::load_matching(&mut conn, collection, field, value).await?;
        into_documents(rows)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        super::diesel_pool::ping_pool(&self.pool).await
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
