use super::{lock, SharedConnection};
use crate::domain::entities::embedding::EmbeddingEntry;
use crate::domain::error::DomainError;
use crate::domain::ports::vector_store::VectorStore;
use rusqlite::params;

pub struct SqliteVectorStore {
    conn: SharedConnection,
}

impl SqliteVectorStore {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn serialize_vector(v: &[f32]) -> Vec<u8> {
        v.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn deserialize_vector(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }
}

impl VectorStore for SqliteVectorStore {
    fn replace_all(&self, entries: &[EmbeddingEntry]) -> Result<(), DomainError> {
        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM embeddings", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO embeddings (ord, trade_id, vector, source_text) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (ord, entry) in entries.iter().enumerate() {
                stmt.execute(params![
                    ord as i64,
                    entry.trade_id,
                    Self::serialize_vector(&entry.vector),
                    entry.source_text,
                ])
                .map_err(|e| DomainError::Database(format!("Failed to store vector: {e}")))?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<EmbeddingEntry>, DomainError> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare("SELECT trade_id, vector, source_text FROM embeddings ORDER BY ord")?;
        let entries = stmt
            .query_map([], |row| {
                let blob: Vec<u8> = row.get(1)?;
                Ok(EmbeddingEntry {
                    trade_id: row.get(0)?,
                    vector: Self::deserialize_vector(&blob),
                    source_text: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}
