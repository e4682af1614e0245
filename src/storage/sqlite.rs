//! SQLite-backed skill stores.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, SmError, StoreKind};
use crate::ranking::types::{EmbeddingVector, SkillVectorRecord, SkillWeight};
use crate::storage::{
    PopularitySource, SkillDictionary, SkillVectorSource, WordVectorTable, parse_skill_record,
};

/// Current schema version, stored in `PRAGMA user_version`.
pub const SCHEMA_VERSION: u32 = 1;

/// Words per batched `IN (...)` query.
const LOOKUP_CHUNK: usize = 500;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS skill_words (
    word   TEXT PRIMARY KEY NOT NULL,
    skills TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS skill_vectors (
    skill  TEXT PRIMARY KEY NOT NULL,
    dims   INTEGER NOT NULL,
    vector BLOB NOT NULL
);
CREATE TABLE IF NOT EXISTS skill_popularity (
    skill         TEXT PRIMARY KEY NOT NULL,
    average_views REAL NOT NULL
);
CREATE TABLE IF NOT EXISTS word_vectors (
    word   TEXT PRIMARY KEY NOT NULL,
    dims   INTEGER NOT NULL,
    vector BLOB NOT NULL
);
";

/// Dictionary import document: one word and its raw skill record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictionaryDocument {
    pub word: String,
    pub skills: String,
}

/// Skill embedding import document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillVectorDocument {
    pub skill: String,
    pub vector: EmbeddingVector,
}

/// Skill popularity import document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopularityDocument {
    pub skill: String,
    pub average_views: f64,
}

/// Row counts per table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub dictionary_words: u64,
    pub skill_vectors: u64,
    pub popularity_records: u64,
    pub word_vectors: u64,
}

/// SQLite database holding the dictionary, embedding, and popularity tables.
///
/// The connection sits behind a mutex so one handle can serve concurrent
/// readers.
pub struct Database {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
    schema_version: u32,
}

impl Database {
    /// Open database at the given path, creating tables as needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path).map_err(|err| SmError::store(StoreKind::Dictionary, err))?;
        Self::configure_pragmas(&conn)?;
        let schema_version = Self::migrate(&conn)?;
        debug!(path = %path.display(), schema_version, "opened skill database");

        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
            schema_version,
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().map_err(|err| SmError::store(StoreKind::Dictionary, err))?;
        let schema_version = Self::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
            schema_version,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub const fn schema_version(&self) -> u32 {
        self.schema_version
    }

    fn configure_pragmas(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -64000;
             PRAGMA temp_store = MEMORY;",
        )
        .map_err(|err| SmError::store(StoreKind::Dictionary, err))
    }

    fn migrate(conn: &Connection) -> Result<u32> {
        conn.execute_batch(SCHEMA)
            .and_then(|()| conn.pragma_update(None, "user_version", SCHEMA_VERSION))
            .map_err(|err| SmError::store(StoreKind::Dictionary, err))?;
        Ok(SCHEMA_VERSION)
    }

    fn with_conn<T>(
        &self,
        store: StoreKind,
        f: impl FnOnce(&mut Connection) -> rusqlite::Result<T>,
    ) -> Result<T> {
        let mut conn = self.conn.lock();
        f(&mut conn).map_err(|err| SmError::store(store, err))
    }

    // =========================================================================
    // IMPORT
    // =========================================================================

    /// Insert or replace dictionary records. Words are lowercased.
    pub fn import_dictionary(&self, docs: &[DictionaryDocument]) -> Result<usize> {
        let count = self.with_conn(StoreKind::Dictionary, |conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "INSERT OR REPLACE INTO skill_words (word, skills) VALUES (?1, ?2)",
                )?;
                for doc in docs {
                    stmt.execute(params![doc.word.trim().to_lowercase(), doc.skills])?;
                }
            }
            tx.commit()?;
            Ok(docs.len())
        })?;
        info!(count, "imported dictionary records");
        Ok(count)
    }

    /// Insert or replace skill embeddings, rejecting any of the wrong width.
    pub fn import_skill_vectors(&self, docs: &[SkillVectorDocument], dims: usize) -> Result<usize> {
        check_widths(docs.iter().map(|doc| doc.vector.len()), dims)?;
        let width = column_width(dims)?;
        let count = self.with_conn(StoreKind::SkillVectors, |conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "INSERT OR REPLACE INTO skill_vectors (skill, dims, vector) VALUES (?1, ?2, ?3)",
                )?;
                for doc in docs {
                    stmt.execute(params![doc.skill.trim(), width, encode_vector(&doc.vector)])?;
                }
            }
            tx.commit()?;
            Ok(docs.len())
        })?;
        info!(count, dims, "imported skill vectors");
        Ok(count)
    }

    /// Insert or replace popularity counts. Skill names are lowercased.
    pub fn import_popularity(&self, docs: &[PopularityDocument]) -> Result<usize> {
        if let Some(bad) = docs
            .iter()
            .find(|doc| !doc.average_views.is_finite() || doc.average_views < 0.0)
        {
            return Err(SmError::InvalidInput(format!(
                "popularity for {} must be a non-negative number, got {}",
                bad.skill, bad.average_views
            )));
        }
        let count = self.with_conn(StoreKind::Popularity, |conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "INSERT OR REPLACE INTO skill_popularity (skill, average_views) VALUES (?1, ?2)",
                )?;
                for doc in docs {
                    stmt.execute(params![doc.skill.trim().to_lowercase(), doc.average_views])?;
                }
            }
            tx.commit()?;
            Ok(docs.len())
        })?;
        info!(count, "imported popularity records");
        Ok(count)
    }

    /// Insert or replace every vector of a word table.
    pub fn import_word_vectors(&self, table: &WordVectorTable) -> Result<usize> {
        let dims = table.dims();
        let width = column_width(dims)?;
        let count = self.with_conn(StoreKind::WordVectors, |conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "INSERT OR REPLACE INTO word_vectors (word, dims, vector) VALUES (?1, ?2, ?3)",
                )?;
                for (word, vector) in table.iter() {
                    stmt.execute(params![word, width, encode_vector(vector)])?;
                }
            }
            tx.commit()?;
            Ok(table.len())
        })?;
        info!(count, dims, "imported word vectors");
        Ok(count)
    }

    // =========================================================================
    // READ
    // =========================================================================

    /// Load every stored word vector of width `dims` into memory.
    pub fn load_word_vectors(&self, dims: usize) -> Result<WordVectorTable> {
        let rows = self.with_conn(StoreKind::WordVectors, |conn| {
            let mut stmt = conn.prepare("SELECT word, dims, vector FROM word_vectors")?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, Vec<u8>>(2)?,
                ))
            })?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
        })?;

        let mut table = WordVectorTable::new(dims);
        for (word, stored_dims, blob) in rows {
            match decode_vector(&blob, stored_dims) {
                Some(vector) if vector.len() == dims => table.insert(&word, vector)?,
                _ => warn!(%word, stored_dims, dims, "skipping word vector of unexpected width"),
            }
        }
        debug!(words = table.len(), dims, "loaded word vectors from database");
        Ok(table)
    }

    pub fn stats(&self) -> Result<StoreStats> {
        self.with_conn(StoreKind::Dictionary, |conn| {
            let count = |table: &str| -> rusqlite::Result<u64> {
                let n: i64 =
                    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
                Ok(u64::try_from(n).unwrap_or(0))
            };
            Ok(StoreStats {
                dictionary_words: count("skill_words")?,
                skill_vectors: count("skill_vectors")?,
                popularity_records: count("skill_popularity")?,
                word_vectors: count("word_vectors")?,
            })
        })
    }
}

impl SkillDictionary for Database {
    fn lookup(&self, word: &str) -> Result<Vec<SkillWeight>> {
        let record: Option<String> = self.with_conn(StoreKind::Dictionary, |conn| {
            conn.query_row(
                "SELECT skills FROM skill_words WHERE word = ?1",
                [word],
                |row| row.get(0),
            )
            .optional()
        })?;
        Ok(record
            .map(|raw| parse_skill_record(&raw).entries)
            .unwrap_or_default())
    }

    fn lookup_many(&self, words: &[String]) -> Result<HashMap<String, Vec<SkillWeight>>> {
        let mut found = HashMap::with_capacity(words.len());
        for chunk in words.chunks(LOOKUP_CHUNK) {
            let sql = format!(
                "SELECT word, skills FROM skill_words WHERE word IN ({})",
                placeholders(chunk.len())
            );
            let rows = self.with_conn(StoreKind::Dictionary, |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params_from_iter(chunk.iter()), |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
            })?;
            for (word, raw) in rows {
                found.insert(word, parse_skill_record(&raw).entries);
            }
        }
        Ok(found)
    }
}

impl SkillVectorSource for Database {
    fn fetch_all(&self) -> Result<Vec<SkillVectorRecord>> {
        let rows = self.with_conn(StoreKind::SkillVectors, |conn| {
            let mut stmt = conn.prepare("SELECT skill, dims, vector FROM skill_vectors")?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, Vec<u8>>(2)?,
                ))
            })?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
        })?;

        Ok(rows
            .into_iter()
            .filter_map(|(skill, dims, blob)| match decode_vector(&blob, dims) {
                Some(vector) => Some(SkillVectorRecord { skill, vector }),
                None => {
                    warn!(%skill, dims, bytes = blob.len(), "skipping corrupt skill vector");
                    None
                }
            })
            .collect())
    }
}

impl PopularitySource for Database {
    fn lookup(&self, skill: &str) -> Result<Option<f64>> {
        self.with_conn(StoreKind::Popularity, |conn| {
            conn.query_row(
                "SELECT average_views FROM skill_popularity WHERE skill = ?1",
                [skill],
                |row| row.get(0),
            )
            .optional()
        })
    }

    fn lookup_many(&self, skills: &[String]) -> Result<HashMap<String, f64>> {
        let mut found = HashMap::with_capacity(skills.len());
        for chunk in skills.chunks(LOOKUP_CHUNK) {
            let sql = format!(
                "SELECT skill, average_views FROM skill_popularity WHERE skill IN ({})",
                placeholders(chunk.len())
            );
            let rows = self.with_conn(StoreKind::Popularity, |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params_from_iter(chunk.iter()), |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
                })?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
            })?;
            found.extend(rows);
        }
        Ok(found)
    }

    fn max_popularity(&self) -> Result<Option<f64>> {
        self.with_conn(StoreKind::Popularity, |conn| {
            conn.query_row("SELECT MAX(average_views) FROM skill_popularity", [], |row| {
                row.get(0)
            })
        })
    }
}

fn column_width(dims: usize) -> Result<i64> {
    i64::try_from(dims)
        .map_err(|_| SmError::InvalidInput(format!("embedding width {dims} is too large")))
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

fn check_widths(widths: impl Iterator<Item = usize>, dims: usize) -> Result<()> {
    for actual in widths {
        if actual != dims {
            return Err(SmError::DimensionMismatch {
                expected: dims,
                actual,
            });
        }
    }
    Ok(())
}

fn encode_vector(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|value| value.to_le_bytes()).collect()
}

fn decode_vector(blob: &[u8], dims: i64) -> Option<EmbeddingVector> {
    let dims = usize::try_from(dims).ok()?;
    if blob.len() != dims * 4 {
        return None;
    }
    Some(
        blob.chunks_exact(4)
            .map(|bytes| f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            .collect(),
    )
}
