use chrono::{DateTime, Utc};
use kinogate_core::{
    domain::{CatalogEntry, MediaKind, MediaRef, Movie},
    ports::CatalogStore,
    Result,
};
use rusqlite::{types::Type, OptionalExtension, Row};

use crate::{now, Database};

impl CatalogStore for Database {
    fn put(&self, code: &str, media: &MediaRef, caption: Option<&str>) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO movies (code, file_id, media_kind, caption, added_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(code) DO UPDATE SET
                    file_id = excluded.file_id,
                    media_kind = excluded.media_kind,
                    caption = excluded.caption,
                    added_at = excluded.added_at",
                rusqlite::params![code, media.file_id, media.kind.as_str(), caption, now()],
            )?;
            Ok(())
        })
    }

    fn get(&self, code: &str) -> Result<Option<Movie>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT code, file_id, media_kind, caption, added_at FROM movies WHERE code = ?1",
                [code],
                movie_from_row,
            )
            .optional()
        })
    }

    fn delete(&self, code: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM movies WHERE code = ?1", [code])?;
            Ok(n > 0)
        })
    }

    fn list_all(&self) -> Result<Vec<CatalogEntry>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT code, caption FROM movies ORDER BY code")?;
            let rows = stmt.query_map([], |row| {
                Ok(CatalogEntry {
                    code: row.get(0)?,
                    caption: row.get(1)?,
                })
            })?;
            rows.collect()
        })
    }

    fn count(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM movies", [], |r| r.get(0))?;
            Ok(n as u64)
        })
    }

    fn recent(&self, limit: usize) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT code FROM movies ORDER BY added_at DESC, rowid DESC LIMIT ?1",
            )?;
            let rows = stmt.query_map([limit as i64], |row| row.get(0))?;
            rows.collect()
        })
    }
}

fn movie_from_row(row: &Row<'_>) -> rusqlite::Result<Movie> {
    let kind: String = row.get(2)?;
    let kind = MediaKind::parse(&kind).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            Type::Text,
            format!("unknown media kind {kind:?}").into(),
        )
    })?;

    let added_at: String = row.get(4)?;
    let added_at = DateTime::parse_from_rfc3339(&added_at)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?
        .with_timezone(&Utc);

    Ok(Movie {
        code: row.get(0)?,
        media: MediaRef {
            kind,
            file_id: row.get(1)?,
        },
        caption: row.get(3)?,
        added_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn put_overwrites_same_code() {
        let db = db();
        db.put("123", &MediaRef::video("ref1"), Some("Movie A")).unwrap();
        let first = db.get("123").unwrap().unwrap();

        db.put("123", &MediaRef::document("ref2"), None).unwrap();
        let second = db.get("123").unwrap().unwrap();

        assert_eq!(second.media, MediaRef::document("ref2"));
        assert_eq!(second.caption, None);
        assert!(second.added_at >= first.added_at);
        assert_eq!(db.count().unwrap(), 1);
    }

    #[test]
    fn missing_code_is_none_and_delete_reports_it() {
        let db = db();
        assert!(db.get("nope").unwrap().is_none());
        assert!(!db.delete("nope").unwrap());

        db.put("1", &MediaRef::video("f"), None).unwrap();
        assert!(db.delete("1").unwrap());
        assert!(db.get("1").unwrap().is_none());
        assert_eq!(db.count().unwrap(), 0);
    }

    #[test]
    fn list_all_is_sorted_by_code() {
        let db = db();
        for code in ["b2", "a1", "c3"] {
            db.put(code, &MediaRef::video(code), Some(code)).unwrap();
        }
        let codes: Vec<String> = db.list_all().unwrap().into_iter().map(|e| e.code).collect();
        assert_eq!(codes, vec!["a1", "b2", "c3"]);
    }

    #[test]
    fn recent_is_newest_first_and_limited() {
        let db = db();
        for code in ["10", "20", "30"] {
            db.put(code, &MediaRef::video(code), None).unwrap();
        }
        assert_eq!(db.recent(2).unwrap(), vec!["30", "20"]);
        assert_eq!(db.recent(10).unwrap().len(), 3);
    }

    #[test]
    fn unknown_media_kind_surfaces_as_store_error() {
        let db = db();
        db.with_conn(|c| {
            c.execute(
                "INSERT INTO movies (code, file_id, media_kind, added_at)
                 VALUES ('x', 'f', 'audio', '2024-01-01T00:00:00.000000Z')",
                [],
            )
        })
        .unwrap();

        assert!(matches!(db.get("x"), Err(kinogate_core::Error::Store(_))));
    }
}
