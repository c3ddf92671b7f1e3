//! Order-key operations shared by the slider and gallery tables.

use memories_common::{Collection, Error, OrderKey, Result, RowId};
use rusqlite::Connection;

use super::collect_rows;

/// Table name and quoted key column for a collection.
fn table(collection: Collection) -> (&'static str, &'static str) {
    match collection {
        Collection::Slider => ("slider_images", "position"),
        Collection::Gallery => ("gallery_images", "\"order\""),
    }
}

/// Highest order key in the collection, or 0 when it is empty.
pub fn max_order_key(conn: &Connection, collection: Collection) -> Result<u32> {
    let (table, key) = table(collection);
    let q = format!("SELECT COALESCE(MAX({key}), 0) FROM {table}");
    conn.query_row(&q, [], |row| row.get(0))
        .map_err(|e| Error::database(e.to_string()))
}

/// All `(id, key)` pairs in display order: key, then insertion order.
pub fn order_keys(conn: &Connection, collection: Collection) -> Result<Vec<OrderKey>> {
    let (table, key) = table(collection);
    let q = format!("SELECT id, {key} FROM {table} ORDER BY {key} ASC, created_at ASC, rowid ASC");
    let mut stmt = conn.prepare(&q).map_err(|e| Error::database(e.to_string()))?;
    collect_rows(&mut stmt, [])
}

/// Overwrite the order key of one row. Returns true if the row exists.
pub fn set_order_key(conn: &Connection, collection: Collection, id: RowId, new_key: u32) -> Result<bool> {
    let (table, key) = table(collection);
    let q = format!("UPDATE {table} SET {key} = ?1 WHERE id = ?2");
    let n = conn
        .execute(&q, rusqlite::params![new_key, id.to_string()])
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}

/// Ids bound per DELETE statement, well under SQLite's parameter limit.
const DELETE_CHUNK: usize = 500;

/// Delete every row whose id is in `ids` inside one transaction.
///
/// Ids that do not exist are ignored. Large id sets are split into several
/// statements; a failure in any of them rolls back the whole delete.
/// Returns the number of rows removed.
pub fn delete_rows(conn: &Connection, collection: Collection, ids: &[RowId]) -> Result<usize> {
    if ids.is_empty() {
        return Ok(0);
    }

    let (table, _) = table(collection);
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;

    let mut n = 0;
    for chunk in ids.chunks(DELETE_CHUNK) {
        let placeholders = vec!["?"; chunk.len()].join(",");
        let q = format!("DELETE FROM {table} WHERE id IN ({placeholders})");
        n += tx
            .execute(&q, rusqlite::params_from_iter(chunk.iter().map(|id| id.to_string())))
            .map_err(|e| Error::database(e.to_string()))?;
    }
    tx.commit().map_err(|e| Error::database(e.to_string()))?;

    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;
    use crate::queries::{gallery, slider};

    #[test]
    fn max_key_of_empty_collection_is_zero() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        assert_eq!(max_order_key(&conn, Collection::Slider).unwrap(), 0);
        assert_eq!(max_order_key(&conn, Collection::Gallery).unwrap(), 0);
    }

    #[test]
    fn max_key_tracks_inserts() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        gallery::insert_gallery_item(&conn, "a", 3).unwrap();
        gallery::insert_gallery_item(&conn, "b", 7).unwrap();
        slider::insert_slider_item(&conn, "c", "Slide 2", 2).unwrap();

        assert_eq!(max_order_key(&conn, Collection::Gallery).unwrap(), 7);
        assert_eq!(max_order_key(&conn, Collection::Slider).unwrap(), 2);
    }

    #[test]
    fn order_keys_break_ties_by_insertion() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let first = gallery::insert_gallery_item(&conn, "a", 1).unwrap();
        let second = gallery::insert_gallery_item(&conn, "b", 1).unwrap();
        let third = gallery::insert_gallery_item(&conn, "c", 2).unwrap();

        let keys = order_keys(&conn, Collection::Gallery).unwrap();
        let ids: Vec<_> = keys.iter().map(|k| k.id).collect();
        assert_eq!(ids, vec![first.id, second.id, third.id]);
    }

    #[test]
    fn set_key_on_missing_row() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        assert!(!set_order_key(&conn, Collection::Slider, RowId::new(), 4).unwrap());
    }

    #[test]
    fn delete_removes_only_listed_rows() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let a = gallery::insert_gallery_item(&conn, "a", 1).unwrap();
        let b = gallery::insert_gallery_item(&conn, "b", 2).unwrap();
        let c = gallery::insert_gallery_item(&conn, "c", 3).unwrap();

        let n = delete_rows(&conn, Collection::Gallery, &[a.id, c.id]).unwrap();
        assert_eq!(n, 2);

        let left = gallery::list_gallery_items(&conn).unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, b.id);
    }

    #[test]
    fn delete_unknown_ids_is_noop() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        slider::insert_slider_item(&conn, "a", "Slide 1", 1).unwrap();

        let n = delete_rows(&conn, Collection::Slider, &[RowId::new()]).unwrap();
        assert_eq!(n, 0);
        assert_eq!(delete_rows(&conn, Collection::Slider, &[]).unwrap(), 0);
        assert_eq!(slider::list_slider_items(&conn).unwrap().len(), 1);
    }

    #[test]
    fn delete_accepts_more_ids_than_sqlite_binds() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let a = slider::insert_slider_item(&conn, "a", "Slide 1", 1).unwrap();
        let b = slider::insert_slider_item(&conn, "b", "Slide 2", 2).unwrap();
        let c = slider::insert_slider_item(&conn, "c", "Slide 3", 3).unwrap();

        let mut ids: Vec<RowId> = (0..40_000).map(|_| RowId::new()).collect();
        ids.insert(0, a.id);
        ids.push(c.id);

        let n = delete_rows(&conn, Collection::Slider, &ids).unwrap();
        assert_eq!(n, 2);

        let left = slider::list_slider_items(&conn).unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, b.id);
    }
}
