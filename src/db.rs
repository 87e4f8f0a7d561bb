use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use tracing::info;

use crate::models::{Artist, Genres, ListingFields, NewShow, Show, Venue};
use crate::utils;

const LISTING_COLUMNS: &str = "id, name, city, state, address, phone, facebook_link, website, \
     genres, seeking_talent, seeking_venue, seeking_description";

const VENUES: &str = "venues";
const ARTISTS: &str = "artists";

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> rusqlite::Result<Self> {
        utils::ensure_parent(path);
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> rusqlite::Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> rusqlite::Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> rusqlite::Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS venues(
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                city TEXT NOT NULL,
                state TEXT NOT NULL,
                address TEXT,
                phone TEXT NOT NULL,
                facebook_link TEXT NOT NULL,
                website TEXT,
                genres TEXT NOT NULL,
                seeking_talent INTEGER NOT NULL DEFAULT 0,
                seeking_venue TEXT,
                seeking_description TEXT
            );
            CREATE TABLE IF NOT EXISTS artists(
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                city TEXT NOT NULL,
                state TEXT NOT NULL,
                address TEXT,
                phone TEXT NOT NULL,
                facebook_link TEXT NOT NULL,
                website TEXT,
                genres TEXT NOT NULL,
                seeking_talent INTEGER NOT NULL DEFAULT 0,
                seeking_venue TEXT,
                seeking_description TEXT
            );
            CREATE TABLE IF NOT EXISTS shows(
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                artist_id INTEGER NOT NULL REFERENCES artists(id),
                venue_id INTEGER NOT NULL REFERENCES venues(id),
                start_time TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS shows_venue_idx ON shows(venue_id);
            CREATE INDEX IF NOT EXISTS shows_artist_idx ON shows(artist_id);",
        )?;
        Ok(())
    }

    pub fn seed_if_empty(&mut self) -> rusqlite::Result<()> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM venues", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(());
        }

        let tx = self.conn.transaction()?;
        let hop = insert_listing(
            &tx,
            VENUES,
            &sample_listing(
                "The Musical Hop",
                "San Francisco",
                "CA",
                "Jazz, Reggae, Swing, Classical, Folk",
            ),
        )?;
        let pianos = insert_listing(
            &tx,
            VENUES,
            &sample_listing(
                "The Dueling Pianos Bar",
                "New York",
                "NY",
                "Classical, R&B, Hip-Hop",
            ),
        )?;
        let park = insert_listing(
            &tx,
            VENUES,
            &sample_listing(
                "Park Square Live Music & Coffee",
                "San Francisco",
                "CA",
                "Rock n Roll, Jazz, Classical, Folk",
            ),
        )?;
        let petals = insert_listing(
            &tx,
            ARTISTS,
            &sample_listing("Guns N Petals", "San Francisco", "CA", "Rock n Roll"),
        )?;
        let quevado = insert_listing(
            &tx,
            ARTISTS,
            &sample_listing("Matt Quevado", "New York", "NY", "Jazz"),
        )?;
        let sax = insert_listing(
            &tx,
            ARTISTS,
            &sample_listing("The Wild Sax Band", "San Francisco", "CA", "Jazz, Classical"),
        )?;

        let shows = [
            (petals, hop, "2019-05-21 21:30:00"),
            (quevado, park, "2019-06-15 23:00:00"),
            (sax, park, "2035-04-01 20:00:00"),
            (sax, park, "2035-04-08 20:00:00"),
            (sax, pianos, "2035-04-15 20:00:00"),
        ];
        for (artist_id, venue_id, start_time) in shows {
            tx.execute(
                "INSERT INTO shows (artist_id, venue_id, start_time) VALUES (?1, ?2, ?3)",
                params![artist_id, venue_id, start_time],
            )?;
        }
        tx.commit()?;
        info!("seeded sample venues, artists and shows");
        Ok(())
    }

    pub fn find_venue(&self, id: i64) -> rusqlite::Result<Option<Venue>> {
        find_listing(&self.conn, VENUES, id)
            .map(|found| found.map(|(id, fields)| venue_from(id, fields)))
    }

    pub fn find_artist(&self, id: i64) -> rusqlite::Result<Option<Artist>> {
        find_listing(&self.conn, ARTISTS, id)
            .map(|found| found.map(|(id, fields)| artist_from(id, fields)))
    }

    pub fn find_show(&self, id: i64) -> rusqlite::Result<Option<Show>> {
        self.conn
            .query_row(
                "SELECT id, artist_id, venue_id, start_time FROM shows WHERE id = ?1",
                params![id],
                show_from_row,
            )
            .optional()
    }

    /// Ordered by (state, city) so listings read naturally; grouping does not rely on it.
    pub fn list_venues(&self) -> rusqlite::Result<Vec<Venue>> {
        let rows = list_listings(&self.conn, VENUES, "state, city, id")?;
        Ok(rows
            .into_iter()
            .map(|(id, fields)| venue_from(id, fields))
            .collect())
    }

    pub fn list_artists(&self) -> rusqlite::Result<Vec<Artist>> {
        let rows = list_listings(&self.conn, ARTISTS, "id")?;
        Ok(rows
            .into_iter()
            .map(|(id, fields)| artist_from(id, fields))
            .collect())
    }

    /// Newest first.
    pub fn list_shows(&self) -> rusqlite::Result<Vec<Show>> {
        self.query_shows(
            "SELECT id, artist_id, venue_id, start_time FROM shows ORDER BY start_time DESC, id DESC",
            [],
        )
    }

    pub fn shows_for_venue(&self, venue_id: i64) -> rusqlite::Result<Vec<Show>> {
        self.query_shows(
            "SELECT id, artist_id, venue_id, start_time FROM shows
             WHERE venue_id = ?1 ORDER BY start_time, id",
            params![venue_id],
        )
    }

    pub fn shows_for_artist(&self, artist_id: i64) -> rusqlite::Result<Vec<Show>> {
        self.query_shows(
            "SELECT id, artist_id, venue_id, start_time FROM shows
             WHERE artist_id = ?1 ORDER BY start_time, id",
            params![artist_id],
        )
    }

    fn query_shows<P: rusqlite::Params>(&self, sql: &str, args: P) -> rusqlite::Result<Vec<Show>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(args, show_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn insert_venue(&mut self, fields: &ListingFields) -> rusqlite::Result<Venue> {
        let tx = self.conn.transaction()?;
        let id = insert_listing(&tx, VENUES, fields)?;
        tx.commit()?;
        Ok(venue_from(id, fields.clone()))
    }

    pub fn insert_artist(&mut self, fields: &ListingFields) -> rusqlite::Result<Artist> {
        let tx = self.conn.transaction()?;
        let id = insert_listing(&tx, ARTISTS, fields)?;
        tx.commit()?;
        Ok(artist_from(id, fields.clone()))
    }

    /// `Ok(None)` when no venue has that id; nothing is written in that case.
    pub fn update_venue(&mut self, id: i64, fields: &ListingFields) -> rusqlite::Result<Option<Venue>> {
        let tx = self.conn.transaction()?;
        if !update_listing(&tx, VENUES, id, fields)? {
            return Ok(None);
        }
        tx.commit()?;
        Ok(Some(venue_from(id, fields.clone())))
    }

    pub fn update_artist(&mut self, id: i64, fields: &ListingFields) -> rusqlite::Result<Option<Artist>> {
        let tx = self.conn.transaction()?;
        if !update_listing(&tx, ARTISTS, id, fields)? {
            return Ok(None);
        }
        tx.commit()?;
        Ok(Some(artist_from(id, fields.clone())))
    }

    /// Fails with a foreign key violation while the venue still hosts shows.
    pub fn delete_venue(&mut self, id: i64) -> rusqlite::Result<bool> {
        let tx = self.conn.transaction()?;
        let removed = tx.execute("DELETE FROM venues WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(removed > 0)
    }

    pub fn insert_show(&mut self, show: &NewShow) -> rusqlite::Result<Show> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO shows (artist_id, venue_id, start_time) VALUES (?1, ?2, ?3)",
            params![show.artist_id, show.venue_id, show.start_time],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Show {
            id,
            artist_id: show.artist_id,
            venue_id: show.venue_id,
            start_time: show.start_time.clone(),
        })
    }
}

fn insert_listing(tx: &Transaction<'_>, table: &str, fields: &ListingFields) -> rusqlite::Result<i64> {
    tx.execute(
        &format!(
            "INSERT INTO {table} (name, city, state, address, phone, facebook_link, website,
                genres, seeking_talent, seeking_venue, seeking_description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
        ),
        params![
            fields.name,
            fields.city,
            fields.state,
            fields.address,
            fields.phone,
            fields.facebook_link,
            fields.website,
            fields.genres.as_str(),
            fields.seeking_talent,
            fields.seeking_venue,
            fields.seeking_description,
        ],
    )?;
    Ok(tx.last_insert_rowid())
}

fn update_listing(
    tx: &Transaction<'_>,
    table: &str,
    id: i64,
    fields: &ListingFields,
) -> rusqlite::Result<bool> {
    let changed = tx.execute(
        &format!(
            "UPDATE {table} SET name = ?2, city = ?3, state = ?4, address = ?5, phone = ?6,
                facebook_link = ?7, website = ?8, genres = ?9, seeking_talent = ?10,
                seeking_venue = ?11, seeking_description = ?12
             WHERE id = ?1"
        ),
        params![
            id,
            fields.name,
            fields.city,
            fields.state,
            fields.address,
            fields.phone,
            fields.facebook_link,
            fields.website,
            fields.genres.as_str(),
            fields.seeking_talent,
            fields.seeking_venue,
            fields.seeking_description,
        ],
    )?;
    Ok(changed > 0)
}

fn find_listing(
    conn: &Connection,
    table: &str,
    id: i64,
) -> rusqlite::Result<Option<(i64, ListingFields)>> {
    conn.query_row(
        &format!("SELECT {LISTING_COLUMNS} FROM {table} WHERE id = ?1"),
        params![id],
        listing_from_row,
    )
    .optional()
}

fn list_listings(
    conn: &Connection,
    table: &str,
    order_by: &str,
) -> rusqlite::Result<Vec<(i64, ListingFields)>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {LISTING_COLUMNS} FROM {table} ORDER BY {order_by}"
    ))?;
    let rows = stmt.query_map([], listing_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn listing_from_row(row: &Row<'_>) -> rusqlite::Result<(i64, ListingFields)> {
    let genres: String = row.get(8)?;
    Ok((
        row.get(0)?,
        ListingFields {
            name: row.get(1)?,
            city: row.get(2)?,
            state: row.get(3)?,
            address: row.get(4)?,
            phone: row.get(5)?,
            facebook_link: row.get(6)?,
            website: row.get(7)?,
            genres: Genres::new(genres),
            seeking_talent: row.get(9)?,
            seeking_venue: row.get(10)?,
            seeking_description: row.get(11)?,
        },
    ))
}

fn show_from_row(row: &Row<'_>) -> rusqlite::Result<Show> {
    Ok(Show {
        id: row.get(0)?,
        artist_id: row.get(1)?,
        venue_id: row.get(2)?,
        start_time: row.get(3)?,
    })
}

fn venue_from(id: i64, fields: ListingFields) -> Venue {
    Venue {
        id,
        name: fields.name,
        city: fields.city,
        state: fields.state,
        address: fields.address,
        phone: fields.phone,
        facebook_link: fields.facebook_link,
        website: fields.website,
        genres: fields.genres,
        seeking_talent: fields.seeking_talent,
        seeking_venue: fields.seeking_venue,
        seeking_description: fields.seeking_description,
    }
}

fn artist_from(id: i64, fields: ListingFields) -> Artist {
    Artist {
        id,
        name: fields.name,
        city: fields.city,
        state: fields.state,
        phone: fields.phone,
        genres: fields.genres,
        address: fields.address,
        facebook_link: fields.facebook_link,
        website: fields.website,
        seeking_talent: fields.seeking_talent,
        seeking_venue: fields.seeking_venue,
        seeking_description: fields.seeking_description,
    }
}

fn sample_listing(name: &str, city: &str, state: &str, genres: &str) -> ListingFields {
    let handle: String = name.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    ListingFields {
        name: name.to_string(),
        city: city.to_string(),
        state: state.to_string(),
        address: None,
        phone: "123-123-1234".to_string(),
        genres: Genres::new(genres),
        facebook_link: format!("https://www.facebook.com/{handle}"),
        website: Some(format!("https://www.{}.com", handle.to_lowercase())),
        seeking_talent: false,
        seeking_venue: None,
        seeking_description: None,
    }
}
