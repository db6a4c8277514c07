use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::{Connection, Sqlite, SqliteConnection};
use tracing::{info, instrument};

use super::{BatchReport, TableOutcome, count_rows, open_existing};
use crate::env::Config;
use crate::error::AppError;

pub type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// A row of reference data and the statement that stores it.
pub trait SeedRow {
    const TABLE: &'static str;
    const INSERT_SQL: &'static str;

    fn bind<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q>;
}

#[derive(Debug, Clone, Copy)]
pub struct EventDay {
    pub name: &'static str,
    pub date: &'static str,
    pub current_attendees: i64,
    pub max_attendees: i64,
    pub start_time: &'static str,
    pub end_time: &'static str,
}

impl SeedRow for EventDay {
    const TABLE: &'static str = "event_days";
    const INSERT_SQL: &'static str = "INSERT INTO event_days (name, date, current_attendees, max_attendees, start_time, end_time) VALUES (?, ?, ?, ?, ?, ?)";

    fn bind<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.name)
            .bind(self.date)
            .bind(self.current_attendees)
            .bind(self.max_attendees)
            .bind(self.start_time)
            .bind(self.end_time)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Stage {
    pub name: &'static str,
    pub description: &'static str,
    pub image: &'static str,
}

impl SeedRow for Stage {
    const TABLE: &'static str = "stages";
    const INSERT_SQL: &'static str =
        "INSERT INTO stages (name, description, image) VALUES (?, ?, ?)";

    fn bind<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.name)
            .bind(self.description)
            .bind(self.image)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Genre {
    pub name: &'static str,
}

impl SeedRow for Genre {
    const TABLE: &'static str = "genres";
    const INSERT_SQL: &'static str = "INSERT INTO genres (name) VALUES (?)";

    fn bind<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query.bind(self.name)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TicketType {
    pub name: &'static str,
    pub description: &'static str,
    pub price: f64,
    pub days_count: i64,
}

impl SeedRow for TicketType {
    const TABLE: &'static str = "ticket_types";
    const INSERT_SQL: &'static str =
        "INSERT INTO ticket_types (name, description, price, days_count) VALUES (?, ?, ?, ?)";

    fn bind<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.name)
            .bind(self.description)
            .bind(self.price)
            .bind(self.days_count)
    }
}

pub const DEFAULT_DAYS: &[EventDay] = &[
    EventDay {
        name: "Venerdì",
        date: "2025-06-20",
        current_attendees: 0,
        max_attendees: 200,
        start_time: "14:00",
        end_time: "24:00",
    },
    EventDay {
        name: "Sabato",
        date: "2025-06-21",
        current_attendees: 0,
        max_attendees: 200,
        start_time: "14:00",
        end_time: "24:00",
    },
    EventDay {
        name: "Domenica",
        date: "2025-06-22",
        current_attendees: 0,
        max_attendees: 200,
        start_time: "14:00",
        end_time: "24:00",
    },
];

pub const DEFAULT_STAGES: &[Stage] = &[
    Stage {
        name: "Main Stage",
        description: "Il palco principale con artisti di fama internazionale.",
        image: "images/assets/main_stage.webp",
    },
    Stage {
        name: "Secondary Stage",
        description: "Un palco più intimo per performance alternative.",
        image: "images/assets/secondary_stage.webp",
    },
    Stage {
        name: "Experimental Stage",
        description: "Un palco dedicato alla musica sperimentale.",
        image: "images/assets/experimental_stage.webp",
    },
];

pub const DEFAULT_GENRES: &[Genre] = &[
    Genre { name: "Rock" },
    Genre { name: "Pop" },
    Genre { name: "Electronic" },
    Genre { name: "Hip-Hop" },
    Genre { name: "R&B" },
    Genre { name: "Jazz" },
    Genre { name: "Blues" },
    Genre { name: "Metal" },
    Genre { name: "Folk" },
    Genre { name: "Indie" },
    Genre { name: "Techno" },
    Genre { name: "Reggae" },
];

pub const DEFAULT_TICKET_TYPES: &[TicketType] = &[
    TicketType {
        name: "Biglietto Giornaliero",
        description: "Accesso per un singolo giorno del festival",
        price: 59.99,
        days_count: 1,
    },
    TicketType {
        name: "Pass 2 Giorni",
        description: "Accesso per due giorni consecutivi del festival",
        price: 99.99,
        days_count: 2,
    },
    TicketType {
        name: "Full Pass",
        description: "Valido per tutti e tre i giorni del festival",
        price: 139.99,
        days_count: 3,
    },
];

/// Fills the reference tables that are still empty. Each table is seeded in
/// its own transaction: a failure rolls back that table only and the rest
/// are still attempted.
#[instrument(skip_all)]
pub async fn initialize_default_data(config: &Config) -> Result<BatchReport, AppError> {
    let mut conn = open_existing(config).await?;
    let mut report = BatchReport::default();

    report.record_result(EventDay::TABLE, seed_table(&mut conn, DEFAULT_DAYS).await);
    report.record_result(Stage::TABLE, seed_table(&mut conn, DEFAULT_STAGES).await);
    report.record_result(Genre::TABLE, seed_table(&mut conn, DEFAULT_GENRES).await);
    report.record_result(
        TicketType::TABLE,
        seed_table(&mut conn, DEFAULT_TICKET_TYPES).await,
    );

    conn.close().await?;
    Ok(report)
}

/// Inserts `rows` only when the table holds nothing yet. A table with any
/// row at all is left alone, even if it holds fewer rows than the defaults.
pub async fn seed_table<R: SeedRow>(
    conn: &mut SqliteConnection,
    rows: &[R],
) -> Result<TableOutcome, AppError> {
    let mut tx = conn.begin().await?;

    let existing = count_rows(&mut *tx, R::TABLE).await?;
    if existing > 0 {
        info!(
            table = R::TABLE,
            existing, "Table already holds data, seeding skipped"
        );
        return Ok(TableOutcome::Skipped { existing });
    }

    let mut inserted = 0;
    for row in rows {
        inserted += row
            .bind(sqlx::query(R::INSERT_SQL))
            .execute(&mut *tx)
            .await?
            .rows_affected();
    }

    tx.commit().await?;
    Ok(TableOutcome::Inserted(inserted))
}
