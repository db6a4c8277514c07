use std::collections::{BTreeSet, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::AppError;

static REFERENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)REFERENCES\s+"?(\w+)"?"#).expect("valid references regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDef {
    pub name: &'static str,
    pub create_sql: &'static str,
}

impl TableDef {
    /// Tables this one points at through `REFERENCES` clauses.
    pub fn references(&self) -> Vec<&str> {
        let mut refs: Vec<&str> = REFERENCES
            .captures_iter(self.create_sql)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .filter(|name| *name != self.name)
            .collect();
        refs.sort_unstable();
        refs.dedup();
        refs
    }
}

pub const FESTIVAL_TABLES: &[TableDef] = &[
    TableDef {
        name: "event_days",
        create_sql: r#"
CREATE TABLE IF NOT EXISTS "event_days" (
    "id" INTEGER NOT NULL UNIQUE,
    "name" TEXT NOT NULL,
    "date" TEXT NOT NULL,
    "current_attendees" INTEGER NOT NULL DEFAULT 0,
    "max_attendees" INTEGER NOT NULL DEFAULT 200,
    "start_time" TEXT NOT NULL,
    "end_time" TEXT NOT NULL,
    PRIMARY KEY("id" AUTOINCREMENT)
)"#,
    },
    TableDef {
        name: "users",
        create_sql: r#"
CREATE TABLE IF NOT EXISTS "users" (
    "id" INTEGER NOT NULL UNIQUE,
    "username" TEXT NOT NULL UNIQUE,
    "name" TEXT NOT NULL,
    "surname" TEXT NOT NULL,
    "email" TEXT NOT NULL UNIQUE,
    "password" TEXT NOT NULL,
    "role" INTEGER NOT NULL,
    "pfp" TEXT,
    PRIMARY KEY("id" AUTOINCREMENT)
)"#,
    },
    TableDef {
        name: "stages",
        create_sql: r#"
CREATE TABLE IF NOT EXISTS "stages" (
    "id" INTEGER NOT NULL UNIQUE,
    "name" TEXT NOT NULL UNIQUE,
    "description" TEXT NOT NULL,
    "image" TEXT NOT NULL,
    PRIMARY KEY("id" AUTOINCREMENT)
)"#,
    },
    TableDef {
        name: "genres",
        create_sql: r#"
CREATE TABLE IF NOT EXISTS "genres" (
    "id" INTEGER NOT NULL UNIQUE,
    "name" TEXT NOT NULL UNIQUE,
    PRIMARY KEY("id" AUTOINCREMENT)
)"#,
    },
    TableDef {
        name: "performances",
        create_sql: r#"
CREATE TABLE IF NOT EXISTS "performances" (
    "id" INTEGER NOT NULL UNIQUE,
    "artist_name" TEXT NOT NULL,
    "start_time" TEXT NOT NULL,
    "duration" INTEGER NOT NULL,
    "description" TEXT,
    "image_path" TEXT,
    "day_id" INTEGER NOT NULL,
    "stage_id" INTEGER NOT NULL,
    "genre_id" INTEGER NOT NULL,
    "organizer_id" INTEGER NOT NULL,
    "is_published" INTEGER NOT NULL DEFAULT 0,
    "created_at" TEXT DEFAULT CURRENT_TIMESTAMP,
    "updated_at" TEXT DEFAULT CURRENT_TIMESTAMP,
    "is_featured" INTEGER DEFAULT 0,
    PRIMARY KEY("id" AUTOINCREMENT),
    FOREIGN KEY("day_id") REFERENCES "event_days"("id"),
    FOREIGN KEY("stage_id") REFERENCES "stages"("id"),
    FOREIGN KEY("genre_id") REFERENCES "genres"("id"),
    FOREIGN KEY("organizer_id") REFERENCES "users"("id")
)"#,
    },
    TableDef {
        name: "ticket_types",
        create_sql: r#"
CREATE TABLE IF NOT EXISTS "ticket_types" (
    "id" INTEGER NOT NULL UNIQUE,
    "name" TEXT NOT NULL UNIQUE,
    "description" TEXT,
    "price" REAL NOT NULL,
    "days_count" INTEGER NOT NULL,
    PRIMARY KEY("id" AUTOINCREMENT)
)"#,
    },
    TableDef {
        name: "tickets",
        create_sql: r#"
CREATE TABLE IF NOT EXISTS "tickets" (
    "id" INTEGER NOT NULL UNIQUE,
    "user_id" INTEGER NOT NULL,
    "ticket_type_id" INTEGER NOT NULL,
    "purchase_date" TEXT DEFAULT CURRENT_TIMESTAMP,
    "is_valid" INTEGER DEFAULT 1,
    "friday" INTEGER DEFAULT 0,
    "saturday" INTEGER DEFAULT 0,
    "sunday" INTEGER DEFAULT 0,
    PRIMARY KEY("id" AUTOINCREMENT),
    FOREIGN KEY("user_id") REFERENCES "users"("id"),
    FOREIGN KEY("ticket_type_id") REFERENCES "ticket_types"("id")
)"#,
    },
];

/// Table definitions in an order where every table follows the tables it
/// references.
#[derive(Debug, Clone)]
pub struct Schema {
    ordered: Vec<TableDef>,
}

impl Schema {
    pub fn festival() -> Result<Self, AppError> {
        Self::resolve(FESTIVAL_TABLES)
    }

    /// Topologically sorts `tables` by their foreign keys. Among tables that
    /// are ready at the same time the earliest declared one goes first, so a
    /// declaration order that is already valid comes back unchanged.
    pub fn resolve(tables: &[TableDef]) -> Result<Self, AppError> {
        let index: HashMap<&str, usize> = tables
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name, i))
            .collect();

        if index.len() != tables.len() {
            return Err(AppError::Schema("duplicate table name".to_string()));
        }

        let mut pending = vec![0usize; tables.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); tables.len()];

        for (i, table) in tables.iter().enumerate() {
            for referenced in table.references() {
                let Some(&target) = index.get(referenced) else {
                    return Err(AppError::Schema(format!(
                        "table {} references unknown table {}",
                        table.name, referenced
                    )));
                };
                pending[i] += 1;
                dependents[target].push(i);
            }
        }

        let mut ready: BTreeSet<usize> = (0..tables.len()).filter(|&i| pending[i] == 0).collect();
        let mut ordered = Vec::with_capacity(tables.len());

        while let Some(next) = ready.pop_first() {
            ordered.push(tables[next]);
            for &dependent in &dependents[next] {
                pending[dependent] -= 1;
                if pending[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        if ordered.len() != tables.len() {
            let stuck: Vec<&str> = tables
                .iter()
                .enumerate()
                .filter(|(i, _)| pending[*i] > 0)
                .map(|(_, t)| t.name)
                .collect();
            return Err(AppError::Schema(format!(
                "foreign key cycle between tables {:?}",
                stuck
            )));
        }

        Ok(Self { ordered })
    }

    /// Referenced tables first: create, seed, count, sequence reset.
    pub fn creation_order(&self) -> impl Iterator<Item = &TableDef> {
        self.ordered.iter()
    }

    /// Referencing tables first: drop, truncate.
    pub fn teardown_order(&self) -> impl Iterator<Item = &TableDef> {
        self.ordered.iter().rev()
    }

    pub fn table_count(&self) -> usize {
        self.ordered.len()
    }

    pub fn table_names(&self) -> Vec<&'static str> {
        self.ordered.iter().map(|t| t.name).collect()
    }
}
