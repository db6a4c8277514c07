use std::fmt;

use sqlx::Connection;
use tracing::{debug, info, instrument};

use super::{count_rows, hash_password, open_existing};
use crate::env::Config;
use crate::error::AppError;

const INSERT_USER_SQL: &str = "INSERT INTO users (username, name, surname, email, password, pfp, role) VALUES (?, ?, ?, ?, ?, ?, ?)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Attendee,
    Organizer,
}

impl Role {
    /// Stored value of the `users.role` column.
    pub fn as_flag(&self) -> i64 {
        match self {
            Role::Attendee => 0,
            Role::Organizer => 1,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Attendee => write!(f, "attendee"),
            Role::Organizer => write!(f, "organizer"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DefaultUser {
    pub username: &'static str,
    pub name: &'static str,
    pub surname: &'static str,
    pub email: &'static str,
    pub password: &'static str,
    pub pfp: &'static str,
    pub role: Role,
}

pub const DEFAULT_USERS: &[DefaultUser] = &[
    DefaultUser {
        username: "musicmaestro",
        name: "Marco",
        surname: "Rossi",
        email: "marco.rossi@example.com",
        password: "Admin2025!",
        pfp: "",
        role: Role::Organizer,
    },
    DefaultUser {
        username: "soundwizard",
        name: "Laura",
        surname: "Bianchi",
        email: "laura.bianchi@example.com",
        password: "Stage2025!",
        pfp: "images/pfp/2.webp",
        role: Role::Organizer,
    },
    DefaultUser {
        username: "beatmaker",
        name: "Paolo",
        surname: "Verdi",
        email: "paolo.verdi@example.com",
        password: "Plan2025!",
        pfp: "",
        role: Role::Organizer,
    },
    DefaultUser {
        username: "rhythmking",
        name: "Sara",
        surname: "Neri",
        email: "sara.neri@example.com",
        password: "Music2025!",
        pfp: "images/pfp/4.webp",
        role: Role::Organizer,
    },
    DefaultUser {
        username: "music_fan",
        name: "Luca",
        surname: "Romano",
        email: "luca.romano@example.com",
        password: "Fan2025!",
        pfp: "",
        role: Role::Attendee,
    },
    DefaultUser {
        username: "rock_lover",
        name: "Elena",
        surname: "Ferrari",
        email: "elena.ferrari@example.com",
        password: "Rock2025!",
        pfp: "images/pfp/6.webp",
        role: Role::Attendee,
    },
    DefaultUser {
        username: "pop_enthusiast",
        name: "Andrea",
        surname: "Marino",
        email: "andrea.marino@example.com",
        password: "Pop2025!",
        pfp: "images/pfp/7.webp",
        role: Role::Attendee,
    },
    DefaultUser {
        username: "festival_goer",
        name: "Chiara",
        surname: "Costa",
        email: "chiara.costa@example.com",
        password: "Fest2025!",
        pfp: "",
        role: Role::Attendee,
    },
    DefaultUser {
        username: "concert_junkie",
        name: "Matteo",
        surname: "Rizzo",
        email: "matteo.rizzo@example.com",
        password: "Concert2025!",
        pfp: "",
        role: Role::Attendee,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSeedOutcome {
    Inserted(usize),
    Skipped { existing: i64 },
}

pub async fn initialize_default_users(config: &Config) -> Result<UserSeedOutcome, AppError> {
    seed_users(config, DEFAULT_USERS).await
}

/// Inserts `users` in one transaction, unless the table already holds any
/// account. Either every user is stored or none is.
#[instrument(skip_all, fields(count = users.len()))]
pub async fn seed_users(
    config: &Config,
    users: &[DefaultUser],
) -> Result<UserSeedOutcome, AppError> {
    let mut conn = open_existing(config).await?;

    let existing = count_rows(&mut conn, "users").await?;
    if existing > 0 {
        info!(existing, "Users already present, user seeding skipped");
        conn.close().await?;
        return Ok(UserSeedOutcome::Skipped { existing });
    }

    tokio::fs::create_dir_all(config.profile_image_dir()).await?;

    let mut tx = conn.begin().await?;
    let mut inserted = 0;

    for user in users {
        let password_hash = hash_password(user.password)?;

        sqlx::query(INSERT_USER_SQL)
            .bind(user.username.to_lowercase())
            .bind(user.name)
            .bind(user.surname)
            .bind(user.email.to_lowercase())
            .bind(password_hash)
            .bind(user.pfp)
            .bind(user.role.as_flag())
            .execute(&mut *tx)
            .await?;

        debug!(username = user.username, role = %user.role, "Inserted default user");
        inserted += 1;
    }

    tx.commit().await?;
    conn.close().await?;

    info!(inserted, "Default users created");
    Ok(UserSeedOutcome::Inserted(inserted))
}
