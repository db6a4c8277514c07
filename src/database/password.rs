use rand::Rng;
use rand::distr::Alphanumeric;

use crate::error::AppError;

#[cfg(not(test))]
const SCRYPT_LOG_N: u8 = 15;
#[cfg(test)]
const SCRYPT_LOG_N: u8 = 4;
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;
const KEY_LEN: usize = 64;
const SALT_LEN: usize = 16;

/// Hashes `password` into the `scrypt:<n>:<r>:<p>$<salt>$<hex key>` form
/// the festival web app checks logins against. The salt is 16 random
/// alphanumeric characters.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SALT_LEN)
        .map(char::from)
        .collect();

    hash_with_salt(password, &salt, SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P)
}

pub fn hash_with_salt(
    password: &str,
    salt: &str,
    log_n: u8,
    r: u32,
    p: u32,
) -> Result<String, AppError> {
    let params = scrypt::Params::new(log_n, r, p, KEY_LEN)?;
    let mut key = [0u8; KEY_LEN];
    scrypt::scrypt(password.as_bytes(), salt.as_bytes(), &params, &mut key)?;

    Ok(format!(
        "scrypt:{}:{}:{}${}${}",
        1u64 << log_n,
        r,
        p,
        salt,
        hex::encode(key)
    ))
}
