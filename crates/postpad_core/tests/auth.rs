use postpad_core::db::open_db_in_memory;
use postpad_core::repo::account_repo::SqliteAccountRepository;
use postpad_core::{AuthError, AuthService, SystemClock};

#[test]
fn sign_up_then_sign_in_returns_same_user() {
    let conn = open_db_in_memory().unwrap();
    let auth = AuthService::new(SqliteAccountRepository::try_new(&conn).unwrap());

    let created = auth
        .sign_up("  Ada@Example.com ", "correct horse", &SystemClock)
        .unwrap();
    assert_eq!(created.email(), "ada@example.com");

    let signed_in = auth.sign_in("ada@example.com", "correct horse").unwrap();
    assert_eq!(signed_in.user_id(), created.user_id());
}

#[test]
fn duplicate_email_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let auth = AuthService::new(SqliteAccountRepository::try_new(&conn).unwrap());

    auth.sign_up("ada@example.com", "secret1", &SystemClock)
        .unwrap();
    let err = auth
        .sign_up("ADA@example.com", "secret2", &SystemClock)
        .unwrap_err();
    assert!(matches!(err, AuthError::EmailTaken(email) if email == "ada@example.com"));
}

#[test]
fn wrong_password_and_unknown_email_look_the_same() {
    let conn = open_db_in_memory().unwrap();
    let auth = AuthService::new(SqliteAccountRepository::try_new(&conn).unwrap());
    auth.sign_up("ada@example.com", "secret1", &SystemClock)
        .unwrap();

    let wrong_password = auth.sign_in("ada@example.com", "secret2").unwrap_err();
    let unknown = auth.sign_in("bob@example.com", "secret1").unwrap_err();
    assert_eq!(wrong_password.to_string(), unknown.to_string());
    assert!(matches!(wrong_password, AuthError::InvalidCredentials));
}

#[test]
fn input_validation() {
    let conn = open_db_in_memory().unwrap();
    let auth = AuthService::new(SqliteAccountRepository::try_new(&conn).unwrap());

    assert!(matches!(
        auth.sign_up("not-an-email", "secret1", &SystemClock),
        Err(AuthError::InvalidEmail(_))
    ));
    assert!(matches!(
        auth.sign_up("ada@example.com", "12345", &SystemClock),
        Err(AuthError::WeakPassword)
    ));
}

#[test]
fn password_is_not_stored_in_clear() {
    let conn = open_db_in_memory().unwrap();
    let auth = AuthService::new(SqliteAccountRepository::try_new(&conn).unwrap());
    auth.sign_up("ada@example.com", "secret1", &SystemClock)
        .unwrap();

    let (salt, hash): (String, String) = conn
        .query_row(
            "SELECT password_salt, password_hash FROM accounts WHERE email = 'ada@example.com';",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(salt.len(), 32);
    assert_eq!(hash.len(), 64);
    assert!(!hash.contains("secret1"));
}
