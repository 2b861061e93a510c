//! SQL query constants
//!
//! Contains all SQL statements used by the application. Every statement that
//! reads or mutates a car is guarded by `deleted_yn = 0`.

/// Applied on every checkout: strict string literals and a fixed UTC-8 zone
pub const SESSION_SETUP: &str = r#"
    SET SESSION standard_conforming_strings = on;
    SET SESSION TIME ZONE INTERVAL '-08:00' HOUR TO MINUTE;
"#;

/// Connectivity check run at startup
pub const PING: &str = "SELECT 1";

/// All live cars, store-default order
pub const LIST_LIVE_CARS: &str = r#"
    SELECT id, make, model, year
    FROM cars
    WHERE deleted_yn = 0
"#;

/// One live car by id
pub const FIND_LIVE_CAR: &str = r#"
    SELECT id, make, model, year
    FROM cars
    WHERE id = $1 AND deleted_yn = 0
"#;

/// New cars start live via the column default
pub const INSERT_CAR: &str = r#"
    INSERT INTO cars (make, model, year)
    VALUES ($1, $2, $3)
"#;

/// Field update; zero rows affected means no live row with that id
pub const UPDATE_LIVE_CAR: &str = r#"
    UPDATE cars
    SET make = $1, model = $2, year = $3
    WHERE id = $4 AND deleted_yn = 0
"#;

/// One-way soft delete; zero rows affected means no live row with that id
pub const SOFT_DELETE_LIVE_CAR: &str = r#"
    UPDATE cars
    SET deleted_yn = 1
    WHERE id = $1 AND deleted_yn = 0
"#;
