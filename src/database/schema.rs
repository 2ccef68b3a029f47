// 建表语句，sqlite 和 postgres 共用同一份
// 时间统一存毫秒时间戳，布尔存 0/1，两边字段类型保持一致

pub const CREATE_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS sightings (
        encounter_id VARCHAR(64) PRIMARY KEY,
        spawnpoint_id VARCHAR(64) NOT NULL,
        kind_id BIGINT NOT NULL,
        latitude DOUBLE PRECISION NOT NULL,
        longitude DOUBLE PRECISION NOT NULL,
        disappear_time BIGINT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS stops (
        stop_id VARCHAR(64) PRIMARY KEY,
        enabled BIGINT NOT NULL,
        latitude DOUBLE PRECISION NOT NULL,
        longitude DOUBLE PRECISION NOT NULL,
        last_modified BIGINT NOT NULL,
        lure_expiration BIGINT,
        active_kind_id BIGINT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS gyms (
        gym_id VARCHAR(64) PRIMARY KEY,
        team_id BIGINT NOT NULL,
        guard_kind_id BIGINT NOT NULL,
        gym_points BIGINT NOT NULL,
        enabled BIGINT NOT NULL,
        latitude DOUBLE PRECISION NOT NULL,
        longitude DOUBLE PRECISION NOT NULL,
        last_modified BIGINT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS scanned_locations (
        scanned_id VARCHAR(64) PRIMARY KEY,
        latitude DOUBLE PRECISION NOT NULL,
        longitude DOUBLE PRECISION NOT NULL,
        last_modified BIGINT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_sightings_disappear ON sightings (disappear_time)",
    "CREATE INDEX IF NOT EXISTS idx_sightings_location ON sightings (latitude, longitude)",
    "CREATE INDEX IF NOT EXISTS idx_stops_location ON stops (latitude, longitude)",
    "CREATE INDEX IF NOT EXISTS idx_gyms_location ON gyms (latitude, longitude)",
    "CREATE INDEX IF NOT EXISTS idx_scanned_modified ON scanned_locations (last_modified)",
];
