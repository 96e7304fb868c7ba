/// # Errors
///
/// Returns an error if the database cannot be reached.
pub(crate) async fn run_db_ping(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    echarger_db::ping(pool).await?;
    let stored = echarger_db::count_chargers(pool).await?;
    println!("database reachable; {stored} chargers stored");
    Ok(())
}

/// # Errors
///
/// Returns an error if a migration fails to apply.
pub(crate) async fn run_db_migrate(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let applied = echarger_db::run_migrations(pool).await?;
    if applied == 0 {
        println!("database schema is up to date");
    } else {
        println!("applied {applied} migration(s)");
    }
    Ok(())
}
