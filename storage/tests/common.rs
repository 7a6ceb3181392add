use hopewell_storage::postgres::client::PgDatabaseClient;
use std::time::Duration;
use testcontainers::{clients::Cli, core::WaitFor, Container, GenericImage};

pub struct PgContainer<'a> {
    pub client: PgDatabaseClient,

    // Owns container instance because when container is dropped, the
    // container is stopped.
    #[allow(dead_code)]
    container: Container<'a, GenericImage>,
}

// Starts a postgres instance via docker, opens a connection pool and runs migrations.
pub async fn setup_pg_container(docker_cli: &Cli) -> Result<PgContainer<'_>, anyhow::Error> {
    let db = "postgres-db-test";
    let user = "postgres-user-test";
    let password = "postgres-password-test";

    let generic_postgres = GenericImage::new("postgres", "14-alpine")
        .with_wait_for(WaitFor::message_on_stderr(
            "database system is ready to accept connections",
        ))
        .with_env_var("POSTGRES_DB", db)
        .with_env_var("POSTGRES_USER", user)
        .with_env_var("POSTGRES_PASSWORD", password);

    let container = docker_cli.run(generic_postgres);

    let postgres_uri = format!(
        "postgres://{}:{}@localhost:{}/{}?sslmode=disable",
        user,
        password,
        container.get_host_port_ipv4(5432),
        db
    );

    // The image restarts postgres once after initdb, so the first attempts may be refused.
    let mut attempts = 0;
    let client = loop {
        match PgDatabaseClient::connect(&postgres_uri, 2).await {
            Ok(client) => break client,
            Err(e) if attempts < 10 => {
                attempts += 1;
                println!("Postgres not ready yet ({:?}), retrying", e);
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
            Err(e) => return Err(e.into()),
        }
    };

    client.run_migrations().await?;

    Ok(PgContainer { client, container })
}
