use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use engine::{EngineError, PlanEngine, UserEngine};
use gateway::Orchestrator;
use migration::{BrokerMigrator, MigratorTrait, PlanMigrator, UserMigrator};
use notification::{
    AmqpBroker, Broker, ConsoleMailer, ConsumerOptions, EmailConsumer, Mailer, NotificationBridge,
    NotificationError, SmtpMailer, SqlBroker,
};
use rpc::{ClientOptions, NotificationClient, PlanClient, UserClient};
use settings::{BrokerBackend, Database, Settings};

mod settings;

/// Trip planner: plan store, user store, notification service and gateway.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Settings file; defaults to `settings.toml` in the working directory.
    #[arg(short, long, env = "TRIPS_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("settings: {0}")]
    Config(#[from] config::ConfigError),
    #[error("database: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    let settings = Settings::new(cli.config.as_deref())?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "trip_planner={level},gateway={level},rpc={level},engine={level},notification={level}",
            level = settings.app.level
        ))
        .init();

    if let Some(plan) = settings.plan {
        tasks.spawn(async move {
            tracing::info!("Found plan settings...");
            let db = open::<PlanMigrator>(&plan.database).await?;
            let engine = PlanEngine::builder().database(db).build().await?;
            let listener = bind(plan.bind.as_deref(), plan.port).await?;
            rpc::run_with_listener("plan", rpc::plan_router(Arc::new(engine)), listener).await?;
            Ok::<_, AppError>(())
        });
    }

    if let Some(users) = settings.users {
        tasks.spawn(async move {
            tracing::info!("Found users settings...");
            let db = open::<UserMigrator>(&users.database).await?;
            let engine = UserEngine::builder().database(db).build().await?;
            let listener = bind(users.bind.as_deref(), users.port).await?;
            rpc::run_with_listener("users", rpc::user_router(Arc::new(engine)), listener).await?;
            Ok::<_, AppError>(())
        });
    }

    if let Some(notification) = settings.notification {
        tasks.spawn(async move {
            tracing::info!("Found notification settings...");
            let backoff = notification.retry_backoff();
            let broker: Arc<dyn Broker> = match notification.broker()? {
                BrokerBackend::Amqp(url) => Arc::new(AmqpBroker::connect(url).await?),
                BrokerBackend::Sql(database) => {
                    tracing::warn!("no AMQP server configured, queueing in the database");
                    let db = open::<BrokerMigrator>(database).await?;
                    let mut broker = SqlBroker::new(db).with_requeue_backoff(backoff);
                    if let Some(lease_ms) = notification.lease_ms {
                        broker = broker.with_lease(Duration::from_millis(lease_ms));
                    }
                    Arc::new(broker)
                }
            };

            let mailer: Arc<dyn Mailer> = match &notification.smtp {
                Some(smtp) => Arc::new(SmtpMailer::new(smtp)?),
                None => {
                    tracing::warn!("no SMTP relay configured, emails are only logged");
                    Arc::new(ConsoleMailer)
                }
            };
            let mut options = ConsumerOptions {
                requeue_on_failure: notification.requeue_on_failure,
                failure_backoff: backoff,
                ..ConsumerOptions::default()
            };
            if let Some(poll_ms) = notification.poll_interval_ms {
                options.poll_interval = Duration::from_millis(poll_ms);
            }

            let bridge = NotificationBridge::connect(broker.clone()).await?;
            let consumer = EmailConsumer::new(broker, mailer, options);
            let listener = bind(notification.bind.as_deref(), notification.port).await?;

            tokio::try_join!(
                async { consumer.run().await.map_err(AppError::from) },
                async {
                    rpc::run_with_listener(
                        "notification",
                        rpc::notification_router(Arc::new(bridge)),
                        listener,
                    )
                    .await
                    .map_err(AppError::from)
                },
            )?;
            Ok::<_, AppError>(())
        });
    }

    if let Some(gateway) = settings.gateway {
        tasks.spawn(async move {
            tracing::info!("Found gateway settings...");
            let timeout = gateway.timeout_ms.map(Duration::from_millis);
            let plan = PlanClient::new(ClientOptions::new(&gateway.plan_url).timeout(timeout))?;
            let users = UserClient::new(ClientOptions::new(&gateway.users_url).timeout(timeout))?;
            let notifier = NotificationClient::new(
                ClientOptions::new(&gateway.notification_url).timeout(timeout),
            )?;

            let orchestrator =
                Orchestrator::new(Arc::new(plan), Arc::new(users), Arc::new(notifier))
                    .with_policy(gateway.policy())
                    .with_timeout(timeout);
            let listener = bind(gateway.bind.as_deref(), gateway.port).await?;
            gateway::run_with_listener(orchestrator, listener).await?;
            Ok::<_, AppError>(())
        });
    }

    if tasks.is_empty() {
        tracing::warn!("no component configured, nothing to run");
    }

    while let Some(joined) = tasks.join_next().await {
        tasks.shutdown().await;
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::error!("component stopped: {err}");
                return Err(err);
            }
            Err(err) => tracing::error!("component task failed: {err}"),
        }
    }

    Ok(())
}

/// Connect to `database` and bring its schema up to date.
async fn open<M: MigratorTrait>(
    database: &Database,
) -> Result<sea_orm::DatabaseConnection, AppError> {
    let connection = sea_orm::Database::connect(database.url()).await?;
    M::up(&connection, None).await?;
    Ok(connection)
}

async fn bind(bind: Option<&str>, port: u16) -> Result<tokio::net::TcpListener, AppError> {
    let addr = format!("{}:{}", bind.unwrap_or("127.0.0.1"), port);
    Ok(tokio::net::TcpListener::bind(addr).await?)
}
