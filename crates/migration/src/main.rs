use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::prelude::*;

use migration::{BrokerMigrator, PlanMigrator, UserMigrator};

const USAGE: &str = "Usage: cargo run -p migration -- <plan|users|broker> [up|down|fresh|status]";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Target {
    Plan,
    Users,
    Broker,
}

impl Target {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "plan" => Some(Self::Plan),
            "users" => Some(Self::Users),
            "broker" => Some(Self::Broker),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Plan => "plan",
            Self::Users => "users",
            Self::Broker => "broker",
        }
    }
}

fn is_command(value: &str) -> bool {
    matches!(value, "up" | "down" | "fresh" | "status")
}

async fn run<M: MigratorTrait>(db: &DatabaseConnection, cmd: &str) -> Result<(), DbErr> {
    match cmd {
        "up" => M::up(db, None).await,
        "down" => M::down(db, None).await,
        "fresh" => M::fresh(db).await,
        _ => M::status(db).await,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut args = std::env::args().skip(1);
    let target = args.next().unwrap_or_default();
    let cmd = args.next().unwrap_or_else(|| "up".to_string());

    let Some(target) = Target::parse(&target).filter(|_| is_command(&cmd)) else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    let db_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| format!("sqlite:./{}.db?mode=rwc", target.name()));
    let db = Database::connect(&db_url).await?;

    match target {
        Target::Plan => run::<PlanMigrator>(&db, &cmd).await?,
        Target::Users => run::<UserMigrator>(&db, &cmd).await?,
        Target::Broker => run::<BrokerMigrator>(&db, &cmd).await?,
    }

    Ok(())
}
