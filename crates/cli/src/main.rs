use clap::{Parser, Subcommand};
use hms_core::{BufferedNotifier, ConsoleConfig, EntityKind, ListQuery, Notify, ServiceRegistry};
use hms_store::Record;
use hms_types::RecordId;
use serde_json::Value;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "hms")]
#[command(about = "Hospital administration console CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List records of one entity kind
    List {
        /// Entity kind (patients, appointments, invoices, medications,
        /// prescriptions, lab-results, emergencies)
        entity: String,
        /// Quick-search text
        #[arg(long)]
        search: Option<String>,
        /// Maximum number of records
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Fetch a single record by id
    Get {
        entity: String,
        id: String,
    },
    /// Create a record from field assignments
    Create {
        entity: String,
        /// Field assignment, field=value (repeatable)
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        sets: Vec<String>,
    },
    /// Update a record from field assignments
    Update {
        entity: String,
        id: String,
        /// Field assignment, field=value (repeatable)
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        sets: Vec<String>,
    },
    /// Delete a record by id
    Delete {
        entity: String,
        id: String,
    },
    /// Set a single field, e.g. a status transition
    SetField {
        entity: String,
        id: String,
        field: String,
        value: String,
    },
}

/// Parses a `field=value` assignment. Values that read as JSON (numbers,
/// booleans, null) are kept typed; everything else is a string.
fn parse_assignment(raw: &str) -> anyhow::Result<(String, Value)> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("expected FIELD=VALUE, got {raw:?}"))?;
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((field.to_string(), value))
}

fn build_record(sets: &[String]) -> anyhow::Result<Record> {
    let mut record = Record::new();
    for raw in sets {
        let (field, value) = parse_assignment(raw)?;
        record.insert(field, value);
    }
    Ok(record)
}

fn print_record(record: &Record) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&Value::Object(record.clone()))?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'hms --help' for commands");
        return Ok(());
    };

    let config = ConsoleConfig::new(
        std::env::var("HMS_STORE_URL").ok(),
        std::env::var("HMS_STORE_TOKEN").ok(),
        None,
    )?;
    let store = config.build_store()?;
    let notifier = Arc::new(BufferedNotifier::new());
    let registry = ServiceRegistry::new(store, notifier.clone() as Arc<dyn Notify>, config.page_limit());

    let outcome = run(&registry, command).await;

    for notification in notifier.drain() {
        eprintln!("[{}] {}", notification.severity, notification.message);
    }

    outcome
}

async fn run(registry: &ServiceRegistry, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::List {
            entity,
            search,
            limit,
        } => {
            let kind: EntityKind = entity.parse()?;
            let records = registry
                .service(kind)
                .list(ListQuery {
                    search,
                    limit,
                    ..ListQuery::default()
                })
                .await?;
            if records.is_empty() {
                println!("No {} found.", kind.descriptor().plural);
            } else {
                for record in &records {
                    print_record(record)?;
                }
            }
        }
        Commands::Get { entity, id } => {
            let kind: EntityKind = entity.parse()?;
            let id = RecordId::parse(&id)?;
            match registry.service(kind).get(id).await? {
                Some(record) => print_record(&record)?,
                None => println!("No {} with id {id}.", kind.descriptor().singular),
            }
        }
        Commands::Create { entity, sets } => {
            let kind: EntityKind = entity.parse()?;
            let created = registry.service(kind).create(build_record(&sets)?).await?;
            print_record(&created)?;
        }
        Commands::Update { entity, id, sets } => {
            let kind: EntityKind = entity.parse()?;
            let id = RecordId::parse(&id)?;
            let updated = registry
                .service(kind)
                .update(id, build_record(&sets)?)
                .await?;
            print_record(&updated)?;
        }
        Commands::Delete { entity, id } => {
            let kind: EntityKind = entity.parse()?;
            let id = RecordId::parse(&id)?;
            registry.service(kind).remove(id).await?;
        }
        Commands::SetField {
            entity,
            id,
            field,
            value,
        } => {
            let kind: EntityKind = entity.parse()?;
            let id = RecordId::parse(&id)?;
            let value =
                serde_json::from_str(&value).unwrap_or_else(|_| Value::String(value.clone()));
            let updated = registry.service(kind).set_field(id, &field, value).await?;
            print_record(&updated)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_splits_on_first_equals() {
        let (field, value) = parse_assignment("notes=dose=2x daily").expect("should parse");
        assert_eq!(field, "notes");
        assert_eq!(value, Value::String("dose=2x daily".into()));
    }

    #[test]
    fn assignment_keeps_json_values_typed() {
        let (_, number) = parse_assignment("quantity=5").expect("should parse");
        assert_eq!(number, Value::from(5));
        let (_, flag) = parse_assignment("critical_flags=true").expect("should parse");
        assert_eq!(flag, Value::Bool(true));
    }

    #[test]
    fn assignment_without_equals_is_an_error() {
        assert!(parse_assignment("quantity").is_err());
    }
}
