//! Revision generation for the migration crate.
//!
//! `cinebook revision` compares the entity model with the live database,
//! renders whatever is missing (tables, then columns) as SQL for the connected
//! backend, and writes a new `mYYYYMMDD_HHMMSS_<slug>.rs` file next to the
//! migrator, registering it at the end of the history. The live database is
//! only read; `cinebook upgrade` is what applies the revision.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use migration::{MigrationName, Migrator, MigratorTrait, SchemaManager};
use sea_orm::sea_query::Table;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbBackend, DbErr, EntityTrait, IdenStatic, Iterable,
    Schema,
};
use thiserror::Error;
use tracing::info;

use crate::entity::{owner, owner_detail, owner_session};

pub const DEFAULT_MESSAGE: &str = "Auto generated migration";

const SLUG_MAX_LEN: usize = 40;

#[derive(Debug, Error)]
pub enum RevisionError {
    #[error("failed to inspect database schema: {0}")]
    Database(#[from] DbErr),

    #[error("failed to write revision: {0}")]
    Io(#[from] std::io::Error),

    #[error("migrator at {0} has no migrations list to extend")]
    MalformedMigrator(PathBuf),

    #[error("revision {0} already exists")]
    AlreadyExists(String),

    #[error("database is not at head ({0} pending revisions); run upgrade first")]
    NotAtHead(usize),

    #[error("revision {0} is registered but not built into this binary; rebuild and upgrade first")]
    Unbuilt(String),
}

/// One difference between the entity model and the live schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaChange {
    pub description: String,
    pub up: String,
    pub down: String,
}

#[derive(Debug, Clone)]
pub struct Revision {
    pub name: String,
    pub message: String,
    pub path: PathBuf,
    pub changes: Vec<SchemaChange>,
}

/// Lists what the entity model declares but the database lacks, in
/// dependency order.
pub async fn diff_schema(db: &DatabaseConnection) -> Result<Vec<SchemaChange>, DbErr> {
    let manager = SchemaManager::new(db);
    let backend = db.get_database_backend();
    let mut changes = Vec::new();

    diff_entity(&manager, backend, owner::Entity, &mut changes).await?;
    diff_entity(&manager, backend, owner_detail::Entity, &mut changes).await?;
    diff_entity(&manager, backend, owner_session::Entity, &mut changes).await?;

    Ok(changes)
}

async fn diff_entity<E: EntityTrait>(
    manager: &SchemaManager<'_>,
    backend: DbBackend,
    entity: E,
    changes: &mut Vec<SchemaChange>,
) -> Result<(), DbErr> {
    let schema = Schema::new(backend);
    let table = entity.table_name();

    if !manager.has_table(table).await? {
        changes.push(SchemaChange {
            description: format!("create table {table}"),
            up: backend.build(&schema.create_table_from_entity(entity)).sql,
            down: backend.build(&Table::drop().table(entity).to_owned()).sql,
        });
        return Ok(());
    }

    for column in E::Column::iter() {
        let name = column.as_str();
        if manager.has_column(table, name).await? {
            continue;
        }
        let add = Table::alter()
            .table(entity)
            .add_column(schema.get_column_def::<E>(column))
            .to_owned();
        let drop = Table::alter().table(entity).drop_column(column).to_owned();
        changes.push(SchemaChange {
            description: format!("add column {table}.{name}"),
            up: backend.build(&add).sql,
            down: backend.build(&drop).sql,
        });
    }

    Ok(())
}

/// Diffs the schema and writes a revision into `migration_dir`. Refuses to
/// run while revisions are pending or while `lib.rs` registers a revision
/// this binary was built without, since the diff would repeat them.
pub async fn generate(
    db: &DatabaseConnection,
    migration_dir: &Path,
    message: Option<&str>,
) -> Result<Revision, RevisionError> {
    let migrator = std::fs::read_to_string(migration_dir.join("lib.rs"))?;
    if let Some(name) = unbuilt_revisions(&migrator).into_iter().next() {
        return Err(RevisionError::Unbuilt(name));
    }

    let pending = Migrator::get_pending_migrations(db).await?.len();
    if pending > 0 {
        return Err(RevisionError::NotAtHead(pending));
    }

    let message = message.unwrap_or(DEFAULT_MESSAGE).to_owned();
    let changes = diff_schema(db).await?;
    let revision = write_revision(migration_dir, &message, changes, Utc::now())?;

    info!(
        name = %revision.name,
        path = %revision.path.display(),
        changes = revision.changes.len(),
        "generated revision"
    );
    Ok(revision)
}

/// Renders and registers a revision without touching any database.
pub fn write_revision(
    migration_dir: &Path,
    message: &str,
    changes: Vec<SchemaChange>,
    now: DateTime<Utc>,
) -> Result<Revision, RevisionError> {
    let name = revision_name(message, now);
    let path = migration_dir.join(format!("{name}.rs"));
    if path.exists() {
        return Err(RevisionError::AlreadyExists(name));
    }

    let lib_path = migration_dir.join("lib.rs");
    let migrator = std::fs::read_to_string(&lib_path)?;
    let migrator = register(&migrator, &name)
        .ok_or_else(|| RevisionError::MalformedMigrator(lib_path.clone()))?;

    std::fs::write(&path, render(message, &changes, now))?;
    std::fs::write(&lib_path, migrator)?;

    Ok(Revision {
        name,
        message: message.to_owned(),
        path,
        changes,
    })
}

/// Module names declared by a migrator `lib.rs`, in file order.
pub fn registered_revisions(migrator: &str) -> Vec<String> {
    migrator
        .lines()
        .filter_map(|line| line.trim().strip_prefix("mod "))
        .filter_map(|rest| rest.strip_suffix(';'))
        .filter(|name| name.starts_with('m'))
        .map(str::to_owned)
        .collect()
}

/// Registered revisions the compiled `Migrator` does not know about.
fn unbuilt_revisions(migrator: &str) -> Vec<String> {
    let built: Vec<String> = Migrator::migrations()
        .iter()
        .map(|migration| migration.name().to_owned())
        .collect();
    registered_revisions(migrator)
        .into_iter()
        .filter(|name| !built.contains(name))
        .collect()
}

pub fn revision_name(message: &str, now: DateTime<Utc>) -> String {
    format!("m{}_{}", now.format("%Y%m%d_%H%M%S"), slug(message))
}

fn slug(message: &str) -> String {
    let mut slug = String::new();
    for ch in message.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
        if slug.len() >= SLUG_MAX_LEN {
            break;
        }
    }
    let slug = slug.trim_end_matches('_');
    if slug.is_empty() {
        "revision".to_owned()
    } else {
        slug.to_owned()
    }
}

/// Source of the revision file.
pub fn render(message: &str, changes: &[SchemaChange], now: DateTime<Utc>) -> String {
    let mut out = String::new();
    for line in message.lines() {
        let _ = writeln!(out, "//! {line}");
    }
    if message.lines().next().is_none() {
        out.push_str("//!\n");
    }
    let _ = writeln!(out, "//!");
    let _ = writeln!(
        out,
        "//! Generated by `cinebook revision` at {}.",
        now.to_rfc3339()
    );
    out.push_str(
        "\nuse sea_orm_migration::prelude::*;\n\n\
         #[derive(DeriveMigrationName)]\n\
         pub struct Migration;\n\n\
         #[async_trait::async_trait]\n\
         impl MigrationTrait for Migration {\n",
    );

    let ups: Vec<_> = changes
        .iter()
        .map(|change| (change.description.as_str(), change.up.as_str()))
        .collect();
    let downs: Vec<_> = changes
        .iter()
        .rev()
        .map(|change| (change.description.as_str(), change.down.as_str()))
        .collect();

    render_step(&mut out, "up", &ups);
    out.push('\n');
    render_step(&mut out, "down", &downs);
    out.push_str("}\n");
    out
}

fn render_step(out: &mut String, step: &str, statements: &[(&str, &str)]) {
    if statements.is_empty() {
        let _ = writeln!(
            out,
            "    async fn {step}(&self, _manager: &SchemaManager) -> Result<(), DbErr> {{\n        Ok(())\n    }}"
        );
        return;
    }

    let _ = writeln!(
        out,
        "    async fn {step}(&self, manager: &SchemaManager) -> Result<(), DbErr> {{"
    );
    out.push_str("        let db = manager.get_connection();\n");
    for (description, sql) in statements {
        let _ = writeln!(out, "        // {description}");
        let _ = writeln!(out, "        db.execute_unprepared({sql:?}).await?;");
    }
    out.push_str("        Ok(())\n    }\n");
}

/// Appends `name` to the module list and the migrations vector of a
/// migrator `lib.rs`. Returns `None` when the file does not have that shape.
pub fn register(migrator: &str, name: &str) -> Option<String> {
    let lines: Vec<&str> = migrator.lines().collect();

    let mod_line = format!("mod {name};");
    let mod_at = match lines
        .iter()
        .rposition(|line| line.trim_start().starts_with("mod m"))
    {
        Some(idx) => idx + 1,
        None => lines
            .iter()
            .position(|line| line.trim_start().starts_with("pub struct Migrator"))?,
    };

    let vec_start = lines.iter().position(|line| line.trim_end().ends_with("vec!["))?;
    let vec_end = vec_start
        + lines[vec_start..]
            .iter()
            .position(|line| line.trim() == "]")?;
    let indent: String = lines[vec_end]
        .chars()
        .take_while(|ch| ch.is_whitespace())
        .collect();
    let entry = format!("{indent}    Box::new({name}::Migration),");

    let mut out = Vec::with_capacity(lines.len() + 3);
    for (idx, line) in lines.iter().enumerate() {
        if idx == mod_at {
            out.push(mod_line.clone());
            if !line.trim_start().starts_with("mod ") && !line.trim().is_empty() {
                out.push(String::new());
            }
        }
        if idx == vec_end {
            out.push(entry.clone());
        }
        out.push((*line).to_owned());
    }

    let mut rendered = out.join("\n");
    rendered.push('\n');
    Some(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const MIGRATOR: &str = "pub use sea_orm_migration::prelude::*;

mod m20240210_000001_create_owners_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240210_000001_create_owners_table::Migration),
        ]
    }
}
";

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 10, 20, 13, 40).unwrap()
    }

    #[test]
    fn name_uses_timestamp_and_slug() {
        assert_eq!(
            revision_name("Fix migrations", at()),
            "m20240210_201340_fix_migrations"
        );
        assert_eq!(
            revision_name("  add owner's  phone!! ", at()),
            "m20240210_201340_add_owner_s_phone"
        );
        assert_eq!(revision_name("???", at()), "m20240210_201340_revision");
    }

    #[test]
    fn slug_is_bounded() {
        let name = revision_name(&"a".repeat(200), at());
        assert_eq!(name.len(), "m20240210_201340_".len() + SLUG_MAX_LEN);
    }

    #[test]
    fn register_appends_module_and_entry() {
        let updated = register(MIGRATOR, "m20240210_201340_fix_migrations").unwrap();

        assert!(updated.contains(
            "mod m20240210_000001_create_owners_table;\nmod m20240210_201340_fix_migrations;\n"
        ));
        assert!(updated.contains(
            "            Box::new(m20240210_000001_create_owners_table::Migration),\n            Box::new(m20240210_201340_fix_migrations::Migration),\n        ]"
        ));
    }

    #[test]
    fn registered_revisions_follow_file_order() {
        let updated = register(MIGRATOR, "m20240210_201340_fix_migrations").unwrap();
        assert_eq!(
            registered_revisions(&updated),
            [
                "m20240210_000001_create_owners_table",
                "m20240210_201340_fix_migrations"
            ]
        );
    }

    #[test]
    fn register_rejects_unknown_layout() {
        assert_eq!(register("pub struct Migrator;\n", "m1"), None);
    }

    #[test]
    fn empty_diff_renders_noop_steps() {
        let source = render(DEFAULT_MESSAGE, &[], at());
        assert!(source.starts_with("//! Auto generated migration\n"));
        assert!(source.contains("async fn up(&self, _manager: &SchemaManager)"));
        assert!(source.contains("async fn down(&self, _manager: &SchemaManager)"));
        assert!(!source.contains("execute_unprepared"));
    }

    #[test]
    fn down_reverses_up() {
        let changes = vec![
            SchemaChange {
                description: "create table a".to_owned(),
                up: "CREATE TABLE \"a\" ()".to_owned(),
                down: "DROP TABLE \"a\"".to_owned(),
            },
            SchemaChange {
                description: "create table b".to_owned(),
                up: "CREATE TABLE \"b\" ()".to_owned(),
                down: "DROP TABLE \"b\"".to_owned(),
            },
        ];
        let source = render("two tables", &changes, at());

        let drop_b = source.find("DROP TABLE \\\"b\\\"").unwrap();
        let drop_a = source.find("DROP TABLE \\\"a\\\"").unwrap();
        let create_a = source.find("CREATE TABLE \\\"a\\\"").unwrap();
        assert!(create_a < drop_b);
        assert!(drop_b < drop_a);
    }
}
