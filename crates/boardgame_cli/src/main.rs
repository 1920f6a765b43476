//! CLI smoke entry point.
//!
//! # Responsibility
//! - Bootstrap a catalog file, seed the Gloomhaven sample and print it.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `boardgame_cli [DB_PATH]` (defaults to `boardgames.db`).

use boardgame_core::{
    default_log_level, init_logging_to, open_catalog, AssociationKeys, AssociationRepository,
    Boardgame, CatalogRepository, CatalogService, Category, Designer, Entity, LogTarget,
    Publisher, RepoResult, StoreConfig, Value, DEFAULT_DB_FILE_NAME,
};
use log::{error, info};
use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(err) = init_logging_to(default_log_level(), LogTarget::Stderr) {
        eprintln!("logging disabled: {err}");
    }

    let db_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_DB_FILE_NAME.to_string());

    match run(StoreConfig::new(db_path)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: StoreConfig) -> RepoResult<()> {
    let catalog = open_catalog(&config)?;
    println!("boardgame_core version={}", boardgame_core::core_version());
    println!("store={}", config.db_path.display());

    let publisher_id = ensure(&catalog, &Publisher::new("Cephalofair Games"))?;
    let game = Boardgame::new("Gloomhaven", 2017)
        .with_publisher(publisher_id)
        .with_players(1, 4)
        .with_playing_time(120, 14)
        .with_pricing(140.0, 50_000, 35.5);
    ensure(&catalog, &game)?;
    ensure(&catalog, &Designer::new("Isaac", "Childres"))?;
    ensure(&catalog, &Category::new("Adventure"))?;

    let outcome = catalog.insert_association(
        &AssociationKeys::new()
            .boardgame("Gloomhaven")
            .designer("Childres")
            .publisher("Cephalofair Games")
            .category("Adventure"),
    )?;
    info!("event=cli_seed module=cli status=ok association={outcome:?}");

    for stored in catalog.find_by_natural_key(&game)? {
        println!(
            "boardgame id={} title={} players={}-{} publisher_id={}",
            stored.id.unwrap_or_default(),
            stored.title,
            stored.min_players,
            stored.max_players,
            format_id(stored.publisher_id)
        );
    }
    for row in catalog.list_associations()? {
        println!(
            "association boardgame={} designer={} publisher={} artist={} category={}",
            format_id(row.boardgame_id),
            format_id(row.designer_id),
            format_id(row.publisher_id),
            format_id(row.artist_id),
            format_id(row.category_id)
        );
    }
    Ok(())
}

/// Returns the id of the row matching `entity`'s natural key, inserting it
/// first when absent.
fn ensure<E, R>(catalog: &CatalogService<R>, entity: &E) -> RepoResult<i64>
where
    E: Entity,
    R: CatalogRepository + AssociationRepository,
{
    let existing = catalog.fetch(entity, E::TABLE, Some(E::NATURAL_KEY))?;
    if let Some(Value::Integer(id)) = existing.first().and_then(|row| row.first()) {
        return Ok(*id);
    }
    catalog.add(entity)
}

fn format_id(id: Option<i64>) -> String {
    id.map_or_else(|| "null".to_string(), |id| id.to_string())
}
