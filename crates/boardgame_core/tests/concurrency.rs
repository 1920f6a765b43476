use boardgame_core::{
    open_catalog, Boardgame, Category, RepoError, RepoResult, StoreConfig, Value,
};
use std::thread;

const WORKERS: usize = 8;

#[test]
fn concurrent_deletes_of_same_row_succeed_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = open_catalog(&StoreConfig::new(dir.path().join("boardgames.db"))).unwrap();
    let category = Category::new("Cooperative");
    let id = catalog.add(&category).unwrap();

    let results: Vec<RepoResult<i64>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..WORKERS)
            .map(|_| scope.spawn(|| catalog.delete(&category, "categories", "name")))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    let deleted: Vec<_> = results.iter().filter_map(|result| result.as_ref().ok()).collect();
    assert_eq!(deleted, vec![&id]);
    assert!(results
        .iter()
        .filter_map(|result| result.as_ref().err())
        .all(|err| matches!(err, RepoError::NotFound { .. })));
}

#[test]
fn concurrent_identical_updates_converge_on_one_row() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = open_catalog(&StoreConfig::new(dir.path().join("boardgames.db"))).unwrap();
    let game = Boardgame::new("Spirit Island", 2017).with_players(1, 4);
    let id = catalog.add(&game).unwrap();

    let results: Vec<RepoResult<i64>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..WORKERS)
            .map(|_| {
                scope.spawn(|| {
                    catalog.update(
                        &game,
                        "boardgames",
                        "playing_time",
                        Value::Integer(120),
                        "title",
                    )
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    for result in results {
        assert_eq!(result.unwrap(), id);
    }
    let stored = catalog.find_by_natural_key(&game).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].playing_time, 120);
}

#[test]
fn concurrent_inserts_of_distinct_rows_all_commit() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = open_catalog(&StoreConfig::new(dir.path().join("boardgames.db"))).unwrap();

    thread::scope(|scope| {
        for worker in 0..WORKERS {
            let catalog = &catalog;
            scope.spawn(move || {
                catalog
                    .add(&Category::new(format!("category-{worker}")))
                    .unwrap();
            });
        }
    });

    for worker in 0..WORKERS {
        let found = catalog
            .find_by_natural_key(&Category::new(format!("category-{worker}")))
            .unwrap();
        assert_eq!(found.len(), 1);
    }
}
