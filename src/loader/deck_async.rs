//! Async deck loading
//!
//! Reads every deck file concurrently on the tokio runtime. Parsing is
//! cheap; the point is not to serialize file I/O when a pod lists many
//! decks.

use crate::loader::deck::{DeckList, DeckLoader};
use crate::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::Instant;

/// Load one deck list
pub async fn load_deck_async(path: &Path) -> Result<DeckList> {
    let content = tokio::fs::read_to_string(path).await?;
    let mut list = DeckLoader::parse(&content)?;
    if list.name.is_none() {
        list.name = path.file_stem().map(|s| s.to_string_lossy().into_owned());
    }
    Ok(list)
}

/// Load all deck lists in parallel, keeping the input order
///
/// Returns the lists and how long loading took.
pub async fn load_decks(paths: &[PathBuf]) -> Result<(Vec<DeckList>, Duration)> {
    let start = Instant::now();
    let handles: Vec<_> = paths
        .iter()
        .cloned()
        .map(|path| tokio::spawn(async move { load_deck_async(&path).await }))
        .collect();

    let mut lists = Vec::with_capacity(handles.len());
    for handle in handles {
        lists.push(handle.await??);
    }
    Ok((lists, start.elapsed()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SimError;

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let result = load_deck_async(Path::new("test_decks/does_not_exist.dck")).await;
        assert!(matches!(result, Err(SimError::IoError(_))));
    }

    #[tokio::test]
    async fn test_load_decks_keeps_order() {
        let paths = vec![
            PathBuf::from("test_decks/green_stompy.dck"),
            PathBuf::from("test_decks/red_burn.dck"),
        ];
        let (lists, _) = load_decks(&paths).await.unwrap();
        assert_eq!(lists.len(), 2);
        assert_eq!(lists[0].name.as_deref(), Some("Green Stompy"));
        assert_eq!(lists[1].name.as_deref(), Some("Red Burn"));
    }
}
