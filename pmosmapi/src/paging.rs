//! Découpage paginé des listes SMAPI

use crate::model::{AbstractMedia, MediaList};
use std::ops::Range;

/// Plage `[index, index + count)` bornée à `len`
///
/// Un `index` au-delà de la fin donne une plage vide.
fn page_range(len: usize, index: usize, count: usize) -> Range<usize> {
    let start = index.min(len);
    let end = start.saturating_add(count).min(len);
    start..end
}

/// Au plus `count` éléments à partir de `index`
pub fn sub_list<T>(items: &[T], index: usize, count: usize) -> &[T] {
    &items[page_range(items.len(), index, count)]
}

/// Enveloppe paginée d'une collection complète
///
/// `index` est renvoyé tel que demandé, `count` vaut le nombre d'éléments
/// retournés et `total` la taille de la collection complète.
pub fn create_sub_list<T>(index: u32, count: u32, items: Vec<T>) -> MediaList
where
    T: Clone + Into<AbstractMedia>,
{
    let selected: Vec<AbstractMedia> = sub_list(&items, index as usize, count as usize)
        .iter()
        .cloned()
        .map(Into::into)
        .collect();

    MediaList {
        index,
        count: selected.len() as u32,
        total: items.len() as u32,
        items: selected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemType, MediaCollection};

    fn collections(n: usize) -> Vec<MediaCollection> {
        (0..n)
            .map(|i| MediaCollection::new(i.to_string(), ItemType::Container, format!("c{i}")))
            .collect()
    }

    #[test]
    fn test_sub_list_bounds() {
        let items = [1, 2, 3, 4, 5];
        assert_eq!(sub_list(&items, 0, 2), &[1, 2]);
        assert_eq!(sub_list(&items, 3, 10), &[4, 5]);
        assert_eq!(sub_list(&items, 5, 1), &[] as &[i32]);
        assert_eq!(sub_list(&items, 99, 1), &[] as &[i32]);
        assert_eq!(sub_list(&items, 1, 0), &[] as &[i32]);
        assert_eq!(sub_list(&items, 2, usize::MAX), &[3, 4, 5]);
    }

    #[test]
    fn test_create_sub_list_counts() {
        let list = create_sub_list(2, 3, collections(10));
        assert_eq!(list.index, 2);
        assert_eq!(list.count, 3);
        assert_eq!(list.total, 10);
        let ids: Vec<&str> = list.items.iter().map(|m| m.id()).collect();
        assert_eq!(ids, vec!["2", "3", "4"]);
    }

    #[test]
    fn test_create_sub_list_past_end() {
        let list = create_sub_list(12, 5, collections(10));
        assert_eq!(list.index, 12);
        assert_eq!(list.count, 0);
        assert_eq!(list.total, 10);
        assert!(list.items.is_empty());
    }

    #[test]
    fn test_create_sub_list_tail() {
        let list = create_sub_list(8, 100, collections(10));
        assert_eq!(list.count, 2);
        assert_eq!(list.total, 10);
    }
}
