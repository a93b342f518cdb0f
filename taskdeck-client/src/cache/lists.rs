/// Pure list rewrites
///
/// Every cached list change goes through one of these functions. They take
/// the current list by reference and return a new one; the input is never
/// modified, so a reader holding the old list keeps a consistent view.
///
/// Entries are compared by [`Identified::id`], so the same rewrites serve id
/// lists and entity lists.

use taskdeck_shared::models::{EntityId, Identified};

/// Appends `item`, collapsing onto an existing entry with the same id
pub fn append<T: Identified + Clone>(list: &[T], item: T) -> Vec<T> {
    merge_by_id(list, std::slice::from_ref(&item))
}

/// Replaces the entry with id `id` by `item`, keeping its position
///
/// If `item` carries an id that is already elsewhere in the list, the two
/// collapse onto the first position.
pub fn replace_by_id<T: Identified + Clone>(list: &[T], id: &EntityId, item: T) -> Vec<T> {
    let replaced: Vec<T> = list
        .iter()
        .map(|existing| {
            if existing.id() == id {
                item.clone()
            } else {
                existing.clone()
            }
        })
        .collect();
    merge_by_id(&replaced, &[])
}

/// Drops every entry with id `id`
pub fn remove_by_id<T: Identified + Clone>(list: &[T], id: &EntityId) -> Vec<T> {
    list.iter()
        .filter(|existing| existing.id() != id)
        .cloned()
        .collect()
}

/// Concatenates `existing` and `incoming`, collapsing entries by id
///
/// The first occurrence of an id fixes its position; the last occurrence
/// supplies its value. Merging the same items twice yields the same list.
pub fn merge_by_id<T: Identified + Clone>(existing: &[T], incoming: &[T]) -> Vec<T> {
    let mut merged: Vec<T> = Vec::with_capacity(existing.len() + incoming.len());
    for item in existing.iter().chain(incoming) {
        match merged
            .iter()
            .position(|kept| kept.id() == item.id())
        {
            Some(index) => merged[index] = item.clone(),
            None => merged.push(item.clone()),
        }
    }
    merged
}

/// True if an entry with id `id` is present
pub fn contains<T: Identified>(list: &[T], id: &EntityId) -> bool {
    list.iter().any(|item| item.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use taskdeck_shared::models::Comment;

    fn ids(values: &[&str]) -> Vec<EntityId> {
        values.iter().map(|v| EntityId::from(*v)).collect()
    }

    fn comment(id: &str, content: &str) -> Comment {
        Comment {
            id: EntityId::from(id),
            content: content.to_string(),
            author_email: "a@example.com".to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_append_does_not_touch_input() {
        let list = ids(&["1", "2"]);
        let appended = append(&list, EntityId::from("3"));
        assert_eq!(appended, ids(&["1", "2", "3"]));
        assert_eq!(list, ids(&["1", "2"]));
    }

    #[test]
    fn test_append_existing_collapses() {
        let list = ids(&["1", "2"]);
        assert_eq!(append(&list, EntityId::from("1")), ids(&["1", "2"]));
    }

    #[test]
    fn test_replace_keeps_position() {
        let list = ids(&["1", "tmp-a", "3"]);
        let replaced = replace_by_id(&list, &EntityId::from("tmp-a"), EntityId::from("2"));
        assert_eq!(replaced, ids(&["1", "2", "3"]));
    }

    #[test]
    fn test_replace_with_present_id_collapses() {
        // a refetch already delivered "2" before the create answered
        let list = ids(&["1", "tmp-a", "2"]);
        let replaced = replace_by_id(&list, &EntityId::from("tmp-a"), EntityId::from("2"));
        assert_eq!(replaced, ids(&["1", "2"]));
    }

    #[test]
    fn test_remove_by_id() {
        let list = ids(&["1", "2", "3"]);
        assert_eq!(remove_by_id(&list, &EntityId::from("2")), ids(&["1", "3"]));
        assert_eq!(remove_by_id(&list, &EntityId::from("9")), list);
    }

    #[test]
    fn test_merge_by_id_is_idempotent() {
        let existing = vec![comment("1", "a"), comment("2", "b")];
        let incoming = vec![comment("2", "b2"), comment("3", "c")];

        let once = merge_by_id(&existing, &incoming);
        let twice = merge_by_id(&once, &incoming);

        assert_eq!(once, twice);
        let ids: Vec<&str> = once.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(once[1].content, "b2");
    }

    #[test]
    fn test_merge_collapses_duplicates_within_incoming() {
        let incoming = vec![comment("5", "x"), comment("5", "y")];
        let merged = merge_by_id(&[], &incoming);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].content, "y");
    }

    #[test]
    fn test_contains() {
        let list = ids(&["1"]);
        assert!(contains(&list, &EntityId::from("1")));
        assert!(!contains(&list, &EntityId::from("2")));
    }
}
