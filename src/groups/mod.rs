use std::collections::HashSet;

use thiserror::Error;

/// A contiguous run of list items sharing a grouping key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub key: String,
    pub name: String,
    pub start_index: usize,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupingError {
    #[error("items keyed `{key}` are not contiguous; sort the list by its grouping key first")]
    NonContiguous { key: String },
}

/// Partition `items` into runs of equal keys, in first-seen order.
///
/// The list must already be sorted by the grouping key. A key that reappears
/// after its run ended is rejected instead of producing a split group.
pub fn generate_groups<T, F>(items: &[T], key_of: F) -> Result<Vec<Group>, GroupingError>
where
    F: Fn(&T) -> &str,
{
    let mut groups: Vec<Group> = Vec::new();
    let mut closed: HashSet<&str> = HashSet::new();

    for (index, item) in items.iter().enumerate() {
        let key = key_of(item);
        match groups.last_mut() {
            Some(current) if current.key == key => current.count += 1,
            _ => {
                if let Some(previous) = groups.last() {
                    let previous_key = items
                        .get(previous.start_index)
                        .map(&key_of)
                        .unwrap_or_default();
                    closed.insert(previous_key);
                }
                if closed.contains(key) {
                    return Err(GroupingError::NonContiguous {
                        key: key.to_string(),
                    });
                }
                groups.push(Group {
                    key: key.to_string(),
                    name: key.to_string(),
                    start_index: index,
                    count: 1,
                });
            }
        }
    }

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn keys(raw: &[&'static str]) -> Vec<&'static str> {
        raw.to_vec()
    }

    #[test]
    fn groups_consecutive_runs() {
        let items = keys(&["Groups", "Groups", "Mail", "Users", "Users", "Users"]);
        let groups = generate_groups(&items, |item| *item).unwrap();
        assert_eq!(
            groups,
            vec![
                Group { key: "Groups".into(), name: "Groups".into(), start_index: 0, count: 2 },
                Group { key: "Mail".into(), name: "Mail".into(), start_index: 2, count: 1 },
                Group { key: "Users".into(), name: "Users".into(), start_index: 3, count: 3 },
            ]
        );
    }

    #[test]
    fn ranges_reconstruct_the_list() {
        let items = keys(&["a", "b", "b", "c", "d", "d", "d", "e"]);
        let groups = generate_groups(&items, |item| *item).unwrap();
        let mut next = 0;
        for group in &groups {
            assert_eq!(group.start_index, next);
            assert!(items[group.start_index..group.start_index + group.count]
                .iter()
                .all(|item| *item == group.key));
            next += group.count;
        }
        assert_eq!(next, items.len());
    }

    #[test]
    fn empty_list_has_no_groups() {
        let items: Vec<&str> = Vec::new();
        assert!(generate_groups(&items, |item| *item).unwrap().is_empty());
    }

    #[test]
    fn unsorted_input_is_rejected() {
        let items = keys(&["Mail", "Users", "Mail"]);
        assert_eq!(
            generate_groups(&items, |item| *item),
            Err(GroupingError::NonContiguous { key: "Mail".into() })
        );
    }
}
