//! Write side: note upsert and tag-set replacement.
//!
//! Both operations run as one transaction in the store. The read-then-write
//! inside each is not locked beyond that transaction: two concurrent calls on
//! the same slot both succeed and the one committed last wins.

use std::{collections::HashSet, sync::Arc};

use crate::{
  Error, Result,
  calendar::{Note, SlotId, Tag, TagId},
  store::CalendarStore,
};

// ─── Tag reconciliation ──────────────────────────────────────────────────────

/// The changes that turn a slot's current tags into the requested set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagPlan {
  /// Existing tags to delete.
  pub remove: Vec<TagId>,
  /// Names to insert, in request order.
  pub add:    Vec<String>,
}

impl TagPlan {
  pub fn is_noop(&self) -> bool { self.remove.is_empty() && self.add.is_empty() }
}

/// Diff `existing` against `requested`.
///
/// Tags whose name is requested are kept (the first one, if the slot somehow
/// holds duplicates); every other existing tag is removed; requested names not
/// yet present are added once each.
pub fn reconcile_tags(existing: &[Tag], requested: &[String]) -> TagPlan {
  let wanted: HashSet<&str> = requested.iter().map(String::as_str).collect();

  let mut kept: HashSet<&str> = HashSet::new();
  let mut plan = TagPlan::default();
  for tag in existing {
    if wanted.contains(tag.name.as_str()) && kept.insert(tag.name.as_str()) {
      continue;
    }
    plan.remove.push(tag.id);
  }

  let mut queued: HashSet<&str> = HashSet::new();
  for name in requested {
    if !kept.contains(name.as_str()) && queued.insert(name.as_str()) {
      plan.add.push(name.clone());
    }
  }
  plan
}

// ─── Service ─────────────────────────────────────────────────────────────────

pub struct MutationService<S> {
  store: Arc<S>,
}

impl<S> Clone for MutationService<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S> MutationService<S>
where
  S: CalendarStore,
{
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Set the text of the slot's single note, creating the note if needed.
  pub async fn upsert_note(&self, slot_id: SlotId, text: Option<String>) -> Result<Note> {
    let note = self
      .store
      .upsert_note(slot_id, text)
      .await
      .map_err(|e| Error::mutation("upsert_note", e))?
      .ok_or(Error::SlotNotFound(slot_id))?;

    tracing::debug!(slot_id, note_id = note.id, "upserted note");
    Ok(note)
  }

  /// Make the slot's tag names exactly `tag_names` and return the result.
  pub async fn upsert_tags(&self, slot_id: SlotId, tag_names: Vec<String>) -> Result<Vec<Tag>> {
    let tags = self
      .store
      .replace_tags(slot_id, tag_names)
      .await
      .map_err(|e| Error::mutation("upsert_tags", e))?
      .ok_or(Error::SlotNotFound(slot_id))?;

    tracing::debug!(slot_id, count = tags.len(), "replaced tags");
    Ok(tags)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn tag(id: TagId, name: &str) -> Tag { Tag { id, slot_id: 1, name: name.into() } }

  fn names(list: &[&str]) -> Vec<String> { list.iter().map(|s| (*s).to_owned()).collect() }

  #[test]
  fn keeps_shared_removes_stale_adds_new() {
    let existing = [tag(1, "a"), tag(2, "b")];
    let plan = reconcile_tags(&existing, &names(&["b", "c"]));
    assert_eq!(plan.remove, vec![1]);
    assert_eq!(plan.add, names(&["c"]));
  }

  #[test]
  fn empty_request_removes_everything() {
    let existing = [tag(1, "a"), tag(2, "b")];
    let plan = reconcile_tags(&existing, &[]);
    assert_eq!(plan.remove, vec![1, 2]);
    assert!(plan.add.is_empty());
  }

  #[test]
  fn identical_sets_are_a_noop() {
    let existing = [tag(1, "work"), tag(2, "gym")];
    assert!(reconcile_tags(&existing, &names(&["gym", "work"])).is_noop());
  }

  #[test]
  fn duplicate_requested_names_are_added_once() {
    let plan = reconcile_tags(&[], &names(&["x", "y", "x"]));
    assert_eq!(plan.add, names(&["x", "y"]));
  }

  #[test]
  fn duplicate_existing_names_collapse_to_first() {
    let existing = [tag(4, "x"), tag(7, "x")];
    let plan = reconcile_tags(&existing, &names(&["x"]));
    assert_eq!(plan.remove, vec![7]);
    assert!(plan.add.is_empty());
  }

  #[test]
  fn names_are_case_sensitive() {
    let existing = [tag(1, "Work")];
    let plan = reconcile_tags(&existing, &names(&["work"]));
    assert_eq!(plan.remove, vec![1]);
    assert_eq!(plan.add, names(&["work"]));
  }
}
