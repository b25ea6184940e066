//! Client-side list state for the todo page.
//!
//! Mutations are applied locally before the server answers. Each one is
//! tracked as a pending action until it is either committed with the
//! server's record or rolled back to the state it replaced; settled actions
//! are forgotten. `TodoView` is the reference model for the script served by
//! [`crate::ui`], which performs the same transitions in the browser.

use std::collections::BTreeMap;

use crate::models::Todo;

pub type ActionId = u64;

/// The API call a pending action is waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Create { title: String },
    Toggle { id: i64, is_done: bool },
    Delete { id: i64 },
}

#[derive(Debug)]
enum Undo {
    Create { input: String },
    Toggle { previous: Todo },
    Delete { todo: Todo },
}

impl Undo {
    fn todo_id(&self) -> Option<i64> {
        match self {
            Undo::Create { .. } => None,
            Undo::Toggle { previous } => Some(previous.id),
            Undo::Delete { todo } => Some(todo.id),
        }
    }
}

#[derive(Debug)]
pub struct TodoView {
    todos: Vec<Todo>,
    input: String,
    loading: bool,
    last_error: Option<String>,
    pending: BTreeMap<ActionId, Undo>,
    next_action: ActionId,
}

impl Default for TodoView {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoView {
    /// A freshly mounted view: empty and waiting on the initial load.
    pub fn new() -> Self {
        Self {
            todos: Vec::new(),
            input: String::new(),
            loading: true,
            last_error: None,
            pending: BTreeMap::new(),
            next_action: 1,
        }
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_pending(&self, action: ActionId) -> bool {
        self.pending.contains_key(&action)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Whether some unsettled toggle or delete targets this item.
    pub fn is_busy(&self, id: i64) -> bool {
        self.pending.values().any(|undo| undo.todo_id() == Some(id))
    }

    pub fn begin_load(&mut self) {
        self.loading = true;
    }

    /// Applies the result of the list call. A failure leaves an empty list.
    pub fn finish_load(&mut self, result: Result<Vec<Todo>, String>) {
        self.loading = false;
        match result {
            Ok(todos) => self.todos = todos,
            Err(error) => {
                tracing::warn!(%error, "loading todos failed");
                self.todos.clear();
                self.last_error = Some(error);
            }
        }
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Starts a create from the input box. Blank input issues no request.
    pub fn submit(&mut self) -> Option<(ActionId, Request)> {
        let title = self.input.trim().to_string();
        if title.is_empty() {
            return None;
        }
        let input = std::mem::take(&mut self.input);
        let action = self.track(Undo::Create { input });
        Some((action, Request::Create { title }))
    }

    /// Flips the item locally and asks the server for the negated value.
    ///
    /// Returns `None` if the item is absent or already has an action in flight.
    pub fn begin_toggle(&mut self, id: i64) -> Option<(ActionId, Request)> {
        if self.is_busy(id) {
            return None;
        }
        let todo = self.todos.iter_mut().find(|todo| todo.id == id)?;
        let previous = todo.clone();
        todo.is_done = !todo.is_done;
        let is_done = todo.is_done;
        let action = self.track(Undo::Toggle { previous });
        Some((action, Request::Toggle { id, is_done }))
    }

    /// Removes the item locally. Same refusal rule as [`Self::begin_toggle`].
    pub fn begin_delete(&mut self, id: i64) -> Option<(ActionId, Request)> {
        if self.is_busy(id) {
            return None;
        }
        let index = self.todos.iter().position(|todo| todo.id == id)?;
        let todo = self.todos.remove(index);
        let action = self.track(Undo::Delete { todo });
        Some((action, Request::Delete { id }))
    }

    /// Settles a pending action with the record the server returned.
    ///
    /// Returns false if the action is unknown or already settled.
    pub fn commit(&mut self, action: ActionId, record: Todo) -> bool {
        let Some(undo) = self.pending.remove(&action) else {
            return false;
        };
        match undo {
            Undo::Create { .. } => self.insert_ordered(record),
            Undo::Toggle { .. } => {
                if let Some(todo) = self.todos.iter_mut().find(|todo| todo.id == record.id) {
                    *todo = record;
                }
            }
            Undo::Delete { .. } => {}
        }
        true
    }

    /// Reverts a pending action after the server rejected it or the call failed.
    pub fn rollback(&mut self, action: ActionId, error: impl Into<String>) -> bool {
        let Some(undo) = self.pending.remove(&action) else {
            return false;
        };
        let error = error.into();
        tracing::warn!(action, %error, "rolling back todo action");
        match undo {
            Undo::Create { input } => {
                if self.input.is_empty() {
                    self.input = input;
                }
            }
            Undo::Toggle { previous } => {
                if let Some(todo) = self.todos.iter_mut().find(|todo| todo.id == previous.id) {
                    *todo = previous;
                }
            }
            Undo::Delete { todo } => self.insert_ordered(todo),
        }
        self.last_error = Some(error);
        true
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    fn track(&mut self, undo: Undo) -> ActionId {
        let id = self.next_action;
        self.next_action += 1;
        self.pending.insert(id, undo);
        id
    }

    // Keeps the list in the server's `created_at DESC, id DESC` order.
    fn insert_ordered(&mut self, todo: Todo) {
        let key = (todo.created_at, todo.id);
        let index = self
            .todos
            .partition_point(|other| (other.created_at, other.id) > key);
        self.todos.insert(index, todo);
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn todo(id: i64, title: &str, is_done: bool) -> Todo {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, id as u32).unwrap();
        Todo {
            id,
            title: title.to_string(),
            is_done,
            created_at: at,
            updated_at: at,
        }
    }

    fn loaded(todos: Vec<Todo>) -> TodoView {
        let mut view = TodoView::new();
        view.finish_load(Ok(todos));
        view
    }

    #[test]
    fn starts_loading_and_settles_on_load() {
        let mut view = TodoView::new();
        assert!(view.is_loading());

        view.finish_load(Ok(vec![todo(1, "a", false)]));
        assert!(!view.is_loading());
        assert_eq!(view.todos().len(), 1);
    }

    #[test]
    fn failed_load_falls_back_to_empty() {
        let mut view = TodoView::new();
        view.finish_load(Err("HTTP 500".to_string()));

        assert!(!view.is_loading());
        assert!(view.todos().is_empty());
        assert_eq!(view.last_error(), Some("HTTP 500"));
    }

    #[test]
    fn blank_input_does_not_submit() {
        let mut view = loaded(vec![]);
        view.set_input("   ");
        assert!(view.submit().is_none());
        assert_eq!(view.pending_count(), 0);
    }

    #[test]
    fn create_commit_prepends_server_record() {
        let mut view = loaded(vec![todo(1, "old", false)]);
        view.set_input("  buy milk ");

        let (action, request) = view.submit().unwrap();
        assert_eq!(
            request,
            Request::Create {
                title: "buy milk".to_string()
            }
        );
        assert_eq!(view.input(), "");

        assert!(view.commit(action, todo(2, "buy milk", false)));
        assert_eq!(view.todos()[0].id, 2);
        assert!(!view.is_pending(action));
    }

    #[test]
    fn create_rollback_restores_input() {
        let mut view = loaded(vec![]);
        view.set_input("buy milk");
        let (action, _) = view.submit().unwrap();

        assert!(view.rollback(action, "HTTP 500"));
        assert_eq!(view.input(), "buy milk");
        assert!(view.todos().is_empty());
        assert_eq!(view.last_error(), Some("HTTP 500"));
    }

    #[test]
    fn toggle_is_optimistic_and_sends_negation() {
        let mut view = loaded(vec![todo(1, "a", false)]);

        let (action, request) = view.begin_toggle(1).unwrap();
        assert_eq!(request, Request::Toggle { id: 1, is_done: true });
        assert!(view.todos()[0].is_done);
        assert!(view.is_pending(action));

        let mut server = todo(1, "a", true);
        server.updated_at = server.updated_at + chrono::Duration::seconds(5);
        assert!(view.commit(action, server.clone()));
        assert_eq!(view.todos()[0], server);
    }

    #[test]
    fn failed_toggle_reverts_item() {
        let original = todo(1, "a", true);
        let mut view = loaded(vec![original.clone()]);

        let (action, _) = view.begin_toggle(1).unwrap();
        assert!(!view.todos()[0].is_done);

        assert!(view.rollback(action, "Todo not found"));
        assert_eq!(view.todos()[0], original);
        assert!(!view.is_pending(action));
    }

    #[test]
    fn failed_delete_reinserts_at_old_position() {
        let mut view = loaded(vec![todo(3, "c", false), todo(2, "b", false), todo(1, "a", false)]);

        let (action, request) = view.begin_delete(2).unwrap();
        assert_eq!(request, Request::Delete { id: 2 });
        let ids: Vec<i64> = view.todos().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 1]);

        view.rollback(action, "network error");
        let ids: Vec<i64> = view.todos().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn committed_delete_stays_removed() {
        let mut view = loaded(vec![todo(1, "a", false)]);
        let (action, _) = view.begin_delete(1).unwrap();

        assert!(view.commit(action, todo(1, "a", false)));
        assert!(view.todos().is_empty());
        assert_eq!(view.pending_count(), 0);
    }

    #[test]
    fn actions_settle_exactly_once() {
        let mut view = loaded(vec![todo(1, "a", false)]);
        let (action, _) = view.begin_toggle(1).unwrap();

        assert!(view.commit(action, todo(1, "a", true)));
        assert!(!view.rollback(action, "late failure"));
        assert!(view.todos()[0].is_done);
        assert!(view.last_error().is_none());

        assert!(!view.commit(999, todo(1, "a", false)));
    }

    #[test]
    fn unknown_items_start_no_action() {
        let mut view = loaded(vec![]);
        assert!(view.begin_toggle(5).is_none());
        assert!(view.begin_delete(5).is_none());
    }

    #[test]
    fn overlapping_delete_rollbacks_restore_list_order() {
        let mut view = loaded(vec![todo(3, "c", false), todo(2, "b", false), todo(1, "a", false)]);

        let (first, _) = view.begin_delete(3).unwrap();
        let (second, _) = view.begin_delete(2).unwrap();
        assert!(view.rollback(first, "HTTP 500"));
        assert!(view.rollback(second, "HTTP 500"));

        let ids: Vec<i64> = view.todos().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn settled_actions_are_not_retained() {
        let mut view = loaded(vec![todo(1, "a", false)]);
        for _ in 0..1000 {
            let (action, Request::Toggle { is_done, .. }) = view.begin_toggle(1).unwrap() else {
                panic!("toggle issued a different request");
            };
            assert!(view.commit(action, todo(1, "a", is_done)));
        }

        assert_eq!(view.pending_count(), 0);
        assert!(view.pending.is_empty());
    }

    #[test]
    fn busy_item_refuses_a_second_action() {
        let original = todo(1, "a", false);
        let mut view = loaded(vec![original.clone()]);

        let (toggle, _) = view.begin_toggle(1).unwrap();
        assert!(view.is_busy(1));
        assert!(view.begin_delete(1).is_none());
        assert!(view.begin_toggle(1).is_none());

        assert!(view.rollback(toggle, "HTTP 500"));
        assert_eq!(view.todos(), &[original]);
        assert!(!view.is_busy(1));
        assert!(view.begin_delete(1).is_some());
    }
}
