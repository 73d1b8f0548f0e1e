//! Undo/redo history for annotation edits.
//!
//! Each undoable action is recorded as a [`Command`] holding enough data to
//! reverse itself. The store pushes commands after applying a mutation, and
//! replays them through [`Command::undo`] / [`Command::redo`].

use crate::constants::DEFAULT_UNDO_HISTORY;
use crate::model::Annotation;

/// A recorded, reversible change to the annotation list.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// An annotation was appended
    AddAnnotation { annotation: Annotation },
    /// An annotation was removed from `index`
    RemoveAnnotation { index: usize, annotation: Annotation },
    /// Fields of an annotation changed (geometry, label, text, ...)
    ModifyAnnotation { before: Annotation, after: Annotation },
    /// The whole list was replaced (import)
    ReplaceAll {
        before: Vec<Annotation>,
        after: Vec<Annotation>,
    },
}

impl Command {
    /// Human-readable description for menus and logs.
    pub fn description(&self) -> String {
        match self {
            Command::AddAnnotation { annotation } => {
                format!("Add {}", annotation.label.display_name())
            }
            Command::RemoveAnnotation { annotation, .. } => {
                format!("Delete {}", annotation.label.display_name())
            }
            Command::ModifyAnnotation { before, after } => {
                if before.label != after.label {
                    "Change label".to_string()
                } else if before.bbox != after.bbox {
                    "Move/resize annotation".to_string()
                } else {
                    "Edit annotation".to_string()
                }
            }
            Command::ReplaceAll { after, .. } => format!("Load {} annotations", after.len()),
        }
    }

    /// Reverse this command's effect on `annotations`.
    pub fn undo(&self, annotations: &mut Vec<Annotation>) {
        match self {
            Command::AddAnnotation { annotation } => {
                annotations.retain(|a| a.id != annotation.id);
            }
            Command::RemoveAnnotation { index, annotation } => {
                if !annotations.iter().any(|a| a.id == annotation.id) {
                    let index = (*index).min(annotations.len());
                    annotations.insert(index, annotation.clone());
                }
            }
            Command::ModifyAnnotation { before, .. } => replace_by_id(annotations, before),
            Command::ReplaceAll { before, .. } => *annotations = before.clone(),
        }
    }

    /// Re-apply this command's effect on `annotations`.
    pub fn redo(&self, annotations: &mut Vec<Annotation>) {
        match self {
            Command::AddAnnotation { annotation } => {
                if !annotations.iter().any(|a| a.id == annotation.id) {
                    annotations.push(annotation.clone());
                }
            }
            Command::RemoveAnnotation { annotation, .. } => {
                annotations.retain(|a| a.id != annotation.id);
            }
            Command::ModifyAnnotation { after, .. } => replace_by_id(annotations, after),
            Command::ReplaceAll { after, .. } => *annotations = after.clone(),
        }
    }
}

fn replace_by_id(annotations: &mut [Annotation], replacement: &Annotation) {
    if let Some(slot) = annotations.iter_mut().find(|a| a.id == replacement.id) {
        *slot = replacement.clone();
    }
}

/// Configuration for the undo stack
#[derive(Debug, Clone)]
pub struct UndoConfig {
    /// Maximum number of commands to keep in history
    pub max_history: usize,
}

impl Default for UndoConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_UNDO_HISTORY,
        }
    }
}

/// The undo/redo history stack.
///
/// Pushing a new command clears the redo stack. Undo moves the most recent
/// command to the redo stack and redo moves it back.
#[derive(Debug, Clone, Default)]
pub struct UndoStack {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    config: UndoConfig,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: UndoConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Record a command that has already been applied.
    pub fn push(&mut self, command: Command) {
        log::debug!("Undo: pushed '{}'", command.description());
        self.undo_stack.push(command);
        self.redo_stack.clear();

        if self.undo_stack.len() > self.config.max_history {
            let excess = self.undo_stack.len() - self.config.max_history;
            self.undo_stack.drain(..excess);
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Pop the command to undo; it moves to the redo stack.
    pub fn pop_undo(&mut self) -> Option<Command> {
        let cmd = self.undo_stack.pop()?;
        log::debug!("Undo: '{}'", cmd.description());
        self.redo_stack.push(cmd.clone());
        Some(cmd)
    }

    /// Pop the command to redo; it moves back to the undo stack.
    pub fn pop_redo(&mut self) -> Option<Command> {
        let cmd = self.redo_stack.pop()?;
        log::debug!("Redo: '{}'", cmd.description());
        self.undo_stack.push(cmd.clone());
        Some(cmd)
    }

    pub fn undo_description(&self) -> Option<String> {
        self.undo_stack.last().map(Command::description)
    }

    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.last().map(Command::description)
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        log::debug!("Undo history cleared");
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoundingBox, Label};

    fn ann(id: &str) -> Annotation {
        Annotation::new(id, 1, Label::Gpo, BoundingBox::new(0.0, 0.0, 10.0, 10.0))
    }

    #[test]
    fn test_push_clears_redo() {
        let mut stack = UndoStack::new();
        stack.push(Command::AddAnnotation { annotation: ann("a") });
        assert!(stack.pop_undo().is_some());
        assert!(stack.can_redo());

        stack.push(Command::AddAnnotation { annotation: ann("b") });
        assert!(!stack.can_redo());
        assert_eq!(stack.undo_count(), 1);
    }

    #[test]
    fn test_history_limit() {
        let mut stack = UndoStack::with_config(UndoConfig { max_history: 3 });
        for id in ["a", "b", "c", "d", "e"] {
            stack.push(Command::AddAnnotation { annotation: ann(id) });
        }
        assert_eq!(stack.undo_count(), 3);
        // Oldest entries were dropped
        match stack.pop_undo() {
            Some(Command::AddAnnotation { annotation }) => assert_eq!(annotation.id, "e"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_remove_undo_restores_position() {
        let mut list = vec![ann("a"), ann("b"), ann("c")];
        let removed = list.remove(1);
        let cmd = Command::RemoveAnnotation {
            index: 1,
            annotation: removed,
        };
        cmd.undo(&mut list);
        let ids: Vec<&str> = list.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);

        cmd.redo(&mut list);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_modify_round_trip() {
        let before = ann("a");
        let mut after = before.clone();
        after.bbox = BoundingBox::new(5.0, 5.0, 20.0, 20.0);
        let mut list = vec![after.clone()];

        let cmd = Command::ModifyAnnotation {
            before: before.clone(),
            after: after.clone(),
        };
        assert_eq!(cmd.description(), "Move/resize annotation");
        cmd.undo(&mut list);
        assert_eq!(list[0], before);
        cmd.redo(&mut list);
        assert_eq!(list[0], after);
    }
}
