//! Rendering of member trees for terminal display.

use generational_arena::Index;
use termtree::Tree;

use crate::domain::MemberArena;

pub trait TreeDisplay {
    fn to_tree_string(&self) -> Tree<String>;
}

fn label(arena: &MemberArena, idx: Index) -> String {
    arena
        .get(idx)
        .map(|m| format!("{} <{}> [{}]", m.name, m.email, m.id()))
        .unwrap_or_default()
}

impl TreeDisplay for MemberArena {
    fn to_tree_string(&self) -> Tree<String> {
        if let Some(root_idx) = self.root() {
            let mut tree = Tree::new(label(self, root_idx));

            fn build_tree(arena: &MemberArena, idx: Index, parent_tree: &mut Tree<String>) {
                for &child_idx in arena.employees_of(idx) {
                    let mut child_tree = Tree::new(label(arena, child_idx));
                    build_tree(arena, child_idx, &mut child_tree);
                    parent_tree.push(child_tree);
                }
            }

            build_tree(self, root_idx, &mut tree);
            tree
        } else {
            Tree::new("Empty team".to_string())
        }
    }
}
