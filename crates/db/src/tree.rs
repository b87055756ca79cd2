//! Nested-set arithmetic for the location tree.
//!
//! The tree lives in one table with `lft`/`rgt` interval bounds; this
//! module owns the bound math as pure functions over plain integers so the
//! renumbering logic is testable without a database. `LocationRepository`
//! turns the plans produced here into range `UPDATE`s inside a single
//! serializable transaction per structural edit.

use thiserror::Error;

/// The interval bounds of one tree node, detached from its row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeBounds {
    /// Node ID.
    pub id: String,
    /// Left bound.
    pub lft: i64,
    /// Right bound.
    pub rgt: i64,
}

impl NodeBounds {
    /// Number of bound slots the node's subtree occupies.
    #[must_use]
    pub const fn width(&self) -> i64 {
        self.rgt - self.lft + 1
    }
}

/// Structural errors surfaced by bound validation and move planning.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    /// A node's left bound is not below its right bound.
    #[error("node {id} has inverted bounds ({lft}, {rgt})")]
    InvertedBounds {
        /// Offending node ID.
        id: String,
        /// Left bound.
        lft: i64,
        /// Right bound.
        rgt: i64,
    },

    /// Two nodes share a bound value.
    #[error("bound value {value} appears more than once")]
    DuplicateBound {
        /// The repeated bound value.
        value: i64,
    },

    /// Two intervals partially overlap instead of nesting.
    #[error("intervals of {a} and {b} overlap without nesting")]
    Overlap {
        /// First offending node ID.
        a: String,
        /// Second offending node ID.
        b: String,
    },

    /// A move would place a node under its own descendant.
    #[error("cannot move {node} under its own descendant {target}")]
    Cycle {
        /// Node being moved.
        node: String,
        /// Requested new parent.
        target: String,
    },
}

/// Whether `ancestor` strictly contains `node`.
#[must_use]
pub const fn is_ancestor(ancestor: &NodeBounds, node: &NodeBounds) -> bool {
    ancestor.lft < node.lft && ancestor.rgt > node.rgt
}

/// Derived depth of every node: the count of strict ancestors within
/// `nodes`. Returns depths parallel to the input slice.
///
/// When `nodes` is the whole tree this is the absolute depth (0 = country,
/// 1 = governorate, 2 = city); over a subtree slice it is depth relative to
/// the slice's outermost node.
#[must_use]
pub fn depths(nodes: &[NodeBounds]) -> Vec<u32> {
    let mut order: Vec<usize> = (0..nodes.len()).collect();
    order.sort_by_key(|&i| nodes[i].lft);

    let mut result = vec![0u32; nodes.len()];
    // Stack of open right bounds; its height when a node is reached is the
    // number of intervals containing it.
    let mut open: Vec<i64> = Vec::new();

    for &i in &order {
        let node = &nodes[i];
        while open.last().is_some_and(|&rgt| rgt < node.lft) {
            open.pop();
        }
        result[i] = open.len() as u32;
        open.push(node.rgt);
    }

    result
}

/// Check the nested-set invariants: bounds are ordered per node, globally
/// unique, and intervals either nest or are disjoint.
pub fn validate(nodes: &[NodeBounds]) -> Result<(), TreeError> {
    let mut bounds: Vec<i64> = Vec::with_capacity(nodes.len() * 2);
    for node in nodes {
        if node.lft >= node.rgt {
            return Err(TreeError::InvertedBounds {
                id: node.id.clone(),
                lft: node.lft,
                rgt: node.rgt,
            });
        }
        bounds.push(node.lft);
        bounds.push(node.rgt);
    }

    bounds.sort_unstable();
    for pair in bounds.windows(2) {
        if pair[0] == pair[1] {
            return Err(TreeError::DuplicateBound { value: pair[0] });
        }
    }

    let mut order: Vec<usize> = (0..nodes.len()).collect();
    order.sort_by_key(|&i| nodes[i].lft);

    // Walk in lft order keeping the stack of open intervals; a node whose
    // rgt escapes the enclosing interval is a partial overlap.
    let mut open: Vec<usize> = Vec::new();
    for &i in &order {
        let node = &nodes[i];
        while open
            .last()
            .is_some_and(|&j| nodes[j].rgt < node.lft)
        {
            open.pop();
        }
        if let Some(&j) = open.last()
            && node.rgt > nodes[j].rgt
        {
            return Err(TreeError::Overlap {
                a: nodes[j].id.clone(),
                b: node.id.clone(),
            });
        }
        open.push(i);
    }

    Ok(())
}

/// Renumbering plan for inserting a new leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertPlan {
    /// Left bound of the new leaf.
    pub lft: i64,
    /// Right bound of the new leaf.
    pub rgt: i64,
    /// Existing bounds `>=` this value shift by `+2` before the insert;
    /// `None` for a root append (nothing to shift).
    pub shift_from: Option<i64>,
}

/// Plan inserting a new leaf as the last child of `parent`.
#[must_use]
pub const fn plan_insert_under(parent: &NodeBounds) -> InsertPlan {
    InsertPlan {
        lft: parent.rgt,
        rgt: parent.rgt + 1,
        shift_from: Some(parent.rgt),
    }
}

/// Plan inserting a new root after the current maximum right bound.
#[must_use]
pub const fn plan_insert_root(max_rgt: i64) -> InsertPlan {
    InsertPlan {
        lft: max_rgt + 1,
        rgt: max_rgt + 2,
        shift_from: None,
    }
}

/// Renumbering plan for deleting a whole subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePlan {
    /// Width of the removed subtree.
    pub width: i64,
    /// Bounds `>` this value shift by `-width` after the delete.
    pub shift_after: i64,
}

/// Plan deleting `node` and its whole subtree.
#[must_use]
pub const fn plan_delete(node: &NodeBounds) -> DeletePlan {
    DeletePlan {
        width: node.width(),
        shift_after: node.rgt,
    }
}

/// Renumbering plan for moving a subtree under a new parent.
///
/// Execution order: negate the subtree's bounds (detach), close the gap it
/// left (`-width` for bounds past `subtree_rgt`), open a gap of `width` at
/// `dest_lft`, then reattach negated rows with `bound = -bound + delta`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    /// Left bound of the moved subtree (pre-move numbering).
    pub subtree_lft: i64,
    /// Right bound of the moved subtree (pre-move numbering).
    pub subtree_rgt: i64,
    /// Width of the moved subtree.
    pub width: i64,
    /// Left bound the subtree will occupy, in post-gap-close numbering.
    pub dest_lft: i64,
    /// Offset applied when reattaching the negated rows.
    pub delta: i64,
}

/// Plan moving `node` (with its subtree) to become the last child of
/// `new_parent`. Fails if `new_parent` lies inside the moved subtree.
pub fn plan_move(node: &NodeBounds, new_parent: &NodeBounds) -> Result<MovePlan, TreeError> {
    if new_parent.lft >= node.lft && new_parent.rgt <= node.rgt {
        return Err(TreeError::Cycle {
            node: node.id.clone(),
            target: new_parent.id.clone(),
        });
    }

    let width = node.width();

    // Where the parent's right bound sits once the subtree's gap is closed.
    let parent_rgt = if new_parent.rgt > node.rgt {
        new_parent.rgt - width
    } else {
        new_parent.rgt
    };

    Ok(MovePlan {
        subtree_lft: node.lft,
        subtree_rgt: node.rgt,
        width,
        dest_lft: parent_rgt,
        delta: parent_rgt - node.lft,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, lft: i64, rgt: i64) -> NodeBounds {
        NodeBounds {
            id: id.to_string(),
            lft,
            rgt,
        }
    }

    /// Egypt(1,8) > Cairo(2,7) > Maadi(3,4), Nasr City(5,6).
    fn small_tree() -> Vec<NodeBounds> {
        vec![
            node("egypt", 1, 8),
            node("cairo", 2, 7),
            node("maadi", 3, 4),
            node("nasr", 5, 6),
        ]
    }

    /// Apply an insert plan to an in-memory arena, returning the new arena.
    fn apply_insert(mut arena: Vec<NodeBounds>, plan: &InsertPlan, id: &str) -> Vec<NodeBounds> {
        if let Some(from) = plan.shift_from {
            for n in &mut arena {
                if n.lft >= from {
                    n.lft += 2;
                }
                if n.rgt >= from {
                    n.rgt += 2;
                }
            }
        }
        arena.push(node(id, plan.lft, plan.rgt));
        arena
    }

    fn apply_delete(arena: Vec<NodeBounds>, target: &NodeBounds) -> Vec<NodeBounds> {
        let plan = plan_delete(target);
        let mut kept: Vec<NodeBounds> = arena
            .into_iter()
            .filter(|n| n.lft < target.lft || n.rgt > target.rgt)
            .collect();
        for n in &mut kept {
            if n.lft > plan.shift_after {
                n.lft -= plan.width;
            }
            if n.rgt > plan.shift_after {
                n.rgt -= plan.width;
            }
        }
        kept
    }

    fn apply_move(mut arena: Vec<NodeBounds>, plan: &MovePlan) -> Vec<NodeBounds> {
        // Detach: negate the subtree.
        for n in &mut arena {
            if n.lft >= plan.subtree_lft && n.rgt <= plan.subtree_rgt {
                n.lft = -n.lft;
                n.rgt = -n.rgt;
            }
        }
        // Close the gap.
        for n in &mut arena {
            if n.lft > plan.subtree_rgt {
                n.lft -= plan.width;
            }
            if n.rgt > plan.subtree_rgt {
                n.rgt -= plan.width;
            }
        }
        // Open a gap at the destination.
        for n in &mut arena {
            if n.lft >= plan.dest_lft {
                n.lft += plan.width;
            }
            if n.rgt >= plan.dest_lft {
                n.rgt += plan.width;
            }
        }
        // Reattach.
        for n in &mut arena {
            if n.lft < 0 {
                n.lft = -n.lft + plan.delta;
                n.rgt = -n.rgt + plan.delta;
            }
        }
        arena
    }

    fn depth_by_id(arena: &[NodeBounds], id: &str) -> u32 {
        let ds = depths(arena);
        arena
            .iter()
            .position(|n| n.id == id)
            .map(|i| ds[i])
            .unwrap()
    }

    #[test]
    fn test_depths_classify_each_level_once() {
        let arena = small_tree();
        assert_eq!(depths(&arena), vec![0, 1, 2, 2]);
    }

    #[test]
    fn test_depths_with_two_roots() {
        let arena = vec![
            node("egypt", 1, 4),
            node("cairo", 2, 3),
            node("jordan", 5, 6),
        ];
        assert_eq!(depths(&arena), vec![0, 1, 0]);
    }

    #[test]
    fn test_is_ancestor_is_strict() {
        let arena = small_tree();
        assert!(is_ancestor(&arena[0], &arena[2]));
        assert!(is_ancestor(&arena[1], &arena[2]));
        assert!(!is_ancestor(&arena[2], &arena[2]));
        assert!(!is_ancestor(&arena[2], &arena[1]));
        // Siblings contain each other in neither direction.
        assert!(!is_ancestor(&arena[2], &arena[3]));
        assert!(!is_ancestor(&arena[3], &arena[2]));
    }

    #[test]
    fn test_validate_accepts_well_formed_tree() {
        assert_eq!(validate(&small_tree()), Ok(()));
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let arena = vec![node("bad", 5, 2)];
        assert!(matches!(
            validate(&arena),
            Err(TreeError::InvertedBounds { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_bound() {
        let arena = vec![node("a", 1, 4), node("b", 4, 6)];
        assert_eq!(
            validate(&arena),
            Err(TreeError::DuplicateBound { value: 4 })
        );
    }

    #[test]
    fn test_validate_rejects_partial_overlap() {
        // (1,5) and (3,8) overlap without nesting — the corruption an
        // interleaved renumbering would produce.
        let arena = vec![node("a", 1, 5), node("b", 3, 8)];
        assert!(matches!(validate(&arena), Err(TreeError::Overlap { .. })));
    }

    #[test]
    fn test_insert_under_parent_keeps_tree_valid() {
        let arena = small_tree();
        let cairo = arena[1].clone();

        let plan = plan_insert_under(&cairo);
        assert_eq!(plan, InsertPlan { lft: 7, rgt: 8, shift_from: Some(7) });

        let arena = apply_insert(arena, &plan, "zamalek");
        validate(&arena).unwrap();
        assert_eq!(depth_by_id(&arena, "zamalek"), 2);
        // Egypt's interval widened around the insert.
        assert_eq!(arena[0], node("egypt", 1, 10));
    }

    #[test]
    fn test_insert_root_appends_after_max_bound() {
        let arena = small_tree();
        let plan = plan_insert_root(8);
        assert_eq!(plan, InsertPlan { lft: 9, rgt: 10, shift_from: None });

        let arena = apply_insert(arena, &plan, "jordan");
        validate(&arena).unwrap();
        assert_eq!(depth_by_id(&arena, "jordan"), 0);
    }

    #[test]
    fn test_delete_subtree_closes_the_gap() {
        let arena = small_tree();
        let cairo = arena[1].clone();

        let arena = apply_delete(arena, &cairo);
        validate(&arena).unwrap();
        assert_eq!(arena.len(), 1);
        assert_eq!(arena[0], node("egypt", 1, 2));
    }

    #[test]
    fn test_move_subtree_to_new_parent() {
        // Add a second country and move Cairo (with its areas) under it.
        let mut arena = small_tree();
        arena.push(node("jordan", 9, 10));
        let cairo = arena[1].clone();
        let jordan = arena[4].clone();

        let plan = plan_move(&cairo, &jordan).unwrap();
        let arena = apply_move(arena, &plan);

        validate(&arena).unwrap();
        assert_eq!(depth_by_id(&arena, "cairo"), 1);
        assert_eq!(depth_by_id(&arena, "maadi"), 2);
        assert_eq!(depth_by_id(&arena, "egypt"), 0);

        let jordan_after = arena.iter().find(|n| n.id == "jordan").unwrap();
        let cairo_after = arena.iter().find(|n| n.id == "cairo").unwrap();
        assert!(is_ancestor(jordan_after, cairo_after));
    }

    #[test]
    fn test_move_backward_within_tree() {
        // Move Nasr City under Maadi (destination left of the subtree).
        let arena = small_tree();
        let nasr = arena[3].clone();
        let maadi = arena[2].clone();

        let plan = plan_move(&nasr, &maadi).unwrap();
        let arena = apply_move(arena, &plan);

        validate(&arena).unwrap();
        assert_eq!(depth_by_id(&arena, "nasr"), 3);
        let maadi_after = arena.iter().find(|n| n.id == "maadi").unwrap();
        let nasr_after = arena.iter().find(|n| n.id == "nasr").unwrap();
        assert!(is_ancestor(maadi_after, nasr_after));
    }

    #[test]
    fn test_move_under_own_descendant_is_rejected() {
        let arena = small_tree();
        let cairo = arena[1].clone();
        let maadi = arena[2].clone();

        assert_eq!(
            plan_move(&cairo, &maadi),
            Err(TreeError::Cycle {
                node: "cairo".to_string(),
                target: "maadi".to_string(),
            })
        );
    }
}
