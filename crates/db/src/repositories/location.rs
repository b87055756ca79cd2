//! Location repository.
//!
//! Read side: depth classification, ancestor-at-depth lookup and subtree
//! listing over the nested-set bounds, all masked to active nodes by
//! default. Write side: structural tree edits (insert/move/delete) that
//! renumber bounds inside one serializable transaction each and assert the
//! interval invariants before committing.

use std::sync::Arc;

use crm_common::{AppError, AppResult};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, IsolationLevel, Order, PaginatorTrait, QueryFilter, QueryOrder, Select, Set,
    TransactionTrait,
};

use crate::entities::location::{self, LocationStatus};
use crate::entities::{Client, Contact, Location, client, contact};
use crate::tree::{self, NodeBounds};

/// Depth of country nodes.
pub const DEPTH_COUNTRY: u32 = 0;
/// Depth of governorate nodes.
pub const DEPTH_GOVERNORATE: u32 = 1;
/// Depth of city nodes.
pub const DEPTH_CITY: u32 = 2;

/// Repository for the location tree.
#[derive(Clone)]
pub struct LocationRepository {
    db: Arc<DatabaseConnection>,
}

impl LocationRepository {
    /// Create a new location repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    fn bounds_of(node: &location::Model) -> NodeBounds {
        NodeBounds {
            id: node.id.clone(),
            lft: node.lft,
            rgt: node.rgt,
        }
    }

    /// Query for active children of `parent_id`, ordered by left bound.
    fn children_query(parent_id: &str) -> Select<Location> {
        Location::find()
            .filter(location::Column::ParentId.eq(parent_id))
            .filter(location::Column::Status.eq(LocationStatus::Active))
            .order_by(location::Column::Lft, Order::Asc)
    }

    /// Query for the strict ancestors of a bounds interval, outermost
    /// first. Deliberately unmasked: the chain index is the ancestor's
    /// true depth only if inactive nodes are not dropped from it.
    fn ancestors_query(lft: i64, rgt: i64) -> Select<Location> {
        Location::find()
            .filter(location::Column::Lft.lt(lft))
            .filter(location::Column::Rgt.gt(rgt))
            .order_by(location::Column::Lft, Order::Asc)
    }

    /// Query for the strict descendants of a bounds interval, unmasked,
    /// ordered by left bound.
    fn descendants_query(lft: i64, rgt: i64) -> Select<Location> {
        Location::find()
            .filter(location::Column::Lft.gt(lft))
            .filter(location::Column::Rgt.lt(rgt))
            .order_by(location::Column::Lft, Order::Asc)
    }

    /// Find a location by ID. Direct lookup does not mask status.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<location::Model>> {
        Location::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Load the whole tree ordered by left bound, regardless of status.
    async fn load_tree(&self) -> AppResult<Vec<location::Model>> {
        Location::find()
            .order_by(location::Column::Lft, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Active nodes whose derived depth equals `depth`, in tree order.
    ///
    /// Depth is the count of strict ancestors, computed over the full tree
    /// so inactive ancestors still count; the status mask is applied to
    /// the result set only.
    pub async fn at_depth(&self, depth: u32) -> AppResult<Vec<location::Model>> {
        let rows = self.load_tree().await?;
        let bounds: Vec<NodeBounds> = rows.iter().map(Self::bounds_of).collect();
        let depths = tree::depths(&bounds);

        Ok(rows
            .into_iter()
            .zip(depths)
            .filter(|(node, d)| *d == depth && node.status == LocationStatus::Active)
            .map(|(node, _)| node)
            .collect())
    }

    /// All active countries (depth 0).
    pub async fn countries(&self) -> AppResult<Vec<location::Model>> {
        self.at_depth(DEPTH_COUNTRY).await
    }

    /// All active governorates (depth 1).
    pub async fn governorates(&self) -> AppResult<Vec<location::Model>> {
        self.at_depth(DEPTH_GOVERNORATE).await
    }

    /// All active cities (depth 2).
    pub async fn cities(&self) -> AppResult<Vec<location::Model>> {
        self.at_depth(DEPTH_CITY).await
    }

    /// The unique depth-1 ancestor of `id`, or `None`.
    ///
    /// `None` is the expected outcome for nodes at depth ≤ 1, for unknown
    /// IDs, and for an inactive ancestor (default status mask).
    pub async fn city_ancestor_of(&self, id: &str) -> AppResult<Option<location::Model>> {
        let Some(node) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let chain = Self::ancestors_query(node.lft, node.rgt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // The chain is outermost-first, so index == depth.
        Ok(chain
            .into_iter()
            .nth(DEPTH_GOVERNORATE as usize)
            .filter(|ancestor| ancestor.status == LocationStatus::Active))
    }

    /// Active direct children of `parent_id`, in tree order.
    pub async fn children_of(&self, parent_id: &str) -> AppResult<Vec<location::Model>> {
        Self::children_query(parent_id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Active descendants of `id` in tree order, optionally capped at
    /// `max_depth` levels below the node. Unknown IDs yield an empty list.
    pub async fn descendants_of(
        &self,
        id: &str,
        max_depth: Option<u32>,
    ) -> AppResult<Vec<location::Model>> {
        let Some(node) = self.find_by_id(id).await? else {
            return Ok(Vec::new());
        };

        let rows = Self::descendants_query(node.lft, node.rgt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // Relative depth within the subtree: 0 = direct child.
        let bounds: Vec<NodeBounds> = rows.iter().map(Self::bounds_of).collect();
        let depths = tree::depths(&bounds);

        Ok(rows
            .into_iter()
            .zip(depths)
            .filter(|(desc, d)| {
                desc.status == LocationStatus::Active
                    && max_depth.is_none_or(|cap| *d < cap)
            })
            .map(|(desc, _)| desc)
            .collect())
    }

    /// Toggle a node's status. Plain column update, no renumbering.
    pub async fn set_status(
        &self,
        id: &str,
        status: LocationStatus,
    ) -> AppResult<location::Model> {
        let node = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Location not found: {id}")))?;

        let mut active: location::ActiveModel = node.into();
        active.status = Set(status);
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a new leaf node, as last child of `parent_id` or as a new
    /// root when `parent_id` is `None`.
    pub async fn insert(
        &self,
        id: String,
        title: String,
        parent_id: Option<String>,
    ) -> AppResult<location::Model> {
        let txn = self.begin_structural().await?;

        let plan = match &parent_id {
            Some(pid) => {
                let parent = Location::find_by_id(pid)
                    .one(&txn)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?
                    .ok_or_else(|| AppError::NotFound(format!("Location not found: {pid}")))?;
                tree::plan_insert_under(&Self::bounds_of(&parent))
            }
            None => {
                let max_rgt = Location::find()
                    .order_by(location::Column::Rgt, Order::Desc)
                    .one(&txn)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?
                    .map_or(0, |n| n.rgt);
                tree::plan_insert_root(max_rgt)
            }
        };

        if let Some(from) = plan.shift_from {
            Self::shift_bounds(&txn, location::Column::Lft, from, 2).await?;
            Self::shift_bounds(&txn, location::Column::Rgt, from, 2).await?;
        }

        let model = location::ActiveModel {
            id: Set(id),
            title: Set(title),
            status: Set(LocationStatus::Active),
            parent_id: Set(parent_id),
            lft: Set(plan.lft),
            rgt: Set(plan.rgt),
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Self::assert_valid(&txn).await?;
        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(model)
    }

    /// Move a node (with its whole subtree) to become the last child of
    /// `new_parent_id`.
    pub async fn move_node(&self, id: &str, new_parent_id: &str) -> AppResult<location::Model> {
        let txn = self.begin_structural().await?;

        let node = Location::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Location not found: {id}")))?;
        let parent = Location::find_by_id(new_parent_id)
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| {
                AppError::NotFound(format!("Location not found: {new_parent_id}"))
            })?;

        let plan = tree::plan_move(&Self::bounds_of(&node), &Self::bounds_of(&parent))
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        // Detach: negate the subtree's bounds so the shifts below skip it.
        Location::update_many()
            .col_expr(
                location::Column::Lft,
                Expr::col(location::Column::Lft).mul(-1),
            )
            .col_expr(
                location::Column::Rgt,
                Expr::col(location::Column::Rgt).mul(-1),
            )
            .filter(location::Column::Lft.gte(plan.subtree_lft))
            .filter(location::Column::Rgt.lte(plan.subtree_rgt))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // Close the gap the subtree left behind.
        Self::shift_bounds_after(&txn, location::Column::Lft, plan.subtree_rgt, -plan.width)
            .await?;
        Self::shift_bounds_after(&txn, location::Column::Rgt, plan.subtree_rgt, -plan.width)
            .await?;

        // Open a gap at the destination.
        Self::shift_bounds(&txn, location::Column::Lft, plan.dest_lft, plan.width).await?;
        Self::shift_bounds(&txn, location::Column::Rgt, plan.dest_lft, plan.width).await?;

        // Reattach the negated subtree at its new position.
        Location::update_many()
            .col_expr(
                location::Column::Lft,
                Expr::col(location::Column::Lft).mul(-1).add(plan.delta),
            )
            .col_expr(
                location::Column::Rgt,
                Expr::col(location::Column::Rgt).mul(-1).add(plan.delta),
            )
            .filter(location::Column::Lft.lt(0))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut active: location::ActiveModel = node.into();
        active.parent_id = Set(Some(new_parent_id.to_string()));
        active
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Self::assert_valid(&txn).await?;
        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // Bounds changed under the row update; re-read for fresh values.
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Location not found: {id}")))
    }

    /// Delete a node and its whole subtree, closing the bound gap.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let txn = self.begin_structural().await?;

        let node = Location::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Location not found: {id}")))?;

        let plan = tree::plan_delete(&Self::bounds_of(&node));

        // The client/contact foreign keys are RESTRICT; surface the blocker
        // as a conflict instead of letting the constraint fire.
        let subtree_ids: Vec<String> = Location::find()
            .filter(location::Column::Lft.gte(node.lft))
            .filter(location::Column::Rgt.lte(node.rgt))
            .all(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .into_iter()
            .map(|n| n.id)
            .collect();

        let referencing_clients = Client::find()
            .filter(client::Column::LocationId.is_in(subtree_ids.clone()))
            .count(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        if referencing_clients > 0 {
            return Err(AppError::Conflict(format!(
                "Cannot delete location {id}: {referencing_clients} client(s) reference its subtree"
            )));
        }

        let referencing_contacts = Contact::find()
            .filter(contact::Column::LocationId.is_in(subtree_ids))
            .count(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        if referencing_contacts > 0 {
            return Err(AppError::Conflict(format!(
                "Cannot delete location {id}: {referencing_contacts} contact(s) reference its subtree"
            )));
        }

        Location::delete_many()
            .filter(location::Column::Lft.gte(node.lft))
            .filter(location::Column::Rgt.lte(node.rgt))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Self::shift_bounds_after(&txn, location::Column::Lft, plan.shift_after, -plan.width)
            .await?;
        Self::shift_bounds_after(&txn, location::Column::Rgt, plan.shift_after, -plan.width)
            .await?;

        Self::assert_valid(&txn).await?;
        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Begin the serializable transaction every structural edit runs in.
    /// Interleaved renumbering would corrupt the intervals, so writes to
    /// the tree are serialized at the database.
    async fn begin_structural(&self) -> AppResult<DatabaseTransaction> {
        self.db
            .begin_with_config(Some(IsolationLevel::Serializable), None)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Shift one bound column by `delta` for all rows with `column >= from`.
    async fn shift_bounds<C: ConnectionTrait>(
        conn: &C,
        column: location::Column,
        from: i64,
        delta: i64,
    ) -> AppResult<()> {
        Location::update_many()
            .col_expr(column, Expr::col(column).add(delta))
            .filter(column.gte(from))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Shift one bound column by `delta` for all rows with `column > after`.
    async fn shift_bounds_after<C: ConnectionTrait>(
        conn: &C,
        column: location::Column,
        after: i64,
        delta: i64,
    ) -> AppResult<()> {
        Location::update_many()
            .col_expr(column, Expr::col(column).add(delta))
            .filter(column.gt(after))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Re-check the nested-set invariants over the whole tree before a
    /// structural edit commits.
    async fn assert_valid<C: ConnectionTrait>(conn: &C) -> AppResult<()> {
        let rows = Location::find()
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let bounds: Vec<NodeBounds> = rows.iter().map(Self::bounds_of).collect();
        tree::validate(&bounds).map_err(|e| AppError::TreeIntegrity(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, DbBackend, MockDatabase, QueryTrait, Value};

    fn loc(
        id: &str,
        title: &str,
        parent: Option<&str>,
        lft: i64,
        rgt: i64,
        status: LocationStatus,
    ) -> location::Model {
        location::Model {
            id: id.to_string(),
            title: title.to_string(),
            status,
            parent_id: parent.map(ToString::to_string),
            lft,
            rgt,
        }
    }

    /// Egypt > Cairo > {Maadi, Nasr City}, plus Alexandria under Egypt.
    fn seeded_tree() -> Vec<location::Model> {
        vec![
            loc("egypt", "Egypt", None, 1, 12, LocationStatus::Active),
            loc("cairo", "Cairo", Some("egypt"), 2, 7, LocationStatus::Active),
            loc("maadi", "Maadi", Some("cairo"), 3, 4, LocationStatus::Active),
            loc("nasr", "Nasr City", Some("cairo"), 5, 6, LocationStatus::Active),
            loc("alex", "Alexandria", Some("egypt"), 8, 11, LocationStatus::Active),
            loc("smouha", "Smouha", Some("alex"), 9, 10, LocationStatus::Active),
        ]
    }

    fn repo_with_tree(results: Vec<Vec<location::Model>>) -> LocationRepository {
        let mut mock = MockDatabase::new(DatabaseBackend::Postgres);
        for result in results {
            mock = mock.append_query_results([result]);
        }
        LocationRepository::new(Arc::new(mock.into_connection()))
    }

    #[tokio::test]
    async fn test_at_depth_classifies_each_level() {
        let repo = repo_with_tree(vec![seeded_tree()]);
        let governorates = repo.at_depth(1).await.unwrap();

        let ids: Vec<&str> = governorates.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["cairo", "alex"]);
    }

    #[tokio::test]
    async fn test_at_depth_zero_returns_countries_only() {
        let repo = repo_with_tree(vec![seeded_tree()]);
        let countries = repo.countries().await.unwrap();

        assert_eq!(countries.len(), 1);
        assert_eq!(countries[0].id, "egypt");
    }

    #[tokio::test]
    async fn test_no_node_appears_at_two_depths() {
        let repo = repo_with_tree(vec![seeded_tree(), seeded_tree(), seeded_tree()]);
        let d0 = repo.at_depth(0).await.unwrap();
        let d1 = repo.at_depth(1).await.unwrap();
        let d2 = repo.at_depth(2).await.unwrap();

        assert_eq!(d0.len() + d1.len() + d2.len(), seeded_tree().len());
        for node in &d0 {
            assert!(!d1.iter().chain(d2.iter()).any(|n| n.id == node.id));
        }
        for node in &d1 {
            assert!(!d2.iter().any(|n| n.id == node.id));
        }
    }

    #[tokio::test]
    async fn test_at_depth_masks_inactive_nodes() {
        let mut tree = seeded_tree();
        tree[4].status = LocationStatus::Inactive; // Alexandria

        let repo = repo_with_tree(vec![tree]);
        let governorates = repo.at_depth(1).await.unwrap();

        let ids: Vec<&str> = governorates.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["cairo"]);
    }

    #[tokio::test]
    async fn test_inactive_node_still_resolvable_by_id() {
        let mut tree = seeded_tree();
        tree[4].status = LocationStatus::Inactive;
        let alex = tree[4].clone();

        let repo = repo_with_tree(vec![vec![alex]]);
        let found = repo.find_by_id("alex").await.unwrap();

        assert!(found.is_some());
        assert_eq!(found.unwrap().status, LocationStatus::Inactive);
    }

    #[tokio::test]
    async fn test_city_ancestor_of_area_is_its_governorate() {
        let tree = seeded_tree();
        let maadi = tree[2].clone();
        // Ancestors of Maadi in lft order: Egypt, Cairo.
        let ancestors = vec![tree[0].clone(), tree[1].clone()];

        let repo = repo_with_tree(vec![vec![maadi], ancestors]);
        let ancestor = repo.city_ancestor_of("maadi").await.unwrap();

        assert_eq!(ancestor.unwrap().id, "cairo");
    }

    #[tokio::test]
    async fn test_city_ancestor_of_root_is_none() {
        let tree = seeded_tree();
        let egypt = tree[0].clone();

        // Root has no ancestors.
        let repo = repo_with_tree(vec![vec![egypt], vec![]]);
        let ancestor = repo.city_ancestor_of("egypt").await.unwrap();

        assert!(ancestor.is_none());
    }

    #[tokio::test]
    async fn test_city_ancestor_of_depth_one_node_is_none() {
        let tree = seeded_tree();
        let cairo = tree[1].clone();
        let ancestors = vec![tree[0].clone()];

        let repo = repo_with_tree(vec![vec![cairo], ancestors]);
        let ancestor = repo.city_ancestor_of("cairo").await.unwrap();

        assert!(ancestor.is_none());
    }

    #[tokio::test]
    async fn test_city_ancestor_of_unknown_id_is_none() {
        let repo = repo_with_tree(vec![vec![]]);
        let ancestor = repo.city_ancestor_of("nowhere").await.unwrap();

        assert!(ancestor.is_none());
    }

    #[tokio::test]
    async fn test_inactive_city_ancestor_is_masked() {
        let mut tree = seeded_tree();
        tree[1].status = LocationStatus::Inactive; // Cairo
        let maadi = tree[2].clone();
        let ancestors = vec![tree[0].clone(), tree[1].clone()];

        let repo = repo_with_tree(vec![vec![maadi], ancestors]);
        let ancestor = repo.city_ancestor_of("maadi").await.unwrap();

        assert!(ancestor.is_none());
    }

    #[tokio::test]
    async fn test_descendants_of_with_depth_cap() {
        let tree = seeded_tree();
        let egypt = tree[0].clone();
        // Descendants of Egypt in lft order.
        let descendants = vec![
            tree[1].clone(),
            tree[2].clone(),
            tree[3].clone(),
            tree[4].clone(),
            tree[5].clone(),
        ];

        let repo = repo_with_tree(vec![vec![egypt], descendants]);
        let direct = repo.descendants_of("egypt", Some(1)).await.unwrap();

        let ids: Vec<&str> = direct.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["cairo", "alex"]);
    }

    #[tokio::test]
    async fn test_delete_rejected_while_clients_reference_subtree() {
        let tree = seeded_tree();
        let alex = tree[4].clone();
        let smouha = tree[5].clone();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![alex.clone()]])
            .append_query_results([vec![alex, smouha]])
            .append_query_results([vec![
                btreemap! { "num_items" => Value::BigInt(Some(2)) },
            ]])
            .into_connection();
        let repo = LocationRepository::new(Arc::new(db));

        let err = repo.delete("alex").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)), "{err}");
    }

    #[tokio::test]
    async fn test_delete_rejected_while_contacts_reference_subtree() {
        let tree = seeded_tree();
        let maadi = tree[2].clone();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![maadi.clone()]])
            .append_query_results([vec![maadi]])
            .append_query_results([vec![
                btreemap! { "num_items" => Value::BigInt(Some(0)) },
            ]])
            .append_query_results([vec![
                btreemap! { "num_items" => Value::BigInt(Some(1)) },
            ]])
            .into_connection();
        let repo = LocationRepository::new(Arc::new(db));

        let err = repo.delete("maadi").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)), "{err}");
    }

    #[test]
    fn test_children_query_masks_inactive() {
        let query = LocationRepository::children_query("egypt")
            .build(DbBackend::Postgres)
            .to_string();
        assert!(query.contains("parent_id"), "{query}");
        assert!(query.contains("status"), "{query}");
        assert!(query.contains("active"), "{query}");
    }

    #[test]
    fn test_ancestors_query_uses_strict_containment() {
        let query = LocationRepository::ancestors_query(3, 4)
            .build(DbBackend::Postgres)
            .to_string();
        assert!(query.contains("\"lft\" < 3"), "{query}");
        assert!(query.contains("\"rgt\" > 4"), "{query}");
    }

    #[test]
    fn test_descendants_query_uses_strict_containment() {
        let query = LocationRepository::descendants_query(1, 12)
            .build(DbBackend::Postgres)
            .to_string();
        assert!(query.contains("\"lft\" > 1"), "{query}");
        assert!(query.contains("\"rgt\" < 12"), "{query}");
    }
}
