//! Chainable query value. Each step returns a new builder; terminal calls consume it.

use crate::db::Row;
use crate::error::ConnectError;
use crate::service::crud::Repository;
use crate::service::page::Page;
use crate::sql::{Condition, Direction, Filter, Op, SqlValue};

#[derive(Clone, Debug)]
#[must_use = "a query does nothing until a terminal call runs it"]
pub struct QueryBuilder<'r> {
    repo: &'r Repository,
    filter: Filter,
}

impl<'r> QueryBuilder<'r> {
    pub(crate) fn new(repo: &'r Repository) -> Self {
        QueryBuilder {
            repo,
            filter: Filter::default(),
        }
    }

    /// `field op value`, AND-ed with earlier conditions.
    pub fn filter(mut self, field: &str, op: Op, value: impl Into<SqlValue>) -> Self {
        self.filter.conditions.push(Condition::Compare {
            field: field.to_string(),
            op,
            value: value.into(),
        });
        self
    }

    /// `field IN (values)`. An empty list matches nothing.
    pub fn filter_in<V: Into<SqlValue>>(mut self, field: &str, values: impl IntoIterator<Item = V>) -> Self {
        self.filter.conditions.push(Condition::In {
            field: field.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.filter.order.push((field.to_string(), direction));
        self
    }

    pub fn limit(mut self, n: u64, offset: Option<u64>) -> Self {
        self.filter.limit = Some(n);
        self.filter.offset = offset;
        self
    }

    pub fn as_filter(&self) -> &Filter {
        &self.filter
    }

    pub async fn find_all(self) -> Result<Vec<Row>, ConnectError> {
        self.repo.select(&self.filter).await
    }

    /// Rows matching the conditions; ordering and window are ignored.
    pub async fn count(self) -> Result<u64, ConnectError> {
        self.repo.count_where(&self.filter).await
    }

    /// Count, then fetch one window with the same conditions and ordering.
    pub async fn paginate(self, per_page: u64, offset: u64) -> Result<Page<Row>, ConnectError> {
        let per_page = per_page.max(1);
        let total = self.repo.count_where(&self.filter).await?;
        let data = self.limit(per_page, Some(offset)).find_all().await?;
        Ok(Page::new(data, total, per_page, offset))
    }

    pub async fn first(self) -> Result<Option<Row>, ConnectError> {
        let offset = self.filter.offset;
        Ok(self.limit(1, offset).find_all().await?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseSettings;
    use crate::db::{bootstrap_catalog, Connector};
    use crate::service::EntitySpec;
    use crate::sql::Strategy;
    use std::sync::Arc;

    async fn seeded(strategy: Strategy) -> Repository {
        let connector = Arc::new(Connector::new(DatabaseSettings::new("sqlite::memory:")));
        let pool = connector.pool().await.unwrap();
        bootstrap_catalog(&pool).await.unwrap();
        pool.execute_raw(
            "INSERT INTO products (name, price, brand_id) VALUES \
             ('Desk', 250.0, 1), ('Lamp', 40.0, 2), ('Chair', 120.0, 1), ('Shelf', 100.0, 2), ('Rug', 99.5, 3)",
        )
        .await
        .unwrap();
        Repository::new(connector, strategy, EntitySpec::new("products")).unwrap()
    }

    fn ids(rows: &[Row]) -> Vec<i64> {
        rows.iter().filter_map(|r| r["id"].as_i64()).collect()
    }

    #[tokio::test]
    async fn both_strategies_return_the_same_rows() {
        let mut results = Vec::new();
        for strategy in [Strategy::Parameterized, Strategy::Interpolated] {
            let repo = seeded(strategy).await;
            let rows = repo
                .query()
                .filter("price", Op::Ge, 100)
                .order_by("name", Direction::Asc)
                .limit(10, Some(0))
                .find_all()
                .await
                .unwrap();
            results.push(ids(&rows));
        }
        assert_eq!(results[0], vec![3, 1, 4]);
        assert_eq!(results[0], results[1]);
    }

    #[tokio::test]
    async fn filter_in_and_like() {
        let repo = seeded(Strategy::Parameterized).await;
        let rows = repo
            .query()
            .filter_in("brand_id", [1, 3])
            .filter("name", Op::Like, "%e%")
            .order_by("id", Direction::Asc)
            .find_all()
            .await
            .unwrap();
        assert_eq!(ids(&rows), vec![1]);

        let none = repo.query().filter_in("id", Vec::<i64>::new()).find_all().await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn each_query_starts_unfiltered() {
        let repo = seeded(Strategy::Parameterized).await;
        let filtered = repo.query().filter("brand_id", Op::Eq, 2).find_all().await.unwrap();
        assert_eq!(filtered.len(), 2);
        let fresh = repo.query();
        assert_eq!(fresh.as_filter(), &Filter::default());
        assert_eq!(fresh.find_all().await.unwrap().len(), 5);
        assert_eq!(repo.query().count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn count_ignores_window() {
        let repo = seeded(Strategy::Interpolated).await;
        let n = repo
            .query()
            .filter("price", Op::Lt, 150)
            .limit(1, Some(2))
            .count()
            .await
            .unwrap();
        assert_eq!(n, 4);
    }

    #[tokio::test]
    async fn paginate_builds_envelope() {
        let repo = seeded(Strategy::Parameterized).await;
        let page = repo
            .query()
            .order_by("id", Direction::Asc)
            .paginate(2, 2)
            .await
            .unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 3);
        assert_eq!(ids(&page.data), vec![3, 4]);
    }

    #[tokio::test]
    async fn first_takes_one() {
        let repo = seeded(Strategy::Parameterized).await;
        let row = repo
            .query()
            .order_by("price", Direction::Desc)
            .first()
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row["name"], "Desk");
        assert!(repo.query().filter("price", Op::Gt, 1000).first().await.unwrap().is_none());
    }
}
