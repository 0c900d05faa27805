use crate::connection::ConnectionState;
use crate::error::DbError;
use crate::repository::GradeRepository;
use async_trait::async_trait;
use chrono::Utc;
use core_types::{AverageRange, GradeRecord, GradeUpdate, NewGradeRecord};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// A process-local repository (for development/testing).
///
/// Behaves like [`DbRepository`](crate::DbRepository): names are ordered
/// byte-wise (the table sorts with `COLLATE "C"`), and errors have the same
/// kinds. The map key plays the role of the primary key, so the
/// duplicate check and the insert happen under one write lock.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    records: RwLock<BTreeMap<String, GradeRecord>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GradeRepository for InMemoryRepository {
    async fn list_all(&self) -> Result<Vec<GradeRecord>, DbError> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<GradeRecord>, DbError> {
        Ok(self.records.read().await.get(name).cloned())
    }

    async fn create(&self, record: NewGradeRecord) -> Result<GradeRecord, DbError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.name) {
            return Err(DbError::DuplicateName(record.name));
        }
        let created = GradeRecord::from_new(record, Utc::now());
        records.insert(created.name.clone(), created.clone());
        Ok(created)
    }

    async fn update(&self, name: &str, update: GradeUpdate) -> Result<GradeRecord, DbError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(name)
            .ok_or_else(|| DbError::NotFound(name.to_string()))?;
        record.apply_update(&update, Utc::now());
        Ok(record.clone())
    }

    async fn delete(&self, name: &str) -> Result<GradeRecord, DbError> {
        self.records
            .write()
            .await
            .remove(name)
            .ok_or_else(|| DbError::NotFound(name.to_string()))
    }

    async fn find_by_average_range(&self, range: AverageRange) -> Result<Vec<GradeRecord>, DbError> {
        let mut matching: Vec<GradeRecord> = self
            .records
            .read()
            .await
            .values()
            .filter(|r| range.contains(r.average))
            .cloned()
            .collect();
        // Values come out name-ordered, so a stable sort keeps name as the tiebreak.
        matching.sort_by(|a, b| b.average.cmp(&a.average));
        Ok(matching)
    }

    async fn count(&self) -> Result<i64, DbError> {
        Ok(self.records.read().await.len() as i64)
    }

    async fn connection_state(&self) -> ConnectionState {
        ConnectionState::Connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{ErrorKind, Grades};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn new_record(name: &str, g1: Decimal, g2: Decimal, g3: Decimal) -> NewGradeRecord {
        NewGradeRecord { name: name.to_string(), grades: Grades::new(g1, g2, g3) }
    }

    #[tokio::test]
    async fn create_computes_and_stores_average() {
        let repo = InMemoryRepository::new();
        let created = repo.create(new_record("Ana", dec!(8.0), dec!(7.5), dec!(9.0))).await.unwrap();
        assert_eq!(created.average, dec!(8.2));

        let stored = repo.find_by_name("Ana").await.unwrap().unwrap();
        assert_eq!(stored.average, dec!(8.2));
    }

    #[tokio::test]
    async fn duplicate_name_is_a_conflict_and_keeps_the_original() {
        let repo = InMemoryRepository::new();
        repo.create(new_record("Ana", dec!(8.0), dec!(7.5), dec!(9.0))).await.unwrap();

        let err = repo.create(new_record("Ana", dec!(1), dec!(1), dec!(1))).await.unwrap_err();
        assert!(matches!(err, DbError::DuplicateName(ref n) if n == "Ana"));
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let stored = repo.find_by_name("Ana").await.unwrap().unwrap();
        assert_eq!(stored.grade1, dec!(8.0));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn update_recomputes_with_prior_grades() {
        let repo = InMemoryRepository::new();
        repo.create(new_record("Ana", dec!(8.0), dec!(7.5), dec!(9.0))).await.unwrap();

        let update = GradeUpdate { grade2: Some(dec!(10)), ..Default::default() };
        let updated = repo.update("Ana", update).await.unwrap();

        assert_eq!(updated.grades(), Grades::new(dec!(8.0), dec!(10), dec!(9.0)));
        assert_eq!(updated.average, dec!(9.0));
        assert!(updated.updated_at >= updated.created_at);
    }

    #[tokio::test]
    async fn missing_records_are_not_found() {
        let repo = InMemoryRepository::new();
        repo.create(new_record("Ana", dec!(8.0), dec!(7.5), dec!(9.0))).await.unwrap();

        assert!(repo.find_by_name("NoSuchName").await.unwrap().is_none());

        let before = repo.count().await.unwrap();
        let err = repo.delete("NoSuchName").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(repo.count().await.unwrap(), before);

        let update = GradeUpdate { grade1: Some(dec!(1)), ..Default::default() };
        assert_eq!(repo.update("NoSuchName", update).await.unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn delete_returns_the_removed_record() {
        let repo = InMemoryRepository::new();
        repo.create(new_record("Beto", dec!(5), dec!(5), dec!(5))).await.unwrap();

        let removed = repo.delete("Beto").await.unwrap();
        assert_eq!(removed.name, "Beto");
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn list_is_ordered_by_name_and_range_by_average() {
        let repo = InMemoryRepository::new();
        repo.create(new_record("Beto", dec!(5), dec!(5), dec!(5))).await.unwrap();
        repo.create(new_record("Ana", dec!(8.0), dec!(7.5), dec!(9.0))).await.unwrap();
        repo.create(new_record("Carla", dec!(9), dec!(9), dec!(9.5))).await.unwrap();
        repo.create(new_record("Dani", dec!(5), dec!(5), dec!(5))).await.unwrap();

        let names: Vec<_> = repo.list_all().await.unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Ana", "Beto", "Carla", "Dani"]);

        let range = AverageRange::new(dec!(5), dec!(8.5)).unwrap();
        let names: Vec<_> = repo
            .find_by_average_range(range)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Ana", "Beto", "Dani"]);
    }

    #[tokio::test]
    async fn names_sort_byte_wise() {
        let repo = InMemoryRepository::new();
        repo.create(new_record("ana", dec!(8), dec!(8), dec!(8))).await.unwrap();
        repo.create(new_record("Beto", dec!(5), dec!(5), dec!(5))).await.unwrap();
        repo.create(new_record("Ágata", dec!(6), dec!(6), dec!(6))).await.unwrap();

        let names: Vec<_> = repo.list_all().await.unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Beto", "ana", "Ágata"]);
    }
}
