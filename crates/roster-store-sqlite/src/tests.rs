//! Integration tests for `SqliteStore` against an in-memory database.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate};
use roster_core::{
  employee::{self, EmployeeId, EmployeeUpdate, NewEmployee},
  filter::EmployeeFilters,
  hierarchy::MAX_MANAGER_DEPTH,
  memory::MemoryStore,
  pagination::Pagination,
  store::{EmployeeStore, StoreError as _},
};
use rust_decimal::Decimal;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn hired() -> NaiveDate { NaiveDate::from_ymd_opt(2021, 3, 15).unwrap() }

fn draft(last: &str, first: &str, position: &str) -> NewEmployee {
  NewEmployee::new(last, first, "Отчество", position, hired(), Decimal::from(50_000))
}

fn anon(i: usize) -> NewEmployee {
  draft(&format!("Фамилия{i}"), &format!("Имя{i}"), "Инженер")
}

async fn ids(s: &SqliteStore, filters: &EmployeeFilters) -> HashSet<EmployeeId> {
  s.list(filters, Pagination::default())
    .await
    .unwrap()
    .into_iter()
    .map(|e| e.id)
    .collect()
}

fn manager_code(err: &Error) -> &'static str {
  err
    .validation()
    .and_then(|v| v.field("manager"))
    .map(|f| f.code)
    .unwrap_or_else(|| panic!("expected a manager error, got {err}"))
}

// ─── Count & list ────────────────────────────────────────────────────────────

#[tokio::test]
async fn count_zero_with_no_employees() {
  let s = store().await;
  assert_eq!(s.count(&EmployeeFilters::default()).await.unwrap(), 0);
}

#[tokio::test]
async fn count_existing_employees() {
  let s = store().await;
  for i in 0..5 {
    s.create(anon(i)).await.unwrap();
  }
  assert_eq!(s.count(&EmployeeFilters::default()).await.unwrap(), 5);
}

#[tokio::test]
async fn list_all_returns_every_id_in_order() {
  let s = store().await;
  let mut created = Vec::new();
  for i in 0..5 {
    created.push(s.create(anon(i)).await.unwrap().id);
  }

  let fetched: Vec<_> = s
    .list(&EmployeeFilters::default(), Pagination::default())
    .await
    .unwrap()
    .into_iter()
    .map(|e| e.id)
    .collect();
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn pagination_pages_are_disjoint() {
  let s = store().await;
  for i in 0..10 {
    s.create(anon(i)).await.unwrap();
  }
  let all = EmployeeFilters::default();

  let first = s.list(&all, Pagination::new(0, 5)).await.unwrap();
  let second = s.list(&all, Pagination::new(5, 5)).await.unwrap();
  let beyond = s.list(&all, Pagination::new(10, 5)).await.unwrap();
  assert_eq!(first.len(), 5);
  assert_eq!(second.len(), 5);
  assert!(beyond.is_empty());

  let a: HashSet<_> = first.iter().map(|e| e.id).collect();
  let b: HashSet<_> = second.iter().map(|e| e.id).collect();
  assert!(a.is_disjoint(&b));
}

#[tokio::test]
async fn default_limit_caps_the_page() {
  let s = store().await;
  for i in 0..25 {
    s.create(anon(i)).await.unwrap();
  }
  let page = s
    .list(&EmployeeFilters::default(), Pagination::default())
    .await
    .unwrap();
  assert_eq!(page.len(), 20);
  assert_eq!(s.count(&EmployeeFilters::default()).await.unwrap(), 25);
}

// ─── Filters ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn filter_by_id_and_ids() {
  let s = store().await;
  let e1 = s.create(anon(1)).await.unwrap();
  let _e2 = s.create(anon(2)).await.unwrap();
  let e3 = s.create(anon(3)).await.unwrap();

  let one = EmployeeFilters { id: Some(e1.id), ..Default::default() };
  assert_eq!(ids(&s, &one).await, HashSet::from([e1.id]));

  let many = EmployeeFilters { ids: Some(vec![e1.id, e3.id]), ..Default::default() };
  assert_eq!(ids(&s, &many).await, HashSet::from([e1.id, e3.id]));
}

#[tokio::test]
async fn filter_by_last_name_is_partial_and_case_insensitive() {
  let s = store().await;
  let ivanov = s.create(draft("Иванов", "Иван", "Разработчик")).await.unwrap();
  s.create(draft("Петров", "Петр", "Менеджер")).await.unwrap();
  s.create(draft("Сидоров", "Сидор", "Дизайнер")).await.unwrap();
  let ivanova = s.create(draft("Иванова", "Мария", "Аналитик")).await.unwrap();

  let filters = EmployeeFilters { last_name: Some("иванов".into()), ..Default::default() };
  assert_eq!(ids(&s, &filters).await, HashSet::from([ivanov.id, ivanova.id]));
}

#[tokio::test]
async fn filter_by_first_name_and_position() {
  let s = store().await;
  let dev = s.create(draft("Иванов", "Иван", "Разработчик")).await.unwrap();
  s.create(draft("Петров", "Петр", "Менеджер")).await.unwrap();

  let by_first = EmployeeFilters { first_name: Some("Иван".into()), ..Default::default() };
  assert_eq!(ids(&s, &by_first).await, HashSet::from([dev.id]));

  let by_position =
    EmployeeFilters { position: Some("разраб".into()), ..Default::default() };
  assert_eq!(ids(&s, &by_position).await, HashSet::from([dev.id]));
}

#[tokio::test]
async fn search_matches_any_text_field() {
  let s = store().await;
  let ivan = s.create(draft("Иванов", "Иван", "Разработчик")).await.unwrap();
  s.create(draft("Петров", "Петр", "Менеджер")).await.unwrap();
  let designer = s.create(draft("Сидоров", "Сидор", "Дизайнер")).await.unwrap();

  let by_name = EmployeeFilters { search: Some("Иван".into()), ..Default::default() };
  assert_eq!(ids(&s, &by_name).await, HashSet::from([ivan.id]));

  let by_position = EmployeeFilters { search: Some("ДИЗАЙН".into()), ..Default::default() };
  assert_eq!(ids(&s, &by_position).await, HashSet::from([designer.id]));
}

#[tokio::test]
async fn filter_by_date_hired_range() {
  let s = store().await;
  let mut early = anon(1);
  early.date_hired = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
  let mut late = anon(2);
  late.date_hired = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
  let _early = s.create(early).await.unwrap();
  let late = s.create(late).await.unwrap();

  let filters = EmployeeFilters {
    date_hired_from: Some(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()),
    ..Default::default()
  };
  assert_eq!(ids(&s, &filters).await, HashSet::from([late.id]));
}

#[tokio::test]
async fn filter_by_salary_range_is_inclusive() {
  let s = store().await;
  let mut created = Vec::new();
  for (i, amount) in [30_000, 50_000, 70_000].into_iter().enumerate() {
    let mut d = anon(i);
    d.salary = Decimal::from(amount);
    created.push(s.create(d).await.unwrap().id);
  }

  let filters = EmployeeFilters {
    salary_min: Some(Decimal::from(50_000)),
    salary_max: Some(Decimal::from(70_000)),
    ..Default::default()
  };
  assert_eq!(ids(&s, &filters).await, HashSet::from([created[1], created[2]]));

  // A bound between two cents excludes the neighbouring salary.
  let above = EmployeeFilters {
    salary_min: Some(Decimal::new(50_000_001, 3)),
    ..Default::default()
  };
  assert_eq!(ids(&s, &above).await, HashSet::from([created[2]]));
}

#[tokio::test]
async fn salary_round_trips_with_cents() {
  let s = store().await;
  let mut d = anon(1);
  d.salary = Decimal::new(12_345_67, 2);
  let e = s.create(d).await.unwrap();
  assert_eq!(s.get(e.id).await.unwrap().unwrap().salary, Decimal::new(12_345_67, 2));
}

#[tokio::test]
async fn filter_by_manager() {
  let s = store().await;
  let boss = s.create(anon(0)).await.unwrap();
  let a = s.create(anon(1).with_manager(boss.id)).await.unwrap();
  s.create(anon(2)).await.unwrap();

  let filters = EmployeeFilters { manager_id: Some(boss.id), ..Default::default() };
  assert_eq!(ids(&s, &filters).await, HashSet::from([a.id]));
}

#[tokio::test]
async fn filter_by_timestamps() {
  let s = store().await;
  let now = employee::now();
  for (i, days) in [3, 1, 0].into_iter().enumerate() {
    let e = s.create(anon(i)).await.unwrap();
    let at = now - Duration::days(days);
    s.set_timestamps(e.id, at, at).await.unwrap();
  }

  let from = EmployeeFilters {
    created_at_from: Some(now - Duration::days(2)),
    ..Default::default()
  };
  assert_eq!(ids(&s, &from).await, HashSet::from([2, 3]));

  let exact = EmployeeFilters {
    updated_at_from: Some(now),
    updated_at_to: Some(now),
    ..Default::default()
  };
  assert_eq!(s.count(&exact).await.unwrap(), 1);
}

#[tokio::test]
async fn filter_by_created_at_to() {
  let s = store().await;
  let now = employee::now();
  for (i, days) in [3, 1, 0].into_iter().enumerate() {
    let e = s.create(anon(i)).await.unwrap();
    let at = now - Duration::days(days);
    s.set_timestamps(e.id, at, at).await.unwrap();
  }

  let to = EmployeeFilters {
    created_at_to: Some(now - Duration::days(1)),
    ..Default::default()
  };
  assert_eq!(ids(&s, &to).await, HashSet::from([1, 2]));

  let window = EmployeeFilters {
    created_at_from: Some(now - Duration::days(2)),
    created_at_to: Some(now - Duration::hours(1)),
    ..Default::default()
  };
  assert_eq!(ids(&s, &window).await, HashSet::from([2]));
}

#[tokio::test]
async fn sub_microsecond_lower_bound_excludes_earlier_rows() {
  let s = store().await;
  let at = employee::now() - Duration::hours(1);
  let early = s.create(anon(1)).await.unwrap();
  let late = s.create(anon(2)).await.unwrap();
  s.set_timestamps(early.id, at, at).await.unwrap();
  let next = at + Duration::microseconds(1);
  s.set_timestamps(late.id, next, next).await.unwrap();

  let half = Duration::nanoseconds(500);
  let from = |t| EmployeeFilters { created_at_from: Some(t), ..Default::default() };
  assert_eq!(ids(&s, &from(at)).await, HashSet::from([early.id, late.id]));
  assert_eq!(ids(&s, &from(at + half)).await, HashSet::from([late.id]));

  let to = EmployeeFilters { updated_at_to: Some(at + half), ..Default::default() };
  assert_eq!(ids(&s, &to).await, HashSet::from([early.id]));
}

#[tokio::test]
async fn filter_by_middle_name_is_partial_and_case_insensitive() {
  let s = store().await;
  let mut petrovich = draft("Петров", "Пётр", "Менеджер");
  petrovich.middle_name = "Петрович".into();
  let target = s.create(petrovich).await.unwrap();
  s.create(draft("Иванов", "Иван", "Разработчик")).await.unwrap();

  let filters = EmployeeFilters { middle_name: Some("ПЕТРОВ".into()), ..Default::default() };
  assert_eq!(ids(&s, &filters).await, HashSet::from([target.id]));

  let shared = EmployeeFilters { middle_name: Some("отчес".into()), ..Default::default() };
  assert_eq!(s.count(&shared).await.unwrap(), 1);
}

#[tokio::test]
async fn combined_filters_intersect() {
  let s = store().await;
  let target = s.create(draft("Иванов", "Иван", "Разработчик")).await.unwrap();
  s.create(draft("Иванова", "Мария", "Менеджер")).await.unwrap();

  let filters = EmployeeFilters {
    last_name: Some("Иванов".into()),
    position: Some("Разработчик".into()),
    ..Default::default()
  };
  assert_eq!(ids(&s, &filters).await, HashSet::from([target.id]));
  assert_eq!(s.count(&filters).await.unwrap(), 1);
}

#[tokio::test]
async fn no_matches() {
  let s = store().await;
  for i in 0..3 {
    s.create(anon(i)).await.unwrap();
  }
  let filters = EmployeeFilters {
    last_name: Some("НесуществующаяФамилия".into()),
    ..Default::default()
  };
  assert!(ids(&s, &filters).await.is_empty());
  assert_eq!(s.count(&filters).await.unwrap(), 0);
}

#[tokio::test]
async fn sql_and_in_memory_filters_agree() {
  let sql = store().await;
  let mem = MemoryStore::new();
  let rows = [
    ("Иванов", "Иван", "Разработчик", 40_000),
    ("Петрова", "Анна", "Менеджер", 55_500),
    ("Сидоров", "Иван", "Дизайнер", 70_000),
    ("Кузнецов", "Олег", "Разработчик", 90_000),
  ];
  for (last, first, position, salary) in rows {
    let mut d = draft(last, first, position);
    d.salary = Decimal::from(salary);
    sql.create(d.clone()).await.unwrap();
    mem.create(d).await.unwrap();
  }

  let cases = [
    EmployeeFilters { search: Some("иван".into()), ..Default::default() },
    EmployeeFilters {
      position: Some("разработчик".into()),
      salary_max: Some(Decimal::from(50_000)),
      ..Default::default()
    },
    EmployeeFilters { ids: Some(vec![2, 4, 99]), ..Default::default() },
    EmployeeFilters { ids: Some(vec![]), ..Default::default() },
    EmployeeFilters {
      salary_min: Some(Decimal::new(55_499_999, 3)),
      salary_max: Some(Decimal::new(55_500_001, 3)),
      ..Default::default()
    },
  ];
  for filters in cases {
    let page = Pagination::default();
    let a: Vec<_> = sql.list(&filters, page).await.unwrap().into_iter().map(|e| e.id).collect();
    let b: Vec<_> = mem.list(&filters, page).await.unwrap().into_iter().map(|e| e.id).collect();
    assert_eq!(a, b, "{filters:?}");
  }
}

// ─── Writes & hierarchy ──────────────────────────────────────────────────────

#[tokio::test]
async fn create_then_get() {
  let s = store().await;
  let e = s.create(draft("Иванов", "Иван", "Разработчик")).await.unwrap();
  assert_eq!(e.created_at, e.updated_at);

  let fetched = s.get(e.id).await.unwrap().unwrap();
  assert_eq!(fetched, e);
  assert_eq!(fetched.full_name(), "Иванов Иван Отчество");
}

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  assert!(s.get(404).await.unwrap().is_none());
}

#[tokio::test]
async fn invalid_fields_are_rejected() {
  let s = store().await;
  let mut bad = anon(1);
  bad.first_name = "   ".into();
  bad.salary = Decimal::new(1, 3);

  let err = s.create(bad).await.unwrap_err();
  let v = err.validation().expect("validation error");
  assert_eq!(v.field("first_name").unwrap().code, "blank");
  assert_eq!(v.field("salary").unwrap().code, "precision");
  assert_eq!(s.count(&EmployeeFilters::default()).await.unwrap(), 0);
}

#[tokio::test]
async fn unknown_manager_is_rejected() {
  let s = store().await;
  let err = s.create(anon(1).with_manager(77)).await.unwrap_err();
  assert_eq!(manager_code(&err), "manager_not_found");
}

#[tokio::test]
async fn self_reference_is_rejected() {
  let s = store().await;
  let e = s.create(anon(1)).await.unwrap();
  let err = s
    .update(e.id, EmployeeUpdate { manager_id: Some(Some(e.id)), ..Default::default() })
    .await
    .unwrap_err();
  assert_eq!(manager_code(&err), "self_reference");
}

#[tokio::test]
async fn cycle_is_rejected_and_nothing_changes() {
  let s = store().await;
  let a = s.create(anon(1)).await.unwrap();
  let b = s.create(anon(2).with_manager(a.id)).await.unwrap();
  let c = s.create(anon(3).with_manager(b.id)).await.unwrap();

  let err = s
    .update(
      a.id,
      EmployeeUpdate {
        position: Some("Директор".into()),
        manager_id: Some(Some(c.id)),
        ..Default::default()
      },
    )
    .await
    .unwrap_err();
  assert_eq!(manager_code(&err), "cycle_detected");

  let unchanged = s.get(a.id).await.unwrap().unwrap();
  assert_eq!(unchanged, a);
}

#[tokio::test]
async fn field_and_manager_errors_are_reported_together() {
  let s = store().await;
  let err = s.create(draft("", "Иван", "Разработчик").with_manager(42)).await.unwrap_err();
  let v = err.validation().expect("validation error");
  assert_eq!(v.field("last_name").map(|f| f.code), Some("blank"));
  assert_eq!(manager_code(&err), "manager_not_found");
  assert_eq!(s.count(&EmployeeFilters::default()).await.unwrap(), 0);
}

#[tokio::test]
async fn interleaved_updates_cannot_persist_a_cycle() {
  let s = store().await;
  let b = s.create(anon(1)).await.unwrap();
  let a = s.create(anon(2).with_manager(b.id)).await.unwrap();

  // Poll once so the first update is queued on the database thread before
  // the reassignments below.
  let rename = s.update(
    a.id,
    EmployeeUpdate { position: Some("Архитектор".into()), ..Default::default() },
  );
  tokio::pin!(rename);
  let _ = tokio::time::timeout(std::time::Duration::ZERO, &mut rename).await;

  s.update(a.id, EmployeeUpdate { manager_id: Some(None), ..Default::default() })
    .await
    .unwrap()
    .unwrap();
  s.update(b.id, EmployeeUpdate { manager_id: Some(Some(a.id)), ..Default::default() })
    .await
    .unwrap()
    .unwrap();
  rename.await.unwrap().unwrap();

  let a = s.get(a.id).await.unwrap().unwrap();
  let b = s.get(b.id).await.unwrap().unwrap();
  assert_eq!(a.position, "Архитектор");
  assert_eq!(a.manager_id, None);
  assert_eq!(b.manager_id, Some(a.id));
}

#[tokio::test]
async fn depth_limit_is_enforced() {
  let s = store().await;
  let mut top = s.create(anon(0)).await.unwrap();
  for level in 1..=MAX_MANAGER_DEPTH {
    top = s.create(anon(level).with_manager(top.id)).await.unwrap();
  }
  let err = s.create(anon(99).with_manager(top.id)).await.unwrap_err();
  assert_eq!(manager_code(&err), "depth_exceeded");
}

#[tokio::test]
async fn update_patches_fields() {
  let s = store().await;
  let boss = s.create(anon(0)).await.unwrap();
  let e = s.create(anon(1)).await.unwrap();
  let earlier = e.created_at - Duration::hours(1);
  s.set_timestamps(e.id, earlier, earlier).await.unwrap();

  let updated = s
    .update(
      e.id,
      EmployeeUpdate {
        salary: Some(Decimal::new(99_999_99, 2)),
        manager_id: Some(Some(boss.id)),
        ..Default::default()
      },
    )
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.salary, Decimal::new(99_999_99, 2));
  assert_eq!(updated.manager_id, Some(boss.id));
  assert_eq!(updated.created_at, earlier);
  assert!(updated.updated_at > earlier);
  assert_eq!(s.get(e.id).await.unwrap().unwrap(), updated);

  let cleared = s
    .update(e.id, EmployeeUpdate { manager_id: Some(None), ..Default::default() })
    .await
    .unwrap()
    .unwrap();
  assert_eq!(cleared.manager_id, None);
}

#[tokio::test]
async fn update_missing_returns_none() {
  let s = store().await;
  assert!(s.update(5, EmployeeUpdate::default()).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_detaches_subordinates() {
  let s = store().await;
  let boss = s.create(anon(0)).await.unwrap();
  let sub = s.create(anon(1).with_manager(boss.id)).await.unwrap();

  assert!(s.delete(boss.id).await.unwrap());
  assert!(!s.delete(boss.id).await.unwrap());
  assert!(s.get(boss.id).await.unwrap().is_none());
  assert_eq!(s.get(sub.id).await.unwrap().unwrap().manager_id, None);
}

#[tokio::test]
async fn reopening_a_file_keeps_rows() {
  let dir = std::env::temp_dir().join(format!("roster-test-{}", std::process::id()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("reopen.db");
  let _ = std::fs::remove_file(&path);

  let id = {
    let s = SqliteStore::open(&path).await.unwrap();
    s.create(anon(1)).await.unwrap().id
  };
  let s = SqliteStore::open(&path).await.unwrap();
  assert!(s.get(id).await.unwrap().is_some());

  let filters = EmployeeFilters { search: Some("фамилия1".into()), ..Default::default() };
  assert_eq!(s.count(&filters).await.unwrap(), 1);
}
