// src/service_tests.rs

#[cfg(test)]
mod tests {
    use crate::accrual::{AllocationRules, VacationTiers};
    use crate::clock::FixedClock;
    use crate::config::Config;
    use crate::error::PtoError;
    use crate::ledger::{NewPtoRequest, RequestFilter, ReviewDecision};
    use crate::memory_store::InMemoryStore;
    use crate::models::*;
    use crate::observer::RecordingObserver;
    use crate::service::{PtoAdjustment, PtoService};
    use crate::store::{EmployeePatch, PtoStore};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use std::time::Duration;

    fn d(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .unwrap_or_else(|_| panic!("Invalid date string format: {}", date_str))
    }

    fn employee_record(tenant: &str, id: &str, role: Role, start_date: &str) -> EmployeeRecord {
        EmployeeRecord {
            id: id.to_string(),
            tenant_id: tenant.to_string(),
            name: format!("Employee {}", id),
            email: format!("{}@example.com", id.to_lowercase()),
            role,
            status: EmployeeStatus::Active,
            department: None,
            start_date: Some(d(start_date)),
            pto: Some(PtoRecord {
                vacation: Some(LeaveBalanceRecord::default()),
                sick_leave: Some(LeaveBalanceRecord::default()),
            }),
            pto_allocation: None,
        }
    }

    struct TestSystem {
        service: PtoService,
        store: InMemoryStore,
        observer: RecordingObserver,
        clock: FixedClock,
    }

    // Tenant T1 with an admin, a manager and two employees; tenant T2 with its own admin.
    fn setup_system() -> TestSystem {
        let store = InMemoryStore::new();
        for record in [
            employee_record("T1", "A1", Role::Admin, "2020-01-01"),
            employee_record("T1", "M1", Role::Manager, "2021-03-01"),
            employee_record("T1", "E1", Role::Employee, "2023-06-15"),
            employee_record("T1", "E2", Role::Employee, "2023-06-15"),
            employee_record("T2", "X1", Role::Admin, "2020-01-01"),
        ] {
            store.insert_employee(record).unwrap();
        }
        let clock = FixedClock::on(d("2024-06-15"));
        let observer = RecordingObserver::new();
        let service = PtoService::new(
            Arc::new(store.clone()),
            Arc::new(clock.clone()),
            AllocationRules::default(),
        )
        .with_observer(Arc::new(observer.clone()));
        TestSystem {
            service,
            store,
            observer,
            clock,
        }
    }

    fn admin() -> ActingUser {
        ActingUser::new("A1", "T1", Role::Admin)
    }

    fn manager() -> ActingUser {
        ActingUser::new("M1", "T1", Role::Manager)
    }

    fn employee(id: &str) -> ActingUser {
        ActingUser::new(id, "T1", Role::Employee)
    }

    fn vacation(start: &str, end: &str) -> NewPtoRequest {
        NewPtoRequest {
            employee_id: None,
            leave_type: LeaveType::Vacation,
            start_date: d(start),
            end_date: d(end),
            reason: "Family trip".to_string(),
            hours: None,
        }
    }

    fn on_behalf_of(employee_id: &str, start: &str, end: &str) -> NewPtoRequest {
        NewPtoRequest {
            employee_id: Some(employee_id.to_string()),
            ..vacation(start, end)
        }
    }

    async fn give_manual_vacation(system: &TestSystem, employee_id: &str, hours: Decimal) {
        system
            .service
            .set_allocation(&admin(), employee_id, LeaveType::Vacation, Allocation::Manual { hours })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_first_anniversary_request_and_approval() {
        let system = setup_system();
        let e1 = employee("E1");

        let before = system.service.balance(&e1, "E1", LeaveType::Vacation).await.unwrap();
        assert_eq!(before.allocation_hours, dec!(80));
        assert_eq!(before.available, dec!(80));

        let request = system
            .service
            .create_request(&e1, vacation("2024-06-17", "2024-06-18"))
            .await
            .unwrap();
        assert_eq!(request.hours, dec!(16));
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.employee_id, "E1");
        assert_eq!(request.created_by.as_deref(), Some("E1"));
        assert!(request.id.starts_with("pto_"));

        let pending = system.service.available_balance(&e1, "E1", LeaveType::Vacation).await.unwrap();
        assert_eq!(pending, dec!(64));

        let approved = system
            .service
            .review_request(&manager(), &request.id, ReviewDecision::Approved, Some("Enjoy".to_string()))
            .await
            .unwrap();
        assert_eq!(approved.status, RequestStatus::Approved);
        assert_eq!(approved.reviewed_by.as_deref(), Some("M1"));
        assert_eq!(approved.review_notes.as_deref(), Some("Enjoy"));

        // Approved hours stay deducted; the stored used field is untouched.
        let after = system.service.balance(&e1, "E1", LeaveType::Vacation).await.unwrap();
        assert_eq!(after.available, dec!(64));
        assert_eq!(after.used, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_insufficient_balance_persists_nothing() {
        let system = setup_system();
        give_manual_vacation(&system, "E1", dec!(16)).await;

        let result = system
            .service
            .create_request(&employee("E1"), vacation("2024-06-17", "2024-06-19"))
            .await;
        match result {
            Err(PtoError::InsufficientBalance {
                requested,
                available,
                shortfall,
                ..
            }) => {
                assert_eq!(requested, dec!(24));
                assert_eq!(available, dec!(16));
                assert_eq!(shortfall, dec!(8));
            }
            other => panic!("Wrong result returned: {:?}", other),
        }
        assert!(system.store.requests().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_requests_are_rejected() {
        let system = setup_system();
        let e1 = employee("E1");

        let inverted = system.service.create_request(&e1, vacation("2024-06-18", "2024-06-17")).await;
        assert!(matches!(inverted, Err(PtoError::Validation(_))));

        let weekend = system.service.create_request(&e1, vacation("2024-06-22", "2024-06-23")).await;
        assert!(matches!(weekend, Err(PtoError::Validation(_))));

        let mut mismatched = vacation("2024-06-17", "2024-06-18");
        mismatched.hours = Some(dec!(8));
        let result = system.service.create_request(&e1, mismatched).await;
        assert!(matches!(result, Err(PtoError::Validation(_))));

        let for_colleague = system
            .service
            .create_request(&e1, on_behalf_of("E2", "2024-06-17", "2024-06-18"))
            .await;
        assert!(matches!(for_colleague, Err(PtoError::PermissionDenied(_))));

        let unknown = system
            .service
            .create_request(&admin(), on_behalf_of("NOPE", "2024-06-17", "2024-06-18"))
            .await;
        assert!(matches!(unknown, Err(PtoError::NotFound { .. })));

        assert!(system.store.requests().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_review_is_terminal() {
        let system = setup_system();
        let request = system
            .service
            .create_request(&employee("E1"), vacation("2024-06-17", "2024-06-17"))
            .await
            .unwrap();

        system
            .service
            .review_request(&manager(), &request.id, ReviewDecision::Approved, None)
            .await
            .unwrap();
        let second = system
            .service
            .review_request(&admin(), &request.id, ReviewDecision::Rejected, None)
            .await;
        assert!(matches!(
            second,
            Err(PtoError::InvalidTransition {
                from: RequestStatus::Approved,
                ..
            })
        ));

        let stored = system.store.requests().unwrap();
        assert_eq!(stored[0].status, RequestStatus::Approved);
        assert_eq!(stored[0].reviewed_by.as_deref(), Some("M1"));
    }

    #[tokio::test]
    async fn test_rejected_request_releases_hours() {
        let system = setup_system();
        let e1 = employee("E1");
        let request = system
            .service
            .create_request(&e1, vacation("2024-06-17", "2024-06-21"))
            .await
            .unwrap();
        assert_eq!(
            system.service.available_balance(&e1, "E1", LeaveType::Vacation).await.unwrap(),
            dec!(40)
        );

        system
            .service
            .review_request(&manager(), &request.id, ReviewDecision::Rejected, None)
            .await
            .unwrap();
        assert_eq!(
            system.service.available_balance(&e1, "E1", LeaveType::Vacation).await.unwrap(),
            dec!(80)
        );
    }

    #[tokio::test]
    async fn test_employees_cannot_review_or_read_others() {
        let system = setup_system();
        let e1 = employee("E1");
        let request = system
            .service
            .create_request(&e1, vacation("2024-06-17", "2024-06-17"))
            .await
            .unwrap();

        let review = system
            .service
            .review_request(&e1, &request.id, ReviewDecision::Approved, None)
            .await;
        assert!(matches!(review, Err(PtoError::PermissionDenied(_))));

        let peek = system.service.balance(&e1, "E2", LeaveType::Vacation).await;
        assert!(matches!(peek, Err(PtoError::PermissionDenied(_))));

        let list = system
            .service
            .list_requests(&e1, RequestFilter::for_employee("E2"))
            .await;
        assert!(matches!(list, Err(PtoError::PermissionDenied(_))));

        // Managers read anyone in their tenant.
        assert!(system.service.balance(&manager(), "E1", LeaveType::Vacation).await.is_ok());
    }

    #[tokio::test]
    async fn test_other_tenant_sees_nothing() {
        let system = setup_system();
        let request = system
            .service
            .create_request(&employee("E1"), vacation("2024-06-17", "2024-06-17"))
            .await
            .unwrap();
        let outsider = ActingUser::new("X1", "T2", Role::Admin);

        assert!(matches!(
            system.service.balance(&outsider, "E1", LeaveType::Vacation).await,
            Err(PtoError::NotFound { .. })
        ));
        assert!(matches!(
            system
                .service
                .review_request(&outsider, &request.id, ReviewDecision::Approved, None)
                .await,
            Err(PtoError::NotFound { .. })
        ));
        assert!(matches!(
            system.service.delete_request(&outsider, &request.id).await,
            Err(PtoError::NotFound { .. })
        ));
        assert!(system
            .service
            .list_requests(&outsider, RequestFilter::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_list_requests_scopes_employees_to_themselves() {
        let system = setup_system();
        system
            .service
            .create_request(&employee("E1"), vacation("2024-06-24", "2024-06-24"))
            .await
            .unwrap();
        system
            .service
            .create_request(&employee("E2"), vacation("2024-06-17", "2024-06-17"))
            .await
            .unwrap();

        let own = system
            .service
            .list_requests(&employee("E1"), RequestFilter::default())
            .await
            .unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].employee_id, "E1");

        let all = system
            .service
            .list_requests(&manager(), RequestFilter::default())
            .await
            .unwrap();
        let starts: Vec<NaiveDate> = all.iter().map(|r| r.start_date).collect();
        assert_eq!(starts, vec![d("2024-06-17"), d("2024-06-24")]);

        let pending = system
            .service
            .list_requests(&manager(), RequestFilter::default().status(RequestStatus::Approved))
            .await
            .unwrap();
        assert!(pending.is_empty());
    }

    #[tokio::test]
    async fn test_delete_policy() {
        let system = setup_system();
        let e1 = employee("E1");

        // Owner withdraws a pending request.
        let own = system
            .service
            .create_request(&e1, vacation("2024-06-17", "2024-06-17"))
            .await
            .unwrap();
        system.service.delete_request(&e1, &own.id).await.unwrap();
        assert!(system.store.requests().unwrap().is_empty());

        // A colleague may not.
        let own = system
            .service
            .create_request(&e1, vacation("2024-06-18", "2024-06-18"))
            .await
            .unwrap();
        assert!(matches!(
            system.service.delete_request(&employee("E2"), &own.id).await,
            Err(PtoError::PermissionDenied(_))
        ));

        // Self-filed and reviewed: locked, even for an admin.
        system
            .service
            .review_request(&manager(), &own.id, ReviewDecision::Approved, None)
            .await
            .unwrap();
        assert!(matches!(
            system.service.delete_request(&admin(), &own.id).await,
            Err(PtoError::InvalidTransition { .. })
        ));
        assert!(matches!(
            system.service.delete_request(&e1, &own.id).await,
            Err(PtoError::InvalidTransition { .. })
        ));

        // Filed by an admin and reviewed: an admin or manager may still remove it.
        let filed = system
            .service
            .create_request(&admin(), on_behalf_of("E1", "2024-06-19", "2024-06-19"))
            .await
            .unwrap();
        assert_eq!(filed.created_by.as_deref(), Some("A1"));
        system
            .service
            .review_request(&manager(), &filed.id, ReviewDecision::Approved, None)
            .await
            .unwrap();
        system.service.delete_request(&manager(), &filed.id).await.unwrap();

        let remaining = system.store.requests().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, own.id);
    }

    #[tokio::test]
    async fn test_observers_hear_every_mutation() {
        let system = setup_system();
        let request = system
            .service
            .create_request(&employee("E1"), vacation("2024-06-17", "2024-06-17"))
            .await
            .unwrap();
        system
            .service
            .review_request(&manager(), &request.id, ReviewDecision::Rejected, None)
            .await
            .unwrap();
        system
            .service
            .update_pto_balances(
                &admin(),
                "E2",
                LeaveType::Vacation,
                PtoAdjustment {
                    used: Some(dec!(4)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let expected = vec![
            ("T1".to_string(), "E1".to_string()),
            ("T1".to_string(), "E1".to_string()),
            ("T1".to_string(), "E2".to_string()),
        ];
        assert_eq!(system.observer.updates(), expected);

        // Failed mutations notify nobody.
        system.observer.clear();
        let _ = system
            .service
            .review_request(&manager(), &request.id, ReviewDecision::Approved, None)
            .await;
        assert!(system.observer.updates().is_empty());
    }

    #[tokio::test]
    async fn test_slow_store_fails_closed() {
        let store = InMemoryStore::new().with_latency(Duration::from_millis(500));
        store
            .insert_employee(employee_record("T1", "E1", Role::Employee, "2023-06-15"))
            .unwrap();
        let service = PtoService::new(
            Arc::new(store.clone()),
            Arc::new(FixedClock::on(d("2024-06-15"))),
            AllocationRules::default(),
        )
        .with_fetch_timeout(Duration::from_millis(10));

        let result = service.balance(&employee("E1"), "E1", LeaveType::Vacation).await;
        assert!(matches!(
            result,
            Err(PtoError::SourceUnavailable {
                source_name: "balance snapshot",
                ..
            })
        ));

        let create = service
            .create_request(&employee("E1"), vacation("2024-06-17", "2024-06-17"))
            .await;
        assert!(matches!(create, Err(PtoError::SourceUnavailable { .. })));
        assert!(store.requests().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_creates_cannot_overshoot() {
        let system = setup_system();
        give_manual_vacation(&system, "E1", dec!(24)).await;
        let e1 = employee("E1");

        let (first, second) = tokio::join!(
            system.service.create_request(&e1, vacation("2024-06-17", "2024-06-18")),
            system.service.create_request(&e1, vacation("2024-06-24", "2024-06-25")),
        );
        let succeeded = [first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(succeeded, 1);
        let failure = first.err().or(second.err());
        assert!(matches!(failure, Some(PtoError::InsufficientBalance { .. })));

        assert_eq!(system.store.requests().unwrap().len(), 1);
        assert_eq!(
            system.service.available_balance(&e1, "E1", LeaveType::Vacation).await.unwrap(),
            dec!(8)
        );
    }

    #[tokio::test]
    async fn test_update_pto_balances() {
        let system = setup_system();
        let e1 = employee("E1");

        let record = system
            .service
            .update_pto_balances(
                &admin(),
                "E1",
                LeaveType::Vacation,
                PtoAdjustment {
                    beginning_balance: Some(dec!(10)),
                    ongoing_balance: Some(dec!(2)),
                    used: Some(dec!(8)),
                    first_year_rule: None,
                },
            )
            .await
            .unwrap();
        let vacation_record = record.pto.and_then(|p| p.vacation).unwrap();
        assert_eq!(vacation_record.used, Some(dec!(8)));

        let breakdown = system.service.balance(&e1, "E1", LeaveType::Vacation).await.unwrap();
        assert_eq!(breakdown.base, dec!(84));

        let negative = system
            .service
            .update_pto_balances(
                &admin(),
                "E1",
                LeaveType::Vacation,
                PtoAdjustment {
                    used: Some(dec!(-1)),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(negative, Err(PtoError::Validation(_))));

        let sick_ongoing = system
            .service
            .update_pto_balances(
                &admin(),
                "E1",
                LeaveType::SickLeave,
                PtoAdjustment {
                    ongoing_balance: Some(dec!(1)),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(sick_ongoing, Err(PtoError::Validation(_))));

        let by_employee = system
            .service
            .update_pto_balances(&e1, "E1", LeaveType::Vacation, PtoAdjustment::default())
            .await;
        assert!(matches!(by_employee, Err(PtoError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn test_allocation_mode_switch() {
        let system = setup_system();
        let e1 = employee("E1");

        give_manual_vacation(&system, "E1", dec!(100)).await;
        let manual = system.service.balance(&e1, "E1", LeaveType::Vacation).await.unwrap();
        assert_eq!(manual.allocation_mode, AllocationMode::Manual);
        assert_eq!(manual.available, dec!(100));

        system
            .service
            .set_allocation(&manager(), "E1", LeaveType::Vacation, Allocation::Auto)
            .await
            .unwrap();
        let auto = system.service.balance(&e1, "E1", LeaveType::Vacation).await.unwrap();
        assert_eq!(auto.allocation_mode, AllocationMode::Auto);
        assert_eq!(auto.available, dec!(80));

        let negative = system
            .service
            .set_allocation(
                &admin(),
                "E1",
                LeaveType::SickLeave,
                Allocation::Manual { hours: dec!(-8) },
            )
            .await;
        assert!(matches!(negative, Err(PtoError::Validation(_))));
    }

    #[tokio::test]
    async fn test_start_date_and_clock_drive_accrual() {
        let system = setup_system();
        let e1 = employee("E1");

        system.service.set_start_date(&admin(), "E1", d("2024-01-15")).await.unwrap();
        // five full months of a 40-hour first year
        assert_eq!(
            system.service.available_balance(&e1, "E1", LeaveType::Vacation).await.unwrap(),
            dec!(16)
        );

        system.clock.set_time(d("2025-01-15").and_hms_opt(9, 0, 0).unwrap());
        assert_eq!(
            system.service.available_balance(&e1, "E1", LeaveType::Vacation).await.unwrap(),
            dec!(80)
        );
    }

    #[tokio::test]
    async fn test_deactivated_employee_cannot_file() {
        let system = setup_system();

        let by_manager = system.service.deactivate_employee(&manager(), "E2").await;
        assert!(matches!(by_manager, Err(PtoError::PermissionDenied(_))));

        let record = system.service.deactivate_employee(&admin(), "E2").await.unwrap();
        assert_eq!(record.status, EmployeeStatus::Inactive);
        // Idempotent.
        system.service.deactivate_employee(&admin(), "E2").await.unwrap();

        let result = system
            .service
            .create_request(&employee("E2"), vacation("2024-06-17", "2024-06-17"))
            .await;
        assert!(matches!(result, Err(PtoError::Validation(_))));

        // Balances stay readable.
        assert!(system
            .service
            .balance(&employee("E2"), "E2", LeaveType::Vacation)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_sick_leave_from_timesheets() {
        let system = setup_system();
        let monday = d("2024-06-03");
        let entries = (0..5)
            .map(|i| {
                let clock_in = (monday + chrono::Duration::days(i)).and_hms_opt(9, 0, 0).unwrap();
                TimeEntry {
                    clock_in,
                    clock_out: Some(clock_in + chrono::Duration::hours(8)),
                }
            })
            .collect();
        system
            .store
            .insert_timesheet(Timesheet {
                id: "ts-1".to_string(),
                tenant_id: "T1".to_string(),
                employee_id: "E1".to_string(),
                status: TimesheetStatus::Approved,
                week_start_date: monday,
                week_end_date: d("2024-06-09"),
                total_hours: dec!(40),
                time_entries: entries,
            })
            .unwrap();

        let balances = system.service.balances(&employee("E1"), "E1").await.unwrap();
        assert_eq!(balances.len(), 2);
        assert_eq!(balances[0].leave_type, LeaveType::Vacation);
        assert_eq!(balances[1].leave_type, LeaveType::SickLeave);
        assert_eq!(balances[1].available, dec!(1));
    }

    // Lands a manager's approval after the service has authorized a delete,
    // right before the store removes the row.
    struct ApproveBeforeDeleteStore {
        inner: InMemoryStore,
    }

    #[async_trait]
    impl PtoStore for ApproveBeforeDeleteStore {
        async fn get_employee(
            &self,
            tenant_id: &str,
            employee_id: &str,
        ) -> Result<Option<EmployeeRecord>, PtoError> {
            self.inner.get_employee(tenant_id, employee_id).await
        }

        async fn update_employee(
            &self,
            tenant_id: &str,
            employee_id: &str,
            patch: EmployeePatch,
        ) -> Result<EmployeeRecord, PtoError> {
            self.inner.update_employee(tenant_id, employee_id, patch).await
        }

        async fn list_approved_timesheets(
            &self,
            tenant_id: &str,
            employee_id: &str,
        ) -> Result<Vec<Timesheet>, PtoError> {
            self.inner.list_approved_timesheets(tenant_id, employee_id).await
        }

        async fn list_requests(
            &self,
            tenant_id: &str,
            filter: &RequestFilter,
        ) -> Result<Vec<PtoRequest>, PtoError> {
            self.inner.list_requests(tenant_id, filter).await
        }

        async fn get_request(
            &self,
            tenant_id: &str,
            request_id: &str,
        ) -> Result<Option<PtoRequest>, PtoError> {
            self.inner.get_request(tenant_id, request_id).await
        }

        async fn insert_pending(
            &self,
            request: PtoRequest,
            base_hours: Decimal,
        ) -> Result<PtoRequest, PtoError> {
            self.inner.insert_pending(request, base_hours).await
        }

        async fn update_request(
            &self,
            request: PtoRequest,
            expected_status: RequestStatus,
        ) -> Result<PtoRequest, PtoError> {
            self.inner.update_request(request, expected_status).await
        }

        async fn delete_request(
            &self,
            tenant_id: &str,
            request_id: &str,
            expected_status: RequestStatus,
        ) -> Result<(), PtoError> {
            if let Some(mut request) = self.inner.get_request(tenant_id, request_id).await? {
                request.status = RequestStatus::Approved;
                request.reviewed_by = Some("M1".to_string());
                self.inner.update_request(request, RequestStatus::Pending).await?;
            }
            self.inner.delete_request(tenant_id, request_id, expected_status).await
        }
    }

    #[tokio::test]
    async fn test_approval_racing_a_delete_keeps_the_request() {
        let inner = InMemoryStore::new();
        inner
            .insert_employee(employee_record("T1", "E1", Role::Employee, "2023-06-15"))
            .unwrap();
        let service = PtoService::new(
            Arc::new(ApproveBeforeDeleteStore {
                inner: inner.clone(),
            }),
            Arc::new(FixedClock::on(d("2024-06-15"))),
            AllocationRules::default(),
        );
        let e1 = employee("E1");
        let request = service
            .create_request(&e1, vacation("2024-06-17", "2024-06-18"))
            .await
            .unwrap();

        let result = service.delete_request(&e1, &request.id).await;
        match result {
            Err(PtoError::InvalidTransition { from, to, .. }) => {
                assert_eq!(from, RequestStatus::Approved);
                assert_eq!(to, "deleted");
            }
            other => panic!("Wrong result returned: {:?}", other),
        }

        let remaining = inner.requests().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].status, RequestStatus::Approved);
    }

    #[tokio::test]
    async fn test_concurrent_admin_edits_are_both_kept() {
        let store = InMemoryStore::new().with_latency(Duration::from_millis(5));
        store
            .insert_employee(employee_record("T1", "E1", Role::Employee, "2023-06-15"))
            .unwrap();
        let service = PtoService::new(
            Arc::new(store.clone()),
            Arc::new(FixedClock::on(d("2024-06-15"))),
            AllocationRules::default(),
        );
        let admin = admin();

        let (used, allocation) = tokio::join!(
            service.update_pto_balances(
                &admin,
                "E1",
                LeaveType::Vacation,
                PtoAdjustment {
                    used: Some(dec!(40)),
                    ..Default::default()
                },
            ),
            service.set_allocation(
                &admin,
                "E1",
                LeaveType::Vacation,
                Allocation::Manual { hours: dec!(100) },
            ),
        );
        used.unwrap();
        allocation.unwrap();

        let breakdown = service.balance(&admin, "E1", LeaveType::Vacation).await.unwrap();
        assert_eq!(breakdown.used, dec!(40));
        assert_eq!(breakdown.allocation_mode, AllocationMode::Manual);
        assert_eq!(breakdown.allocation_hours, dec!(100));
        assert_eq!(breakdown.available, dec!(60));
    }

    #[tokio::test]
    async fn test_config_rules_reach_the_service() {
        let store = InMemoryStore::new();
        store
            .insert_employee(employee_record("T1", "A1", Role::Admin, "2020-01-01"))
            .unwrap();
        let config = Config::from_pairs(vec![(
            "PTO_VACATION_TIERS".to_string(),
            "graduated".to_string(),
        )])
        .unwrap();
        let service = PtoService::from_config(
            Arc::new(store),
            Arc::new(FixedClock::on(d("2024-06-15"))),
            &config,
        );
        assert_eq!(service.rules(), &config.allocation_rules());
        assert_eq!(service.rules().vacation_tiers, VacationTiers::Graduated);
        assert_eq!(service.today(), d("2024-06-15"));

        let available = service
            .available_balance(&admin(), "A1", LeaveType::Vacation)
            .await
            .unwrap();
        assert_eq!(available, dec!(120));
    }
}
