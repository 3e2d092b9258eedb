use abi::{
    Decision, NewRequest, NotificationEvent, Request, RequestId, RequestQuery, RequestStatus,
    RequestTarget, TransitionAction, Validator, WorkflowError,
};
use async_trait::async_trait;
use sqlx::QueryBuilder;
use tracing::info;

use crate::{Catalogue, RequestWorkflow, ReservationEngine};

#[async_trait]
impl RequestWorkflow for ReservationEngine {
    async fn create_request(&self, new: NewRequest) -> Result<Request, WorkflowError> {
        new.validate()?;

        // the target must exist up front; documents always carry quantity 1
        let quantity = match new.target {
            RequestTarget::Item(item_id) => {
                self.get_item(item_id).await?;
                new.quantity_requested
            }
            RequestTarget::Document(doc_id) => {
                self.get_document(doc_id).await?;
                1
            }
        };

        let request: Request = sqlx::query_as(
            "INSERT INTO requests (requester_id, target_kind, target_id, quantity_requested, duration) VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(&new.requester_id)
        .bind(new.target.kind())
        .bind(new.target.id())
        .bind(quantity)
        .bind(new.duration)
        .fetch_one(&self.pool)
        .await?;

        info!(request_id = request.id, requester_id = %request.requester_id, "request submitted");
        self.dispatch(NotificationEvent::RequestSubmitted {
            request_id: request.id,
            requester_id: request.requester_id.clone(),
            target: request.target,
            quantity: request.quantity_requested,
        });

        Ok(request)
    }

    async fn decide(
        &self,
        id: RequestId,
        decision: Decision,
        reason: Option<String>,
    ) -> Result<Request, WorkflowError> {
        let (next, reason) = match decision {
            // approval wipes any reason left over from an earlier evaluation
            Decision::Approved => (RequestStatus::Approved, None),
            Decision::Declined => (RequestStatus::Declined, reason),
        };

        let updated: Option<Request> = sqlx::query_as(
            "UPDATE requests SET status = $2, decline_reason = $3, updated_at = now() WHERE id = $1 AND status = 'pending' RETURNING *",
        )
        .bind(id)
        .bind(next)
        .bind(&reason)
        .fetch_optional(&self.pool)
        .await?;

        let request = match updated {
            Some(request) => request,
            // nothing matched: the request is unknown, or no longer pending
            None => {
                let current = self.get_request(id).await?;
                return Err(WorkflowError::InvalidTransition {
                    from: current.status,
                    action: decision.action(),
                });
            }
        };

        info!(request_id = request.id, status = %request.status, "request decided");
        self.dispatch(match decision {
            Decision::Approved => NotificationEvent::RequestApproved {
                request_id: request.id,
                requester_id: request.requester_id.clone(),
            },
            Decision::Declined => NotificationEvent::RequestDeclined {
                request_id: request.id,
                requester_id: request.requester_id.clone(),
                reason: request.decline_reason.clone(),
            },
        });

        Ok(request)
    }

    async fn issue(&self, id: RequestId) -> Result<Request, WorkflowError> {
        let mut tx = self.pool.begin().await?;

        // row lock serializes concurrent transitions on this request
        let request: Request = sqlx::query_as("SELECT * FROM requests WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(WorkflowError::RequestNotFound(id))?;

        let next = request.transition(TransitionAction::Issue)?;
        let RequestTarget::Item(item_id) = request.target else {
            return Err(WorkflowError::InvalidTransition {
                from: request.status,
                action: TransitionAction::Issue,
            });
        };

        // check-and-decrement in a single conditional statement; the WHERE
        // clause keeps quantity from ever going below zero under races
        let updated = sqlx::query(
            "UPDATE items SET quantity = quantity - $2, updated_at = now() WHERE id = $1 AND quantity >= $2",
        )
        .bind(item_id)
        .bind(request.quantity_requested)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            let available: Option<i32> =
                sqlx::query_scalar("SELECT quantity FROM items WHERE id = $1")
                    .bind(item_id)
                    .fetch_optional(&mut *tx)
                    .await?;

            // dropping the transaction rolls everything back
            return Err(match available {
                Some(available) => WorkflowError::InsufficientStock {
                    item_id,
                    requested: request.quantity_requested,
                    available,
                },
                None => WorkflowError::ItemNotFound(item_id),
            });
        }

        let request: Request = sqlx::query_as(
            "UPDATE requests SET status = $2, issued = TRUE, quantity_issued = quantity_requested, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(next)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            request_id = request.id,
            item_id,
            quantity = request.quantity_requested,
            "request issued"
        );
        self.dispatch(NotificationEvent::ItemIssued {
            request_id: request.id,
            requester_id: request.requester_id.clone(),
            item_id,
            quantity: request.quantity_requested,
        });

        Ok(request)
    }

    async fn mark_returned(&self, id: RequestId) -> Result<Request, WorkflowError> {
        let mut tx = self.pool.begin().await?;

        let request: Request = sqlx::query_as("SELECT * FROM requests WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(WorkflowError::RequestNotFound(id))?;

        let next = request.transition(TransitionAction::Return)?;
        let RequestTarget::Item(item_id) = request.target else {
            return Err(WorkflowError::InvalidTransition {
                from: request.status,
                action: TransitionAction::Return,
            });
        };

        let updated = sqlx::query(
            "UPDATE items SET quantity = quantity + $2, updated_at = now() WHERE id = $1",
        )
        .bind(item_id)
        .bind(request.quantity_requested)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(WorkflowError::ItemNotFound(item_id));
        }

        let request: Request = sqlx::query_as(
            "UPDATE requests SET status = $2, returned = TRUE, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(next)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            request_id = request.id,
            item_id,
            quantity = request.quantity_requested,
            "request returned"
        );
        self.dispatch(NotificationEvent::ItemReturned {
            request_id: request.id,
            requester_id: request.requester_id.clone(),
            item_id,
            quantity: request.quantity_requested,
        });

        Ok(request)
    }

    async fn get_request(&self, id: RequestId) -> Result<Request, WorkflowError> {
        sqlx::query_as("SELECT * FROM requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(WorkflowError::RequestNotFound(id))
    }

    async fn query_requests(&self, query: RequestQuery) -> Result<Vec<Request>, WorkflowError> {
        let mut builder = QueryBuilder::new("SELECT * FROM requests WHERE TRUE");

        if let Some(requester_id) = &query.requester_id {
            builder.push(" AND requester_id = ").push_bind(requester_id);
        }
        if let Some(status) = query.status {
            builder.push(" AND status = ").push_bind(status);
        }
        if let Some(kind) = query.target_kind {
            builder.push(" AND target_kind = ").push_bind(kind);
        }
        if let Some(issued) = query.issued {
            builder.push(" AND issued = ").push_bind(issued);
        }
        if let Some(returned) = query.returned {
            builder.push(" AND returned = ").push_bind(returned);
        }

        builder.push(if query.desc {
            " ORDER BY id DESC"
        } else {
            " ORDER BY id"
        });
        builder.push(" LIMIT ").push_bind(query.limit());
        builder.push(" OFFSET ").push_bind(query.offset());

        let requests = builder
            .build_query_as::<Request>()
            .fetch_all(&self.pool)
            .await?;

        Ok(requests)
    }
}

#[cfg(test)]
mod tests {
    use abi::{
        Item, ItemCategory, LoanDuration, NewDocument, NewItem, RequestQueue, RequestQueryBuilder,
    };
    use sqlx::PgPool;

    use super::*;

    fn engine(pool: PgPool) -> ReservationEngine {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        ReservationEngine::with_pool(pool)
    }

    async fn seed_item(engine: &ReservationEngine, quantity: i32) -> Item {
        engine
            .create_item(NewItem::new(
                "Oscilloscope",
                "4-channel scope",
                ItemCategory::Electronics,
                quantity,
            ))
            .await
            .unwrap()
    }

    async fn pending_request(
        engine: &ReservationEngine,
        requester: &str,
        item_id: i64,
        quantity: i32,
    ) -> Request {
        engine
            .create_request(NewRequest::new(
                requester,
                RequestTarget::Item(item_id),
                quantity,
                LoanDuration::ThreeDays,
            ))
            .await
            .unwrap()
    }

    async fn approved_request(
        engine: &ReservationEngine,
        requester: &str,
        item_id: i64,
        quantity: i32,
    ) -> Request {
        let request = pending_request(engine, requester, item_id, quantity).await;
        engine
            .decide(request.id, Decision::Approved, None)
            .await
            .unwrap()
    }

    #[sqlx_database_tester::test(pool(variable = "pool", migrations = "../migrations"))]
    async fn create_request_should_start_pending() {
        let engine = engine(pool);
        let item = seed_item(&engine, 5).await;

        let request = pending_request(&engine, "lect-1", item.id, 3).await;

        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.target, RequestTarget::Item(item.id));
        assert_eq!(request.quantity_requested, 3);
        assert_eq!(request.quantity_issued, 0);
        assert!(!request.issued);
        assert!(!request.returned);
        assert_eq!(request.decline_reason, None);
    }

    #[sqlx_database_tester::test(pool(variable = "pool", migrations = "../migrations"))]
    async fn create_request_for_missing_target_should_fail() {
        let engine = engine(pool);

        let err = engine
            .create_request(NewRequest::new(
                "lect-1",
                RequestTarget::Item(999),
                1,
                LoanDuration::OneDay,
            ))
            .await
            .unwrap_err();
        assert_eq!(err, WorkflowError::ItemNotFound(999));

        let err = engine
            .create_request(NewRequest::new(
                "lect-1",
                RequestTarget::Document(999),
                1,
                LoanDuration::OneDay,
            ))
            .await
            .unwrap_err();
        assert_eq!(err, WorkflowError::DocumentNotFound(999));
    }

    #[sqlx_database_tester::test(pool(variable = "pool", migrations = "../migrations"))]
    async fn document_request_should_carry_quantity_one() {
        let engine = engine(pool);
        let doc = engine
            .create_document(NewDocument::new(
                "Exam paper",
                "final",
                "uploads/exam.pdf",
                "admin-1",
            ))
            .await
            .unwrap();

        let request = engine
            .create_request(NewRequest::new(
                "lect-1",
                RequestTarget::Document(doc.id),
                7,
                LoanDuration::OneWeek,
            ))
            .await
            .unwrap();

        assert_eq!(request.quantity_requested, 1);
        assert_eq!(request.target, RequestTarget::Document(doc.id));
    }

    #[sqlx_database_tester::test(pool(variable = "pool", migrations = "../migrations"))]
    async fn decline_should_record_reason_terminally() {
        let engine = engine(pool);
        let item = seed_item(&engine, 5).await;
        let request = pending_request(&engine, "lect-1", item.id, 1).await;

        let declined = engine
            .decide(
                request.id,
                Decision::Declined,
                Some("out of budget".to_string()),
            )
            .await
            .unwrap();
        assert_eq!(declined.status, RequestStatus::Declined);
        assert_eq!(declined.decline_reason.as_deref(), Some("out of budget"));

        // terminal: no further transition is defined
        let err = engine.issue(request.id).await.unwrap_err();
        assert_eq!(
            err,
            WorkflowError::InvalidTransition {
                from: RequestStatus::Declined,
                action: TransitionAction::Issue,
            }
        );

        let err = engine
            .decide(request.id, Decision::Approved, None)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            WorkflowError::InvalidTransition {
                from: RequestStatus::Declined,
                action: TransitionAction::Approve,
            }
        );
    }

    #[sqlx_database_tester::test(pool(variable = "pool", migrations = "../migrations"))]
    async fn approve_should_clear_prior_reason() {
        let engine = engine(pool);
        let item = seed_item(&engine, 5).await;
        let request = pending_request(&engine, "lect-1", item.id, 1).await;

        // plant a reason directly to simulate a re-evaluated request
        sqlx::query("UPDATE requests SET decline_reason = 'stale' WHERE id = $1")
            .bind(request.id)
            .execute(engine.pool())
            .await
            .unwrap();

        let approved = engine
            .decide(request.id, Decision::Approved, None)
            .await
            .unwrap();
        assert_eq!(approved.status, RequestStatus::Approved);
        assert_eq!(approved.decline_reason, None);
    }

    #[sqlx_database_tester::test(pool(variable = "pool", migrations = "../migrations"))]
    async fn decide_missing_request_should_fail() {
        let engine = engine(pool);
        let err = engine
            .decide(999, Decision::Approved, None)
            .await
            .unwrap_err();
        assert_eq!(err, WorkflowError::RequestNotFound(999));
    }

    #[sqlx_database_tester::test(pool(variable = "pool", migrations = "../migrations"))]
    async fn issue_should_decrement_stock() {
        let engine = engine(pool);
        let item = seed_item(&engine, 5).await;
        let request = approved_request(&engine, "lect-1", item.id, 3).await;

        let issued = engine.issue(request.id).await.unwrap();
        assert_eq!(issued.status, RequestStatus::Issued);
        assert!(issued.issued);
        assert_eq!(issued.quantity_issued, 3);

        let item = engine.get_item(item.id).await.unwrap();
        assert_eq!(item.quantity, 2);
    }

    #[sqlx_database_tester::test(pool(variable = "pool", migrations = "../migrations"))]
    async fn issue_beyond_stock_should_fail_and_change_nothing() {
        let engine = engine(pool);
        let item = seed_item(&engine, 5).await;

        let a = approved_request(&engine, "lect-1", item.id, 3).await;
        engine.issue(a.id).await.unwrap();

        // item is down to 2; B wants 3
        let b = approved_request(&engine, "lect-2", item.id, 3).await;
        let err = engine.issue(b.id).await.unwrap_err();
        assert_eq!(
            err,
            WorkflowError::InsufficientStock {
                item_id: item.id,
                requested: 3,
                available: 2,
            }
        );

        // nothing moved: B stays approved and retryable, stock untouched
        let b = engine.get_request(b.id).await.unwrap();
        assert_eq!(b.status, RequestStatus::Approved);
        assert!(!b.issued);
        assert_eq!(engine.get_item(item.id).await.unwrap().quantity, 2);
    }

    #[sqlx_database_tester::test(pool(variable = "pool", migrations = "../migrations"))]
    async fn return_should_restore_stock_exactly() {
        let engine = engine(pool);
        let item = seed_item(&engine, 5).await;
        let request = approved_request(&engine, "lect-1", item.id, 3).await;

        engine.issue(request.id).await.unwrap();
        assert_eq!(engine.get_item(item.id).await.unwrap().quantity, 2);

        let returned = engine.mark_returned(request.id).await.unwrap();
        assert_eq!(returned.status, RequestStatus::Returned);
        assert!(returned.returned);

        // round trip: back to the pre-issue value
        assert_eq!(engine.get_item(item.id).await.unwrap().quantity, 5);
    }

    #[sqlx_database_tester::test(pool(variable = "pool", migrations = "../migrations"))]
    async fn issue_from_pending_should_fail() {
        let engine = engine(pool);
        let item = seed_item(&engine, 5).await;
        let request = pending_request(&engine, "lect-1", item.id, 1).await;

        let err = engine.issue(request.id).await.unwrap_err();
        assert_eq!(
            err,
            WorkflowError::InvalidTransition {
                from: RequestStatus::Pending,
                action: TransitionAction::Issue,
            }
        );
    }

    #[sqlx_database_tester::test(pool(variable = "pool", migrations = "../migrations"))]
    async fn double_issue_and_double_return_should_fail() {
        let engine = engine(pool);
        let item = seed_item(&engine, 5).await;
        let request = approved_request(&engine, "lect-1", item.id, 2).await;

        engine.issue(request.id).await.unwrap();
        let err = engine.issue(request.id).await.unwrap_err();
        assert_eq!(
            err,
            WorkflowError::InvalidTransition {
                from: RequestStatus::Issued,
                action: TransitionAction::Issue,
            }
        );

        engine.mark_returned(request.id).await.unwrap();
        let err = engine.mark_returned(request.id).await.unwrap_err();
        assert_eq!(
            err,
            WorkflowError::InvalidTransition {
                from: RequestStatus::Returned,
                action: TransitionAction::Return,
            }
        );

        // the rejected retries never touched the counter
        assert_eq!(engine.get_item(item.id).await.unwrap().quantity, 5);
    }

    #[sqlx_database_tester::test(pool(variable = "pool", migrations = "../migrations"))]
    async fn issue_of_document_request_should_fail() {
        let engine = engine(pool);
        let doc = engine
            .create_document(NewDocument::new("Syllabus", "", "uploads/syllabus.pdf", "admin-1"))
            .await
            .unwrap();

        let request = engine
            .create_request(NewRequest::new(
                "lect-1",
                RequestTarget::Document(doc.id),
                1,
                LoanDuration::OneDay,
            ))
            .await
            .unwrap();
        let approved = engine
            .decide(request.id, Decision::Approved, None)
            .await
            .unwrap();
        assert_eq!(approved.status, RequestStatus::Approved);

        let err = engine.issue(request.id).await.unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
    }

    #[sqlx_database_tester::test(pool(variable = "pool", migrations = "../migrations"))]
    async fn concurrent_issue_should_admit_a_single_winner() {
        let engine = engine(pool);
        let item = seed_item(&engine, 3).await;

        // both want the full remaining stock
        let a = approved_request(&engine, "lect-1", item.id, 3).await;
        let b = approved_request(&engine, "lect-2", item.id, 3).await;

        let (ra, rb) = tokio::join!(engine.issue(a.id), engine.issue(b.id));
        assert!(ra.is_ok() != rb.is_ok(), "exactly one issue must win");

        let loser = if ra.is_ok() { rb } else { ra };
        assert!(matches!(
            loser.unwrap_err(),
            WorkflowError::InsufficientStock { available: 0, .. }
        ));

        assert_eq!(engine.get_item(item.id).await.unwrap().quantity, 0);
    }

    #[sqlx_database_tester::test(pool(variable = "pool", migrations = "../migrations"))]
    async fn concurrent_issue_of_same_request_should_apply_once() {
        let engine = engine(pool);
        let item = seed_item(&engine, 5).await;
        let request = approved_request(&engine, "lect-1", item.id, 2).await;

        let (ra, rb) = tokio::join!(engine.issue(request.id), engine.issue(request.id));
        assert!(ra.is_ok() != rb.is_ok(), "exactly one issue must win");

        let loser = if ra.is_ok() { rb } else { ra };
        assert!(matches!(
            loser.unwrap_err(),
            WorkflowError::InvalidTransition { .. }
        ));

        // decremented once, not twice
        assert_eq!(engine.get_item(item.id).await.unwrap().quantity, 3);
    }

    #[sqlx_database_tester::test(pool(variable = "pool", migrations = "../migrations"))]
    async fn queues_should_follow_the_flags() {
        let engine = engine(pool);
        let item = seed_item(&engine, 10).await;

        let approved = approved_request(&engine, "lect-1", item.id, 1).await;
        let issued = approved_request(&engine, "lect-2", item.id, 1).await;
        engine.issue(issued.id).await.unwrap();
        let returned = approved_request(&engine, "lect-3", item.id, 1).await;
        engine.issue(returned.id).await.unwrap();
        engine.mark_returned(returned.id).await.unwrap();
        // pending request stays out of every queue
        pending_request(&engine, "lect-4", item.id, 1).await;

        let queue = engine
            .query_requests(RequestQueue::Approved.to_query())
            .await
            .unwrap();
        assert_eq!(queue.iter().map(|r| r.id).collect::<Vec<_>>(), vec![approved.id]);

        let queue = engine
            .query_requests(RequestQueue::Issued.to_query())
            .await
            .unwrap();
        assert_eq!(queue.iter().map(|r| r.id).collect::<Vec<_>>(), vec![issued.id]);

        let queue = engine
            .query_requests(RequestQueue::Returned.to_query())
            .await
            .unwrap();
        assert_eq!(queue.iter().map(|r| r.id).collect::<Vec<_>>(), vec![returned.id]);
    }

    #[sqlx_database_tester::test(pool(variable = "pool", migrations = "../migrations"))]
    async fn query_should_filter_by_requester() {
        let engine = engine(pool);
        let item = seed_item(&engine, 10).await;

        let mine = pending_request(&engine, "lect-1", item.id, 1).await;
        pending_request(&engine, "lect-2", item.id, 1).await;

        let query = RequestQueryBuilder::default()
            .requester_id("lect-1")
            .build()
            .unwrap();
        let requests = engine.query_requests(query).await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].id, mine.id);
    }

    #[sqlx_database_tester::test(pool(variable = "pool", migrations = "../migrations"))]
    async fn query_should_paginate_and_order() {
        let engine = engine(pool);
        let item = seed_item(&engine, 10).await;

        for _ in 0..5 {
            pending_request(&engine, "lect-1", item.id, 1).await;
        }

        let query = RequestQueryBuilder::default()
            .page(1)
            .page_size(2)
            .desc(true)
            .build()
            .unwrap();
        let requests = engine.query_requests(query).await.unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].id > requests[1].id);

        let query = RequestQueryBuilder::default()
            .page(3)
            .page_size(2)
            .build()
            .unwrap();
        let requests = engine.query_requests(query).await.unwrap();
        assert_eq!(requests.len(), 1);
    }

    #[sqlx_database_tester::test(pool(variable = "pool", migrations = "../migrations"))]
    async fn get_missing_request_should_fail() {
        let engine = engine(pool);
        let err = engine.get_request(999).await.unwrap_err();
        assert_eq!(err, WorkflowError::RequestNotFound(999));
    }
}
