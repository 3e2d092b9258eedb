use abi::{Operation, Role, WorkflowError};
use tracing::warn;

/// The access policy gate. Consulted before any operation is invoked; denial
/// is a `Forbidden`, distinct from the state machine's own failures.
pub trait AccessPolicy: Send + Sync {
    fn authorize(&self, role: Role, operation: Operation) -> Result<(), WorkflowError>;
}

/// The department's role matrix: lecturers submit and read their own
/// requests, admins decide, storekeepers handle stock. Everyone may browse
/// the catalogue.
pub struct RolePolicy;

impl AccessPolicy for RolePolicy {
    fn authorize(&self, role: Role, operation: Operation) -> Result<(), WorkflowError> {
        let allowed = match operation {
            Operation::SubmitRequest | Operation::ListOwnRequests => role == Role::Lecturer,
            Operation::ListAllRequests | Operation::DecideRequest => role == Role::Admin,
            Operation::ListQueue | Operation::IssueItem | Operation::ReturnItem => {
                role == Role::Storekeeper
            }
            Operation::BrowseCatalogue => true,
        };

        if allowed {
            Ok(())
        } else {
            warn!(%role, %operation, "access denied");
            Err(WorkflowError::Forbidden { role, operation })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lecturer_should_only_submit_and_read_own() {
        let policy = RolePolicy;
        assert!(policy
            .authorize(Role::Lecturer, Operation::SubmitRequest)
            .is_ok());
        assert!(policy
            .authorize(Role::Lecturer, Operation::ListOwnRequests)
            .is_ok());
        assert!(policy
            .authorize(Role::Lecturer, Operation::BrowseCatalogue)
            .is_ok());

        for operation in [
            Operation::ListAllRequests,
            Operation::DecideRequest,
            Operation::ListQueue,
            Operation::IssueItem,
            Operation::ReturnItem,
        ] {
            assert_eq!(
                policy.authorize(Role::Lecturer, operation).unwrap_err(),
                WorkflowError::Forbidden {
                    role: Role::Lecturer,
                    operation,
                }
            );
        }
    }

    #[test]
    fn admin_should_only_decide_and_list() {
        let policy = RolePolicy;
        assert!(policy
            .authorize(Role::Admin, Operation::DecideRequest)
            .is_ok());
        assert!(policy
            .authorize(Role::Admin, Operation::ListAllRequests)
            .is_ok());

        for operation in [
            Operation::SubmitRequest,
            Operation::IssueItem,
            Operation::ReturnItem,
            Operation::ListQueue,
        ] {
            assert!(policy.authorize(Role::Admin, operation).is_err());
        }
    }

    #[test]
    fn storekeeper_should_only_handle_stock() {
        let policy = RolePolicy;
        for operation in [
            Operation::ListQueue,
            Operation::IssueItem,
            Operation::ReturnItem,
            Operation::BrowseCatalogue,
        ] {
            assert!(policy.authorize(Role::Storekeeper, operation).is_ok());
        }

        for operation in [Operation::SubmitRequest, Operation::DecideRequest] {
            assert!(policy.authorize(Role::Storekeeper, operation).is_err());
        }
    }
}
