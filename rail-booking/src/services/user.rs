use std::sync::Arc;

use crate::{
    error::{RailError, RailResult},
    ledger::SqliteLedger,
    models::User,
    repository::{tickets, trains, users},
};

pub struct UserService {
    ledger: Arc<SqliteLedger>,
}

impl UserService {
    pub fn new(ledger: Arc<SqliteLedger>) -> Self {
        Self { ledger }
    }

    /// Register a user
    pub fn add_user(&self, email: &str, details: Option<String>) -> RailResult<User> {
        if !User::is_valid_email(email) {
            return Err(RailError::InvalidArgument(format!("invalid email '{}'", email)));
        }

        let user = User {
            email: email.to_string(),
            details,
        };
        self.ledger.transaction(|tx| users::insert(tx, &user))?;

        tracing::info!(user = email, "user added");
        Ok(user)
    }

    pub fn get_user(&self, email: &str) -> RailResult<Option<User>> {
        self.ledger.with_connection(|conn| users::find(conn, email))
    }

    /// Delete a user with all tickets and history
    ///
    /// Each reserved ticket gives its seat back to the ticket's train.
    pub fn delete_user(&self, email: &str) -> RailResult<()> {
        let (released, tickets_removed) = self.ledger.transaction(|tx| {
            users::require(tx, email)?;

            let mut released = 0;
            for train in tickets::reserved_trains_for_user(tx, email)? {
                if trains::release_seat(tx, train)? {
                    released += 1;
                } else {
                    tracing::warn!(
                        user = email,
                        train = %train,
                        "reserved ticket references a missing train"
                    );
                }
            }

            let tickets_removed = tickets::delete_for_user(tx, email)?;
            users::delete(tx, email)?;
            Ok((released, tickets_removed))
        })?;

        tracing::info!(
            user = email,
            tickets = tickets_removed,
            released_seats = released,
            "user deleted"
        );
        Ok(())
    }

    pub fn get_all_users(&self) -> RailResult<Vec<User>> {
        self.ledger.with_connection(users::list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> UserService {
        UserService::new(Arc::new(SqliteLedger::in_memory().unwrap()))
    }

    #[test]
    fn test_add_user() {
        let service = service();

        service.add_user("rider@rail.com", Some("window seat".into())).unwrap();
        service.add_user("other@rail.com", None).unwrap();

        let user = service.get_user("rider@rail.com").unwrap().unwrap();
        assert_eq!(user.details.as_deref(), Some("window seat"));
        assert_eq!(service.get_all_users().unwrap().len(), 2);
    }

    #[test]
    fn test_add_user_rejects_invalid_and_duplicate() {
        let service = service();

        assert!(matches!(
            service.add_user("not-an-email", None),
            Err(RailError::InvalidArgument(_))
        ));

        service.add_user("rider@rail.com", None).unwrap();
        assert!(matches!(
            service.add_user("rider@rail.com", None),
            Err(RailError::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_delete_missing_user() {
        let service = service();
        assert!(matches!(
            service.delete_user("ghost@rail.com"),
            Err(RailError::NotFound(_))
        ));
    }
}
