//! Synthetic user seeding

use rand::{Rng, distributions::Alphanumeric, seq::SliceRandom};
use sea_orm::DatabaseConnection;
use tokio::task::JoinSet;
use uuid::Uuid;

use super::SeedError;
use crate::models::user::Model as UserModel;
use crate::repositories::{NewUser, UserRepository};

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Barbara", "Claude", "Dennis", "Edsger", "Frances", "Grace", "Hedy", "Ken",
    "Linus", "Margaret", "Niklaus", "Radia", "Tony", "Yukihiro",
];

const LAST_NAMES: &[&str] = &[
    "Allen", "Backus", "Hopper", "Kay", "Knuth", "Lamport", "Liskov", "Lovelace", "McCarthy",
    "Perlman", "Ritchie", "Shannon", "Thompson", "Turing", "Wirth",
];

/// Outcome of one user creation, tagged with its position in the batch
pub type UserOutcome = (usize, Result<UserModel, SeedError>);

/// Generate plausible user data; the random suffix keeps usernames distinct
/// across runs.
pub fn synthetic_user<R: Rng + ?Sized>(rng: &mut R, index: usize) -> NewUser {
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or("Test");
    let last = LAST_NAMES.choose(rng).copied().unwrap_or("User");
    let suffix: String = rng
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect::<String>()
        .to_lowercase();

    let username = format!("{}_{}{}{}", first, last, index, suffix).to_lowercase();

    NewUser {
        email: format!("{username}@example.com"),
        username,
        name: Some(format!("{first} {last}")),
    }
}

/// Create `count` users concurrently, each connected to `role_id`.
///
/// Every user yields its own outcome; a failed creation never aborts the
/// others. Outcomes are returned in batch order.
pub async fn create_users(
    db: &DatabaseConnection,
    role_id: Uuid,
    count: usize,
) -> Vec<Result<UserModel, SeedError>> {
    let drafts: Vec<NewUser> = {
        let mut rng = rand::thread_rng();
        (0..count).map(|index| synthetic_user(&mut rng, index)).collect()
    };

    create_users_from(db, role_id, drafts).await
}

/// Create the given users concurrently, one outcome per draft in order.
pub(crate) async fn create_users_from(
    db: &DatabaseConnection,
    role_id: Uuid,
    drafts: Vec<NewUser>,
) -> Vec<Result<UserModel, SeedError>> {
    let count = drafts.len();
    let mut tasks = JoinSet::new();
    for (index, draft) in drafts.into_iter().enumerate() {
        let db = db.clone();
        tasks.spawn(async move { (index, create_one(&db, role_id, draft).await) });
    }

    let mut outcomes: Vec<UserOutcome> = Vec::with_capacity(count);
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(outcome) => outcomes.push(outcome),
            Err(join_error) => {
                // The index of a panicked task is unknown; it is filled in below.
                log::error!("User creation task failed: {}", join_error);
            }
        }
    }

    outcomes.sort_by_key(|(index, _)| *index);

    let mut results = Vec::with_capacity(count);
    let mut outcomes = outcomes.into_iter().peekable();
    for index in 0..count {
        match outcomes.next_if(|(i, _)| *i == index) {
            Some((_, result)) => results.push(result),
            None => results.push(Err(SeedError::TaskAborted { index })),
        }
    }

    for (index, result) in results.iter().enumerate() {
        if let Err(error) = result {
            log::error!("Error creating user {}: {}", index, error);
        }
    }

    results
}

async fn create_one(
    db: &DatabaseConnection,
    role_id: Uuid,
    draft: NewUser,
) -> Result<UserModel, SeedError> {
    let username = draft.username.clone();

    UserRepository::new(db)
        .create_user_with_role(draft, role_id)
        .await
        .map_err(|source| SeedError::UserCreation { username, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RepositoryError;
    use crate::models::User;
    use crate::repositories::RoleRepository;
    use migration::{Migrator, MigratorTrait};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use sea_orm::{Database, EntityTrait, PaginatorTrait};

    async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    fn draft(username: &str) -> NewUser {
        NewUser {
            email: format!("{username}@example.com"),
            username: username.to_string(),
            name: None,
        }
    }

    #[test]
    fn synthetic_users_are_well_formed() {
        let mut rng = StdRng::seed_from_u64(7);
        let user = synthetic_user(&mut rng, 3);

        assert!(user.email.ends_with("@example.com"));
        assert!(user.email.starts_with(&user.username));
        assert_eq!(user.username, user.username.to_lowercase());
        assert!(user.name.is_some());
    }

    #[test]
    fn synthetic_usernames_differ_within_a_batch() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut names: Vec<String> = (0..50)
            .map(|i| synthetic_user(&mut rng, i).username)
            .collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 50);
    }

    #[tokio::test]
    async fn failed_user_does_not_stop_the_batch() {
        let db = setup_test_db().await;
        let role = RoleRepository::new(&db)
            .upsert_role("tenant", "Tenant user", &[])
            .await
            .unwrap();
        let users = UserRepository::new(&db);
        users.create_user(draft("taken")).await.unwrap();

        let mut clash = draft("taken");
        clash.email = "someone-else@example.com".to_string();
        let outcomes =
            create_users_from(&db, role.id, vec![draft("first"), clash, draft("third")]).await;

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].as_ref().unwrap().username, "first");
        assert!(matches!(
            &outcomes[1],
            Err(SeedError::UserCreation {
                username,
                source: RepositoryError::Conflict(_),
            }) if username == "taken"
        ));
        assert_eq!(outcomes[2].as_ref().unwrap().username, "third");

        // Only the pre-existing "taken" row plus the two successes
        assert_eq!(User::find().count(&db).await.unwrap(), 3);
        let third = outcomes[2].as_ref().unwrap();
        assert_eq!(users.roles_for_user(third.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_role_link_leaves_no_user_rows() {
        let db = setup_test_db().await;

        let outcomes = create_users(&db, Uuid::new_v4(), 3).await;

        assert_eq!(outcomes.len(), 3);
        assert!(
            outcomes
                .iter()
                .all(|outcome| matches!(outcome, Err(SeedError::UserCreation { .. })))
        );
        assert_eq!(User::find().count(&db).await.unwrap(), 0);
    }
}
