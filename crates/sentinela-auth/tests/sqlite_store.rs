use std::sync::Arc;

use sentinela_auth::audit::actions;
use sentinela_auth::store::seed::seed_admin;
use sentinela_auth::{
    AuditLog, AuthError, CreateUserRequest, Role, RoleTable, SessionContext, SqliteAuthStore,
    UpdateUserRequest, UserStore, authenticate, hash_password,
};

async fn store() -> SqliteAuthStore {
    let store = SqliteAuthStore::open_in_memory().unwrap();
    store.migrate().await.unwrap();
    store
}

fn analyst(matricula: &str) -> CreateUserRequest {
    CreateUserRequest {
        name: "Bruno Costa".into(),
        email: "bruno@banco.example".into(),
        matricula: matricula.into(),
        role: Role::Analista,
        password: "analista-123".into(),
    }
}

#[tokio::test]
async fn create_and_authenticate() {
    let store = store().await;
    let req = analyst("F1001");
    let hash = hash_password(&req.password).unwrap();
    let user = store.create_user(&req, &hash).await.unwrap();
    assert_eq!(user.role, Role::Analista);
    assert!(user.is_active);

    let found = authenticate(&store, "F1001", "analista-123").await.unwrap();
    assert_eq!(found.id, user.id);

    assert!(matches!(
        authenticate(&store, "F1001", "wrong-password").await,
        Err(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        authenticate(&store, "F9999", "analista-123").await,
        Err(AuthError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn duplicate_matricula() {
    let store = store().await;
    let req = analyst("F1002");
    let hash = hash_password(&req.password).unwrap();
    store.create_user(&req, &hash).await.unwrap();
    assert!(matches!(
        store.create_user(&req, &hash).await,
        Err(AuthError::DuplicateMatricula(_))
    ));
}

#[tokio::test]
async fn deactivated_user_cannot_login() {
    let store = store().await;
    let req = analyst("F1003");
    let hash = hash_password(&req.password).unwrap();
    let user = store.create_user(&req, &hash).await.unwrap();
    store
        .update_user(
            &user.id,
            &UpdateUserRequest {
                role: None,
                is_active: Some(false),
            },
        )
        .await
        .unwrap();
    assert!(matches!(
        authenticate(&store, "F1003", "analista-123").await,
        Err(AuthError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn last_admin_is_protected() {
    let store = store().await;
    let admin = seed_admin(&store, "A0001", "Admin", "admin@banco.example", "admin-pass-1")
        .await
        .unwrap()
        .unwrap();
    // second seed is a no-op
    assert!(
        seed_admin(&store, "A0002", "Other", "o@banco.example", "admin-pass-2")
            .await
            .unwrap()
            .is_none()
    );

    let demote = UpdateUserRequest {
        role: Some(Role::Gestor),
        is_active: None,
    };
    assert!(matches!(
        store.update_user(&admin.id, &demote).await,
        Err(AuthError::LastAdministrator)
    ));

    let mut second = analyst("A0003");
    second.role = Role::Admin;
    let hash = hash_password(&second.password).unwrap();
    store.create_user(&second, &hash).await.unwrap();
    let demoted = store.update_user(&admin.id, &demote).await.unwrap();
    assert_eq!(demoted.role, Role::Gestor);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_demotions_keep_one_admin() {
    let store = Arc::new(store().await);
    let mut ids = Vec::new();
    for matricula in ["A0101", "A0102"] {
        let mut req = analyst(matricula);
        req.role = Role::Admin;
        ids.push(store.create_user(&req, "not-a-hash").await.unwrap().id);
    }

    let demote = UpdateUserRequest {
        role: Some(Role::Analista),
        is_active: Some(false),
    };
    let handles: Vec<_> = ids
        .iter()
        .cloned()
        .map(|id| {
            let store = store.clone();
            let demote = demote.clone();
            tokio::spawn(async move { store.update_user(&id, &demote).await })
        })
        .collect();
    let mut refused = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(user) => {
                assert_eq!(user.role, Role::Analista);
                assert!(!user.is_active);
            }
            Err(AuthError::LastAdministrator) => refused += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(refused, 1);
    assert_eq!(store.count_by_role(Role::Admin).await.unwrap(), 1);

    // the refused update left the survivor untouched
    let survivors: Vec<_> = store
        .list_users()
        .await
        .unwrap()
        .into_iter()
        .filter(|u| u.role == Role::Admin)
        .collect();
    assert_eq!(survivors.len(), 1);
    assert!(survivors[0].is_active);
}

#[tokio::test]
async fn audit_log_is_append_only() {
    let store = Arc::new(store().await);
    for i in 0..7 {
        store
            .append("F1001", actions::EXPORT_CSV, "ecl", &format!("batch {i}"))
            .await
            .unwrap();
    }
    assert_eq!(store.count().await.unwrap(), 7);

    let entries = store.list(100, 0).await.unwrap();
    let details: Vec<&str> = entries.iter().map(|e| e.details.as_str()).collect();
    assert_eq!(details[0], "batch 0");
    assert_eq!(details[6], "batch 6");
}

#[tokio::test]
async fn session_context_over_sqlite() {
    let store = Arc::new(store().await);
    let req = analyst("F2001");
    let hash = hash_password(&req.password).unwrap();
    store.create_user(&req, &hash).await.unwrap();

    let mut ctx = SessionContext::new(Arc::new(RoleTable::builtin()), store.clone());
    let user = authenticate(store.as_ref(), "F2001", "analista-123")
        .await
        .unwrap();
    ctx.login(user).await.unwrap();
    assert!(ctx.check_permission("run:classification"));
    assert!(!ctx.check_permission("view:audit"));
    ctx.logout().await.unwrap();

    let actions: Vec<String> = store
        .list(10, 0)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.action)
        .collect();
    assert_eq!(actions, vec!["LOGIN", "LOGOUT"]);
}

#[tokio::test]
async fn audit_rows_cannot_be_rewritten() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("sentinela.db");
    let path = path.to_str().unwrap();

    {
        let store = SqliteAuthStore::open(path).unwrap();
        store.migrate().await.unwrap();
        store
            .append("F1001", actions::LOGIN, "session", "")
            .await
            .unwrap();
    }

    let raw = rusqlite::Connection::open(path).unwrap();
    assert!(
        raw.execute("UPDATE audit_log SET acao = 'LOGOUT'", [])
            .is_err()
    );
    assert!(raw.execute("DELETE FROM audit_log", []).is_err());
    drop(raw);

    let store = SqliteAuthStore::open(path).unwrap();
    store.migrate().await.unwrap();
    let entries = store.list(10, 0).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, "LOGIN");
}
