use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::routing::{get, post};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use sentinela_auth::{
    AuditEntry, AuditLog, AuthError, CreateUserRequest, Role, RoleTable, SqliteAuthStore, UpdateUserRequest, User,
    UserStore, create_jwt, hash_password,
};
use sentinela_core::Settings;
use sentinela_web::{AppState, build_router};

struct TestApp {
    router: Router,
    store: Arc<SqliteAuthStore>,
    secret: String,
}

impl TestApp {
    async fn new() -> Self {
        Self::with(BTreeMap::new(), None).await
    }

    async fn with(roles: BTreeMap<String, Vec<String>>, backend_url: Option<&str>) -> Self {
        let store = Arc::new(SqliteAuthStore::open_in_memory().unwrap());
        store.migrate().await.unwrap();

        let mut settings = Settings::default_settings(Path::new("."));
        // nothing listens here unless a test backend is given
        let url = backend_url.unwrap_or("http://127.0.0.1:9");
        for key in ["api.prinad_url", "api.ecl_url", "api.propensao_url", "api.analytics_url"] {
            settings.set(key, url).unwrap();
        }
        settings.set("api.timeout_secs", "2").unwrap();
        let secret = settings.server.jwt_secret.clone();

        let table = Arc::new(RoleTable::from_overrides(&roles).unwrap());
        let state =
            AppState::new(settings, None, store.clone(), store.clone(), table).unwrap();
        Self {
            router: build_router(Arc::new(state)),
            store,
            secret,
        }
    }

    /// Users that never log in through the API get a placeholder hash.
    async fn user(&self, matricula: &str, role: Role) -> (User, String) {
        let req = CreateUserRequest {
            name: format!("User {matricula}"),
            email: format!("{matricula}@banco.example"),
            matricula: matricula.into(),
            role,
            password: "unused-password".into(),
        };
        let user = self.store.create_user(&req, "not-a-hash").await.unwrap();
        let token = create_jwt(&user, &self.secret).unwrap();
        (user, token)
    }

    async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(v) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let resp = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    async fn actions(&self) -> Vec<String> {
        self.store
            .list(500, 0)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.action)
            .collect()
    }
}

#[tokio::test]
async fn login_flow() {
    let app = TestApp::new().await;
    let req = CreateUserRequest {
        name: "Ana Lima".into(),
        email: "ana@banco.example".into(),
        matricula: "F0001".into(),
        role: Role::Analista,
        password: "analista-123".into(),
    };
    let hash = hash_password(&req.password).unwrap();
    app.store.create_user(&req, &hash).await.unwrap();

    let (status, body) = app
        .call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "matricula": "F0001", "password": "wrong-pass" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid matricula or password");

    let (status, body) = app
        .call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "matricula": "F0001", "password": "analista-123" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "ANALISTA");
    let token = body["token"].as_str().unwrap().to_string();

    let (status, me) = app.call("GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["read_only"], false);
    let perms: Vec<&str> = me["permissions"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(perms.contains(&"run:classification"));
    assert!(!perms.contains(&"view:audit"));

    let (status, _) = app.call("POST", "/api/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(app.actions().await, vec!["LOGIN_FAILED", "LOGIN", "LOGOUT"]);
}

#[tokio::test]
async fn bad_tokens_are_rejected() {
    let app = TestApp::new().await;
    let (status, _) = app
        .call("GET", "/api/auth/me", Some("not.a.jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (user, token) = app.user("F0002", Role::Gestor).await;
    app.store
        .update_user(
            &user.id,
            &UpdateUserRequest {
                role: None,
                is_active: Some(false),
            },
        )
        .await
        .unwrap();
    let (status, _) = app.call("GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn audit_access_by_role() {
    let app = TestApp::new().await;
    let (_, analyst) = app.user("F0010", Role::Analista).await;
    let (_, auditor) = app.user("F0011", Role::Auditor).await;

    let (status, _) = app.call("GET", "/api/audit", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.call("GET", "/api/audit", Some(&analyst), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "missing permission: view:audit");

    let (status, body) = app.call("GET", "/api/audit", Some(&auditor), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);

    // the previous view was itself recorded
    let (_, body) = app
        .call("GET", "/api/audit?limit=10", Some(&auditor), None)
        .await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["entries"][0]["acao"], "VIEW_AUDIT");
    assert_eq!(body["entries"][0]["usuario"], "F0011");
}

#[tokio::test]
async fn audit_export_is_csv() {
    let app = TestApp::new().await;
    let (_, auditor) = app.user("F0012", Role::Auditor).await;
    app.store
        .append("F0001", "LOGIN", "session", "")
        .await
        .unwrap();

    let (status, body) = app
        .call("GET", "/api/audit/export", Some(&auditor), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let csv = body.as_str().unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("id,timestamp,usuario,acao,recurso,detalhes")
    );
    assert!(lines.next().unwrap().contains(",F0001,LOGIN,session,"));
    assert_eq!(app.actions().await, vec!["LOGIN", "EXPORT_CSV"]);
}

#[tokio::test]
async fn auditor_is_read_only_even_with_wildcard() {
    let mut roles = BTreeMap::new();
    roles.insert("AUDITOR".to_string(), vec!["*".to_string()]);
    let app = TestApp::with(roles, None).await;
    let (_, auditor) = app.user("F0020", Role::Auditor).await;

    let (status, body) = app
        .call(
            "PUT",
            "/api/settings",
            Some(&auditor),
            Some(json!({ "api.timeout_secs": "60" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().starts_with("read-only"));

    // reads still work
    let (status, _) = app.call("GET", "/api/settings", Some(&auditor), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn admin_updates_settings() {
    let app = TestApp::new().await;
    let (_, admin) = app.user("A0001", Role::Admin).await;

    let (status, body) = app
        .call(
            "PUT",
            "/api/settings",
            Some(&admin),
            Some(json!({ "api.timeout_secs": "60", "llm.api_key": "sk-test-123456" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["api"]["timeout_secs"], 60);
    assert_eq!(body["llm"]["api_key"], "****3456");
    assert_ne!(body["server"]["jwt_secret"], app.secret.as_str());

    let (status, _) = app
        .call(
            "PUT",
            "/api/settings",
            Some(&admin),
            Some(json!({ "server.jwt_secret": "0123456789abcdef0123" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(
            "PUT",
            "/api/settings",
            Some(&admin),
            Some(json!({ "api.unknown": "x" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(app.actions().await, vec!["UPDATE_SETTINGS"]);
}

#[tokio::test]
async fn user_management() {
    let app = TestApp::new().await;
    let (_, admin) = app.user("A0002", Role::Admin).await;
    let (_, gestor) = app.user("F0030", Role::Gestor).await;

    let new_user = json!({
        "name": "Caio Reis",
        "email": "caio@banco.example",
        "matricula": "F0031",
        "role": "ANALISTA",
        "password": "caio-senha-1"
    });
    let (status, _) = app
        .call("POST", "/api/users", Some(&gestor), Some(new_user.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .call("POST", "/api/users", Some(&admin), Some(new_user.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .call("POST", "/api/users", Some(&admin), Some(new_user))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .call(
            "PATCH",
            &format!("/api/users/{id}"),
            Some(&admin),
            Some(json!({ "role": "GESTOR" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "GESTOR");

    let (status, body) = app.call("GET", "/api/users", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    assert_eq!(app.actions().await, vec!["CREATE_USER", "UPDATE_USER"]);
}

#[tokio::test]
async fn navigation_follows_gates() {
    let app = TestApp::new().await;
    let (status, body) = app.call("GET", "/api/navigation", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (_, gestor) = app.user("F0040", Role::Gestor).await;
    let (_, body) = app.call("GET", "/api/navigation", Some(&gestor), None).await;
    let pages: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|i| i["page"].as_str())
        .collect();
    assert_eq!(
        pages,
        vec!["dashboard", "prinad", "ecl", "propensao", "analytics", "pipeline", "settings"]
    );
}

#[tokio::test]
async fn backend_failures() {
    let app = TestApp::new().await;
    let (_, analyst) = app.user("F0050", Role::Analista).await;

    // rejected before any network call
    let (status, body) = app
        .call(
            "POST",
            "/api/prinad/simple_classify",
            Some(&analyst),
            Some(json!({ "cpf": "123" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("CPF"));

    let (status, _) = app
        .call("GET", "/api/ecl/grupos_homogeneos", Some(&analyst), None)
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let (status, _) = app
        .call("GET", "/api/analytics/drift-report", Some(&analyst), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

async fn spawn_ecl_backend() -> String {
    let app = Router::new().route(
        "/calcular_portfolio",
        post(|| async {
            axum::Json(json!({
                "ecl_total": 150.0,
                "ead_total": 10000.0,
                "resultados": [
                    { "cliente_id": "C1", "pd": 0.05, "lgd": 0.5, "ead": 4000.0,
                      "ecl": 100.0, "estagio": 2 },
                    { "cliente_id": "C2", "pd": 0.01, "lgd": 0.5, "ead": 6000.0,
                      "ecl": 50.0, "estagio": 1 }
                ]
            }))
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn portfolio_report_renders_markdown() {
    let url = spawn_ecl_backend().await;
    let app = TestApp::with(BTreeMap::new(), Some(&url)).await;
    let (_, gestor) = app.user("F0060", Role::Gestor).await;

    let request = json!({
        "title": "Carteira PF",
        "reference_date": "2026-09-30",
        "operacoes": [
            { "cliente_id": "C1", "produto": "cartao", "saldo_utilizado": 4000.0, "limite_total": 5000.0 },
            { "cliente_id": "C2", "produto": "cartao", "saldo_utilizado": 6000.0, "limite_total": 8000.0 }
        ]
    });
    let (status, body) = app
        .call("POST", "/api/reports/portfolio", Some(&gestor), Some(request))
        .await;
    assert_eq!(status, StatusCode::OK);
    let report = body.as_str().unwrap();
    assert!(report.starts_with("# Carteira PF\n"));
    assert!(report.contains("2026-09-30"));
    assert!(report.contains("User F0060 (F0060)"));

    assert_eq!(app.actions().await, vec!["EXPORT_REPORT"]);
}

#[tokio::test]
async fn short_jwt_secret_refuses_to_start() {
    let store = Arc::new(SqliteAuthStore::open_in_memory().unwrap());
    let mut settings = Settings::default_settings(Path::new("."));
    settings.server.jwt_secret = "short".into();
    let table = Arc::new(RoleTable::builtin());
    assert!(AppState::new(settings, None, store.clone(), store, table).is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_settings_updates_are_not_lost() {
    let app = TestApp::new().await;
    let (_, admin) = app.user("A0003", Role::Admin).await;

    for round in 0..10 {
        let url = format!("http://ecl-{round}.internal:9000");
        let model = format!("model-{round}");
        let ecl = app.call(
            "PUT",
            "/api/settings",
            Some(&admin),
            Some(json!({ "api.ecl_url": url })),
        );
        let llm = app.call(
            "PUT",
            "/api/settings",
            Some(&admin),
            Some(json!({ "llm.model": model })),
        );
        let ((s1, _), (s2, _)) = tokio::join!(ecl, llm);
        assert_eq!(s1, StatusCode::OK);
        assert_eq!(s2, StatusCode::OK);

        let (_, body) = app.call("GET", "/api/settings", Some(&admin), None).await;
        assert_eq!(body["api"]["ecl_url"], url.as_str());
        assert_eq!(body["llm"]["model"], model.as_str());
    }
}

/// One double standing in for PRINAD (with analytics), ECL and propensity.
async fn spawn_risk_backend() -> String {
    let drift = || {
        json!({
            "psi_global": 0.08,
            "features": [
                { "feature": "renda", "psi": 0.27 },
                { "feature": "idade", "psi": 0.03 }
            ]
        })
    };
    let app = Router::new()
        .route(
            "/simple_classify",
            post(|axum::Json(body): axum::Json<Value>| async move {
                axum::Json(json!({
                    "cpf": body["cpf"], "prinad": 12.0, "rating": "A2",
                    "pd_12m": 0.01, "pd_lifetime": 0.03, "estagio_pe": 1
                }))
            }),
        )
        .route(
            "/score",
            post(|axum::Json(body): axum::Json<Value>| async move {
                axum::Json(json!({
                    "cliente_id": body["cliente_id"], "produto": body["produto"],
                    "score": 0.64, "faixa": "MEDIA"
                }))
            }),
        )
        .route(
            "/simular",
            post(|axum::Json(body): axum::Json<Value>| async move {
                axum::Json(json!({
                    "limite_atual": body["limite_atual"], "novo_limite": body["novo_limite"],
                    "ecl_atual": 80.0, "ecl_simulado": 95.0, "delta_ecl": 15.0
                }))
            }),
        )
        .route(
            "/produtos",
            get(|| async { axum::Json(json!([{ "codigo": "cartao", "nome": "Cartão" }])) }),
        )
        .route(
            "/analytics/drift-report",
            get(move || async move { axum::Json(drift()) }),
        )
        .route(
            "/analytics/full-report",
            get(move || async move {
                axum::Json(json!({
                    "performance": { "auc_roc": 0.86, "gini": 0.72, "ks": 0.5, "accuracy": 0.9 },
                    "drift": drift(),
                    "tendencia": { "pontos": [
                        { "periodo": "2026-07", "acuracia": 0.89 },
                        { "periodo": "2026-08", "acuracia": 0.9 }
                    ]},
                    "backtest": { "periodo": "2026-Q2", "buckets": [
                        { "rating": "A2", "pd_prevista": 0.01,
                          "taxa_default_observada": 0.011, "quantidade": 300 }
                    ]}
                }))
            }),
        );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn propensity_and_analytics_pass_through() {
    let url = spawn_risk_backend().await;
    let app = TestApp::with(BTreeMap::new(), Some(&url)).await;
    let (_, gestor) = app.user("F0070", Role::Gestor).await;

    let (status, body) = app
        .call(
            "POST",
            "/api/propensao/score",
            Some(&gestor),
            Some(json!({ "cliente_id": "C9", "produto": "cartao" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["faixa"], "MEDIA");

    let (status, body) = app
        .call(
            "POST",
            "/api/propensao/simular",
            Some(&gestor),
            Some(json!({
                "cliente_id": "C9", "produto": "cartao",
                "limite_atual": 1000.0, "novo_limite": 1500.0
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["delta_ecl"], 15.0);

    let (status, body) = app
        .call("GET", "/api/propensao/produtos", Some(&gestor), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["codigo"], "cartao");

    let (status, body) = app
        .call("GET", "/api/analytics/drift-report", Some(&gestor), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["features"][0]["feature"], "renda");

    let (status, body) = app
        .call(
            "POST",
            "/api/prinad/simple_classify",
            Some(&gestor),
            Some(json!({ "cpf": "123.456.789-09" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cpf"], "12345678909");
}

#[tokio::test]
async fn auditor_cannot_run_backend_actions() {
    let url = spawn_risk_backend().await;
    let app = TestApp::with(BTreeMap::new(), Some(&url)).await;
    let (_, auditor) = app.user("F0071", Role::Auditor).await;

    let (status, body) = app
        .call(
            "POST",
            "/api/propensao/simular",
            Some(&auditor),
            Some(json!({
                "cliente_id": "C9", "produto": "cartao",
                "limite_atual": 1000.0, "novo_limite": 1500.0
            })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("missing permission"));

    let mut roles = BTreeMap::new();
    roles.insert("AUDITOR".to_string(), vec!["*".to_string()]);
    let app = TestApp::with(roles, Some(&url)).await;
    let (_, auditor) = app.user("F0072", Role::Auditor).await;
    for path in [
        "/api/prinad/simple_classify",
        "/api/prinad/explained_classify",
    ] {
        let (status, body) = app
            .call("POST", path, Some(&auditor), Some(json!({ "cpf": "12345678909" })))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{path}");
        assert!(body["error"].as_str().unwrap().starts_with("read-only"));
    }
    let (status, body) = app
        .call(
            "POST",
            "/api/propensao/simular",
            Some(&auditor),
            Some(json!({
                "cliente_id": "C9", "produto": "cartao",
                "limite_atual": 1000.0, "novo_limite": 1500.0
            })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().starts_with("read-only"));

    // reads stay open
    let (status, _) = app
        .call(
            "POST",
            "/api/propensao/score",
            Some(&auditor),
            Some(json!({ "cliente_id": "C9", "produto": "cartao" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn model_health_report_renders_markdown() {
    let url = spawn_risk_backend().await;
    let app = TestApp::with(BTreeMap::new(), Some(&url)).await;
    let (_, analyst) = app.user("F0073", Role::Analista).await;
    let (_, gestor) = app.user("F0074", Role::Gestor).await;

    let (status, _) = app
        .call("GET", "/api/reports/model-health", Some(&analyst), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .call("GET", "/api/reports/model-health", Some(&gestor), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let report = body.as_str().unwrap();
    assert!(report.starts_with("# Model health report\n"));
    assert!(report.contains("| renda | 0.2700 | significant |"));
    assert!(report.contains("## Backtest (2026-Q2)"));

    assert_eq!(app.actions().await, vec!["EXPORT_REPORT"]);
}

/// Audit backend whose writes always fail.
struct BrokenAudit;

#[async_trait::async_trait]
impl AuditLog for BrokenAudit {
    async fn append(
        &self,
        _user: &str,
        _action: &str,
        _resource: &str,
        _details: &str,
    ) -> Result<AuditEntry, AuthError> {
        Err(AuthError::Database("disk I/O error".into()))
    }

    async fn list(&self, _limit: u32, _offset: u32) -> Result<Vec<AuditEntry>, AuthError> {
        Ok(Vec::new())
    }

    async fn count(&self) -> Result<u64, AuthError> {
        Ok(0)
    }
}

#[tokio::test]
async fn audit_failures_after_and_before_a_change() {
    let store = Arc::new(SqliteAuthStore::open_in_memory().unwrap());
    store.migrate().await.unwrap();
    let settings = Settings::default_settings(Path::new("."));
    let secret = settings.server.jwt_secret.clone();
    let state = AppState::new(
        settings,
        None,
        store.clone(),
        Arc::new(BrokenAudit),
        Arc::new(RoleTable::builtin()),
    )
    .unwrap();
    let app = TestApp {
        router: build_router(Arc::new(state)),
        store: store.clone(),
        secret,
    };
    let (_, admin) = app.user("A0009", Role::Admin).await;

    // the user exists, so the response says so
    let (status, body) = app
        .call(
            "POST",
            "/api/users",
            Some(&admin),
            Some(json!({
                "name": "Dora Lima",
                "email": "dora@banco.example",
                "matricula": "F0090",
                "role": "ANALISTA",
                "password": "dora-senha-1"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["matricula"], "F0090");
    assert!(store.get_user_by_matricula("F0090").await.is_ok());

    // an export that cannot be audited is not released
    let (status, body) = app
        .call("GET", "/api/audit/export", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "database error");
}
