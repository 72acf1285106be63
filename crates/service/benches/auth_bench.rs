use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use serde_json::json;
use service::actor::Actor;
use service::auth::domain::{LoginInput, RegisterInput};
use service::auth::service::{AuthConfig, AuthService};
use service::memory::InMemoryStore;
use service::visits::VisitService;

fn bench_login(c: &mut Criterion) {
    let repo = Arc::new(InMemoryStore::new());
    let svc = AuthService::new(repo.clone(), AuthConfig { jwt_secret: Some("secret".into()), ..AuthConfig::default() });

    // pre-create account outside of the benchmark using a tokio runtime
    let rt = tokio::runtime::Runtime::new().unwrap();
    let _ = rt.block_on(svc.register(RegisterInput {
        username: "bench".into(),
        password: "Benchmark1".into(),
        role: "jardinero".into(),
        phone: None,
        specialty: None,
    }));

    c.bench_function("auth_login_verify", |b| {
        b.iter(|| {
            let _ = rt.block_on(svc.login(LoginInput { username: "bench".into(), password: "Benchmark1".into() })).unwrap();
        });
    });
}

fn bench_gardener_listing(c: &mut Criterion) {
    let store = Arc::new(InMemoryStore::new());
    let auth = AuthService::new(store.clone(), AuthConfig::default());
    let visits = VisitService::new(store.clone());
    let rt = tokio::runtime::Runtime::new().unwrap();

    let (client, gardener) = rt.block_on(async {
        let reg = |username: &str, role: &str| RegisterInput {
            username: username.into(),
            password: "Benchmark1".into(),
            role: role.into(),
            phone: None,
            specialty: None,
        };
        let client = Actor::resolve(&auth.register(reg("bench_client", "cliente")).await.unwrap());
        let gardener = Actor::resolve(&auth.register(reg("bench_gardener", "jardinero")).await.unwrap());
        (client, gardener)
    });
    rt.block_on(async {
        for i in 0..500 {
            let body = json!({
                "direccion": format!("Calle {i}"),
                "tipo_servicio": "poda",
                "disponibilidad_horaria": "Lunes",
                "metros_cuadrados": i
            });
            let id = visits.create(&client, &body).await.unwrap().id;
            if i % 3 == 0 {
                visits.accept(&gardener, id).await.unwrap();
            }
        }
    });

    c.bench_function("visits_list_gardener", |b| {
        b.iter(|| rt.block_on(visits.list(&gardener, None)).unwrap().len());
    });
}

criterion_group!(benches, bench_login, bench_gardener_listing);
criterion_main!(benches);
