use actix_web::{
    body::MessageBody,
    http::StatusCode,
    test,
    test::TestRequest,
    web::ServiceConfig,
    App,
};
use boost_engine::{test_utils::prepare_test_env, SqliteDatabase};

use crate::middleware::IdentityMiddlewareFactory;

pub async fn new_db() -> SqliteDatabase {
    let url = boost_engine::test_utils::random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database")
}

/// The trusted identity headers the auth proxy would set, e.g. `(1, "customer")`.
pub type Identity<'a> = Option<(i64, &'a str)>;

pub async fn get_request<F>(identity: Identity<'_>, path: &str, configure: F) -> Result<(StatusCode, String), String>
where F: FnOnce(&mut ServiceConfig) {
    let mut req = TestRequest::get().uri(path);
    if let Some((user_id, roles)) = identity {
        req = req.insert_header(("x-user-id", user_id.to_string())).insert_header(("x-user-roles", roles));
    }
    call(req, configure).await
}

pub async fn post_request<F, T>(
    identity: Identity<'_>,
    path: &str,
    body: &T,
    configure: F,
) -> Result<(StatusCode, String), String>
where
    F: FnOnce(&mut ServiceConfig),
    T: serde::Serialize,
{
    let mut req = TestRequest::post().uri(path).set_json(body);
    if let Some((user_id, roles)) = identity {
        req = req.insert_header(("x-user-id", user_id.to_string())).insert_header(("x-user-roles", roles));
    }
    call(req, configure).await
}

async fn call<F>(req: TestRequest, configure: F) -> Result<(StatusCode, String), String>
where F: FnOnce(&mut ServiceConfig) {
    let app = App::new().wrap(IdentityMiddlewareFactory).configure(configure);
    let service = test::init_service(app).await;
    let (_, res) = test::try_call_service(&service, req.to_request()).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    Ok((status, body))
}
