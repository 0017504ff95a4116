//! Minimal example: closures, a controller, a view, middleware and a
//! sub-router.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/
//!   curl http://localhost:3000/users/42
//!   curl http://localhost:3000/users/new
//!   curl -X POST 'http://localhost:3000/users/42?_method=delete'
//!   curl -H 'authorization: Bearer demo' http://localhost:3000/admin/stats

use http::StatusCode;
use mvc_router::middleware::Rejection;
use mvc_router::{
    Action, BoxError, BoxFuture, Controller, Request, Response, Router, Server, ViewContext,
};

#[tokio::main]
async fn main() -> Result<(), mvc_router::Error> {
    tracing_subscriber::fmt::init();

    let admin = Router::new()
        .prefix("/admin")
        .get("/stats", Action::handler(stats)).only("auth");

    let app = Router::new()
        .views(render)
        .middleware("auth", |req: &Request| match req.header("authorization") {
            Some("Bearer demo") => Ok(()),
            _ => Err(Rejection::forbidden("missing or wrong token")),
        })
        .register_controller("users", || UsersController)
        .get("/", "home")
        .get("/users/new", "new-user")
        .controller("users")
        .get("/users/{id}", "show")
        .delete("/users/{id}", "destroy")
        .controller("")
        .include(admin);

    Server::bind("0.0.0.0:3000")?.serve(app).await
}

// Stand-in for a template engine.
fn render(name: &str, ctx: &ViewContext) -> Result<String, BoxError> {
    Ok(format!("<h1>{}</h1><p>{} params</p>", name, ctx.params.len()))
}

async fn stats(_req: Request, _res: Response) -> Response {
    Response::json(br#"{"users":2}"#.to_vec())
}

struct UsersController;

impl Controller for UsersController {
    fn call(self: Box<Self>, action: &str, req: Request, mut res: Response)
        -> Option<BoxFuture<Response>>
    {
        match action {
            "show" => Some(Box::pin(async move {
                let id = req.param("id").unwrap_or("unknown");
                Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#).into_bytes())
            })),
            "destroy" => Some(Box::pin(async move {
                res.set_status(StatusCode::NO_CONTENT);
                res
            })),
            _ => None,
        }
    }
}
