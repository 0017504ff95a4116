use std::sync::{Arc, Mutex};

use mvc_router::middleware::Rejection;
use mvc_router::{Action, BoxError, Method, Request, Response, Router, ViewContext};

/// A closure action that answers with `label` and the request's params.
pub fn echo(label: &'static str) -> Action {
    Action::handler(move |req: Request, _res: Response| async move {
        let params: Vec<String> = req.params().iter().map(|(k, v)| format!("{k}={v}")).collect();
        Response::text(format!("{label}[{}]", params.join(",")))
    })
}

pub fn body(res: &Response) -> &str {
    std::str::from_utf8(res.body()).expect("utf-8 body")
}

pub async fn call(router: &Router, method: Method, target: &str) -> Result<Response, mvc_router::Error> {
    router.resolve(Request::new(method, target), Response::new()).await
}

/// Middleware that records every key it runs under, and rejects `deny`.
pub fn recording_router(log: &Arc<Mutex<Vec<String>>>) -> Router {
    let mut router = Router::new();
    for key in ["auth", "deny"] {
        let log = Arc::clone(log);
        router = router.middleware(key, move |_req: &Request| {
            log.lock().unwrap().push(key.to_owned());
            match key {
                "deny" => Err(Rejection::forbidden("denied")),
                _ => Ok(()),
            }
        });
    }
    router
}

pub fn render(name: &str, ctx: &ViewContext) -> Result<String, BoxError> {
    if name == "broken" {
        return Err("template missing".into());
    }
    let params: Vec<String> = ctx.params.iter().map(|(k, v)| format!("{k}={v}")).collect();
    Ok(format!("<{}>{}", ctx.title, params.join(",")))
}
