use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use warp::http::StatusCode;
use warp::reject;
use warp::reply::{json, Reply};
use warp::Filter;

use super::response::SuccessResponse;

/// Reports the running build.
pub fn make_healthz_route(
) -> impl warp::Filter<Extract = (impl Reply,), Error = reject::Rejection> + Clone {
    warp::path("healthz").and(warp::path::end()).and(warp::get()).map(|| {
        json(&SuccessResponse::Healthz {
            revision: info::REVISION,
            timestamp: info::BUILD_TIMESTAMP,
            version: info::VERSION,
        })
    })
}

type TerminationFuture<'a> = BoxFuture<'a, ()>;

pub type TerminationFunctionWrapper<'a> =
    Arc<dyn Fn() -> TerminationFuture<'a> + Send + Sync + 'a>;

/// Asks both servers to shut down gracefully.
pub fn make_termination_route<'a>(
    terminate: TerminationFunctionWrapper<'a>,
) -> impl warp::Filter<Extract = (impl Reply,), Error = reject::Rejection> + Clone + 'a {
    let handler = move || -> BoxFuture<'a, Result<StatusCode, std::convert::Infallible>> {
        let terminate = terminate.clone();

        async move {
            terminate().await;
            Ok(StatusCode::NO_CONTENT)
        }
        .boxed()
    };

    warp::path("terminate")
        .and(warp::path::end())
        .and(warp::post())
        .and_then(handler)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn healthz_reports_the_version() {
        let response = warp::test::request()
            .path("/healthz")
            .reply(&make_healthz_route())
            .await;

        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["version"], info::VERSION);
    }

    #[tokio::test]
    async fn terminate_calls_the_termination_function() {
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        let terminate: TerminationFunctionWrapper<'static> = Arc::new(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
            .boxed()
        });

        let route = make_termination_route(terminate);

        let response = warp::test::request()
            .method("GET")
            .path("/terminate")
            .reply(&route)
            .await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let response = warp::test::request()
            .method("POST")
            .path("/terminate")
            .reply(&route)
            .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
