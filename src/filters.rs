use crate::{error::Error, request::RequestPolicy, shared::SharedPolicy};
use std::convert::Infallible;
use warp::{
    http::{HeaderValue, StatusCode},
    reply::Response,
    Filter, Rejection, Reply,
};

/// Extracts the per request policy state. The nonce, if any, is already
/// generated so handlers can put it into the body.
pub fn csp(
    shared: SharedPolicy,
) -> impl Filter<Extract = (RequestPolicy,), Error = Rejection> + Clone {
    warp::any().and_then(move || {
        let shared = shared.clone();
        async move { shared.request().map_err(warp::reject::custom) }
    })
}

pub struct WithCsp<R> {
    reply: R,
    csp: RequestPolicy,
}

/// Wraps `reply` so the policy header is set when the response is built.
pub fn reply<R: Reply>(reply: R, csp: RequestPolicy) -> WithCsp<R> {
    WithCsp { reply, csp }
}

impl<R: Reply> Reply for WithCsp<R> {
    fn into_response(self) -> Response {
        let value = self
            .csp
            .header_value()
            .and_then(|value| HeaderValue::from_str(&value).map_err(Error::from));

        match value {
            Ok(value) => {
                let mut response = self.reply.into_response();
                response
                    .headers_mut()
                    .insert(self.csp.header_name(), value);
                response
            }
            Err(e) => {
                // never serve the body without its policy
                tracing::error!("Can't set content security policy: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    Ok(if err.is_not_found() {
        warp::reply::with_status("Not found", StatusCode::NOT_FOUND)
    } else if let Some(error) = err.find::<Error>() {
        tracing::error!("{}", error);
        warp::reply::with_status("Internal server error", StatusCode::INTERNAL_SERVER_ERROR)
    } else {
        tracing::error!("{:?}", err);
        warp::reply::with_status("Internal server error", StatusCode::INTERNAL_SERVER_ERROR)
    })
}
