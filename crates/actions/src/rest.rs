// SPDX-License-Identifier: MIT

//! REST action: issues one HTTP request, publishing the
//! response (status, headers, JSON body) into the execution context under
//! the step's output so later steps can reference it.

use crate::action::{Action, ActionInput, ActionResult};
use async_trait::async_trait;
use cronplus_core::{AuthKind, CronplusError, HttpMethod, RestParams};
use reqwest::Client;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

pub struct RestAction;

fn client() -> &'static Client {
    static CLIENT: OnceLock<Client> = OnceLock::new();
    CLIENT.get_or_init(Client::new)
}

#[async_trait]
impl Action for RestAction {
    async fn run(&self, input: ActionInput<'_>) -> Result<ActionResult, CronplusError> {
        let params: RestParams = serde_json::from_value(input.params.clone())
            .map_err(|e| CronplusError::ActionFailed(format!("invalid REST parameters: {e}")))?;
        let started = Instant::now();
        let timeout = Duration::from_millis(params.timeout_milliseconds);

        let mut request = client().request(to_reqwest_method(params.method), &params.url).timeout(timeout);
        for (name, value) in &params.headers {
            if auth_consumed_keys(&params.auth).contains(&name.as_str()) {
                continue;
            }
            request = request.header(name, value);
        }
        request = apply_auth(request, &params.auth, &params.headers);
        if let Some(body) = &params.body_template {
            request = request.body(body.clone());
        }

        let run = async {
            let response = request.send().await.map_err(|e| map_reqwest_error(e, timeout))?;
            let status = response.status().as_u16();
            let headers: serde_json::Map<String, serde_json::Value> = response
                .headers()
                .iter()
                .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_str().unwrap_or("").to_string())))
                .collect();
            let text = response.text().await.map_err(|e| map_reqwest_error(e, timeout))?;
            let body_json: serde_json::Value = serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));
            Ok::<_, CronplusError>(serde_json::json!({
                "status": status,
                "headers": serde_json::Value::Object(headers),
                "body": body_json,
            }))
        };

        tokio::select! {
            biased;
            _ = input.cancellation.cancelled() => Err(CronplusError::Cancelled),
            result = run => {
                let outputs = result?;
                tracing::debug!(url = %params.url, status = %outputs["status"], "REST action completed");
                Ok(ActionResult::success(outputs, started.elapsed()))
            }
        }
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
        HttpMethod::Patch => reqwest::Method::PATCH,
    }
}

/// Header-map keys `apply_auth` reads credential material from for a given
/// `auth` kind — these are config-author-facing fields, not literal wire
/// headers, so the literal-headers loop must not also forward them verbatim.
fn auth_consumed_keys(auth: &AuthKind) -> &'static [&'static str] {
    match auth {
        AuthKind::None => &[],
        AuthKind::Basic => &["username", "password"],
        AuthKind::Bearer => &["token"],
        AuthKind::ApiKey => &["api_key_header", "api_key"],
    }
}

fn apply_auth(
    request: reqwest::RequestBuilder,
    auth: &AuthKind,
    headers: &std::collections::HashMap<String, String>,
) -> reqwest::RequestBuilder {
    match auth {
        AuthKind::None => request,
        AuthKind::Basic => match (headers.get("username"), headers.get("password")) {
            (Some(user), pass) => request.basic_auth(user, pass),
            _ => request,
        },
        AuthKind::Bearer => match headers.get("token") {
            Some(token) => request.bearer_auth(token),
            None => request,
        },
        AuthKind::ApiKey => match headers.get("api_key_header").zip(headers.get("api_key")) {
            Some((name, key)) => request.header(name, key),
            None => request,
        },
    }
}

fn map_reqwest_error(err: reqwest::Error, timeout: Duration) -> CronplusError {
    if err.is_timeout() {
        CronplusError::Timeout(timeout)
    } else {
        CronplusError::ActionFailed(err.to_string())
    }
}

#[cfg(test)]
#[path = "rest_tests.rs"]
mod tests;
