//! Raw authenticated request command implementation.

use anyhow::{Context, Result, anyhow, bail};
use clap::Args;

use dsatrack_http::{AuthRequest, Method, Session};

use crate::output;

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// API path, e.g. /api/users/me/
    pub path: String,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// JSON request body
    #[arg(short, long)]
    pub data: Option<String>,

    /// Extra request header ("Name: value"), may be repeated
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,
}

pub async fn run(args: FetchArgs, session: &Session) -> Result<()> {
    let method = Method::from_bytes(args.method.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("Invalid HTTP method: {}", args.method))?;

    let mut request = AuthRequest::new(method, &args.path);
    for header in &args.headers {
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| anyhow!("Header must look like 'Name: value': {}", header))?;
        request = request.try_header(name.trim(), value.trim())?;
    }
    if let Some(data) = &args.data {
        let body: serde_json::Value = serde_json::from_str(data).context("Body is not valid JSON")?;
        request = request.json(&body)?;
    }

    let response = session.auth_fetch(request).await?;
    let status = response.status();
    let body = response.text().await.context("Failed to read response body")?;

    output::status(&format!("HTTP {}", status));
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(json) => output::json_pretty(&json)?,
        Err(_) if body.is_empty() => {}
        Err(_) => println!("{}", body),
    }

    if !status.is_success() {
        bail!("Request failed with HTTP {}", status.as_u16());
    }

    Ok(())
}
